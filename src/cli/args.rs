//! CLI argument definitions using clap
//!
//! Commands:
//! - docproxy explain --catalog <dir> --collection <name> --filter <extjson>
//! - docproxy check --filter <extjson> --document <extjson>

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::compiler::Backend;

/// docproxy - filter pushdown diagnostics for a document-to-SQL proxy
#[derive(Parser, Debug)]
#[command(name = "docproxy")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Show whether a filter is pushed down, and how
    Explain {
        /// Directory of collection metadata files
        #[arg(long)]
        catalog: PathBuf,

        /// Collection to query
        #[arg(long)]
        collection: String,

        /// Filter as extended JSON
        #[arg(long)]
        filter: String,

        /// Path to configuration file
        #[arg(long)]
        config: Option<PathBuf>,

        /// Backend dialect, overrides the configuration
        #[arg(long)]
        backend: Option<Backend>,
    },

    /// Evaluate a filter against one document in memory
    Check {
        /// Filter as extended JSON
        #[arg(long)]
        filter: String,

        /// Document as extended JSON
        #[arg(long)]
        document: String,
    },
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Cli::parse()
    }
}
