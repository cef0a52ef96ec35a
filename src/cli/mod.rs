//! CLI module for docproxy
//!
//! Provides command-line interface for:
//! - explain: Show the pushdown decision for a filter
//! - check: Evaluate a filter against a document in memory

mod args;
mod commands;
mod errors;
mod io;

pub use args::{Cli, Command};
pub use commands::{check, explain, run, run_command};
pub use errors::{CliError, CliResult};
pub use io::{write_error, write_response, write_text};
