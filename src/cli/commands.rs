//! CLI command implementations
//!
//! - explain: load config and catalog, analyze one filter, print the explain block
//! - check: evaluate one filter against one document in memory

use std::path::Path;

use serde_json::{json, Value as Json};

use crate::compiler::Backend;
use crate::config::PushdownConfig;
use crate::executor::matches;
use crate::filter::Filter;
use crate::observability::init_logging;
use crate::planner::{ExplainPlan, PushdownAnalyzer};
use crate::schema::Catalog;
use crate::value::{extjson, ValueError};

use super::args::{Cli, Command};
use super::errors::{CliError, CliResult};
use super::io::{write_error, write_response, write_text};

/// Parse arguments and run the selected command
pub fn run() -> CliResult<()> {
    init_logging();
    let cli = Cli::parse_args();
    run_command(cli.command)
}

/// Run a parsed command, writing its output to stdout
pub fn run_command(command: Command) -> CliResult<()> {
    match command {
        Command::Explain {
            catalog,
            collection,
            filter,
            config,
            backend,
        } => {
            let plan = explain(&catalog, &collection, &filter, config.as_deref(), backend)?;
            write_text(&plan.to_string())
        }
        Command::Check { filter, document } => match check(&filter, &document) {
            Ok(matched) => write_response(json!({ "matches": matched })),
            Err(err) => {
                write_error(err.code(), &err.to_string())?;
                Err(err)
            }
        },
    }
}

/// Analyze a filter against a catalog directory.
///
/// Hard analysis errors are reported inside the explain block, not as a
/// command failure.
pub fn explain(
    catalog_dir: &Path,
    collection: &str,
    filter: &str,
    config_path: Option<&Path>,
    backend: Option<Backend>,
) -> CliResult<ExplainPlan> {
    let mut config = match config_path {
        Some(path) => PushdownConfig::load(path)?,
        None => PushdownConfig::default(),
    };
    if let Some(backend) = backend {
        config.backend = backend;
    }

    let catalog = Catalog::load_dir(catalog_dir)?;
    let analyzer = PushdownAnalyzer::from_config(&config, catalog);

    let filter = parse_json(filter)?;
    let explain = match analyzer.analyze_json(collection, &filter) {
        Ok(plan) => ExplainPlan::from_plan(collection, &plan),
        Err(err) => ExplainPlan::from_error(collection, &err),
    };

    Ok(explain)
}

/// Evaluate a filter against a single document
pub fn check(filter: &str, document: &str) -> CliResult<bool> {
    let filter = Filter::from_json(&parse_json(filter)?)?;
    let document = extjson::document_from_str(document)?;
    Ok(matches(&document, &filter))
}

fn parse_json(text: &str) -> CliResult<Json> {
    serde_json::from_str(text)
        .map_err(|e| CliError::Input(ValueError::InvalidExtendedJson(e.to_string())))
}
