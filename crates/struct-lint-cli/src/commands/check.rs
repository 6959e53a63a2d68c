//! Check command implementation.

use std::path::Path;

use anyhow::Result;
use struct_lint_core::{load_config, DiskFs};
use struct_lint_rules::{run_all, RunReport, ScanOptions};

use crate::{FailOn, OutputFormat, EXIT_FATAL, EXIT_OK, EXIT_VIOLATIONS};

/// Runs the check command.
pub fn run(
    root: &Path,
    config_path: Option<&Path>,
    format: OutputFormat,
    fail_on: FailOn,
    parallel: bool,
    verbose: bool,
) -> Result<u8> {
    let config = match load_config(root, config_path) {
        Ok(config) => config,
        Err(e) => {
            super::report_config_error(e);
            return Ok(EXIT_FATAL);
        }
    };
    if let Some(path) = config.source.path() {
        tracing::info!("Using config: {}", path.display());
    }

    let fs = DiskFs::new(root);
    let trace = |line: &str| eprintln!("  {line}");
    let mut options = ScanOptions::new(&fs).with_parallel(parallel);
    if verbose {
        options = options.with_debug(&trace);
    }

    tracing::info!("Checking {} with {} rule(s)", root.display(), config.rules.len());
    let report = run_all(&config, &options);

    super::output::print(&report, format)?;
    Ok(exit_code(&report, fail_on))
}

/// Exit code for a finished run.
#[must_use]
pub fn exit_code(report: &RunReport, fail_on: FailOn) -> u8 {
    match fail_on.threshold() {
        Some(threshold) if report.has_at_least(threshold) => EXIT_VIOLATIONS,
        _ => EXIT_OK,
    }
}
