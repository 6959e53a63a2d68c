//! Validate command implementation.

use std::path::Path;

use anyhow::Result;
use struct_lint_core::load_config;
use struct_lint_rules::validate_custom_rules;

use crate::{EXIT_FATAL, EXIT_OK, EXIT_VIOLATIONS};

/// Runs the validate command.
pub fn run(root: &Path, config_path: Option<&Path>) -> Result<u8> {
    let config = match load_config(root, config_path) {
        Ok(config) => config,
        Err(e) => {
            super::report_config_error(e);
            return Ok(EXIT_FATAL);
        }
    };

    match config.source.path() {
        Some(path) => println!("Config: {}", path.display()),
        None => println!("Config: built-in defaults"),
    }
    if !config.presets.is_empty() {
        println!("Presets: {}", config.presets.join(", "));
    }

    let problems = validate_custom_rules(&config.rule_documents());
    if problems.is_empty() {
        println!("{} rule(s) OK", config.rules.len());
        return Ok(EXIT_OK);
    }

    for problem in &problems {
        println!("  - {problem}");
    }
    println!("{} problem(s) found", problems.len());
    Ok(EXIT_VIOLATIONS)
}
