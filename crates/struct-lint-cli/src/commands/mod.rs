//! Subcommand implementations.

pub mod check;
pub mod list_rules;
pub mod output;
pub mod validate;

use miette::Report;
use struct_lint_core::ConfigError;

/// Prints a fatal configuration error with its diagnostic code and help.
pub fn report_config_error(error: ConfigError) {
    eprintln!("{:?}", Report::new(error));
}
