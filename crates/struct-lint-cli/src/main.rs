//! struct-lint CLI tool.
//!
//! Usage:
//! ```bash
//! struct-lint check [OPTIONS] [PATH]
//! struct-lint validate [PATH]
//! struct-lint list-rules
//! ```
//!
//! Exit codes: `0` clean, `1` violations at or above `--fail-on`, `2`
//! configuration or I/O error.

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use struct_lint_core::config::normalize_host_path;
use struct_lint_core::Severity;
use tracing_subscriber::EnvFilter;

mod commands;

/// Structural linter for JavaScript and TypeScript projects
#[derive(Parser)]
#[command(name = "struct-lint")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to configuration file
    #[arg(short, long, global = true, env = "STRUCT_LINT_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run all configured rules
    Check {
        /// Project root (default: current directory)
        #[arg(default_value = ".")]
        path: PathBuf,

        /// Output format
        #[arg(short, long, default_value = "text")]
        format: OutputFormat,

        /// Lowest severity that makes the run fail
        #[arg(long, default_value = "warning")]
        fail_on: FailOn,

        /// Run rules one after another
        #[arg(long)]
        no_parallel: bool,
    },

    /// Check the configuration without scanning files
    Validate {
        /// Project root (default: current directory)
        #[arg(default_value = ".")]
        path: PathBuf,
    },

    /// List rule kinds and built-in presets
    ListRules,
}

/// Output format for lint results.
#[derive(Clone, Copy, Debug, Default, clap::ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text output.
    #[default]
    Text,
    /// JSON output.
    Json,
    /// One-line-per-violation compact format.
    Compact,
}

/// Severity threshold for a failing exit code.
#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum FailOn {
    /// Fail on errors only.
    Error,
    /// Fail on warnings and errors.
    Warning,
    /// Fail on any violation.
    Info,
    /// Never fail because of violations.
    Never,
}

impl FailOn {
    /// The lowest failing severity, if any.
    #[must_use]
    pub fn threshold(self) -> Option<Severity> {
        match self {
            Self::Error => Some(Severity::Error),
            Self::Warning => Some(Severity::Warning),
            Self::Info => Some(Severity::Info),
            Self::Never => None,
        }
    }
}

/// Exit code for a clean run.
pub const EXIT_OK: u8 = 0;
/// Exit code when violations reach the fail threshold.
pub const EXIT_VIOLATIONS: u8 = 1;
/// Exit code for configuration and I/O errors.
pub const EXIT_FATAL: u8 = 2;

fn main() -> ExitCode {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    match run(cli) {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            eprintln!("error: {e:#}");
            ExitCode::from(EXIT_FATAL)
        }
    }
}

fn run(cli: Cli) -> Result<u8> {
    let cwd = std::env::current_dir().context("cannot determine the current directory")?;
    let config = cli.config.as_deref().map(|p| absolute(&cwd, p));

    match cli.command {
        Commands::Check {
            path,
            format,
            fail_on,
            no_parallel,
        } => commands::check::run(
            &absolute(&cwd, &path),
            config.as_deref(),
            format,
            fail_on,
            !no_parallel,
            cli.verbose,
        ),
        Commands::Validate { path } => {
            commands::validate::run(&absolute(&cwd, &path), config.as_deref())
        }
        Commands::ListRules => {
            commands::list_rules::run();
            Ok(EXIT_OK)
        }
    }
}

fn absolute(cwd: &Path, path: &Path) -> PathBuf {
    normalize_host_path(&cwd.join(path))
}
