//! Shared output formatting for run reports.

use std::fmt::Write;

use anyhow::Result;
use struct_lint_core::Severity;
use struct_lint_rules::RunReport;

use crate::OutputFormat;

/// Print a run report in the specified format.
pub fn print(report: &RunReport, format: OutputFormat) -> Result<()> {
    let rendered = match format {
        OutputFormat::Text => render_text(report, true),
        OutputFormat::Json => serde_json::to_string_pretty(report)?,
        OutputFormat::Compact => render_compact(report),
    };
    if !rendered.is_empty() {
        println!("{rendered}");
    }
    Ok(())
}

/// Multi-line human-readable report with a summary line.
#[must_use]
pub fn render_text(report: &RunReport, color: bool) -> String {
    let paint = |code: &str, text: &str| {
        if color {
            format!("\x1b[{code}m{text}\x1b[0m")
        } else {
            text.to_string()
        }
    };

    let mut out = String::new();
    for violation in &report.violations {
        let severity = match violation.severity {
            Severity::Error => paint("31", "error"),
            Severity::Warning => paint("33", "warning"),
            Severity::Info => paint("34", "info"),
        };
        let _ = writeln!(
            out,
            "{} {} at {}",
            violation.code, violation.rule_id, violation.location
        );
        let _ = writeln!(out, "  {severity}: {}", violation.message);
        if let Some(context) = &violation.context {
            let _ = writeln!(out, "  = note: {context}");
        }
        if let Some(suggestion) = &violation.suggestion {
            let _ = writeln!(out, "  = help: {}", suggestion.message);
        }
        out.push('\n');
    }

    let errors = report.count(Severity::Error);
    let warnings = report.count(Severity::Warning);
    let infos = report.count(Severity::Info);
    let summary_color = if errors > 0 {
        "31"
    } else if warnings > 0 {
        "33"
    } else {
        "32"
    };
    let _ = write!(
        out,
        "{}",
        paint(
            summary_color,
            &format!(
                "Found {errors} error(s), {warnings} warning(s), {infos} info(s) in {} file(s) from {} rule(s)",
                report.files_affected(),
                report.rules_run
            )
        )
    );
    if !report.rules_skipped.is_empty() {
        let _ = write!(
            out,
            "\nSkipped rule(s) with unsupported kinds: {}",
            report.rules_skipped.join(", ")
        );
    }
    out
}

/// One line per violation.
#[must_use]
pub fn render_compact(report: &RunReport) -> String {
    report
        .violations
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("\n")
}
