//! Core types for lint violations.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::path::ProjectPath;

/// Severity level for lint violations.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Informational message, does not fail lint.
    Info,
    /// Warning that should be addressed.
    Warning,
    /// Error that must be fixed.
    #[default]
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Info => write!(f, "info"),
            Self::Warning => write!(f, "warning"),
            Self::Error => write!(f, "error"),
        }
    }
}

impl std::str::FromStr for Severity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "error" => Ok(Self::Error),
            "warning" | "warn" => Ok(Self::Warning),
            "info" => Ok(Self::Info),
            other => Err(format!(
                "unknown severity `{other}`, expected: error, warning, info"
            )),
        }
    }
}

/// Where a violation was found.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Location {
    /// File path relative to project root.
    pub file: ProjectPath,
    /// Line number (1-indexed), when the finding is tied to a line.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line: Option<usize>,
    /// Column number (1-indexed).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub column: Option<usize>,
}

impl Location {
    /// A whole-file location.
    #[must_use]
    pub fn file(file: ProjectPath) -> Self {
        Self {
            file,
            line: None,
            column: None,
        }
    }

    /// A location on a specific line.
    #[must_use]
    pub fn line(file: ProjectPath, line: usize) -> Self {
        Self {
            file,
            line: Some(line),
            column: None,
        }
    }

    /// Sets the column.
    #[must_use]
    pub fn with_column(mut self, column: usize) -> Self {
        self.column = Some(column);
        self
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.file)?;
        if let Some(line) = self.line {
            write!(f, ":{line}")?;
            if let Some(column) = self.column {
                write!(f, ":{column}")?;
            }
        }
        Ok(())
    }
}

/// A suggested fix for a violation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Suggestion {
    /// Human-readable description of the fix.
    pub message: String,
}

impl Suggestion {
    /// Creates a new suggestion.
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// A lint violation found during analysis.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Violation {
    /// Violation code (e.g., "LAYER001").
    pub code: String,
    /// Id of the configured rule that produced it.
    pub rule_id: String,
    /// Severity of this violation.
    pub severity: Severity,
    /// Primary location of the violation.
    pub location: Location,
    /// Human-readable message.
    pub message: String,
    /// Extra detail such as the resolved import target.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context: Option<String>,
    /// Optional suggestion for fixing.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<Suggestion>,
}

impl Violation {
    /// Creates a new violation.
    #[must_use]
    pub fn new(
        code: impl Into<String>,
        rule_id: impl Into<String>,
        severity: Severity,
        location: Location,
        message: impl Into<String>,
    ) -> Self {
        Self {
            code: code.into(),
            rule_id: rule_id.into(),
            severity,
            location,
            message: message.into(),
            context: None,
            suggestion: None,
        }
    }

    /// Adds context to this violation.
    #[must_use]
    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context = Some(context.into());
        self
    }

    /// Adds a suggestion to this violation.
    #[must_use]
    pub fn with_suggestion(mut self, suggestion: Suggestion) -> Self {
        self.suggestion = Some(suggestion);
        self
    }

    /// Formats the violation for terminal output.
    #[must_use]
    pub fn format(&self) -> String {
        use std::fmt::Write;
        let mut output = format!("{} {} at {}\n", self.code, self.rule_id, self.location);
        let _ = writeln!(output, "  {}: {}", self.severity, self.message);
        if let Some(context) = &self.context {
            let _ = writeln!(output, "  = note: {context}");
        }
        if let Some(suggestion) = &self.suggestion {
            let _ = writeln!(output, "  = help: {}", suggestion.message);
        }
        output
    }
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: {} [{}/{}] {}",
            self.location, self.severity, self.rule_id, self.code, self.message
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_violation() -> Violation {
        Violation::new(
            "LAYER001",
            "layers",
            Severity::Error,
            Location::line(ProjectPath::normalize("src/shared/y.ts").unwrap(), 3),
            "shared -> features dependency not allowed",
        )
    }

    #[test]
    fn display_is_single_line() {
        let v = make_violation();
        insta::assert_snapshot!(
            v.to_string(),
            @"src/shared/y.ts:3: error [layers/LAYER001] shared -> features dependency not allowed"
        );
    }

    #[test]
    fn format_includes_context_and_help() {
        let v = make_violation()
            .with_context("src/features/f.ts")
            .with_suggestion(Suggestion::new("move the shared code down"));
        let formatted = v.format();
        assert!(formatted.starts_with("LAYER001 layers at src/shared/y.ts:3\n"));
        assert!(formatted.contains("  = note: src/features/f.ts"));
        assert!(formatted.contains("  = help: move the shared code down"));
    }

    #[test]
    fn whole_file_location_has_no_line() {
        let loc = Location::file(ProjectPath::normalize("struct-lint.toml").unwrap());
        assert_eq!(loc.to_string(), "struct-lint.toml");
        let loc = Location::line(ProjectPath::normalize("a.ts").unwrap(), 2).with_column(5);
        assert_eq!(loc.to_string(), "a.ts:2:5");
    }

    #[test]
    fn severity_parses_and_orders() {
        assert_eq!("warn".parse::<Severity>(), Ok(Severity::Warning));
        assert!("fatal".parse::<Severity>().is_err());
        assert!(Severity::Error > Severity::Warning);
        assert!(Severity::Warning > Severity::Info);
    }
}
