//! Deserialization types for configuration and preset documents.
//!
//! These types exist solely for serde. Rule payloads stay untyped here so
//! that a preset rule can be overridden or disabled by id without repeating
//! its whole definition; they are compiled into [`super::model::RuleSpec`]
//! by the loader.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::path::Path;

use super::error::ConfigError;

/// Serialization format of a document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentFormat {
    /// TOML (default).
    Toml,
    /// JSON.
    Json,
}

impl DocumentFormat {
    /// Picks the format from a file extension (`.json` → JSON, else TOML).
    #[must_use]
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("json") => Self::Json,
            _ => Self::Toml,
        }
    }
}

/// A configuration or preset document.
///
/// Every field is optional; absent fields leave the folded value untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConfigDocument {
    /// Preset name (presets only).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// Preset description (presets only).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Schema version.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<u32>,

    /// Presets this document inherits from, in order.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub extends: Vec<String>,

    /// Rule section.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rules: Option<RulesSection>,

    /// Patterns selecting the files rules scan by default.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub include: Option<Vec<String>>,

    /// Patterns or path prefixes excluded from every scan.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exclude: Option<Vec<String>>,

    /// Tool toggles (consumed outside the rule engine).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tools: Option<BTreeMap<String, Value>>,

    /// Free-form integration flags (consumed outside the rule engine).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub integrations: Option<BTreeMap<String, Value>>,
}

/// The `[rules]` table.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RulesSection {
    /// Custom rule instances, in declaration order.
    pub custom: Vec<RuleDocument>,
}

/// One custom rule as written in a document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RuleDocument {
    /// Unique, stable identifier.
    #[serde(default)]
    pub id: String,

    /// Rule kind discriminant (e.g. `import-boundary`).
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub kind: String,

    /// `error`, `warning` or `info` (default `error`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub severity: Option<String>,

    /// Patterns excluded for this rule only.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub exclude: Vec<String>,

    /// Drops the rule from the effective list.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub disabled: bool,

    /// Custom message prefix for violations.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,

    /// Kind-specific options.
    #[serde(flatten)]
    pub options: BTreeMap<String, Value>,
}

impl ConfigDocument {
    /// Parses a document.
    ///
    /// `origin` names the document in error messages.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] if the text is not a valid document.
    pub fn parse(content: &str, format: DocumentFormat, origin: &str) -> Result<Self, ConfigError> {
        let parsed = match format {
            DocumentFormat::Toml => toml::from_str(content).map_err(|e| e.to_string()),
            DocumentFormat::Json => serde_json::from_str(content).map_err(|e| e.to_string()),
        };
        parsed.map_err(|message| ConfigError::Parse {
            origin: origin.to_string(),
            message,
        })
    }

    /// Custom rules declared in this document.
    #[must_use]
    pub fn custom_rules(&self) -> &[RuleDocument] {
        self.rules.as_ref().map_or(&[], |r| r.custom.as_slice())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_empty_toml() {
        let doc = ConfigDocument::parse("", DocumentFormat::Toml, "test").unwrap();
        assert_eq!(doc, ConfigDocument::default());
        assert!(doc.custom_rules().is_empty());
    }

    #[test]
    fn parse_full_toml() {
        let doc = ConfigDocument::parse(
            r#"
version = 1
extends = ["builtin/base", "./presets/team.toml"]
include = ["src/**"]
exclude = ["dist"]

[tools]
typescript = true

[[rules.custom]]
id = "layers"
kind = "import-boundary"
severity = "warning"

[[rules.custom.layers]]
name = "shared"
pattern = "src/shared/**"

[[rules.custom]]
id = "old-rule"
disabled = true
"#,
            DocumentFormat::Toml,
            "struct-lint.toml",
        )
        .unwrap();

        assert_eq!(doc.version, Some(1));
        assert_eq!(doc.extends.len(), 2);
        assert_eq!(doc.exclude, Some(vec!["dist".to_string()]));
        let rules = doc.custom_rules();
        assert_eq!(rules.len(), 2);
        assert_eq!(rules[0].kind, "import-boundary");
        assert!(rules[0].options.contains_key("layers"));
        assert!(rules[1].disabled);
        assert!(rules[1].kind.is_empty());
    }

    #[test]
    fn parse_json_document() {
        let doc = ConfigDocument::parse(
            r#"{ "extends": ["builtin/base"], "rules": { "custom": [
                { "id": "r1", "kind": "relationship", "files": "src/**/*.tsx" }
            ] } }"#,
            DocumentFormat::Json,
            "struct-lint.json",
        )
        .unwrap();
        assert_eq!(doc.custom_rules()[0].options["files"], "src/**/*.tsx");
    }

    #[test]
    fn parse_error_names_origin() {
        let err = ConfigDocument::parse("version = [", DocumentFormat::Toml, "broken.toml")
            .unwrap_err();
        assert!(err.to_string().contains("broken.toml"));
    }

    #[test]
    fn format_from_extension() {
        assert_eq!(DocumentFormat::from_path(Path::new("a.json")), DocumentFormat::Json);
        assert_eq!(DocumentFormat::from_path(Path::new("a.toml")), DocumentFormat::Toml);
        assert_eq!(DocumentFormat::from_path(Path::new(".struct-lint")), DocumentFormat::Toml);
    }
}
