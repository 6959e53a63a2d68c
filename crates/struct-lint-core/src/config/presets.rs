//! Built-in presets and configuration defaults.

use super::dto::{ConfigDocument, DocumentFormat};
use super::error::ConfigError;

/// Defaults every configuration starts from.
const DEFAULTS: &str = r#"
version = 1
include = ["src/**"]
exclude = ["node_modules", "dist", "build", "coverage"]
"#;

const BASE: &str = r#"
name = "base"
description = "Common include and exclude settings for JavaScript and TypeScript projects"
include = ["src/**"]
exclude = ["node_modules", "dist", "build", "coverage", ".next", "**/*.d.ts"]
"#;

const CLEAN_ARCHITECTURE: &str = r#"
name = "clean-architecture"
description = "Dependencies point inwards: domain <- application <- infrastructure, presentation"
extends = ["builtin/base"]

[[rules.custom]]
id = "clean-architecture-layers"
kind = "import-boundary"
message = "Clean architecture"

[[rules.custom.layers]]
name = "domain"
pattern = "src/domain/**"

[[rules.custom.layers]]
name = "application"
pattern = "src/application/**"
allowed = ["domain"]

[[rules.custom.layers]]
name = "infrastructure"
pattern = "src/infrastructure/**"
allowed = ["domain", "application"]

[[rules.custom.layers]]
name = "presentation"
pattern = "src/presentation/**"
allowed = ["domain", "application"]
"#;

const FEATURE_MODULES: &str = r#"
name = "feature-modules"
description = "Feature folders are only reachable through their index file"
extends = ["builtin/base"]

[[rules.custom]]
id = "feature-public-api"
kind = "public-api"
modules = "src/features/*"
barrel = "index.ts"
"#;

const BUILTINS: &[(&str, &str)] = &[
    ("base", BASE),
    ("clean-architecture", CLEAN_ARCHITECTURE),
    ("feature-modules", FEATURE_MODULES),
];

/// Summary of a built-in preset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PresetInfo {
    /// Reference to use in `extends`, e.g. `builtin/base`.
    pub reference: String,
    /// Human-readable description.
    pub description: String,
}

/// The defaults document.
///
/// # Errors
///
/// Fails only if the embedded document is malformed.
pub fn defaults() -> Result<ConfigDocument, ConfigError> {
    ConfigDocument::parse(DEFAULTS, DocumentFormat::Toml, "<defaults>")
}

/// Looks up a built-in preset by name (without the `builtin/` prefix).
#[must_use]
pub fn builtin(name: &str) -> Option<Result<ConfigDocument, ConfigError>> {
    BUILTINS
        .iter()
        .find(|(n, _)| *n == name)
        .map(|(n, text)| ConfigDocument::parse(text, DocumentFormat::Toml, &format!("builtin/{n}")))
}

/// Names of all built-in presets.
#[must_use]
pub fn builtin_names() -> Vec<&'static str> {
    BUILTINS.iter().map(|(name, _)| *name).collect()
}

/// Lists built-in presets with their descriptions.
#[must_use]
pub fn list_builtin_presets() -> Vec<PresetInfo> {
    BUILTINS
        .iter()
        .map(|(name, text)| {
            let description = ConfigDocument::parse(text, DocumentFormat::Toml, name)
                .ok()
                .and_then(|doc| doc.description)
                .unwrap_or_default();
            PresetInfo {
                reference: format!("builtin/{name}"),
                description,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::model::{RuleKind, RuleSpec};

    #[test]
    fn defaults_parse() {
        let doc = defaults().unwrap();
        assert_eq!(doc.version, Some(1));
        assert_eq!(doc.include, Some(vec!["src/**".to_string()]));
        assert!(doc.custom_rules().is_empty());
    }

    #[test]
    fn every_builtin_parses_and_compiles() {
        for name in builtin_names() {
            let doc = builtin(name).unwrap().unwrap();
            assert_eq!(doc.name.as_deref(), Some(name));
            assert!(doc.description.is_some(), "{name} has no description");
            for rule in doc.custom_rules() {
                let spec = RuleSpec::compile(rule).unwrap();
                assert!(!matches!(spec.kind, RuleKind::Unsupported { .. }));
            }
        }
    }

    #[test]
    fn clean_architecture_layers_keep_declaration_order() {
        let doc = builtin("clean-architecture").unwrap().unwrap();
        let spec = RuleSpec::compile(&doc.custom_rules()[0]).unwrap();
        let RuleKind::ImportBoundary(boundary) = spec.kind else {
            panic!("wrong kind");
        };
        let names: Vec<_> = boundary.layers.iter().map(|l| l.name.as_str()).collect();
        assert_eq!(names, ["domain", "application", "infrastructure", "presentation"]);
    }

    #[test]
    fn unknown_builtin_is_none() {
        assert!(builtin("react").is_none());
    }

    #[test]
    fn listing_uses_builtin_prefix() {
        let listed = list_builtin_presets();
        assert_eq!(listed.len(), builtin_names().len());
        assert!(listed.iter().all(|p| p.reference.starts_with("builtin/")));
        assert!(listed.iter().all(|p| !p.description.is_empty()));
    }
}
