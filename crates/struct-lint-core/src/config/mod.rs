//! Configuration resolution.
//!
//! A run is configured by folding, in order:
//!
//! 1. the built-in defaults,
//! 2. every preset reachable through `extends` (ancestors first),
//! 3. the project's own config document.
//!
//! Rules are then compiled once. A rule that fails to compile is kept along
//! with its error so that a run can report it without aborting.
//!
//! ```toml
//! extends = ["builtin/clean-architecture"]
//! exclude = ["dist", "**/*.gen.ts"]
//!
//! [[rules.custom]]
//! id = "component-tests"
//! kind = "relationship"
//! files = "src/components/**/*.tsx"
//! requires = ["{dir}/{stem}.test.tsx"]
//! ```

mod dto;
mod error;
mod extends;
mod loader;
mod locate;
mod merge;
mod model;
mod presets;

pub use dto::{ConfigDocument, DocumentFormat, RuleDocument, RulesSection};
pub use error::{ConfigError, RuleConfigError};
pub use extends::{
    normalize_host_path, resolve_chain, PresetKey, PresetSource, ResolvedPreset, StandardPresets,
    BUILTIN_PREFIX,
};
pub use locate::{locate, ConfigSource, PROJECT_CONFIG_NAMES};
pub use merge::{fold, MergedConfig, OriginRule};
pub use model::{
    DirectoryStructureSpec, FileContentSpec, ForbiddenImportSpec, ImportBoundarySpec, Layer,
    PathTemplate, Placeholder, PublicApiSpec, RelationshipSpec, RuleKind, RuleSpec,
    KIND_DIRECTORY_STRUCTURE, KIND_FILE_CONTENT, KIND_FORBIDDEN_IMPORT, KIND_IMPORT_BOUNDARY,
    KIND_PUBLIC_API, KIND_RELATIONSHIP, KNOWN_KINDS,
};
pub use presets::{builtin_names, list_builtin_presets, PresetInfo};

use std::collections::BTreeMap;
use std::path::Path;

use serde_json::Value;
use tracing::{debug, info, warn};

use crate::path::ProjectPath;
use crate::pattern::{IgnoreSet, Pattern};

const DEFAULTS_ORIGIN: &str = "<defaults>";

/// A custom rule after folding.
#[derive(Debug, Clone)]
pub struct ConfiguredRule {
    /// The winning declaration as written.
    pub document: RuleDocument,
    /// Config file or preset that declared it, as shown to users.
    pub origin: String,
    /// Project file to attribute configuration errors to: the declaring
    /// file when it lies inside the project, else the project's config file.
    pub origin_file: Option<ProjectPath>,
    /// The compiled rule, or why it could not be compiled.
    pub compiled: Result<RuleSpec, RuleConfigError>,
}

impl ConfiguredRule {
    /// Compiles a folded rule.
    #[must_use]
    pub fn new(document: RuleDocument, origin: String, origin_file: Option<ProjectPath>) -> Self {
        let compiled = RuleSpec::compile(&document);
        if let Err(e) = &compiled {
            warn!("{origin}: {e}");
        }
        Self {
            document,
            origin,
            origin_file,
            compiled,
        }
    }

    /// The rule id as written (may be empty for malformed rules).
    #[must_use]
    pub fn id(&self) -> &str {
        &self.document.id
    }
}

/// The fully resolved configuration for a run. Read-only once built.
#[derive(Debug, Clone)]
pub struct EffectiveConfig {
    /// Schema version.
    pub version: u32,
    /// Compiled include patterns.
    pub include: Vec<Pattern>,
    /// Exclude entries as written.
    pub exclude: Vec<String>,
    /// Compiled exclude entries.
    pub ignore: IgnoreSet,
    /// Tool toggles.
    pub tools: BTreeMap<String, Value>,
    /// Integration flags.
    pub integrations: BTreeMap<String, Value>,
    /// Rules in fold order, disabled ones removed.
    pub rules: Vec<ConfiguredRule>,
    /// Which config file was used.
    pub source: ConfigSource,
    /// Presets folded in, in fold order.
    pub presets: Vec<String>,
}

impl EffectiveConfig {
    /// Rule documents in fold order.
    #[must_use]
    pub fn rule_documents(&self) -> Vec<RuleDocument> {
        self.rules.iter().map(|r| r.document.clone()).collect()
    }

    /// Whether `path` is selected by any include pattern.
    #[must_use]
    pub fn is_included(&self, path: &ProjectPath) -> bool {
        self.include.iter().any(|p| p.matches(path)) && !self.ignore.is_ignored(path)
    }
}

/// Loads the configuration for a project rooted at `cwd`.
///
/// # Errors
///
/// Returns a [`ConfigError`] if the config file, a preset or the extends
/// graph is invalid.
pub fn load_config(cwd: &Path, explicit: Option<&Path>) -> Result<EffectiveConfig, ConfigError> {
    load_config_with(cwd, explicit, &StandardPresets)
}

/// Like [`load_config`], with presets loaded from `preset_source`.
///
/// # Errors
///
/// See [`load_config`].
pub fn load_config_with(
    cwd: &Path,
    explicit: Option<&Path>,
    preset_source: &dyn PresetSource,
) -> Result<EffectiveConfig, ConfigError> {
    let source = locate(cwd, explicit);
    let document = match &source {
        ConfigSource::Explicit(path) | ConfigSource::Project(path) => Some(read_document(path)?),
        ConfigSource::Default => {
            debug!("no config file found in {}, using defaults", cwd.display());
            None
        }
    };
    build(cwd, source, document, preset_source)
}

/// Builds the effective configuration from an already parsed user document.
///
/// # Errors
///
/// Returns a [`ConfigError`] if the extends graph or a top-level pattern is
/// invalid.
pub fn build(
    cwd: &Path,
    source: ConfigSource,
    document: Option<ConfigDocument>,
    preset_source: &dyn PresetSource,
) -> Result<EffectiveConfig, ConfigError> {
    let mut layers: Vec<(ConfigDocument, String)> = vec![(
        presets::defaults()?,
        DEFAULTS_ORIGIN.to_string(),
    )];
    let mut preset_names = Vec::new();
    let mut origin_files: BTreeMap<String, Option<ProjectPath>> = BTreeMap::new();
    let config_file = source.path().and_then(|path| project_file(path, cwd));

    if let Some(document) = document {
        let (ancestry, base_dir, origin) = match source.path() {
            Some(path) => {
                let key = PresetKey::File(normalize_host_path(path));
                let base = path.parent().unwrap_or(cwd).to_path_buf();
                (vec![key], base, display_origin(path, cwd))
            }
            None => (Vec::new(), cwd.to_path_buf(), "<config>".to_string()),
        };

        for preset in resolve_chain(&document.extends, &base_dir, preset_source, &ancestry)? {
            let (label, file) = match &preset.key {
                PresetKey::File(path) => (
                    display_origin(path, cwd),
                    project_file(path, cwd).or_else(|| config_file.clone()),
                ),
                PresetKey::Builtin(_) => (preset.key.to_string(), config_file.clone()),
            };
            origin_files.insert(label.clone(), file);
            preset_names.push(label.clone());
            layers.push((preset.document, label));
        }
        origin_files.insert(origin.clone(), config_file.clone());
        layers.push((document, origin));
    }

    let merged = fold(layers.iter().map(|(doc, origin)| (doc, origin.as_str())));
    if merged.version != 1 {
        warn!("unsupported config version {}, treating as 1", merged.version);
    }

    let include = merged
        .include
        .iter()
        .map(|raw| Pattern::parse(raw))
        .collect::<Result<Vec<_>, _>>()
        .map_err(|source| ConfigError::Pattern {
            field: "include".to_string(),
            source,
        })?;
    let ignore = IgnoreSet::new(&merged.exclude).map_err(|source| ConfigError::Pattern {
        field: "exclude".to_string(),
        source,
    })?;

    let rules: Vec<ConfiguredRule> = merged
        .rules
        .into_iter()
        .map(|r| {
            let file = origin_files.get(&r.origin).cloned().flatten();
            ConfiguredRule::new(r.rule, r.origin, file)
        })
        .collect();

    info!(
        "loaded configuration: {} preset(s), {} rule(s)",
        preset_names.len(),
        rules.len()
    );

    Ok(EffectiveConfig {
        version: merged.version,
        include,
        exclude: merged.exclude,
        ignore,
        tools: merged.tools,
        integrations: merged.integrations,
        rules,
        source,
        presets: preset_names,
    })
}

fn read_document(path: &Path) -> Result<ConfigDocument, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|source| {
        if source.kind() == std::io::ErrorKind::NotFound {
            ConfigError::NotFound {
                path: path.to_path_buf(),
            }
        } else {
            ConfigError::Io {
                path: path.to_path_buf(),
                source,
            }
        }
    })?;
    ConfigDocument::parse(
        &content,
        DocumentFormat::from_path(path),
        &path.display().to_string(),
    )
}

/// Renders a host path relative to `cwd` when it lies below it.
fn project_file(path: &Path, cwd: &Path) -> Option<ProjectPath> {
    ProjectPath::from_host(&normalize_host_path(path), &normalize_host_path(cwd))
        .filter(|p| !p.is_root())
}

fn display_origin(path: &Path, cwd: &Path) -> String {
    project_file(path, cwd).map_or_else(|| path.display().to_string(), |p| p.to_string())
}
