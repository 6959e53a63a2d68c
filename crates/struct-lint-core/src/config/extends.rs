//! Preset inheritance.
//!
//! `extends` entries form a graph. [`resolve_chain`] walks it depth-first and
//! returns the presets in fold order: every preset appears after the presets
//! it extends. The walk carries the chain of documents currently being
//! expanded, so a reference back into that chain is reported as a cycle
//! instead of recursing forever. A preset reached through several branches
//! is emitted once, where it is first reached.

use std::collections::BTreeSet;
use std::fmt;
use std::path::{Component, Path, PathBuf};

use tracing::debug;

use super::dto::{ConfigDocument, DocumentFormat};
use super::error::ConfigError;
use super::presets;

/// Prefix of built-in preset references.
pub const BUILTIN_PREFIX: &str = "builtin/";

/// Identity of a document in the extends graph.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum PresetKey {
    /// A preset shipped with the engine.
    Builtin(String),
    /// A file on disk, lexically normalized.
    File(PathBuf),
}

impl PresetKey {
    /// Interprets an `extends` entry written in a document located in `base_dir`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::UnknownPresetNamespace`] for anything that is
    /// neither `builtin/<name>` nor a `./` or `../` path.
    pub fn parse(entry: &str, base_dir: &Path, origin: &str) -> Result<Self, ConfigError> {
        if let Some(name) = entry.strip_prefix(BUILTIN_PREFIX) {
            return Ok(Self::Builtin(name.to_string()));
        }
        if entry.starts_with("./") || entry.starts_with("../") {
            return Ok(Self::File(normalize_host_path(&base_dir.join(entry))));
        }
        Err(ConfigError::UnknownPresetNamespace {
            entry: entry.to_string(),
            origin: origin.to_string(),
        })
    }

    /// Directory relative `extends` entries of this document resolve against.
    ///
    /// Built-in presets inherit the directory of the document that referenced them.
    #[must_use]
    pub fn base_dir(&self) -> Option<&Path> {
        match self {
            Self::Builtin(_) => None,
            Self::File(path) => path.parent(),
        }
    }
}

impl fmt::Display for PresetKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Builtin(name) => write!(f, "{BUILTIN_PREFIX}{name}"),
            Self::File(path) => write!(f, "{}", path.display()),
        }
    }
}

/// Loads preset documents by key.
pub trait PresetSource {
    /// Loads the document for `key`.
    ///
    /// `origin` names the referencing document for error messages.
    ///
    /// # Errors
    ///
    /// Returns an error if the preset does not exist or cannot be parsed.
    fn load(&self, key: &PresetKey, origin: &str) -> Result<ConfigDocument, ConfigError>;
}

/// Built-in presets plus preset files on disk.
#[derive(Debug, Clone, Copy, Default)]
pub struct StandardPresets;

impl PresetSource for StandardPresets {
    fn load(&self, key: &PresetKey, origin: &str) -> Result<ConfigDocument, ConfigError> {
        match key {
            PresetKey::Builtin(name) => presets::builtin(name).ok_or_else(|| {
                ConfigError::UnknownPreset {
                    name: name.clone(),
                    origin: origin.to_string(),
                    available: presets::builtin_names().join(", "),
                }
            })?,
            PresetKey::File(path) => {
                let content = std::fs::read_to_string(path).map_err(|source| {
                    if source.kind() == std::io::ErrorKind::NotFound {
                        ConfigError::PresetNotFound {
                            path: path.clone(),
                            origin: origin.to_string(),
                        }
                    } else {
                        ConfigError::Io {
                            path: path.clone(),
                            source,
                        }
                    }
                })?;
                ConfigDocument::parse(&content, DocumentFormat::from_path(path), &key.to_string())
            }
        }
    }
}

/// A preset document together with its identity.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedPreset {
    /// Where it came from.
    pub key: PresetKey,
    /// Its content.
    pub document: ConfigDocument,
}

/// Resolves `extends` entries into fold order.
///
/// `ancestry` is the chain of documents from the root config down to the one
/// declaring `extends`; it must include that document itself. A preset
/// reached twice through different branches (a diamond) is returned only
/// the first time, so a later branch never re-applies it over overrides made
/// in between.
///
/// # Errors
///
/// Returns [`ConfigError::Cycle`] when an entry refers back into `ancestry`,
/// or any error produced by `source`.
pub fn resolve_chain(
    extends: &[String],
    base_dir: &Path,
    source: &dyn PresetSource,
    ancestry: &[PresetKey],
) -> Result<Vec<ResolvedPreset>, ConfigError> {
    let mut seen = BTreeSet::new();
    let mut resolved = Vec::new();
    walk(extends, base_dir, source, ancestry, &mut seen, &mut resolved)?;
    Ok(resolved)
}

fn walk(
    extends: &[String],
    base_dir: &Path,
    source: &dyn PresetSource,
    ancestry: &[PresetKey],
    seen: &mut BTreeSet<PresetKey>,
    resolved: &mut Vec<ResolvedPreset>,
) -> Result<(), ConfigError> {
    let origin = ancestry
        .last()
        .map_or_else(|| "<config>".to_string(), ToString::to_string);

    for entry in extends {
        let key = PresetKey::parse(entry, base_dir, &origin)?;

        if ancestry.contains(&key) {
            let chain = ancestry
                .iter()
                .skip_while(|k| **k != key)
                .chain(std::iter::once(&key))
                .map(ToString::to_string)
                .collect();
            return Err(ConfigError::Cycle { chain });
        }
        if seen.contains(&key) {
            debug!("preset {key} already resolved, skipping (from {origin})");
            continue;
        }

        debug!("resolving preset {key} (from {origin})");
        let document = source.load(&key, &origin)?;

        let mut path = ancestry.to_vec();
        path.push(key.clone());
        let nested_base = key.base_dir().unwrap_or(base_dir);
        walk(&document.extends, nested_base, source, &path, seen, resolved)?;
        seen.insert(key.clone());
        resolved.push(ResolvedPreset { key, document });
    }

    Ok(())
}

/// Removes `.` and `..` components without touching the filesystem.
#[must_use]
pub fn normalize_host_path(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if !out.pop() {
                    out.push("..");
                }
            }
            other => out.push(other.as_os_str()),
        }
    }
    out
}
