//! Configuration file discovery.
//!
//! Resolution order:
//!
//! 1. explicit path (e.g. `--config`)
//! 2. `{cwd}/struct-lint.toml`, `.struct-lint.toml`, `struct-lint.json`
//! 3. no config found → defaults

use std::path::{Path, PathBuf};

/// Where the configuration was found.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    /// Explicitly requested by the caller.
    Explicit(PathBuf),
    /// Found in the working directory.
    Project(PathBuf),
    /// No config found; defaults will be used.
    Default,
}

impl ConfigSource {
    /// Returns the resolved path, if any.
    #[must_use]
    pub fn path(&self) -> Option<&Path> {
        match self {
            Self::Explicit(p) | Self::Project(p) => Some(p),
            Self::Default => None,
        }
    }
}

/// Project-level config file names, checked in order.
pub const PROJECT_CONFIG_NAMES: &[&str] = &["struct-lint.toml", ".struct-lint.toml", "struct-lint.json"];

/// Resolves the configuration file path.
///
/// An explicit path is returned as-is, relative paths joined onto `cwd`;
/// its existence is checked by the loader.
#[must_use]
pub fn locate(cwd: &Path, explicit: Option<&Path>) -> ConfigSource {
    if let Some(p) = explicit {
        return ConfigSource::Explicit(cwd.join(p));
    }

    for name in PROJECT_CONFIG_NAMES {
        let candidate = cwd.join(name);
        if candidate.is_file() {
            tracing::debug!("Found project config: {}", candidate.display());
            return ConfigSource::Project(candidate);
        }
    }

    ConfigSource::Default
}
