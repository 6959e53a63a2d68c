//! Project-relative paths.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

/// A path relative to the project root.
///
/// Always uses `/` as separator, never starts with `/`, and contains no
/// `.` or `..` segments. The empty path denotes the project root itself.
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProjectPath(String);

impl ProjectPath {
    /// The project root.
    #[must_use]
    pub fn root() -> Self {
        Self(String::new())
    }

    /// Normalizes a relative path string.
    ///
    /// Backslashes are treated as separators, empty and `.` segments are
    /// dropped and `..` pops the previous segment. Returns `None` when the
    /// path would climb above the root.
    #[must_use]
    pub fn normalize(raw: &str) -> Option<Self> {
        let mut parts: Vec<&str> = Vec::new();
        for segment in raw.split(['/', '\\']) {
            match segment {
                "" | "." => {}
                ".." => {
                    parts.pop()?;
                }
                s => parts.push(s),
            }
        }
        Some(Self(parts.join("/")))
    }

    /// Converts a host path below `root` into a project path.
    #[must_use]
    pub fn from_host(path: &Path, root: &Path) -> Option<Self> {
        let rel = path.strip_prefix(root).ok()?;
        Self::normalize(&rel.to_string_lossy())
    }

    /// Returns the path as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns true for the project root.
    #[must_use]
    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }

    /// Appends a single entry name.
    #[must_use]
    pub fn join(&self, name: &str) -> Self {
        if self.0.is_empty() {
            Self(name.to_string())
        } else {
            Self(format!("{}/{name}", self.0))
        }
    }

    /// Appends a relative path, normalizing `.` and `..`.
    #[must_use]
    pub fn join_relative(&self, rel: &str) -> Option<Self> {
        if self.0.is_empty() {
            Self::normalize(rel)
        } else {
            Self::normalize(&format!("{}/{rel}", self.0))
        }
    }

    /// Returns the containing directory (root for top-level entries).
    #[must_use]
    pub fn parent(&self) -> Self {
        match self.0.rfind('/') {
            Some(idx) => Self(self.0[..idx].to_string()),
            None => Self::root(),
        }
    }

    /// Returns the last segment.
    #[must_use]
    pub fn file_name(&self) -> &str {
        self.0.rsplit('/').next().unwrap_or(&self.0)
    }

    /// Iterates over path segments.
    pub fn segments(&self) -> impl Iterator<Item = &str> {
        self.0.split('/').filter(|s| !s.is_empty())
    }

    /// Whether this path equals `dir` or lies below it.
    #[must_use]
    pub fn starts_with(&self, dir: &ProjectPath) -> bool {
        if dir.is_root() {
            return true;
        }
        self.0 == dir.0
            || (self.0.starts_with(&dir.0) && self.0.as_bytes().get(dir.0.len()) == Some(&b'/'))
    }
}

impl fmt::Display for ProjectPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            write!(f, ".")
        } else {
            write!(f, "{}", self.0)
        }
    }
}

impl AsRef<str> for ProjectPath {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
