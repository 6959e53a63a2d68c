//! Read-only view of a project tree.
//!
//! Every component that touches the filesystem (pattern matching, import
//! extraction, resolution, rule executors) goes through [`ProjectFs`], so a
//! run sees one consistent tree and tests can substitute [`MemoryFs`].

use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::path::ProjectPath;

/// A single directory entry.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct DirEntry {
    /// Entry name (one path segment).
    pub name: String,
    /// Whether the entry is a directory.
    pub is_dir: bool,
}

/// Root-relative, read-only filesystem operations.
///
/// Failures are never surfaced: an unreadable directory lists as empty and an
/// unreadable file reads as `None`.
pub trait ProjectFs: Send + Sync {
    /// Lists `dir`, sorted by name.
    fn read_dir(&self, dir: &ProjectPath) -> Vec<DirEntry>;

    /// Reads a file as UTF-8.
    fn read_to_string(&self, path: &ProjectPath) -> Option<String>;

    /// Whether `path` is an existing regular file.
    fn is_file(&self, path: &ProjectPath) -> bool;

    /// Whether `path` is an existing directory.
    fn is_dir(&self, path: &ProjectPath) -> bool;
}

/// The real filesystem below a project root.
#[derive(Debug, Clone)]
pub struct DiskFs {
    root: PathBuf,
}

impl DiskFs {
    /// Creates a view rooted at `root`.
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Returns the host root directory.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn host_path(&self, path: &ProjectPath) -> PathBuf {
        let mut host = self.root.clone();
        for segment in path.segments() {
            host.push(segment);
        }
        host
    }
}

impl ProjectFs for DiskFs {
    fn read_dir(&self, dir: &ProjectPath) -> Vec<DirEntry> {
        let host = self.host_path(dir);
        let Ok(read) = std::fs::read_dir(&host) else {
            debug!("Unreadable directory: {}", host.display());
            return Vec::new();
        };

        let mut entries: Vec<DirEntry> = read
            .filter_map(Result::ok)
            .filter_map(|entry| {
                let name = entry.file_name().to_str()?.to_string();
                let file_type = entry.file_type().ok()?;
                if file_type.is_symlink() {
                    // Symlinked directories are not listed; linked files are.
                    let target = std::fs::metadata(entry.path()).ok()?;
                    if target.is_dir() {
                        debug!("Skipping symlinked directory: {}", entry.path().display());
                        return None;
                    }
                    return Some(DirEntry { name, is_dir: false });
                }
                Some(DirEntry {
                    name,
                    is_dir: file_type.is_dir(),
                })
            })
            .collect();
        entries.sort();
        entries
    }

    fn read_to_string(&self, path: &ProjectPath) -> Option<String> {
        std::fs::read_to_string(self.host_path(path)).ok()
    }

    fn is_file(&self, path: &ProjectPath) -> bool {
        self.host_path(path).is_file()
    }

    fn is_dir(&self, path: &ProjectPath) -> bool {
        self.host_path(path).is_dir()
    }
}

/// An in-memory project tree.
///
/// Directories are implied by the files placed below them.
#[derive(Debug, Clone, Default)]
pub struct MemoryFs {
    files: BTreeMap<ProjectPath, String>,
    dirs: BTreeSet<ProjectPath>,
}

impl MemoryFs {
    /// Creates an empty tree.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a tree from `(path, content)` pairs.
    #[must_use]
    pub fn from_files<I, P, C>(files: I) -> Self
    where
        I: IntoIterator<Item = (P, C)>,
        P: AsRef<str>,
        C: Into<String>,
    {
        let mut fs = Self::new();
        for (path, content) in files {
            fs.insert(path.as_ref(), content);
        }
        fs
    }

    /// Adds or replaces a file. Paths that climb above the root are ignored.
    pub fn insert(&mut self, path: &str, content: impl Into<String>) {
        let Some(path) = ProjectPath::normalize(path) else {
            return;
        };
        let mut dir = path.parent();
        loop {
            self.dirs.insert(dir.clone());
            if dir.is_root() {
                break;
            }
            dir = dir.parent();
        }
        self.files.insert(path, content.into());
    }
}

impl ProjectFs for MemoryFs {
    fn read_dir(&self, dir: &ProjectPath) -> Vec<DirEntry> {
        if !self.dirs.contains(dir) {
            return Vec::new();
        }
        let mut entries: BTreeSet<DirEntry> = BTreeSet::new();
        let children = self
            .files
            .keys()
            .chain(self.dirs.iter())
            .filter(|p| !p.is_root() && p.parent() == *dir);
        for child in children {
            entries.insert(DirEntry {
                name: child.file_name().to_string(),
                is_dir: self.dirs.contains(child),
            });
        }
        entries.into_iter().collect()
    }

    fn read_to_string(&self, path: &ProjectPath) -> Option<String> {
        self.files.get(path).cloned()
    }

    fn is_file(&self, path: &ProjectPath) -> bool {
        self.files.contains_key(path)
    }

    fn is_dir(&self, path: &ProjectPath) -> bool {
        self.dirs.contains(path)
    }
}
