//! Import specifier resolution.
//!
//! Only relative specifiers (`./x`, `../x`) are resolved. Everything else is
//! an external package and is classified without touching the filesystem.

use serde::Serialize;

use crate::fs::ProjectFs;
use crate::imports::ImportEdge;
use crate::path::ProjectPath;

/// Source extensions tried, in order, when a specifier has none.
pub const SOURCE_EXTENSIONS: &[&str] = &[".ts", ".tsx", ".js", ".jsx", ".mjs", ".cjs"];

/// Where a specifier points.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(tag = "type", content = "path", rename_all = "kebab-case")]
pub enum ImportTarget {
    /// An in-project file.
    File(ProjectPath),
    /// A bare specifier (package, alias, builtin).
    External,
    /// A relative specifier that matched no file.
    Unresolved,
}

impl ImportTarget {
    /// Returns the resolved file, if any.
    #[must_use]
    pub fn file(&self) -> Option<&ProjectPath> {
        match self {
            Self::File(path) => Some(path),
            Self::External | Self::Unresolved => None,
        }
    }
}

/// An edge paired with its resolution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedImport {
    /// The extracted edge.
    pub edge: ImportEdge,
    /// Where it points.
    pub target: ImportTarget,
}

/// Whether a specifier is relative to the importing file.
#[must_use]
pub fn is_relative(specifier: &str) -> bool {
    specifier.starts_with("./") || specifier.starts_with("../")
}

/// Resolves `specifier` as written in `importing_file`.
///
/// Tries, in order: the exact path, the path plus each of
/// [`SOURCE_EXTENSIONS`], and `index` plus each extension inside the path as
/// a directory. The first existing file wins.
#[must_use]
pub fn resolve(specifier: &str, importing_file: &ProjectPath, fs: &dyn ProjectFs) -> ImportTarget {
    if !is_relative(specifier) {
        return ImportTarget::External;
    }

    let Some(candidate) = importing_file.parent().join_relative(specifier) else {
        return ImportTarget::Unresolved;
    };
    if candidate.is_root() {
        return ImportTarget::Unresolved;
    }

    if fs.is_file(&candidate) {
        return ImportTarget::File(candidate);
    }

    let with_ext = SOURCE_EXTENSIONS
        .iter()
        .map(|ext| candidate.parent().join(&format!("{}{ext}", candidate.file_name())));
    let index = SOURCE_EXTENSIONS
        .iter()
        .map(|ext| candidate.join(&format!("index{ext}")));

    with_ext
        .chain(index)
        .find(|path| fs.is_file(path))
        .map_or(ImportTarget::Unresolved, ImportTarget::File)
}

/// Resolves an extracted edge.
#[must_use]
pub fn resolve_edge(edge: ImportEdge, importing_file: &ProjectPath, fs: &dyn ProjectFs) -> ResolvedImport {
    let target = resolve(&edge.specifier, importing_file, fs);
    ResolvedImport { edge, target }
}
