//! Compiled rule model.
//!
//! Everything here is validated: patterns and regexes are compiled, layer
//! references are checked and templates are parsed. Executors consume these
//! types directly.

use std::collections::BTreeSet;
use std::fmt;

use regex::Regex;

use crate::imports::ExtractOptions;
use crate::path::ProjectPath;
use crate::pattern::{IgnoreSet, Pattern};
use crate::types::Severity;

/// Kind discriminant for [`RuleKind::ImportBoundary`].
pub const KIND_IMPORT_BOUNDARY: &str = "import-boundary";
/// Kind discriminant for [`RuleKind::PublicApi`].
pub const KIND_PUBLIC_API: &str = "public-api";
/// Kind discriminant for [`RuleKind::Relationship`].
pub const KIND_RELATIONSHIP: &str = "relationship";
/// Kind discriminant for [`RuleKind::ForbiddenImport`].
pub const KIND_FORBIDDEN_IMPORT: &str = "forbidden-import";
/// Kind discriminant for [`RuleKind::FileContent`].
pub const KIND_FILE_CONTENT: &str = "file-content";
/// Kind discriminant for [`RuleKind::DirectoryStructure`].
pub const KIND_DIRECTORY_STRUCTURE: &str = "directory-structure";

/// Every kind an executor exists for.
pub const KNOWN_KINDS: &[&str] = &[
    KIND_IMPORT_BOUNDARY,
    KIND_PUBLIC_API,
    KIND_RELATIONSHIP,
    KIND_FORBIDDEN_IMPORT,
    KIND_FILE_CONTENT,
    KIND_DIRECTORY_STRUCTURE,
];

/// A compiled custom rule.
#[derive(Debug, Clone)]
pub struct RuleSpec {
    /// Unique id.
    pub id: String,
    /// Severity of produced violations.
    pub severity: Severity,
    /// Paths this rule never reports on.
    pub exclude: IgnoreSet,
    /// Optional message prefix.
    pub message: Option<String>,
    /// Kind-specific payload.
    pub kind: RuleKind,
}

/// Closed set of rule kinds.
#[derive(Debug, Clone)]
pub enum RuleKind {
    /// Architectural layers with an import allow-list.
    ImportBoundary(ImportBoundarySpec),
    /// Modules reachable only through their barrel file.
    PublicApi(PublicApiSpec),
    /// Files that require or forbid sibling files.
    Relationship(RelationshipSpec),
    /// Banned import specifiers or targets.
    ForbiddenImport(ForbiddenImportSpec),
    /// Required or banned file content.
    FileContent(FileContentSpec),
    /// Required entries inside matching directories.
    DirectoryStructure(DirectoryStructureSpec),
    /// A kind no executor handles; skipped at run time.
    Unsupported {
        /// The kind as written.
        kind: String,
    },
}

impl RuleKind {
    /// The discriminant string as written in config.
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Self::ImportBoundary(_) => KIND_IMPORT_BOUNDARY,
            Self::PublicApi(_) => KIND_PUBLIC_API,
            Self::Relationship(_) => KIND_RELATIONSHIP,
            Self::ForbiddenImport(_) => KIND_FORBIDDEN_IMPORT,
            Self::FileContent(_) => KIND_FILE_CONTENT,
            Self::DirectoryStructure(_) => KIND_DIRECTORY_STRUCTURE,
            Self::Unsupported { kind } => kind,
        }
    }
}

/// A named architectural layer.
#[derive(Debug, Clone)]
pub struct Layer {
    /// Layer name, unique within its rule.
    pub name: String,
    /// Files belonging to the layer.
    pub membership: Pattern,
    /// Other layers this one may import from.
    pub allowed_layers: BTreeSet<String>,
}

impl Layer {
    /// Whether files in this layer may import files in `target`.
    #[must_use]
    pub fn may_import(&self, target: &str) -> bool {
        self.name == target || self.allowed_layers.contains(target)
    }
}

/// `import-boundary` payload.
#[derive(Debug, Clone)]
pub struct ImportBoundarySpec {
    /// Layers in declaration order; order decides overlap ownership.
    pub layers: Vec<Layer>,
    /// Edge kinds to check.
    pub extract: ExtractOptions,
    /// Report relative imports that resolve to no file.
    pub report_unresolved: bool,
}

/// `public-api` payload.
#[derive(Debug, Clone)]
pub struct PublicApiSpec {
    /// Module-root pattern, e.g. `src/features/*`.
    pub modules: Pattern,
    /// Files to scan; the effective `include` when absent.
    pub files: Option<Pattern>,
    /// Barrel file name inside each module root.
    pub barrel: String,
    /// Skip imports between files of the same module.
    pub allow_same_module: bool,
    /// Edge kinds to check.
    pub extract: ExtractOptions,
}

/// `relationship` payload.
#[derive(Debug, Clone)]
pub struct RelationshipSpec {
    /// Files the relationship applies to.
    pub files: Pattern,
    /// Templates that must exist.
    pub requires: Vec<PathTemplate>,
    /// Templates that must not exist.
    pub forbids: Vec<PathTemplate>,
}

/// `forbidden-import` payload.
#[derive(Debug, Clone)]
pub struct ForbiddenImportSpec {
    /// Files to scan.
    pub files: Pattern,
    /// Regexes tested against the raw specifier.
    pub deny: Vec<Regex>,
    /// Patterns tested against the resolved target.
    pub deny_paths: Vec<Pattern>,
    /// Edge kinds to check.
    pub extract: ExtractOptions,
}

/// `file-content` payload.
#[derive(Debug, Clone)]
pub struct FileContentSpec {
    /// Files to scan.
    pub files: Pattern,
    /// Must match somewhere in the file.
    pub must_match: Option<Regex>,
    /// Must match nowhere in the file.
    pub must_not_match: Option<Regex>,
}

/// `directory-structure` payload.
#[derive(Debug, Clone)]
pub struct DirectoryStructureSpec {
    /// Directories the rule applies to.
    pub directories: Pattern,
    /// Entry names each directory must contain.
    pub required: Vec<String>,
}

/// Placeholder inside a [`PathTemplate`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placeholder {
    /// Directory of the subject file.
    Dir,
    /// File name.
    Name,
    /// File name up to the first dot.
    Stem,
    /// File name after the first dot.
    Ext,
}

impl Placeholder {
    fn from_name(name: &str) -> Option<Self> {
        match name {
            "dir" => Some(Self::Dir),
            "name" => Some(Self::Name),
            "stem" => Some(Self::Stem),
            "ext" => Some(Self::Ext),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum TemplatePart {
    Text(String),
    Var(Placeholder),
}

/// A path derived from a subject file, e.g. `{dir}/{stem}.test.{ext}`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathTemplate {
    raw: String,
    parts: Vec<TemplatePart>,
}

impl PathTemplate {
    /// Parses a template.
    ///
    /// # Errors
    ///
    /// Returns a reason string for unknown placeholders or unbalanced braces.
    pub fn parse(raw: &str) -> Result<Self, String> {
        let mut parts = Vec::new();
        let mut rest = raw;
        while let Some(open) = rest.find(['{', '}']) {
            if rest.as_bytes()[open] == b'}' {
                return Err("unmatched `}`".to_string());
            }
            if open > 0 {
                parts.push(TemplatePart::Text(rest[..open].to_string()));
            }
            let after = &rest[open + 1..];
            let close = after.find('}').ok_or_else(|| "unclosed `{`".to_string())?;
            let name = &after[..close];
            let var = Placeholder::from_name(name).ok_or_else(|| {
                format!("unknown placeholder `{{{name}}}`, expected one of {{dir}}, {{name}}, {{stem}}, {{ext}}")
            })?;
            parts.push(TemplatePart::Var(var));
            rest = &after[close + 1..];
        }
        if !rest.is_empty() {
            parts.push(TemplatePart::Text(rest.to_string()));
        }
        if parts.is_empty() {
            return Err("template is empty".to_string());
        }
        Ok(Self {
            raw: raw.to_string(),
            parts,
        })
    }

    /// The template as written.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// Expands the template for `subject`.
    ///
    /// Returns `None` if the result escapes the project root.
    #[must_use]
    pub fn expand(&self, subject: &ProjectPath) -> Option<ProjectPath> {
        let name = subject.file_name();
        let (stem, ext) = name.split_once('.').unwrap_or((name, ""));
        let dir = subject.parent();

        let mut out = String::new();
        for part in &self.parts {
            match part {
                TemplatePart::Text(text) => out.push_str(text),
                TemplatePart::Var(Placeholder::Dir) => out.push_str(dir.as_str()),
                TemplatePart::Var(Placeholder::Name) => out.push_str(name),
                TemplatePart::Var(Placeholder::Stem) => out.push_str(stem),
                TemplatePart::Var(Placeholder::Ext) => out.push_str(ext),
            }
        }
        ProjectPath::normalize(&out).filter(|p| !p.is_root())
    }
}

impl fmt::Display for PathTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}
