//! Glob-style path patterns.
//!
//! A [`Pattern`] is split into `/`-separated segments:
//!
//! - a literal segment (`src`) matches exactly one entry with that name,
//! - a wildcard segment (`*.ts`, `use-?`, `[ab]*`) matches one entry whose
//!   name satisfies the glob, never crossing a `/`,
//! - `**` matches zero or more directory levels.
//!
//! [`match_files`] walks a [`ProjectFs`] to enumerate matching files and
//! [`Pattern::matches`] tests a single path without touching the filesystem.
//! Both share the same segment semantics.

use std::collections::BTreeSet;
use std::fmt;

use glob::MatchOptions;
use tracing::trace;

use crate::fs::ProjectFs;
use crate::path::ProjectPath;

const SEGMENT_OPTIONS: MatchOptions = MatchOptions {
    case_sensitive: true,
    require_literal_separator: true,
    require_literal_leading_dot: false,
};

/// Errors from compiling a pattern.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PatternError {
    /// A segment is not a valid glob.
    #[error("invalid glob pattern `{pattern}`: {reason}")]
    InvalidGlob {
        /// The full pattern.
        pattern: String,
        /// Why the segment was rejected.
        reason: String,
    },

    /// The pattern contains a `..` segment.
    #[error("pattern `{pattern}` must not climb above the project root")]
    OutsideRoot {
        /// The full pattern.
        pattern: String,
    },
}

/// One segment of a compiled pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    /// Exact entry name.
    Literal(String),
    /// Single-level glob.
    Wildcard(glob::Pattern),
    /// `**`: zero or more directory levels.
    Recursive,
}

impl Segment {
    fn matches_name(&self, name: &str) -> bool {
        match self {
            Self::Literal(lit) => lit == name,
            Self::Wildcard(glob) => glob.matches_with(name, SEGMENT_OPTIONS),
            Self::Recursive => true,
        }
    }
}

/// A compiled path pattern.
///
/// Compiled once and reused for every match call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pattern {
    raw: String,
    segments: Vec<Segment>,
}

impl Pattern {
    /// Compiles a pattern.
    ///
    /// A leading `./` or `/` is ignored and repeated `**` segments collapse.
    /// The empty pattern compiles but matches nothing.
    ///
    /// # Errors
    ///
    /// Returns an error for invalid glob syntax or a `..` segment.
    pub fn parse(raw: &str) -> Result<Self, PatternError> {
        let mut segments = Vec::new();
        for part in raw.split('/') {
            match part {
                "" | "." => {}
                ".." => {
                    return Err(PatternError::OutsideRoot {
                        pattern: raw.to_string(),
                    })
                }
                "**" => {
                    if segments.last() != Some(&Segment::Recursive) {
                        segments.push(Segment::Recursive);
                    }
                }
                s if s.contains(['*', '?', '[']) => {
                    let glob = glob::Pattern::new(s).map_err(|e| PatternError::InvalidGlob {
                        pattern: raw.to_string(),
                        reason: e.to_string(),
                    })?;
                    segments.push(Segment::Wildcard(glob));
                }
                s => segments.push(Segment::Literal(s.to_string())),
            }
        }
        Ok(Self {
            raw: raw.to_string(),
            segments,
        })
    }

    /// Returns the pattern source text.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// Returns the compiled segments.
    #[must_use]
    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// Whether the pattern has no segments (and therefore matches nothing).
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Whether any segment is a wildcard or `**`.
    #[must_use]
    pub fn has_wildcard(&self) -> bool {
        self.segments
            .iter()
            .any(|s| !matches!(s, Segment::Literal(_)))
    }

    /// The leading literal segments, as a directory path.
    ///
    /// For `src/features/*/index.ts` this is `src/features`.
    #[must_use]
    pub fn literal_prefix(&self) -> ProjectPath {
        let mut prefix = ProjectPath::root();
        for segment in &self.segments {
            match segment {
                Segment::Literal(lit) => prefix = prefix.join(lit),
                _ => break,
            }
        }
        prefix
    }

    /// Tests a single project path against this pattern.
    ///
    /// `**` tries every split point of the remaining path, and succeeds
    /// immediately when it is the final segment.
    #[must_use]
    pub fn matches(&self, path: &ProjectPath) -> bool {
        if self.segments.is_empty() {
            return false;
        }
        let parts: Vec<&str> = path.segments().collect();
        match_segments(&self.segments, &parts)
    }

    /// Tests a raw path string (normalized first).
    #[must_use]
    pub fn matches_str(&self, path: &str) -> bool {
        ProjectPath::normalize(path).is_some_and(|p| self.matches(&p))
    }
}

impl fmt::Display for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

fn match_segments(pattern: &[Segment], path: &[&str]) -> bool {
    match pattern.split_first() {
        None => path.is_empty(),
        Some((Segment::Recursive, rest)) => {
            if rest.is_empty() {
                return true;
            }
            (0..=path.len()).any(|i| match_segments(rest, &path[i..]))
        }
        Some((segment, rest)) => match path.split_first() {
            Some((first, tail)) => segment.matches_name(first) && match_segments(rest, tail),
            None => false,
        },
    }
}

/// A compiled ignore list.
///
/// Entries containing a wildcard are matched as patterns; plain entries
/// exclude the path itself and everything rooted under it (`dist` excludes
/// `dist/app.js` but not `distant/app.js`).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IgnoreSet {
    patterns: Vec<Pattern>,
    prefixes: Vec<ProjectPath>,
}

impl IgnoreSet {
    /// An ignore list that excludes nothing.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Compiles an ignore list.
    ///
    /// # Errors
    ///
    /// Returns the first pattern compile error.
    pub fn new<I, S>(entries: I) -> Result<Self, PatternError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut set = Self::empty();
        for entry in entries {
            set.add(entry.as_ref())?;
        }
        Ok(set)
    }

    /// Adds one entry.
    ///
    /// # Errors
    ///
    /// Returns an error if a wildcard entry does not compile.
    pub fn add(&mut self, entry: &str) -> Result<(), PatternError> {
        if entry.contains(['*', '?', '[']) {
            self.patterns.push(Pattern::parse(entry)?);
        } else if let Some(prefix) = ProjectPath::normalize(entry) {
            if !prefix.is_root() {
                self.prefixes.push(prefix);
            }
        }
        Ok(())
    }

    /// Adds already compiled patterns.
    pub fn extend_patterns<'a>(&mut self, patterns: impl IntoIterator<Item = &'a Pattern>) {
        self.patterns.extend(patterns.into_iter().cloned());
    }

    /// Everything ignored by either set.
    #[must_use]
    pub fn union(&self, other: &Self) -> Self {
        let mut merged = self.clone();
        merged.patterns.extend(other.patterns.iter().cloned());
        merged.prefixes.extend(other.prefixes.iter().cloned());
        merged
    }

    /// Whether nothing is ignored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty() && self.prefixes.is_empty()
    }

    /// Whether `path` is excluded.
    #[must_use]
    pub fn is_ignored(&self, path: &ProjectPath) -> bool {
        self.prefixes.iter().any(|prefix| path.starts_with(prefix))
            || self.patterns.iter().any(|p| p.matches(path))
    }

    /// Whether every file below `dir` is excluded, so traversal can skip it.
    fn prunes_dir(&self, dir: &ProjectPath) -> bool {
        self.prefixes.iter().any(|prefix| dir.starts_with(prefix))
            || self.patterns.iter().any(|p| {
                p.segments().last() == Some(&Segment::Recursive) && p.matches(dir)
            })
    }
}

/// Enumerates files whose project path satisfies `pattern`.
///
/// Directories are never returned. Ignored paths are dropped, and ignored
/// directories are not descended into. The result is sorted and free of
/// duplicates; calling this twice on the same tree yields the same list.
#[must_use]
pub fn match_files(pattern: &Pattern, fs: &dyn ProjectFs, ignore: &IgnoreSet) -> Vec<ProjectPath> {
    let mut found = BTreeSet::new();
    walk(fs, ignore, &ProjectPath::root(), pattern.segments(), &mut found);
    trace!("{} matched {} file(s)", pattern, found.len());
    found
        .into_iter()
        .filter(|path| !ignore.is_ignored(path))
        .collect()
}

/// Enumerates directories whose project path satisfies `pattern`.
#[must_use]
pub fn match_dirs(pattern: &Pattern, fs: &dyn ProjectFs, ignore: &IgnoreSet) -> Vec<ProjectPath> {
    let mut found = BTreeSet::new();
    walk_dirs(fs, ignore, &ProjectPath::root(), pattern.segments(), &mut found);
    found
        .into_iter()
        .filter(|path| !ignore.is_ignored(path))
        .collect()
}

fn walk(
    fs: &dyn ProjectFs,
    ignore: &IgnoreSet,
    dir: &ProjectPath,
    segments: &[Segment],
    found: &mut BTreeSet<ProjectPath>,
) {
    let Some((first, rest)) = segments.split_first() else {
        return;
    };

    if matches!(first, Segment::Recursive) {
        if rest.is_empty() {
            collect_all(fs, ignore, dir, found);
            return;
        }
        // Zero levels: the remainder at this depth.
        walk(fs, ignore, dir, rest, found);
        // One or more levels: the same `**` in every subdirectory.
        for entry in fs.read_dir(dir).into_iter().filter(|e| e.is_dir) {
            let child = dir.join(&entry.name);
            if !ignore.prunes_dir(&child) {
                walk(fs, ignore, &child, segments, found);
            }
        }
        return;
    }

    for entry in fs.read_dir(dir) {
        if !first.matches_name(&entry.name) {
            continue;
        }
        let child = dir.join(&entry.name);
        if rest.is_empty() {
            if !entry.is_dir {
                found.insert(child);
            }
        } else if entry.is_dir && !ignore.prunes_dir(&child) {
            walk(fs, ignore, &child, rest, found);
        }
    }
}

fn walk_dirs(
    fs: &dyn ProjectFs,
    ignore: &IgnoreSet,
    dir: &ProjectPath,
    segments: &[Segment],
    found: &mut BTreeSet<ProjectPath>,
) {
    let Some((first, rest)) = segments.split_first() else {
        if !dir.is_root() {
            found.insert(dir.clone());
        }
        return;
    };

    if matches!(first, Segment::Recursive) {
        walk_dirs(fs, ignore, dir, rest, found);
        for entry in fs.read_dir(dir).into_iter().filter(|e| e.is_dir) {
            let child = dir.join(&entry.name);
            if !ignore.prunes_dir(&child) {
                walk_dirs(fs, ignore, &child, segments, found);
            }
        }
        return;
    }

    for entry in fs.read_dir(dir).into_iter().filter(|e| e.is_dir) {
        if first.matches_name(&entry.name) {
            let child = dir.join(&entry.name);
            if !ignore.prunes_dir(&child) {
                walk_dirs(fs, ignore, &child, rest, found);
            }
        }
    }
}

fn collect_all(
    fs: &dyn ProjectFs,
    ignore: &IgnoreSet,
    dir: &ProjectPath,
    found: &mut BTreeSet<ProjectPath>,
) {
    for entry in fs.read_dir(dir) {
        let child = dir.join(&entry.name);
        if entry.is_dir {
            if !ignore.prunes_dir(&child) {
                collect_all(fs, ignore, &child, found);
            }
        } else {
            found.insert(child);
        }
    }
}
