//! # struct-lint-core
//!
//! Project model for struct-lint: everything the rule executors need to look
//! at a JavaScript/TypeScript source tree without parsing it.
//!
//! - [`ProjectPath`] and [`ProjectFs`] for root-relative, read-only file access
//! - [`Pattern`], [`IgnoreSet`] and [`match_files`] for file selection
//! - [`extract_imports`] and [`resolve`] for the import graph
//! - [`config`] for loading and folding configuration documents
//! - [`Violation`] for representing lint findings
//!
//! ## Example
//!
//! ```ignore
//! use struct_lint_core::{match_files, DiskFs, IgnoreSet, Pattern};
//!
//! let fs = DiskFs::new("./my-app");
//! let pattern = Pattern::parse("src/**/*.tsx")?;
//! for file in match_files(&pattern, &fs, &IgnoreSet::new(["node_modules"])?) {
//!     println!("{file}");
//! }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod config;
mod fs;
mod imports;
mod path;
mod pattern;
mod resolve;
mod types;

pub use config::{load_config, ConfigError, EffectiveConfig, RuleConfigError, RuleKind, RuleSpec};
pub use fs::{DirEntry, DiskFs, MemoryFs, ProjectFs};
pub use imports::{extract_imports, line_at, strip_line_comments, EdgeKind, ExtractOptions, ImportEdge};
pub use path::ProjectPath;
pub use pattern::{match_dirs, match_files, IgnoreSet, Pattern, PatternError, Segment};
pub use resolve::{is_relative, resolve, resolve_edge, ImportTarget, ResolvedImport, SOURCE_EXTENSIONS};
pub use types::{Location, Severity, Suggestion, Violation};
