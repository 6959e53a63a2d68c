//! # struct-lint-rules
//!
//! Rule executors and the dispatcher for struct-lint.
//!
//! Each configured rule kind has one executor. The dispatcher compiles
//! nothing itself: it takes an [`EffectiveConfig`] and runs every compiled
//! rule against a [`ProjectFs`] snapshot.
//!
//! ## Available Rule Kinds
//!
//! | Kind | Codes | Description |
//! |------|-------|-------------|
//! | `import-boundary` | LAYER001, LAYER002, LAYER003 | Layers may only import from layers they allow |
//! | `public-api` | API001 | Modules are imported through their barrel file only |
//! | `relationship` | REL001 | Files require or forbid companion files |
//! | `forbidden-import` | IMP001 | Banned import specifiers or targets |
//! | `file-content` | CNT001 | Required or banned file content |
//! | `directory-structure` | DIR001 | Directories contain required entries |
//!
//! A rule whose configuration cannot be compiled produces a single
//! `CONFIG001` violation attributed to the file that declared it.
//!
//! ## Usage
//!
//! ```ignore
//! use struct_lint_core::{load_config, DiskFs};
//! use struct_lint_rules::{run_all, ScanOptions};
//!
//! let config = load_config(&cwd, None)?;
//! let fs = DiskFs::new(&cwd);
//! let report = run_all(&config, &ScanOptions::new(&fs));
//! ```
//!
//! [`EffectiveConfig`]: struct_lint_core::EffectiveConfig
//! [`ProjectFs`]: struct_lint_core::ProjectFs

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod context;
mod directory_structure;
mod dispatch;
mod file_content;
mod forbidden_import;
mod layers;
mod public_api;
mod registry;
mod relationship;

pub use context::CheckContext;
pub use directory_structure::check_directory_structure;
pub use dispatch::{run_all, validate_custom_rules, DebugSink, RunReport, ScanOptions, CONFIG_CODE};
pub use file_content::check_file_content;
pub use forbidden_import::check_forbidden_imports;
pub use layers::{check_layers, owning_layer};
pub use public_api::{check_public_api, module_roots};
pub use registry::{kind_info, RuleKindInfo, RULE_KINDS};
pub use relationship::check_relationship;

/// Re-export core types for convenience.
pub use struct_lint_core::{Severity, Violation};
