//! Required entries for `directory-structure` rules.
//!
//! # Detected Patterns
//!
//! - a directory matching `directories` that lacks one of the `required`
//!   entries, file or directory (`DIR001`)
//!
//! ```toml
//! [[rules.custom]]
//! id = "feature-layout"
//! kind = "directory-structure"
//! directories = "src/features/*"
//! required = ["index.ts", "components"]
//! ```

use struct_lint_core::config::DirectoryStructureSpec;
use struct_lint_core::{match_dirs, Location, ProjectPath, Suggestion, Violation};
use tracing::debug;

use crate::context::CheckContext;

/// Code for a missing required entry.
pub const CODE: &str = "DIR001";

/// Checks every matching directory for its required entries.
#[must_use]
pub fn check_directory_structure(
    spec: &DirectoryStructureSpec,
    ctx: &CheckContext<'_>,
) -> Vec<Violation> {
    let dirs = match_dirs(&spec.directories, ctx.fs, &ctx.ignore);
    debug!("[{}] {} matching directories", ctx.rule_id, dirs.len());
    ctx.map_files(&dirs, |dir| check_dir(spec, ctx, dir))
}

fn check_dir(spec: &DirectoryStructureSpec, ctx: &CheckContext<'_>, dir: &ProjectPath) -> Vec<Violation> {
    spec.required
        .iter()
        .filter_map(|entry| {
            let path = dir.join_relative(entry)?;
            if ctx.fs.is_file(&path) || ctx.fs.is_dir(&path) {
                return None;
            }
            Some(
                ctx.violation(
                    CODE,
                    Location::file(dir.clone()),
                    &format!("directory is missing required entry `{entry}`"),
                )
                .with_suggestion(Suggestion::new(format!("create `{path}`"))),
            )
        })
        .collect()
}
