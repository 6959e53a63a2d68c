//! Content checks for `file-content` rules.
//!
//! # Detected Patterns
//!
//! - a file in which `must_match` finds nothing (`CNT001`, whole file)
//! - a file in which `must_not_match` finds something (`CNT001`, line of
//!   the first match)

use struct_lint_core::config::FileContentSpec;
use struct_lint_core::{line_at, match_files, Location, ProjectPath, Violation};

use crate::context::CheckContext;

/// Code for a content violation.
pub const CODE: &str = "CNT001";

/// Checks required and banned content in every matching file.
#[must_use]
pub fn check_file_content(spec: &FileContentSpec, ctx: &CheckContext<'_>) -> Vec<Violation> {
    let files = match_files(&spec.files, ctx.fs, &ctx.ignore);
    ctx.map_files(&files, |file| check_file(spec, ctx, file))
}

fn check_file(spec: &FileContentSpec, ctx: &CheckContext<'_>, file: &ProjectPath) -> Vec<Violation> {
    let Some(content) = ctx.read(file) else {
        return Vec::new();
    };

    let mut violations = Vec::new();
    if let Some(required) = &spec.must_match {
        if !required.is_match(&content) {
            violations.push(ctx.violation(
                CODE,
                Location::file(file.clone()),
                &format!("file does not contain a match for `{}`", required.as_str()),
            ));
        }
    }
    if let Some(banned) = &spec.must_not_match {
        if let Some(found) = banned.find(&content) {
            violations.push(
                ctx.violation(
                    CODE,
                    Location::line(file.clone(), line_at(&content, found.start())),
                    &format!("file contains a match for `{}`", banned.as_str()),
                )
                .with_context(format!("found `{}`", found.as_str().trim())),
            );
        }
    }
    violations
}
