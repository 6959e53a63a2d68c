//! File-pairing checks for `relationship` rules.
//!
//! # Rationale
//!
//! Conventions such as "every component has a test next to it" or "no
//! `.js` file next to its `.ts` twin" are relationships between files that
//! share a name.
//!
//! # Detected Patterns
//!
//! For every file matching `files`:
//!
//! - a `requires` template that expands to a missing file (`REL001`)
//! - a `forbids` template that expands to an existing file (`REL001`)
//!
//! ```toml
//! [[rules.custom]]
//! id = "component-tests"
//! kind = "relationship"
//! files = "src/components/**/*.tsx"
//! requires = ["{dir}/{stem}.test.tsx"]
//! ```

use struct_lint_core::config::RelationshipSpec;
use struct_lint_core::{match_files, Location, ProjectPath, Suggestion, Violation};
use tracing::debug;

use crate::context::CheckContext;

/// Code for a broken file relationship.
pub const CODE: &str = "REL001";

/// Checks required and forbidden companion files.
#[must_use]
pub fn check_relationship(spec: &RelationshipSpec, ctx: &CheckContext<'_>) -> Vec<Violation> {
    let files = match_files(&spec.files, ctx.fs, &ctx.ignore);
    debug!("[{}] {} subject file(s)", ctx.rule_id, files.len());
    ctx.map_files(&files, |file| check_file(spec, ctx, file))
}

fn check_file(spec: &RelationshipSpec, ctx: &CheckContext<'_>, file: &ProjectPath) -> Vec<Violation> {
    let mut violations = Vec::new();

    for template in &spec.requires {
        let Some(companion) = template.expand(file) else {
            debug!("[{}] `{template}` escapes the root for {file}", ctx.rule_id);
            continue;
        };
        if !ctx.fs.is_file(&companion) {
            violations.push(
                ctx.violation(
                    CODE,
                    Location::file(file.clone()),
                    &format!("missing required file `{companion}`"),
                )
                .with_context(format!("required by `{template}`"))
                .with_suggestion(Suggestion::new(format!("create `{companion}`"))),
            );
        }
    }

    for template in &spec.forbids {
        let Some(companion) = template.expand(file) else {
            continue;
        };
        if companion != *file && ctx.fs.is_file(&companion) {
            violations.push(
                ctx.violation(
                    CODE,
                    Location::file(file.clone()),
                    &format!("`{companion}` must not exist alongside this file"),
                )
                .with_context(format!("forbidden by `{template}`")),
            );
        }
    }

    violations
}
