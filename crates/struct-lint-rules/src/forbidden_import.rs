//! Banned imports for `forbidden-import` rules.
//!
//! # Rationale
//!
//! Some dependencies should never appear in part of a tree: server-only
//! packages in client code, test helpers in production code, deep imports
//! into another package's `dist/`.
//!
//! # Detected Patterns
//!
//! - an import whose raw specifier matches a `deny` regex (`IMP001`)
//! - a relative import whose resolved file matches a `deny_paths` pattern
//!   (`IMP001`)
//!
//! ```toml
//! [[rules.custom]]
//! id = "no-server-in-client"
//! kind = "forbidden-import"
//! files = "src/client/**"
//! deny = ["^node:", "^fs$"]
//! deny_paths = ["src/server/**"]
//! ```

use struct_lint_core::config::ForbiddenImportSpec;
use struct_lint_core::{
    extract_imports, is_relative, match_files, resolve_edge, Location, ProjectPath, Violation,
};
use tracing::debug;

use crate::context::CheckContext;

/// Code for a banned import.
pub const CODE: &str = "IMP001";

/// Checks every matching file for banned specifiers and targets.
#[must_use]
pub fn check_forbidden_imports(spec: &ForbiddenImportSpec, ctx: &CheckContext<'_>) -> Vec<Violation> {
    let files = match_files(&spec.files, ctx.fs, &ctx.ignore);
    debug!("[{}] scanning {} file(s)", ctx.rule_id, files.len());
    ctx.map_files(&files, |file| check_file(spec, ctx, file))
}

fn check_file(spec: &ForbiddenImportSpec, ctx: &CheckContext<'_>, file: &ProjectPath) -> Vec<Violation> {
    let Some(content) = ctx.read(file) else {
        return Vec::new();
    };

    let mut violations = Vec::new();
    for edge in extract_imports(&content, spec.extract) {
        let location = Location::line(file.clone(), edge.line);

        if let Some(regex) = spec.deny.iter().find(|re| re.is_match(&edge.specifier)) {
            violations.push(
                ctx.violation(
                    CODE,
                    location,
                    &format!("import of `{}` is forbidden", edge.specifier),
                )
                .with_context(format!("matches `{}`", regex.as_str())),
            );
            continue;
        }

        if spec.deny_paths.is_empty() || !is_relative(&edge.specifier) {
            continue;
        }
        let resolved = resolve_edge(edge, file, ctx.fs);
        let Some(target) = resolved.target.file() else {
            continue;
        };
        if let Some(pattern) = spec.deny_paths.iter().find(|p| p.matches(target)) {
            violations.push(
                ctx.violation(
                    CODE,
                    location,
                    &format!("import of `{}` is forbidden", resolved.edge.specifier),
                )
                .with_context(format!("resolved to {target}, which matches `{pattern}`")),
            );
        }
    }
    violations
}

#[cfg(test)]
mod tests {
    use super::*;
    use regex::Regex;
    use struct_lint_core::{ExtractOptions, MemoryFs, Pattern};

    fn spec(deny: &[&str], deny_paths: &[&str]) -> ForbiddenImportSpec {
        ForbiddenImportSpec {
            files: Pattern::parse("src/client/**").unwrap(),
            deny: deny.iter().map(|r| Regex::new(r).unwrap()).collect(),
            deny_paths: deny_paths.iter().map(|p| Pattern::parse(p).unwrap()).collect(),
            extract: ExtractOptions::default(),
        }
    }

    #[test]
    fn specifier_regex_is_matched() {
        let fs = MemoryFs::from_files([(
            "src/client/app.ts",
            "import fs from 'fs';\nimport path from 'node:path';\nimport React from 'react';\n",
        )]);
        let ctx = CheckContext::new("no-node", &fs);
        let violations = check_forbidden_imports(&spec(&["^fs$", "^node:"], &[]), &ctx);
        let lines: Vec<Option<usize>> = violations.iter().map(|v| v.location.line).collect();
        assert_eq!(lines, [Some(1), Some(2)]);
        assert_eq!(violations[1].context.as_deref(), Some("matches `^node:`"));
    }

    #[test]
    fn resolved_target_is_matched() {
        let fs = MemoryFs::from_files([
            ("src/client/app.ts", "import { db } from '../server/db';\nimport u from './util';\n"),
            ("src/client/util.ts", ""),
            ("src/server/db.ts", ""),
        ]);
        let ctx = CheckContext::new("no-server", &fs);
        let violations = check_forbidden_imports(&spec(&[], &["src/server/**"]), &ctx);
        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].code, CODE);
        assert_eq!(
            violations[0].context.as_deref(),
            Some("resolved to src/server/db.ts, which matches `src/server/**`")
        );
    }

    #[test]
    fn files_outside_selection_are_not_scanned() {
        let fs = MemoryFs::from_files([("src/server/db.ts", "import fs from 'fs';\n")]);
        let ctx = CheckContext::new("no-node", &fs);
        assert!(check_forbidden_imports(&spec(&["^fs$"], &[]), &ctx).is_empty());
    }
}
