//! Public-API validator for `public-api` rules.
//!
//! # Rationale
//!
//! A module directory (e.g. `src/features/auth`) exposes its API through a
//! barrel file (`index.ts`). Reaching past the barrel into internal files
//! couples callers to the module's layout.
//!
//! # Detected Patterns
//!
//! - a relative import resolving to a file inside a module root other than
//!   `<root>/<barrel>` or `<root>/index.<ext>` (`API001`)
//!
//! Imports between files of the same module are allowed unless
//! `allow_same_module = false`. A barrel may always import its own module.

use std::collections::BTreeSet;

use struct_lint_core::config::PublicApiSpec;
use struct_lint_core::{
    extract_imports, is_relative, match_dirs, match_files, resolve_edge, IgnoreSet, Location,
    Pattern, ProjectFs, ProjectPath, Segment, Suggestion, Violation, SOURCE_EXTENSIONS,
};
use tracing::debug;

use crate::context::CheckContext;

/// Code for an import that bypasses a module's barrel file.
pub const CODE: &str = "API001";

/// Checks that module internals are only reached through their barrel.
#[must_use]
pub fn check_public_api(spec: &PublicApiSpec, ctx: &CheckContext<'_>) -> Vec<Violation> {
    let roots = module_roots(&spec.modules, ctx.fs, &ctx.ignore);
    if roots.is_empty() {
        debug!("[{}] no module roots match {}", ctx.rule_id, spec.modules);
        return Vec::new();
    }

    let files = ctx.select_files(spec.files.as_ref());
    debug!(
        "[{}] {} module root(s), {} file(s) to scan",
        ctx.rule_id,
        roots.len(),
        files.len()
    );
    ctx.map_files(&files, |file| check_file(spec, &roots, ctx, file))
}

/// Discovers module root directories for a module pattern.
///
/// A pattern made of literal directories followed by a single wildcard
/// segment (`src/features/*`) lists the matching directories directly.
/// Anything else is expanded to `<pattern>/**`; each file found contributes
/// the shortest leading path that satisfies the pattern. The result is
/// sorted and free of duplicates.
#[must_use]
pub fn module_roots(pattern: &Pattern, fs: &dyn ProjectFs, ignore: &IgnoreSet) -> Vec<ProjectPath> {
    let simple = match pattern.segments().split_last() {
        Some((Segment::Wildcard(_), parents)) => {
            parents.iter().all(|s| matches!(s, Segment::Literal(_)))
        }
        _ => !pattern.has_wildcard(),
    };
    if simple {
        return match_dirs(pattern, fs, ignore);
    }

    let Ok(expanded) = Pattern::parse(&format!("{}/**", pattern.as_str())) else {
        return Vec::new();
    };
    let mut roots = BTreeSet::new();
    for file in match_files(&expanded, fs, ignore) {
        let segments: Vec<&str> = file.segments().collect();
        let shortest = (1..segments.len())
            .filter_map(|n| ProjectPath::normalize(&segments[..n].join("/")))
            .find(|prefix| pattern.matches(prefix));
        if let Some(root) = shortest {
            roots.insert(root);
        }
    }
    roots.into_iter().collect()
}

/// The innermost module root containing `path`.
fn module_of<'r>(roots: &'r [ProjectPath], path: &ProjectPath) -> Option<&'r ProjectPath> {
    roots
        .iter()
        .filter(|root| path.starts_with(root) && *root != path)
        .max_by_key(|root| root.as_str().len())
}

fn is_barrel(target: &ProjectPath, root: &ProjectPath, barrel: &str) -> bool {
    if target.parent() != *root {
        return false;
    }
    let name = target.file_name();
    name == barrel
        || SOURCE_EXTENSIONS
            .iter()
            .any(|ext| name.strip_prefix("index") == Some(*ext))
}

fn check_file(
    spec: &PublicApiSpec,
    roots: &[ProjectPath],
    ctx: &CheckContext<'_>,
    file: &ProjectPath,
) -> Vec<Violation> {
    let Some(content) = ctx.read(file) else {
        return Vec::new();
    };
    let own_module = module_of(roots, file);

    let mut violations = Vec::new();
    for edge in extract_imports(&content, spec.extract) {
        if !is_relative(&edge.specifier) {
            continue;
        }
        let resolved = resolve_edge(edge, file, ctx.fs);
        let Some(target) = resolved.target.file() else {
            continue;
        };
        let Some(root) = module_of(roots, target) else {
            continue;
        };
        if spec.allow_same_module && own_module == Some(root) {
            continue;
        }
        if is_barrel(target, root, &spec.barrel) || is_barrel(file, root, &spec.barrel) {
            continue;
        }

        violations.push(
            ctx.violation(
                CODE,
                Location::line(file.clone(), resolved.edge.line),
                &format!(
                    "`{}` reaches into module `{root}` past its public API",
                    resolved.edge.specifier
                ),
            )
            .with_context(format!("resolved to {target}"))
            .with_suggestion(Suggestion::new(format!(
                "import from `{}` instead",
                root.join(&spec.barrel)
            ))),
        );
    }
    violations
}
