//! Layer validator for `import-boundary` rules.
//!
//! # Rationale
//!
//! Layered architectures only work when dependencies point one way. Each
//! layer declares which other layers it may import from; importing from its
//! own layer is always allowed.
//!
//! # Detected Patterns
//!
//! - a relative import whose target file belongs to a layer the importer's
//!   layer does not allow (`LAYER001`)
//! - a file claimed by more than one layer; the first declared layer owns it
//!   (`LAYER002`, warning)
//! - a relative import that resolves to no file, when `report_unresolved`
//!   is set (`LAYER003`, warning)
//!
//! Bare specifiers (packages) and targets outside every layer are ignored.

use std::collections::BTreeMap;

use struct_lint_core::config::{ImportBoundarySpec, Layer};
use struct_lint_core::{
    extract_imports, is_relative, match_files, resolve_edge, ImportTarget, Location, ProjectPath,
    Suggestion, Violation,
};
use tracing::debug;

use crate::context::CheckContext;

/// Code for a forbidden cross-layer import.
pub const CODE: &str = "LAYER001";

/// Code for a file claimed by several layers.
pub const OVERLAP_CODE: &str = "LAYER002";

/// Code for a relative import that resolves to nothing.
pub const UNRESOLVED_CODE: &str = "LAYER003";

/// File → indices of every layer whose pattern claims it, in declaration order.
type Claims = BTreeMap<ProjectPath, Vec<usize>>;

/// Checks every layer member's relative imports against the allow-lists.
#[must_use]
pub fn check_layers(spec: &ImportBoundarySpec, ctx: &CheckContext<'_>) -> Vec<Violation> {
    let claims = claim_files(&spec.layers, ctx);
    debug!(
        "[{}] {} file(s) across {} layer(s)",
        ctx.rule_id,
        claims.len(),
        spec.layers.len()
    );

    let mut violations = overlap_violations(&spec.layers, &claims, ctx);

    let members: Vec<(&ProjectPath, &Layer)> = claims
        .iter()
        .filter_map(|(file, owners)| owners.first().map(|&i| (file, &spec.layers[i])))
        .collect();

    violations.extend(ctx.map_files(&members, |(file, layer)| {
        check_file(spec, &claims, ctx, file, layer)
    }));
    violations
}

/// Owning layer of `file`: the first declared layer whose pattern matches.
#[must_use]
pub fn owning_layer<'s>(layers: &'s [Layer], file: &ProjectPath) -> Option<&'s Layer> {
    layers.iter().find(|layer| layer.membership.matches(file))
}

fn claim_files(layers: &[Layer], ctx: &CheckContext<'_>) -> Claims {
    let mut claims = Claims::new();
    for (index, layer) in layers.iter().enumerate() {
        for file in match_files(&layer.membership, ctx.fs, &ctx.ignore) {
            claims.entry(file).or_default().push(index);
        }
    }
    claims
}

fn overlap_violations(layers: &[Layer], claims: &Claims, ctx: &CheckContext<'_>) -> Vec<Violation> {
    claims
        .iter()
        .filter(|(_, owners)| owners.len() > 1)
        .map(|(file, owners)| {
            let names: Vec<&str> = owners.iter().map(|&i| layers[i].name.as_str()).collect();
            ctx.warning(
                OVERLAP_CODE,
                Location::file(file.clone()),
                &format!(
                    "file is claimed by layers {}; it belongs to `{}`",
                    quoted(&names),
                    names[0]
                ),
            )
            .with_suggestion(Suggestion::new(
                "narrow the layer patterns so each file belongs to exactly one layer",
            ))
        })
        .collect()
}

fn check_file(
    spec: &ImportBoundarySpec,
    claims: &Claims,
    ctx: &CheckContext<'_>,
    file: &ProjectPath,
    layer: &Layer,
) -> Vec<Violation> {
    let Some(content) = ctx.read(file) else {
        return Vec::new();
    };

    let mut violations = Vec::new();
    for edge in extract_imports(&content, spec.extract) {
        if !is_relative(&edge.specifier) {
            continue;
        }
        let resolved = resolve_edge(edge, file, ctx.fs);
        let location = Location::line(file.clone(), resolved.edge.line);

        match &resolved.target {
            ImportTarget::File(target) => {
                let Some(target_layer) = claims
                    .get(target)
                    .and_then(|owners| owners.first())
                    .map(|&i| &spec.layers[i])
                else {
                    continue;
                };
                if layer.may_import(&target_layer.name) {
                    continue;
                }
                violations.push(
                    ctx.violation(
                        CODE,
                        location,
                        &format!(
                            "layer `{}` must not import from layer `{}` (`{}`); {}",
                            layer.name,
                            target_layer.name,
                            resolved.edge.specifier,
                            allowed_description(layer)
                        ),
                    )
                    .with_context(format!("resolved to {target}"))
                    .with_suggestion(Suggestion::new(format!(
                        "move the shared code into a layer `{}` may depend on, or allow `{}` in its configuration",
                        layer.name, target_layer.name
                    ))),
                );
            }
            ImportTarget::Unresolved if spec.report_unresolved => {
                violations.push(ctx.warning(
                    UNRESOLVED_CODE,
                    location,
                    &format!(
                        "import `{}` does not resolve to a file",
                        resolved.edge.specifier
                    ),
                ));
            }
            ImportTarget::Unresolved | ImportTarget::External => {}
        }
    }
    violations
}

fn allowed_description(layer: &Layer) -> String {
    if layer.allowed_layers.is_empty() {
        return "it may only import from itself".to_string();
    }
    let names: Vec<&str> = layer.allowed_layers.iter().map(String::as_str).collect();
    format!("allowed: {}", quoted(&names))
}

fn quoted(names: &[&str]) -> String {
    names
        .iter()
        .map(|n| format!("`{n}`"))
        .collect::<Vec<_>>()
        .join(", ")
}
