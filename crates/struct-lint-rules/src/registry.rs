//! Catalogue of rule kinds and the codes they emit.

use serde::Serialize;
use struct_lint_core::config::{
    KIND_DIRECTORY_STRUCTURE, KIND_FILE_CONTENT, KIND_FORBIDDEN_IMPORT, KIND_IMPORT_BOUNDARY,
    KIND_PUBLIC_API, KIND_RELATIONSHIP,
};

use crate::{directory_structure, file_content, forbidden_import, layers, public_api, relationship};

/// Description of one rule kind.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct RuleKindInfo {
    /// Kind discriminant used in config.
    pub kind: &'static str,
    /// Violation codes the kind can produce.
    pub codes: &'static [&'static str],
    /// One-line description.
    pub description: &'static str,
}

/// Every rule kind with an executor, in documentation order.
pub const RULE_KINDS: &[RuleKindInfo] = &[
    RuleKindInfo {
        kind: KIND_IMPORT_BOUNDARY,
        codes: &[layers::CODE, layers::OVERLAP_CODE, layers::UNRESOLVED_CODE],
        description: "Layers may only import from layers they allow",
    },
    RuleKindInfo {
        kind: KIND_PUBLIC_API,
        codes: &[public_api::CODE],
        description: "Modules are imported through their barrel file only",
    },
    RuleKindInfo {
        kind: KIND_RELATIONSHIP,
        codes: &[relationship::CODE],
        description: "Files require or forbid companion files",
    },
    RuleKindInfo {
        kind: KIND_FORBIDDEN_IMPORT,
        codes: &[forbidden_import::CODE],
        description: "Banned import specifiers or targets",
    },
    RuleKindInfo {
        kind: KIND_FILE_CONTENT,
        codes: &[file_content::CODE],
        description: "Required or banned file content",
    },
    RuleKindInfo {
        kind: KIND_DIRECTORY_STRUCTURE,
        codes: &[directory_structure::CODE],
        description: "Directories contain required entries",
    },
];

/// Looks up a kind by its discriminant.
#[must_use]
pub fn kind_info(kind: &str) -> Option<&'static RuleKindInfo> {
    RULE_KINDS.iter().find(|info| info.kind == kind)
}
