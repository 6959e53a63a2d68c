//! Rule document → compiled [`RuleSpec`] conversion with validation.

use std::collections::BTreeSet;

use regex::Regex;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;

use crate::imports::ExtractOptions;
use crate::path::ProjectPath;
use crate::pattern::{IgnoreSet, Pattern};
use crate::types::Severity;

use super::dto::RuleDocument;
use super::error::RuleConfigError;
use super::model::{
    DirectoryStructureSpec, FileContentSpec, ForbiddenImportSpec, ImportBoundarySpec, Layer,
    PathTemplate, PublicApiSpec, RelationshipSpec, RuleKind, RuleSpec, KIND_DIRECTORY_STRUCTURE,
    KIND_FILE_CONTENT, KIND_FORBIDDEN_IMPORT, KIND_IMPORT_BOUNDARY, KIND_PUBLIC_API,
    KIND_RELATIONSHIP,
};

const DEFAULT_BARREL: &str = "index.ts";

fn yes() -> bool {
    true
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct ImportBoundaryOptions {
    #[serde(default)]
    layers: Vec<LayerOptions>,
    #[serde(default = "yes")]
    include_type_only: bool,
    #[serde(default = "yes")]
    include_dynamic: bool,
    #[serde(default = "yes")]
    include_require: bool,
    #[serde(default)]
    report_unresolved: bool,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct LayerOptions {
    name: String,
    pattern: String,
    #[serde(default, alias = "allowed_layers")]
    allowed: Vec<String>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct PublicApiOptions {
    modules: String,
    #[serde(default)]
    files: Option<String>,
    #[serde(default)]
    barrel: Option<String>,
    #[serde(default = "yes")]
    allow_same_module: bool,
    #[serde(default = "yes")]
    include_type_only: bool,
    #[serde(default = "yes")]
    include_dynamic: bool,
    #[serde(default = "yes")]
    include_require: bool,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RelationshipOptions {
    files: String,
    #[serde(default)]
    requires: Vec<String>,
    #[serde(default)]
    forbids: Vec<String>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct ForbiddenImportOptions {
    files: String,
    #[serde(default)]
    deny: Vec<String>,
    #[serde(default)]
    deny_paths: Vec<String>,
    #[serde(default = "yes")]
    include_type_only: bool,
    #[serde(default = "yes")]
    include_dynamic: bool,
    #[serde(default = "yes")]
    include_require: bool,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct FileContentOptions {
    files: String,
    #[serde(default)]
    must_match: Option<String>,
    #[serde(default)]
    must_not_match: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct DirectoryStructureOptions {
    directories: String,
    #[serde(default)]
    required: Vec<String>,
}

impl RuleSpec {
    /// Compiles a rule document.
    ///
    /// Unknown kinds compile to [`RuleKind::Unsupported`] rather than failing.
    ///
    /// # Errors
    ///
    /// Returns the first problem found in the document.
    pub fn compile(doc: &RuleDocument) -> Result<Self, RuleConfigError> {
        let id = doc.id.trim();
        if id.is_empty() {
            return Err(RuleConfigError::MissingId);
        }
        if doc.kind.trim().is_empty() {
            return Err(RuleConfigError::MissingKind { id: id.to_string() });
        }

        let severity = match &doc.severity {
            Some(raw) => raw
                .parse::<Severity>()
                .map_err(|message| RuleConfigError::InvalidSeverity {
                    id: id.to_string(),
                    message,
                })?,
            None => Severity::default(),
        };

        let exclude =
            IgnoreSet::new(&doc.exclude).map_err(|source| RuleConfigError::InvalidPattern {
                id: id.to_string(),
                field: "exclude".to_string(),
                source,
            })?;

        let kind = match doc.kind.as_str() {
            KIND_IMPORT_BOUNDARY => {
                RuleKind::ImportBoundary(convert_import_boundary(id, options(id, doc)?)?)
            }
            KIND_PUBLIC_API => RuleKind::PublicApi(convert_public_api(id, options(id, doc)?)?),
            KIND_RELATIONSHIP => {
                RuleKind::Relationship(convert_relationship(id, options(id, doc)?)?)
            }
            KIND_FORBIDDEN_IMPORT => {
                RuleKind::ForbiddenImport(convert_forbidden_import(id, options(id, doc)?)?)
            }
            KIND_FILE_CONTENT => RuleKind::FileContent(convert_file_content(id, options(id, doc)?)?),
            KIND_DIRECTORY_STRUCTURE => {
                RuleKind::DirectoryStructure(convert_directory_structure(id, options(id, doc)?)?)
            }
            other => RuleKind::Unsupported {
                kind: other.to_string(),
            },
        };

        Ok(Self {
            id: id.to_string(),
            severity,
            exclude,
            message: doc.message.clone(),
            kind,
        })
    }
}

fn options<T: DeserializeOwned>(id: &str, doc: &RuleDocument) -> Result<T, RuleConfigError> {
    let map = doc.options.clone().into_iter().collect::<serde_json::Map<_, _>>();
    serde_json::from_value(Value::Object(map)).map_err(|e| RuleConfigError::InvalidOptions {
        id: id.to_string(),
        kind: doc.kind.clone(),
        message: e.to_string(),
    })
}

fn pattern(id: &str, field: &str, raw: &str) -> Result<Pattern, RuleConfigError> {
    let compiled = Pattern::parse(raw).map_err(|source| RuleConfigError::InvalidPattern {
        id: id.to_string(),
        field: field.to_string(),
        source,
    })?;
    if compiled.is_empty() {
        return Err(empty(id, &format!("`{field}` must not be empty")));
    }
    Ok(compiled)
}

fn regex(id: &str, field: &str, raw: &str) -> Result<Regex, RuleConfigError> {
    Regex::new(raw).map_err(|e| RuleConfigError::InvalidRegex {
        id: id.to_string(),
        field: field.to_string(),
        message: e.to_string(),
    })
}

fn empty(id: &str, reason: &str) -> RuleConfigError {
    RuleConfigError::EmptyConstraint {
        id: id.to_string(),
        reason: reason.to_string(),
    }
}

fn invalid(id: &str, kind: &str, message: String) -> RuleConfigError {
    RuleConfigError::InvalidOptions {
        id: id.to_string(),
        kind: kind.to_string(),
        message,
    }
}

fn extract_options(type_only: bool, dynamic: bool, require: bool) -> ExtractOptions {
    ExtractOptions {
        include_type_only: type_only,
        include_dynamic: dynamic,
        include_require: require,
    }
}

fn convert_import_boundary(
    id: &str,
    dto: ImportBoundaryOptions,
) -> Result<ImportBoundarySpec, RuleConfigError> {
    if dto.layers.is_empty() {
        return Err(empty(id, "at least one layer must be declared"));
    }

    let mut names = BTreeSet::new();
    for layer in &dto.layers {
        if layer.name.trim().is_empty() {
            return Err(invalid(id, KIND_IMPORT_BOUNDARY, "layer name must not be empty".into()));
        }
        if !names.insert(layer.name.as_str()) {
            return Err(RuleConfigError::DuplicateLayer {
                id: id.to_string(),
                layer: layer.name.clone(),
            });
        }
    }

    let layers = dto
        .layers
        .iter()
        .enumerate()
        .map(|(i, layer)| {
            if let Some(unknown) = layer.allowed.iter().find(|a| !names.contains(a.as_str())) {
                return Err(RuleConfigError::UnknownLayer {
                    id: id.to_string(),
                    layer: layer.name.clone(),
                    reference: unknown.clone(),
                });
            }
            Ok(Layer {
                name: layer.name.clone(),
                membership: pattern(id, &format!("layers[{i}].pattern"), &layer.pattern)?,
                allowed_layers: layer.allowed.iter().cloned().collect(),
            })
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(ImportBoundarySpec {
        layers,
        extract: extract_options(dto.include_type_only, dto.include_dynamic, dto.include_require),
        report_unresolved: dto.report_unresolved,
    })
}

fn convert_public_api(id: &str, dto: PublicApiOptions) -> Result<PublicApiSpec, RuleConfigError> {
    let barrel = dto.barrel.unwrap_or_else(|| DEFAULT_BARREL.to_string());
    if barrel.is_empty() || barrel.contains(['/', '\\']) {
        return Err(invalid(
            id,
            KIND_PUBLIC_API,
            format!("`barrel` must be a file name, got `{barrel}`"),
        ));
    }
    let files = dto
        .files
        .as_deref()
        .map(|raw| pattern(id, "files", raw))
        .transpose()?;

    Ok(PublicApiSpec {
        modules: pattern(id, "modules", &dto.modules)?,
        files,
        barrel,
        allow_same_module: dto.allow_same_module,
        extract: extract_options(dto.include_type_only, dto.include_dynamic, dto.include_require),
    })
}

fn convert_relationship(
    id: &str,
    dto: RelationshipOptions,
) -> Result<RelationshipSpec, RuleConfigError> {
    if dto.requires.is_empty() && dto.forbids.is_empty() {
        return Err(empty(id, "one of `requires` or `forbids` must be set"));
    }
    let template = |raw: &String| {
        PathTemplate::parse(raw).map_err(|reason| RuleConfigError::InvalidTemplate {
            id: id.to_string(),
            template: raw.clone(),
            reason,
        })
    };
    Ok(RelationshipSpec {
        files: pattern(id, "files", &dto.files)?,
        requires: dto.requires.iter().map(template).collect::<Result<_, _>>()?,
        forbids: dto.forbids.iter().map(template).collect::<Result<_, _>>()?,
    })
}

fn convert_forbidden_import(
    id: &str,
    dto: ForbiddenImportOptions,
) -> Result<ForbiddenImportSpec, RuleConfigError> {
    if dto.deny.is_empty() && dto.deny_paths.is_empty() {
        return Err(empty(id, "one of `deny` or `deny_paths` must be set"));
    }
    let deny = dto
        .deny
        .iter()
        .enumerate()
        .map(|(i, raw)| regex(id, &format!("deny[{i}]"), raw))
        .collect::<Result<_, _>>()?;
    let deny_paths = dto
        .deny_paths
        .iter()
        .enumerate()
        .map(|(i, raw)| pattern(id, &format!("deny_paths[{i}]"), raw))
        .collect::<Result<_, _>>()?;

    Ok(ForbiddenImportSpec {
        files: pattern(id, "files", &dto.files)?,
        deny,
        deny_paths,
        extract: extract_options(dto.include_type_only, dto.include_dynamic, dto.include_require),
    })
}

fn convert_file_content(id: &str, dto: FileContentOptions) -> Result<FileContentSpec, RuleConfigError> {
    if dto.must_match.is_none() && dto.must_not_match.is_none() {
        return Err(empty(id, "one of `must_match` or `must_not_match` must be set"));
    }
    Ok(FileContentSpec {
        files: pattern(id, "files", &dto.files)?,
        must_match: dto
            .must_match
            .as_deref()
            .map(|raw| regex(id, "must_match", raw))
            .transpose()?,
        must_not_match: dto
            .must_not_match
            .as_deref()
            .map(|raw| regex(id, "must_not_match", raw))
            .transpose()?,
    })
}

fn convert_directory_structure(
    id: &str,
    dto: DirectoryStructureOptions,
) -> Result<DirectoryStructureSpec, RuleConfigError> {
    if dto.required.is_empty() {
        return Err(empty(id, "`required` must list at least one entry"));
    }
    let required = dto
        .required
        .iter()
        .map(|entry| match ProjectPath::normalize(entry) {
            Some(p) if !p.is_root() => Ok(p.as_str().to_string()),
            _ => Err(invalid(
                id,
                KIND_DIRECTORY_STRUCTURE,
                format!("required entry `{entry}` must be a relative path inside the directory"),
            )),
        })
        .collect::<Result<_, _>>()?;

    Ok(DirectoryStructureSpec {
        directories: pattern(id, "directories", &dto.directories)?,
        required,
    })
}

/// Builds a rule document from a JSON object of options.
#[cfg(test)]
fn rule_doc(id: &str, kind: &str, options: Value) -> RuleDocument {
    let options: std::collections::BTreeMap<String, Value> = match options {
        Value::Object(map) => map.into_iter().collect(),
        _ => std::collections::BTreeMap::new(),
    };
    RuleDocument {
        id: id.to_string(),
        kind: kind.to_string(),
        options,
        ..RuleDocument::default()
    }
}
