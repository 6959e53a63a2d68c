//! Folding documents into one configuration.

use std::collections::BTreeMap;

use serde::Serialize;
use serde_json::Value;

use super::dto::{ConfigDocument, RuleDocument};

/// A rule document and the document that declared it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OriginRule {
    /// The winning declaration.
    pub rule: RuleDocument,
    /// Config file or preset it came from.
    pub origin: String,
}

/// The result of folding defaults, presets and the user document.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MergedConfig {
    /// Schema version.
    pub version: u32,
    /// Include patterns.
    pub include: Vec<String>,
    /// Exclude patterns.
    pub exclude: Vec<String>,
    /// Tool toggles.
    pub tools: BTreeMap<String, Value>,
    /// Integration flags.
    pub integrations: BTreeMap<String, Value>,
    /// Rules merged by id, in first-declaration order.
    pub rules: Vec<OriginRule>,
}

impl MergedConfig {
    /// Applies one document on top of the current state.
    ///
    /// Present scalar and list fields overwrite; maps overwrite per key;
    /// rules replace an earlier rule with the same id in place and are
    /// appended otherwise. Rules without an id are always appended.
    pub fn apply(&mut self, doc: &ConfigDocument, origin: &str) {
        if let Some(version) = doc.version {
            self.version = version;
        }
        if let Some(include) = &doc.include {
            self.include.clone_from(include);
        }
        if let Some(exclude) = &doc.exclude {
            self.exclude.clone_from(exclude);
        }
        if let Some(tools) = &doc.tools {
            self.tools.extend(tools.clone());
        }
        if let Some(integrations) = &doc.integrations {
            self.integrations.extend(integrations.clone());
        }

        for rule in doc.custom_rules() {
            let incoming = OriginRule {
                rule: rule.clone(),
                origin: origin.to_string(),
            };
            let existing = (!rule.id.is_empty())
                .then(|| self.rules.iter_mut().find(|r| r.rule.id == rule.id))
                .flatten();
            match existing {
                Some(slot) => *slot = incoming,
                None => self.rules.push(incoming),
            }
        }
    }

    /// Drops rules whose winning declaration is disabled.
    #[must_use]
    pub fn without_disabled(mut self) -> Self {
        self.rules.retain(|r| !r.rule.disabled);
        self
    }
}

/// Folds documents left to right.
#[must_use]
pub fn fold<'a>(documents: impl IntoIterator<Item = (&'a ConfigDocument, &'a str)>) -> MergedConfig {
    let mut merged = MergedConfig::default();
    for (doc, origin) in documents {
        merged.apply(doc, origin);
    }
    merged.without_disabled()
}
