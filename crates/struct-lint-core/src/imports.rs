//! Heuristic import extraction for JavaScript/TypeScript sources.
//!
//! This is a text scanner, not a parser. Same-line `//` comments are
//! stripped before matching; block comments and comment markers inside
//! string literals are not understood and may misfire.

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

/// How a module is referenced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EdgeKind {
    /// `import … from "x"`, `import "x"` or `export … from "x"`.
    Static,
    /// `import type … from "x"` or `export type {…} from "x"`.
    TypeOnly,
    /// `import("x")`.
    Dynamic,
    /// `require("x")`.
    Require,
}

/// A module reference found in a source file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportEdge {
    /// Raw text between the quotes, unresolved.
    pub specifier: String,
    /// Line number (1-indexed).
    pub line: usize,
    /// Kind of reference.
    pub kind: EdgeKind,
}

/// Which kinds of edges to report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractOptions {
    /// Report `import type` / `export type` edges.
    pub include_type_only: bool,
    /// Report `import("x")` calls.
    pub include_dynamic: bool,
    /// Report `require("x")` calls.
    pub include_require: bool,
}

impl Default for ExtractOptions {
    fn default() -> Self {
        Self {
            include_type_only: true,
            include_dynamic: true,
            include_require: true,
        }
    }
}

static STATIC_IMPORT: LazyLock<Regex> = LazyLock::new(|| {
    compile(r#"\bimport\s+(type\s+)?(?:[^'";]*?\s*\bfrom\s*)?['"]([^'"\n]+)['"]"#)
});

static RE_EXPORT: LazyLock<Regex> = LazyLock::new(|| {
    compile(
        r#"\bexport\s+(type\s+)?(?:\*(?:\s+as\s+[\w$]+)?|\{[^}]*\})\s*from\s*['"]([^'"\n]+)['"]"#,
    )
});

static DYNAMIC_IMPORT: LazyLock<Regex> =
    LazyLock::new(|| compile(r#"\bimport\s*\(\s*['"]([^'"\n]+)['"]\s*\)"#));

static REQUIRE_CALL: LazyLock<Regex> =
    LazyLock::new(|| compile(r#"\brequire\s*\(\s*['"]([^'"\n]+)['"]\s*\)"#));

fn compile(pattern: &str) -> Regex {
    Regex::new(pattern).unwrap_or_else(|e| panic!("invalid import pattern: {e}"))
}

/// Extracts module references from source text.
///
/// Edges are returned in source order. Type-only edges are omitted
/// entirely when `options.include_type_only` is false.
#[must_use]
pub fn extract_imports(content: &str, options: ExtractOptions) -> Vec<ImportEdge> {
    let text = strip_line_comments(content);
    let mut found: Vec<(usize, ImportEdge)> = Vec::new();

    for pass in [&*STATIC_IMPORT, &*RE_EXPORT] {
        for caps in pass.captures_iter(&text) {
            let (Some(whole), Some(spec)) = (caps.get(0), caps.get(2)) else {
                continue;
            };
            let kind = if caps.get(1).is_some() {
                EdgeKind::TypeOnly
            } else {
                EdgeKind::Static
            };
            if kind == EdgeKind::TypeOnly && !options.include_type_only {
                continue;
            }
            found.push((whole.start(), edge(&text, whole.start(), spec.as_str(), kind)));
        }
    }

    let calls = [
        (options.include_dynamic, &*DYNAMIC_IMPORT, EdgeKind::Dynamic),
        (options.include_require, &*REQUIRE_CALL, EdgeKind::Require),
    ];
    for (enabled, pass, kind) in calls {
        if !enabled {
            continue;
        }
        for caps in pass.captures_iter(&text) {
            let (Some(whole), Some(spec)) = (caps.get(0), caps.get(1)) else {
                continue;
            };
            found.push((whole.start(), edge(&text, whole.start(), spec.as_str(), kind)));
        }
    }

    found.sort_by_key(|(offset, _)| *offset);
    found.into_iter().map(|(_, edge)| edge).collect()
}

fn edge(text: &str, offset: usize, specifier: &str, kind: EdgeKind) -> ImportEdge {
    ImportEdge {
        specifier: specifier.to_string(),
        line: line_at(text, offset),
        kind,
    }
}

/// 1-indexed line of a byte offset.
#[must_use]
pub fn line_at(text: &str, offset: usize) -> usize {
    text.as_bytes()[..offset.min(text.len())]
        .iter()
        .filter(|&&b| b == b'\n')
        .count()
        + 1
}

/// Removes `//` comments running to the end of a line.
///
/// Line breaks are preserved so offsets map to the same line numbers as the
/// original text.
#[must_use]
pub fn strip_line_comments(content: &str) -> String {
    let mut out = String::with_capacity(content.len());
    for (i, line) in content.split('\n').enumerate() {
        if i > 0 {
            out.push('\n');
        }
        match line.find("//") {
            Some(idx) => out.push_str(&line[..idx]),
            None => out.push_str(line),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn specs(edges: &[ImportEdge]) -> Vec<(&str, usize, EdgeKind)> {
        edges
            .iter()
            .map(|e| (e.specifier.as_str(), e.line, e.kind))
            .collect()
    }

    #[test]
    fn extracts_all_edge_kinds_in_source_order() {
        let src = r#"import React from "react";
import { a, b } from './util';
import type { T } from "../types";
import './polyfill';
export * from "./reexported";
const lazy = import("./lazy");
const legacy = require('./legacy');
"#;
        let edges = extract_imports(src, ExtractOptions::default());
        assert_eq!(
            specs(&edges),
            vec![
                ("react", 1, EdgeKind::Static),
                ("./util", 2, EdgeKind::Static),
                ("../types", 3, EdgeKind::TypeOnly),
                ("./polyfill", 4, EdgeKind::Static),
                ("./reexported", 5, EdgeKind::Static),
                ("./lazy", 6, EdgeKind::Dynamic),
                ("./legacy", 7, EdgeKind::Require),
            ]
        );
    }

    #[test]
    fn multi_line_clause_reports_line_of_keyword() {
        let src = "\n\nimport {\n  one,\n  two,\n} from './many';\n";
        let edges = extract_imports(src, ExtractOptions::default());
        assert_eq!(specs(&edges), vec![("./many", 3, EdgeKind::Static)]);
    }

    #[test]
    fn type_only_edges_are_omitted_when_disabled() {
        let src = "import type { T } from './t';\nexport type { U } from './u';\nimport x from './x';\n";
        let options = ExtractOptions {
            include_type_only: false,
            ..ExtractOptions::default()
        };
        let edges = extract_imports(src, options);
        assert_eq!(specs(&edges), vec![("./x", 3, EdgeKind::Static)]);
    }

    #[test]
    fn dynamic_and_require_can_be_disabled() {
        let src = "import('./a');\nrequire('./b');\n";
        let options = ExtractOptions {
            include_dynamic: false,
            include_require: false,
            ..ExtractOptions::default()
        };
        assert!(extract_imports(src, options).is_empty());
    }

    #[test]
    fn commented_out_imports_are_ignored() {
        let src = "// import a from './a';\nimport b from './b'; // import c from './c'\n";
        let edges = extract_imports(src, ExtractOptions::default());
        assert_eq!(specs(&edges), vec![("./b", 2, EdgeKind::Static)]);
    }

    #[test]
    fn re_export_forms() {
        let src = "export { x, y as z } from './named';\nexport * as ns from './ns';\n";
        let edges = extract_imports(src, ExtractOptions::default());
        assert_eq!(
            specs(&edges),
            vec![("./named", 1, EdgeKind::Static), ("./ns", 2, EdgeKind::Static)]
        );
    }

    #[test]
    fn strip_preserves_line_count() {
        let src = "a // x\nb\n// y\nc";
        let stripped = strip_line_comments(src);
        assert_eq!(stripped, "a \nb\n\nc");
        assert_eq!(line_at(&stripped, stripped.len()), 4);
    }
}
