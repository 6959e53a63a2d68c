//! Pattern matching, import extraction and resolution against a real tree.

use std::fs;
use std::path::Path;

use struct_lint_core::{
    extract_imports, match_dirs, match_files, resolve, DiskFs, ExtractOptions, IgnoreSet,
    ImportTarget, Pattern, ProjectPath,
};
use tempfile::TempDir;

fn write(root: &Path, rel: &str, content: &str) {
    let path = root.join(rel);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, content).unwrap();
}

fn fixture() -> TempDir {
    let tmp = TempDir::new().unwrap();
    let root = tmp.path();
    write(root, "src/app/main.ts", "import { run } from '../features/auth';\n");
    write(root, "src/features/auth/index.ts", "export * from './login';\n");
    write(root, "src/features/auth/login.ts", "import x from '../../shared/x';\n");
    write(root, "src/features/cart/index.ts", "");
    write(root, "src/features/cart/Cart.tsx", "import React from 'react';\n");
    write(root, "src/shared/x.ts", "export const x = 1;\n");
    write(root, "dist/bundle.js", "");
    write(root, "node_modules/react/index.js", "");
    tmp
}

fn strs(paths: &[ProjectPath]) -> Vec<&str> {
    paths.iter().map(ProjectPath::as_str).collect()
}

#[test]
fn recursive_glob_returns_sorted_files_only() {
    let tmp = fixture();
    let fs = DiskFs::new(tmp.path());
    let pattern = Pattern::parse("src/**/*.ts").unwrap();
    let found = match_files(&pattern, &fs, &IgnoreSet::empty());
    assert_eq!(
        strs(&found),
        [
            "src/app/main.ts",
            "src/features/auth/index.ts",
            "src/features/auth/login.ts",
            "src/features/cart/index.ts",
            "src/shared/x.ts",
        ]
    );
    assert_eq!(found, match_files(&pattern, &fs, &IgnoreSet::empty()));
}

#[test]
fn every_match_satisfies_the_pattern() {
    let tmp = fixture();
    let fs = DiskFs::new(tmp.path());
    for raw in ["**", "src/*/*/index.ts", "src/features/*/*.tsx", "**/x.ts"] {
        let pattern = Pattern::parse(raw).unwrap();
        for path in match_files(&pattern, &fs, &IgnoreSet::empty()) {
            assert!(pattern.matches(&path), "{raw} returned {path}");
        }
    }
}

#[test]
fn ignore_list_wins_over_match() {
    let tmp = fixture();
    let fs = DiskFs::new(tmp.path());
    let ignore = IgnoreSet::new(["node_modules", "dist", "src/features/*/index.ts"]).unwrap();
    let found = match_files(&Pattern::parse("**").unwrap(), &fs, &ignore);
    assert!(found.iter().all(|p| !ignore.is_ignored(p)));
    assert!(!found.iter().any(|p| p.as_str().starts_with("dist/")));
    assert!(!found.iter().any(|p| p.as_str().ends_with("index.ts")));
    assert!(found.iter().any(|p| p.as_str() == "src/shared/x.ts"));
}

#[test]
fn module_directories_are_listed() {
    let tmp = fixture();
    let fs = DiskFs::new(tmp.path());
    let dirs = match_dirs(&Pattern::parse("src/features/*").unwrap(), &fs, &IgnoreSet::empty());
    assert_eq!(strs(&dirs), ["src/features/auth", "src/features/cart"]);
}

#[test]
fn imports_resolve_through_the_tree() {
    let tmp = fixture();
    let fs = DiskFs::new(tmp.path());
    let from = ProjectPath::normalize("src/features/auth/login.ts").unwrap();
    let content = fs::read_to_string(tmp.path().join(from.as_str())).unwrap();
    let edges = extract_imports(&content, ExtractOptions::default());
    assert_eq!(edges.len(), 1);
    assert_eq!(
        resolve(&edges[0].specifier, &from, &fs),
        ImportTarget::File(ProjectPath::normalize("src/shared/x.ts").unwrap())
    );

    let main = ProjectPath::normalize("src/app/main.ts").unwrap();
    assert_eq!(
        resolve("../features/auth", &main, &fs),
        ImportTarget::File(ProjectPath::normalize("src/features/auth/index.ts").unwrap())
    );
    assert_eq!(resolve("react", &main, &fs), ImportTarget::External);
}
