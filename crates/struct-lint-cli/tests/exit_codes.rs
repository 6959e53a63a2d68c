//! Process exit codes of the `struct-lint` binary.

use std::fs;
use std::path::Path;
use std::process::{Command, Output};

use tempfile::TempDir;

fn write(root: &Path, rel: &str, content: &str) {
    let path = root.join(rel);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, content).unwrap();
}

fn struct_lint(root: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_struct-lint"))
        .args(args)
        .current_dir(root)
        .env_remove("STRUCT_LINT_CONFIG")
        .env_remove("RUST_LOG")
        .output()
        .unwrap()
}

fn project() -> TempDir {
    let tmp = TempDir::new().unwrap();
    write(
        tmp.path(),
        "struct-lint.toml",
        r#"
[[rules.custom]]
id = "layers"
kind = "import-boundary"
layers = [
  { name = "shared", pattern = "src/shared/**" },
  { name = "features", pattern = "src/features/**", allowed = ["shared"] },
]
"#,
    );
    write(tmp.path(), "src/shared/x.ts", "");
    write(tmp.path(), "src/features/f.ts", "import x from '../shared/x';\n");
    tmp
}

#[test]
fn clean_project_exits_zero() {
    let tmp = project();
    let out = struct_lint(tmp.path(), &["check"]);
    assert_eq!(out.status.code(), Some(0), "{}", String::from_utf8_lossy(&out.stdout));
}

#[test]
fn violation_exits_one() {
    let tmp = project();
    write(tmp.path(), "src/shared/y.ts", "import f from '../features/f';\n");

    let out = struct_lint(tmp.path(), &["check", "--format", "compact"]);
    assert_eq!(out.status.code(), Some(1));
    let stdout = String::from_utf8_lossy(&out.stdout);
    assert!(stdout.starts_with("src/shared/y.ts:1: error [layers/LAYER001]"), "{stdout}");

    let out = struct_lint(tmp.path(), &["check", "--fail-on", "never"]);
    assert_eq!(out.status.code(), Some(0));
}

#[test]
fn json_output_is_a_report() {
    let tmp = project();
    write(tmp.path(), "src/shared/y.ts", "import f from '../features/f';\n");

    let out = struct_lint(tmp.path(), &["check", "--format", "json"]);
    let report: serde_json::Value = serde_json::from_slice(&out.stdout).unwrap();
    assert_eq!(report["rules_run"], 1);
    assert_eq!(report["violations"][0]["code"], "LAYER001");
    assert_eq!(report["by_rule"]["layers"].as_array().map(Vec::len), Some(1));
}

#[test]
fn config_cycle_exits_two() {
    let tmp = TempDir::new().unwrap();
    write(tmp.path(), "struct-lint.toml", "extends = [\"./struct-lint.toml\"]\n");

    let out = struct_lint(tmp.path(), &["check"]);
    assert_eq!(out.status.code(), Some(2));
    let stderr = String::from_utf8_lossy(&out.stderr);
    assert!(stderr.contains("struct_lint::config::cycle"), "{stderr}");
}

#[test]
fn missing_explicit_config_exits_two() {
    let tmp = project();
    let out = struct_lint(tmp.path(), &["--config", "nope.toml", "check"]);
    assert_eq!(out.status.code(), Some(2));
}

#[test]
fn validate_flags_broken_rules() {
    let tmp = TempDir::new().unwrap();
    write(
        tmp.path(),
        "struct-lint.toml",
        r#"
[[rules.custom]]
id = "bad"
kind = "file-content"
files = "src/**"
must_match = "("
"#,
    );
    let out = struct_lint(tmp.path(), &["validate"]);
    assert_eq!(out.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&out.stdout).contains("rule `bad`"));

    let tmp = project();
    let out = struct_lint(tmp.path(), &["validate"]);
    assert_eq!(out.status.code(), Some(0));
}

#[test]
fn list_rules_names_every_kind() {
    let tmp = TempDir::new().unwrap();
    let out = struct_lint(tmp.path(), &["list-rules"]);
    assert_eq!(out.status.code(), Some(0));
    let stdout = String::from_utf8_lossy(&out.stdout);
    for kind in ["import-boundary", "public-api", "directory-structure", "builtin/base"] {
        assert!(stdout.contains(kind), "{kind} missing from:\n{stdout}");
    }
}
