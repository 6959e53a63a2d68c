//! Loading a project's configuration from disk and running it.

use std::fs;
use std::path::Path;
use std::sync::Mutex;

use struct_lint_core::config::ConfigSource;
use struct_lint_core::{load_config, ConfigError, DiskFs, Severity};
use struct_lint_rules::{run_all, RunReport, ScanOptions, CONFIG_CODE};
use tempfile::TempDir;

fn write(root: &Path, rel: &str, content: &str) {
    let path = root.join(rel);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, content).unwrap();
}

const LAYER_CONFIG: &str = r#"
[[rules.custom]]
id = "layers"
kind = "import-boundary"
layers = [
  { name = "shared", pattern = "src/shared/**", allowed = [] },
  { name = "features", pattern = "src/features/**", allowed = ["shared"] },
]
"#;

fn layered_project() -> TempDir {
    let tmp = TempDir::new().unwrap();
    write(tmp.path(), "struct-lint.toml", LAYER_CONFIG);
    write(tmp.path(), "src/shared/x.ts", "export const x = 1;\n");
    write(tmp.path(), "src/features/f.ts", "import { x } from '../shared/x';\n");
    tmp
}

fn run(root: &Path) -> RunReport {
    let config = load_config(root, None).unwrap();
    let fs = DiskFs::new(root);
    run_all(&config, &ScanOptions::new(&fs))
}

#[test]
fn allowed_direction_is_clean() {
    let tmp = layered_project();
    let report = run(tmp.path());
    assert!(report.is_clean(), "{:#?}", report.violations);
    assert_eq!(report.rules_run, 1);
}

#[test]
fn reverse_import_is_one_violation() {
    let tmp = layered_project();
    write(
        tmp.path(),
        "src/shared/y.ts",
        "// helpers\nimport { f } from '../features/f';\n",
    );

    let report = run(tmp.path());
    assert_eq!(report.violations.len(), 1, "{:#?}", report.violations);
    let v = &report.violations[0];
    assert_eq!(v.location.file.as_str(), "src/shared/y.ts");
    assert_eq!(v.location.line, Some(2));
    assert!(v.message.contains("layer `features`"), "{}", v.message);
    assert_eq!(v.severity, Severity::Error);
}

#[test]
fn presets_fold_before_project_config() {
    let tmp = TempDir::new().unwrap();
    write(
        tmp.path(),
        "presets/team.toml",
        r#"
exclude = ["vendor"]

[[rules.custom]]
id = "no-console"
kind = "file-content"
files = "src/**/*.ts"
must_not_match = "console\\.log"
"#,
    );
    write(
        tmp.path(),
        "struct-lint.toml",
        r#"
extends = ["./presets/team.toml"]

[[rules.custom]]
id = "no-console"
kind = "file-content"
severity = "warning"
files = "src/**/*.ts"
must_not_match = "console\\.(log|debug)"
"#,
    );
    write(tmp.path(), "src/a.ts", "console.debug('x');\n");
    write(tmp.path(), "vendor/src/b.ts", "console.log('x');\n");

    let config = load_config(tmp.path(), None).unwrap();
    assert_eq!(config.presets, ["presets/team.toml"]);
    assert_eq!(config.exclude, ["vendor"]);
    assert_eq!(config.rules.len(), 1);

    let report = run(tmp.path());
    assert_eq!(report.violations.len(), 1);
    assert_eq!(report.violations[0].severity, Severity::Warning);
    assert_eq!(report.violations[0].location.file.as_str(), "src/a.ts");
}

#[test]
fn disabled_entry_removes_builtin_rule() {
    let tmp = TempDir::new().unwrap();
    write(
        tmp.path(),
        "struct-lint.toml",
        r#"
extends = ["builtin/clean-architecture"]

[[rules.custom]]
id = "clean-architecture-layers"
disabled = true
"#,
    );
    write(tmp.path(), "src/domain/user.ts", "import db from '../infrastructure/db';\n");
    write(tmp.path(), "src/infrastructure/db.ts", "");

    let config = load_config(tmp.path(), None).unwrap();
    assert!(config.rules.is_empty());
    assert!(run(tmp.path()).is_clean());
}

#[test]
fn builtin_layers_catch_inward_violation() {
    let tmp = TempDir::new().unwrap();
    write(tmp.path(), "struct-lint.toml", "extends = [\"builtin/clean-architecture\"]\n");
    write(tmp.path(), "src/domain/user.ts", "import db from '../infrastructure/db';\n");
    write(tmp.path(), "src/infrastructure/db.ts", "");

    let report = run(tmp.path());
    assert_eq!(report.violations.len(), 1, "{:#?}", report.violations);
    assert_eq!(report.violations[0].rule_id, "clean-architecture-layers");
}

#[test]
fn extends_cycle_is_fatal() {
    let tmp = TempDir::new().unwrap();
    write(tmp.path(), "a.toml", "extends = [\"./b.toml\"]\n");
    write(tmp.path(), "b.toml", "extends = [\"./a.toml\"]\n");
    write(tmp.path(), "struct-lint.toml", "extends = [\"./a.toml\"]\n");

    let err = load_config(tmp.path(), None).unwrap_err();
    match err {
        ConfigError::Cycle { chain } => {
            assert_eq!(chain.len(), 3, "{chain:?}");
            assert_eq!(chain.first(), chain.last());
        }
        other => panic!("expected a cycle, got {other}"),
    }
}

#[test]
fn broken_rule_is_attributed_to_declaring_file() {
    let tmp = TempDir::new().unwrap();
    write(
        tmp.path(),
        "presets/bad.toml",
        r#"
[[rules.custom]]
id = "bad-template"
kind = "relationship"
files = "src/**/*.ts"
requires = ["{dir}/{basename}.test.ts"]
"#,
    );
    write(tmp.path(), "struct-lint.toml", "extends = [\"./presets/bad.toml\"]\n");
    write(tmp.path(), "src/a.ts", "");

    let report = run(tmp.path());
    assert_eq!(report.violations.len(), 1);
    let v = &report.violations[0];
    assert_eq!(v.code, CONFIG_CODE);
    assert_eq!(v.rule_id, "bad-template");
    assert_eq!(v.location.file.as_str(), "presets/bad.toml");
}

#[test]
fn explicit_config_path_is_used() {
    let tmp = layered_project();
    write(tmp.path(), "ci/strict.toml", "include = [\"lib/**\"]\n");

    let config = load_config(tmp.path(), Some(Path::new("ci/strict.toml"))).unwrap();
    assert!(matches!(config.source, ConfigSource::Explicit(_)));
    assert!(config.rules.is_empty());
}

#[test]
fn parallel_and_sequential_reports_match() {
    let tmp = layered_project();
    write(tmp.path(), "src/shared/y.ts", "import { f } from '../features/f';\n");
    write(tmp.path(), "src/shared/z.ts", "import { f } from '../features/f';\n");

    let config = load_config(tmp.path(), None).unwrap();
    let fs = DiskFs::new(tmp.path());
    let par = run_all(&config, &ScanOptions::new(&fs));
    let seq = run_all(&config, &ScanOptions::new(&fs).with_parallel(false));
    assert_eq!(par.violations, seq.violations);
    assert_eq!(par.violations.len(), 2);
}

#[test]
fn debug_sink_does_not_change_results() {
    let tmp = layered_project();
    write(tmp.path(), "src/shared/y.ts", "import { f } from '../features/f';\n");

    let config = load_config(tmp.path(), None).unwrap();
    let fs = DiskFs::new(tmp.path());
    let lines = Mutex::new(Vec::<String>::new());
    let sink = |line: &str| lines.lock().unwrap().push(line.to_string());

    let traced = run_all(&config, &ScanOptions::new(&fs).with_debug(&sink));
    let plain = run_all(&config, &ScanOptions::new(&fs));
    assert_eq!(traced.violations, plain.violations);
    assert_eq!(lines.into_inner().unwrap().len(), 2);
}
