//! Running every configured rule against a tree.

use std::collections::{BTreeMap, BTreeSet};

use rayon::prelude::*;
use serde::Serialize;
use struct_lint_core::config::{ConfiguredRule, EffectiveConfig, RuleDocument};
use struct_lint_core::{
    Location, ProjectFs, RuleKind, RuleSpec, Severity, Suggestion, Violation,
};
use tracing::{debug, info};

use crate::context::CheckContext;
use crate::{
    directory_structure, file_content, forbidden_import, layers, public_api, relationship,
};

/// Code for a rule whose configuration could not be compiled.
pub const CONFIG_CODE: &str = "CONFIG001";

/// Receives per-rule trace lines during a run.
pub trait DebugSink: Send + Sync {
    /// Records one line.
    fn trace(&self, line: &str);
}

impl<F> DebugSink for F
where
    F: Fn(&str) + Send + Sync,
{
    fn trace(&self, line: &str) {
        self(line);
    }
}

/// How to run the rules.
#[derive(Clone, Copy)]
pub struct ScanOptions<'a> {
    /// Filesystem snapshot to check.
    pub fs: &'a dyn ProjectFs,
    /// Run rules and files on the rayon pool.
    pub parallel: bool,
    /// Optional trace output.
    pub debug: Option<&'a dyn DebugSink>,
}

impl<'a> ScanOptions<'a> {
    /// Parallel scanning of `fs` without tracing.
    #[must_use]
    pub fn new(fs: &'a dyn ProjectFs) -> Self {
        Self {
            fs,
            parallel: true,
            debug: None,
        }
    }

    /// Enables or disables parallel scanning.
    #[must_use]
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Sets the trace sink.
    #[must_use]
    pub fn with_debug(mut self, sink: &'a dyn DebugSink) -> Self {
        self.debug = Some(sink);
        self
    }

    fn trace(&self, line: impl FnOnce() -> String) {
        if let Some(sink) = self.debug {
            sink.trace(&line());
        }
    }
}

/// Result of a run.
#[derive(Debug, Clone, Default, Serialize)]
pub struct RunReport {
    /// All violations, sorted by file, rule id, line.
    pub violations: Vec<Violation>,
    /// Violations grouped by rule id.
    pub by_rule: BTreeMap<String, Vec<Violation>>,
    /// Number of rules executed, including those reported as misconfigured.
    pub rules_run: usize,
    /// Ids of rules skipped because no executor handles their kind.
    pub rules_skipped: Vec<String>,
}

impl RunReport {
    /// Returns true if no violations were found.
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.violations.is_empty()
    }

    /// Number of violations at `severity`.
    #[must_use]
    pub fn count(&self, severity: Severity) -> usize {
        self.violations.iter().filter(|v| v.severity == severity).count()
    }

    /// Whether any violation is at or above `threshold`.
    #[must_use]
    pub fn has_at_least(&self, threshold: Severity) -> bool {
        self.violations.iter().any(|v| v.severity >= threshold)
    }

    /// Number of distinct files with violations.
    #[must_use]
    pub fn files_affected(&self) -> usize {
        self.violations
            .iter()
            .map(|v| &v.location.file)
            .collect::<BTreeSet<_>>()
            .len()
    }
}

enum Outcome {
    Ran(Vec<Violation>),
    Skipped(String),
}

/// Runs every configured rule.
///
/// Rules are independent and run in parallel when `options.parallel` is
/// set. The result does not depend on scheduling.
#[must_use]
pub fn run_all(config: &EffectiveConfig, options: &ScanOptions<'_>) -> RunReport {
    info!("running {} rule(s)", config.rules.len());

    let outcomes: Vec<Outcome> = if options.parallel {
        config
            .rules
            .par_iter()
            .map(|rule| run_rule(rule, config, options))
            .collect()
    } else {
        config
            .rules
            .iter()
            .map(|rule| run_rule(rule, config, options))
            .collect()
    };

    let mut report = RunReport::default();
    for outcome in outcomes {
        match outcome {
            Outcome::Ran(violations) => {
                report.rules_run += 1;
                report.violations.extend(violations);
            }
            Outcome::Skipped(id) => report.rules_skipped.push(id),
        }
    }

    report.violations.sort_by(|a, b| {
        a.location
            .file
            .cmp(&b.location.file)
            .then_with(|| a.rule_id.cmp(&b.rule_id))
            .then(a.location.line.cmp(&b.location.line))
            .then(a.location.column.cmp(&b.location.column))
            .then_with(|| a.code.cmp(&b.code))
    });
    for violation in &report.violations {
        report
            .by_rule
            .entry(violation.rule_id.clone())
            .or_default()
            .push(violation.clone());
    }

    info!(
        "run complete: {} violation(s) from {} rule(s), {} skipped",
        report.violations.len(),
        report.rules_run,
        report.rules_skipped.len()
    );
    report
}

fn run_rule(rule: &ConfiguredRule, config: &EffectiveConfig, options: &ScanOptions<'_>) -> Outcome {
    let spec = match &rule.compiled {
        Ok(spec) => spec,
        Err(e) => {
            options.trace(|| format!("[{}] configuration error: {e}", rule.id()));
            let location = Location::file(rule.origin_file.clone().unwrap_or_default());
            let id = if rule.id().is_empty() { "<unnamed>" } else { rule.id() };
            return Outcome::Ran(vec![Violation::new(
                CONFIG_CODE,
                id,
                Severity::Error,
                location,
                e.to_string(),
            )
            .with_context(format!("declared in {}", rule.origin))
            .with_suggestion(Suggestion::new(
                "fix the rule or set `disabled = true` on it",
            ))]);
        }
    };

    if let RuleKind::Unsupported { kind } = &spec.kind {
        debug!("[{}] skipping unsupported kind `{kind}`", spec.id);
        options.trace(|| format!("[{}] skipped: unsupported kind `{kind}`", spec.id));
        return Outcome::Skipped(spec.id.clone());
    }

    options.trace(|| format!("[{}] running {} rule", spec.id, spec.kind.name()));
    let violations = execute(spec, config, options);
    debug!("[{}] {} violation(s)", spec.id, violations.len());
    options.trace(|| format!("[{}] {} violation(s)", spec.id, violations.len()));
    Outcome::Ran(violations)
}

fn execute(spec: &RuleSpec, config: &EffectiveConfig, options: &ScanOptions<'_>) -> Vec<Violation> {
    let ctx = CheckContext::for_rule(spec, config, options.fs, options.parallel);
    match &spec.kind {
        RuleKind::ImportBoundary(boundary) => layers::check_layers(boundary, &ctx),
        RuleKind::PublicApi(api) => public_api::check_public_api(api, &ctx),
        RuleKind::Relationship(rel) => relationship::check_relationship(rel, &ctx),
        RuleKind::ForbiddenImport(deny) => forbidden_import::check_forbidden_imports(deny, &ctx),
        RuleKind::FileContent(content) => file_content::check_file_content(content, &ctx),
        RuleKind::DirectoryStructure(dirs) => {
            directory_structure::check_directory_structure(dirs, &ctx)
        }
        RuleKind::Unsupported { .. } => Vec::new(),
    }
}

/// Validates rule documents without running them.
///
/// Returns one message per problem: duplicate ids, compile errors and kinds
/// no executor handles. Disabled rules are only checked for duplicate ids.
#[must_use]
pub fn validate_custom_rules(rules: &[RuleDocument]) -> Vec<String> {
    let mut problems = Vec::new();
    let mut seen = BTreeSet::new();

    for (index, doc) in rules.iter().enumerate() {
        let label = if doc.id.is_empty() {
            format!("rules.custom[{index}]")
        } else {
            format!("rule `{}`", doc.id)
        };
        if !doc.id.is_empty() && !seen.insert(doc.id.as_str()) {
            problems.push(format!("{label}: duplicate id"));
        }
        if doc.disabled {
            continue;
        }
        match RuleSpec::compile(doc) {
            Ok(spec) => {
                if let RuleKind::Unsupported { kind } = &spec.kind {
                    problems.push(format!("{label}: unsupported kind `{kind}`"));
                }
            }
            Err(e) => problems.push(format!("{label}: {e}")),
        }
    }
    problems
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::path::Path;
    use std::sync::Mutex;
    use struct_lint_core::config::{build, ConfigDocument, ConfigSource, DocumentFormat, StandardPresets};
    use struct_lint_core::{MemoryFs, ProjectPath};

    fn config(toml: &str) -> EffectiveConfig {
        let doc = ConfigDocument::parse(toml, DocumentFormat::Toml, "struct-lint.toml").unwrap();
        build(
            Path::new("/project"),
            ConfigSource::Project(Path::new("/project/struct-lint.toml").to_path_buf()),
            Some(doc),
            &StandardPresets,
        )
        .unwrap()
    }

    fn rule(value: serde_json::Value) -> RuleDocument {
        serde_json::from_value(value).unwrap()
    }

    const LAYERS: &str = r#"
[[rules.custom]]
id = "layers"
kind = "import-boundary"
layers = [
  { name = "shared", pattern = "src/shared/**", allowed = [] },
  { name = "features", pattern = "src/features/**", allowed = ["shared"] },
]

[[rules.custom]]
id = "no-console"
kind = "file-content"
severity = "warning"
files = "src/**/*.ts"
must_not_match = "console\\.log"

[[rules.custom]]
id = "naming"
kind = "naming-convention"
"#;

    fn tree() -> MemoryFs {
        MemoryFs::from_files([
            ("src/shared/y.ts", "import f from '../features/f';\nconsole.log(f);\n"),
            ("src/features/f.ts", "import x from '../shared/x';\n"),
            ("src/shared/x.ts", ""),
        ])
    }

    #[test]
    fn runs_rules_and_skips_unsupported() {
        let fs = tree();
        let report = run_all(&config(LAYERS), &ScanOptions::new(&fs));
        assert_eq!(report.rules_run, 2);
        assert_eq!(report.rules_skipped, ["naming"]);

        let found: Vec<(&str, &str, Option<usize>)> = report
            .violations
            .iter()
            .map(|v| (v.location.file.as_str(), v.rule_id.as_str(), v.location.line))
            .collect();
        assert_eq!(
            found,
            [
                ("src/shared/y.ts", "layers", Some(1)),
                ("src/shared/y.ts", "no-console", Some(2)),
            ]
        );
        assert_eq!(report.by_rule["layers"].len(), 1);
        assert_eq!(report.count(Severity::Warning), 1);
        assert!(report.has_at_least(Severity::Error));
        assert_eq!(report.files_affected(), 1);
    }

    #[test]
    fn compile_error_yields_one_config_violation() {
        let cfg = config(
            r#"
[[rules.custom]]
id = "broken"
kind = "import-boundary"
layers = [{ name = "a", pattern = "src/a/**", allowed = ["ghost"] }]
"#,
        );
        let fs = MemoryFs::new();
        let report = run_all(&cfg, &ScanOptions::new(&fs));
        assert_eq!(report.violations.len(), 1);
        let v = &report.violations[0];
        assert_eq!(v.code, CONFIG_CODE);
        assert_eq!(v.rule_id, "broken");
        assert_eq!(v.location.file.as_str(), "struct-lint.toml");
        assert!(v.message.contains("ghost"), "{}", v.message);
        assert_eq!(v.context.as_deref(), Some("declared in struct-lint.toml"));
    }

    #[test]
    fn builtin_origin_is_not_turned_into_a_path() {
        let mut cfg = config("");
        let broken = rule(json!({
            "id": "preset-rule",
            "kind": "file-content",
            "files": "src/**",
            "must_match": "("
        }));
        cfg.rules.push(ConfiguredRule::new(
            broken,
            "builtin/team".to_string(),
            ProjectPath::normalize("struct-lint.toml"),
        ));
        let fs = MemoryFs::new();
        let report = run_all(&cfg, &ScanOptions::new(&fs));

        assert_eq!(report.violations.len(), 1);
        let v = &report.violations[0];
        assert_eq!(v.code, CONFIG_CODE);
        assert_eq!(v.location.file.as_str(), "struct-lint.toml");
        assert_eq!(v.context.as_deref(), Some("declared in builtin/team"));
    }

    #[test]
    fn debug_sink_sees_each_rule() {
        let fs = tree();
        let lines = Mutex::new(Vec::new());
        let sink = |line: &str| lines.lock().unwrap().push(line.to_string());
        let options = ScanOptions::new(&fs).with_parallel(false).with_debug(&sink);
        let with_sink = run_all(&config(LAYERS), &options);
        let without = run_all(&config(LAYERS), &ScanOptions::new(&fs).with_parallel(false));

        assert_eq!(with_sink.violations, without.violations);
        let lines = lines.into_inner().unwrap();
        assert_eq!(
            lines,
            [
                "[layers] running import-boundary rule",
                "[layers] 1 violation(s)",
                "[no-console] running file-content rule",
                "[no-console] 1 violation(s)",
                "[naming] skipped: unsupported kind `naming-convention`",
            ]
        );
    }

    #[test]
    fn parallel_and_sequential_runs_agree() {
        let fs = tree();
        let cfg = config(LAYERS);
        let par = run_all(&cfg, &ScanOptions::new(&fs));
        let seq = run_all(&cfg, &ScanOptions::new(&fs).with_parallel(false));
        assert_eq!(par.violations, seq.violations);
        assert_eq!(par.rules_skipped, seq.rules_skipped);
    }

    #[test]
    fn validate_reports_each_problem() {
        let rules = vec![
            rule(json!({ "id": "a", "kind": "file-content", "files": "src/**", "must_match": "x" })),
            rule(json!({ "id": "a", "kind": "file-content", "files": "src/**", "must_match": "(" })),
            rule(json!({ "id": "b", "kind": "naming" })),
            rule(json!({ "kind": "relationship" })),
            rule(json!({ "id": "off", "kind": "whatever", "disabled": true })),
        ];
        let problems = validate_custom_rules(&rules);
        assert_eq!(problems.len(), 4, "{problems:#?}");
        assert_eq!(problems[0], "rule `a`: duplicate id");
        assert!(problems[1].starts_with("rule `a`: "));
        assert_eq!(problems[2], "rule `b`: unsupported kind `naming`");
        assert!(problems[3].starts_with("rules.custom[3]: "));
    }

    #[test]
    fn valid_rules_produce_no_problems() {
        let rules = vec![rule(json!({
            "id": "tests",
            "kind": "relationship",
            "files": "src/**/*.tsx",
            "requires": ["{dir}/{stem}.test.tsx"],
        }))];
        assert!(validate_custom_rules(&rules).is_empty());
    }
}
