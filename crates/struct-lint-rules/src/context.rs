//! Inputs shared by every rule executor.

use std::collections::BTreeSet;

use rayon::prelude::*;
use struct_lint_core::config::EffectiveConfig;
use struct_lint_core::{
    match_files, IgnoreSet, Location, Pattern, ProjectFs, ProjectPath, RuleSpec, Severity,
    Violation,
};
use tracing::debug;

/// What an executor needs to check one rule against a tree.
pub struct CheckContext<'a> {
    /// Id of the rule being checked.
    pub rule_id: &'a str,
    /// Severity of produced violations.
    pub severity: Severity,
    /// Optional message prefix from config.
    pub message: Option<&'a str>,
    /// Filesystem snapshot.
    pub fs: &'a dyn ProjectFs,
    /// Global exclude plus the rule's own exclude.
    pub ignore: IgnoreSet,
    /// Default file selection for rules without their own `files`.
    pub include: &'a [Pattern],
    /// Scan files on the rayon pool.
    pub parallel: bool,
}

impl<'a> CheckContext<'a> {
    /// A context with default settings: severity `error`, nothing ignored,
    /// nothing included by default and sequential scanning.
    #[must_use]
    pub fn new(rule_id: &'a str, fs: &'a dyn ProjectFs) -> Self {
        Self {
            rule_id,
            severity: Severity::Error,
            message: None,
            fs,
            ignore: IgnoreSet::empty(),
            include: &[],
            parallel: false,
        }
    }

    /// A context for a compiled rule within a resolved configuration.
    #[must_use]
    pub fn for_rule(
        spec: &'a RuleSpec,
        config: &'a EffectiveConfig,
        fs: &'a dyn ProjectFs,
        parallel: bool,
    ) -> Self {
        Self {
            rule_id: &spec.id,
            severity: spec.severity,
            message: spec.message.as_deref(),
            fs,
            ignore: config.ignore.union(&spec.exclude),
            include: &config.include,
            parallel,
        }
    }

    /// Sets the severity.
    #[must_use]
    pub fn with_severity(mut self, severity: Severity) -> Self {
        self.severity = severity;
        self
    }

    /// Sets the ignore list.
    #[must_use]
    pub fn with_ignore(mut self, ignore: IgnoreSet) -> Self {
        self.ignore = ignore;
        self
    }

    /// Sets the default file selection.
    #[must_use]
    pub fn with_include(mut self, include: &'a [Pattern]) -> Self {
        self.include = include;
        self
    }

    /// Enables or disables parallel scanning.
    #[must_use]
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Builds a violation at the rule's severity.
    #[must_use]
    pub fn violation(&self, code: &str, location: Location, text: &str) -> Violation {
        self.violation_at(code, self.severity, location, text)
    }

    /// Builds a violation that is never more severe than a warning.
    #[must_use]
    pub fn warning(&self, code: &str, location: Location, text: &str) -> Violation {
        self.violation_at(code, self.severity.min(Severity::Warning), location, text)
    }

    fn violation_at(&self, code: &str, severity: Severity, location: Location, text: &str) -> Violation {
        let message = match self.message {
            Some(prefix) => format!("{prefix}: {text}"),
            None => text.to_string(),
        };
        Violation::new(code, self.rule_id, severity, location, message)
    }

    /// Reads a file, logging and skipping unreadable ones.
    #[must_use]
    pub fn read(&self, file: &ProjectPath) -> Option<String> {
        let content = self.fs.read_to_string(file);
        if content.is_none() {
            debug!("[{}] skipping unreadable file {file}", self.rule_id);
        }
        content
    }

    /// Files selected by `pattern`, or by the include list when absent.
    #[must_use]
    pub fn select_files(&self, pattern: Option<&Pattern>) -> Vec<ProjectPath> {
        match pattern {
            Some(pattern) => match_files(pattern, self.fs, &self.ignore),
            None => self
                .include
                .iter()
                .flat_map(|p| match_files(p, self.fs, &self.ignore))
                .collect::<BTreeSet<_>>()
                .into_iter()
                .collect(),
        }
    }

    /// Runs `check` over `items`, on the rayon pool when parallel.
    pub fn map_files<T, F>(&self, items: &[T], check: F) -> Vec<Violation>
    where
        T: Sync,
        F: Fn(&T) -> Vec<Violation> + Sync + Send,
    {
        if self.parallel {
            items.par_iter().flat_map_iter(&check).collect()
        } else {
            items.iter().flat_map(&check).collect()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use struct_lint_core::MemoryFs;

    fn path(s: &str) -> ProjectPath {
        ProjectPath::normalize(s).unwrap()
    }

    #[test]
    fn message_prefix_is_applied() {
        let fs = MemoryFs::new();
        let mut ctx = CheckContext::new("r", &fs);
        ctx.message = Some("Team rule");
        let v = ctx.violation("X001", Location::file(path("a.ts")), "bad");
        assert_eq!(v.message, "Team rule: bad");
        assert_eq!(v.rule_id, "r");
    }

    #[test]
    fn warning_never_exceeds_rule_severity() {
        let fs = MemoryFs::new();
        let ctx = CheckContext::new("r", &fs).with_severity(Severity::Info);
        assert_eq!(ctx.warning("X", Location::file(path("a")), "m").severity, Severity::Info);
        let ctx = CheckContext::new("r", &fs);
        assert_eq!(ctx.warning("X", Location::file(path("a")), "m").severity, Severity::Warning);
    }

    #[test]
    fn include_list_is_used_without_explicit_pattern() {
        let fs = MemoryFs::from_files([("src/a.ts", ""), ("lib/b.ts", ""), ("src/c.ts", "")]);
        let include = [Pattern::parse("src/**").unwrap(), Pattern::parse("**/*.ts").unwrap()];
        let ctx = CheckContext::new("r", &fs)
            .with_include(&include)
            .with_ignore(IgnoreSet::new(["lib"]).unwrap());
        let files = ctx.select_files(None);
        assert_eq!(files, [path("src/a.ts"), path("src/c.ts")]);
    }

    #[test]
    fn parallel_and_sequential_agree() {
        let fs = MemoryFs::new();
        let items: Vec<usize> = (0..50).collect();
        let check = |ctx: &CheckContext<'_>| {
            ctx.map_files(&items, |i| {
                vec![ctx.violation("X", Location::line(path("a.ts"), *i + 1), "m")]
            })
        };
        let seq = check(&CheckContext::new("r", &fs));
        let par = check(&CheckContext::new("r", &fs).with_parallel(true));
        assert_eq!(seq, par);
    }
}
