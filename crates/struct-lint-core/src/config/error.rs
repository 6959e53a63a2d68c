//! Configuration errors.

use std::path::PathBuf;

use crate::pattern::PatternError;

/// Fatal configuration errors. Any of these aborts the run before scanning.
#[derive(Debug, thiserror::Error, miette::Diagnostic)]
pub enum ConfigError {
    /// An explicitly requested config file does not exist.
    #[error("config file not found: {}", path.display())]
    #[diagnostic(
        code(struct_lint::config::not_found),
        help("check the path passed with --config")
    )]
    NotFound {
        /// The missing path.
        path: PathBuf,
    },

    /// A config or preset file could not be read.
    #[error("failed to read {}: {source}", path.display())]
    #[diagnostic(code(struct_lint::config::io))]
    Io {
        /// The file being read.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// A document is not valid TOML/JSON or has the wrong shape.
    #[error("failed to parse {origin}: {message}")]
    #[diagnostic(code(struct_lint::config::parse))]
    Parse {
        /// Config file or preset name.
        origin: String,
        /// Parser message.
        message: String,
    },

    /// The extends graph loops back on itself.
    #[error("extends cycle detected: {}", chain.join(" -> "))]
    #[diagnostic(
        code(struct_lint::config::cycle),
        help("remove one of the `extends` entries along this chain")
    )]
    Cycle {
        /// Every document on the loop, starting and ending with the repeated one.
        chain: Vec<String>,
    },

    /// An extends entry is neither `builtin/<name>` nor a relative path.
    #[error("unsupported extends entry `{entry}` in {origin}")]
    #[diagnostic(
        code(struct_lint::config::unknown_namespace),
        help("use `builtin/<name>` or a path starting with `./` or `../`")
    )]
    UnknownPresetNamespace {
        /// The raw entry.
        entry: String,
        /// Document containing it.
        origin: String,
    },

    /// `builtin/<name>` names no built-in preset.
    #[error("unknown built-in preset `{name}` in {origin} (available: {available})")]
    #[diagnostic(
        code(struct_lint::config::unknown_preset),
        help("run `struct-lint list-rules --presets` to see built-in presets")
    )]
    UnknownPreset {
        /// Requested name.
        name: String,
        /// Document containing the reference.
        origin: String,
        /// Comma-separated built-in names.
        available: String,
    },

    /// A local preset file does not exist.
    #[error("preset file {} referenced from {origin} does not exist", path.display())]
    #[diagnostic(code(struct_lint::config::preset_not_found))]
    PresetNotFound {
        /// Resolved preset path.
        path: PathBuf,
        /// Document containing the reference.
        origin: String,
    },

    /// A top-level include or exclude pattern does not compile.
    #[error("invalid pattern in `{field}`: {source}")]
    #[diagnostic(code(struct_lint::config::pattern))]
    Pattern {
        /// `include` or `exclude`.
        field: String,
        /// Compile error.
        source: PatternError,
    },
}

/// Per-rule configuration problems.
///
/// These never abort a run: the rule is kept with its error and reported as
/// a single `CONFIG001` violation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RuleConfigError {
    /// Rule has no `id`.
    #[error("rule is missing required field `id`")]
    MissingId,

    /// Rule has no `kind`.
    #[error("rule `{id}` is missing required field `kind`")]
    MissingKind {
        /// Rule id.
        id: String,
    },

    /// Severity string is not recognized.
    #[error("rule `{id}`: {message}")]
    InvalidSeverity {
        /// Rule id.
        id: String,
        /// Parse message.
        message: String,
    },

    /// Kind-specific options have the wrong shape.
    #[error("rule `{id}` ({kind}): {message}")]
    InvalidOptions {
        /// Rule id.
        id: String,
        /// Rule kind.
        kind: String,
        /// Deserializer message.
        message: String,
    },

    /// A pattern field does not compile.
    #[error("rule `{id}`: invalid pattern in `{field}`: {source}")]
    InvalidPattern {
        /// Rule id.
        id: String,
        /// Field name.
        field: String,
        /// Compile error.
        source: PatternError,
    },

    /// A regex field does not compile.
    #[error("rule `{id}`: invalid regex in `{field}`: {message}")]
    InvalidRegex {
        /// Rule id.
        id: String,
        /// Field name.
        field: String,
        /// Regex error.
        message: String,
    },

    /// Two layers share a name.
    #[error("rule `{id}`: layer `{layer}` is declared more than once")]
    DuplicateLayer {
        /// Rule id.
        id: String,
        /// Layer name.
        layer: String,
    },

    /// An allowed-layer entry names no declared layer.
    #[error("rule `{id}`: layer `{layer}` allows unknown layer `{reference}`")]
    UnknownLayer {
        /// Rule id.
        id: String,
        /// Layer holding the reference.
        layer: String,
        /// The unknown name.
        reference: String,
    },

    /// A path template uses an unknown placeholder or is malformed.
    #[error("rule `{id}`: invalid template `{template}`: {reason}")]
    InvalidTemplate {
        /// Rule id.
        id: String,
        /// Template text.
        template: String,
        /// What is wrong.
        reason: String,
    },

    /// The rule would never check anything.
    #[error("rule `{id}`: {reason}")]
    EmptyConstraint {
        /// Rule id.
        id: String,
        /// What is missing.
        reason: String,
    },
}
