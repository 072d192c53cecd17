use thiserror::Error;

#[derive(Debug, Error)]
/// Errors that make an entire profile unusable.
///
/// Callers that go through [`ProfileRegistry::load`](crate::ProfileRegistry::load)
/// never see these: the registry substitutes the plain fallback profile and
/// records the failure as a [`ProfileWarning`].
pub enum ProfileError {
    #[error("I/O error: {0}")]
    /// Reading a profile asset failed.
    Io(#[from] std::io::Error),

    #[error("JSON parse error: {0}")]
    /// The profile asset is not valid JSON or misses a required field.
    Json(#[from] serde_json::Error),

    #[error("no profile found for language '{0}'")]
    /// No `<language>.json` asset exists in the registered search paths.
    NotFound(String),

    #[error("structural error: {0}")]
    /// The profile parsed but violates a structural rule (e.g. a
    /// `block_comment` field that is not a two-element pair).
    Structural(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
/// Non-fatal, per-rule problems found while loading a profile.
///
/// A warning disables at most the rule it names; the rest of the profile
/// stays active.
pub enum ProfileWarning {
    #[error("pattern for {rule} failed to compile: {message}")]
    /// A regex failed to compile; that rule is skipped.
    PatternCompile {
        /// Which rule carried the pattern.
        rule: String,
        /// The regex source string.
        pattern: String,
        /// The regex compiler's error message.
        message: String,
    },

    #[error("{rule}: capture group {group} exceeds the pattern's {available} capture group(s)")]
    /// A declared capture-group index does not exist in the compiled
    /// pattern; that rule is skipped.
    CaptureOutOfRange {
        /// Which rule declared the index.
        rule: String,
        /// The declared group index.
        group: usize,
        /// How many capture groups the pattern actually has.
        available: usize,
    },

    #[error(
        "token category '{literal}' is declared after '{code}'; keyword-like text inside \
         literals may be misclassified"
    )]
    /// A literal-bearing category (string, comment, ...) is ranked below a
    /// code category (keyword, operator, ...). The profile still loads.
    LiteralPriority {
        /// The literal-bearing category declared too late.
        literal: String,
        /// The code category that outranks it.
        code: String,
    },

    #[error("profile '{language}' failed to load: {reason}; using the plain fallback")]
    /// The whole profile was replaced by the plain fallback.
    LoadFailed {
        /// The requested language id.
        language: String,
        /// Why the load failed.
        reason: String,
    },
}
