use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
/// Raw, uncompiled language profile as read from a `<language>.json` asset.
///
/// Every ordered concern (token rules, definition rules, suggestion
/// categories) is a JSON array: array position carries meaning and survives
/// reformatting, unlike textual key order in an object.
pub struct ProfileDefinition {
    /// Language id (e.g. `"python"`). Lowercased when compiled.
    pub language: String,

    #[serde(default)]
    /// Line comment marker (e.g. `"//"`, `"#"`).
    pub comment: Option<String>,

    #[serde(default)]
    /// Block comment `[start, end]` pair. `null` entries or an absent field
    /// mean the language has no block comments.
    pub block_comment: Option<Vec<Option<String>>>,

    #[serde(default = "default_indent")]
    /// Literal indentation unit (e.g. four spaces or `"\t"`).
    pub indent: String,

    #[serde(default)]
    /// Patterns signalling that the following line should indent.
    pub indent_triggers: Vec<String>,

    #[serde(default)]
    /// Patterns signalling that the matching line closes a block.
    pub dedent_triggers: Vec<String>,

    #[serde(default)]
    /// Structural definition rules. Declaration order is the tie-break when
    /// two kinds claim overlapping text.
    pub definitions: Vec<DefinitionEntry>,

    #[serde(default)]
    /// Identifier extraction rules (variables, parameters, imports).
    pub symbol_patterns: Vec<SymbolEntry>,

    #[serde(default)]
    /// Token classification rules. The `priority` ordinal is explicit; lower
    /// ordinals match first.
    pub syntax_tokens: Vec<TokenEntry>,

    #[serde(default)]
    /// Static completion candidates, grouped by category.
    pub suggestions_categorized: Vec<SuggestionCategoryEntry>,
}

impl ProfileDefinition {
    /// Create an empty definition for the given language id.
    ///
    /// Useful for hosts that assemble profiles programmatically instead of
    /// loading JSON assets.
    pub fn new(language: impl Into<String>) -> Self {
        Self {
            language: language.into(),
            comment: None,
            block_comment: None,
            indent: default_indent(),
            indent_triggers: Vec::new(),
            dedent_triggers: Vec::new(),
            definitions: Vec::new(),
            symbol_patterns: Vec::new(),
            syntax_tokens: Vec::new(),
            suggestions_categorized: Vec::new(),
        }
    }
}

fn default_indent() -> String {
    "    ".to_string()
}

#[derive(Debug, Clone, Deserialize)]
/// A structural definition rule (function, class, interface, ...).
pub struct DefinitionEntry {
    /// Definition kind tag (e.g. `"function"`, `"class"`, `"method"`).
    pub kind: String,

    /// The regex source string.
    pub pattern: String,

    /// Capture group holding the definition name. Required and explicit;
    /// group 0 (the whole match) is not accepted.
    pub name_group: usize,

    #[serde(default)]
    /// Optional capture group holding the raw parameter list text.
    pub params_group: Option<usize>,
}

#[derive(Debug, Clone, Deserialize)]
/// An identifier extraction rule. The name is captured by group 1; import
/// rules may spread comma-separated names over any of their groups.
pub struct SymbolEntry {
    /// What kind of identifier the rule extracts.
    pub kind: SymbolKind,

    /// The regex source string.
    pub pattern: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "lowercase")]
/// The closed set of extracted identifier kinds.
pub enum SymbolKind {
    /// A local or module-level variable binding.
    Variable,
    /// A function or method parameter.
    #[serde(alias = "param")]
    Parameter,
    /// An imported module or name.
    Import,
}

impl std::fmt::Display for SymbolKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Variable => f.write_str("variable"),
            Self::Parameter => f.write_str("parameter"),
            Self::Import => f.write_str("import"),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
/// A token classification rule.
pub struct TokenEntry {
    /// Category label (e.g. `"string"`, `"keyword"`, `"number"`).
    pub category: String,

    /// The regex source string.
    pub pattern: String,

    /// Explicit match priority ordinal; lower values claim text first.
    pub priority: u32,
}

#[derive(Debug, Clone, Deserialize)]
/// A named group of static completion candidates.
pub struct SuggestionCategoryEntry {
    /// Category name (e.g. `"keywords"`, `"builtins"`).
    pub category: String,

    #[serde(default)]
    /// Candidate strings, in declaration order.
    pub items: Vec<String>,
}
