use crate::definition::{ProfileDefinition, SymbolKind};
use crate::error::{ProfileError, ProfileWarning};
use regex::Regex;
use std::sync::Arc;

/// Reserved category for text no token rule claimed.
pub const PLAIN_CATEGORY: &str = "plain";

/// Category applied to forced block-comment spans.
pub const COMMENT_CATEGORY: &str = "comment";

/// Token categories that carry literal text (their spans must win over code
/// categories, or keyword-like substrings inside them get reclassified).
const LITERAL_CATEGORIES: &[&str] = &[
    "string",
    "comment",
    "template",
    "template_literal",
    "regex",
    "regex_literal",
    "char",
    "docstring",
];

/// Token categories that classify code proper.
const CODE_CATEGORIES: &[&str] = &["keyword", "identifier", "operator"];

#[derive(Debug, Clone)]
/// A compiled token classification rule.
pub struct TokenRule {
    /// Category label applied to matched spans.
    pub category: Arc<str>,
    /// Declared priority ordinal (lower claims first).
    pub priority: u32,
    /// The compiled pattern.
    pub regex: Regex,
}

#[derive(Debug, Clone)]
/// A compiled structural definition rule.
pub struct DefinitionRule {
    /// Definition kind tag.
    pub kind: String,
    /// The compiled pattern.
    pub regex: Regex,
    /// Capture group holding the definition name (validated, >= 1).
    pub name_group: usize,
    /// Optional capture group holding raw parameter text.
    pub params_group: Option<usize>,
}

#[derive(Debug, Clone)]
/// A compiled identifier extraction rule.
pub struct SymbolRule {
    /// What kind of identifier the rule extracts.
    pub kind: SymbolKind,
    /// The compiled pattern.
    pub regex: Regex,
}

#[derive(Debug, Clone)]
/// A named group of static completion candidates.
pub struct SuggestionCategory {
    /// Category name.
    pub name: String,
    /// Candidate strings, in declaration order.
    pub items: Vec<String>,
}

#[derive(Debug, Clone)]
/// A compiled, immutable language profile.
///
/// Compiled once per language id and shared (`Arc`) by every buffer of that
/// language; all patterns are compiled exactly once, at load time.
pub struct LanguageProfile {
    /// Lowercased language id.
    pub language: String,
    /// Line comment marker, if the language has one.
    pub line_comment: Option<String>,
    /// Block comment start/end markers, if the language has them.
    pub block_comment: Option<(String, String)>,
    /// Literal indentation unit.
    pub indent_unit: String,
    /// Compiled indent trigger patterns, in declaration order.
    pub indent_triggers: Vec<Regex>,
    /// Compiled dedent trigger patterns, in declaration order.
    pub dedent_triggers: Vec<Regex>,
    /// Compiled definition rules, in declaration order (order is the
    /// overlap tie-break).
    pub definitions: Vec<DefinitionRule>,
    /// Compiled identifier extraction rules.
    pub symbol_rules: Vec<SymbolRule>,
    /// Compiled token rules, sorted by priority (index 0 claims first).
    pub token_rules: Vec<TokenRule>,
    /// Static completion candidates, in declaration order.
    pub suggestions: Vec<SuggestionCategory>,
}

impl LanguageProfile {
    /// Compile a raw definition into an immutable profile.
    ///
    /// A pattern that fails to compile, or a rule whose declared capture
    /// group does not exist, disables only that rule and is reported in the
    /// returned warning list. Structural problems (missing language id,
    /// malformed `block_comment`, a definition without a usable
    /// `name_group`) fail the whole profile.
    pub fn compile(
        definition: ProfileDefinition,
    ) -> Result<(Self, Vec<ProfileWarning>), ProfileError> {
        if definition.language.trim().is_empty() {
            return Err(ProfileError::Structural(
                "profile is missing a language id".to_string(),
            ));
        }
        let language = definition.language.trim().to_ascii_lowercase();
        let mut warnings = Vec::new();

        let block_comment = match definition.block_comment {
            None => None,
            Some(pair) => {
                if pair.len() != 2 {
                    return Err(ProfileError::Structural(format!(
                        "block_comment must be a [start, end] pair, got {} element(s)",
                        pair.len()
                    )));
                }
                let mut markers = pair.into_iter();
                match (markers.next().flatten(), markers.next().flatten()) {
                    (Some(start), Some(end)) if !start.is_empty() && !end.is_empty() => {
                        Some((start, end))
                    }
                    _ => None,
                }
            }
        };

        let indent_triggers =
            compile_trigger_list("indent_triggers", &definition.indent_triggers, &mut warnings);
        let dedent_triggers =
            compile_trigger_list("dedent_triggers", &definition.dedent_triggers, &mut warnings);

        let mut token_rules = Vec::with_capacity(definition.syntax_tokens.len());
        for entry in &definition.syntax_tokens {
            let rule_name = format!("syntax token '{}'", entry.category);
            let Some(regex) = compile_pattern(&rule_name, &entry.pattern, &mut warnings) else {
                continue;
            };
            token_rules.push(TokenRule {
                category: Arc::from(entry.category.as_str()),
                priority: entry.priority,
                regex,
            });
        }
        // Stable: equal ordinals keep declaration order.
        token_rules.sort_by_key(|rule| rule.priority);
        check_literal_priority(&token_rules, &mut warnings);

        let mut definitions = Vec::with_capacity(definition.definitions.len());
        for entry in &definition.definitions {
            let rule_name = format!("definition '{}'", entry.kind);
            if entry.name_group == 0 {
                return Err(ProfileError::Structural(format!(
                    "{rule_name} must declare name_group >= 1"
                )));
            }
            let Some(regex) = compile_pattern(&rule_name, &entry.pattern, &mut warnings) else {
                continue;
            };
            let available = regex.captures_len().saturating_sub(1);
            if entry.name_group > available {
                warnings.push(ProfileWarning::CaptureOutOfRange {
                    rule: rule_name,
                    group: entry.name_group,
                    available,
                });
                continue;
            }
            if let Some(group) = entry.params_group {
                if group == 0 || group > available {
                    warnings.push(ProfileWarning::CaptureOutOfRange {
                        rule: rule_name,
                        group,
                        available,
                    });
                    continue;
                }
            }
            definitions.push(DefinitionRule {
                kind: entry.kind.clone(),
                regex,
                name_group: entry.name_group,
                params_group: entry.params_group,
            });
        }

        let mut symbol_rules = Vec::with_capacity(definition.symbol_patterns.len());
        for entry in &definition.symbol_patterns {
            let rule_name = format!("symbol pattern '{}'", entry.kind);
            let Some(regex) = compile_pattern(&rule_name, &entry.pattern, &mut warnings) else {
                continue;
            };
            if regex.captures_len() < 2 {
                // Group 1 carries the name; a pattern without captures can
                // never produce one.
                warnings.push(ProfileWarning::CaptureOutOfRange {
                    rule: rule_name,
                    group: 1,
                    available: 0,
                });
                continue;
            }
            symbol_rules.push(SymbolRule {
                kind: entry.kind,
                regex,
            });
        }

        let suggestions = definition
            .suggestions_categorized
            .iter()
            .map(|category| SuggestionCategory {
                name: category.category.clone(),
                items: category.items.clone(),
            })
            .collect();

        Ok((
            Self {
                language,
                line_comment: definition.comment,
                block_comment,
                indent_unit: definition.indent,
                indent_triggers,
                dedent_triggers,
                definitions,
                symbol_rules,
                token_rules,
                suggestions,
            },
            warnings,
        ))
    }

    /// The fallback profile: no triggers, no rules, a single `plain` token
    /// category matching the whole line. Editing continues unhighlighted.
    pub fn plain(language: &str) -> Self {
        let mut token_rules = Vec::with_capacity(1);
        if let Ok(regex) = Regex::new(r".+") {
            token_rules.push(TokenRule {
                category: Arc::from(PLAIN_CATEGORY),
                priority: 0,
                regex,
            });
        }
        Self {
            language: language.trim().to_ascii_lowercase(),
            line_comment: None,
            block_comment: None,
            indent_unit: "    ".to_string(),
            indent_triggers: Vec::new(),
            dedent_triggers: Vec::new(),
            definitions: Vec::new(),
            symbol_rules: Vec::new(),
            token_rules,
            suggestions: Vec::new(),
        }
    }

    /// Returns `true` if both block comment markers are configured.
    pub fn has_block_comments(&self) -> bool {
        self.block_comment.is_some()
    }
}

fn compile_pattern(
    rule: &str,
    pattern: &str,
    warnings: &mut Vec<ProfileWarning>,
) -> Option<Regex> {
    match Regex::new(pattern) {
        Ok(regex) => Some(regex),
        Err(err) => {
            warnings.push(ProfileWarning::PatternCompile {
                rule: rule.to_string(),
                pattern: pattern.to_string(),
                message: err.to_string(),
            });
            None
        }
    }
}

fn compile_trigger_list(
    list: &str,
    patterns: &[String],
    warnings: &mut Vec<ProfileWarning>,
) -> Vec<Regex> {
    patterns
        .iter()
        .enumerate()
        .filter_map(|(index, pattern)| {
            compile_pattern(&format!("{list}[{index}]"), pattern, warnings)
        })
        .collect()
}

/// Warn when a code category outranks a literal-bearing category. A profile
/// shaped that way reclassifies keyword-like substrings inside strings and
/// comments; it still loads, but the author should hear about it.
fn check_literal_priority(rules: &[TokenRule], warnings: &mut Vec<ProfileWarning>) {
    for (index, code) in rules.iter().enumerate() {
        if !CODE_CATEGORIES.contains(&code.category.as_ref()) {
            continue;
        }
        for literal in &rules[index + 1..] {
            if LITERAL_CATEGORIES.contains(&literal.category.as_ref()) {
                warnings.push(ProfileWarning::LiteralPriority {
                    literal: literal.category.to_string(),
                    code: code.category.to_string(),
                });
                // One warning describes the whole ordering problem.
                return;
            }
        }
    }
}
