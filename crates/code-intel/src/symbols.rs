//! Identifier extraction (variables, parameters, imports).

use crate::definitions::Definition;
use code_intel_profile::{LanguageProfile, SymbolKind};
use std::collections::{HashMap, HashSet};

#[derive(Debug, Clone, PartialEq, Eq)]
/// An extracted identifier, used for completion.
pub struct Symbol {
    /// What kind of identifier this is.
    pub kind: SymbolKind,
    /// The identifier text.
    pub name: String,
    /// Line index of the first occurrence.
    pub line: usize,
}

/// Scan buffer text for identifiers.
///
/// Returns symbols in first-occurrence order, deduplicated by (kind, name):
/// later occurrences are ignored but do not invalidate the first. Parameter
/// names are additionally derived from the raw parameter text of extracted
/// `definitions`, attributed to each definition's first line.
pub fn extract(
    text: &str,
    profile: &LanguageProfile,
    definitions: &[Definition],
) -> Vec<Symbol> {
    let mut defs_by_line: HashMap<usize, Vec<&Definition>> = HashMap::new();
    for definition in definitions {
        defs_by_line
            .entry(definition.start_line)
            .or_default()
            .push(definition);
    }

    let mut seen: HashSet<(SymbolKind, String)> = HashSet::new();
    let mut symbols = Vec::new();

    for (line_index, line) in text.split('\n').enumerate() {
        let line = line.strip_suffix('\r').unwrap_or(line);

        for rule in &profile.symbol_rules {
            match rule.kind {
                SymbolKind::Import => {
                    // Imports may list several names, spread over any of the
                    // pattern's capture groups, comma-separated within each.
                    for caps in rule.regex.captures_iter(line) {
                        for group in 1..caps.len() {
                            let Some(m) = caps.get(group) else { continue };
                            for part in m.as_str().split(',') {
                                push_symbol(
                                    &mut symbols,
                                    &mut seen,
                                    SymbolKind::Import,
                                    part,
                                    line_index,
                                );
                            }
                        }
                    }
                }
                SymbolKind::Variable | SymbolKind::Parameter => {
                    for caps in rule.regex.captures_iter(line) {
                        let Some(m) = caps.get(1) else { continue };
                        push_symbol(&mut symbols, &mut seen, rule.kind, m.as_str(), line_index);
                    }
                }
            }
        }

        if let Some(defs) = defs_by_line.get(&line_index) {
            for definition in defs {
                let Some(params) = definition.params.as_deref() else {
                    continue;
                };
                for part in params.split(',') {
                    let Some(name) = parameter_name(part) else {
                        continue;
                    };
                    push_symbol(
                        &mut symbols,
                        &mut seen,
                        SymbolKind::Parameter,
                        name,
                        line_index,
                    );
                }
            }
        }
    }

    symbols
}

fn push_symbol(
    symbols: &mut Vec<Symbol>,
    seen: &mut HashSet<(SymbolKind, String)>,
    kind: SymbolKind,
    name: &str,
    line: usize,
) {
    let name = name.trim();
    if name.is_empty() {
        return;
    }
    // Purely numeric "names" come from patterns matching literal values.
    if name.chars().all(|c| c.is_ascii_digit()) {
        return;
    }
    let key = (kind, name.to_string());
    if seen.contains(&key) {
        return;
    }
    seen.insert(key);
    symbols.push(Symbol {
        kind,
        name: name.to_string(),
        line,
    });
}

/// Extract the identifier from one raw parameter fragment: defaults and type
/// annotations are stripped (`x: int = 3` → `x`, `int x` → `x`,
/// `**kwargs` → `kwargs`).
fn parameter_name(part: &str) -> Option<&str> {
    let part = part.split('=').next().unwrap_or("");
    let part = part.split(':').next().unwrap_or("");
    let word = part.split_whitespace().last()?;
    let word = word.trim_start_matches(['*', '&']);
    let mut chars = word.chars();
    match chars.next() {
        Some(c) if c.is_alphabetic() || c == '_' => {}
        _ => return None,
    }
    if word.chars().all(|c| c.is_alphanumeric() || c == '_') {
        Some(word)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use code_intel_profile::{ProfileDefinition, SymbolEntry};

    fn profile(patterns: &[(SymbolKind, &str)]) -> LanguageProfile {
        let mut def = ProfileDefinition::new("test");
        def.symbol_patterns = patterns
            .iter()
            .map(|&(kind, pattern)| SymbolEntry {
                kind,
                pattern: pattern.to_string(),
            })
            .collect();
        let (profile, warnings) = LanguageProfile::compile(def).unwrap();
        assert!(warnings.is_empty());
        profile
    }

    #[test]
    fn first_occurrence_wins() {
        let profile = profile(&[(SymbolKind::Variable, r"(\w+)\s*=")]);
        let symbols = extract("x = 1\ny = 2\nx = 3\n", &profile, &[]);
        assert_eq!(symbols.len(), 2);
        assert_eq!(symbols[0].name, "x");
        assert_eq!(symbols[0].line, 0);
        assert_eq!(symbols[1].name, "y");
    }

    #[test]
    fn import_lists_are_split() {
        let profile = profile(&[(SymbolKind::Import, r"^import\s+([\w, ]+)")]);
        let symbols = extract("import os, sys\n", &profile, &[]);
        let names: Vec<&str> = symbols.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, ["os", "sys"]);
        assert!(symbols.iter().all(|s| s.kind == SymbolKind::Import));
    }

    #[test]
    fn numeric_captures_are_dropped() {
        let profile = profile(&[(SymbolKind::Variable, r"(\w+)\s*=")]);
        let symbols = extract("42 = nonsense\nok = 1\n", &profile, &[]);
        assert_eq!(symbols.len(), 1);
        assert_eq!(symbols[0].name, "ok");
    }

    #[test]
    fn parameters_come_from_definitions() {
        let profile = profile(&[]);
        let definitions = vec![Definition {
            kind: "function".to_string(),
            name: "compute".to_string(),
            params: Some("alpha, beta: int = 3, **kwargs".to_string()),
            start_line: 4,
            end_line: 4,
        }];
        let symbols = extract("\n\n\n\ndef compute(...)\n", &profile, &definitions);
        let names: Vec<&str> = symbols.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, ["alpha", "beta", "kwargs"]);
        assert!(symbols.iter().all(|s| s.kind == SymbolKind::Parameter));
        assert!(symbols.iter().all(|s| s.line == 4));
    }

    #[test]
    fn same_name_different_kind_is_kept() {
        let profile = profile(&[
            (SymbolKind::Variable, r"let\s+(\w+)"),
            (SymbolKind::Import, r"use\s+(\w+)"),
        ]);
        let symbols = extract("let data = 1\nuse data\n", &profile, &[]);
        assert_eq!(symbols.len(), 2);
        assert_eq!(symbols[0].kind, SymbolKind::Variable);
        assert_eq!(symbols[1].kind, SymbolKind::Import);
    }

    #[test]
    fn c_style_parameter_names() {
        assert_eq!(parameter_name("int x"), Some("x"));
        assert_eq!(parameter_name(" alpha "), Some("alpha"));
        assert_eq!(parameter_name("beta: str"), Some("beta"));
        assert_eq!(parameter_name("gamma=3"), Some("gamma"));
        assert_eq!(parameter_name("**kwargs"), Some("kwargs"));
        assert_eq!(parameter_name("&mut buf"), Some("buf"));
        assert_eq!(parameter_name("123"), None);
        assert_eq!(parameter_name(""), None);
    }
}
