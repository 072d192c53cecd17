//! Structural definition extraction (functions, classes, and friends).

use crate::token::ScanState;
use code_intel_profile::{DefinitionRule, LanguageProfile};

/// How many continuation lines a signature window may span before the
/// extractor gives up and keeps the single-line interpretation.
const SIGNATURE_WINDOW: usize = 8;

#[derive(Debug, Clone, PartialEq, Eq)]
/// An extracted structural definition.
pub struct Definition {
    /// Definition kind tag, as declared by the matching profile rule.
    pub kind: String,
    /// The definition name, taken from the rule's declared name group.
    pub name: String,
    /// Raw parameter text, when the rule declares a params group.
    pub params: Option<String>,
    /// Line index of the signature's first line.
    pub start_line: usize,
    /// Line index of the signature's last line (equals `start_line` for
    /// single-line signatures).
    pub end_line: usize,
}

/// Scan buffer text for definitions, in source order.
///
/// Rules are tried in profile declaration order; when two kinds would claim
/// overlapping text on a line, the earlier-declared kind wins. A candidate
/// whose name capture is missing or empty is skipped silently. A line that
/// opens a parenthesis without closing it is retried over a bounded
/// multi-line window so that wrapped signatures are still found.
pub fn extract(text: &str, profile: &LanguageProfile) -> Vec<Definition> {
    let lines: Vec<&str> = text
        .split('\n')
        .map(|line| line.strip_suffix('\r').unwrap_or(line))
        .collect();

    // (start column, definition); the column is only a sort key.
    let mut found: Vec<(usize, Definition)> = Vec::new();
    let mut state = ScanState::Normal;
    let mut resume_at = 0usize;

    for (line_index, line) in lines.iter().enumerate() {
        if state == ScanState::InsideMultilineSignature {
            if line_index < resume_at {
                continue;
            }
            state = ScanState::Normal;
        }

        let mut claimed: Vec<(usize, usize)> = Vec::new();
        for rule in &profile.definitions {
            let mut rule_matched = false;
            for caps in rule.regex.captures_iter(line) {
                let Some(whole) = caps.get(0) else { continue };
                if overlaps(&claimed, whole.start(), whole.end()) {
                    continue;
                }
                let Some(name) = caps.get(rule.name_group) else {
                    continue;
                };
                let name = name.as_str().trim();
                if name.is_empty() {
                    continue;
                }
                claimed.push((whole.start(), whole.end()));
                rule_matched = true;
                found.push((
                    whole.start(),
                    Definition {
                        kind: rule.kind.clone(),
                        name: name.to_string(),
                        params: capture_params(rule, &caps),
                        start_line: line_index,
                        end_line: line_index,
                    },
                ));
            }

            if !rule_matched && has_open_paren(line) {
                if let Some((column, definition)) = match_window(rule, &lines, line_index) {
                    if !overlaps(&claimed, column, line.len()) {
                        claimed.push((column, line.len()));
                        state = ScanState::InsideMultilineSignature;
                        resume_at = definition.end_line + 1;
                        found.push((column, definition));
                    }
                }
            }
        }
    }

    found.sort_by_key(|entry| (entry.1.start_line, entry.0));
    found.into_iter().map(|(_, definition)| definition).collect()
}

/// Join lines until the parenthesis opened on `start_line` balances (bounded
/// by [`SIGNATURE_WINDOW`]), then retry the rule against the joined text.
fn match_window(
    rule: &DefinitionRule,
    lines: &[&str],
    start_line: usize,
) -> Option<(usize, Definition)> {
    let last = (start_line + SIGNATURE_WINDOW).min(lines.len().saturating_sub(1));
    let mut joined = lines[start_line].to_string();

    for end_line in start_line + 1..=last {
        joined.push(' ');
        joined.push_str(lines[end_line]);
        if has_open_paren(&joined) {
            continue;
        }

        for caps in rule.regex.captures_iter(&joined) {
            let Some(whole) = caps.get(0) else { continue };
            // The signature head must sit on the original line.
            if whole.start() >= lines[start_line].len() {
                continue;
            }
            let Some(name) = caps.get(rule.name_group) else {
                continue;
            };
            let name = name.as_str().trim();
            if name.is_empty() {
                continue;
            }
            return Some((
                whole.start(),
                Definition {
                    kind: rule.kind.clone(),
                    name: name.to_string(),
                    params: capture_params(rule, &caps),
                    start_line,
                    end_line,
                },
            ));
        }
        // Balanced but still no match; a longer window will not help.
        return None;
    }
    None
}

fn capture_params(rule: &DefinitionRule, caps: &regex::Captures<'_>) -> Option<String> {
    rule.params_group
        .and_then(|group| caps.get(group))
        .map(|m| m.as_str().to_string())
}

fn has_open_paren(text: &str) -> bool {
    let mut depth = 0isize;
    for c in text.chars() {
        match c {
            '(' => depth += 1,
            ')' => depth -= 1,
            _ => {}
        }
    }
    depth > 0
}

fn overlaps(claimed: &[(usize, usize)], start: usize, end: usize) -> bool {
    claimed.iter().any(|&(from, to)| start < to && from < end)
}

#[cfg(test)]
mod tests {
    use super::*;
    use code_intel_profile::{DefinitionEntry, ProfileDefinition};

    fn profile(entries: &[(&str, &str, usize, Option<usize>)]) -> LanguageProfile {
        let mut def = ProfileDefinition::new("test");
        def.definitions = entries
            .iter()
            .map(|&(kind, pattern, name_group, params_group)| DefinitionEntry {
                kind: kind.to_string(),
                pattern: pattern.to_string(),
                name_group,
                params_group,
            })
            .collect();
        let (profile, warnings) = LanguageProfile::compile(def).unwrap();
        assert!(warnings.is_empty(), "unexpected warnings: {warnings:?}");
        profile
    }

    #[test]
    fn method_name_comes_from_declared_group() {
        let profile = profile(&[(
            "method",
            r"(?:public|private)?\s*\w+\s+(\w+)\s*\(([^)]*)\)",
            1,
            Some(2),
        )]);
        let defs = extract("public void Foo(int x) {", &profile);
        assert_eq!(defs.len(), 1);
        assert_eq!(defs[0].kind, "method");
        assert_eq!(defs[0].name, "Foo");
        assert_eq!(defs[0].params.as_deref(), Some("int x"));
        assert_eq!(defs[0].start_line, 0);
        assert_eq!(defs[0].end_line, 0);
    }

    #[test]
    fn empty_name_capture_is_skipped() {
        let profile = profile(&[("function", r"def\s*(\w*)\s*\(", 1, None)]);
        let defs = extract("def (x):", &profile);
        assert!(defs.is_empty());
    }

    #[test]
    fn earlier_declared_kind_wins_overlap() {
        // Both rules match `class Foo`; the earlier-declared kind claims it.
        let profile = profile(&[
            ("class", r"class\s+(\w+)", 1, None),
            ("identifier_pair", r"(\w+)\s+\w+", 1, None),
        ]);
        let defs = extract("class Foo", &profile);
        assert_eq!(defs.len(), 1);
        assert_eq!(defs[0].kind, "class");
        assert_eq!(defs[0].name, "Foo");
    }

    #[test]
    fn wrapped_signature_uses_bounded_window() {
        let profile = profile(&[("function", r"def\s+(\w+)\s*\(([^)]*)\)", 1, Some(2))]);
        let text = "def compute(\n    alpha,\n    beta,\n):\n    return alpha\n";
        let defs = extract(text, &profile);
        assert_eq!(defs.len(), 1);
        assert_eq!(defs[0].name, "compute");
        assert_eq!(defs[0].start_line, 0);
        assert_eq!(defs[0].end_line, 3);
        let params = defs[0].params.as_deref().unwrap();
        assert!(params.contains("alpha") && params.contains("beta"));
    }

    #[test]
    fn unbalanced_beyond_window_is_dropped() {
        let profile = profile(&[("function", r"def\s+(\w+)\s*\(([^)]*)\)", 1, Some(2))]);
        let mut text = String::from("def forever(\n");
        for _ in 0..12 {
            text.push_str("    arg,\n");
        }
        let defs = extract(&text, &profile);
        assert!(defs.is_empty());
    }

    #[test]
    fn definitions_come_back_in_source_order() {
        let profile = profile(&[
            ("class", r"class\s+(\w+)", 1, None),
            ("function", r"def\s+(\w+)\s*\(([^)]*)\)", 1, Some(2)),
        ]);
        let text = "def first():\nclass Second:\ndef third():\n";
        let names: Vec<String> = extract(text, &profile)
            .into_iter()
            .map(|d| d.name)
            .collect();
        assert_eq!(names, ["first", "Second", "third"]);
    }

    #[test]
    fn lines_inside_a_consumed_window_are_not_rescanned() {
        let profile = profile(&[
            ("function", r"def\s+(\w+)\s*\(([^)]*)\)", 1, Some(2)),
            ("variable_assignment", r"(\w+)\s*=", 1, None),
        ]);
        let text = "def wrapped(\n    alpha=1,\n):\nx = 2\n";
        let defs = extract(text, &profile);
        // `alpha=1` inside the signature window is not a separate assignment.
        assert_eq!(defs.len(), 2);
        assert_eq!(defs[0].name, "wrapped");
        assert_eq!(defs[1].name, "x");
        assert_eq!(defs[1].kind, "variable_assignment");
    }
}
