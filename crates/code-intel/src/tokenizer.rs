//! Priority-claiming line tokenizer.
//!
//! Token rules are tried in declared priority order; each rule may claim any
//! text no earlier rule has claimed, and later rules can never reclaim a
//! span. Block comments are resolved before the priority scan so that a
//! line continuing a comment is never re-classified by code rules.

use crate::token::{ScanState, Token};
use code_intel_profile::{COMMENT_CATEGORY, LanguageProfile, PLAIN_CATEGORY};
use std::sync::Arc;

/// Classify one line of text into ordered, non-overlapping tokens.
///
/// `state` is the scan state carried out of the previous line
/// ([`ScanState::Normal`] for the first line of a buffer). The returned
/// state feeds the next line; an unterminated block comment at end-of-buffer
/// simply leaves every remaining line classified as comment.
///
/// Within one rule, matches are found left to right and never overlap; text
/// no rule claimed becomes `"plain"` tokens. The returned tokens are sorted
/// by start offset and partition `[0, line_len)`.
pub fn tokenize(
    line: &str,
    state: ScanState,
    profile: &LanguageProfile,
) -> (Vec<Token>, ScanState) {
    let line_len = line.len();
    let mut next_state = ScanState::Normal;

    // Byte spans forced to "comment" by block-comment markers, resolved
    // before any rule runs.
    let mut forced: Vec<(usize, usize)> = Vec::new();
    let mut cursor = 0usize;

    if state == ScanState::InsideBlockComment {
        match profile
            .block_comment
            .as_ref()
            .and_then(|(_, end)| line.find(end.as_str()).map(|at| at + end.len()))
        {
            Some(close) => {
                forced.push((0, close));
                cursor = close;
            }
            None => {
                // Still unterminated; the whole line is comment.
                forced.push((0, line_len));
                cursor = line_len;
                next_state = ScanState::InsideBlockComment;
            }
        }
    }

    if let Some((start, end)) = profile.block_comment.as_ref() {
        while cursor < line_len {
            let Some(found) = line[cursor..].find(start.as_str()) else {
                break;
            };
            let open = cursor + found;
            let content_from = open + start.len();
            match line[content_from..].find(end.as_str()) {
                Some(found_end) => {
                    let close = content_from + found_end + end.len();
                    forced.push((open, close));
                    cursor = close;
                }
                None => {
                    forced.push((open, line_len));
                    cursor = line_len;
                    next_state = ScanState::InsideBlockComment;
                }
            }
        }
    }

    // Unclaimed byte ranges, kept sorted; starts as the complement of the
    // forced comment spans.
    let mut free: Vec<(usize, usize)> = Vec::new();
    let mut pos = 0usize;
    for &(from, to) in &forced {
        if from > pos {
            free.push((pos, from));
        }
        pos = pos.max(to);
    }
    if pos < line_len {
        free.push((pos, line_len));
    }

    let mut claims: Vec<(usize, usize, Arc<str>)> = Vec::new();
    for rule in &profile.token_rules {
        if free.is_empty() {
            break;
        }
        for m in rule.regex.find_iter(line) {
            if m.start() == m.end() {
                continue;
            }
            // A match is only taken when it lies wholly inside unclaimed
            // text; straddling a claimed span would reclaim it.
            if claim_span(&mut free, m.start(), m.end()) {
                claims.push((m.start(), m.end(), rule.category.clone()));
            }
        }
    }

    let comment: Arc<str> = Arc::from(COMMENT_CATEGORY);
    let plain: Arc<str> = Arc::from(PLAIN_CATEGORY);

    let mut spans: Vec<(usize, usize, Arc<str>)> = Vec::new();
    for &(from, to) in &forced {
        if to > from {
            spans.push((from, to, comment.clone()));
        }
    }
    spans.append(&mut claims);
    for &(from, to) in &free {
        spans.push((from, to, plain.clone()));
    }
    spans.sort_by_key(|&(from, _, _)| from);

    // The spans partition the line; converting byte offsets to char offsets
    // is a single left-to-right walk.
    let mut tokens = Vec::with_capacity(spans.len());
    let mut char_pos = 0usize;
    for (from, to, category) in spans {
        let text = &line[from..to];
        let char_len = text.chars().count();
        tokens.push(Token {
            category,
            start: char_pos,
            end: char_pos + char_len,
            text: text.to_string(),
        });
        char_pos += char_len;
    }

    (tokens, next_state)
}

/// Remove `[start, end)` from the free list if some segment fully contains
/// it, splitting that segment. Returns `false` when the span overlaps
/// already-claimed text.
fn claim_span(free: &mut Vec<(usize, usize)>, start: usize, end: usize) -> bool {
    let Some(index) = free
        .iter()
        .position(|&(from, to)| start >= from && end <= to)
    else {
        return false;
    };
    let (from, to) = free.remove(index);
    if end < to {
        free.insert(index, (end, to));
    }
    if from < start {
        free.insert(index, (from, start));
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use code_intel_profile::{ProfileDefinition, TokenEntry};

    fn profile(tokens: &[(&str, &str, u32)], block: Option<(&str, &str)>) -> LanguageProfile {
        let mut def = ProfileDefinition::new("test");
        if let Some((start, end)) = block {
            def.block_comment = Some(vec![Some(start.to_string()), Some(end.to_string())]);
        }
        def.syntax_tokens = tokens
            .iter()
            .map(|&(category, pattern, priority)| TokenEntry {
                category: category.to_string(),
                pattern: pattern.to_string(),
                priority,
            })
            .collect();
        let (profile, warnings) = LanguageProfile::compile(def).unwrap();
        assert!(warnings.is_empty(), "unexpected warnings: {warnings:?}");
        profile
    }

    fn c_like() -> LanguageProfile {
        profile(
            &[
                ("string", r#""[^"]*""#, 0),
                ("comment", r"//.*", 1),
                ("keyword", r"\b(class|if|else|return)\b", 2),
                ("number", r"\b\d+\b", 3),
            ],
            Some(("/*", "*/")),
        )
    }

    fn assert_partition(line: &str, tokens: &[Token]) {
        let mut expected_start = 0usize;
        for token in tokens {
            assert_eq!(token.start, expected_start, "gap or overlap in {tokens:?}");
            assert!(token.end > token.start);
            expected_start = token.end;
        }
        assert_eq!(expected_start, line.chars().count());
    }

    #[test]
    fn tokens_partition_the_line() {
        let profile = c_like();
        for line in [
            "if x > 10 { return 1; } // done",
            "   ",
            "word",
            r#"s = "héllo" + 42"#,
        ] {
            let (tokens, _) = tokenize(line, ScanState::Normal, &profile);
            assert_partition(line, &tokens);
        }
    }

    #[test]
    fn empty_line_yields_no_tokens() {
        let profile = c_like();
        let (tokens, state) = tokenize("", ScanState::Normal, &profile);
        assert!(tokens.is_empty());
        assert_eq!(state, ScanState::Normal);
    }

    #[test]
    fn string_claims_keyword_substring() {
        let profile = c_like();
        let (tokens, _) = tokenize(r#"x = "class Foo""#, ScanState::Normal, &profile);
        let string_token = tokens
            .iter()
            .find(|t| t.category.as_ref() == "string")
            .expect("string token");
        assert_eq!(string_token.text, r#""class Foo""#);
        // The keyword literal inside the quotes was not reclassified.
        assert!(!tokens.iter().any(|t| t.category.as_ref() == "keyword"));
    }

    #[test]
    fn later_rules_keep_spans_outside_claims() {
        let profile = c_like();
        let (tokens, _) = tokenize(r#"if "if" else"#, ScanState::Normal, &profile);
        let keywords: Vec<&str> = tokens
            .iter()
            .filter(|t| t.category.as_ref() == "keyword")
            .map(|t| t.text.as_str())
            .collect();
        assert_eq!(keywords, ["if", "else"]);
    }

    #[test]
    fn unclaimed_text_is_plain() {
        let profile = c_like();
        let (tokens, _) = tokenize("foo = 10", ScanState::Normal, &profile);
        let plain: Vec<&str> = tokens
            .iter()
            .filter(|t| t.category.as_ref() == PLAIN_CATEGORY)
            .map(|t| t.text.as_str())
            .collect();
        assert_eq!(plain, ["foo = "]);
    }

    #[test]
    fn block_comment_opens_and_carries_state() {
        let profile = c_like();
        let (tokens, state) = tokenize("if x /* note", ScanState::Normal, &profile);
        assert_eq!(state, ScanState::InsideBlockComment);
        let last = tokens.last().unwrap();
        assert_eq!(last.category.as_ref(), "comment");
        assert_eq!(last.text, "/* note");
    }

    #[test]
    fn continued_block_comment_closes_midline_and_resumes() {
        let profile = c_like();
        let (tokens, state) = tokenize("still */ return 1", ScanState::InsideBlockComment, &profile);
        assert_eq!(state, ScanState::Normal);
        assert_eq!(tokens[0].category.as_ref(), "comment");
        assert_eq!(tokens[0].text, "still */");
        assert!(
            tokens
                .iter()
                .any(|t| t.category.as_ref() == "keyword" && t.text == "return")
        );
    }

    #[test]
    fn unterminated_comment_swallows_whole_line() {
        let profile = c_like();
        let (tokens, state) = tokenize("return if else", ScanState::InsideBlockComment, &profile);
        assert_eq!(state, ScanState::InsideBlockComment);
        assert_eq!(tokens.len(), 1);
        assert_eq!(tokens[0].category.as_ref(), "comment");
        assert_eq!(tokens[0].text, "return if else");
    }

    #[test]
    fn inline_block_comment_resumes_after_end_marker() {
        let profile = c_like();
        let (tokens, state) = tokenize("if /* mid */ else", ScanState::Normal, &profile);
        assert_eq!(state, ScanState::Normal);
        assert!(
            tokens
                .iter()
                .any(|t| t.category.as_ref() == "comment" && t.text == "/* mid */")
        );
        assert!(
            tokens
                .iter()
                .any(|t| t.category.as_ref() == "keyword" && t.text == "else")
        );
    }

    #[test]
    fn multiline_signature_state_scans_normally() {
        let profile = c_like();
        let (tokens, state) = tokenize("return 1", ScanState::InsideMultilineSignature, &profile);
        assert_eq!(state, ScanState::Normal);
        assert!(tokens.iter().any(|t| t.category.as_ref() == "keyword"));
    }

    #[test]
    fn tokenize_is_deterministic() {
        let profile = c_like();
        let line = r#"if "s" /* c */ 42 // tail"#;
        let first = tokenize(line, ScanState::Normal, &profile);
        let second = tokenize(line, ScanState::Normal, &profile);
        assert_eq!(first, second);
    }

    #[test]
    fn char_offsets_follow_multibyte_text() {
        let profile = c_like();
        let line = r#"é = "héllo""#;
        let (tokens, _) = tokenize(line, ScanState::Normal, &profile);
        assert_partition(line, &tokens);
        let string_token = tokens
            .iter()
            .find(|t| t.category.as_ref() == "string")
            .unwrap();
        assert_eq!(string_token.start, 4);
        assert_eq!(string_token.end, 11);
    }
}
