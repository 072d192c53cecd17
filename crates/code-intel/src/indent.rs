//! Indent/dedent trigger evaluation.

use code_intel_profile::LanguageProfile;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
/// Auto-indent decision for the line that textually follows the evaluated
/// line.
pub enum IndentDecision {
    /// The next line should be indented one unit deeper.
    Increase,
    /// The next line should be indented one unit shallower.
    Decrease,
    /// No change.
    #[default]
    None,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
/// Separated indent effects, for lines that close one block and open
/// another (`} else {`).
pub struct IndentAnalysis {
    /// The evaluated line itself matched a dedent trigger and should be
    /// re-indented one unit shallower (applied immediately by the host,
    /// typically as the closing character is typed).
    pub reindent_current: bool,
    /// The decision for the following line.
    pub next_line: IndentDecision,
}

/// Evaluate a line against the profile's trigger patterns.
///
/// Any dedent-trigger match yields [`IndentDecision::Decrease`] and takes
/// precedence; otherwise any indent-trigger match yields
/// [`IndentDecision::Increase`]. The line is whitespace-trimmed before
/// matching, so anchored patterns see the significant text.
pub fn evaluate(line: &str, profile: &LanguageProfile) -> IndentDecision {
    let analysis = evaluate_full(line, profile);
    if analysis.reindent_current {
        IndentDecision::Decrease
    } else {
        analysis.next_line
    }
}

/// Evaluate a line, keeping the current-line and next-line effects separate.
///
/// When both trigger classes match, the current line dedents *and* the next
/// line indents; [`evaluate`] collapses that to `Decrease`.
pub fn evaluate_full(line: &str, profile: &LanguageProfile) -> IndentAnalysis {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return IndentAnalysis::default();
    }

    let dedents = profile
        .dedent_triggers
        .iter()
        .any(|pattern| pattern.is_match(trimmed));
    let indents = profile
        .indent_triggers
        .iter()
        .any(|pattern| pattern.is_match(trimmed));

    IndentAnalysis {
        reindent_current: dedents,
        next_line: if indents {
            IndentDecision::Increase
        } else if dedents {
            IndentDecision::Decrease
        } else {
            IndentDecision::None
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use code_intel_profile::ProfileDefinition;

    fn python_like() -> LanguageProfile {
        let mut def = ProfileDefinition::new("test");
        def.indent_triggers = vec![r":\s*$".to_string(), r"\{\s*$".to_string()];
        def.dedent_triggers = vec![
            r"^(return|break|continue|pass)\b".to_string(),
            r"^\}".to_string(),
        ];
        let (profile, warnings) = LanguageProfile::compile(def).unwrap();
        assert!(warnings.is_empty());
        profile
    }

    #[test]
    fn colon_increases_next_line() {
        let profile = python_like();
        assert_eq!(evaluate("if True:", &profile), IndentDecision::Increase);
    }

    #[test]
    fn return_decreases() {
        let profile = python_like();
        assert_eq!(evaluate("    return x", &profile), IndentDecision::Decrease);
    }

    #[test]
    fn plain_line_is_none() {
        let profile = python_like();
        assert_eq!(evaluate("x = 1", &profile), IndentDecision::None);
        assert_eq!(evaluate("", &profile), IndentDecision::None);
    }

    #[test]
    fn close_and_reopen_reports_both_effects() {
        let profile = python_like();
        assert_eq!(evaluate("} else {", &profile), IndentDecision::Decrease);

        let analysis = evaluate_full("} else {", &profile);
        assert!(analysis.reindent_current);
        assert_eq!(analysis.next_line, IndentDecision::Increase);
    }

    #[test]
    fn trailing_whitespace_is_ignored() {
        let profile = python_like();
        assert_eq!(evaluate("while x:   ", &profile), IndentDecision::Increase);
    }
}
