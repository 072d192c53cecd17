//! Classified-span data model shared by the tokenizer and the session layer.

use std::sync::Arc;

#[derive(Debug, Clone, PartialEq, Eq)]
/// A classified span of a line's text.
///
/// Offsets are line-relative, half-open, and counted in Unicode scalar
/// values (`char`), consistent with the rest of the engine. The tokens for a
/// line are non-overlapping and jointly cover `[0, line_len)`.
pub struct Token {
    /// Category label (e.g. `"string"`, `"keyword"`, or the reserved
    /// `"plain"` for unclaimed text).
    pub category: Arc<str>,
    /// Start offset (inclusive), in `char`s from the start of the line.
    pub start: usize,
    /// End offset (exclusive), in `char`s from the start of the line.
    pub end: usize,
    /// The matched text.
    pub text: String,
}

impl Token {
    /// Span length in `char`s.
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    /// Returns `true` for a zero-width span (never produced by the
    /// tokenizer, but callers constructing tokens may check).
    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
/// Multi-line scan mode, carried from the end of line N into the start of
/// line N+1. Owned exclusively by the buffer being analyzed.
pub enum ScanState {
    /// No multi-line construct is open.
    #[default]
    Normal,
    /// A block comment was opened and not yet closed.
    InsideBlockComment,
    /// A definition signature's parenthesis list is still open.
    InsideMultilineSignature,
}
