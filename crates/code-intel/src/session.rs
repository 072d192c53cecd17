//! Per-buffer analysis sessions.
//!
//! The engine keeps two tiers of derived state per buffer:
//!
//! - **Foreground** (synchronous): per-line tokens and scan state, stored in
//!   an arena indexed by line number. An edit invalidates the arena from the
//!   edited line forward only, so re-analysis cost is bounded by what the
//!   host actually asks to render.
//! - **Background** (debounced, cancellable): definitions, symbols, and the
//!   suggestion index, recomputed over the whole buffer by a
//!   [`BackgroundPass`]. Each pass carries the buffer's generation counter;
//!   publishing checks it, so a pass superseded by a newer edit is discarded
//!   without any observable effect (last writer wins).
//!
//! There are no internal threads: a [`BackgroundPass`] is a plain `Send`
//! value the host may run wherever it likes. Two passes for the same buffer
//! never run concurrently because beginning a new one supersedes the old by
//! generation; different buffers are fully independent.

use crate::definitions::{self, Definition};
use crate::indent::{self, IndentDecision};
use crate::suggest::SuggestionIndex;
use crate::symbols::{self, Symbol};
use crate::token::{ScanState, Token};
use crate::tokenizer::tokenize;
use code_intel_profile::LanguageProfile;
use log::debug;
use ropey::Rope;
use std::collections::HashMap;
use std::ops::Range;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Debounce window applied before background passes run.
pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(300);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
/// Host-assigned buffer identifier.
pub struct BufferId(
    /// The host's raw id value.
    pub u64,
);

impl std::fmt::Display for BufferId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "buffer#{}", self.0)
    }
}

#[derive(Debug)]
struct LineAnalysis {
    tokens: Vec<Token>,
    end_state: ScanState,
}

#[derive(Debug, Default)]
struct PublishedAnalysis {
    generation: Option<u64>,
    definitions: Vec<Definition>,
    symbols: Vec<Symbol>,
    suggestions: SuggestionIndex,
}

#[derive(Debug)]
/// One open buffer's text and derived analysis state.
struct AnalysisBuffer {
    profile: Arc<LanguageProfile>,
    text: Rope,
    /// Valid prefix of per-line results; truncated at the first edited line.
    lines: Vec<LineAnalysis>,
    generation: u64,
    last_edit: Option<Instant>,
    published: PublishedAnalysis,
}

impl AnalysisBuffer {
    fn line_count(&self) -> usize {
        self.text.len_lines()
    }

    fn line_text(&self, line: usize) -> String {
        let mut text = self.text.line(line).to_string();
        // Rope lines include the trailing newline.
        if text.ends_with('\n') {
            text.pop();
        }
        if text.ends_with('\r') {
            text.pop();
        }
        text
    }

    /// Extend the arena so `line` is cached, chaining scan state through any
    /// uncached predecessors.
    fn ensure_line(&mut self, line: usize) {
        while self.lines.len() <= line {
            let next = self.lines.len();
            let state = match self.lines.last() {
                Some(prev) => prev.end_state,
                None => ScanState::default(),
            };
            let text = self.line_text(next);
            let (tokens, end_state) = tokenize(&text, state, &self.profile);
            self.lines.push(LineAnalysis { tokens, end_state });
        }
    }
}

#[derive(Debug)]
/// The analysis engine: owns every open buffer's session state.
pub struct AnalysisEngine {
    buffers: HashMap<BufferId, AnalysisBuffer>,
    debounce: Duration,
}

impl Default for AnalysisEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl AnalysisEngine {
    /// Create an engine with the default debounce window.
    pub fn new() -> Self {
        Self {
            buffers: HashMap::new(),
            debounce: DEFAULT_DEBOUNCE,
        }
    }

    /// Create an engine with a custom debounce window.
    pub fn with_debounce(debounce: Duration) -> Self {
        Self {
            buffers: HashMap::new(),
            debounce,
        }
    }

    /// Open (or re-open) a buffer with the given profile and initial text.
    ///
    /// Derived state starts empty; the first background pass becomes due one
    /// debounce window after opening.
    pub fn open_buffer(&mut self, id: BufferId, profile: Arc<LanguageProfile>, text: &str) {
        self.buffers.insert(
            id,
            AnalysisBuffer {
                profile,
                text: Rope::from_str(text),
                lines: Vec::new(),
                generation: 0,
                last_edit: Some(Instant::now()),
                published: PublishedAnalysis::default(),
            },
        );
    }

    /// Drop a buffer and all of its derived state.
    pub fn close_buffer(&mut self, id: BufferId) -> bool {
        self.buffers.remove(&id).is_some()
    }

    /// Returns `true` if the buffer is open.
    pub fn contains_buffer(&self, id: BufferId) -> bool {
        self.buffers.contains_key(&id)
    }

    /// Line count of an open buffer.
    pub fn line_count(&self, id: BufferId) -> Option<usize> {
        self.buffers.get(&id).map(AnalysisBuffer::line_count)
    }

    /// The profile a buffer was opened with.
    pub fn profile(&self, id: BufferId) -> Option<Arc<LanguageProfile>> {
        self.buffers.get(&id).map(|buffer| buffer.profile.clone())
    }

    /// Apply an edit: replace `range` (char offsets) with `replacement`.
    ///
    /// Invalidates cached line analysis from the first edited line forward,
    /// bumps the buffer's generation (superseding any in-flight background
    /// pass), and restarts the debounce window.
    pub fn edit(&mut self, id: BufferId, range: Range<usize>, replacement: &str) -> bool {
        let Some(buffer) = self.buffers.get_mut(&id) else {
            return false;
        };
        let len = buffer.text.len_chars();
        let start = range.start.min(len);
        let end = range.end.min(len).max(start);
        let first_line = buffer.text.char_to_line(start);

        buffer.text.remove(start..end);
        buffer.text.insert(start, replacement);

        buffer.lines.truncate(first_line);
        buffer.generation += 1;
        buffer.last_edit = Some(Instant::now());
        debug!(
            "{id}: edit at line {first_line}, generation {}",
            buffer.generation
        );
        true
    }

    /// Replace a buffer's entire text (e.g. external reload).
    pub fn replace_text(&mut self, id: BufferId, text: &str) -> bool {
        let Some(buffer) = self.buffers.get_mut(&id) else {
            return false;
        };
        buffer.text = Rope::from_str(text);
        buffer.lines.clear();
        buffer.generation += 1;
        buffer.last_edit = Some(Instant::now());
        true
    }

    /// Tokens for one line, computing and caching any uncached prefix.
    ///
    /// Foreground path: hosts call this for the visible line range only; the
    /// arena serves every previously computed line without rescanning.
    pub fn tokens_for_line(&mut self, id: BufferId, line: usize) -> Option<&[Token]> {
        let buffer = self.buffers.get_mut(&id)?;
        if line >= buffer.line_count() {
            return None;
        }
        buffer.ensure_line(line);
        buffer.lines.get(line).map(|l| l.tokens.as_slice())
    }

    /// Scan state carried out of a line (for tests and host diagnostics).
    pub fn scan_state_after(&mut self, id: BufferId, line: usize) -> Option<ScanState> {
        let buffer = self.buffers.get_mut(&id)?;
        if line >= buffer.line_count() {
            return None;
        }
        buffer.ensure_line(line);
        buffer.lines.get(line).map(|l| l.end_state)
    }

    /// Indent decision for one line, applying to the line that follows it.
    pub fn indent_decision_for_line(&self, id: BufferId, line: usize) -> Option<IndentDecision> {
        let buffer = self.buffers.get(&id)?;
        if line >= buffer.line_count() {
            return None;
        }
        Some(indent::evaluate(&buffer.line_text(line), &buffer.profile))
    }

    /// Returns `true` when a background pass should run now: the buffer has
    /// unpublished edits and the debounce window has elapsed.
    pub fn background_due(&self, id: BufferId, now: Instant) -> bool {
        let Some(buffer) = self.buffers.get(&id) else {
            return false;
        };
        if buffer.published.generation == Some(buffer.generation) {
            return false;
        }
        match buffer.last_edit {
            Some(at) => now.saturating_duration_since(at) >= self.debounce,
            None => true,
        }
    }

    /// Start a background pass for a buffer.
    ///
    /// The pass snapshots the text and generation; it may be run on any
    /// thread. Beginning a newer pass (by editing, then calling this again)
    /// supersedes this one: its output will fail the generation check in
    /// [`publish`](Self::publish).
    pub fn begin_background_pass(&self, id: BufferId) -> Option<BackgroundPass> {
        let buffer = self.buffers.get(&id)?;
        Some(BackgroundPass {
            buffer_id: id,
            generation: buffer.generation,
            text: buffer.text.to_string(),
            profile: buffer.profile.clone(),
        })
    }

    /// Install a completed pass's output, unless it was superseded.
    ///
    /// Returns `true` when the output was published. A stale pass (its
    /// generation no longer current) or a closed buffer publishes nothing.
    pub fn publish(&mut self, output: BackgroundOutput) -> bool {
        let Some(buffer) = self.buffers.get_mut(&output.buffer_id) else {
            return false;
        };
        if output.generation != buffer.generation {
            debug!(
                "{}: discarding superseded pass (generation {} != {})",
                output.buffer_id, output.generation, buffer.generation
            );
            return false;
        }
        buffer.published = PublishedAnalysis {
            generation: Some(output.generation),
            definitions: output.definitions,
            symbols: output.symbols,
            suggestions: output.suggestions,
        };
        debug!(
            "{}: published analysis for generation {}",
            output.buffer_id, output.generation
        );
        true
    }

    /// Run a background pass inline if one is due. Returns `true` when new
    /// results were published.
    pub fn run_background_if_due(&mut self, id: BufferId, now: Instant) -> bool {
        if !self.background_due(id, now) {
            return false;
        }
        match self.begin_background_pass(id) {
            Some(pass) => {
                let output = pass.run();
                self.publish(output)
            }
            None => false,
        }
    }

    /// The most recently published definitions, in source order.
    pub fn definitions_snapshot(&self, id: BufferId) -> Option<&[Definition]> {
        self.buffers
            .get(&id)
            .map(|buffer| buffer.published.definitions.as_slice())
    }

    /// The most recently published symbols, in first-occurrence order.
    pub fn symbols_snapshot(&self, id: BufferId) -> Option<&[Symbol]> {
        self.buffers
            .get(&id)
            .map(|buffer| buffer.published.symbols.as_slice())
    }

    /// Ranked completion candidates for a typed prefix, from the most
    /// recently published suggestion index.
    pub fn current_suggestions(&self, id: BufferId, prefix: &str) -> Vec<String> {
        self.buffers
            .get(&id)
            .map(|buffer| {
                buffer
                    .published
                    .suggestions
                    .query(prefix)
                    .into_iter()
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Like [`current_suggestions`](Self::current_suggestions), with static
    /// categories excluded by name.
    pub fn current_suggestions_filtered(
        &self,
        id: BufferId,
        prefix: &str,
        exclude_categories: &[&str],
    ) -> Vec<String> {
        self.buffers
            .get(&id)
            .map(|buffer| {
                buffer
                    .published
                    .suggestions
                    .query_filtered(prefix, exclude_categories)
                    .into_iter()
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default()
    }

    #[cfg(test)]
    fn cached_line_count(&self, id: BufferId) -> usize {
        self.buffers.get(&id).map_or(0, |buffer| buffer.lines.len())
    }
}

#[derive(Debug)]
/// A snapshotted full-buffer analysis task.
///
/// Holds everything it needs (text snapshot, shared profile, generation), so
/// the host may run it on a worker thread while the engine keeps serving
/// foreground queries.
pub struct BackgroundPass {
    buffer_id: BufferId,
    generation: u64,
    text: String,
    profile: Arc<LanguageProfile>,
}

impl BackgroundPass {
    /// The buffer this pass analyzes.
    pub fn buffer_id(&self) -> BufferId {
        self.buffer_id
    }

    /// The generation this pass was started at.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Run the extractors and build the suggestion index.
    pub fn run(self) -> BackgroundOutput {
        let definitions = definitions::extract(&self.text, &self.profile);
        let symbols = symbols::extract(&self.text, &self.profile, &definitions);
        let suggestions = SuggestionIndex::build(&self.profile, &symbols);
        BackgroundOutput {
            buffer_id: self.buffer_id,
            generation: self.generation,
            definitions,
            symbols,
            suggestions,
        }
    }
}

#[derive(Debug)]
/// A completed pass's results, ready for [`AnalysisEngine::publish`].
pub struct BackgroundOutput {
    buffer_id: BufferId,
    generation: u64,
    definitions: Vec<Definition>,
    symbols: Vec<Symbol>,
    suggestions: SuggestionIndex,
}

impl BackgroundOutput {
    /// The buffer this output belongs to.
    pub fn buffer_id(&self) -> BufferId {
        self.buffer_id
    }

    /// The generation the producing pass was started at.
    pub fn generation(&self) -> u64 {
        self.generation
    }
}
