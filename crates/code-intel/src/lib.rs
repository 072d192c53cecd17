#![warn(missing_docs)]
//! `code-intel` - Headless Language-Intelligence Engine for Code Editors
//!
//! # Overview
//!
//! `code-intel` turns raw buffer text plus a declarative language profile
//! (see [`code_intel_profile`]) into the derived state an editor view needs:
//! classified syntax tokens, per-line indent decisions, structural
//! definitions, extracted identifiers, and a ranked completion list. It is a
//! lexical approximation engine, not a parser: good enough for highlighting
//! and completion, with no type checking or cross-file analysis.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────┐
//! │  AnalysisEngine (per-buffer sessions)        │  ← Public API
//! ├──────────────────────────────────────────────┤
//! │  Foreground: Tokenizer + IndentAnalyzer      │  ← per visible line
//! ├──────────────────────────────────────────────┤
//! │  Background: Definitions, Symbols, Suggest   │  ← debounced full pass
//! ├──────────────────────────────────────────────┤
//! │  LanguageProfile (compiled rules, shared)    │  ← code-intel-profile
//! └──────────────────────────────────────────────┘
//! ```
//!
//! The foreground tier runs synchronously over the visible line range only;
//! per-line results live in an arena invalidated from the edited line
//! forward, never the whole buffer. The background tier is a debounced,
//! cancellable full-buffer pass guarded by a per-buffer generation counter:
//! a pass superseded by a newer edit publishes nothing (last writer wins).
//!
//! # Quick Start
//!
//! ```rust
//! use std::sync::Arc;
//! use code_intel::{AnalysisEngine, BufferId};
//! use code_intel_profile::ProfileRegistry;
//!
//! let mut registry = ProfileRegistry::new();
//! // No assets registered: this resolves to the plain fallback profile.
//! let profile = registry.load("rust");
//!
//! let mut engine = AnalysisEngine::new();
//! let id = BufferId(1);
//! engine.open_buffer(id, profile, "fn main() {}\n");
//!
//! let tokens = engine.tokens_for_line(id, 0).unwrap();
//! assert_eq!(tokens.len(), 1);
//! assert_eq!(tokens[0].category.as_ref(), "plain");
//! ```
//!
//! # Module Description
//!
//! - [`tokenizer`] - priority-claiming line tokenizer with block-comment
//!   scan state
//! - [`indent`] - indent/dedent trigger evaluation
//! - [`definitions`] - structural definition extraction
//! - [`symbols`] - identifier extraction
//! - [`suggest`] - ranked completion candidate index
//! - [`session`] - per-buffer sessions, edit invalidation, and the
//!   generation-guarded background pass

pub mod definitions;
pub mod indent;
pub mod session;
pub mod suggest;
pub mod symbols;
mod token;
pub mod tokenizer;

pub use code_intel_profile::{
    COMMENT_CATEGORY, LanguageProfile, PLAIN_CATEGORY, ProfileRegistry, SymbolKind,
};
pub use definitions::Definition;
pub use indent::{IndentAnalysis, IndentDecision};
pub use session::{
    AnalysisEngine, BackgroundOutput, BackgroundPass, BufferId, DEFAULT_DEBOUNCE,
};
pub use suggest::SuggestionIndex;
pub use symbols::Symbol;
pub use token::{ScanState, Token};
pub use tokenizer::tokenize;
