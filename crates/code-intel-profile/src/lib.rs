#![warn(missing_docs)]
//! `code-intel-profile` - declarative language profiles for `code-intel`.
//!
//! A language profile is a small interpreted rule set: regex patterns plus
//! ordering metadata that tell the analysis engine how to tokenize, indent,
//! and extract structure for one source language. This crate owns the raw
//! JSON format ([`ProfileDefinition`]), the compiled form
//! ([`LanguageProfile`], every pattern compiled exactly once), and the
//! cache/fallback layer ([`ProfileRegistry`]).
//!
//! # Profile format
//!
//! Ordered concerns are JSON arrays with explicit ordinals, so reformatting
//! an asset file can never silently change behavior:
//!
//! - `syntax_tokens` entries carry an explicit `priority`; lower ordinals
//!   claim text first. String/comment-like categories should outrank
//!   keyword/operator categories (violations load, with a warning).
//! - `definitions` entries carry an explicit `name_group` capture index
//!   (and an optional `params_group`), instead of relying on
//!   "first capturing group" conventions.
//!
//! # Quick start
//!
//! ```rust
//! use code_intel_profile::ProfileRegistry;
//!
//! let json = r##"{
//!     "language": "demo",
//!     "comment": "//",
//!     "block_comment": ["/*", "*/"],
//!     "indent": "    ",
//!     "indent_triggers": ["\\{\\s*$"],
//!     "dedent_triggers": ["^\\}"],
//!     "definitions": [
//!         { "kind": "function", "pattern": "fn\\s+(\\w+)\\s*\\(([^)]*)\\)",
//!           "name_group": 1, "params_group": 2 }
//!     ],
//!     "symbol_patterns": [
//!         { "kind": "variable", "pattern": "let\\s+(\\w+)" }
//!     ],
//!     "syntax_tokens": [
//!         { "category": "string", "pattern": "\"[^\"]*\"", "priority": 0 },
//!         { "category": "keyword", "pattern": "\\b(fn|let)\\b", "priority": 1 }
//!     ],
//!     "suggestions_categorized": [
//!         { "category": "keywords", "items": ["fn", "let"] }
//!     ]
//! }"##;
//!
//! let mut registry = ProfileRegistry::new();
//! let profile = registry.load_from_str(json).unwrap();
//! assert_eq!(profile.language, "demo");
//! assert!(registry.warnings_for("demo").is_empty());
//! ```
//!
//! Profile load failures are never fatal: [`ProfileRegistry::load`] falls
//! back to a plain-text profile and records the reason as a warning, so the
//! worst case is unhighlighted editing.

mod compiler;
mod definition;
mod error;
mod registry;

pub use compiler::{
    COMMENT_CATEGORY, DefinitionRule, LanguageProfile, PLAIN_CATEGORY, SuggestionCategory,
    SymbolRule, TokenRule,
};
pub use definition::{
    DefinitionEntry, ProfileDefinition, SuggestionCategoryEntry, SymbolEntry, SymbolKind,
    TokenEntry,
};
pub use error::{ProfileError, ProfileWarning};
pub use registry::ProfileRegistry;
