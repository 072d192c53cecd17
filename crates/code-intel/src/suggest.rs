//! Ranked completion candidate index.

use crate::symbols::Symbol;
use code_intel_profile::LanguageProfile;
use std::collections::HashSet;

#[derive(Debug, Clone, Default)]
/// The merged, ranked completion candidate list for one buffer.
///
/// Candidates are the union of the profile's static suggestion categories
/// and the buffer's extracted symbol names. The index is rebuilt, never
/// patched, by each completed background pass; a rebuild fully replaces the
/// previous list.
pub struct SuggestionIndex {
    categories: Vec<String>,
    entries: Vec<Entry>,
}

#[derive(Debug, Clone)]
struct Entry {
    text: String,
    lowered: String,
    source: Source,
    order: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Source {
    /// Profile-declared; the index points into `categories`.
    Static(usize),
    /// Extracted from the buffer.
    Symbol,
}

impl SuggestionIndex {
    /// Build the index from a profile's static categories plus extracted
    /// symbols.
    ///
    /// Statics are ordered by profile declaration (category order, then item
    /// order); symbols by first occurrence. Text appearing both statically
    /// and as a symbol is indexed once, with static rank.
    pub fn build(profile: &LanguageProfile, symbols: &[Symbol]) -> Self {
        let mut index = Self::default();
        let mut seen: HashSet<String> = HashSet::new();
        let mut order = 0usize;

        for category in &profile.suggestions {
            let category_index = index.categories.len();
            index.categories.push(category.name.clone());
            for item in &category.items {
                if item.is_empty() || !seen.insert(item.clone()) {
                    continue;
                }
                index.entries.push(Entry {
                    lowered: item.to_lowercase(),
                    text: item.clone(),
                    source: Source::Static(category_index),
                    order,
                });
                order += 1;
            }
        }

        for symbol in symbols {
            if symbol.name.is_empty() || !seen.insert(symbol.name.clone()) {
                continue;
            }
            index.entries.push(Entry {
                lowered: symbol.name.to_lowercase(),
                text: symbol.name.clone(),
                source: Source::Symbol,
                order,
            });
            order += 1;
        }

        index
    }

    /// Candidates matching `prefix`, best first.
    ///
    /// Ranking: case-sensitive prefix matches before case-insensitive-only
    /// ones; within equal case rank, static entries before extracted
    /// symbols; remaining ties broken by first-seen order. An empty prefix
    /// matches everything.
    pub fn query(&self, prefix: &str) -> Vec<&str> {
        self.query_filtered(prefix, &[])
    }

    /// Like [`query`](Self::query), but static candidates from the named
    /// categories are dropped (e.g. to hide operator noise from a popup).
    pub fn query_filtered(&self, prefix: &str, exclude_categories: &[&str]) -> Vec<&str> {
        let lowered_prefix = prefix.to_lowercase();
        let mut ranked: Vec<(u8, u8, usize, &str)> = Vec::new();

        for entry in &self.entries {
            if let Source::Static(category) = entry.source {
                let name = self.categories[category].as_str();
                if exclude_categories.contains(&name) {
                    continue;
                }
            }
            let case_rank = if entry.text.starts_with(prefix) {
                0
            } else if entry.lowered.starts_with(&lowered_prefix) {
                1
            } else {
                continue;
            };
            let source_rank = match entry.source {
                Source::Static(_) => 0,
                Source::Symbol => 1,
            };
            ranked.push((case_rank, source_rank, entry.order, entry.text.as_str()));
        }

        ranked.sort_unstable();
        ranked.into_iter().map(|(_, _, _, text)| text).collect()
    }

    /// Total candidate count.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` when the index holds no candidates.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
