use crate::compiler::LanguageProfile;
use crate::definition::ProfileDefinition;
use crate::error::{ProfileError, ProfileWarning};
use log::warn;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

#[derive(Debug, Default)]
/// Loads, compiles, and caches language profiles.
///
/// Profiles are cached by lowercased language id; repeated [`load`] calls
/// return the same `Arc`. A profile that cannot be loaded is replaced by the
/// plain fallback ([`LanguageProfile::plain`]) so the caller never has to
/// handle a hard failure on the editing path; the reason is kept in the
/// per-language warning list.
///
/// [`load`]: ProfileRegistry::load
pub struct ProfileRegistry {
    search_paths: Vec<PathBuf>,
    profiles: HashMap<String, Arc<LanguageProfile>>,
    warnings: HashMap<String, Vec<ProfileWarning>>,
}

impl ProfileRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a directory searched for `<language>.json` profile assets.
    pub fn add_search_path(&mut self, path: impl Into<PathBuf>) {
        self.search_paths.push(path.into());
    }

    /// Get the compiled profile for a language, loading it on first use.
    ///
    /// Never fails: a missing, unparsable, or structurally invalid profile
    /// yields the plain fallback, cached like any other profile, with the
    /// failure recorded in [`warnings_for`](Self::warnings_for).
    pub fn load(&mut self, language: &str) -> Arc<LanguageProfile> {
        let key = language.trim().to_ascii_lowercase();
        if let Some(profile) = self.profiles.get(&key) {
            return profile.clone();
        }

        match self.try_load_file(&key) {
            Ok(profile) => profile,
            Err(err) => {
                warn!("profile '{key}' unavailable: {err}; using the plain fallback");
                self.warnings
                    .entry(key.clone())
                    .or_default()
                    .push(ProfileWarning::LoadFailed {
                        language: key.clone(),
                        reason: err.to_string(),
                    });
                let fallback = Arc::new(LanguageProfile::plain(&key));
                self.profiles.insert(key, fallback.clone());
                fallback
            }
        }
    }

    /// Compile and cache a profile from a JSON string.
    ///
    /// Unlike [`load`](Self::load) this surfaces the error instead of
    /// substituting the fallback, for collaborators that want to report
    /// malformed assets eagerly.
    pub fn load_from_str(&mut self, json: &str) -> Result<Arc<LanguageProfile>, ProfileError> {
        let definition: ProfileDefinition = serde_json::from_str(json)?;
        self.install(definition)
    }

    /// Compile and cache a profile from a JSON asset file.
    pub fn load_from_path(
        &mut self,
        path: impl AsRef<Path>,
    ) -> Result<Arc<LanguageProfile>, ProfileError> {
        let json = std::fs::read_to_string(path.as_ref())?;
        self.load_from_str(&json)
    }

    /// Compile and cache a collaborator-assembled definition.
    pub fn insert(
        &mut self,
        definition: ProfileDefinition,
    ) -> Result<Arc<LanguageProfile>, ProfileError> {
        self.install(definition)
    }

    /// Drop a cached profile so the next [`load`](Self::load) re-reads it.
    pub fn evict(&mut self, language: &str) {
        let key = language.trim().to_ascii_lowercase();
        self.profiles.remove(&key);
        self.warnings.remove(&key);
    }

    /// Returns `true` if a profile for the language is cached.
    pub fn contains(&self, language: &str) -> bool {
        self.profiles
            .contains_key(&language.trim().to_ascii_lowercase())
    }

    /// Load-time warnings recorded for a language (reported once, kept here).
    pub fn warnings_for(&self, language: &str) -> &[ProfileWarning] {
        self.warnings
            .get(&language.trim().to_ascii_lowercase())
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Sorted ids of every cached profile.
    pub fn available_languages(&self) -> Vec<String> {
        let mut languages: Vec<String> = self.profiles.keys().cloned().collect();
        languages.sort();
        languages
    }

    fn try_load_file(&mut self, key: &str) -> Result<Arc<LanguageProfile>, ProfileError> {
        let path = self
            .resolve_profile_path(key)
            .ok_or_else(|| ProfileError::NotFound(key.to_string()))?;
        let json = std::fs::read_to_string(&path)?;
        let definition: ProfileDefinition = serde_json::from_str(&json)?;
        self.install(definition)
    }

    fn install(
        &mut self,
        definition: ProfileDefinition,
    ) -> Result<Arc<LanguageProfile>, ProfileError> {
        let (profile, warnings) = LanguageProfile::compile(definition)?;
        let key = profile.language.clone();
        for warning in &warnings {
            warn!("profile '{key}': {warning}");
        }
        let profile = Arc::new(profile);
        self.profiles.insert(key.clone(), profile.clone());
        self.warnings.insert(key, warnings);
        Ok(profile)
    }

    fn resolve_profile_path(&self, key: &str) -> Option<PathBuf> {
        let file_name = format!("{key}.json");
        self.search_paths
            .iter()
            .map(|base| base.join(&file_name))
            .find(|candidate| candidate.exists())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compiler::PLAIN_CATEGORY;

    const DEMO_JSON: &str = r##"{
        "language": "demo",
        "comment": "//",
        "block_comment": ["/*", "*/"],
        "indent": "    ",
        "indent_triggers": ["\\{\\s*$"],
        "dedent_triggers": ["^\\}"],
        "definitions": [
            { "kind": "function", "pattern": "fn\\s+(\\w+)\\s*\\(([^)]*)\\)", "name_group": 1, "params_group": 2 }
        ],
        "symbol_patterns": [
            { "kind": "variable", "pattern": "let\\s+(\\w+)" }
        ],
        "syntax_tokens": [
            { "category": "string", "pattern": "\"[^\"]*\"", "priority": 0 },
            { "category": "keyword", "pattern": "\\b(fn|let)\\b", "priority": 1 }
        ],
        "suggestions_categorized": [
            { "category": "keywords", "items": ["fn", "let"] }
        ]
    }"##;

    #[test]
    fn load_from_str_compiles_and_caches() {
        let mut registry = ProfileRegistry::new();
        let profile = registry.load_from_str(DEMO_JSON).unwrap();
        assert_eq!(profile.language, "demo");
        assert_eq!(profile.definitions.len(), 1);
        assert!(registry.warnings_for("demo").is_empty());

        let cached = registry.load("demo");
        assert!(Arc::ptr_eq(&profile, &cached));
    }

    #[test]
    fn unknown_language_falls_back_to_plain() {
        let mut registry = ProfileRegistry::new();
        let profile = registry.load("nonexistent");
        assert_eq!(profile.token_rules.len(), 1);
        assert_eq!(profile.token_rules[0].category.as_ref(), PLAIN_CATEGORY);
        assert!(matches!(
            registry.warnings_for("nonexistent"),
            [ProfileWarning::LoadFailed { .. }]
        ));

        // The fallback is cached like any other profile.
        let again = registry.load("NonExistent");
        assert!(Arc::ptr_eq(&profile, &again));
    }

    #[test]
    fn malformed_json_surfaces_error() {
        let mut registry = ProfileRegistry::new();
        assert!(matches!(
            registry.load_from_str("{ not json"),
            Err(ProfileError::Json(_))
        ));
        // A definition entry without name_group is a missing required field.
        assert!(matches!(
            registry.load_from_str(
                r#"{ "language": "x", "definitions": [ { "kind": "f", "pattern": "(\\w+)" } ] }"#
            ),
            Err(ProfileError::Json(_))
        ));
    }

    #[test]
    fn search_path_loading_and_eviction() {
        let dir = std::env::temp_dir().join(format!(
            "code-intel-profile-test-{}",
            std::process::id()
        ));
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.join("demo.json"), DEMO_JSON).unwrap();

        let mut registry = ProfileRegistry::new();
        registry.add_search_path(&dir);
        let profile = registry.load("demo");
        assert_eq!(profile.language, "demo");
        assert_eq!(profile.symbol_rules.len(), 1);

        registry.evict("demo");
        assert!(!registry.contains("demo"));
        let reloaded = registry.load("demo");
        assert_eq!(reloaded.language, "demo");

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn available_languages_is_sorted() {
        let mut registry = ProfileRegistry::new();
        registry.load("zeta");
        registry.load("alpha");
        assert_eq!(registry.available_languages(), ["alpha", "zeta"]);
    }
}
