//! Language registry: Single source of truth for the supported UI languages.
//!
//! The portal ships in exactly two languages. Each entry carries the metadata
//! needed to recognise the language in stored preferences and device locale
//! tags (codes, English name, native name).

use std::sync::OnceLock;

/// Configuration for a supported language.
#[derive(Debug, Clone)]
pub struct LanguageConfig {
    /// ISO 639-1 language code (e.g., "en", "nl")
    pub code: &'static str,

    /// English name of the language (e.g., "English", "Dutch")
    pub name: &'static str,

    /// Native name of the language (e.g., "English", "Nederlands")
    pub native_name: &'static str,

    /// Whether this language is used when no signal picks one
    pub is_default: bool,
}

impl LanguageConfig {
    /// Check whether an already-normalized token names this language.
    ///
    /// Accepts the code, the English name and the native name.
    pub fn matches(&self, token: &str) -> bool {
        token == self.code
            || token == self.name.to_ascii_lowercase()
            || token == self.native_name.to_ascii_lowercase()
    }
}

/// Global language registry.
///
/// Immutable after first access; holds static metadata only, no cache state.
#[derive(Debug)]
pub struct LanguageRegistry {
    languages: Vec<LanguageConfig>,
}

/// Global registry instance (initialized lazily)
static REGISTRY: OnceLock<LanguageRegistry> = OnceLock::new();

impl LanguageRegistry {
    /// Get the global language registry instance.
    pub fn get() -> &'static LanguageRegistry {
        REGISTRY.get_or_init(|| LanguageRegistry {
            languages: default_languages(),
        })
    }

    /// Get a language configuration by its code.
    pub fn get_by_code(&self, code: &str) -> Option<&LanguageConfig> {
        self.languages.iter().find(|lang| lang.code == code)
    }

    /// Find the language named by a normalized token (code or name).
    pub fn find(&self, token: &str) -> Option<&LanguageConfig> {
        self.languages.iter().find(|lang| lang.matches(token))
    }

    /// Get all languages.
    pub fn list_all(&self) -> Vec<&LanguageConfig> {
        self.languages.iter().collect()
    }

    /// Get the default language configuration, if one is flagged.
    pub fn default_language(&self) -> Option<&LanguageConfig> {
        self.languages.iter().find(|lang| lang.is_default)
    }
}

/// Default language configurations: English (default) and Dutch.
fn default_languages() -> Vec<LanguageConfig> {
    vec![
        LanguageConfig {
            code: "en",
            name: "English",
            native_name: "English",
            is_default: true,
        },
        LanguageConfig {
            code: "nl",
            name: "Dutch",
            native_name: "Nederlands",
            is_default: false,
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registry_get_returns_singleton() {
        let registry1 = LanguageRegistry::get();
        let registry2 = LanguageRegistry::get();

        assert!(std::ptr::eq(registry1, registry2));
    }

    #[test]
    fn test_get_by_code_dutch() {
        let config = LanguageRegistry::get()
            .get_by_code("nl")
            .expect("Dutch should be registered");

        assert_eq!(config.name, "Dutch");
        assert_eq!(config.native_name, "Nederlands");
        assert!(!config.is_default);
    }

    #[test]
    fn test_get_by_code_nonexistent() {
        assert!(LanguageRegistry::get().get_by_code("fr").is_none());
    }

    #[test]
    fn test_find_by_name_and_native_name() {
        let registry = LanguageRegistry::get();

        assert_eq!(registry.find("dutch").map(|c| c.code), Some("nl"));
        assert_eq!(registry.find("nederlands").map(|c| c.code), Some("nl"));
        assert_eq!(registry.find("english").map(|c| c.code), Some("en"));
        assert!(registry.find("français").is_none());
    }

    #[test]
    fn test_list_all_contains_english_and_dutch() {
        let all = LanguageRegistry::get().list_all();

        assert_eq!(all.len(), 2);
        assert!(all.iter().any(|lang| lang.code == "en"));
        assert!(all.iter().any(|lang| lang.code == "nl"));
    }

    #[test]
    fn test_default_language_is_english() {
        let default = LanguageRegistry::get()
            .default_language()
            .expect("A default language should be flagged");
        assert_eq!(default.code, "en");
    }
}
