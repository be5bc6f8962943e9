//! Per-key translation data and its resolution to a display string.

use crate::i18n::Language;
use serde::{Deserialize, Serialize};

/// Raw per-key data as retrieved from the backend.
///
/// Usually exactly one text field is populated or `not_found` is set, but
/// nothing enforces that; resolution simply walks the preference order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TranslationRecord {
    pub key: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dutch_text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub english_text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub legacy_display_text: Option<String>,
    #[serde(default)]
    pub not_found: bool,
}

impl TranslationRecord {
    pub fn not_found(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            dutch_text: None,
            english_text: None,
            legacy_display_text: None,
            not_found: true,
        }
    }

    pub fn multilingual(
        key: impl Into<String>,
        dutch: Option<String>,
        english: Option<String>,
    ) -> Self {
        Self {
            key: key.into(),
            dutch_text: dutch,
            english_text: english,
            legacy_display_text: None,
            not_found: false,
        }
    }

    pub fn legacy(key: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            dutch_text: None,
            english_text: None,
            legacy_display_text: Some(text.into()),
            not_found: false,
        }
    }

    fn text_for(&self, language: Language) -> Option<&str> {
        let text = match language {
            Language::Dutch => self.dutch_text.as_deref(),
            Language::English => self.english_text.as_deref(),
        };
        text.filter(|t| !t.is_empty())
    }

    /// Resolve to the display string for `language`.
    ///
    /// Order: exact language, opposite language, legacy text, the key itself.
    /// Empty strings count as absent at every step, and a not-found record
    /// always resolves to its key.
    pub fn resolve(&self, language: Language) -> String {
        if self.not_found {
            return self.key.clone();
        }
        self.text_for(language)
            .or_else(|| self.text_for(language.opposite()))
            .or_else(|| self.legacy_display_text.as_deref().filter(|t| !t.is_empty()))
            .unwrap_or(&self.key)
            .to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(dutch: Option<&str>, english: Option<&str>, legacy: Option<&str>) -> TranslationRecord {
        TranslationRecord {
            key: "nav.home".to_string(),
            dutch_text: dutch.map(str::to_string),
            english_text: english.map(str::to_string),
            legacy_display_text: legacy.map(str::to_string),
            not_found: false,
        }
    }

    // ==================== Resolution Order Tests ====================

    #[test]
    fn test_resolve_exact_language() {
        let r = record(Some("Start"), Some("Home"), None);
        assert_eq!(r.resolve(Language::English), "Home");
        assert_eq!(r.resolve(Language::Dutch), "Start");
    }

    #[test]
    fn test_resolve_falls_back_to_opposite_language() {
        let r = record(None, Some("Home"), None);
        assert_eq!(r.resolve(Language::Dutch), "Home");
    }

    #[test]
    fn test_resolve_falls_back_to_legacy_text() {
        let r = record(None, None, Some("Homepage"));
        assert_eq!(r.resolve(Language::Dutch), "Homepage");
        assert_eq!(r.resolve(Language::English), "Homepage");
    }

    #[test]
    fn test_resolve_language_text_beats_legacy() {
        let r = record(Some("Start"), None, Some("Homepage"));
        assert_eq!(r.resolve(Language::English), "Start");
    }

    #[test]
    fn test_resolve_falls_back_to_key() {
        let r = record(None, None, None);
        assert_eq!(r.resolve(Language::English), "nav.home");
    }

    #[test]
    fn test_resolve_not_found_is_key() {
        let mut r = record(Some("Start"), Some("Home"), None);
        r.not_found = true;
        assert_eq!(r.resolve(Language::English), "nav.home");
    }

    // ==================== Empty String Tests ====================

    #[test]
    fn test_resolve_both_empty_is_key() {
        let r = record(Some(""), Some(""), None);
        assert_eq!(r.resolve(Language::English), "nav.home");
        assert_eq!(r.resolve(Language::Dutch), "nav.home");
    }

    #[test]
    fn test_resolve_empty_exact_uses_opposite() {
        let r = record(Some(""), Some("Home"), None);
        assert_eq!(r.resolve(Language::Dutch), "Home");
    }

    #[test]
    fn test_resolve_empty_languages_use_legacy() {
        let r = record(Some(""), Some(""), Some("Homepage"));
        assert_eq!(r.resolve(Language::Dutch), "Homepage");
    }

    // ==================== Serde Tests ====================

    #[test]
    fn test_serializes_camel_case_and_skips_absent() {
        let r = TranslationRecord::multilingual("k", Some("Hallo".to_string()), None);
        let json = serde_json::to_string(&r).expect("Should serialize");

        assert!(json.contains("\"dutchText\":\"Hallo\""));
        assert!(json.contains("\"notFound\":false"));
        assert!(!json.contains("englishText"));
        assert!(!json.contains("legacyDisplayText"));
    }

    #[test]
    fn test_deserializes_with_defaults() {
        let r: TranslationRecord =
            serde_json::from_str(r#"{"key":"a","englishText":"A"}"#).expect("Should deserialize");

        assert_eq!(r.english_text.as_deref(), Some("A"));
        assert!(!r.not_found);
    }
}
