//! Startup language resolution.
//!
//! Priority order: stored user preference, then the device's ordered locale
//! list, then the static default. Explicit language switches after startup
//! never go through here.

use crate::i18n::Language;
use serde::Serialize;
use std::fmt;

/// Where the active language came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LanguageSource {
    /// Previously saved user preference
    Stored,
    /// Device or environment locale list
    Device,
    /// Static default, no usable signal
    Default,
    /// Set explicitly during this session
    Explicit,
}

impl fmt::Display for LanguageSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            LanguageSource::Stored => "stored preference",
            LanguageSource::Device => "device locale",
            LanguageSource::Default => "default",
            LanguageSource::Explicit => "explicit",
        };
        f.write_str(label)
    }
}

/// A language together with its provenance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ResolvedLanguage {
    pub language: Language,
    pub source: LanguageSource,
}

/// Determine the initial display language.
///
/// Pure given its inputs. An unrecognized stored value is ignored, not an
/// error; the first device locale naming a supported language wins.
pub fn resolve_initial_language(
    stored: Option<&str>,
    device_locales: &[String],
) -> ResolvedLanguage {
    if let Some(language) = stored.and_then(Language::parse) {
        return ResolvedLanguage {
            language,
            source: LanguageSource::Stored,
        };
    }

    if let Some(language) = device_locales.iter().find_map(|tag| Language::parse(tag)) {
        return ResolvedLanguage {
            language,
            source: LanguageSource::Device,
        };
    }

    ResolvedLanguage {
        language: Language::default_language(),
        source: LanguageSource::Default,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn locales(tags: &[&str]) -> Vec<String> {
        tags.iter().map(|t| t.to_string()).collect()
    }

    #[test]
    fn test_stored_preference_wins() {
        let resolved = resolve_initial_language(Some("nl"), &locales(&["en-US"]));
        assert_eq!(resolved.language, Language::Dutch);
        assert_eq!(resolved.source, LanguageSource::Stored);
    }

    #[test]
    fn test_unrecognized_stored_preference_falls_through() {
        let resolved = resolve_initial_language(Some("klingon"), &locales(&["nl-BE"]));
        assert_eq!(resolved.language, Language::Dutch);
        assert_eq!(resolved.source, LanguageSource::Device);
    }

    #[test]
    fn test_first_matching_device_locale_wins() {
        let resolved = resolve_initial_language(None, &locales(&["fr-FR", "en-GB", "nl-NL"]));
        assert_eq!(resolved.language, Language::English);
        assert_eq!(resolved.source, LanguageSource::Device);
    }

    #[test]
    fn test_device_locale_by_name() {
        let resolved = resolve_initial_language(None, &locales(&["Dutch"]));
        assert_eq!(resolved.language, Language::Dutch);
    }

    #[test]
    fn test_default_when_no_signal() {
        let resolved = resolve_initial_language(None, &locales(&["de-DE", "fr"]));
        assert_eq!(resolved.language, Language::English);
        assert_eq!(resolved.source, LanguageSource::Default);
    }

    #[test]
    fn test_default_with_empty_inputs() {
        let resolved = resolve_initial_language(Some(""), &[]);
        assert_eq!(resolved.source, LanguageSource::Default);
    }

    #[test]
    fn test_source_display() {
        assert_eq!(LanguageSource::Stored.to_string(), "stored preference");
        assert_eq!(LanguageSource::Explicit.to_string(), "explicit");
    }
}
