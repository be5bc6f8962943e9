//! Language type: the two display languages of the portal.
//!
//! Wire and storage form is the ISO 639-1 code (`"en"`, `"nl"`). Parsing is
//! lenient: codes, English names, native names and full locale tags such as
//! `nl-BE` or `en_US.UTF-8` are all recognised by their normalized prefix.

use crate::i18n::{LanguageConfig, LanguageRegistry};
use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A supported display language.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Language {
    #[serde(rename = "en", alias = "english")]
    English,
    #[serde(rename = "nl", alias = "dutch")]
    Dutch,
}

impl Language {
    /// Create a Language from a language code, name, or locale tag.
    ///
    /// # Returns
    /// * `Ok(Language)` if the value names a registered language
    /// * `Err` otherwise
    pub fn from_code(code: &str) -> Result<Language> {
        match Self::parse(code) {
            Some(language) => Ok(language),
            None if code.trim().is_empty() => bail!("Empty language code"),
            None => bail!("Unknown language code: '{}'", code),
        }
    }

    /// Lenient parse used for stored preferences and device locales.
    pub fn parse(value: &str) -> Option<Language> {
        let token = normalize(value);
        if token.is_empty() {
            return None;
        }
        LanguageRegistry::get()
            .find(&token)
            .and_then(|config| Self::from_registered_code(config.code))
    }

    /// The default language when no preference signal is available.
    pub fn default_language() -> Language {
        LanguageRegistry::get()
            .default_language()
            .and_then(|config| Self::from_registered_code(config.code))
            .unwrap_or(Language::English)
    }

    fn from_registered_code(code: &str) -> Option<Language> {
        match code {
            "en" => Some(Language::English),
            "nl" => Some(Language::Dutch),
            _ => None,
        }
    }

    /// Get the ISO 639-1 language code.
    pub fn code(&self) -> &'static str {
        match self {
            Language::English => "en",
            Language::Dutch => "nl",
        }
    }

    /// Get the registry metadata for this language.
    pub fn config(&self) -> Option<&'static LanguageConfig> {
        LanguageRegistry::get().get_by_code(self.code())
    }

    /// Get the English name of the language.
    pub fn name(&self) -> &'static str {
        match self {
            Language::English => "English",
            Language::Dutch => "Dutch",
        }
    }

    /// Get the native name of the language.
    pub fn native_name(&self) -> &'static str {
        self.config()
            .map(|config| config.native_name)
            .unwrap_or_else(|| self.name())
    }

    /// The other supported language, used as the first fallback when a
    /// record has no text in this one.
    pub fn opposite(&self) -> Language {
        match self {
            Language::English => Language::Dutch,
            Language::Dutch => Language::English,
        }
    }
}

impl Default for Language {
    fn default() -> Self {
        Language::default_language()
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Language {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        Language::from_code(s)
    }
}

/// Lowercase and cut a locale tag down to its primary subtag.
///
/// `"nl-BE"` → `"nl"`, `"en_US.UTF-8"` → `"en"`, `" Dutch "` → `"dutch"`.
fn normalize(value: &str) -> String {
    value
        .trim()
        .split(['-', '_', '.', '@'])
        .next()
        .unwrap_or("")
        .to_ascii_lowercase()
}
