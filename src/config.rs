use anyhow::{Context, Result};
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct Config {
    // Backend
    pub translations_api_url: String,
    pub translations_api_token: Option<String>,
    pub request_timeout: Duration,

    // Cache
    pub cache_dir: String,
    pub memory_cache_ttl: Duration,
    pub persistent_cache_ttl: Duration,

    // Language signals, most preferred first
    pub device_locales: Vec<String>,

    // HTTP surface
    pub port: u16,
    pub api_key: Option<String>,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            // Backend
            translations_api_url: std::env::var("TRANSLATIONS_API_URL")
                .context("TRANSLATIONS_API_URL not set")?,
            translations_api_token: std::env::var("TRANSLATIONS_API_TOKEN")
                .ok()
                .filter(|v| !v.is_empty()),
            // A zero timeout would fail every lookup
            request_timeout: Duration::from_secs(env_u64("REQUEST_TIMEOUT_SECS", 10).max(1)),

            // Cache
            cache_dir: std::env::var("TRANSLATION_CACHE_DIR")
                .unwrap_or_else(|_| ".translation-cache".to_string()),
            memory_cache_ttl: Duration::from_secs(env_u64("MEMORY_CACHE_TTL_SECS", 5 * 60)),
            persistent_cache_ttl: Duration::from_secs(env_u64(
                "PERSISTENT_CACHE_TTL_SECS",
                7 * 24 * 60 * 60,
            )),

            device_locales: device_locales_from_env(),

            // HTTP surface
            port: std::env::var("PORT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(8080),
            api_key: std::env::var("API_KEY").ok().filter(|v| !v.is_empty()),
        })
    }
}

fn env_u64(name: &str, default: u64) -> u64 {
    std::env::var(name)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

/// Ordered locale list from the process environment.
///
/// `LANGUAGE` is a colon-separated priority list and comes first, then
/// `LC_ALL` and `LANG`. The POSIX "C" locale carries no preference.
fn device_locales_from_env() -> Vec<String> {
    let mut locales: Vec<String> = Vec::new();

    if let Ok(list) = std::env::var("LANGUAGE") {
        locales.extend(list.split(':').map(str::trim).map(str::to_string));
    }
    for name in ["LC_ALL", "LANG"] {
        if let Ok(value) = std::env::var(name) {
            locales.push(value.trim().to_string());
        }
    }

    locales.retain(|l| !l.is_empty() && l != "C" && l != "POSIX");
    locales
}
