//! Fetch/reconciliation engine: the cache tiers and the backend behind one
//! lookup call.
//!
//! One `TranslationService` is built per application session and shared by
//! reference. Lookups never fail: every requested key resolves to a string,
//! falling back to the key itself.

use crate::backend::BackendClient;
use crate::cache::{
    MemoryCache, MemoryEntrySummary, NegativeKeyRegistry, PersistentCache, PersistentSummary,
    DEFAULT_MEMORY_TTL_SECS, DEFAULT_PERSISTENT_TTL_SECS,
};
use crate::clock::{Clock, SystemClock};
use crate::config::Config;
use crate::error::FetchError;
use crate::i18n::{
    resolve_initial_language, Language, LanguageRegistry, LanguageSource, MetricsReport,
    ResolvedLanguage, TranslationMetrics,
};
use crate::reconcile::{reconcile, KeyOutcome};
use crate::storage::{FileStorage, Storage, LANGUAGE_SLOT};
use anyhow::{Context, Result};
use serde::Serialize;
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::{debug, error, info, warn};

/// Result of one lookup, with the transient failure (if any) kept apart
/// from the always-complete translation map.
#[derive(Debug, Default)]
pub struct FetchOutcome {
    pub translations: HashMap<String, String>,
    pub error: Option<FetchError>,
}

/// Snapshot of the service state for debugging screens and the HTTP surface.
#[derive(Debug, Clone, Serialize)]
pub struct Diagnostics {
    pub language: Language,
    pub language_source: LanguageSource,
    pub memory_entries: Vec<MemoryEntrySummary>,
    pub persistent: Option<PersistentSummary>,
    pub not_found_keys: Vec<String>,
    pub metrics: MetricsReport,
    /// Codes of every language the service can switch to
    pub available_languages: Vec<&'static str>,
}

/// Session-scoped mutable state. Never locked across an `.await`.
struct SessionState {
    language: ResolvedLanguage,
    memory: MemoryCache,
    negative: NegativeKeyRegistry,
}

pub struct TranslationService {
    backend: BackendClient,
    storage: Arc<dyn Storage>,
    persistent: PersistentCache,
    clock: Arc<dyn Clock>,
    state: Mutex<SessionState>,
    metrics: TranslationMetrics,
}

/// Builder for `TranslationService`.
pub struct ServiceBuilder {
    backend: BackendClient,
    storage: Arc<dyn Storage>,
    clock: Arc<dyn Clock>,
    memory_ttl: chrono::Duration,
    persistent_ttl: chrono::Duration,
    device_locales: Vec<String>,
}

fn to_chrono(duration: std::time::Duration) -> chrono::Duration {
    chrono::Duration::from_std(duration).unwrap_or_else(|_| chrono::Duration::days(365 * 100))
}

impl ServiceBuilder {
    pub fn memory_ttl(mut self, ttl: std::time::Duration) -> Self {
        self.memory_ttl = to_chrono(ttl);
        self
    }

    pub fn persistent_ttl(mut self, ttl: std::time::Duration) -> Self {
        self.persistent_ttl = to_chrono(ttl);
        self
    }

    pub fn device_locales(mut self, locales: Vec<String>) -> Self {
        self.device_locales = locales;
        self
    }

    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Resolve the initial language and assemble the service.
    pub fn build(self) -> TranslationService {
        let stored = match self.storage.get(LANGUAGE_SLOT) {
            Ok(stored) => stored,
            Err(e) => {
                warn!("Failed to read language preference: {}", e);
                None
            }
        };
        let language = resolve_initial_language(stored.as_deref(), &self.device_locales);
        info!(
            "Active language: {} (from {})",
            language.language.name(),
            language.source
        );

        TranslationService {
            persistent: PersistentCache::new(self.storage.clone(), self.persistent_ttl),
            backend: self.backend,
            storage: self.storage,
            clock: self.clock,
            state: Mutex::new(SessionState {
                language,
                memory: MemoryCache::new(self.memory_ttl),
                negative: NegativeKeyRegistry::new(),
            }),
            metrics: TranslationMetrics::new(),
        }
    }
}

impl TranslationService {
    pub fn builder(backend: BackendClient, storage: Arc<dyn Storage>) -> ServiceBuilder {
        ServiceBuilder {
            backend,
            storage,
            clock: Arc::new(SystemClock),
            memory_ttl: chrono::Duration::seconds(DEFAULT_MEMORY_TTL_SECS),
            persistent_ttl: chrono::Duration::seconds(DEFAULT_PERSISTENT_TTL_SECS),
            device_locales: Vec::new(),
        }
    }

    /// Build a file-backed service from environment configuration.
    pub fn from_config(config: &Config) -> Result<Self> {
        let storage = FileStorage::open(&config.cache_dir)
            .with_context(|| format!("Failed to open cache directory {}", config.cache_dir))?;
        info!("Translation cache stored in {}", storage.dir().display());
        let client = reqwest::Client::builder()
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self::builder(BackendClient::from_config(client, config), Arc::new(storage))
            .memory_ttl(config.memory_cache_ttl)
            .persistent_ttl(config.persistent_cache_ttl)
            .device_locales(config.device_locales.clone())
            .build())
    }

    fn state(&self) -> MutexGuard<'_, SessionState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn language(&self) -> Language {
        self.state().language.language
    }

    pub fn language_source(&self) -> LanguageSource {
        self.state().language.source
    }

    pub fn is_known_absent(&self, key: &str) -> bool {
        self.state().negative.has(key)
    }

    pub fn not_found_keys(&self) -> Vec<String> {
        self.state().negative.all()
    }

    pub fn metrics(&self) -> &TranslationMetrics {
        &self.metrics
    }

    /// Resolve `keys` to display strings. Never fails.
    pub async fn fetch_translations(&self, keys: &[String]) -> HashMap<String, String> {
        self.fetch(keys).await.translations
    }

    /// Resolve `keys`, also reporting a transient backend failure.
    ///
    /// The map always covers every requested key. On failure every key maps
    /// to itself and no cache tier is written.
    pub async fn fetch(&self, keys: &[String]) -> FetchOutcome {
        if keys.is_empty() {
            return FetchOutcome::default();
        }

        let now = self.clock.now();
        let language = {
            let mut state = self.state();
            if let Some(hit) = state.memory.get(keys, now) {
                self.metrics.record_memory_hit();
                debug!("Memory cache hit for {} keys", keys.len());
                return FetchOutcome {
                    translations: hit,
                    error: None,
                };
            }
            state.language.language
        };

        let mut resolved: HashMap<String, String> = HashMap::new();
        let mut not_found: HashSet<String> = HashSet::new();
        let mut pending: Vec<String> = Vec::new();

        // Persistent tier
        let envelope = self.persistent.load(language, now);
        let mut persistent_hits = 0;
        let mut seen: HashSet<&str> = HashSet::new();
        for key in keys {
            if !seen.insert(key.as_str()) {
                continue;
            }
            match envelope.as_ref().and_then(|e| e.data.get(key)) {
                Some(record) if record.not_found => {
                    not_found.insert(key.clone());
                }
                Some(record) => {
                    resolved.insert(key.clone(), record.resolve(language));
                    persistent_hits += 1;
                }
                None => pending.push(key.clone()),
            }
        }
        self.metrics.record_persistent_hits(persistent_hits);

        // Negative-key registry
        {
            let mut state = self.state();
            for key in &not_found {
                state.negative.add(key);
            }
            let before = pending.len();
            pending.retain(|key| {
                if state.negative.has(key) {
                    not_found.insert(key.clone());
                    false
                } else {
                    true
                }
            });
            self.metrics.record_negative_hits(before - pending.len());
        }

        if pending.is_empty() {
            debug!("All {} keys answered from cache", keys.len());
            let translations = merge_literal(&resolved, &not_found, &HashSet::new());
            self.store_memory_line(keys, language, resolved, not_found, now);
            return FetchOutcome {
                translations,
                error: None,
            };
        }

        // Network
        self.metrics.record_network_call(pending.len());
        let response = match self.backend.lookup(&pending, language).await {
            Ok(response) => response,
            Err(e) => {
                self.metrics.record_network_failure();
                error!(
                    "Translation lookup for {} keys failed, showing keys: {}",
                    pending.len(),
                    e
                );
                return FetchOutcome {
                    translations: keys.iter().map(|k| (k.clone(), k.clone())).collect(),
                    error: Some(e),
                };
            }
        };

        let reconciliation = reconcile(response, &pending);
        for key in &pending {
            match reconciliation.outcomes.get(key) {
                Some(KeyOutcome::Resolved(record)) => {
                    resolved.insert(key.clone(), record.resolve(language));
                }
                Some(KeyOutcome::NotFound) => {
                    not_found.insert(key.clone());
                }
                None => {}
            }
        }
        if !reconciliation.unresolved.is_empty() {
            debug!(
                "{} keys left unresolved and eligible for retry",
                reconciliation.unresolved.len()
            );
        }

        let translations = merge_literal(&resolved, &not_found, &reconciliation.unresolved);
        let current = {
            let mut state = self.state();
            if state.language.language == language {
                for key in &not_found {
                    state.negative.add(key);
                }
            }
            state.language.language
        };
        self.store_memory_line(keys, language, resolved, not_found, now);
        // Records are multilingual, so they are kept even if the language
        // changed while the request was in flight
        self.persistent
            .merge(reconciliation.records(), current, self.clock.now());

        FetchOutcome {
            translations,
            error: None,
        }
    }

    /// Write the memory line unless the language changed since `language`
    /// was read; a switch clears the tier and stale lines must not return.
    fn store_memory_line(
        &self,
        keys: &[String],
        language: Language,
        resolved: HashMap<String, String>,
        not_found: HashSet<String>,
        now: chrono::DateTime<chrono::Utc>,
    ) {
        let mut state = self.state();
        if state.language.language == language {
            state.memory.put(keys, resolved, not_found, now);
        }
    }

    /// Switch the display language. Returns `false` if it was already active.
    ///
    /// Persists the preference and clears the memory tier and the
    /// negative-key registry. The persistent envelope is re-tagged rather
    /// than cleared so its records re-resolve without a request.
    pub fn set_language(&self, language: Language) -> bool {
        {
            let mut state = self.state();
            if state.language.language == language {
                return false;
            }
            state.language = ResolvedLanguage {
                language,
                source: LanguageSource::Explicit,
            };
            state.memory.clear();
            state.negative.clear();
        }

        if let Err(e) = self.storage.set(LANGUAGE_SLOT, language.code()) {
            warn!("Failed to persist language preference: {}", e);
        }
        self.persistent.retag(language);
        info!(
            "Language switched to {} ({})",
            language.name(),
            language.native_name()
        );
        true
    }

    /// Drop every cache tier. The language preference is kept.
    pub fn clear_cache(&self) {
        {
            let mut state = self.state();
            state.memory.clear();
            state.negative.clear();
        }
        self.persistent.clear();
        info!("Translation caches cleared");
    }

    pub fn diagnostics(&self) -> Diagnostics {
        let now = self.clock.now();
        let (language, memory_entries, not_found_keys) = {
            let state = self.state();
            (
                state.language,
                state.memory.summaries(now),
                state.negative.all(),
            )
        };

        Diagnostics {
            language: language.language,
            language_source: language.source,
            memory_entries,
            persistent: self.persistent.summary(now),
            not_found_keys,
            metrics: self.metrics.report(),
            available_languages: LanguageRegistry::get()
                .list_all()
                .into_iter()
                .map(|config| config.code)
                .collect(),
        }
    }
}

/// Combine resolved strings with key-as-literal entries for the not-found
/// and unresolved keys.
fn merge_literal(
    resolved: &HashMap<String, String>,
    not_found: &HashSet<String>,
    unresolved: &HashSet<String>,
) -> HashMap<String, String> {
    let mut translations = resolved.clone();
    for key in not_found.iter().chain(unresolved) {
        translations
            .entry(key.clone())
            .or_insert_with(|| key.clone());
    }
    translations
}
