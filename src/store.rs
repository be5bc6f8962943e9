//! Consumer-facing state holder over a shared `TranslationService`.
//!
//! Views read strings synchronously through `resolve` and ask for batches
//! with `ensure_loaded`; loading and error flags are kept for transient UI
//! feedback only.

use crate::engine::{Diagnostics, TranslationService};
use crate::i18n::Language;
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};
use tracing::debug;

#[derive(Debug, Default)]
struct StoreState {
    strings: HashMap<String, String>,
    in_flight: usize,
    error: Option<String>,
    /// Bumped whenever resolved strings are invalidated, so results of a
    /// request started before the switch are dropped
    generation: u64,
}

pub struct TranslationStore {
    service: Arc<TranslationService>,
    state: RwLock<StoreState>,
}

impl TranslationStore {
    pub fn new(service: Arc<TranslationService>) -> Self {
        Self {
            service,
            state: RwLock::new(StoreState::default()),
        }
    }

    fn read(&self) -> RwLockReadGuard<'_, StoreState> {
        self.state.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, StoreState> {
        self.state.write().unwrap_or_else(|e| e.into_inner())
    }

    pub fn service(&self) -> &Arc<TranslationService> {
        &self.service
    }

    /// Look up an already-loaded string. Never fetches.
    ///
    /// Unknown keys yield `fallback` when given, otherwise the key itself.
    pub fn resolve(&self, key: &str, fallback: Option<&str>) -> String {
        match self.read().strings.get(key) {
            Some(text) => text.clone(),
            None => fallback.unwrap_or(key).to_string(),
        }
    }

    /// Snapshot of the resolved strings for `keys`, with literal fallback.
    pub fn resolve_many(&self, keys: &[String]) -> HashMap<String, String> {
        let state = self.read();
        keys.iter()
            .map(|key| {
                let text = state.strings.get(key).cloned().unwrap_or_else(|| key.clone());
                (key.clone(), text)
            })
            .collect()
    }

    /// Fetch every key in `keys` that is neither loaded nor known absent.
    pub async fn ensure_loaded(&self, keys: &[String]) {
        let (missing, generation) = {
            let state = self.read();
            let mut seen = HashSet::new();
            let missing: Vec<String> = keys
                .iter()
                .filter(|key| seen.insert(key.as_str()))
                .filter(|key| !state.strings.contains_key(key.as_str()))
                .filter(|key| !self.service.is_known_absent(key))
                .cloned()
                .collect();
            (missing, state.generation)
        };
        if missing.is_empty() {
            return;
        }

        self.write().in_flight += 1;
        debug!("Loading {} translation keys", missing.len());
        let outcome = self.service.fetch(&missing).await;

        let mut state = self.write();
        state.in_flight = state.in_flight.saturating_sub(1);
        if state.generation != generation {
            debug!("Discarding translations loaded before a language switch");
            return;
        }
        match outcome.error {
            // Keys already render as themselves; leave them unloaded so the
            // next call retries
            Some(e) => state.error = Some(e.to_string()),
            None => {
                state.strings.extend(outcome.translations);
                state.error = None;
            }
        }
    }

    pub fn is_loading(&self) -> bool {
        self.read().in_flight > 0
    }

    /// Message of the most recent failed load, cleared by the next success.
    pub fn error(&self) -> Option<String> {
        self.read().error.clone()
    }

    pub fn language(&self) -> Language {
        self.service.language()
    }

    /// Switch language; loaded strings are dropped when it changes.
    pub fn set_language(&self, language: Language) -> bool {
        let changed = self.service.set_language(language);
        if changed {
            self.invalidate();
        }
        changed
    }

    pub fn clear_cache(&self) {
        self.service.clear_cache();
        self.invalidate();
    }

    fn invalidate(&self) {
        let mut state = self.write();
        state.strings.clear();
        state.error = None;
        state.generation += 1;
    }

    pub fn diagnostics(&self) -> Diagnostics {
        self.service.diagnostics()
    }
}
