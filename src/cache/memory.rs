use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use std::collections::{BTreeSet, HashMap, HashSet};
use tracing::debug;

/// Default lifetime of a memory cache line (5 minutes).
pub const DEFAULT_MEMORY_TTL_SECS: i64 = 5 * 60;

/// Identity of one requested batch: the set of keys, independent of order
/// and duplicates. Compared structurally, so no delimiter can collide.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BatchKey(BTreeSet<String>);

impl BatchKey {
    pub fn new<I, S>(keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        BatchKey(keys.into_iter().map(Into::into).collect())
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

#[derive(Debug, Clone)]
pub struct MemoryCacheEntry {
    pub resolved: HashMap<String, String>,
    pub not_found: HashSet<String>,
    pub timestamp: DateTime<Utc>,
}

/// Diagnostics view of one cache line.
#[derive(Debug, Clone, Serialize)]
pub struct MemoryEntrySummary {
    pub keys: Vec<String>,
    pub resolved: usize,
    pub not_found: usize,
    pub age_secs: i64,
    pub expired: bool,
}

/// Short-lived cache of resolved strings, one line per exact key batch.
#[derive(Debug)]
pub struct MemoryCache {
    entries: HashMap<BatchKey, MemoryCacheEntry>,
    ttl: Duration,
}

impl MemoryCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            entries: HashMap::new(),
            ttl,
        }
    }

    /// Look up the exact batch `keys`.
    ///
    /// A hit needs a fresh line whose resolved map or not-found set covers
    /// every requested key. Expired lines are evicted here.
    pub fn get(&mut self, keys: &[String], now: DateTime<Utc>) -> Option<HashMap<String, String>> {
        let batch = BatchKey::new(keys.iter().cloned());
        let entry = self.entries.get(&batch)?;

        if now - entry.timestamp >= self.ttl {
            debug!("Memory cache line for {} keys expired", batch.len());
            self.entries.remove(&batch);
            return None;
        }

        let complete = batch
            .keys()
            .all(|k| entry.resolved.contains_key(k) || entry.not_found.contains(k));
        if !complete {
            return None;
        }

        let mut result = entry.resolved.clone();
        for key in &entry.not_found {
            result.entry(key.clone()).or_insert_with(|| key.clone());
        }
        Some(result)
    }

    pub fn put(
        &mut self,
        keys: &[String],
        resolved: HashMap<String, String>,
        not_found: HashSet<String>,
        now: DateTime<Utc>,
    ) {
        let ttl = self.ttl;
        let before = self.entries.len();
        self.entries.retain(|_, entry| now - entry.timestamp < ttl);
        if self.entries.len() < before {
            debug!("Pruned {} expired memory cache lines", before - self.entries.len());
        }

        let batch = BatchKey::new(keys.iter().cloned());
        self.entries.insert(
            batch,
            MemoryCacheEntry {
                resolved,
                not_found,
                timestamp: now,
            },
        );
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn summaries(&self, now: DateTime<Utc>) -> Vec<MemoryEntrySummary> {
        let mut summaries: Vec<_> = self
            .entries
            .iter()
            .map(|(batch, entry)| {
                let age = now - entry.timestamp;
                MemoryEntrySummary {
                    keys: batch.keys().map(str::to_string).collect(),
                    resolved: entry.resolved.len(),
                    not_found: entry.not_found.len(),
                    age_secs: age.num_seconds(),
                    expired: age >= self.ttl,
                }
            })
            .collect();
        summaries.sort_by(|a, b| a.keys.cmp(&b.keys));
        summaries
    }
}

impl Default for MemoryCache {
    fn default() -> Self {
        Self::new(Duration::seconds(DEFAULT_MEMORY_TTL_SECS))
    }
}
