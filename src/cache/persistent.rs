use crate::i18n::Language;
use crate::record::TranslationRecord;
use crate::storage::{Storage, CACHE_SLOT};
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, warn};

/// Default lifetime of the persistent envelope (7 days).
pub const DEFAULT_PERSISTENT_TTL_SECS: i64 = 7 * 24 * 60 * 60;

/// Stored form of the persistent cache.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersistentCacheEnvelope {
    /// Raw records by key; both language fields are kept when known
    pub data: HashMap<String, TranslationRecord>,

    /// Epoch milliseconds of the last merge
    pub timestamp: i64,

    /// Language active when the envelope was last written
    pub language: Language,
}

impl PersistentCacheEnvelope {
    /// Age at `now`, negative for a future timestamp; `None` if out of range.
    fn age(&self, now: DateTime<Utc>) -> Option<Duration> {
        now.timestamp_millis()
            .checked_sub(self.timestamp)
            .and_then(Duration::try_milliseconds)
    }
}

/// Diagnostics view of the stored envelope.
#[derive(Debug, Clone, Serialize)]
pub struct PersistentSummary {
    pub records: usize,
    pub not_found_records: usize,
    /// `None` when the stored timestamp is unusable
    pub age_secs: Option<i64>,
    pub expired: bool,
    pub language: Language,
}

/// Long-lived store of raw per-key records, surviving restarts.
///
/// Storage failures are logged and otherwise ignored: the cache degrades to
/// a miss, never to an error.
pub struct PersistentCache {
    storage: Arc<dyn Storage>,
    ttl: Duration,
}

impl PersistentCache {
    pub fn new(storage: Arc<dyn Storage>, ttl: Duration) -> Self {
        Self { storage, ttl }
    }

    /// Read the stored envelope regardless of age or language.
    ///
    /// A corrupt envelope is wiped and reported as absent.
    fn read(&self) -> Option<PersistentCacheEnvelope> {
        let raw = match self.storage.get(CACHE_SLOT) {
            Ok(Some(raw)) => raw,
            Ok(None) => return None,
            Err(e) => {
                warn!("Failed to read translation cache: {}", e);
                return None;
            }
        };

        match serde_json::from_str(&raw) {
            Ok(envelope) => Some(envelope),
            Err(e) => {
                warn!("Discarding corrupt translation cache: {}", e);
                self.clear();
                None
            }
        }
    }

    fn is_expired(&self, envelope: &PersistentCacheEnvelope, now: DateTime<Utc>) -> bool {
        // A concurrent merge may stamp slightly ahead of `now`; anything more
        // than one TTL in the future is bogus
        envelope
            .age(now)
            .map_or(true, |age| age >= self.ttl || age < -self.ttl)
    }

    /// Load the envelope if it is fresh and tagged with `language`.
    ///
    /// Expired envelopes are wiped; a language mismatch is left in place
    /// because it becomes valid again once that language is active.
    pub fn load(&self, language: Language, now: DateTime<Utc>) -> Option<PersistentCacheEnvelope> {
        let envelope = self.read()?;

        if self.is_expired(&envelope, now) {
            debug!("Translation cache expired, wiping");
            self.clear();
            return None;
        }

        if envelope.language != language {
            debug!(
                "Translation cache tagged {} but {} is active, ignoring",
                envelope.language.code(),
                language.code()
            );
            return None;
        }

        Some(envelope)
    }

    pub fn save(&self, envelope: &PersistentCacheEnvelope) {
        let serialized = match serde_json::to_string(envelope) {
            Ok(s) => s,
            Err(e) => {
                warn!("Failed to serialize translation cache: {}", e);
                return;
            }
        };
        if let Err(e) = self.storage.set(CACHE_SLOT, &serialized) {
            warn!("Failed to write translation cache: {}", e);
        }
    }

    /// Read-modify-write: new records override same-key old ones.
    ///
    /// The existing envelope is reused whatever its language tag, since
    /// records carry both languages. The result is stamped with `now` and
    /// `language`.
    pub fn merge(&self, records: Vec<TranslationRecord>, language: Language, now: DateTime<Utc>) {
        if records.is_empty() {
            return;
        }

        let mut data = match self.read() {
            Some(envelope) if !self.is_expired(&envelope, now) => envelope.data,
            _ => HashMap::new(),
        };
        let added = records.len();
        for record in records {
            data.insert(record.key.clone(), record);
        }

        debug!("Merged {} records into translation cache ({} total)", added, data.len());
        self.save(&PersistentCacheEnvelope {
            data,
            timestamp: now.timestamp_millis(),
            language,
        });
    }

    /// Re-tag the stored envelope for `language`, keeping its timestamp.
    pub fn retag(&self, language: Language) {
        if let Some(mut envelope) = self.read() {
            if envelope.language != language {
                envelope.language = language;
                self.save(&envelope);
            }
        }
    }

    pub fn clear(&self) {
        if let Err(e) = self.storage.remove(CACHE_SLOT) {
            warn!("Failed to clear translation cache: {}", e);
        }
    }

    /// Summarize the stored envelope without validating it.
    pub fn summary(&self, now: DateTime<Utc>) -> Option<PersistentSummary> {
        let envelope = self.read()?;
        Some(PersistentSummary {
            records: envelope.data.len(),
            not_found_records: envelope.data.values().filter(|r| r.not_found).count(),
            age_secs: envelope.age(now).map(|age| age.num_seconds()),
            expired: self.is_expired(&envelope, now),
            language: envelope.language,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStorage;

    fn cache() -> (Arc<MemoryStorage>, PersistentCache) {
        let storage = Arc::new(MemoryStorage::new());
        let cache = PersistentCache::new(
            storage.clone(),
            Duration::seconds(DEFAULT_PERSISTENT_TTL_SECS),
        );
        (storage, cache)
    }

    fn home() -> TranslationRecord {
        TranslationRecord::multilingual("nav.home", Some("Start".to_string()), Some("Home".to_string()))
    }

    // ==================== Load Tests ====================

    #[test]
    fn test_load_absent() {
        let (_, cache) = cache();
        assert!(cache.load(Language::English, Utc::now()).is_none());
    }

    #[test]
    fn test_merge_then_load() {
        let (_, cache) = cache();
        let now = Utc::now();

        cache.merge(vec![home()], Language::English, now);

        let envelope = cache.load(Language::English, now).expect("Should load");
        assert_eq!(envelope.data.get("nav.home"), Some(&home()));
        assert_eq!(envelope.timestamp, now.timestamp_millis());
    }

    #[test]
    fn test_load_corrupt_is_wiped() {
        let (storage, cache) = cache();
        storage.set(CACHE_SLOT, "{not json").expect("Should write");

        assert!(cache.load(Language::English, Utc::now()).is_none());
        assert_eq!(storage.get(CACHE_SLOT).expect("Should read"), None);
    }

    #[test]
    fn test_load_out_of_range_timestamp_is_wiped() {
        let (storage, cache) = cache();
        let now = Utc::now();
        let far_future = (now + Duration::days(8)).timestamp_millis();
        for timestamp in [i64::MIN, i64::MAX, far_future] {
            let raw = serde_json::json!({"data": {}, "timestamp": timestamp, "language": "en"});
            storage.set(CACHE_SLOT, &raw.to_string()).expect("Should write");

            assert!(cache.summary(now).expect("Should summarize").expired);
            assert!(cache.load(Language::English, now).is_none());
            assert_eq!(storage.get(CACHE_SLOT).expect("Should read"), None);
        }
    }

    #[test]
    fn test_unrepresentable_age_has_no_summary_age() {
        let (storage, cache) = cache();
        let raw = serde_json::json!({"data": {}, "timestamp": i64::MIN, "language": "en"});
        storage.set(CACHE_SLOT, &raw.to_string()).expect("Should write");

        let summary = cache.summary(Utc::now()).expect("Should summarize");
        assert_eq!(summary.age_secs, None);
    }

    #[test]
    fn test_load_slightly_future_timestamp_is_fresh() {
        let (_, cache) = cache();
        let now = Utc::now();
        cache.merge(vec![home()], Language::English, now + Duration::seconds(2));

        assert!(cache.load(Language::English, now).is_some());
    }

    #[test]
    fn test_load_expired_is_wiped() {
        let (storage, cache) = cache();
        let now = Utc::now();
        cache.merge(vec![home()], Language::English, now);

        let later = now + Duration::days(7) + Duration::seconds(1);
        assert!(cache.load(Language::English, later).is_none());
        assert_eq!(storage.get(CACHE_SLOT).expect("Should read"), None);
    }

    #[test]
    fn test_load_language_mismatch_is_kept() {
        let (storage, cache) = cache();
        let now = Utc::now();
        cache.merge(vec![home()], Language::English, now);

        assert!(cache.load(Language::Dutch, now).is_none());
        assert!(storage.get(CACHE_SLOT).expect("Should read").is_some());
        assert!(cache.load(Language::English, now).is_some());
    }

    // ==================== Merge Tests ====================

    #[test]
    fn test_merge_overrides_same_key_and_keeps_others() {
        let (_, cache) = cache();
        let now = Utc::now();
        cache.merge(
            vec![home(), TranslationRecord::legacy("nav.courses", "Courses")],
            Language::English,
            now,
        );

        let updated = TranslationRecord::multilingual("nav.home", None, Some("Start page".to_string()));
        cache.merge(vec![updated.clone()], Language::English, now);

        let envelope = cache.load(Language::English, now).expect("Should load");
        assert_eq!(envelope.data.len(), 2);
        assert_eq!(envelope.data.get("nav.home"), Some(&updated));
    }

    #[test]
    fn test_merge_ignores_language_mismatch_and_retags() {
        let (_, cache) = cache();
        let now = Utc::now();
        cache.merge(vec![home()], Language::English, now);

        cache.merge(
            vec![TranslationRecord::not_found("missing")],
            Language::Dutch,
            now + Duration::minutes(1),
        );

        let envelope = cache.load(Language::Dutch, now + Duration::minutes(1)).expect("Should load");
        assert_eq!(envelope.data.len(), 2);
        assert_eq!(envelope.language, Language::Dutch);
    }

    #[test]
    fn test_merge_discards_expired_records() {
        let (_, cache) = cache();
        let now = Utc::now();
        cache.merge(vec![home()], Language::English, now);

        let later = now + Duration::days(8);
        cache.merge(vec![TranslationRecord::legacy("a", "A")], Language::English, later);

        let envelope = cache.load(Language::English, later).expect("Should load");
        assert_eq!(envelope.data.len(), 1);
        assert!(envelope.data.contains_key("a"));
    }

    #[test]
    fn test_merge_empty_does_not_write() {
        let (storage, cache) = cache();
        cache.merge(Vec::new(), Language::English, Utc::now());
        assert_eq!(storage.get(CACHE_SLOT).expect("Should read"), None);
    }

    #[test]
    fn test_merge_over_corrupt_envelope() {
        let (storage, cache) = cache();
        let now = Utc::now();
        storage.set(CACHE_SLOT, "garbage").expect("Should write");

        cache.merge(vec![home()], Language::English, now);

        assert_eq!(cache.load(Language::English, now).map(|e| e.data.len()), Some(1));
    }

    // ==================== Retag / Clear Tests ====================

    #[test]
    fn test_retag_preserves_timestamp() {
        let (_, cache) = cache();
        let now = Utc::now();
        cache.merge(vec![home()], Language::English, now);

        cache.retag(Language::Dutch);

        let envelope = cache
            .load(Language::Dutch, now + Duration::hours(1))
            .expect("Should load");
        assert_eq!(envelope.timestamp, now.timestamp_millis());
    }

    #[test]
    fn test_clear() {
        let (_, cache) = cache();
        let now = Utc::now();
        cache.merge(vec![home()], Language::English, now);

        cache.clear();

        assert!(cache.load(Language::English, now).is_none());
        assert!(cache.summary(now).is_none());
    }

    #[test]
    fn test_summary() {
        let (_, cache) = cache();
        let now = Utc::now();
        cache.merge(
            vec![home(), TranslationRecord::not_found("missing")],
            Language::English,
            now,
        );

        let summary = cache.summary(now + Duration::seconds(30)).expect("Should summarize");
        assert_eq!(summary.records, 2);
        assert_eq!(summary.not_found_records, 1);
        assert_eq!(summary.age_secs, Some(30));
        assert!(!summary.expired);
        assert_eq!(summary.language, Language::English);
    }

    #[test]
    fn test_envelope_wire_format() {
        let (storage, cache) = cache();
        let now = Utc::now();
        cache.merge(vec![home()], Language::Dutch, now);

        let raw = storage.get(CACHE_SLOT).expect("Should read").expect("Should exist");
        let value: serde_json::Value = serde_json::from_str(&raw).expect("Valid JSON");
        assert_eq!(value["language"], "nl");
        assert_eq!(value["timestamp"], now.timestamp_millis());
        assert_eq!(value["data"]["nav.home"]["englishText"], "Home");
    }
}
