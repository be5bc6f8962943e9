//! Reduction of backend response shapes to per-key outcomes.
//!
//! The batched lookup answers either with an array of per-key elements or
//! with a legacy `{"translations": {key: text}}` envelope. Each element is
//! classified on its own, so a mixed array is handled element by element.

use crate::error::FetchError;
use crate::record::TranslationRecord;
use serde::Deserialize;
use serde_json::Value;
use std::collections::{HashMap, HashSet};
use tracing::{debug, warn};

/// Top-level response body.
#[derive(Debug, Clone, PartialEq)]
pub enum BackendResponse {
    Elements(Vec<ResponseElement>),
    LegacyEnvelope(HashMap<String, String>),
}

/// One element of the per-key array.
#[derive(Debug, Clone, PartialEq)]
pub enum ResponseElement {
    /// `{uiKey, notFound: true}`
    NotFoundMarker { key: String },
    /// `{uiKey, displayText}`: single-language legacy text
    LegacyDisplayText { key: String, text: String },
    /// `{uiKey, dutch?, english?}`
    MultiLanguageRecord {
        key: String,
        dutch: Option<String>,
        english: Option<String>,
    },
    /// Matches none of the known shapes; skipped during reconciliation
    Unrecognized { key: Option<String> },
}

/// Loose view of an element before classification.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawElement {
    #[serde(alias = "key")]
    ui_key: Option<String>,
    not_found: Option<bool>,
    display_text: Option<String>,
    dutch: Option<String>,
    english: Option<String>,
}

impl ResponseElement {
    pub fn key(&self) -> Option<&str> {
        match self {
            ResponseElement::NotFoundMarker { key }
            | ResponseElement::LegacyDisplayText { key, .. }
            | ResponseElement::MultiLanguageRecord { key, .. } => Some(key),
            ResponseElement::Unrecognized { key } => key.as_deref(),
        }
    }

    /// Classify one array element. First matching shape wins.
    pub fn from_value(value: Value) -> ResponseElement {
        let raw: RawElement = match serde_json::from_value(value) {
            Ok(raw) => raw,
            Err(_) => return ResponseElement::Unrecognized { key: None },
        };

        let Some(key) = raw.ui_key else {
            return ResponseElement::Unrecognized { key: None };
        };

        if raw.not_found == Some(true) {
            ResponseElement::NotFoundMarker { key }
        } else if let Some(text) = raw.display_text {
            ResponseElement::LegacyDisplayText { key, text }
        } else if raw.dutch.is_some() || raw.english.is_some() {
            ResponseElement::MultiLanguageRecord {
                key,
                dutch: raw.dutch,
                english: raw.english,
            }
        } else {
            ResponseElement::Unrecognized { key: Some(key) }
        }
    }
}

impl BackendResponse {
    /// Classify a decoded JSON body.
    pub fn from_value(value: Value) -> Result<BackendResponse, FetchError> {
        match value {
            Value::Array(items) => Ok(BackendResponse::Elements(
                items.into_iter().map(ResponseElement::from_value).collect(),
            )),
            Value::Object(mut object) => match object.remove("translations") {
                Some(Value::Object(map)) => Ok(BackendResponse::LegacyEnvelope(
                    map.into_iter()
                        .filter_map(|(key, text)| match text {
                            Value::String(text) => Some((key, text)),
                            _ => None,
                        })
                        .collect(),
                )),
                _ => Err(FetchError::UnexpectedShape),
            },
            _ => Err(FetchError::UnexpectedShape),
        }
    }
}

/// Terminal outcome for one key.
#[derive(Debug, Clone, PartialEq)]
pub enum KeyOutcome {
    Resolved(TranslationRecord),
    NotFound,
}

/// Reconciled response.
#[derive(Debug, Default)]
pub struct Reconciliation {
    /// Every key with a terminal outcome, requested or not
    pub outcomes: HashMap<String, KeyOutcome>,

    /// Requested keys whose element was unrecognized; eligible for retry
    pub unresolved: HashSet<String>,
}

impl Reconciliation {
    /// Records to persist, not-found markers included.
    pub fn records(&self) -> Vec<TranslationRecord> {
        self.outcomes
            .iter()
            .map(|(key, outcome)| match outcome {
                KeyOutcome::Resolved(record) => record.clone(),
                KeyOutcome::NotFound => TranslationRecord::not_found(key.clone()),
            })
            .collect()
    }
}

fn reconcile_not_found(key: String) -> (String, KeyOutcome) {
    (key, KeyOutcome::NotFound)
}

fn reconcile_legacy_display(key: String, text: String) -> (String, KeyOutcome) {
    let record = TranslationRecord::legacy(key.clone(), text);
    (key, KeyOutcome::Resolved(record))
}

fn reconcile_multi_language(
    key: String,
    dutch: Option<String>,
    english: Option<String>,
) -> (String, KeyOutcome) {
    let record = TranslationRecord::multilingual(key.clone(), dutch, english);
    (key, KeyOutcome::Resolved(record))
}

fn reconcile_elements(elements: Vec<ResponseElement>, requested: &[String]) -> Reconciliation {
    let mut result = Reconciliation::default();
    let mut skipped = 0usize;

    for element in elements {
        let (key, outcome) = match element {
            ResponseElement::NotFoundMarker { key } => reconcile_not_found(key),
            ResponseElement::LegacyDisplayText { key, text } => reconcile_legacy_display(key, text),
            ResponseElement::MultiLanguageRecord {
                key,
                dutch,
                english,
            } => reconcile_multi_language(key, dutch, english),
            ResponseElement::Unrecognized { key } => {
                skipped += 1;
                if let Some(key) = key {
                    result.unresolved.insert(key);
                }
                continue;
            }
        };
        result.outcomes.insert(key, outcome);
    }

    if skipped > 0 {
        warn!("Skipped {} unrecognized translation response elements", skipped);
    }

    // A recognized element for the same key supersedes an unrecognized one
    result.unresolved.retain(|key| !result.outcomes.contains_key(key));

    // Requested keys the backend did not mention at all are absent
    for key in requested {
        if !result.outcomes.contains_key(key) && !result.unresolved.contains(key) {
            debug!("Key '{}' missing from translation response", key);
            result.outcomes.insert(key.clone(), KeyOutcome::NotFound);
        }
    }

    result
}

fn reconcile_legacy_envelope(
    translations: HashMap<String, String>,
    requested: &[String],
) -> Reconciliation {
    let mut result = Reconciliation::default();

    for (key, text) in translations {
        let (key, outcome) = reconcile_legacy_display(key, text);
        result.outcomes.insert(key, outcome);
    }
    for key in requested {
        if !result.outcomes.contains_key(key) {
            let (key, outcome) = reconcile_not_found(key.clone());
            result.outcomes.insert(key, outcome);
        }
    }

    result
}

/// Reduce a classified response to per-key outcomes for `requested`.
pub fn reconcile(response: BackendResponse, requested: &[String]) -> Reconciliation {
    match response {
        BackendResponse::Elements(elements) => reconcile_elements(elements, requested),
        BackendResponse::LegacyEnvelope(translations) => {
            reconcile_legacy_envelope(translations, requested)
        }
    }
}
