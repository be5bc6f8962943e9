//! Language handling for the translation cache.
//!
//! - `registry`: static metadata for the supported languages
//! - `language`: the `Language` enum and its lenient parsing
//! - `resolver`: startup language resolution (stored → device → default)
//! - `metrics`: per-service lookup counters

mod language;
mod metrics;
mod registry;
mod resolver;

pub use language::Language;
pub use metrics::{MetricsReport, TranslationMetrics};
pub use registry::{LanguageConfig, LanguageRegistry};
pub use resolver::{resolve_initial_language, LanguageSource, ResolvedLanguage};
