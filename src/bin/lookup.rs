//! One-shot translation lookup through the full cache stack.
//!
//! Usage:
//!   cargo run --bin lookup -- nav.home nav.courses
//!   cargo run --bin lookup -- --language nl nav.home
//!   cargo run --bin lookup -- --diagnostics nav.home
//!
//! Required environment variables:
//! - TRANSLATIONS_API_URL
//!
//! Optional:
//! - TRANSLATIONS_API_TOKEN
//! - TRANSLATION_CACHE_DIR (defaults to .translation-cache)
//! - REQUEST_TIMEOUT_SECS (defaults to 10)

use anyhow::{bail, Context, Result};
use tracing::{info, warn};
use ui_translation_cache::config::Config;
use ui_translation_cache::engine::TranslationService;
use ui_translation_cache::i18n::Language;

struct Args {
    language: Option<Language>,
    diagnostics: bool,
    keys: Vec<String>,
}

fn parse_args(args: impl Iterator<Item = String>) -> Result<Args> {
    let mut parsed = Args {
        language: None,
        diagnostics: false,
        keys: Vec::new(),
    };
    let mut args = args.peekable();

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--language" | "-l" => {
                let value = args.next().context("--language needs a value")?;
                parsed.language = Some(Language::from_code(&value)?);
            }
            "--diagnostics" | "-d" => parsed.diagnostics = true,
            flag if flag.starts_with('-') => bail!("Unknown flag: {}", flag),
            _ => parsed.keys.push(arg),
        }
    }

    if parsed.keys.is_empty() && !parsed.diagnostics {
        bail!("Usage: lookup [--language en|nl] [--diagnostics] KEY...");
    }
    Ok(parsed)
}

#[tokio::main]
async fn main() -> Result<()> {
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("ui_translation_cache=warn".parse()?),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = parse_args(std::env::args().skip(1))?;
    let config = Config::from_env()?;
    let service = TranslationService::from_config(&config)?;

    if let Some(language) = args.language {
        service.set_language(language);
    }
    info!("Looking up {} keys in {}", args.keys.len(), service.language());

    let outcome = service.fetch(&args.keys).await;
    if let Some(error) = &outcome.error {
        warn!("Backend unavailable, showing keys: {}", error);
    }

    let mut ordered: Vec<_> = outcome.translations.into_iter().collect();
    ordered.sort();
    let translations: serde_json::Map<String, serde_json::Value> = ordered
        .into_iter()
        .map(|(k, v)| (k, serde_json::Value::String(v)))
        .collect();
    println!("{}", serde_json::to_string_pretty(&translations)?);

    if args.diagnostics {
        println!("{}", serde_json::to_string_pretty(&service.diagnostics())?);
    }
    Ok(())
}
