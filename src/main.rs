use anyhow::Result;
use std::sync::Arc;
use tracing::info;
use ui_translation_cache::config::Config;
use ui_translation_cache::engine::TranslationService;
use ui_translation_cache::server::{self, AppState};
use ui_translation_cache::store::TranslationStore;

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file (ignored in production)
    let _ = dotenvy::dotenv();

    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("ui_translation_cache=info".parse()?),
        )
        .init();

    info!("Starting translation cache service");

    let config = Config::from_env()?;
    info!(
        "Backend: {} (timeout {:?}), cache dir: {}",
        config.translations_api_url, config.request_timeout, config.cache_dir
    );

    let service = Arc::new(TranslationService::from_config(&config)?);
    let state = AppState {
        store: Arc::new(TranslationStore::new(service)),
        api_key: config.api_key.clone(),
    };

    if state.api_key.is_none() {
        info!("API_KEY not set, language and cache endpoints are open");
    }

    server::serve(state, config.port).await
}
