//! HTTP surface over a `TranslationStore`.

use crate::engine::Diagnostics;
use crate::i18n::Language;
use crate::security::api_key_allows;
use crate::store::TranslationStore;
use anyhow::{Context, Result};
use axum::{
    extract::{Query, State},
    http::{HeaderMap, StatusCode},
    routing::{delete, get},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<TranslationStore>,
    pub api_key: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct TranslationsQuery {
    /// Comma-separated key list
    keys: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TranslationsResponse {
    pub language: Language,
    pub translations: HashMap<String, String>,
    pub error: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct LanguageRequest {
    pub language: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct LanguageResponse {
    pub language: Language,
    pub changed: bool,
}

type ApiError = (StatusCode, String);

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/translations", get(get_translations))
        .route("/language", get(get_language).put(put_language))
        .route("/cache", delete(clear_cache))
        .route("/diagnostics", get(get_diagnostics))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Bind and serve until the process is stopped.
pub async fn serve(state: AppState, port: u16) -> Result<()> {
    let listener = tokio::net::TcpListener::bind(("0.0.0.0", port))
        .await
        .with_context(|| format!("Failed to bind port {}", port))?;
    info!("Listening on port {}", port);
    axum::serve(listener, router(state))
        .await
        .context("HTTP server failed")
}

/// Split a comma-separated key list, dropping blanks.
pub fn parse_keys(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|k| !k.is_empty())
        .map(str::to_string)
        .collect()
}

fn authorize(state: &AppState, headers: &HeaderMap) -> Result<(), ApiError> {
    let presented = headers.get("x-api-key").and_then(|v| v.to_str().ok());
    if api_key_allows(state.api_key.as_deref(), presented) {
        Ok(())
    } else {
        warn!("Rejected request with missing or invalid API key");
        Err((StatusCode::UNAUTHORIZED, "Invalid API key".to_string()))
    }
}

async fn health() -> &'static str {
    "OK"
}

async fn get_translations(
    State(state): State<AppState>,
    Query(query): Query<TranslationsQuery>,
) -> Json<TranslationsResponse> {
    let keys = parse_keys(query.keys.as_deref().unwrap_or(""));
    state.store.ensure_loaded(&keys).await;

    Json(TranslationsResponse {
        language: state.store.language(),
        translations: state.store.resolve_many(&keys),
        error: state.store.error(),
    })
}

async fn get_language(State(state): State<AppState>) -> Json<LanguageResponse> {
    Json(LanguageResponse {
        language: state.store.language(),
        changed: false,
    })
}

async fn put_language(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(request): Json<LanguageRequest>,
) -> Result<Json<LanguageResponse>, ApiError> {
    authorize(&state, &headers)?;
    let language = Language::from_code(&request.language)
        .map_err(|e| (StatusCode::BAD_REQUEST, e.to_string()))?;

    let changed = state.store.set_language(language);
    Ok(Json(LanguageResponse { language, changed }))
}

async fn clear_cache(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<StatusCode, ApiError> {
    authorize(&state, &headers)?;
    state.store.clear_cache();
    Ok(StatusCode::NO_CONTENT)
}

async fn get_diagnostics(State(state): State<AppState>) -> Json<Diagnostics> {
    Json(state.store.diagnostics())
}
