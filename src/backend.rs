use crate::config::Config;
use crate::error::FetchError;
use crate::i18n::Language;
use crate::reconcile::BackendResponse;
use serde::Serialize;
use std::time::Duration;
use tracing::debug;

/// Body of the batched lookup request.
#[derive(Debug, Serialize)]
struct LookupRequest<'a> {
    keys: &'a [String],
    language: Language,
}

/// Client for the batched translation lookup endpoint.
#[derive(Debug, Clone)]
pub struct BackendClient {
    client: reqwest::Client,
    url: String,
    token: Option<String>,
    timeout: Duration,
}

impl BackendClient {
    pub fn new(client: reqwest::Client, url: impl Into<String>, timeout: Duration) -> Self {
        Self {
            client,
            url: url.into(),
            token: None,
            timeout,
        }
    }

    pub fn from_config(client: reqwest::Client, config: &Config) -> Self {
        let backend = Self::new(client, &config.translations_api_url, config.request_timeout);
        match &config.translations_api_token {
            Some(token) => backend.with_token(token),
            None => backend,
        }
    }

    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    /// Issue one batched lookup for `keys`.
    ///
    /// No retries: a timeout or failure is reported once and the caller
    /// falls back to literal keys.
    pub async fn lookup(
        &self,
        keys: &[String],
        language: Language,
    ) -> Result<BackendResponse, FetchError> {
        debug!("Requesting {} translation keys ({})", keys.len(), language.code());

        let mut request = self
            .client
            .post(&self.url)
            .timeout(self.timeout)
            .json(&LookupRequest { keys, language });
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }

        let response = request
            .send()
            .await
            .map_err(|e| FetchError::from_reqwest(e, self.timeout))?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response
                .text()
                .await
                .unwrap_or_else(|e| format!("<failed to read body: {}>", e));
            return Err(FetchError::Status { status, body });
        }

        let body: serde_json::Value = response
            .json()
            .await
            .map_err(|e| FetchError::from_reqwest(e, self.timeout))?;

        BackendResponse::from_value(body)
    }
}
