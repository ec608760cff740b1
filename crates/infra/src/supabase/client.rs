use std::time::Duration;

use reqwest::{Method, RequestBuilder, Url};
use serde_json::Value as JsonValue;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SupabaseConfigError {
    #[error("invalid supabase url: {0}")]
    InvalidUrl(String),

    #[error("supabase api key is empty")]
    MissingKey,

    #[error("could not build http client: {0}")]
    Client(String),
}

/// HTTP handle on one Supabase project (auth + REST).
///
/// Built once at startup and shared by the auth provider and the role store.
#[derive(Clone)]
pub struct SupabaseClient {
    http: reqwest::Client,
    base_url: Url,
    api_key: String,
}

impl core::fmt::Debug for SupabaseClient {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("SupabaseClient")
            .field("base_url", &self.base_url.as_str())
            .field("api_key", &"<redacted>")
            .finish()
    }
}

impl SupabaseClient {
    pub fn new(
        base_url: &str,
        api_key: impl Into<String>,
        request_timeout: Duration,
    ) -> Result<Self, SupabaseConfigError> {
        let api_key = api_key.into();
        if api_key.trim().is_empty() {
            return Err(SupabaseConfigError::MissingKey);
        }

        // A trailing slash makes `Url::join` append instead of replacing the last segment.
        let normalized = format!("{}/", base_url.trim().trim_end_matches('/'));
        let base_url = Url::parse(&normalized)
            .map_err(|e| SupabaseConfigError::InvalidUrl(format!("{base_url}: {e}")))?;
        if !matches!(base_url.scheme(), "http" | "https") {
            return Err(SupabaseConfigError::InvalidUrl(format!(
                "{base_url}: scheme must be http or https"
            )));
        }

        let http = reqwest::Client::builder()
            .timeout(request_timeout)
            .build()
            .map_err(|e| SupabaseConfigError::Client(e.to_string()))?;

        Ok(Self {
            http,
            base_url,
            api_key,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub(crate) fn api_key(&self) -> &str {
        &self.api_key
    }

    pub(crate) fn endpoint(&self, path: &str) -> Result<Url, String> {
        self.base_url
            .join(path.trim_start_matches('/'))
            .map_err(|e| e.to_string())
    }

    /// Request carrying the project `apikey` header. Callers add their own
    /// `Authorization` (user token or project key).
    pub(crate) fn request(&self, method: Method, path: &str) -> Result<RequestBuilder, String> {
        let url = self.endpoint(path)?;
        Ok(self.http.request(method, url).header("apikey", &self.api_key))
    }
}

/// Pull a human-readable message out of an auth/REST error body.
pub(crate) fn error_message(body: &JsonValue) -> Option<String> {
    ["msg", "error_description", "message", "error"]
        .iter()
        .find_map(|key| body.get(*key).and_then(JsonValue::as_str))
        .map(str::to_string)
}
