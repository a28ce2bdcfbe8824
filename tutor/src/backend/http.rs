//! HTTP plumbing shared by the provider backends.

use reqwest::{header, Client, Response, StatusCode};
use serde::de::DeserializeOwned;

use super::traits::LlmError;

/// JSON client; credentials are added per request.
pub(crate) fn json_client() -> Result<Client, LlmError> {
    let mut headers = header::HeaderMap::new();
    headers.insert(
        header::CONTENT_TYPE,
        header::HeaderValue::from_static("application/json"),
    );
    Client::builder()
        .default_headers(headers)
        .build()
        .map_err(|e| LlmError::Unavailable(format!("HTTP client: {}", e)))
}

/// Blank keys count as absent.
pub(crate) fn usable_key(api_key: Option<String>) -> Option<String> {
    api_key.filter(|k| !k.trim().is_empty())
}

pub(crate) fn trim_base(url: impl Into<String>) -> String {
    url.into().trim_end_matches('/').to_string()
}

/// Decode a provider reply, mapping HTTP failures onto [`LlmError`].
pub(crate) async fn decode<T: DeserializeOwned>(response: Response) -> Result<T, LlmError> {
    let status = response.status();

    if status == StatusCode::TOO_MANY_REQUESTS {
        // Retry-After in whole seconds; the HTTP-date form is ignored.
        let retry_after_ms = response
            .headers()
            .get(header::RETRY_AFTER)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.trim().parse::<u64>().ok())
            .map(|secs| secs.saturating_mul(1000));
        return Err(LlmError::RateLimited { retry_after_ms });
    }

    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(LlmError::RequestFailed(format!("HTTP {}: {}", status, body)));
    }

    let bytes = response
        .bytes()
        .await
        .map_err(|e| LlmError::NetworkError(e.to_string()))?;
    serde_json::from_slice(&bytes).map_err(|e| LlmError::ParseError(e.to_string()))
}
