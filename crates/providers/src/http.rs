//! Shared HTTP plumbing: client construction and status-code mapping.

use std::time::Duration;

use chatgate_core::error::ProviderError;
use tracing::warn;

const CONNECT_TIMEOUT_SECS: u64 = 10;

/// Longest silence between reads. Applies per read, so a long SSE answer
/// is not cut off as long as tokens keep arriving.
const READ_TIMEOUT_SECS: u64 = 120;

pub(crate) fn build_client() -> reqwest::Client {
    client_with_timeouts(
        Duration::from_secs(CONNECT_TIMEOUT_SECS),
        Duration::from_secs(READ_TIMEOUT_SECS),
    )
}

fn client_with_timeouts(connect: Duration, read: Duration) -> reqwest::Client {
    reqwest::Client::builder()
        .connect_timeout(connect)
        .read_timeout(read)
        .build()
        .unwrap_or_else(|e| {
            warn!(error = %e, "Falling back to default HTTP client");
            reqwest::Client::new()
        })
}

/// Fail fast when no API key is configured instead of sending an
/// unauthenticated request upstream.
pub(crate) fn require_api_key(provider: &str, api_key: &str) -> Result<(), ProviderError> {
    if api_key.trim().is_empty() {
        return Err(ProviderError::NotConfigured(format!(
            "{provider}: no API key (set OPENAI_API_KEY or CHATGATE_API_KEY)"
        )));
    }
    Ok(())
}

pub(crate) fn network_error(e: reqwest::Error) -> ProviderError {
    ProviderError::Network(e.to_string())
}

/// Map a non-success response to the provider error taxonomy.
///
/// Successful responses are returned untouched.
pub(crate) async fn check_status(
    response: reqwest::Response,
    provider: &str,
) -> Result<reqwest::Response, ProviderError> {
    let status = response.status().as_u16();

    if status == 429 {
        let retry_after_secs = response
            .headers()
            .get("retry-after")
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.parse().ok())
            .unwrap_or(5);
        return Err(ProviderError::RateLimited { retry_after_secs });
    }

    if status == 401 || status == 403 {
        return Err(ProviderError::AuthenticationFailed(
            "Invalid API key or insufficient permissions".into(),
        ));
    }

    if !response.status().is_success() {
        let error_body = response.text().await.unwrap_or_default();
        warn!(provider, status, body = %error_body, "Provider returned error");
        return Err(ProviderError::ApiError {
            status_code: status,
            message: error_body,
        });
    }

    Ok(response)
}
