//! Client-credentials token exchange.

use crate::config::PlatformConfig;
use crate::error::{PlatformError, PlatformResult};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
}

/// Fetch a bearer token for the configured identity.
pub async fn fetch_token(
    http: &reqwest::Client,
    config: &PlatformConfig,
) -> PlatformResult<String> {
    let scope = config.token_scope();
    let params = [
        ("grant_type", "client_credentials"),
        ("client_id", config.client_id.as_str()),
        ("client_secret", config.client_secret.as_str()),
        ("scope", scope.as_str()),
    ];

    let response = http
        .post(config.token_endpoint())
        .form(&params)
        .send()
        .await
        .map_err(|e| PlatformError::Auth(format!("Token request failed: {}", e)))?;

    if !response.status().is_success() {
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        tracing::error!(status = %status, "Token endpoint returned error");
        return Err(PlatformError::Auth(format!(
            "Token endpoint returned {}: {}",
            status, body
        )));
    }

    let token: TokenResponse = response
        .json()
        .await
        .map_err(|e| PlatformError::Auth(format!("Malformed token response: {}", e)))?;

    Ok(token.access_token)
}
