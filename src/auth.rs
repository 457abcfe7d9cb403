//! Bearer token acquisition and caching

use base64::{engine::general_purpose, Engine as _};
use reqwest::header::AUTHORIZATION;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use tracing::debug;

use crate::error::{DarajaError, Result};
use crate::types::{Credentials, DarajaConfig, TokenResponse};

/// Path of the OAuth token endpoint
pub const TOKEN_PATH: &str = "/oauth/v1/generate?grant_type=client_credentials";

/// A bearer token together with the instant it stops being usable
#[derive(Debug, Clone)]
struct CachedToken {
    value: String,
    expires_at: Instant,
}

/// Single-slot cache for the gateway bearer token.
///
/// Holds the most recently issued token and refreshes it once its expiry
/// instant is no longer strictly in the future. The slot is guarded by an
/// async mutex held across the refresh, so concurrent misses wait for the
/// one in-flight authentication call instead of issuing duplicates.
#[derive(Debug, Default)]
pub struct TokenCache {
    slot: Mutex<Option<CachedToken>>,
}

impl TokenCache {
    /// Create an empty cache
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the cached token, fetching a fresh one if the slot is empty or
    /// expired.
    ///
    /// On failure the slot is left unchanged, so a stale entry is kept and
    /// the next call retries authentication.
    pub async fn access_token(
        &self,
        http: &reqwest::Client,
        config: &DarajaConfig,
        credentials: &Credentials,
    ) -> Result<String> {
        let mut slot = self.slot.lock().await;

        if let Some(cached) = slot.as_ref() {
            if cached.expires_at > Instant::now() {
                debug!("access token cache hit");
                return Ok(cached.value.clone());
            }
        }

        let response = fetch_token(http, config, credentials).await?;
        let expires_at = Instant::now() + Duration::from_secs(response.expires_in);
        debug!(expires_in = response.expires_in, "fetched new access token");

        let value = response.access_token;
        *slot = Some(CachedToken {
            value: value.clone(),
            expires_at,
        });

        Ok(value)
    }
}

/// Exchange the consumer key and secret for a fresh bearer token
async fn fetch_token(
    http: &reqwest::Client,
    config: &DarajaConfig,
    credentials: &Credentials,
) -> Result<TokenResponse> {
    let url = format!("{}{}", config.base_url, TOKEN_PATH);
    let authorization = basic_auth_header(&credentials.consumer_key, &credentials.consumer_secret);

    let response = http
        .get(&url)
        .header(AUTHORIZATION, authorization)
        .send()
        .await
        .map_err(|e| DarajaError::authentication(format!("Error fetching access token: {}", e)))?;

    let status = response.status();
    if !status.is_success() {
        let err_text = response
            .text()
            .await
            .unwrap_or_else(|e| format!("Unknown Error: {}", e));
        return Err(DarajaError::authentication(format!(
            "Token request rejected with status {}: {}",
            status, err_text
        )));
    }

    response
        .json::<TokenResponse>()
        .await
        .map_err(|e| DarajaError::authentication(format!("Invalid token response: {}", e)))
}

/// Build the `Basic` authorization header from the consumer key and secret
fn basic_auth_header(consumer_key: &str, consumer_secret: &str) -> String {
    let encoded = general_purpose::STANDARD.encode(format!("{}:{}", consumer_key, consumer_secret));
    format!("Basic {}", encoded)
}
