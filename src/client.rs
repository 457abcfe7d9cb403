//! Client for initiating STK Push payments against the Daraja gateway

use reqwest::Client;
use serde_json::Value;
use tracing::debug;

use crate::auth::TokenCache;
use crate::error::{DarajaError, Result};
use crate::signing;
use crate::types::{Credentials, DarajaConfig, StkPushPayload, StkPushRequest};

/// Path of the STK Push endpoint
pub const STK_PUSH_PATH: &str = "/mpesa/stkpush/v1/processrequest";

/// Client for the Daraja payment gateway.
///
/// Owns the business credentials, a configured HTTP client and the token
/// cache amortizing authentication calls across payment requests.
#[derive(Debug)]
pub struct DarajaClient {
    credentials: Credentials,
    config: DarajaConfig,
    http: Client,
    token_cache: TokenCache,
}

impl DarajaClient {
    /// Create a client for the sandbox gateway.
    ///
    /// Fails with a validation error naming the first missing credential.
    pub fn new(credentials: Credentials) -> Result<Self> {
        Self::with_config(credentials, DarajaConfig::default())
    }

    /// Create a client with a custom configuration
    pub fn with_config(credentials: Credentials, config: DarajaConfig) -> Result<Self> {
        credentials.validate()?;

        let mut builder = Client::builder();
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }
        let http = builder
            .build()
            .map_err(|e| DarajaError::config(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            credentials,
            config,
            http,
            token_cache: TokenCache::new(),
        })
    }

    /// Get a bearer token, reusing the cached one while it is still valid
    pub async fn access_token(&self) -> Result<String> {
        self.token_cache
            .access_token(&self.http, &self.config, &self.credentials)
            .await
    }

    /// Initiate an STK Push, prompting the customer's device to authorize
    /// the payment.
    ///
    /// Validates the request before any network call, obtains a token,
    /// derives a fresh password and timestamp, and posts the payload.
    /// Returns the gateway's JSON response unmodified; the payment result
    /// itself arrives later on the callback URL.
    pub async fn stk_push(&self, request: &StkPushRequest) -> Result<Value> {
        request.validate()?;

        let token = self.access_token().await?;
        let timestamp = signing::timestamp();
        let password = signing::password(
            &self.credentials.business_shortcode,
            &self.credentials.passkey,
            &timestamp,
        );
        let payload = StkPushPayload::new(&self.credentials, password, timestamp, request);

        let url = format!("{}{}", self.config.base_url, STK_PUSH_PATH);
        debug!(amount = request.amount, "initiating STK push");

        let response = self
            .http
            .post(&url)
            .bearer_auth(&token)
            .json(&payload)
            .send()
            .await
            .map_err(|e| DarajaError::request(format!("Error sending STK Push request: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let err_text = response
                .text()
                .await
                .unwrap_or_else(|e| format!("Unknown Error: {}", e));
            return Err(DarajaError::request(format!(
                "STK Push rejected with status {}: {}",
                status, err_text
            )));
        }

        response
            .json::<Value>()
            .await
            .map_err(|e| DarajaError::request(format!("Invalid STK Push response: {}", e)))
    }

    /// Get the configuration of this client
    pub fn config(&self) -> &DarajaConfig {
        &self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Environment;

    fn test_credentials() -> Credentials {
        Credentials::new("key", "secret", "174379", "passkey")
    }

    #[test]
    fn test_client_requires_credentials() {
        let err =
            DarajaClient::new(Credentials::new("", "secret", "174379", "passkey")).unwrap_err();
        assert_eq!(err.to_string(), "Missing required parameter: consumer_key");

        let err =
            DarajaClient::new(Credentials::new("key", "secret", "", "passkey")).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Missing required parameter: business_shortcode"
        );
    }

    #[test]
    fn test_client_defaults_to_sandbox() {
        let client = DarajaClient::new(test_credentials()).unwrap();
        assert_eq!(client.config().base_url, Environment::Sandbox.base_url());
    }

    #[test]
    fn test_client_with_custom_config() {
        let config = DarajaConfig::for_environment(Environment::Production);
        let client = DarajaClient::with_config(test_credentials(), config).unwrap();
        assert_eq!(client.config().base_url, "https://api.safaricom.co.ke");
    }
}
