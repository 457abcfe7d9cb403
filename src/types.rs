//! Core types for the Daraja STK Push protocol

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::error::{DarajaError, Result};

/// Default timeout applied to gateway calls
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Fixed command values of the STK Push protocol
pub mod commands {
    /// Transaction type sent with every bill-pay push
    pub const CUSTOMER_PAY_BILL_ONLINE: &str = "CustomerPayBillOnline";
    /// Description attached to every push request
    pub const TRANSACTION_DESC: &str = "Payment";
}

/// Daraja gateway environment
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    Sandbox,
    Production,
}

impl Environment {
    /// Get the gateway base URL for this environment
    pub fn base_url(&self) -> &'static str {
        match self {
            Environment::Sandbox => "https://sandbox.safaricom.co.ke",
            Environment::Production => "https://api.safaricom.co.ke",
        }
    }
}

/// Configuration for a [`DarajaClient`](crate::client::DarajaClient)
#[derive(Debug, Clone)]
pub struct DarajaConfig {
    /// Base URL of the Daraja gateway
    pub base_url: String,
    /// Timeout applied to every network call
    pub timeout: Option<Duration>,
}

impl DarajaConfig {
    /// Create a configuration pointing at a custom base URL
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            timeout: Some(DEFAULT_TIMEOUT),
        }
    }

    /// Create a configuration for a gateway environment
    pub fn for_environment(environment: Environment) -> Self {
        Self::new(environment.base_url())
    }

    /// Set the request timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}

impl Default for DarajaConfig {
    fn default() -> Self {
        Self::for_environment(Environment::Sandbox)
    }
}

/// Static business credentials, supplied once at client construction
#[derive(Debug, Clone)]
pub struct Credentials {
    /// Daraja app consumer key
    pub consumer_key: String,
    /// Daraja app consumer secret
    pub consumer_secret: String,
    /// Merchant business shortcode
    pub business_shortcode: String,
    /// Passkey issued for the business shortcode
    pub passkey: String,
}

impl Credentials {
    /// Create a new set of credentials
    pub fn new(
        consumer_key: impl Into<String>,
        consumer_secret: impl Into<String>,
        business_shortcode: impl Into<String>,
        passkey: impl Into<String>,
    ) -> Self {
        Self {
            consumer_key: consumer_key.into(),
            consumer_secret: consumer_secret.into(),
            business_shortcode: business_shortcode.into(),
            passkey: passkey.into(),
        }
    }

    /// Check that every credential is present, failing on the first missing one
    pub(crate) fn validate(&self) -> Result<()> {
        let fields = [
            ("consumer_key", &self.consumer_key),
            ("consumer_secret", &self.consumer_secret),
            ("business_shortcode", &self.business_shortcode),
            ("passkey", &self.passkey),
        ];

        for (name, value) in fields {
            if value.is_empty() {
                return Err(DarajaError::validation(name));
            }
        }

        Ok(())
    }
}

/// Caller-supplied details for one STK Push attempt
#[derive(Debug, Clone)]
pub struct StkPushRequest {
    /// Customer phone number in international format (e.g. "254700000000")
    pub phone_number: String,
    /// Amount to charge, in whole shillings
    pub amount: u64,
    /// Account reference shown on the customer's statement
    pub account_reference: String,
    /// URL the gateway posts the asynchronous result to
    pub callback_url: String,
}

impl StkPushRequest {
    /// Create a new STK Push request
    pub fn new(
        phone_number: impl Into<String>,
        amount: u64,
        account_reference: impl Into<String>,
        callback_url: impl Into<String>,
    ) -> Self {
        Self {
            phone_number: phone_number.into(),
            amount,
            account_reference: account_reference.into(),
            callback_url: callback_url.into(),
        }
    }

    /// Check that every transaction detail is present, failing on the first missing one
    pub(crate) fn validate(&self) -> Result<()> {
        if self.phone_number.is_empty() {
            return Err(DarajaError::validation("phone_number"));
        }
        if self.amount == 0 {
            return Err(DarajaError::validation("amount"));
        }
        if self.account_reference.is_empty() {
            return Err(DarajaError::validation("account_reference"));
        }
        if self.callback_url.is_empty() {
            return Err(DarajaError::validation("callback_url"));
        }
        Ok(())
    }
}

/// Request body for the STK Push endpoint, sent verbatim with the gateway's
/// exact field spelling
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StkPushPayload {
    /// Merchant business shortcode
    #[serde(rename = "BusinessShortCode")]
    pub business_short_code: String,
    /// Per-request password derived from the shortcode, passkey and timestamp
    #[serde(rename = "Password")]
    pub password: String,
    /// Timestamp the password was derived with
    #[serde(rename = "Timestamp")]
    pub timestamp: String,
    /// Transaction type, always [`commands::CUSTOMER_PAY_BILL_ONLINE`]
    #[serde(rename = "TransactionType")]
    pub transaction_type: String,
    /// Amount to charge, in whole shillings
    #[serde(rename = "Amount")]
    pub amount: u64,
    /// Paying party: the customer phone number
    #[serde(rename = "PartyA")]
    pub party_a: String,
    /// Receiving party: the business shortcode
    #[serde(rename = "PartyB")]
    pub party_b: String,
    /// Phone number the push prompt is sent to
    #[serde(rename = "PhoneNumber")]
    pub phone_number: String,
    /// URL the gateway posts the asynchronous result to
    #[serde(rename = "CallBackURL")]
    pub callback_url: String,
    /// Account reference shown on the customer's statement
    #[serde(rename = "AccountReference")]
    pub account_reference: String,
    /// Transaction description, always [`commands::TRANSACTION_DESC`]
    #[serde(rename = "TransactionDesc")]
    pub transaction_desc: String,
}

impl StkPushPayload {
    /// Assemble the outbound payload from the signed credentials and the
    /// caller-supplied transaction details
    pub fn new(
        credentials: &Credentials,
        password: impl Into<String>,
        timestamp: impl Into<String>,
        request: &StkPushRequest,
    ) -> Self {
        Self {
            business_short_code: credentials.business_shortcode.clone(),
            password: password.into(),
            timestamp: timestamp.into(),
            transaction_type: commands::CUSTOMER_PAY_BILL_ONLINE.to_string(),
            amount: request.amount,
            party_a: request.phone_number.clone(),
            party_b: credentials.business_shortcode.clone(),
            phone_number: request.phone_number.clone(),
            callback_url: request.callback_url.clone(),
            account_reference: request.account_reference.clone(),
            transaction_desc: commands::TRANSACTION_DESC.to_string(),
        }
    }
}

/// Response body of the OAuth token endpoint
#[derive(Debug, Clone, Deserialize)]
pub struct TokenResponse {
    /// Bearer token authorizing gateway calls
    pub access_token: String,
    /// Token lifetime in seconds. The live gateway serves this as a JSON
    /// string, so both string and integer forms are accepted.
    #[serde(deserialize_with = "deserialize_expires_in")]
    pub expires_in: u64,
}

fn deserialize_expires_in<'de, D>(deserializer: D) -> std::result::Result<u64, D::Error>
where
    D: serde::Deserializer<'de>,
{
    struct ExpiresInVisitor;

    impl serde::de::Visitor<'_> for ExpiresInVisitor {
        type Value = u64;

        fn expecting(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            formatter.write_str("seconds as an integer or a string")
        }

        fn visit_u64<E>(self, value: u64) -> std::result::Result<u64, E>
        where
            E: serde::de::Error,
        {
            Ok(value)
        }

        fn visit_i64<E>(self, value: i64) -> std::result::Result<u64, E>
        where
            E: serde::de::Error,
        {
            u64::try_from(value).map_err(serde::de::Error::custom)
        }

        fn visit_str<E>(self, value: &str) -> std::result::Result<u64, E>
        where
            E: serde::de::Error,
        {
            value.parse().map_err(serde::de::Error::custom)
        }
    }

    deserializer.deserialize_any(ExpiresInVisitor)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_credentials() -> Credentials {
        Credentials::new("key", "secret", "174379", "passkey")
    }

    #[test]
    fn test_payload_shape() {
        let request = StkPushRequest::new(
            "254700000000",
            10,
            "X",
            "https://example.com/cb",
        );
        let payload = StkPushPayload::new(
            &test_credentials(),
            "cGFzc3dvcmQ=",
            "20230101120000",
            &request,
        );

        assert_eq!(payload.party_a, "254700000000");
        assert_eq!(payload.phone_number, "254700000000");
        assert_eq!(payload.party_b, "174379");
        assert_eq!(payload.business_short_code, "174379");
        assert_eq!(payload.amount, 10);
        assert_eq!(payload.transaction_type, commands::CUSTOMER_PAY_BILL_ONLINE);
        assert_eq!(payload.transaction_desc, "Payment");
    }

    #[test]
    fn test_payload_field_spelling() {
        let request = StkPushRequest::new("254700000000", 10, "X", "https://example.com/cb");
        let payload = StkPushPayload::new(
            &test_credentials(),
            "cGFzc3dvcmQ=",
            "20230101120000",
            &request,
        );

        let json = serde_json::to_value(&payload).unwrap();
        let object = json.as_object().unwrap();

        for key in [
            "BusinessShortCode",
            "Password",
            "Timestamp",
            "TransactionType",
            "Amount",
            "PartyA",
            "PartyB",
            "PhoneNumber",
            "CallBackURL",
            "AccountReference",
            "TransactionDesc",
        ] {
            assert!(object.contains_key(key), "missing field {}", key);
        }
        assert_eq!(object.len(), 11);
    }

    #[test]
    fn test_credentials_validation_names_first_missing_field() {
        let credentials = Credentials::new("", "secret", "174379", "passkey");
        let err = credentials.validate().unwrap_err();
        assert_eq!(err.to_string(), "Missing required parameter: consumer_key");

        let credentials = Credentials::new("key", "secret", "174379", "");
        let err = credentials.validate().unwrap_err();
        assert_eq!(err.to_string(), "Missing required parameter: passkey");
    }

    #[test]
    fn test_request_validation() {
        let request = StkPushRequest::new("", 10, "X", "https://example.com/cb");
        let err = request.validate().unwrap_err();
        assert_eq!(err.to_string(), "Missing required parameter: phone_number");

        let request = StkPushRequest::new("254700000000", 0, "X", "https://example.com/cb");
        let err = request.validate().unwrap_err();
        assert_eq!(err.to_string(), "Missing required parameter: amount");

        let request = StkPushRequest::new("254700000000", 10, "X", "https://example.com/cb");
        assert!(request.validate().is_ok());
    }

    #[test]
    fn test_token_response_integer_expiry() {
        let response: TokenResponse =
            serde_json::from_str(r#"{"access_token": "abc123", "expires_in": 3599}"#).unwrap();
        assert_eq!(response.access_token, "abc123");
        assert_eq!(response.expires_in, 3599);
    }

    #[test]
    fn test_token_response_string_expiry() {
        let response: TokenResponse =
            serde_json::from_str(r#"{"access_token": "abc123", "expires_in": "3599"}"#).unwrap();
        assert_eq!(response.expires_in, 3599);
    }

    #[test]
    fn test_environment_urls() {
        assert_eq!(
            Environment::Sandbox.base_url(),
            "https://sandbox.safaricom.co.ke"
        );
        assert_eq!(
            Environment::Production.base_url(),
            "https://api.safaricom.co.ke"
        );
    }

    #[test]
    fn test_config_builder() {
        let config = DarajaConfig::new("https://example.com")
            .with_timeout(Duration::from_secs(5));
        assert_eq!(config.base_url, "https://example.com");
        assert_eq!(config.timeout, Some(Duration::from_secs(5)));

        let config = DarajaConfig::default();
        assert_eq!(config.base_url, "https://sandbox.safaricom.co.ke");
        assert_eq!(config.timeout, Some(DEFAULT_TIMEOUT));
    }
}
