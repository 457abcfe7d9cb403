//! Error types for the daraja library

use thiserror::Error;

/// Result type alias for Daraja operations
pub type Result<T> = std::result::Result<T, DarajaError>;

/// Main error type for Daraja operations
#[derive(Error, Debug)]
pub enum DarajaError {
    /// Missing or invalid caller-supplied field, detected before any network call
    #[error("Missing required parameter: {field}")]
    Validation { field: String },

    /// Token exchange with the OAuth endpoint failed
    #[error("Authentication failed: {message}")]
    Authentication { message: String },

    /// STK Push call failed after a valid token was obtained
    #[error("STK Push failed: {message}")]
    Request { message: String },

    /// Client construction failed
    #[error("Configuration error: {message}")]
    Config { message: String },
}

impl DarajaError {
    /// Create a validation error naming the missing field
    pub fn validation(field: impl Into<String>) -> Self {
        Self::Validation {
            field: field.into(),
        }
    }

    /// Create an authentication error
    pub fn authentication(message: impl Into<String>) -> Self {
        Self::Authentication {
            message: message.into(),
        }
    }

    /// Create a request error
    pub fn request(message: impl Into<String>) -> Self {
        Self::Request {
            message: message.into(),
        }
    }

    /// Create a configuration error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }
}
