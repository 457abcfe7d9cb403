//! # daraja - M-Pesa STK Push payments
//!
//! A Rust client for the Safaricom Daraja API. The client obtains and
//! caches the OAuth bearer token, derives the per-request password, and
//! initiates STK Push payment prompts on a customer's device.

pub mod auth;
pub mod client;
pub mod error;
pub mod signing;
pub mod types;

// Re-exports for convenience
pub use client::DarajaClient;
pub use error::{DarajaError, Result};
pub use types::*;

/// Current version of the daraja library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
