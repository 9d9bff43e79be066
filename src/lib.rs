//! Onboardbase secrets API client.
//!
//! Fetches encrypted secret envelopes from the Onboardbase public API and
//! decrypts them client-side into key/value form. The client is read-only:
//! it never writes to the remote service, never retries, and never caches
//! results across calls.

pub mod client;
pub mod config;
pub mod crypto;
pub mod error;
pub mod provider;
pub mod secrets;

pub use client::OnboardbaseClient;
pub use config::ClientConfig;
pub use error::{OnboardbaseError, OnboardbaseResult};
pub use provider::{Capabilities, SecretsProvider};
pub use secrets::{SecretRequest, SecretResponse, SecretsMap, SecretsRequest, SecretsResponse};
