//! Host-facing secrets provider seam.
//!
//! The host process composes its own capability table from
//! [`SecretsProvider::capabilities`]; no global registry is involved.

use crate::secrets::{SecretRequest, SecretResponse, SecretsRequest, SecretsResponse};
use async_trait::async_trait;

/// Operations a provider supports against its backing store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Capabilities {
    /// Read operations only; no write or update surface is exposed.
    ReadOnly,
    /// Read and write operations.
    ReadWrite,
}

/// Read access to a remote secret store.
#[async_trait]
pub trait SecretsProvider: Send + Sync {
    /// Error type surfaced by every operation.
    type Error: std::error::Error + Send + Sync;

    /// Declared capabilities of this provider.
    fn capabilities(&self) -> Capabilities;

    /// Fetch a single named secret within a scope.
    async fn get_secret(&self, request: SecretRequest) -> Result<SecretResponse, Self::Error>;

    /// Fetch every secret within a scope.
    async fn get_secrets(&self, request: SecretsRequest) -> Result<SecretsResponse, Self::Error>;

    /// Eagerly validate credentials against the backing store.
    async fn authenticate(&self) -> Result<(), Self::Error>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::OnboardbaseClient;

    #[test]
    fn test_client_is_read_only() {
        let client = OnboardbaseClient::new("key", "passcode").unwrap();
        assert_eq!(
            SecretsProvider::capabilities(&client),
            Capabilities::ReadOnly
        );
    }
}
