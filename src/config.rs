//! Onboardbase client configuration.

use crate::error::{OnboardbaseError, OnboardbaseResult};
use secrecy::{ExposeSecret, SecretString};
use std::time::Duration;
use url::Url;

/// Default Onboardbase public API base URL.
pub const DEFAULT_BASE_URL: &str = "https://public.onboardbase.com/api/v1/";

/// User agent reported on every request.
pub const DEFAULT_USER_AGENT: &str = "onboardbase-external-secrets";

/// Default per-request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Immutable client configuration.
///
/// Built once before the client is constructed and never mutated afterwards.
/// Both credentials are held as [`SecretString`] so they stay out of debug
/// and log output.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// API key sent with every request in the `api_key` header.
    pub api_key: SecretString,
    /// Passcode used as the symmetric key for envelope decryption.
    pub passcode: SecretString,
    /// Absolute base URL of the remote API, without a trailing slash.
    pub base_url: Url,
    /// User agent string.
    pub user_agent: String,
    /// Request timeout; the sole bound on a call.
    pub timeout: Duration,
}

impl ClientConfig {
    /// Create a configuration for the public Onboardbase API.
    ///
    /// # Errors
    ///
    /// Returns [`OnboardbaseError::MalformedUrl`] if the default base URL
    /// fails to parse.
    pub fn new(
        api_key: impl Into<String>,
        passcode: impl Into<String>,
    ) -> OnboardbaseResult<Self> {
        Ok(Self {
            api_key: SecretString::from(api_key.into()),
            passcode: SecretString::from(passcode.into()),
            base_url: parse_base_url(DEFAULT_BASE_URL)?,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            timeout: DEFAULT_TIMEOUT,
        })
    }

    /// Override the base URL.
    ///
    /// A trailing slash is trimmed and a missing scheme defaults to `https`.
    ///
    /// # Errors
    ///
    /// Returns [`OnboardbaseError::MalformedUrl`] if the URL fails to parse.
    pub fn with_base_url(mut self, url: &str) -> OnboardbaseResult<Self> {
        self.base_url = parse_base_url(url)?;
        Ok(self)
    }

    /// Set the request timeout.
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the user agent string.
    #[must_use]
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Check that the configuration is fully formed.
    ///
    /// Both credentials must be non-empty and the base URL must be an
    /// absolute `https` URL. Plain `http` is admitted only for loopback
    /// hosts so local mock backends remain reachable.
    ///
    /// # Errors
    ///
    /// Returns [`OnboardbaseError::InvalidConfig`] describing the first
    /// violation found.
    pub fn validate(&self) -> OnboardbaseResult<()> {
        if self.api_key.expose_secret().is_empty() {
            return Err(OnboardbaseError::invalid_config("API key must not be empty"));
        }
        if self.passcode.expose_secret().is_empty() {
            return Err(OnboardbaseError::invalid_config(
                "passcode must not be empty",
            ));
        }
        match self.base_url.scheme() {
            "https" => {}
            "http" if is_loopback(&self.base_url) => {}
            scheme => {
                return Err(OnboardbaseError::invalid_config(format!(
                    "base URL must use https, got scheme '{scheme}' for host {:?}",
                    self.base_url.host_str()
                )));
            }
        }
        if self.base_url.host_str().is_none() {
            return Err(OnboardbaseError::invalid_config("base URL has no host"));
        }
        Ok(())
    }
}

fn is_loopback(url: &Url) -> bool {
    match url.host() {
        Some(url::Host::Domain(domain)) => domain == "localhost",
        Some(url::Host::Ipv4(addr)) => addr.is_loopback(),
        Some(url::Host::Ipv6(addr)) => addr.is_loopback(),
        None => false,
    }
}

fn parse_base_url(raw: &str) -> OnboardbaseResult<Url> {
    let trimmed = raw.trim_end_matches('/');
    let parsed = match Url::parse(trimmed) {
        Ok(url) => url,
        // The original accepts scheme-less addresses and assumes https.
        Err(url::ParseError::RelativeUrlWithoutBase) => Url::parse(&format!("https://{trimmed}"))
            .map_err(|e| OnboardbaseError::malformed_url(trimmed, e))?,
        Err(e) => return Err(OnboardbaseError::malformed_url(trimmed, e)),
    };
    Ok(parsed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ClientConfig::new("key", "passcode").unwrap();
        assert_eq!(config.base_url.as_str(), "https://public.onboardbase.com/api/v1");
        assert_eq!(config.user_agent, DEFAULT_USER_AGENT);
        assert_eq!(config.timeout, Duration::from_secs(10));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_empty_credentials_rejected() {
        let config = ClientConfig::new("", "passcode").unwrap();
        assert!(config.validate().is_err());

        let config = ClientConfig::new("key", "").unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_scheme_defaults_to_https() {
        let config = ClientConfig::new("key", "passcode")
            .unwrap()
            .with_base_url("public.onboardbase.com/api/v1")
            .unwrap();
        assert_eq!(config.base_url.scheme(), "https");
    }

    #[test]
    fn test_trailing_slash_trimmed() {
        let config = ClientConfig::new("key", "passcode")
            .unwrap()
            .with_base_url("https://example.com/api/v1/")
            .unwrap();
        assert_eq!(config.base_url.as_str(), "https://example.com/api/v1");
    }

    #[test]
    fn test_plain_http_only_for_loopback() {
        let config = ClientConfig::new("key", "passcode")
            .unwrap()
            .with_base_url("http://127.0.0.1:8080/api/v1")
            .unwrap();
        assert!(config.validate().is_ok());

        let config = ClientConfig::new("key", "passcode")
            .unwrap()
            .with_base_url("http://example.com/api/v1")
            .unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_debug_redacts_credentials() {
        let config = ClientConfig::new("my-api-key", "my-passcode").unwrap();
        let debug = format!("{config:?}");
        assert!(!debug.contains("my-api-key"));
        assert!(!debug.contains("my-passcode"));
    }
}
