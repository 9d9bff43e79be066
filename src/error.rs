//! Onboardbase error types using thiserror 2.0.
//!
//! One variant per failure kind in the request/response/decrypt pipeline,
//! each carrying a human message, the wrapped cause where one exists, and a
//! bounded raw-data snippet for diagnosis.

use crate::crypto::CryptoError;
use thiserror::Error;

/// Maximum length of a raw-data diagnostic snippet, in characters.
const SNIPPET_MAX: usize = 512;

/// Onboardbase client errors.
#[derive(Error, Debug)]
pub enum OnboardbaseError {
    /// Configuration rejected before any network call
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// Base URL and path did not join into a valid URL
    #[error("invalid API URL: {url}")]
    MalformedUrl {
        /// The URL that failed to parse
        url: String,
        /// Parse failure
        #[source]
        source: url::ParseError,
    },

    /// Network, TLS or timeout failure before a response was received
    #[error("unable to load response")]
    Transport(#[source] reqwest::Error),

    /// The HTTP exchange succeeded but the body could not be read in full
    #[error("unable to read entire response body (status {status})")]
    Io {
        /// Status of the exchange that produced the unreadable body
        status: u16,
        /// Read failure
        #[source]
        source: reqwest::Error,
    },

    /// JSON parse failure, on either the success or the error path
    #[error("{message}")]
    Decode {
        /// What was being decoded
        message: String,
        /// Bounded fragment of the offending payload
        data: String,
        /// Parse failure
        #[source]
        source: serde_json::Error,
    },

    /// The service rejected the call
    #[error("API rejected request: {message}")]
    ApiRejected {
        /// HTTP status of the rejection
        status: u16,
        /// Newline-joined service messages, or a status/length summary for
        /// non-JSON bodies
        message: String,
    },

    /// One envelope could not be decrypted with the configured passcode
    #[error("unable to decrypt secret payload")]
    DecryptFailed {
        /// Bounded fragment of the offending envelope
        data: String,
        /// Decryption failure
        #[source]
        source: CryptoError,
    },

    /// The requested secret was absent (or empty) after a successful fetch
    #[error("secret {name} for project '{project}' and environment '{environment}' not found")]
    NotFound {
        /// Requested secret name
        name: String,
        /// Project scope of the request
        project: String,
        /// Environment scope of the request
        environment: String,
    },
}

/// Result type for Onboardbase operations.
pub type OnboardbaseResult<T> = Result<T, OnboardbaseError>;

impl OnboardbaseError {
    /// Check if the error is retryable.
    ///
    /// The client never retries internally; this classification is for
    /// callers deciding on their own retry/backoff policy. Only transient
    /// transport-level failures qualify.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(self, Self::Transport(_) | Self::Io { .. })
    }

    /// Create an invalid configuration error.
    #[must_use]
    pub fn invalid_config(msg: impl Into<String>) -> Self {
        Self::InvalidConfig(msg.into())
    }

    /// Create a malformed URL error.
    #[must_use]
    pub fn malformed_url(url: impl Into<String>, source: url::ParseError) -> Self {
        Self::MalformedUrl {
            url: url.into(),
            source,
        }
    }

    /// Create a decode error carrying a bounded payload fragment.
    #[must_use]
    pub fn decode(message: impl Into<String>, data: &str, source: serde_json::Error) -> Self {
        Self::Decode {
            message: message.into(),
            data: snippet(data),
            source,
        }
    }

    /// Create a decrypt failure naming the offending envelope.
    #[must_use]
    pub fn decrypt_failed(envelope: &str, source: CryptoError) -> Self {
        Self::DecryptFailed {
            data: snippet(envelope),
            source,
        }
    }
}

/// Truncate diagnostic payloads so full bodies never reach logs.
pub(crate) fn snippet(data: &str) -> String {
    if data.chars().count() <= SNIPPET_MAX {
        data.to_string()
    } else {
        data.chars().take(SNIPPET_MAX).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = OnboardbaseError::NotFound {
            name: "DB_URL".to_string(),
            project: "proj".to_string(),
            environment: "dev".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "secret DB_URL for project 'proj' and environment 'dev' not found"
        );

        let err = OnboardbaseError::ApiRejected {
            status: 500,
            message: "500 status code; 12 bytes".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "API rejected request: 500 status code; 12 bytes"
        );
    }

    #[test]
    fn test_retryable_classification() {
        let not_found = OnboardbaseError::NotFound {
            name: "a".to_string(),
            project: "b".to_string(),
            environment: "c".to_string(),
        };
        assert!(!not_found.is_retryable());
        assert!(!OnboardbaseError::invalid_config("bad").is_retryable());
        assert!(
            !OnboardbaseError::ApiRejected {
                status: 404,
                message: "not found".to_string(),
            }
            .is_retryable()
        );
    }

    #[test]
    fn test_snippet_truncation() {
        let short = "abc";
        assert_eq!(snippet(short), "abc");

        let long = "x".repeat(2000);
        assert_eq!(snippet(&long).chars().count(), 512);
    }
}
