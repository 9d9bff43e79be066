//! Request and response types for the Onboardbase secrets API.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// Flat mapping from secret name to plaintext value.
///
/// Built fresh per request; never persisted or merged across calls.
pub type SecretsMap = HashMap<String, String>;

/// Request for a single named secret within a scope.
#[derive(Debug, Clone, Default)]
pub struct SecretRequest {
    /// Project scope; empty means unscoped.
    pub project: String,
    /// Environment scope; empty means unscoped.
    pub environment: String,
    /// Name of the secret to fetch. Must be non-empty.
    pub name: String,
}

impl SecretRequest {
    /// Build the outbound query pairs, omitting empty scope values.
    #[must_use]
    pub fn query_params(&self) -> Vec<(&'static str, String)> {
        scope_params(&self.project, &self.environment)
    }
}

/// Request for every secret within a scope.
#[derive(Debug, Clone, Default)]
pub struct SecretsRequest {
    /// Project scope; empty means unscoped.
    pub project: String,
    /// Environment scope; empty means unscoped.
    pub environment: String,
}

impl SecretsRequest {
    /// Build the outbound query pairs, omitting empty scope values.
    #[must_use]
    pub fn query_params(&self) -> Vec<(&'static str, String)> {
        scope_params(&self.project, &self.environment)
    }
}

// An empty scope value is omitted entirely, never sent as `project=`.
fn scope_params(project: &str, environment: &str) -> Vec<(&'static str, String)> {
    let mut params = Vec::with_capacity(2);
    if !project.is_empty() {
        params.push(("project", project.to_string()));
    }
    if !environment.is_empty() {
        params.push(("environment", environment.to_string()));
    }
    params
}

/// One decrypted secret record, as carried inside an envelope.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawSecret {
    /// Secret name.
    #[serde(default)]
    pub key: String,
    /// Plaintext value.
    #[serde(default)]
    pub value: String,
}

/// A single resolved secret.
#[derive(Clone)]
pub struct SecretResponse {
    /// Secret name.
    pub name: String,
    /// Plaintext value.
    pub value: String,
}

impl fmt::Debug for SecretResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SecretResponse")
            .field("name", &self.name)
            .field("value", &"[REDACTED]")
            .finish()
    }
}

/// The full decrypted mapping for a scope, plus the raw response body for
/// callers that need provenance.
#[derive(Clone)]
pub struct SecretsResponse {
    /// Decrypted name to value mapping.
    pub secrets: SecretsMap,
    /// Raw response body as returned by the API.
    pub body: Vec<u8>,
}

impl fmt::Debug for SecretsResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SecretsResponse")
            .field("secrets", &format_args!("<{} entries>", self.secrets.len()))
            .field("body", &format_args!("<{} bytes>", self.body.len()))
            .finish()
    }
}

/// Named object inside the response scope block.
#[derive(Debug, Clone, Default, Deserialize)]
pub(crate) struct ScopeObject {
    #[serde(default)]
    pub title: String,
}

/// Scope block of a `/secrets` response: one project/environment/team triple
/// and the encrypted envelopes belonging to it.
#[derive(Debug, Clone, Default, Deserialize)]
pub(crate) struct SecretsPayload {
    #[serde(default)]
    pub project: ScopeObject,
    #[serde(default)]
    pub environment: ScopeObject,
    #[serde(default)]
    pub team: ScopeObject,
    #[serde(default)]
    pub secrets: Vec<String>,
}

/// Envelope of a `/secrets` response.
#[derive(Debug, Clone, Default, Deserialize)]
pub(crate) struct SecretsEnvelope {
    #[serde(default)]
    pub data: SecretsPayload,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub status: String,
}

/// Error body the service sends on rejected calls.
#[derive(Debug, Clone, Default, Deserialize)]
pub(crate) struct ApiErrorBody {
    #[serde(default)]
    pub messages: Vec<String>,
    #[serde(default)]
    pub success: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_scope_values_omitted() {
        let request = SecretsRequest {
            project: "proj".to_string(),
            environment: String::new(),
        };
        assert_eq!(request.query_params(), vec![("project", "proj".to_string())]);

        let request = SecretsRequest::default();
        assert!(request.query_params().is_empty());
    }

    #[test]
    fn test_both_scope_values_present() {
        let request = SecretRequest {
            project: "proj".to_string(),
            environment: "dev".to_string(),
            name: "DB_URL".to_string(),
        };
        assert_eq!(
            request.query_params(),
            vec![
                ("project", "proj".to_string()),
                ("environment", "dev".to_string()),
            ]
        );
    }

    #[test]
    fn test_envelope_deserializes_with_missing_fields() {
        let envelope: SecretsEnvelope = serde_json::from_str(r#"{"data":{}}"#).unwrap();
        assert!(envelope.data.secrets.is_empty());
        assert!(envelope.message.is_empty());

        let envelope: SecretsEnvelope =
            serde_json::from_str(r#"{"data":{"secrets":["abc"],"team":{"title":"t"}}}"#).unwrap();
        assert_eq!(envelope.data.secrets, vec!["abc".to_string()]);
        assert_eq!(envelope.data.team.title, "t");
    }

    #[test]
    fn test_error_body_deserializes() {
        let body: ApiErrorBody =
            serde_json::from_str(r#"{"messages":["not found"],"success":false}"#).unwrap();
        assert_eq!(body.messages, vec!["not found".to_string()]);
        assert!(!body.success);
    }

    #[test]
    fn test_secret_response_debug_redacts_value() {
        let response = SecretResponse {
            name: "DB_URL".to_string(),
            value: "postgres://x".to_string(),
        };
        let debug = format!("{response:?}");
        assert!(debug.contains("DB_URL"));
        assert!(!debug.contains("postgres://x"));
        assert!(debug.contains("[REDACTED]"));
    }
}
