//! Onboardbase HTTP client: transport and secrets facade.
//!
//! One authenticated HTTPS call per operation. No retries, no caching, no
//! session state; every call re-authenticates through the static `api_key`
//! header and the configured timeout is the sole bound.

use crate::{
    config::ClientConfig,
    crypto,
    error::{OnboardbaseError, OnboardbaseResult},
    provider::{Capabilities, SecretsProvider},
    secrets::{
        ApiErrorBody, RawSecret, SecretRequest, SecretResponse, SecretsEnvelope, SecretsMap,
        SecretsPayload, SecretsRequest, SecretsResponse,
    },
};
use async_trait::async_trait;
use reqwest::{Client, Method, StatusCode, header, redirect};
use secrecy::ExposeSecret;
use tracing::{debug, instrument};
use url::Url;

/// Onboardbase API client.
///
/// Stateless across calls beyond its immutable configuration; safe for
/// concurrent use. Connection reuse is disabled by construction, trading
/// latency for freedom from shared-connection state.
#[derive(Debug)]
pub struct OnboardbaseClient {
    config: ClientConfig,
    http: Client,
}

/// Structured success from one HTTP exchange.
pub(crate) struct ApiResponse {
    pub status: StatusCode,
    pub body: Vec<u8>,
}

impl OnboardbaseClient {
    /// Create a client for the public Onboardbase API.
    ///
    /// # Errors
    ///
    /// Returns [`OnboardbaseError::InvalidConfig`] when either credential is
    /// empty, or a transport error if the underlying HTTP client cannot be
    /// built.
    pub fn new(
        api_key: impl Into<String>,
        passcode: impl Into<String>,
    ) -> OnboardbaseResult<Self> {
        Self::with_config(ClientConfig::new(api_key, passcode)?)
    }

    /// Create a client from an explicit configuration.
    ///
    /// The configuration is validated before any network activity.
    ///
    /// # Errors
    ///
    /// Returns [`OnboardbaseError::InvalidConfig`] for an ill-formed
    /// configuration, or a transport error if the HTTP client cannot be
    /// built.
    pub fn with_config(config: ClientConfig) -> OnboardbaseResult<Self> {
        config.validate()?;

        let http = Client::builder()
            .timeout(config.timeout)
            .use_rustls_tls()
            .min_tls_version(reqwest::tls::Version::TLS_1_2)
            // One connection per request; idle connections are never reused.
            .pool_max_idle_per_host(0)
            // Redirects are not followed: a 3xx status is classified as
            // success below, matching the service's historical contract.
            .redirect(redirect::Policy::none())
            .build()
            .map_err(OnboardbaseError::Transport)?;

        Ok(Self { config, http })
    }

    /// The configured base URL, as an owned copy.
    #[must_use]
    pub fn base_url(&self) -> Url {
        self.config.base_url.clone()
    }

    /// Fetch a single named secret within the requested scope.
    ///
    /// # Errors
    ///
    /// Returns [`OnboardbaseError::NotFound`] when the name is absent from
    /// the decrypted scope or its value is empty, plus any transport, decode
    /// or decrypt failure from the shared pipeline.
    #[instrument(
        skip(self, request),
        fields(project = %request.project, environment = %request.environment)
    )]
    pub async fn get_secret(&self, request: SecretRequest) -> OnboardbaseResult<SecretResponse> {
        if request.name.is_empty() {
            return Err(OnboardbaseError::invalid_config(
                "secret name must not be empty",
            ));
        }

        let (envelope, _body) = self.fetch_envelope(&request.query_params()).await?;
        let secrets = self.decrypt_payload(&envelope.data)?;

        match secrets.get(&request.name) {
            Some(value) if !value.is_empty() => Ok(SecretResponse {
                name: request.name,
                value: value.clone(),
            }),
            _ => Err(OnboardbaseError::NotFound {
                name: request.name,
                project: request.project,
                environment: request.environment,
            }),
        }
    }

    /// Fetch every secret within the requested scope.
    ///
    /// An empty scope is a valid result: the mapping is simply empty. The
    /// raw response body is returned alongside for callers needing
    /// provenance.
    ///
    /// # Errors
    ///
    /// Returns any transport, decode or decrypt failure from the shared
    /// pipeline.
    #[instrument(
        skip(self, request),
        fields(project = %request.project, environment = %request.environment)
    )]
    pub async fn get_secrets(&self, request: SecretsRequest) -> OnboardbaseResult<SecretsResponse> {
        let (envelope, body) = self.fetch_envelope(&request.query_params()).await?;
        let secrets = self.decrypt_payload(&envelope.data)?;
        Ok(SecretsResponse { secrets, body })
    }

    /// Credential liveness probe.
    ///
    /// Fetches the team membership list and discards the body; no error
    /// means the credentials were accepted.
    ///
    /// # Errors
    ///
    /// Returns the normalized transport or API error for a rejected probe.
    #[instrument(skip(self))]
    pub async fn authenticate(&self) -> OnboardbaseResult<()> {
        self.perform_request("/team/members", Method::GET, &[], &[], None)
            .await?;
        debug!("credentials accepted");
        Ok(())
    }

    async fn fetch_envelope(
        &self,
        params: &[(&str, String)],
    ) -> OnboardbaseResult<(SecretsEnvelope, Vec<u8>)> {
        let response = self
            .perform_request("/secrets", Method::GET, &[], params, None)
            .await?;

        let envelope: SecretsEnvelope = serde_json::from_slice(&response.body).map_err(|e| {
            OnboardbaseError::decode(
                "unable to unmarshal secret payload",
                &String::from_utf8_lossy(&response.body),
                e,
            )
        })?;

        debug!(
            status = response.status.as_u16(),
            service_status = %envelope.status,
            service_message = %envelope.message,
            project = %envelope.data.project.title,
            environment = %envelope.data.environment.title,
            team = %envelope.data.team.title,
            envelopes = envelope.data.secrets.len(),
            "fetched secret envelopes"
        );

        Ok((envelope, response.body))
    }

    /// Decrypt every envelope in the payload into a fresh mapping.
    ///
    /// One undecryptable envelope fails the whole batch, for both the single
    /// and the bulk fetch path; partial mappings are never returned.
    fn decrypt_payload(&self, data: &SecretsPayload) -> OnboardbaseResult<SecretsMap> {
        let passphrase = self.config.passcode.expose_secret();
        let mut secrets = SecretsMap::with_capacity(data.secrets.len());

        for envelope in &data.secrets {
            let plaintext = crypto::decrypt(envelope, passphrase)
                .map_err(|e| OnboardbaseError::decrypt_failed(envelope, e))?;
            let record: RawSecret = serde_json::from_str(&plaintext).map_err(|e| {
                OnboardbaseError::decode("unable to unmarshal secret payload", &plaintext, e)
            })?;
            secrets.insert(record.key, record.value);
        }

        Ok(secrets)
    }

    /// Execute one authenticated HTTP call.
    ///
    /// Defaults (`accept`, `content-type` for POST, `user-agent`, `api_key`)
    /// are set first; caller-supplied headers land afterwards so they can
    /// override any non-identity default. Query parameters are appended
    /// URL-encoded.
    pub(crate) async fn perform_request(
        &self,
        path: &str,
        method: Method,
        extra_headers: &[(&str, &str)],
        params: &[(&str, String)],
        body: Option<Vec<u8>>,
    ) -> OnboardbaseResult<ApiResponse> {
        let url_str = format!(
            "{}/{}",
            self.config.base_url.as_str().trim_end_matches('/'),
            path.trim_start_matches('/')
        );
        let mut url =
            Url::parse(&url_str).map_err(|e| OnboardbaseError::malformed_url(&url_str, e))?;

        if !params.is_empty() {
            let mut pairs = url.query_pairs_mut();
            for (key, value) in params {
                pairs.append_pair(key, value);
            }
        }

        let mut request = self
            .http
            .request(method.clone(), url)
            .header(header::ACCEPT, "application/json");
        if method == Method::POST {
            request = request.header(header::CONTENT_TYPE, "application/json");
        }
        request = request
            .header(header::USER_AGENT, &self.config.user_agent)
            .header("api_key", self.config.api_key.expose_secret());
        for (name, value) in extra_headers {
            request = request.header(*name, *value);
        }
        if let Some(bytes) = body {
            request = request.body(bytes);
        }

        let response = request.send().await.map_err(OnboardbaseError::Transport)?;

        let status = response.status();
        let content_type = response
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_owned);
        let body = response
            .bytes()
            .await
            .map_err(|e| OnboardbaseError::Io {
                status: status.as_u16(),
                source: e,
            })?
            .to_vec();

        // Success covers [200, 399]: redirects are never followed, and a 3xx
        // still counts as success per the service's historical contract.
        if (200..=399).contains(&status.as_u16()) {
            return Ok(ApiResponse { status, body });
        }

        if content_type
            .as_deref()
            .is_some_and(|ct| ct.starts_with("application/json"))
        {
            let text = String::from_utf8_lossy(&body);
            let parsed: ApiErrorBody = serde_json::from_slice(&body).map_err(|e| {
                OnboardbaseError::decode("unable to unmarshal error JSON payload", &text, e)
            })?;
            debug!(
                status = status.as_u16(),
                success = parsed.success,
                "request rejected by API"
            );
            return Err(OnboardbaseError::ApiRejected {
                status: status.as_u16(),
                message: parsed.messages.join("\n"),
            });
        }

        // Non-JSON rejection bodies are summarized, never echoed.
        Err(OnboardbaseError::ApiRejected {
            status: status.as_u16(),
            message: format!("{} status code; {} bytes", status.as_u16(), body.len()),
        })
    }
}

#[async_trait]
impl SecretsProvider for OnboardbaseClient {
    type Error = OnboardbaseError;

    fn capabilities(&self) -> Capabilities {
        Capabilities::ReadOnly
    }

    async fn get_secret(&self, request: SecretRequest) -> OnboardbaseResult<SecretResponse> {
        Self::get_secret(self, request).await
    }

    async fn get_secrets(&self, request: SecretsRequest) -> OnboardbaseResult<SecretsResponse> {
        Self::get_secrets(self, request).await
    }

    async fn authenticate(&self) -> OnboardbaseResult<()> {
        Self::authenticate(self).await
    }
}
