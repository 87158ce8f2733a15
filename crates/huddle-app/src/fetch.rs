//! Connection details lookup.
//!
//! A join starts by asking a credential endpoint for the media server URL,
//! a short-lived participant token, and the room to enter. A second request
//! asks the media server for ICE configuration. That lookup is best-effort:
//! any failure leaves `ice_servers` empty and the room falls back to public
//! STUN. Both requests are bounded so a hung server cannot stall a join.

use std::{fmt, future::Future, time::Duration};

use huddle_core::{IceServer, redact_token};
use serde::Deserialize;
use thiserror::Error;
use url::Url;

/// Upper bound on a credential request, body included.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Upper bound on the ICE config lookup.
pub const DEFAULT_ICE_TIMEOUT: Duration = Duration::from_secs(5);

/// Credential lookup failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    /// Endpoint answered with a non-2xx status.
    #[error("HTTP {0}")]
    Status(u16),

    /// Request never produced a response.
    #[error("request failed: {0}")]
    Request(String),

    /// Response body was not the expected JSON.
    #[error("invalid response: {0}")]
    Decode(String),
}

/// Everything needed to open a session.
#[derive(Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectionDetails {
    /// Media server URL (`wss://...`).
    pub server_url: String,
    /// Room to join.
    pub room_name: String,
    /// Access token for the participant.
    pub participant_token: String,
    /// Display name assigned by the endpoint.
    pub participant_name: String,
    /// ICE servers from the media server. `None` uses the public STUN list.
    #[serde(skip)]
    pub ice_servers: Option<Vec<IceServer>>,
}

impl fmt::Debug for ConnectionDetails {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectionDetails")
            .field("server_url", &self.server_url)
            .field("room_name", &self.room_name)
            .field("participant_token", &redact_token(&self.participant_token))
            .field("participant_name", &self.participant_name)
            .field("ice_servers", &self.ice_servers.as_ref().map(Vec::len))
            .finish()
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct IceConfigResponse {
    #[serde(default)]
    ice_servers: Vec<IceServer>,
}

/// Source of connection details for the auto-connect flow.
pub trait DetailsSource: Send + Sync + 'static {
    /// Fetch fresh details.
    fn fetch(&self) -> impl Future<Output = Result<ConnectionDetails, FetchError>> + Send;
}

/// ICE configuration URL for a media server URL.
///
/// The signaling scheme becomes the matching HTTP scheme and the `/rtc`
/// path is replaced by `/rtc/validate`.
pub fn ice_config_url(server_url: &str) -> String {
    let base = if let Some(rest) = server_url.strip_prefix("wss://") {
        format!("https://{rest}")
    } else if let Some(rest) = server_url.strip_prefix("ws://") {
        format!("http://{rest}")
    } else {
        server_url.to_owned()
    };
    let base = base.replacen("/rtc", "", 1);
    format!("{}/rtc/validate", base.trim_end_matches('/'))
}

/// Fetches details from an HTTP credential endpoint.
#[derive(Debug, Clone)]
pub struct HttpDetailsSource {
    client: reqwest::Client,
    endpoint: Url,
    ice_timeout: Duration,
}

impl HttpDetailsSource {
    /// Source for `endpoint` with [`DEFAULT_REQUEST_TIMEOUT`].
    ///
    /// # Errors
    ///
    /// Returns [`FetchError::Request`] if the HTTP client cannot be built.
    pub fn new(endpoint: Url) -> Result<Self, FetchError> {
        Self::with_timeout(endpoint, DEFAULT_REQUEST_TIMEOUT)
    }

    /// Source for `endpoint` whose requests give up after `timeout`.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError::Request`] if the HTTP client cannot be built.
    pub fn with_timeout(endpoint: Url, timeout: Duration) -> Result<Self, FetchError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| FetchError::Request(format!("failed to create HTTP client: {e}")))?;
        Ok(Self::with_client(client, endpoint).with_ice_timeout(timeout.min(DEFAULT_ICE_TIMEOUT)))
    }

    /// Source sharing an existing client.
    ///
    /// The ICE lookup is still bounded by [`DEFAULT_ICE_TIMEOUT`].
    pub fn with_client(client: reqwest::Client, endpoint: Url) -> Self {
        Self { client, endpoint, ice_timeout: DEFAULT_ICE_TIMEOUT }
    }

    /// Give up on the ICE lookup after `timeout` and use public STUN.
    #[must_use]
    pub fn with_ice_timeout(mut self, timeout: Duration) -> Self {
        self.ice_timeout = timeout;
        self
    }

    /// Credential endpoint.
    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    async fn credentials(&self) -> Result<ConnectionDetails, FetchError> {
        let response = self
            .client
            .post(self.endpoint.clone())
            .json(&serde_json::json!({}))
            .send()
            .await
            .map_err(|e| FetchError::Request(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status(status.as_u16()));
        }

        response.json().await.map_err(|e| FetchError::Decode(e.to_string()))
    }

    async fn ice_config(&self, url: &str, token: &str) -> Result<IceConfigResponse, reqwest::Error> {
        self.client
            .get(url)
            .timeout(self.ice_timeout)
            .bearer_auth(token)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await
    }

    /// Best-effort ICE server lookup. Never fails the join.
    async fn ice_servers(&self, server_url: &str, token: &str) -> Option<Vec<IceServer>> {
        let url = ice_config_url(server_url);
        tracing::debug!(%url, "fetching ICE config");

        match self.ice_config(&url, token).await {
            Ok(config) if !config.ice_servers.is_empty() => {
                tracing::info!(count = config.ice_servers.len(), "using server ICE config");
                Some(config.ice_servers)
            },
            Ok(_) => {
                tracing::debug!("ICE config listed no servers");
                None
            },
            Err(e) => {
                tracing::warn!(error = %e, "could not fetch ICE config, using public STUN");
                None
            },
        }
    }
}

impl DetailsSource for HttpDetailsSource {
    async fn fetch(&self) -> Result<ConnectionDetails, FetchError> {
        tracing::info!(endpoint = %self.endpoint, "fetching connection details");
        let mut details = self.credentials().await?;
        tracing::info!(
            server_url = %details.server_url,
            room = %details.room_name,
            participant = %details.participant_name,
            token = %redact_token(&details.participant_token),
            "connection details received"
        );

        details.ice_servers =
            self.ice_servers(&details.server_url, &details.participant_token).await;
        Ok(details)
    }
}

/// Returns fixed details. Used offline and in simulation.
#[derive(Debug, Clone)]
pub struct StaticDetailsSource {
    result: Result<ConnectionDetails, FetchError>,
}

impl StaticDetailsSource {
    /// Always succeeds with `details`.
    pub fn new(details: ConnectionDetails) -> Self {
        Self { result: Ok(details) }
    }

    /// Always fails with `error`.
    pub fn failing(error: FetchError) -> Self {
        Self { result: Err(error) }
    }
}

impl DetailsSource for StaticDetailsSource {
    async fn fetch(&self) -> Result<ConnectionDetails, FetchError> {
        self.result.clone()
    }
}
