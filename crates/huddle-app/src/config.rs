//! Application configuration.

use std::time::Duration;

use huddle_core::DEFAULT_PEER_CONNECTION_TIMEOUT;

/// Media server used by the manual-join form when none is configured.
pub const DEFAULT_SERVER_URL: &str = "ws://localhost:7880";

/// Runtime configuration for the room client.
///
/// Where connection details come from is not configured here; the runtime
/// is handed a [`DetailsSource`](crate::DetailsSource).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    /// Server URL for the manual-join form.
    pub default_server_url: String,
    /// Upper bound on a single connect attempt.
    pub connect_timeout: Duration,
    /// Join from the credential endpoint on startup.
    pub auto_connect: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            default_server_url: DEFAULT_SERVER_URL.to_owned(),
            connect_timeout: DEFAULT_PEER_CONNECTION_TIMEOUT,
            auto_connect: true,
        }
    }
}

impl AppConfig {
    /// Override the manual-join server URL.
    #[must_use]
    pub fn with_server_url(mut self, url: impl Into<String>) -> Self {
        self.default_server_url = url.into();
        self
    }

    /// Enable or disable the startup join.
    #[must_use]
    pub fn with_auto_connect(mut self, auto_connect: bool) -> Self {
        self.auto_connect = auto_connect;
        self
    }
}
