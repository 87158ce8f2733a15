//! Session ownership.
//!
//! [`RoomSessionController`] owns at most one open [`MediaSession`]. Connect
//! attempts run detached from the controller (see
//! [`RoomSessionController::connect_future`]) so the runtime can keep
//! serving input and drop a superseded attempt. The attempt that completes
//! last is installed and replaces whatever session was open before. Local
//! media operations are detached the same way, through the session's
//! [`LocalMedia`] handle.

use std::{fmt, time::Duration};

use futures::{FutureExt, future::BoxFuture};
use huddle_client::MediaControl;
use huddle_core::{
    ConnectError, ConnectOptions, DisconnectReason, IceServer, LocalMedia, MediaConnector,
    MediaElement, MediaOperationError, MediaSession, RoomOptions, SessionEvent, SessionInfo, redact_token,
};
use url::Url;

const SIGNAL_SCHEMES: [&str; 4] = ["ws", "wss", "http", "https"];

/// Parameters for one connect attempt.
#[derive(Clone, PartialEq, Eq)]
pub struct JoinRequest {
    /// Media server URL.
    pub server_url: String,
    /// Participant access token.
    pub token: String,
    /// Room the user asked for.
    pub room_name: String,
    /// Display name the user asked for.
    pub participant_name: String,
    /// ICE servers. `None` or empty uses the public STUN list.
    pub ice_servers: Option<Vec<IceServer>>,
}

impl fmt::Debug for JoinRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JoinRequest")
            .field("server_url", &self.server_url)
            .field("token", &redact_token(&self.token))
            .field("room_name", &self.room_name)
            .field("participant_name", &self.participant_name)
            .field("ice_servers", &self.ice_servers.as_ref().map(Vec::len))
            .finish()
    }
}

/// Owns the single active session.
pub struct RoomSessionController<C: MediaConnector> {
    connector: C,
    session: Option<C::Session>,
    generation: u64,
    connect_timeout: Duration,
}

impl<C: MediaConnector> RoomSessionController<C> {
    /// Controller with no open session.
    pub fn new(connector: C, connect_timeout: Duration) -> Self {
        Self { connector, session: None, generation: 0, connect_timeout }
    }

    /// Build a connect attempt for `request`.
    ///
    /// The returned future owns a clone of the connector and does not borrow
    /// the controller. Dropping it abandons the attempt. The session it
    /// yields must be handed to [`install`](Self::install).
    pub fn connect_future(
        &self,
        request: &JoinRequest,
    ) -> BoxFuture<'static, Result<C::Session, ConnectError>> {
        let connector = self.connector.clone();
        let options = RoomOptions::with_ice_servers(request.ice_servers.clone());
        let connect =
            ConnectOptions { peer_connection_timeout: self.connect_timeout, ..ConnectOptions::default() };
        let url = request.server_url.clone();
        let token = request.token.clone();

        tracing::info!(
            server_url = %url,
            room = %request.room_name,
            token = %redact_token(&token),
            ice_servers = options.rtc_config.ice_servers.len(),
            "connecting"
        );

        async move {
            validate_server_url(&url)?;
            let timeout = connect.peer_connection_timeout;
            match tokio::time::timeout(timeout, connector.connect(&url, &token, options, connect))
                .await
            {
                Ok(result) => result,
                Err(_) => Err(ConnectError::Timeout { elapsed: timeout }),
            }
        }
        .boxed()
    }

    /// Take ownership of a freshly opened session.
    ///
    /// An existing session is disconnected first, so at most one is ever
    /// open.
    pub async fn install(&mut self, session: C::Session) -> SessionInfo {
        if let Some(mut previous) = self.session.take() {
            tracing::info!(room = %previous.info().room_name, "replacing open session");
            previous.disconnect().await;
        }

        self.generation += 1;
        let info = session.info().clone();
        tracing::info!(
            generation = self.generation,
            room = %info.room_name,
            room_sid = %info.room_sid,
            local = %info.local.identity,
            "session installed"
        );
        self.session = Some(session);
        info
    }

    /// Disconnect the open session, if any.
    ///
    /// Returns `true` if a session was torn down. Safe to call repeatedly.
    pub async fn leave(&mut self) -> bool {
        match self.session.take() {
            Some(mut session) => {
                tracing::info!(room = %session.info().room_name, "leaving room");
                session.disconnect().await;
                true
            },
            None => false,
        }
    }

    /// Build an operation enabling or disabling a local source.
    ///
    /// Like [`connect_future`](Self::connect_future) the returned future does
    /// not borrow the controller. It resolves to
    /// [`MediaOperationError::NotConnected`] if no session is open now or the
    /// session closes before the operation runs.
    pub fn set_enabled_future(
        &self,
        control: MediaControl,
        enabled: bool,
    ) -> BoxFuture<'static, Result<Option<MediaElement>, MediaOperationError>> {
        let local = self.local_media();
        async move {
            let local = local.ok_or(MediaOperationError::NotConnected)?;
            local.set_source_enabled(control.source(), enabled).await
        }
        .boxed()
    }

    /// Build an operation resuming audio playback after a user gesture.
    ///
    /// Resolves to whether playback is permitted once the resume returns.
    pub fn start_audio_future(&self) -> BoxFuture<'static, Result<bool, MediaOperationError>> {
        let local = self.local_media();
        async move {
            let local = local.ok_or(MediaOperationError::NotConnected)?;
            local.clone().start_audio().await?;
            Ok(local.can_playback_audio())
        }
        .boxed()
    }

    fn local_media(&self) -> Option<<C::Session as MediaSession>::Local> {
        self.session.as_ref().map(MediaSession::local_media)
    }

    /// Next event from the open session.
    ///
    /// Pending forever while no session is open. A session whose event
    /// stream ends is dropped and reported as disconnected.
    pub async fn next_event(&mut self) -> SessionEvent {
        let Some(session) = self.session.as_mut() else {
            return std::future::pending().await;
        };

        let next = session.next_event().await;
        match next {
            Some(event) => event,
            None => {
                tracing::warn!("session event stream closed");
                if let Some(mut session) = self.session.take() {
                    session.disconnect().await;
                }
                SessionEvent::Disconnected(DisconnectReason::SignalClosed)
            },
        }
    }

    /// Whether a session is open.
    pub fn is_active(&self) -> bool {
        self.session.is_some()
    }

    /// Info for the open session.
    pub fn session_info(&self) -> Option<&SessionInfo> {
        self.session.as_ref().map(MediaSession::info)
    }

    /// Number of sessions installed so far.
    pub fn generation(&self) -> u64 {
        self.generation
    }
}

fn validate_server_url(url: &str) -> Result<(), ConnectError> {
    let parsed = Url::parse(url).map_err(|e| ConnectError::InvalidUrl(format!("{url}: {e}")))?;
    if SIGNAL_SCHEMES.contains(&parsed.scheme()) {
        Ok(())
    } else {
        Err(ConnectError::InvalidUrl(format!("{url}: unsupported scheme {}", parsed.scheme())))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn server_url_validation() {
        assert!(validate_server_url("wss://media.example.com").is_ok());
        assert!(validate_server_url("ws://localhost:7880").is_ok());
        assert!(matches!(validate_server_url("ftp://example.com"), Err(ConnectError::InvalidUrl(_))));
        assert!(matches!(validate_server_url("not a url"), Err(ConnectError::InvalidUrl(_))));
    }

    #[test]
    fn join_request_debug_redacts_token() {
        let request = JoinRequest {
            server_url: "wss://media.example.com".into(),
            token: "abcdefghijklmnop".into(),
            room_name: "standup".into(),
            participant_name: "Jane".into(),
            ice_servers: None,
        };
        let debug = format!("{request:?}");
        assert!(debug.contains("abcdefgh..."));
        assert!(!debug.contains("ijklmnop"));
    }
}
