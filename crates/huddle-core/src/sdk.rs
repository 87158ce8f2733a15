//! Media SDK seam.
//!
//! [`MediaConnector`], [`MediaSession`] and [`LocalMedia`] abstract the
//! external client SDK that speaks to the media server. Signaling, ICE, track routing, and
//! reconnection all happen behind these traits; Huddle only issues
//! operations and consumes [`SessionEvent`]s.
//!
//! # Implementations
//!
//! - **Simulation**: `huddle-harness` provides a scripted in-process server
//! - **Production**: a binding to the media server's client SDK

use std::future::Future;

use crate::{
    error::{ConnectError, MediaOperationError},
    event::SessionEvent,
    media::MediaElement,
    options::{ConnectOptions, RoomOptions},
    participant::{ParticipantInfo, TrackSource},
};

/// What the server told us when the session opened.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionInfo {
    /// Server-assigned room id.
    pub room_sid: String,
    /// Room name as known to the server.
    pub room_name: String,
    /// The local participant.
    pub local: ParticipantInfo,
    /// Remote participants already in the room.
    pub remote: Vec<ParticipantInfo>,
}

/// Opens sessions against a media server.
///
/// Cloned per connect attempt so a pending connect does not borrow the
/// session owner.
pub trait MediaConnector: Clone + Send + Sync + 'static {
    /// Session type produced by this connector.
    type Session: MediaSession;

    /// Open a session.
    ///
    /// # Errors
    ///
    /// Returns [`ConnectError`] if the server rejects the token, signaling
    /// fails, or the peer connection does not come up within
    /// `connect.peer_connection_timeout`.
    fn connect(
        &self,
        url: &str,
        token: &str,
        options: RoomOptions,
        connect: ConnectOptions,
    ) -> impl Future<Output = Result<Self::Session, ConnectError>> + Send;
}

/// Local media operations on an open session.
///
/// A cheap owned handle so operations can run while the session owner keeps
/// reading events. Every call consumes a clone; once the session is closed
/// the operations fail with [`MediaOperationError::NotConnected`].
pub trait LocalMedia: Clone + Send + Sync + 'static {
    /// Enable or disable a local source.
    ///
    /// Enabling a video source returns the element rendering the local
    /// preview. Audio sources and disabling return `None`.
    fn set_source_enabled(
        self,
        source: TrackSource,
        enabled: bool,
    ) -> impl Future<Output = Result<Option<MediaElement>, MediaOperationError>> + Send;

    /// Resume audio playback after the platform blocked autoplay.
    ///
    /// Must be called from a user gesture.
    fn start_audio(self) -> impl Future<Output = Result<(), MediaOperationError>> + Send;

    /// Whether audio playback is currently permitted.
    fn can_playback_audio(&self) -> bool;
}

/// An open session with the media server.
pub trait MediaSession: Send + 'static {
    /// Handle for local media operations.
    type Local: LocalMedia;

    /// Room and participant details captured at join.
    fn info(&self) -> &SessionInfo;

    /// Handle for local media operations on this session.
    fn local_media(&self) -> Self::Local;

    /// Next event from the server.
    ///
    /// Cancel-safe. Returns `None` once the event stream is closed.
    fn next_event(&mut self) -> impl Future<Output = Option<SessionEvent>> + Send;

    /// Close the session. Calling it more than once is a no-op.
    fn disconnect(&mut self) -> impl Future<Output = ()> + Send;
}
