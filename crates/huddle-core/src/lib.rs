//! Core domain model for Huddle.
//!
//! Huddle joins a real-time audio/video room hosted by an external media
//! routing service. Everything that talks to the media server (signaling,
//! ICE, track routing, reconnection) lives behind the [`MediaConnector`] and
//! [`MediaSession`] traits. This crate only holds what the client reasons
//! about: participants and their publications, the session phase, the room
//! configuration handed to the SDK, and the typed errors.
//!
//! # Components
//!
//! - [`SessionPhase`]: Session-level state machine
//! - [`RoomOptions`]: Configuration applied when opening a session
//! - [`SessionEvent`]: Events emitted by an open session
//! - [`ParticipantRecord`]: A participant and its track publications

#![forbid(unsafe_code)]
#![deny(missing_docs)]

pub mod error;
pub mod event;
pub mod media;
pub mod options;
pub mod participant;
pub mod sdk;
pub mod session;

pub use error::{ConnectError, MediaDeviceError, MediaOperationError, PhaseError, PlaybackBlocked};
pub use event::{ConnectionQuality, DisconnectReason, EventKind, SessionEvent};
pub use media::{ElementId, MediaElement, StreamId};
pub use options::{
    BundlePolicy, ConnectOptions, DEFAULT_PEER_CONNECTION_TIMEOUT, FALLBACK_STUN_URLS, IceServer,
    IceTransportPolicy, Resolution, RoomOptions, RtcConfig, RtcpMuxPolicy,
};
pub use participant::{
    ParticipantId, ParticipantInfo, ParticipantRecord, TrackKind, TrackPublication, TrackSid,
    TrackSource,
};
pub use sdk::{LocalMedia, MediaConnector, MediaSession, SessionInfo};
pub use session::SessionPhase;

/// Shorten a credential for logging: first 8 characters followed by `...`.
pub fn redact_token(token: &str) -> String {
    const VISIBLE: usize = 8;
    let visible: String = token.chars().take(VISIBLE).collect();
    format!("{visible}...")
}
