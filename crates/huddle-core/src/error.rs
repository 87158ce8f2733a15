//! Error kinds for session and media operations.
//!
//! Only [`ConnectError`] is fatal to a join attempt. Media operation and
//! device errors are surfaced to the user while the session stays up.

use std::time::Duration;

use thiserror::Error;

use crate::session::SessionPhase;

/// Opening a session failed.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConnectError {
    /// Peer connection did not come up in time.
    #[error("connection timed out after {elapsed:?}")]
    Timeout {
        /// How long we waited.
        elapsed: Duration,
    },

    /// The server refused the join (bad token, room full, ...).
    #[error("server rejected join ({code}): {message}")]
    Rejected {
        /// Server-provided status code.
        code: u16,
        /// Server-provided reason.
        message: String,
    },

    /// Signaling failed before the session was established.
    #[error("signaling failed: {0}")]
    Signal(String),

    /// The server URL could not be used.
    #[error("invalid server url: {0}")]
    InvalidUrl(String),
}

impl ConnectError {
    /// Short stable code shown next to the message.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Timeout { .. } => "timeout",
            Self::Rejected { .. } => "rejected",
            Self::Signal(_) => "signal",
            Self::InvalidUrl(_) => "invalid-url",
        }
    }
}

/// Enabling or disabling a local camera, microphone, or screen share failed.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MediaOperationError {
    /// The user or platform denied capture permission.
    #[error("permission denied")]
    PermissionDenied,

    /// No capture device available for the requested source.
    #[error("no device found")]
    DeviceNotFound,

    /// There is no open session to publish on.
    #[error("not connected")]
    NotConnected,

    /// Any other failure reported by the SDK.
    #[error("{0}")]
    Failed(String),
}

/// A capture device failed while the session was running.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{kind}: {message}")]
pub struct MediaDeviceError {
    /// Device class (`"camera"`, `"microphone"`, ...).
    pub kind: String,
    /// Platform-provided description.
    pub message: String,
}

/// Audio playback was blocked by the platform's autoplay policy.
///
/// Resolved by an explicit user gesture; never treated as a failure.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("audio playback blocked until user interaction")]
pub struct PlaybackBlocked;

/// Illegal [`SessionPhase`] transition.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PhaseError {
    /// The operation is not valid from the current phase.
    #[error("invalid phase transition: cannot {operation} from {phase:?}")]
    InvalidTransition {
        /// Phase when the transition was attempted.
        phase: SessionPhase,
        /// Attempted operation.
        operation: &'static str,
    },
}
