//! Application input events.
//!
//! This module defines [`AppEvent`], the set of inputs that drive the
//! [`crate::App`] state machine.
//!
//! Events originate from three sources:
//! - User intents from the frontend (join, toggles, leave) and system ticks.
//! - Completions of operations the runtime executed on the App's behalf.
//! - Session events forwarded from the open media session.

use huddle_client::MediaControl;
use huddle_core::{ConnectError, MediaElement, MediaOperationError, SessionEvent, SessionInfo};

use crate::{ConnectionDetails, FetchError};

/// Events processed by the App state machine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppEvent {
    /// Periodic tick.
    Tick,

    /// Terminal resize (columns, rows).
    Resize(u16, u16),

    /// Frontend-local state changed (form text, focus).
    Redraw,

    /// Join using details from the credential endpoint.
    AutoConnect,

    /// Manual-join form submitted.
    JoinSubmitted {
        /// Room name field.
        room_name: String,
        /// Participant name field.
        participant_name: String,
        /// Pre-issued token field.
        token: String,
    },

    /// A media control was pressed.
    Toggle(MediaControl),

    /// Leave the room.
    Leave,

    /// User gesture to resume blocked audio.
    StartAudio,

    /// Quit the application.
    Quit,

    /// Connection details arrived.
    DetailsFetched(ConnectionDetails),

    /// Connection details lookup failed.
    FetchFailed(FetchError),

    /// A session was opened and installed.
    Connected(SessionInfo),

    /// Opening the session failed.
    ConnectFailed(ConnectError),

    /// A toggle operation finished.
    MediaToggled {
        /// Control that was toggled.
        control: MediaControl,
        /// Element to attach locally, or the failure.
        result: Result<Option<MediaElement>, MediaOperationError>,
    },

    /// The post-join microphone enable finished.
    MicrophoneAutoEnabled(Result<Option<MediaElement>, MediaOperationError>),

    /// Audio playback resume finished.
    ///
    /// Carries whether playback is permitted afterwards.
    AudioStarted(Result<bool, MediaOperationError>),

    /// Event from the open session.
    Session(SessionEvent),
}
