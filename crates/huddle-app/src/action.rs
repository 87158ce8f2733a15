//! Application side-effects and intents.
//!
//! This module defines the [`AppAction`] enum, which represents instructions
//! produced by the [`crate::App`] state machine for the runtime to execute.

use huddle_client::MediaControl;

use crate::JoinRequest;

/// Actions produced by the App state machine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppAction {
    /// Render the UI.
    Render,

    /// Quit the application.
    Quit,

    /// Fetch connection details from the credential endpoint.
    ///
    /// Supersedes any join already in flight.
    FetchDetails,

    /// Open a session.
    ///
    /// Supersedes any join already in flight.
    Connect(JoinRequest),

    /// Enable the microphone right after joining.
    EnableMicrophone,

    /// Enable or disable a local source.
    SetSourceEnabled {
        /// Control being toggled.
        control: MediaControl,
        /// Requested state.
        enabled: bool,
    },

    /// Resume audio playback.
    StartAudio,

    /// Cancel any join in flight and disconnect the open session.
    Disconnect,
}
