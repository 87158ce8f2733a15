//! Outputs of event dispatch that the application layer must act on.

use huddle_core::DisconnectReason;

/// Connection status shown in the room header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StatusIndicator {
    /// Session open.
    #[default]
    Connected,
    /// SDK resuming signaling.
    Reconnecting,
}

/// The "enable audio" prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AudioPrompt {
    /// Not shown.
    #[default]
    Hidden,
    /// Waiting for a user gesture.
    Shown,
}

/// Side effects of dispatching one session event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViewEffect {
    /// Show a non-fatal error banner.
    ShowError(String),
    /// The session ended: tear everything down.
    Teardown(DisconnectReason),
    /// The SDK started resuming signaling.
    Reconnecting,
    /// The SDK resumed signaling.
    Reconnected,
}
