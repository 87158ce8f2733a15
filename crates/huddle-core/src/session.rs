//! Session phase state machine.
//!
//! # State Machine
//!
//! ```text
//! ┌──────┐ begin_connect ┌────────────┐ connected ┌───────────┐
//! │ Idle │──────────────>│ Connecting │──────────>│ Connected │<──┐
//! └──────┘               └────────────┘           └───────────┘   │
//!    ^                         │                    │      ^      │
//!    │ reset                   │ disconnect         │      │      │ reconnected
//!    │                         ↓                    │      │      │
//! ┌──────────────┐  disconnect (from any phase)     │  ┌──────────────┐
//! │ Disconnected │<─────────────────────────────────┘  │ Reconnecting │
//! └──────────────┘                                     └──────────────┘
//! ```
//!
//! Entering `Disconnected` always means full teardown; the owner resets to
//! `Idle` once tiles and toggles are cleared.

use crate::error::PhaseError;

/// Lifecycle phase of the (single) session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SessionPhase {
    /// No session and none requested.
    #[default]
    Idle,
    /// Join in progress (credential lookup or session open).
    Connecting,
    /// Session open.
    Connected,
    /// Session open, signaling being resumed by the SDK.
    Reconnecting,
    /// Session ended; teardown pending.
    Disconnected,
}

impl SessionPhase {
    /// Connecting, connected, or reconnecting.
    pub fn is_active(self) -> bool {
        matches!(self, Self::Connecting | Self::Connected | Self::Reconnecting)
    }

    /// An open session exists.
    pub fn has_session(self) -> bool {
        matches!(self, Self::Connected | Self::Reconnecting)
    }

    /// Start a join attempt.
    ///
    /// Allowed from `Connecting` as well: a second request supersedes the
    /// pending one. Joining while a session is open replaces it, so
    /// `Connected` and `Reconnecting` are accepted too.
    pub fn begin_connect(&mut self) {
        *self = Self::Connecting;
    }

    /// The session opened.
    pub fn connected(&mut self) -> Result<(), PhaseError> {
        self.transition(Self::Connecting, Self::Connected, "connected")
    }

    /// The SDK started resuming signaling.
    pub fn reconnecting(&mut self) -> Result<(), PhaseError> {
        self.transition(Self::Connected, Self::Reconnecting, "reconnecting")
    }

    /// The SDK resumed signaling.
    pub fn reconnected(&mut self) -> Result<(), PhaseError> {
        self.transition(Self::Reconnecting, Self::Connected, "reconnected")
    }

    /// The session ended. Valid from every phase.
    pub fn disconnect(&mut self) {
        *self = Self::Disconnected;
    }

    /// Teardown finished.
    pub fn reset(&mut self) -> Result<(), PhaseError> {
        match self {
            Self::Idle | Self::Disconnected => {
                *self = Self::Idle;
                Ok(())
            },
            Self::Connecting | Self::Connected | Self::Reconnecting => {
                Err(PhaseError::InvalidTransition { phase: *self, operation: "reset" })
            },
        }
    }

    fn transition(
        &mut self,
        from: Self,
        to: Self,
        operation: &'static str,
    ) -> Result<(), PhaseError> {
        if *self != from {
            return Err(PhaseError::InvalidTransition { phase: *self, operation });
        }
        *self = to;
        Ok(())
    }
}
