//! Driver trait for abstracting I/O operations.
//!
//! The [`Driver`] trait decouples the application runtime from specific
//! frontends. Each frontend implements the trait to provide input and
//! rendering, while the generic [`crate::Runtime`] handles all orchestration.
//! Media never flows through the driver: sessions are opened by the
//! [`crate::RoomSessionController`].

use std::future::Future;

use crate::{App, AppEvent};

/// Abstracts frontend I/O for the application runtime.
///
/// Implementations provide platform-specific input and output while the
/// generic [`Runtime`](crate::Runtime) handles orchestration logic. This
/// ensures the same orchestration code runs in the TUI and in simulation.
///
/// # Implementations
///
/// - **TUI**: Uses crossterm for terminal events and ratatui for drawing
/// - **Simulation**: Queued events with invariant checks on every render
pub trait Driver: Send {
    /// Platform-specific error type.
    type Error: std::error::Error + Send + 'static;

    /// Wait for the next input event.
    ///
    /// Returns `None` if the frontend produced nothing worth handling this
    /// time. Must be cancel-safe: the runtime races it against session
    /// events and pending joins.
    fn poll_event(&mut self) -> impl Future<Output = Result<Option<AppEvent>, Self::Error>> + Send;

    /// Render the application state.
    ///
    /// # Errors
    ///
    /// Returns an error if rendering fails.
    fn render(&mut self, app: &App) -> Result<(), Self::Error>;

    /// Release frontend resources.
    fn stop(&mut self);
}
