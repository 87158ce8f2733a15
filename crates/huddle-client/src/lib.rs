//! Room view state machines.
//!
//! Pure state machines that turn [`huddle_core::SessionEvent`]s into an
//! observable room view. Nothing here performs I/O or touches the SDK; the
//! application layer feeds events in and renders what comes out.
//!
//! # Components
//!
//! - [`ParticipantViewRegistry`]: One tile per participant, placeholder or
//!   media mode
//! - [`EventDispatcher`]: Fixed per-session table routing each event kind to
//!   its handler
//! - [`RoomView`]: Participant records, tiles, and indicators for one session
//! - [`UiToggleState`]: Optimistic camera/microphone/screen-share toggles

#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod dispatcher;
mod effect;
mod registry;
mod room;
mod toggle;

pub use dispatcher::EventDispatcher;
pub use effect::{AudioPrompt, StatusIndicator, ViewEffect};
pub use registry::{AttachOutcome, ParticipantViewRegistry, Tile, TileHandle, TileMode, initials};
pub use room::RoomView;
pub use toggle::{ButtonState, ControlButtons, MediaControl, ToggleMachine, ToggleState, UiToggleState};
