//! Terminal UI for Huddle
//!
//! A thin shell over [`huddle_app::Driver`] that provides terminal-specific
//! I/O. All orchestration logic lives in the generic [`huddle_app::Runtime`].
//!
//! This crate only handles terminal input and rendering, plus the demo room
//! used when no credential endpoint is configured.

#![forbid(unsafe_code)]
#![deny(missing_docs)]

pub mod demo;
pub mod input;
pub mod terminal;
pub mod ui;

pub use huddle_app::{App, AppAction, AppEvent, Driver, Runtime};
pub use input::{FormField, InputState, KeyInput};
pub use terminal::{TerminalDriver, TerminalError};
