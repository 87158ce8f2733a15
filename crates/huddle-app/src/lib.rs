//! Application layer for Huddle
//!
//! Pure state machine and generic runtime for joining a media room, enabling
//! deterministic simulation testing with the same code that runs in
//! production.
//!
//! # Components
//!
//! - [`App`]: UI state machine (join form, room view, media toggles)
//! - [`RoomSessionController`]: Owner of the single open media session
//! - [`DetailsSource`]: Credential lookup for the auto-connect flow
//! - [`Driver`]: Trait for platform-specific I/O abstraction
//! - [`Runtime`]: Generic orchestration loop using Driver

#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod action;
mod app;
mod config;
mod controller;
mod driver;
mod event;
mod fetch;
mod runtime;

pub use action::AppAction;
pub use app::{App, DISCONNECTED_NOTICE, MISSING_FIELDS, Screen};
pub use config::{AppConfig, DEFAULT_SERVER_URL};
pub use controller::{JoinRequest, RoomSessionController};
pub use driver::Driver;
pub use event::AppEvent;
pub use fetch::{
    ConnectionDetails, DEFAULT_ICE_TIMEOUT, DEFAULT_REQUEST_TIMEOUT, DetailsSource, FetchError,
    HttpDetailsSource, StaticDetailsSource, ice_config_url,
};
pub use runtime::Runtime;
