//! Simulation harness for Huddle room client testing.
//!
//! In-process implementations of the media SDK and frontend traits so the
//! production [`huddle_app::Runtime`] can be driven end to end without a
//! media server or a terminal.
//!
//! # Components
//!
//! - [`SimMediaServer`]: scripted media server implementing
//!   [`huddle_core::MediaConnector`]
//! - [`SimDriver`]: queued input and snapshot capture implementing
//!   [`huddle_app::Driver`]
//!
//! # Invariant Testing
//!
//! The `invariants` module provides behavioral testing through invariant
//! checks. Invariants verify WHAT must be true across all execution paths, not
//! specific scenarios. Use [`InvariantRegistry::standard()`] for the full set.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod invariants;
pub mod sim_driver;
pub mod sim_media;

pub use invariants::{
    IdleMeansClean, Invariant, InvariantKind, InvariantRegistry, InvariantResult,
    ParticipantSnapshot, RoomSnapshot, SingleSessionOwnership, SystemSnapshot,
    TileModeMatchesSubscriptions, TileSnapshot, TilesMatchRecords, Violation,
};
pub use sim_driver::{MAX_CYCLES, SimDriver, SimDriverError, run_until_quiet};
pub use sim_media::{ConnectRecord, SimLocalMedia, SimMediaServer, SimSession};
