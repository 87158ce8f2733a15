//! Observable state snapshots for invariant checking.
//!
//! Snapshots capture the observable state of the client at a point in time.
//! Invariants operate on snapshots rather than live state to ensure
//! consistent, atomic checks.

use std::collections::HashSet;

use huddle_app::{App, Screen};
use huddle_client::{RoomView, TileMode};
use huddle_core::{ParticipantId, SessionPhase};
use serde::Serialize;

/// Snapshot of the whole client.
#[derive(Debug, Clone, Default, Serialize)]
pub struct SystemSnapshot {
    /// Session phase name.
    pub phase: String,
    /// Phase is `Idle`.
    pub idle: bool,
    /// Room view is on screen.
    pub on_room_screen: bool,
    /// Loading overlay shown.
    pub loading: bool,
    /// Every toggle off and idle.
    pub toggles_clear: bool,
    /// Room state. `None` on the form.
    pub room: Option<RoomSnapshot>,
    /// Sessions the media server considers open.
    pub open_sessions: usize,
}

impl SystemSnapshot {
    /// Idle client with nothing open.
    pub fn empty() -> Self {
        Self {
            phase: format!("{:?}", SessionPhase::Idle),
            idle: true,
            toggles_clear: true,
            ..Self::default()
        }
    }

    /// Capture the App's observable state.
    pub fn from_app(app: &App) -> Self {
        Self {
            phase: format!("{:?}", app.phase()),
            idle: app.phase() == SessionPhase::Idle,
            on_room_screen: app.screen() == Screen::Room,
            loading: app.is_loading(),
            toggles_clear: app.toggles().is_clear(),
            room: app.room().map(RoomSnapshot::from_view),
            open_sessions: 0,
        }
    }

    /// Set the open-session count reported by the media server.
    #[must_use]
    pub fn with_open_sessions(mut self, open: usize) -> Self {
        self.open_sessions = open;
        self
    }
}

/// Snapshot of the room view.
#[derive(Debug, Clone, Default, Serialize)]
pub struct RoomSnapshot {
    /// Displayed room name.
    pub name: String,
    /// Local participant first, then remotes in id order.
    pub participants: Vec<ParticipantSnapshot>,
    /// Tiles whose participant has no record.
    pub orphan_tiles: Vec<ParticipantId>,
}

impl RoomSnapshot {
    /// Capture a room view.
    pub fn from_view(view: &RoomView) -> Self {
        let local = std::iter::once((view.local(), true));
        let remote = view.remote().values().map(|record| (record, false));
        let participants = local
            .chain(remote)
            .map(|(record, local)| ParticipantSnapshot {
                id: record.id().clone(),
                local,
                subscribed_av: record.has_subscribed_av(),
                tile: view.registry().get(record.id()).map(|tile| {
                    let streams: HashSet<_> = tile.elements().iter().map(|e| &e.stream).collect();
                    TileSnapshot {
                        media: tile.mode() == TileMode::Media,
                        elements: tile.elements().len(),
                        distinct_streams: streams.len(),
                        initials: tile.initials().to_owned(),
                        muted: tile.is_muted(),
                        speaking: tile.is_speaking(),
                    }
                }),
            })
            .collect();

        let orphan_tiles = view
            .registry()
            .tiles()
            .filter(|tile| view.record(tile.participant()).is_none())
            .map(|tile| tile.participant().clone())
            .collect();

        Self { name: view.room_name().to_owned(), participants, orphan_tiles }
    }
}

/// Snapshot of one participant.
#[derive(Debug, Clone, Serialize)]
pub struct ParticipantSnapshot {
    /// Participant id.
    pub id: ParticipantId,
    /// Local participant.
    pub local: bool,
    /// Has a subscribed audio or video publication.
    pub subscribed_av: bool,
    /// Tile state. `None` if no tile exists.
    pub tile: Option<TileSnapshot>,
}

/// Snapshot of one tile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TileSnapshot {
    /// Media mode (otherwise placeholder).
    pub media: bool,
    /// Attached elements.
    pub elements: usize,
    /// Distinct streams among the attached elements.
    pub distinct_streams: usize,
    /// Placeholder initials.
    pub initials: String,
    /// Microphone muted indicator.
    pub muted: bool,
    /// Speaking highlight.
    pub speaking: bool,
}
