//! Standard invariant checks.
//!
//! These invariants capture behavioral properties that must always hold.
//! They verify WHAT must be true, not specific test scenarios.

use super::{Invariant, InvariantKind, InvariantResult, SystemSnapshot, Violation};

/// A tile shows media exactly when its participant has a subscribed audio or
/// video publication, and never renders the same stream twice.
pub struct TileModeMatchesSubscriptions;

impl Invariant for TileModeMatchesSubscriptions {
    fn kind(&self) -> InvariantKind {
        InvariantKind::TileModeMatchesSubscriptions
    }

    fn check(&self, state: &SystemSnapshot) -> InvariantResult {
        let Some(room) = &state.room else {
            return Ok(());
        };

        for participant in &room.participants {
            let Some(tile) = &participant.tile else {
                continue;
            };
            if tile.media != participant.subscribed_av {
                return Err(Violation {
                    invariant: self.kind(),
                    message: format!(
                        "participant {}: tile media={} but subscribed_av={}",
                        participant.id, tile.media, participant.subscribed_av
                    ),
                });
            }
            if tile.elements != tile.distinct_streams {
                return Err(Violation {
                    invariant: self.kind(),
                    message: format!(
                        "participant {}: {} elements for {} streams",
                        participant.id, tile.elements, tile.distinct_streams
                    ),
                });
            }
        }
        Ok(())
    }
}

/// Every remote participant has a tile and every tile has a participant.
pub struct TilesMatchRecords;

impl Invariant for TilesMatchRecords {
    fn kind(&self) -> InvariantKind {
        InvariantKind::TilesMatchRecords
    }

    fn check(&self, state: &SystemSnapshot) -> InvariantResult {
        let Some(room) = &state.room else {
            return Ok(());
        };

        if let Some(orphan) = room.orphan_tiles.first() {
            return Err(Violation {
                invariant: self.kind(),
                message: format!("tile for {orphan} has no participant record"),
            });
        }

        match room.participants.iter().find(|p| !p.local && p.tile.is_none()) {
            Some(missing) => Err(Violation {
                invariant: self.kind(),
                message: format!("remote participant {} has no tile", missing.id),
            }),
            None => Ok(()),
        }
    }
}

/// An idle client shows the form with no room state and clear toggles.
pub struct IdleMeansClean;

impl Invariant for IdleMeansClean {
    fn kind(&self) -> InvariantKind {
        InvariantKind::IdleMeansClean
    }

    fn check(&self, state: &SystemSnapshot) -> InvariantResult {
        if !state.idle {
            return Ok(());
        }

        let problem = if state.room.is_some() {
            Some("room state retained")
        } else if state.on_room_screen {
            Some("room screen shown")
        } else if !state.toggles_clear {
            Some("toggles not reset")
        } else if state.loading {
            Some("loading overlay shown")
        } else {
            None
        };

        match problem {
            Some(problem) => Err(Violation {
                invariant: self.kind(),
                message: format!("idle but {problem}"),
            }),
            None => Ok(()),
        }
    }
}

/// At most one session is open, and none while idle.
pub struct SingleSessionOwnership;

impl Invariant for SingleSessionOwnership {
    fn kind(&self) -> InvariantKind {
        InvariantKind::SingleSessionOwnership
    }

    fn check(&self, state: &SystemSnapshot) -> InvariantResult {
        if state.open_sessions > 1 {
            return Err(Violation {
                invariant: self.kind(),
                message: format!("{} sessions open", state.open_sessions),
            });
        }
        if state.idle && state.open_sessions > 0 {
            return Err(Violation {
                invariant: self.kind(),
                message: format!("idle with {} session open", state.open_sessions),
            });
        }
        Ok(())
    }
}
