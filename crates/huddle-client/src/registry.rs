//! Participant tile registry.
//!
//! Each participant in the room owns exactly one [`Tile`]. Tiles live in an
//! arena and are addressed by [`TileHandle`]; a handle from a removed tile
//! never resolves to a tile created later in the same slot.
//!
//! # Tile mode
//!
//! A tile is in [`TileMode::Media`] iff its participant has at least one
//! subscribed camera or microphone publication. Screen share alone keeps
//! the placeholder but marks the tile with a flag. Callers update the
//! [`ParticipantRecord`] first, then the registry; [`detach`] reads the
//! record to decide whether to fall back to the placeholder.
//!
//! [`detach`]: ParticipantViewRegistry::detach

use std::collections::{HashMap, HashSet};

use huddle_core::{MediaElement, ParticipantId, ParticipantInfo, ParticipantRecord, TrackSource};

const MAX_INITIALS: usize = 2;

/// Avatar text for a display name.
///
/// First character of each whitespace-separated token, uppercased, at most
/// two characters.
pub fn initials(name: &str) -> String {
    name.split_whitespace()
        .filter_map(|word| word.chars().next())
        .collect::<String>()
        .to_uppercase()
        .chars()
        .take(MAX_INITIALS)
        .collect()
}

/// Stable reference to a tile in the registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TileHandle {
    index: u32,
    generation: u32,
}

/// Whether a tile shows media or the avatar placeholder.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TileMode {
    /// Initials avatar, no visible media.
    Placeholder,
    /// One or more attached elements.
    Media,
}

/// Result of [`ParticipantViewRegistry::attach`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttachOutcome {
    /// Element appended to the tile.
    Attached,
    /// An element for the same media was already present.
    Duplicate,
}

/// View of one participant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tile {
    participant: ParticipantId,
    name: String,
    initials: String,
    mode: TileMode,
    elements: Vec<MediaElement>,
    screen_share: bool,
    muted: bool,
    speaking: bool,
}

impl Tile {
    fn placeholder(info: &ParticipantInfo) -> Self {
        let name = info.display_name().to_string();
        Self {
            participant: info.id.clone(),
            initials: initials(&name),
            name,
            mode: TileMode::Placeholder,
            elements: Vec::new(),
            screen_share: false,
            muted: false,
            speaking: false,
        }
    }

    /// Participant this tile belongs to.
    pub fn participant(&self) -> &ParticipantId {
        &self.participant
    }

    /// Name label.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Avatar text shown in placeholder mode.
    pub fn initials(&self) -> &str {
        &self.initials
    }

    /// Current mode.
    pub fn mode(&self) -> TileMode {
        self.mode
    }

    /// Attached elements in attach order.
    pub fn elements(&self) -> &[MediaElement] {
        &self.elements
    }

    /// Showing a screen share.
    pub fn is_screen_share(&self) -> bool {
        self.screen_share
    }

    /// Mute indicator visible.
    pub fn is_muted(&self) -> bool {
        self.muted
    }

    /// Speaking highlight on.
    pub fn is_speaking(&self) -> bool {
        self.speaking
    }
}

#[derive(Debug, Clone)]
struct Slot {
    generation: u32,
    tile: Option<Tile>,
}

/// Maps participants to their tiles.
#[derive(Debug, Clone, Default)]
pub struct ParticipantViewRegistry {
    slots: Vec<Slot>,
    free: Vec<u32>,
    by_participant: HashMap<ParticipantId, TileHandle>,
    /// Grid order (insertion order).
    order: Vec<TileHandle>,
}

impl ParticipantViewRegistry {
    /// Empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a placeholder tile unless one already exists.
    pub fn ensure_placeholder(&mut self, info: &ParticipantInfo) -> TileHandle {
        if let Some(handle) = self.by_participant.get(&info.id) {
            return *handle;
        }

        let tile = Tile::placeholder(info);
        let handle = match self.free.pop() {
            Some(index) => {
                let slot = &mut self.slots[index as usize];
                slot.generation = slot.generation.wrapping_add(1);
                slot.tile = Some(tile);
                TileHandle { index, generation: slot.generation }
            },
            None => {
                let index = self.slots.len() as u32;
                self.slots.push(Slot { generation: 0, tile: Some(tile) });
                TileHandle { index, generation: 0 }
            },
        };

        self.by_participant.insert(info.id.clone(), handle);
        self.order.push(handle);
        handle
    }

    /// Attach an element to the participant's tile.
    ///
    /// Creates the tile if needed. Camera and microphone elements switch the
    /// tile to media mode. An element rendering the same media as one already
    /// attached is skipped, so redundant subscribe events never duplicate
    /// video.
    pub fn attach(&mut self, info: &ParticipantInfo, element: MediaElement) -> AttachOutcome {
        let handle = self.ensure_placeholder(info);
        let Some(tile) = self.tile_mut(handle) else {
            return AttachOutcome::Duplicate;
        };

        if element.source.is_primary() {
            tile.mode = TileMode::Media;
        }

        if tile.elements.iter().any(|existing| existing.renders_same_media(&element)) {
            return AttachOutcome::Duplicate;
        }

        if element.source == TrackSource::ScreenShare {
            tile.screen_share = true;
        }
        tile.elements.push(element);
        AttachOutcome::Attached
    }

    /// Remove the participant's elements for `source`.
    ///
    /// `record` must already reflect the unsubscription. If it has no
    /// remaining subscribed camera or microphone, the tile reverts to the
    /// placeholder. Returns `true` if the tile reverted.
    pub fn detach(&mut self, record: &ParticipantRecord, source: TrackSource) -> bool {
        let Some(handle) = self.by_participant.get(record.id()).copied() else {
            return false;
        };
        let Some(tile) = self.tile_mut(handle) else {
            return false;
        };

        tile.elements.retain(|element| element.source != source);
        if source == TrackSource::ScreenShare {
            tile.screen_share = false;
        }

        if record.has_subscribed_av() || tile.mode == TileMode::Placeholder {
            return false;
        }

        tile.elements.retain(|element| !element.source.is_primary());
        tile.mode = TileMode::Placeholder;
        true
    }

    /// Delete the participant's tile.
    pub fn remove(&mut self, participant: &ParticipantId) -> Option<Tile> {
        let handle = self.by_participant.remove(participant)?;
        self.order.retain(|h| *h != handle);
        let tile = self.slots.get_mut(handle.index as usize)?.tile.take();
        self.free.push(handle.index);
        tile
    }

    /// Show or hide the mute indicator. No-op if the tile is absent.
    pub fn set_muted(&mut self, participant: &ParticipantId, muted: bool) -> bool {
        match self.get_mut(participant) {
            Some(tile) => {
                tile.muted = muted;
                true
            },
            None => false,
        }
    }

    /// Highlight exactly the tiles of `speakers`.
    pub fn set_speaking<'a, I>(&mut self, speakers: I)
    where
        I: IntoIterator<Item = &'a ParticipantId>,
    {
        let speakers: HashSet<&ParticipantId> = speakers.into_iter().collect();
        for slot in &mut self.slots {
            if let Some(tile) = slot.tile.as_mut() {
                tile.speaking = speakers.contains(&tile.participant);
            }
        }
    }

    /// Remove every tile.
    pub fn clear(&mut self) {
        for (index, slot) in self.slots.iter_mut().enumerate() {
            if slot.tile.take().is_some() {
                self.free.push(index as u32);
            }
        }
        self.by_participant.clear();
        self.order.clear();
    }

    /// Handle for a participant's tile.
    pub fn handle(&self, participant: &ParticipantId) -> Option<TileHandle> {
        self.by_participant.get(participant).copied()
    }

    /// Tile for a participant.
    pub fn get(&self, participant: &ParticipantId) -> Option<&Tile> {
        self.handle(participant).and_then(|handle| self.resolve(handle))
    }

    /// Tile behind a handle. `None` if the tile was removed.
    pub fn resolve(&self, handle: TileHandle) -> Option<&Tile> {
        let slot = self.slots.get(handle.index as usize)?;
        if slot.generation != handle.generation {
            return None;
        }
        slot.tile.as_ref()
    }

    /// Tiles in grid order.
    pub fn tiles(&self) -> impl Iterator<Item = &Tile> {
        self.order.iter().filter_map(|handle| self.resolve(*handle))
    }

    /// Number of tiles.
    pub fn len(&self) -> usize {
        self.by_participant.len()
    }

    /// No tiles.
    pub fn is_empty(&self) -> bool {
        self.by_participant.is_empty()
    }

    fn get_mut(&mut self, participant: &ParticipantId) -> Option<&mut Tile> {
        let handle = self.handle(participant)?;
        self.tile_mut(handle)
    }

    fn tile_mut(&mut self, handle: TileHandle) -> Option<&mut Tile> {
        let slot = self.slots.get_mut(handle.index as usize)?;
        if slot.generation != handle.generation {
            return None;
        }
        slot.tile.as_mut()
    }
}
