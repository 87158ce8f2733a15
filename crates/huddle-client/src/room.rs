//! Per-session room view.
//!
//! Holds the participant records reported by the session alongside the
//! tiles derived from them. Records are the source of truth for which
//! publications exist; tiles only mirror them.

use std::collections::BTreeMap;

use huddle_core::{
    ConnectionQuality, MediaElement, ParticipantId, ParticipantInfo, ParticipantRecord,
    SessionInfo, TrackPublication, TrackSource,
};

use crate::{AudioPrompt, ParticipantViewRegistry, StatusIndicator};

/// Room state for one open session.
#[derive(Debug, Clone)]
pub struct RoomView {
    room_name: String,
    local: ParticipantRecord,
    remote: BTreeMap<ParticipantId, ParticipantRecord>,
    registry: ParticipantViewRegistry,
    status: StatusIndicator,
    audio_prompt: AudioPrompt,
    local_quality: ConnectionQuality,
}

impl RoomView {
    /// View for a freshly opened session.
    ///
    /// Participants already in the room get placeholder tiles; the local
    /// tile appears once the microphone is up or a camera is attached.
    pub fn new(info: &SessionInfo) -> Self {
        let mut view = Self {
            room_name: info.room_name.clone(),
            local: ParticipantRecord::new(info.local.clone()),
            remote: BTreeMap::new(),
            registry: ParticipantViewRegistry::new(),
            status: StatusIndicator::Connected,
            audio_prompt: AudioPrompt::Hidden,
            local_quality: ConnectionQuality::Unknown,
        };
        for participant in &info.remote {
            view.participant_joined(participant);
        }
        view
    }

    /// Room name shown in the header.
    pub fn room_name(&self) -> &str {
        &self.room_name
    }

    /// Override the displayed room name (the name the user asked for).
    pub fn set_room_name(&mut self, name: impl Into<String>) {
        self.room_name = name.into();
    }

    /// The local participant.
    pub fn local(&self) -> &ParticipantRecord {
        &self.local
    }

    /// Remote participants by id.
    pub fn remote(&self) -> &BTreeMap<ParticipantId, ParticipantRecord> {
        &self.remote
    }

    /// Record for any participant, local or remote.
    pub fn record(&self, id: &ParticipantId) -> Option<&ParticipantRecord> {
        if self.local.id() == id { Some(&self.local) } else { self.remote.get(id) }
    }

    pub(crate) fn record_mut(&mut self, id: &ParticipantId) -> Option<&mut ParticipantRecord> {
        if self.local.id() == id { Some(&mut self.local) } else { self.remote.get_mut(id) }
    }

    /// Tiles.
    pub fn registry(&self) -> &ParticipantViewRegistry {
        &self.registry
    }

    pub(crate) fn registry_mut(&mut self) -> &mut ParticipantViewRegistry {
        &mut self.registry
    }

    /// Split borrow of a record and the registry.
    pub(crate) fn record_and_registry(
        &mut self,
        id: &ParticipantId,
    ) -> Option<(&ParticipantRecord, &mut ParticipantViewRegistry)> {
        let record = if self.local.id() == id { &self.local } else { self.remote.get(id)? };
        Some((record, &mut self.registry))
    }

    /// Local participant plus remotes.
    pub fn participant_count(&self) -> usize {
        self.remote.len() + 1
    }

    /// `"1 participant"`, `"3 participants"`, ...
    pub fn participant_count_label(&self) -> String {
        let count = self.participant_count();
        let plural = if count == 1 { "" } else { "s" };
        format!("{count} participant{plural}")
    }

    /// Connection status indicator.
    pub fn status(&self) -> StatusIndicator {
        self.status
    }

    pub(crate) fn set_status(&mut self, status: StatusIndicator) {
        self.status = status;
    }

    /// Link quality last reported for the local participant.
    pub fn local_quality(&self) -> ConnectionQuality {
        self.local_quality
    }

    pub(crate) fn set_local_quality(&mut self, quality: ConnectionQuality) {
        self.local_quality = quality;
    }

    /// Audio prompt visibility.
    pub fn audio_prompt(&self) -> AudioPrompt {
        self.audio_prompt
    }

    pub(crate) fn show_audio_prompt(&mut self) -> bool {
        let was_hidden = self.audio_prompt == AudioPrompt::Hidden;
        self.audio_prompt = AudioPrompt::Shown;
        was_hidden
    }

    /// Hide the audio prompt after playback resumed.
    pub fn dismiss_audio_prompt(&mut self) {
        self.audio_prompt = AudioPrompt::Hidden;
    }

    /// Remote participant joined: record plus placeholder tile.
    pub fn participant_joined(&mut self, info: &ParticipantInfo) {
        if info.id == *self.local.id() {
            return;
        }
        self.remote
            .entry(info.id.clone())
            .or_insert_with(|| ParticipantRecord::new(info.clone()));
        self.registry.ensure_placeholder(info);
    }

    /// Remote participant left: record and tile removed.
    pub fn participant_left(&mut self, id: &ParticipantId) {
        self.remote.remove(id);
        self.registry.remove(id);
    }

    /// Make sure the local participant has a tile.
    pub fn ensure_local_tile(&mut self) {
        self.registry.ensure_placeholder(&self.local.info);
    }

    /// A local source was enabled.
    ///
    /// Local publications count as subscribed when they render locally, so
    /// only a video preview puts the local tile in media mode; the local
    /// microphone is never played back.
    pub fn local_source_enabled(&mut self, source: TrackSource, element: Option<MediaElement>) {
        let mut publication =
            TrackPublication::new(format!("local-{}", source_slug(source)), source);
        publication.subscribed = element.is_some();
        self.local.publish(publication);

        match element {
            Some(element) => {
                let element = if source == TrackSource::Camera { element.mirrored() } else { element };
                self.registry.attach(&self.local.info, element);
            },
            None => self.ensure_local_tile(),
        }
    }

    /// A local source was disabled or unpublished.
    pub fn local_source_disabled(&mut self, source: TrackSource) {
        self.local.unpublish(source);
        self.registry.detach(&self.local, source);
    }

    /// Drop every record and tile.
    pub fn clear(&mut self) {
        self.remote.clear();
        self.registry.clear();
        self.audio_prompt = AudioPrompt::Hidden;
        self.status = StatusIndicator::Connected;
    }
}

fn source_slug(source: TrackSource) -> &'static str {
    match source {
        TrackSource::Camera => "camera",
        TrackSource::Microphone => "microphone",
        TrackSource::ScreenShare => "screen",
        TrackSource::ScreenShareAudio => "screen-audio",
        TrackSource::Unknown => "unknown",
    }
}
