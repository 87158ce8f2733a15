//! Participants and their track publications.
//!
//! A [`ParticipantRecord`] is the client's view of one identity in the room:
//! who it is and which tracks it currently advertises. Publication lifecycle
//! is driven by session events; the UI only creates publications for local
//! tracks the user explicitly enabled.

use std::{collections::HashMap, fmt};

use serde::{Deserialize, Serialize};

/// Session-scoped participant identifier assigned by the media server.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ParticipantId(String);

impl ParticipantId {
    /// Wrap a server-assigned participant sid.
    pub fn new(sid: impl Into<String>) -> Self {
        Self(sid.into())
    }

    /// Raw sid string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ParticipantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Server-assigned track publication identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TrackSid(String);

impl TrackSid {
    /// Wrap a server-assigned track sid.
    pub fn new(sid: impl Into<String>) -> Self {
        Self(sid.into())
    }

    /// Raw sid string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Who a participant is.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParticipantInfo {
    /// Session-scoped id.
    pub id: ParticipantId,
    /// Stable identity (user name or account id).
    pub identity: String,
    /// Optional display name. Falls back to `identity`.
    pub name: Option<String>,
}

impl ParticipantInfo {
    /// Participant with no separate display name.
    pub fn new(id: impl Into<String>, identity: impl Into<String>) -> Self {
        Self { id: ParticipantId::new(id), identity: identity.into(), name: None }
    }

    /// Name shown on the participant's tile.
    pub fn display_name(&self) -> &str {
        match self.name.as_deref() {
            Some(name) if !name.trim().is_empty() => name,
            _ => &self.identity,
        }
    }
}

/// What a track carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TrackKind {
    /// Audio samples.
    Audio,
    /// Video frames.
    Video,
}

/// Where a track originates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TrackSource {
    /// Camera video.
    Camera,
    /// Microphone audio.
    Microphone,
    /// Screen capture video.
    ScreenShare,
    /// Audio captured alongside a screen share.
    ScreenShareAudio,
    /// Source not reported by the server.
    Unknown,
}

impl TrackSource {
    /// Whether this source keeps a tile in media mode.
    ///
    /// Only camera and microphone count; a participant sharing just their
    /// screen still shows the placeholder avatar.
    pub fn is_primary(self) -> bool {
        matches!(self, Self::Camera | Self::Microphone)
    }

    /// Kind of media this source produces.
    pub fn kind(self) -> TrackKind {
        match self {
            Self::Microphone | Self::ScreenShareAudio => TrackKind::Audio,
            Self::Camera | Self::ScreenShare | Self::Unknown => TrackKind::Video,
        }
    }
}

impl fmt::Display for TrackSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Camera => "camera",
            Self::Microphone => "microphone",
            Self::ScreenShare => "screen share",
            Self::ScreenShareAudio => "screen share audio",
            Self::Unknown => "unknown",
        };
        f.write_str(label)
    }
}

/// A track advertised by a participant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackPublication {
    /// Server-assigned id.
    pub sid: TrackSid,
    /// Origin of the track.
    pub source: TrackSource,
    /// Audio or video.
    pub kind: TrackKind,
    /// Whether the local client receives this track's media.
    pub subscribed: bool,
    /// Whether the publisher muted the track.
    pub muted: bool,
}

impl TrackPublication {
    /// New unsubscribed, unmuted publication.
    pub fn new(sid: impl Into<String>, source: TrackSource) -> Self {
        Self {
            sid: TrackSid::new(sid),
            source,
            kind: source.kind(),
            subscribed: false,
            muted: false,
        }
    }
}

/// A participant and its active publications, keyed by source.
///
/// At most one publication per source is tracked, matching how the media
/// server reports camera, microphone, and screen share.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParticipantRecord {
    /// Identity of the participant.
    pub info: ParticipantInfo,
    publications: HashMap<TrackSource, TrackPublication>,
}

impl ParticipantRecord {
    /// Record with no publications.
    pub fn new(info: ParticipantInfo) -> Self {
        Self { info, publications: HashMap::new() }
    }

    /// Session-scoped id.
    pub fn id(&self) -> &ParticipantId {
        &self.info.id
    }

    /// Add or replace the publication for its source.
    pub fn publish(&mut self, publication: TrackPublication) {
        self.publications.insert(publication.source, publication);
    }

    /// Remove the publication for `source`, returning it if present.
    pub fn unpublish(&mut self, source: TrackSource) -> Option<TrackPublication> {
        self.publications.remove(&source)
    }

    /// Publication for `source`, if any.
    pub fn publication(&self, source: TrackSource) -> Option<&TrackPublication> {
        self.publications.get(&source)
    }

    /// All publications in no particular order.
    pub fn publications(&self) -> impl Iterator<Item = &TrackPublication> {
        self.publications.values()
    }

    /// Mark the publication for `source` subscribed or not.
    ///
    /// Subscribing to a source the record has not seen creates the
    /// publication, since the server may deliver the subscription before the
    /// publish notification.
    pub fn set_subscribed(&mut self, sid: &TrackSid, source: TrackSource, subscribed: bool) {
        let publication = self
            .publications
            .entry(source)
            .or_insert_with(|| TrackPublication::new(sid.as_str(), source));
        publication.sid = sid.clone();
        publication.subscribed = subscribed;
    }

    /// Set the mute flag. Returns `false` if no publication exists for
    /// `source`.
    pub fn set_muted(&mut self, source: TrackSource, muted: bool) -> bool {
        match self.publications.get_mut(&source) {
            Some(publication) => {
                publication.muted = muted;
                true
            },
            None => false,
        }
    }

    /// At least one subscribed camera or microphone publication.
    pub fn has_subscribed_av(&self) -> bool {
        self.publications.values().any(|p| p.source.is_primary() && p.subscribed)
    }

    /// Whether the microphone publication exists and is muted.
    pub fn is_microphone_muted(&self) -> bool {
        self.publication(TrackSource::Microphone).is_some_and(|p| p.muted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record() -> ParticipantRecord {
        ParticipantRecord::new(ParticipantInfo::new("PA_1", "jane"))
    }

    #[test]
    fn display_name_falls_back_to_identity() {
        let mut info = ParticipantInfo::new("PA_1", "jane");
        assert_eq!(info.display_name(), "jane");

        info.name = Some("Jane Doe".into());
        assert_eq!(info.display_name(), "Jane Doe");

        info.name = Some("   ".into());
        assert_eq!(info.display_name(), "jane");
    }

    #[test]
    fn screen_share_does_not_count_as_av() {
        let mut r = record();
        r.set_subscribed(&TrackSid::new("TR_s"), TrackSource::ScreenShare, true);
        assert!(!r.has_subscribed_av());

        r.set_subscribed(&TrackSid::new("TR_m"), TrackSource::Microphone, true);
        assert!(r.has_subscribed_av());

        r.set_subscribed(&TrackSid::new("TR_m"), TrackSource::Microphone, false);
        assert!(!r.has_subscribed_av());
    }

    #[test]
    fn mute_requires_publication() {
        let mut r = record();
        assert!(!r.set_muted(TrackSource::Microphone, true));
        assert!(!r.is_microphone_muted());

        r.publish(TrackPublication::new("TR_m", TrackSource::Microphone));
        assert!(r.set_muted(TrackSource::Microphone, true));
        assert!(r.is_microphone_muted());
    }

    #[test]
    fn unpublish_removes_subscription() {
        let mut r = record();
        r.set_subscribed(&TrackSid::new("TR_c"), TrackSource::Camera, true);
        assert!(r.unpublish(TrackSource::Camera).is_some());
        assert!(!r.has_subscribed_av());
        assert!(r.unpublish(TrackSource::Camera).is_none());
    }
}
