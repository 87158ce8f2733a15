//! Events emitted by an open media session.

use std::fmt;

use crate::{
    error::MediaDeviceError,
    media::MediaElement,
    participant::{ParticipantId, ParticipantInfo, TrackSid, TrackSource},
    session::SessionPhase,
};

/// Why a session ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DisconnectReason {
    /// The local user left.
    ClientInitiated,
    /// The media server is shutting down.
    ServerShutdown,
    /// The server removed this participant from the room.
    ParticipantRemoved,
    /// The room was deleted.
    RoomDeleted,
    /// The signaling connection dropped and could not be resumed.
    SignalClosed,
    /// No reason reported.
    Unknown,
}

impl fmt::Display for DisconnectReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Self::ClientInitiated => "left the room",
            Self::ServerShutdown => "server shutting down",
            Self::ParticipantRemoved => "removed from the room",
            Self::RoomDeleted => "room deleted",
            Self::SignalClosed => "connection lost",
            Self::Unknown => "unknown reason",
        };
        f.write_str(text)
    }
}

/// Link quality reported for a participant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionQuality {
    /// No measurable loss.
    Excellent,
    /// Minor loss or jitter.
    Good,
    /// Noticeable degradation.
    Poor,
    /// No media arriving.
    Lost,
    /// Not measured yet.
    Unknown,
}

/// Events emitted by a [`crate::MediaSession`].
///
/// Events for one session arrive in the order the media server delivers
/// them; nothing here imposes additional ordering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    /// Media for a remote track started arriving.
    TrackSubscribed {
        /// Publishing participant.
        participant: ParticipantInfo,
        /// Publication id.
        track: TrackSid,
        /// Origin of the track.
        source: TrackSource,
        /// Element rendering the track.
        element: MediaElement,
    },

    /// Media for a remote track stopped arriving.
    TrackUnsubscribed {
        /// Publishing participant.
        participant: ParticipantId,
        /// Publication id.
        track: TrackSid,
        /// Origin of the track.
        source: TrackSource,
    },

    /// A publisher muted a track.
    TrackMuted {
        /// Publishing participant.
        participant: ParticipantId,
        /// Origin of the track.
        source: TrackSource,
    },

    /// A publisher unmuted a track.
    TrackUnmuted {
        /// Publishing participant.
        participant: ParticipantId,
        /// Origin of the track.
        source: TrackSource,
    },

    /// A remote participant joined.
    ParticipantConnected(ParticipantInfo),

    /// A remote participant left.
    ParticipantDisconnected(ParticipantId),

    /// The set of participants currently speaking changed.
    ActiveSpeakersChanged(Vec<ParticipantId>),

    /// A local track was published.
    LocalTrackPublished {
        /// Publication id.
        track: TrackSid,
        /// Origin of the track.
        source: TrackSource,
    },

    /// A local track was unpublished.
    LocalTrackUnpublished {
        /// Publication id.
        track: TrackSid,
        /// Origin of the track.
        source: TrackSource,
    },

    /// The session ended.
    Disconnected(DisconnectReason),

    /// Whether audio playback is currently permitted changed.
    AudioPlaybackChanged {
        /// `false` when the platform blocked autoplay.
        can_playback: bool,
    },

    /// A capture device failed.
    MediaDevicesError(MediaDeviceError),

    /// Signaling dropped; the SDK is resuming.
    Reconnecting,

    /// Signaling resumed.
    Reconnected,

    /// Link quality for a participant changed.
    ConnectionQualityChanged {
        /// Participant the measurement is for.
        participant: ParticipantId,
        /// New quality.
        quality: ConnectionQuality,
    },

    /// The SDK reported a connection state change.
    ConnectionStateChanged(SessionPhase),

    /// The signaling channel is established.
    SignalConnected,
}

/// Discriminant of a [`SessionEvent`], used as the dispatch table key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum EventKind {
    /// [`SessionEvent::TrackSubscribed`]
    TrackSubscribed,
    /// [`SessionEvent::TrackUnsubscribed`]
    TrackUnsubscribed,
    /// [`SessionEvent::TrackMuted`]
    TrackMuted,
    /// [`SessionEvent::TrackUnmuted`]
    TrackUnmuted,
    /// [`SessionEvent::ParticipantConnected`]
    ParticipantConnected,
    /// [`SessionEvent::ParticipantDisconnected`]
    ParticipantDisconnected,
    /// [`SessionEvent::ActiveSpeakersChanged`]
    ActiveSpeakersChanged,
    /// [`SessionEvent::LocalTrackPublished`]
    LocalTrackPublished,
    /// [`SessionEvent::LocalTrackUnpublished`]
    LocalTrackUnpublished,
    /// [`SessionEvent::Disconnected`]
    Disconnected,
    /// [`SessionEvent::AudioPlaybackChanged`]
    AudioPlaybackChanged,
    /// [`SessionEvent::MediaDevicesError`]
    MediaDevicesError,
    /// [`SessionEvent::Reconnecting`]
    Reconnecting,
    /// [`SessionEvent::Reconnected`]
    Reconnected,
    /// [`SessionEvent::ConnectionQualityChanged`]
    ConnectionQualityChanged,
    /// [`SessionEvent::ConnectionStateChanged`]
    ConnectionStateChanged,
    /// [`SessionEvent::SignalConnected`]
    SignalConnected,
}

impl EventKind {
    /// Every event kind a session can emit.
    pub const ALL: [EventKind; 17] = [
        Self::TrackSubscribed,
        Self::TrackUnsubscribed,
        Self::TrackMuted,
        Self::TrackUnmuted,
        Self::ParticipantConnected,
        Self::ParticipantDisconnected,
        Self::ActiveSpeakersChanged,
        Self::LocalTrackPublished,
        Self::LocalTrackUnpublished,
        Self::Disconnected,
        Self::AudioPlaybackChanged,
        Self::MediaDevicesError,
        Self::Reconnecting,
        Self::Reconnected,
        Self::ConnectionQualityChanged,
        Self::ConnectionStateChanged,
        Self::SignalConnected,
    ];
}

impl SessionEvent {
    /// Dispatch key for this event.
    pub fn kind(&self) -> EventKind {
        match self {
            Self::TrackSubscribed { .. } => EventKind::TrackSubscribed,
            Self::TrackUnsubscribed { .. } => EventKind::TrackUnsubscribed,
            Self::TrackMuted { .. } => EventKind::TrackMuted,
            Self::TrackUnmuted { .. } => EventKind::TrackUnmuted,
            Self::ParticipantConnected(_) => EventKind::ParticipantConnected,
            Self::ParticipantDisconnected(_) => EventKind::ParticipantDisconnected,
            Self::ActiveSpeakersChanged(_) => EventKind::ActiveSpeakersChanged,
            Self::LocalTrackPublished { .. } => EventKind::LocalTrackPublished,
            Self::LocalTrackUnpublished { .. } => EventKind::LocalTrackUnpublished,
            Self::Disconnected(_) => EventKind::Disconnected,
            Self::AudioPlaybackChanged { .. } => EventKind::AudioPlaybackChanged,
            Self::MediaDevicesError(_) => EventKind::MediaDevicesError,
            Self::Reconnecting => EventKind::Reconnecting,
            Self::Reconnected => EventKind::Reconnected,
            Self::ConnectionQualityChanged { .. } => EventKind::ConnectionQualityChanged,
            Self::ConnectionStateChanged(_) => EventKind::ConnectionStateChanged,
            Self::SignalConnected => EventKind::SignalConnected,
        }
    }
}
