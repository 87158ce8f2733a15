//! Session event dispatch.
//!
//! The [`EventDispatcher`] is built once per session from a fixed table
//! mapping every [`EventKind`] to its handler, and dropped with the session.
//! Handlers are synchronous: each one updates the [`RoomView`] for the event
//! it receives and returns [`ViewEffect`]s for the application layer. No
//! handler waits on another event.

use std::collections::BTreeMap;

use huddle_core::{EventKind, SessionEvent};

use crate::{RoomView, StatusIndicator, ViewEffect};

type Handler = fn(&mut RoomView, SessionEvent) -> Vec<ViewEffect>;

const TABLE: [(EventKind, Handler); 17] = [
    (EventKind::TrackSubscribed, on_track_subscribed),
    (EventKind::TrackUnsubscribed, on_track_unsubscribed),
    (EventKind::TrackMuted, on_track_mute_changed),
    (EventKind::TrackUnmuted, on_track_mute_changed),
    (EventKind::ParticipantConnected, on_participant_connected),
    (EventKind::ParticipantDisconnected, on_participant_disconnected),
    (EventKind::ActiveSpeakersChanged, on_active_speakers_changed),
    (EventKind::LocalTrackPublished, on_local_track_published),
    (EventKind::LocalTrackUnpublished, on_local_track_unpublished),
    (EventKind::Disconnected, on_disconnected),
    (EventKind::AudioPlaybackChanged, on_audio_playback_changed),
    (EventKind::MediaDevicesError, on_media_devices_error),
    (EventKind::Reconnecting, on_reconnecting),
    (EventKind::Reconnected, on_reconnected),
    (EventKind::ConnectionQualityChanged, on_connection_quality_changed),
    (EventKind::ConnectionStateChanged, log_only),
    (EventKind::SignalConnected, log_only),
];

/// Routes session events to their handlers.
#[derive(Debug, Clone)]
pub struct EventDispatcher {
    generation: u64,
    table: BTreeMap<EventKind, Handler>,
}

impl EventDispatcher {
    /// Dispatch table for the session with the given generation.
    pub fn for_session(generation: u64) -> Self {
        tracing::debug!(generation, "subscribing to session events");
        Self { generation, table: TABLE.into_iter().collect() }
    }

    /// Session generation this dispatcher belongs to.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Event kinds with a registered handler.
    pub fn subscribed(&self) -> impl Iterator<Item = EventKind> + '_ {
        self.table.keys().copied()
    }

    /// Route one event.
    pub fn dispatch(&self, view: &mut RoomView, event: SessionEvent) -> Vec<ViewEffect> {
        let kind = event.kind();
        match self.table.get(&kind) {
            Some(handler) => handler(view, event),
            None => {
                tracing::debug!(?kind, "no handler registered");
                Vec::new()
            },
        }
    }
}

fn on_track_subscribed(view: &mut RoomView, event: SessionEvent) -> Vec<ViewEffect> {
    let SessionEvent::TrackSubscribed { participant, track, source, element } = event else {
        return Vec::new();
    };
    tracing::debug!(participant = %participant.identity, %source, "track subscribed");

    view.participant_joined(&participant);
    if let Some(record) = view.record_mut(&participant.id) {
        record.set_subscribed(&track, source, true);
    }
    view.registry_mut().attach(&participant, element);
    Vec::new()
}

fn on_track_unsubscribed(view: &mut RoomView, event: SessionEvent) -> Vec<ViewEffect> {
    let SessionEvent::TrackUnsubscribed { participant, track, source } = event else {
        return Vec::new();
    };
    tracing::debug!(%participant, %source, "track unsubscribed");

    if let Some(record) = view.record_mut(&participant) {
        record.set_subscribed(&track, source, false);
    }
    if let Some((record, registry)) = view.record_and_registry(&participant) {
        registry.detach(record, source);
    }
    Vec::new()
}

fn on_track_mute_changed(view: &mut RoomView, event: SessionEvent) -> Vec<ViewEffect> {
    let (participant, source, muted) = match event {
        SessionEvent::TrackMuted { participant, source } => (participant, source, true),
        SessionEvent::TrackUnmuted { participant, source } => (participant, source, false),
        _ => return Vec::new(),
    };
    tracing::debug!(%participant, %source, muted, "track mute changed");

    let Some(record) = view.record_mut(&participant) else {
        return Vec::new();
    };
    record.set_muted(source, muted);
    let microphone_muted = record.is_microphone_muted();
    view.registry_mut().set_muted(&participant, microphone_muted);
    Vec::new()
}

fn on_participant_connected(view: &mut RoomView, event: SessionEvent) -> Vec<ViewEffect> {
    let SessionEvent::ParticipantConnected(participant) = event else {
        return Vec::new();
    };
    tracing::info!(participant = %participant.identity, "participant connected");
    view.participant_joined(&participant);
    Vec::new()
}

fn on_participant_disconnected(view: &mut RoomView, event: SessionEvent) -> Vec<ViewEffect> {
    let SessionEvent::ParticipantDisconnected(participant) = event else {
        return Vec::new();
    };
    tracing::info!(%participant, "participant disconnected");
    view.participant_left(&participant);
    Vec::new()
}

fn on_active_speakers_changed(view: &mut RoomView, event: SessionEvent) -> Vec<ViewEffect> {
    let SessionEvent::ActiveSpeakersChanged(speakers) = event else {
        return Vec::new();
    };
    view.registry_mut().set_speaking(&speakers);
    Vec::new()
}

fn on_local_track_published(_view: &mut RoomView, event: SessionEvent) -> Vec<ViewEffect> {
    if let SessionEvent::LocalTrackPublished { source, .. } = event {
        tracing::info!(%source, "local track published");
    }
    Vec::new()
}

fn on_local_track_unpublished(view: &mut RoomView, event: SessionEvent) -> Vec<ViewEffect> {
    let SessionEvent::LocalTrackUnpublished { source, .. } = event else {
        return Vec::new();
    };
    tracing::info!(%source, "local track unpublished");
    view.local_source_disabled(source);
    Vec::new()
}

fn on_disconnected(_view: &mut RoomView, event: SessionEvent) -> Vec<ViewEffect> {
    let SessionEvent::Disconnected(reason) = event else {
        return Vec::new();
    };
    tracing::info!(%reason, "disconnected from room");
    vec![ViewEffect::Teardown(reason)]
}

fn on_audio_playback_changed(view: &mut RoomView, event: SessionEvent) -> Vec<ViewEffect> {
    let SessionEvent::AudioPlaybackChanged { can_playback } = event else {
        return Vec::new();
    };
    if can_playback {
        view.dismiss_audio_prompt();
    } else if view.show_audio_prompt() {
        tracing::info!("audio playback blocked, prompting user");
    }
    Vec::new()
}

fn on_media_devices_error(_view: &mut RoomView, event: SessionEvent) -> Vec<ViewEffect> {
    let SessionEvent::MediaDevicesError(error) = event else {
        return Vec::new();
    };
    tracing::error!(%error, "media device error");
    vec![ViewEffect::ShowError(format!("Media device error: {}", error.message))]
}

fn on_reconnecting(view: &mut RoomView, _event: SessionEvent) -> Vec<ViewEffect> {
    tracing::info!("reconnecting to room");
    view.set_status(StatusIndicator::Reconnecting);
    vec![ViewEffect::Reconnecting]
}

fn on_reconnected(view: &mut RoomView, _event: SessionEvent) -> Vec<ViewEffect> {
    tracing::info!("reconnected to room");
    view.set_status(StatusIndicator::Connected);
    vec![ViewEffect::Reconnected]
}

fn on_connection_quality_changed(view: &mut RoomView, event: SessionEvent) -> Vec<ViewEffect> {
    let SessionEvent::ConnectionQualityChanged { participant, quality } = event else {
        return Vec::new();
    };
    tracing::debug!(%participant, ?quality, "connection quality changed");
    if participant == *view.local().id() {
        view.set_local_quality(quality);
    }
    Vec::new()
}

fn log_only(_view: &mut RoomView, event: SessionEvent) -> Vec<ViewEffect> {
    tracing::debug!(?event, "session event");
    Vec::new()
}

#[cfg(test)]
mod tests {
    use huddle_core::{
        DisconnectReason, EventKind, MediaDeviceError, MediaElement, ParticipantId,
        ParticipantInfo, SessionInfo, TrackSid, TrackSource,
    };

    use super::*;
    use crate::{AudioPrompt, TileMode};

    fn view() -> RoomView {
        RoomView::new(&SessionInfo {
            room_sid: "RM_1".into(),
            room_name: "standup".into(),
            local: ParticipantInfo::new("PA_local", "me"),
            remote: Vec::new(),
        })
    }

    fn bob() -> ParticipantInfo {
        ParticipantInfo::new("PA_bob", "Bob Smith")
    }

    fn subscribe(source: TrackSource, element: u64) -> SessionEvent {
        SessionEvent::TrackSubscribed {
            participant: bob(),
            track: TrackSid::new(format!("TR_{element}")),
            source,
            element: MediaElement::new(element, format!("MS_{element}"), source),
        }
    }

    #[test]
    fn table_covers_every_event_kind() {
        let dispatcher = EventDispatcher::for_session(1);
        let subscribed: Vec<_> = dispatcher.subscribed().collect();
        let mut all = EventKind::ALL.to_vec();
        all.sort();
        assert_eq!(subscribed, all);
    }

    #[test]
    fn subscribe_creates_tile_in_media_mode() {
        let dispatcher = EventDispatcher::for_session(1);
        let mut view = view();

        dispatcher.dispatch(&mut view, subscribe(TrackSource::Camera, 1));

        let tile = view.registry().get(&bob().id).unwrap();
        assert_eq!(tile.mode(), TileMode::Media);
        assert_eq!(view.participant_count(), 2);
    }

    #[test]
    fn unsubscribe_last_track_reverts_to_placeholder() {
        let dispatcher = EventDispatcher::for_session(1);
        let mut view = view();
        dispatcher.dispatch(&mut view, subscribe(TrackSource::Camera, 1));
        dispatcher.dispatch(&mut view, SessionEvent::TrackUnsubscribed {
            participant: bob().id,
            track: TrackSid::new("TR_1"),
            source: TrackSource::Camera,
        });

        let tile = view.registry().get(&bob().id).unwrap();
        assert_eq!(tile.mode(), TileMode::Placeholder);
        assert_eq!(tile.initials(), "BS");
    }

    #[test]
    fn mute_indicator_follows_microphone() {
        let dispatcher = EventDispatcher::for_session(1);
        let mut view = view();
        dispatcher.dispatch(&mut view, subscribe(TrackSource::Microphone, 1));

        dispatcher.dispatch(&mut view, SessionEvent::TrackMuted {
            participant: bob().id,
            source: TrackSource::Microphone,
        });
        assert!(view.registry().get(&bob().id).unwrap().is_muted());

        dispatcher.dispatch(&mut view, SessionEvent::TrackUnmuted {
            participant: bob().id,
            source: TrackSource::Microphone,
        });
        assert!(!view.registry().get(&bob().id).unwrap().is_muted());
    }

    #[test]
    fn participant_left_removes_tile() {
        let dispatcher = EventDispatcher::for_session(1);
        let mut view = view();
        dispatcher.dispatch(&mut view, SessionEvent::ParticipantConnected(bob()));
        assert!(view.registry().get(&bob().id).is_some());

        dispatcher.dispatch(&mut view, SessionEvent::ParticipantDisconnected(bob().id));
        assert!(view.registry().get(&bob().id).is_none());
        assert_eq!(view.participant_count_label(), "1 participant");
    }

    #[test]
    fn speakers_replace_previous_set() {
        let dispatcher = EventDispatcher::for_session(1);
        let mut view = view();
        let p1 = ParticipantInfo::new("P1", "one");
        let p2 = ParticipantInfo::new("P2", "two");
        dispatcher.dispatch(&mut view, SessionEvent::ParticipantConnected(p1.clone()));
        dispatcher.dispatch(&mut view, SessionEvent::ParticipantConnected(p2.clone()));

        dispatcher.dispatch(
            &mut view,
            SessionEvent::ActiveSpeakersChanged(vec![p1.id.clone(), p2.id.clone()]),
        );
        dispatcher.dispatch(&mut view, SessionEvent::ActiveSpeakersChanged(vec![p1.id.clone()]));

        assert!(view.registry().get(&p1.id).unwrap().is_speaking());
        assert!(!view.registry().get(&p2.id).unwrap().is_speaking());
    }

    #[test]
    fn disconnect_requests_teardown() {
        let dispatcher = EventDispatcher::for_session(1);
        let mut view = view();
        let effects =
            dispatcher.dispatch(&mut view, SessionEvent::Disconnected(DisconnectReason::RoomDeleted));
        assert_eq!(effects, vec![ViewEffect::Teardown(DisconnectReason::RoomDeleted)]);
    }

    #[test]
    fn blocked_playback_shows_prompt_once() {
        let dispatcher = EventDispatcher::for_session(1);
        let mut view = view();
        let blocked = SessionEvent::AudioPlaybackChanged { can_playback: false };

        dispatcher.dispatch(&mut view, blocked.clone());
        dispatcher.dispatch(&mut view, blocked);
        assert_eq!(view.audio_prompt(), AudioPrompt::Shown);

        dispatcher.dispatch(&mut view, SessionEvent::AudioPlaybackChanged { can_playback: true });
        assert_eq!(view.audio_prompt(), AudioPrompt::Hidden);
    }

    #[test]
    fn device_error_is_non_fatal() {
        let dispatcher = EventDispatcher::for_session(1);
        let mut view = view();
        dispatcher.dispatch(&mut view, subscribe(TrackSource::Camera, 1));

        let effects = dispatcher.dispatch(
            &mut view,
            SessionEvent::MediaDevicesError(MediaDeviceError {
                kind: "camera".into(),
                message: "device in use".into(),
            }),
        );

        assert_eq!(effects, vec![ViewEffect::ShowError("Media device error: device in use".into())]);
        assert_eq!(view.registry().len(), 1);
    }

    #[test]
    fn reconnect_only_touches_status() {
        let dispatcher = EventDispatcher::for_session(1);
        let mut view = view();
        dispatcher.dispatch(&mut view, subscribe(TrackSource::Camera, 1));

        dispatcher.dispatch(&mut view, SessionEvent::Reconnecting);
        assert_eq!(view.status(), StatusIndicator::Reconnecting);
        assert_eq!(view.registry().get(&bob().id).unwrap().mode(), TileMode::Media);

        dispatcher.dispatch(&mut view, SessionEvent::Reconnected);
        assert_eq!(view.status(), StatusIndicator::Connected);
    }

    #[test]
    fn local_unpublish_detaches_preview() {
        let dispatcher = EventDispatcher::for_session(1);
        let mut view = view();
        let local = ParticipantId::new("PA_local");
        view.local_source_enabled(
            TrackSource::Camera,
            Some(MediaElement::new(9, "MS_local", TrackSource::Camera)),
        );

        dispatcher.dispatch(&mut view, SessionEvent::LocalTrackUnpublished {
            track: TrackSid::new("TR_local"),
            source: TrackSource::Camera,
        });

        let tile = view.registry().get(&local).unwrap();
        assert_eq!(tile.mode(), TileMode::Placeholder);
        assert!(tile.elements().is_empty());
    }
}
