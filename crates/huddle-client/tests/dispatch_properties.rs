//! Property-based tests for session event dispatch.
//!
//! Arbitrary sequences of subscribe, unsubscribe, mute, join, leave, and
//! speaker events are fed through the dispatcher. After every event each
//! tile must agree with the participant record it was derived from.

use huddle_client::{EventDispatcher, RoomView, TileMode};
use huddle_core::{
    MediaElement, ParticipantId, ParticipantInfo, SessionEvent, SessionInfo, TrackSid, TrackSource,
};
use proptest::prelude::*;

const PARTICIPANTS: u8 = 4;

fn participant(index: u8) -> ParticipantInfo {
    ParticipantInfo::new(format!("PA_{index}"), format!("Guest {index}"))
}

fn source_strategy() -> impl Strategy<Value = TrackSource> {
    prop_oneof![
        Just(TrackSource::Camera),
        Just(TrackSource::Microphone),
        Just(TrackSource::ScreenShare),
        Just(TrackSource::ScreenShareAudio),
    ]
}

/// Generate session events over a small participant pool so the same
/// tiles get hit repeatedly.
fn event_strategy() -> impl Strategy<Value = SessionEvent> {
    let who = 0..PARTICIPANTS;
    prop_oneof![
        4 => (who.clone(), source_strategy(), 0u64..16).prop_map(|(p, source, element)| {
            SessionEvent::TrackSubscribed {
                participant: participant(p),
                track: TrackSid::new(format!("TR_{p}_{source}")),
                source,
                element: MediaElement::new(element, format!("MS_{p}_{source}"), source),
            }
        }),
        3 => (who.clone(), source_strategy()).prop_map(|(p, source)| {
            SessionEvent::TrackUnsubscribed {
                participant: participant(p).id,
                track: TrackSid::new(format!("TR_{p}_{source}")),
                source,
            }
        }),
        1 => (who.clone(), any::<bool>()).prop_map(|(p, muted)| {
            let participant = participant(p).id;
            let source = TrackSource::Microphone;
            if muted {
                SessionEvent::TrackMuted { participant, source }
            } else {
                SessionEvent::TrackUnmuted { participant, source }
            }
        }),
        1 => who.clone().prop_map(|p| SessionEvent::ParticipantConnected(participant(p))),
        1 => who.clone().prop_map(|p| SessionEvent::ParticipantDisconnected(participant(p).id)),
        1 => prop::collection::vec(who, 0..3).prop_map(|ps| {
            SessionEvent::ActiveSpeakersChanged(ps.into_iter().map(|p| participant(p).id).collect())
        }),
    ]
}

fn fresh_view() -> RoomView {
    RoomView::new(&SessionInfo {
        room_sid: "RM_prop".into(),
        room_name: "prop".into(),
        local: ParticipantInfo::new("PA_local", "me"),
        remote: Vec::new(),
    })
}

fn check_tiles(view: &RoomView) -> Result<(), TestCaseError> {
    for tile in view.registry().tiles() {
        let record = view.record(tile.participant());
        prop_assert!(record.is_some(), "tile without a record: {}", tile.participant());
        let Some(record) = record else { continue };

        let expected =
            if record.has_subscribed_av() { TileMode::Media } else { TileMode::Placeholder };
        prop_assert_eq!(tile.mode(), expected, "mode out of sync for {}", tile.participant());

        for (i, a) in tile.elements().iter().enumerate() {
            for b in &tile.elements()[i + 1..] {
                prop_assert!(!a.renders_same_media(b), "duplicate element on one tile");
            }
        }
    }
    for id in view.remote().keys() {
        prop_assert!(view.registry().get(id).is_some(), "record without a tile: {id}");
    }
    Ok(())
}

proptest! {
    #[test]
    fn prop_tiles_track_records(events in prop::collection::vec(event_strategy(), 0..60)) {
        let dispatcher = EventDispatcher::for_session(1);
        let mut view = fresh_view();

        for event in events {
            let _ = dispatcher.dispatch(&mut view, event);
            check_tiles(&view)?;
        }
    }

    #[test]
    fn prop_speakers_subset_of_tiles(events in prop::collection::vec(event_strategy(), 0..60)) {
        let dispatcher = EventDispatcher::for_session(1);
        let mut view = fresh_view();

        for event in events {
            let _ = dispatcher.dispatch(&mut view, event);
            let speaking: Vec<&ParticipantId> =
                view.registry().tiles().filter(|t| t.is_speaking()).map(|t| t.participant()).collect();
            for id in speaking {
                prop_assert!(view.registry().get(id).is_some());
            }
        }
    }

    #[test]
    fn prop_count_matches_remote_records(events in prop::collection::vec(event_strategy(), 0..60)) {
        let dispatcher = EventDispatcher::for_session(1);
        let mut view = fresh_view();

        for event in events {
            let _ = dispatcher.dispatch(&mut view, event);
            prop_assert_eq!(view.participant_count(), view.remote().len() + 1);
        }
    }
}

#[test]
fn leave_then_rejoin_starts_from_placeholder() {
    let dispatcher = EventDispatcher::for_session(7);
    let mut view = fresh_view();
    let bob = participant(1);

    dispatcher.dispatch(&mut view, SessionEvent::TrackSubscribed {
        participant: bob.clone(),
        track: TrackSid::new("TR_cam"),
        source: TrackSource::Camera,
        element: MediaElement::new(1, "MS_cam", TrackSource::Camera),
    });
    dispatcher.dispatch(&mut view, SessionEvent::ParticipantDisconnected(bob.id.clone()));
    dispatcher.dispatch(&mut view, SessionEvent::ParticipantConnected(bob.clone()));

    let tile = view.registry().get(&bob.id).unwrap();
    assert_eq!(tile.mode(), TileMode::Placeholder);
    assert!(tile.elements().is_empty());
    assert_eq!(dispatcher.generation(), 7);
}
