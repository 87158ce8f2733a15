//! Fuzz target for the App state machine
//!
//! Drives [`App::handle`] with arbitrary interleavings of user intents,
//! operation completions (including stale ones), and session events.
//!
//! # Invariants
//!
//! - The room screen is shown exactly when room state exists
//! - Every tile belongs to a participant record
//! - An idle client has clear toggles and no loading overlay
//! - A tile is in media mode only with a subscribed camera or microphone

#![no_main]

use arbitrary::Arbitrary;
use huddle_app::{App, AppConfig, AppEvent, ConnectionDetails, Screen};
use huddle_client::{MediaControl, TileMode};
use huddle_core::{
    ConnectError, DisconnectReason, MediaElement, MediaOperationError, ParticipantId,
    ParticipantInfo, SessionEvent, SessionInfo, SessionPhase, TrackSid, TrackSource,
};
use libfuzzer_sys::fuzz_target;

const PEOPLE: [(&str, &str); 3] = [("PA_a", "Ann Lee"), ("PA_b", "Bob Smith"), ("PA_c", "cy")];

#[derive(Debug, Clone, Copy, Arbitrary)]
enum Source {
    Camera,
    Microphone,
    ScreenShare,
}

impl Source {
    fn track(self) -> TrackSource {
        match self {
            Self::Camera => TrackSource::Camera,
            Self::Microphone => TrackSource::Microphone,
            Self::ScreenShare => TrackSource::ScreenShare,
        }
    }

    fn control(self) -> MediaControl {
        match self {
            Self::Camera => MediaControl::Camera,
            Self::Microphone => MediaControl::Microphone,
            Self::ScreenShare => MediaControl::ScreenShare,
        }
    }
}

#[derive(Debug, Clone, Arbitrary)]
enum Step {
    AutoConnect,
    ManualJoin { blank_name: bool },
    DetailsFetched,
    Connected { with_remote: bool },
    ConnectFailed,
    Toggle(Source),
    Toggled { source: Source, ok: bool },
    MicAutoEnabled { ok: bool },
    StartAudio,
    AudioStarted { can_playback: bool },
    Leave,
    Subscribe { who: u8, source: Source, element: u8 },
    Unsubscribe { who: u8, source: Source },
    Mute { who: u8, muted: bool },
    Join { who: u8 },
    Depart { who: u8 },
    Speakers(Vec<u8>),
    PlaybackChanged(bool),
    Reconnecting,
    Reconnected,
    ServerDisconnect,
}

fn person(who: u8) -> ParticipantInfo {
    let (id, identity) = PEOPLE[usize::from(who) % PEOPLE.len()];
    ParticipantInfo::new(id, identity)
}

fn event(step: Step) -> AppEvent {
    match step {
        Step::AutoConnect => AppEvent::AutoConnect,
        Step::ManualJoin { blank_name } => AppEvent::JoinSubmitted {
            room_name: "retro".into(),
            participant_name: if blank_name { "  ".into() } else { "Jane".into() },
            token: "token".into(),
        },
        Step::DetailsFetched => AppEvent::DetailsFetched(ConnectionDetails {
            server_url: "wss://media.example.com".into(),
            room_name: "standup".into(),
            participant_token: "token".into(),
            participant_name: "Jane".into(),
            ice_servers: None,
        }),
        Step::Connected { with_remote } => AppEvent::Connected(SessionInfo {
            room_sid: "RM_1".into(),
            room_name: "standup".into(),
            local: ParticipantInfo::new("PA_local", "Jane"),
            remote: if with_remote { vec![person(0)] } else { vec![] },
        }),
        Step::ConnectFailed => AppEvent::ConnectFailed(ConnectError::Signal("reset".into())),
        Step::Toggle(source) => AppEvent::Toggle(source.control()),
        Step::Toggled { source, ok } => AppEvent::MediaToggled {
            control: source.control(),
            result: if ok { Ok(None) } else { Err(MediaOperationError::PermissionDenied) },
        },
        Step::MicAutoEnabled { ok } => AppEvent::MicrophoneAutoEnabled(if ok {
            Ok(None)
        } else {
            Err(MediaOperationError::DeviceNotFound)
        }),
        Step::StartAudio => AppEvent::StartAudio,
        Step::AudioStarted { can_playback } => AppEvent::AudioStarted(Ok(can_playback)),
        Step::Leave => AppEvent::Leave,
        Step::Subscribe { who, source, element } => {
            let info = person(who);
            let stream = format!("MS_{}_{element}", info.id);
            AppEvent::Session(SessionEvent::TrackSubscribed {
                track: TrackSid::new(format!("TR_{}_{source:?}", info.id)),
                participant: info,
                source: source.track(),
                element: MediaElement::new(u64::from(element), stream, source.track()),
            })
        },
        Step::Unsubscribe { who, source } => {
            let id = person(who).id;
            AppEvent::Session(SessionEvent::TrackUnsubscribed {
                track: TrackSid::new(format!("TR_{id}_{source:?}")),
                participant: id,
                source: source.track(),
            })
        },
        Step::Mute { who, muted } => {
            let participant = person(who).id;
            let source = TrackSource::Microphone;
            AppEvent::Session(if muted {
                SessionEvent::TrackMuted { participant, source }
            } else {
                SessionEvent::TrackUnmuted { participant, source }
            })
        },
        Step::Join { who } => AppEvent::Session(SessionEvent::ParticipantConnected(person(who))),
        Step::Depart { who } => {
            AppEvent::Session(SessionEvent::ParticipantDisconnected(person(who).id))
        },
        Step::Speakers(who) => AppEvent::Session(SessionEvent::ActiveSpeakersChanged(
            who.into_iter().map(|w| person(w).id).collect::<Vec<ParticipantId>>(),
        )),
        Step::PlaybackChanged(can_playback) => {
            AppEvent::Session(SessionEvent::AudioPlaybackChanged { can_playback })
        },
        Step::Reconnecting => AppEvent::Session(SessionEvent::Reconnecting),
        Step::Reconnected => AppEvent::Session(SessionEvent::Reconnected),
        Step::ServerDisconnect => {
            AppEvent::Session(SessionEvent::Disconnected(DisconnectReason::ServerShutdown))
        },
    }
}

fn check(app: &App) {
    assert_eq!(app.screen() == Screen::Room, app.room().is_some());

    if app.phase() == SessionPhase::Idle {
        assert!(app.toggles().is_clear());
        assert!(!app.is_loading());
    }

    if let Some(room) = app.room() {
        for tile in room.registry().tiles() {
            let record = room.record(tile.participant());
            assert!(record.is_some(), "orphan tile for {}", tile.participant());
            if tile.mode() == TileMode::Media && tile.participant() != &room.local().info.id {
                assert!(record.is_some_and(|r| r.has_subscribed_av()));
            }
        }
    }
}

fuzz_target!(|steps: Vec<Step>| {
    let mut app = App::new(AppConfig::default());
    for step in steps {
        let _ = app.handle(event(step));
        check(&app);
    }

    let _ = app.handle(AppEvent::Leave);
    assert_eq!(app.phase(), SessionPhase::Idle);
    assert!(app.room().is_none());
});
