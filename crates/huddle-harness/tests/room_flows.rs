//! End-to-end room flows through the production runtime.
//!
//! Every test drives `huddle_app::Runtime` against the simulated media server
//! with the standard invariants checked on every render.

use huddle_app::{
    AppConfig, AppEvent, ConnectionDetails, DISCONNECTED_NOTICE, FetchError, Runtime, Screen,
    StaticDetailsSource,
};
use huddle_client::{AudioPrompt, ButtonState, MediaControl, TileMode};
use huddle_core::{
    ConnectError, DisconnectReason, FALLBACK_STUN_URLS, IceServer, MediaDeviceError,
    ParticipantInfo, SessionPhase, TrackSource,
};
use huddle_harness::{InvariantRegistry, SimDriver, SimMediaServer, run_until_quiet};

type SimRuntime = Runtime<SimDriver, SimMediaServer, StaticDetailsSource>;

fn details() -> ConnectionDetails {
    ConnectionDetails {
        server_url: "wss://media.example.com".into(),
        room_name: "standup".into(),
        participant_token: "token-auto".into(),
        participant_name: "Jane Doe".into(),
        ice_servers: None,
    }
}

fn bob() -> ParticipantInfo {
    ParticipantInfo::new("PA_bob", "Bob Smith")
}

fn runtime_with(server: &SimMediaServer, source: StaticDetailsSource) -> (SimRuntime, SimDriver) {
    let driver = SimDriver::new()
        .with_invariants(InvariantRegistry::standard())
        .with_server(server.clone());
    let handle = driver.clone();
    let runtime = Runtime::new(driver, AppConfig::default(), server.clone(), source);
    (runtime, handle)
}

async fn joined(server: &SimMediaServer) -> (SimRuntime, SimDriver) {
    let (mut runtime, driver) = runtime_with(server, StaticDetailsSource::new(details()));
    driver.inject_event(AppEvent::AutoConnect);
    run_until_quiet(&mut runtime, server).await.unwrap();
    (runtime, driver)
}

fn manual_join(room: &str, token: &str) -> AppEvent {
    AppEvent::JoinSubmitted {
        room_name: room.into(),
        participant_name: "Jane".into(),
        token: token.into(),
    }
}

#[tokio::test]
async fn auto_connect_joins_with_microphone() {
    let server = SimMediaServer::default().with_remote(bob());
    let (runtime, _driver) = joined(&server).await;

    let app = runtime.app();
    assert_eq!(app.screen(), Screen::Room);
    assert_eq!(app.phase(), SessionPhase::Connected);
    assert!(app.toggles().enabled(MediaControl::Microphone));
    assert_eq!(app.buttons().microphone, ButtonState::Active);

    let room = app.room().unwrap();
    assert_eq!(room.room_name(), "standup");
    assert_eq!(room.participant_count_label(), "2 participants");
    assert!(room.registry().get(room.local().id()).is_some());
    assert_eq!(room.registry().get(&bob().id).unwrap().mode(), TileMode::Placeholder);

    let connects = server.connects();
    assert_eq!(connects.len(), 1);
    assert_eq!(connects[0].url, "wss://media.example.com");
    assert_eq!(connects[0].token, "token-auto");
    assert_eq!(connects[0].ice_servers, vec![IceServer::new(FALLBACK_STUN_URLS)]);
    assert!(connects[0].auto_subscribe);
    assert_eq!(server.open_sessions(), 1);
}

#[tokio::test]
async fn server_ice_config_reaches_sdk() {
    let server = SimMediaServer::default();
    let turn = IceServer::new(["turn:turn.example.com:3478"]);
    let source = StaticDetailsSource::new(ConnectionDetails {
        ice_servers: Some(vec![turn.clone()]),
        ..details()
    });
    let (mut runtime, driver) = runtime_with(&server, source);

    driver.inject_event(AppEvent::AutoConnect);
    run_until_quiet(&mut runtime, &server).await.unwrap();

    assert_eq!(server.connects()[0].ice_servers, vec![turn]);
}

#[tokio::test]
async fn remote_tracks_drive_tile_mode() {
    let server = SimMediaServer::default();
    let (mut runtime, _driver) = joined(&server).await;

    server.join(bob());
    server.publish(&bob(), TrackSource::Camera);
    server.publish(&bob(), TrackSource::Microphone);
    run_until_quiet(&mut runtime, &server).await.unwrap();

    let tile = runtime.app().room().unwrap().registry().get(&bob().id).unwrap().clone();
    assert_eq!(tile.mode(), TileMode::Media);
    assert_eq!(tile.elements().len(), 2);

    server.unpublish(&bob().id, TrackSource::Camera);
    run_until_quiet(&mut runtime, &server).await.unwrap();
    let tile = runtime.app().room().unwrap().registry().get(&bob().id).unwrap().clone();
    assert_eq!(tile.mode(), TileMode::Media);

    server.unpublish(&bob().id, TrackSource::Microphone);
    run_until_quiet(&mut runtime, &server).await.unwrap();
    let tile = runtime.app().room().unwrap().registry().get(&bob().id).unwrap().clone();
    assert_eq!(tile.mode(), TileMode::Placeholder);
    assert_eq!(tile.initials(), "BS");
}

#[tokio::test]
async fn mute_and_speakers_update_tiles() {
    let carol = ParticipantInfo::new("PA_carol", "Carol");
    let server = SimMediaServer::default().with_remote(bob()).with_remote(carol.clone());
    let (mut runtime, _driver) = joined(&server).await;

    server.publish(&bob(), TrackSource::Microphone);
    server.set_muted(&bob().id, TrackSource::Microphone, true);
    server.speakers(&[bob().id, carol.id.clone()]);
    run_until_quiet(&mut runtime, &server).await.unwrap();

    let registry = runtime.app().room().unwrap().registry();
    assert!(registry.get(&bob().id).unwrap().is_muted());
    assert!(registry.get(&bob().id).unwrap().is_speaking());
    assert!(registry.get(&carol.id).unwrap().is_speaking());

    server.speakers(&[bob().id]);
    run_until_quiet(&mut runtime, &server).await.unwrap();
    let registry = runtime.app().room().unwrap().registry();
    assert!(registry.get(&bob().id).unwrap().is_speaking());
    assert!(!registry.get(&carol.id).unwrap().is_speaking());
}

#[tokio::test]
async fn participant_leave_removes_tile() {
    let server = SimMediaServer::default().with_remote(bob());
    let (mut runtime, _driver) = joined(&server).await;

    server.leave(&bob().id);
    run_until_quiet(&mut runtime, &server).await.unwrap();

    let room = runtime.app().room().unwrap();
    assert!(room.registry().get(&bob().id).is_none());
    assert_eq!(room.participant_count_label(), "1 participant");
}

#[tokio::test]
async fn endpoint_failure_keeps_form() {
    let server = SimMediaServer::default();
    let (mut runtime, driver) =
        runtime_with(&server, StaticDetailsSource::failing(FetchError::Status(500)));

    driver.inject_event(AppEvent::AutoConnect);
    run_until_quiet(&mut runtime, &server).await.unwrap();

    let app = runtime.app();
    assert_eq!(app.screen(), Screen::Form);
    assert!(!app.is_loading());
    assert_eq!(app.error_banner(), Some("Failed to connect: HTTP 500"));
    assert_eq!(server.sessions_opened(), 0);
}

#[tokio::test]
async fn rejected_manual_join_shows_error() {
    let server = SimMediaServer::default();
    server.fail_connects(Some(ConnectError::Rejected { code: 401, message: "bad token".into() }));
    let (mut runtime, driver) = runtime_with(&server, StaticDetailsSource::new(details()));

    driver.inject_event(manual_join("standup", "bad"));
    run_until_quiet(&mut runtime, &server).await.unwrap();

    let app = runtime.app();
    assert_eq!(app.screen(), Screen::Form);
    assert_eq!(
        app.error_banner(),
        Some("Failed to join room: server rejected join (401): bad token")
    );
    assert_eq!(server.connects()[0].url, huddle_app::DEFAULT_SERVER_URL);
}

#[tokio::test]
async fn camera_toggle_shows_mirrored_preview() {
    let server = SimMediaServer::default();
    let (mut runtime, driver) = joined(&server).await;

    driver.inject_event(AppEvent::Toggle(MediaControl::Camera));
    run_until_quiet(&mut runtime, &server).await.unwrap();

    let room = runtime.app().room().unwrap();
    let tile = room.registry().get(room.local().id()).unwrap();
    assert_eq!(tile.mode(), TileMode::Media);
    assert!(tile.elements().iter().all(|e| e.mirrored));
    assert_eq!(runtime.app().buttons().camera, ButtonState::Active);

    driver.inject_event(AppEvent::Toggle(MediaControl::Camera));
    run_until_quiet(&mut runtime, &server).await.unwrap();

    let room = runtime.app().room().unwrap();
    let tile = room.registry().get(room.local().id()).unwrap();
    assert_eq!(tile.mode(), TileMode::Placeholder);
    assert_eq!(runtime.app().buttons().camera, ButtonState::Disabled);
}

#[tokio::test]
async fn failed_microphone_toggle_reverts() {
    let server = SimMediaServer::default();
    let (mut runtime, driver) = joined(&server).await;
    server.fail_source(TrackSource::Microphone);

    driver.inject_event(AppEvent::Toggle(MediaControl::Microphone));
    run_until_quiet(&mut runtime, &server).await.unwrap();

    let app = runtime.app();
    assert!(app.toggles().enabled(MediaControl::Microphone));
    assert_eq!(app.buttons().microphone, ButtonState::Active);
    assert_eq!(app.error_banner(), Some("Failed to toggle microphone"));
}

#[tokio::test]
async fn failed_auto_enable_leaves_microphone_off() {
    let server = SimMediaServer::default();
    server.fail_source(TrackSource::Microphone);
    let (runtime, _driver) = joined(&server).await;

    let app = runtime.app();
    assert_eq!(app.screen(), Screen::Room);
    assert_eq!(app.buttons().microphone, ButtonState::Disabled);
    assert!(app.error_banner().is_none());
}

#[tokio::test]
async fn leave_is_idempotent() {
    let server = SimMediaServer::default().with_remote(bob());
    let (mut runtime, driver) = joined(&server).await;

    driver.inject_event(AppEvent::Leave);
    driver.inject_event(AppEvent::Leave);
    run_until_quiet(&mut runtime, &server).await.unwrap();

    let app = runtime.app();
    assert_eq!(app.phase(), SessionPhase::Idle);
    assert_eq!(app.screen(), Screen::Form);
    assert!(app.room().is_none());
    assert!(app.toggles().is_clear());
    assert_eq!(server.open_sessions(), 0);
    assert!(!runtime.controller().is_active());
}

#[tokio::test]
async fn server_disconnect_returns_to_form() {
    let server = SimMediaServer::default();
    let (mut runtime, _driver) = joined(&server).await;

    server.end_session(DisconnectReason::ServerShutdown);
    run_until_quiet(&mut runtime, &server).await.unwrap();

    let app = runtime.app();
    assert_eq!(app.screen(), Screen::Form);
    assert_eq!(app.error_banner(), Some(DISCONNECTED_NOTICE));
    assert_eq!(server.open_sessions(), 0);
}

#[tokio::test]
async fn last_join_wins() {
    let server = SimMediaServer::default();
    server.hold_connects();
    let (mut runtime, driver) = runtime_with(&server, StaticDetailsSource::new(details()));

    driver.inject_event(manual_join("alpha", "token-a"));
    run_until_quiet(&mut runtime, &server).await.unwrap();
    driver.inject_event(manual_join("beta", "token-b"));
    run_until_quiet(&mut runtime, &server).await.unwrap();
    assert!(runtime.app().is_loading());

    server.release_connects();
    run_until_quiet(&mut runtime, &server).await.unwrap();

    let connects = server.connects();
    assert_eq!(connects.len(), 1);
    assert_eq!(connects[0].token, "token-b");
    assert_eq!(runtime.app().room().unwrap().room_name(), "beta");
    assert_eq!(server.open_sessions(), 1);
}

#[tokio::test]
async fn leave_cancels_pending_join() {
    let server = SimMediaServer::default();
    server.hold_connects();
    let (mut runtime, driver) = runtime_with(&server, StaticDetailsSource::new(details()));

    driver.inject_event(manual_join("alpha", "token-a"));
    driver.inject_event(AppEvent::Leave);
    run_until_quiet(&mut runtime, &server).await.unwrap();
    server.release_connects();
    run_until_quiet(&mut runtime, &server).await.unwrap();

    assert!(!runtime.has_pending_join());
    assert_eq!(server.sessions_opened(), 0);
    assert_eq!(runtime.app().screen(), Screen::Form);
}

#[tokio::test]
async fn rejoin_replaces_open_session() {
    let server = SimMediaServer::default();
    let (mut runtime, driver) = joined(&server).await;

    driver.inject_event(manual_join("retro", "token-r"));
    run_until_quiet(&mut runtime, &server).await.unwrap();

    assert_eq!(server.sessions_opened(), 2);
    assert_eq!(server.open_sessions(), 1);
    assert_eq!(runtime.controller().generation(), 2);
    assert_eq!(runtime.app().room().unwrap().room_name(), "retro");
}

#[tokio::test]
async fn blocked_audio_needs_gesture() {
    let server = SimMediaServer::default();
    server.block_playback();
    let (mut runtime, driver) = joined(&server).await;

    assert_eq!(runtime.app().room().unwrap().audio_prompt(), AudioPrompt::Shown);

    driver.inject_event(AppEvent::StartAudio);
    run_until_quiet(&mut runtime, &server).await.unwrap();
    assert_eq!(runtime.app().room().unwrap().audio_prompt(), AudioPrompt::Hidden);
}

#[tokio::test]
async fn denied_audio_keeps_prompt() {
    let server = SimMediaServer::default();
    server.deny_playback();
    let (mut runtime, driver) = joined(&server).await;

    driver.inject_event(AppEvent::StartAudio);
    run_until_quiet(&mut runtime, &server).await.unwrap();
    assert_eq!(runtime.app().room().unwrap().audio_prompt(), AudioPrompt::Shown);
}

#[tokio::test]
async fn leave_while_camera_operation_hangs() {
    let server = SimMediaServer::default();
    let (mut runtime, driver) = joined(&server).await;
    server.stall_source(TrackSource::Camera);

    driver.inject_event(AppEvent::Toggle(MediaControl::Camera));
    run_until_quiet(&mut runtime, &server).await.unwrap();
    assert_eq!(runtime.pending_media(), 1);
    assert_eq!(server.parked_operations(), 1);

    driver.inject_event(AppEvent::Leave);
    run_until_quiet(&mut runtime, &server).await.unwrap();

    let app = runtime.app();
    assert!(!driver.has_pending());
    assert_eq!(app.screen(), Screen::Form);
    assert_eq!(app.phase(), SessionPhase::Idle);
    assert!(app.toggles().is_clear());
    assert_eq!(server.open_sessions(), 0);
    assert_eq!(runtime.pending_media(), 0);
    assert_eq!(server.parked_operations(), 0);
}

#[tokio::test]
async fn session_events_flow_while_camera_operation_hangs() {
    let server = SimMediaServer::default();
    let (mut runtime, driver) = joined(&server).await;
    server.stall_source(TrackSource::Camera);

    driver.inject_event(AppEvent::Toggle(MediaControl::Camera));
    run_until_quiet(&mut runtime, &server).await.unwrap();
    server.join(bob());
    run_until_quiet(&mut runtime, &server).await.unwrap();
    assert!(runtime.app().room().unwrap().registry().get(&bob().id).is_some());

    server.release_source(TrackSource::Camera);
    run_until_quiet(&mut runtime, &server).await.unwrap();

    let room = runtime.app().room().unwrap();
    assert_eq!(room.registry().get(room.local().id()).unwrap().mode(), TileMode::Media);
    assert_eq!(runtime.app().buttons().camera, ButtonState::Active);
    assert_eq!(runtime.pending_media(), 0);
}

#[tokio::test]
async fn media_result_from_replaced_session_is_dropped() {
    let server = SimMediaServer::default();
    let (mut runtime, driver) = joined(&server).await;
    server.stall_source(TrackSource::Camera);

    driver.inject_event(AppEvent::Toggle(MediaControl::Camera));
    run_until_quiet(&mut runtime, &server).await.unwrap();
    driver.inject_event(manual_join("retro", "token-r"));
    run_until_quiet(&mut runtime, &server).await.unwrap();
    assert_eq!(runtime.controller().generation(), 2);

    driver.inject_event(AppEvent::Toggle(MediaControl::Camera));
    run_until_quiet(&mut runtime, &server).await.unwrap();
    assert_eq!(runtime.pending_media(), 2);

    server.release_source(TrackSource::Camera);
    run_until_quiet(&mut runtime, &server).await.unwrap();

    let app = runtime.app();
    assert!(app.error_banner().is_none());
    assert_eq!(app.buttons().camera, ButtonState::Active);
    assert_eq!(app.room().unwrap().room_name(), "retro");
    assert_eq!(runtime.pending_media(), 0);
}

#[tokio::test]
async fn device_error_shows_banner() {
    let server = SimMediaServer::default();
    let (mut runtime, _driver) = joined(&server).await;

    server.device_error(MediaDeviceError {
        kind: "NotReadableError".into(),
        message: "camera in use".into(),
    });
    run_until_quiet(&mut runtime, &server).await.unwrap();

    assert_eq!(runtime.app().error_banner(), Some("Media device error: camera in use"));
    assert_eq!(runtime.app().screen(), Screen::Room);
}

#[tokio::test]
async fn reconnect_keeps_room() {
    let server = SimMediaServer::default().with_remote(bob());
    let (mut runtime, _driver) = joined(&server).await;

    server.reconnect_cycle();
    run_until_quiet(&mut runtime, &server).await.unwrap();

    assert_eq!(runtime.app().phase(), SessionPhase::Connected);
    assert!(runtime.app().room().unwrap().registry().get(&bob().id).is_some());
}

#[tokio::test]
async fn quit_stops_loop() {
    let server = SimMediaServer::default();
    let (mut runtime, driver) = joined(&server).await;

    driver.inject_event(AppEvent::Quit);
    assert!(run_until_quiet(&mut runtime, &server).await.unwrap());
}

#[tokio::test]
async fn remote_tile_snapshot() {
    let server = SimMediaServer::default();
    let (mut runtime, driver) = joined(&server).await;

    server.join(bob());
    server.publish(&bob(), TrackSource::Camera);
    server.speakers(&[bob().id]);
    run_until_quiet(&mut runtime, &server).await.unwrap();
    driver.inject_tick();
    driver.inject_event(AppEvent::Resize(120, 40));
    run_until_quiet(&mut runtime, &server).await.unwrap();

    let snapshot = driver.last_snapshot().unwrap();
    let room = snapshot.room.unwrap();
    let tile = room.participants.iter().find(|p| p.id == bob().id).unwrap().tile.clone();
    insta::assert_json_snapshot!(tile, @r#"
    {
      "media": true,
      "elements": 1,
      "distinct_streams": 1,
      "initials": "BS",
      "muted": false,
      "speaking": true
    }
    "#);
}
