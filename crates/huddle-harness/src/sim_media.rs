//! Scripted in-process media server.
//!
//! [`SimMediaServer`] implements [`MediaConnector`] so the production
//! [`huddle_app::RoomSessionController`] can open sessions against it. Tests
//! script the room from the outside: add remote participants, publish
//! tracks, block audio playback, stall local media operations, or end the
//! session. Every open [`SimSession`] is counted so invariants can check
//! that at most one session is alive.

#![allow(clippy::disallowed_types, reason = "Synchronous locking operations only")]

use std::{
    collections::HashSet,
    sync::{
        Arc, Mutex, MutexGuard, PoisonError,
        atomic::{AtomicBool, Ordering},
    },
};

use huddle_core::{
    ConnectError, ConnectOptions, ConnectionQuality, DisconnectReason, IceServer, LocalMedia,
    MediaConnector, MediaDeviceError, MediaElement, MediaOperationError, MediaSession,
    ParticipantId, ParticipantInfo, RoomOptions, SessionEvent, SessionInfo, TrackSid,
    TrackSource,
};
use tokio::sync::{mpsc, watch};

/// What the last connect attempt asked for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectRecord {
    /// Server URL.
    pub url: String,
    /// Access token.
    pub token: String,
    /// ICE servers handed to the SDK.
    pub ice_servers: Vec<IceServer>,
    /// Auto-subscribe flag.
    pub auto_subscribe: bool,
}

struct ServerState {
    room_name: String,
    local_identity: String,
    remote: Vec<ParticipantInfo>,
    connect_failure: Option<ConnectError>,
    source_failures: HashSet<TrackSource>,
    playback_blocked: bool,
    playback_denied: bool,
    open_sessions: usize,
    sessions_opened: u64,
    next_element: u64,
    queued_events: usize,
    parked_operations: usize,
    current: Option<(u64, mpsc::UnboundedSender<SessionEvent>)>,
    connects: Vec<ConnectRecord>,
}

fn lock_state(state: &Mutex<ServerState>) -> MutexGuard<'_, ServerState> {
    state.lock().unwrap_or_else(PoisonError::into_inner)
}

impl ServerState {
    fn element(&mut self, stream: String, source: TrackSource) -> MediaElement {
        self.next_element += 1;
        MediaElement::new(self.next_element, stream, source)
    }

    fn emit(&mut self, event: SessionEvent) -> bool {
        let Some((_, tx)) = &self.current else {
            tracing::debug!(kind = ?event.kind(), "no open session, event dropped");
            return false;
        };
        if tx.send(event).is_ok() {
            self.queued_events += 1;
            true
        } else {
            false
        }
    }
}

/// Scripted media server shared by a test and the sessions it opens.
#[derive(Clone)]
pub struct SimMediaServer {
    state: Arc<Mutex<ServerState>>,
    gate: Arc<watch::Sender<bool>>,
    stalls: Arc<watch::Sender<HashSet<TrackSource>>>,
}

impl Default for SimMediaServer {
    fn default() -> Self {
        Self::new("standup")
    }
}

impl SimMediaServer {
    /// Server hosting one room with no remote participants.
    pub fn new(room_name: impl Into<String>) -> Self {
        let (gate, _) = watch::channel(true);
        let (stalls, _) = watch::channel(HashSet::new());
        Self {
            state: Arc::new(Mutex::new(ServerState {
                room_name: room_name.into(),
                local_identity: "local".into(),
                remote: Vec::new(),
                connect_failure: None,
                source_failures: HashSet::new(),
                playback_blocked: false,
                playback_denied: false,
                open_sessions: 0,
                sessions_opened: 0,
                next_element: 0,
                queued_events: 0,
                parked_operations: 0,
                current: None,
                connects: Vec::new(),
            })),
            gate: Arc::new(gate),
            stalls: Arc::new(stalls),
        }
    }

    fn lock(&self) -> MutexGuard<'_, ServerState> {
        lock_state(&self.state)
    }

    /// Add a participant already in the room when the next session opens.
    #[must_use]
    pub fn with_remote(self, info: ParticipantInfo) -> Self {
        self.lock().remote.push(info);
        self
    }

    /// Identity assigned to the local participant.
    #[must_use]
    pub fn with_local_identity(self, identity: impl Into<String>) -> Self {
        self.lock().local_identity = identity.into();
        self
    }

    /// Fail every connect with `error`. `None` lets connects through.
    pub fn fail_connects(&self, error: Option<ConnectError>) {
        self.lock().connect_failure = error;
    }

    /// Fail enabling or disabling `source`.
    pub fn fail_source(&self, source: TrackSource) {
        self.lock().source_failures.insert(source);
    }

    /// Let `source` operations succeed again.
    pub fn restore_source(&self, source: TrackSource) {
        self.lock().source_failures.remove(&source);
    }

    /// Park enabling or disabling `source` until
    /// [`release_source`](Self::release_source).
    pub fn stall_source(&self, source: TrackSource) {
        self.stalls.send_modify(|stalled| {
            stalled.insert(source);
        });
    }

    /// Let parked `source` operations finish.
    pub fn release_source(&self, source: TrackSource) {
        self.stalls.send_modify(|stalled| {
            stalled.remove(&source);
        });
    }

    /// Local media operations currently parked on a stalled source.
    pub fn parked_operations(&self) -> usize {
        self.lock().parked_operations
    }

    /// Block audio playback until a user gesture.
    ///
    /// Sessions opened afterwards report the block as their first event.
    pub fn block_playback(&self) {
        let mut state = self.lock();
        state.playback_blocked = true;
        state.emit(SessionEvent::AudioPlaybackChanged { can_playback: false });
    }

    /// Keep playback blocked even after a user gesture.
    pub fn deny_playback(&self) {
        let mut state = self.lock();
        state.playback_denied = true;
        state.playback_blocked = true;
        state.emit(SessionEvent::AudioPlaybackChanged { can_playback: false });
    }

    /// Park connect attempts until [`release_connects`](Self::release_connects).
    pub fn hold_connects(&self) {
        self.gate.send_replace(false);
    }

    /// Let parked connect attempts finish.
    pub fn release_connects(&self) {
        self.gate.send_replace(true);
    }

    /// Whether connect attempts are parked.
    pub fn connects_held(&self) -> bool {
        !*self.gate.borrow()
    }

    /// A remote participant joins.
    pub fn join(&self, info: ParticipantInfo) {
        let mut state = self.lock();
        if !state.remote.iter().any(|p| p.id == info.id) {
            state.remote.push(info.clone());
        }
        state.emit(SessionEvent::ParticipantConnected(info));
    }

    /// A remote participant leaves.
    pub fn leave(&self, participant: &ParticipantId) {
        let mut state = self.lock();
        state.remote.retain(|p| p.id != *participant);
        state.emit(SessionEvent::ParticipantDisconnected(participant.clone()));
    }

    /// A remote participant publishes `source` and the client subscribes.
    pub fn publish(&self, info: &ParticipantInfo, source: TrackSource) {
        let mut state = self.lock();
        let element = state.element(stream_id(&info.id, source), source);
        state.emit(SessionEvent::TrackSubscribed {
            participant: info.clone(),
            track: track_sid(&info.id, source),
            source,
            element,
        });
    }

    /// A remote participant stops publishing `source`.
    pub fn unpublish(&self, participant: &ParticipantId, source: TrackSource) {
        self.lock().emit(SessionEvent::TrackUnsubscribed {
            participant: participant.clone(),
            track: track_sid(participant, source),
            source,
        });
    }

    /// A remote participant mutes or unmutes `source`.
    pub fn set_muted(&self, participant: &ParticipantId, source: TrackSource, muted: bool) {
        let participant = participant.clone();
        let event = if muted {
            SessionEvent::TrackMuted { participant, source }
        } else {
            SessionEvent::TrackUnmuted { participant, source }
        };
        self.lock().emit(event);
    }

    /// The set of active speakers changes.
    pub fn speakers(&self, speakers: &[ParticipantId]) {
        self.lock().emit(SessionEvent::ActiveSpeakersChanged(speakers.to_vec()));
    }

    /// Link quality report.
    pub fn quality(&self, participant: &ParticipantId, quality: ConnectionQuality) {
        self.lock().emit(SessionEvent::ConnectionQualityChanged {
            participant: participant.clone(),
            quality,
        });
    }

    /// A capture device fails.
    pub fn device_error(&self, error: MediaDeviceError) {
        self.lock().emit(SessionEvent::MediaDevicesError(error));
    }

    /// Signaling drops and recovers.
    pub fn reconnect_cycle(&self) {
        let mut state = self.lock();
        state.emit(SessionEvent::Reconnecting);
        state.emit(SessionEvent::Reconnected);
    }

    /// The server ends the open session.
    pub fn end_session(&self, reason: DisconnectReason) {
        let mut state = self.lock();
        state.emit(SessionEvent::Disconnected(reason));
        state.current = None;
    }

    /// Sessions currently open.
    pub fn open_sessions(&self) -> usize {
        self.lock().open_sessions
    }

    /// Sessions opened since start.
    pub fn sessions_opened(&self) -> u64 {
        self.lock().sessions_opened
    }

    /// Events emitted but not yet consumed by a session.
    pub fn queued_events(&self) -> usize {
        self.lock().queued_events
    }

    /// Every connect attempt that reached the server, oldest first.
    pub fn connects(&self) -> Vec<ConnectRecord> {
        self.lock().connects.clone()
    }
}

impl MediaConnector for SimMediaServer {
    type Session = SimSession;

    async fn connect(
        &self,
        url: &str,
        token: &str,
        options: RoomOptions,
        connect: ConnectOptions,
    ) -> Result<SimSession, ConnectError> {
        let mut gate = self.gate.subscribe();
        if gate.wait_for(|open| *open).await.is_err() {
            return Err(ConnectError::Signal("server shut down".into()));
        }

        let mut state = self.lock();
        state.connects.push(ConnectRecord {
            url: url.to_owned(),
            token: token.to_owned(),
            ice_servers: options.rtc_config.ice_servers.clone(),
            auto_subscribe: connect.auto_subscribe,
        });
        if let Some(error) = state.connect_failure.clone() {
            tracing::debug!(%error, "simulated connect failure");
            return Err(error);
        }

        state.sessions_opened += 1;
        state.open_sessions += 1;
        let id = state.sessions_opened;
        let info = SessionInfo {
            room_sid: format!("RM_{id}"),
            room_name: state.room_name.clone(),
            local: ParticipantInfo::new(format!("PA_local_{id}"), state.local_identity.clone()),
            remote: state.remote.clone(),
        };

        let (tx, events) = mpsc::unbounded_channel();
        state.current = Some((id, tx));
        if state.playback_blocked {
            state.emit(SessionEvent::AudioPlaybackChanged { can_playback: false });
        }
        tracing::debug!(session = id, room = %info.room_name, "simulated session opened");

        let local = SimLocalMedia {
            session: id,
            participant: info.local.id.clone(),
            open: Arc::new(AtomicBool::new(true)),
            server: Arc::clone(&self.state),
            stalls: Arc::clone(&self.stalls),
        };
        Ok(SimSession { info, events, local })
    }
}

/// Session opened against a [`SimMediaServer`].
pub struct SimSession {
    info: SessionInfo,
    events: mpsc::UnboundedReceiver<SessionEvent>,
    local: SimLocalMedia,
}

impl SimSession {
    fn close(&mut self) {
        if !self.local.open.swap(false, Ordering::AcqRel) {
            return;
        }

        let id = self.local.session;
        let mut state = self.local.lock();
        state.open_sessions = state.open_sessions.saturating_sub(1);
        if state.current.as_ref().is_some_and(|(current, _)| *current == id) {
            state.current = None;
        }
        state.queued_events = state.queued_events.saturating_sub(self.events.len());
        tracing::debug!(session = id, "simulated session closed");
    }
}

impl MediaSession for SimSession {
    type Local = SimLocalMedia;

    fn info(&self) -> &SessionInfo {
        &self.info
    }

    fn local_media(&self) -> SimLocalMedia {
        self.local.clone()
    }

    async fn next_event(&mut self) -> Option<SessionEvent> {
        if !self.local.is_open() {
            return None;
        }
        let event = self.events.recv().await?;
        let mut state = self.local.lock();
        state.queued_events = state.queued_events.saturating_sub(1);
        Some(event)
    }

    async fn disconnect(&mut self) {
        self.close();
    }
}

impl Drop for SimSession {
    fn drop(&mut self) {
        self.close();
    }
}

/// Local media handle of a [`SimSession`].
#[derive(Clone)]
pub struct SimLocalMedia {
    session: u64,
    participant: ParticipantId,
    open: Arc<AtomicBool>,
    server: Arc<Mutex<ServerState>>,
    stalls: Arc<watch::Sender<HashSet<TrackSource>>>,
}

impl SimLocalMedia {
    fn lock(&self) -> MutexGuard<'_, ServerState> {
        lock_state(&self.server)
    }

    fn is_open(&self) -> bool {
        self.open.load(Ordering::Acquire)
    }

    async fn wait_for_source(&self, source: TrackSource) {
        let mut stalls = self.stalls.subscribe();
        let stalled = stalls.borrow().contains(&source);
        if !stalled {
            return;
        }

        let _parked = ParkedOperation::new(&self.server);
        tracing::debug!(session = self.session, ?source, "media operation parked");
        // The sender lives as long as this handle.
        let _ = stalls.wait_for(|stalled| !stalled.contains(&source)).await;
    }
}

impl LocalMedia for SimLocalMedia {
    async fn set_source_enabled(
        self,
        source: TrackSource,
        enabled: bool,
    ) -> Result<Option<MediaElement>, MediaOperationError> {
        self.wait_for_source(source).await;
        if !self.is_open() {
            return Err(MediaOperationError::NotConnected);
        }

        let mut state = self.lock();
        if state.source_failures.contains(&source) {
            return Err(MediaOperationError::PermissionDenied);
        }

        let track = track_sid(&self.participant, source);
        if !enabled {
            state.emit(SessionEvent::LocalTrackUnpublished { track, source });
            return Ok(None);
        }

        state.emit(SessionEvent::LocalTrackPublished { track, source });
        if source.kind() == huddle_core::TrackKind::Video {
            Ok(Some(state.element(stream_id(&self.participant, source), source)))
        } else {
            Ok(None)
        }
    }

    async fn start_audio(self) -> Result<(), MediaOperationError> {
        if !self.is_open() {
            return Err(MediaOperationError::NotConnected);
        }
        let mut state = self.lock();
        state.playback_blocked = state.playback_denied;
        Ok(())
    }

    fn can_playback_audio(&self) -> bool {
        !self.lock().playback_blocked
    }
}

/// Counts an operation as parked while alive.
struct ParkedOperation(Arc<Mutex<ServerState>>);

impl ParkedOperation {
    fn new(server: &Arc<Mutex<ServerState>>) -> Self {
        lock_state(server).parked_operations += 1;
        Self(Arc::clone(server))
    }
}

impl Drop for ParkedOperation {
    fn drop(&mut self) {
        let mut state = lock_state(&self.0);
        state.parked_operations = state.parked_operations.saturating_sub(1);
    }
}

fn track_sid(participant: &ParticipantId, source: TrackSource) -> TrackSid {
    TrackSid::new(format!("TR_{participant}_{source:?}"))
}

fn stream_id(participant: &ParticipantId, source: TrackSource) -> String {
    format!("MS_{participant}_{source:?}")
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    fn connect(server: &SimMediaServer) -> impl Future<Output = Result<SimSession, ConnectError>> {
        server.connect(
            "wss://media.example.com",
            "token",
            RoomOptions::default(),
            ConnectOptions::default(),
        )
    }

    #[tokio::test]
    async fn sessions_are_counted() {
        let server = SimMediaServer::default();
        let mut first = connect(&server).await.unwrap();
        let second = connect(&server).await.unwrap();
        assert_eq!(server.open_sessions(), 2);

        first.disconnect().await;
        first.disconnect().await;
        assert_eq!(server.open_sessions(), 1);

        drop(second);
        assert_eq!(server.open_sessions(), 0);
        assert_eq!(server.sessions_opened(), 2);
    }

    #[tokio::test]
    async fn scripted_events_reach_current_session() {
        let bob = ParticipantInfo::new("PA_bob", "Bob");
        let server = SimMediaServer::default();
        let mut session = connect(&server).await.unwrap();

        server.join(bob.clone());
        server.publish(&bob, TrackSource::Camera);
        assert_eq!(server.queued_events(), 2);

        assert_eq!(session.next_event().await, Some(SessionEvent::ParticipantConnected(bob)));
        assert!(matches!(
            session.next_event().await,
            Some(SessionEvent::TrackSubscribed { source: TrackSource::Camera, .. })
        ));
        assert_eq!(server.queued_events(), 0);
    }

    #[tokio::test]
    async fn ending_session_closes_stream() {
        let server = SimMediaServer::default();
        let mut session = connect(&server).await.unwrap();

        server.end_session(DisconnectReason::ServerShutdown);
        assert_eq!(
            session.next_event().await,
            Some(SessionEvent::Disconnected(DisconnectReason::ServerShutdown))
        );
        assert_eq!(session.next_event().await, None);
    }

    #[tokio::test]
    async fn source_failure_is_reported() {
        let server = SimMediaServer::default();
        let session = connect(&server).await.unwrap();
        server.fail_source(TrackSource::Microphone);

        assert_eq!(
            session.local_media().set_source_enabled(TrackSource::Microphone, true).await,
            Err(MediaOperationError::PermissionDenied)
        );
        let preview =
            session.local_media().set_source_enabled(TrackSource::Camera, true).await.unwrap();
        assert!(preview.is_some());
    }

    #[tokio::test]
    async fn stalled_source_parks_until_released() {
        let server = SimMediaServer::default();
        let session = connect(&server).await.unwrap();
        server.stall_source(TrackSource::Camera);

        let camera =
            tokio::spawn(session.local_media().set_source_enabled(TrackSource::Camera, true));
        tokio::time::sleep(Duration::from_millis(10)).await;
        assert_eq!(server.parked_operations(), 1);
        assert!(!camera.is_finished());

        let mic = session.local_media().set_source_enabled(TrackSource::Microphone, true).await;
        assert_eq!(mic, Ok(None));

        server.release_source(TrackSource::Camera);
        assert!(camera.await.unwrap().unwrap().is_some());
        assert_eq!(server.parked_operations(), 0);
    }

    #[tokio::test]
    async fn dropped_operation_is_no_longer_parked() {
        let server = SimMediaServer::default();
        let session = connect(&server).await.unwrap();
        server.stall_source(TrackSource::ScreenShare);

        let share =
            tokio::spawn(session.local_media().set_source_enabled(TrackSource::ScreenShare, true));
        tokio::time::sleep(Duration::from_millis(10)).await;
        assert_eq!(server.parked_operations(), 1);

        share.abort();
        let _ = share.await;
        assert_eq!(server.parked_operations(), 0);
    }

    #[tokio::test]
    async fn operations_after_close_are_not_connected() {
        let server = SimMediaServer::default();
        let mut session = connect(&server).await.unwrap();
        let local = session.local_media();
        server.block_playback();
        assert!(!local.can_playback_audio());

        session.disconnect().await;
        assert_eq!(local.clone().start_audio().await, Err(MediaOperationError::NotConnected));
        assert_eq!(
            local.set_source_enabled(TrackSource::Camera, true).await,
            Err(MediaOperationError::NotConnected)
        );
    }

    #[tokio::test]
    async fn held_connects_wait_for_release() {
        let server = SimMediaServer::default();
        server.hold_connects();

        let pending = tokio::spawn({
            let server = server.clone();
            async move { connect(&server).await }
        });
        tokio::time::sleep(Duration::from_millis(10)).await;
        assert_eq!(server.sessions_opened(), 0);

        server.release_connects();
        let session = pending.await.unwrap().unwrap();
        assert_eq!(session.info().room_sid, "RM_1");
    }

    #[tokio::test]
    async fn failed_connect_is_recorded() {
        let server = SimMediaServer::default();
        server.fail_connects(Some(ConnectError::Rejected { code: 401, message: "bad".into() }));

        assert!(connect(&server).await.is_err());
        assert_eq!(server.connects().len(), 1);
        assert_eq!(server.open_sessions(), 0);
    }
}
