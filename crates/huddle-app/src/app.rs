//! Application state machine.
//!
//! This module defines the [`App`] state machine, which manages the interactive
//! state of the room client completely decoupled from I/O and the media SDK.
//!
//! This is a pure state machine: it consumes [`crate::AppEvent`] inputs and
//! produces [`crate::AppAction`] instructions for the runtime to execute.
//!
//! # Responsibilities
//!
//! - Switches between the connection form and the room view.
//! - Tracks the session phase, loading indicator, and error banner.
//! - Runs the optimistic media toggles.
//! - Routes session events through the per-session dispatch table.
//! - Tears everything down through one path on leave, failed join, or
//!   server disconnect.

use huddle_client::{
    AudioPrompt, ControlButtons, EventDispatcher, MediaControl, RoomView, ToggleState, UiToggleState,
    ViewEffect,
};
use huddle_core::{
    MediaElement, MediaOperationError, SessionEvent, SessionInfo, SessionPhase, redact_token,
};

use crate::{AppAction, AppConfig, AppEvent, ConnectionDetails, JoinRequest};

/// Shown when a required form field is blank.
pub const MISSING_FIELDS: &str = "Please fill in all fields";

/// Shown when the server ends the session.
pub const DISCONNECTED_NOTICE: &str = "Disconnected from room";

/// Which view is on screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Screen {
    /// Connection form.
    #[default]
    Form,
    /// Room view with tiles and controls.
    Room,
}

/// How the join in flight was started. Selects the failure message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum JoinOrigin {
    Auto,
    Manual,
}

impl JoinOrigin {
    fn failure_prefix(self) -> &'static str {
        match self {
            Self::Auto => "Failed to connect",
            Self::Manual => "Failed to join room",
        }
    }
}

/// Application state machine.
///
/// Pure state machine that processes events and produces actions.
/// No I/O dependencies - fully testable in simulation.
#[derive(Debug, Clone)]
pub struct App {
    /// Endpoint, default server, and timeouts.
    config: AppConfig,
    /// Visible view.
    screen: Screen,
    /// Session lifecycle.
    phase: SessionPhase,
    /// Loading overlay shown around a join.
    loading: bool,
    /// Error banner. `None` if hidden.
    error_banner: Option<String>,
    /// Camera, microphone, and screen-share toggles.
    toggles: UiToggleState,
    /// Room state for the open session. `None` on the form.
    room: Option<RoomView>,
    /// Dispatch table for the open session.
    dispatcher: Option<EventDispatcher>,
    /// Sessions opened so far.
    sessions: u64,
    /// Join in flight. `None` if no join is pending.
    join: Option<JoinOrigin>,
    /// Room name the user asked for, shown instead of the server's.
    requested_room: Option<String>,
    /// Terminal dimensions (columns, rows).
    terminal_size: (u16, u16),
}

impl App {
    /// Create a new App on the connection form.
    pub fn new(config: AppConfig) -> Self {
        Self {
            config,
            screen: Screen::Form,
            phase: SessionPhase::Idle,
            loading: false,
            error_banner: None,
            toggles: UiToggleState::new(),
            room: None,
            dispatcher: None,
            sessions: 0,
            join: None,
            requested_room: None,
            terminal_size: (80, 24),
        }
    }

    /// Process an event and return actions.
    pub fn handle(&mut self, event: AppEvent) -> Vec<AppAction> {
        match event {
            AppEvent::Tick => vec![],
            AppEvent::Redraw => vec![AppAction::Render],
            AppEvent::Resize(cols, rows) => {
                self.terminal_size = (cols, rows);
                vec![AppAction::Render]
            },
            AppEvent::AutoConnect => self.auto_connect(),
            AppEvent::JoinSubmitted { room_name, participant_name, token } => {
                self.join_submitted(&room_name, &participant_name, &token)
            },
            AppEvent::Toggle(control) => self.toggle(control),
            AppEvent::Leave => self.leave(),
            AppEvent::StartAudio => self.start_audio(),
            AppEvent::Quit => vec![AppAction::Quit],
            AppEvent::DetailsFetched(details) => self.details_fetched(details),
            AppEvent::FetchFailed(error) => {
                tracing::error!(%error, "failed to fetch connection details");
                self.join_failed(&error.to_string())
            },
            AppEvent::Connected(info) => self.connected(&info),
            AppEvent::ConnectFailed(error) => {
                tracing::error!(code = error.code(), %error, "connection failed");
                self.join_failed(&error.to_string())
            },
            AppEvent::MediaToggled { control, result } => self.media_toggled(control, result),
            AppEvent::MicrophoneAutoEnabled(result) => self.microphone_auto_enabled(result),
            AppEvent::AudioStarted(result) => self.audio_started(result),
            AppEvent::Session(event) => self.session_event(event),
        }
    }

    /// Start a join from the credential endpoint.
    fn auto_connect(&mut self) -> Vec<AppAction> {
        self.begin_join(JoinOrigin::Auto);
        vec![AppAction::Render, AppAction::FetchDetails]
    }

    /// Start a join from the manual form.
    ///
    /// All three fields are trimmed and required. The configured default
    /// server URL is used and ICE config comes from the public STUN list.
    fn join_submitted(
        &mut self,
        room_name: &str,
        participant_name: &str,
        token: &str,
    ) -> Vec<AppAction> {
        let (room_name, participant_name, token) =
            (room_name.trim(), participant_name.trim(), token.trim());
        if room_name.is_empty() || participant_name.is_empty() || token.is_empty() {
            self.error_banner = Some(MISSING_FIELDS.to_owned());
            return vec![AppAction::Render];
        }

        self.begin_join(JoinOrigin::Manual);
        self.requested_room = Some(room_name.to_owned());
        let request = JoinRequest {
            server_url: self.config.default_server_url.clone(),
            token: token.to_owned(),
            room_name: room_name.to_owned(),
            participant_name: participant_name.to_owned(),
            ice_servers: None,
        };
        vec![AppAction::Render, AppAction::Connect(request)]
    }

    fn begin_join(&mut self, origin: JoinOrigin) {
        if self.join.is_some() {
            tracing::info!("superseding join in flight");
        }
        self.phase.begin_connect();
        self.join = Some(origin);
        self.loading = true;
        self.error_banner = None;
    }

    fn details_fetched(&mut self, details: ConnectionDetails) -> Vec<AppAction> {
        if self.join != Some(JoinOrigin::Auto) || self.phase != SessionPhase::Connecting {
            tracing::debug!("ignoring connection details for abandoned join");
            return vec![];
        }

        tracing::debug!(
            room = %details.room_name,
            token = %redact_token(&details.participant_token),
            "connection details ready"
        );
        self.requested_room = Some(details.room_name.clone());
        vec![AppAction::Connect(JoinRequest {
            server_url: details.server_url,
            token: details.participant_token,
            room_name: details.room_name,
            participant_name: details.participant_name,
            ice_servers: details.ice_servers,
        })]
    }

    fn connected(&mut self, info: &SessionInfo) -> Vec<AppAction> {
        if let Err(error) = self.phase.connected() {
            tracing::warn!(%error, "session opened outside a join");
            return self.teardown(None);
        }

        self.sessions += 1;
        let mut room = RoomView::new(info);
        if let Some(name) = self.requested_room.take().filter(|name| !name.is_empty()) {
            room.set_room_name(name);
        }
        tracing::info!(
            room = %room.room_name(),
            participants = room.participant_count(),
            "joined room"
        );

        self.dispatcher = Some(EventDispatcher::for_session(self.sessions));
        self.room = Some(room);
        self.toggles.reset();
        self.screen = Screen::Room;
        self.loading = false;
        self.error_banner = None;
        self.join = None;

        vec![AppAction::Render, AppAction::EnableMicrophone]
    }

    fn join_failed(&mut self, message: &str) -> Vec<AppAction> {
        let Some(origin) = self.join else {
            tracing::debug!("ignoring failure of abandoned join");
            return vec![];
        };
        self.teardown(Some(format!("{}: {message}", origin.failure_prefix())))
    }

    fn microphone_auto_enabled(
        &mut self,
        result: Result<Option<MediaElement>, MediaOperationError>,
    ) -> Vec<AppAction> {
        let Some(room) = self.room.as_mut() else {
            return vec![];
        };

        match result {
            Ok(element) => {
                tracing::info!("microphone enabled");
                self.toggles.get_mut(MediaControl::Microphone).force(true);
                room.local_source_enabled(MediaControl::Microphone.source(), element);
                vec![AppAction::Render]
            },
            Err(error) => {
                tracing::warn!(%error, "could not enable microphone");
                vec![]
            },
        }
    }

    fn toggle(&mut self, control: MediaControl) -> Vec<AppAction> {
        if self.room.is_none() || !self.phase.has_session() {
            tracing::debug!(%control, "toggle ignored without a session");
            return vec![];
        }

        match self.toggles.get_mut(control).begin() {
            Some(enabled) => vec![AppAction::Render, AppAction::SetSourceEnabled { control, enabled }],
            None => {
                tracing::debug!(%control, "toggle already pending");
                vec![]
            },
        }
    }

    fn media_toggled(
        &mut self,
        control: MediaControl,
        result: Result<Option<MediaElement>, MediaOperationError>,
    ) -> Vec<AppAction> {
        let toggle = self.toggles.get_mut(control);
        if !matches!(toggle.state(), ToggleState::Pending { .. }) {
            tracing::debug!(%control, "ignoring stale toggle result");
            return vec![];
        }

        match result {
            Ok(element) => {
                toggle.confirm();
                let enabled = toggle.enabled();
                tracing::info!(%control, enabled, "media toggled");
                if let Some(room) = self.room.as_mut() {
                    if enabled {
                        room.local_source_enabled(control.source(), element);
                    } else {
                        room.local_source_disabled(control.source());
                    }
                }
            },
            Err(error) => {
                tracing::error!(%control, %error, "failed to toggle");
                let message = format!("Failed to toggle {control}");
                toggle.revert(message.clone());
                self.error_banner = Some(message);
            },
        }
        vec![AppAction::Render]
    }

    fn start_audio(&self) -> Vec<AppAction> {
        match &self.room {
            Some(room) if room.audio_prompt() == AudioPrompt::Shown => {
                vec![AppAction::StartAudio]
            },
            _ => vec![],
        }
    }

    fn audio_started(&mut self, result: Result<bool, MediaOperationError>) -> Vec<AppAction> {
        match result {
            Ok(true) => {
                if let Some(room) = self.room.as_mut() {
                    tracing::info!("audio playback resumed");
                    room.dismiss_audio_prompt();
                }
                vec![AppAction::Render]
            },
            Ok(false) => {
                tracing::warn!("audio playback still blocked");
                vec![]
            },
            Err(error) => {
                tracing::warn!(%error, "failed to start audio");
                vec![]
            },
        }
    }

    fn session_event(&mut self, event: SessionEvent) -> Vec<AppAction> {
        let (Some(room), Some(dispatcher)) = (self.room.as_mut(), self.dispatcher.as_ref()) else {
            tracing::debug!(kind = ?event.kind(), "session event without a room");
            return vec![];
        };

        let effects = dispatcher.dispatch(room, event);
        for effect in effects {
            match effect {
                ViewEffect::ShowError(message) => self.error_banner = Some(message),
                ViewEffect::Reconnecting => {
                    if let Err(error) = self.phase.reconnecting() {
                        tracing::warn!(%error, "unexpected reconnect");
                    }
                },
                ViewEffect::Reconnected => {
                    if let Err(error) = self.phase.reconnected() {
                        tracing::warn!(%error, "unexpected reconnect");
                    }
                },
                ViewEffect::Teardown(reason) => {
                    tracing::info!(%reason, "session ended by server");
                    return self.teardown(Some(DISCONNECTED_NOTICE.to_owned()));
                },
            }
        }
        vec![AppAction::Render]
    }

    /// Leave the room. Safe with no session and safe to repeat.
    pub fn leave(&mut self) -> Vec<AppAction> {
        self.teardown(None)
    }

    /// Single teardown path for leave, failed join, and server disconnect.
    ///
    /// Drops the room view, resets the toggles, returns to the form, and
    /// asks the runtime to cancel any join and disconnect the session.
    fn teardown(&mut self, notice: Option<String>) -> Vec<AppAction> {
        if self.room.is_some() || self.phase.is_active() {
            tracing::info!(phase = ?self.phase, "tearing down session");
        }

        self.room = None;
        self.dispatcher = None;
        self.toggles.reset();
        self.phase.disconnect();
        if let Err(error) = self.phase.reset() {
            tracing::warn!(%error, "failed to reset session phase");
        }
        self.screen = Screen::Form;
        self.loading = false;
        self.join = None;
        self.requested_room = None;
        if notice.is_some() {
            self.error_banner = notice;
        }

        vec![AppAction::Disconnect, AppAction::Render]
    }

    /// Quit the application.
    pub fn quit(&self) -> Vec<AppAction> {
        vec![AppAction::Quit]
    }

    /// Configuration.
    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Visible view.
    pub fn screen(&self) -> Screen {
        self.screen
    }

    /// Session lifecycle phase.
    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    /// Whether the loading overlay is shown.
    pub fn is_loading(&self) -> bool {
        self.loading
    }

    /// Error banner text. `None` if hidden.
    pub fn error_banner(&self) -> Option<&str> {
        self.error_banner.as_deref()
    }

    /// Media toggles.
    pub fn toggles(&self) -> &UiToggleState {
        &self.toggles
    }

    /// Control button states.
    pub fn buttons(&self) -> ControlButtons {
        self.toggles.buttons()
    }

    /// Room state. `None` on the form.
    pub fn room(&self) -> Option<&RoomView> {
        self.room.as_ref()
    }

    /// Sessions opened so far.
    pub fn session_count(&self) -> u64 {
        self.sessions
    }

    /// Terminal dimensions (columns, rows).
    pub fn terminal_size(&self) -> (u16, u16) {
        self.terminal_size
    }
}
