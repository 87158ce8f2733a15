//! UI rendering
//!
//! Rendering functions that convert App state into terminal output using
//! ratatui widgets. All functions are pure (no I/O), taking state and
//! returning widget trees.

mod controls;
mod form;
mod grid;
mod status;

use huddle_app::{App, Screen};
use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
};

use crate::InputState;

/// Render the entire UI.
pub fn render(frame: &mut Frame, app: &App, input: &InputState) {
    const MAIN_AREA_MIN_HEIGHT: u16 = 3;
    const BANNER_HEIGHT: u16 = 1;
    const STATUS_HEIGHT: u16 = 1;

    let banner_height = if app.error_banner().is_some() { BANNER_HEIGHT } else { 0 };
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(MAIN_AREA_MIN_HEIGHT),
            Constraint::Length(banner_height),
            Constraint::Length(STATUS_HEIGHT),
        ])
        .split(frame.area());

    let [main_area, banner_area, status_area] = chunks.as_ref() else {
        return;
    };

    match app.screen() {
        Screen::Form => form::render(frame, app, input, *main_area),
        Screen::Room => render_room(frame, app, *main_area),
    }
    status::render_banner(frame, app, *banner_area);
    status::render(frame, app, *status_area);
}

/// Render the room view (tile grid + audio prompt + control bar).
fn render_room(frame: &mut Frame, app: &App, area: Rect) {
    const GRID_MIN_HEIGHT: u16 = 3;
    const PROMPT_HEIGHT: u16 = 1;
    const CONTROLS_HEIGHT: u16 = 3;

    let Some(room) = app.room() else {
        return;
    };

    let prompt_height = if controls::prompt_visible(room) { PROMPT_HEIGHT } else { 0 };
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(GRID_MIN_HEIGHT),
            Constraint::Length(prompt_height),
            Constraint::Length(CONTROLS_HEIGHT),
        ])
        .split(area);

    let [grid_area, prompt_area, controls_area] = chunks.as_ref() else {
        return;
    };

    grid::render(frame, room, *grid_area);
    controls::render_prompt(frame, room, *prompt_area);
    controls::render(frame, app, *controls_area);
}

#[cfg(test)]
mod tests {
    use huddle_app::{AppConfig, AppEvent, ConnectionDetails};
    use huddle_client::MediaControl;
    use huddle_core::{
        MediaElement, ParticipantId, ParticipantInfo, SessionEvent, SessionInfo, TrackSid,
        TrackSource,
    };
    use ratatui::{Terminal, backend::TestBackend};

    use super::*;
    use crate::KeyInput;

    fn draw(app: &App, input: &InputState) -> String {
        let mut terminal = Terminal::new(TestBackend::new(80, 24)).unwrap();
        terminal.draw(|frame| render(frame, app, input)).unwrap();

        let buffer = terminal.backend().buffer();
        let mut out = String::new();
        for y in 0..buffer.area.height {
            for x in 0..buffer.area.width {
                out.push_str(buffer[(x, y)].symbol());
            }
            out.push('\n');
        }
        out
    }

    fn joined_app() -> App {
        let mut app = App::new(AppConfig::default());
        let _ = app.handle(AppEvent::AutoConnect);
        let _ = app.handle(AppEvent::DetailsFetched(ConnectionDetails {
            server_url: "wss://media.example.com".into(),
            room_name: "standup".into(),
            participant_token: "token-123456789".into(),
            participant_name: "Jane Doe".into(),
            ice_servers: None,
        }));
        let _ = app.handle(AppEvent::Connected(SessionInfo {
            room_sid: "RM_1".into(),
            room_name: "standup".into(),
            local: ParticipantInfo::new("PA_local", "Jane Doe"),
            remote: vec![ParticipantInfo::new("PA_bob", "Bob Smith")],
        }));
        app
    }

    #[test]
    fn form_shows_fields_and_keys() {
        let app = App::new(AppConfig::default());
        let mut input = InputState::new();
        for c in "standup".chars() {
            input.handle_key(KeyInput::Char(c), Screen::Form);
        }

        let screen = draw(&app, &input);

        assert!(screen.contains("Join a room"));
        assert!(screen.contains("Room"));
        assert!(screen.contains("standup"));
        assert!(screen.contains("Name"));
        assert!(screen.contains("Token"));
        assert!(screen.contains("Disconnected"));
    }

    #[test]
    fn form_masks_token() {
        let app = App::new(AppConfig::default());
        let mut input = InputState::new();
        input.handle_key(KeyInput::Tab, Screen::Form);
        input.handle_key(KeyInput::Tab, Screen::Form);
        for c in "secret".chars() {
            input.handle_key(KeyInput::Char(c), Screen::Form);
        }

        let screen = draw(&app, &input);

        assert!(!screen.contains("secret"));
        assert!(screen.contains("******"));
    }

    #[test]
    fn missing_fields_banner_is_drawn() {
        let mut app = App::new(AppConfig::default());
        let _ = app.handle(AppEvent::JoinSubmitted {
            room_name: "standup".into(),
            participant_name: String::new(),
            token: String::new(),
        });

        let screen = draw(&app, &InputState::new());

        assert!(screen.contains("Please fill in all fields"));
    }

    #[test]
    fn loading_overlay_while_connecting() {
        let mut app = App::new(AppConfig::default());
        let _ = app.handle(AppEvent::AutoConnect);

        let screen = draw(&app, &InputState::new());

        assert!(screen.contains("Connecting..."));
    }

    #[test]
    fn room_shows_placeholder_tile_and_count() {
        let app = joined_app();

        let screen = draw(&app, &InputState::new());

        assert!(screen.contains("Bob Smith"));
        assert!(screen.contains("BS"));
        assert!(screen.contains("2 participants"));
        assert!(screen.contains("standup"));
        assert!(screen.contains("[c] Camera"));
    }

    #[test]
    fn room_shows_media_tile() {
        let mut app = joined_app();
        let _ = app.handle(AppEvent::Session(SessionEvent::TrackSubscribed {
            participant: ParticipantInfo::new("PA_bob", "Bob Smith"),
            track: TrackSid::new("TR_cam"),
            source: TrackSource::Camera,
            element: MediaElement::new(1, "MS_bob_cam", TrackSource::Camera),
        }));

        let screen = draw(&app, &InputState::new());

        assert!(screen.contains("camera video"));
    }

    #[test]
    fn muted_tile_is_marked() {
        let mut app = joined_app();
        let _ = app.handle(AppEvent::Session(SessionEvent::TrackSubscribed {
            participant: ParticipantInfo::new("PA_bob", "Bob Smith"),
            track: TrackSid::new("TR_mic"),
            source: TrackSource::Microphone,
            element: MediaElement::new(2, "MS_bob_mic", TrackSource::Microphone),
        }));
        assert!(!draw(&app, &InputState::new()).contains("[muted]"));

        let _ = app.handle(AppEvent::Session(SessionEvent::TrackMuted {
            participant: ParticipantId::new("PA_bob"),
            source: TrackSource::Microphone,
        }));

        let screen = draw(&app, &InputState::new());

        assert!(screen.contains("[muted]"));
    }

    #[test]
    fn audio_prompt_is_drawn_when_blocked() {
        let mut app = joined_app();
        let _ = app.handle(AppEvent::Session(SessionEvent::AudioPlaybackChanged {
            can_playback: false,
        }));

        let screen = draw(&app, &InputState::new());

        assert!(screen.contains("Press [a] to start audio"));
    }

    #[test]
    fn pending_toggle_is_drawn() {
        let mut app = joined_app();
        let _ = app.handle(AppEvent::Toggle(MediaControl::Camera));

        let screen = draw(&app, &InputState::new());

        assert!(screen.contains("[c] Camera..."));
    }

    #[test]
    fn tiny_terminal_does_not_panic() {
        let app = joined_app();
        let mut terminal = Terminal::new(TestBackend::new(4, 2)).unwrap();
        terminal.draw(|frame| render(frame, &app, &InputState::new())).unwrap();
    }
}
