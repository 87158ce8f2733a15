//! Input state and key handling for the TUI.
//!
//! This module owns the manual-join form fields and maps keys to
//! [`AppEvent`]s. Which keys mean what depends on the screen being shown:
//! on the form they edit text, in the room they press controls.

use huddle_app::{AppEvent, Screen};
use huddle_client::MediaControl;

/// Key input events from the terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyInput {
    /// Character input.
    Char(char),
    /// Character typed with Ctrl held.
    Ctrl(char),
    /// Enter/Return key.
    Enter,
    /// Backspace key.
    Backspace,
    /// Delete key.
    Delete,
    /// Tab key.
    Tab,
    /// Shift+Tab.
    BackTab,
    /// Escape key.
    Esc,
    /// Left arrow.
    Left,
    /// Right arrow.
    Right,
    /// Up arrow.
    Up,
    /// Down arrow.
    Down,
    /// Home key.
    Home,
    /// End key.
    End,
}

/// Field of the manual-join form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FormField {
    /// Room to join.
    #[default]
    Room,
    /// Display name.
    Name,
    /// Pre-issued access token.
    Token,
}

impl FormField {
    /// All fields in display order.
    pub const ALL: [FormField; 3] = [FormField::Room, FormField::Name, FormField::Token];

    /// Label shown next to the field.
    pub fn label(self) -> &'static str {
        match self {
            Self::Room => "Room",
            Self::Name => "Name",
            Self::Token => "Token",
        }
    }

    fn next(self) -> Self {
        match self {
            Self::Room => Self::Name,
            Self::Name => Self::Token,
            Self::Token => Self::Room,
        }
    }

    fn prev(self) -> Self {
        match self {
            Self::Room => Self::Token,
            Self::Name => Self::Room,
            Self::Token => Self::Name,
        }
    }
}

/// Input state for the TUI.
///
/// Holds the three form fields and a cursor into the focused one. The cursor
/// counts characters, not bytes.
#[derive(Debug, Default)]
pub struct InputState {
    room: String,
    name: String,
    token: String,
    focus: FormField,
    cursor: usize,
}

impl InputState {
    /// Create an empty form.
    pub fn new() -> Self {
        Self::default()
    }

    /// Text of `field`.
    pub fn value(&self, field: FormField) -> &str {
        match field {
            FormField::Room => &self.room,
            FormField::Name => &self.name,
            FormField::Token => &self.token,
        }
    }

    fn value_mut(&mut self, field: FormField) -> &mut String {
        match field {
            FormField::Room => &mut self.room,
            FormField::Name => &mut self.name,
            FormField::Token => &mut self.token,
        }
    }

    /// Field with keyboard focus.
    pub fn focus(&self) -> FormField {
        self.focus
    }

    /// Cursor position within the focused field.
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Handle a key input event.
    ///
    /// Returns the event to feed the App, or `None` if the key does nothing
    /// on `screen`.
    pub fn handle_key(&mut self, key: KeyInput, screen: Screen) -> Option<AppEvent> {
        match (key, screen) {
            (KeyInput::Esc | KeyInput::Ctrl('c'), _) => Some(AppEvent::Quit),
            (_, Screen::Form) => self.handle_form_key(key),
            (_, Screen::Room) => Self::handle_room_key(key),
        }
    }

    fn handle_form_key(&mut self, key: KeyInput) -> Option<AppEvent> {
        match key {
            KeyInput::Char(c) => {
                let at = self.byte_offset();
                self.value_mut(self.focus).insert(at, c);
                self.cursor = self.cursor.saturating_add(1);
            },
            KeyInput::Backspace => {
                if self.cursor == 0 {
                    return None;
                }
                self.cursor = self.cursor.saturating_sub(1);
                let at = self.byte_offset();
                self.value_mut(self.focus).remove(at);
            },
            KeyInput::Delete => {
                if self.cursor >= self.focused_len() {
                    return None;
                }
                let at = self.byte_offset();
                self.value_mut(self.focus).remove(at);
            },
            KeyInput::Left => self.cursor = self.cursor.saturating_sub(1),
            KeyInput::Right => self.cursor = self.cursor.saturating_add(1).min(self.focused_len()),
            KeyInput::Home => self.cursor = 0,
            KeyInput::End => self.cursor = self.focused_len(),
            KeyInput::Tab | KeyInput::Down => self.set_focus(self.focus.next()),
            KeyInput::BackTab | KeyInput::Up => self.set_focus(self.focus.prev()),
            KeyInput::Enter => {
                return Some(AppEvent::JoinSubmitted {
                    room_name: self.room.clone(),
                    participant_name: self.name.clone(),
                    token: self.token.clone(),
                });
            },
            KeyInput::Ctrl('r') => return Some(AppEvent::AutoConnect),
            KeyInput::Ctrl(_) | KeyInput::Esc => return None,
        }
        Some(AppEvent::Redraw)
    }

    fn handle_room_key(key: KeyInput) -> Option<AppEvent> {
        match key {
            KeyInput::Char('c') => Some(AppEvent::Toggle(MediaControl::Camera)),
            KeyInput::Char('m') => Some(AppEvent::Toggle(MediaControl::Microphone)),
            KeyInput::Char('s') => Some(AppEvent::Toggle(MediaControl::ScreenShare)),
            KeyInput::Char('a') => Some(AppEvent::StartAudio),
            KeyInput::Char('l') => Some(AppEvent::Leave),
            KeyInput::Char('q') => Some(AppEvent::Quit),
            _ => None,
        }
    }

    fn set_focus(&mut self, field: FormField) {
        self.focus = field;
        self.cursor = self.focused_len();
    }

    fn focused_len(&self) -> usize {
        self.value(self.focus).chars().count()
    }

    fn byte_offset(&self) -> usize {
        let value = self.value(self.focus);
        value.char_indices().nth(self.cursor).map_or(value.len(), |(i, _)| i)
    }
}
