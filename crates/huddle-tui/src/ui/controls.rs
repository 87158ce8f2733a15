//! Control bar and audio prompt

use huddle_app::App;
use huddle_client::{AudioPrompt, ButtonState, MediaControl, RoomView, ToggleState};
use ratatui::{
    Frame,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
};

/// Whether the "enable audio" prompt takes a line.
pub fn prompt_visible(room: &RoomView) -> bool {
    room.audio_prompt() == AudioPrompt::Shown
}

/// Render the audio prompt, if shown.
pub fn render_prompt(frame: &mut Frame, room: &RoomView, area: Rect) {
    if !prompt_visible(room) {
        return;
    }
    let prompt = Paragraph::new(Line::from(vec![
        Span::raw(" Audio is blocked. "),
        Span::styled("Press [a] to start audio", Style::default().add_modifier(Modifier::BOLD)),
    ]))
    .style(Style::default().fg(Color::Black).bg(Color::Yellow));
    frame.render_widget(prompt, area);
}

/// Render the control bar.
pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    frame.render_widget(
        Paragraph::new(control_line(app)).block(Block::default().borders(Borders::ALL)),
        area,
    );
}

fn control_line(app: &App) -> Line<'static> {
    let buttons = app.buttons();
    let mut spans = Vec::new();
    for (key, label, control, state) in [
        ('c', "Camera", MediaControl::Camera, buttons.camera),
        ('m', "Mic", MediaControl::Microphone, buttons.microphone),
        ('s', "Share", MediaControl::ScreenShare, buttons.screen_share),
    ] {
        let pending = matches!(app.toggles().get(control).state(), ToggleState::Pending { .. });
        let text = if pending { format!("[{key}] {label}...") } else { format!("[{key}] {label}") };
        spans.push(Span::styled(text, button_style(state, pending)));
        spans.push(Span::raw("  "));
    }
    spans.push(Span::styled("[l] Leave", Style::default().fg(Color::Red)));
    spans.push(Span::raw("  "));
    spans.push(Span::styled("[q] Quit", Style::default().fg(Color::DarkGray)));
    Line::from(spans)
}

fn button_style(state: ButtonState, pending: bool) -> Style {
    if pending {
        return Style::default().fg(Color::Yellow);
    }
    match state {
        ButtonState::Active => Style::default().fg(Color::Green).add_modifier(Modifier::BOLD),
        ButtonState::Disabled => Style::default().fg(Color::DarkGray).add_modifier(Modifier::CROSSED_OUT),
        ButtonState::Idle => Style::default().fg(Color::White),
    }
}
