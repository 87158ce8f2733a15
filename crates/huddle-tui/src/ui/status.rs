//! Status bar and error banner
//!
//! Displays connection status and room information.

use huddle_app::App;
use huddle_client::{RoomView, StatusIndicator};
use huddle_core::SessionPhase;
use ratatui::{
    Frame,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
};

/// Render the status bar.
pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let paragraph = Paragraph::new(status_line(app))
        .style(Style::default().bg(Color::DarkGray).fg(Color::White));
    frame.render_widget(paragraph, area);
}

/// Render the error banner, if any.
pub fn render_banner(frame: &mut Frame, app: &App, area: Rect) {
    let Some(message) = app.error_banner() else {
        return;
    };
    let banner = Paragraph::new(format!(" {message} "))
        .style(Style::default().fg(Color::White).bg(Color::Red).add_modifier(Modifier::BOLD));
    frame.render_widget(banner, area);
}

fn status_line(app: &App) -> Line<'static> {
    let connection_status = match (app.phase(), app.room().map(RoomView::status)) {
        (_, Some(StatusIndicator::Reconnecting)) | (SessionPhase::Reconnecting, _) => {
            Span::styled("Reconnecting...", Style::default().fg(Color::Yellow))
        },
        (SessionPhase::Connecting, _) => {
            Span::styled("Connecting...", Style::default().fg(Color::Yellow))
        },
        (_, Some(StatusIndicator::Connected)) => Span::styled(
            "Connected",
            Style::default().fg(Color::Green).add_modifier(Modifier::BOLD),
        ),
        (_, None) => Span::styled("Disconnected", Style::default().fg(Color::Red)),
    };

    let room_info = app.room().map_or_else(String::new, |room| {
        format!(
            " | {} | {} | quality: {:?}",
            room.room_name(),
            room.participant_count_label(),
            room.local_quality()
        )
    });

    Line::from(vec![
        Span::raw(" "),
        connection_status,
        Span::styled(room_info, Style::default().fg(Color::Gray)),
    ])
}
