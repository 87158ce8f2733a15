//! Manual-join form
//!
//! Three text fields (room, name, token) in a centered box, with the
//! loading line while a join is in flight.

use huddle_app::App;
use ratatui::{
    Frame,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
};

use crate::{FormField, InputState};

const FORM_WIDTH: u16 = 56;
const FORM_HEIGHT: u16 = 10;
const LABEL_WIDTH: u16 = 8; // "Token: " plus focus marker
const FIELD_OFFSET_Y: u16 = 2; // border + blank line

/// Render the form centered in `area`.
pub fn render(frame: &mut Frame, app: &App, input: &InputState, area: Rect) {
    let form_area = centered(area, FORM_WIDTH, FORM_HEIGHT);
    let block = Block::default().borders(Borders::ALL).title(" Join a room ");

    let mut lines = vec![Line::raw("")];
    for field in FormField::ALL {
        lines.push(field_line(input, field));
    }
    lines.push(Line::raw(""));
    if app.is_loading() {
        lines.push(Line::from(Span::styled(
            "Connecting...",
            Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
        )));
    } else {
        lines.push(Line::raw(""));
    }
    lines.push(Line::from(Span::styled(
        "Enter join | Ctrl-R auto-connect | Tab next | Esc quit",
        Style::default().fg(Color::DarkGray),
    )));

    frame.render_widget(Paragraph::new(lines).block(block), form_area);

    if !app.is_loading() {
        let row = FormField::ALL.iter().position(|f| *f == input.focus()).unwrap_or(0) as u16;
        let max_x = form_area.x.saturating_add(form_area.width).saturating_sub(2);
        let cursor_x = form_area
            .x
            .saturating_add(1 + LABEL_WIDTH)
            .saturating_add(input.cursor() as u16)
            .min(max_x);
        let cursor_y = form_area.y.saturating_add(FIELD_OFFSET_Y).saturating_add(row);
        frame.set_cursor_position((cursor_x, cursor_y));
    }
}

fn field_line(input: &InputState, field: FormField) -> Line<'static> {
    let focused = input.focus() == field;
    let marker = if focused { ">" } else { " " };
    let value = match field {
        FormField::Token => "*".repeat(input.value(field).chars().count()),
        FormField::Room | FormField::Name => input.value(field).to_owned(),
    };
    let label_style = if focused {
        Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(Color::Gray)
    };
    Line::from(vec![
        Span::styled(format!("{marker}{:<6} ", format!("{}:", field.label())), label_style),
        Span::raw(value),
    ])
}

fn centered(area: Rect, width: u16, height: u16) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    Rect {
        x: area.x.saturating_add((area.width - width) / 2),
        y: area.y.saturating_add((area.height - height) / 2),
        width,
        height,
    }
}
