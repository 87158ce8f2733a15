//! Tile grid
//!
//! Lays out one box per participant tile, in join order. Placeholder tiles
//! show initials, media tiles list their attached elements.

use huddle_client::{RoomView, Tile, TileMode};
use huddle_core::{MediaElement, TrackKind};
use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
};

/// Render all tiles of `room` into `area`.
pub fn render(frame: &mut Frame, room: &RoomView, area: Rect) {
    let tiles: Vec<&Tile> = room.registry().tiles().collect();
    if tiles.is_empty() {
        let waiting = Paragraph::new(Line::from(Span::styled(
            "Waiting for others to join...",
            Style::default().fg(Color::DarkGray),
        )))
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::ALL));
        frame.render_widget(waiting, area);
        return;
    }

    let (cols, rows) = grid_shape(tiles.len());
    let row_areas = Layout::default()
        .direction(Direction::Vertical)
        .constraints((0..rows).map(|_| Constraint::Ratio(1, rows as u32)))
        .split(area);

    for (row_area, row_tiles) in row_areas.iter().zip(tiles.chunks(cols)) {
        let cells = Layout::default()
            .direction(Direction::Horizontal)
            .constraints((0..cols).map(|_| Constraint::Ratio(1, cols as u32)))
            .split(*row_area);
        for (cell, tile) in cells.iter().zip(row_tiles) {
            render_tile(frame, tile, *cell);
        }
    }
}

/// Columns and rows for `count` tiles: the smallest square-ish grid.
fn grid_shape(count: usize) -> (usize, usize) {
    let mut cols = 1;
    while cols * cols < count {
        cols += 1;
    }
    (cols, count.div_ceil(cols).max(1))
}

fn render_tile(frame: &mut Frame, tile: &Tile, area: Rect) {
    let mut title = format!(" {} ", tile.name());
    if tile.is_muted() {
        title.push_str("[muted] ");
    }

    let border_style = if tile.is_speaking() {
        Style::default().fg(Color::Green).add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(Color::Gray)
    };
    let block = Block::default().borders(Borders::ALL).border_style(border_style).title(title);

    let body = match tile.mode() {
        TileMode::Placeholder => Paragraph::new(Line::from(Span::styled(
            tile.initials().to_owned(),
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
        )))
        .alignment(Alignment::Center),
        TileMode::Media => {
            Paragraph::new(tile.elements().iter().map(element_line).collect::<Vec<_>>())
        },
    };

    frame.render_widget(body.block(block), area);
}

fn element_line(element: &MediaElement) -> Line<'static> {
    let kind = match element.kind {
        TrackKind::Audio => "audio",
        TrackKind::Video => "video",
    };
    let mut label = format!("{} {kind}", element.source);
    if element.mirrored {
        label.push_str(" (mirrored)");
    }
    Line::from(vec![Span::styled("> ", Style::default().fg(Color::Green)), Span::raw(label)])
}
