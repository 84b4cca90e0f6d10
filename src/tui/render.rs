// Copyright (C) 2026  Caprica Software Limited
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License
// along with this program.  If not, see <https://www.gnu.org/licenses/>.

//! User interface rendering logic.
//!
//! This module draws the whole screen: the view tabs, the active view, the
//! capsule of its primary selection and the status line.

use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Style, Stylize},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
};

use shelf::util::format::tracks_summary;

use crate::tui::{App, Status};

const ICON_ASCENDING: &str = "\u{2191}";
const ICON_DESCENDING: &str = "\u{2193}";

/// Renders the user interface.
pub(crate) fn draw(f: &mut Frame, app: &mut App) {
    let f_area = f.area();
    f.render_widget(Block::default().style(Style::default().bg(app.theme.background_colour)), f_area);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(2),
            Constraint::Min(3),
            Constraint::Length(1),
            Constraint::Length(1),
        ])
        .split(f_area);

    draw_tabs(f, chunks[0], app);
    app.draw_active_view(f, chunks[1]);
    draw_capsule(f, chunks[2], app);
    draw_status(f, chunks[3], app);
}

fn draw_tabs(f: &mut Frame, area: Rect, app: &App) {
    let theme = &app.theme;
    let active = app.active_index();

    let mut spans = Vec::new();
    for (i, title) in app.view_titles().into_iter().enumerate() {
        let label = format!(" {} {title} ", i + 1);
        if i == active {
            spans.push(Span::styled(label, Style::default().fg(theme.accent_colour).bold()));
        } else {
            spans.push(Span::styled(label, Style::default().fg(theme.table_number_fg)));
        }
    }

    let direction = if app.active_view().ascending() { ICON_ASCENDING } else { ICON_DESCENDING };
    if let Some(preset) = app.preset_name() {
        spans.push(Span::styled(
            format!("  {direction} {preset}"),
            Style::default().fg(theme.table_detail_fg),
        ));
    }

    f.render_widget(
        Paragraph::new(Line::from(spans)).block(
            Block::default()
                .borders(Borders::BOTTOM)
                .border_style(Style::default().fg(theme.border_colour)),
        ),
        area,
    );
}

fn draw_capsule(f: &mut Frame, area: Rect, app: &App) {
    let theme = &app.theme;
    let view = app.active_view();

    let Some(capsule) = view.capsule() else {
        return;
    };

    let mut spans = vec![Span::styled(capsule.title, Style::default().fg(theme.table_primary_fg).bold())];
    if !capsule.subtitle.is_empty() {
        spans.push(Span::styled(" \u{00B7} ", Style::default().fg(theme.border_colour)));
        spans.push(Span::styled(capsule.subtitle, Style::default().fg(theme.table_secondary_fg)));
    }
    if let Some(thumbnail) = view.thumbnail() {
        spans.push(Span::styled(
            format!("  [artwork {} KB]", thumbnail.bytes.len().div_ceil(1024)),
            Style::default().fg(theme.artwork_fg),
        ));
    }

    f.render_widget(Paragraph::new(Line::from(spans)), area);
}

fn draw_status(f: &mut Frame, area: Rect, app: &App) {
    let theme = &app.theme;
    let style = Style::default().bg(theme.status_bg);

    if app.searching {
        let prompt = "/";
        f.render_widget(
            Paragraph::new(format!("{prompt}{}", app.search_input.value()))
                .style(style.fg(theme.accent_colour)),
            area,
        );

        let cursor_x = area.x + (prompt.len() + app.search_input.visual_cursor()) as u16;
        f.set_cursor_position((cursor_x, area.y));
        return;
    }

    let line = match &app.status {
        Some(Status::Error(message)) => Line::from(message.as_str()).style(Style::default().fg(theme.error_fg)),
        Some(Status::Info(message)) => Line::from(message.as_str()).style(Style::default().fg(theme.table_primary_fg)),
        None => {
            let selected = app.active_view().selected_tracks();
            let summary = if selected.is_empty() {
                format!("{} items", app.active_view().len())
            } else {
                format!("Selected {}", tracks_summary(selected))
            };
            Line::from(summary).style(Style::default().fg(theme.table_number_fg))
        }
    };

    f.render_widget(Paragraph::new(line).style(style), area);
}
