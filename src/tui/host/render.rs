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

//! UI rendering logic for the table host.
//!
//! Only the rows inside the window are turned into widgets. The table is
//! rendered with a state local to the window, so ratatui never scrolls it.

use ratatui::{
    Frame,
    layout::{Constraint, Rect},
    style::{Style, Stylize},
    text::Line,
    widgets::{Block, Cell, Row, Table, TableState},
};
use shelf::{ListItem, artwork::ThumbnailProvider};

use super::{TableHost, TableRow};
use crate::tui::theme::Theme;

/// Header row plus its bottom margin.
const HEADER_HEIGHT: u16 = 2;

const MARKER_SELECTED: &str = "+";
const MARKER_ARTWORK: &str = "▪";

impl<W: TableRow> TableHost<W> {
    pub(crate) fn draw(
        &mut self,
        f: &mut Frame,
        area: Rect,
        theme: &Theme,
        thumbnails: &mut dyn ThumbnailProvider,
    ) {
        self.sync_window(area.height.saturating_sub(HEADER_HEIGHT) as usize, thumbnails);

        let rows = self.prepared().iter().map(|item| {
            let selected = if item.is_selected() {
                Line::from(MARKER_SELECTED).style(Style::default().fg(theme.selection_fg))
            } else {
                Line::from("")
            };
            let artwork = if item.state().thumbnail().thumbnail().is_some() {
                Line::from(MARKER_ARTWORK).style(Style::default().fg(theme.artwork_fg))
            } else {
                Line::from("")
            };

            let mut cells = vec![Cell::from(selected), Cell::from(artwork)];
            cells.extend(item.cells().into_iter().enumerate().map(|(i, text)| {
                let colour = match i {
                    0 => theme.table_primary_fg,
                    1 => theme.table_secondary_fg,
                    2 => theme.table_detail_fg,
                    _ => theme.table_number_fg,
                };
                Cell::from(Line::from(text).style(Style::default().fg(colour)))
            }));

            let row = Row::new(cells);
            if item.is_selected() { row.bold() } else { row }
        });

        let mut widths = vec![Constraint::Length(1), Constraint::Length(1)];
        widths.extend(W::widths());

        let mut header = vec![Cell::from(""), Cell::from("")];
        header.extend(W::header().iter().map(|title| Cell::from(*title)));

        let table = Table::new(rows, widths)
            .header(
                Row::new(header)
                    .style(Style::default().bold().fg(theme.accent_colour))
                    .bottom_margin(1),
            )
            .row_highlight_style(Style::default().bg(theme.cursor_bg))
            .block(Block::default());

        let mut state =
            TableState::default().with_selected(self.cursor().and_then(|c| c.checked_sub(self.offset())));
        f.render_stateful_widget(table, area, &mut state);
    }
}
