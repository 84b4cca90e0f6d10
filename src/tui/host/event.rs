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

//! Input handling for the table host.
//!
//! Maps keys to cursor movement, selection gestures and the commands acting
//! on the selection.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use shelf::{actions::ActionDelegate, virtualization::SelectionModifiers};

use super::{TableHost, TableRow};

const SELECT: Option<SelectionModifiers> = Some(SelectionModifiers::NONE);
const EXTEND: Option<SelectionModifiers> = Some(SelectionModifiers::SHIFT);
const PAINT: Option<SelectionModifiers> = Some(SelectionModifiers::DRAG);

impl<W: TableRow> TableHost<W> {
    /// Handles a key aimed at the list. Returns `false` for keys it does not
    /// use.
    pub(crate) fn process_key(
        &mut self,
        key: KeyEvent,
        delegate: &dyn ActionDelegate,
        page_size: usize,
    ) -> bool {
        let page = isize::try_from(page_size).unwrap_or(isize::MAX);
        let step = if self.painting { PAINT } else { SELECT };

        match (key.code, key.modifiers) {
            (KeyCode::Char('j'), KeyModifiers::NONE) | (KeyCode::Down, KeyModifiers::NONE) => {
                self.step_cursor(1, step)
            }
            (KeyCode::Char('k'), KeyModifiers::NONE) | (KeyCode::Up, KeyModifiers::NONE) => {
                self.step_cursor(-1, step)
            }
            (KeyCode::Char('v'), KeyModifiers::NONE) => {
                self.painting = !self.painting;
                if self.painting {
                    let cursor = self.cursor.unwrap_or(0);
                    self.move_cursor(cursor, PAINT);
                }
            }
            (KeyCode::Esc, _) if self.painting => self.painting = false,
            (KeyCode::Char('J'), _) | (KeyCode::Down, KeyModifiers::SHIFT) => {
                self.step_cursor(1, EXTEND)
            }
            (KeyCode::Char('K'), _) | (KeyCode::Up, KeyModifiers::SHIFT) => {
                self.step_cursor(-1, EXTEND)
            }

            (KeyCode::Char('g'), _) | (KeyCode::Home, _) => self.move_cursor(0, SELECT),
            (KeyCode::Char('G'), _) | (KeyCode::End, _) => self.move_cursor(usize::MAX, SELECT),
            (KeyCode::PageDown, _) | (KeyCode::Char('f'), KeyModifiers::CONTROL) => {
                self.step_cursor(page, SELECT)
            }
            (KeyCode::PageUp, _) | (KeyCode::Char('b'), KeyModifiers::CONTROL) => {
                self.step_cursor(-page, SELECT)
            }

            (KeyCode::Char(' '), _) => {
                self.toggle_at_cursor();
                self.step_cursor(1, None);
            }
            (KeyCode::Backspace, _) => {
                self.toggle_at_cursor();
                self.step_cursor(-1, None);
            }

            (KeyCode::Char('a'), KeyModifiers::CONTROL) => self.presenter.select_all(),
            (KeyCode::Char('l'), KeyModifiers::CONTROL) => self.presenter.select_none(),
            (KeyCode::Char('t'), KeyModifiers::CONTROL) => self.presenter.select_inverse(),

            (KeyCode::Enter, _) => self.presenter.play_selected(delegate),
            (KeyCode::Char('a'), KeyModifiers::NONE) => self.presenter.append_selected(delegate),
            (KeyCode::Char('n'), KeyModifiers::NONE) => {
                self.presenter.play_selected_next(delegate)
            }
            (KeyCode::Char('e'), KeyModifiers::NONE) => self.presenter.edit_selected(delegate),
            (KeyCode::Char('d'), KeyModifiers::NONE) => self.presenter.delete_selected(delegate),

            (KeyCode::Char('r'), KeyModifiers::NONE) => self.presenter.reverse(),
            (KeyCode::Char('z'), KeyModifiers::NONE) => {
                self.presenter.shuffle_pages();
                self.presenter.sort();
            }

            _ => return false,
        }

        self.process_pending();
        true
    }

    /// Toggles the row under the cursor without touching the others.
    fn toggle_at_cursor(&mut self) {
        if let Some(cursor) = self.cursor {
            self.presenter.toggle_selected(cursor, SelectionModifiers::CTRL);
            self.process_pending();
        }
    }
}
