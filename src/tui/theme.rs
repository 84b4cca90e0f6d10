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

//! Colours used by the terminal host.

use ratatui::style::Color;

#[derive(Debug, Clone, Copy)]
pub(crate) struct Theme {
    pub(crate) background_colour: Color,
    pub(crate) accent_colour: Color,
    pub(crate) border_colour: Color,
    pub(crate) status_bg: Color,
    pub(crate) error_fg: Color,

    pub(crate) cursor_bg: Color,
    pub(crate) selection_fg: Color,
    pub(crate) artwork_fg: Color,

    pub(crate) table_primary_fg: Color,
    pub(crate) table_secondary_fg: Color,
    pub(crate) table_detail_fg: Color,
    pub(crate) table_number_fg: Color,
}

impl Default for Theme {
    fn default() -> Self {
        Self::default_theme()
    }
}

impl Theme {
    pub(crate) const fn default_theme() -> Self {
        Self {
            background_colour: Color::Rgb(40, 20, 50),
            accent_colour: Color::Rgb(250, 189, 47),
            border_colour: Color::Rgb(102, 102, 102),
            status_bg: Color::Rgb(50, 30, 60),
            error_fg: Color::Rgb(255, 99, 71),

            cursor_bg: Color::Rgb(70, 50, 110),
            selection_fg: Color::Rgb(250, 189, 47),
            artwork_fg: Color::Rgb(120, 200, 160),

            table_primary_fg: Color::Rgb(255, 255, 255),
            table_secondary_fg: Color::Rgb(255, 215, 0),
            table_detail_fg: Color::Rgb(179, 157, 219),
            table_number_fg: Color::Rgb(162, 161, 166),
        }
    }

    /// Converts a colour into a CSS-style hexadecimal string, or `None` for
    /// anything but an `Rgb` colour.
    pub(crate) fn to_hex(colour: Color) -> Option<String> {
        match colour {
            Color::Rgb(r, g, b) => Some(format!("#{:02x}{:02x}{:02x}", r, g, b)),
            _ => None,
        }
    }
}
