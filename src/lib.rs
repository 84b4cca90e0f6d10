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

//! # Music library presenters.
//!
//! The presentation layer of a music library browser: list presenters that
//! project a pool of tracks into tracks, albums, playlists or name tags
//! (artists, genres, years and so on), keep them sorted or filtered, and
//! track a multi-selection with a primary item and a range anchor.
//!
//! ## Architecture
//!
//! * [`presenter`] holds the generic [`ListPresenter`] and its projections.
//! * [`sorting`] and [`search`] supply the orderings it applies.
//! * [`virtualization`] and [`artwork`] connect it to a host that only draws
//!   the rows on screen.
//! * [`db`] reads the library from SQLite and keeps it in sync with the
//!   filesystem.
//!
//! Presenters are single-threaded and never fail. Everything that touches
//! the disk returns a [`Result`](error::Result).

pub mod actions;
pub mod artwork;
pub mod config;
pub mod controls;
pub mod db;
pub mod error;
pub mod model;
pub mod observer;
pub mod presenter;
pub mod search;
pub mod sorting;
pub mod util;
pub mod virtualization;

pub use error::{Result, ShelfError};
pub use presenter::{ListItem, ListPresenter};
