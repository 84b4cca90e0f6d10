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

//! Library error type.
//!
//! Only the collaborators around the presenters (persistence, artwork
//! loading, configuration) can fail. Presenters themselves never return
//! errors.

use std::path::PathBuf;

use thiserror::Error;

use crate::model::DatabaseIndex;

#[derive(Debug, Error)]
pub enum ShelfError {
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    #[error("configuration error: {0}")]
    Config(#[from] confy::ConfyError),

    #[error("failed to read tags from {path}: {source}")]
    Tags {
        path: PathBuf,
        #[source]
        source: lofty::error::LoftyError,
    },

    #[error("no entity with index {0}")]
    NotFound(DatabaseIndex),

    #[error("{0}")]
    Unsupported(String),
}

pub type Result<T, E = ShelfError> = std::result::Result<T, E>;
