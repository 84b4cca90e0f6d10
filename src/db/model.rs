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

//! Database row mapping for domain models.
//!
//! Rows are read into flat structs holding foreign keys. Resolving those keys
//! into shared entities happens in [`super::library`] once every table has
//! been read.

use std::path::PathBuf;

use rusqlite::{
    Result, Row, ToSql,
    types::{FromSql, FromSqlError, FromSqlResult, ToSqlOutput, ValueRef},
};

use crate::model::{DatabaseIndex, Rating};

/// A row of the `albums` table.
#[derive(Debug, Clone)]
pub(crate) struct AlbumRow {
    pub id: DatabaseIndex,
    pub title: String,
    pub album_artist_id: Option<DatabaseIndex>,
    pub year: Option<i32>,
    pub artwork_path: Option<String>,
}

impl AlbumRow {
    pub(crate) fn from_row(row: &Row) -> Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            title: row.get(1)?,
            album_artist_id: row.get(2)?,
            year: row.get(3)?,
            artwork_path: row.get(4)?,
        })
    }
}

/// A row of the `tracks` table joined with its `track_stats`.
#[derive(Debug, Clone)]
pub(crate) struct TrackRow {
    pub id: DatabaseIndex,
    pub durable_id: i64,
    pub album_id: Option<DatabaseIndex>,
    pub publisher_id: Option<DatabaseIndex>,
    pub track_number: Option<u32>,
    pub disc_number: Option<u32>,
    pub title: String,
    pub duration: i64,
    pub year: Option<i32>,
    pub bitrate: Option<u32>,
    pub filename: PathBuf,
    pub date_added: i64,
    pub play_count: u32,
    pub rating: Rating,
    pub last_played: Option<i64>,
}

impl TrackRow {
    /// Column list matching [`TrackRow::from_row`].
    pub(crate) const COLUMNS: &'static str = "
        tr.id, tr.durable_id, tr.album_id, tr.publisher_id, tr.track_number,
        tr.disc_number, tr.title, tr.duration, tr.year, tr.bitrate, tr.filename,
        tr.date_added, COALESCE(st.play_count, 0), COALESCE(st.rating, 0),
        st.last_played";

    /// Maps an SQLite row to a [`TrackRow`].
    ///
    /// # Errors
    ///
    /// Returns a [`rusqlite::Error`] if:
    /// * The row does not contain enough columns.
    /// * The data in a column cannot be converted to the required Rust type.
    pub(crate) fn from_row(row: &Row) -> Result<Self> {
        let filename: String = row.get(10)?;
        Ok(Self {
            id: row.get(0)?,
            durable_id: row.get(1)?,
            album_id: row.get(2)?,
            publisher_id: row.get(3)?,
            track_number: row.get(4)?,
            disc_number: row.get(5)?,
            title: row.get(6)?,
            duration: row.get(7)?,
            year: row.get(8)?,
            bitrate: row.get(9)?,
            filename: PathBuf::from(filename),
            date_added: row.get(11)?,
            play_count: row.get(12)?,
            rating: row.get(13)?,
            last_played: row.get(14)?,
        })
    }
}

impl ToSql for Rating {
    fn to_sql(&self) -> Result<ToSqlOutput<'_>> {
        let val = match self {
            Rating::Like => 1,
            Rating::Neutral => 0,
            Rating::Dislike => -1,
        };
        Ok(ToSqlOutput::from(val))
    }
}

impl FromSql for Rating {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        match value.as_i64()? {
            1 => Ok(Rating::Like),
            0 => Ok(Rating::Neutral),
            -1 => Ok(Rating::Dislike),
            other => Err(FromSqlError::OutOfRange(other)),
        }
    }
}
