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

//! Media library indexing and database persistence.
//!
//! This module handles the discovery of audio files on the local filesystem
//! and the management of associated database records.
//!
//! It utilizes `WalkDir` for efficient directory traversal and `Lofty` for
//! metadata extraction.
//!
//! # Rescanning
//!
//! Tracks are matched by filename, so a rescan keeps their index, the date
//! they were added and any playlist entries pointing at them. Files that are
//! no longer found are removed, and so is any artist, album, genre or
//! publisher left without tracks.
//!
//! # Performance
//!
//! Large library scans are performed within an atomic SQLite transaction to
//! maximize write throughput and ensure database integrity.

use std::{
    collections::HashSet,
    path::{Path, PathBuf},
};

use lofty::{prelude::*, probe::Probe, tag::ItemKey};
use log::{debug, info, warn};
use rusqlite::{Connection, OptionalExtension, params};
use walkdir::WalkDir;
use xxhash_rust::xxh3::xxh3_64;

use crate::{
    error::{Result, ShelfError},
    model::DatabaseIndex,
};

const SUPPORTED_EXTENSIONS: &[&str] = &["mp3", "flac", "ogg", "opus", "m4a", "wav"];

const ARTWORK_NAMES: &[&str] = &["cover.jpg", "cover.png", "folder.jpg", "folder.png"];

/// Separators used in multi-value artist and genre tags.
const VALUE_SEPARATORS: &[char] = &[';', '/'];

/// Metadata for one audio file, ready to be written.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NewTrack {
    pub title: String,
    pub artists: Vec<String>,
    pub album: Option<String>,
    pub album_artist: Option<String>,
    pub genres: Vec<String>,
    pub publisher: Option<String>,
    pub track_number: Option<u32>,
    pub disc_number: Option<u32>,
    pub year: Option<u32>,
    pub duration: u64,
    pub bitrate: Option<u32>,
    pub filename: String,
    pub artwork_path: Option<String>,
}

/// Outcome of a library scan.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScanSummary {
    pub imported: usize,
    pub skipped: usize,
    pub removed: usize,
}

/// Recursively scans directories for audio files and synchronizes the database.
///
/// Every supported file under `roots` is read and written to the database.
/// Files that cannot be read are skipped with a warning. Tracks whose file
/// was not found under any root are removed afterwards.
///
/// # Errors
///
/// Returns an error if the transaction fails or if database constraints are
/// violated during insertion.
pub fn process_music_library(
    conn: &mut Connection,
    roots: &[PathBuf],
    now: i64,
) -> Result<ScanSummary> {
    let mut summary = ScanSummary::default();
    let mut seen: HashSet<String> = HashSet::new();

    let tx = conn.transaction()?;

    for root in roots {
        info!("Scanning {}", root.display());

        for entry in WalkDir::new(root)
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_type().is_file() && is_supported(e.path()))
        {
            let path = entry.path();
            match read_track(path) {
                Ok(track) => {
                    upsert_track(&tx, &track, now)?;
                    seen.insert(track.filename);
                    summary.imported += 1;
                }
                Err(e) => {
                    warn!("Skipping {}: {}", path.display(), e);
                    summary.skipped += 1;
                }
            }
        }
    }

    summary.removed = remove_missing(&tx, &seen)?;
    remove_orphans(&tx)?;

    tx.commit()?;

    debug!("Scan finished: {summary:?}");
    Ok(summary)
}

fn is_supported(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| SUPPORTED_EXTENSIONS.contains(&ext.to_lowercase().as_str()))
}

/// Reads the tags and audio properties of a file.
///
/// A file without any tag is still imported, titled after its file name.
///
/// # Errors
///
/// Returns [`ShelfError::Tags`] if the file cannot be probed or parsed.
pub fn read_track(path: &Path) -> Result<NewTrack> {
    let tagged_file = Probe::open(path)
        .and_then(|p| p.read())
        .map_err(|source| ShelfError::Tags { path: path.to_path_buf(), source })?;

    let filename = path
        .to_str()
        .ok_or_else(|| ShelfError::Unsupported(format!("non UTF-8 path {}", path.display())))?
        .to_string();

    let properties = tagged_file.properties();
    let mut track = NewTrack {
        title: path
            .file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_default(),
        duration: properties.duration().as_secs(),
        bitrate: properties.audio_bitrate(),
        artwork_path: find_artwork(path),
        filename,
        ..NewTrack::default()
    };

    let Some(tag) = tagged_file.primary_tag().or_else(|| tagged_file.first_tag()) else {
        return Ok(track);
    };

    if let Some(title) = tag.title().filter(|t| !t.trim().is_empty()) {
        track.title = title.trim().to_string();
    }
    track.artists = split_values(tag.artist().as_deref());
    track.genres = split_values(tag.genre().as_deref());
    track.album = non_empty(tag.album().as_deref());
    track.album_artist = non_empty(tag.get_string(ItemKey::AlbumArtist));
    track.publisher = non_empty(
        tag.get_string(ItemKey::Label)
            .or_else(|| tag.get_string(ItemKey::Publisher)),
    );
    track.track_number = tag.track();
    track.disc_number = tag.disk();
    track.year = tag.date().map(|d| u32::from(d.year));

    Ok(track)
}

fn non_empty(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

fn split_values(value: Option<&str>) -> Vec<String> {
    let mut values: Vec<String> = Vec::new();
    for part in value.unwrap_or_default().split(VALUE_SEPARATORS) {
        let part = part.trim();
        if !part.is_empty() && !values.iter().any(|v| v.eq_ignore_ascii_case(part)) {
            values.push(part.to_string());
        }
    }
    values
}

/// Looks for a conventional cover image next to the file.
fn find_artwork(path: &Path) -> Option<String> {
    let folder = path.parent()?;
    ARTWORK_NAMES
        .iter()
        .map(|name| folder.join(name))
        .find(|candidate| candidate.is_file())
        .and_then(|candidate| candidate.to_str().map(str::to_string))
}

/// Identity of a track that stays the same across rescans and database
/// rebuilds.
pub fn durable_id(filename: &str) -> i64 {
    xxh3_64(filename.as_bytes()) as i64
}

/// Inserts a track, or updates the track already stored for the same file.
///
/// Returns the index of the track.
pub fn upsert_track(conn: &Connection, track: &NewTrack, now: i64) -> Result<DatabaseIndex> {
    let album_artist_id = match &track.album_artist {
        Some(name) => Some(name_id(conn, "artists", name)?),
        None => None,
    };
    let album_id = match &track.album {
        Some(title) => Some(album_id(conn, album_artist_id, title, track)?),
        None => None,
    };
    let publisher_id = match &track.publisher {
        Some(name) => Some(name_id(conn, "publishers", name)?),
        None => None,
    };

    let mut stmt = conn.prepare_cached(
        "INSERT INTO tracks (durable_id, album_id, publisher_id, track_number, disc_number,
                             title, duration, year, bitrate, filename, date_added)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)
         ON CONFLICT (filename) DO UPDATE SET
            album_id = excluded.album_id,
            publisher_id = excluded.publisher_id,
            track_number = excluded.track_number,
            disc_number = excluded.disc_number,
            title = excluded.title,
            duration = excluded.duration,
            year = excluded.year,
            bitrate = excluded.bitrate",
    )?;
    stmt.execute(params![
        durable_id(&track.filename),
        album_id,
        publisher_id,
        track.track_number,
        track.disc_number,
        track.title,
        i64::try_from(track.duration).unwrap_or(i64::MAX),
        track.year,
        track.bitrate,
        track.filename,
        now,
    ])?;

    let track_id: DatabaseIndex = conn.query_row(
        "SELECT id FROM tracks WHERE filename = ?1",
        params![track.filename],
        |r| r.get(0),
    )?;

    replace_links(conn, "track_artists", "artist_id", "artists", track_id, &track.artists)?;
    replace_links(conn, "track_genres", "genre_id", "genres", track_id, &track.genres)?;

    Ok(track_id)
}

/// Returns the id of a row in one of the name tables, inserting it if needed.
fn name_id(conn: &Connection, table: &str, name: &str) -> Result<DatabaseIndex> {
    conn.prepare_cached(&format!("INSERT OR IGNORE INTO {table} (name) VALUES (?1)"))?
        .execute(params![name])?;
    let id = conn.query_row(
        &format!("SELECT id FROM {table} WHERE name = ?1"),
        params![name],
        |r| r.get(0),
    )?;
    Ok(id)
}

fn album_id(
    conn: &Connection,
    album_artist_id: Option<DatabaseIndex>,
    title: &str,
    track: &NewTrack,
) -> Result<DatabaseIndex> {
    let existing: Option<DatabaseIndex> = conn
        .query_row(
            "SELECT id FROM albums WHERE album_artist_id IS ?1 AND title = ?2",
            params![album_artist_id, title],
            |r| r.get(0),
        )
        .optional()?;

    match existing {
        Some(id) => {
            conn.prepare_cached(
                "UPDATE albums SET
                    year = COALESCE(year, ?2),
                    artwork_path = COALESCE(?3, artwork_path)
                 WHERE id = ?1",
            )?
            .execute(params![id, track.year, track.artwork_path])?;
            Ok(id)
        }
        None => {
            conn.prepare_cached(
                "INSERT INTO albums (album_artist_id, title, year, artwork_path)
                 VALUES (?1, ?2, ?3, ?4)",
            )?
            .execute(params![album_artist_id, title, track.year, track.artwork_path])?;
            Ok(conn.last_insert_rowid())
        }
    }
}

fn replace_links(
    conn: &Connection,
    link_table: &str,
    link_column: &str,
    name_table: &str,
    track_id: DatabaseIndex,
    names: &[String],
) -> Result<()> {
    conn.prepare_cached(&format!("DELETE FROM {link_table} WHERE track_id = ?1"))?
        .execute(params![track_id])?;

    for (position, name) in names.iter().enumerate() {
        let target = name_id(conn, name_table, name)?;
        conn.prepare_cached(&format!(
            "INSERT OR IGNORE INTO {link_table} (track_id, {link_column}, position)
             VALUES (?1, ?2, ?3)"
        ))?
        .execute(params![track_id, target, position as i64])?;
    }
    Ok(())
}

/// Deletes every track whose file was not seen by the scan.
fn remove_missing(conn: &Connection, seen: &HashSet<String>) -> Result<usize> {
    let stored: Vec<(DatabaseIndex, String)> = conn
        .prepare_cached("SELECT id, filename FROM tracks")?
        .query_map([], |r| Ok((r.get(0)?, r.get(1)?)))?
        .collect::<Result<_, _>>()?;

    let mut removed = 0;
    let mut stmt = conn.prepare_cached("DELETE FROM tracks WHERE id = ?1")?;
    for (id, filename) in stored {
        if !seen.contains(&filename) {
            removed += stmt.execute(params![id])?;
        }
    }
    Ok(removed)
}

/// Deletes grouping rows no track refers to any more.
fn remove_orphans(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "
        DELETE FROM albums WHERE id NOT IN
            (SELECT album_id FROM tracks WHERE album_id IS NOT NULL);
        DELETE FROM publishers WHERE id NOT IN
            (SELECT publisher_id FROM tracks WHERE publisher_id IS NOT NULL);
        DELETE FROM genres WHERE id NOT IN (SELECT genre_id FROM track_genres);
        DELETE FROM artists WHERE id NOT IN (SELECT artist_id FROM track_artists)
            AND id NOT IN (SELECT album_artist_id FROM albums WHERE album_artist_id IS NOT NULL);
    ",
    )?;
    Ok(())
}
