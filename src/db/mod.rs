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

//! Data access layer.
//!
//! This module handles all interactions with the SQLite database, including
//! schema creation, loading the library snapshot and the handful of writes
//! the application performs. It uses cached statements to optimize
//! frequently executed queries.
//!
//! # Tables
//!
//! * `artists`, `genres`, `publishers` - Unique names.
//! * `albums` - Groups tracks under titles, optionally linked to an album artist.
//! * `tracks` - Individual audio files with metadata and file paths.
//! * `track_artists`, `track_genres` - Ordered many-to-many links.
//! * `playlists`, `playlist_tracks` - User playlists and their ordered entries.
//! * `track_stats` - Play counts and ratings, keyed by durable id so that they
//!   survive a track being removed and scanned again.
//!
//! # Performance
//!
//! Most functions in this module use [`rusqlite::Connection::prepare_cached`]
//! to reduce SQL parsing overhead.

mod library;
mod model;
pub mod scan;

use log::debug;
use rusqlite::{Connection, params};

pub use library::load_library;

use crate::{
    error::{Result, ShelfError},
    model::{DatabaseIndex, Rating},
};

/// Opens a connection to the SQLite database and configures performance settings.
///
/// This function performs the following setup:
/// * **WAL Mode**: Enables Write-Ahead Logging for better concurrency.
/// * **Performance Tuning**: Sets synchronous mode to `NORMAL` and increases the cache size.
/// * **Constraints**: Enforces foreign key integrity.
/// * **Schema**: Executes [`create_schema`] to ensure all tables and indices exist.
///
/// # Errors
///
/// Returns an error if:
/// * The database file cannot be opened.
/// * The initial PRAGMA configurations fail.
/// * The schema initialization fails.
pub fn init_db(path: &str) -> Result<Connection> {
    let conn = Connection::open(path)?;

    let journal_mode: String = conn.query_row("PRAGMA journal_mode = WAL", [], |r| r.get(0))?;
    if journal_mode != "wal" {
        return Err(ShelfError::Unsupported(format!(
            "Failed to switch to WAL mode. Current mode: {journal_mode}"
        )));
    }

    configure(&conn)?;
    debug!("Opened database {path}");

    Ok(conn)
}

fn configure(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "
        PRAGMA synchronous = NORMAL;
        PRAGMA foreign_keys = ON;
        PRAGMA cache_size = -64000; -- Use 64MB of RAM for cache
    ",
    )?;

    conn.set_prepared_statement_cache_capacity(100);

    create_schema(conn)
}

/// Create the database schema.
///
/// Deleting a track cascades to its links and playlist entries. Deleting an
/// artist, album or publisher leaves the referencing rows in place with the
/// reference cleared.
///
/// This operation is wrapped in a single SQL transaction to ensure the schema
/// is updated atomically.
fn create_schema(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "BEGIN;

        CREATE TABLE IF NOT EXISTS artists (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL COLLATE NOCASE UNIQUE
        );

        CREATE TABLE IF NOT EXISTS genres (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL COLLATE NOCASE UNIQUE
        );

        CREATE TABLE IF NOT EXISTS publishers (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL COLLATE NOCASE UNIQUE
        );

        CREATE TABLE IF NOT EXISTS albums (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            album_artist_id INTEGER,
            title TEXT NOT NULL COLLATE NOCASE,
            year INTEGER,
            artwork_path TEXT,
            UNIQUE (album_artist_id, title),
            FOREIGN KEY (album_artist_id) REFERENCES artists (id) ON DELETE SET NULL
        );

        CREATE INDEX IF NOT EXISTS idx_albums_artist_id ON albums (album_artist_id);

        CREATE TABLE IF NOT EXISTS tracks (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            durable_id INTEGER NOT NULL UNIQUE,
            album_id INTEGER,
            publisher_id INTEGER,
            track_number INTEGER,
            disc_number INTEGER,
            title TEXT NOT NULL COLLATE NOCASE,
            duration INTEGER NOT NULL,
            year INTEGER,
            bitrate INTEGER,
            filename TEXT NOT NULL UNIQUE,
            date_added INTEGER NOT NULL,
            FOREIGN KEY (album_id) REFERENCES albums (id) ON DELETE SET NULL,
            FOREIGN KEY (publisher_id) REFERENCES publishers (id) ON DELETE SET NULL
        );

        CREATE INDEX IF NOT EXISTS idx_tracks_album_id ON tracks (album_id);

        CREATE TABLE IF NOT EXISTS track_artists (
            track_id INTEGER NOT NULL,
            artist_id INTEGER NOT NULL,
            position INTEGER NOT NULL,
            PRIMARY KEY (track_id, artist_id),
            FOREIGN KEY (track_id) REFERENCES tracks (id) ON DELETE CASCADE,
            FOREIGN KEY (artist_id) REFERENCES artists (id) ON DELETE CASCADE
        );

        CREATE TABLE IF NOT EXISTS track_genres (
            track_id INTEGER NOT NULL,
            genre_id INTEGER NOT NULL,
            position INTEGER NOT NULL,
            PRIMARY KEY (track_id, genre_id),
            FOREIGN KEY (track_id) REFERENCES tracks (id) ON DELETE CASCADE,
            FOREIGN KEY (genre_id) REFERENCES genres (id) ON DELETE CASCADE
        );

        CREATE TABLE IF NOT EXISTS playlists (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL,
            date_created INTEGER NOT NULL
        );

        CREATE TABLE IF NOT EXISTS playlist_tracks (
            playlist_id INTEGER NOT NULL,
            position INTEGER NOT NULL,
            track_id INTEGER NOT NULL,
            PRIMARY KEY (playlist_id, position),
            FOREIGN KEY (playlist_id) REFERENCES playlists (id) ON DELETE CASCADE,
            FOREIGN KEY (track_id) REFERENCES tracks (id) ON DELETE CASCADE
        );

        CREATE TABLE IF NOT EXISTS track_stats (
            durable_id INTEGER PRIMARY KEY,
            play_count INTEGER NOT NULL DEFAULT 0,
            rating INTEGER NOT NULL DEFAULT 0,
            last_played INTEGER
        );

        COMMIT;",
    )?;
    Ok(())
}

/// Creates an empty playlist and returns its index.
pub fn create_playlist(conn: &Connection, name: &str, date_created: i64) -> Result<DatabaseIndex> {
    let mut stmt = conn.prepare_cached("INSERT INTO playlists (name, date_created) VALUES (?1, ?2)")?;
    stmt.execute(params![name, date_created])?;
    Ok(conn.last_insert_rowid())
}

/// Appends tracks to the end of a playlist, in the given order.
///
/// # Errors
///
/// Returns [`ShelfError::NotFound`] if the playlist does not exist.
pub fn add_tracks_to_playlist(
    conn: &mut Connection,
    playlist_id: DatabaseIndex,
    track_ids: &[DatabaseIndex],
) -> Result<()> {
    let tx = conn.transaction()?;

    let exists: bool = tx.query_row(
        "SELECT EXISTS (SELECT 1 FROM playlists WHERE id = ?1)",
        params![playlist_id],
        |r| r.get(0),
    )?;
    if !exists {
        return Err(ShelfError::NotFound(playlist_id));
    }

    let next: i64 = tx.query_row(
        "SELECT COALESCE(MAX(position) + 1, 0) FROM playlist_tracks WHERE playlist_id = ?1",
        params![playlist_id],
        |r| r.get(0),
    )?;

    {
        let mut stmt = tx.prepare_cached(
            "INSERT INTO playlist_tracks (playlist_id, position, track_id) VALUES (?1, ?2, ?3)",
        )?;
        for (position, track_id) in (next..).zip(track_ids) {
            stmt.execute(params![playlist_id, position, track_id])?;
        }
    }

    tx.commit()?;
    Ok(())
}

pub fn delete_playlist(conn: &Connection, playlist_id: DatabaseIndex) -> Result<()> {
    let mut stmt = conn.prepare_cached("DELETE FROM playlists WHERE id = ?1")?;
    match stmt.execute(params![playlist_id])? {
        0 => Err(ShelfError::NotFound(playlist_id)),
        _ => Ok(()),
    }
}

/// Removes tracks from the library, along with their playlist entries.
///
/// Play statistics are kept. Returns the number of tracks removed.
pub fn delete_tracks(conn: &mut Connection, track_ids: &[DatabaseIndex]) -> Result<usize> {
    let tx = conn.transaction()?;
    let mut removed = 0;
    {
        let mut stmt = tx.prepare_cached("DELETE FROM tracks WHERE id = ?1")?;
        for id in track_ids {
            removed += stmt.execute(params![id])?;
        }
    }
    tx.commit()?;

    debug!("Deleted {removed} of {} tracks", track_ids.len());
    Ok(removed)
}

pub fn increment_play_count(conn: &Connection, durable_id: i64, played_at: i64) -> Result<()> {
    let sql = "
        INSERT INTO track_stats (durable_id, play_count, last_played)
        VALUES (?1, 1, ?2)
        ON CONFLICT (durable_id)
        DO UPDATE SET play_count = play_count + 1, last_played = ?2";

    let mut stmt = conn.prepare_cached(sql)?;
    stmt.execute(params![durable_id, played_at])?;

    Ok(())
}

pub fn update_rating(conn: &Connection, durable_id: i64, rating: Rating) -> Result<()> {
    let sql = "
        INSERT INTO track_stats (durable_id, rating)
        VALUES (?1, ?2)
        ON CONFLICT (durable_id)
        DO UPDATE SET rating = ?2";

    let mut stmt = conn.prepare_cached(sql)?;
    stmt.execute(params![durable_id, rating])?;

    Ok(())
}

#[cfg(test)]
pub(crate) fn open_in_memory() -> Result<Connection> {
    let conn = Connection::open_in_memory()?;
    configure(&conn)?;
    Ok(conn)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::db::scan::{NewTrack, upsert_track};

    fn new_track(filename: &str, title: &str, album: &str, artists: &[&str]) -> NewTrack {
        NewTrack {
            title: title.to_string(),
            artists: artists.iter().map(|a| a.to_string()).collect(),
            album: Some(album.to_string()),
            album_artist: artists.first().map(|a| a.to_string()),
            genres: vec!["Jazz".to_string()],
            publisher: None,
            track_number: Some(1),
            disc_number: Some(1),
            year: Some(1959),
            duration: 545,
            bitrate: Some(320),
            filename: filename.to_string(),
            artwork_path: None,
        }
    }

    fn seeded() -> Connection {
        let mut conn = open_in_memory().expect("db");
        let tx = conn.transaction().expect("tx");
        upsert_track(&tx, &new_track("/m/1.mp3", "So What", "Kind of Blue", &["Miles Davis"]), 10)
            .expect("insert");
        upsert_track(
            &tx,
            &new_track("/m/2.mp3", "Blue in Green", "Kind of Blue", &["Miles Davis", "Bill Evans"]),
            20,
        )
        .expect("insert");
        tx.commit().expect("commit");
        conn
    }

    #[test]
    fn test_load_resolves_relations() {
        let conn = seeded();

        let library = load_library(&conn).expect("load");

        assert_eq!(library.tracks.len(), 2);
        assert_eq!(library.albums.len(), 1);
        assert_eq!(library.artists.len(), 2);
        let second = &library.tracks[1];
        assert_eq!(second.album_title(), "Kind of Blue");
        assert_eq!(second.album_artist_name(), "Miles Davis");
        assert_eq!(second.artists.len(), 2);
        assert_eq!(second.artists[1].name, "Bill Evans");
        assert_eq!(second.genre_name(), "Jazz");
        assert_eq!(second.date_added, 20);
        assert!(Arc::ptr_eq(
            library.tracks[0].album.as_ref().expect("album"),
            second.album.as_ref().expect("album")
        ));
    }

    #[test]
    fn test_playlist_round_trip() {
        let mut conn = seeded();
        let library = load_library(&conn).expect("load");
        let ids: Vec<DatabaseIndex> = library.tracks.iter().map(|t| t.id).collect();

        let playlist = create_playlist(&conn, "Late night", 100).expect("create");
        add_tracks_to_playlist(&mut conn, playlist, &[ids[1], ids[0]]).expect("add");
        add_tracks_to_playlist(&mut conn, playlist, &[ids[1]]).expect("add");

        let library = load_library(&conn).expect("load");
        assert_eq!(library.playlists.len(), 1);
        assert_eq!(library.playlists[0].name, "Late night");
        assert_eq!(library.playlists[0].tracks, vec![ids[1], ids[0], ids[1]]);

        assert!(matches!(
            add_tracks_to_playlist(&mut conn, 999, &ids),
            Err(ShelfError::NotFound(999))
        ));
        delete_playlist(&conn, playlist).expect("delete");
        assert!(load_library(&conn).expect("load").playlists.is_empty());
    }

    #[test]
    fn test_delete_tracks_cascades_to_playlists() {
        let mut conn = seeded();
        let library = load_library(&conn).expect("load");
        let ids: Vec<DatabaseIndex> = library.tracks.iter().map(|t| t.id).collect();
        let playlist = create_playlist(&conn, "Mix", 1).expect("create");
        add_tracks_to_playlist(&mut conn, playlist, &ids).expect("add");

        let removed = delete_tracks(&mut conn, &[ids[0], 12345]).expect("delete");

        assert_eq!(removed, 1);
        let library = load_library(&conn).expect("load");
        assert_eq!(library.tracks.len(), 1);
        assert_eq!(library.playlists[0].tracks, vec![ids[1]]);
    }

    #[test]
    fn test_stats_are_joined() {
        let conn = seeded();
        let durable_id = load_library(&conn).expect("load").tracks[0].durable_id;

        increment_play_count(&conn, durable_id, 500).expect("play");
        increment_play_count(&conn, durable_id, 600).expect("play");
        update_rating(&conn, durable_id, Rating::Like).expect("rate");

        let library = load_library(&conn).expect("load");
        let track = &library.tracks[0];
        assert_eq!(track.play_count, 2);
        assert_eq!(track.last_played, Some(600));
        assert_eq!(track.rating, Rating::Like);
        assert_eq!(library.tracks[1].play_count, 0);
        assert_eq!(library.tracks[1].rating, Rating::Neutral);
    }
}
