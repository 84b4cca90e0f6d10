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

//! Loading the in-memory library snapshot.
//!
//! Every table is read once and relations are resolved in memory. A foreign
//! key pointing at a row that no longer exists resolves to no relation
//! rather than an error.

use std::{collections::HashMap, path::PathBuf, sync::Arc};

use log::debug;
use rusqlite::Connection;

use super::model::{AlbumRow, TrackRow};
use crate::{
    error::Result,
    model::{
        Album, Artist, Artwork, ArtworkId, DatabaseIndex, Genre, Library, Playlist, Publisher,
        Track,
    },
};

/// Reads the whole library into shared entities.
///
/// # Errors
///
/// Returns an error if any of the queries fail or a column holds a value of
/// the wrong type.
pub fn load_library(conn: &Connection) -> Result<Library> {
    let artists: HashMap<DatabaseIndex, Arc<Artist>> =
        load_names(conn, "SELECT id, name FROM artists", |id, name| Artist { id, name })?;
    let genres: HashMap<DatabaseIndex, Arc<Genre>> =
        load_names(conn, "SELECT id, name FROM genres", |id, name| Genre { id, name })?;
    let publishers: HashMap<DatabaseIndex, Arc<Publisher>> =
        load_names(conn, "SELECT id, name FROM publishers", |id, name| Publisher { id, name })?;

    let albums = load_albums(conn, &artists)?;

    let mut track_artists = load_links(
        conn,
        "SELECT track_id, artist_id FROM track_artists ORDER BY track_id, position",
        &artists,
    )?;
    let mut track_genres = load_links(
        conn,
        "SELECT track_id, genre_id FROM track_genres ORDER BY track_id, position",
        &genres,
    )?;

    let sql = format!(
        "SELECT {} FROM tracks tr
         LEFT JOIN track_stats st ON st.durable_id = tr.durable_id
         ORDER BY tr.id",
        TrackRow::COLUMNS
    );
    let mut stmt = conn.prepare_cached(&sql)?;
    let rows = stmt
        .query_map([], TrackRow::from_row)?
        .collect::<Result<Vec<_>, _>>()?;

    let tracks: Vec<Arc<Track>> = rows
        .into_iter()
        .map(|row| {
            Arc::new(Track {
                id: row.id,
                durable_id: row.durable_id,
                title: row.title,
                album: row.album_id.and_then(|id| albums.get(&id).cloned()),
                artists: track_artists.remove(&row.id).unwrap_or_default(),
                genres: track_genres.remove(&row.id).unwrap_or_default(),
                publisher: row.publisher_id.and_then(|id| publishers.get(&id).cloned()),
                track_number: row.track_number,
                disc_number: row.disc_number,
                year: row.year,
                duration: u64::try_from(row.duration).unwrap_or(0),
                bitrate: row.bitrate,
                filename: row.filename,
                date_added: row.date_added,
                play_count: row.play_count,
                last_played: row.last_played,
                rating: row.rating,
            })
        })
        .collect();

    let playlists = load_playlists(conn)?;

    debug!("Loaded {} tracks and {} playlists", tracks.len(), playlists.len());

    Ok(Library::new(tracks, playlists))
}

fn load_names<T>(
    conn: &Connection,
    sql: &str,
    build: impl Fn(DatabaseIndex, String) -> T,
) -> Result<HashMap<DatabaseIndex, Arc<T>>> {
    let mut stmt = conn.prepare_cached(sql)?;
    let rows = stmt.query_map([], |row| {
        Ok((row.get::<_, DatabaseIndex>(0)?, row.get::<_, String>(1)?))
    })?;

    let mut results = HashMap::new();
    for row in rows {
        let (id, name) = row?;
        results.insert(id, Arc::new(build(id, name)));
    }
    Ok(results)
}

fn load_albums(
    conn: &Connection,
    artists: &HashMap<DatabaseIndex, Arc<Artist>>,
) -> Result<HashMap<DatabaseIndex, Arc<Album>>> {
    let mut stmt =
        conn.prepare_cached("SELECT id, title, album_artist_id, year, artwork_path FROM albums")?;
    let rows = stmt.query_map([], AlbumRow::from_row)?;

    let mut results = HashMap::new();
    for row in rows {
        let row = row?;
        let album = Album {
            id: row.id,
            title: row.title,
            album_artist: row.album_artist_id.and_then(|id| artists.get(&id).cloned()),
            year: row.year,
            artwork: row.artwork_path.map(|path| {
                Arc::new(Artwork { id: ArtworkId(row.id), path: PathBuf::from(path) })
            }),
        };
        results.insert(row.id, Arc::new(album));
    }
    Ok(results)
}

/// Reads a link table into per-track lists of shared entities.
fn load_links<T>(
    conn: &Connection,
    sql: &str,
    targets: &HashMap<DatabaseIndex, Arc<T>>,
) -> Result<HashMap<DatabaseIndex, Vec<Arc<T>>>> {
    let mut stmt = conn.prepare_cached(sql)?;
    let rows = stmt.query_map([], |row| {
        Ok((row.get::<_, DatabaseIndex>(0)?, row.get::<_, DatabaseIndex>(1)?))
    })?;

    let mut links: HashMap<DatabaseIndex, Vec<Arc<T>>> = HashMap::new();
    for row in rows {
        let (track_id, target_id) = row?;
        if let Some(target) = targets.get(&target_id) {
            links.entry(track_id).or_default().push(Arc::clone(target));
        }
    }
    Ok(links)
}

fn load_playlists(conn: &Connection) -> Result<Vec<Arc<Playlist>>> {
    let mut stmt = conn.prepare_cached(
        "SELECT playlist_id, track_id FROM playlist_tracks ORDER BY playlist_id, position",
    )?;
    let mut entries: HashMap<DatabaseIndex, Vec<DatabaseIndex>> = HashMap::new();
    let rows = stmt.query_map([], |row| {
        Ok((row.get::<_, DatabaseIndex>(0)?, row.get::<_, DatabaseIndex>(1)?))
    })?;
    for row in rows {
        let (playlist_id, track_id) = row?;
        entries.entry(playlist_id).or_default().push(track_id);
    }

    let mut stmt = conn.prepare_cached("SELECT id, name, date_created FROM playlists ORDER BY id")?;
    let rows = stmt.query_map([], |row| {
        let id: DatabaseIndex = row.get(0)?;
        Ok(Playlist { id, name: row.get(1)?, tracks: Vec::new(), date_created: row.get(2)? })
    })?;

    let mut results = Vec::new();
    for row in rows {
        let mut playlist = row?;
        playlist.tracks = entries.remove(&playlist.id).unwrap_or_default();
        results.push(Arc::new(playlist));
    }
    Ok(results)
}
