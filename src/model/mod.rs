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

//! Domain models and core data structures.
//!
//! This module defines the central entities of the library (tracks, albums,
//! playlists and the various name tags used to group tracks) representing
//! the underlying data schema used for metadata management and playback.
//!
//! Entities are immutable once loaded and shared behind [`Arc`] so that
//! every presenter can reference the same instance without owning it. The
//! persistence layer is the only place entities are created.

pub mod library;

use std::{path::PathBuf, sync::Arc};

pub use library::Library;

/// Identity of an entity in the persistence layer.
pub type DatabaseIndex = i64;

/// Common behaviour for every entity that can back a list wrapper.
pub trait Entity: Send + Sync {
    fn index(&self) -> DatabaseIndex;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ArtworkId(pub i64);

/// Cover art belonging to an album.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artwork {
    pub id: ArtworkId,
    pub path: PathBuf,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord)]
pub enum Rating {
    Dislike,
    #[default]
    Neutral,
    Like,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artist {
    pub id: DatabaseIndex,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Genre {
    pub id: DatabaseIndex,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Publisher {
    pub id: DatabaseIndex,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Album {
    pub id: DatabaseIndex,
    pub title: String,
    pub album_artist: Option<Arc<Artist>>,
    pub year: Option<i32>,
    pub artwork: Option<Arc<Artwork>>,
}

impl Album {
    pub fn artist_name(&self) -> &str {
        self.album_artist.as_deref().map_or("", |a| a.name.as_str())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Track {
    pub id: DatabaseIndex,
    pub durable_id: i64,
    pub title: String,
    pub album: Option<Arc<Album>>,
    pub artists: Vec<Arc<Artist>>,
    pub genres: Vec<Arc<Genre>>,
    pub publisher: Option<Arc<Publisher>>,
    pub track_number: Option<u32>,
    pub disc_number: Option<u32>,
    pub year: Option<i32>,
    /// Length in whole seconds.
    pub duration: u64,
    /// Average bitrate in kbps.
    pub bitrate: Option<u32>,
    pub filename: PathBuf,
    /// Unix timestamp (seconds) of when the track entered the library.
    pub date_added: i64,
    pub play_count: u32,
    pub last_played: Option<i64>,
    pub rating: Rating,
}

impl Track {
    pub fn album_title(&self) -> &str {
        self.album.as_deref().map_or("", |a| a.title.as_str())
    }

    pub fn album_artist_name(&self) -> &str {
        self.album.as_deref().map_or("", Album::artist_name)
    }

    /// The first credited artist, or an empty string.
    pub fn artist_name(&self) -> &str {
        self.artists.first().map_or("", |a| a.name.as_str())
    }

    pub fn genre_name(&self) -> &str {
        self.genres.first().map_or("", |g| g.name.as_str())
    }

    pub fn publisher_name(&self) -> &str {
        self.publisher.as_deref().map_or("", |p| p.name.as_str())
    }

    pub fn artwork(&self) -> Option<&Arc<Artwork>> {
        self.album.as_deref().and_then(|a| a.artwork.as_ref())
    }

    /// Year of the track, falling back to the year of its album.
    pub fn effective_year(&self) -> Option<i32> {
        self.year.or_else(|| self.album.as_deref().and_then(|a| a.year))
    }

    pub fn folder(&self) -> Option<PathBuf> {
        self.filename.parent().map(|p| p.to_path_buf())
    }

    pub fn extension(&self) -> Option<String> {
        self.filename
            .extension()
            .map(|ext| ext.to_string_lossy().to_lowercase())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Playlist {
    pub id: DatabaseIndex,
    pub name: String,
    /// Track identities in playlist order.
    pub tracks: Vec<DatabaseIndex>,
    pub date_created: i64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Year {
    pub value: i32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Folder {
    pub id: DatabaseIndex,
    pub path: PathBuf,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AudioFormat {
    pub id: DatabaseIndex,
    pub extension: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Disc {
    pub id: DatabaseIndex,
    pub album: Option<Arc<Album>>,
    pub number: u32,
}

/// Lightweight summary of a selection, used for breadcrumb display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Capsule {
    pub title: String,
    pub subtitle: String,
    pub artwork: Option<ArtworkId>,
}

macro_rules! impl_entity {
    ($($ty:ty),* $(,)?) => {
        $(
            impl Entity for $ty {
                fn index(&self) -> DatabaseIndex {
                    self.id
                }
            }
        )*
    };
}

impl_entity!(Artist, Genre, Publisher, Album, Track, Playlist, Folder, AudioFormat, Disc);

impl Entity for Year {
    fn index(&self) -> DatabaseIndex {
        DatabaseIndex::from(self.value)
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    //! Small builders shared by the unit tests across the crate.

    use std::{path::PathBuf, sync::Arc};

    use super::*;

    pub(crate) fn artist(id: DatabaseIndex, name: &str) -> Arc<Artist> {
        Arc::new(Artist { id, name: name.to_string() })
    }

    pub(crate) fn album(id: DatabaseIndex, title: &str, artist: Option<Arc<Artist>>) -> Arc<Album> {
        Arc::new(Album {
            id,
            title: title.to_string(),
            album_artist: artist,
            year: None,
            artwork: Some(Arc::new(Artwork {
                id: ArtworkId(id),
                path: PathBuf::from(format!("/music/{title}/cover.jpg")),
            })),
        })
    }

    pub(crate) fn track(id: DatabaseIndex, title: &str) -> Track {
        Track {
            id,
            durable_id: id * 100,
            title: title.to_string(),
            album: None,
            artists: vec![],
            genres: vec![],
            publisher: None,
            track_number: None,
            disc_number: None,
            year: None,
            duration: 180,
            bitrate: None,
            filename: PathBuf::from(format!("/music/{title}.mp3")),
            date_added: 0,
            play_count: 0,
            last_played: None,
            rating: Rating::Neutral,
        }
    }

    pub(crate) fn shared(track: Track) -> Arc<Track> {
        Arc::new(track)
    }

    pub(crate) fn titled(tracks: &[(DatabaseIndex, &str)]) -> Vec<Arc<Track>> {
        tracks.iter().map(|&(id, title)| shared(track(id, title))).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::{fixtures::*, *};

    #[test]
    fn test_absent_relations_read_as_empty_strings() {
        let t = track(1, "Alone");
        assert_eq!(t.album_title(), "");
        assert_eq!(t.artist_name(), "");
        assert_eq!(t.album_artist_name(), "");
        assert_eq!(t.genre_name(), "");
        assert!(t.artwork().is_none());
        assert!(t.effective_year().is_none());
    }

    #[test]
    fn test_effective_year_falls_back_to_album() {
        let mut a = (*album(3, "Blue", None)).clone();
        a.year = Some(1971);
        let mut t = track(1, "River");
        t.album = Some(Arc::new(a));
        assert_eq!(t.effective_year(), Some(1971));
        t.year = Some(1972);
        assert_eq!(t.effective_year(), Some(1972));
    }

    #[test]
    fn test_extension_is_lowercased() {
        let mut t = track(1, "x");
        t.filename = PathBuf::from("/a/b/Song.FLAC");
        assert_eq!(t.extension().as_deref(), Some("flac"));
        assert_eq!(t.folder(), Some(PathBuf::from("/a/b")));
    }
}
