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

//! In-memory snapshot of the music library.
//!
//! The snapshot is built once from the tracks and playlists handed over by
//! the persistence layer. Every grouping entity (albums, artists, genres and
//! the derived tags such as years and folders) is collected from the tracks
//! so that the snapshot only contains groups that actually hold music.

use std::{
    collections::{HashMap, HashSet},
    path::PathBuf,
    sync::Arc,
};

use crate::model::{
    Album, Artist, AudioFormat, DatabaseIndex, Disc, Folder, Genre, Playlist, Publisher, Track,
    Year,
};

#[derive(Debug, Clone, Default)]
pub struct Library {
    pub tracks: Vec<Arc<Track>>,
    pub albums: Vec<Arc<Album>>,
    pub artists: Vec<Arc<Artist>>,
    pub genres: Vec<Arc<Genre>>,
    pub publishers: Vec<Arc<Publisher>>,
    pub playlists: Vec<Arc<Playlist>>,
    pub years: Vec<Arc<Year>>,
    pub folders: Vec<Arc<Folder>>,
    pub formats: Vec<Arc<AudioFormat>>,
    pub discs: Vec<Arc<Disc>>,
}

impl Library {
    /// Builds a snapshot, deriving every grouping entity from `tracks`.
    ///
    /// Groups appear in the order their first track appears.
    pub fn new(tracks: Vec<Arc<Track>>, playlists: Vec<Arc<Playlist>>) -> Self {
        let mut albums = Distinct::default();
        let mut artists = Distinct::default();
        let mut genres = Distinct::default();
        let mut publishers = Distinct::default();

        let mut years: Vec<i32> = Vec::new();
        let mut folders: Vec<PathBuf> = Vec::new();
        let mut formats: Vec<String> = Vec::new();
        let mut discs: Vec<(Option<Arc<Album>>, u32)> = Vec::new();

        for track in &tracks {
            if let Some(album) = &track.album {
                albums.push(album.id, album);
                if let Some(artist) = &album.album_artist {
                    artists.push(artist.id, artist);
                }
            }
            for artist in &track.artists {
                artists.push(artist.id, artist);
            }
            for genre in &track.genres {
                genres.push(genre.id, genre);
            }
            if let Some(publisher) = &track.publisher {
                publishers.push(publisher.id, publisher);
            }
            if let Some(year) = track.effective_year() {
                if !years.contains(&year) {
                    years.push(year);
                }
            }
            if let Some(folder) = track.folder() {
                if !folders.contains(&folder) {
                    folders.push(folder);
                }
            }
            if let Some(ext) = track.extension() {
                if !formats.contains(&ext) {
                    formats.push(ext);
                }
            }
            if let Some(number) = track.disc_number {
                let album_id = track.album.as_ref().map(|a| a.id);
                let known = discs
                    .iter()
                    .any(|(a, n)| *n == number && a.as_ref().map(|a| a.id) == album_id);
                if !known {
                    discs.push((track.album.clone(), number));
                }
            }
        }

        years.sort_unstable();

        Self {
            tracks,
            albums: albums.items,
            artists: artists.items,
            genres: genres.items,
            publishers: publishers.items,
            playlists,
            years: years.into_iter().map(|value| Arc::new(Year { value })).collect(),
            folders: folders
                .into_iter()
                .zip(1..)
                .map(|(path, id)| Arc::new(Folder { id, path }))
                .collect(),
            formats: formats
                .into_iter()
                .zip(1..)
                .map(|(extension, id)| Arc::new(AudioFormat { id, extension }))
                .collect(),
            discs: discs
                .into_iter()
                .zip(1..)
                .map(|((album, number), id)| Arc::new(Disc { id, album, number }))
                .collect(),
        }
    }

    pub fn track(&self, id: DatabaseIndex) -> Option<&Arc<Track>> {
        self.tracks.iter().find(|t| t.id == id)
    }

    /// A copy of the library with the given tracks removed, also dropping
    /// them from every playlist.
    pub fn without_tracks(&self, removed: &[DatabaseIndex]) -> Self {
        let removed: HashSet<DatabaseIndex> = removed.iter().copied().collect();

        let tracks = self
            .tracks
            .iter()
            .filter(|t| !removed.contains(&t.id))
            .cloned()
            .collect();

        let playlists = self
            .playlists
            .iter()
            .map(|p| {
                Arc::new(Playlist {
                    tracks: p.tracks.iter().copied().filter(|id| !removed.contains(id)).collect(),
                    ..Playlist::clone(p)
                })
            })
            .collect();

        Self::new(tracks, playlists)
    }
}

/// Collects shared entities in first-seen order, skipping repeats.
struct Distinct<T> {
    seen: HashMap<DatabaseIndex, usize>,
    items: Vec<Arc<T>>,
}

impl<T> Default for Distinct<T> {
    fn default() -> Self {
        Self { seen: HashMap::new(), items: Vec::new() }
    }
}

impl<T> Distinct<T> {
    fn push(&mut self, id: DatabaseIndex, item: &Arc<T>) {
        if !self.seen.contains_key(&id) {
            self.seen.insert(id, self.items.len());
            self.items.push(Arc::clone(item));
        }
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::*;
    use crate::model::fixtures::*;

    #[test]
    fn test_groups_are_derived_from_tracks() {
        let miles = artist(1, "Miles Davis");
        let kind_of_blue = album(10, "Kind of Blue", Some(Arc::clone(&miles)));

        let mut a = track(1, "So What");
        a.album = Some(Arc::clone(&kind_of_blue));
        a.artists = vec![Arc::clone(&miles)];
        a.disc_number = Some(1);
        a.year = Some(1959);

        let mut b = track(2, "Freddie Freeloader");
        b.album = Some(Arc::clone(&kind_of_blue));
        b.artists = vec![Arc::clone(&miles)];
        b.disc_number = Some(1);
        b.year = Some(1959);
        b.filename = PathBuf::from("/other/Freddie.flac");

        let library = Library::new(vec![shared(a), shared(b)], vec![]);

        assert_eq!(library.albums.len(), 1);
        assert_eq!(library.artists.len(), 1);
        assert_eq!(library.years.len(), 1);
        assert_eq!(library.discs.len(), 1);
        assert_eq!(library.folders.len(), 2);
        let formats: Vec<&str> = library.formats.iter().map(|f| f.extension.as_str()).collect();
        assert_eq!(formats, vec!["mp3", "flac"]);
    }

    #[test]
    fn test_without_tracks_prunes_playlists() {
        let tracks = titled(&[(1, "a"), (2, "b"), (3, "c")]);
        let playlist = Arc::new(Playlist {
            id: 7,
            name: "Mix".to_string(),
            tracks: vec![3, 1, 2],
            date_created: 0,
        });
        let library = Library::new(tracks, vec![playlist]);

        let pruned = library.without_tracks(&[1]);

        assert_eq!(pruned.tracks.len(), 2);
        assert!(pruned.track(1).is_none());
        assert_eq!(pruned.playlists[0].tracks, vec![3, 2]);
    }
}
