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

//! Album list items.
//!
//! The pool is grouped by album in the order albums are first seen. Tracks
//! without an album are left out of this list entirely.

use std::{cmp::Ordering, collections::HashMap, rc::Rc, sync::Arc};

use super::{ItemState, ListItem, ListPresenter, Projection};
use crate::{
    model::{Album, Artwork, Capsule, DatabaseIndex, Track},
    search::{SearchContext, SearchProvider},
    sorting::{OrderingStep, SortKey, compare_nullable, compare_number, compare_text},
    util::format::track_count,
};

pub type AlbumsList = ListPresenter<AlbumItem>;

#[derive(Debug, Clone)]
pub struct AlbumItem {
    album: Arc<Album>,
    /// Ordered by disc, then track number.
    tracks: Vec<Arc<Track>>,
    state: ItemState,
}

impl AlbumItem {
    pub fn new(album: Arc<Album>, mut tracks: Vec<Arc<Track>>) -> Self {
        tracks.sort_by(|a, b| {
            compare_nullable(a.disc_number, b.disc_number, true)
                .then_with(|| compare_nullable(a.track_number, b.track_number, true))
        });
        Self { album, tracks, state: ItemState::default() }
    }

    pub fn album(&self) -> &Arc<Album> {
        &self.album
    }

    /// Album year, or the latest year among its tracks.
    pub fn year(&self) -> Option<i32> {
        self.album
            .year
            .or_else(|| self.tracks.iter().filter_map(|t| t.year).max())
    }

    pub fn duration(&self) -> u64 {
        self.tracks.iter().map(|t| t.duration).sum()
    }

    fn date_added(&self) -> Option<i64> {
        self.tracks.iter().map(|t| t.date_added).max()
    }

    fn play_count(&self) -> u64 {
        self.tracks.iter().map(|t| u64::from(t.play_count)).sum()
    }

    fn last_played(&self) -> Option<i64> {
        self.tracks.iter().filter_map(|t| t.last_played).max()
    }

    fn genre_name(&self) -> &str {
        self.tracks.first().map_or("", |t| t.genre_name())
    }
}

impl ListItem for AlbumItem {
    fn entity_index(&self) -> DatabaseIndex {
        self.album.id
    }

    fn state(&self) -> &ItemState {
        &self.state
    }

    fn state_mut(&mut self) -> &mut ItemState {
        &mut self.state
    }

    fn tracks(&self) -> &[Arc<Track>] {
        &self.tracks
    }

    fn title(&self) -> &str {
        &self.album.title
    }

    fn compare_by(&self, other: &Self, key: SortKey, ascending: bool) -> Ordering {
        match key {
            SortKey::Title | SortKey::Album => {
                compare_text(&self.album.title, &other.album.title, ascending)
            }
            SortKey::Artist | SortKey::AlbumArtist => {
                compare_text(self.album.artist_name(), other.album.artist_name(), ascending)
            }
            SortKey::Genre => compare_text(self.genre_name(), other.genre_name(), ascending),
            SortKey::Year => compare_nullable(self.year(), other.year(), ascending),
            SortKey::Duration => compare_number(self.duration(), other.duration(), ascending),
            SortKey::DateAdded => compare_nullable(self.date_added(), other.date_added(), ascending),
            SortKey::PlayCount => compare_number(self.play_count(), other.play_count(), ascending),
            SortKey::LastPlayed => {
                compare_nullable(self.last_played(), other.last_played(), ascending)
            }
            SortKey::TrackCount => {
                compare_number(self.tracks.len(), other.tracks.len(), ascending)
            }
            _ => Ordering::Equal,
        }
    }

    fn capsule(&self) -> Capsule {
        Capsule {
            title: self.album.title.clone(),
            subtitle: match self.album.artist_name() {
                "" => track_count(self.tracks.len()),
                artist => artist.to_string(),
            },
            artwork: self.album.artwork.as_ref().map(|a| a.id),
        }
    }

    fn artwork(&self) -> Option<&Arc<Artwork>> {
        self.album.artwork.as_ref()
    }
}

/// Groups the pool by album.
#[derive(Debug, Default, Clone, Copy)]
pub struct AlbumProjection;

impl Projection<AlbumItem> for AlbumProjection {
    fn project(&self, pool: &[Arc<Track>]) -> Vec<AlbumItem> {
        let mut order: Vec<Arc<Album>> = Vec::new();
        let mut groups: HashMap<DatabaseIndex, Vec<Arc<Track>>> = HashMap::new();

        for track in pool {
            let Some(album) = &track.album else {
                continue;
            };
            let group = groups.entry(album.id).or_insert_with(|| {
                order.push(Arc::clone(album));
                Vec::new()
            });
            if !group.iter().any(|t| t.id == track.id) {
                group.push(Arc::clone(track));
            }
        }

        order
            .into_iter()
            .map(|album| {
                let tracks = groups.remove(&album.id).unwrap_or_default();
                AlbumItem::new(album, tracks)
            })
            .collect()
    }

    fn search_context(&self) -> SearchContext {
        SearchContext::Albums
    }
}

impl ListPresenter<AlbumItem> {
    pub fn for_albums(
        pool: Vec<Arc<Track>>,
        ordering: OrderingStep,
        search: Rc<dyn SearchProvider>,
    ) -> Self {
        Self::new(Box::new(AlbumProjection), pool, ordering, search)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        actions::{LibraryAction, RecordingDelegate},
        model::fixtures::*,
        search::TextSearch,
        sorting::SortingKey,
        virtualization::SelectionModifiers,
    };

    fn on_album(id: DatabaseIndex, title: &str, album: &Arc<Album>, number: u32) -> Arc<Track> {
        let mut t = track(id, title);
        t.album = Some(Arc::clone(album));
        t.track_number = Some(number);
        shared(t)
    }

    fn pool() -> Vec<Arc<Track>> {
        let kid_a = album(10, "Kid A", Some(artist(1, "Radiohead")));
        let blue = album(20, "Blue", Some(artist(2, "Joni Mitchell")));
        vec![
            on_album(1, "Idioteque", &kid_a, 8),
            on_album(2, "River", &blue, 7),
            shared(track(3, "Loose")),
            on_album(4, "Everything In Its Right Place", &kid_a, 1),
        ]
    }

    fn by(key: SortKey) -> OrderingStep {
        OrderingStep::new(vec![SortingKey::ascending(key)])
    }

    #[test]
    fn test_groups_by_album_and_skips_loose_tracks() {
        let list = AlbumsList::for_albums(pool(), OrderingStep::default(), Rc::new(TextSearch));

        let ids: Vec<DatabaseIndex> = list.items().map(ListItem::entity_index).collect();
        assert_eq!(ids, vec![10, 20]);

        let kid_a = list.item(0).expect("album");
        let numbers: Vec<Option<u32>> = kid_a.tracks().iter().map(|t| t.track_number).collect();
        assert_eq!(numbers, vec![Some(1), Some(8)]);
    }

    #[test]
    fn test_sort_by_track_count_descending() {
        let ordering = OrderingStep::new(vec![SortingKey::descending(SortKey::TrackCount)]);
        let list = AlbumsList::for_albums(pool(), ordering, Rc::new(TextSearch));

        assert_eq!(list.item(0).map(ListItem::entity_index), Some(10));
        assert!(!list.ascending());
    }

    /// Fixed weights per track, whatever the search string.
    struct FixedWeights(HashMap<DatabaseIndex, crate::search::Weight>);

    impl SearchProvider for FixedWeights {
        fn filter_tracks(
            &self,
            _search: &str,
            _tracks: &[Arc<Track>],
            _context: SearchContext,
        ) -> HashMap<DatabaseIndex, crate::search::Weight> {
            self.0.clone()
        }
    }

    #[test]
    fn test_filter_sums_track_weights() {
        let weights = FixedWeights(HashMap::from([(1, 1), (4, 1), (2, 3)]));
        let mut list = AlbumsList::for_albums(pool(), by(SortKey::Title), Rc::new(weights));

        list.filter("anything");

        let ids: Vec<DatabaseIndex> = list.items().map(ListItem::entity_index).collect();
        assert_eq!(ids, vec![20, 10]);
    }

    #[test]
    fn test_filter_ties_keep_projection_order() {
        let weights = FixedWeights(HashMap::from([(1, 1), (2, 1)]));
        let mut list = AlbumsList::for_albums(pool(), by(SortKey::Title), Rc::new(weights));
        assert_eq!(list.item(0).map(ListItem::entity_index), Some(20));

        list.filter("anything");

        let ids: Vec<DatabaseIndex> = list.items().map(ListItem::entity_index).collect();
        assert_eq!(ids, vec![10, 20]);
    }

    #[test]
    fn test_text_filter_matches_album_artist() {
        let mut list = AlbumsList::for_albums(pool(), by(SortKey::Title), Rc::new(TextSearch));

        list.filter("radiohead");

        let ids: Vec<DatabaseIndex> = list.items().map(ListItem::entity_index).collect();
        assert_eq!(ids, vec![10]);
    }

    #[test]
    fn test_selection_flattens_tracks() {
        let mut list = AlbumsList::for_albums(pool(), by(SortKey::Title), Rc::new(TextSearch));
        list.select(0, SelectionModifiers::NONE);
        list.select(1, SelectionModifiers::CTRL);

        let ids: Vec<DatabaseIndex> = list.selected_tracks().iter().map(|t| t.id).collect();
        assert_eq!(ids, vec![2, 4, 1]);

        let delegate = RecordingDelegate::default();
        list.play_selected(&delegate);
        assert!(matches!(&delegate.take()[0], LibraryAction::Play(t) if t.len() == 3));
    }

    #[test]
    fn test_capsule_uses_album_artist_and_artwork() {
        let mut list = AlbumsList::for_albums(pool(), by(SortKey::Title), Rc::new(TextSearch));
        list.select(1, SelectionModifiers::NONE);

        let capsule = list.capsule().expect("capsule");
        assert_eq!(capsule.title, "Kid A");
        assert_eq!(capsule.subtitle, "Radiohead");
        assert_eq!(capsule.artwork, Some(crate::model::ArtworkId(10)));
    }
}
