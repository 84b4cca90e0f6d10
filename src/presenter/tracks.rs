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

use std::{cmp::Ordering, collections::HashSet, rc::Rc, slice, sync::Arc};

use super::{ItemState, ListItem, ListPresenter, Projection};
use crate::{
    model::{Artwork, Capsule, DatabaseIndex, Track},
    search::{SearchContext, SearchProvider},
    sorting::{OrderingStep, SortKey, compare_nullable, compare_number, compare_text, compare_value},
};

pub type TracksList = ListPresenter<TrackItem>;

#[derive(Debug, Clone)]
pub struct TrackItem {
    track: Arc<Track>,
    state: ItemState,
}

impl TrackItem {
    pub fn new(track: Arc<Track>) -> Self {
        Self { track, state: ItemState::default() }
    }

    pub fn track(&self) -> &Arc<Track> {
        &self.track
    }
}

impl ListItem for TrackItem {
    fn entity_index(&self) -> DatabaseIndex {
        self.track.id
    }

    fn state(&self) -> &ItemState {
        &self.state
    }

    fn state_mut(&mut self) -> &mut ItemState {
        &mut self.state
    }

    fn tracks(&self) -> &[Arc<Track>] {
        slice::from_ref(&self.track)
    }

    fn title(&self) -> &str {
        &self.track.title
    }

    fn compare_by(&self, other: &Self, key: SortKey, ascending: bool) -> Ordering {
        compare_tracks(&self.track, &other.track, key, ascending)
    }

    fn filter_tie_break(&self, other: &Self) -> Ordering {
        compare_text(&self.track.title, &other.track.title, true)
    }

    fn capsule(&self) -> Capsule {
        Capsule {
            title: self.track.title.clone(),
            subtitle: self.track.artist_name().to_string(),
            artwork: self.track.artwork().map(|a| a.id),
        }
    }

    fn artwork(&self) -> Option<&Arc<Artwork>> {
        self.track.artwork()
    }
}

/// Compares two tracks on a single key.
pub(crate) fn compare_tracks(a: &Track, b: &Track, key: SortKey, ascending: bool) -> Ordering {
    match key {
        SortKey::Title => compare_text(&a.title, &b.title, ascending),
        SortKey::Artist => compare_text(a.artist_name(), b.artist_name(), ascending),
        SortKey::Album => compare_text(a.album_title(), b.album_title(), ascending),
        SortKey::AlbumArtist => {
            compare_text(a.album_artist_name(), b.album_artist_name(), ascending)
        }
        SortKey::Genre => compare_text(a.genre_name(), b.genre_name(), ascending),
        SortKey::Publisher => compare_text(a.publisher_name(), b.publisher_name(), ascending),
        SortKey::Year => compare_nullable(a.effective_year(), b.effective_year(), ascending),
        SortKey::TrackNumber => compare_nullable(a.track_number, b.track_number, ascending),
        SortKey::DiscNumber => compare_nullable(a.disc_number, b.disc_number, ascending),
        SortKey::Duration => compare_number(a.duration, b.duration, ascending),
        SortKey::DateAdded => compare_number(a.date_added, b.date_added, ascending),
        SortKey::PlayCount => compare_number(a.play_count, b.play_count, ascending),
        SortKey::LastPlayed => compare_nullable(a.last_played, b.last_played, ascending),
        SortKey::Rating => compare_value(a.rating, b.rating, ascending),
        SortKey::Bitrate => compare_nullable(a.bitrate, b.bitrate, ascending),
        SortKey::Filename => compare_nullable(
            (!a.filename.as_os_str().is_empty()).then_some(&a.filename),
            (!b.filename.as_os_str().is_empty()).then_some(&b.filename),
            ascending,
        ),
        SortKey::TrackCount | SortKey::Random => Ordering::Equal,
    }
}

/// One item per distinct track in the pool.
#[derive(Debug, Default, Clone, Copy)]
pub struct TrackProjection;

impl Projection<TrackItem> for TrackProjection {
    fn project(&self, pool: &[Arc<Track>]) -> Vec<TrackItem> {
        let mut seen = HashSet::new();
        pool.iter()
            .filter(|track| seen.insert(track.id))
            .map(|track| TrackItem::new(Arc::clone(track)))
            .collect()
    }

    fn search_context(&self) -> SearchContext {
        SearchContext::Tracks
    }
}

impl ListPresenter<TrackItem> {
    pub fn for_tracks(
        pool: Vec<Arc<Track>>,
        ordering: OrderingStep,
        search: Rc<dyn SearchProvider>,
    ) -> Self {
        Self::new(Box::new(TrackProjection), pool, ordering, search)
    }
}
