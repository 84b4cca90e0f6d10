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

//! Name tag list items.
//!
//! A name tag is any entity that groups tracks under a display name:
//! artists, genres, publishers, years, folders, audio formats and discs.
//! They all share one item type, [`NameTagItem`], which learns how to find
//! its tracks and what to call itself from a [`NameTagStrategy`] handed in
//! at construction.
//!
//! # Predefined strategies
//!
//! [`NameTagStrategy::artists`], [`NameTagStrategy::genres`],
//! [`NameTagStrategy::publishers`], [`NameTagStrategy::years`],
//! [`NameTagStrategy::folders`], [`NameTagStrategy::formats`] and
//! [`NameTagStrategy::discs`] cover the tags the library derives.

use std::{cmp::Ordering, fmt, rc::Rc, sync::Arc};

use super::{ItemState, ListItem, ListPresenter, Projection};
use crate::{
    model::{
        Artist, Artwork, AudioFormat, Capsule, DatabaseIndex, Disc, Entity, Folder, Genre,
        Publisher, Track, Year,
    },
    search::{SearchContext, SearchProvider},
    sorting::{OrderingStep, SortKey, compare_number, compare_text},
    util::format::track_count,
};

pub type NameTagsList<T> = ListPresenter<NameTagItem<T>>;

type TracksOf<T> = Rc<dyn Fn(&[Arc<Track>], &T) -> Vec<Arc<Track>>>;
type DisplayTitle<T> = Rc<dyn Fn(&T) -> String>;

/// How a kind of name tag finds its tracks and names itself.
pub struct NameTagStrategy<T> {
    tracks_of: TracksOf<T>,
    display_title: DisplayTitle<T>,
    context: SearchContext,
}

impl<T> NameTagStrategy<T> {
    pub fn new(
        context: SearchContext,
        tracks_of: impl Fn(&[Arc<Track>], &T) -> Vec<Arc<Track>> + 'static,
        display_title: impl Fn(&T) -> String + 'static,
    ) -> Self {
        Self {
            tracks_of: Rc::new(tracks_of),
            display_title: Rc::new(display_title),
            context,
        }
    }

    /// Strategy keeping every track of the pool for which `belongs` holds.
    pub fn matching(
        context: SearchContext,
        belongs: impl Fn(&Track, &T) -> bool + 'static,
        display_title: impl Fn(&T) -> String + 'static,
    ) -> Self {
        Self::new(
            context,
            move |pool, tag| pool.iter().filter(|t| belongs(t, tag)).cloned().collect(),
            display_title,
        )
    }

    pub fn tracks_of(&self, pool: &[Arc<Track>], tag: &T) -> Vec<Arc<Track>> {
        (self.tracks_of)(pool, tag)
    }

    pub fn display_title(&self, tag: &T) -> String {
        (self.display_title)(tag)
    }

    pub fn search_context(&self) -> SearchContext {
        self.context
    }
}

impl<T> Clone for NameTagStrategy<T> {
    fn clone(&self) -> Self {
        Self {
            tracks_of: Rc::clone(&self.tracks_of),
            display_title: Rc::clone(&self.display_title),
            context: self.context,
        }
    }
}

impl<T> fmt::Debug for NameTagStrategy<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NameTagStrategy")
            .field("context", &self.context)
            .finish_non_exhaustive()
    }
}

impl NameTagStrategy<Artist> {
    /// Tracks credited to the artist, or on an album by the artist.
    pub fn artists() -> Self {
        Self::matching(
            SearchContext::Artists,
            |track, artist| {
                track.artists.iter().any(|a| a.id == artist.id)
                    || track
                        .album
                        .as_ref()
                        .and_then(|album| album.album_artist.as_ref())
                        .is_some_and(|a| a.id == artist.id)
            },
            |artist| artist.name.clone(),
        )
    }
}

impl NameTagStrategy<Genre> {
    pub fn genres() -> Self {
        Self::matching(
            SearchContext::Genres,
            |track, genre| track.genres.iter().any(|g| g.id == genre.id),
            |genre| genre.name.clone(),
        )
    }
}

impl NameTagStrategy<Publisher> {
    pub fn publishers() -> Self {
        Self::matching(
            SearchContext::Publishers,
            |track, publisher| track.publisher.as_ref().is_some_and(|p| p.id == publisher.id),
            |publisher| publisher.name.clone(),
        )
    }
}

impl NameTagStrategy<Year> {
    pub fn years() -> Self {
        Self::matching(
            SearchContext::Years,
            |track, year| track.effective_year() == Some(year.value),
            |year| year.value.to_string(),
        )
    }
}

impl NameTagStrategy<Folder> {
    pub fn folders() -> Self {
        Self::matching(
            SearchContext::Folders,
            |track, folder| track.folder().as_deref() == Some(folder.path.as_path()),
            |folder| folder.path.display().to_string(),
        )
    }
}

impl NameTagStrategy<AudioFormat> {
    pub fn formats() -> Self {
        Self::matching(
            SearchContext::Formats,
            |track, format| track.extension().as_deref() == Some(format.extension.as_str()),
            |format| format.extension.to_uppercase(),
        )
    }
}

impl NameTagStrategy<Disc> {
    pub fn discs() -> Self {
        Self::matching(
            SearchContext::Discs,
            |track, disc| {
                track.disc_number == Some(disc.number)
                    && track.album.as_ref().map(|a| a.id) == disc.album.as_ref().map(|a| a.id)
            },
            |disc| match &disc.album {
                Some(album) => format!("{} (disc {})", album.title, disc.number),
                None => format!("Disc {}", disc.number),
            },
        )
    }
}

pub struct NameTagItem<T> {
    tag: Arc<T>,
    title: String,
    tracks: Vec<Arc<Track>>,
    state: ItemState,
}

impl<T> NameTagItem<T> {
    pub fn new(tag: Arc<T>, pool: &[Arc<Track>], strategy: &NameTagStrategy<T>) -> Self {
        let tracks = strategy.tracks_of(pool, &tag);
        let title = strategy.display_title(&tag);
        Self { tag, title, tracks, state: ItemState::default() }
    }

    pub fn tag(&self) -> &Arc<T> {
        &self.tag
    }

    pub fn duration(&self) -> u64 {
        self.tracks.iter().map(|t| t.duration).sum()
    }
}

impl<T> Clone for NameTagItem<T> {
    fn clone(&self) -> Self {
        Self {
            tag: Arc::clone(&self.tag),
            title: self.title.clone(),
            tracks: self.tracks.clone(),
            state: self.state.clone(),
        }
    }
}

impl<T> fmt::Debug for NameTagItem<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NameTagItem")
            .field("title", &self.title)
            .field("tracks", &self.tracks.len())
            .finish_non_exhaustive()
    }
}

impl<T: Entity> ListItem for NameTagItem<T> {
    fn entity_index(&self) -> DatabaseIndex {
        self.tag.index()
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
        &self.title
    }

    fn compare_by(&self, other: &Self, key: SortKey, ascending: bool) -> Ordering {
        match key {
            SortKey::Title => compare_text(&self.title, &other.title, ascending),
            SortKey::TrackCount => {
                compare_number(self.tracks.len(), other.tracks.len(), ascending)
            }
            SortKey::Duration => compare_number(self.duration(), other.duration(), ascending),
            _ => Ordering::Equal,
        }
    }

    fn capsule(&self) -> Capsule {
        Capsule {
            title: self.title.clone(),
            subtitle: track_count(self.tracks.len()),
            artwork: self.artwork().map(|a| a.id),
        }
    }

    fn artwork(&self) -> Option<&Arc<Artwork>> {
        self.tracks.iter().find_map(|t| t.artwork())
    }
}

/// One item per tag that has at least one track in the pool.
pub struct NameTagProjection<T> {
    tags: Vec<Arc<T>>,
    strategy: NameTagStrategy<T>,
}

impl<T> NameTagProjection<T> {
    pub fn new(tags: Vec<Arc<T>>, strategy: NameTagStrategy<T>) -> Self {
        Self { tags, strategy }
    }
}

impl<T> Projection<NameTagItem<T>> for NameTagProjection<T> {
    fn project(&self, pool: &[Arc<Track>]) -> Vec<NameTagItem<T>> {
        self.tags
            .iter()
            .map(|tag| NameTagItem::new(Arc::clone(tag), pool, &self.strategy))
            .filter(|item| !item.tracks.is_empty())
            .collect()
    }

    fn search_context(&self) -> SearchContext {
        self.strategy.search_context()
    }
}

impl<T: Entity + 'static> ListPresenter<NameTagItem<T>> {
    pub fn for_tags(
        tags: Vec<Arc<T>>,
        strategy: NameTagStrategy<T>,
        pool: Vec<Arc<Track>>,
        ordering: OrderingStep,
        search: Rc<dyn SearchProvider>,
    ) -> Self {
        Self::new(Box::new(NameTagProjection::new(tags, strategy)), pool, ordering, search)
    }
}
