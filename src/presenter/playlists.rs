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

use std::{cmp::Ordering, collections::HashMap, rc::Rc, sync::Arc};

use super::{ItemState, ListItem, ListPresenter, Projection};
use crate::{
    actions::{ActionDelegate, LibraryAction},
    model::{Artwork, Capsule, DatabaseIndex, Playlist, Track},
    search::{SearchContext, SearchProvider},
    sorting::{OrderingStep, SortKey, compare_number, compare_text},
    util::format::{format_duration, track_count},
};

pub type PlaylistsList = ListPresenter<PlaylistItem>;

#[derive(Debug, Clone)]
pub struct PlaylistItem {
    playlist: Arc<Playlist>,
    /// Playlist entries found in the pool, in playlist order.
    tracks: Vec<Arc<Track>>,
    state: ItemState,
}

impl PlaylistItem {
    pub fn new(playlist: Arc<Playlist>, tracks: Vec<Arc<Track>>) -> Self {
        Self { playlist, tracks, state: ItemState::default() }
    }

    pub fn playlist(&self) -> &Arc<Playlist> {
        &self.playlist
    }

    pub fn duration(&self) -> u64 {
        self.tracks.iter().map(|t| t.duration).sum()
    }
}

impl ListItem for PlaylistItem {
    fn entity_index(&self) -> DatabaseIndex {
        self.playlist.id
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
        &self.playlist.name
    }

    fn compare_by(&self, other: &Self, key: SortKey, ascending: bool) -> Ordering {
        match key {
            SortKey::Title => compare_text(&self.playlist.name, &other.playlist.name, ascending),
            SortKey::DateAdded => compare_number(
                self.playlist.date_created,
                other.playlist.date_created,
                ascending,
            ),
            SortKey::Duration => compare_number(self.duration(), other.duration(), ascending),
            SortKey::TrackCount => {
                compare_number(self.tracks.len(), other.tracks.len(), ascending)
            }
            _ => Ordering::Equal,
        }
    }

    fn capsule(&self) -> Capsule {
        Capsule {
            title: self.playlist.name.clone(),
            subtitle: format!(
                "{}, {}",
                track_count(self.tracks.len()),
                format_duration(self.duration())
            ),
            artwork: self.artwork().map(|a| a.id),
        }
    }

    /// Artwork of the first entry that has any.
    fn artwork(&self) -> Option<&Arc<Artwork>> {
        self.tracks.iter().find_map(|t| t.artwork())
    }

    fn delete(&self, delegate: &dyn ActionDelegate) {
        delegate.dispatch(LibraryAction::DeletePlaylist(self.playlist.id));
    }
}

/// One item per playlist, each resolved against the pool.
///
/// Every playlist is listed, including those with no entries in the pool.
#[derive(Debug, Default, Clone)]
pub struct PlaylistProjection {
    playlists: Vec<Arc<Playlist>>,
}

impl PlaylistProjection {
    pub fn new(playlists: Vec<Arc<Playlist>>) -> Self {
        Self { playlists }
    }
}

impl Projection<PlaylistItem> for PlaylistProjection {
    fn project(&self, pool: &[Arc<Track>]) -> Vec<PlaylistItem> {
        let by_id: HashMap<DatabaseIndex, &Arc<Track>> = pool.iter().map(|t| (t.id, t)).collect();

        self.playlists
            .iter()
            .map(|playlist| {
                let tracks = playlist
                    .tracks
                    .iter()
                    .filter_map(|id| by_id.get(id).map(|&t| Arc::clone(t)))
                    .collect();
                PlaylistItem::new(Arc::clone(playlist), tracks)
            })
            .collect()
    }

    fn search_context(&self) -> SearchContext {
        SearchContext::Playlists
    }
}

impl ListPresenter<PlaylistItem> {
    pub fn for_playlists(
        playlists: Vec<Arc<Playlist>>,
        pool: Vec<Arc<Track>>,
        ordering: OrderingStep,
        search: Rc<dyn SearchProvider>,
    ) -> Self {
        Self::new(Box::new(PlaylistProjection::new(playlists)), pool, ordering, search)
    }

    /// Replaces the playlists while keeping the selection.
    pub fn set_playlists(&mut self, playlists: Vec<Arc<Playlist>>) {
        self.projection = Box::new(PlaylistProjection::new(playlists));
        self.refresh();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        actions::RecordingDelegate,
        model::fixtures::*,
        search::TextSearch,
        sorting::SortingKey,
        virtualization::SelectionModifiers,
    };

    fn playlist(id: DatabaseIndex, name: &str, tracks: &[DatabaseIndex]) -> Arc<Playlist> {
        Arc::new(Playlist {
            id,
            name: name.to_string(),
            tracks: tracks.to_vec(),
            date_created: id,
        })
    }

    fn list(playlists: Vec<Arc<Playlist>>) -> PlaylistsList {
        let pool = titled(&[(1, "One"), (2, "Two"), (3, "Three")]);
        let ordering = OrderingStep::new(vec![SortingKey::ascending(SortKey::Title)]);
        PlaylistsList::for_playlists(playlists, pool, ordering, Rc::new(TextSearch))
    }

    #[test]
    fn test_entries_resolve_in_playlist_order() {
        let list = list(vec![
            playlist(1, "Mix", &[3, 99, 1, 3]),
            playlist(2, "Empty", &[]),
        ]);

        assert_eq!(list.len(), 2);
        let mix = list.item(1).expect("mix");
        let ids: Vec<DatabaseIndex> = mix.tracks().iter().map(|t| t.id).collect();
        assert_eq!(ids, vec![3, 1, 3]);
        assert!(list.item(0).expect("empty").tracks().is_empty());
    }

    #[test]
    fn test_delete_removes_playlist_not_tracks() {
        let list = list(vec![playlist(4, "Mix", &[1, 2])]);
        let delegate = RecordingDelegate::default();

        list.item(0).expect("mix").delete(&delegate);

        assert_eq!(delegate.take(), vec![LibraryAction::DeletePlaylist(4)]);
    }

    #[test]
    fn test_set_playlists_keeps_selection() {
        let mut list = list(vec![playlist(1, "A", &[1]), playlist(2, "B", &[2])]);
        list.select(1, SelectionModifiers::NONE);

        list.set_playlists(vec![
            playlist(3, "0 New", &[]),
            playlist(1, "A", &[1]),
            playlist(2, "B", &[2, 3]),
        ]);

        assert_eq!(list.selected_item().map(ListItem::entity_index), Some(2));
        assert_eq!(list.selected_tracks().len(), 2);
    }

    #[test]
    fn test_capsule_summarises_entries() {
        let mut list = list(vec![playlist(1, "Mix", &[1, 2])]);
        list.select(0, SelectionModifiers::NONE);

        let capsule = list.capsule().expect("capsule");
        assert_eq!(capsule.title, "Mix");
        assert_eq!(capsule.subtitle, "2 tracks, 6:00");
        assert!(capsule.artwork.is_none());
    }
}
