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

//! Sortable, filterable, selectable list presenters.
//!
//! A [`ListPresenter`] owns a pool of tracks and projects it into one item
//! per entity (one per track, album, playlist or name tag, depending on its
//! [`Projection`]). It keeps an ordered view over those items that is
//! rebuilt in full whenever the sort keys, the search string or the pool
//! change, and it tracks which items are selected.
//!
//! # Ordered view
//!
//! The items themselves live in projection order and never move. The view
//! is a list of positions into them. Sorting always starts from projection
//! order, so two sorts with the same keys give the same result whatever
//! happened in between. [`reverse`](ListPresenter::reverse) flips the view
//! in place and keeps whatever tie order it had.
//!
//! # Notification
//!
//! Two observer lists are kept: [`ListProperty`] changes for anything bound
//! to the presenter's state, and [`VirtualizationEvent`]s for the host that
//! renders the view.

mod selection;

pub mod albums;
pub mod name_tags;
pub mod playlists;
pub mod tracks;

use std::{cmp::Ordering, collections::HashMap, fmt, rc::Rc, sync::Arc};

use log::debug;
use rand::{rng, seq::SliceRandom};

use crate::{
    actions::{ActionDelegate, LibraryAction},
    artwork::{ThumbnailProvider, ThumbnailSlot},
    model::{Artwork, Capsule, DatabaseIndex, Track},
    observer::{Observers, SubscriptionId},
    search::{SearchContext, SearchProvider},
    sorting::{CompositeComparer, OrderingStep, SortKey, compare_value},
    virtualization::{SelectVirtualizableItems, VirtualizableItem, VirtualizationEvent},
};

pub use albums::{AlbumItem, AlbumsList};
pub use name_tags::{NameTagItem, NameTagStrategy, NameTagsList};
pub use playlists::{PlaylistItem, PlaylistsList};
pub use tracks::{TrackItem, TracksList};

/// Transient UI state carried by every list item.
#[derive(Debug, Clone, Default)]
pub struct ItemState {
    /// Unique per item instance; a rebuilt item gets a new one.
    uid: u64,
    is_selected: bool,
    /// Orders the selection; higher means selected later.
    selection_stamp: u64,
    random_index: u32,
    thumbnail: ThumbnailSlot,
}

impl ItemState {
    pub fn uid(&self) -> u64 {
        self.uid
    }

    pub fn is_selected(&self) -> bool {
        self.is_selected
    }

    pub fn random_index(&self) -> u32 {
        self.random_index
    }

    pub fn thumbnail(&self) -> &ThumbnailSlot {
        &self.thumbnail
    }
}

/// A per-entity presentation wrapper.
pub trait ListItem: Clone {
    /// Identity of the backing entity.
    fn entity_index(&self) -> DatabaseIndex;

    fn state(&self) -> &ItemState;

    fn state_mut(&mut self) -> &mut ItemState;

    /// Tracks this item stands for, in play order.
    fn tracks(&self) -> &[Arc<Track>];

    fn title(&self) -> &str;

    /// Compares on a single key. [`SortKey::Random`] is handled by the
    /// presenter; keys that make no sense for an item compare equal.
    fn compare_by(&self, other: &Self, key: SortKey, ascending: bool) -> Ordering;

    /// Orders items of equal relevance when filtering.
    fn filter_tie_break(&self, _other: &Self) -> Ordering {
        Ordering::Equal
    }

    fn capsule(&self) -> Capsule;

    fn artwork(&self) -> Option<&Arc<Artwork>>;

    fn is_selected(&self) -> bool {
        self.state().is_selected
    }

    fn play(&self, delegate: &dyn ActionDelegate) {
        delegate.dispatch(LibraryAction::Play(self.tracks().to_vec()));
    }

    fn play_next(&self, delegate: &dyn ActionDelegate) {
        delegate.dispatch(LibraryAction::PlayNext(self.tracks().to_vec()));
    }

    fn append(&self, delegate: &dyn ActionDelegate) {
        delegate.dispatch(LibraryAction::Append(self.tracks().to_vec()));
    }

    fn edit(&self, delegate: &dyn ActionDelegate) {
        delegate.dispatch(LibraryAction::Edit(self.tracks().to_vec()));
    }

    fn delete(&self, delegate: &dyn ActionDelegate) {
        delegate.dispatch(LibraryAction::Delete(self.tracks().to_vec()));
    }
}

impl<W: ListItem> VirtualizableItem for W {
    fn on_prepared(&self, thumbnails: &mut dyn ThumbnailProvider) {
        if let Some(artwork) = self.artwork() {
            self.state().thumbnail.acquire(artwork, thumbnails);
        }
    }

    fn on_cleared(&self, thumbnails: &mut dyn ThumbnailProvider) {
        self.state().thumbnail.release(thumbnails);
    }
}

/// Turns a pool of tracks into list items.
pub trait Projection<W> {
    /// One item per entity present in `pool`, each entity at most once.
    fn project(&self, pool: &[Arc<Track>]) -> Vec<W>;

    fn search_context(&self) -> SearchContext;
}

/// Bindable presenter properties.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ListProperty {
    Items,
    SelectedItem,
    SelectedItems,
    SelectedTracks,
    IsSelectionContiguous,
    Ascending,
    SearchString,
}

pub struct ListPresenter<W: ListItem> {
    projection: Box<dyn Projection<W>>,
    search: Rc<dyn SearchProvider>,
    ordering: OrderingStep,

    pool: Vec<Arc<Track>>,
    items: Vec<W>,
    view: Vec<usize>,

    search_string: String,
    ascending: bool,

    /// Positions in `items`, not in the view.
    selected_item: Option<usize>,
    anchor: Option<usize>,
    selected_items: Vec<usize>,
    selected_tracks: Vec<Arc<Track>>,
    selection_contiguous: bool,
    restoring_selection: bool,

    scroll_offset: f64,
    next_uid: u64,
    next_stamp: u64,

    properties: Observers<ListProperty>,
    virtualization: Observers<VirtualizationEvent>,
}

impl<W: ListItem> ListPresenter<W> {
    pub fn new(
        projection: Box<dyn Projection<W>>,
        pool: Vec<Arc<Track>>,
        ordering: OrderingStep,
        search: Rc<dyn SearchProvider>,
    ) -> Self {
        let mut presenter = Self {
            projection,
            search,
            ordering,
            pool,
            items: Vec::new(),
            view: Vec::new(),
            search_string: String::new(),
            ascending: true,
            selected_item: None,
            anchor: None,
            selected_items: Vec::new(),
            selected_tracks: Vec::new(),
            selection_contiguous: false,
            restoring_selection: false,
            scroll_offset: 0.0,
            next_uid: 0,
            next_stamp: 0,
            properties: Observers::new(),
            virtualization: Observers::new(),
        };
        presenter.update_collection();
        presenter
    }

    /// Items in view order.
    pub fn items(&self) -> impl ExactSizeIterator<Item = &W> + '_ {
        self.view.iter().map(|&i| &self.items[i])
    }

    pub fn item(&self, index: usize) -> Option<&W> {
        self.view.get(index).map(|&i| &self.items[i])
    }

    pub fn len(&self) -> usize {
        self.view.len()
    }

    pub fn is_empty(&self) -> bool {
        self.view.is_empty()
    }

    pub fn pool(&self) -> &[Arc<Track>] {
        &self.pool
    }

    pub fn ordering(&self) -> &OrderingStep {
        &self.ordering
    }

    pub fn ascending(&self) -> bool {
        self.ascending
    }

    pub fn search_string(&self) -> &str {
        &self.search_string
    }

    /// View index of `item`, or `None` when this exact item instance is not
    /// in view (for example an item kept from before a rebuild).
    pub fn item_index(&self, item: &W) -> Option<usize> {
        let uid = item.state().uid;
        self.view.iter().position(|&i| self.items[i].state().uid == uid)
    }

    pub fn subscribe_properties(
        &mut self,
        callback: impl FnMut(&ListProperty) + 'static,
    ) -> SubscriptionId {
        self.properties.subscribe(callback)
    }

    pub fn unsubscribe_properties(&mut self, id: SubscriptionId) -> bool {
        self.properties.unsubscribe(id)
    }

    /// Replaces the pool and rebuilds every item.
    pub fn set_tracks_pool(&mut self, pool: Vec<Arc<Track>>) {
        self.pool = pool;
        self.update_collection();
    }

    /// Replaces the pool like [`refresh`](Self::refresh), keeping whatever
    /// is still selected in the new pool.
    pub fn replace_pool(&mut self, pool: Vec<Arc<Track>>) {
        self.pool = pool;
        self.refresh();
    }

    /// Swaps both the projection and the pool, keeping the selection like
    /// [`replace_pool`](Self::replace_pool).
    pub fn replace_source(&mut self, projection: Box<dyn Projection<W>>, pool: Vec<Arc<Track>>) {
        self.projection = projection;
        self.pool = pool;
        self.refresh();
    }

    /// Swaps the projection (for example after the set of playlists changed)
    /// and rebuilds every item.
    pub fn set_projection(&mut self, projection: Box<dyn Projection<W>>) {
        self.projection = projection;
        self.update_collection();
    }

    /// Discards every item and projects the pool again, then re-applies the
    /// current sort or search.
    pub fn update_collection(&mut self) {
        let mut items = self.projection.project(&self.pool);
        for item in &mut items {
            let state = item.state_mut();
            state.uid = self.next_uid;
            state.is_selected = false;
            self.next_uid += 1;
        }
        debug!("Projected {} items from a pool of {} tracks", items.len(), self.pool.len());

        self.items = items;
        self.view.clear();
        self.anchor = None;
        let had_primary = self.selected_item.take().is_some();

        self.sort();

        if had_primary {
            self.properties.notify(&ListProperty::SelectedItem);
        }
    }

    /// Orders the view by the current sort keys, or by relevance when a
    /// search is active.
    pub fn sort(&mut self) {
        if !self.search_string.trim().is_empty() {
            let search = self.search_string.clone();
            self.filter(&search);
            return;
        }

        if self.ordering.has_random() {
            self.shuffle_pages();
        }
        let keys = self.ordering.keys();

        let mut comparer = CompositeComparer::new();
        for sorting_key in &keys {
            let (key, ascending) = (sorting_key.key, sorting_key.ascending);
            if key == SortKey::Random {
                comparer.push(move |a: &W, b: &W| {
                    compare_value(a.state().random_index, b.state().random_index, ascending)
                });
            } else {
                comparer.push(move |a: &W, b: &W| a.compare_by(b, key, ascending));
            }
        }

        let mut view: Vec<usize> = (0..self.items.len()).collect();
        view.sort_by(|&a, &b| comparer.compare(&self.items[a], &self.items[b]));
        debug!("Sorted {} items on {} keys", view.len(), keys.len());

        self.replace_view(view);
        self.set_ascending(keys.first().is_none_or(|k| k.ascending));
    }

    /// Keeps only items relevant to `search`, most relevant first. A blank
    /// search is the same as [`sort`](Self::sort).
    pub fn filter(&mut self, search: &str) {
        if self.search_string != search {
            self.search_string = search.to_string();
            self.properties.notify(&ListProperty::SearchString);
        }

        if search.trim().is_empty() {
            self.sort();
            return;
        }

        let weights =
            self.search.filter_tracks(search, &self.pool, self.projection.search_context());

        let mut ranked: Vec<(usize, u64)> = self
            .items
            .iter()
            .enumerate()
            .filter_map(|(i, item)| {
                let weight: u64 = item
                    .tracks()
                    .iter()
                    .map(|t| weights.get(&t.id).copied().map_or(0, u64::from))
                    .sum();
                (weight > 0).then_some((i, weight))
            })
            .collect();

        ranked.sort_by(|&(a, wa), &(b, wb)| {
            wb.cmp(&wa).then_with(|| self.items[a].filter_tie_break(&self.items[b]))
        });
        debug!("Search {:?} kept {} of {} items", search, ranked.len(), self.items.len());

        self.replace_view(ranked.into_iter().map(|(i, _)| i).collect());
    }

    /// Reverses the view in place and flips [`ascending`](Self::ascending).
    pub fn reverse(&mut self) {
        self.view.reverse();
        self.properties.notify(&ListProperty::Items);
        self.virtualization.notify(&VirtualizationEvent::SortOrderChanged);
        self.set_ascending(!self.ascending);
    }

    /// Rebuilds every item while keeping the selection and scroll position.
    pub fn refresh(&mut self) {
        let primary = self.selected_item().map(ListItem::entity_index);
        let selected: Vec<DatabaseIndex> =
            self.selected_items().map(ListItem::entity_index).collect();
        let offset = self.scroll_offset;

        self.update_collection();

        let by_entity: HashMap<DatabaseIndex, usize> = self
            .items
            .iter()
            .enumerate()
            .map(|(i, item)| (item.entity_index(), i))
            .collect();

        self.restoring_selection = true;
        for id in &selected {
            if let Some(&i) = by_entity.get(id) {
                self.mark_selected(i, true);
            }
        }
        if let Some(i) = primary.and_then(|id| by_entity.get(&id).copied()) {
            self.assign_primary(Some(i));
        }
        self.restoring_selection = false;

        self.selection_changed();
        self.virtualization
            .notify(&VirtualizationEvent::ScrollOffsetRestoreRequested(offset));
    }

    /// Summary of the primary selection.
    pub fn capsule(&self) -> Option<Capsule> {
        self.selected_item().map(ListItem::capsule)
    }

    /// Gives every item a fresh random position for [`SortKey::Random`].
    pub fn shuffle_pages(&mut self) {
        let mut order: Vec<u32> = (0..self.items.len())
            .map(|i| u32::try_from(i).unwrap_or(u32::MAX))
            .collect();
        let mut rng = rng();
        order.shuffle(&mut rng);

        for (item, random_index) in self.items.iter_mut().zip(order) {
            item.state_mut().random_index = random_index;
        }
    }

    /// Materializes the row at `index` for a host.
    pub fn prepare_item(&self, index: usize, thumbnails: &mut dyn ThumbnailProvider) {
        if let Some(item) = self.item(index) {
            item.on_prepared(thumbnails);
        }
    }

    pub fn clear_item(&self, index: usize, thumbnails: &mut dyn ThumbnailProvider) {
        if let Some(item) = self.item(index) {
            item.on_cleared(thumbnails);
        }
    }

    pub fn play_selected(&self, delegate: &dyn ActionDelegate) {
        self.dispatch_selected(delegate, LibraryAction::Play);
    }

    pub fn play_selected_next(&self, delegate: &dyn ActionDelegate) {
        self.dispatch_selected(delegate, LibraryAction::PlayNext);
    }

    pub fn append_selected(&self, delegate: &dyn ActionDelegate) {
        self.dispatch_selected(delegate, LibraryAction::Append);
    }

    pub fn edit_selected(&self, delegate: &dyn ActionDelegate) {
        self.dispatch_selected(delegate, LibraryAction::Edit);
    }

    /// Deletes every selected item, one action per item.
    pub fn delete_selected(&self, delegate: &dyn ActionDelegate) {
        for item in self.selected_items() {
            item.delete(delegate);
        }
    }

    fn dispatch_selected(
        &self,
        delegate: &dyn ActionDelegate,
        action: fn(Vec<Arc<Track>>) -> LibraryAction,
    ) {
        if !self.selected_tracks.is_empty() {
            delegate.dispatch(action(self.selected_tracks.clone()));
        }
    }

    /// Replaces the whole view in one step.
    fn replace_view(&mut self, view: Vec<usize>) {
        self.view = view;
        self.selection_changed();
        self.properties.notify(&ListProperty::Items);
        self.virtualization.notify(&VirtualizationEvent::SortOrderChanged);
    }

    fn set_ascending(&mut self, ascending: bool) {
        if self.ascending != ascending {
            self.ascending = ascending;
            self.properties.notify(&ListProperty::Ascending);
        }
    }

    fn view_position(&self, item: usize) -> Option<usize> {
        self.view.iter().position(|&i| i == item)
    }
}

impl<W: ListItem> SelectVirtualizableItems for ListPresenter<W> {
    fn subscribe_virtualization(
        &mut self,
        callback: Box<dyn FnMut(&VirtualizationEvent)>,
    ) -> SubscriptionId {
        self.virtualization.subscribe(callback)
    }

    fn unsubscribe_virtualization(&mut self, id: SubscriptionId) -> bool {
        self.virtualization.unsubscribe(id)
    }

    fn item_count(&self) -> usize {
        self.len()
    }

    fn selected_index(&self) -> Option<usize> {
        self.selected_item.and_then(|i| self.view_position(i))
    }

    fn index_of_entity(&self, entity: DatabaseIndex) -> Option<usize> {
        self.view
            .iter()
            .position(|&i| self.items[i].entity_index() == entity)
    }

    fn set_scroll_offset(&mut self, offset: f64) {
        self.scroll_offset = offset;
    }

    fn scroll_offset(&self) -> f64 {
        self.scroll_offset
    }

    fn request_scroll_to(&mut self, index: Option<usize>) {
        if let Some(index) = index {
            self.virtualization
                .notify(&VirtualizationEvent::ScrollToIndexRequested(index));
        }
    }
}

impl<W: ListItem + fmt::Debug> fmt::Debug for ListPresenter<W> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ListPresenter")
            .field("pool", &self.pool.len())
            .field("items", &self.items.len())
            .field("view", &self.view.len())
            .field("search_string", &self.search_string)
            .field("ascending", &self.ascending)
            .field("selected_item", &self.selected_item)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use std::{cell::RefCell, rc::Rc, sync::Arc};

    use super::*;
    use crate::{
        actions::RecordingDelegate,
        model::fixtures::*,
        search::TextSearch,
        sorting::SortingKey,
        virtualization::SelectionModifiers,
    };

    fn titles(list: &TracksList) -> Vec<String> {
        list.items().map(|i| i.track().title.clone()).collect()
    }

    fn by_title() -> OrderingStep {
        OrderingStep::new(vec![SortingKey::ascending(SortKey::Title)])
    }

    fn list(pool: Vec<Arc<Track>>, ordering: OrderingStep) -> TracksList {
        TracksList::for_tracks(pool, ordering, Rc::new(TextSearch))
    }

    #[test]
    fn test_update_collection_projects_each_track_once() {
        let pool = titled(&[(1, "a"), (2, "b"), (3, "c")]);
        let mut duplicated = pool.clone();
        duplicated.push(Arc::clone(&pool[0]));

        let list = list(duplicated, by_title());

        assert_eq!(list.len(), 3);
        let mut ids: Vec<DatabaseIndex> = list.items().map(ListItem::entity_index).collect();
        ids.sort_unstable();
        assert_eq!(ids, vec![1, 2, 3]);
    }

    #[test]
    fn test_empty_pool_gives_empty_view() {
        let mut list = list(vec![], by_title());
        list.sort();
        list.filter("anything");
        list.reverse();
        list.refresh();

        assert!(list.is_empty());
        assert!(list.capsule().is_none());
        assert_eq!(list.selected_index(), None);
    }

    #[test]
    fn test_sort_then_reverse() {
        let pool = titled(&[(1, "Zebra"), (2, "Apple")]);
        let mut list = list(pool, by_title());

        assert_eq!(titles(&list), vec!["Apple", "Zebra"]);
        assert!(list.ascending());

        list.reverse();

        assert_eq!(titles(&list), vec!["Zebra", "Apple"]);
        assert!(!list.ascending());
    }

    #[test]
    fn test_reverse_keeps_tie_order() {
        let mut a = track(1, "Same");
        a.duration = 10;
        let mut b = track(2, "Same");
        b.duration = 20;
        let c = track(3, "Other");
        let ordering = OrderingStep::new(vec![SortingKey::ascending(SortKey::Title)]);
        let mut list = list(vec![shared(a), shared(b), shared(c)], ordering);

        let before: Vec<DatabaseIndex> = list.items().map(ListItem::entity_index).collect();
        list.reverse();
        let after: Vec<DatabaseIndex> = list.items().map(ListItem::entity_index).collect();

        assert_eq!(before, vec![3, 1, 2]);
        assert_eq!(after, vec![2, 1, 3]);
    }

    #[test]
    fn test_later_keys_break_ties() {
        let mut a = track(1, "Song");
        a.year = Some(1999);
        let mut b = track(2, "Song");
        b.year = Some(2005);
        let mut c = track(3, "Alpha");
        c.year = Some(2001);
        let ordering = OrderingStep::new(vec![
            SortingKey::ascending(SortKey::Title),
            SortingKey::descending(SortKey::Year),
        ]);

        let list = list(vec![shared(a), shared(b), shared(c)], ordering);

        let ids: Vec<DatabaseIndex> = list.items().map(ListItem::entity_index).collect();
        assert_eq!(ids, vec![3, 2, 1]);
    }

    #[test]
    fn test_sort_reads_ordering_on_every_call() {
        let ordering = by_title();
        let mut list = list(titled(&[(1, "Zebra"), (2, "Apple")]), ordering.clone());

        ordering.set(vec![SortingKey::descending(SortKey::Title)]);
        list.sort();

        assert_eq!(titles(&list), vec!["Zebra", "Apple"]);
        assert!(!list.ascending());
    }

    #[test]
    fn test_random_key_reshuffles_on_each_sort() {
        let pool: Vec<Arc<Track>> = (0..64).map(|i| shared(track(i, &format!("t{i}")))).collect();
        let ordering = OrderingStep::new(vec![SortingKey::ascending(SortKey::Random)]);
        let mut list = list(pool, ordering);

        let first: Vec<DatabaseIndex> = list.items().map(ListItem::entity_index).collect();
        list.sort();
        let second: Vec<DatabaseIndex> = list.items().map(ListItem::entity_index).collect();

        assert_eq!(first.len(), 64);
        assert_ne!(first, second);
        let mut sorted = second.clone();
        sorted.sort_unstable();
        assert_eq!(sorted, (0..64).collect::<Vec<_>>());
    }

    #[test]
    fn test_blank_filter_equals_sort() {
        let pool = titled(&[(1, "c"), (2, "a"), (3, "b")]);
        let mut sorted = list(pool.clone(), by_title());
        sorted.sort();

        let mut filtered = list(pool, by_title());
        filtered.filter("a");
        filtered.filter("   ");

        let a: Vec<DatabaseIndex> = sorted.items().map(ListItem::entity_index).collect();
        let b: Vec<DatabaseIndex> = filtered.items().map(ListItem::entity_index).collect();
        assert_eq!(a, b);
        assert_eq!(filtered.search_string(), "   ");
    }

    #[test]
    fn test_filter_drops_zero_weight_and_ranks_descending() {
        let pool = titled(&[(1, "Love Song"), (2, "Nothing"), (3, "Love"), (4, "Lovely Love")]);
        let mut list = list(pool, by_title());

        list.filter("love");

        let ids: Vec<DatabaseIndex> = list.items().map(ListItem::entity_index).collect();
        // "Love" matches the whole title; the others tie and fall back to title order
        assert_eq!(ids, vec![3, 1, 4]);
    }

    #[test]
    fn test_sort_with_active_search_keeps_filtering() {
        let pool = titled(&[(1, "Blue"), (2, "Red")]);
        let mut list = list(pool, by_title());

        list.filter("blue");
        list.sort();

        assert_eq!(list.len(), 1);
    }

    #[test]
    fn test_stale_item_has_no_index() {
        let pool = titled(&[(1, "a"), (2, "b")]);
        let mut list = list(pool, by_title());
        let stale = list.item(0).cloned().expect("item");

        assert_eq!(list.item_index(&stale), Some(0));
        list.update_collection();

        assert_eq!(list.item_index(&stale), None);
        assert_eq!(list.index_of_entity(1), Some(0));
        assert_eq!(list.index_of_entity(99), None);
    }

    #[test]
    fn test_refresh_restores_selection_without_cascade() {
        let pool = titled(&[(5, "a"), (7, "b"), (9, "c")]);
        let mut list = list(pool, by_title());
        list.select(0, SelectionModifiers::NONE);
        list.select(1, SelectionModifiers::CTRL);
        list.set_scroll_offset(42.0);

        let events = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&events);
        list.subscribe_virtualization(Box::new(move |e| sink.borrow_mut().push(*e)));

        list.refresh();

        let selected: Vec<DatabaseIndex> = list.selected_items().map(ListItem::entity_index).collect();
        assert_eq!(selected, vec![5, 7]);
        assert_eq!(list.selected_item().map(ListItem::entity_index), Some(7));
        assert!(!events.borrow().contains(&VirtualizationEvent::SelectionChanged));
        assert!(
            events
                .borrow()
                .contains(&VirtualizationEvent::ScrollOffsetRestoreRequested(42.0))
        );
    }

    #[test]
    fn test_refresh_follows_entity_into_new_pool() {
        let mut list = list(titled(&[(7, "m"), (8, "z")]), by_title());
        list.select(0, SelectionModifiers::NONE);

        let mut pool = titled(&[(1, "a")]);
        pool.extend(list.pool().iter().cloned());
        list.set_tracks_pool(pool);
        assert!(list.selected_item().is_none());

        list.select(1, SelectionModifiers::NONE);
        list.refresh();

        assert_eq!(list.selected_item().map(ListItem::entity_index), Some(7));
        assert_eq!(list.selected_index(), Some(1));
    }

    #[test]
    fn test_replace_pool_drops_missing_selection() {
        let mut list = list(titled(&[(1, "a"), (2, "b"), (3, "c")]), by_title());
        list.select(0, SelectionModifiers::NONE);
        list.select(2, SelectionModifiers::CTRL);

        let pool: Vec<Arc<Track>> = list.pool().iter().filter(|t| t.id != 3).cloned().collect();
        list.replace_pool(pool);

        let selected: Vec<DatabaseIndex> = list.selected_items().map(ListItem::entity_index).collect();
        assert_eq!(list.len(), 2);
        assert_eq!(selected, vec![1]);
        assert_eq!(list.selected_item().map(ListItem::entity_index), None);
    }

    #[test]
    fn test_property_notifications() {
        let mut list = list(titled(&[(1, "a"), (2, "b")]), by_title());
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        list.subscribe_properties(move |p| sink.borrow_mut().push(*p));

        list.reverse();
        list.select(0, SelectionModifiers::NONE);

        let seen = seen.borrow();
        assert!(seen.contains(&ListProperty::Items));
        assert!(seen.contains(&ListProperty::Ascending));
        assert!(seen.contains(&ListProperty::SelectedItem));
        assert!(seen.contains(&ListProperty::SelectedTracks));
    }

    #[test]
    fn test_scroll_request_ignores_missing_index() {
        let mut list = list(titled(&[(1, "a")]), by_title());
        let events = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&events);
        list.subscribe_virtualization(Box::new(move |e| sink.borrow_mut().push(*e)));

        list.request_scroll_to(None);
        list.request_scroll_to(Some(0));

        assert_eq!(*events.borrow(), vec![VirtualizationEvent::ScrollToIndexRequested(0)]);
    }

    #[test]
    fn test_capsule_describes_primary_selection() {
        let mut t = track(1, "Teardrop");
        t.artists = vec![artist(1, "Massive Attack")];
        t.album = Some(album(4, "Mezzanine", None));
        let mut list = list(vec![shared(t)], by_title());

        assert!(list.capsule().is_none());
        list.select(0, SelectionModifiers::NONE);

        let capsule = list.capsule().expect("capsule");
        assert_eq!(capsule.title, "Teardrop");
        assert_eq!(capsule.subtitle, "Massive Attack");
        assert_eq!(capsule.artwork, Some(crate::model::ArtworkId(4)));
    }

    #[test]
    fn test_selected_commands_dispatch_selected_tracks() {
        let mut list = list(titled(&[(1, "a"), (2, "b")]), by_title());
        let delegate = RecordingDelegate::default();

        list.play_selected(&delegate);
        assert!(delegate.take().is_empty());

        list.select_all();
        list.append_selected(&delegate);
        list.delete_selected(&delegate);

        let actions = delegate.take();
        assert_eq!(actions.len(), 3);
        assert!(matches!(&actions[0], LibraryAction::Append(t) if t.len() == 2));
        assert!(matches!(&actions[1], LibraryAction::Delete(t) if t.len() == 1));
    }
}
