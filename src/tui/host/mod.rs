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

//! Virtualizing table host for a list presenter.
//!
//! The host keeps a cursor and a scroll offset over the presenter's view and
//! only builds the rows inside the visible window. Rows entering the window
//! are prepared (which requests their artwork) and rows leaving it are
//! cleared.
//!
//! Presenter notifications are queued while the presenter is being mutated
//! and applied afterwards by [`TableHost::process_pending`], since the
//! presenter cannot be borrowed from inside its own callback.

mod event;
mod render;

use std::{cell::RefCell, collections::VecDeque, rc::Rc};

use ratatui::layout::Constraint;

use shelf::{
    ListItem, ListPresenter,
    artwork::ThumbnailProvider,
    observer::SubscriptionId,
    virtualization::{
        SelectVirtualizableItems, SelectionModifiers, VirtualizableItem, VirtualizationEvent,
    },
};

/// A list item that can be shown as a table row.
pub(crate) trait TableRow: ListItem {
    fn header() -> &'static [&'static str];

    fn widths() -> Vec<Constraint>;

    fn cells(&self) -> Vec<String>;
}

pub(crate) struct TableHost<W: TableRow> {
    title: &'static str,
    presenter: ListPresenter<W>,
    subscription: SubscriptionId,
    pending: Rc<RefCell<VecDeque<VirtualizationEvent>>>,

    cursor: Option<usize>,
    offset: usize,
    /// Rows that fit on screen, as of the last draw.
    viewport: usize,
    /// Rows currently materialized.
    prepared: Vec<W>,
    /// Cursor moves add every row they pass to the selection.
    painting: bool,
}

impl<W: TableRow> TableHost<W> {
    pub(crate) fn new(title: &'static str, mut presenter: ListPresenter<W>) -> Self {
        let pending = Rc::new(RefCell::new(VecDeque::new()));
        let sink = Rc::clone(&pending);
        let subscription = presenter.subscribe_virtualization(Box::new(move |event| {
            sink.borrow_mut().push_back(*event);
        }));

        Self {
            title,
            presenter,
            subscription,
            pending,
            cursor: None,
            offset: 0,
            viewport: 1,
            prepared: Vec::new(),
            painting: false,
        }
    }

    pub(crate) fn title(&self) -> &'static str {
        self.title
    }

    pub(crate) fn presenter(&self) -> &ListPresenter<W> {
        &self.presenter
    }

    pub(crate) fn presenter_mut(&mut self) -> &mut ListPresenter<W> {
        &mut self.presenter
    }

    pub(crate) fn cursor(&self) -> Option<usize> {
        self.cursor
    }

    pub(crate) fn offset(&self) -> usize {
        self.offset
    }

    pub(crate) fn is_painting(&self) -> bool {
        self.painting
    }

    /// Applies every notification the presenter raised since the last call.
    pub(crate) fn process_pending(&mut self) {
        loop {
            let Some(event) = self.pending.borrow_mut().pop_front() else {
                break;
            };

            match event {
                VirtualizationEvent::SortOrderChanged | VirtualizationEvent::SelectionChanged => {
                    match self.presenter.selected_index() {
                        Some(index) => {
                            self.cursor = Some(index);
                            self.scroll_into_view(index);
                        }
                        None => self.clamp_cursor(),
                    }
                }
                VirtualizationEvent::ScrollToIndexRequested(index) => {
                    self.scroll_into_view(index);
                }
                VirtualizationEvent::ScrollOffsetRestoreRequested(offset) => {
                    self.offset = offset.max(0.0) as usize;
                    self.clamp_cursor();
                }
            }
        }
    }

    /// Moves the cursor to `index`, selecting the row unless `modifiers` is
    /// `None`.
    pub(crate) fn move_cursor(&mut self, index: usize, modifiers: Option<SelectionModifiers>) {
        let len = self.presenter.len();
        if len == 0 {
            self.cursor = None;
            return;
        }

        let index = index.min(len - 1);
        self.cursor = Some(index);
        if let Some(modifiers) = modifiers {
            self.presenter.select(index, modifiers);
        }
        self.presenter.request_scroll_to(Some(index));
        self.process_pending();
    }

    pub(crate) fn step_cursor(&mut self, delta: isize, modifiers: Option<SelectionModifiers>) {
        let target = match self.cursor {
            Some(cursor) => cursor.saturating_add_signed(delta),
            None => 0,
        };
        self.move_cursor(target, modifiers);
    }

    /// Brings `index` into the visible window.
    fn scroll_into_view(&mut self, index: usize) {
        if index < self.offset {
            self.offset = index;
        } else if index >= self.offset + self.viewport {
            self.offset = index + 1 - self.viewport;
        }
    }

    fn clamp_cursor(&mut self) {
        let len = self.presenter.len();
        self.cursor = match self.cursor {
            _ if len == 0 => None,
            Some(cursor) => Some(cursor.min(len - 1)),
            None => None,
        };
        self.offset = self.offset.min(len.saturating_sub(self.viewport));
    }

    /// Sets the window height and prepares the rows inside the window,
    /// clearing the rows that left it.
    pub(crate) fn sync_window(&mut self, viewport: usize, thumbnails: &mut dyn ThumbnailProvider) {
        self.viewport = viewport.max(1);
        if let Some(cursor) = self.cursor {
            self.scroll_into_view(cursor);
        }
        self.offset = self.offset.min(self.presenter.len().saturating_sub(self.viewport));
        self.presenter.set_scroll_offset(self.offset as f64);

        let window: Vec<W> = self
            .presenter
            .items()
            .skip(self.offset)
            .take(self.viewport)
            .cloned()
            .collect();

        for row in &self.prepared {
            let uid = row.state().uid();
            if !window.iter().any(|w| w.state().uid() == uid) {
                row.on_cleared(thumbnails);
            }
        }
        for row in &window {
            let uid = row.state().uid();
            if !self.prepared.iter().any(|p| p.state().uid() == uid) {
                row.on_prepared(thumbnails);
            }
        }

        self.prepared = window;
    }

    /// Clears every materialized row, for example when the view is hidden.
    pub(crate) fn release_window(&mut self, thumbnails: &mut dyn ThumbnailProvider) {
        for row in self.prepared.drain(..) {
            row.on_cleared(thumbnails);
        }
    }

    pub(crate) fn prepared(&self) -> &[W] {
        &self.prepared
    }
}

impl<W: TableRow> Drop for TableHost<W> {
    fn drop(&mut self) {
        self.presenter.unsubscribe_virtualization(self.subscription);
    }
}

#[cfg(test)]
mod tests {
    use std::{path::PathBuf, rc::Rc, sync::Arc};

    use shelf::{
        artwork::{ThumbnailCallback, ThumbnailProvider},
        model::{Artwork, ArtworkId, Rating, Track},
        presenter::{TrackItem, TracksList},
        search::TextSearch,
        sorting::{OrderingStep, SortKey, SortingKey},
    };

    use super::*;

    /// Counts outstanding thumbnail requests.
    #[derive(Default)]
    struct CountingProvider {
        live: usize,
    }

    impl ThumbnailProvider for CountingProvider {
        fn request_thumbnail(&mut self, _artwork: &Artwork, _on_ready: ThumbnailCallback) {
            self.live += 1;
        }

        fn release_thumbnail(&mut self, _artwork: ArtworkId) {
            self.live -= 1;
        }
    }

    pub(super) fn pool(count: i64) -> Vec<Arc<Track>> {
        (1..=count)
            .map(|id| {
                Arc::new(Track {
                    id,
                    durable_id: id,
                    title: format!("{id:03}"),
                    album: Some(Arc::new(shelf::model::Album {
                        id,
                        title: format!("album {id}"),
                        album_artist: None,
                        year: None,
                        artwork: Some(Arc::new(Artwork {
                            id: ArtworkId(id),
                            path: PathBuf::from(format!("/art/{id}.jpg")),
                        })),
                    })),
                    artists: vec![],
                    genres: vec![],
                    publisher: None,
                    track_number: None,
                    disc_number: None,
                    year: None,
                    duration: 60,
                    bitrate: None,
                    filename: PathBuf::from(format!("/m/{id}.mp3")),
                    date_added: 0,
                    play_count: 0,
                    last_played: None,
                    rating: Rating::Neutral,
                })
            })
            .collect()
    }

    fn host(count: i64) -> TableHost<TrackItem> {
        let ordering = OrderingStep::new(vec![SortingKey::ascending(SortKey::Title)]);
        TableHost::new(
            "Tracks",
            TracksList::for_tracks(pool(count), ordering, Rc::new(TextSearch)),
        )
    }

    #[test]
    fn test_only_visible_rows_are_prepared() {
        let mut host = host(20);
        let mut provider = CountingProvider::default();

        host.sync_window(5, &mut provider);
        assert_eq!(provider.live, 5);

        host.move_cursor(12, Some(SelectionModifiers::NONE));
        host.sync_window(5, &mut provider);

        assert_eq!(provider.live, 5);
        assert_eq!(host.offset(), 8);
        assert_eq!(host.prepared()[4].entity_index(), 13);

        host.release_window(&mut provider);
        assert_eq!(provider.live, 0);
    }

    #[test]
    fn test_reverse_follows_primary_selection() {
        let mut host = host(10);
        let mut provider = CountingProvider::default();
        host.sync_window(4, &mut provider);
        host.move_cursor(1, Some(SelectionModifiers::NONE));

        host.presenter_mut().reverse();
        host.process_pending();

        assert_eq!(host.cursor(), Some(8));
        assert_eq!(host.offset(), 5);
    }

    #[test]
    fn test_refresh_restores_offset() {
        let mut host = host(30);
        let mut provider = CountingProvider::default();
        host.sync_window(5, &mut provider);
        host.move_cursor(20, Some(SelectionModifiers::NONE));
        host.sync_window(5, &mut provider);
        let offset = host.offset();

        host.presenter_mut().refresh();
        host.process_pending();
        host.sync_window(5, &mut provider);

        assert_eq!(host.offset(), offset);
        assert_eq!(host.cursor(), Some(20));
        assert_eq!(provider.live, 5);
    }

    #[test]
    fn test_cursor_is_clamped_to_items() {
        let mut host = host(3);
        host.move_cursor(10, Some(SelectionModifiers::NONE));
        assert_eq!(host.cursor(), Some(2));

        host.step_cursor(-10, None);
        assert_eq!(host.cursor(), Some(0));
        assert_eq!(host.presenter().selected_index(), Some(2));
    }
}
