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

//! Terminal host for the library presenters.

pub(crate) mod events;
pub(crate) mod host;
pub(crate) mod queue;
pub(crate) mod render;
pub(crate) mod tasks;
pub(crate) mod term;
pub(crate) mod theme;
pub(crate) mod views;

use std::{
    rc::Rc,
    sync::mpsc::{self, Receiver, Sender},
};

use log::debug;
use ratatui::{Frame, layout::Rect};
use tui_input::Input;

use shelf::{
    artwork::{ArtworkCache, FileLoader},
    config::{AppConfig, OrderingPreset},
    controls::MultiStateToggle,
    model::Library,
    presenter::TrackItem,
    search::{SearchProvider, TextSearch},
    sorting::{OrderingStep, SortKey, SortingKey},
};

use crate::tui::{
    events::AppEvent,
    queue::Queue,
    tasks::AppTask,
    theme::Theme,
    views::{LibraryTable, LibraryView, library_views},
};

/// The message shown on the status line.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Status {
    Info(String),
    Error(String),
}

/// Application state.
pub(crate) struct App {
    pub(crate) config: AppConfig,
    pub(crate) theme: Theme,

    pub(crate) event_tx: Sender<AppEvent>,
    pub(crate) event_rx: Receiver<AppEvent>,

    pub(crate) task_tx: Sender<AppTask>,

    pub(crate) library: Library,

    ordering: OrderingStep,
    presets: Option<MultiStateToggle<OrderingPreset>>,

    views: Vec<Box<dyn LibraryView>>,
    pub(crate) queue: Queue,
    queue_view: LibraryTable<TrackItem>,
    /// Index into `views`, or `views.len()` for the queue.
    active: usize,

    pub(crate) artwork: ArtworkCache,

    pub(crate) search_input: Input,
    pub(crate) searching: bool,

    pub(crate) status: Option<Status>,
}

impl App {
    /// Create a new instance of application state.
    pub(crate) fn new(config: AppConfig, task_tx: Sender<AppTask>) -> Self {
        let (event_tx, event_rx) = mpsc::channel();

        let presets = MultiStateToggle::new(config.ordering_presets.clone());
        let keys = presets
            .as_ref()
            .map_or_else(|| vec![SortingKey::ascending(SortKey::Title)], |p| p.current().keys.clone());
        let ordering = OrderingStep::new(keys);

        let search: Rc<dyn SearchProvider> = Rc::new(TextSearch);
        let library = Library::default();
        let views = library_views(&library, &ordering, &search);
        let queue_view = LibraryTable::queue(&search);

        let artwork = ArtworkCache::new(FileLoader, config.thumbnail_cache_capacity);

        Self {
            config,
            theme: Theme::default(),
            event_tx,
            event_rx,
            task_tx,
            library,
            ordering,
            presets,
            views,
            queue: Queue::new(),
            queue_view,
            active: 0,
            artwork,
            search_input: Input::default(),
            searching: false,
            status: None,
        }
    }

    pub(crate) fn view_titles(&self) -> Vec<&'static str> {
        self.views
            .iter()
            .map(|v| v.title())
            .chain(std::iter::once(self.queue_view.title()))
            .collect()
    }

    pub(crate) fn active_index(&self) -> usize {
        self.active
    }

    pub(crate) fn active_view(&self) -> &dyn LibraryView {
        match self.views.get(self.active) {
            Some(view) => view.as_ref(),
            None => &self.queue_view,
        }
    }

    pub(crate) fn active_view_mut(&mut self) -> &mut dyn LibraryView {
        match self.views.get_mut(self.active) {
            Some(view) => view.as_mut(),
            None => &mut self.queue_view,
        }
    }

    pub(crate) fn preset_name(&self) -> Option<&str> {
        self.presets.as_ref().map(|p| p.current().name.as_str())
    }

    /// Shows the view at `index`, the queue being the last one.
    pub(crate) fn show_view(&mut self, index: usize) {
        if index > self.views.len() || index == self.active {
            return;
        }

        let artwork = &mut self.artwork;
        match self.views.get_mut(self.active) {
            Some(view) => view.release_window(artwork),
            None => self.queue_view.release_window(artwork),
        }

        self.active = index;
        self.searching = false;
    }

    pub(crate) fn cycle_view(&mut self, delta: isize) {
        let count = self.views.len() as isize + 1;
        let index = (self.active as isize + delta).rem_euclid(count);
        self.show_view(index as usize);
    }

    /// Switches to the next or previous ordering preset and re-sorts every
    /// library view with it.
    pub(crate) fn cycle_ordering(&mut self, forward: bool) {
        let Some(presets) = self.presets.as_mut() else {
            return;
        };

        let preset = if forward { presets.next() } else { presets.previous() };
        debug!("Ordering {}", preset.name);
        self.ordering.set(preset.keys.clone());
        self.status = Some(Status::Info(format!("Sorted by {}", preset.name)));

        for view in &mut self.views {
            view.sort();
        }
    }

    /// Replaces the library and reloads every view from it.
    pub(crate) fn set_library(&mut self, library: Library) {
        self.library = library;
        for view in &mut self.views {
            view.reload(&self.library);
        }
    }

    /// Mirrors the play queue into its view.
    pub(crate) fn sync_queue(&mut self) {
        self.queue_view.set_tracks(self.queue.upcoming());
    }

    pub(crate) fn draw_active_view(&mut self, f: &mut Frame, area: Rect) {
        let theme = &self.theme;
        let artwork = &mut self.artwork;
        match self.views.get_mut(self.active) {
            Some(view) => view.draw(f, area, theme, artwork),
            None => self.queue_view.draw(f, area, theme, artwork),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::{path::PathBuf, sync::Arc};

    use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

    use shelf::model::{Rating, Track};

    use super::*;
    use crate::tui::events::handle_event;

    fn track(id: i64, title: &str) -> Arc<Track> {
        Arc::new(Track {
            id,
            durable_id: id * 100,
            title: title.to_string(),
            album: None,
            artists: vec![],
            genres: vec![],
            publisher: None,
            track_number: Some(id as u32),
            disc_number: None,
            year: None,
            duration: 180,
            bitrate: None,
            filename: PathBuf::from(format!("/music/{id}.flac")),
            date_added: id,
            play_count: 0,
            last_played: None,
            rating: Rating::Neutral,
        })
    }

    fn app() -> (App, Receiver<AppTask>) {
        let (task_tx, task_rx) = mpsc::channel();
        let mut app = App::new(AppConfig::default(), task_tx);
        app.set_library(Library::new(
            vec![track(1, "Charlie"), track(2, "Alpha"), track(3, "Bravo")],
            vec![],
        ));
        (app, task_rx)
    }

    fn press(app: &mut App, code: KeyCode) {
        handle_event(app, AppEvent::Key(KeyEvent::new(code, KeyModifiers::NONE)))
            .expect("key handled");
    }

    /// Delivers the actions list items raised through the event channel.
    fn drain(app: &mut App) {
        while let Ok(event) = app.event_rx.try_recv() {
            handle_event(app, event).expect("event handled");
        }
    }

    #[test]
    fn test_views_follow_the_library() {
        let (app, _tasks) = app();

        assert_eq!(app.active_view().title(), "Tracks");
        assert_eq!(app.active_view().len(), 3);
        assert_eq!(app.view_titles().last(), Some(&"Queue"));
    }

    #[test]
    fn test_enter_plays_and_records() {
        let (mut app, tasks) = app();

        press(&mut app, KeyCode::Char('j'));
        press(&mut app, KeyCode::Enter);
        drain(&mut app);

        assert_eq!(app.queue.current().map(|t| t.id), Some(2));
        assert!(matches!(tasks.try_recv(), Ok(AppTask::RecordPlay(200))));
    }

    #[test]
    fn test_delete_removes_from_library_and_queue() {
        let (mut app, tasks) = app();

        press(&mut app, KeyCode::Char('j'));
        press(&mut app, KeyCode::Char('a'));
        press(&mut app, KeyCode::Char('d'));
        drain(&mut app);

        let Ok(AppTask::DeleteTracks(ids)) = tasks.try_recv() else {
            panic!("expected a delete task");
        };
        assert_eq!(ids, vec![2]);

        handle_event(&mut app, AppEvent::TracksDeleted(ids)).expect("deleted");
        assert_eq!(app.active_view().len(), 2);
        assert!(app.queue.upcoming().is_empty());
    }

    #[test]
    fn test_search_filters_live_and_escape_clears() {
        let (mut app, _tasks) = app();

        press(&mut app, KeyCode::Char('/'));
        press(&mut app, KeyCode::Char('b'));
        press(&mut app, KeyCode::Char('r'));
        assert!(app.searching);
        assert_eq!(app.active_view().len(), 1);
        assert_eq!(app.active_view().search_string(), "br");

        press(&mut app, KeyCode::Esc);
        assert!(!app.searching);
        assert_eq!(app.active_view().len(), 3);
    }

    #[test]
    fn test_view_cycling_wraps_to_queue() {
        let (mut app, _tasks) = app();

        app.cycle_view(-1);
        assert_eq!(app.active_view().title(), "Queue");

        app.cycle_view(1);
        assert_eq!(app.active_index(), 0);
    }

    #[test]
    fn test_ordering_preset_resorts_views() {
        let (mut app, _tasks) = app();
        assert_eq!(app.preset_name(), Some("Title"));

        press(&mut app, KeyCode::Char('j'));
        let first = app.active_view().selected_tracks()[0].title.clone();
        assert_eq!(first, "Alpha");

        app.cycle_ordering(false);
        assert_eq!(app.preset_name(), Some("Random"));
        app.cycle_ordering(false);
        assert_eq!(app.preset_name(), Some("Most played"));
        app.cycle_ordering(false);
        assert_eq!(app.preset_name(), Some("Recently added"));

        press(&mut app, KeyCode::Char('g'));
        assert_eq!(app.active_view().selected_tracks()[0].title, "Bravo");
    }
}
