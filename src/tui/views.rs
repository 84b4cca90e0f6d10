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

//! The library views shown by the terminal host.
//!
//! Each view is a [`TableHost`] over one kind of presenter, plus the way it
//! picks its data out of a freshly loaded [`Library`]. [`LibraryView`] hides
//! the item type so the application can keep every view in one list.

use std::{rc::Rc, sync::Arc};

use crossterm::event::KeyEvent;
use ratatui::{
    Frame,
    layout::{Constraint, Rect},
};

use shelf::{
    ListItem, ListPresenter,
    actions::ActionDelegate,
    artwork::{Thumbnail, ThumbnailProvider},
    model::{Artist, Capsule, Entity, Genre, Library, Track, Year},
    presenter::{
        AlbumItem, AlbumsList, NameTagItem, NameTagStrategy, NameTagsList, PlaylistItem,
        PlaylistsList, TrackItem, TracksList, name_tags::NameTagProjection,
        playlists::PlaylistProjection,
    },
    search::SearchProvider,
    sorting::OrderingStep,
    util::format::{artist_names, format_duration, format_time, format_year, track_count},
};

use crate::tui::{
    host::{TableHost, TableRow},
    theme::Theme,
};

impl TableRow for TrackItem {
    fn header() -> &'static [&'static str] {
        &["Title", "Artist", "Album", "#", "Time"]
    }

    fn widths() -> Vec<Constraint> {
        vec![
            Constraint::Percentage(40),
            Constraint::Percentage(25),
            Constraint::Percentage(25),
            Constraint::Length(4),
            Constraint::Length(6),
        ]
    }

    fn cells(&self) -> Vec<String> {
        let track = self.track();
        vec![
            track.title.clone(),
            artist_names(track),
            track.album_title().to_string(),
            track.track_number.map(|n| format!("{n:02}")).unwrap_or_default(),
            format_time(track.duration),
        ]
    }
}

impl TableRow for AlbumItem {
    fn header() -> &'static [&'static str] {
        &["Album", "Artist", "Year", "Tracks", "Time"]
    }

    fn widths() -> Vec<Constraint> {
        vec![
            Constraint::Percentage(45),
            Constraint::Percentage(35),
            Constraint::Length(5),
            Constraint::Length(10),
            Constraint::Length(8),
        ]
    }

    fn cells(&self) -> Vec<String> {
        vec![
            self.title().to_string(),
            self.album().artist_name().to_string(),
            format_year(self.year()),
            track_count(self.tracks().len()),
            format_duration(self.duration()),
        ]
    }
}

impl TableRow for PlaylistItem {
    fn header() -> &'static [&'static str] {
        &["Playlist", "Tracks", "Time"]
    }

    fn widths() -> Vec<Constraint> {
        vec![Constraint::Percentage(70), Constraint::Length(12), Constraint::Length(8)]
    }

    fn cells(&self) -> Vec<String> {
        vec![
            self.title().to_string(),
            track_count(self.tracks().len()),
            format_duration(self.duration()),
        ]
    }
}

impl<T: Entity> TableRow for NameTagItem<T> {
    fn header() -> &'static [&'static str] {
        &["Name", "Tracks", "Time"]
    }

    fn widths() -> Vec<Constraint> {
        vec![Constraint::Percentage(70), Constraint::Length(12), Constraint::Length(8)]
    }

    fn cells(&self) -> Vec<String> {
        vec![
            self.title().to_string(),
            track_count(self.tracks().len()),
            format_duration(self.duration()),
        ]
    }
}

/// A view the application can show, whatever its item type.
pub(crate) trait LibraryView {
    fn title(&self) -> &'static str;

    fn len(&self) -> usize;

    fn selected_tracks(&self) -> &[Arc<Track>];

    fn capsule(&self) -> Option<Capsule>;

    /// Artwork of the primary selection, if it has been loaded.
    fn thumbnail(&self) -> Option<Thumbnail>;

    fn search_string(&self) -> &str;

    fn ascending(&self) -> bool;

    fn filter(&mut self, search: &str);

    fn sort(&mut self);

    fn reload(&mut self, library: &Library);

    fn process_key(
        &mut self,
        key: KeyEvent,
        delegate: &dyn ActionDelegate,
        page_size: usize,
    ) -> bool;

    fn draw(
        &mut self,
        f: &mut Frame,
        area: Rect,
        theme: &Theme,
        thumbnails: &mut dyn ThumbnailProvider,
    );

    fn release_window(&mut self, thumbnails: &mut dyn ThumbnailProvider);
}

type Reload<W> = Box<dyn Fn(&mut ListPresenter<W>, &Library)>;

pub(crate) struct LibraryTable<W: TableRow> {
    host: TableHost<W>,
    reload: Reload<W>,
}

impl<W: TableRow> LibraryTable<W> {
    pub(crate) fn new(
        title: &'static str,
        presenter: ListPresenter<W>,
        reload: impl Fn(&mut ListPresenter<W>, &Library) + 'static,
    ) -> Self {
        Self { host: TableHost::new(title, presenter), reload: Box::new(reload) }
    }
}

impl<W: TableRow> LibraryView for LibraryTable<W> {
    fn title(&self) -> &'static str {
        self.host.title()
    }

    fn len(&self) -> usize {
        self.host.presenter().len()
    }

    fn selected_tracks(&self) -> &[Arc<Track>] {
        self.host.presenter().selected_tracks()
    }

    fn capsule(&self) -> Option<Capsule> {
        self.host.presenter().capsule()
    }

    fn thumbnail(&self) -> Option<Thumbnail> {
        self.host
            .presenter()
            .selected_item()
            .and_then(|item| item.state().thumbnail().thumbnail())
    }

    fn search_string(&self) -> &str {
        self.host.presenter().search_string()
    }

    fn ascending(&self) -> bool {
        self.host.presenter().ascending()
    }

    fn filter(&mut self, search: &str) {
        self.host.presenter_mut().filter(search);
        self.host.process_pending();
    }

    fn sort(&mut self) {
        self.host.presenter_mut().sort();
        self.host.process_pending();
    }

    fn reload(&mut self, library: &Library) {
        (self.reload)(self.host.presenter_mut(), library);
        self.host.process_pending();
    }

    fn process_key(
        &mut self,
        key: KeyEvent,
        delegate: &dyn ActionDelegate,
        page_size: usize,
    ) -> bool {
        self.host.process_key(key, delegate, page_size)
    }

    fn draw(
        &mut self,
        f: &mut Frame,
        area: Rect,
        theme: &Theme,
        thumbnails: &mut dyn ThumbnailProvider,
    ) {
        self.host.draw(f, area, theme, thumbnails);
    }

    fn release_window(&mut self, thumbnails: &mut dyn ThumbnailProvider) {
        self.host.release_window(thumbnails);
    }
}

/// Builds the library views, all sharing one ordering and search provider.
pub(crate) fn library_views(
    library: &Library,
    ordering: &OrderingStep,
    search: &Rc<dyn SearchProvider>,
) -> Vec<Box<dyn LibraryView>> {
    let pool = library.tracks.clone();

    vec![
        Box::new(LibraryTable::new(
            "Tracks",
            TracksList::for_tracks(pool.clone(), ordering.clone(), Rc::clone(search)),
            |p: &mut ListPresenter<TrackItem>, lib| p.replace_pool(lib.tracks.clone()),
        )),
        Box::new(LibraryTable::new(
            "Albums",
            AlbumsList::for_albums(pool.clone(), ordering.clone(), Rc::clone(search)),
            |p: &mut ListPresenter<AlbumItem>, lib| p.replace_pool(lib.tracks.clone()),
        )),
        Box::new(tag_table(
            "Artists",
            NameTagStrategy::<Artist>::artists(),
            |lib| lib.artists.clone(),
            library,
            ordering,
            search,
        )),
        Box::new(tag_table(
            "Genres",
            NameTagStrategy::<Genre>::genres(),
            |lib| lib.genres.clone(),
            library,
            ordering,
            search,
        )),
        Box::new(tag_table(
            "Years",
            NameTagStrategy::<Year>::years(),
            |lib| lib.years.clone(),
            library,
            ordering,
            search,
        )),
        Box::new(LibraryTable::new(
            "Playlists",
            PlaylistsList::for_playlists(
                library.playlists.clone(),
                pool,
                ordering.clone(),
                Rc::clone(search),
            ),
            |p: &mut ListPresenter<PlaylistItem>, lib| {
                p.replace_source(
                    Box::new(PlaylistProjection::new(lib.playlists.clone())),
                    lib.tracks.clone(),
                )
            },
        )),
    ]
}

fn tag_table<T: Entity + 'static>(
    title: &'static str,
    strategy: NameTagStrategy<T>,
    tags_of: fn(&Library) -> Vec<Arc<T>>,
    library: &Library,
    ordering: &OrderingStep,
    search: &Rc<dyn SearchProvider>,
) -> LibraryTable<NameTagItem<T>> {
    let presenter: NameTagsList<T> = ListPresenter::for_tags(
        tags_of(library),
        strategy.clone(),
        library.tracks.clone(),
        ordering.clone(),
        Rc::clone(search),
    );

    LibraryTable::new(title, presenter, move |p, lib| {
        p.replace_source(
            Box::new(NameTagProjection::new(tags_of(lib), strategy.clone())),
            lib.tracks.clone(),
        )
    })
}

impl LibraryTable<TrackItem> {
    /// The play queue, in queue order. It is fed by
    /// [`set_tracks`](Self::set_tracks) rather than from the library.
    pub(crate) fn queue(search: &Rc<dyn SearchProvider>) -> Self {
        LibraryTable::new(
            "Queue",
            TracksList::for_tracks(vec![], OrderingStep::new(vec![]), Rc::clone(search)),
            |_: &mut ListPresenter<TrackItem>, _| {},
        )
    }

    pub(crate) fn set_tracks(&mut self, tracks: Vec<Arc<Track>>) {
        self.host.presenter_mut().replace_pool(tracks);
        self.host.process_pending();
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use shelf::{
        model::{Album, Playlist, Rating},
        search::TextSearch,
        sorting::{SortKey, SortingKey},
    };

    use super::*;

    fn library() -> Library {
        let miles = Arc::new(Artist { id: 1, name: "Miles Davis".to_string() });
        let album = Arc::new(Album {
            id: 1,
            title: "Kind of Blue".to_string(),
            album_artist: Some(Arc::clone(&miles)),
            year: Some(1959),
            artwork: None,
        });
        let tracks = ["So What", "Freddie Freeloader", "Blue in Green"]
            .iter()
            .zip(1..)
            .map(|(title, id)| {
                Arc::new(Track {
                    id,
                    durable_id: id,
                    title: title.to_string(),
                    album: Some(Arc::clone(&album)),
                    artists: vec![Arc::clone(&miles)],
                    genres: vec![],
                    publisher: None,
                    track_number: u32::try_from(id).ok(),
                    disc_number: None,
                    year: None,
                    duration: 300,
                    bitrate: None,
                    filename: PathBuf::from(format!("/jazz/{id}.flac")),
                    date_added: 0,
                    play_count: 0,
                    last_played: None,
                    rating: Rating::Neutral,
                })
            })
            .collect();
        let playlists = vec![Arc::new(Playlist {
            id: 1,
            name: "Late night".to_string(),
            tracks: vec![3, 1],
            date_created: 0,
        })];
        Library::new(tracks, playlists)
    }

    fn views() -> Vec<Box<dyn LibraryView>> {
        let ordering = OrderingStep::new(vec![SortingKey::ascending(SortKey::Title)]);
        let search: Rc<dyn SearchProvider> = Rc::new(TextSearch);
        library_views(&library(), &ordering, &search)
    }

    #[test]
    fn test_every_view_is_populated() {
        let views = views();
        let counts: Vec<(&str, usize)> = views.iter().map(|v| (v.title(), v.len())).collect();

        assert_eq!(
            counts,
            vec![
                ("Tracks", 3),
                ("Albums", 1),
                ("Artists", 1),
                ("Genres", 0),
                ("Years", 1),
                ("Playlists", 1)
            ]
        );
    }

    #[test]
    fn test_reload_drops_deleted_tracks() {
        let mut views = views();
        let smaller = library().without_tracks(&[1, 2, 3]);

        for view in &mut views {
            view.reload(&smaller);
        }

        assert_eq!(views[0].len(), 0);
        assert_eq!(views[1].len(), 0);
        assert_eq!(views[5].len(), 1);
    }

    #[test]
    fn test_queue_keeps_queue_order() {
        let library = library();
        let search: Rc<dyn SearchProvider> = Rc::new(TextSearch);
        let mut queue = LibraryTable::queue(&search);

        queue.set_tracks(vec![Arc::clone(&library.tracks[2]), Arc::clone(&library.tracks[0])]);

        let titles: Vec<&str> = queue.host.presenter().items().map(ListItem::title).collect();
        assert_eq!(titles, vec!["Blue in Green", "So What"]);
    }

    #[test]
    fn test_track_row_cells() {
        let library = library();
        let item = TrackItem::new(Arc::clone(&library.tracks[0]));

        assert_eq!(
            item.cells(),
            vec!["So What", "Miles Davis", "Kind of Blue", "01", "05:00"]
        );
    }

    #[test]
    fn test_album_row_cells() {
        let library = library();
        let item = AlbumItem::new(Arc::clone(&library.albums[0]), library.tracks.clone());

        assert_eq!(
            item.cells(),
            vec!["Kind of Blue", "Miles Davis", "1959", "3 tracks", "15:00"]
        );
    }
}
