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

//! Application events and the main event loop.
//!
//! Every input reaches the UI thread as an [`AppEvent`] on a single channel:
//! keys from the input thread, ticks from the tick thread, results from the
//! task worker, and the commands list items raise through
//! [`ActionSender`].
//!
//! # Key routing
//!
//! While the search line is open it receives every key. Otherwise the active
//! view gets the first chance to handle a key, and whatever it leaves is
//! matched against the global bindings.

use std::{io::Stdout, sync::mpsc::Sender, sync::Arc};

use anyhow::{Result, anyhow};
use crossterm::event::{Event, KeyCode, KeyEvent, KeyModifiers};
use log::{info, warn};
use ratatui::{Terminal, prelude::CrosstermBackend};
use tui_input::{Input, backend::crossterm::EventHandler};

use shelf::{
    actions::{ActionDelegate, LibraryAction},
    config,
    db::scan::ScanSummary,
    model::{DatabaseIndex, Library, Track},
    util::format::track_count,
};

use crate::tui::{App, Status, render::draw, tasks::AppTask};

#[derive(Debug)]
pub(crate) enum AppEvent {
    Key(KeyEvent),
    Tick,

    LibraryLoaded(Library),
    ScanStarted,
    ScanFinished(ScanSummary),
    TracksDeleted(Vec<DatabaseIndex>),
    PlaylistDeleted(DatabaseIndex),

    Action(LibraryAction),

    ExitApplication,

    Error(String),
    FatalError(String),
}

/// Forwards the commands raised by list items to the event loop.
pub(crate) struct ActionSender(pub(crate) Sender<AppEvent>);

impl ActionDelegate for ActionSender {
    fn dispatch(&self, action: LibraryAction) {
        if self.0.send(AppEvent::Action(action)).is_err() {
            warn!("Event loop has gone, dropping action");
        }
    }
}

/// Runs the main application loop, handling events and rendering the UI in the
/// terminal.
///
/// This function loops until a 'quit' event is received or the event channel
/// is closed.
pub(crate) fn process_events(
    terminal: &mut Terminal<CrosstermBackend<Stdout>>,
    app: &mut App,
) -> Result<()> {
    terminal.draw(|f| draw(f, app))?;

    while let Ok(event) = app.event_rx.recv() {
        match event {
            AppEvent::ExitApplication => break,
            AppEvent::FatalError(message) => return Err(anyhow!(message)),
            event => handle_event(app, event)?,
        }

        terminal.draw(|f| draw(f, app))?;
    }
    Ok(())
}

pub(crate) fn handle_event(app: &mut App, event: AppEvent) -> Result<()> {
    match event {
        AppEvent::Key(key) => process_key_event(app, key)?,
        AppEvent::Tick => {
            app.artwork.pump();
        }
        AppEvent::LibraryLoaded(library) => handle_library_loaded(app, library),
        AppEvent::ScanStarted => app.status = Some(Status::Info("Scanning...".to_string())),
        AppEvent::ScanFinished(summary) => handle_scan_finished(app, summary),
        AppEvent::TracksDeleted(ids) => handle_tracks_deleted(app, &ids),
        AppEvent::PlaylistDeleted(id) => handle_playlist_deleted(app, id),
        AppEvent::Action(action) => handle_action(app, action)?,
        AppEvent::Error(message) => app.status = Some(Status::Error(message)),
        AppEvent::ExitApplication | AppEvent::FatalError(_) => {}
    }
    Ok(())
}

fn handle_library_loaded(app: &mut App, library: Library) {
    info!("Library loaded with {} tracks", library.tracks.len());
    app.status = Some(Status::Info(track_count(library.tracks.len())));
    app.set_library(library);
}

fn handle_scan_finished(app: &mut App, summary: ScanSummary) {
    let message = format!(
        "Scanned {}, skipped {}, removed {}",
        track_count(summary.imported),
        summary.skipped,
        summary.removed
    );
    info!("{message}");
    app.status = Some(Status::Info(message));
}

fn handle_tracks_deleted(app: &mut App, ids: &[DatabaseIndex]) {
    app.queue.remove_tracks(ids);
    app.sync_queue();

    let library = app.library.without_tracks(ids);
    app.set_library(library);
    app.status = Some(Status::Info(format!("Deleted {}", track_count(ids.len()))));
}

fn handle_playlist_deleted(app: &mut App, id: DatabaseIndex) {
    let mut library = app.library.clone();
    library.playlists.retain(|p| p.id != id);
    app.set_library(library);
    app.status = Some(Status::Info("Deleted playlist".to_string()));
}

/// Carries out a command raised by a list item.
fn handle_action(app: &mut App, action: LibraryAction) -> Result<()> {
    match action {
        LibraryAction::Play(tracks) => {
            let current = app.queue.play(&tracks).cloned();
            app.sync_queue();
            if let Some(track) = current {
                start_track(app, &track)?;
            }
        }
        LibraryAction::PlayNext(tracks) => {
            app.queue.insert_next(&tracks);
            app.sync_queue();
            app.status = Some(Status::Info(format!("Playing next: {}", track_count(tracks.len()))));
        }
        LibraryAction::Append(tracks) => {
            app.queue.add_tracks(&tracks);
            app.sync_queue();
            app.status = Some(Status::Info(format!("Queued {}", track_count(tracks.len()))));
        }
        LibraryAction::Edit(tracks) => {
            app.status = Some(Status::Error(format!(
                "Tag editing is not available ({} selected)",
                track_count(tracks.len())
            )));
        }
        LibraryAction::Delete(tracks) => {
            let ids = tracks.iter().map(|t| t.id).collect();
            app.task_tx.send(AppTask::DeleteTracks(ids))?;
        }
        LibraryAction::DeletePlaylist(id) => {
            app.task_tx.send(AppTask::DeletePlaylist(id))?;
        }
    }
    Ok(())
}

fn start_track(app: &mut App, track: &Arc<Track>) -> Result<()> {
    app.task_tx.send(AppTask::RecordPlay(track.durable_id))?;
    app.status = Some(Status::Info(format!("Playing {}", track.title)));
    Ok(())
}

/// Steps the page size and keeps the new value in the configuration file.
fn change_page_size(app: &mut App, up: bool) {
    let size = app.config.step_page_size(up);
    if let Err(e) = config::save_config(&app.config) {
        warn!("Failed to save configuration: {e}");
    }
    app.status = Some(Status::Info(format!("Page size {size}")));
}

/// Maps keyboard input to application actions.
///
/// # Errors
///
/// Returns an error if a task fails to send to the background worker.
fn process_key_event(app: &mut App, key: KeyEvent) -> Result<()> {
    if app.searching {
        process_search_key(app, key);
        return Ok(());
    }

    let page_size = app.config.page_size();
    let delegate = ActionSender(app.event_tx.clone());
    if app.active_view_mut().process_key(key, &delegate, page_size) {
        return Ok(());
    }

    process_global_key_event(app, key)
}

fn process_search_key(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Esc => {
            app.searching = false;
            app.search_input.reset();
            app.active_view_mut().filter("");
        }
        KeyCode::Enter => app.searching = false,
        _ => {
            if app.search_input.handle_event(&Event::Key(key)).is_some() {
                let search = app.search_input.value().to_string();
                app.active_view_mut().filter(&search);
            }
        }
    }
}

fn process_global_key_event(app: &mut App, key: KeyEvent) -> Result<()> {
    match (key.code, key.modifiers) {
        (KeyCode::Char('q'), _) => app.event_tx.send(AppEvent::ExitApplication)?,

        (KeyCode::Tab, _) => app.cycle_view(1),
        (KeyCode::BackTab, _) => app.cycle_view(-1),
        (KeyCode::Char(c @ '1'..='9'), KeyModifiers::NONE) => {
            if let Some(index) = c.to_digit(10) {
                app.show_view(index as usize - 1);
            }
        }

        (KeyCode::Char('/'), _) => {
            app.search_input = Input::new(app.active_view().search_string().to_string());
            app.searching = true;
        }

        (KeyCode::Char('o'), KeyModifiers::NONE) => app.cycle_ordering(true),
        (KeyCode::Char('O'), _) => app.cycle_ordering(false),

        (KeyCode::Char('s'), KeyModifiers::NONE) => app.task_tx.send(AppTask::ScanLibrary)?,

        (KeyCode::Char('+'), _) => change_page_size(app, true),
        (KeyCode::Char('-'), _) => change_page_size(app, false),

        (KeyCode::Char('c'), KeyModifiers::NONE) => {
            app.queue.clear();
            app.sync_queue();
        }
        (KeyCode::Char('x'), KeyModifiers::NONE) => {
            app.queue.shuffle();
            app.sync_queue();
        }
        (KeyCode::Char('>'), _) => {
            let next = app.queue.next().cloned();
            app.sync_queue();
            if let Some(track) = next {
                start_track(app, &track)?;
            }
        }
        (KeyCode::Char('<'), _) => {
            let previous = app.queue.previous().cloned();
            app.sync_queue();
            if let Some(track) = previous {
                start_track(app, &track)?;
            }
        }

        (KeyCode::Esc, _) => app.status = None,

        _ => {}
    }

    Ok(())
}
