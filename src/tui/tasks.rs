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

//! Asynchronous application task processing.
//!
//! This module implements the command pattern used to offload tasks such as
//! potentially blocking database queries from the main UI thread. It provides
//! a dedicated worker loop that translates [`AppTask`] requests into database
//! operations and broadcasts the results back to the application via
//! [`AppEvent`]s.
//!
//! The worker owns the only database connection. The UI thread never sees it,
//! it only ever receives complete [`Library`](shelf::model::Library)
//! snapshots or the ids of what changed.

use std::{
    path::PathBuf,
    sync::mpsc::{Receiver, Sender},
    thread,
    time::{SystemTime, UNIX_EPOCH},
};

use anyhow::{Context, Result};
use log::{debug, error};
use rusqlite::Connection;

use shelf::{
    config::AppConfig,
    db::{self, scan},
    model::DatabaseIndex,
};

use crate::tui::events::AppEvent;

#[derive(Debug)]
pub(crate) enum AppTask {
    LoadLibrary,
    ScanLibrary,

    DeleteTracks(Vec<DatabaseIndex>),
    DeletePlaylist(DatabaseIndex),

    /// Counts a play of the track with this durable id.
    RecordPlay(i64),
}

/// Spawns a background thread to process application tasks.
///
/// This worker thread initializes its own database connection and enters
/// a blocking loop, listening for incoming [`AppTask`]s. A failed task is
/// reported as [`AppEvent::Error`] and the worker carries on; failing to open
/// the database is reported as [`AppEvent::FatalError`].
pub(crate) fn spawn_task_worker(
    config: &AppConfig,
    task_rx: Receiver<AppTask>,
    event_tx: Sender<AppEvent>,
) {
    let config = config.clone();

    thread::spawn(move || {
        let mut conn = match db::init_db(&config.database_path) {
            Ok(conn) => conn,
            Err(e) => {
                error!("Failed to open {}: {e}", config.database_path);
                let _ = event_tx.send(AppEvent::FatalError(format!(
                    "Failed to open {}: {e}",
                    config.database_path
                )));
                return;
            }
        };

        while let Ok(task) = task_rx.recv() {
            debug!("Task {task:?}");

            let mut ctx = TaskContext { config: &config, event_tx: &event_tx, conn: &mut conn };

            if let Err(e) = handle_task(task, &mut ctx) {
                error!("Task failed: {e:#}");
                let _ = event_tx.send(AppEvent::Error(format!("{e:#}")));
            }
        }
    });
}

/// Bundles shared resources required by task handlers to simplify resource
/// passing when invoking those handler functions.
struct TaskContext<'a> {
    config: &'a AppConfig,
    event_tx: &'a Sender<AppEvent>,
    conn: &'a mut Connection,
}

fn handle_task(task: AppTask, ctx: &mut TaskContext) -> Result<()> {
    match task {
        AppTask::LoadLibrary => load_library(ctx),
        AppTask::ScanLibrary => scan_library(ctx),
        AppTask::DeleteTracks(ids) => delete_tracks(ctx, ids),
        AppTask::DeletePlaylist(id) => delete_playlist(ctx, id),
        AppTask::RecordPlay(durable_id) => record_play(ctx, durable_id),
    }
}

fn load_library(ctx: &mut TaskContext) -> Result<()> {
    let library = db::load_library(ctx.conn).context("Failed to load library")?;
    ctx.event_tx.send(AppEvent::LibraryLoaded(library))?;

    Ok(())
}

fn scan_library(ctx: &mut TaskContext) -> Result<()> {
    let roots: Vec<PathBuf> = ctx.config.media_dirs.iter().map(PathBuf::from).collect();
    if roots.is_empty() {
        ctx.event_tx.send(AppEvent::Error(
            "No media directories configured".to_string(),
        ))?;
        return Ok(());
    }

    ctx.event_tx.send(AppEvent::ScanStarted)?;
    let summary = scan::process_music_library(ctx.conn, &roots, unix_now())
        .context("Failed to scan media directories")?;
    ctx.event_tx.send(AppEvent::ScanFinished(summary))?;

    load_library(ctx)
}

fn delete_tracks(ctx: &mut TaskContext, ids: Vec<DatabaseIndex>) -> Result<()> {
    db::delete_tracks(ctx.conn, &ids)?;
    ctx.event_tx.send(AppEvent::TracksDeleted(ids))?;

    Ok(())
}

fn delete_playlist(ctx: &mut TaskContext, id: DatabaseIndex) -> Result<()> {
    db::delete_playlist(ctx.conn, id)?;
    ctx.event_tx.send(AppEvent::PlaylistDeleted(id))?;

    Ok(())
}

fn record_play(ctx: &mut TaskContext, durable_id: i64) -> Result<()> {
    db::increment_play_count(ctx.conn, durable_id, unix_now())?;

    Ok(())
}

fn unix_now() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |d| i64::try_from(d.as_secs()).unwrap_or(i64::MAX))
}
