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

//! # Shelf.
//!
//! A terminal browser for a local music library.
//!
//! The binary hosts the library presenters in a `ratatui` frontend:
//!
//! * The **Main Thread** manages the terminal lifecycle, owns every presenter
//!   and renders the UI.
//! * The **Task Worker** owns the database connection and runs scans, loads
//!   and deletions.
//! * The **Input** and **Tick** threads feed key presses and periodic ticks
//!   into the event loop.
//!
//! ## Architecture
//!
//! The application follows a strict setup-run-teardown pattern to ensure the
//! terminal state is preserved even in the event of a crash. Communication
//! between the UI and background workers is handled via `std::sync::mpsc`
//! channels.
//!
//! Log output goes to stderr, run with `2> shelf.log` to keep it off the
//! screen.

mod tui;

use std::{
    io,
    sync::mpsc::{self, Receiver},
    thread,
    time::Duration,
};

use anyhow::{Context, Result};
use crossterm::{
    event,
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use log::info;
use ratatui::{Terminal, backend::CrosstermBackend};

use shelf::config;

use crate::tui::{
    App,
    events::{AppEvent, process_events},
    tasks::{AppTask, spawn_task_worker},
    term,
    theme::Theme,
};

/// The entry point of the application.
///
/// Sets up logging and the communication channels, initializes the
/// application state, manages the terminal lifecycle, and returns an error if
/// any part of the execution fails.
fn main() -> Result<()> {
    let config = config::load_config();

    let mut clog = colog::default_builder();
    clog.filter(None, config.log_level());
    clog.init();

    info!("Starting with database {}", config.database_path);

    let (task_tx, task_rx) = mpsc::channel();

    let mut app = App::new(config, task_tx);

    let mut terminal = setup_terminal(&app)?;
    let res = run(&mut terminal, &mut app, task_rx);
    restore_terminal(&mut terminal);

    res.context("Application error occurred")
}

/// Prepares the terminal for the TUI application.
///
/// This function performs the following side effects:
/// * Sets the terminal background color based on the theme.
/// * Enables raw mode to capture all keyboard input.
/// * Switches the terminal to the alternate screen buffer.
///
/// # Errors
///
/// Returns an error if raw mode cannot be enabled or if the alternate screen
/// cannot be entered.
fn setup_terminal(app: &App) -> Result<Terminal<CrosstermBackend<io::Stdout>>> {
    if let Some(hex) = Theme::to_hex(app.theme.background_colour) {
        term::set_terminal_bg(&hex);
    }

    enable_raw_mode().context("Failed to enable raw mode")?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen).context("Failed to enter alternate screen")?;

    let backend = CrosstermBackend::new(stdout);
    let terminal = Terminal::new(backend).context("Failed to create terminal")?;

    Ok(terminal)
}

/// Restores the terminal to its original state.
///
/// This reverses the changes made by [`setup_terminal`]. It is best-effort and
/// does not return a result.
fn restore_terminal(terminal: &mut Terminal<CrosstermBackend<io::Stdout>>) {
    disable_raw_mode().ok();
    execute!(terminal.backend_mut(), LeaveAlternateScreen).ok();
    term::reset_terminal_bg();
    terminal.show_cursor().ok();
}

/// Starts the application's background workers and enters the main event loop.
///
/// This function spawns several long-running background threads:
/// * A task worker to process [`AppTask`]s against the database.
/// * An input thread to poll for system keyboard events.
/// * A tick thread to trigger periodic UI refreshes and artwork delivery.
///
/// # Errors
///
/// Returns an error if the event processing loop encounters an unrecoverable
/// application error.
fn run(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
    task_rx: Receiver<AppTask>,
) -> Result<()> {
    spawn_task_worker(&app.config, task_rx, app.event_tx.clone());

    let tx_keys = app.event_tx.clone();
    thread::spawn(move || {
        loop {
            if let Ok(event::Event::Key(key)) = event::read() {
                if tx_keys.send(AppEvent::Key(key)).is_err() {
                    break;
                }
            }
        }
    });

    // The tick is the minimum frame rate, and the rate at which loaded
    // thumbnails reach the rows.
    let tx_tick = app.event_tx.clone();
    thread::spawn(move || {
        while tx_tick.send(AppEvent::Tick).is_ok() {
            thread::sleep(Duration::from_millis(250));
        }
    });

    app.task_tx.send(AppTask::LoadLibrary).context("Task worker is not running")?;

    process_events(terminal, app)
}
