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

//! Commands raised by list items.
//!
//! Items never act on playback or the database directly; they describe what
//! the user asked for and hand it to an [`ActionDelegate`] supplied by the
//! application.

use std::sync::Arc;

use crate::model::{DatabaseIndex, Track};

#[derive(Debug, Clone, PartialEq)]
pub enum LibraryAction {
    /// Replace the queue with these tracks and start playing.
    Play(Vec<Arc<Track>>),
    /// Insert these tracks right after the current one.
    PlayNext(Vec<Arc<Track>>),
    /// Add these tracks to the end of the queue.
    Append(Vec<Arc<Track>>),
    Edit(Vec<Arc<Track>>),
    Delete(Vec<Arc<Track>>),
    DeletePlaylist(DatabaseIndex),
}

impl LibraryAction {
    pub fn tracks(&self) -> &[Arc<Track>] {
        match self {
            Self::Play(tracks)
            | Self::PlayNext(tracks)
            | Self::Append(tracks)
            | Self::Edit(tracks)
            | Self::Delete(tracks) => tracks,
            Self::DeletePlaylist(_) => &[],
        }
    }
}

pub trait ActionDelegate {
    fn dispatch(&self, action: LibraryAction);
}

#[cfg(test)]
#[derive(Debug, Default)]
pub(crate) struct RecordingDelegate(std::cell::RefCell<Vec<LibraryAction>>);

#[cfg(test)]
impl RecordingDelegate {
    pub(crate) fn take(&self) -> Vec<LibraryAction> {
        self.0.take()
    }
}

#[cfg(test)]
impl ActionDelegate for RecordingDelegate {
    fn dispatch(&self, action: LibraryAction) {
        self.0.borrow_mut().push(action);
    }
}
