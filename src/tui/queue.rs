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

//! Play queue.
//!
//! Receives the play, play next and append commands raised from the library
//! lists. The queue only tracks what would be played; there is no audio
//! output behind it.

use std::{
    collections::{HashSet, VecDeque},
    sync::Arc,
};

use rand::{rng, seq::SliceRandom};

use shelf::model::{DatabaseIndex, Track};

#[derive(Debug, Default)]
pub(crate) struct Queue {
    queued: VecDeque<Arc<Track>>,
    played: Vec<Arc<Track>>,
    current: Option<Arc<Track>>,
}

impl Queue {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Replaces everything still to come with `tracks` and starts the first.
    pub(crate) fn play(&mut self, tracks: &[Arc<Track>]) -> Option<&Arc<Track>> {
        self.queued.clear();
        self.queued.extend(tracks.iter().cloned());
        self.next()
    }

    /// Queues `tracks` right after the current track, keeping their order.
    pub(crate) fn insert_next(&mut self, tracks: &[Arc<Track>]) {
        for track in tracks.iter().rev() {
            self.queued.push_front(Arc::clone(track));
        }
    }

    pub(crate) fn add_tracks(&mut self, tracks: &[Arc<Track>]) {
        self.queued.extend(tracks.iter().cloned());
    }

    pub(crate) fn remove_tracks(&mut self, track_ids: &[DatabaseIndex]) {
        let ids_to_remove: HashSet<DatabaseIndex> = track_ids.iter().copied().collect();

        if self.current.as_ref().is_some_and(|t| ids_to_remove.contains(&t.id)) {
            self.current = None;
        }

        self.played.retain(|track| !ids_to_remove.contains(&track.id));
        self.queued.retain(|track| !ids_to_remove.contains(&track.id));
    }

    pub(crate) fn shuffle(&mut self) {
        let mut rng = rng();
        self.queued.make_contiguous().shuffle(&mut rng);
    }

    pub(crate) fn clear(&mut self) {
        self.queued.clear();
    }

    pub(crate) fn current(&self) -> Option<&Arc<Track>> {
        self.current.as_ref()
    }

    /// The current track followed by everything queued after it.
    pub(crate) fn upcoming(&self) -> Vec<Arc<Track>> {
        self.current.iter().chain(self.queued.iter()).cloned().collect()
    }

    pub(crate) fn next(&mut self) -> Option<&Arc<Track>> {
        if let Some(track) = self.current.take() {
            self.played.push(track);
        }

        self.current = self.queued.pop_front();

        self.current.as_ref()
    }

    pub(crate) fn previous(&mut self) -> Option<&Arc<Track>> {
        if self.played.is_empty() {
            return self.current.as_ref();
        }

        if let Some(track) = self.current.take() {
            self.queued.push_front(track);
        }

        self.current = self.played.pop();

        self.current.as_ref()
    }
}
