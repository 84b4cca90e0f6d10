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

//! Reference-counted artwork thumbnails.
//!
//! List rows request the thumbnail for their artwork when the host makes
//! them visible and release it when they scroll away. Many rows may share a
//! single artwork (every track of an album shows the same cover), so the
//! cache counts requesters per [`ArtworkId`] and only lets a thumbnail go
//! once nobody holds it.
//!
//! # Threading
//!
//! Thumbnails are loaded on a dedicated worker thread. Finished loads are
//! queued on a channel and only handed to requesters from [`ArtworkCache::pump`],
//! which the UI thread calls from its event loop, so callbacks always run on
//! the UI thread.

use std::{
    cell::RefCell,
    collections::{HashMap, VecDeque},
    fmt,
    path::{Path, PathBuf},
    rc::{Rc, Weak},
    sync::{
        Arc,
        mpsc::{self, Receiver, RecvTimeoutError, Sender},
    },
    thread,
    time::Duration,
};

use log::{debug, trace, warn};

use crate::{
    error::Result,
    model::{Artwork, ArtworkId},
};

#[derive(Clone, PartialEq, Eq)]
pub struct Thumbnail {
    pub artwork: ArtworkId,
    pub bytes: Arc<[u8]>,
}

impl fmt::Debug for Thumbnail {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Thumbnail")
            .field("artwork", &self.artwork)
            .field("bytes", &self.bytes.len())
            .finish()
    }
}

pub type ThumbnailCallback = Box<dyn FnOnce(&Thumbnail)>;

/// The thumbnail collaborator consumed by list rows.
pub trait ThumbnailProvider {
    /// Registers interest in `artwork`; `on_ready` runs once the thumbnail is
    /// available, which may be immediately.
    fn request_thumbnail(&mut self, artwork: &Artwork, on_ready: ThumbnailCallback);

    /// Drops one unit of interest previously registered for `artwork`.
    fn release_thumbnail(&mut self, artwork: ArtworkId);
}

/// Loads the raw thumbnail bytes for an artwork file.
pub trait ThumbnailLoader: Send + 'static {
    fn load(&self, path: &Path) -> Result<Arc<[u8]>>;
}

impl<F> ThumbnailLoader for F
where
    F: Fn(&Path) -> Result<Arc<[u8]>> + Send + 'static,
{
    fn load(&self, path: &Path) -> Result<Arc<[u8]>> {
        self(path)
    }
}

/// Reads artwork files from disk as-is.
#[derive(Debug, Default, Clone, Copy)]
pub struct FileLoader;

impl ThumbnailLoader for FileLoader {
    fn load(&self, path: &Path) -> Result<Arc<[u8]>> {
        Ok(std::fs::read(path)?.into())
    }
}

struct LoadRequest {
    artwork: ArtworkId,
    path: PathBuf,
}

struct LoadResult {
    artwork: ArtworkId,
    result: Result<Arc<[u8]>>,
}

enum EntryState {
    Loading(Vec<ThumbnailCallback>),
    Ready(Thumbnail),
    Failed,
}

struct CacheEntry {
    refs: usize,
    state: EntryState,
}

pub struct ArtworkCache {
    entries: HashMap<ArtworkId, CacheEntry>,
    /// Ready thumbnails nobody holds, least recently released first.
    unreferenced: VecDeque<ArtworkId>,
    capacity: usize,
    load_tx: Sender<LoadRequest>,
    done_rx: Receiver<LoadResult>,
}

impl ArtworkCache {
    /// Creates a cache and spawns its loader thread.
    ///
    /// `capacity` bounds how many unreferenced thumbnails are retained.
    pub fn new(loader: impl ThumbnailLoader, capacity: usize) -> Self {
        let (load_tx, load_rx) = mpsc::channel::<LoadRequest>();
        let (done_tx, done_rx) = mpsc::channel();

        thread::spawn(move || {
            while let Ok(request) = load_rx.recv() {
                let result = loader.load(&request.path);
                if done_tx.send(LoadResult { artwork: request.artwork, result }).is_err() {
                    break;
                }
            }
        });

        Self {
            entries: HashMap::new(),
            unreferenced: VecDeque::new(),
            capacity,
            load_tx,
            done_rx,
        }
    }

    /// Number of live requesters for `artwork`.
    pub fn ref_count(&self, artwork: ArtworkId) -> usize {
        self.entries.get(&artwork).map_or(0, |e| e.refs)
    }

    pub fn is_cached(&self, artwork: ArtworkId) -> bool {
        matches!(
            self.entries.get(&artwork),
            Some(CacheEntry { state: EntryState::Ready(_), .. })
        )
    }

    pub fn thumbnail(&self, artwork: ArtworkId) -> Option<&Thumbnail> {
        match self.entries.get(&artwork) {
            Some(CacheEntry { state: EntryState::Ready(t), .. }) => Some(t),
            _ => None,
        }
    }

    /// Delivers every finished load. Returns the number of loads handled.
    pub fn pump(&mut self) -> usize {
        let mut handled = 0;
        while let Ok(done) = self.done_rx.try_recv() {
            self.complete(done);
            handled += 1;
        }
        handled
    }

    /// Like [`pump`](Self::pump) but waits up to `timeout` for the first load.
    pub fn pump_timeout(&mut self, timeout: Duration) -> usize {
        match self.done_rx.recv_timeout(timeout) {
            Ok(done) => {
                self.complete(done);
                1 + self.pump()
            }
            Err(RecvTimeoutError::Timeout | RecvTimeoutError::Disconnected) => 0,
        }
    }

    fn complete(&mut self, done: LoadResult) {
        let Some(entry) = self.entries.get_mut(&done.artwork) else {
            return;
        };

        let callbacks = match std::mem::replace(&mut entry.state, EntryState::Failed) {
            EntryState::Loading(callbacks) => callbacks,
            other => {
                // Stale result for an entry that was already resolved
                entry.state = other;
                return;
            }
        };

        match done.result {
            Ok(bytes) => {
                let thumbnail = Thumbnail { artwork: done.artwork, bytes };
                for callback in callbacks {
                    callback(&thumbnail);
                }
                entry.state = EntryState::Ready(thumbnail);
                if entry.refs == 0 {
                    self.unreferenced.push_back(done.artwork);
                    self.evict();
                }
            }
            Err(e) => {
                warn!("Failed to load artwork {:?}: {}", done.artwork, e);
                if entry.refs == 0 {
                    self.entries.remove(&done.artwork);
                }
            }
        }
    }

    fn evict(&mut self) {
        while self.unreferenced.len() > self.capacity {
            if let Some(artwork) = self.unreferenced.pop_front() {
                trace!("Evicting thumbnail {artwork:?}");
                self.entries.remove(&artwork);
            }
        }
    }

    fn start_load(&mut self, artwork: &Artwork) {
        debug!("Loading thumbnail {:?} from {}", artwork.id, artwork.path.display());
        let request = LoadRequest { artwork: artwork.id, path: artwork.path.clone() };
        if self.load_tx.send(request).is_err() {
            warn!("Artwork loader has stopped, {:?} will not load", artwork.id);
        }
    }
}

impl ThumbnailProvider for ArtworkCache {
    fn request_thumbnail(&mut self, artwork: &Artwork, on_ready: ThumbnailCallback) {
        let id = artwork.id;
        let mut needs_load = false;

        let entry = self.entries.entry(id).or_insert_with(|| {
            needs_load = true;
            CacheEntry { refs: 0, state: EntryState::Loading(Vec::new()) }
        });

        if entry.refs == 0 {
            self.unreferenced.retain(|a| *a != id);
        }
        entry.refs += 1;
        trace!("Thumbnail {id:?} requested, refs={}", entry.refs);

        if matches!(entry.state, EntryState::Failed) {
            entry.state = EntryState::Loading(Vec::new());
            needs_load = true;
        }

        match &mut entry.state {
            EntryState::Ready(thumbnail) => on_ready(thumbnail),
            EntryState::Loading(callbacks) => callbacks.push(on_ready),
            EntryState::Failed => {}
        }

        if needs_load {
            self.start_load(artwork);
        }
    }

    fn release_thumbnail(&mut self, artwork: ArtworkId) {
        let Some(entry) = self.entries.get_mut(&artwork) else {
            warn!("Release of unknown thumbnail {artwork:?}");
            return;
        };

        entry.refs = entry.refs.saturating_sub(1);
        trace!("Thumbnail {artwork:?} released, refs={}", entry.refs);

        if entry.refs > 0 {
            return;
        }

        if let EntryState::Loading(callbacks) = &mut entry.state {
            // Nobody is left to hear about it
            callbacks.clear();
            return;
        }

        if matches!(entry.state, EntryState::Ready(_)) {
            self.unreferenced.push_back(artwork);
            self.evict();
        } else {
            self.entries.remove(&artwork);
        }
    }
}

impl fmt::Debug for ArtworkCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ArtworkCache")
            .field("entries", &self.entries.len())
            .field("unreferenced", &self.unreferenced.len())
            .field("capacity", &self.capacity)
            .finish()
    }
}

#[derive(Debug, Default)]
struct SlotState {
    requested: Option<ArtworkId>,
    thumbnail: Option<Thumbnail>,
}

/// The thumbnail a single list row currently holds.
///
/// Clones share the same slot, so a host that keeps copies of the rows it
/// materialized can release them even after the presenter rebuilt its items.
#[derive(Debug, Clone, Default)]
pub struct ThumbnailSlot(Rc<RefCell<SlotState>>);

impl ThumbnailSlot {
    pub fn thumbnail(&self) -> Option<Thumbnail> {
        self.0.borrow().thumbnail.clone()
    }

    pub fn is_requested(&self) -> bool {
        self.0.borrow().requested.is_some()
    }

    /// Requests `artwork` unless this slot already holds a request.
    pub fn acquire(&self, artwork: &Artwork, provider: &mut dyn ThumbnailProvider) {
        {
            let mut state = self.0.borrow_mut();
            if state.requested.is_some() {
                return;
            }
            state.requested = Some(artwork.id);
        }

        let weak: Weak<RefCell<SlotState>> = Rc::downgrade(&self.0);
        provider.request_thumbnail(
            artwork,
            Box::new(move |thumbnail| {
                if let Some(slot) = weak.upgrade() {
                    let mut state = slot.borrow_mut();
                    if state.requested == Some(thumbnail.artwork) {
                        state.thumbnail = Some(thumbnail.clone());
                    }
                }
            }),
        );
    }

    pub fn release(&self, provider: &mut dyn ThumbnailProvider) {
        let requested = {
            let mut state = self.0.borrow_mut();
            state.thumbnail = None;
            state.requested.take()
        };
        if let Some(artwork) = requested {
            provider.release_thumbnail(artwork);
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;

    fn artwork(id: i64) -> Artwork {
        Artwork { id: ArtworkId(id), path: PathBuf::from(format!("/covers/{id}.jpg")) }
    }

    fn memory_cache(capacity: usize) -> (ArtworkCache, Arc<AtomicUsize>) {
        let loads = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&loads);
        let cache = ArtworkCache::new(
            move |path: &Path| -> Result<Arc<[u8]>> {
                counter.fetch_add(1, Ordering::SeqCst);
                Ok(path.to_string_lossy().as_bytes().into())
            },
            capacity,
        );
        (cache, loads)
    }

    #[test]
    fn test_shared_artwork_is_loaded_once_and_counted_per_requester() {
        let (mut cache, loads) = memory_cache(4);
        let first = ThumbnailSlot::default();
        let second = ThumbnailSlot::default();

        first.acquire(&artwork(1), &mut cache);
        second.acquire(&artwork(1), &mut cache);
        assert_eq!(cache.ref_count(ArtworkId(1)), 2);

        assert_eq!(cache.pump_timeout(Duration::from_secs(2)), 1);
        assert_eq!(loads.load(Ordering::SeqCst), 1);
        assert!(first.thumbnail().is_some());
        assert!(second.thumbnail().is_some());

        first.release(&mut cache);
        assert_eq!(cache.ref_count(ArtworkId(1)), 1);
        assert!(first.thumbnail().is_none());
        second.release(&mut cache);
        assert_eq!(cache.ref_count(ArtworkId(1)), 0);
    }

    #[test]
    fn test_acquire_twice_only_counts_once() {
        let (mut cache, _) = memory_cache(4);
        let slot = ThumbnailSlot::default();

        slot.acquire(&artwork(1), &mut cache);
        slot.acquire(&artwork(1), &mut cache);

        assert_eq!(cache.ref_count(ArtworkId(1)), 1);
    }

    #[test]
    fn test_ready_thumbnail_is_delivered_immediately() {
        let (mut cache, loads) = memory_cache(4);
        let first = ThumbnailSlot::default();
        first.acquire(&artwork(2), &mut cache);
        cache.pump_timeout(Duration::from_secs(2));

        let late = ThumbnailSlot::default();
        late.acquire(&artwork(2), &mut cache);

        assert!(late.thumbnail().is_some());
        assert_eq!(loads.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_unreferenced_thumbnails_are_evicted_beyond_capacity() {
        let (mut cache, _) = memory_cache(1);

        for id in 1..=3 {
            let slot = ThumbnailSlot::default();
            slot.acquire(&artwork(id), &mut cache);
            cache.pump_timeout(Duration::from_secs(2));
            slot.release(&mut cache);
        }

        assert!(!cache.is_cached(ArtworkId(1)));
        assert!(!cache.is_cached(ArtworkId(2)));
        assert!(cache.is_cached(ArtworkId(3)));
    }

    #[test]
    fn test_released_before_load_does_not_fill_slot() {
        let (mut cache, _) = memory_cache(4);
        let slot = ThumbnailSlot::default();

        slot.acquire(&artwork(5), &mut cache);
        slot.release(&mut cache);
        cache.pump_timeout(Duration::from_secs(2));

        assert!(slot.thumbnail().is_none());
        assert!(cache.is_cached(ArtworkId(5)));
        assert_eq!(cache.ref_count(ArtworkId(5)), 0);
    }
}
