//! Track identity directories
//!
//! Keyed mapping from a native track identifier to the single wrapper track
//! owned for it. Mutations come from the controller's callback-handling and
//! operation paths; concurrent reads from the public query methods are safe.

use crate::media::MediaStreamTrack;
use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

pub(crate) struct TrackDirectory {
    tracks: RwLock<HashMap<String, Arc<MediaStreamTrack>>>,
}

impl TrackDirectory {
    pub(crate) fn new() -> Self {
        Self {
            tracks: RwLock::new(HashMap::new()),
        }
    }

    /// Return the existing wrapper for `id`, or build one via `factory` and
    /// store it. The factory runs at most once per id.
    pub(crate) fn get_or_create(
        &self,
        id: &str,
        factory: impl FnOnce() -> Arc<MediaStreamTrack>,
    ) -> Arc<MediaStreamTrack> {
        let mut tracks = self
            .tracks
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        match tracks.entry(id.to_string()) {
            Entry::Occupied(entry) => Arc::clone(entry.get()),
            Entry::Vacant(entry) => {
                let track = factory();
                entry.insert(Arc::clone(&track));
                track
            }
        }
    }

    pub(crate) fn insert(&self, id: String, track: Arc<MediaStreamTrack>) {
        self.tracks
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(id, track);
    }

    pub(crate) fn lookup(&self, id: &str) -> Option<Arc<MediaStreamTrack>> {
        self.tracks
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(id)
            .cloned()
    }

    pub(crate) fn remove(&self, id: &str) -> Option<Arc<MediaStreamTrack>> {
        self.tracks
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(id)
    }

    /// Remove and return every entry.
    pub(crate) fn drain(&self) -> Vec<Arc<MediaStreamTrack>> {
        self.tracks
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .drain()
            .map(|(_, track)| track)
            .collect()
    }

    pub(crate) fn len(&self) -> usize {
        self.tracks
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
