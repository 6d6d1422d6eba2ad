//! Media stream aggregate

use crate::media::{MediaKind, MediaStreamTrack};
use std::sync::Arc;

/// A media stream: an identifier plus the tracks grouped under it.
///
/// Built by the bridge when the native layer reports streams alongside an
/// added receiver, and constructible by callers to associate local tracks
/// with stream ids in [`add_track`](crate::PeerConnection::add_track).
#[derive(Debug, Clone)]
pub struct MediaStream {
    id: String,
    tracks: Vec<Arc<MediaStreamTrack>>,
}

impl MediaStream {
    /// Create an empty stream with the given id.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            tracks: Vec::new(),
        }
    }

    /// Stream identifier.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Add a track to the stream.
    pub fn add_track(&mut self, track: Arc<MediaStreamTrack>) {
        self.tracks.push(track);
    }

    /// All tracks in the stream.
    pub fn tracks(&self) -> &[Arc<MediaStreamTrack>] {
        &self.tracks
    }

    /// Audio tracks only.
    pub fn audio_tracks(&self) -> Vec<Arc<MediaStreamTrack>> {
        self.tracks
            .iter()
            .filter(|t| t.kind() == MediaKind::Audio)
            .cloned()
            .collect()
    }

    /// Video tracks only.
    pub fn video_tracks(&self) -> Vec<Arc<MediaStreamTrack>> {
        self.tracks
            .iter()
            .filter(|t| t.kind() == MediaKind::Video)
            .cloned()
            .collect()
    }
}
