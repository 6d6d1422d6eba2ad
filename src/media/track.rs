//! Media stream track wrapper

use crate::native::NativeTrack;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::debug;

/// Kind of media carried by a track.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    /// Audio track.
    Audio,
    /// Video track.
    Video,
}

/// Cross-platform wrapper around one native media track.
///
/// Identity is managed by the owning peer connection's track directories: at
/// most one wrapper exists per native track id, and shared references to it
/// are handed out as `Arc<MediaStreamTrack>`.
pub struct MediaStreamTrack {
    native: Arc<dyn NativeTrack>,
    ended: AtomicBool,
}

impl MediaStreamTrack {
    /// Wrap a native track handle.
    pub fn new(native: Arc<dyn NativeTrack>) -> Self {
        Self {
            native,
            ended: AtomicBool::new(false),
        }
    }

    /// Native track identifier.
    pub fn id(&self) -> String {
        self.native.id()
    }

    /// Audio or video.
    pub fn kind(&self) -> MediaKind {
        self.native.kind()
    }

    /// Whether the track is currently enabled.
    pub fn enabled(&self) -> bool {
        self.native.enabled()
    }

    /// Enable or mute the track.
    pub fn set_enabled(&self, enabled: bool) {
        self.native.set_enabled(enabled);
    }

    /// Whether [`stop`](Self::stop) has been called.
    pub fn ended(&self) -> bool {
        self.ended.load(Ordering::SeqCst)
    }

    /// Permanently stop the track. Forwarded to the native layer once;
    /// repeated calls are no-ops at this layer.
    pub fn stop(&self) {
        if !self.ended.swap(true, Ordering::SeqCst) {
            debug!(track_id = %self.id(), "stopping track");
            self.native.stop();
        }
    }

    /// The underlying native handle.
    pub fn native(&self) -> Arc<dyn NativeTrack> {
        Arc::clone(&self.native)
    }
}

impl std::fmt::Debug for MediaStreamTrack {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MediaStreamTrack")
            .field("id", &self.id())
            .field("kind", &self.kind())
            .field("ended", &self.ended())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::native::mock::MockTrack;

    #[test]
    fn test_stop_forwards_to_native_once() {
        let native = MockTrack::new(MediaKind::Audio);
        let track = MediaStreamTrack::new(native.clone());

        assert!(!track.ended());
        track.stop();
        track.stop();
        assert!(track.ended());
        assert_eq!(native.stop_count(), 1);
    }

    #[test]
    fn test_enabled_reads_live_native_state() {
        let native = MockTrack::new(MediaKind::Video);
        let track = MediaStreamTrack::new(native.clone());

        assert!(track.enabled());
        track.set_enabled(false);
        assert!(!native.enabled());
        assert!(!track.enabled());
    }
}
