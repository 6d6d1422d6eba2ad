//! RTP sender/receiver/transceiver wrappers
//!
//! Each wrapper pairs a native handle with the track resolved from the
//! owning peer connection's directories at construction time. A track may be
//! absent when the native side has no matching directory entry.

use crate::media::MediaStreamTrack;
use crate::native::{NativeRtpReceiver, NativeRtpSender, NativeTransceiver};
use std::sync::Arc;

/// Sending half of an RTP transceiver.
#[derive(Clone)]
pub struct RtpSender {
    native: Arc<dyn NativeRtpSender>,
    track: Option<Arc<MediaStreamTrack>>,
}

impl RtpSender {
    pub(crate) fn new(native: Arc<dyn NativeRtpSender>, track: Option<Arc<MediaStreamTrack>>) -> Self {
        Self { native, track }
    }

    /// Native sender identifier.
    pub fn id(&self) -> String {
        self.native.id()
    }

    /// The local track this sender transmits, if resolved.
    pub fn track(&self) -> Option<Arc<MediaStreamTrack>> {
        self.track.clone()
    }
}

impl std::fmt::Debug for RtpSender {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RtpSender")
            .field("id", &self.id())
            .field("track", &self.track.as_ref().map(|t| t.id()))
            .finish()
    }
}

/// Receiving half of an RTP transceiver.
#[derive(Clone)]
pub struct RtpReceiver {
    native: Arc<dyn NativeRtpReceiver>,
    track: Option<Arc<MediaStreamTrack>>,
}

impl RtpReceiver {
    pub(crate) fn new(
        native: Arc<dyn NativeRtpReceiver>,
        track: Option<Arc<MediaStreamTrack>>,
    ) -> Self {
        Self { native, track }
    }

    /// Native receiver identifier.
    pub fn id(&self) -> String {
        self.native.id()
    }

    /// The remote track this receiver delivers, if resolved.
    pub fn track(&self) -> Option<Arc<MediaStreamTrack>> {
        self.track.clone()
    }
}

impl std::fmt::Debug for RtpReceiver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RtpReceiver")
            .field("id", &self.id())
            .field("track", &self.track.as_ref().map(|t| t.id()))
            .finish()
    }
}

/// A sender/receiver pair sharing one negotiation slot.
#[derive(Clone)]
pub struct RtpTransceiver {
    native: Arc<dyn NativeTransceiver>,
    sender_track: Option<Arc<MediaStreamTrack>>,
    receiver_track: Option<Arc<MediaStreamTrack>>,
}

impl RtpTransceiver {
    pub(crate) fn new(
        native: Arc<dyn NativeTransceiver>,
        sender_track: Option<Arc<MediaStreamTrack>>,
        receiver_track: Option<Arc<MediaStreamTrack>>,
    ) -> Self {
        Self {
            native,
            sender_track,
            receiver_track,
        }
    }

    /// Media description identifier, once negotiated.
    pub fn mid(&self) -> Option<String> {
        self.native.mid()
    }

    /// The sending half with its resolved local track.
    pub fn sender(&self) -> RtpSender {
        RtpSender::new(self.native.sender(), self.sender_track.clone())
    }

    /// The receiving half with its resolved remote track.
    pub fn receiver(&self) -> RtpReceiver {
        RtpReceiver::new(self.native.receiver(), self.receiver_track.clone())
    }
}

impl std::fmt::Debug for RtpTransceiver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RtpTransceiver")
            .field("mid", &self.mid())
            .field("sender_track", &self.sender_track.as_ref().map(|t| t.id()))
            .field(
                "receiver_track",
                &self.receiver_track.as_ref().map(|t| t.id()),
            )
            .finish()
    }
}
