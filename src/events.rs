//! Peer connection event types
//!
//! One tagged union covers every native delegate notification; each variant
//! carries only the data needed to act on it. Events are emitted in the
//! exact order the native layer delivers the underlying callbacks.

use crate::channel::DataChannel;
use crate::media::{MediaStream, MediaStreamTrack};
use crate::rtp::{RtpReceiver, RtpTransceiver};
use crate::sdp::IceCandidate;
use crate::states::{IceConnectionState, IceGatheringState, PeerConnectionState, SignalingState};
use std::sync::Arc;

/// Payload of a track-added event: the receiver, its streams, the primary
/// track, and the transceiver that matched the receiver.
#[derive(Debug, Clone)]
pub struct TrackEvent {
    /// The newly added receiver.
    pub receiver: RtpReceiver,
    /// Streams the track belongs to.
    pub streams: Vec<MediaStream>,
    /// The receiver's track, if resolved in the remote directory.
    pub track: Option<Arc<MediaStreamTrack>>,
    /// The transceiver owning the receiver.
    pub transceiver: RtpTransceiver,
}

/// An event observed on a peer connection.
#[derive(Debug, Clone)]
pub enum PeerConnectionEvent {
    /// Signaling state changed.
    SignalingStateChange(SignalingState),
    /// Legacy ICE connection state changed.
    IceConnectionStateChange(IceConnectionState),
    /// Standards-compliant ICE connection state changed.
    StandardizedIceConnectionChange(IceConnectionState),
    /// ICE gathering state changed.
    IceGatheringStateChange(IceGatheringState),
    /// Renegotiation is required.
    NegotiationNeeded,
    /// A new local ICE candidate is ready for signaling.
    NewIceCandidate(IceCandidate),
    /// Previously signaled local candidates were invalidated.
    RemovedIceCandidates(Vec<IceCandidate>),
    /// The remote peer opened a data channel.
    NewDataChannel(DataChannel),
    /// A remote track was added.
    Track(TrackEvent),
    /// A remote track was removed. The carried receiver still references
    /// the track; it is stopped immediately after this event is emitted.
    RemoveTrack(RtpReceiver),
    /// Aggregate connection state changed.
    ConnectionStateChange(PeerConnectionState),
}

impl PeerConnectionEvent {
    /// Event name for logging/debugging.
    pub fn name(&self) -> &'static str {
        match self {
            PeerConnectionEvent::SignalingStateChange(_) => "signaling_state_change",
            PeerConnectionEvent::IceConnectionStateChange(_) => "ice_connection_state_change",
            PeerConnectionEvent::StandardizedIceConnectionChange(_) => {
                "standardized_ice_connection_change"
            }
            PeerConnectionEvent::IceGatheringStateChange(_) => "ice_gathering_state_change",
            PeerConnectionEvent::NegotiationNeeded => "negotiation_needed",
            PeerConnectionEvent::NewIceCandidate(_) => "new_ice_candidate",
            PeerConnectionEvent::RemovedIceCandidates(_) => "removed_ice_candidates",
            PeerConnectionEvent::NewDataChannel(_) => "new_data_channel",
            PeerConnectionEvent::Track(_) => "track",
            PeerConnectionEvent::RemoveTrack(_) => "remove_track",
            PeerConnectionEvent::ConnectionStateChange(_) => "connection_state_change",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_names() {
        assert_eq!(PeerConnectionEvent::NegotiationNeeded.name(), "negotiation_needed");
        assert_eq!(
            PeerConnectionEvent::SignalingStateChange(SignalingState::Stable).name(),
            "signaling_state_change"
        );
        assert_eq!(
            PeerConnectionEvent::NewIceCandidate(IceCandidate::new("0", 0, "candidate:x")).name(),
            "new_ice_candidate"
        );
    }
}
