//! Common state enumerations and native-to-common translators
//!
//! Translation is pure and total: every native value maps to exactly one
//! common value through an exhaustive match. An unrecognized native value is
//! a compile error here, never a silent misclassification.

use crate::native::{
    NativeConnectionState, NativeIceConnectionState, NativeIceGatheringState, NativeSignalingState,
};
use serde::{Deserialize, Serialize};

/// Negotiation state machine phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SignalingState {
    /// No offer/answer exchange in progress.
    Stable,
    /// A local offer has been applied.
    HaveLocalOffer,
    /// A remote offer has been applied.
    HaveRemoteOffer,
    /// A local provisional answer has been applied.
    HaveLocalPranswer,
    /// A remote provisional answer has been applied.
    HaveRemotePranswer,
    /// The connection is closed.
    Closed,
}

/// ICE connection state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum IceConnectionState {
    /// The agent has not started checking candidates.
    New,
    /// Candidate pairs are being checked.
    Checking,
    /// A usable candidate pair was found.
    Connected,
    /// All candidate pairs have been checked and a connection exists.
    Completed,
    /// No usable candidate pair could be found.
    Failed,
    /// Connectivity was lost.
    Disconnected,
    /// The ICE agent has shut down.
    Closed,
    /// Sentinel value forwarded verbatim from SDKs that expose it.
    Count,
}

/// ICE candidate gathering state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum IceGatheringState {
    /// Gathering has not started.
    New,
    /// Candidates are being gathered.
    Gathering,
    /// Gathering is complete.
    Complete,
}

/// Aggregate peer-connection state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PeerConnectionState {
    /// Freshly constructed.
    New,
    /// Transports are connecting.
    Connecting,
    /// All transports are connected.
    Connected,
    /// At least one transport is disconnected.
    Disconnected,
    /// A transport failed permanently.
    Failed,
    /// The connection is closed.
    Closed,
}

impl From<NativeSignalingState> for SignalingState {
    fn from(state: NativeSignalingState) -> Self {
        match state {
            NativeSignalingState::Stable => SignalingState::Stable,
            NativeSignalingState::HaveLocalOffer => SignalingState::HaveLocalOffer,
            NativeSignalingState::HaveLocalPrAnswer => SignalingState::HaveLocalPranswer,
            NativeSignalingState::HaveRemoteOffer => SignalingState::HaveRemoteOffer,
            NativeSignalingState::HaveRemotePrAnswer => SignalingState::HaveRemotePranswer,
            NativeSignalingState::Closed => SignalingState::Closed,
        }
    }
}

impl From<NativeIceConnectionState> for IceConnectionState {
    fn from(state: NativeIceConnectionState) -> Self {
        match state {
            NativeIceConnectionState::New => IceConnectionState::New,
            NativeIceConnectionState::Checking => IceConnectionState::Checking,
            NativeIceConnectionState::Connected => IceConnectionState::Connected,
            NativeIceConnectionState::Completed => IceConnectionState::Completed,
            NativeIceConnectionState::Failed => IceConnectionState::Failed,
            NativeIceConnectionState::Disconnected => IceConnectionState::Disconnected,
            NativeIceConnectionState::Closed => IceConnectionState::Closed,
            NativeIceConnectionState::Count => IceConnectionState::Count,
        }
    }
}

impl From<NativeIceGatheringState> for IceGatheringState {
    fn from(state: NativeIceGatheringState) -> Self {
        match state {
            NativeIceGatheringState::New => IceGatheringState::New,
            NativeIceGatheringState::Gathering => IceGatheringState::Gathering,
            NativeIceGatheringState::Complete => IceGatheringState::Complete,
        }
    }
}

impl From<NativeConnectionState> for PeerConnectionState {
    fn from(state: NativeConnectionState) -> Self {
        match state {
            NativeConnectionState::New => PeerConnectionState::New,
            NativeConnectionState::Connecting => PeerConnectionState::Connecting,
            NativeConnectionState::Connected => PeerConnectionState::Connected,
            NativeConnectionState::Disconnected => PeerConnectionState::Disconnected,
            NativeConnectionState::Failed => PeerConnectionState::Failed,
            NativeConnectionState::Closed => PeerConnectionState::Closed,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_signaling_state_translation_is_total_and_idempotent() {
        let cases = [
            (NativeSignalingState::Stable, SignalingState::Stable),
            (
                NativeSignalingState::HaveLocalOffer,
                SignalingState::HaveLocalOffer,
            ),
            (
                NativeSignalingState::HaveLocalPrAnswer,
                SignalingState::HaveLocalPranswer,
            ),
            (
                NativeSignalingState::HaveRemoteOffer,
                SignalingState::HaveRemoteOffer,
            ),
            (
                NativeSignalingState::HaveRemotePrAnswer,
                SignalingState::HaveRemotePranswer,
            ),
            (NativeSignalingState::Closed, SignalingState::Closed),
        ];
        for (native, common) in cases {
            assert_eq!(SignalingState::from(native), common);
            assert_eq!(SignalingState::from(native), SignalingState::from(native));
        }
    }

    #[test]
    fn test_ice_connection_state_translation_is_total() {
        let cases = [
            (NativeIceConnectionState::New, IceConnectionState::New),
            (
                NativeIceConnectionState::Checking,
                IceConnectionState::Checking,
            ),
            (
                NativeIceConnectionState::Connected,
                IceConnectionState::Connected,
            ),
            (
                NativeIceConnectionState::Completed,
                IceConnectionState::Completed,
            ),
            (NativeIceConnectionState::Failed, IceConnectionState::Failed),
            (
                NativeIceConnectionState::Disconnected,
                IceConnectionState::Disconnected,
            ),
            (NativeIceConnectionState::Closed, IceConnectionState::Closed),
            (NativeIceConnectionState::Count, IceConnectionState::Count),
        ];
        for (native, common) in cases {
            assert_eq!(IceConnectionState::from(native), common);
        }
    }

    #[test]
    fn test_gathering_and_connection_state_translation() {
        assert_eq!(
            IceGatheringState::from(NativeIceGatheringState::Gathering),
            IceGatheringState::Gathering
        );
        assert_eq!(
            PeerConnectionState::from(NativeConnectionState::Connecting),
            PeerConnectionState::Connecting
        );
        assert_eq!(
            PeerConnectionState::from(NativeConnectionState::Failed),
            PeerConnectionState::Failed
        );
    }

    #[test]
    fn test_state_serialization_uses_kebab_case() {
        let json = serde_json::to_string(&SignalingState::HaveLocalOffer).unwrap();
        assert_eq!(json, "\"have-local-offer\"");
    }
}
