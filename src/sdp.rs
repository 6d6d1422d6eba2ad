//! Session description and ICE candidate value objects
//!
//! The SDP blob is opaque to this layer; no syntax validation happens here.

use serde::{Deserialize, Serialize};

/// Session description type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SdpType {
    /// An offer initiating negotiation.
    Offer,
    /// A provisional answer.
    Pranswer,
    /// A final answer.
    Answer,
    /// A rollback to the previous stable state.
    Rollback,
}

impl SdpType {
    /// Canonical lowercase string form used on the wire by signaling layers.
    pub fn as_str(&self) -> &'static str {
        match self {
            SdpType::Offer => "offer",
            SdpType::Pranswer => "pranswer",
            SdpType::Answer => "answer",
            SdpType::Rollback => "rollback",
        }
    }

    /// Parse the canonical string form.
    pub fn from_str(value: &str) -> Option<Self> {
        match value {
            "offer" => Some(SdpType::Offer),
            "pranswer" => Some(SdpType::Pranswer),
            "answer" => Some(SdpType::Answer),
            "rollback" => Some(SdpType::Rollback),
            _ => None,
        }
    }
}

/// An immutable session description: a type plus an opaque SDP blob.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionDescription {
    /// Description type.
    #[serde(rename = "type")]
    pub sdp_type: SdpType,
    /// Opaque SDP string.
    pub sdp: String,
}

impl SessionDescription {
    /// Create a new session description.
    pub fn new(sdp_type: SdpType, sdp: impl Into<String>) -> Self {
        Self {
            sdp_type,
            sdp: sdp.into(),
        }
    }
}

/// An ICE candidate as exchanged over signaling.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IceCandidate {
    /// Media stream identification tag.
    pub sdp_mid: String,
    /// Index of the media description this candidate belongs to.
    pub sdp_mline_index: i32,
    /// The candidate line itself.
    pub candidate: String,
}

impl IceCandidate {
    /// Create a new ICE candidate.
    pub fn new(
        sdp_mid: impl Into<String>,
        sdp_mline_index: i32,
        candidate: impl Into<String>,
    ) -> Self {
        Self {
            sdp_mid: sdp_mid.into(),
            sdp_mline_index,
            candidate: candidate.into(),
        }
    }
}

impl std::fmt::Display for IceCandidate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.candidate)
    }
}
