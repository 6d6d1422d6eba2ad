//! Configuration types for peer connections

use serde::{Deserialize, Serialize};

/// ICE configuration for a peer connection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RtcConfig {
    /// STUN/TURN servers used for candidate gathering.
    pub ice_servers: Vec<IceServer>,

    /// Candidate gathering policy.
    pub ice_transport_policy: IceTransportPolicy,

    /// Media bundling policy.
    pub bundle_policy: BundlePolicy,

    /// RTCP multiplexing policy.
    pub rtcp_mux_policy: RtcpMuxPolicy,

    /// Number of candidates to pre-gather before they are needed.
    pub ice_candidate_pool_size: u16,
}

impl Default for RtcConfig {
    fn default() -> Self {
        Self {
            ice_servers: Vec::new(),
            ice_transport_policy: IceTransportPolicy::All,
            bundle_policy: BundlePolicy::Balanced,
            rtcp_mux_policy: RtcpMuxPolicy::Require,
            ice_candidate_pool_size: 0,
        }
    }
}

/// A single STUN or TURN server entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IceServer {
    /// Server URLs (stun:, turn: or turns: schemes).
    pub urls: Vec<String>,

    /// Username for TURN authentication.
    pub username: String,

    /// Credential for TURN authentication.
    pub credential: String,

    /// TLS certificate verification policy for turns: servers.
    pub tls_cert_policy: TlsCertPolicy,
}

impl IceServer {
    /// A server entry with no credentials (typical STUN).
    pub fn stun(url: impl Into<String>) -> Self {
        Self {
            urls: vec![url.into()],
            username: String::new(),
            credential: String::new(),
            tls_cert_policy: TlsCertPolicy::Secure,
        }
    }
}

/// TLS certificate verification policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TlsCertPolicy {
    /// Verify the server certificate chain.
    Secure,
    /// Skip verification. Test environments only.
    InsecureNoCheck,
}

/// Candidate gathering policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IceTransportPolicy {
    /// Gather every candidate type.
    All,
    /// Relay candidates only.
    Relay,
}

/// Media bundling policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BundlePolicy {
    /// Bundle compatible media, fall back per-transport otherwise.
    Balanced,
    /// Always bundle onto one transport.
    MaxBundle,
    /// One transport per media section.
    MaxCompat,
}

/// RTCP multiplexing policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RtcpMuxPolicy {
    /// Negotiate a separate RTCP transport when offered.
    Negotiate,
    /// Require RTP/RTCP multiplexing.
    Require,
}

/// Options for offer/answer creation.
///
/// Absent options contribute nothing to the generated constraints; present
/// ones contribute exactly one stringified mandatory pair each.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OfferAnswerOptions {
    /// Request an ICE restart.
    pub ice_restart: Option<bool>,
    /// Offer to receive audio even without a local audio track.
    pub offer_to_receive_audio: Option<bool>,
    /// Offer to receive video even without a local video track.
    pub offer_to_receive_video: Option<bool>,
    /// Enable voice activity detection.
    pub voice_activity_detection: Option<bool>,
}

impl OfferAnswerOptions {
    /// Translate into the native mandatory constraint form.
    pub fn to_media_constraints(&self) -> MediaConstraints {
        let mut constraints = MediaConstraints::default();
        if let Some(value) = self.ice_restart {
            constraints.push_mandatory("IceRestart", value);
        }
        if let Some(value) = self.offer_to_receive_audio {
            constraints.push_mandatory("OfferToReceiveAudio", value);
        }
        if let Some(value) = self.offer_to_receive_video {
            constraints.push_mandatory("OfferToReceiveVideo", value);
        }
        if let Some(value) = self.voice_activity_detection {
            constraints.push_mandatory("VoiceActivityDetection", value);
        }
        constraints
    }
}

/// Stringified key/value constraints passed to native offer/answer calls.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediaConstraints {
    /// Mandatory constraint pairs, in insertion order.
    pub mandatory: Vec<(String, String)>,
}

impl MediaConstraints {
    /// Append a mandatory constraint, stringifying the value.
    pub fn push_mandatory(&mut self, key: impl Into<String>, value: impl ToString) {
        self.mandatory.push((key.into(), value.to_string()));
    }

    /// Look up a mandatory constraint by key.
    pub fn mandatory_value(&self, key: &str) -> Option<&str> {
        self.mandatory
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }
}
