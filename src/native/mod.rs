//! Native engine abstraction layer
//!
//! The bridge never talks to a platform WebRTC SDK directly; it consumes the
//! traits in this module. A backend implements [`NativeEngine`] plus the
//! per-entity traits and delivers delegate callbacks as [`NativeCallback`]
//! values through the handler registered on [`NativePeerConnection`]. The
//! crate ships one reference backend, [`mock`], used by the integration
//! tests and by downstream consumers testing their signaling logic.

use crate::channel::{DataChannelInit, DataChannelState};
use crate::completion::Completion;
use crate::config::{MediaConstraints, RtcConfig};
use crate::media::MediaKind;
use crate::sdp::{IceCandidate, SessionDescription};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;

pub mod mock;

/// Error reported by the native layer, preserving the platform error's
/// domain and descriptive message.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{domain}: {message}")]
pub struct NativeError {
    /// Error domain/category as reported by the platform SDK.
    pub domain: String,
    /// Human-readable message from the platform SDK.
    pub message: String,
}

impl NativeError {
    /// Create a new native error.
    pub fn new(domain: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            domain: domain.into(),
            message: message.into(),
        }
    }
}

/// Signaling state as reported by the native peer connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NativeSignalingState {
    /// No offer/answer exchange in progress.
    Stable,
    /// A local offer has been applied.
    HaveLocalOffer,
    /// A local provisional answer has been applied.
    HaveLocalPrAnswer,
    /// A remote offer has been applied.
    HaveRemoteOffer,
    /// A remote provisional answer has been applied.
    HaveRemotePrAnswer,
    /// The connection is closed.
    Closed,
}

/// ICE connection state as reported by the native peer connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NativeIceConnectionState {
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
    /// Sentinel value carried by some SDKs; never a real transition target.
    Count,
}

/// ICE gathering state as reported by the native peer connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NativeIceGatheringState {
    /// Gathering has not started.
    New,
    /// Candidates are being gathered.
    Gathering,
    /// Gathering is complete.
    Complete,
}

/// Aggregate peer-connection state as reported by the native layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NativeConnectionState {
    /// Freshly constructed.
    New,
    /// ICE or DTLS transports are connecting.
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

/// Severity threshold for the native engine's internal logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogSeverity {
    /// Everything, including per-packet noise.
    Verbose,
    /// Informational messages and above.
    Info,
    /// Warnings and errors only.
    Warning,
    /// Errors only.
    Error,
    /// Native logging fully disabled.
    None,
}

/// Process-wide options applied during one-time engine initialization.
#[derive(Debug, Clone, Default)]
pub struct EngineOptions {
    /// WebRTC field trial key/value pairs.
    pub field_trials: HashMap<String, String>,
    /// Minimum severity for native debug logging, if overridden.
    pub logging_severity: Option<LogSeverity>,
    /// Whether to start the engine's internal tracer.
    pub enable_internal_tracer: bool,
}

/// A native media track handle.
///
/// The track identifier is an opaque string, stable for the lifetime of the
/// underlying native track.
pub trait NativeTrack: Send + Sync {
    /// Opaque native track identifier.
    fn id(&self) -> String;
    /// Whether this is an audio or video track.
    fn kind(&self) -> MediaKind;
    /// Current enabled flag.
    fn enabled(&self) -> bool;
    /// Enable or mute the track.
    fn set_enabled(&self, enabled: bool);
    /// Permanently stop the track.
    fn stop(&self);
}

/// A native RTP sender handle.
pub trait NativeRtpSender: Send + Sync {
    /// Opaque native sender identifier.
    fn id(&self) -> String;
    /// The track currently attached to this sender, if any.
    fn track(&self) -> Option<Arc<dyn NativeTrack>>;
}

/// A native RTP receiver handle.
pub trait NativeRtpReceiver: Send + Sync {
    /// Opaque native receiver identifier.
    fn id(&self) -> String;
    /// The track this receiver delivers, if known yet.
    fn track(&self) -> Option<Arc<dyn NativeTrack>>;
}

/// A native transceiver handle pairing one sender and one receiver.
pub trait NativeTransceiver: Send + Sync {
    /// Media description identifier, once negotiated.
    fn mid(&self) -> Option<String>;
    /// The sending half.
    fn sender(&self) -> Arc<dyn NativeRtpSender>;
    /// The receiving half.
    fn receiver(&self) -> Arc<dyn NativeRtpReceiver>;
}

/// A native media stream handle as reported alongside an added receiver.
pub trait NativeMediaStream: Send + Sync {
    /// Native stream identifier.
    fn id(&self) -> String;
    /// Audio tracks carried by the stream.
    fn audio_tracks(&self) -> Vec<Arc<dyn NativeTrack>>;
    /// Video tracks carried by the stream.
    fn video_tracks(&self) -> Vec<Arc<dyn NativeTrack>>;
}

/// A native data channel handle.
pub trait NativeDataChannel: Send + Sync {
    /// Channel label chosen at creation.
    fn label(&self) -> String;
    /// Negotiated channel id.
    fn id(&self) -> i32;
    /// Current channel state.
    fn state(&self) -> DataChannelState;
    /// Send a message over the channel.
    fn send(&self, data: &[u8], binary: bool) -> Result<(), NativeError>;
    /// Close the channel.
    fn close(&self);
}

/// Raw delegate callback delivered by the native layer.
///
/// All per-event delegate methods of the platform SDK funnel into this one
/// tagged union, delivered through the handler registered with
/// [`NativePeerConnection::register_handler`] on whatever thread the SDK's
/// signaling runs on.
pub enum NativeCallback {
    /// Signaling state changed.
    SignalingChange(NativeSignalingState),
    /// Legacy ICE connection state changed.
    IceConnectionChange(NativeIceConnectionState),
    /// Standards-compliant ICE connection state changed.
    StandardizedIceConnectionChange(NativeIceConnectionState),
    /// ICE gathering state changed.
    IceGatheringChange(NativeIceGatheringState),
    /// Renegotiation is required.
    NegotiationNeeded,
    /// A new local ICE candidate was gathered.
    IceCandidate(IceCandidate),
    /// Previously gathered local candidates were invalidated.
    IceCandidatesRemoved(Vec<IceCandidate>),
    /// The remote peer opened a data channel.
    DataChannelOpened(Arc<dyn NativeDataChannel>),
    /// Aggregate connection state changed.
    ConnectionChange(NativeConnectionState),
    /// A receiver (and its media streams) was added by remote negotiation.
    ReceiverAdded {
        /// The newly added receiver.
        receiver: Arc<dyn NativeRtpReceiver>,
        /// Streams the receiver's track belongs to.
        streams: Vec<Arc<dyn NativeMediaStream>>,
    },
    /// A receiver was removed by remote negotiation.
    ReceiverRemoved(Arc<dyn NativeRtpReceiver>),
}

impl NativeCallback {
    /// Callback name for logging.
    pub fn name(&self) -> &'static str {
        match self {
            NativeCallback::SignalingChange(_) => "signaling_change",
            NativeCallback::IceConnectionChange(_) => "ice_connection_change",
            NativeCallback::StandardizedIceConnectionChange(_) => {
                "standardized_ice_connection_change"
            }
            NativeCallback::IceGatheringChange(_) => "ice_gathering_change",
            NativeCallback::NegotiationNeeded => "negotiation_needed",
            NativeCallback::IceCandidate(_) => "ice_candidate",
            NativeCallback::IceCandidatesRemoved(_) => "ice_candidates_removed",
            NativeCallback::DataChannelOpened(_) => "data_channel_opened",
            NativeCallback::ConnectionChange(_) => "connection_change",
            NativeCallback::ReceiverAdded { .. } => "receiver_added",
            NativeCallback::ReceiverRemoved(_) => "receiver_removed",
        }
    }
}

/// Handler invoked for every native delegate callback, in delivery order.
pub type NativeEventHandler = Box<dyn Fn(NativeCallback) + Send + Sync>;

/// A native peer-connection handle.
///
/// Asynchronous operations take a [`Completion`] and must invoke it exactly
/// once, on any thread. Synchronous operations follow the platform SDKs:
/// candidate calls are fire-and-forget, list queries snapshot current native
/// state.
pub trait NativePeerConnection: Send + Sync {
    /// Register the single delegate callback handler.
    ///
    /// Replaces any previously registered handler; callbacks delivered
    /// before registration are lost.
    fn register_handler(&self, handler: NativeEventHandler);

    /// Create an SDP offer under the given constraints.
    fn create_offer(&self, constraints: MediaConstraints, done: Completion<SessionDescription>);

    /// Create an SDP answer under the given constraints.
    fn create_answer(&self, constraints: MediaConstraints, done: Completion<SessionDescription>);

    /// Apply a local session description.
    fn set_local_description(&self, description: SessionDescription, done: Completion<()>);

    /// Apply a remote session description.
    fn set_remote_description(&self, description: SessionDescription, done: Completion<()>);

    /// Currently applied local description.
    fn local_description(&self) -> Option<SessionDescription>;

    /// Currently applied remote description.
    fn remote_description(&self) -> Option<SessionDescription>;

    /// Live signaling state.
    fn signaling_state(&self) -> NativeSignalingState;

    /// Live ICE connection state.
    fn ice_connection_state(&self) -> NativeIceConnectionState;

    /// Live ICE gathering state.
    fn ice_gathering_state(&self) -> NativeIceGatheringState;

    /// Live aggregate connection state.
    fn connection_state(&self) -> NativeConnectionState;

    /// Apply a new ICE configuration; returns whether the native layer
    /// accepted it without restarting ICE.
    fn set_configuration(&self, config: &RtcConfig) -> bool;

    /// Add a remote ICE candidate. Fire-and-forget.
    fn add_ice_candidate(&self, candidate: &IceCandidate);

    /// Remove previously added remote candidates. Fire-and-forget.
    fn remove_ice_candidates(&self, candidates: &[IceCandidate]);

    /// Attach a local track, associating it with the given stream ids.
    fn add_track(
        &self,
        track: Arc<dyn NativeTrack>,
        stream_ids: &[String],
    ) -> Result<Arc<dyn NativeRtpSender>, NativeError>;

    /// Detach the sender with the given id; returns whether it existed.
    fn remove_track(&self, sender_id: &str) -> bool;

    /// Snapshot of current senders.
    fn senders(&self) -> Vec<Arc<dyn NativeRtpSender>>;

    /// Snapshot of current receivers.
    fn receivers(&self) -> Vec<Arc<dyn NativeRtpReceiver>>;

    /// Snapshot of current transceivers.
    fn transceivers(&self) -> Vec<Arc<dyn NativeTransceiver>>;

    /// Open a data channel; `None` when the native layer refuses.
    fn create_data_channel(
        &self,
        label: &str,
        init: &DataChannelInit,
    ) -> Option<Arc<dyn NativeDataChannel>>;

    /// Close the connection. Further calls on the handle are invalid.
    fn close(&self);
}

/// The process-wide native engine: factory for peer connections plus global
/// init/teardown (SSL, field trials, tracing).
pub trait NativeEngine: Send + Sync {
    /// One-time global initialization. Must precede any factory call.
    fn initialize(&self, options: &EngineOptions) -> Result<(), NativeError>;

    /// Construct a peer connection for the given configuration.
    fn create_peer_connection(
        &self,
        config: &RtcConfig,
    ) -> Result<Arc<dyn NativePeerConnection>, NativeError>;

    /// Tear down global engine state.
    fn dispose(&self);
}
