//! Cross-platform peer-connection bridge
//!
//! This crate wraps a platform WebRTC engine behind one uniform surface:
//! native delegate callbacks become an ordered async event stream,
//! callback-style negotiation operations become awaitable methods, and native
//! track handles are deduplicated into stable wrapper identities.
//!
//! # Features
//!
//! - **Ordered event stream**: All delegate callbacks funnel into a single
//!   broadcast stream of [`PeerConnectionEvent`]s, in native delivery order
//! - **Async negotiation**: `create_offer`/`create_answer` and description
//!   application suspend until the native completion fires
//! - **Track identity**: One wrapper per native track id, on both the local
//!   and remote side, so `Arc::ptr_eq` holds across events and queries
//! - **Pluggable backend**: The engine is a trait object; an in-memory
//!   scriptable backend ships in [`native::mock`]
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────┐
//! │  Application                                         │
//! │  ↓ (async operations / event stream)                 │
//! │  PeerConnection                                      │
//! │  ├─ EventEmitter (ordered broadcast)                 │
//! │  ├─ TrackDirectory × 2 (local / remote identities)   │
//! │  └─ Completion bridge (callback → future)            │
//! │     ↓ (NativePeerConnection trait)                   │
//! │  Platform engine (or native::mock)                   │
//! └──────────────────────────────────────────────────────┘
//! ```
//!
//! # Example
//!
//! ```
//! use webrtc_bridge::native::mock::MockEngine;
//! use webrtc_bridge::{OfferAnswerOptions, RtcConfig, SdpType, WebRtcBuilder};
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> webrtc_bridge::Result<()> {
//! let webrtc = WebRtcBuilder::new().initialize(MockEngine::new())?;
//! let pc = webrtc.create_peer_connection(&RtcConfig::default())?;
//!
//! let _events = pc.events();
//! let offer = pc.create_offer(&OfferAnswerOptions::default()).await?;
//! assert_eq!(offer.sdp_type, SdpType::Offer);
//! pc.set_local_description(offer).await?;
//!
//! pc.close();
//! webrtc.dispose();
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

// Public modules
pub mod channel;
pub mod completion;
pub mod config;
pub mod engine;
pub mod error;
pub mod events;
pub mod media;
pub mod native;
pub mod rtp;
pub mod sdp;
pub mod states;

// Internal modules
mod emitter;
mod peer;

// Re-exports for the common path
pub use channel::{DataChannel, DataChannelInit, DataChannelState};
pub use config::{
    BundlePolicy, IceServer, IceTransportPolicy, MediaConstraints, OfferAnswerOptions, RtcConfig,
    RtcpMuxPolicy, TlsCertPolicy,
};
pub use emitter::{PeerConnectionEvents, DEFAULT_EVENT_BUFFER_CAPACITY};
pub use engine::{WebRtc, WebRtcBuilder};
pub use error::{Error, Result};
pub use events::{PeerConnectionEvent, TrackEvent};
pub use media::{MediaKind, MediaStream, MediaStreamTrack};
pub use peer::PeerConnection;
pub use rtp::{RtpReceiver, RtpSender, RtpTransceiver};
pub use sdp::{IceCandidate, SdpType, SessionDescription};
pub use states::{IceConnectionState, IceGatheringState, PeerConnectionState, SignalingState};

/// Crate version string.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
