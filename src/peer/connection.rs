//! Peer connection controller
//!
//! Owns one native peer-connection handle, the two track identity
//! directories, and the event emitter. All native delegate callbacks arrive
//! through a single handler and funnel into one translate-and-emit path;
//! negotiation operations go out through the async completion bridge.

use crate::channel::{DataChannel, DataChannelInit};
use crate::completion;
use crate::emitter::EventEmitter;
use crate::error::{Error, Result};
use crate::events::{PeerConnectionEvent, TrackEvent};
use crate::media::{MediaStream, MediaStreamTrack};
use crate::native::{NativeCallback, NativePeerConnection};
use crate::rtp::{RtpReceiver, RtpSender, RtpTransceiver};
use crate::sdp::{IceCandidate, SessionDescription};
use crate::states::{IceConnectionState, IceGatheringState, PeerConnectionState, SignalingState};
use crate::config::{OfferAnswerOptions, RtcConfig};
use crate::PeerConnectionEvents;
use crate::peer::directory::TrackDirectory;
use std::sync::Arc;
use tracing::{debug, trace, warn};
use uuid::Uuid;

/// Cross-platform peer connection.
///
/// Wraps exactly one native peer-connection handle for the lifetime of a
/// call session. Negotiation operations are suspension points resumed by
/// native completion callbacks; state accessors read live native state and
/// are not synchronized against concurrent callback delivery.
pub struct PeerConnection {
    inner: Arc<Inner>,
}

struct Inner {
    id: String,
    native: Arc<dyn NativePeerConnection>,
    local_tracks: TrackDirectory,
    remote_tracks: TrackDirectory,
    events: EventEmitter,
}

impl PeerConnection {
    /// Wrap a freshly constructed native handle and register the delegate
    /// callback handler against it.
    pub(crate) fn attach(native: Arc<dyn NativePeerConnection>, event_capacity: usize) -> Self {
        let inner = Arc::new(Inner {
            id: Uuid::new_v4().to_string(),
            native: Arc::clone(&native),
            local_tracks: TrackDirectory::new(),
            remote_tracks: TrackDirectory::new(),
            events: EventEmitter::new(event_capacity),
        });

        debug!(connection_id = %inner.id, "created peer connection");

        // The native handle holds the handler for its own lifetime; a weak
        // reference avoids the resulting cycle.
        let weak = Arc::downgrade(&inner);
        native.register_handler(Box::new(move |callback| {
            if let Some(inner) = weak.upgrade() {
                inner.handle_native_callback(callback);
            }
        }));

        Self { inner }
    }

    /// Unique identifier of this controller instance.
    pub fn id(&self) -> &str {
        &self.inner.id
    }

    /// Subscribe to the ordered event stream. Each subscriber receives
    /// every event emitted after subscription.
    pub fn events(&self) -> PeerConnectionEvents {
        self.inner.events.subscribe()
    }

    /// Currently applied local description, read from the native handle.
    pub fn local_description(&self) -> Option<SessionDescription> {
        self.inner.native.local_description()
    }

    /// Currently applied remote description, read from the native handle.
    pub fn remote_description(&self) -> Option<SessionDescription> {
        self.inner.native.remote_description()
    }

    /// Live signaling state.
    pub fn signaling_state(&self) -> SignalingState {
        self.inner.native.signaling_state().into()
    }

    /// Live ICE connection state.
    pub fn ice_connection_state(&self) -> IceConnectionState {
        self.inner.native.ice_connection_state().into()
    }

    /// Live ICE gathering state.
    pub fn ice_gathering_state(&self) -> IceGatheringState {
        self.inner.native.ice_gathering_state().into()
    }

    /// Live aggregate connection state.
    pub fn connection_state(&self) -> PeerConnectionState {
        self.inner.native.connection_state().into()
    }

    /// Create an SDP offer.
    ///
    /// Suspends until the native completion callback fires. Fails with the
    /// native error when the native layer refuses (e.g., wrong signaling
    /// state).
    pub async fn create_offer(&self, options: &OfferAnswerOptions) -> Result<SessionDescription> {
        let constraints = options.to_media_constraints();
        let native = Arc::clone(&self.inner.native);
        completion::suspend(move |done| native.create_offer(constraints, done)).await
    }

    /// Create an SDP answer. Symmetric to [`create_offer`](Self::create_offer).
    pub async fn create_answer(&self, options: &OfferAnswerOptions) -> Result<SessionDescription> {
        let constraints = options.to_media_constraints();
        let native = Arc::clone(&self.inner.native);
        completion::suspend(move |done| native.create_answer(constraints, done)).await
    }

    /// Apply a local session description.
    pub async fn set_local_description(&self, description: SessionDescription) -> Result<()> {
        let native = Arc::clone(&self.inner.native);
        completion::suspend(move |done| native.set_local_description(description, done)).await
    }

    /// Apply a remote session description.
    pub async fn set_remote_description(&self, description: SessionDescription) -> Result<()> {
        let native = Arc::clone(&self.inner.native);
        completion::suspend(move |done| native.set_remote_description(description, done)).await
    }

    /// Apply a new ICE configuration; returns whether the native layer
    /// accepted it without restarting ICE.
    pub fn set_configuration(&self, config: &RtcConfig) -> bool {
        self.inner.native.set_configuration(config)
    }

    /// Add a remote ICE candidate.
    ///
    /// Always reports success; the underlying native call is
    /// fire-and-forget, and failures surface only through later
    /// ICE-connection-state events.
    pub fn add_ice_candidate(&self, candidate: &IceCandidate) -> bool {
        self.inner.native.add_ice_candidate(candidate);
        true
    }

    /// Remove previously added remote candidates. Fire-and-forget, like
    /// [`add_ice_candidate`](Self::add_ice_candidate).
    pub fn remove_ice_candidates(&self, candidates: &[IceCandidate]) -> bool {
        self.inner.native.remove_ice_candidates(candidates);
        true
    }

    /// Attach a local track, associating it with the given streams.
    ///
    /// Registers the track in the local directory and returns the wrapped
    /// sender. Fails when the native layer refuses the track (e.g., already
    /// added).
    pub fn add_track(
        &self,
        track: Arc<MediaStreamTrack>,
        streams: &[MediaStream],
    ) -> Result<RtpSender> {
        let stream_ids: Vec<String> = streams.iter().map(|s| s.id().to_string()).collect();
        let sender = self
            .inner
            .native
            .add_track(track.native(), &stream_ids)
            .map_err(Error::AddTrack)?;
        self.inner.local_tracks.insert(track.id(), Arc::clone(&track));
        Ok(RtpSender::new(sender, Some(track)))
    }

    /// Detach the given sender's track.
    ///
    /// Removes the corresponding local directory entry (tolerant of a
    /// sender without a resolved track), then invokes the native removal.
    pub fn remove_track(&self, sender: &RtpSender) -> bool {
        if let Some(track) = sender.track() {
            self.inner.local_tracks.remove(&track.id());
        }
        self.inner.native.remove_track(&sender.id())
    }

    /// Snapshot of current senders, re-derived from native state on every
    /// call with tracks resolved through the local directory.
    pub fn get_senders(&self) -> Vec<RtpSender> {
        self.inner
            .native
            .senders()
            .into_iter()
            .map(|sender| {
                let track = sender
                    .track()
                    .and_then(|t| self.inner.local_tracks.lookup(&t.id()));
                RtpSender::new(sender, track)
            })
            .collect()
    }

    /// Snapshot of current receivers with tracks resolved through the
    /// remote directory.
    pub fn get_receivers(&self) -> Vec<RtpReceiver> {
        self.inner
            .native
            .receivers()
            .into_iter()
            .map(|receiver| {
                let track = receiver
                    .track()
                    .and_then(|t| self.inner.remote_tracks.lookup(&t.id()));
                RtpReceiver::new(receiver, track)
            })
            .collect()
    }

    /// Snapshot of current transceivers with both halves' tracks resolved.
    pub fn get_transceivers(&self) -> Vec<RtpTransceiver> {
        self.inner
            .native
            .transceivers()
            .into_iter()
            .map(|transceiver| {
                let sender_track = transceiver
                    .sender()
                    .track()
                    .and_then(|t| self.inner.local_tracks.lookup(&t.id()));
                let receiver_track = transceiver
                    .receiver()
                    .track()
                    .and_then(|t| self.inner.remote_tracks.lookup(&t.id()));
                RtpTransceiver::new(transceiver, sender_track, receiver_track)
            })
            .collect()
    }

    /// Open a data channel; `None` when the native layer refuses.
    pub fn create_data_channel(&self, label: &str, init: &DataChannelInit) -> Option<DataChannel> {
        self.inner
            .native
            .create_data_channel(label, init)
            .map(DataChannel::new)
    }

    /// Close the connection.
    ///
    /// Stops every track held in the remote directory, clears it, then
    /// closes the native handle. Calling any operation after `close`,
    /// including a second `close`, is a caller error with undefined native
    /// behavior.
    pub fn close(&self) {
        debug!(connection_id = %self.inner.id, "closing peer connection");
        for track in self.inner.remote_tracks.drain() {
            track.stop();
        }
        self.inner.native.close();
    }
}

impl Inner {
    /// The single translate-and-emit path for all native delegate
    /// callbacks, invoked in native delivery order.
    fn handle_native_callback(&self, callback: NativeCallback) {
        trace!(connection_id = %self.id, callback = callback.name(), "native callback");
        match callback {
            NativeCallback::SignalingChange(state) => {
                self.events
                    .emit(PeerConnectionEvent::SignalingStateChange(state.into()));
            }
            NativeCallback::IceConnectionChange(state) => {
                self.events
                    .emit(PeerConnectionEvent::IceConnectionStateChange(state.into()));
            }
            NativeCallback::StandardizedIceConnectionChange(state) => {
                self.events
                    .emit(PeerConnectionEvent::StandardizedIceConnectionChange(
                        state.into(),
                    ));
            }
            NativeCallback::IceGatheringChange(state) => {
                self.events
                    .emit(PeerConnectionEvent::IceGatheringStateChange(state.into()));
            }
            NativeCallback::NegotiationNeeded => {
                self.events.emit(PeerConnectionEvent::NegotiationNeeded);
            }
            NativeCallback::IceCandidate(candidate) => {
                self.events
                    .emit(PeerConnectionEvent::NewIceCandidate(candidate));
            }
            NativeCallback::IceCandidatesRemoved(candidates) => {
                self.events
                    .emit(PeerConnectionEvent::RemovedIceCandidates(candidates));
            }
            NativeCallback::DataChannelOpened(channel) => {
                self.events
                    .emit(PeerConnectionEvent::NewDataChannel(DataChannel::new(
                        channel,
                    )));
            }
            NativeCallback::ConnectionChange(state) => {
                self.events
                    .emit(PeerConnectionEvent::ConnectionStateChange(state.into()));
            }
            NativeCallback::ReceiverAdded { receiver, streams } => {
                self.handle_receiver_added(receiver, streams);
            }
            NativeCallback::ReceiverRemoved(receiver) => {
                let track = receiver
                    .track()
                    .and_then(|t| self.remote_tracks.remove(&t.id()));
                // Emission precedes the stop so subscribers observe the
                // track while it is still nominally valid.
                self.events.emit(PeerConnectionEvent::RemoveTrack(
                    RtpReceiver::new(receiver, track.clone()),
                ));
                if let Some(track) = track {
                    track.stop();
                }
            }
        }
    }

    fn handle_receiver_added(
        &self,
        receiver: Arc<dyn crate::native::NativeRtpReceiver>,
        streams: Vec<Arc<dyn crate::native::NativeMediaStream>>,
    ) {
        let receiver_id = receiver.id();
        let Some(transceiver) = self
            .native
            .transceivers()
            .into_iter()
            .find(|t| t.receiver().id() == receiver_id)
        else {
            // Suspected native-layer race; skipped rather than fatal.
            warn!(
                connection_id = %self.id,
                receiver_id = %receiver_id,
                "no transceiver matches added receiver, dropping track event"
            );
            return;
        };

        let audio_tracks: Vec<Arc<MediaStreamTrack>> = streams
            .iter()
            .flat_map(|s| s.audio_tracks())
            .map(|t| {
                self.remote_tracks
                    .get_or_create(&t.id(), || Arc::new(MediaStreamTrack::new(t)))
            })
            .collect();
        let video_tracks: Vec<Arc<MediaStreamTrack>> = streams
            .iter()
            .flat_map(|s| s.video_tracks())
            .map(|t| {
                self.remote_tracks
                    .get_or_create(&t.id(), || Arc::new(MediaStreamTrack::new(t)))
            })
            .collect();

        let common_streams: Vec<MediaStream> = streams
            .iter()
            .map(|native_stream| {
                let mut stream = MediaStream::new(native_stream.id());
                for track in audio_tracks.iter().chain(video_tracks.iter()) {
                    stream.add_track(Arc::clone(track));
                }
                stream
            })
            .collect();

        let receiver_track = receiver
            .track()
            .and_then(|t| self.remote_tracks.lookup(&t.id()));
        let sender_track = transceiver
            .sender()
            .track()
            .and_then(|t| self.local_tracks.lookup(&t.id()));

        self.events.emit(PeerConnectionEvent::Track(TrackEvent {
            receiver: RtpReceiver::new(receiver, receiver_track.clone()),
            streams: common_streams,
            track: receiver_track.clone(),
            transceiver: RtpTransceiver::new(transceiver, sender_track, receiver_track),
        }));
    }
}

impl std::fmt::Debug for PeerConnection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PeerConnection")
            .field("id", &self.inner.id)
            .field("signaling_state", &self.signaling_state())
            .finish()
    }
}
