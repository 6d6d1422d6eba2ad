//! Scriptable in-memory native backend
//!
//! Implements the full native contract without any platform SDK: delegate
//! callbacks are fired on demand, asynchronous operations complete
//! automatically with placeholder SDP (or are held pending for manual
//! resolution), and failures can be scripted. Used by this crate's tests
//! and by downstream consumers exercising signaling logic without devices.

use crate::channel::{DataChannelInit, DataChannelState};
use crate::completion::Completion;
use crate::config::{MediaConstraints, RtcConfig};
use crate::media::MediaKind;
use crate::native::{
    EngineOptions, NativeCallback, NativeConnectionState, NativeDataChannel, NativeEngine,
    NativeError, NativeEventHandler, NativeIceConnectionState, NativeIceGatheringState,
    NativeMediaStream, NativePeerConnection, NativeRtpReceiver, NativeRtpSender,
    NativeSignalingState, NativeTrack, NativeTransceiver,
};
use crate::sdp::{IceCandidate, SdpType, SessionDescription};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicI32, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use uuid::Uuid;

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

fn placeholder_sdp() -> String {
    format!("v=0\r\no=- {} 2 IN IP4 127.0.0.1\r\ns=-\r\nt=0 0\r\n", Uuid::new_v4())
}

/// In-memory engine. Hands out [`MockPeerConnection`]s and records the
/// init/dispose lifecycle.
pub struct MockEngine {
    initialized: AtomicBool,
    disposed: AtomicBool,
    fail_next_connection: Mutex<Option<NativeError>>,
    connections: Mutex<Vec<Arc<MockPeerConnection>>>,
}

impl MockEngine {
    /// Create a fresh engine.
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            initialized: AtomicBool::new(false),
            disposed: AtomicBool::new(false),
            fail_next_connection: Mutex::new(None),
            connections: Mutex::new(Vec::new()),
        })
    }

    /// Whether `initialize` has run.
    pub fn initialized(&self) -> bool {
        self.initialized.load(Ordering::SeqCst)
    }

    /// Whether `dispose` has run.
    pub fn disposed(&self) -> bool {
        self.disposed.load(Ordering::SeqCst)
    }

    /// Make the next factory call fail with the given error.
    pub fn fail_next_connection(&self, error: NativeError) {
        *lock(&self.fail_next_connection) = Some(error);
    }

    /// The most recently constructed connection, for scripting callbacks.
    pub fn last_connection(&self) -> Option<Arc<MockPeerConnection>> {
        lock(&self.connections).last().cloned()
    }
}

impl NativeEngine for MockEngine {
    fn initialize(&self, _options: &EngineOptions) -> Result<(), NativeError> {
        self.initialized.store(true, Ordering::SeqCst);
        Ok(())
    }

    fn create_peer_connection(
        &self,
        _config: &RtcConfig,
    ) -> Result<Arc<dyn NativePeerConnection>, NativeError> {
        if !self.initialized() {
            return Err(NativeError::new("MockEngine", "engine not initialized"));
        }
        if let Some(error) = lock(&self.fail_next_connection).take() {
            return Err(error);
        }
        let connection = MockPeerConnection::new();
        lock(&self.connections).push(Arc::clone(&connection));
        Ok(connection)
    }

    fn dispose(&self) {
        self.disposed.store(true, Ordering::SeqCst);
    }
}

/// A pending asynchronous operation captured in manual-completion mode.
pub enum PendingOp {
    /// A captured create-offer call.
    CreateOffer {
        /// Constraints passed by the controller.
        constraints: MediaConstraints,
        /// The completion to resolve.
        done: Completion<SessionDescription>,
    },
    /// A captured create-answer call.
    CreateAnswer {
        /// Constraints passed by the controller.
        constraints: MediaConstraints,
        /// The completion to resolve.
        done: Completion<SessionDescription>,
    },
    /// A captured set-local-description call.
    SetLocalDescription {
        /// The description being applied.
        description: SessionDescription,
        /// The completion to resolve.
        done: Completion<()>,
    },
    /// A captured set-remote-description call.
    SetRemoteDescription {
        /// The description being applied.
        description: SessionDescription,
        /// The completion to resolve.
        done: Completion<()>,
    },
}

/// In-memory peer-connection handle.
///
/// By default asynchronous operations auto-complete: offers/answers resolve
/// with placeholder SDP, description sets store the description, advance the
/// signaling state per the offer/answer rules, and fire the corresponding
/// delegate callback. With [`set_manual_completion`](Self::set_manual_completion)
/// the operations are queued as [`PendingOp`]s for the test to resolve.
pub struct MockPeerConnection {
    handler: Mutex<Option<NativeEventHandler>>,
    manual_completion: AtomicBool,
    fail_next_operation: Mutex<Option<NativeError>>,
    pending: Mutex<VecDeque<PendingOp>>,
    signaling: Mutex<NativeSignalingState>,
    ice_connection: Mutex<NativeIceConnectionState>,
    ice_gathering: Mutex<NativeIceGatheringState>,
    connection: Mutex<NativeConnectionState>,
    local_description: Mutex<Option<SessionDescription>>,
    remote_description: Mutex<Option<SessionDescription>>,
    senders: Mutex<Vec<Arc<MockSender>>>,
    receivers: Mutex<Vec<Arc<MockReceiver>>>,
    transceivers: Mutex<Vec<Arc<MockTransceiver>>>,
    added_candidates: Mutex<Vec<IceCandidate>>,
    removed_candidates: Mutex<Vec<IceCandidate>>,
    last_configuration: Mutex<Option<RtcConfig>>,
    next_channel_id: AtomicI32,
    closed: AtomicBool,
}

impl MockPeerConnection {
    fn new() -> Arc<Self> {
        Arc::new(Self {
            handler: Mutex::new(None),
            manual_completion: AtomicBool::new(false),
            fail_next_operation: Mutex::new(None),
            pending: Mutex::new(VecDeque::new()),
            signaling: Mutex::new(NativeSignalingState::Stable),
            ice_connection: Mutex::new(NativeIceConnectionState::New),
            ice_gathering: Mutex::new(NativeIceGatheringState::New),
            connection: Mutex::new(NativeConnectionState::New),
            local_description: Mutex::new(None),
            remote_description: Mutex::new(None),
            senders: Mutex::new(Vec::new()),
            receivers: Mutex::new(Vec::new()),
            transceivers: Mutex::new(Vec::new()),
            added_candidates: Mutex::new(Vec::new()),
            removed_candidates: Mutex::new(Vec::new()),
            last_configuration: Mutex::new(None),
            next_channel_id: AtomicI32::new(0),
            closed: AtomicBool::new(false),
        })
    }

    /// Queue asynchronous operations instead of auto-completing them.
    pub fn set_manual_completion(&self, manual: bool) {
        self.manual_completion.store(manual, Ordering::SeqCst);
    }

    /// Make the next asynchronous operation resolve with the given error.
    pub fn fail_next_operation(&self, error: NativeError) {
        *lock(&self.fail_next_operation) = Some(error);
    }

    /// Dequeue the oldest captured operation (manual mode).
    pub fn pop_pending(&self) -> Option<PendingOp> {
        lock(&self.pending).pop_front()
    }

    /// Number of captured operations awaiting resolution.
    pub fn pending_len(&self) -> usize {
        lock(&self.pending).len()
    }

    /// Deliver a delegate callback through the registered handler, exactly
    /// as a platform SDK's signaling thread would.
    pub fn fire(&self, callback: NativeCallback) {
        if let Some(handler) = lock(&self.handler).as_ref() {
            handler(callback);
        }
    }

    /// Script the live signaling state.
    pub fn set_signaling_state(&self, state: NativeSignalingState) {
        *lock(&self.signaling) = state;
    }

    /// Script the live ICE connection state.
    pub fn set_ice_connection_state(&self, state: NativeIceConnectionState) {
        *lock(&self.ice_connection) = state;
    }

    /// Script the live ICE gathering state.
    pub fn set_ice_gathering_state(&self, state: NativeIceGatheringState) {
        *lock(&self.ice_gathering) = state;
    }

    /// Script the live aggregate connection state.
    pub fn set_connection_state(&self, state: NativeConnectionState) {
        *lock(&self.connection) = state;
    }

    /// Add a transceiver to the native snapshot (as remote negotiation
    /// would).
    pub fn push_transceiver(&self, transceiver: Arc<MockTransceiver>) {
        lock(&self.receivers).push(transceiver.receiver_handle());
        lock(&self.transceivers).push(transceiver);
    }

    /// Candidates passed to `add_ice_candidate` so far.
    pub fn added_candidates(&self) -> Vec<IceCandidate> {
        lock(&self.added_candidates).clone()
    }

    /// Candidates passed to `remove_ice_candidates` so far.
    pub fn removed_candidates(&self) -> Vec<IceCandidate> {
        lock(&self.removed_candidates).clone()
    }

    /// Configuration most recently applied via `set_configuration`.
    pub fn last_configuration(&self) -> Option<RtcConfig> {
        lock(&self.last_configuration).clone()
    }

    /// Whether `close` has been called.
    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }

    fn take_failure(&self) -> Option<NativeError> {
        lock(&self.fail_next_operation).take()
    }

    fn apply_description(&self, description: SessionDescription, local: bool) {
        let new_state = match (local, description.sdp_type) {
            (true, SdpType::Offer) => NativeSignalingState::HaveLocalOffer,
            (true, SdpType::Pranswer) => NativeSignalingState::HaveLocalPrAnswer,
            (false, SdpType::Offer) => NativeSignalingState::HaveRemoteOffer,
            (false, SdpType::Pranswer) => NativeSignalingState::HaveRemotePrAnswer,
            (_, SdpType::Answer) | (_, SdpType::Rollback) => NativeSignalingState::Stable,
        };
        if local {
            *lock(&self.local_description) = Some(description);
        } else {
            *lock(&self.remote_description) = Some(description);
        }
        *lock(&self.signaling) = new_state;
        self.fire(NativeCallback::SignalingChange(new_state));
    }
}

impl NativePeerConnection for MockPeerConnection {
    fn register_handler(&self, handler: NativeEventHandler) {
        *lock(&self.handler) = Some(handler);
    }

    fn create_offer(&self, constraints: MediaConstraints, done: Completion<SessionDescription>) {
        if self.manual_completion.load(Ordering::SeqCst) {
            lock(&self.pending).push_back(PendingOp::CreateOffer { constraints, done });
        } else if let Some(error) = self.take_failure() {
            done.fail(error);
        } else {
            done.succeed(SessionDescription::new(SdpType::Offer, placeholder_sdp()));
        }
    }

    fn create_answer(&self, constraints: MediaConstraints, done: Completion<SessionDescription>) {
        if self.manual_completion.load(Ordering::SeqCst) {
            lock(&self.pending).push_back(PendingOp::CreateAnswer { constraints, done });
        } else if let Some(error) = self.take_failure() {
            done.fail(error);
        } else {
            done.succeed(SessionDescription::new(SdpType::Answer, placeholder_sdp()));
        }
    }

    fn set_local_description(&self, description: SessionDescription, done: Completion<()>) {
        if self.manual_completion.load(Ordering::SeqCst) {
            lock(&self.pending).push_back(PendingOp::SetLocalDescription { description, done });
        } else if let Some(error) = self.take_failure() {
            done.fail(error);
        } else {
            self.apply_description(description, true);
            done.succeed(());
        }
    }

    fn set_remote_description(&self, description: SessionDescription, done: Completion<()>) {
        if self.manual_completion.load(Ordering::SeqCst) {
            lock(&self.pending).push_back(PendingOp::SetRemoteDescription { description, done });
        } else if let Some(error) = self.take_failure() {
            done.fail(error);
        } else {
            self.apply_description(description, false);
            done.succeed(());
        }
    }

    fn local_description(&self) -> Option<SessionDescription> {
        lock(&self.local_description).clone()
    }

    fn remote_description(&self) -> Option<SessionDescription> {
        lock(&self.remote_description).clone()
    }

    fn signaling_state(&self) -> NativeSignalingState {
        *lock(&self.signaling)
    }

    fn ice_connection_state(&self) -> NativeIceConnectionState {
        *lock(&self.ice_connection)
    }

    fn ice_gathering_state(&self) -> NativeIceGatheringState {
        *lock(&self.ice_gathering)
    }

    fn connection_state(&self) -> NativeConnectionState {
        *lock(&self.connection)
    }

    fn set_configuration(&self, config: &RtcConfig) -> bool {
        *lock(&self.last_configuration) = Some(config.clone());
        true
    }

    fn add_ice_candidate(&self, candidate: &IceCandidate) {
        lock(&self.added_candidates).push(candidate.clone());
    }

    fn remove_ice_candidates(&self, candidates: &[IceCandidate]) {
        lock(&self.removed_candidates).extend_from_slice(candidates);
    }

    fn add_track(
        &self,
        track: Arc<dyn NativeTrack>,
        _stream_ids: &[String],
    ) -> Result<Arc<dyn NativeRtpSender>, NativeError> {
        let track_id = track.id();
        let mut senders = lock(&self.senders);
        let duplicate = senders
            .iter()
            .any(|s| s.track().map(|t| t.id()) == Some(track_id.clone()));
        if duplicate {
            return Err(NativeError::new(
                "MockPeerConnection",
                format!("track already added: {track_id}"),
            ));
        }
        let sender = MockSender::new(Some(track));
        senders.push(Arc::clone(&sender));
        Ok(sender)
    }

    fn remove_track(&self, sender_id: &str) -> bool {
        let mut senders = lock(&self.senders);
        let before = senders.len();
        senders.retain(|s| s.id() != sender_id);
        senders.len() != before
    }

    fn senders(&self) -> Vec<Arc<dyn NativeRtpSender>> {
        lock(&self.senders)
            .iter()
            .map(|s| Arc::clone(s) as Arc<dyn NativeRtpSender>)
            .collect()
    }

    fn receivers(&self) -> Vec<Arc<dyn NativeRtpReceiver>> {
        lock(&self.receivers)
            .iter()
            .map(|r| Arc::clone(r) as Arc<dyn NativeRtpReceiver>)
            .collect()
    }

    fn transceivers(&self) -> Vec<Arc<dyn NativeTransceiver>> {
        lock(&self.transceivers)
            .iter()
            .map(|t| Arc::clone(t) as Arc<dyn NativeTransceiver>)
            .collect()
    }

    fn create_data_channel(
        &self,
        label: &str,
        init: &DataChannelInit,
    ) -> Option<Arc<dyn NativeDataChannel>> {
        if self.is_closed() {
            return None;
        }
        let id = if init.id >= 0 {
            init.id
        } else {
            self.next_channel_id.fetch_add(1, Ordering::SeqCst)
        };
        Some(Arc::new(MockDataChannel {
            label: label.to_string(),
            id,
            state: Mutex::new(DataChannelState::Open),
            sent: Mutex::new(Vec::new()),
        }))
    }

    fn close(&self) {
        self.closed.store(true, Ordering::SeqCst);
    }
}

/// In-memory media track.
pub struct MockTrack {
    id: String,
    kind: MediaKind,
    enabled: AtomicBool,
    stops: AtomicUsize,
}

impl MockTrack {
    /// A track with a generated id.
    pub fn new(kind: MediaKind) -> Arc<Self> {
        Self::with_id(Uuid::new_v4().to_string(), kind)
    }

    /// A track with a fixed id.
    pub fn with_id(id: impl Into<String>, kind: MediaKind) -> Arc<Self> {
        Arc::new(Self {
            id: id.into(),
            kind,
            enabled: AtomicBool::new(true),
            stops: AtomicUsize::new(0),
        })
    }

    /// Number of times `stop` was invoked.
    pub fn stop_count(&self) -> usize {
        self.stops.load(Ordering::SeqCst)
    }
}

impl NativeTrack for MockTrack {
    fn id(&self) -> String {
        self.id.clone()
    }

    fn kind(&self) -> MediaKind {
        self.kind
    }

    fn enabled(&self) -> bool {
        self.enabled.load(Ordering::SeqCst)
    }

    fn set_enabled(&self, enabled: bool) {
        self.enabled.store(enabled, Ordering::SeqCst);
    }

    fn stop(&self) {
        self.stops.fetch_add(1, Ordering::SeqCst);
    }
}

/// In-memory RTP sender.
pub struct MockSender {
    id: String,
    track: Mutex<Option<Arc<dyn NativeTrack>>>,
}

impl MockSender {
    /// A sender carrying the given track.
    pub fn new(track: Option<Arc<dyn NativeTrack>>) -> Arc<Self> {
        Arc::new(Self {
            id: Uuid::new_v4().to_string(),
            track: Mutex::new(track),
        })
    }
}

impl NativeRtpSender for MockSender {
    fn id(&self) -> String {
        self.id.clone()
    }

    fn track(&self) -> Option<Arc<dyn NativeTrack>> {
        lock(&self.track).clone()
    }
}

/// In-memory RTP receiver.
pub struct MockReceiver {
    id: String,
    track: Mutex<Option<Arc<dyn NativeTrack>>>,
}

impl MockReceiver {
    /// A receiver with the given id and track.
    pub fn new(id: impl Into<String>, track: Option<Arc<dyn NativeTrack>>) -> Arc<Self> {
        Arc::new(Self {
            id: id.into(),
            track: Mutex::new(track),
        })
    }
}

impl NativeRtpReceiver for MockReceiver {
    fn id(&self) -> String {
        self.id.clone()
    }

    fn track(&self) -> Option<Arc<dyn NativeTrack>> {
        lock(&self.track).clone()
    }
}

/// In-memory transceiver pairing one sender and one receiver.
pub struct MockTransceiver {
    mid: Mutex<Option<String>>,
    sender: Arc<MockSender>,
    receiver: Arc<MockReceiver>,
}

impl MockTransceiver {
    /// Pair the given sender (or a detached one) with a receiver.
    pub fn new(sender: Option<Arc<MockSender>>, receiver: Arc<MockReceiver>) -> Arc<Self> {
        Arc::new(Self {
            mid: Mutex::new(None),
            sender: sender.unwrap_or_else(|| MockSender::new(None)),
            receiver,
        })
    }

    /// Script the negotiated mid.
    pub fn set_mid(&self, mid: impl Into<String>) {
        *lock(&self.mid) = Some(mid.into());
    }

    fn receiver_handle(&self) -> Arc<MockReceiver> {
        Arc::clone(&self.receiver)
    }
}

impl NativeTransceiver for MockTransceiver {
    fn mid(&self) -> Option<String> {
        lock(&self.mid).clone()
    }

    fn sender(&self) -> Arc<dyn NativeRtpSender> {
        Arc::clone(&self.sender) as Arc<dyn NativeRtpSender>
    }

    fn receiver(&self) -> Arc<dyn NativeRtpReceiver> {
        Arc::clone(&self.receiver) as Arc<dyn NativeRtpReceiver>
    }
}

/// In-memory media stream.
pub struct MockStream {
    id: String,
    tracks: Mutex<Vec<Arc<dyn NativeTrack>>>,
}

impl MockStream {
    /// An empty stream with the given id.
    pub fn new(id: impl Into<String>) -> Arc<Self> {
        Arc::new(Self {
            id: id.into(),
            tracks: Mutex::new(Vec::new()),
        })
    }

    /// Add a track of either kind to the stream.
    pub fn add_track(&self, track: Arc<dyn NativeTrack>) {
        lock(&self.tracks).push(track);
    }
}

impl NativeMediaStream for MockStream {
    fn id(&self) -> String {
        self.id.clone()
    }

    fn audio_tracks(&self) -> Vec<Arc<dyn NativeTrack>> {
        lock(&self.tracks)
            .iter()
            .filter(|t| t.kind() == MediaKind::Audio)
            .cloned()
            .collect()
    }

    fn video_tracks(&self) -> Vec<Arc<dyn NativeTrack>> {
        lock(&self.tracks)
            .iter()
            .filter(|t| t.kind() == MediaKind::Video)
            .cloned()
            .collect()
    }
}

/// In-memory data channel recording sent messages.
pub struct MockDataChannel {
    label: String,
    id: i32,
    state: Mutex<DataChannelState>,
    sent: Mutex<Vec<(Vec<u8>, bool)>>,
}

impl MockDataChannel {
    /// Messages sent so far, with their binary flag.
    pub fn sent(&self) -> Vec<(Vec<u8>, bool)> {
        lock(&self.sent).clone()
    }
}

impl NativeDataChannel for MockDataChannel {
    fn label(&self) -> String {
        self.label.clone()
    }

    fn id(&self) -> i32 {
        self.id
    }

    fn state(&self) -> DataChannelState {
        *lock(&self.state)
    }

    fn send(&self, data: &[u8], binary: bool) -> Result<(), NativeError> {
        if *lock(&self.state) != DataChannelState::Open {
            return Err(NativeError::new("MockDataChannel", "channel not open"));
        }
        lock(&self.sent).push((data.to_vec(), binary));
        Ok(())
    }

    fn close(&self) {
        *lock(&self.state) = DataChannelState::Closed;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::completion::completion_pair;

    fn new_connection() -> Arc<MockPeerConnection> {
        let engine = MockEngine::new();
        engine.initialize(&EngineOptions::default()).unwrap();
        engine.create_peer_connection(&RtcConfig::default()).unwrap();
        engine.last_connection().unwrap()
    }

    #[tokio::test]
    async fn test_auto_completion_produces_offer() {
        let connection = new_connection();
        let (done, future) = completion_pair();
        connection.create_offer(MediaConstraints::default(), done);
        let offer = future.wait().await.unwrap();
        assert_eq!(offer.sdp_type, SdpType::Offer);
        assert!(offer.sdp.starts_with("v=0"));
    }

    #[tokio::test]
    async fn test_manual_mode_queues_operations() {
        let connection = new_connection();
        connection.set_manual_completion(true);
        let (done, future) = completion_pair();
        connection.create_offer(MediaConstraints::default(), done);
        assert_eq!(connection.pending_len(), 1);

        match connection.pop_pending() {
            Some(PendingOp::CreateOffer { done, .. }) => {
                done.succeed(SessionDescription::new(SdpType::Offer, "v=0..."))
            }
            _ => panic!("expected pending offer"),
        }
        assert_eq!(future.wait().await.unwrap().sdp, "v=0...");
    }

    #[tokio::test]
    async fn test_set_local_description_advances_signaling_state() {
        let connection = new_connection();
        let (done, future) = completion_pair();
        connection
            .set_local_description(SessionDescription::new(SdpType::Offer, "v=0\r\n"), done);
        future.wait().await.unwrap();

        assert_eq!(
            connection.signaling_state(),
            NativeSignalingState::HaveLocalOffer
        );
        assert!(connection.local_description().is_some());
    }

    #[tokio::test]
    async fn test_factory_requires_initialization() {
        let engine = MockEngine::new();
        let result = engine.create_peer_connection(&RtcConfig::default());
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_duplicate_add_track_is_refused() {
        let connection = new_connection();
        let track = MockTrack::with_id("t-1", MediaKind::Audio);
        connection
            .add_track(track.clone() as Arc<dyn NativeTrack>, &[])
            .unwrap();
        let second = connection.add_track(track as Arc<dyn NativeTrack>, &[]);
        assert!(second.is_err());
    }
}
