//! Peer connection end-to-end scenarios
//!
//! Exercises the full public surface against the in-memory scriptable
//! backend: negotiation via the completion bridge, the ordered event stream,
//! track identity across events and queries, and the close/dispose
//! lifecycle.

use std::sync::Arc;
use webrtc_bridge::native::mock::{
    MockEngine, MockPeerConnection, MockReceiver, MockStream, MockTrack, MockTransceiver,
    PendingOp,
};
use webrtc_bridge::native::{
    NativeCallback, NativeConnectionState, NativeError, NativeIceGatheringState,
    NativeMediaStream, NativePeerConnection, NativeRtpReceiver, NativeTrack,
};
use webrtc_bridge::{
    Error, IceCandidate, IceGatheringState, MediaKind, MediaStreamTrack, OfferAnswerOptions,
    PeerConnection, PeerConnectionEvent, PeerConnectionState, RtcConfig, SdpType,
    SessionDescription, SignalingState, WebRtc, WebRtcBuilder,
};

fn setup() -> (WebRtc, PeerConnection, Arc<MockPeerConnection>, Arc<MockEngine>) {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .try_init();
    let engine = MockEngine::new();
    let webrtc = WebRtcBuilder::new()
        .initialize(engine.clone())
        .expect("engine initialization");
    let pc = webrtc
        .create_peer_connection(&RtcConfig::default())
        .expect("peer connection");
    let mock = engine.last_connection().expect("mock connection");
    (webrtc, pc, mock, engine)
}

fn remote_receiver(
    receiver_id: &str,
    track: &Arc<MockTrack>,
    mock: &MockPeerConnection,
) -> Arc<MockReceiver> {
    let receiver = MockReceiver::new(receiver_id, Some(track.clone() as Arc<dyn NativeTrack>));
    let transceiver = MockTransceiver::new(None, Arc::clone(&receiver));
    mock.push_transceiver(transceiver);
    receiver
}

#[tokio::test]
async fn test_create_offer_carries_options_and_returns_description() {
    let (_webrtc, pc, mock, _engine) = setup();
    mock.set_manual_completion(true);

    let options = OfferAnswerOptions {
        offer_to_receive_audio: Some(true),
        ..Default::default()
    };
    // The operation is suspended until the captured completion resolves.
    let mut offer = tokio_test::task::spawn(pc.create_offer(&options));
    tokio_test::assert_pending!(offer.poll());

    let Some(PendingOp::CreateOffer { constraints, done }) = mock.pop_pending() else {
        panic!("expected captured create-offer");
    };
    assert_eq!(
        constraints.mandatory_value("OfferToReceiveAudio"),
        Some("true")
    );
    assert_eq!(constraints.mandatory.len(), 1);

    done.succeed(SessionDescription::new(SdpType::Offer, "v=0\r\nm=audio\r\n"));
    let description = offer.await.expect("offer");
    assert_eq!(description.sdp_type, SdpType::Offer);
    assert_eq!(description.sdp, "v=0\r\nm=audio\r\n");
}

#[tokio::test]
async fn test_offer_answer_description_cycle_updates_signaling_state() {
    let (_webrtc, pc, _mock, _engine) = setup();
    let mut events = pc.events();

    let offer = pc.create_offer(&OfferAnswerOptions::default()).await.expect("offer");
    pc.set_local_description(offer).await.expect("set local");
    assert_eq!(pc.signaling_state(), SignalingState::HaveLocalOffer);
    assert!(pc.local_description().is_some());

    let answer = SessionDescription::new(SdpType::Answer, "v=0\r\n");
    pc.set_remote_description(answer).await.expect("set remote");
    assert_eq!(pc.signaling_state(), SignalingState::Stable);

    // Each description application fired one signaling-change event.
    assert!(matches!(
        events.recv().await,
        Some(PeerConnectionEvent::SignalingStateChange(SignalingState::HaveLocalOffer))
    ));
    assert!(matches!(
        events.recv().await,
        Some(PeerConnectionEvent::SignalingStateChange(SignalingState::Stable))
    ));
}

#[tokio::test]
async fn test_negotiation_failure_carries_native_domain_and_message() {
    let (_webrtc, pc, mock, _engine) = setup();
    mock.fail_next_operation(NativeError::new(
        "RTCPeerConnection",
        "wrong state to create answer",
    ));

    let result = pc.create_answer(&OfferAnswerOptions::default()).await;
    match result {
        Err(Error::Native(native)) => {
            assert_eq!(native.domain, "RTCPeerConnection");
            assert_eq!(native.message, "wrong state to create answer");
        }
        other => panic!("expected native error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_add_and_remove_track_round_trip() {
    let (_webrtc, pc, _mock, _engine) = setup();
    let track = Arc::new(MediaStreamTrack::new(MockTrack::with_id(
        "mic",
        MediaKind::Audio,
    )));

    let sender = pc.add_track(Arc::clone(&track), &[]).expect("add track");
    let senders = pc.get_senders();
    assert_eq!(senders.len(), 1);
    assert!(Arc::ptr_eq(&senders[0].track().expect("sender track"), &track));

    assert!(pc.remove_track(&sender));
    assert!(pc.get_senders().is_empty());

    // The same track can be re-added once removed.
    pc.add_track(track, &[]).expect("re-add track");
    assert_eq!(pc.get_senders().len(), 1);
}

#[tokio::test]
async fn test_duplicate_receiver_announcements_share_one_wrapper() {
    let (_webrtc, pc, mock, _engine) = setup();
    let mut events = pc.events();

    let native_track = MockTrack::with_id("remote-1", MediaKind::Audio);
    let receiver = remote_receiver("recv-1", &native_track, &mock);
    let stream = MockStream::new("stream-1");
    stream.add_track(native_track.clone() as Arc<dyn NativeTrack>);

    // The native layer announces the same receiver twice, as some SDKs do
    // when renegotiation re-touches an existing transceiver.
    for _ in 0..2 {
        mock.fire(NativeCallback::ReceiverAdded {
            receiver: receiver.clone() as Arc<dyn NativeRtpReceiver>,
            streams: vec![stream.clone() as Arc<dyn NativeMediaStream>],
        });
    }

    let Some(PeerConnectionEvent::Track(first)) = events.recv().await else {
        panic!("expected first track event");
    };
    let Some(PeerConnectionEvent::Track(second)) = events.recv().await else {
        panic!("expected second track event");
    };

    let first_track = first.track.expect("first track");
    let second_track = second.track.expect("second track");
    assert!(Arc::ptr_eq(&first_track, &second_track));

    // The query surface resolves the same identity.
    let receivers = pc.get_receivers();
    assert_eq!(receivers.len(), 1);
    assert!(Arc::ptr_eq(
        &receivers[0].track().expect("receiver track"),
        &first_track
    ));
}

#[tokio::test]
async fn test_track_event_exposes_streams_and_transceiver() {
    let (_webrtc, pc, mock, _engine) = setup();
    let mut events = pc.events();

    let audio = MockTrack::with_id("remote-audio", MediaKind::Audio);
    let video = MockTrack::with_id("remote-video", MediaKind::Video);
    let receiver = remote_receiver("recv-1", &audio, &mock);

    let stream = MockStream::new("stream-1");
    stream.add_track(audio.clone() as Arc<dyn NativeTrack>);
    stream.add_track(video.clone() as Arc<dyn NativeTrack>);

    mock.fire(NativeCallback::ReceiverAdded {
        receiver: receiver as Arc<dyn NativeRtpReceiver>,
        streams: vec![stream as Arc<dyn NativeMediaStream>],
    });

    let Some(PeerConnectionEvent::Track(event)) = events.recv().await else {
        panic!("expected track event");
    };
    assert_eq!(event.streams.len(), 1);
    assert_eq!(event.streams[0].id(), "stream-1");
    assert_eq!(event.streams[0].audio_tracks().len(), 1);
    assert_eq!(event.streams[0].video_tracks().len(), 1);
    assert_eq!(event.receiver.id(), "recv-1");
    assert!(event.transceiver.receiver().track().is_some());
}

#[tokio::test]
async fn test_event_stream_preserves_native_delivery_order() {
    let (_webrtc, pc, mock, _engine) = setup();
    let mut events = pc.events();

    mock.fire(NativeCallback::IceGatheringChange(
        NativeIceGatheringState::Gathering,
    ));
    mock.fire(NativeCallback::IceCandidate(IceCandidate::new(
        "0",
        0,
        "candidate:1 1 UDP 2122252543 10.0.0.1 50000 typ host",
    )));
    // An added receiver with no matching transceiver is skipped entirely.
    mock.fire(NativeCallback::ReceiverAdded {
        receiver: MockReceiver::new("recv-orphan", None) as Arc<dyn NativeRtpReceiver>,
        streams: vec![],
    });
    mock.fire(NativeCallback::IceGatheringChange(
        NativeIceGatheringState::Complete,
    ));
    mock.fire(NativeCallback::ConnectionChange(
        NativeConnectionState::Connected,
    ));

    assert!(matches!(
        events.recv().await,
        Some(PeerConnectionEvent::IceGatheringStateChange(IceGatheringState::Gathering))
    ));
    let Some(PeerConnectionEvent::NewIceCandidate(candidate)) = events.recv().await else {
        panic!("expected candidate event");
    };
    assert_eq!(candidate.sdp_mid, "0");
    assert!(matches!(
        events.recv().await,
        Some(PeerConnectionEvent::IceGatheringStateChange(IceGatheringState::Complete))
    ));
    assert!(matches!(
        events.recv().await,
        Some(PeerConnectionEvent::ConnectionStateChange(PeerConnectionState::Connected))
    ));
}

#[tokio::test]
async fn test_close_stops_all_remote_tracks() {
    let (_webrtc, pc, mock, _engine) = setup();
    let mut events = pc.events();

    let audio = MockTrack::with_id("remote-audio", MediaKind::Audio);
    let video = MockTrack::with_id("remote-video", MediaKind::Video);
    let audio_receiver = remote_receiver("recv-audio", &audio, &mock);
    let video_receiver = remote_receiver("recv-video", &video, &mock);

    let stream = MockStream::new("stream-1");
    stream.add_track(audio.clone() as Arc<dyn NativeTrack>);
    stream.add_track(video.clone() as Arc<dyn NativeTrack>);

    mock.fire(NativeCallback::ReceiverAdded {
        receiver: audio_receiver as Arc<dyn NativeRtpReceiver>,
        streams: vec![stream.clone() as Arc<dyn NativeMediaStream>],
    });
    mock.fire(NativeCallback::ReceiverAdded {
        receiver: video_receiver as Arc<dyn NativeRtpReceiver>,
        streams: vec![stream as Arc<dyn NativeMediaStream>],
    });
    let Some(PeerConnectionEvent::Track(first)) = events.recv().await else {
        panic!("expected first track event");
    };
    let Some(PeerConnectionEvent::Track(_)) = events.recv().await else {
        panic!("expected second track event");
    };

    pc.close();

    assert!(mock.is_closed());
    assert_eq!(audio.stop_count(), 1);
    assert_eq!(video.stop_count(), 1);
    assert!(first.track.expect("track").ended());
}

#[tokio::test]
async fn test_receiver_removed_after_close_finds_no_track() {
    let (_webrtc, pc, mock, _engine) = setup();
    let mut events = pc.events();

    let native_track = MockTrack::with_id("remote-1", MediaKind::Audio);
    let receiver = remote_receiver("recv-1", &native_track, &mock);
    let stream = MockStream::new("stream-1");
    stream.add_track(native_track.clone() as Arc<dyn NativeTrack>);
    mock.fire(NativeCallback::ReceiverAdded {
        receiver: receiver.clone() as Arc<dyn NativeRtpReceiver>,
        streams: vec![stream as Arc<dyn NativeMediaStream>],
    });
    assert!(matches!(events.recv().await, Some(PeerConnectionEvent::Track(_))));

    pc.close();
    assert_eq!(native_track.stop_count(), 1);

    // A straggling removal after close still emits, but without a wrapper
    // and without stopping the track a second time.
    mock.fire(NativeCallback::ReceiverRemoved(
        receiver as Arc<dyn NativeRtpReceiver>,
    ));
    let Some(PeerConnectionEvent::RemoveTrack(removed)) = events.recv().await else {
        panic!("expected remove-track event");
    };
    assert!(removed.track().is_none());
    assert_eq!(native_track.stop_count(), 1);
}

#[tokio::test]
async fn test_data_channel_creation_and_remote_open() {
    let (_webrtc, pc, mock, _engine) = setup();
    let mut events = pc.events();

    let channel = pc
        .create_data_channel("control", &Default::default())
        .expect("data channel");
    assert_eq!(channel.label(), "control");
    channel.send(b"hello", false).expect("send");

    // A remotely opened channel arrives as an event.
    let remote = mock
        .create_data_channel("remote", &Default::default())
        .expect("remote channel");
    mock.fire(NativeCallback::DataChannelOpened(remote));
    let Some(PeerConnectionEvent::NewDataChannel(opened)) = events.recv().await else {
        panic!("expected data channel event");
    };
    assert_eq!(opened.label(), "remote");
}

#[tokio::test]
async fn test_configuration_and_candidates_reach_native_layer() {
    let (_webrtc, pc, mock, _engine) = setup();

    let config = RtcConfig {
        ice_candidate_pool_size: 4,
        ..Default::default()
    };
    assert!(pc.set_configuration(&config));
    assert_eq!(
        mock.last_configuration().expect("config").ice_candidate_pool_size,
        4
    );

    let candidate = IceCandidate::new("0", 0, "candidate:1");
    assert!(pc.add_ice_candidate(&candidate));
    assert_eq!(mock.added_candidates(), vec![candidate]);
}

#[tokio::test]
async fn test_disposed_engine_refuses_new_connections() {
    let (webrtc, _pc, _mock, engine) = setup();

    webrtc.dispose();
    assert!(engine.disposed());
    assert!(matches!(
        webrtc.create_peer_connection(&RtcConfig::default()),
        Err(Error::EngineDisposed)
    ));
}
