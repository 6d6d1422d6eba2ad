//! Ordered, multi-subscriber event broadcast
//!
//! Emission happens on the native callback thread and must never block or
//! fail outward: a full buffer overwrites the oldest event, and a subscriber
//! that falls behind misses events rather than stalling emission.

use crate::events::PeerConnectionEvent;
use futures::Stream;
use std::pin::Pin;
use std::task::{Context, Poll};
use tokio::sync::broadcast;
use tokio_stream::wrappers::errors::BroadcastStreamRecvError;
use tokio_stream::wrappers::BroadcastStream;
use tracing::{trace, warn};

/// Default bounded buffer capacity for peer-connection events.
pub const DEFAULT_EVENT_BUFFER_CAPACITY: usize = 64;

/// Bounded broadcast channel for peer-connection events.
pub(crate) struct EventEmitter {
    tx: broadcast::Sender<PeerConnectionEvent>,
}

impl EventEmitter {
    pub(crate) fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity.max(1));
        Self { tx }
    }

    /// Emit an event to all current subscribers. Never blocks; a send with
    /// no live subscribers is not an error.
    pub(crate) fn emit(&self, event: PeerConnectionEvent) {
        trace!(event = event.name(), "emitting peer connection event");
        let _ = self.tx.send(event);
    }

    pub(crate) fn subscribe(&self) -> PeerConnectionEvents {
        PeerConnectionEvents {
            inner: BroadcastStream::new(self.tx.subscribe()),
        }
    }
}

/// Subscriber-facing stream of peer-connection events.
///
/// Delivers every event emitted after subscription, in emission order. A
/// subscriber that falls behind the bounded buffer skips the missed events
/// and resumes with the next available one.
pub struct PeerConnectionEvents {
    inner: BroadcastStream<PeerConnectionEvent>,
}

impl PeerConnectionEvents {
    /// Receive the next event; `None` once the peer connection is dropped.
    pub async fn recv(&mut self) -> Option<PeerConnectionEvent> {
        use futures::StreamExt;
        self.next().await
    }
}

impl Stream for PeerConnectionEvents {
    type Item = PeerConnectionEvent;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        loop {
            match Pin::new(&mut self.inner).poll_next(cx) {
                Poll::Ready(Some(Ok(event))) => return Poll::Ready(Some(event)),
                Poll::Ready(Some(Err(BroadcastStreamRecvError::Lagged(missed)))) => {
                    warn!(missed, "event subscriber lagged; skipping missed events");
                    continue;
                }
                Poll::Ready(None) => return Poll::Ready(None),
                Poll::Pending => return Poll::Pending,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::states::SignalingState;

    fn signaling(state: SignalingState) -> PeerConnectionEvent {
        PeerConnectionEvent::SignalingStateChange(state)
    }

    #[tokio::test]
    async fn test_events_delivered_in_emission_order() {
        let emitter = EventEmitter::new(8);
        let mut events = emitter.subscribe();

        emitter.emit(signaling(SignalingState::HaveLocalOffer));
        emitter.emit(PeerConnectionEvent::NegotiationNeeded);
        emitter.emit(signaling(SignalingState::Stable));

        assert!(matches!(
            events.recv().await,
            Some(PeerConnectionEvent::SignalingStateChange(SignalingState::HaveLocalOffer))
        ));
        assert!(matches!(
            events.recv().await,
            Some(PeerConnectionEvent::NegotiationNeeded)
        ));
        assert!(matches!(
            events.recv().await,
            Some(PeerConnectionEvent::SignalingStateChange(SignalingState::Stable))
        ));
    }

    #[tokio::test]
    async fn test_subscriber_only_sees_events_after_subscription() {
        let emitter = EventEmitter::new(8);
        emitter.emit(PeerConnectionEvent::NegotiationNeeded);

        let mut events = emitter.subscribe();
        emitter.emit(signaling(SignalingState::Closed));

        assert!(matches!(
            events.recv().await,
            Some(PeerConnectionEvent::SignalingStateChange(SignalingState::Closed))
        ));
    }

    #[tokio::test]
    async fn test_lagged_subscriber_skips_and_resumes() {
        let emitter = EventEmitter::new(2);
        let mut events = emitter.subscribe();

        for _ in 0..5 {
            emitter.emit(PeerConnectionEvent::NegotiationNeeded);
        }
        emitter.emit(signaling(SignalingState::Closed));

        // Buffer holds the last two events; the stream skips the lag gap.
        assert!(matches!(
            events.recv().await,
            Some(PeerConnectionEvent::NegotiationNeeded)
        ));
        assert!(matches!(
            events.recv().await,
            Some(PeerConnectionEvent::SignalingStateChange(SignalingState::Closed))
        ));
    }

    #[tokio::test]
    async fn test_emit_without_subscribers_is_not_an_error() {
        let emitter = EventEmitter::new(4);
        emitter.emit(PeerConnectionEvent::NegotiationNeeded);
    }

    #[tokio::test]
    async fn test_multiple_subscribers_each_get_every_event() {
        let emitter = EventEmitter::new(8);
        let mut a = emitter.subscribe();
        let mut b = emitter.subscribe();

        emitter.emit(signaling(SignalingState::HaveRemoteOffer));

        assert!(matches!(
            a.recv().await,
            Some(PeerConnectionEvent::SignalingStateChange(SignalingState::HaveRemoteOffer))
        ));
        assert!(matches!(
            b.recv().await,
            Some(PeerConnectionEvent::SignalingStateChange(SignalingState::HaveRemoteOffer))
        ));
    }
}
