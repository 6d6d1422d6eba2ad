//! Async completion bridge
//!
//! Converts the native "pass a callback, receive exactly one invocation"
//! contract into a single awaitable suspension point. The resolution slot is
//! write-once: if a misbehaving native layer invokes the callback twice, only
//! the first invocation resolves the awaiting call and the rest are dropped.
//! Abandoning the awaiting future does not cancel the native operation; a
//! late resolution lands in a closed channel and is discarded.

use crate::error::{Error, Result};
use crate::native::NativeError;
use std::sync::{Arc, Mutex, PoisonError};
use tokio::sync::oneshot;
use tracing::debug;

type Slot<T> = Mutex<Option<oneshot::Sender<std::result::Result<T, NativeError>>>>;

/// Completion callback handed to a native single-shot operation.
///
/// Cloneable so it can cross FFI trampoline boundaries that require `Fn`
/// semantics; all clones share the same write-once slot.
pub struct Completion<T> {
    slot: Arc<Slot<T>>,
}

impl<T> Clone for Completion<T> {
    fn clone(&self) -> Self {
        Self {
            slot: Arc::clone(&self.slot),
        }
    }
}

impl<T> Completion<T> {
    /// Resolve the awaiting call with a success value.
    pub fn succeed(&self, value: T) {
        self.resolve(Ok(value));
    }

    /// Resolve the awaiting call with a native failure.
    pub fn fail(&self, error: NativeError) {
        self.resolve(Err(error));
    }

    /// Resolve the awaiting call. Only the first resolution is observed;
    /// later calls are silently ignored, as is a resolution arriving after
    /// the awaiting future was dropped.
    pub fn resolve(&self, result: std::result::Result<T, NativeError>) {
        let sender = self
            .slot
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        match sender {
            Some(tx) => {
                // Err means the awaiting future is gone; the native result
                // is discarded without error.
                let _ = tx.send(result);
            }
            None => debug!("ignoring duplicate native completion"),
        }
    }
}

/// The awaiting half of a completion pair.
pub struct CompletionFuture<T> {
    rx: oneshot::Receiver<std::result::Result<T, NativeError>>,
}

impl<T> CompletionFuture<T> {
    /// Suspend until the native callback resolves the completion.
    ///
    /// There is no implicit timeout; callers needing one layer it on top.
    pub async fn wait(self) -> Result<T> {
        match self.rx.await {
            Ok(Ok(value)) => Ok(value),
            Ok(Err(native)) => Err(Error::Native(native)),
            Err(_) => Err(Error::CompletionDropped),
        }
    }
}

/// Create a linked callback/future pair.
pub fn completion_pair<T>() -> (Completion<T>, CompletionFuture<T>) {
    let (tx, rx) = oneshot::channel();
    (
        Completion {
            slot: Arc::new(Mutex::new(Some(tx))),
        },
        CompletionFuture { rx },
    )
}

/// Run a callback-style native operation to completion.
///
/// `start` receives the completion callback and must hand it to the native
/// layer before returning.
pub async fn suspend<T, F>(start: F) -> Result<T>
where
    F: FnOnce(Completion<T>),
{
    let (done, future) = completion_pair();
    start(done);
    future.wait().await
}
