//! Engine lifecycle and peer-connection factory
//!
//! One [`WebRtc`] handle per process: it runs the backend's one-time global
//! initialization (SSL, field trials, tracing) up front and tears it down on
//! [`dispose`](WebRtc::dispose). Peer connections are only constructed
//! through this handle, which guarantees the factory never runs before
//! initialization.

use crate::config::RtcConfig;
use crate::emitter::DEFAULT_EVENT_BUFFER_CAPACITY;
use crate::error::{Error, Result};
use crate::native::{EngineOptions, LogSeverity, NativeEngine};
use crate::peer::PeerConnection;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{debug, info};

/// Builder for the process-wide [`WebRtc`] handle.
#[derive(Debug, Clone, Default)]
pub struct WebRtcBuilder {
    options: EngineOptions,
    event_buffer_capacity: Option<usize>,
}

impl WebRtcBuilder {
    /// Start with default engine options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a WebRTC field trial.
    pub fn field_trial(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.options.field_trials.insert(key.into(), value.into());
        self
    }

    /// Override the native logging severity threshold.
    pub fn logging_severity(mut self, severity: LogSeverity) -> Self {
        self.options.logging_severity = Some(severity);
        self
    }

    /// Start the engine's internal tracer during initialization.
    pub fn enable_internal_tracer(mut self) -> Self {
        self.options.enable_internal_tracer = true;
        self
    }

    /// Event buffer capacity for peer connections created by this handle.
    pub fn event_buffer_capacity(mut self, capacity: usize) -> Self {
        self.event_buffer_capacity = Some(capacity);
        self
    }

    /// Run the backend's one-time global initialization and return the
    /// ready handle.
    pub fn initialize(self, engine: Arc<dyn NativeEngine>) -> Result<WebRtc> {
        engine.initialize(&self.options).map_err(Error::EngineInit)?;
        info!(
            field_trials = self.options.field_trials.len(),
            internal_tracer = self.options.enable_internal_tracer,
            "initialized WebRTC engine"
        );
        Ok(WebRtc {
            engine,
            event_buffer_capacity: self
                .event_buffer_capacity
                .unwrap_or(DEFAULT_EVENT_BUFFER_CAPACITY),
            disposed: AtomicBool::new(false),
        })
    }
}

/// Initialized engine handle and peer-connection factory.
///
/// Create one per process via [`WebRtcBuilder`], keep it alive for the
/// lifetime of all peer connections, and call [`dispose`](Self::dispose)
/// when the process is done with WebRTC. Dropping the handle does not
/// dispose the engine.
pub struct WebRtc {
    engine: Arc<dyn NativeEngine>,
    event_buffer_capacity: usize,
    disposed: AtomicBool,
}

impl WebRtc {
    /// Construct a peer connection with the given ICE configuration.
    pub fn create_peer_connection(&self, config: &RtcConfig) -> Result<PeerConnection> {
        if self.disposed.load(Ordering::SeqCst) {
            return Err(Error::EngineDisposed);
        }
        let native = self
            .engine
            .create_peer_connection(config)
            .map_err(Error::PeerConnectionInit)?;
        Ok(PeerConnection::attach(native, self.event_buffer_capacity))
    }

    /// Tear down global engine state. Connections created earlier must be
    /// closed first; further factory calls fail with
    /// [`Error::EngineDisposed`].
    pub fn dispose(&self) {
        if self.disposed.swap(true, Ordering::SeqCst) {
            debug!("engine already disposed");
            return;
        }
        info!("disposing WebRTC engine");
        self.engine.dispose();
    }
}

impl std::fmt::Debug for WebRtc {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WebRtc")
            .field("disposed", &self.disposed.load(Ordering::SeqCst))
            .field("event_buffer_capacity", &self.event_buffer_capacity)
            .finish()
    }
}
