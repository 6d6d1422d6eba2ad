//! Error types for the bridge

use crate::native::NativeError;
use thiserror::Error;

/// Error type for all bridge operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// Global engine initialization failed.
    #[error("engine initialization failed: {0}")]
    EngineInit(NativeError),

    /// The engine registry was already disposed.
    #[error("engine already disposed")]
    EngineDisposed,

    /// The native factory returned no usable peer-connection handle.
    #[error("failed to create peer connection: {0}")]
    PeerConnectionInit(NativeError),

    /// A native operation reported a failure through its completion
    /// callback. Carries the native error's domain and message so callers
    /// can distinguish negotiation failures (wrong signaling state, SDP
    /// parse errors) from generic ones.
    #[error("native operation failed: {0}")]
    Native(#[from] NativeError),

    /// The native layer refused to add a track.
    #[error("failed to add track: {0}")]
    AddTrack(NativeError),

    /// A data channel send was rejected by the native layer.
    #[error("data channel send failed: {0}")]
    DataChannel(NativeError),

    /// A native completion callback was destroyed without ever being
    /// invoked. Violates the native exactly-once contract; never produced
    /// by a conforming backend.
    #[error("native completion dropped without resolving")]
    CompletionDropped,
}

/// Result type for bridge operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_native_error_display_keeps_domain_and_message() {
        let err = Error::Native(NativeError::new("RTCErrorDomain", "wrong signaling state"));
        let text = err.to_string();
        assert!(text.contains("RTCErrorDomain"));
        assert!(text.contains("wrong signaling state"));
    }

    #[test]
    fn test_native_error_converts_into_error() {
        let err: Error = NativeError::new("d", "m").into();
        assert_eq!(err, Error::Native(NativeError::new("d", "m")));
    }
}
