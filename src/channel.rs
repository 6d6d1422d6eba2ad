//! Data channel wrapper

use crate::error::{Error, Result};
use crate::native::NativeDataChannel;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Data channel lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DataChannelState {
    /// Transport negotiation in progress.
    Connecting,
    /// Channel is usable.
    Open,
    /// Close initiated.
    Closing,
    /// Channel is closed.
    Closed,
}

/// Options for creating a data channel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataChannelInit {
    /// Channel id; -1 lets the native layer assign one.
    pub id: i32,
    /// Ordered delivery.
    pub ordered: bool,
    /// Maximum retransmission time in milliseconds; -1 for unlimited.
    pub max_retransmit_time_ms: i32,
    /// Maximum number of retransmissions; -1 for unlimited.
    pub max_retransmits: i32,
    /// Subprotocol name.
    pub protocol: String,
    /// Whether the channel is negotiated out of band.
    pub negotiated: bool,
}

impl Default for DataChannelInit {
    fn default() -> Self {
        Self {
            id: -1,
            ordered: true,
            max_retransmit_time_ms: -1,
            max_retransmits: -1,
            protocol: String::new(),
            negotiated: false,
        }
    }
}

/// Cross-platform wrapper around one native data channel.
#[derive(Clone)]
pub struct DataChannel {
    native: Arc<dyn NativeDataChannel>,
}

impl DataChannel {
    pub(crate) fn new(native: Arc<dyn NativeDataChannel>) -> Self {
        Self { native }
    }

    /// Channel label chosen at creation.
    pub fn label(&self) -> String {
        self.native.label()
    }

    /// Negotiated channel id.
    pub fn id(&self) -> i32 {
        self.native.id()
    }

    /// Live channel state.
    pub fn state(&self) -> DataChannelState {
        self.native.state()
    }

    /// Send a message over the channel.
    pub fn send(&self, data: &[u8], binary: bool) -> Result<()> {
        self.native.send(data, binary).map_err(Error::DataChannel)
    }

    /// Close the channel.
    pub fn close(&self) {
        self.native.close();
    }
}

impl std::fmt::Debug for DataChannel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DataChannel")
            .field("label", &self.label())
            .field("id", &self.id())
            .field("state", &self.state())
            .finish()
    }
}
