//! Peer connection controller and its track directories

mod connection;
pub(crate) mod directory;

pub use connection::PeerConnection;
