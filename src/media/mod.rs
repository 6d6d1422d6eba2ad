//! Media track and stream wrappers

mod stream;
mod track;

pub use stream::MediaStream;
pub use track::{MediaKind, MediaStreamTrack};
