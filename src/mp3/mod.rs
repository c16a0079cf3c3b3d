pub mod frame;
pub mod id3;
pub mod vbr;

pub use frame::{ChannelMode, FrameHeader, Layer, MpegVersion};
pub use id3::Id3v2Header;
pub use vbr::VbrMarker;
