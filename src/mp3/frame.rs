//! MP3 frame header decoding and frame length arithmetic
//!
//! MP3 frames start with a sync word (11 bits of 1s) followed by header info.
//! Frame header structure (4 bytes, big-endian):
//! AAAAAAAA AAABBCCD EEEEFFGH IIJJKLMM
//!
//! A = sync (11 bits)
//! B = MPEG version (2 bits): 00=2.5, 01=reserved, 10=2, 11=1
//! C = Layer (2 bits): 00=reserved, 01=III, 10=II, 11=I
//! D = Protection bit (CRC)
//! E = Bitrate index (4 bits)
//! F = Sample rate index (2 bits)
//! G = Padding bit
//! H = Private bit
//! I = Channel mode (2 bits)
//! J = Mode extension (2 bits)
//! K = Copyright
//! L = Original
//! M = Emphasis (2 bits)
//!
//! Only MPEG-1 Layer III is accepted, so the tables below cover that
//! combination alone.

use std::fmt;

/// Size of a frame header in bytes.
pub const HEADER_LEN: usize = 4;

/// Sync pattern occupying bits 31-21 of every header.
pub const SYNC_WORD: u16 = 0x7FF;

/// Side information size for single-channel frames.
pub const SIDE_INFO_MONO: usize = 17;

/// Side information size for every other channel mode.
pub const SIDE_INFO_STEREO: usize = 32;

// Bitrate lookup table (bits per second), MPEG-1 Layer III
// Index 0 = free, 15 = bad
const BITRATES_V1_L3: [u32; 16] = [
    0, 32_000, 40_000, 48_000, 56_000, 64_000, 80_000, 96_000, 112_000, 128_000, 160_000,
    192_000, 224_000, 256_000, 320_000, 0,
];

// Sample rate lookup table (Hz), MPEG-1
// Index 3 = reserved
const SAMPLE_RATES_V1: [u32; 4] = [44100, 48000, 32000, 0];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MpegVersion {
    Mpeg1,
    Mpeg2,
    Mpeg25,
    Reserved,
}

impl MpegVersion {
    pub fn from_bits(bits: u8) -> Self {
        match bits & 0x03 {
            0 => MpegVersion::Mpeg25,
            2 => MpegVersion::Mpeg2,
            3 => MpegVersion::Mpeg1,
            _ => MpegVersion::Reserved,
        }
    }
}

impl fmt::Display for MpegVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MpegVersion::Mpeg1 => write!(f, "MPEG-1"),
            MpegVersion::Mpeg2 => write!(f, "MPEG-2"),
            MpegVersion::Mpeg25 => write!(f, "MPEG-2.5"),
            MpegVersion::Reserved => write!(f, "reserved version"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Layer {
    Layer1,
    Layer2,
    Layer3,
    Reserved,
}

impl Layer {
    pub fn from_bits(bits: u8) -> Self {
        match bits & 0x03 {
            1 => Layer::Layer3,
            2 => Layer::Layer2,
            3 => Layer::Layer1,
            _ => Layer::Reserved,
        }
    }
}

impl fmt::Display for Layer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Layer::Layer1 => write!(f, "Layer I"),
            Layer::Layer2 => write!(f, "Layer II"),
            Layer::Layer3 => write!(f, "Layer III"),
            Layer::Reserved => write!(f, "reserved layer"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelMode {
    Stereo,
    JointStereo,
    DualChannel,
    Mono,
}

impl ChannelMode {
    pub fn from_bits(bits: u8) -> Self {
        match bits & 0x03 {
            0 => ChannelMode::Stereo,
            1 => ChannelMode::JointStereo,
            2 => ChannelMode::DualChannel,
            _ => ChannelMode::Mono,
        }
    }

    /// Layer III side information size following the header.
    pub fn side_info_len(self) -> usize {
        match self {
            ChannelMode::Mono => SIDE_INFO_MONO,
            _ => SIDE_INFO_STEREO,
        }
    }
}

/// Raw fields of a 32-bit frame header.
///
/// Decoding never fails: every bit pattern yields a `FrameHeader`, and
/// [`FrameHeader::is_valid`] tells whether it is an MPEG-1 Layer III header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameHeader {
    pub sync: u16,
    pub version: MpegVersion,
    pub layer: Layer,
    pub bitrate_index: u8,
    pub sample_rate_index: u8,
    pub padding: bool,
    pub channel_mode: ChannelMode,
}

impl FrameHeader {
    /// Extract the header fields from a big-endian 32-bit word.
    pub fn decode(word: u32) -> Self {
        FrameHeader {
            sync: ((word >> 21) & 0x7FF) as u16,
            version: MpegVersion::from_bits(((word >> 19) & 0x03) as u8),
            layer: Layer::from_bits(((word >> 17) & 0x03) as u8),
            bitrate_index: ((word >> 12) & 0x0F) as u8,
            sample_rate_index: ((word >> 10) & 0x03) as u8,
            padding: (word >> 9) & 0x01 == 1,
            channel_mode: ChannelMode::from_bits(((word >> 6) & 0x03) as u8),
        }
    }

    pub fn from_bytes(bytes: [u8; HEADER_LEN]) -> Self {
        Self::decode(u32::from_be_bytes(bytes))
    }

    /// Decode the header at the front of `buf`, if four bytes are available.
    pub fn peek(buf: &[u8]) -> Option<Self> {
        let bytes: [u8; HEADER_LEN] = buf.get(..HEADER_LEN)?.try_into().ok()?;
        Some(Self::from_bytes(bytes))
    }

    pub fn sync_ok(&self) -> bool {
        self.sync == SYNC_WORD
    }

    pub fn version_ok(&self) -> bool {
        self.version == MpegVersion::Mpeg1
    }

    pub fn layer_ok(&self) -> bool {
        self.layer == Layer::Layer3
    }

    /// Sync, version and layer all match MPEG-1 Layer III.
    pub fn is_valid(&self) -> bool {
        self.sync_ok() && self.version_ok() && self.layer_ok()
    }

    /// Bitrate in bits per second, `None` for the free and bad indices.
    pub fn bitrate(&self) -> Option<u32> {
        bitrate_for_index(self.bitrate_index)
    }

    /// Sample rate in Hz, `None` for the reserved index.
    pub fn sample_rate(&self) -> Option<u32> {
        sample_rate_for_index(self.sample_rate_index)
    }

    /// Total frame length in bytes, header included.
    pub fn frame_length(&self) -> Option<u32> {
        frame_length(self.bitrate_index, self.sample_rate_index, self.padding)
    }

    /// Offset of the Xing/Info tag relative to this header.
    pub fn vbr_marker_offset(&self) -> usize {
        vbr_marker_offset(self.channel_mode)
    }
}

pub fn bitrate_for_index(index: u8) -> Option<u32> {
    match BITRATES_V1_L3.get(index as usize) {
        Some(&bps) if bps > 0 => Some(bps),
        _ => None,
    }
}

pub fn sample_rate_for_index(index: u8) -> Option<u32> {
    match SAMPLE_RATES_V1.get(index as usize) {
        Some(&hz) if hz > 0 => Some(hz),
        _ => None,
    }
}

/// Frame length for MPEG-1 Layer III: `floor(144 * bitrate / sample_rate) + padding`.
///
/// Returns `None` when either index resolves to a reserved table entry.
pub fn frame_length(bitrate_index: u8, sample_rate_index: u8, padding: bool) -> Option<u32> {
    let bitrate = bitrate_for_index(bitrate_index)?;
    let sample_rate = sample_rate_for_index(sample_rate_index)?;
    Some(144 * bitrate / sample_rate + u32::from(padding))
}

/// Header plus side information: where a Xing/Info tag would start.
pub fn vbr_marker_offset(channel_mode: ChannelMode) -> usize {
    HEADER_LEN + channel_mode.side_info_len()
}
