//! Synthetic MPEG-1 Layer III stream builder shared by the integration tests.
#![allow(dead_code)]

/// Bitrates in kbps for MPEG-1 Layer III, index 0 (free) and 15 (bad) excluded.
const BITRATES_KBPS: [u32; 16] = [
    0, 32, 40, 48, 56, 64, 80, 96, 112, 128, 160, 192, 224, 256, 320, 0,
];
const SAMPLE_RATES: [u32; 3] = [44_100, 48_000, 32_000];

/// Byte used to fill frame bodies; never part of a sync word.
const FILL: u8 = 0x55;

#[derive(Debug, Clone, Copy)]
pub struct FrameParams {
    pub bitrate_index: u8,
    pub sample_rate_index: u8,
    pub padding: bool,
    pub mono: bool,
}

impl Default for FrameParams {
    /// 128 kbps, 44.1 kHz, stereo: 417 bytes per frame.
    fn default() -> Self {
        FrameParams {
            bitrate_index: 9,
            sample_rate_index: 0,
            padding: false,
            mono: false,
        }
    }
}

impl FrameParams {
    pub fn header(&self) -> [u8; 4] {
        [
            0xFF,
            0xFB,
            (self.bitrate_index << 4) | (self.sample_rate_index << 2) | ((self.padding as u8) << 1),
            if self.mono { 0xC0 } else { 0x00 },
        ]
    }

    pub fn length(&self) -> usize {
        let bitrate = BITRATES_KBPS[self.bitrate_index as usize] * 1000;
        let sample_rate = SAMPLE_RATES[self.sample_rate_index as usize];
        (144 * bitrate / sample_rate) as usize + self.padding as usize
    }

    pub fn frame(&self) -> Vec<u8> {
        let mut frame = self.header().to_vec();
        frame.resize(self.length(), FILL);
        frame
    }

    /// A frame carrying a `Xing`/`Info` tag after the side information.
    pub fn marker_frame(&self, tag: &[u8; 4]) -> Vec<u8> {
        let offset = 4 + if self.mono { 17 } else { 32 };
        let mut frame = self.header().to_vec();
        frame.resize(offset, 0);
        frame.extend_from_slice(tag);
        // flags: frames + bytes present
        frame.extend_from_slice(&[0, 0, 0, 3]);
        frame.resize(self.length(), 0);
        frame
    }
}

#[derive(Debug, Default)]
pub struct StreamBuilder {
    data: Vec<u8>,
}

impl StreamBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// ID3v2.3 tag with a `body_len`-byte body.
    pub fn id3(mut self, body_len: usize) -> Self {
        let size = body_len as u32;
        self.data.extend_from_slice(b"ID3\x03\x00\x00");
        self.data.extend_from_slice(&[
            ((size >> 21) & 0x7F) as u8,
            ((size >> 14) & 0x7F) as u8,
            ((size >> 7) & 0x7F) as u8,
            (size & 0x7F) as u8,
        ]);
        self.data.extend(std::iter::repeat(0u8).take(body_len));
        self
    }

    pub fn marker(mut self, spec: FrameParams, tag: &[u8; 4]) -> Self {
        self.data.extend(spec.marker_frame(tag));
        self
    }

    pub fn frames(mut self, spec: FrameParams, count: usize) -> Self {
        self.data.extend(spec.frame().repeat(count));
        self
    }

    pub fn bytes(mut self, raw: &[u8]) -> Self {
        self.data.extend_from_slice(raw);
        self
    }

    pub fn build(self) -> Vec<u8> {
        self.data
    }
}

/// `count` default frames with no tag or marker.
pub fn plain_stream(count: usize) -> Vec<u8> {
    StreamBuilder::new().frames(FrameParams::default(), count).build()
}
