//! Xing/Info marker frame detection
//!
//! VBR encoders (and LAME in CBR mode) put a pseudo-frame in front of the
//! audio. Its header is an ordinary Layer III header; the tag sits right
//! after the side information, where audio data would otherwise begin:
//! "Xing" for VBR streams, "Info" for CBR streams.
//!
//! The frame is not audio and is never counted. The fields after the tag
//! (frame count, byte count, TOC, quality) are not read.

use std::fmt;

/// Length of the tag itself.
pub const VBR_TAG_LEN: usize = 4;

/// Bytes buffered past the marker offset before a decision is made.
pub const VBR_WINDOW_LEN: usize = 12;

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
pub enum VbrMarker {
    Xing,
    Info,
}

impl VbrMarker {
    /// Identify the tag at the front of `tag`.
    pub fn detect(tag: &[u8]) -> Option<Self> {
        match tag.get(..VBR_TAG_LEN)? {
            b"Xing" => Some(VbrMarker::Xing),
            b"Info" => Some(VbrMarker::Info),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            VbrMarker::Xing => "Xing",
            VbrMarker::Info => "Info",
        }
    }
}

impl fmt::Display for VbrMarker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detect_markers() {
        assert_eq!(VbrMarker::detect(b"Xing\x00\x00\x00\x0f"), Some(VbrMarker::Xing));
        assert_eq!(VbrMarker::detect(b"Info"), Some(VbrMarker::Info));
    }

    #[test]
    fn test_detect_rejects_other_tags() {
        assert_eq!(VbrMarker::detect(b"VBRI"), None);
        assert_eq!(VbrMarker::detect(b"xing"), None);
        assert_eq!(VbrMarker::detect(b"Xin"), None);
        assert_eq!(VbrMarker::detect(&[0u8; 12]), None);
    }
}
