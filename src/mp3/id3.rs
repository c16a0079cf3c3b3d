//! ID3v2 tag header detection
//!
//! ID3v2 header: "ID3" (3) + version (2) + flags (1) + size (4) = 10 bytes.
//! The size is a sync-safe integer (7 bits per byte) and excludes the
//! 10-byte header itself.

/// Length of the fixed ID3v2 header.
pub const ID3V2_HEADER_LEN: usize = 10;

const ID3V2_MAGIC: &[u8; 3] = b"ID3";

/// Decode a 28-bit sync-safe integer. The high bit of each byte is ignored.
pub fn decode_sync_safe(bytes: [u8; 4]) -> u32 {
    ((bytes[0] as u32 & 0x7F) << 21)
        | ((bytes[1] as u32 & 0x7F) << 14)
        | ((bytes[2] as u32 & 0x7F) << 7)
        | (bytes[3] as u32 & 0x7F)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Id3v2Header {
    pub major_version: u8,
    pub revision: u8,
    pub flags: u8,
    /// Tag body size, header excluded.
    pub size: u32,
}

impl Id3v2Header {
    /// Parse the tag header at the front of `buf`.
    ///
    /// Returns `None` when fewer than 10 bytes are given or the magic does
    /// not match.
    pub fn parse(buf: &[u8]) -> Option<Self> {
        let header = buf.get(..ID3V2_HEADER_LEN)?;
        if &header[..3] != ID3V2_MAGIC {
            return None;
        }

        Some(Id3v2Header {
            major_version: header[3],
            revision: header[4],
            flags: header[5],
            size: decode_sync_safe([header[6], header[7], header[8], header[9]]),
        })
    }

    /// Bytes to skip from the start of the stream: header plus body.
    pub fn total_len(&self) -> usize {
        ID3V2_HEADER_LEN + self.size as usize
    }
}

/// Encode a value as a sync-safe integer. Values above 28 bits are truncated.
#[cfg(test)]
pub(crate) fn encode_sync_safe(value: u32) -> [u8; 4] {
    [
        ((value >> 21) & 0x7F) as u8,
        ((value >> 14) & 0x7F) as u8,
        ((value >> 7) & 0x7F) as u8,
        (value & 0x7F) as u8,
    ]
}
