//! Streaming MPEG-1 Layer III frame scanner
//!
//! The scanner receives the document in arbitrary chunks and walks it in
//! four phases:
//!
//! 1. skip a leading ID3v2 tag, if any
//! 2. validate the first frame header (a failure here rejects the document)
//! 3. skip a Xing/Info marker frame, if the first frame is one
//! 4. count frames until the data ends or stops looking like audio
//!
//! Bytes are only consumed once the whole unit (tag, marker frame or audio
//! frame) is buffered, so the result never depends on where chunks are split.

pub mod source;

use serde::Serialize;
use tracing::{debug, trace, warn};

use crate::error::{FormatError, ScanResult};
use crate::mp3::frame::FrameHeader;
use crate::mp3::id3::{Id3v2Header, ID3V2_HEADER_LEN};
use crate::mp3::vbr::{VbrMarker, VBR_WINDOW_LEN};

pub use source::{ChunkSource, ReaderSource, SliceSource, DEFAULT_CHUNK_SIZE};

/// Spare buffer capacity kept across chunks.
const RETAINED_CAPACITY: usize = 64 * 1024;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanPhase {
    AwaitingId3,
    AwaitingFirstFrameHeader,
    /// The first header is valid; waiting for enough bytes to look for a marker.
    AwaitingVbrDecision {
        first: FrameHeader,
    },
    ScanningFrames,
    Done(ScanEnd),
    Failed,
}

/// Why frame counting stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ScanEnd {
    /// The source ran out of data.
    EndOfStream,
    /// A header after the first frame failed validation.
    TrailingData,
    /// A valid header used a reserved bitrate or sample-rate index.
    ReservedField,
}

/// Returned by [`Scanner::feed`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Progress {
    NeedMore,
    Finished,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScanSummary {
    pub frame_count: u64,
    /// Total bytes of the skipped ID3v2 tag, header included.
    pub id3_tag_len: Option<usize>,
    pub vbr_marker: Option<VbrMarker>,
    pub end: ScanEnd,
    /// Bytes left over when the source ended mid-unit.
    pub trailing_bytes: usize,
    pub bytes_consumed: u64,
}

enum Step {
    Continue,
    Wait,
}

/// Scan state for one document.
///
/// `pending[cursor..]` always starts at the unit the current phase expects.
#[derive(Debug)]
pub struct Scanner {
    phase: ScanPhase,
    pending: Vec<u8>,
    cursor: usize,
    consumed: u64,
    frame_count: u64,
    id3_tag_len: Option<usize>,
    vbr_marker: Option<VbrMarker>,
    failure: Option<FormatError>,
}

impl Default for Scanner {
    fn default() -> Self {
        Self::new()
    }
}

impl Scanner {
    pub fn new() -> Self {
        Scanner {
            phase: ScanPhase::AwaitingId3,
            pending: Vec::new(),
            cursor: 0,
            consumed: 0,
            frame_count: 0,
            id3_tag_len: None,
            vbr_marker: None,
            failure: None,
        }
    }

    pub fn phase(&self) -> ScanPhase {
        self.phase
    }

    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    /// Bytes received but not yet consumed.
    pub fn buffered_len(&self) -> usize {
        self.pending.len() - self.cursor
    }

    pub fn is_finished(&self) -> bool {
        matches!(self.phase, ScanPhase::Done(_) | ScanPhase::Failed)
    }

    /// Append a chunk and advance as far as the buffered data allows.
    ///
    /// Once `Finished` is returned further chunks are ignored.
    pub fn feed(&mut self, chunk: &[u8]) -> Progress {
        if self.is_finished() {
            return Progress::Finished;
        }

        self.compact(chunk.len());
        self.pending.extend_from_slice(chunk);
        self.advance()
    }

    /// Produce the final outcome. Call once no more chunks will arrive or
    /// after `feed` returned `Finished`.
    pub fn finish(mut self) -> Result<ScanSummary, FormatError> {
        if let Some(err) = self.failure.take() {
            return Err(err);
        }

        let (end, trailing_bytes) = match self.phase {
            ScanPhase::Done(end) => (end, 0),
            _ => (ScanEnd::EndOfStream, self.buffered_len()),
        };

        if trailing_bytes > 0 {
            warn!(
                trailing_bytes,
                phase = ?self.phase,
                "document ended with an incomplete tag, header or frame"
            );
        }

        Ok(ScanSummary {
            frame_count: self.frame_count,
            id3_tag_len: self.id3_tag_len,
            vbr_marker: self.vbr_marker,
            end,
            trailing_bytes,
            bytes_consumed: self.consumed,
        })
    }

    fn advance(&mut self) -> Progress {
        loop {
            let step = match self.phase {
                ScanPhase::AwaitingId3 => self.skip_id3(),
                ScanPhase::AwaitingFirstFrameHeader => self.validate_first_header(),
                ScanPhase::AwaitingVbrDecision { first } => self.skip_vbr_marker(first),
                ScanPhase::ScanningFrames => self.walk_frames(),
                ScanPhase::Done(_) | ScanPhase::Failed => return Progress::Finished,
            };

            if let Step::Wait = step {
                return Progress::NeedMore;
            }
        }
    }

    fn skip_id3(&mut self) -> Step {
        if self.buffered_len() < ID3V2_HEADER_LEN {
            return Step::Wait;
        }

        if let Some(tag) = Id3v2Header::parse(self.unconsumed()) {
            let total = tag.total_len();
            if self.buffered_len() < total {
                return Step::Wait;
            }

            debug!(bytes = total, version = tag.major_version, "skipping ID3v2 tag");
            self.consume(total);
            self.id3_tag_len = Some(total);
        }

        self.phase = ScanPhase::AwaitingFirstFrameHeader;
        Step::Continue
    }

    fn validate_first_header(&mut self) -> Step {
        let Some(header) = FrameHeader::peek(self.unconsumed()) else {
            return Step::Wait;
        };

        if !header.is_valid() {
            warn!(
                offset = self.consumed,
                sync = format_args!("{:#05x}", header.sync),
                version = %header.version,
                layer = %header.layer,
                "unable to find a valid MPEG Version 1 Layer III frame header"
            );
            self.failure = Some(FormatError::invalid_document());
            self.phase = ScanPhase::Failed;
            return Step::Continue;
        }

        debug!(offset = self.consumed, "validated first frame header");
        self.phase = ScanPhase::AwaitingVbrDecision { first: header };
        Step::Continue
    }

    fn skip_vbr_marker(&mut self, first: FrameHeader) -> Step {
        let offset = first.vbr_marker_offset();
        if self.buffered_len() < offset + VBR_WINDOW_LEN {
            return Step::Wait;
        }

        let marker = VbrMarker::detect(&self.unconsumed()[offset..]);
        // A marker frame with reserved fields is left in place; counting
        // stops on it in the next phase.
        if let (Some(marker), Some(length)) = (marker, first.frame_length()) {
            let length = length as usize;
            if self.buffered_len() < length {
                return Step::Wait;
            }

            debug!(marker = %marker, bytes = length, "skipping VBR marker frame");
            self.consume(length);
            self.vbr_marker = Some(marker);
        }

        self.phase = ScanPhase::ScanningFrames;
        Step::Continue
    }

    fn walk_frames(&mut self) -> Step {
        while let Some(header) = FrameHeader::peek(self.unconsumed()) {
            if !header.is_valid() {
                debug!(
                    offset = self.consumed,
                    frames = self.frame_count,
                    "invalid frame header, treating as end of audio"
                );
                self.phase = ScanPhase::Done(ScanEnd::TrailingData);
                return Step::Continue;
            }

            let Some(length) = header.frame_length() else {
                debug!(
                    offset = self.consumed,
                    bitrate_index = header.bitrate_index,
                    sample_rate_index = header.sample_rate_index,
                    "reserved bitrate or sample rate, treating as end of audio"
                );
                self.phase = ScanPhase::Done(ScanEnd::ReservedField);
                return Step::Continue;
            };

            let length = length as usize;
            if self.buffered_len() < length {
                break;
            }

            trace!(offset = self.consumed, bytes = length, "frame");
            self.consume(length);
            self.frame_count += 1;
        }

        Step::Wait
    }

    fn unconsumed(&self) -> &[u8] {
        &self.pending[self.cursor..]
    }

    fn consume(&mut self, n: usize) {
        debug_assert!(n <= self.buffered_len());
        self.cursor += n;
        self.consumed += n as u64;
    }

    /// Drop consumed bytes before appending `incoming` more.
    fn compact(&mut self, incoming: usize) {
        if self.cursor > 0 {
            self.pending.drain(..self.cursor);
            self.cursor = 0;
        }

        let needed = (self.pending.len() + incoming).max(RETAINED_CAPACITY);
        if self.pending.capacity() > needed * 2 {
            self.pending.shrink_to(needed);
        }
    }
}

/// Scan a whole document.
///
/// The source is cancelled exactly once, whether the scan succeeds, rejects
/// the document or fails to read.
pub fn scan<S: ChunkSource>(mut source: S) -> ScanResult<ScanSummary> {
    let mut scanner = Scanner::new();
    let pulled = pull_until_finished(&mut scanner, &mut source);
    source.cancel();
    pulled?;

    let summary = scanner.finish()?;
    debug!(
        frames = summary.frame_count,
        end = ?summary.end,
        bytes = summary.bytes_consumed,
        "scan complete"
    );
    Ok(summary)
}

/// Count the audio frames of a document.
pub fn count_frames<S: ChunkSource>(source: S) -> ScanResult<u64> {
    scan(source).map(|summary| summary.frame_count)
}

fn pull_until_finished<S: ChunkSource>(
    scanner: &mut Scanner,
    source: &mut S,
) -> std::io::Result<()> {
    while let Some(chunk) = source.next_chunk()? {
        if scanner.feed(chunk) == Progress::Finished {
            break;
        }
    }
    Ok(())
}
