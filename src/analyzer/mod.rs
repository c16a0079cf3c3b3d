use crate::error::ScanError;
use crate::mp3::VbrMarker;
use crate::scanner::{self, ReaderSource, ScanSummary, DEFAULT_CHUNK_SIZE};
use serde::Serialize;
use std::fs::File;
use std::path::Path;
use tracing::debug;

/// Frame count result for a single file
#[derive(Debug, Clone, Serialize)]
pub struct FileReport {
    pub file_path: String,
    pub file_name: String,
    pub verdict: Verdict,
    pub frame_count: Option<u64>,
    pub id3_tag_len: Option<usize>,
    pub vbr_marker: Option<VbrMarker>,
    pub trailing_bytes: usize,
    pub error: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Verdict {
    /// MPEG-1 Layer III; frames were counted
    Valid,
    /// Not an MPEG-1 Layer III stream
    Invalid,
    /// The file could not be read
    Error,
}

impl std::fmt::Display for Verdict {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Verdict::Valid => write!(f, "VALID"),
            Verdict::Invalid => write!(f, "INVALID"),
            Verdict::Error => write!(f, "ERROR"),
        }
    }
}

/// Counts frames of files on disk
pub struct Analyzer {
    /// Bytes read per chunk
    pub chunk_size: usize,
}

impl Default for Analyzer {
    fn default() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
        }
    }
}

impl Analyzer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size.max(1);
        self
    }

    /// Scan a single MP3 file
    pub fn analyze<P: AsRef<Path>>(&self, path: P) -> FileReport {
        let path = path.as_ref();
        let file_path = path.display().to_string();
        let file_name = path
            .file_name()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_else(|| file_path.clone());

        let outcome = File::open(path)
            .map_err(ScanError::from)
            .and_then(|file| scanner::scan(ReaderSource::with_chunk_size(file, self.chunk_size)));

        debug!(path = %file_path, ok = outcome.is_ok(), "analyzed file");
        Self::report(file_path, file_name, outcome)
    }

    fn report(
        file_path: String,
        file_name: String,
        outcome: Result<ScanSummary, ScanError>,
    ) -> FileReport {
        let mut report = FileReport {
            file_path,
            file_name,
            verdict: Verdict::Valid,
            frame_count: None,
            id3_tag_len: None,
            vbr_marker: None,
            trailing_bytes: 0,
            error: None,
        };

        match outcome {
            Ok(summary) => {
                report.frame_count = Some(summary.frame_count);
                report.id3_tag_len = summary.id3_tag_len;
                report.vbr_marker = summary.vbr_marker;
                report.trailing_bytes = summary.trailing_bytes;
            }
            Err(ScanError::Format(e)) => {
                report.verdict = Verdict::Invalid;
                report.error = Some(e.message);
            }
            Err(ScanError::Io(e)) => {
                report.verdict = Verdict::Error;
                report.error = Some(format!("Failed to read file: {}", e));
            }
        }

        report
    }
}
