pub mod csv;
pub mod json;

use crate::analyzer::{FileReport, Verdict};
use std::io;
use std::path::Path;

/// Write a report in the format chosen by the file extension
pub fn generate<P: AsRef<Path>>(path: P, results: &[FileReport]) -> io::Result<()> {
    let path = path.as_ref();
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_lowercase();

    let mut file = std::fs::File::create(path)?;

    match ext.as_str() {
        "json" => json::write(&mut file, results),
        _ => csv::write(&mut file, results),
    }
}

/// Summary statistics for a batch of results
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Summary {
    pub total: usize,
    pub valid: usize,
    pub invalid: usize,
    pub error: usize,
    pub frames: u64,
}

impl Summary {
    pub fn from_results(results: &[FileReport]) -> Self {
        let mut summary = Self {
            total: results.len(),
            ..Self::default()
        };

        for r in results {
            match r.verdict {
                Verdict::Valid => summary.valid += 1,
                Verdict::Invalid => summary.invalid += 1,
                Verdict::Error => summary.error += 1,
            }
            summary.frames += r.frame_count.unwrap_or(0);
        }

        summary
    }
}
