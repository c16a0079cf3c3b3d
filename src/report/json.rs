//! JSON report generation

use crate::analyzer::FileReport;
use crate::report::Summary;
use serde::Serialize;
use std::io::{self, Write};

#[derive(Serialize)]
struct JsonReport<'a> {
    generated: String,
    summary: JsonSummary,
    files: &'a [FileReport],
}

#[derive(Serialize)]
struct JsonSummary {
    total: usize,
    valid: usize,
    invalid: usize,
    error: usize,
    frames: u64,
}

pub fn write<W: Write>(writer: &mut W, results: &[FileReport]) -> io::Result<()> {
    let summary = Summary::from_results(results);

    let report = JsonReport {
        generated: chrono::Utc::now().to_rfc3339(),
        summary: JsonSummary {
            total: summary.total,
            valid: summary.valid,
            invalid: summary.invalid,
            error: summary.error,
            frames: summary.frames,
        },
        files: results,
    };

    let json = serde_json::to_string_pretty(&report)
        .map_err(|e| io::Error::new(io::ErrorKind::Other, e))?;

    writer.write_all(json.as_bytes())
}
