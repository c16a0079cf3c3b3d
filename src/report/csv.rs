//! CSV report generation

use crate::analyzer::FileReport;
use std::io::{self, Write};

pub fn write<W: Write>(writer: &mut W, results: &[FileReport]) -> io::Result<()> {
    // Header
    writeln!(
        writer,
        "verdict,filepath,frame_count,id3_tag_bytes,vbr_marker,trailing_bytes,error"
    )?;

    // Rows
    for r in results {
        let frame_count = r
            .frame_count
            .map(|c| c.to_string())
            .unwrap_or_else(|| "n/a".to_string());

        let id3 = r
            .id3_tag_len
            .map(|l| l.to_string())
            .unwrap_or_else(|| "-".to_string());

        let marker = r.vbr_marker.map(|m| m.as_str()).unwrap_or("-");

        writeln!(
            writer,
            "{},{},{},{},{},{},{}",
            r.verdict,
            escape_csv(&r.file_path),
            frame_count,
            id3,
            marker,
            r.trailing_bytes,
            escape_csv(r.error.as_deref().unwrap_or(""))
        )?;
    }

    Ok(())
}

fn escape_csv(s: &str) -> String {
    if s.contains(',') || s.contains('"') || s.contains('\n') {
        format!("\"{}\"", s.replace('"', "\"\""))
    } else {
        s.to_string()
    }
}
