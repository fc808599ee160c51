// ============================================================================
// vidocr-core/src/transcript/writer.rs
// ============================================================================
//
// TRANSCRIPT OUTPUT: CSV and JSON Serialization
//
// CSV carries a leading unnamed row-index column followed by frame_number,
// timecode_ms, ocr_text and ocr_confidence. JSON is an array whose first
// element is the run metadata and whose remaining elements mirror the CSV
// rows, pretty-printed with four-space indentation.
//
// AI-ASSISTANT-INFO: Transcript CSV/JSON writers

use super::{RunMetadata, Transcript, TranscriptEntry};
use crate::error::{CoreError, CoreResult};
use serde::Serialize;
use serde_json::ser::PrettyFormatter;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

/// Destination paths for one run's transcript.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputFiles {
    pub csv: PathBuf,
    /// Present when JSON output was requested.
    pub json: Option<PathBuf>,
}

/// Per-format result of [`write_outputs`].
#[derive(Debug)]
pub struct WriteOutcome {
    pub csv: CoreResult<()>,
    pub json: Option<CoreResult<()>>,
}

impl WriteOutcome {
    pub fn is_success(&self) -> bool {
        self.csv.is_ok() && self.json.as_ref().is_none_or(|r| r.is_ok())
    }
}

#[derive(Serialize)]
struct CsvRow<'a> {
    #[serde(rename = "")]
    row: usize,
    frame_number: u64,
    timecode_ms: f64,
    ocr_text: &'a str,
    ocr_confidence: f64,
}

#[derive(Serialize)]
#[serde(untagged)]
enum JsonRecord<'a> {
    Metadata(&'a RunMetadata),
    Entry(&'a TranscriptEntry),
}

/// Writes the CSV transcript to `path`, replacing any existing file.
pub fn write_csv(transcript: &Transcript, path: &Path) -> CoreResult<()> {
    let csv_error = |e: &dyn std::fmt::Display| CoreError::CsvWrite(path.display().to_string(), e.to_string());

    let mut writer = csv::Writer::from_path(path).map_err(|e| csv_error(&e))?;
    for (row, entry) in transcript.entries().iter().enumerate() {
        writer
            .serialize(CsvRow {
                row,
                frame_number: entry.frame_index,
                timecode_ms: entry.timecode_ms,
                ocr_text: &entry.text,
                ocr_confidence: entry.confidence,
            })
            .map_err(|e| csv_error(&e))?;
    }
    if transcript.is_empty() {
        writer
            .write_record(["", "frame_number", "timecode_ms", "ocr_text", "ocr_confidence"])
            .map_err(|e| csv_error(&e))?;
    }
    writer.flush().map_err(|e| csv_error(&e))?;

    log::info!("Wrote {} transcript rows to {}", transcript.len(), path.display());
    Ok(())
}

/// Writes the JSON transcript (metadata first) to `path`.
pub fn write_json(transcript: &Transcript, path: &Path) -> CoreResult<()> {
    let json_error = |e: &dyn std::fmt::Display| CoreError::JsonWrite(path.display().to_string(), e.to_string());

    let records: Vec<JsonRecord<'_>> = std::iter::once(JsonRecord::Metadata(&transcript.metadata))
        .chain(transcript.entries().iter().map(JsonRecord::Entry))
        .collect();

    let file = File::create(path).map_err(|e| json_error(&e))?;
    let mut writer = BufWriter::new(file);
    let mut serializer =
        serde_json::Serializer::with_formatter(&mut writer, PrettyFormatter::with_indent(b"    "));
    records.serialize(&mut serializer).map_err(|e| json_error(&e))?;
    writer.write_all(b"\n").map_err(|e| json_error(&e))?;
    writer.flush().map_err(|e| json_error(&e))?;

    log::info!("Wrote JSON transcript ({} records) to {}", records.len(), path.display());
    Ok(())
}

/// Writes every requested format; a JSON failure does not stop the CSV.
pub fn write_outputs(transcript: &Transcript, files: &OutputFiles) -> WriteOutcome {
    let csv = write_csv(transcript, &files.csv);
    if let Err(e) = &csv {
        log::error!("{e}");
    }
    let json = files.json.as_deref().map(|path| {
        let result = write_json(transcript, path);
        if let Err(e) = &result {
            log::error!("{e}");
        }
        result
    });
    WriteOutcome { csv, json }
}
