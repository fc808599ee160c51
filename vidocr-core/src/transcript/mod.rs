//! Transcript data model.
//!
//! A transcript is the ordered list of per-sample readings plus the metadata
//! describing how the run was configured.

pub mod writer;

pub use writer::{OutputFiles, WriteOutcome, write_csv, write_json, write_outputs};

use crate::ocr::OcrCandidate;
use crate::processing::selection::NO_CONFIDENCE;
use serde::Serialize;

/// Format of `RunMetadata::date_processed`.
pub const DATE_PROCESSED_FORMAT: &str = "%Y-%m-%d-%H-%M";

/// Result of recognizing one sampled frame.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TranscriptEntry {
    #[serde(rename = "frame_number")]
    pub frame_index: u64,
    pub timecode_ms: f64,
    #[serde(rename = "ocr_text")]
    pub text: String,
    #[serde(rename = "ocr_confidence")]
    pub confidence: f64,
}

impl TranscriptEntry {
    /// Builds an entry from the selected candidate, or the empty sentinel.
    pub fn from_candidate(frame_index: u64, timecode_ms: f64, best: Option<&OcrCandidate>) -> Self {
        match best {
            Some(candidate) => Self {
                frame_index,
                timecode_ms,
                text: candidate.text.trim().to_string(),
                confidence: candidate.confidence,
            },
            None => Self::miss(frame_index, timecode_ms),
        }
    }

    /// Entry for a frame where nothing was recognized.
    pub fn miss(frame_index: u64, timecode_ms: f64) -> Self {
        Self {
            frame_index,
            timecode_ms,
            text: String::new(),
            confidence: NO_CONFIDENCE,
        }
    }
}

/// Run description written as the first JSON element.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunMetadata {
    pub filename: String,
    pub date_processed: String,
    pub ocr_language: String,
    pub analysis_frame_interval: u64,
    pub character_whitelist: String,
}

impl RunMetadata {
    /// Metadata stamped with the current local time.
    pub fn new(filename: impl Into<String>, language: &str, stride: u64, whitelist: &str) -> Self {
        Self {
            filename: filename.into(),
            date_processed: chrono::Local::now().format(DATE_PROCESSED_FORMAT).to_string(),
            ocr_language: language.to_string(),
            analysis_frame_interval: stride,
            character_whitelist: whitelist.to_string(),
        }
    }
}

/// Ordered readings of one run.
#[derive(Debug, Clone, PartialEq)]
pub struct Transcript {
    pub metadata: RunMetadata,
    entries: Vec<TranscriptEntry>,
}

impl Transcript {
    pub fn new(metadata: RunMetadata) -> Self {
        Self {
            metadata,
            entries: Vec::new(),
        }
    }

    pub fn push(&mut self, entry: TranscriptEntry) {
        debug_assert!(
            self.entries
                .last()
                .is_none_or(|last| last.frame_index < entry.frame_index),
            "transcript entries must be strictly increasing"
        );
        self.entries.push(entry);
    }

    pub fn entries(&self) -> &[TranscriptEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
