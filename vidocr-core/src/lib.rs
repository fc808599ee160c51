//! Core library for sampling video frames and extracting OCR transcripts.
//!
//! This crate decodes every N-th frame of a video through ffmpeg, optionally
//! rotates and crops it, runs an OCR engine on it and records the best
//! reading per frame in an ordered transcript written as CSV and JSON.
//!
//! ## Usage Example
//!
//! ```rust,no_run
//! use vidocr_core::{
//!     ExtractionContext, OcrEngine, SampleConfig, SidecarFrameSource, create_backend,
//!     extract_transcript,
//! };
//! use vidocr_core::reporting::NullReporter;
//! use std::path::Path;
//!
//! let engine = OcrEngine::Tesseract;
//! let mut config = SampleConfig::new(engine.default_language());
//! config.frame_stride = 25;
//! config.validate().unwrap();
//!
//! let video = Path::new("/path/to/clip.mp4");
//! let source = SidecarFrameSource::open(video, config.frame_stride).unwrap();
//! let backend = create_backend(engine, None);
//! let ctx = ExtractionContext::new(backend.as_ref(), &NullReporter);
//!
//! let outcome = extract_transcript(source, "clip.mp4", &config, ctx).unwrap();
//! for entry in outcome.transcript.entries() {
//!     println!("{} {} {}", entry.frame_index, entry.timecode_ms, entry.text);
//! }
//! ```

pub mod config;
pub mod error;
pub mod external;
pub mod file_logging;
pub mod media;
pub mod ocr;
pub mod preview;
pub mod processing;
pub mod region;
pub mod reporting;
pub mod transcript;
pub mod utils;

// Re-exports for public API
pub use config::{CropSpec, OcrEngine, SampleConfig};
pub use error::{CoreError, CoreResult};
pub use media::{FrameSource, SidecarFrameSource, VideoInfo};
pub use ocr::{OcrBackend, OcrCandidate, create_backend};
pub use processing::{
    CropRegion, ExtractionContext, ExtractionOutcome, StopReason, extract_transcript,
};
pub use region::{RegionSelection, RegionSelector};
pub use transcript::{OutputFiles, Transcript, TranscriptEntry};
pub use utils::{format_duration, format_timecode_ms};
