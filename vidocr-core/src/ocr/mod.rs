// ============================================================================
// vidocr-core/src/ocr/mod.rs
// ============================================================================
//
// OCR BACKENDS: Text Recognition Capability and Implementations
//
// The extraction pipeline only sees the `OcrBackend` trait. Each backend wraps
// an external recognizer and normalizes its output into `OcrCandidate` values.
//
// KEY COMPONENTS:
// - OcrBackend: recognition capability injected into the pipeline
// - OcrCandidate / BoundingBox: normalized recognition results
// - EasyOcrBackend: localizing backend (one candidate per text region)
// - TesseractBackend: non-localizing backend (one aggregate block)
// - create_backend: factory keyed by OcrEngine
//
// AI-ASSISTANT-INFO: OCR backend abstraction and implementations

pub mod easyocr;
pub mod tesseract;

pub use easyocr::EasyOcrBackend;
pub use tesseract::TesseractBackend;

use crate::config::OcrEngine;
use crate::error::{CoreError, CoreResult, command_failed_error, command_start_error};
use image::RgbImage;
use std::path::{Path, PathBuf};
use std::process::Command;

// ============================================================================
// RESULT TYPES
// ============================================================================

/// A corner point in pixel coordinates of the recognized image.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

/// Quadrilateral around a recognized text region (clockwise from top-left).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub corners: [Point; 4],
}

impl BoundingBox {
    /// Smallest axis-aligned rectangle `(x0, y0, x1, y1)` enclosing the corners.
    pub fn bounds(&self) -> (f64, f64, f64, f64) {
        let xs = self.corners.iter().map(|p| p.x);
        let ys = self.corners.iter().map(|p| p.y);
        (
            xs.clone().fold(f64::INFINITY, f64::min),
            ys.clone().fold(f64::INFINITY, f64::min),
            xs.fold(f64::NEG_INFINITY, f64::max),
            ys.fold(f64::NEG_INFINITY, f64::max),
        )
    }
}

/// One recognizer's proposed reading of (part of) a frame.
///
/// Confidence is on the backend's own scale and only comparable with other
/// candidates from the same backend for the same frame.
#[derive(Debug, Clone, PartialEq)]
pub struct OcrCandidate {
    pub text: String,
    pub confidence: f64,
    pub bounding_box: Option<BoundingBox>,
}

impl OcrCandidate {
    pub fn new(text: impl Into<String>, confidence: f64) -> Self {
        Self {
            text: text.into(),
            confidence,
            bounding_box: None,
        }
    }

    pub fn with_bounding_box(mut self, bounding_box: BoundingBox) -> Self {
        self.bounding_box = Some(bounding_box);
        self
    }
}

// ============================================================================
// BACKEND TRAIT
// ============================================================================

/// Text recognition capability used by the extraction pipeline.
pub trait OcrBackend {
    /// Short identifier used in logs and reports.
    fn name(&self) -> &str;

    /// Whether `recognize` honors the whitelist natively.
    fn supports_allowlist(&self) -> bool {
        false
    }

    /// Recognizes text in `image`.
    ///
    /// `allowlist` is only passed when [`supports_allowlist`](Self::supports_allowlist)
    /// is true. An empty vector means nothing was recognized.
    fn recognize(
        &self,
        image: &RgbImage,
        language: &str,
        allowlist: Option<&str>,
    ) -> CoreResult<Vec<OcrCandidate>>;
}

/// Builds the backend for `engine`, running `command` (or the engine default).
pub fn create_backend(engine: OcrEngine, command: Option<&Path>) -> Box<dyn OcrBackend> {
    let command = command
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from(engine.default_command()));
    match engine {
        OcrEngine::EasyOcr => Box::new(EasyOcrBackend::new(command)),
        OcrEngine::Tesseract => Box::new(TesseractBackend::new(command)),
    }
}

// ============================================================================
// SHARED HELPERS
// ============================================================================

/// Writes `image` to a temporary PNG that lives as long as the returned handle.
pub(crate) fn write_temp_png(image: &RgbImage) -> CoreResult<tempfile::NamedTempFile> {
    let file = tempfile::Builder::new()
        .prefix("vidocr_frame_")
        .suffix(".png")
        .tempfile()?;
    image
        .save_with_format(file.path(), image::ImageFormat::Png)
        .map_err(|e| CoreError::Image(file.path().display().to_string(), e.to_string()))?;
    Ok(file)
}

/// Runs a recognizer command to completion and returns its stdout.
pub(crate) fn run_recognizer(mut cmd: Command, name: &str) -> CoreResult<String> {
    log::trace!("Running {name}: {cmd:?}");
    let output = cmd.output().map_err(|e| command_start_error(name, e))?;
    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr).into_owned();
        return Err(command_failed_error(name, output.status, stderr));
    }
    Ok(String::from_utf8_lossy(&output.stdout).into_owned())
}
