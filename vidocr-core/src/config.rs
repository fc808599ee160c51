//! Run configuration for frame sampling and OCR extraction.
//!
//! `SampleConfig` is built once from user options and stays immutable for the
//! whole run. Defaults mirror the CLI defaults so library consumers get the
//! same behavior without going through clap.

use crate::error::{CoreError, CoreResult};
use crate::processing::preprocess::CropRegion;
use std::fmt;
use std::str::FromStr;

// ============================================================================
// DEFAULT VALUES
// ============================================================================

/// Frames advanced between consecutive OCR samples.
pub const DEFAULT_FRAME_STRIDE: u64 = 10;

/// Characters kept in recognized text unless overridden.
pub const DEFAULT_WHITELIST: &str = "0123456789-";

/// EasyOCR language code used when none is given.
pub const DEFAULT_EASYOCR_LANGUAGE: &str = "en";

/// Tesseract language code used when none is given.
pub const DEFAULT_TESSERACT_LANGUAGE: &str = "eng";

/// Executable name of the Tesseract command line tool.
pub const DEFAULT_TESSERACT_CMD: &str = "tesseract";

/// Executable name of the EasyOCR command line tool.
pub const DEFAULT_EASYOCR_CMD: &str = "easyocr";

/// Tesseract page segmentation mode (fully automatic, no OSD).
pub const DEFAULT_TESSERACT_PSM: u8 = 3;

/// Tesseract engine mode (LSTM only).
pub const DEFAULT_TESSERACT_OEM: u8 = 1;

// ============================================================================
// OCR ENGINE SELECTION
// ============================================================================

/// OCR engine used to recognize text in sampled frames.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OcrEngine {
    /// Localizing engine returning one candidate per detected text region.
    EasyOcr,
    /// Non-localizing engine returning one aggregate text block.
    #[default]
    Tesseract,
}

impl OcrEngine {
    /// Language code used when the user does not pick one.
    pub fn default_language(self) -> &'static str {
        match self {
            OcrEngine::EasyOcr => DEFAULT_EASYOCR_LANGUAGE,
            OcrEngine::Tesseract => DEFAULT_TESSERACT_LANGUAGE,
        }
    }

    /// Executable name used when no explicit path is configured.
    pub fn default_command(self) -> &'static str {
        match self {
            OcrEngine::EasyOcr => DEFAULT_EASYOCR_CMD,
            OcrEngine::Tesseract => DEFAULT_TESSERACT_CMD,
        }
    }
}

impl fmt::Display for OcrEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OcrEngine::EasyOcr => write!(f, "easyocr"),
            OcrEngine::Tesseract => write!(f, "tesseract"),
        }
    }
}

impl FromStr for OcrEngine {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "easyocr" => Ok(OcrEngine::EasyOcr),
            "tesseract" => Ok(OcrEngine::Tesseract),
            other => Err(CoreError::Config(format!(
                "Unknown OCR engine '{other}'; expected 'easyocr' or 'tesseract'"
            ))),
        }
    }
}

// ============================================================================
// CROP CONFIGURATION
// ============================================================================

/// How the region of interest is obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CropSpec {
    /// Recognize the whole (possibly rotated) frame.
    #[default]
    None,
    /// Use a rectangle known before the run starts.
    Fixed(CropRegion),
    /// Ask the region selector once, on the first decoded frame.
    Interactive,
}

// ============================================================================
// SAMPLE CONFIGURATION
// ============================================================================

/// Immutable configuration for one extraction run.
#[derive(Debug, Clone, PartialEq)]
pub struct SampleConfig {
    /// Frames advanced between samples; must be positive.
    pub frame_stride: u64,
    /// Language code handed to the OCR backend.
    pub language: String,
    /// Characters kept in recognized text; empty disables filtering.
    pub character_whitelist: String,
    /// Rotate each frame 90 degrees clockwise before cropping.
    pub rotate_90_clockwise: bool,
    /// Region of interest.
    pub crop: CropSpec,
}

impl SampleConfig {
    /// Creates a configuration with default stride and whitelist.
    pub fn new(language: impl Into<String>) -> Self {
        Self {
            frame_stride: DEFAULT_FRAME_STRIDE,
            language: language.into(),
            character_whitelist: DEFAULT_WHITELIST.to_string(),
            rotate_90_clockwise: false,
            crop: CropSpec::None,
        }
    }

    /// Validates the configuration before any frame is decoded.
    pub fn validate(&self) -> CoreResult<()> {
        if self.frame_stride == 0 {
            return Err(CoreError::Config(
                "frame stride must be a positive number of frames".to_string(),
            ));
        }

        if self.language.trim().is_empty() {
            return Err(CoreError::Config("OCR language must not be empty".to_string()));
        }

        if let CropSpec::Fixed(region) = &self.crop {
            if region.is_empty() {
                return Err(CoreError::Config(format!(
                    "crop region {region} has zero area"
                )));
            }
        }

        Ok(())
    }
}

impl Default for SampleConfig {
    fn default() -> Self {
        Self::new(OcrEngine::default().default_language())
    }
}
