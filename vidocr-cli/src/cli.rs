// vidocr-cli/src/cli.rs
//
// Defines the command-line argument structures using clap.

use clap::Parser;
use std::path::{Path, PathBuf};
use vidocr_core::config::{DEFAULT_FRAME_STRIDE, DEFAULT_WHITELIST};
use vidocr_core::{CropRegion, CropSpec, OcrEngine, SampleConfig};

// --- CLI Argument Definition ---

#[derive(Parser, Debug, Clone)]
#[command(
    author,
    version, // Reads from Cargo.toml via "cargo" feature in clap
    about = "vidocr: OCR transcripts from sampled video frames",
    long_about = "Samples every N-th frame of a video, runs OCR on it and writes a \
                  time-indexed transcript as CSV (and optionally JSON) using vidocr-core."
)]
pub struct Cli {
    /// Video file to analyze
    #[arg(short = 'v', long = "video", value_name = "VIDEO")]
    pub video: PathBuf,

    /// Output directory, or a file path whose stem names the outputs (defaults to the video's directory)
    #[arg(short = 'o', long = "output", value_name = "PATH")]
    pub output: Option<PathBuf>,

    /// OCR language code (defaults to 'en' for easyocr, 'eng' for tesseract)
    #[arg(short = 'l', long = "language", value_name = "LANG")]
    pub language: Option<String>,

    /// Run OCR on every N-th frame
    #[arg(
        short = 'f',
        long = "frame_rate",
        value_name = "FRAMES",
        default_value_t = DEFAULT_FRAME_STRIDE,
        value_parser = clap::value_parser!(u64).range(1..)
    )]
    pub frame_stride: u64,

    /// Characters kept in recognized text (empty string disables filtering)
    #[arg(short = 'w', long = "whitelist", value_name = "CHARS", default_value = DEFAULT_WHITELIST)]
    pub whitelist: String,

    /// Write a preview image of each processed frame with the selected text box
    #[arg(short = 'p', long)]
    pub preview: bool,

    /// Also write the transcript as JSON
    #[arg(short = 'j', long)]
    pub json: bool,

    /// Select the crop region interactively on the first frame
    #[arg(short = 'c', long, conflicts_with = "crop_region")]
    pub crop: bool,

    /// Crop region given up front as X,Y,WIDTH,HEIGHT (after rotation)
    #[arg(long = "crop-region", value_name = "X,Y,W,H", value_parser = parse_crop_region)]
    pub crop_region: Option<CropRegion>,

    /// Rotate frames 90 degrees clockwise before cropping
    #[arg(short = 'r', long)]
    pub rotate: bool,

    // --- OCR Engine ---
    /// OCR engine: 'tesseract' or 'easyocr'
    #[arg(long, value_name = "ENGINE", default_value = "tesseract")]
    pub engine: OcrEngine,

    /// Path to the tesseract executable
    #[arg(long, value_name = "PATH", env = "VIDOCR_TESSERACT_CMD")]
    pub tesseract_cmd: Option<PathBuf>,

    /// Path to the easyocr executable
    #[arg(long, value_name = "PATH", env = "VIDOCR_EASYOCR_CMD")]
    pub easyocr_cmd: Option<PathBuf>,

    // --- Logging and Output ---
    /// Optional: Directory for log files (defaults to OUTPUT_DIR/logs)
    #[arg(long, value_name = "LOG_DIR")]
    pub log_dir: Option<PathBuf>,

    /// Disable the run log file
    #[arg(long)]
    pub no_log: bool,

    /// Emit newline-delimited JSON progress events instead of a progress bar
    #[arg(long)]
    pub progress_json: bool,

    /// Enable debug-level logging
    #[arg(long)]
    pub verbose: bool,
}

impl Cli {
    /// Language passed to the OCR engine.
    pub fn effective_language(&self) -> String {
        self.language
            .clone()
            .unwrap_or_else(|| self.engine.default_language().to_string())
    }

    /// Executable configured for the selected engine, if overridden.
    pub fn ocr_command(&self) -> Option<&Path> {
        match self.engine {
            OcrEngine::Tesseract => self.tesseract_cmd.as_deref(),
            OcrEngine::EasyOcr => self.easyocr_cmd.as_deref(),
        }
    }

    /// Executable that will actually be run for the selected engine.
    pub fn resolved_ocr_command(&self) -> PathBuf {
        self.ocr_command()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from(self.engine.default_command()))
    }

    pub fn crop_spec(&self) -> CropSpec {
        match (self.crop, self.crop_region) {
            (_, Some(region)) => CropSpec::Fixed(region),
            (true, None) => CropSpec::Interactive,
            (false, None) => CropSpec::None,
        }
    }

    pub fn sample_config(&self) -> SampleConfig {
        SampleConfig {
            frame_stride: self.frame_stride,
            language: self.effective_language(),
            character_whitelist: self.whitelist.clone(),
            rotate_90_clockwise: self.rotate,
            crop: self.crop_spec(),
        }
    }
}

/// Parses `X,Y,WIDTH,HEIGHT` into a crop region.
fn parse_crop_region(value: &str) -> Result<CropRegion, String> {
    let parts: Vec<u32> = value
        .split(',')
        .map(|part| part.trim().parse::<u32>())
        .collect::<Result<_, _>>()
        .map_err(|e| format!("expected four non-negative integers X,Y,W,H: {e}"))?;

    let [x, y, width, height] = parts[..] else {
        return Err(format!("expected four values X,Y,W,H, got {}", parts.len()));
    };
    if width == 0 || height == 0 {
        return Err("crop region has zero width or height".to_string());
    }
    Ok(CropRegion::from_rect(x, y, width, height))
}

/// Parses the command line arguments of the current process.
pub fn parse_cli() -> Cli {
    Cli::parse()
}

/// Parses the given arguments (the first item is the binary name).
pub fn parse_cli_from<I, T>(args: I) -> Result<Cli, clap::Error>
where
    I: IntoIterator<Item = T>,
    T: Into<std::ffi::OsString> + Clone,
{
    Cli::try_parse_from(args)
}
