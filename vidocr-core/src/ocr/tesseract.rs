//! Tesseract backend.
//!
//! Runs `tesseract <image> stdout ... tsv` and folds the word-level rows into
//! a single text block. Confidence is the mean word confidence on Tesseract's
//! 0-100 scale, or -1.0 when no word carries a measurable confidence.

use super::{OcrBackend, OcrCandidate, run_recognizer, write_temp_png};
use crate::config::{DEFAULT_TESSERACT_OEM, DEFAULT_TESSERACT_PSM};
use crate::error::{CoreError, CoreResult};
use image::RgbImage;
use std::path::{Path, PathBuf};
use std::process::Command;

/// TSV row level for individual words.
const WORD_LEVEL: u32 = 5;

/// Non-localizing backend driven through the Tesseract CLI.
#[derive(Debug, Clone)]
pub struct TesseractBackend {
    command: PathBuf,
    psm: u8,
    oem: u8,
}

impl TesseractBackend {
    pub fn new(command: impl Into<PathBuf>) -> Self {
        Self {
            command: command.into(),
            psm: DEFAULT_TESSERACT_PSM,
            oem: DEFAULT_TESSERACT_OEM,
        }
    }

    fn build_command(&self, image_path: &Path, language: &str, allowlist: Option<&str>) -> Command {
        let mut cmd = Command::new(&self.command);
        cmd.arg(image_path).arg("stdout");
        cmd.args(["-l", language]);
        cmd.arg("--oem").arg(self.oem.to_string());
        cmd.arg("--psm").arg(self.psm.to_string());
        if let Some(chars) = allowlist.filter(|c| !c.is_empty()) {
            cmd.arg("-c").arg(format!("tessedit_char_whitelist={chars}"));
        }
        cmd.arg("tsv");
        cmd
    }
}

impl OcrBackend for TesseractBackend {
    fn name(&self) -> &str {
        "tesseract"
    }

    fn supports_allowlist(&self) -> bool {
        true
    }

    fn recognize(
        &self,
        image: &RgbImage,
        language: &str,
        allowlist: Option<&str>,
    ) -> CoreResult<Vec<OcrCandidate>> {
        let frame_file = write_temp_png(image)?;
        let cmd = self.build_command(frame_file.path(), language, allowlist);
        let stdout = run_recognizer(cmd, self.name())?;
        Ok(parse_tsv(&stdout)?.into_iter().collect())
    }
}

/// Folds Tesseract TSV output into at most one aggregate candidate.
///
/// Words on the same (page, block, paragraph, line) are joined with spaces,
/// lines with newlines.
pub(crate) fn parse_tsv(tsv: &str) -> CoreResult<Option<OcrCandidate>> {
    let mut lines: Vec<String> = Vec::new();
    let mut current_key: Option<(u32, u32, u32, u32)> = None;
    let mut confidences: Vec<f64> = Vec::new();

    for (row_no, row) in tsv.lines().enumerate() {
        if row_no == 0 && row.starts_with("level") {
            continue;
        }
        if row.trim().is_empty() {
            continue;
        }

        let fields: Vec<&str> = row.split('\t').collect();
        if fields.len() < 11 {
            return Err(CoreError::OcrOutput(
                "tesseract".to_string(),
                format!("expected 12 TSV columns, got {}: {row}", fields.len()),
            ));
        }

        let number = |i: usize| -> CoreResult<u32> {
            fields[i].trim().parse::<u32>().map_err(|e| {
                CoreError::OcrOutput("tesseract".to_string(), format!("column {i}: {e}: {row}"))
            })
        };
        if number(0)? != WORD_LEVEL {
            continue;
        }

        let conf: f64 = fields[10].trim().parse().map_err(|e| {
            CoreError::OcrOutput("tesseract".to_string(), format!("confidence: {e}: {row}"))
        })?;
        let word = fields.get(11).map(|w| w.trim()).unwrap_or("");
        if conf >= 0.0 {
            confidences.push(conf);
        }
        if word.is_empty() {
            continue;
        }

        let key = (number(1)?, number(2)?, number(3)?, number(4)?);
        match lines.last_mut() {
            Some(line) if current_key == Some(key) => {
                line.push(' ');
                line.push_str(word);
            }
            _ => {
                lines.push(word.to_string());
                current_key = Some(key);
            }
        }
    }

    let text = lines.join("\n");
    let confidence = if confidences.is_empty() {
        -1.0
    } else {
        confidences.iter().sum::<f64>() / confidences.len() as f64
    };

    if text.is_empty() && confidences.is_empty() {
        return Ok(None);
    }
    Ok(Some(OcrCandidate::new(text, confidence)))
}
