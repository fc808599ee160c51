//! EasyOCR backend.
//!
//! Runs the `easyocr` command line tool on a temporary PNG and parses its
//! JSON-lines output. Each detected text region becomes one candidate with a
//! bounding box and a confidence in `[0, 1]`.

use super::{BoundingBox, OcrBackend, OcrCandidate, Point, run_recognizer, write_temp_png};
use crate::error::{CoreError, CoreResult};
use image::RgbImage;
use serde::Deserialize;
use std::path::PathBuf;
use std::process::Command;

/// Localizing backend driven through the EasyOCR CLI.
#[derive(Debug, Clone)]
pub struct EasyOcrBackend {
    command: PathBuf,
}

/// One line of `easyocr --detail 1 --output_format json` output.
#[derive(Debug, Deserialize)]
struct EasyOcrRecord {
    boxes: Vec<[f64; 2]>,
    text: String,
    #[serde(rename = "confident")]
    confidence: f64,
}

impl EasyOcrBackend {
    pub fn new(command: impl Into<PathBuf>) -> Self {
        Self {
            command: command.into(),
        }
    }

    fn build_command(&self, image_path: &std::path::Path, language: &str, allowlist: Option<&str>) -> Command {
        let mut cmd = Command::new(&self.command);
        cmd.arg("-l");
        cmd.args(split_languages(language));
        cmd.arg("-f").arg(image_path);
        cmd.args(["--detail", "1", "--output_format", "json"]);
        if let Some(chars) = allowlist.filter(|c| !c.is_empty()) {
            cmd.arg("--allowlist").arg(chars);
        }
        cmd
    }
}

impl OcrBackend for EasyOcrBackend {
    fn name(&self) -> &str {
        "easyocr"
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
        parse_output(&stdout)
    }
}

/// EasyOCR takes several languages as separate arguments.
fn split_languages(language: &str) -> Vec<&str> {
    language
        .split([',', '+'])
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .collect()
}

/// Parses EasyOCR JSON-lines output into candidates.
///
/// Lines that are not JSON objects (model download notices, warnings) are
/// skipped. A JSON object that does not match the expected shape is an error.
pub(crate) fn parse_output(stdout: &str) -> CoreResult<Vec<OcrCandidate>> {
    let mut candidates = Vec::new();
    for line in stdout.lines().map(str::trim) {
        if !line.starts_with('{') {
            if !line.is_empty() {
                log::debug!("Skipping non-JSON easyocr output: {line}");
            }
            continue;
        }
        let record: EasyOcrRecord = serde_json::from_str(line)
            .map_err(|e| CoreError::OcrOutput("easyocr".to_string(), format!("{e}: {line}")))?;
        let mut candidate = OcrCandidate::new(record.text, record.confidence);
        if let Some(bbox) = to_bounding_box(&record.boxes) {
            candidate = candidate.with_bounding_box(bbox);
        }
        candidates.push(candidate);
    }
    Ok(candidates)
}

fn to_bounding_box(points: &[[f64; 2]]) -> Option<BoundingBox> {
    if points.len() != 4 {
        return None;
    }
    let corner = |i: usize| Point {
        x: points[i][0],
        y: points[i][1],
    };
    Some(BoundingBox {
        corners: [corner(0), corner(1), corner(2), corner(3)],
    })
}
