//! Terminal crop-region prompt.
//!
//! Saves the reference frame as a PNG the user can open in any viewer and
//! asks for two opposite corners of the region on the terminal.

use console::{Term, style};
use image::{ImageFormat, RgbImage};
use std::path::PathBuf;
use vidocr_core::{CoreError, CoreResult, CropRegion, RegionSelection, RegionSelector};

/// Region selector that prompts on stderr and reads answers from the terminal.
pub struct PromptRegionSelector {
    reference_path: PathBuf,
    term: Term,
}

impl PromptRegionSelector {
    pub fn new(reference_path: impl Into<PathBuf>) -> Self {
        Self {
            reference_path: reference_path.into(),
            term: Term::stderr(),
        }
    }

    fn save_reference(&self, reference: &RgbImage) -> CoreResult<()> {
        reference
            .save_with_format(&self.reference_path, ImageFormat::Png)
            .map_err(|e| CoreError::Image(self.reference_path.display().to_string(), e.to_string()))
    }
}

impl RegionSelector for PromptRegionSelector {
    fn select_region(&mut self, reference: &RgbImage) -> CoreResult<CropRegion> {
        if !self.term.is_term() {
            return Err(CoreError::Config(
                "interactive cropping needs a terminal; pass --crop-region X,Y,W,H instead"
                    .to_string(),
            ));
        }

        self.save_reference(reference)?;
        let (width, height) = reference.dimensions();
        log::info!(
            "Crop reference frame saved to {}",
            self.reference_path.display()
        );

        self.term.write_line(&format!(
            "\n{} Open {} ({}x{}) and pick two opposite corners of the text region.",
            style("CROP").bold().cyan(),
            style(self.reference_path.display()).green(),
            width,
            height
        ))?;

        loop {
            self.term
                .write_str("Corners x1,y1,x2,y2 (empty to cancel): ")?;
            let line = self.term.read_line()?;
            match parse_answer(&line, width, height) {
                Ok(Some(region)) => {
                    log::info!("Crop region selected: {region}");
                    return Ok(region);
                }
                Ok(None) => {
                    return Err(CoreError::Config("crop selection cancelled".to_string()));
                }
                Err(message) => self.term.write_line(&style(message).yellow().to_string())?,
            }
        }
    }
}

/// Interprets one answer; `Ok(None)` means the user cancelled.
fn parse_answer(line: &str, width: u32, height: u32) -> Result<Option<CropRegion>, String> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(None);
    }

    let values: Vec<u32> = line
        .split(',')
        .map(|v| v.trim().parse::<u32>())
        .collect::<Result<_, _>>()
        .map_err(|_| "expected four non-negative integers x1,y1,x2,y2".to_string())?;
    let [x1, y1, x2, y2] = values[..] else {
        return Err(format!("expected four values, got {}", values.len()));
    };

    let mut selection = RegionSelection::new();
    selection.press(x1, y1);
    selection.release(x2, y2);
    selection
        .finish(width, height)
        .map(Some)
        .map_err(|e| e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_answer_cancels() {
        assert_eq!(parse_answer("  \n", 100, 100), Ok(None));
    }

    #[test]
    fn corners_in_either_order() {
        let expected = CropRegion::from_corners((10, 5), (50, 40));
        assert_eq!(parse_answer("50,40,10,5", 100, 100), Ok(Some(expected)));
        assert_eq!(parse_answer(" 10, 5, 50, 40 ", 100, 100), Ok(Some(expected)));
    }

    #[test]
    fn malformed_answers_are_rejected() {
        assert!(parse_answer("1,2,3", 100, 100).is_err());
        assert!(parse_answer("a,b,c,d", 100, 100).is_err());
        assert!(parse_answer("-1,0,5,5", 100, 100).is_err());
    }

    #[test]
    fn degenerate_or_outside_regions_are_rejected() {
        assert!(parse_answer("5,5,5,20", 100, 100).is_err());
        assert!(parse_answer("0,0,150,20", 100, 100).is_err());
    }
}
