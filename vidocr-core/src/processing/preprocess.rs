// ============================================================================
// vidocr-core/src/processing/preprocess.rs
// ============================================================================
//
// FRAME PREPROCESSING: Rotation and Region-of-Interest Cropping
//
// Pure image transforms applied to each decoded frame before recognition.
// Rotation always happens first so that crop coordinates refer to the image
// the user actually sees when selecting a region.
//
// AI-ASSISTANT-INFO: Pure frame transforms (rotate 90 cw, crop)

use crate::error::{CoreError, CoreResult};
use image::RgbImage;
use image::imageops;
use std::fmt;

/// Axis-aligned pixel rectangle, half-open: columns `x0..x1`, rows `y0..y1`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CropRegion {
    pub x0: u32,
    pub y0: u32,
    pub x1: u32,
    pub y1: u32,
}

impl CropRegion {
    /// Builds a region from two opposite corners given in any order.
    pub fn from_corners(a: (u32, u32), b: (u32, u32)) -> Self {
        Self {
            x0: a.0.min(b.0),
            y0: a.1.min(b.1),
            x1: a.0.max(b.0),
            y1: a.1.max(b.1),
        }
    }

    /// Builds a region from its top-left corner and size.
    pub fn from_rect(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self {
            x0: x,
            y0: y,
            x1: x.saturating_add(width),
            y1: y.saturating_add(height),
        }
    }

    pub fn width(&self) -> u32 {
        self.x1 - self.x0
    }

    pub fn height(&self) -> u32 {
        self.y1 - self.y0
    }

    pub fn is_empty(&self) -> bool {
        self.width() == 0 || self.height() == 0
    }

    /// Checks that the region has area and lies inside a `width` x `height` frame.
    pub fn validate_within(&self, width: u32, height: u32) -> CoreResult<()> {
        if self.is_empty() {
            return Err(CoreError::Config(format!(
                "crop region {self} has zero area"
            )));
        }
        if self.x1 > width || self.y1 > height {
            return Err(CoreError::Config(format!(
                "crop region {self} lies outside the {width}x{height} frame"
            )));
        }
        Ok(())
    }
}

impl fmt::Display for CropRegion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "({},{})-({},{}) [{}x{}]",
            self.x0,
            self.y0,
            self.x1,
            self.y1,
            self.width(),
            self.height()
        )
    }
}

/// Rotates the frame 90 degrees clockwise when requested.
pub fn rotate(frame: &RgbImage, rotate_90_clockwise: bool) -> RgbImage {
    if rotate_90_clockwise {
        imageops::rotate90(frame)
    } else {
        frame.clone()
    }
}

/// Clips the frame to `region` after validating it against the frame size.
pub fn crop(frame: &RgbImage, region: &CropRegion) -> CoreResult<RgbImage> {
    region.validate_within(frame.width(), frame.height())?;
    Ok(imageops::crop_imm(frame, region.x0, region.y0, region.width(), region.height()).to_image())
}

/// Full preprocessing step: rotation, then the optional crop.
pub fn preprocess(
    frame: &RgbImage,
    rotate_90_clockwise: bool,
    region: Option<&CropRegion>,
) -> CoreResult<RgbImage> {
    let rotated = rotate(frame, rotate_90_clockwise);
    match region {
        Some(region) => crop(&rotated, region),
        None => Ok(rotated),
    }
}
