//! Region-of-interest selection.
//!
//! The pipeline asks a `RegionSelector` for a rectangle exactly once, handing
//! it the first decoded (already rotated) frame as reference. Interactive
//! front ends accumulate the user's two corner points in a `RegionSelection`
//! and return the finished rectangle synchronously.

use crate::error::{CoreError, CoreResult};
use crate::processing::preprocess::CropRegion;
use image::RgbImage;

/// Supplies the crop rectangle for a run.
pub trait RegionSelector {
    /// Returns a rectangle in the pixel coordinates of `reference`.
    fn select_region(&mut self, reference: &RgbImage) -> CoreResult<CropRegion>;
}

/// Two-corner drag state for interactive selection.
///
/// `press` records the anchor corner, `release` the opposite one. The pair
/// may be dragged in any direction; `finish` normalizes it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RegionSelection {
    anchor: Option<(u32, u32)>,
    release: Option<(u32, u32)>,
}

impl RegionSelection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts (or restarts) a drag at `(x, y)`.
    pub fn press(&mut self, x: u32, y: u32) {
        self.anchor = Some((x, y));
        self.release = None;
    }

    /// Ends the current drag at `(x, y)`; ignored without a prior press.
    pub fn release(&mut self, x: u32, y: u32) {
        if self.anchor.is_some() {
            self.release = Some((x, y));
        }
    }

    pub fn is_complete(&self) -> bool {
        self.anchor.is_some() && self.release.is_some()
    }

    /// Normalized rectangle, checked against the `width` x `height` reference.
    pub fn finish(&self, width: u32, height: u32) -> CoreResult<CropRegion> {
        let (Some(anchor), Some(release)) = (self.anchor, self.release) else {
            return Err(CoreError::Config(
                "region selection ended before two corners were chosen".to_string(),
            ));
        };
        let region = CropRegion::from_corners(anchor, release);
        region.validate_within(width, height)?;
        Ok(region)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_drag_in_any_direction() {
        let mut selection = RegionSelection::new();
        selection.press(50, 40);
        selection.release(10, 5);
        assert!(selection.is_complete());
        assert_eq!(
            selection.finish(100, 100).unwrap(),
            CropRegion { x0: 10, y0: 5, x1: 50, y1: 40 }
        );
    }

    #[test]
    fn test_release_without_press_is_ignored() {
        let mut selection = RegionSelection::new();
        selection.release(3, 3);
        assert!(!selection.is_complete());
        assert!(selection.finish(10, 10).is_err());
    }

    #[test]
    fn test_new_press_restarts_drag() {
        let mut selection = RegionSelection::new();
        selection.press(1, 1);
        selection.release(5, 5);
        selection.press(2, 2);
        assert!(!selection.is_complete());
    }

    #[test]
    fn test_click_without_drag_is_rejected() {
        let mut selection = RegionSelection::new();
        selection.press(7, 7);
        selection.release(7, 7);
        assert!(selection.finish(10, 10).is_err());
    }
}
