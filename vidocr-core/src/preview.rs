//! Optional per-frame preview output.
//!
//! A preview sink sees every processed frame together with the candidate
//! chosen for it. It is a side channel only; failures are logged by the
//! pipeline and never affect the transcript.

use crate::error::{CoreError, CoreResult};
use crate::ocr::OcrCandidate;
use image::{Rgb, RgbImage};
use imageproc::drawing::draw_hollow_rect_mut;
use imageproc::rect::Rect;
use std::path::{Path, PathBuf};

const BOX_COLOR: Rgb<u8> = Rgb([255, 0, 0]);

/// Receives processed frames for display.
pub trait PreviewSink {
    fn show(&mut self, frame: &RgbImage, best: Option<&OcrCandidate>) -> CoreResult<()>;
}

/// Rewrites a single PNG with the latest frame and its selected box.
#[derive(Debug, Clone)]
pub struct ImageFilePreview {
    path: PathBuf,
}

impl ImageFilePreview {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl PreviewSink for ImageFilePreview {
    fn show(&mut self, frame: &RgbImage, best: Option<&OcrCandidate>) -> CoreResult<()> {
        let mut canvas = frame.clone();
        if let Some(bbox) = best.and_then(|c| c.bounding_box.as_ref()) {
            let (x0, y0, x1, y1) = bbox.bounds();
            draw_rectangle(&mut canvas, x0, y0, x1, y1, BOX_COLOR);
        }
        canvas
            .save_with_format(&self.path, image::ImageFormat::Png)
            .map_err(|e| CoreError::Image(self.path.display().to_string(), e.to_string()))
    }
}

/// Outlines a rectangle, clamped to the canvas.
fn draw_rectangle(canvas: &mut RgbImage, x0: f64, y0: f64, x1: f64, y1: f64, color: Rgb<u8>) {
    let (width, height) = canvas.dimensions();
    if width == 0 || height == 0 {
        return;
    }
    let clamp = |v: f64, max: u32| v.round().clamp(0.0, (max - 1) as f64) as u32;
    let (left, right) = (clamp(x0.min(x1), width), clamp(x0.max(x1), width));
    let (top, bottom) = (clamp(y0.min(y1), height), clamp(y0.max(y1), height));

    let rect = Rect::at(left as i32, top as i32).of_size(right - left + 1, bottom - top + 1);
    draw_hollow_rect_mut(canvas, rect, color);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ocr::{BoundingBox, Point};
    use tempfile::TempDir;

    #[test]
    fn test_preview_draws_box() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("preview.png");
        let mut sink = ImageFilePreview::new(&path);

        let bbox = BoundingBox {
            corners: [
                Point { x: 2.0, y: 2.0 },
                Point { x: 6.0, y: 2.0 },
                Point { x: 6.0, y: 5.0 },
                Point { x: 2.0, y: 5.0 },
            ],
        };
        let candidate = OcrCandidate::new("1", 0.9).with_bounding_box(bbox);
        sink.show(&RgbImage::new(10, 8), Some(&candidate)).unwrap();

        let written = image::open(&path).unwrap().to_rgb8();
        assert_eq!(written.get_pixel(2, 2), &BOX_COLOR);
        assert_eq!(written.get_pixel(6, 5), &BOX_COLOR);
        assert_eq!(written.get_pixel(4, 3), &Rgb([0, 0, 0]));
    }

    #[test]
    fn test_box_outside_canvas_is_clamped() {
        let mut canvas = RgbImage::new(4, 4);
        draw_rectangle(&mut canvas, -3.0, -3.0, 40.0, 40.0, BOX_COLOR);
        assert_eq!(canvas.get_pixel(3, 3), &BOX_COLOR);
        assert_eq!(canvas.get_pixel(1, 1), &Rgb([0, 0, 0]));
    }

    #[test]
    fn test_reversed_corners_draw_same_box() {
        let mut canvas = RgbImage::new(6, 6);
        draw_rectangle(&mut canvas, 4.0, 4.0, 1.0, 1.0, BOX_COLOR);
        assert_eq!(canvas.get_pixel(1, 1), &BOX_COLOR);
        assert_eq!(canvas.get_pixel(4, 1), &BOX_COLOR);
        assert_eq!(canvas.get_pixel(4, 4), &BOX_COLOR);
        assert_eq!(canvas.get_pixel(2, 2), &Rgb([0, 0, 0]));
        assert_eq!(canvas.get_pixel(5, 5), &Rgb([0, 0, 0]));
    }

    #[test]
    fn test_preview_without_candidate() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("preview.png");
        let mut sink = ImageFilePreview::new(&path);
        sink.show(&RgbImage::new(3, 3), None).unwrap();
        assert!(path.exists());
    }
}
