// ============================================================================
// vidocr-core/src/media/mod.rs
// ============================================================================
//
// MEDIA ACCESS: Video Probing and Frame Decoding
//
// KEY COMPONENTS:
// - FrameSource: indexable frame decoder consumed by the extraction pipeline
// - VideoInfo: frame rate and frame count reported by ffprobe
// - SidecarFrameSource: ffmpeg-backed decoder delivering only sampled frames
//
// AI-ASSISTANT-INFO: Video probing and frame decoding abstractions

pub mod decoder;
pub mod probe;

pub use decoder::SidecarFrameSource;
pub use probe::{VideoInfo, probe_video};

use crate::error::CoreResult;
use image::RgbImage;

/// A video opened for frame-by-frame reading.
///
/// The source is released when dropped. Implementations must free any
/// decoder process or file handle in `Drop` so that every exit path of the
/// pipeline releases it exactly once.
pub trait FrameSource {
    /// Nominal frame rate in frames per second.
    fn fps(&self) -> f64;

    /// Total frame count reported by the container.
    fn total_frames(&self) -> u64;

    /// Decodes the frame at `index`.
    ///
    /// `Ok(None)` means the stream ended before `index`; `Err` means the frame
    /// could not be decoded. Callers request indices in increasing order.
    fn read_frame(&mut self, index: u64) -> CoreResult<Option<RgbImage>>;

    /// Playback position in milliseconds of the most recently decoded frame.
    fn position_ms(&self) -> f64;
}
