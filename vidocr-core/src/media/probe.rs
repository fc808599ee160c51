//! Video stream probing through the ffprobe crate.

use crate::error::{CoreError, CoreResult, command_failed_error, command_start_error};
use ffprobe::{FfProbeError, ffprobe};
use std::path::Path;

/// Stream properties needed to plan sampling.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VideoInfo {
    pub fps: f64,
    pub total_frames: u64,
    pub width: u32,
    pub height: u32,
}

impl VideoInfo {
    /// Duration in seconds derived from frame count and rate.
    pub fn duration_secs(&self) -> f64 {
        if self.fps > 0.0 {
            self.total_frames as f64 / self.fps
        } else {
            0.0
        }
    }
}

/// Probes the first video stream of `input_path`.
///
/// The frame count comes from `nb_frames` when the container records it and
/// is otherwise estimated from the duration and frame rate.
pub fn probe_video(input_path: &Path) -> CoreResult<VideoInfo> {
    log::debug!(
        "Running ffprobe (via crate) for video info on: {}",
        input_path.display()
    );
    let metadata = ffprobe(input_path).map_err(|e| map_ffprobe_error(e, "video info"))?;

    let stream = metadata
        .streams
        .iter()
        .find(|s| s.codec_type.as_deref() == Some("video"))
        .ok_or_else(|| {
            CoreError::VideoInfoError(format!("No video stream found in {}", input_path.display()))
        })?;

    let fps = parse_frame_rate(&stream.avg_frame_rate)
        .filter(|r| *r > 0.0)
        .or_else(|| parse_frame_rate(&stream.r_frame_rate).filter(|r| *r > 0.0))
        .ok_or_else(|| {
            CoreError::FfprobeParse(format!(
                "Unusable frame rate '{}' for {}",
                stream.r_frame_rate,
                input_path.display()
            ))
        })?;

    let duration = stream
        .duration
        .as_deref()
        .or(metadata.format.duration.as_deref())
        .and_then(|d| d.parse::<f64>().ok());

    let total_frames = stream
        .nb_frames
        .as_deref()
        .and_then(|f| f.parse::<u64>().ok())
        .filter(|f| *f > 0)
        .or_else(|| duration.map(|d| (d * fps).round() as u64))
        .ok_or_else(|| {
            CoreError::VideoInfoError(format!(
                "Cannot determine frame count for {}",
                input_path.display()
            ))
        })?;

    let width = stream.width.unwrap_or(0).max(0) as u32;
    let height = stream.height.unwrap_or(0).max(0) as u32;

    log::debug!(
        "Probed {}: {:.3} fps, {} frames, {}x{}",
        input_path.display(),
        fps,
        total_frames,
        width,
        height
    );

    Ok(VideoInfo {
        fps,
        total_frames,
        width,
        height,
    })
}

/// Parses ffprobe rates such as `30000/1001` or `25`.
pub fn parse_frame_rate(rate: &str) -> Option<f64> {
    match rate.split_once('/') {
        Some((num, den)) => {
            let num: f64 = num.trim().parse().ok()?;
            let den: f64 = den.trim().parse().ok()?;
            (den != 0.0).then(|| num / den)
        }
        None => rate.trim().parse().ok(),
    }
}

fn map_ffprobe_error(err: FfProbeError, context: &str) -> CoreError {
    match err {
        FfProbeError::Io(io_err) => command_start_error(format!("ffprobe ({context})"), io_err),
        FfProbeError::Status(output) => {
            let stderr = String::from_utf8_lossy(&output.stderr).into_owned();
            command_failed_error(format!("ffprobe ({context})"), output.status, stderr)
        }
        FfProbeError::Deserialize(err) => {
            CoreError::JsonParseError(format!("ffprobe {context} output deserialization: {err}"))
        }
        _ => CoreError::FfprobeParse(format!("Unknown ffprobe error during {context}: {err:?}")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frame_rate_parsing() {
        assert_eq!(parse_frame_rate("30"), Some(30.0));
        assert_eq!(parse_frame_rate("29.97"), Some(29.97));
        assert_eq!(parse_frame_rate("30000/1001"), Some(30000.0 / 1001.0));
        assert_eq!(parse_frame_rate("25/1"), Some(25.0));
        assert_eq!(parse_frame_rate("0/0"), None);
        assert_eq!(parse_frame_rate("invalid"), None);
    }

    #[test]
    fn test_duration_from_info() {
        let info = VideoInfo {
            fps: 25.0,
            total_frames: 100,
            width: 640,
            height: 480,
        };
        assert!((info.duration_secs() - 4.0).abs() < f64::EPSILON);
    }
}
