//! Utility functions for formatting and file names.

use crate::error::{CoreError, CoreResult};
use std::path::Path;

/// Formats seconds as HH:MM:SS (e.g., 3725.0 -> "01:02:05"). Returns "??:??:??" for invalid inputs.
#[must_use]
pub fn format_duration(seconds: f64) -> String {
    if seconds < 0.0 || !seconds.is_finite() {
        return "??:??:??".to_string();
    }

    let total_seconds = seconds as u64;
    let hours = total_seconds / 3600;
    let minutes = (total_seconds % 3600) / 60;
    let secs = total_seconds % 60;
    format!("{hours:02}:{minutes:02}:{secs:02}")
}

/// Formats a millisecond position as HH:MM:SS.mmm; negative input clamps to zero.
#[must_use]
pub fn format_timecode_ms(ms: f64) -> String {
    let total_ms = if ms.is_finite() { ms.max(0.0).round() as u64 } else { 0 };
    let secs = total_ms / 1000;
    format!(
        "{:02}:{:02}:{:02}.{:03}",
        secs / 3600,
        (secs % 3600) / 60,
        secs % 60,
        total_ms % 1000
    )
}

/// Final path component as a UTF-8 string.
pub fn get_filename_safe(path: &Path) -> CoreResult<String> {
    path.file_name()
        .and_then(|name| name.to_str())
        .map(str::to_string)
        .ok_or_else(|| CoreError::PathError(format!("Invalid filename in {}", path.display())))
}

/// File name without its extension as a UTF-8 string.
pub fn get_file_stem(path: &Path) -> CoreResult<String> {
    path.file_stem()
        .and_then(|stem| stem.to_str())
        .map(str::to_string)
        .ok_or_else(|| CoreError::PathError(format!("Invalid file stem in {}", path.display())))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(3725.0), "01:02:05");
        assert_eq!(format_duration(0.4), "00:00:00");
        assert_eq!(format_duration(-1.0), "??:??:??");
        assert_eq!(format_duration(f64::NAN), "??:??:??");
    }

    #[test]
    fn test_format_timecode_ms() {
        assert_eq!(format_timecode_ms(3_725_042.0), "01:02:05.042");
        assert_eq!(format_timecode_ms(400.0), "00:00:00.400");
        assert_eq!(format_timecode_ms(-5.0), "00:00:00.000");
    }

    #[test]
    fn test_file_name_helpers() {
        let path = Path::new("/videos/run 3/dash.cam.mp4");
        assert_eq!(get_filename_safe(path).unwrap(), "dash.cam.mp4");
        assert_eq!(get_file_stem(path).unwrap(), "dash.cam");
        assert!(get_filename_safe(Path::new("/")).is_err());
    }
}
