// ============================================================================
// vidocr-cli/src/logging.rs
// ============================================================================
//
// LOGGING UTILITIES: Helper Functions for Logging
//
// The run log itself is configured by vidocr-core's log4rs setup; this
// module only names the files it writes to.
//
// AI-ASSISTANT-INFO: Logging utilities and helper functions

use std::path::{Path, PathBuf};

/// Returns the current local timestamp formatted as "YYYYMMDD_HHMMSS".
///
/// # Example
/// ```
/// let log_filename = format!("vidocr_run_{}.log", vidocr::logging::get_timestamp());
/// assert!(log_filename.starts_with("vidocr_run_"));
/// ```
pub fn get_timestamp() -> String {
    chrono::Local::now().format("%Y%m%d_%H%M%S").to_string()
}

/// Path of the run log inside `log_dir` for the given timestamp.
pub fn run_log_path(log_dir: &Path, timestamp: &str) -> PathBuf {
    log_dir.join(format!("vidocr_run_{timestamp}.log"))
}
