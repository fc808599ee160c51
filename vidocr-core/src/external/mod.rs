// ============================================================================
// vidocr-core/src/external/mod.rs
// ============================================================================
//
// EXTERNAL TOOLS: Availability Checks for Required Executables
//
// vidocr drives ffmpeg, ffprobe and one OCR executable. This module verifies
// up front that they can be started, so a missing tool is reported as a
// configuration error before any video is opened.
//
// AI-ASSISTANT-INFO: Dependency checks for ffmpeg/ffprobe/OCR executables

// ---- Internal crate imports ----
use crate::config::OcrEngine;
use crate::error::{CoreError, CoreResult};

// ---- Standard library imports ----
use std::io;
use std::path::Path;
use std::process::{Command, Stdio};

// ============================================================================
// DEPENDENCY CHECKING
// ============================================================================

/// Checks that `cmd` can be started, running it with `probe_arg`.
///
/// Only the ability to start the process matters; its exit status is not
/// inspected because version/help flags exit non-zero on some builds.
///
/// # Returns
///
/// * `Ok(())` - If the command could be started
/// * `Err(CoreError::DependencyNotFound)` - If the command is not found
/// * `Err(CoreError::CommandStart)` - If the command exists but fails to start
pub fn check_dependency(cmd: &Path, probe_arg: &str) -> CoreResult<()> {
    let cmd_name = cmd.display().to_string();

    let result = Command::new(cmd)
        .arg(probe_arg)
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status();

    match result {
        Ok(_) => {
            log::debug!("Found dependency: {cmd_name}");
            Ok(())
        }
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            log::warn!("Dependency '{cmd_name}' not found.");
            Err(CoreError::DependencyNotFound(cmd_name))
        }
        Err(e) => {
            log::error!("Failed to start dependency check command '{cmd_name}': {e}");
            Err(CoreError::CommandStart(cmd_name, e))
        }
    }
}

/// Checks ffmpeg, ffprobe and the executable behind the selected OCR engine.
pub fn check_required_tools(engine: OcrEngine, ocr_command: &Path) -> CoreResult<()> {
    check_dependency(Path::new("ffmpeg"), "-version")?;
    check_dependency(Path::new("ffprobe"), "-version")?;
    let probe_arg = match engine {
        OcrEngine::Tesseract => "--version",
        OcrEngine::EasyOcr => "--help",
    };
    check_dependency(ocr_command, probe_arg)
}
