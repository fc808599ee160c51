// ============================================================================
// vidocr-core/src/error.rs
// ============================================================================
//
// ERROR HANDLING: Custom Error Types for vidocr Core
//
// This module defines the error types used throughout the vidocr-core library.
// It provides a centralized error handling mechanism with specific error
// variants for different failure scenarios.
//
// KEY COMPONENTS:
// - CoreError: Main error enum with variants for different error types
// - CoreResult: Type alias for Result<T, CoreError>
// - Helper constructors for external command failures
//
// AI-ASSISTANT-INFO: Error handling system for vidocr-core

// ---- External crate imports ----
use thiserror::Error;

// ---- Standard library imports ----
use std::io;
use std::process::ExitStatus;

// ============================================================================
// ERROR TYPES
// ============================================================================

/// Custom error type for the vidocr-core library.
#[derive(Error, Debug)]
pub enum CoreError {
    // ---- File System Errors ----
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("Path error: {0}")]
    PathError(String),

    #[error("Video file not found: {0}")]
    VideoNotFound(String),

    // ---- Configuration Errors ----
    #[error("Invalid configuration: {0}")]
    Config(String),

    // ---- External Command Errors ----
    #[error("Required external command '{0}' not found or failed to execute")]
    DependencyNotFound(String),

    #[error("Failed to execute {0}: {1}")]
    CommandStart(String, io::Error),

    #[error("Command {0} failed with status {1}. Stderr: {2}")]
    CommandFailed(String, ExitStatus, String),

    #[error("Failed waiting for {0}: {1}")]
    CommandWait(String, io::Error),

    // ---- Media Errors ----
    #[error("ffprobe output parsing error: {0}")]
    FfprobeParse(String),

    #[error("Failed to get video information: {0}")]
    VideoInfoError(String),

    #[error("Frame decoding failed: {0}")]
    Decode(String),

    // ---- OCR Errors ----
    #[error("OCR backend '{0}' produced unreadable output: {1}")]
    OcrOutput(String, String),

    // ---- Output Errors ----
    #[error("Image error for {0}: {1}")]
    Image(String, String),

    #[error("Failed to write CSV transcript {0}: {1}")]
    CsvWrite(String, String),

    #[error("Failed to write JSON transcript {0}: {1}")]
    JsonWrite(String, String),

    #[error("JSON parsing error: {0}")]
    JsonParseError(String),

    // ---- General Errors ----
    #[error("Operation failed: {0}")]
    OperationFailed(String),
}

/// Type alias for Result with CoreError as the error type.
pub type CoreResult<T> = Result<T, CoreError>;

impl CoreError {
    /// Whether this error belongs to the configuration class: fatal before any
    /// frame is recorded, never producing partial output.
    pub fn is_config_error(&self) -> bool {
        matches!(
            self,
            CoreError::Config(_)
                | CoreError::VideoNotFound(_)
                | CoreError::PathError(_)
                | CoreError::DependencyNotFound(_)
        )
    }
}

// ============================================================================
// HELPER FUNCTIONS
// ============================================================================

/// Creates a CommandStart error for a command that could not be spawned.
pub fn command_start_error(cmd: impl Into<String>, err: io::Error) -> CoreError {
    CoreError::CommandStart(cmd.into(), err)
}

/// Creates a CommandWait error for a command whose exit could not be collected.
pub fn command_wait_error(cmd: impl Into<String>, err: io::Error) -> CoreError {
    CoreError::CommandWait(cmd.into(), err)
}

/// Creates a CommandFailed error for a command that exited unsuccessfully.
pub fn command_failed_error(
    cmd: impl Into<String>,
    status: ExitStatus,
    stderr: impl Into<String>,
) -> CoreError {
    CoreError::CommandFailed(cmd.into(), status, stderr.into())
}
