// ============================================================================
// vidocr-cli/src/commands/extract.rs
// ============================================================================
//
// EXTRACT COMMAND: Runs one transcript extraction from the parsed CLI args
//
// Builds the sampling configuration, opens the video through ffmpeg, runs the extraction pipeline and writes the CSV and
// optional JSON transcript. Interactive cropping and previews are wired in
// here because they need terminal and file-system context the core does not
// own.
//
// AI-ASSISTANT-INFO: Extract command handler

// ---- Internal crate imports ----
use crate::cli::Cli;
use crate::error::CliResult;
use crate::output_path::OutputPaths;
use crate::region_prompt::PromptRegionSelector;

// ---- External crate imports ----
use vidocr_core::preview::ImageFilePreview;
use vidocr_core::reporting::{OutputKind, Reporter, ReporterError};
use vidocr_core::transcript::write_outputs;
use vidocr_core::utils::get_filename_safe;
use vidocr_core::{
    CoreResult, CropSpec, ExtractionContext, SidecarFrameSource, StopReason, create_backend,
    extract_transcript,
};

// ---- Standard library imports ----
use std::path::Path;
use std::sync::atomic::AtomicBool;

/// Overall result of a run that got far enough to write output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunStatus {
    /// Every planned frame was processed, or the stream ended early.
    Success,
    /// Processing stopped on an error or an output file could not be written.
    Incomplete,
    /// The user interrupted the run.
    Aborted,
}

impl RunStatus {
    pub fn exit_code(self) -> u8 {
        match self {
            RunStatus::Success => 0,
            RunStatus::Incomplete => 1,
            RunStatus::Aborted => 130,
        }
    }

    fn from_run(stop_reason: &StopReason, outputs_written: bool) -> Self {
        match stop_reason {
            StopReason::Aborted => RunStatus::Aborted,
            StopReason::Failed(_) => RunStatus::Incomplete,
            StopReason::Completed | StopReason::EndOfStream { .. } if outputs_written => {
                RunStatus::Success
            }
            StopReason::Completed | StopReason::EndOfStream { .. } => RunStatus::Incomplete,
        }
    }
}

/// Runs the extraction described by `args`, writing into `paths`.
///
/// The caller checks the external tools first. Configuration problems
/// (unreadable video, invalid crop) are returned as errors; anything later still writes the partial
/// transcript and is reflected in the returned status.
pub fn run_extract(
    args: &Cli,
    paths: &OutputPaths,
    reporter: &dyn Reporter,
    abort: &AtomicBool,
) -> CliResult<RunStatus> {
    let config = args.sample_config();
    config.validate()?;

    let ocr_command = args.resolved_ocr_command();
    let backend = create_backend(args.engine, Some(ocr_command.as_path()));

    let source_name = get_filename_safe(&args.video)?;
    let source = SidecarFrameSource::open(&args.video, config.frame_stride)?;
    let info = source.info();
    log::info!(
        "Video: {}x{} at {:.3} fps, {} frames ({:.1}s)",
        info.width,
        info.height,
        info.fps,
        info.total_frames,
        info.duration_secs()
    );
    log::info!(
        "Extracting {} with {} ({}), every {} frames",
        args.video.display(),
        args.engine,
        config.language,
        config.frame_stride
    );

    let mut prompt = PromptRegionSelector::new(paths.crop_reference());
    let mut preview = ImageFilePreview::new(paths.preview());

    let mut ctx = ExtractionContext::new(backend.as_ref(), reporter).with_abort_flag(abort);
    if matches!(config.crop, CropSpec::Interactive) {
        ctx = ctx.with_region_selector(&mut prompt);
    }
    if args.preview {
        log::info!("Writing frame previews to {}", preview.path().display());
        ctx = ctx.with_preview(&mut preview);
    }

    let outcome = extract_transcript(source, &source_name, &config, ctx)?;

    let files = paths.output_files(args.json);
    let written = write_outputs(&outcome.transcript, &files);
    report_output(reporter, OutputKind::Csv, &files.csv, &written.csv);
    if let (Some(path), Some(result)) = (&files.json, &written.json) {
        report_output(reporter, OutputKind::Json, path, result);
    }

    Ok(RunStatus::from_run(&outcome.stop_reason, written.is_success()))
}

fn report_output(reporter: &dyn Reporter, kind: OutputKind, path: &Path, result: &CoreResult<()>) {
    match result {
        Ok(()) => {
            log::info!("Transcript written to {}", path.display());
            reporter.output_written(kind, &path.display().to_string());
        }
        Err(e) => {
            log::error!("Failed to write {}: {e}", path.display());
            reporter.error(&ReporterError {
                title: "Output not written".to_string(),
                message: e.to_string(),
                context: Some(path.display().to_string()),
                suggestion: Some("Check that the output directory is writable".to_string()),
            });
        }
    }
}
