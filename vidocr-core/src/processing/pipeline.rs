// ============================================================================
// vidocr-core/src/processing/pipeline.rs
// ============================================================================
//
// EXTRACTION PIPELINE: Sampled Frames to Ordered Transcript
//
// Walks the sampling grid (`stride, 2*stride, ...` below the frame count),
// decoding, preprocessing and recognizing one frame at a time. Each sample
// produces exactly one transcript entry, in increasing frame order.
//
// TERMINATION:
// - Completed: every grid index was processed
// - EndOfStream: the decoder ran out of frames or failed to decode one
// - Aborted: the external abort flag was raised between samples
// - Failed: a configuration problem surfaced after entries were recorded
//
// The frame source is owned by the pipeline and dropped before returning on
// every path, which releases the decoder.
//
// AI-ASSISTANT-INFO: Core sampling and OCR extraction loop

// ---- Internal crate imports ----
use crate::config::{CropSpec, SampleConfig};
use crate::error::{CoreError, CoreResult};
use crate::media::FrameSource;
use crate::ocr::OcrBackend;
use crate::preview::PreviewSink;
use crate::processing::preprocess::{self, CropRegion};
use crate::processing::selection::{SamplingPlan, select_best};
use crate::processing::whitelist::Whitelist;
use crate::region::RegionSelector;
use crate::reporting::{ExtractionSummary, Reporter, RunSummary, SampleProgress};
use crate::transcript::{RunMetadata, Transcript, TranscriptEntry};

// ---- Standard library imports ----
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

// ============================================================================
// TYPES
// ============================================================================

/// Why the sampling loop stopped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StopReason {
    Completed,
    /// Decoding stopped before reaching `frame_index`.
    EndOfStream { frame_index: u64 },
    Aborted,
    Failed(String),
}

impl StopReason {
    /// Stable machine-readable name.
    pub fn label(&self) -> &'static str {
        match self {
            StopReason::Completed => "completed",
            StopReason::EndOfStream { .. } => "end_of_stream",
            StopReason::Aborted => "aborted",
            StopReason::Failed(_) => "failed",
        }
    }
}

impl fmt::Display for StopReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StopReason::Completed => write!(f, "all sampled frames processed"),
            StopReason::EndOfStream { frame_index } => {
                write!(f, "no decodable frame at index {frame_index}")
            }
            StopReason::Aborted => write!(f, "aborted by request"),
            StopReason::Failed(message) => write!(f, "{message}"),
        }
    }
}

/// Collaborators injected into one extraction run.
pub struct ExtractionContext<'a> {
    pub backend: &'a dyn OcrBackend,
    pub reporter: &'a dyn Reporter,
    pub region_selector: Option<&'a mut dyn RegionSelector>,
    pub preview: Option<&'a mut dyn PreviewSink>,
    pub abort: Option<&'a AtomicBool>,
}

impl<'a> ExtractionContext<'a> {
    pub fn new(backend: &'a dyn OcrBackend, reporter: &'a dyn Reporter) -> Self {
        Self {
            backend,
            reporter,
            region_selector: None,
            preview: None,
            abort: None,
        }
    }

    pub fn with_region_selector(mut self, selector: &'a mut dyn RegionSelector) -> Self {
        self.region_selector = Some(selector);
        self
    }

    pub fn with_preview(mut self, preview: &'a mut dyn PreviewSink) -> Self {
        self.preview = Some(preview);
        self
    }

    pub fn with_abort_flag(mut self, abort: &'a AtomicBool) -> Self {
        self.abort = Some(abort);
        self
    }
}

/// Transcript and termination details of a run.
#[derive(Debug)]
pub struct ExtractionOutcome {
    pub transcript: Transcript,
    pub stop_reason: StopReason,
    pub samples_planned: u64,
    pub elapsed: Duration,
}

// ============================================================================
// PIPELINE
// ============================================================================

/// Runs the sampling loop over `source` and returns the transcript.
///
/// `Err` is only returned for configuration problems detected before any
/// entry was recorded; later problems end the run with the partial
/// transcript so it can still be written.
pub fn extract_transcript<S: FrameSource>(
    mut source: S,
    source_name: &str,
    config: &SampleConfig,
    mut ctx: ExtractionContext<'_>,
) -> CoreResult<ExtractionOutcome> {
    config.validate()?;
    if config.crop == CropSpec::Interactive && ctx.region_selector.is_none() {
        return Err(CoreError::Config(
            "interactive cropping requested but no region selector is available".to_string(),
        ));
    }

    let started = Instant::now();
    let fps = source.fps();
    let plan = SamplingPlan::new(source.total_frames(), config.frame_stride);
    let whitelist = Whitelist::new(&config.character_whitelist);
    let native_allowlist = (ctx.backend.supports_allowlist() && !whitelist.is_empty())
        .then(|| whitelist.as_str());

    log::info!(
        "Processing OCR every {} frames (every {:.2}s), with {} frames to process from {}",
        plan.stride,
        plan.interval_secs(fps),
        plan.sample_count(),
        source_name
    );
    ctx.reporter.extraction_started(&RunSummary {
        video_file: source_name.to_string(),
        engine: ctx.backend.name().to_string(),
        language: config.language.clone(),
        fps,
        duration_secs: if fps > 0.0 { plan.total_frames as f64 / fps } else { 0.0 },
        stride: plan.stride,
        interval_secs: plan.interval_secs(fps),
        total_samples: plan.sample_count(),
    });

    let mut transcript = Transcript::new(RunMetadata::new(
        source_name,
        &config.language,
        config.frame_stride,
        whitelist.as_str(),
    ));
    let mut crop: Option<CropRegion> = match config.crop {
        CropSpec::Fixed(region) => Some(region),
        CropSpec::None | CropSpec::Interactive => None,
    };
    let mut stop_reason = StopReason::Completed;

    for frame_index in plan.indices() {
        if ctx.abort.is_some_and(|flag| flag.load(Ordering::SeqCst)) {
            log::info!("Abort requested before frame {frame_index}");
            stop_reason = StopReason::Aborted;
            break;
        }

        let frame = match source.read_frame(frame_index) {
            Ok(Some(frame)) => frame,
            Ok(None) => {
                log::info!("Video stream ended before frame {frame_index}");
                stop_reason = StopReason::EndOfStream { frame_index };
                break;
            }
            Err(e) => {
                log::warn!("Stopping at frame {frame_index}: {e}");
                ctx.reporter
                    .warning(&format!("Decoding stopped at frame {frame_index}: {e}"));
                stop_reason = StopReason::EndOfStream { frame_index };
                break;
            }
        };
        let timecode_ms = source.position_ms();

        if crop.is_none() && config.crop == CropSpec::Interactive {
            if let Some(selector) = ctx.region_selector.as_deref_mut() {
                let reference = preprocess::rotate(&frame, config.rotate_90_clockwise);
                let mut selected = None;
                ctx.reporter
                    .suspend(&mut || selected = Some(selector.select_region(&reference)));
                let selected = selected.unwrap_or_else(|| {
                    Err(CoreError::Config("region selection did not run".to_string()))
                });
                match selected {
                    Ok(region) => {
                        log::info!("Using crop region {region}");
                        crop = Some(region);
                    }
                    Err(e) => {
                        stop_reason = fail_or_stop(&transcript, ctx.reporter, e)?;
                        break;
                    }
                }
            }
        }

        let image = match preprocess::preprocess(&frame, config.rotate_90_clockwise, crop.as_ref()) {
            Ok(image) => image,
            Err(e) => {
                stop_reason = fail_or_stop(&transcript, ctx.reporter, e)?;
                break;
            }
        };

        let mut candidates = match ctx
            .backend
            .recognize(&image, &config.language, native_allowlist)
        {
            Ok(candidates) => candidates,
            Err(e) => {
                log::warn!("OCR failed on frame {frame_index}: {e}");
                Vec::new()
            }
        };
        for candidate in &mut candidates {
            candidate.text = whitelist.filter(&candidate.text);
        }
        let best = select_best(&candidates);

        if let Some(preview) = ctx.preview.as_deref_mut() {
            if let Err(e) = preview.show(&image, best) {
                log::warn!("Preview failed on frame {frame_index}: {e}");
            }
        }

        let entry = TranscriptEntry::from_candidate(frame_index, timecode_ms, best);
        log::debug!(
            "Frame {} @ {:.1}ms: '{}' ({:.3})",
            entry.frame_index,
            entry.timecode_ms,
            entry.text,
            entry.confidence
        );
        let progress = SampleProgress {
            current: transcript.len() as u64 + 1,
            total: plan.sample_count(),
            frame_index,
            timecode_ms,
            text: entry.text.clone(),
            confidence: entry.confidence,
        };
        transcript.push(entry);
        ctx.reporter.sample_processed(&progress);
    }

    drop(source);

    let elapsed = started.elapsed();
    log::info!(
        "Extraction finished ({}): {} of {} samples in {:.1}s",
        stop_reason.label(),
        transcript.len(),
        plan.sample_count(),
        elapsed.as_secs_f64()
    );
    ctx.reporter.extraction_complete(&ExtractionSummary {
        samples_recorded: transcript.len(),
        samples_planned: plan.sample_count(),
        stop_reason: stop_reason.clone(),
        elapsed,
    });

    Ok(ExtractionOutcome {
        transcript,
        stop_reason,
        samples_planned: plan.sample_count(),
        elapsed,
    })
}

/// Configuration errors are fatal until the first entry exists; afterwards
/// they end the run so the partial transcript can be flushed.
fn fail_or_stop(
    transcript: &Transcript,
    reporter: &dyn Reporter,
    err: CoreError,
) -> CoreResult<StopReason> {
    if transcript.is_empty() {
        log::error!("{err}");
        reporter.extraction_failed(&err.to_string());
        Err(err)
    } else {
        log::error!("Stopping after {} samples: {err}", transcript.len());
        Ok(StopReason::Failed(err.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reporting::NullReporter;

    #[test]
    fn test_stop_reason_labels() {
        assert_eq!(StopReason::Completed.label(), "completed");
        assert_eq!(StopReason::EndOfStream { frame_index: 60 }.label(), "end_of_stream");
        assert_eq!(StopReason::Aborted.label(), "aborted");
        assert_eq!(StopReason::Failed("x".into()).label(), "failed");
        assert!(
            StopReason::EndOfStream { frame_index: 60 }
                .to_string()
                .contains("60")
        );
    }

    #[test]
    fn test_fail_or_stop_depends_on_progress() {
        let mut transcript = Transcript::new(RunMetadata::new("clip.mp4", "en", 10, ""));
        let err = || CoreError::Config("crop region outside frame".into());
        assert!(fail_or_stop(&transcript, &NullReporter, err()).is_err());

        transcript.push(TranscriptEntry::miss(10, 400.0));
        let reason = fail_or_stop(&transcript, &NullReporter, err()).unwrap();
        assert!(matches!(reason, StopReason::Failed(ref m) if m.contains("outside")));
    }
}
