//! Progress and result reporting.
//!
//! The pipeline talks to a `Reporter`; the CLI picks a human-readable
//! terminal reporter or a newline-delimited JSON reporter. Reporting is
//! presentation only and never feeds back into the transcript.

use crate::processing::pipeline::StopReason;
use crate::utils::{format_duration, format_timecode_ms};
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use serde_json::json;
use std::io::{self, Write};
use std::sync::Mutex;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

/// Description of the run, emitted before the first frame is decoded.
#[derive(Clone, Debug)]
pub struct RunSummary {
    pub video_file: String,
    pub engine: String,
    pub language: String,
    pub fps: f64,
    pub duration_secs: f64,
    pub stride: u64,
    pub interval_secs: f64,
    pub total_samples: u64,
}

/// One processed sample.
#[derive(Clone, Debug)]
pub struct SampleProgress {
    pub current: u64,
    pub total: u64,
    pub frame_index: u64,
    pub timecode_ms: f64,
    pub text: String,
    pub confidence: f64,
}

/// End-of-extraction summary.
#[derive(Clone, Debug)]
pub struct ExtractionSummary {
    pub samples_recorded: usize,
    pub samples_planned: u64,
    pub stop_reason: StopReason,
    pub elapsed: Duration,
}

/// Kind of file written at the end of the run.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OutputKind {
    Csv,
    Json,
}

impl OutputKind {
    fn label(self) -> &'static str {
        match self {
            OutputKind::Csv => "csv",
            OutputKind::Json => "json",
        }
    }
}

/// High-level warning/error message.
#[derive(Clone, Debug)]
pub struct ReporterError {
    pub title: String,
    pub message: String,
    pub context: Option<String>,
    pub suggestion: Option<String>,
}

/// Reporter interface implemented by both human-readable and JSON reporters.
pub trait Reporter: Send + Sync {
    fn extraction_started(&self, _summary: &RunSummary) {}
    fn sample_processed(&self, _progress: &SampleProgress) {}
    fn extraction_complete(&self, _summary: &ExtractionSummary) {}
    /// The run ended with an error before anything was recorded.
    fn extraction_failed(&self, _message: &str) {}
    /// Runs `f` with any live progress display hidden, e.g. while prompting.
    fn suspend(&self, f: &mut dyn FnMut()) {
        f()
    }
    fn output_written(&self, _kind: OutputKind, _path: &str) {}
    fn warning(&self, _message: &str) {}
    fn error(&self, _error: &ReporterError) {}
}

/// No-op reporter that discards all updates.
pub struct NullReporter;

impl Reporter for NullReporter {}

// ============================================================================
// TERMINAL REPORTER
// ============================================================================

/// Human-friendly reporter with a progress bar.
pub struct TerminalReporter {
    progress: Mutex<Option<ProgressBar>>,
}

impl TerminalReporter {
    pub fn new() -> Self {
        Self {
            progress: Mutex::new(None),
        }
    }

    fn finish_progress(&self) {
        if let Ok(mut guard) = self.progress.lock() {
            if let Some(pb) = guard.take() {
                pb.finish_and_clear();
            }
        }
    }

    /// Prints through the bar when one is active so output is not torn.
    fn print_line(&self, line: String) {
        match self.progress.lock() {
            Ok(guard) if guard.is_some() => {
                if let Some(pb) = guard.as_ref() {
                    pb.println(line);
                }
            }
            _ => println!("{line}"),
        }
    }
}

impl Default for TerminalReporter {
    fn default() -> Self {
        Self::new()
    }
}

impl Reporter for TerminalReporter {
    fn extraction_started(&self, summary: &RunSummary) {
        println!("\n{}", style("VIDEO").bold().cyan());
        println!("  {:<10} {}", style("File:").bold(), summary.video_file);
        println!(
            "  {:<10} {:.3} fps, {} ({:.1}s)",
            style("Stream:").bold(),
            summary.fps,
            format_duration(summary.duration_secs),
            summary.duration_secs
        );

        println!("\n{}", style("OCR").bold().cyan());
        println!(
            "  {:<10} {} ({})",
            style("Engine:").bold(),
            summary.engine,
            summary.language
        );
        println!(
            "  {:<10} every {} frames (every {:.2}s), {} frames to process",
            style("Sampling:").bold(),
            summary.stride,
            summary.interval_secs,
            summary.total_samples
        );

        self.finish_progress();
        let pb = ProgressBar::new(summary.total_samples);
        if let Ok(bar_style) = ProgressStyle::default_bar()
            .template("OCR [{bar:40}] {pos}/{len} | {msg}")
        {
            pb.set_style(bar_style.progress_chars("=> "));
        }
        pb.enable_steady_tick(Duration::from_millis(120));
        if let Ok(mut guard) = self.progress.lock() {
            *guard = Some(pb);
        }
    }

    fn sample_processed(&self, progress: &SampleProgress) {
        if let Ok(guard) = self.progress.lock() {
            if let Some(pb) = guard.as_ref() {
                pb.set_position(progress.current.min(progress.total));
                let text = if progress.text.is_empty() {
                    style("-").dim().to_string()
                } else {
                    progress.text.replace('\n', " ")
                };
                pb.set_message(format!(
                    "frame {} @ {}: {}",
                    progress.frame_index,
                    format_timecode_ms(progress.timecode_ms),
                    text
                ));
            }
        }
    }

    fn extraction_complete(&self, summary: &ExtractionSummary) {
        self.finish_progress();
        println!("\n{}", style("RESULTS").bold().cyan());
        let status = match &summary.stop_reason {
            StopReason::Completed => style("completed".to_string()).green(),
            StopReason::EndOfStream { frame_index } => {
                style(format!("stream ended early at frame {frame_index}")).yellow()
            }
            StopReason::Aborted => style("aborted".to_string()).yellow(),
            StopReason::Failed(message) => style(format!("stopped: {message}")).red(),
        };
        println!("  {:<10} {}", style("Status:").bold(), status);
        println!(
            "  {:<10} {} of {} frames",
            style("Samples:").bold(),
            summary.samples_recorded,
            summary.samples_planned
        );
        println!(
            "  {:<10} {}",
            style("Time:").bold(),
            format_duration(summary.elapsed.as_secs_f64())
        );
    }

    fn extraction_failed(&self, _message: &str) {
        self.finish_progress();
    }

    fn suspend(&self, f: &mut dyn FnMut()) {
        let bar = self.progress.lock().ok().and_then(|guard| guard.clone());
        match bar {
            Some(pb) => pb.suspend(f),
            None => f(),
        }
    }

    fn output_written(&self, kind: OutputKind, path: &str) {
        println!(
            "  {} {} {}",
            style("Saved").bold(),
            kind.label(),
            style(path).green()
        );
    }

    fn warning(&self, message: &str) {
        self.print_line(style(format!("WARN: {message}")).yellow().bold().to_string());
    }

    fn error(&self, error: &ReporterError) {
        self.finish_progress();
        eprintln!(
            "\n{} {}",
            style("ERROR").red().bold(),
            style(&error.title).red().bold()
        );
        eprintln!("  {}", error.message);
        if let Some(ctx) = &error.context {
            eprintln!("  Context: {ctx}");
        }
        if let Some(suggestion) = &error.suggestion {
            eprintln!("  Suggestion: {suggestion}");
        }
    }
}

// ============================================================================
// JSON REPORTER
// ============================================================================

/// Reporter emitting one JSON object per line.
pub struct JsonReporter {
    writer: Mutex<Box<dyn Write + Send>>,
}

impl JsonReporter {
    pub fn new() -> Self {
        Self::with_writer(Box::new(io::stdout()))
    }

    pub fn with_writer(writer: Box<dyn Write + Send>) -> Self {
        Self {
            writer: Mutex::new(writer),
        }
    }

    fn timestamp() -> u64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_secs()
    }

    fn write_value(&self, value: serde_json::Value) {
        if let Ok(mut writer) = self.writer.lock() {
            let _ = writeln!(writer, "{value}");
            let _ = writer.flush();
        }
    }
}

impl Default for JsonReporter {
    fn default() -> Self {
        Self::new()
    }
}

impl Reporter for JsonReporter {
    fn extraction_started(&self, summary: &RunSummary) {
        self.write_value(json!({
            "type": "extraction_started",
            "video_file": summary.video_file,
            "engine": summary.engine,
            "language": summary.language,
            "fps": summary.fps,
            "duration_seconds": summary.duration_secs,
            "frame_stride": summary.stride,
            "interval_seconds": summary.interval_secs,
            "total_samples": summary.total_samples,
            "timestamp": Self::timestamp(),
        }));
    }

    fn sample_processed(&self, progress: &SampleProgress) {
        let percent = if progress.total > 0 {
            progress.current as f64 / progress.total as f64 * 100.0
        } else {
            100.0
        };
        self.write_value(json!({
            "type": "sample",
            "current": progress.current,
            "total": progress.total,
            "percent": percent,
            "frame_number": progress.frame_index,
            "timecode_ms": progress.timecode_ms,
            "ocr_text": progress.text,
            "ocr_confidence": progress.confidence,
            "timestamp": Self::timestamp(),
        }));
    }

    fn extraction_complete(&self, summary: &ExtractionSummary) {
        self.write_value(json!({
            "type": "extraction_complete",
            "status": summary.stop_reason.label(),
            "detail": summary.stop_reason.to_string(),
            "samples_recorded": summary.samples_recorded,
            "samples_planned": summary.samples_planned,
            "duration_seconds": summary.elapsed.as_secs_f64(),
            "timestamp": Self::timestamp(),
        }));
    }

    fn extraction_failed(&self, message: &str) {
        self.write_value(json!({
            "type": "extraction_failed",
            "message": message,
            "timestamp": Self::timestamp(),
        }));
    }

    fn output_written(&self, kind: OutputKind, path: &str) {
        self.write_value(json!({
            "type": "output_written",
            "format": kind.label(),
            "path": path,
            "timestamp": Self::timestamp(),
        }));
    }

    fn warning(&self, message: &str) {
        self.write_value(json!({
            "type": "warning",
            "message": message,
            "timestamp": Self::timestamp(),
        }));
    }

    fn error(&self, error: &ReporterError) {
        self.write_value(json!({
            "type": "error",
            "title": error.title,
            "message": error.message,
            "context": error.context,
            "suggestion": error.suggestion,
            "timestamp": Self::timestamp(),
        }));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    /// Shared buffer so the test can read what the reporter wrote.
    #[derive(Clone, Default)]
    struct SharedBuf(Arc<Mutex<Vec<u8>>>);

    impl Write for SharedBuf {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    fn lines(buf: &SharedBuf) -> Vec<serde_json::Value> {
        let bytes = buf.0.lock().unwrap().clone();
        String::from_utf8(bytes)
            .unwrap()
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect()
    }

    #[test]
    fn test_json_reporter_sample_event() {
        let buf = SharedBuf::default();
        let reporter = JsonReporter::with_writer(Box::new(buf.clone()));
        reporter.sample_processed(&SampleProgress {
            current: 1,
            total: 4,
            frame_index: 10,
            timecode_ms: 400.0,
            text: "12".to_string(),
            confidence: 0.5,
        });
        let events = lines(&buf);
        assert_eq!(events.len(), 1);
        assert_eq!(events[0]["type"], "sample");
        assert_eq!(events[0]["frame_number"], 10);
        assert_eq!(events[0]["percent"], 25.0);
    }

    #[test]
    fn test_terminal_suspend_runs_prompt_once() {
        let reporter = TerminalReporter::new();
        let mut calls = 0;
        reporter.suspend(&mut || calls += 1);

        *reporter.progress.lock().unwrap() = Some(ProgressBar::hidden());
        reporter.suspend(&mut || calls += 1);
        assert_eq!(calls, 2);
    }

    #[test]
    fn test_terminal_failure_clears_bar() {
        let reporter = TerminalReporter::new();
        *reporter.progress.lock().unwrap() = Some(ProgressBar::hidden());
        reporter.extraction_failed("crop region outside frame");
        assert!(reporter.progress.lock().unwrap().is_none());
    }

    #[test]
    fn test_json_reporter_failure_event() {
        let buf = SharedBuf::default();
        let reporter = JsonReporter::with_writer(Box::new(buf.clone()));
        reporter.extraction_failed("crop selection cancelled");
        let events = lines(&buf);
        assert_eq!(events[0]["type"], "extraction_failed");
        assert_eq!(events[0]["message"], "crop selection cancelled");
    }

    #[test]
    fn test_json_reporter_completion_status() {
        let buf = SharedBuf::default();
        let reporter = JsonReporter::with_writer(Box::new(buf.clone()));
        reporter.extraction_complete(&ExtractionSummary {
            samples_recorded: 5,
            samples_planned: 9,
            stop_reason: StopReason::EndOfStream { frame_index: 60 },
            elapsed: Duration::from_millis(1500),
        });
        let events = lines(&buf);
        assert_eq!(events[0]["status"], "end_of_stream");
        assert_eq!(events[0]["samples_recorded"], 5);
    }
}
