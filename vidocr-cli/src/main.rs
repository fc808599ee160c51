//! Main entry point for the vidocr CLI application.
//!
//! Parses arguments, resolves output locations, sets up the run log and
//! hands over to the extract command, emitting either a terminal UI or JSON
//! progress events.

use vidocr::error::{CliErrorContext, CliResult, error_hint};
use vidocr::logging::{get_timestamp, run_log_path};
use vidocr::output_path::{OutputPaths, resolve_output_paths};
use vidocr::{Cli, RunStatus, parse_cli, run_extract};
use vidocr_core::CoreError;
use vidocr_core::external::check_required_tools;
use vidocr_core::file_logging::setup::setup_file_logging;
use vidocr_core::reporting::{JsonReporter, Reporter, TerminalReporter};

use console::style;
use log::LevelFilter;
use std::process::ExitCode;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

fn main() -> ExitCode {
    let cli_args = parse_cli();

    match run(&cli_args) {
        Ok(status) => ExitCode::from(status.exit_code()),
        Err(e) => {
            log::error!("{e}");
            eprintln!("{} {}", style("Error:").red().bold(), e);
            if let Some(hint) = error_hint(&e) {
                eprintln!("{}", style(hint).dim());
            }
            ExitCode::FAILURE
        }
    }
}

fn run(args: &Cli) -> CliResult<RunStatus> {
    // Checked before anything is created on disk
    if !args.video.is_file() {
        return Err(CoreError::VideoNotFound(args.video.display().to_string()));
    }

    let paths = resolve_output_paths(&args.video, args.output.as_deref())?;
    check_required_tools(args.engine, &args.resolved_ocr_command())?;
    paths.ensure_output_dir()?;

    if !args.no_log {
        setup_run_log(args, &paths)?;
    }

    let reporter: Box<dyn Reporter> = if args.progress_json {
        Box::new(JsonReporter::new())
    } else {
        Box::new(TerminalReporter::new())
    };

    let abort = Arc::new(AtomicBool::new(false));
    let handler_flag = Arc::clone(&abort);
    if let Err(e) = ctrlc::set_handler(move || handler_flag.store(true, Ordering::SeqCst)) {
        log::warn!("Could not install Ctrl-C handler: {e}");
    }

    run_extract(args, &paths, reporter.as_ref(), &abort)
}

fn setup_run_log(args: &Cli, paths: &OutputPaths) -> CliResult<()> {
    let log_level = if args.verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };

    let log_dir = args
        .log_dir
        .clone()
        .unwrap_or_else(|| paths.output_dir.join("logs"));
    std::fs::create_dir_all(&log_dir)
        .cli_with_context(|| format!("Failed to create log directory {}", log_dir.display()))?;

    let log_path = run_log_path(&log_dir, &get_timestamp());
    setup_file_logging(&log_path, log_level).map_err(|e| {
        CoreError::OperationFailed(format!(
            "Failed to set up file logging to {}: {}",
            log_path.display(),
            e
        ))
    })?;

    log::info!("vidocr {} starting", env!("CARGO_PKG_VERSION"));
    if log_level == LevelFilter::Debug {
        log::info!("Debug level logging enabled");
    }
    Ok(())
}
