//! Output path resolution for the CLI.
//!
//! Decides whether the -o argument names a directory or a transcript file
//! and derives every file the run writes from it.

use crate::error::CliResult;
use std::path::{Path, PathBuf};
use vidocr_core::CoreError;
use vidocr_core::transcript::OutputFiles;
use vidocr_core::utils::get_file_stem;

/// Resolved output locations for one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputPaths {
    /// Directory every output file is written to.
    pub output_dir: PathBuf,
    /// File name (without extension) shared by the CSV and JSON transcripts.
    pub transcript_stem: String,
    /// Stem of the input video, used for auxiliary images.
    pub video_stem: String,
}

impl OutputPaths {
    pub fn csv(&self) -> PathBuf {
        self.output_dir.join(format!("{}.csv", self.transcript_stem))
    }

    pub fn json(&self) -> PathBuf {
        self.output_dir.join(format!("{}.json", self.transcript_stem))
    }

    pub fn preview(&self) -> PathBuf {
        self.output_dir.join(format!("{}_preview.png", self.video_stem))
    }

    pub fn crop_reference(&self) -> PathBuf {
        self.output_dir
            .join(format!("{}_crop_reference.png", self.video_stem))
    }

    pub fn output_files(&self, json: bool) -> OutputFiles {
        OutputFiles {
            csv: self.csv(),
            json: json.then(|| self.json()),
        }
    }

    /// Creates the output directory if it does not exist yet.
    pub fn ensure_output_dir(&self) -> CliResult<()> {
        std::fs::create_dir_all(&self.output_dir).map_err(|e| {
            CoreError::PathError(format!(
                "Cannot create output directory {}: {}",
                self.output_dir.display(),
                e
            ))
        })
    }
}

/// Resolves the output argument for `video`.
///
/// Without `-o` the transcript lands next to the video as `<stem>_OCR.*`.
/// An existing directory or a path without an extension is treated as a
/// directory; any other path names the transcript file, whose extension is
/// replaced by `.csv` / `.json`.
pub fn resolve_output_paths(video: &Path, output: Option<&Path>) -> CliResult<OutputPaths> {
    let video_stem = get_file_stem(video)?;
    let default_stem = format!("{video_stem}_OCR");

    let (output_dir, transcript_stem) = match output {
        None => (parent_or_current(video), default_stem),
        Some(path) if path.is_dir() || path.extension().is_none() => {
            (path.to_path_buf(), default_stem)
        }
        Some(path) => (parent_or_current(path), get_file_stem(path)?),
    };

    Ok(OutputPaths {
        output_dir,
        transcript_stem,
        video_stem,
    })
}

fn parent_or_current(path: &Path) -> PathBuf {
    path.parent()
        .map(Path::to_path_buf)
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| PathBuf::from("."))
}
