// ============================================================================
// vidocr-core/src/media/decoder.rs
// ============================================================================
//
// FRAME DECODING: ffmpeg-backed FrameSource
//
// A single ffmpeg process decodes the video and emits only the frames on the
// sampling grid (`stride, 2*stride, ...`) as raw RGB24 on stdout. The
// `showinfo` filter reports each emitted frame's presentation time on stderr,
// which gives the decoder's actual playback position for every sample.
//
// Frames and log lines arrive on separate pipes, so both are queued and
// paired in order: the k-th emitted frame matches the k-th showinfo line.
// If timestamps stop arriving, at most a handful of frames are held before
// positions fall back to `index / fps`.
//
// AI-ASSISTANT-INFO: ffmpeg-sidecar frame decoder for sampled frames

// ---- Internal crate imports ----
use super::FrameSource;
use super::probe::{VideoInfo, probe_video};
use crate::error::{CoreError, CoreResult, command_start_error};

// ---- External crate imports ----
use ffmpeg_sidecar::child::FfmpegChild;
use ffmpeg_sidecar::command::FfmpegCommand;
use ffmpeg_sidecar::event::{FfmpegEvent, OutputVideoFrame};
use ffmpeg_sidecar::iter::FfmpegIterator;
use image::RgbImage;

// ---- Standard library imports ----
use std::collections::VecDeque;
use std::io;
use std::path::{Path, PathBuf};
use std::process::ExitStatus;

/// Frames held while waiting for their showinfo line. Past this the
/// timestamps are treated as lost and positions fall back to `index / fps`.
const MAX_FRAMES_AWAITING_TIME: usize = 4;

/// Frame source reading sampled frames from an ffmpeg child process.
pub struct SidecarFrameSource {
    path: PathBuf,
    info: VideoInfo,
    child: FfmpegChild,
    events: FfmpegIterator,
    stream: SampleStream<OutputVideoFrame>,
    position_ms: f64,
}

impl SidecarFrameSource {
    /// Probes `path` and starts decoding frames on the `stride` grid.
    pub fn open(path: &Path, stride: u64) -> CoreResult<Self> {
        if !path.is_file() {
            return Err(CoreError::VideoNotFound(path.display().to_string()));
        }
        if stride == 0 {
            return Err(CoreError::Config(
                "frame stride must be a positive number of frames".to_string(),
            ));
        }

        let info = probe_video(path)?;

        let mut cmd = FfmpegCommand::new();
        cmd.hide_banner();
        cmd.input(path.to_string_lossy().into_owned());
        cmd.args(["-an", "-sn", "-dn"]);
        cmd.args(["-vf", &sampling_filter(stride)]);
        cmd.args(["-fps_mode", "passthrough"]);
        cmd.rawvideo();
        cmd.pipe_stdout();

        log::debug!("Starting ffmpeg decoder for {} (stride {stride})", path.display());
        let mut child = cmd.spawn().map_err(|e| command_start_error("ffmpeg", e))?;
        let events = match child.iter() {
            Ok(events) => events,
            Err(e) => {
                let _ = child.kill();
                let _ = child.wait();
                return Err(CoreError::Decode(format!(
                    "cannot read ffmpeg output for {}: {e}",
                    path.display()
                )));
            }
        };

        Ok(Self {
            path: path.to_path_buf(),
            info,
            child,
            events,
            stream: SampleStream::new(stride, info.fps),
            position_ms: 0.0,
        })
    }

    /// Stream properties reported by ffprobe when the source was opened.
    pub fn info(&self) -> &VideoInfo {
        &self.info
    }

    /// Distinguishes a clean end of stream from a decoder that gave up.
    fn end_of_stream(&mut self) -> CoreResult<()> {
        let status = self.child.wait();
        exit_result(status, &self.path, self.stream.last_error())
    }
}

impl FrameSource for SidecarFrameSource {
    fn fps(&self) -> f64 {
        self.info.fps
    }

    fn total_frames(&self) -> u64 {
        self.info.total_frames
    }

    fn read_frame(&mut self, index: u64) -> CoreResult<Option<RgbImage>> {
        self.stream.check_reachable(index)?;

        let mut events = self.events.by_ref().map(DecoderEvent::<OutputVideoFrame>::from);
        match self.stream.seek(index, &mut events) {
            Some((frame, time_ms)) => {
                self.position_ms = time_ms;
                frame_to_image(frame, index).map(Some)
            }
            None => self.end_of_stream().map(|()| None),
        }
    }

    fn position_ms(&self) -> f64 {
        self.position_ms
    }
}

impl Drop for SidecarFrameSource {
    fn drop(&mut self) {
        if !self.stream.is_finished() {
            if let Err(e) = self.child.kill() {
                log::debug!("ffmpeg for {} already stopped: {e}", self.path.display());
            }
        }
        let _ = self.child.wait();
        log::debug!("Released decoder for {}", self.path.display());
    }
}

// ============================================================================
// EVENT PAIRING
// ============================================================================

/// The parts of the ffmpeg event stream the decoder cares about.
#[derive(Debug)]
enum DecoderEvent<F> {
    Frame(F),
    PtsTime(f64),
    Error(String),
    Done,
    Other,
}

impl From<FfmpegEvent> for DecoderEvent<OutputVideoFrame> {
    fn from(event: FfmpegEvent) -> Self {
        match event {
            FfmpegEvent::OutputFrame(frame) => DecoderEvent::Frame(frame),
            FfmpegEvent::Log(_, line) => match parse_showinfo_pts_time(&line) {
                Some(secs) => DecoderEvent::PtsTime(secs),
                None => DecoderEvent::Other,
            },
            FfmpegEvent::Error(message) => DecoderEvent::Error(message),
            FfmpegEvent::Done => DecoderEvent::Done,
            _ => DecoderEvent::Other,
        }
    }
}

/// Pairs emitted frames with showinfo timestamps and tracks grid indices.
///
/// Frames and log lines arrive on separate pipes, so either may come first;
/// the k-th frame takes the k-th timestamp.
#[derive(Debug)]
struct SampleStream<F> {
    stride: u64,
    fps: f64,
    /// Grid index of the next frame to be handed out.
    next_index: u64,
    frames: VecDeque<F>,
    times_ms: VecDeque<f64>,
    finished: bool,
    timestamps_lost: bool,
    errors: Vec<String>,
}

impl<F> SampleStream<F> {
    fn new(stride: u64, fps: f64) -> Self {
        Self {
            stride,
            fps,
            next_index: stride,
            frames: VecDeque::new(),
            times_ms: VecDeque::new(),
            finished: false,
            timestamps_lost: false,
            errors: Vec::new(),
        }
    }

    fn is_finished(&self) -> bool {
        self.finished
    }

    fn last_error(&self) -> Option<&str> {
        self.errors.last().map(String::as_str)
    }

    /// Only forward reads on the sampling grid are possible.
    fn check_reachable(&self, index: u64) -> CoreResult<()> {
        if index < self.next_index || index % self.stride != 0 {
            return Err(CoreError::Decode(format!(
                "frame {index} is not reachable (next sampled frame is {}, stride {})",
                self.next_index, self.stride
            )));
        }
        Ok(())
    }

    /// Skips ahead to the frame at grid `index`; `None` once the stream ends.
    fn seek<I>(&mut self, index: u64, events: &mut I) -> Option<(F, f64)>
    where
        I: Iterator<Item = DecoderEvent<F>>,
    {
        loop {
            let (frame_index, frame, time_ms) = self.next_sample(events)?;
            if frame_index == index {
                return Some((frame, time_ms));
            }
        }
    }

    /// Pulls events until the next frame can be handed out.
    fn next_sample<I>(&mut self, events: &mut I) -> Option<(u64, F, f64)>
    where
        I: Iterator<Item = DecoderEvent<F>>,
    {
        loop {
            if let Some(sample) = self.take_ready() {
                return Some(sample);
            }
            if self.finished {
                return None;
            }

            match events.next() {
                Some(DecoderEvent::Frame(frame)) => self.frames.push_back(frame),
                Some(DecoderEvent::PtsTime(secs)) => {
                    if !self.timestamps_lost {
                        self.times_ms.push_back(secs * 1000.0);
                    }
                }
                Some(DecoderEvent::Error(message)) => {
                    log::debug!("ffmpeg reported: {message}");
                    self.errors.push(message);
                }
                Some(DecoderEvent::Done) | None => self.finished = true,
                Some(DecoderEvent::Other) => {}
            }
        }
    }

    fn take_ready(&mut self) -> Option<(u64, F, f64)> {
        if self.frames.is_empty() {
            return None;
        }
        if self.times_ms.is_empty() && !self.finished && !self.timestamps_lost {
            if self.frames.len() <= MAX_FRAMES_AWAITING_TIME {
                return None;
            }
            log::warn!(
                "No showinfo timestamps after {} frames; using frame index / fps for positions",
                self.frames.len()
            );
            self.timestamps_lost = true;
        }

        let frame_index = self.next_index;
        let fallback_ms = frame_index as f64 / self.fps * 1000.0;
        let time_ms = if self.timestamps_lost {
            fallback_ms
        } else {
            self.times_ms.pop_front().unwrap_or(fallback_ms)
        };
        let frame = self.frames.pop_front()?;
        self.next_index += self.stride;
        Some((frame_index, frame, time_ms))
    }
}

/// Maps ffmpeg's exit to a clean end of stream or a decode failure.
fn exit_result(status: io::Result<ExitStatus>, path: &Path, last_error: Option<&str>) -> CoreResult<()> {
    match status {
        Ok(status) if !status.success() => Err(CoreError::Decode(format!(
            "ffmpeg exited with {status} while decoding {}: {}",
            path.display(),
            last_error.unwrap_or("no error output")
        ))),
        Ok(_) => Ok(()),
        Err(e) => Err(CoreError::Decode(format!(
            "failed waiting for ffmpeg on {}: {e}",
            path.display()
        ))),
    }
}

// ============================================================================
// HELPERS
// ============================================================================

/// Filter graph emitting frames `stride, 2*stride, ...` with timing logs.
fn sampling_filter(stride: u64) -> String {
    format!("select=gte(n\\,{stride})*not(mod(n\\,{stride})),showinfo")
}

/// Extracts `pts_time` (seconds) from an ffmpeg showinfo log line.
fn parse_showinfo_pts_time(line: &str) -> Option<f64> {
    if !line.contains("Parsed_showinfo") {
        return None;
    }
    let start = line.find("pts_time:")? + "pts_time:".len();
    let value = line[start..]
        .split_whitespace()
        .next()?;
    value.parse::<f64>().ok()
}

fn frame_to_image(frame: OutputVideoFrame, index: u64) -> CoreResult<RgbImage> {
    if frame.pix_fmt != "rgb24" {
        return Err(CoreError::Decode(format!(
            "frame {index} has pixel format {}, expected rgb24",
            frame.pix_fmt
        )));
    }
    let (width, height) = (frame.width, frame.height);
    RgbImage::from_raw(width, height, frame.data).ok_or_else(|| {
        CoreError::Decode(format!("frame {index} buffer does not match {width}x{height}"))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use ffmpeg_sidecar::event::LogLevel;

    #[test]
    fn test_sampling_filter_escapes_commas() {
        assert_eq!(
            sampling_filter(10),
            "select=gte(n\\,10)*not(mod(n\\,10)),showinfo"
        );
    }

    #[test]
    fn test_parse_showinfo_line() {
        let line = "[Parsed_showinfo_1 @ 0x55d0c8a4e2c0] n:   0 pts:  10240 pts_time:0.4     \
                    duration:   1024 duration_time:0.04 fmt:yuv420p cl:left sar:1/1 s:640x480";
        assert_eq!(parse_showinfo_pts_time(line), Some(0.4));
    }

    #[test]
    fn test_ignores_other_lines() {
        assert_eq!(parse_showinfo_pts_time("frame=  10 fps=0.0 q=-0.0 pts_time:3.0"), None);
        assert_eq!(
            parse_showinfo_pts_time("[Parsed_showinfo_1 @ 0x1] color_range:tv color_space:bt709"),
            None
        );
    }

    fn frames(ids: &[u32]) -> Vec<DecoderEvent<u32>> {
        ids.iter().map(|id| DecoderEvent::Frame(*id)).collect()
    }

    #[test]
    fn test_frame_before_its_timestamp() {
        let mut stream = SampleStream::new(10, 25.0);
        let mut events = vec![
            DecoderEvent::Frame(1),
            DecoderEvent::Other,
            DecoderEvent::PtsTime(0.4),
            DecoderEvent::Done,
        ]
        .into_iter();
        assert_eq!(stream.seek(10, &mut events), Some((1, 400.0)));
    }

    #[test]
    fn test_timestamp_before_its_frame() {
        let mut stream = SampleStream::new(10, 25.0);
        let mut events = vec![
            DecoderEvent::PtsTime(0.4),
            DecoderEvent::PtsTime(0.8),
            DecoderEvent::Frame(1),
            DecoderEvent::Frame(2),
            DecoderEvent::Done,
        ]
        .into_iter();
        assert_eq!(stream.seek(10, &mut events), Some((1, 400.0)));
        assert_eq!(stream.seek(20, &mut events), Some((2, 800.0)));
        assert_eq!(stream.seek(30, &mut events), None);
        assert!(stream.is_finished());
    }

    #[test]
    fn test_seek_skips_intermediate_grid_frames() {
        let mut stream = SampleStream::new(10, 25.0);
        let mut events = vec![
            DecoderEvent::PtsTime(0.4),
            DecoderEvent::Frame(1),
            DecoderEvent::PtsTime(0.8),
            DecoderEvent::Frame(2),
            DecoderEvent::PtsTime(1.2),
            DecoderEvent::Frame(3),
        ]
        .into_iter();
        assert_eq!(stream.seek(30, &mut events), Some((3, 1200.0)));
        assert_eq!(stream.next_index, 40);
    }

    #[test]
    fn test_missing_timestamps_hold_a_bounded_number_of_frames() {
        let mut stream = SampleStream::new(10, 25.0);
        let mut events = frames(&[1, 2, 3, 4, 5, 6, 7, 8]).into_iter();

        assert_eq!(stream.seek(10, &mut events), Some((1, 400.0)));
        assert!(stream.frames.len() <= MAX_FRAMES_AWAITING_TIME);
        // Events not needed yet are left unread
        assert_eq!(events.len(), 8 - (MAX_FRAMES_AWAITING_TIME + 1));

        assert_eq!(stream.seek(20, &mut events), Some((2, 800.0)));
        assert_eq!(stream.seek(80, &mut events), Some((8, 3200.0)));
    }

    #[test]
    fn test_late_timestamps_ignored_once_lost() {
        let mut stream = SampleStream::new(10, 25.0);
        let mut events = frames(&[1, 2, 3, 4, 5]).into_iter().chain(vec![
            DecoderEvent::PtsTime(0.4),
            DecoderEvent::Frame(6),
            DecoderEvent::Done,
        ]);
        for (k, index) in (10..=60).step_by(10).enumerate() {
            let expected = index as f64 / 25.0 * 1000.0;
            assert_eq!(stream.seek(index, &mut events), Some((k as u32 + 1, expected)));
        }
        assert!(stream.times_ms.is_empty());
    }

    #[test]
    fn test_done_flushes_queued_frames_with_fallback() {
        let mut stream = SampleStream::new(10, 25.0);
        let mut events = vec![
            DecoderEvent::PtsTime(0.4),
            DecoderEvent::Frame(1),
            DecoderEvent::Frame(2),
            DecoderEvent::Error("Invalid data found".to_string()),
            DecoderEvent::Done,
        ]
        .into_iter();
        assert_eq!(stream.seek(10, &mut events), Some((1, 400.0)));
        assert_eq!(stream.seek(20, &mut events), Some((2, 800.0)));
        assert_eq!(stream.seek(30, &mut events), None);
        assert_eq!(stream.last_error(), Some("Invalid data found"));
    }

    #[test]
    fn test_exhausted_iterator_ends_stream() {
        let mut stream: SampleStream<u32> = SampleStream::new(5, 30.0);
        let mut events = Vec::new().into_iter();
        assert_eq!(stream.seek(5, &mut events), None);
        assert!(stream.is_finished());
    }

    #[test]
    fn test_only_forward_grid_reads_are_reachable() {
        let mut stream = SampleStream::new(10, 25.0);
        assert!(stream.check_reachable(10).is_ok());
        assert!(stream.check_reachable(40).is_ok());
        assert!(stream.check_reachable(15).is_err());
        assert!(stream.check_reachable(0).is_err());

        let mut events = vec![DecoderEvent::PtsTime(0.4), DecoderEvent::Frame(1)].into_iter();
        stream.seek(10, &mut events);
        let err = stream.check_reachable(10).unwrap_err();
        assert!(err.to_string().contains("next sampled frame is 20"));
    }

    #[test]
    fn test_showinfo_log_event_becomes_timestamp() {
        let line = "[Parsed_showinfo_1 @ 0x1] n:   2 pts:  30720 pts_time:1.2 duration:1024";
        let event = DecoderEvent::<OutputVideoFrame>::from(FfmpegEvent::Log(LogLevel::Info, line.to_string()));
        assert!(matches!(event, DecoderEvent::PtsTime(t) if (t - 1.2).abs() < 1e-9));

        let other = DecoderEvent::<OutputVideoFrame>::from(FfmpegEvent::Log(LogLevel::Info, "Stream mapping:".into()));
        assert!(matches!(other, DecoderEvent::Other));
        assert!(matches!(DecoderEvent::<OutputVideoFrame>::from(FfmpegEvent::Done), DecoderEvent::Done));
    }

    #[cfg(unix)]
    #[test]
    fn test_exit_status_classification() {
        use std::os::unix::process::ExitStatusExt;
        let path = Path::new("clip.mp4");

        assert!(exit_result(Ok(ExitStatus::from_raw(0)), path, None).is_ok());

        let err = exit_result(Ok(ExitStatus::from_raw(1 << 8)), path, Some("moov atom not found"))
            .unwrap_err();
        assert!(matches!(err, CoreError::Decode(_)));
        assert!(err.to_string().contains("moov atom not found"));
        assert!(err.to_string().contains("clip.mp4"));

        let err = exit_result(Err(io::Error::other("interrupted")), path, None).unwrap_err();
        assert!(err.to_string().contains("failed waiting for ffmpeg"));
    }

    #[test]
    fn test_open_missing_video() {
        let err = SidecarFrameSource::open(Path::new("/no/such/clip.mp4"), 10)
            .err()
            .unwrap();
        assert!(matches!(err, CoreError::VideoNotFound(_)));
        assert!(err.to_string().contains("/no/such/clip.mp4"));
    }
}
