//! Scripted collaborators shared by the pipeline integration tests.

#![allow(dead_code)]

use image::{Rgb, RgbImage};
use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::rc::Rc;
use std::sync::Mutex;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use vidocr_core::reporting::{ExtractionSummary, Reporter, RunSummary, SampleProgress};
use vidocr_core::{CoreError, CoreResult, CropRegion, FrameSource, OcrBackend, OcrCandidate, RegionSelector};

/// Offset added to every reported position so tests can tell a timecode
/// read from the source apart from one computed as `index / fps`.
pub const POSITION_OFFSET_MS: f64 = 3.0;

// ============================================================================
// FRAME SOURCE
// ============================================================================

/// In-memory video with configurable failure points.
pub struct MockFrameSource {
    fps: f64,
    total_frames: u64,
    width: u32,
    height: u32,
    fail_at: Option<u64>,
    ends_at: Option<u64>,
    position_ms: f64,
    pub reads: Rc<RefCell<Vec<u64>>>,
    pub releases: Rc<Cell<usize>>,
}

impl MockFrameSource {
    pub fn new(fps: f64, total_frames: u64) -> Self {
        Self {
            fps,
            total_frames,
            width: 64,
            height: 32,
            fail_at: None,
            ends_at: None,
            position_ms: 0.0,
            reads: Rc::new(RefCell::new(Vec::new())),
            releases: Rc::new(Cell::new(0)),
        }
    }

    pub fn with_size(mut self, width: u32, height: u32) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    /// Decoding `index` returns an error.
    pub fn failing_at(mut self, index: u64) -> Self {
        self.fail_at = Some(index);
        self
    }

    /// The stream has no frames at or beyond `index`.
    pub fn ending_at(mut self, index: u64) -> Self {
        self.ends_at = Some(index);
        self
    }

    pub fn expected_position_ms(fps: f64, index: u64) -> f64 {
        index as f64 * 1000.0 / fps + POSITION_OFFSET_MS
    }
}

impl FrameSource for MockFrameSource {
    fn fps(&self) -> f64 {
        self.fps
    }

    fn total_frames(&self) -> u64 {
        self.total_frames
    }

    fn read_frame(&mut self, index: u64) -> CoreResult<Option<RgbImage>> {
        self.reads.borrow_mut().push(index);
        if self.fail_at == Some(index) {
            return Err(CoreError::Decode(format!("corrupt frame {index}")));
        }
        if self.ends_at.is_some_and(|end| index >= end) {
            return Ok(None);
        }
        self.position_ms = Self::expected_position_ms(self.fps, index);
        Ok(Some(RgbImage::from_pixel(
            self.width,
            self.height,
            Rgb([(index % 256) as u8, 0, 0]),
        )))
    }

    fn position_ms(&self) -> f64 {
        self.position_ms
    }
}

impl Drop for MockFrameSource {
    fn drop(&mut self) {
        self.releases.set(self.releases.get() + 1);
    }
}

// ============================================================================
// OCR BACKEND
// ============================================================================

/// Backend replaying one scripted response per call; an exhausted script
/// yields a single "0" candidate.
pub struct ScriptedBackend {
    responses: RefCell<VecDeque<CoreResult<Vec<OcrCandidate>>>>,
    supports_allowlist: bool,
    pub allowlists: RefCell<Vec<Option<String>>>,
    pub image_sizes: RefCell<Vec<(u32, u32)>>,
}

impl ScriptedBackend {
    pub fn new() -> Self {
        Self {
            responses: RefCell::new(VecDeque::new()),
            supports_allowlist: true,
            allowlists: RefCell::new(Vec::new()),
            image_sizes: RefCell::new(Vec::new()),
        }
    }

    pub fn without_allowlist(mut self) -> Self {
        self.supports_allowlist = false;
        self
    }

    pub fn then(self, candidates: Vec<OcrCandidate>) -> Self {
        self.responses.borrow_mut().push_back(Ok(candidates));
        self
    }

    pub fn then_text(self, text: &str, confidence: f64) -> Self {
        self.then(vec![OcrCandidate::new(text, confidence)])
    }

    pub fn then_error(self, message: &str) -> Self {
        self.responses
            .borrow_mut()
            .push_back(Err(CoreError::OperationFailed(message.to_string())));
        self
    }

    pub fn calls(&self) -> usize {
        self.image_sizes.borrow().len()
    }
}

impl OcrBackend for ScriptedBackend {
    fn name(&self) -> &str {
        "scripted"
    }

    fn supports_allowlist(&self) -> bool {
        self.supports_allowlist
    }

    fn recognize(
        &self,
        image: &RgbImage,
        _language: &str,
        allowlist: Option<&str>,
    ) -> CoreResult<Vec<OcrCandidate>> {
        self.allowlists.borrow_mut().push(allowlist.map(str::to_string));
        self.image_sizes.borrow_mut().push(image.dimensions());
        self.responses
            .borrow_mut()
            .pop_front()
            .unwrap_or_else(|| Ok(vec![OcrCandidate::new("0", 0.5)]))
    }
}

// ============================================================================
// REGION SELECTOR
// ============================================================================

/// Selector returning a fixed region and recording the reference frames.
pub struct RecordingSelector {
    region: CoreResult<CropRegion>,
    display_hidden: Option<Arc<AtomicBool>>,
    pub reference_sizes: Vec<(u32, u32)>,
    /// Whether the reporter's display was suspended during each call.
    pub saw_display_hidden: Vec<bool>,
}

impl RecordingSelector {
    pub fn returning(region: CropRegion) -> Self {
        Self {
            region: Ok(region),
            display_hidden: None,
            reference_sizes: Vec::new(),
            saw_display_hidden: Vec::new(),
        }
    }

    pub fn cancelled() -> Self {
        Self {
            region: Err(CoreError::Config("selection cancelled".to_string())),
            ..Self::returning(CropRegion::from_rect(0, 0, 1, 1))
        }
    }

    /// Records the state of `flag` (a reporter's suspend flag) on each call.
    pub fn watching(mut self, flag: Arc<AtomicBool>) -> Self {
        self.display_hidden = Some(flag);
        self
    }
}

impl RegionSelector for RecordingSelector {
    fn select_region(&mut self, reference: &RgbImage) -> CoreResult<CropRegion> {
        self.reference_sizes.push(reference.dimensions());
        if let Some(flag) = &self.display_hidden {
            self.saw_display_hidden.push(flag.load(Ordering::SeqCst));
        }
        match &self.region {
            Ok(region) => Ok(*region),
            Err(e) => Err(CoreError::Config(e.to_string())),
        }
    }
}

// ============================================================================
// REPORTER
// ============================================================================

/// Reporter recording what it was told; optionally raises an abort flag
/// once a number of samples has been processed.
#[derive(Default)]
pub struct RecordingReporter {
    pub started: Mutex<Vec<RunSummary>>,
    pub samples: Mutex<Vec<SampleProgress>>,
    pub completed: Mutex<Vec<ExtractionSummary>>,
    pub warnings: Mutex<Vec<String>>,
    pub failures: Mutex<Vec<String>>,
    /// Set while a `suspend` callback is running.
    pub suspended: Arc<AtomicBool>,
    abort_after: Option<(usize, Arc<AtomicBool>)>,
}

impl RecordingReporter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn aborting_after(samples: usize, flag: Arc<AtomicBool>) -> Self {
        Self {
            abort_after: Some((samples, flag)),
            ..Self::default()
        }
    }
}

impl Reporter for RecordingReporter {
    fn extraction_started(&self, summary: &RunSummary) {
        self.started.lock().unwrap().push(summary.clone());
    }

    fn sample_processed(&self, progress: &SampleProgress) {
        let mut samples = self.samples.lock().unwrap();
        samples.push(progress.clone());
        if let Some((limit, flag)) = &self.abort_after {
            if samples.len() >= *limit {
                flag.store(true, Ordering::SeqCst);
            }
        }
    }

    fn extraction_complete(&self, summary: &ExtractionSummary) {
        self.completed.lock().unwrap().push(summary.clone());
    }

    fn extraction_failed(&self, message: &str) {
        self.failures.lock().unwrap().push(message.to_string());
    }

    fn suspend(&self, f: &mut dyn FnMut()) {
        self.suspended.store(true, Ordering::SeqCst);
        f();
        self.suspended.store(false, Ordering::SeqCst);
    }

    fn warning(&self, message: &str) {
        self.warnings.lock().unwrap().push(message.to_string());
    }
}
