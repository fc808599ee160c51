//! Candidate selection and the sampling grid.

use crate::ocr::OcrCandidate;

/// Confidence recorded when a frame yields no usable reading.
pub const NO_CONFIDENCE: f64 = -1.0;

/// Picks the highest-confidence candidate; the earliest one wins ties.
///
/// NaN confidences never beat a real value.
pub fn select_best(candidates: &[OcrCandidate]) -> Option<&OcrCandidate> {
    candidates.iter().fold(None, |best: Option<&OcrCandidate>, candidate| match best {
        Some(current) if !(candidate.confidence > current.confidence) => Some(current),
        _ => Some(candidate),
    })
}

/// Frame indices visited for a video of `total_frames` frames.
///
/// Yields `stride, 2*stride, ...` while the index is below `total_frames`;
/// frame 0 and the tail after the last multiple are never sampled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SamplingPlan {
    pub total_frames: u64,
    pub stride: u64,
}

impl SamplingPlan {
    pub fn new(total_frames: u64, stride: u64) -> Self {
        Self {
            total_frames,
            stride,
        }
    }

    /// Number of samples the plan visits.
    pub fn sample_count(&self) -> u64 {
        if self.stride == 0 || self.total_frames == 0 {
            return 0;
        }
        (self.total_frames - 1) / self.stride
    }

    pub fn indices(&self) -> impl Iterator<Item = u64> + use<> {
        let stride = self.stride;
        (1..=self.sample_count()).map(move |k| k * stride)
    }

    /// Seconds between samples at `fps`.
    pub fn interval_secs(&self, fps: f64) -> f64 {
        if fps > 0.0 {
            self.stride as f64 / fps
        } else {
            0.0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_selects_max_confidence() {
        let candidates = vec![
            OcrCandidate::new("12", 0.4),
            OcrCandidate::new("13", 0.9),
            OcrCandidate::new("18", 0.7),
        ];
        assert_eq!(select_best(&candidates).unwrap().text, "13");
    }

    #[test]
    fn test_first_wins_ties() {
        let candidates = vec![OcrCandidate::new("a", 0.5), OcrCandidate::new("b", 0.5)];
        assert_eq!(select_best(&candidates).unwrap().text, "a");
    }

    #[test]
    fn test_empty_set_has_no_best() {
        assert!(select_best(&[]).is_none());
    }

    #[test]
    fn test_nan_never_wins() {
        let candidates = vec![OcrCandidate::new("nan", f64::NAN), OcrCandidate::new("ok", 0.1)];
        assert_eq!(select_best(&candidates).unwrap().text, "ok");
    }

    #[test]
    fn test_plan_excludes_total_and_zero() {
        let plan = SamplingPlan::new(100, 10);
        let indices: Vec<u64> = plan.indices().collect();
        assert_eq!(indices, vec![10, 20, 30, 40, 50, 60, 70, 80, 90]);
        assert_eq!(plan.sample_count(), 9);
    }

    #[test]
    fn test_plan_properties_hold_for_many_shapes() {
        for total in [0u64, 1, 9, 10, 11, 99, 101, 257] {
            for stride in [1u64, 2, 7, 10, 300] {
                let plan = SamplingPlan::new(total, stride);
                let indices: Vec<u64> = plan.indices().collect();
                assert_eq!(indices.len() as u64, plan.sample_count());
                for (k, index) in indices.iter().enumerate() {
                    assert_eq!(*index, (k as u64 + 1) * stride);
                    assert!(*index < total);
                }
                // The next grid point is past the end.
                assert!((indices.len() as u64 + 1) * stride >= total);
            }
        }
    }

    #[test]
    fn test_interval_secs() {
        let plan = SamplingPlan::new(100, 10);
        assert!((plan.interval_secs(25.0) - 0.4).abs() < 1e-12);
        assert_eq!(plan.interval_secs(0.0), 0.0);
    }
}
