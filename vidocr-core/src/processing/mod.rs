//! Frame processing: preprocessing, filtering, selection and the extraction loop.

pub mod pipeline;
pub mod preprocess;
pub mod selection;
pub mod whitelist;

pub use pipeline::{ExtractionContext, ExtractionOutcome, StopReason, extract_transcript};
pub use preprocess::{CropRegion, preprocess};
pub use selection::{NO_CONFIDENCE, SamplingPlan, select_best};
pub use whitelist::{Whitelist, filter_text};
