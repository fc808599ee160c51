//! File logging for extraction runs.

pub mod setup;
