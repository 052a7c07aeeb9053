// THEORY:
// This file is the main entry point for the `pupil_vision` library crate.
// It exposes the `EyePipeline` and its associated data structures
// (`PipelineConfig`, `FrameReport`, `TrackingRecord`, etc.) as the high-level
// interface for the whole engine, while the algorithmic building blocks live in
// `core_modules` and stay usable on their own (labeling, selection, tracking).

pub mod core_modules;
pub mod error;
pub mod pipeline;

pub use error::{PipelineError, Result};
pub use pipeline::{EyePipeline, FrameReport, PipelineConfig};
