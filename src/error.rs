use thiserror::Error;

/// Errors raised by the pipeline layer.
///
/// Per-frame soft failures (no pupil found, blobs below the size floor) are never
/// errors; they surface as empty or `None` results instead.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Frame buffer holds {actual} bytes, expected {expected} for a {width}x{height} RGBA frame")]
    FrameSize {
        width: u32,
        height: u32,
        expected: usize,
        actual: usize,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON configuration error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, PipelineError>;
