//! Error types for maxmiize-video-core

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for maxmiize-video-core operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for engine operations
#[derive(Error, Debug)]
pub enum Error {
    /// Engine method called before initialize()
    #[error("Engine not initialized")]
    NotInitialized,

    /// Resource could not be opened
    #[error("Failed to open media resource: {} ({reason})", .path.display())]
    OpenFailed { path: PathBuf, reason: String },

    /// Container header could not be parsed
    #[error("Corrupt container header: {0}")]
    CorruptHeader(String),

    /// No decodable video stream in the container
    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),

    /// No video loaded
    #[error("No video loaded")]
    NotLoaded,

    /// Requested timestamp outside [0, duration)
    #[error("Timestamp {timestamp_ms} ms out of range [0, {duration_ms} ms)")]
    OutOfRange { timestamp_ms: i64, duration_ms: i64 },

    /// Caller-provided buffer cannot hold one decoded frame
    #[error("Buffer too small: need {required} bytes, got {provided}")]
    BufferTooSmall { required: usize, provided: usize },

    /// Decode error (recoverable per frame; the decoder retries internally
    /// before surfacing this)
    #[error("Decode failed: {0}")]
    Decode(String),

    /// End of stream reached for the current decode run
    #[error("End of stream")]
    EndOfStream,

    /// Seek error
    #[error("Seek failed at {0} ms")]
    SeekFailed(i64),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Whether the caller may retry with the next packet/frame
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Error::Decode(_))
    }

    /// Error kind name, stable across message changes (for logging)
    pub fn kind(&self) -> &'static str {
        match self {
            Error::NotInitialized => "not_initialized",
            Error::OpenFailed { .. } => "open_failed",
            Error::CorruptHeader(_) => "corrupt_header",
            Error::UnsupportedFormat(_) => "unsupported_format",
            Error::NotLoaded => "not_loaded",
            Error::OutOfRange { .. } => "out_of_range",
            Error::BufferTooSmall { .. } => "buffer_too_small",
            Error::Decode(_) => "decode",
            Error::EndOfStream => "end_of_stream",
            Error::SeekFailed(_) => "seek_failed",
            Error::Io(_) => "io",
        }
    }
}
