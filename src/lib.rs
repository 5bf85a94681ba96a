//! Maxmiize Video Core - video decoding and frame-extraction engine
//!
//! This crate provides the decoding core for Maxmiize:
//! - Container demuxing behind a pluggable decoder backend
//! - Keyframe seek index for random access by timestamp
//! - State-machine frame decoder honoring reference chains
//! - Bounded LRU frame cache for repeated nearby extractions
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────┐
//! │         Engine Facade                │
//! │  (init / load / metadata / extract)  │
//! └─────────────────────────────────────┘
//!            │              │
//!            ▼              ▼
//! ┌──────────────────┐ ┌────────────────┐
//! │    Seek Index     │ │  Frame Cache   │
//! │  (pts → offset)   │ │  (LRU by pts)  │
//! └──────────────────┘ └────────────────┘
//!            │
//!            ▼
//! ┌─────────────────────────────────────┐
//! │   Container Reader → Frame Decoder   │
//! │  (packets)           (state machine) │
//! └─────────────────────────────────────┘
//!            │
//!            ▼
//! ┌─────────────────────────────────────┐
//! │        Decoder Backend (trait)       │
//! └─────────────────────────────────────┘
//! ```

pub mod backend;
pub mod cache;
pub mod container;
pub mod decoder;
pub mod engine;
pub mod error;
pub mod index;

// Re-export main types
pub use backend::{Demuxer, MediaBackend, Packet, PacketDecoder, RawFrame};
pub use cache::{CacheStatistics, FrameCache};
pub use container::{CodecInfo, ContainerInfo, ContainerReader, StreamParams, TrackKind};
pub use decoder::{DecoderState, EngineConfig, FrameDecoder, PixelFormat, VideoFrame};
pub use engine::{EngineState, VideoEngine, VideoMetadata};
pub use error::{Error, Result};
pub use index::{SeekIndex, SeekIndexEntry};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Initialize the library (call once at startup)
pub fn init() {
    // Initialize logging with info level by default if RUST_LOG is not set
    let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .try_init();

    log::info!("Maxmiize Video Core {} initialized", VERSION);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }

    #[test]
    fn test_init() {
        init();
        // Should not panic
    }
}
