//! Container and stream metadata types

/// Codec information
#[derive(Debug, Clone)]
pub struct CodecInfo {
    /// Short name (e.g., "h264")
    pub name: String,

    /// Long name (e.g., "H.264 / AVC / MPEG-4 AVC")
    pub long_name: String,
}

impl CodecInfo {
    pub fn new(name: impl Into<String>, long_name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            long_name: long_name.into(),
        }
    }

    /// Create unknown codec info
    pub fn unknown() -> Self {
        Self {
            name: "unknown".to_string(),
            long_name: "Unknown Codec".to_string(),
        }
    }
}

/// Kind of track carried by a stream
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrackKind {
    Video,
    Audio,
}

/// Per-stream codec parameters as parsed from the container header.
///
/// Width/height/frame rate are zero for non-video tracks.
#[derive(Debug, Clone)]
pub struct StreamParams {
    /// Stream index within the container
    pub index: usize,

    /// Track kind
    pub kind: TrackKind,

    /// Codec info
    pub codec: CodecInfo,

    /// Width in pixels (video only)
    pub width: u32,

    /// Height in pixels (video only)
    pub height: u32,

    /// Frame rate (video only)
    pub frame_rate: f64,
}

impl StreamParams {
    pub fn is_video(&self) -> bool {
        self.kind == TrackKind::Video
    }
}

/// Container-level metadata parsed from the header
#[derive(Debug, Clone)]
pub struct ContainerInfo {
    /// Container format short name (e.g., "mp4")
    pub format: String,

    /// Duration in milliseconds
    pub duration_ms: i64,

    /// All streams in container order
    pub streams: Vec<StreamParams>,
}

impl ContainerInfo {
    /// First video stream, if any
    pub fn primary_video(&self) -> Option<&StreamParams> {
        self.streams.iter().find(|s| s.is_video())
    }

    /// Check if the container has a video stream
    pub fn has_video(&self) -> bool {
        self.primary_video().is_some()
    }

    /// Check if the container has an audio stream
    pub fn has_audio(&self) -> bool {
        self.streams.iter().any(|s| s.kind == TrackKind::Audio)
    }
}
