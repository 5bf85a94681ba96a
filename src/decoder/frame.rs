//! Video frame types

use super::config::PixelFormat;
use crate::error::{Error, Result};

/// Decoded video frame
#[derive(Clone)]
pub struct VideoFrame {
    /// Raw pixel data
    pub data: Vec<u8>,

    /// Frame width
    pub width: u32,

    /// Frame height
    pub height: u32,

    /// Presentation timestamp in milliseconds
    pub pts_ms: i64,

    /// Frame duration in milliseconds
    pub duration_ms: i64,

    /// Whether this is a keyframe
    pub is_keyframe: bool,

    /// Pixel format
    pub pixel_format: PixelFormat,
}

impl VideoFrame {
    /// Get data size in bytes
    pub fn data_size(&self) -> usize {
        self.data.len()
    }

    /// Presentation time in seconds
    pub fn pts_seconds(&self) -> f64 {
        self.pts_ms as f64 / 1_000.0
    }

    /// Copy pixel data into a caller-provided buffer. The buffer must hold
    /// at least `data_size()` bytes; only that many bytes are written.
    ///
    /// Returns [`Error::BufferTooSmall`] without touching the buffer when it
    /// cannot hold the frame.
    pub fn copy_into(&self, buffer: &mut [u8]) -> Result<()> {
        if buffer.len() < self.data.len() {
            return Err(Error::BufferTooSmall {
                required: self.data.len(),
                provided: buffer.len(),
            });
        }
        buffer[..self.data.len()].copy_from_slice(&self.data);
        Ok(())
    }

    /// Create a test frame (for testing only)
    #[cfg(test)]
    pub fn test_frame(pts_ms: i64, width: u32, height: u32) -> Self {
        let size = PixelFormat::Bgra.frame_size(width, height);
        Self {
            data: vec![0u8; size],
            width,
            height,
            pts_ms,
            duration_ms: 33,
            is_keyframe: pts_ms == 0,
            pixel_format: PixelFormat::Bgra,
        }
    }
}

impl std::fmt::Debug for VideoFrame {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VideoFrame")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("pts_ms", &self.pts_ms)
            .field("is_keyframe", &self.is_keyframe)
            .field("data_size", &self.data.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frame_creation() {
        let frame = VideoFrame::test_frame(0, 1920, 1080);
        assert_eq!(frame.width, 1920);
        assert_eq!(frame.height, 1080);
        assert!(frame.is_keyframe);
        assert_eq!(frame.data_size(), 8_294_400);
    }

    #[test]
    fn test_copy_into_exact() {
        let frame = VideoFrame {
            data: vec![7u8; 12],
            width: 2,
            height: 2,
            pts_ms: 100,
            duration_ms: 33,
            is_keyframe: false,
            pixel_format: PixelFormat::Rgb24,
        };

        let mut buf = vec![0u8; 20];
        frame.copy_into(&mut buf).unwrap();
        assert_eq!(&buf[..12], &[7u8; 12]);
        // Bytes past the frame are untouched
        assert_eq!(&buf[12..], &[0u8; 8]);
    }

    #[test]
    fn test_copy_into_undersized_buffer_fails() {
        let frame = VideoFrame::test_frame(0, 4, 4);
        let mut buf = vec![0u8; 16];

        let err = frame.copy_into(&mut buf).unwrap_err();
        assert!(matches!(
            err,
            Error::BufferTooSmall {
                required: 64,
                provided: 16
            }
        ));
        assert_eq!(buf, vec![0u8; 16]);
    }
}
