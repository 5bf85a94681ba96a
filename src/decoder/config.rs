//! Engine configuration

/// Pixel format for output frames
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum PixelFormat {
    /// BGRA (32-bit interleaved)
    Bgra = 0,
    /// RGB (24-bit interleaved)
    Rgb24 = 1,
    /// YUV420P (12-bit planar)
    Yuv420p = 2,
}

impl Default for PixelFormat {
    fn default() -> Self {
        Self::Bgra
    }
}

impl PixelFormat {
    /// Size in bytes of one decoded frame at the given dimensions
    pub fn frame_size(self, width: u32, height: u32) -> usize {
        let pixels = width as usize * height as usize;
        match self {
            PixelFormat::Bgra => pixels * 4,
            PixelFormat::Rgb24 => pixels * 3,
            PixelFormat::Yuv420p => pixels * 3 / 2,
        }
    }
}

/// Engine configuration
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Frame cache capacity
    pub cache_capacity: usize,

    /// Consecutive corrupt packets skipped before a decode error surfaces
    pub max_decode_retries: u32,

    /// Output pixel format
    pub output_pixel_format: PixelFormat,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            cache_capacity: 16,
            max_decode_retries: 3,
            output_pixel_format: PixelFormat::Bgra,
        }
    }
}

impl EngineConfig {
    /// Low memory preset
    pub fn low_memory() -> Self {
        Self {
            cache_capacity: 4,
            max_decode_retries: 3,
            output_pixel_format: PixelFormat::Yuv420p,
        }
    }

    /// Scrubbing optimized preset with a larger cache
    pub fn scrubbing() -> Self {
        Self {
            cache_capacity: 48,
            max_decode_retries: 3,
            output_pixel_format: PixelFormat::Bgra,
        }
    }
}
