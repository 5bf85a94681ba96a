//! Decoder backend seam
//!
//! The engine does not prescribe a demux/decode library. Anything that can
//! open a container, hand out compressed packets, and turn packets into raw
//! frames plugs in behind these traits. Container-specific time bases are
//! converted at this boundary so the rest of the crate operates on
//! milliseconds only.

use std::path::Path;

use crate::container::info::{ContainerInfo, StreamParams};
use crate::decoder::PixelFormat;
use crate::error::Result;

pub mod mock;

/// A single demuxed compressed data unit.
///
/// Owned transiently: produced by a [`Demuxer`], moved into a
/// [`PacketDecoder`], discarded after decode.
#[derive(Debug, Clone)]
pub struct Packet {
    /// Compressed bitstream data
    pub data: Vec<u8>,

    /// Presentation timestamp in milliseconds
    pub pts_ms: i64,

    /// Byte offset of this packet within the container
    pub byte_offset: i64,

    /// Whether this packet encodes a keyframe
    pub is_keyframe: bool,

    /// Index of the stream this packet belongs to
    pub stream_index: usize,
}

/// A raw decoded frame as produced by the backend, before the engine wraps
/// it into a [`crate::decoder::VideoFrame`].
#[derive(Debug)]
pub struct RawFrame {
    /// Decoded pixel data in the backend's output format
    pub data: Vec<u8>,

    /// Frame width in pixels
    pub width: u32,

    /// Frame height in pixels
    pub height: u32,

    /// Presentation timestamp in milliseconds
    pub pts_ms: i64,

    /// Whether this frame was decoded from a keyframe packet
    pub is_keyframe: bool,

    /// Pixel format of `data`
    pub pixel_format: PixelFormat,
}

/// Demuxed packet source for one opened container.
///
/// A demuxer owns a single read cursor; concurrent iteration is not
/// supported (`&mut self` on every read).
pub trait Demuxer: Send {
    /// Container-level metadata parsed from the header
    fn info(&self) -> &ContainerInfo;

    /// Reposition the read cursor at or before the given byte offset.
    /// Cost is proportional to seek distance when the resource supports
    /// random access.
    fn seek_bytes(&mut self, byte_offset: i64) -> Result<()>;

    /// Read the next packet in container order, or `None` when the stream
    /// is exhausted.
    fn read_packet(&mut self) -> Result<Option<Packet>>;
}

/// Compressed-packet decoder for one stream.
///
/// Stateful: inter-frames reference previously decoded frames, so the
/// decoder must be primed from a keyframe after every reposition.
pub trait PacketDecoder: Send {
    /// Discard all reference-frame state. Required after a seek.
    fn reset(&mut self);

    /// Feed one packet. Returns `None` when the decoder needs more input
    /// before it can emit a frame.
    fn decode(&mut self, packet: Packet) -> Result<Option<RawFrame>>;

    /// Flush any frames still buffered at end of stream.
    fn drain(&mut self) -> Result<Option<RawFrame>>;
}

/// Factory for demuxers and per-stream decoders.
pub trait MediaBackend: Send + Sync {
    /// Open a media resource and parse its container header.
    fn open_container(&self, path: &Path) -> Result<Box<dyn Demuxer>>;

    /// Create a decoder for the given stream producing frames in
    /// `output_format`. Backends convert (scale/swizzle) internally;
    /// a backend that cannot emit the requested format fails here
    /// rather than at decode time.
    fn create_decoder(
        &self,
        stream: &StreamParams,
        output_format: PixelFormat,
    ) -> Result<Box<dyn PacketDecoder>>;
}
