//! Deterministic synthetic backend
//!
//! Generates a GOP-structured packet stream and decodes it into pixel data
//! that is a pure function of the frame's pts, so tests can assert exact
//! frame identity and extraction idempotence. The decoder refuses
//! inter-frames when it holds no reference, which makes the
//! prime-from-keyframe policy observable rather than assumed.

use std::path::Path;

use crate::backend::{Demuxer, MediaBackend, Packet, PacketDecoder, RawFrame};
use crate::container::info::{CodecInfo, ContainerInfo, StreamParams, TrackKind};
use crate::decoder::PixelFormat;
use crate::error::{Error, Result};

const HEADER_BYTES: i64 = 512;
const KEYFRAME_PACKET_BYTES: i64 = 4096;
const INTER_PACKET_BYTES: i64 = 1024;
const AUDIO_PACKET_BYTES: i64 = 256;

const VIDEO_STREAM: usize = 0;
const AUDIO_STREAM: usize = 1;

/// Description of the synthetic media resource
#[derive(Debug, Clone)]
pub struct MockMedia {
    pub duration_ms: i64,
    pub frame_rate: f64,
    pub width: u32,
    pub height: u32,
    pub codec_name: &'static str,
    /// Frames per group of pictures (keyframe interval)
    pub gop_size: usize,
    /// Emit frames in this format regardless of what the engine asked
    /// for, simulating a backend that disregards the request
    pub force_pixel_format: Option<PixelFormat>,
    /// Interleave an audio track
    pub with_audio: bool,
    /// Presentation timestamps whose packets fail to decode
    pub corrupt_pts: Vec<i64>,
    /// Fail open_container unconditionally
    pub fail_open: bool,
    /// Report an unparseable container header
    pub corrupt_header: bool,
    /// Expose no video stream
    pub no_video: bool,
    /// Require the path to exist on disk
    pub check_path: bool,
}

impl Default for MockMedia {
    fn default() -> Self {
        Self {
            duration_ms: 10_000,
            frame_rate: 30.0,
            width: 1920,
            height: 1080,
            codec_name: "h264",
            gop_size: 30,
            force_pixel_format: None,
            with_audio: false,
            corrupt_pts: Vec::new(),
            fail_open: false,
            corrupt_header: false,
            no_video: false,
            check_path: false,
        }
    }
}

impl MockMedia {
    /// Presentation timestamp of frame `i` in milliseconds
    pub fn pts_of(&self, i: usize) -> i64 {
        (i as f64 * 1_000.0 / self.frame_rate).round() as i64
    }

    /// Number of frames in the stream
    pub fn frame_count(&self) -> usize {
        let mut n = 0;
        while self.pts_of(n) < self.duration_ms {
            n += 1;
        }
        n
    }

    /// Deterministic pixel content for the frame at `pts_ms`
    pub fn pixels_at(&self, pts_ms: i64, format: PixelFormat) -> Vec<u8> {
        let size = format.frame_size(self.width, self.height);
        let seed = (pts_ms as u64).wrapping_mul(0x9E37_79B9);
        (0..size)
            .map(|j| (seed.wrapping_add(j as u64).wrapping_mul(31) >> 3) as u8)
            .collect()
    }
}

/// Factory for synthetic demuxers and decoders
pub struct MockBackend {
    media: MockMedia,
}

impl MockBackend {
    pub fn new(media: MockMedia) -> Self {
        Self { media }
    }

    fn build_packets(&self) -> Vec<Packet> {
        let mut packets = Vec::new();
        let mut offset = HEADER_BYTES;

        for i in 0..self.media.frame_count() {
            let pts_ms = self.media.pts_of(i);
            let is_keyframe = i % self.media.gop_size == 0;

            let mut data = Vec::with_capacity(16);
            data.extend_from_slice(&(i as u32).to_le_bytes());
            data.extend_from_slice(&pts_ms.to_le_bytes());

            packets.push(Packet {
                data,
                pts_ms,
                byte_offset: offset,
                is_keyframe,
                stream_index: VIDEO_STREAM,
            });
            offset += if is_keyframe {
                KEYFRAME_PACKET_BYTES
            } else {
                INTER_PACKET_BYTES
            };

            if self.media.with_audio {
                packets.push(Packet {
                    data: vec![0u8; 8],
                    pts_ms,
                    byte_offset: offset,
                    is_keyframe: true,
                    stream_index: AUDIO_STREAM,
                });
                offset += AUDIO_PACKET_BYTES;
            }
        }

        packets
    }

    fn build_info(&self) -> ContainerInfo {
        let mut streams = Vec::new();
        if !self.media.no_video {
            streams.push(StreamParams {
                index: VIDEO_STREAM,
                kind: TrackKind::Video,
                codec: CodecInfo::new(self.media.codec_name, self.media.codec_name),
                width: self.media.width,
                height: self.media.height,
                frame_rate: self.media.frame_rate,
            });
        }
        if self.media.with_audio {
            streams.push(StreamParams {
                index: AUDIO_STREAM,
                kind: TrackKind::Audio,
                codec: CodecInfo::new("aac", "AAC (Advanced Audio Coding)"),
                width: 0,
                height: 0,
                frame_rate: 0.0,
            });
        }

        ContainerInfo {
            format: "mp4".to_string(),
            duration_ms: self.media.duration_ms,
            streams,
        }
    }
}

impl MediaBackend for MockBackend {
    fn open_container(&self, path: &Path) -> Result<Box<dyn Demuxer>> {
        if self.media.check_path && !path.exists() {
            return Err(Error::OpenFailed {
                path: path.to_path_buf(),
                reason: "no such file".to_string(),
            });
        }
        if self.media.fail_open {
            return Err(Error::OpenFailed {
                path: path.to_path_buf(),
                reason: "resource unavailable".to_string(),
            });
        }
        if self.media.corrupt_header {
            return Err(Error::CorruptHeader("truncated moov atom".to_string()));
        }

        Ok(Box::new(MockDemuxer {
            info: self.build_info(),
            packets: self.build_packets(),
            pos: 0,
        }))
    }

    fn create_decoder(
        &self,
        stream: &StreamParams,
        output_format: PixelFormat,
    ) -> Result<Box<dyn PacketDecoder>> {
        if !stream.is_video() {
            return Err(Error::UnsupportedFormat(format!(
                "stream {} is not a video stream",
                stream.index
            )));
        }

        Ok(Box::new(MockDecoder {
            media: self.media.clone(),
            output_format: self.media.force_pixel_format.unwrap_or(output_format),
            reference_pts: None,
        }))
    }
}

struct MockDemuxer {
    info: ContainerInfo,
    packets: Vec<Packet>,
    pos: usize,
}

impl Demuxer for MockDemuxer {
    fn info(&self) -> &ContainerInfo {
        &self.info
    }

    fn seek_bytes(&mut self, byte_offset: i64) -> Result<()> {
        // Land on the packet at or before the requested offset
        let idx = self
            .packets
            .partition_point(|p| p.byte_offset <= byte_offset);
        self.pos = idx.saturating_sub(1);
        Ok(())
    }

    fn read_packet(&mut self) -> Result<Option<Packet>> {
        let packet = self.packets.get(self.pos).cloned();
        if packet.is_some() {
            self.pos += 1;
        }
        Ok(packet)
    }
}

struct MockDecoder {
    media: MockMedia,
    output_format: PixelFormat,

    /// Pts of the most recent keyframe fed since the last reset
    reference_pts: Option<i64>,
}

impl PacketDecoder for MockDecoder {
    fn reset(&mut self) {
        self.reference_pts = None;
    }

    fn decode(&mut self, packet: Packet) -> Result<Option<RawFrame>> {
        if self.media.corrupt_pts.contains(&packet.pts_ms) {
            return Err(Error::Decode(format!(
                "bitstream error in packet at {} ms",
                packet.pts_ms
            )));
        }

        if packet.is_keyframe {
            self.reference_pts = Some(packet.pts_ms);
        } else if self.reference_pts.is_none() {
            return Err(Error::Decode(format!(
                "inter frame at {} ms with no reference",
                packet.pts_ms
            )));
        }

        Ok(Some(RawFrame {
            data: self.media.pixels_at(packet.pts_ms, self.output_format),
            width: self.media.width,
            height: self.media.height,
            pts_ms: packet.pts_ms,
            is_keyframe: packet.is_keyframe,
            pixel_format: self.output_format,
        }))
    }

    fn drain(&mut self) -> Result<Option<RawFrame>> {
        // Synthetic decode has no lookahead buffer
        Ok(None)
    }
}
