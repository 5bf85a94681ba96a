//! Frame decoder
//!
//! Consumes compressed packets for one stream and produces decoded frames
//! in presentation order. Decoder reference-frame state is sequential by
//! nature, so it is modeled as an explicit state machine: after any
//! reposition the decoder is `Idle` and must be primed by a keyframe before
//! inter-frames can be decoded.

mod config;
mod frame;

pub use config::{EngineConfig, PixelFormat};
pub use frame::VideoFrame;

use crate::backend::PacketDecoder;
use crate::container::ContainerReader;
use crate::error::{Error, Result};
use crate::index::SeekIndexEntry;

/// Decoder reference-frame state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecoderState {
    /// No reference frames; inter packets cannot be decoded
    Idle,
    /// A keyframe has been fed; decoding forward
    Primed,
    /// At least one frame emitted since the last reset
    Streaming,
}

/// Decodes one video stream, pulling packets from a [`ContainerReader`].
pub struct FrameDecoder {
    backend: Box<dyn PacketDecoder>,

    /// Stream this decoder is bound to
    stream_index: usize,

    state: DecoderState,

    /// Whether the packet source is exhausted and the backend is draining
    draining: bool,

    /// Frame duration derived from the stream frame rate
    frame_duration_ms: i64,

    /// Format every emitted frame must arrive in
    output_format: PixelFormat,

    /// Consecutive corrupt packets skipped before surfacing an error
    max_retries: u32,
}

impl FrameDecoder {
    /// Create a decoder bound to one video stream
    pub fn new(
        backend: Box<dyn PacketDecoder>,
        stream_index: usize,
        frame_rate: f64,
        output_format: PixelFormat,
        max_retries: u32,
    ) -> Self {
        let frame_duration_ms = if frame_rate > 0.0 {
            (1_000.0 / frame_rate).round() as i64
        } else {
            33
        };

        Self {
            backend,
            stream_index,
            state: DecoderState::Idle,
            draining: false,
            frame_duration_ms,
            output_format,
            max_retries,
        }
    }

    /// Current state
    pub fn state(&self) -> DecoderState {
        self.state
    }

    /// Duration of one frame in milliseconds
    pub fn frame_duration_ms(&self) -> i64 {
        self.frame_duration_ms
    }

    /// Discard reference-frame state and reposition to decode from a
    /// keyframe. Required before any decode after a seek.
    pub fn reset_to(&mut self, reader: &mut ContainerReader, entry: &SeekIndexEntry) -> Result<()> {
        log::debug!(
            "FrameDecoder: reset to keyframe at {} ms (offset {})",
            entry.timestamp_ms,
            entry.byte_offset
        );
        self.backend.reset();
        reader.seek_bytes(entry.byte_offset)?;
        self.state = DecoderState::Idle;
        self.draining = false;
        Ok(())
    }

    /// Decode the next frame in presentation order.
    ///
    /// Corrupt packets are skipped up to the configured retry bound before
    /// surfacing [`Error::Decode`]. Returns [`Error::EndOfStream`] once the
    /// packet source and the backend's buffered frames are exhausted.
    pub fn decode_next(&mut self, reader: &mut ContainerReader) -> Result<VideoFrame> {
        let mut failures: u32 = 0;

        loop {
            if self.draining {
                return self.drain_one();
            }

            let packet = match reader.next_packet_for(self.stream_index)? {
                Some(p) => p,
                None => {
                    log::debug!("FrameDecoder: packet source exhausted, draining");
                    self.draining = true;
                    continue;
                }
            };

            // Inter-frames need their reference chain; until a keyframe
            // arrives there is nothing we can decode correctly
            if self.state == DecoderState::Idle && !packet.is_keyframe {
                log::trace!(
                    "FrameDecoder: dropping inter packet at {} ms while idle",
                    packet.pts_ms
                );
                continue;
            }

            let is_keyframe_packet = packet.is_keyframe;
            match self.backend.decode(packet) {
                Ok(Some(raw)) => {
                    if self.state == DecoderState::Idle {
                        self.state = DecoderState::Primed;
                    }
                    return self.emit(raw);
                }
                Ok(None) => {
                    // Backend buffered the packet; its references are now
                    // established either way
                    if self.state == DecoderState::Idle && is_keyframe_packet {
                        self.state = DecoderState::Primed;
                    }
                }
                Err(e) if e.is_recoverable() => {
                    failures += 1;
                    if failures > self.max_retries {
                        log::warn!(
                            "FrameDecoder: giving up after {} corrupt packets: {}",
                            failures,
                            e
                        );
                        return Err(e);
                    }
                    log::warn!("FrameDecoder: skipping corrupt packet ({}), retrying", e);
                }
                Err(e) => return Err(e),
            }
        }
    }

    fn drain_one(&mut self) -> Result<VideoFrame> {
        match self.backend.drain()? {
            Some(raw) => self.emit(raw),
            None => Err(Error::EndOfStream),
        }
    }

    fn emit(&mut self, raw: crate::backend::RawFrame) -> Result<VideoFrame> {
        if raw.pixel_format != self.output_format {
            return Err(Error::Decode(format!(
                "backend produced a {:?} frame, engine is configured for {:?}",
                raw.pixel_format, self.output_format
            )));
        }

        let expected = raw.pixel_format.frame_size(raw.width, raw.height);
        if raw.data.len() != expected {
            return Err(Error::Decode(format!(
                "backend produced {} bytes for a {}x{} {:?} frame (expected {})",
                raw.data.len(),
                raw.width,
                raw.height,
                raw.pixel_format,
                expected
            )));
        }

        let frame = VideoFrame {
            data: raw.data,
            width: raw.width,
            height: raw.height,
            pts_ms: raw.pts_ms,
            duration_ms: self.frame_duration_ms,
            is_keyframe: raw.is_keyframe,
            pixel_format: raw.pixel_format,
        };

        self.state = match self.state {
            DecoderState::Idle | DecoderState::Primed => DecoderState::Streaming,
            DecoderState::Streaming => DecoderState::Streaming,
        };

        log::trace!(
            "FrameDecoder: emitted frame at {} ms (keyframe: {})",
            frame.pts_ms,
            frame.is_keyframe
        );
        Ok(frame)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::mock::{MockBackend, MockMedia};
    use crate::backend::MediaBackend;
    use crate::index::SeekIndex;
    use std::path::Path;

    fn open(media: MockMedia) -> (ContainerReader, FrameDecoder, SeekIndex) {
        let backend = MockBackend::new(media);
        let demuxer = backend.open_container(Path::new("/clip.mp4")).unwrap();
        let mut reader = ContainerReader::new(demuxer);

        let info = reader.info().clone();
        let stream = info.primary_video().unwrap();
        let decoder_backend = backend
            .create_decoder(stream, PixelFormat::Bgra)
            .unwrap();
        let decoder = FrameDecoder::new(
            decoder_backend,
            stream.index,
            stream.frame_rate,
            PixelFormat::Bgra,
            3,
        );

        let index = SeekIndex::build(&mut reader, stream.index, info.duration_ms).unwrap();
        (reader, decoder, index)
    }

    #[test]
    fn test_decode_from_start_in_presentation_order() {
        let (mut reader, mut decoder, index) = open(MockMedia {
            duration_ms: 1_000,
            frame_rate: 10.0,
            ..MockMedia::default()
        });

        decoder
            .reset_to(&mut reader, &index.first_keyframe().unwrap())
            .unwrap();
        assert_eq!(decoder.state(), DecoderState::Idle);

        let mut last_pts = -1;
        let mut count = 0;
        loop {
            match decoder.decode_next(&mut reader) {
                Ok(frame) => {
                    assert!(frame.pts_ms > last_pts);
                    last_pts = frame.pts_ms;
                    count += 1;
                }
                Err(Error::EndOfStream) => break,
                Err(e) => panic!("unexpected error: {}", e),
            }
        }
        assert_eq!(count, 10);
        assert_eq!(decoder.state(), DecoderState::Streaming);
    }

    #[test]
    fn test_frame_in_unexpected_format_is_rejected() {
        let (mut reader, mut decoder, index) = open(MockMedia {
            duration_ms: 500,
            frame_rate: 10.0,
            force_pixel_format: Some(PixelFormat::Yuv420p),
            ..MockMedia::default()
        });

        decoder
            .reset_to(&mut reader, &index.first_keyframe().unwrap())
            .unwrap();

        // The decoder was asked for Bgra; a backend that hands back
        // Yuv420p anyway must surface an error, not a mis-sized frame
        assert!(matches!(
            decoder.decode_next(&mut reader),
            Err(Error::Decode(_))
        ));
    }

    #[test]
    fn test_idle_drops_inter_packets_until_keyframe() {
        let (mut reader, mut decoder, index) = open(MockMedia {
            duration_ms: 2_000,
            frame_rate: 10.0,
            gop_size: 5,
            ..MockMedia::default()
        });

        // Reposition onto the second GOP's keyframe (pts 500 ms)
        let entry = index.nearest_keyframe_at_or_before(700).unwrap();
        assert_eq!(entry.timestamp_ms, 500);
        decoder.reset_to(&mut reader, &entry).unwrap();

        // First frame out must be the keyframe itself, never an inter frame
        let frame = decoder.decode_next(&mut reader).unwrap();
        assert_eq!(frame.pts_ms, 500);
        assert!(frame.is_keyframe);
    }

    #[test]
    fn test_reset_onto_inter_packet_recovers_at_next_keyframe() {
        let (mut reader, mut decoder, _) = open(MockMedia {
            duration_ms: 2_000,
            frame_rate: 10.0,
            gop_size: 5,
            ..MockMedia::default()
        });

        // Find the byte offset of the inter packet at 600 ms
        reader.seek_bytes(0).unwrap();
        let inter = loop {
            let p = reader.next_packet_for(0).unwrap().unwrap();
            if p.pts_ms == 600 {
                assert!(!p.is_keyframe);
                break p;
            }
        };

        // Repositioning mid-GOP must not decode inter frames without
        // their reference chain; the decoder skips forward to 1000 ms
        let entry = SeekIndexEntry {
            timestamp_ms: inter.pts_ms,
            byte_offset: inter.byte_offset,
            is_keyframe: false,
        };
        decoder.reset_to(&mut reader, &entry).unwrap();

        let frame = decoder.decode_next(&mut reader).unwrap();
        assert_eq!(frame.pts_ms, 1_000);
        assert!(frame.is_keyframe);
    }

    #[test]
    fn test_corrupt_packet_skipped_within_bound() {
        let (mut reader, mut decoder, index) = open(MockMedia {
            duration_ms: 1_000,
            frame_rate: 10.0,
            gop_size: 100,
            corrupt_pts: vec![100, 200],
            ..MockMedia::default()
        });

        decoder
            .reset_to(&mut reader, &index.first_keyframe().unwrap())
            .unwrap();

        let frame = decoder.decode_next(&mut reader).unwrap();
        assert_eq!(frame.pts_ms, 0);

        // Packets at 100 and 200 ms are corrupt; the decoder skips both
        // and lands on 300 ms
        let frame = decoder.decode_next(&mut reader).unwrap();
        assert_eq!(frame.pts_ms, 300);
    }

    #[test]
    fn test_corrupt_run_exceeding_bound_surfaces_error() {
        let (mut reader, mut decoder, index) = open(MockMedia {
            duration_ms: 1_000,
            frame_rate: 10.0,
            gop_size: 100,
            corrupt_pts: vec![100, 200, 300, 400, 500],
            ..MockMedia::default()
        });

        decoder
            .reset_to(&mut reader, &index.first_keyframe().unwrap())
            .unwrap();
        decoder.decode_next(&mut reader).unwrap();

        let result = decoder.decode_next(&mut reader);
        assert!(matches!(result, Err(Error::Decode(_))));
    }

    #[test]
    fn test_end_of_stream_is_sticky() {
        let (mut reader, mut decoder, index) = open(MockMedia {
            duration_ms: 200,
            frame_rate: 10.0,
            ..MockMedia::default()
        });

        decoder
            .reset_to(&mut reader, &index.first_keyframe().unwrap())
            .unwrap();
        while decoder.decode_next(&mut reader).is_ok() {}
        assert!(matches!(
            decoder.decode_next(&mut reader),
            Err(Error::EndOfStream)
        ));
    }
}
