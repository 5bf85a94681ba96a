//! Container reader
//!
//! Wraps a backend demuxer and owns the single read cursor over the
//! container. Packet iteration is demand-driven: the caller pulls packets
//! one at a time, optionally restricted to a single stream.

use crate::backend::{Demuxer, Packet};
use crate::error::Result;

pub mod info;

pub use info::{CodecInfo, ContainerInfo, StreamParams, TrackKind};

/// Demand-driven packet reader for one opened container.
///
/// Only one iteration can be active at a time; every read advances the
/// internal cursor. Re-calling [`seek_bytes`](ContainerReader::seek_bytes)
/// restarts iteration from a new position.
pub struct ContainerReader {
    demuxer: Box<dyn Demuxer>,

    /// Byte offset of the last packet handed out
    cursor: i64,
}

impl ContainerReader {
    /// Wrap an opened demuxer
    pub fn new(demuxer: Box<dyn Demuxer>) -> Self {
        Self { demuxer, cursor: 0 }
    }

    /// Container-level metadata
    pub fn info(&self) -> &ContainerInfo {
        self.demuxer.info()
    }

    /// Reposition the read cursor at or before the given byte offset
    pub fn seek_bytes(&mut self, byte_offset: i64) -> Result<()> {
        log::debug!("ContainerReader: seeking to byte offset {}", byte_offset);
        self.demuxer.seek_bytes(byte_offset)?;
        self.cursor = byte_offset;
        Ok(())
    }

    /// Read the next packet in container order, any stream
    pub fn next_packet(&mut self) -> Result<Option<Packet>> {
        let packet = self.demuxer.read_packet()?;
        if let Some(ref p) = packet {
            self.cursor = p.byte_offset;
        }
        Ok(packet)
    }

    /// Read the next packet belonging to the given stream, skipping packets
    /// from other streams
    pub fn next_packet_for(&mut self, stream_index: usize) -> Result<Option<Packet>> {
        loop {
            match self.next_packet()? {
                Some(p) if p.stream_index == stream_index => return Ok(Some(p)),
                Some(p) => {
                    log::trace!(
                        "ContainerReader: skipping packet from stream {} at {} ms",
                        p.stream_index,
                        p.pts_ms
                    );
                }
                None => return Ok(None),
            }
        }
    }

    /// Byte offset of the last packet handed out
    pub fn cursor(&self) -> i64 {
        self.cursor
    }
}
