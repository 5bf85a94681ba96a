//! Seek index
//!
//! Sparse table mapping presentation timestamps to byte offsets, built by a
//! single full packet scan at load time. Random access then resolves a
//! requested timestamp to the nearest preceding keyframe in logarithmic
//! time instead of rescanning the container.

use crate::container::ContainerReader;
use crate::error::{Error, Result};

/// One scanned packet position
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SeekIndexEntry {
    /// Presentation timestamp in milliseconds
    pub timestamp_ms: i64,

    /// Byte offset of the packet within the container
    pub byte_offset: i64,

    /// Whether the packet at this position is a keyframe
    pub is_keyframe: bool,
}

/// Timestamp-to-offset index for one video stream.
///
/// Entries are sorted ascending by timestamp, ties by byte offset. The
/// keyframe subset is kept separately so keyframe lookups binary-search
/// a dense array instead of scanning past inter-frame entries.
pub struct SeekIndex {
    entries: Vec<SeekIndexEntry>,

    /// Keyframe entries only, same ordering as `entries`
    keyframes: Vec<SeekIndexEntry>,

    /// Stream duration; queries at or past this are out of range
    coverage_ms: i64,
}

impl SeekIndex {
    /// Build the index by scanning every packet of the given stream.
    ///
    /// O(stream length), done once per loaded resource. Leaves the reader
    /// cursor at end of stream; callers reposition before decoding.
    pub fn build(
        reader: &mut ContainerReader,
        stream_index: usize,
        coverage_ms: i64,
    ) -> Result<Self> {
        reader.seek_bytes(0)?;

        let mut entries = Vec::new();
        while let Some(packet) = reader.next_packet_for(stream_index)? {
            entries.push(SeekIndexEntry {
                timestamp_ms: packet.pts_ms,
                byte_offset: packet.byte_offset,
                is_keyframe: packet.is_keyframe,
            });
        }

        // Container order is not presentation order for streams with
        // reordered frames
        entries.sort_by_key(|e| (e.timestamp_ms, e.byte_offset));

        let keyframes: Vec<SeekIndexEntry> =
            entries.iter().filter(|e| e.is_keyframe).copied().collect();
        log::info!(
            "Seek index built: {} entries, {} keyframes, coverage {} ms",
            entries.len(),
            keyframes.len(),
            coverage_ms
        );

        Ok(Self {
            entries,
            keyframes,
            coverage_ms,
        })
    }

    /// Locate the keyframe with the greatest timestamp at or before the
    /// query. Duplicate timestamps resolve to the lowest byte offset.
    ///
    /// Falls back to the first keyframe when the query precedes every
    /// keyframe (the decode loop then discards frames up to the target).
    pub fn nearest_keyframe_at_or_before(&self, timestamp_ms: i64) -> Result<SeekIndexEntry> {
        if timestamp_ms < 0 || timestamp_ms >= self.coverage_ms {
            return Err(Error::OutOfRange {
                timestamp_ms,
                duration_ms: self.coverage_ms,
            });
        }

        // Upper bound: first keyframe with timestamp > query
        let hi = self
            .keyframes
            .partition_point(|e| e.timestamp_ms <= timestamp_ms);

        if hi == 0 {
            return self
                .first_keyframe()
                .ok_or_else(|| Error::CorruptHeader("no keyframes in stream".into()));
        }

        // Lowest offset among keyframes sharing the winning timestamp
        let winner_ms = self.keyframes[hi - 1].timestamp_ms;
        let lo = self
            .keyframes
            .partition_point(|e| e.timestamp_ms < winner_ms);

        Ok(self.keyframes[lo])
    }

    /// Smallest indexed timestamp at or after the query, if any
    pub fn next_timestamp_at_or_after(&self, timestamp_ms: i64) -> Option<i64> {
        let lo = self
            .entries
            .partition_point(|e| e.timestamp_ms < timestamp_ms);
        self.entries.get(lo).map(|e| e.timestamp_ms)
    }

    /// Greatest indexed timestamp, if any
    pub fn last_timestamp(&self) -> Option<i64> {
        self.entries.last().map(|e| e.timestamp_ms)
    }

    /// First keyframe in the stream, if any
    pub fn first_keyframe(&self) -> Option<SeekIndexEntry> {
        self.keyframes.first().copied()
    }

    /// Number of indexed packets
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Timestamp bound covered by this index
    pub fn coverage_ms(&self) -> i64 {
        self.coverage_ms
    }

    #[cfg(test)]
    fn from_entries(entries: Vec<SeekIndexEntry>, coverage_ms: i64) -> Self {
        let keyframes = entries.iter().filter(|e| e.is_keyframe).copied().collect();
        Self {
            entries,
            keyframes,
            coverage_ms,
        }
    }
}
