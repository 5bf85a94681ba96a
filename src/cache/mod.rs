//! Frame cache module
//!
//! Bounded LRU cache of recently decoded frames, keyed by the *actual*
//! decoded presentation timestamp. Keying by actual pts avoids incorrect
//! hits when distinct requested timestamps resolve to the same frame. The
//! cache is engine-scoped and cleared wholesale whenever a new resource is
//! loaded.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::RwLock;

use crate::decoder::VideoFrame;

/// Cache statistics
#[derive(Debug, Clone, Default)]
pub struct CacheStatistics {
    /// Entry count
    pub entries: usize,

    /// Hit count
    pub hit_count: u64,

    /// Miss count
    pub miss_count: u64,

    /// Memory usage in bytes
    pub memory_usage_bytes: u64,
}

impl CacheStatistics {
    /// Total accesses
    pub fn total_accesses(&self) -> u64 {
        self.hit_count + self.miss_count
    }

    /// Hit rate (0.0 - 1.0)
    pub fn hit_rate(&self) -> f64 {
        let total = self.total_accesses();
        if total == 0 {
            return 0.0;
        }
        self.hit_count as f64 / total as f64
    }
}

struct Inner {
    frames: HashMap<i64, VideoFrame>,

    /// Access order, least recently used first
    order: Vec<i64>,
}

impl Inner {
    fn touch(&mut self, pts_ms: i64) {
        if let Some(pos) = self.order.iter().position(|&k| k == pts_ms) {
            self.order.remove(pos);
            self.order.push(pts_ms);
        }
    }
}

/// Bounded LRU frame cache
pub struct FrameCache {
    capacity: usize,
    inner: RwLock<Inner>,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl FrameCache {
    /// Create a new cache with the given capacity
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            inner: RwLock::new(Inner {
                frames: HashMap::new(),
                order: Vec::new(),
            }),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }

    /// Get the frame with exactly this decoded pts
    pub fn get(&self, pts_ms: i64) -> Option<VideoFrame> {
        let mut inner = self.inner.write();
        if let Some(frame) = inner.frames.get(&pts_ms).cloned() {
            inner.touch(pts_ms);
            self.hits.fetch_add(1, Ordering::Relaxed);
            Some(frame)
        } else {
            self.misses.fetch_add(1, Ordering::Relaxed);
            None
        }
    }

    /// Insert a frame keyed by its decoded pts, evicting the least recently
    /// used entry at capacity
    pub fn put(&self, pts_ms: i64, frame: VideoFrame) {
        let mut inner = self.inner.write();

        if inner.frames.contains_key(&pts_ms) {
            inner.frames.insert(pts_ms, frame);
            inner.touch(pts_ms);
            return;
        }

        while inner.frames.len() >= self.capacity && !inner.order.is_empty() {
            let oldest = inner.order.remove(0);
            inner.frames.remove(&oldest);
        }

        inner.frames.insert(pts_ms, frame);
        inner.order.push(pts_ms);
    }

    /// Clear all entries. Hit/miss counters survive; they describe the
    /// engine's lifetime, not one resource.
    pub fn clear(&self) {
        let mut inner = self.inner.write();
        inner.frames.clear();
        inner.order.clear();
    }

    /// Configured capacity
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Get statistics
    pub fn statistics(&self) -> CacheStatistics {
        let inner = self.inner.read();
        let memory: usize = inner.frames.values().map(|f| f.data.len()).sum();

        CacheStatistics {
            entries: inner.frames.len(),
            hit_count: self.hits.load(Ordering::Relaxed),
            miss_count: self.misses.load(Ordering::Relaxed),
            memory_usage_bytes: memory as u64,
        }
    }
}
