//! Video engine facade
//!
//! Orchestrates container reading, seek indexing, frame decoding, and the
//! frame cache behind a deliberately narrow surface: initialize, load,
//! metadata query, extract-frame-at-timestamp, shutdown. Platform bridges
//! wrap these five calls and nothing else.
//!
//! A single engine owns one decode cursor and one cache; it is not safe
//! for concurrent use from multiple threads without external
//! synchronization. Independent engine instances run fully in parallel.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use parking_lot::{Mutex, RwLock};

use crate::backend::MediaBackend;
use crate::cache::{CacheStatistics, FrameCache};
use crate::container::ContainerReader;
use crate::decoder::{EngineConfig, FrameDecoder};
use crate::error::{Error, Result};
use crate::index::SeekIndex;

/// Engine lifecycle state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineState {
    Uninitialized,
    Initialized,
    Loaded,
    Failed,
}

/// Metadata of the currently loaded video. Immutable once set by a
/// successful load; callers receive copies.
#[derive(Debug, Clone)]
pub struct VideoMetadata {
    /// Path the resource was loaded from
    pub source_path: PathBuf,

    /// Duration in milliseconds
    pub duration_ms: i64,

    /// Frame rate
    pub frame_rate: f64,

    /// Width in pixels
    pub width: u32,

    /// Height in pixels
    pub height: u32,

    /// Codec short name
    pub codec: String,

    /// Index of the decoded video stream
    pub stream_index: usize,
}

/// Everything tied to one opened resource. Reader and decoder share the
/// underlying handle and are created and destroyed together.
struct Session {
    reader: ContainerReader,
    decoder: FrameDecoder,
    index: SeekIndex,
    metadata: VideoMetadata,

    /// Bytes of one decoded frame at the configured pixel format
    frame_size: usize,
}

/// Video decoding and frame-extraction engine
pub struct VideoEngine {
    backend: Arc<dyn MediaBackend>,
    config: EngineConfig,
    state: RwLock<EngineState>,
    session: Mutex<Option<Session>>,

    /// Engine-scoped; cleared wholesale on every load
    cache: FrameCache,
}

impl VideoEngine {
    /// Create an engine on top of a decoder backend
    pub fn new(backend: Arc<dyn MediaBackend>, config: EngineConfig) -> Self {
        let cache = FrameCache::new(config.cache_capacity);
        Self {
            backend,
            config,
            state: RwLock::new(EngineState::Uninitialized),
            session: Mutex::new(None),
            cache,
        }
    }

    /// Initialize the engine. Idempotent: returns true when already
    /// initialized.
    pub fn initialize(&self) -> bool {
        let mut state = self.state.write();
        if *state != EngineState::Uninitialized {
            log::debug!("VideoEngine: already initialized");
            return true;
        }
        log::info!("VideoEngine {} initializing", crate::VERSION);
        *state = EngineState::Initialized;
        true
    }

    /// Current lifecycle state
    pub fn state(&self) -> EngineState {
        *self.state.read()
    }

    /// Load a video resource, replacing any previously loaded one.
    ///
    /// Opens the container, selects the first video stream, builds the
    /// seek index, and clears the frame cache. On failure the engine holds
    /// no resources and transitions to `Failed`.
    pub fn load_video<P: AsRef<Path>>(&self, path: P) -> Result<VideoMetadata> {
        if self.state() == EngineState::Uninitialized {
            return Err(Error::NotInitialized);
        }

        let path = path.as_ref();
        log::info!("VideoEngine: loading {}", path.display());

        let mut session_lock = self.session.lock();

        // Previous reader/decoder go together, before the new resource is
        // touched; no frames carry across sources
        *session_lock = None;
        self.cache.clear();

        match self.open_session(path) {
            Ok(session) => {
                let metadata = session.metadata.clone();
                log::info!(
                    "VideoEngine: loaded {}x{} {} @ {:.2} fps, {} ms",
                    metadata.width,
                    metadata.height,
                    metadata.codec,
                    metadata.frame_rate,
                    metadata.duration_ms
                );
                *session_lock = Some(session);
                *self.state.write() = EngineState::Loaded;
                Ok(metadata)
            }
            Err(e) => {
                log::warn!("VideoEngine: load failed: {}", e);
                *self.state.write() = EngineState::Failed;
                Err(e)
            }
        }
    }

    fn open_session(&self, path: &Path) -> Result<Session> {
        let demuxer = self.backend.open_container(path)?;
        let mut reader = ContainerReader::new(demuxer);

        let info = reader.info().clone();
        let stream = info
            .primary_video()
            .ok_or_else(|| {
                Error::UnsupportedFormat(format!(
                    "no decodable video stream in {}",
                    path.display()
                ))
            })?
            .clone();

        if stream.width == 0 || stream.height == 0 || stream.frame_rate <= 0.0 {
            return Err(Error::CorruptHeader(format!(
                "stream {} reports {}x{} @ {} fps",
                stream.index, stream.width, stream.height, stream.frame_rate
            )));
        }
        if info.duration_ms < 0 {
            return Err(Error::CorruptHeader(format!(
                "negative duration {} ms",
                info.duration_ms
            )));
        }

        let decoder_backend = self
            .backend
            .create_decoder(&stream, self.config.output_pixel_format)?;
        let decoder = FrameDecoder::new(
            decoder_backend,
            stream.index,
            stream.frame_rate,
            self.config.output_pixel_format,
            self.config.max_decode_retries,
        );

        let index = SeekIndex::build(&mut reader, stream.index, info.duration_ms)?;

        let metadata = VideoMetadata {
            source_path: path.to_path_buf(),
            duration_ms: info.duration_ms,
            frame_rate: stream.frame_rate,
            width: stream.width,
            height: stream.height,
            codec: stream.codec.name.clone(),
            stream_index: stream.index,
        };

        let frame_size = self
            .config
            .output_pixel_format
            .frame_size(stream.width, stream.height);

        Ok(Session {
            reader,
            decoder,
            index,
            metadata,
            frame_size,
        })
    }

    /// Metadata of the loaded video
    pub fn metadata(&self) -> Result<VideoMetadata> {
        let session = self.session.lock();
        session
            .as_ref()
            .map(|s| s.metadata.clone())
            .ok_or(Error::NotLoaded)
    }

    /// Extract the frame presented at the given timestamp.
    ///
    /// Writes exactly one decoded frame into `buffer` and returns the
    /// actual presentation timestamp reached: the first frame with
    /// pts ≥ the request, or the closest frame before end of stream.
    /// Nothing is written on error.
    pub fn extract_frame(&self, timestamp_ms: i64, buffer: &mut [u8]) -> Result<i64> {
        let mut session_lock = self.session.lock();
        let session = session_lock.as_mut().ok_or(Error::NotLoaded)?;

        let duration_ms = session.metadata.duration_ms;
        if timestamp_ms < 0 || timestamp_ms >= duration_ms {
            return Err(Error::OutOfRange {
                timestamp_ms,
                duration_ms,
            });
        }

        if buffer.len() < session.frame_size {
            return Err(Error::BufferTooSmall {
                required: session.frame_size,
                provided: buffer.len(),
            });
        }

        // The index knows every packet's pts, so the request resolves to
        // the exact frame timestamp it will land on: the first indexed pts
        // at or after the request, or the last frame at the stream tail.
        // The cache is then probed by that exact key.
        let target_pts = session
            .index
            .next_timestamp_at_or_after(timestamp_ms)
            .or_else(|| session.index.last_timestamp());
        if let Some(frame) = target_pts.and_then(|pts| self.cache.get(pts)) {
            log::debug!(
                "VideoEngine: cache hit for {} ms (frame at {} ms)",
                timestamp_ms,
                frame.pts_ms
            );
            frame.copy_into(buffer)?;
            return Ok(frame.pts_ms);
        }

        log::debug!("VideoEngine: cache miss for {} ms, decoding", timestamp_ms);

        // Decode from the nearest preceding keyframe forward; inter-frames
        // need their full reference chain
        let entry = session.index.nearest_keyframe_at_or_before(timestamp_ms)?;
        session.decoder.reset_to(&mut session.reader, &entry)?;

        let mut closest_before = None;
        loop {
            match session.decoder.decode_next(&mut session.reader) {
                Ok(frame) => {
                    self.cache.put(frame.pts_ms, frame.clone());

                    if frame.pts_ms >= timestamp_ms {
                        frame.copy_into(buffer)?;
                        return Ok(frame.pts_ms);
                    }
                    closest_before = Some(frame);
                }
                Err(Error::EndOfStream) => {
                    // Target lies past the last frame; hand back the
                    // closest one reached
                    return match closest_before {
                        Some(frame) => {
                            frame.copy_into(buffer)?;
                            Ok(frame.pts_ms)
                        }
                        None => Err(Error::EndOfStream),
                    };
                }
                Err(e) => return Err(e),
            }
        }
    }

    /// Release the loaded resource and return to `Uninitialized`
    pub fn shutdown(&self) {
        log::info!("VideoEngine: shutting down");
        *self.session.lock() = None;
        self.cache.clear();
        *self.state.write() = EngineState::Uninitialized;
    }

    /// Engine version
    pub fn version(&self) -> &'static str {
        crate::VERSION
    }

    /// Get cache statistics
    pub fn cache_statistics(&self) -> CacheStatistics {
        self.cache.statistics()
    }

    /// Clear the frame cache
    pub fn clear_cache(&self) {
        self.cache.clear();
    }

    /// Get configuration
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }
}
