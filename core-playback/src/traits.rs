//! # Core Playback Traits
//!
//! Abstractions the player is assembled from.
//!
//! ## Architecture
//!
//! ```text
//! MediaItem ─▶ DecoderFactory ─▶ AudioDecoder ─▶ AudioFrameChunk ─▶ AudioSink
//!                                     ▲
//!                         StreamPlayer worker (one task per item)
//! ```
//!
//! - [`DecoderFactory`] turns a catalog item into an opened [`AudioDecoder`].
//! - [`AudioDecoder`] produces interleaved `f32` PCM in chunks.
//! - [`AudioSink`] renders those chunks (a device, a file, or nothing at all).
//! - [`PlayerAdapter`] is the contract the session coordinator drives.
//!
//! ## Usage Example
//!
//! ```rust,no_run
//! use core_playback::AudioDecoder;
//! use std::time::Duration;
//!
//! async fn drain(mut decoder: Box<dyn AudioDecoder>) -> core_playback::Result<()> {
//!     let probe = decoder.probe().await?;
//!     println!("Format: {:?}", probe.format);
//!
//!     while let Some(chunk) = decoder.decode_frames(4096).await? {
//!         println!("Decoded {} frames", chunk.frames);
//!     }
//!
//!     decoder.seek(Duration::from_secs(30)).await
//! }
//! ```

use crate::error::{PlaybackError, Result};
use async_trait::async_trait;
use bridge_traits::media::MediaItem;
use bytes::Bytes;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

// ============================================================================
// Audio Format Types
// ============================================================================

/// Audio codec identifiers.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AudioCodec {
    Mp3,
    Aac,
    Flac,
    Vorbis,
    Opus,
    Wav,
    Alac,
    Unknown,
    Other(String),
}

impl AudioCodec {
    pub fn is_lossless(&self) -> bool {
        matches!(self, AudioCodec::Flac | AudioCodec::Wav | AudioCodec::Alac)
    }

    pub fn is_lossy(&self) -> bool {
        matches!(
            self,
            AudioCodec::Mp3 | AudioCodec::Aac | AudioCodec::Vorbis | AudioCodec::Opus
        )
    }
}

/// Stream parameters reported by a decoder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AudioFormat {
    pub codec: AudioCodec,
    /// Sample rate in Hz.
    pub sample_rate: u32,
    pub channels: u16,
    pub bits_per_sample: Option<u16>,
    /// Bitrate in bits per second, when known.
    pub bitrate: Option<u32>,
}

impl AudioFormat {
    pub fn new(
        codec: AudioCodec,
        sample_rate: u32,
        channels: u16,
        bits_per_sample: Option<u16>,
        bitrate: Option<u32>,
    ) -> Self {
        Self {
            codec,
            sample_rate,
            channels,
            bits_per_sample,
            bitrate,
        }
    }

    pub fn cd_quality() -> Self {
        Self::new(AudioCodec::Wav, 44100, 2, Some(16), None)
    }
}

// ============================================================================
// Audio Source Types
// ============================================================================

/// Where the encoded bytes of an item come from.
#[derive(Debug, Clone)]
pub enum AudioSource {
    /// File on the local filesystem.
    LocalFile { path: PathBuf },

    /// Network URL. Recognised so it can be rejected with a precise error.
    RemoteStream { url: String },

    /// Encoded bytes already in memory.
    Memory {
        data: Bytes,
        codec_hint: Option<AudioCodec>,
    },
}

impl AudioSource {
    /// Classify a catalog URI.
    ///
    /// `file://` URIs and plain paths map to [`AudioSource::LocalFile`];
    /// `http(s)://` maps to [`AudioSource::RemoteStream`]. Anything else,
    /// including an empty string, is [`PlaybackError::UnsupportedUri`].
    pub fn from_uri(uri: &str) -> Result<Self> {
        let uri = uri.trim();
        if uri.is_empty() {
            return Err(PlaybackError::UnsupportedUri("empty URI".to_string()));
        }

        match uri.split_once("://") {
            Some((scheme, rest)) => match scheme.to_ascii_lowercase().as_str() {
                "file" if !rest.is_empty() => Ok(AudioSource::LocalFile {
                    path: PathBuf::from(rest),
                }),
                "http" | "https" => Ok(AudioSource::RemoteStream {
                    url: uri.to_string(),
                }),
                _ => Err(PlaybackError::UnsupportedUri(uri.to_string())),
            },
            None => Ok(AudioSource::LocalFile {
                path: PathBuf::from(uri),
            }),
        }
    }

    pub fn is_remote(&self) -> bool {
        matches!(self, AudioSource::RemoteStream { .. })
    }

    pub fn estimated_size(&self) -> Option<usize> {
        match self {
            AudioSource::Memory { data, .. } => Some(data.len()),
            _ => None,
        }
    }
}

// ============================================================================
// Decoded Audio Data
// ============================================================================

/// A run of decoded PCM frames.
#[derive(Debug, Clone)]
pub struct AudioFrameChunk {
    /// Interleaved `f32` samples in `[-1.0, 1.0]`.
    pub samples: Vec<f32>,

    /// Frames in this chunk (samples / channels).
    pub frames: usize,

    /// Stream position of the first frame.
    pub timestamp: Duration,
}

impl AudioFrameChunk {
    pub fn new(samples: Vec<f32>, frames: usize, timestamp: Duration) -> Self {
        Self {
            samples,
            frames,
            timestamp,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.frames == 0 || self.samples.is_empty()
    }

    pub fn duration(&self, sample_rate: u32) -> Duration {
        if sample_rate == 0 {
            return Duration::from_secs(0);
        }
        Duration::from_secs_f64(self.frames as f64 / sample_rate as f64)
    }

    /// Stream position just past the last frame.
    pub fn end(&self, sample_rate: u32) -> Duration {
        self.timestamp + self.duration(sample_rate)
    }

    /// Multiply every sample by `gain`.
    pub fn apply_gain(&mut self, gain: f32) {
        if (gain - 1.0).abs() < f32::EPSILON {
            return;
        }
        for sample in &mut self.samples {
            *sample *= gain;
        }
    }
}

/// What a decoder learned about its stream.
#[derive(Debug, Clone)]
pub struct ProbeResult {
    pub format: AudioFormat,
    pub duration: Option<Duration>,
    pub tags: HashMap<String, String>,
}

impl ProbeResult {
    pub fn new(format: AudioFormat) -> Self {
        Self {
            format,
            duration: None,
            tags: HashMap::new(),
        }
    }

    pub fn with_duration(mut self, duration: Option<Duration>) -> Self {
        self.duration = duration;
        self
    }

    pub fn with_tags(mut self, tags: HashMap<String, String>) -> Self {
        self.tags = tags;
        self
    }
}

// ============================================================================
// Core Traits
// ============================================================================

/// Decoder for one opened stream.
#[async_trait]
pub trait AudioDecoder: Send {
    /// Report format and duration. Called once before decoding.
    async fn probe(&mut self) -> Result<ProbeResult>;

    /// Decode up to `max_frames` frames. `Ok(None)` is end of stream.
    async fn decode_frames(&mut self, max_frames: usize) -> Result<Option<AudioFrameChunk>>;

    /// Move to `position`. The next chunk starts there.
    async fn seek(&mut self, position: Duration) -> Result<()>;
}

/// Opens a decoder for a catalog item.
#[async_trait]
pub trait DecoderFactory: Send + Sync + 'static {
    async fn open(&self, item: &MediaItem) -> Result<Box<dyn AudioDecoder>>;
}

/// Renders decoded audio.
#[async_trait]
pub trait AudioSink: Send + Sync + 'static {
    /// Render one chunk. May wait for the device to drain.
    async fn write(&self, chunk: &AudioFrameChunk, format: &AudioFormat) -> Result<()>;

    /// Discard anything queued but not yet rendered (after seek or stop).
    async fn flush(&self) -> Result<()> {
        Ok(())
    }
}

/// Player contract driven by the session coordinator.
///
/// Every method returns immediately; the work happens on the player's own
/// task and the outcome is reported through [`PlayerEvent`](crate::PlayerEvent)s.
pub trait PlayerAdapter: Send {
    /// Release any previous item and start `item`: PREPARING then PLAYING.
    ///
    /// The same item while paused resumes it instead.
    fn play_from_media(&mut self, item: Arc<MediaItem>);

    /// PLAYING → PAUSED. No-op in any other state.
    fn pause(&mut self);

    /// Any non-idle state → STOPPED, including an item that already
    /// reported COMPLETED. Releases the decoder.
    fn stop(&mut self);

    /// Seek within the current item, clamped to `[0, duration]`.
    /// Only honoured while PLAYING or PAUSED.
    fn seek_to(&mut self, position_ms: u64);

    /// Output gain, clamped to `[0.0, 1.0]`.
    fn set_volume(&mut self, volume: f32);

    /// Item of the most recent `play_from_media`.
    fn current_media(&self) -> Option<Arc<MediaItem>>;

    /// Generation of the most recent `play_from_media`.
    fn generation(&self) -> u64;
}
