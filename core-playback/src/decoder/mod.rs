//! # Audio Decoder Module
//!
//! Symphonia-backed implementation of [`AudioDecoder`](crate::AudioDecoder)
//! and the [`DecoderFactory`](crate::DecoderFactory) the player opens items
//! through.
//!
//! ```text
//! AudioSource → MediaSourceStream → FormatReader → Decoder → AudioFrameChunk
//! ```
//!
//! ## Usage Example
//!
//! ```rust,no_run
//! use core_playback::{AudioDecoder, AudioSource, SymphoniaDecoder};
//!
//! # async fn example() -> core_playback::Result<()> {
//! let source = AudioSource::from_uri("file:///music/song.flac")?;
//! let mut decoder = SymphoniaDecoder::open(source)?;
//!
//! let probe = decoder.probe().await?;
//! println!("Format: {:?}, Duration: {:?}", probe.format.codec, probe.duration);
//!
//! while let Some(chunk) = decoder.decode_frames(4096).await? {
//!     println!("Decoded {} frames", chunk.frames);
//! }
//! # Ok(())
//! # }
//! ```

mod format_detector;
mod sample_converter;
mod symphonia;

pub use self::symphonia::{SymphoniaDecoder, SymphoniaDecoderFactory};
pub use format_detector::FormatDetector;
pub use sample_converter::SampleConverter;
