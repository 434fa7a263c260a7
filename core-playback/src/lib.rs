//! # Playback Module
//!
//! The player the session coordinator drives.
//!
//! ## Overview
//!
//! - [`PlayerAdapter`] - the contract: play, pause, stop, seek, volume
//! - [`PlayerEvent`] - state changes and completion, stamped with a generation
//! - [`StreamPlayer`] - concrete adapter: one decode task per item feeding an [`AudioSink`]
//! - [`SymphoniaDecoderFactory`] - opens local files through symphonia (feature `symphonia-decoder`)
//! - [`NullSink`] - discards samples, optionally at real-time pace
//!
//! ## Errors
//!
//! Failures never cross the event channel as panics. They surface as an
//! ERROR [`PlaybackState`](bridge_traits::PlaybackState) whose kind comes
//! from [`PlaybackError::kind`].

pub mod config;
pub mod error;
pub mod events;
pub mod sink;
pub mod stream_player;
pub mod traits;

#[cfg(feature = "symphonia-decoder")]
pub mod decoder;

pub use config::PlayerConfig;
pub use error::{PlaybackError, Result};
pub use events::{PlayerEvent, PlayerEventReceiver, PlayerEventSender};
pub use sink::NullSink;
pub use stream_player::StreamPlayer;
pub use traits::{
    AudioCodec, AudioDecoder, AudioFormat, AudioFrameChunk, AudioSink, AudioSource,
    DecoderFactory, PlayerAdapter, ProbeResult,
};

#[cfg(feature = "symphonia-decoder")]
pub use decoder::{SymphoniaDecoder, SymphoniaDecoderFactory};
