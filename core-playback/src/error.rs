//! # Playback Error Types
//!
//! Errors raised while opening, decoding and rendering a media item.

use bridge_traits::playback::ErrorKind;
use thiserror::Error;

/// Errors that can occur during playback operations.
#[derive(Error, Debug)]
pub enum PlaybackError {
    // ========================================================================
    // Source Errors
    // ========================================================================
    /// Item carries no playable URI.
    #[error("Media item has no playable URI: {0}")]
    MissingMediaUri(String),

    /// URI could not be parsed or uses a scheme no decoder handles.
    #[error("Unsupported media URI: {0}")]
    UnsupportedUri(String),

    /// Audio source is unavailable (file deleted, permission denied).
    #[error("Audio source unavailable: {0}")]
    SourceUnavailable(String),

    // ========================================================================
    // Format/Codec Errors
    // ========================================================================
    /// Audio format is not recognized or cannot be parsed.
    #[error("Unsupported or invalid audio format: {0}")]
    InvalidFormat(String),

    /// Codec is not supported by the decoder.
    #[error("Unsupported codec: {0}")]
    UnsupportedCodec(String),

    // ========================================================================
    // Decoding Errors
    // ========================================================================
    /// Error occurred during audio decoding.
    #[error("Decoding error: {0}")]
    DecodingError(String),

    /// Audio stream is corrupted or contains invalid data.
    #[error("Corrupted audio stream: {0}")]
    CorruptedStream(String),

    /// Seek could not be performed on this stream.
    #[error("Seek failed: {0}")]
    SeekFailed(String),

    // ========================================================================
    // Output Errors
    // ========================================================================
    /// Audio sink rejected the samples or failed to render them.
    #[error("Audio sink error: {0}")]
    SinkError(String),

    /// The player's worker is gone.
    #[error("Player closed")]
    PlayerClosed,

    // ========================================================================
    // Generic Errors
    // ========================================================================
    /// I/O error occurred.
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// Internal error (should not occur in normal operation).
    #[error("Internal error: {0}")]
    Internal(String),
}

impl PlaybackError {
    /// Classification reported to the media session in an ERROR state.
    pub fn kind(&self) -> ErrorKind {
        match self {
            PlaybackError::MissingMediaUri(_)
            | PlaybackError::UnsupportedUri(_)
            | PlaybackError::SourceUnavailable(_)
            | PlaybackError::IoError(_) => ErrorKind::SourceUnavailable,
            PlaybackError::InvalidFormat(_)
            | PlaybackError::UnsupportedCodec(_)
            | PlaybackError::DecodingError(_)
            | PlaybackError::CorruptedStream(_)
            | PlaybackError::SeekFailed(_) => ErrorKind::DecodeFailed,
            PlaybackError::SinkError(_)
            | PlaybackError::PlayerClosed
            | PlaybackError::Internal(_) => ErrorKind::TransportFailed,
        }
    }

    /// Returns `true` if this error is transient and the operation can be retried.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            PlaybackError::SourceUnavailable(_) | PlaybackError::SinkError(_)
        )
    }

    /// Returns `true` if this error is related to audio format/codec issues.
    pub fn is_format_error(&self) -> bool {
        matches!(
            self,
            PlaybackError::InvalidFormat(_) | PlaybackError::UnsupportedCodec(_)
        )
    }
}

/// Result type for playback operations.
pub type Result<T> = std::result::Result<T, PlaybackError>;
