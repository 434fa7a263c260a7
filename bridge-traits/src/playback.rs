//! Playback state model shared by the player, the coordinator and the host.
//!
//! A [`PlaybackState`] is what the host media-session framework receives on
//! every change: the lifecycle status, the position basis it was valid at and
//! the set of transport actions controllers may offer in that status.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{BitOr, BitOrAssign};

/// Classification of player failures surfaced to the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// Malformed URI, missing file or unsupported scheme.
    SourceUnavailable,
    /// Probe or decode failure.
    DecodeFailed,
    /// Audio output (sink/render) failure.
    TransportFailed,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ErrorKind::SourceUnavailable => "source unavailable",
            ErrorKind::DecodeFailed => "decode failed",
            ErrorKind::TransportFailed => "transport failed",
        };
        f.write_str(label)
    }
}

/// Player lifecycle status.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum PlaybackStatus {
    None,
    Preparing,
    Playing,
    Paused,
    Stopped,
    Completed,
    Error { kind: ErrorKind, message: String },
}

impl PlaybackStatus {
    /// Upper-case label used in logs.
    pub fn name(&self) -> &'static str {
        match self {
            PlaybackStatus::None => "NONE",
            PlaybackStatus::Preparing => "PREPARING",
            PlaybackStatus::Playing => "PLAYING",
            PlaybackStatus::Paused => "PAUSED",
            PlaybackStatus::Stopped => "STOPPED",
            PlaybackStatus::Completed => "COMPLETED",
            PlaybackStatus::Error { .. } => "ERROR",
        }
    }

    pub fn is_playing(&self) -> bool {
        matches!(self, PlaybackStatus::Playing)
    }

    pub fn is_error(&self) -> bool {
        matches!(self, PlaybackStatus::Error { .. })
    }

    /// Whether no further events will be produced for the current item.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            PlaybackStatus::Stopped | PlaybackStatus::Completed | PlaybackStatus::Error { .. }
        )
    }
}

impl fmt::Display for PlaybackStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlaybackStatus::Error { kind, message } => write!(f, "ERROR({}: {})", kind, message),
            other => f.write_str(other.name()),
        }
    }
}

/// Bitset of transport actions a controller may offer.
///
/// Bit values follow the media-session framework convention so hosts can
/// forward them unchanged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlaybackActions(u64);

impl PlaybackActions {
    pub const NONE: Self = Self(0);
    pub const STOP: Self = Self(1 << 0);
    pub const PAUSE: Self = Self(1 << 1);
    pub const PLAY: Self = Self(1 << 2);
    pub const REWIND: Self = Self(1 << 3);
    pub const SKIP_TO_PREVIOUS: Self = Self(1 << 4);
    pub const SKIP_TO_NEXT: Self = Self(1 << 5);
    pub const FAST_FORWARD: Self = Self(1 << 6);
    pub const SEEK_TO: Self = Self(1 << 8);
    pub const PLAY_PAUSE: Self = Self(1 << 9);
    pub const PLAY_FROM_MEDIA_ID: Self = Self(1 << 10);
    pub const PLAY_FROM_SEARCH: Self = Self(1 << 11);

    /// Actions offered in every status.
    pub const ALWAYS: Self = Self(
        Self::PLAY_FROM_MEDIA_ID.0
            | Self::PLAY_FROM_SEARCH.0
            | Self::SKIP_TO_NEXT.0
            | Self::SKIP_TO_PREVIOUS.0,
    );

    pub const fn from_bits(bits: u64) -> Self {
        Self(bits)
    }

    pub const fn bits(&self) -> u64 {
        self.0
    }

    pub const fn contains(&self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    pub const fn is_empty(&self) -> bool {
        self.0 == 0
    }

    /// Allowed actions for a status.
    pub fn for_status(status: &PlaybackStatus) -> Self {
        let specific = match status {
            PlaybackStatus::Stopped => Self::PLAY | Self::PAUSE,
            PlaybackStatus::Playing => Self::STOP | Self::PAUSE | Self::SEEK_TO,
            PlaybackStatus::Paused => Self::PLAY | Self::STOP,
            _ => Self::PLAY | Self::PLAY_PAUSE | Self::STOP | Self::PAUSE,
        };
        Self::ALWAYS | specific
    }
}

impl BitOr for PlaybackActions {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self::Output {
        Self(self.0 | rhs.0)
    }
}

impl BitOrAssign for PlaybackActions {
    fn bitor_assign(&mut self, rhs: Self) {
        self.0 |= rhs.0;
    }
}

/// Snapshot of the player as pushed to the session framework.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlaybackState {
    pub status: PlaybackStatus,
    /// Position in milliseconds, valid at `updated_at`.
    pub position_ms: u64,
    pub updated_at: DateTime<Utc>,
    /// Rate at which the position advances from `updated_at`.
    pub speed: f32,
    pub actions: PlaybackActions,
}

impl PlaybackState {
    /// Build a state with the actions and speed implied by `status`.
    pub fn new(status: PlaybackStatus, position_ms: u64, updated_at: DateTime<Utc>) -> Self {
        let speed = if status.is_playing() { 1.0 } else { 0.0 };
        let actions = PlaybackActions::for_status(&status);
        Self {
            status,
            position_ms,
            updated_at,
            speed,
            actions,
        }
    }

    /// Error state for `kind` at the given position.
    pub fn error(
        kind: ErrorKind,
        message: impl Into<String>,
        position_ms: u64,
        updated_at: DateTime<Utc>,
    ) -> Self {
        Self::new(
            PlaybackStatus::Error {
                kind,
                message: message.into(),
            },
            position_ms,
            updated_at,
        )
    }

    /// Position extrapolated to `now` using the playback speed.
    pub fn position_at(&self, now: DateTime<Utc>) -> u64 {
        let elapsed = (now - self.updated_at).num_milliseconds().max(0) as f64;
        self.position_ms + (elapsed * self.speed as f64) as u64
    }
}

/// Queue policy applied by the catalog cursor at its ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RepeatMode {
    /// Stop at either end of the queue.
    None,
    /// Keep returning the current item.
    One,
    /// Wrap around at both ends.
    #[default]
    All,
}
