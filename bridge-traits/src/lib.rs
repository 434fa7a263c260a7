//! # Host Bridge Traits
//!
//! Capability traits the host must implement for the music session core, and
//! the data model those traits exchange.
//!
//! ## Overview
//!
//! The core never talks to a platform directly. Everything it needs from the
//! host (a media session, a notification shade, a foreground-service
//! controller, a clock, a log pipeline) is expressed as a trait here and
//! injected at startup.
//!
//! ## Traits
//!
//! ### Session Surface
//! - [`MediaSessionHost`](session::MediaSessionHost) - Metadata, playback state and active flag
//! - [`NotificationPoster`](notification::NotificationPoster) - Post/cancel the playback notification
//! - [`ForegroundService`](service::ForegroundService) - Keep the process alive while playing
//!
//! ### Utilities
//! - [`Clock`](time::Clock) - Time source for deterministic testing
//! - [`LoggerSink`](time::LoggerSink) - Forward structured logs to host logging
//!
//! ## Platform Requirements
//!
//! | Platform | Implementation Crate | Status |
//! |----------|---------------------|--------|
//! | Desktop  | `bridge-desktop`    | ✅ Available |
//! | Android  | TBD                 | 📋 Planned |
//!
//! ## Fail-Fast Strategy
//!
//! The core fails fast with descriptive errors when a required capability is missing:
//!
//! ```ignore
//! let session_host = builder.session_host
//!     .ok_or_else(|| Error::CapabilityMissing {
//!         capability: "MediaSessionHost".to_string(),
//!         message: "No media session host provided. \
//!                   Desktop: enable the desktop-shims feature. \
//!                   Mobile: inject platform-native adapter.".to_string(),
//!     })?;
//! ```
//!
//! ## Threading
//!
//! Session, notification and service methods are synchronous. They are invoked
//! from the single coordinator task and must return promptly; hosts that need
//! to hop threads should post the work and return. All traits require
//! `Send + Sync`.

pub mod error;
pub mod media;
pub mod notification;
pub mod playback;
pub mod service;
pub mod session;
pub mod time;

pub use error::BridgeError;

// Re-export commonly used types
pub use media::{
    MediaDescription, MediaFlag, MediaItem, MediaItemBuilder, MetadataKey, MetadataValue,
};
pub use notification::{NotificationAction, NotificationPoster, NotificationView};
pub use playback::{ErrorKind, PlaybackActions, PlaybackState, PlaybackStatus, RepeatMode};
pub use service::ForegroundService;
pub use session::{MediaSessionHost, SessionToken};
pub use time::{Clock, ConsoleLogger, LogEntry, LogLevel, LoggerSink, SystemClock};
