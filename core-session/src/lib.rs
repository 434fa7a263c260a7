//! # Session Module
//!
//! The media-session state machine: transport commands in, session metadata,
//! playback state, foreground lifecycle and notification out.
//!
//! ## Overview
//!
//! - [`SessionCoordinator`] - consumes [`TransportCommand`]s and player events
//! - [`NotificationPresenter`] - renders the playback notification
//! - [`ForegroundLifecycle`] - foreground-service policy and lifecycle flag
//! - [`SessionBrowser`] - root and listings for media-browser clients

pub mod browser;
pub mod command;
pub mod coordinator;
pub mod error;
pub mod lifecycle;
pub mod notification;

pub use browser::SessionBrowser;
pub use command::TransportCommand;
pub use coordinator::{SessionCoordinator, PREPARE_TIMEOUT_MESSAGE};
pub use error::{Result, SessionError};
pub use lifecycle::{ForegroundLifecycle, LifecycleAction};
pub use notification::{NotificationPresenter, CHANNEL_ID, NOTIFICATION_ID};
