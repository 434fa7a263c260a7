//! # Desktop Bridge Implementations
//!
//! Default implementations of the session bridge traits for desktop
//! platforms (macOS, Windows, Linux) and headless runs.
//!
//! ## Overview
//!
//! - `MediaSessionHost` via [`TracingSessionHost`], which records what the core
//!   publishes and mirrors it to `tracing`
//! - `ForegroundService` via [`DesktopForegroundService`], an in-process
//!   lifecycle tracker (desktop processes need no foreground service)
//! - `NotificationPoster` via [`LogNotificationPoster`]
//!
//! ## Usage
//!
//! ```ignore
//! use bridge_desktop::{DesktopForegroundService, LogNotificationPoster, TracingSessionHost};
//! use std::sync::Arc;
//!
//! let config = CoreConfig::builder()
//!     .session_host(Arc::new(TracingSessionHost::new()))
//!     .foreground_service(Arc::new(DesktopForegroundService::new()))
//!     .notification_poster(Arc::new(LogNotificationPoster::new()))
//!     .build()?;
//! ```

mod notification;
mod service;
mod session;

pub use notification::LogNotificationPoster;
pub use service::{DesktopForegroundService, ServiceStatus};
pub use session::TracingSessionHost;
