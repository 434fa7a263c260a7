//! Foreground-service bridge.

use crate::{error::Result, notification::NotificationView};

/// Controls the host's long-running playback service.
///
/// The host keeps the process alive while the service is started. A started
/// period begins with [`start_service`](Self::start_service) and ends with
/// [`stop_self`](Self::stop_self); in between the notification may be
/// (re-)attached as the foreground notification any number of times.
pub trait ForegroundService: Send + Sync {
    /// Start the host service in foreground mode.
    fn start_service(&self) -> Result<()>;

    /// Attach `notification` as the foreground notification under `id`.
    fn start_in_foreground(&self, id: u32, notification: &NotificationView) -> Result<()>;

    /// Leave foreground mode, optionally removing the notification.
    fn detach_foreground(&self, remove_notification: bool) -> Result<()>;

    /// Stop the service.
    fn stop_self(&self) -> Result<()>;
}
