//! Foreground-service lifecycle policy.
//!
//! Maps playback statuses onto host foreground-service calls and tracks the
//! service lifecycle flag. Every `start_service` opens a started period and
//! every `detach_foreground(true)` closes one, so
//! `started_periods - removals` is always the flag (0 or 1).

use bridge_traits::notification::NotificationView;
use bridge_traits::playback::PlaybackStatus;
use bridge_traits::service::ForegroundService;
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::notification::NOTIFICATION_ID;

/// Lifecycle transition applied after a playback state is published.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleAction {
    MoveToStarted,
    RefreshNotification,
    MoveOutOfStarted,
}

impl LifecycleAction {
    /// PLAYING starts, PAUSED refreshes, STOPPED and ERROR end the started
    /// period. Other statuses leave the lifecycle alone.
    pub fn for_status(status: &PlaybackStatus) -> Option<Self> {
        match status {
            PlaybackStatus::Playing => Some(Self::MoveToStarted),
            PlaybackStatus::Paused => Some(Self::RefreshNotification),
            PlaybackStatus::Stopped | PlaybackStatus::Error { .. } => Some(Self::MoveOutOfStarted),
            PlaybackStatus::None | PlaybackStatus::Preparing | PlaybackStatus::Completed => None,
        }
    }
}

pub struct ForegroundLifecycle {
    service: Arc<dyn ForegroundService>,
    started: bool,
    started_periods: usize,
    removals: usize,
}

impl ForegroundLifecycle {
    pub fn new(service: Arc<dyn ForegroundService>) -> Self {
        Self {
            service,
            started: false,
            started_periods: 0,
            removals: 0,
        }
    }

    /// Service lifecycle flag.
    pub fn is_started(&self) -> bool {
        self.started
    }

    /// `start_service` calls issued so far.
    pub fn started_periods(&self) -> usize {
        self.started_periods
    }

    /// `detach_foreground(true)` calls issued so far.
    pub fn removals(&self) -> usize {
        self.removals
    }

    /// Start the service if needed, then attach `view` as the foreground
    /// notification. Returns whether a new started period began.
    pub fn move_to_started(&mut self, view: &NotificationView) -> bool {
        let opened = !self.started;
        if opened {
            if let Err(e) = self.service.start_service() {
                warn!(error = %e, "Host refused to start the service");
            }
            self.started = true;
            self.started_periods += 1;
            info!(period = self.started_periods, "Service moved to started");
        }

        if let Err(e) = self.service.start_in_foreground(NOTIFICATION_ID, view) {
            warn!(error = %e, "Failed to attach foreground notification");
        }
        opened
    }

    /// Leave foreground mode but keep the notification so it can be swiped away.
    pub fn detach_keeping_notification(&mut self) {
        debug!("Detaching foreground, keeping notification");
        if let Err(e) = self.service.detach_foreground(false) {
            warn!(error = %e, "Failed to detach foreground");
        }
    }

    /// End the started period. Only issues the removal when one is open.
    /// Returns whether a started period was closed.
    pub fn move_out_of_started(&mut self) -> bool {
        let was_started = self.started;
        if was_started {
            if let Err(e) = self.service.detach_foreground(true) {
                warn!(error = %e, "Failed to remove foreground notification");
            }
            self.removals += 1;
        }
        if let Err(e) = self.service.stop_self() {
            warn!(error = %e, "Failed to stop service");
        }
        self.started = false;
        if was_started {
            info!("Service moved out of started");
        }
        was_started
    }
}
