//! Foreground Service Implementation
//!
//! Desktop processes are never killed for lack of a foreground service, so
//! the controller only tracks the lifecycle the core requests.

use bridge_traits::{
    error::{BridgeError, Result},
    notification::NotificationView,
    service::ForegroundService,
};
use parking_lot::Mutex;
use tracing::{debug, info};

/// Where the desktop service currently sits in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ServiceStatus {
    #[default]
    Stopped,
    /// Started; notification detached or not yet attached.
    Started,
    /// Started with a foreground notification attached.
    Foreground,
}

#[derive(Debug, Default)]
struct ServiceState {
    status: ServiceStatus,
    foreground_id: Option<u32>,
    starts: usize,
}

/// In-process foreground service controller
#[derive(Default)]
pub struct DesktopForegroundService {
    state: Mutex<ServiceState>,
}

impl DesktopForegroundService {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn status(&self) -> ServiceStatus {
        self.state.lock().status
    }

    /// Number of started periods so far.
    pub fn start_count(&self) -> usize {
        self.state.lock().starts
    }
}

impl ForegroundService for DesktopForegroundService {
    fn start_service(&self) -> Result<()> {
        let mut state = self.state.lock();
        if state.status == ServiceStatus::Stopped {
            state.status = ServiceStatus::Started;
            state.starts += 1;
            info!(period = state.starts, "Desktop service started");
        }
        Ok(())
    }

    fn start_in_foreground(&self, id: u32, notification: &NotificationView) -> Result<()> {
        let mut state = self.state.lock();
        if state.status == ServiceStatus::Stopped {
            return Err(BridgeError::OperationFailed(
                "start_in_foreground called before start_service".to_string(),
            ));
        }
        state.status = ServiceStatus::Foreground;
        state.foreground_id = Some(id);
        debug!(
            id,
            title = notification.title.as_deref().unwrap_or_default(),
            "Foreground notification attached"
        );
        Ok(())
    }

    fn detach_foreground(&self, remove_notification: bool) -> Result<()> {
        let mut state = self.state.lock();
        if state.status == ServiceStatus::Foreground {
            state.status = ServiceStatus::Started;
        }
        if remove_notification {
            state.foreground_id = None;
        }
        debug!(remove_notification, "Foreground detached");
        Ok(())
    }

    fn stop_self(&self) -> Result<()> {
        let mut state = self.state.lock();
        if state.status != ServiceStatus::Stopped {
            info!("Desktop service stopped");
        }
        state.status = ServiceStatus::Stopped;
        state.foreground_id = None;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn view() -> NotificationView {
        NotificationView {
            channel_id: "msc.playback".to_string(),
            notification_id: 412,
            title: Some("Song".to_string()),
            artist: None,
            album: None,
            art_uri: None,
            actions: Vec::new(),
            content_intent: "session:test".to_string(),
            ongoing: true,
            small_icon: "ic_notification".to_string(),
        }
    }

    #[test]
    fn lifecycle_transitions() {
        let service = DesktopForegroundService::new();
        assert_eq!(service.status(), ServiceStatus::Stopped);

        service.start_service().unwrap();
        service.start_in_foreground(412, &view()).unwrap();
        assert_eq!(service.status(), ServiceStatus::Foreground);

        service.detach_foreground(false).unwrap();
        assert_eq!(service.status(), ServiceStatus::Started);

        service.stop_self().unwrap();
        assert_eq!(service.status(), ServiceStatus::Stopped);
        assert_eq!(service.start_count(), 1);
    }

    #[test]
    fn repeated_start_is_one_period() {
        let service = DesktopForegroundService::new();
        service.start_service().unwrap();
        service.start_service().unwrap();
        assert_eq!(service.start_count(), 1);
    }

    #[test]
    fn foreground_requires_started_service() {
        let service = DesktopForegroundService::new();
        assert!(service.start_in_foreground(412, &view()).is_err());
    }
}
