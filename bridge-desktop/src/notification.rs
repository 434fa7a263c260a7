//! Notification Implementation

use bridge_traits::{
    error::Result,
    notification::{NotificationPoster, NotificationView},
};
use parking_lot::Mutex;
use std::collections::HashMap;
use tracing::{debug, info};

/// Notification poster that logs instead of rendering
///
/// Keeps the posted views so a desktop shell (tray icon, MPRIS bridge) can
/// render them on its own schedule.
#[derive(Default)]
pub struct LogNotificationPoster {
    posted: Mutex<HashMap<u32, NotificationView>>,
}

impl LogNotificationPoster {
    pub fn new() -> Self {
        Self::default()
    }

    /// Currently posted view for `id`.
    pub fn posted(&self, id: u32) -> Option<NotificationView> {
        self.posted.lock().get(&id).cloned()
    }

    pub fn posted_count(&self) -> usize {
        self.posted.lock().len()
    }
}

impl NotificationPoster for LogNotificationPoster {
    fn notify(&self, id: u32, view: &NotificationView) -> Result<()> {
        info!(
            id,
            channel = %view.channel_id,
            title = view.title.as_deref().unwrap_or_default(),
            artist = view.artist.as_deref().unwrap_or_default(),
            actions = ?view.actions,
            ongoing = view.ongoing,
            "Notification posted"
        );
        self.posted.lock().insert(id, view.clone());
        Ok(())
    }

    fn cancel(&self, id: u32) -> Result<()> {
        if self.posted.lock().remove(&id).is_some() {
            debug!(id, "Notification cancelled");
        }
        Ok(())
    }
}
