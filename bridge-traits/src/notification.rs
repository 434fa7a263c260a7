//! Notification bridge.
//!
//! The core describes the playback notification as a [`NotificationView`];
//! hosts render it with their native notification subsystem.

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Button shown on the playback notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationAction {
    Previous,
    Play,
    Pause,
    Next,
    /// Delete/stop intent fired when the user dismisses the notification.
    Stop,
}

/// Platform-neutral description of the playback notification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationView {
    pub channel_id: String,
    pub notification_id: u32,
    pub title: Option<String>,
    pub artist: Option<String>,
    pub album: Option<String>,
    pub art_uri: Option<String>,
    pub actions: Vec<NotificationAction>,
    /// Deep link opened when the notification body is tapped.
    pub content_intent: String,
    /// Whether the user can swipe the notification away.
    pub ongoing: bool,
    pub small_icon: String,
}

impl NotificationView {
    pub fn has_action(&self, action: NotificationAction) -> bool {
        self.actions.contains(&action)
    }
}

/// Posts and cancels notifications on behalf of the core.
///
/// Calls are made from the coordinator task and must not block.
pub trait NotificationPoster: Send + Sync {
    /// Post or replace the notification with the given id.
    fn notify(&self, id: u32, view: &NotificationView) -> Result<()>;

    /// Remove the notification with the given id. Unknown ids are ignored.
    fn cancel(&self, id: u32) -> Result<()>;
}
