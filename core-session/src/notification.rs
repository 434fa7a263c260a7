//! Playback notification presenter.
//!
//! Turns `(item, state, session token)` into a [`NotificationView`] and posts
//! or cancels it. Holds no playback state of its own.

use bridge_traits::media::MediaItem;
use bridge_traits::notification::{NotificationAction, NotificationPoster, NotificationView};
use bridge_traits::playback::{PlaybackActions, PlaybackState};
use bridge_traits::session::SessionToken;
use bridge_traits::error::Result;
use std::sync::Arc;
use tracing::debug;

/// The one notification the service ever shows.
pub const NOTIFICATION_ID: u32 = 412;

/// Notification channel playback notifications are posted on.
pub const CHANNEL_ID: &str = "msc.playback";

const DEFAULT_SMALL_ICON: &str = "ic_stat_image_audiotrack";

pub struct NotificationPresenter {
    token: SessionToken,
    poster: Arc<dyn NotificationPoster>,
    small_icon: String,
}

impl NotificationPresenter {
    pub fn new(token: SessionToken, poster: Arc<dyn NotificationPoster>) -> Self {
        Self {
            token,
            poster,
            small_icon: DEFAULT_SMALL_ICON.to_string(),
        }
    }

    pub fn with_small_icon(mut self, icon: impl Into<String>) -> Self {
        self.small_icon = icon.into();
        self
    }

    pub fn token(&self) -> SessionToken {
        self.token
    }

    /// View for `item` in `state`. Swipe-dismissable unless playing.
    pub fn build(&self, item: Option<&MediaItem>, state: &PlaybackState) -> NotificationView {
        let text = |f: fn(&MediaItem) -> Option<&str>| item.and_then(f).map(str::to_string);

        NotificationView {
            channel_id: CHANNEL_ID.to_string(),
            notification_id: NOTIFICATION_ID,
            title: text(MediaItem::title),
            artist: text(MediaItem::artist),
            album: text(MediaItem::album),
            art_uri: text(MediaItem::art_uri),
            actions: actions_for(state),
            content_intent: self.token.to_string(),
            ongoing: state.status.is_playing(),
            small_icon: self.small_icon.clone(),
        }
    }

    /// View to attach as the foreground notification.
    pub fn foreground_notification(
        &self,
        item: Option<&MediaItem>,
        state: &PlaybackState,
    ) -> NotificationView {
        NotificationView {
            ongoing: true,
            ..self.build(item, state)
        }
    }

    /// Re-post the notification in place.
    pub fn refresh(&self, item: Option<&MediaItem>, state: &PlaybackState) -> Result<()> {
        let view = self.build(item, state);
        debug!(status = state.status.name(), "Refreshing playback notification");
        self.poster.notify(NOTIFICATION_ID, &view)
    }

    /// Remove the notification.
    pub fn detach(&self) -> Result<()> {
        debug!("Cancelling playback notification");
        self.poster.cancel(NOTIFICATION_ID)
    }
}

/// Buttons in display order: previous, play/pause, next, stop.
fn actions_for(state: &PlaybackState) -> Vec<NotificationAction> {
    let allowed = state.actions;
    let mut actions = Vec::with_capacity(4);

    if allowed.contains(PlaybackActions::SKIP_TO_PREVIOUS) {
        actions.push(NotificationAction::Previous);
    }
    if state.status.is_playing() {
        if allowed.contains(PlaybackActions::PAUSE) {
            actions.push(NotificationAction::Pause);
        }
    } else if allowed.contains(PlaybackActions::PLAY) {
        actions.push(NotificationAction::Play);
    }
    if allowed.contains(PlaybackActions::SKIP_TO_NEXT) {
        actions.push(NotificationAction::Next);
    }
    actions.push(NotificationAction::Stop);

    actions
}
