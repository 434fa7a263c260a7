//! Media Session Implementation

use bridge_traits::{
    error::{BridgeError, Result},
    media::MediaItem,
    playback::PlaybackState,
    session::{MediaSessionHost, SessionToken},
};
use parking_lot::Mutex;
use tracing::{debug, info};

#[derive(Debug, Default)]
struct SessionSnapshot {
    metadata: Option<MediaItem>,
    state: Option<PlaybackState>,
    active: bool,
    released: bool,
}

/// Desktop media session
///
/// Desktop targets have no system media-session framework the core can rely
/// on, so this host records what was published and mirrors it to `tracing`.
/// Hosts with MPRIS/SMTC integration can read the snapshot accessors to
/// drive their own controls.
pub struct TracingSessionHost {
    token: SessionToken,
    inner: Mutex<SessionSnapshot>,
}

impl TracingSessionHost {
    pub fn new() -> Self {
        Self {
            token: SessionToken::new(),
            inner: Mutex::new(SessionSnapshot::default()),
        }
    }

    /// Last metadata published.
    pub fn metadata(&self) -> Option<MediaItem> {
        self.inner.lock().metadata.clone()
    }

    /// Last playback state published.
    pub fn playback_state(&self) -> Option<PlaybackState> {
        self.inner.lock().state.clone()
    }

    pub fn is_released(&self) -> bool {
        self.inner.lock().released
    }

    fn ensure_live(&self, snapshot: &SessionSnapshot) -> Result<()> {
        if snapshot.released {
            return Err(BridgeError::SessionReleased(self.token.to_string()));
        }
        Ok(())
    }
}

impl Default for TracingSessionHost {
    fn default() -> Self {
        Self::new()
    }
}

impl MediaSessionHost for TracingSessionHost {
    fn token(&self) -> SessionToken {
        self.token
    }

    fn set_metadata(&self, item: &MediaItem) -> Result<()> {
        let mut inner = self.inner.lock();
        self.ensure_live(&inner)?;
        debug!(
            media_id = item.id(),
            title = item.title().unwrap_or_default(),
            "Session metadata updated"
        );
        inner.metadata = Some(item.clone());
        Ok(())
    }

    fn set_playback_state(&self, state: &PlaybackState) -> Result<()> {
        let mut inner = self.inner.lock();
        self.ensure_live(&inner)?;
        debug!(
            status = %state.status,
            position_ms = state.position_ms,
            actions = state.actions.bits(),
            "Session playback state updated"
        );
        inner.state = Some(state.clone());
        Ok(())
    }

    fn set_active(&self, active: bool) -> Result<()> {
        let mut inner = self.inner.lock();
        self.ensure_live(&inner)?;
        if inner.active != active {
            info!(active, "Session active flag changed");
        }
        inner.active = active;
        Ok(())
    }

    fn is_active(&self) -> bool {
        self.inner.lock().active
    }

    fn release(&self) -> Result<()> {
        let mut inner = self.inner.lock();
        self.ensure_live(&inner)?;
        info!(token = %self.token, "Session released");
        inner.active = false;
        inner.released = true;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bridge_traits::playback::PlaybackStatus;
    use bridge_traits::time::{Clock, SystemClock};

    #[test]
    fn records_published_values() {
        let host = TracingSessionHost::new();
        let item = MediaItem::builder("a").title("Song A").build();
        let state = PlaybackState::new(PlaybackStatus::Playing, 0, SystemClock.now());

        host.set_metadata(&item).unwrap();
        host.set_playback_state(&state).unwrap();
        host.set_active(true).unwrap();

        assert_eq!(host.metadata().unwrap().id(), "a");
        assert_eq!(host.playback_state().unwrap().status, PlaybackStatus::Playing);
        assert!(host.is_active());
    }

    #[test]
    fn release_rejects_further_updates() {
        let host = TracingSessionHost::new();
        host.set_active(true).unwrap();
        host.release().unwrap();

        assert!(!host.is_active());
        assert!(host.is_released());
        assert!(matches!(
            host.set_active(true),
            Err(BridgeError::SessionReleased(_))
        ));
        assert!(host.release().is_err());
    }
}
