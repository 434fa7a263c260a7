//! Media-session bridge.
//!
//! The host media-session framework is the outbound half of the transport
//! surface: the core pushes metadata, playback state and the active flag, and
//! the framework relays them to lock screens, headsets and assistants.
//!
//! # Example
//!
//! ```ignore
//! use bridge_traits::session::MediaSessionHost;
//!
//! fn announce(host: &dyn MediaSessionHost, item: &MediaItem) {
//!     host.set_metadata(item).ok();
//!     if !host.is_active() {
//!         host.set_active(true).ok();
//!     }
//! }
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use crate::{error::Result, media::MediaItem, playback::PlaybackState};

/// Opaque handle identifying the media session to hosts and controllers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionToken(Uuid);

impl SessionToken {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn from_uuid(id: Uuid) -> Self {
        Self(id)
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for SessionToken {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for SessionToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "session:{}", self.0)
    }
}

/// Host media-session framework.
///
/// All methods are invoked from the coordinator task and must not block.
pub trait MediaSessionHost: Send + Sync {
    /// Token identifying this session.
    fn token(&self) -> SessionToken;

    /// Publish metadata for the item about to play.
    fn set_metadata(&self, item: &MediaItem) -> Result<()>;

    /// Publish the latest playback state.
    fn set_playback_state(&self, state: &PlaybackState) -> Result<()>;

    /// Mark the session as (in)active for media-button routing.
    fn set_active(&self, active: bool) -> Result<()>;

    fn is_active(&self) -> bool;

    /// Release the session. Later calls fail with
    /// [`BridgeError::SessionReleased`](crate::error::BridgeError::SessionReleased).
    fn release(&self) -> Result<()>;
}
