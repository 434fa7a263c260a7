//! Umbrella crate for the music session core.
//!
//! Hosts depend on `msc-workspace` and pick features instead of wiring each
//! crate by hand. `desktop-shims` pulls in the service with the desktop
//! bridge fallbacks; `symphonia-decoder` adds the built-in file player.

#[cfg(any(feature = "desktop-shims", feature = "symphonia-decoder"))]
pub use core_service::{CoreError, MusicService, MusicServiceBuilder, ServiceHandle};

#[cfg(feature = "symphonia-decoder")]
pub use core_playback::{PlayerConfig, SymphoniaDecoderFactory};
