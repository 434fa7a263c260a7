//! Core service façade and bootstrap helpers.
//!
//! This crate wires host-provided bridge implementations (media session,
//! foreground service, notifications) into the session core and runs the
//! single coordinator loop. Desktop apps typically enable the
//! `desktop-shims` feature, which lets [`CoreConfig`](core_runtime::config::CoreConfig)
//! fall back to the `bridge-desktop` implementations; mobile hosts inject
//! their platform-native adapters.
//!
//! ```ignore
//! use core_playback::PlayerConfig;
//! use core_runtime::config::CoreConfig;
//! use core_service::MusicService;
//!
//! let config = CoreConfig::builder()
//!     .catalog_path("catalog.json")
//!     .build()?;
//! let service = MusicService::start(config, PlayerConfig::default())?;
//!
//! let controls = service.handle();
//! controls.on_play()?;
//! // ...
//! service.shutdown().await?;
//! ```

pub mod error;
pub mod handle;
pub mod service;

pub use error::{CoreError, Result};
pub use handle::ServiceHandle;
pub use service::{MusicService, MusicServiceBuilder};
