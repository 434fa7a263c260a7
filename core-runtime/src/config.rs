//! # Core Configuration Module
//!
//! Provides configuration management for the music session core.
//!
//! ## Overview
//!
//! The configuration system uses a builder pattern to construct a `CoreConfig`
//! instance that holds the host bridges and settings the service needs. It
//! enforces fail-fast validation so a missing capability is reported at
//! startup rather than on the first transport command.
//!
//! ## Required Dependencies
//!
//! - `MediaSessionHost` - Outbound metadata/state/active flag
//! - `ForegroundService` - Started/foreground lifecycle
//! - `NotificationPoster` - Playback notification
//!
//! ## Optional Dependencies
//!
//! - `Clock` - Timestamp source for playback states (default: `SystemClock`)
//! - `LoggerSink` - Host log pipeline
//!
//! When the `desktop-shims` feature is enabled, the `bridge-desktop`
//! implementations are injected for any required bridge that was not provided.
//!
//! ## Usage
//!
//! ```ignore
//! use core_runtime::config::CoreConfig;
//! use std::sync::Arc;
//!
//! let config = CoreConfig::builder()
//!     .session_host(Arc::new(MySessionHost::new()))
//!     .foreground_service(Arc::new(MyForegroundService))
//!     .notification_poster(Arc::new(MyNotificationPoster))
//!     .catalog_path("/data/catalog.json")
//!     .prepare_timeout(Duration::from_secs(15))
//!     .build()?;
//! ```

use crate::error::{Error, Result};
use crate::events::DEFAULT_EVENT_BUFFER_SIZE;
use bridge_traits::{
    playback::RepeatMode, Clock, ForegroundService, LoggerSink, MediaSessionHost,
    NotificationPoster, SystemClock,
};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

/// Core configuration for the music session core.
///
/// Use [`CoreConfigBuilder`] to construct instances.
#[derive(Clone)]
pub struct CoreConfig {
    /// Host media-session framework (required)
    pub session_host: Arc<dyn MediaSessionHost>,

    /// Foreground-service controller (required)
    pub foreground_service: Arc<dyn ForegroundService>,

    /// Notification subsystem (required)
    pub notification_poster: Arc<dyn NotificationPoster>,

    /// Time source for playback state timestamps
    pub clock: Arc<dyn Clock>,

    /// Host log pipeline (optional)
    pub logger_sink: Option<Arc<dyn LoggerSink>>,

    /// JSON catalog loaded at startup (optional)
    pub catalog_path: Option<PathBuf>,

    /// Initial queue policy
    pub repeat_mode: RepeatMode,

    /// Give up on an item that stays in PREPARING longer than this
    pub prepare_timeout: Option<Duration>,

    /// Event bus buffer size
    pub event_buffer_size: usize,
}

impl std::fmt::Debug for CoreConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CoreConfig")
            .field("session_host", &"MediaSessionHost { ... }")
            .field("foreground_service", &"ForegroundService { ... }")
            .field("notification_poster", &"NotificationPoster { ... }")
            .field("clock", &"Clock { ... }")
            .field(
                "logger_sink",
                &self.logger_sink.as_ref().map(|_| "LoggerSink { ... }"),
            )
            .field("catalog_path", &self.catalog_path)
            .field("repeat_mode", &self.repeat_mode)
            .field("prepare_timeout", &self.prepare_timeout)
            .field("event_buffer_size", &self.event_buffer_size)
            .finish()
    }
}

impl CoreConfig {
    /// Creates a new builder for constructing a `CoreConfig`.
    pub fn builder() -> CoreConfigBuilder {
        CoreConfigBuilder::default()
    }

    /// Validates the configuration and returns an error if invalid.
    ///
    /// This checks:
    /// - The catalog path, when set, is not empty
    /// - The prepare timeout, when set, is non-zero
    /// - The event buffer can hold at least one event
    pub fn validate(&self) -> Result<()> {
        if let Some(path) = &self.catalog_path {
            if path.as_os_str().is_empty() {
                return Err(Error::Config("Catalog path cannot be empty".to_string()));
            }
        }

        if self.prepare_timeout == Some(Duration::ZERO) {
            return Err(Error::Config(
                "Prepare timeout must be greater than zero. \
                 Leave it unset to wait for the player indefinitely."
                    .to_string(),
            ));
        }

        if self.event_buffer_size == 0 {
            return Err(Error::Config(
                "Event buffer size must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }
}

#[cfg(not(feature = "desktop-shims"))]
fn capability_missing(capability: &str, purpose: &str) -> Error {
    Error::CapabilityMissing {
        capability: capability.to_string(),
        message: format!(
            "{} implementation is required for {}. \
             Desktop: ensure the 'desktop-shims' feature is enabled to use the bridge-desktop default. \
             Mobile: inject the platform-native adapter.",
            capability, purpose
        ),
    }
}

#[cfg(feature = "desktop-shims")]
fn provide_default_session_host() -> Result<Arc<dyn MediaSessionHost>> {
    let host: Arc<dyn MediaSessionHost> = Arc::new(bridge_desktop::TracingSessionHost::new());
    Ok(host)
}

#[cfg(not(feature = "desktop-shims"))]
fn provide_default_session_host() -> Result<Arc<dyn MediaSessionHost>> {
    Err(capability_missing(
        "MediaSessionHost",
        "publishing metadata and playback state",
    ))
}

#[cfg(feature = "desktop-shims")]
fn provide_default_foreground_service() -> Result<Arc<dyn ForegroundService>> {
    let service: Arc<dyn ForegroundService> =
        Arc::new(bridge_desktop::DesktopForegroundService::new());
    Ok(service)
}

#[cfg(not(feature = "desktop-shims"))]
fn provide_default_foreground_service() -> Result<Arc<dyn ForegroundService>> {
    Err(capability_missing(
        "ForegroundService",
        "keeping the service alive during playback",
    ))
}

#[cfg(feature = "desktop-shims")]
fn provide_default_notification_poster() -> Result<Arc<dyn NotificationPoster>> {
    let poster: Arc<dyn NotificationPoster> =
        Arc::new(bridge_desktop::LogNotificationPoster::new());
    Ok(poster)
}

#[cfg(not(feature = "desktop-shims"))]
fn provide_default_notification_poster() -> Result<Arc<dyn NotificationPoster>> {
    Err(capability_missing(
        "NotificationPoster",
        "showing the playback notification",
    ))
}

/// Builder for constructing [`CoreConfig`] instances.
#[derive(Default)]
pub struct CoreConfigBuilder {
    session_host: Option<Arc<dyn MediaSessionHost>>,
    foreground_service: Option<Arc<dyn ForegroundService>>,
    notification_poster: Option<Arc<dyn NotificationPoster>>,
    clock: Option<Arc<dyn Clock>>,
    logger_sink: Option<Arc<dyn LoggerSink>>,
    catalog_path: Option<PathBuf>,
    repeat_mode: RepeatMode,
    prepare_timeout: Option<Duration>,
    event_buffer_size: Option<usize>,
}

impl CoreConfigBuilder {
    /// Sets the media-session host.
    ///
    /// Required unless the `desktop-shims` feature is enabled.
    pub fn session_host(mut self, host: Arc<dyn MediaSessionHost>) -> Self {
        self.session_host = Some(host);
        self
    }

    /// Sets the foreground-service controller.
    ///
    /// Required unless the `desktop-shims` feature is enabled.
    pub fn foreground_service(mut self, service: Arc<dyn ForegroundService>) -> Self {
        self.foreground_service = Some(service);
        self
    }

    /// Sets the notification poster.
    ///
    /// Required unless the `desktop-shims` feature is enabled.
    pub fn notification_poster(mut self, poster: Arc<dyn NotificationPoster>) -> Self {
        self.notification_poster = Some(poster);
        self
    }

    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = Some(clock);
        self
    }

    pub fn logger_sink(mut self, sink: Arc<dyn LoggerSink>) -> Self {
        self.logger_sink = Some(sink);
        self
    }

    /// Sets the JSON catalog loaded when the service starts.
    pub fn catalog_path<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.catalog_path = Some(path.into());
        self
    }

    pub fn repeat_mode(mut self, mode: RepeatMode) -> Self {
        self.repeat_mode = mode;
        self
    }

    /// Bounds how long an item may stay in PREPARING before it is failed
    /// with `SourceUnavailable`.
    pub fn prepare_timeout(mut self, timeout: Duration) -> Self {
        self.prepare_timeout = Some(timeout);
        self
    }

    pub fn event_buffer_size(mut self, size: usize) -> Self {
        self.event_buffer_size = Some(size);
        self
    }

    /// Builds the final `CoreConfig` instance.
    ///
    /// # Returns
    ///
    /// Returns `Ok(CoreConfig)` on success, or an error if:
    /// - Required bridges are missing and no desktop default is available
    /// - Configuration values are invalid
    pub fn build(self) -> Result<CoreConfig> {
        let session_host = match self.session_host {
            Some(host) => host,
            None => provide_default_session_host()?,
        };

        let foreground_service = match self.foreground_service {
            Some(service) => service,
            None => provide_default_foreground_service()?,
        };

        let notification_poster = match self.notification_poster {
            Some(poster) => poster,
            None => provide_default_notification_poster()?,
        };

        let config = CoreConfig {
            session_host,
            foreground_service,
            notification_poster,
            clock: self.clock.unwrap_or_else(|| Arc::new(SystemClock)),
            logger_sink: self.logger_sink,
            catalog_path: self.catalog_path,
            repeat_mode: self.repeat_mode,
            prepare_timeout: self.prepare_timeout,
            event_buffer_size: self.event_buffer_size.unwrap_or(DEFAULT_EVENT_BUFFER_SIZE),
        };

        config.validate()?;

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bridge_traits::error::Result as BridgeResult;
    use bridge_traits::{MediaItem, NotificationView, PlaybackState, SessionToken};

    struct NoopSession {
        token: SessionToken,
    }

    impl MediaSessionHost for NoopSession {
        fn token(&self) -> SessionToken {
            self.token
        }
        fn set_metadata(&self, _item: &MediaItem) -> BridgeResult<()> {
            Ok(())
        }
        fn set_playback_state(&self, _state: &PlaybackState) -> BridgeResult<()> {
            Ok(())
        }
        fn set_active(&self, _active: bool) -> BridgeResult<()> {
            Ok(())
        }
        fn is_active(&self) -> bool {
            false
        }
        fn release(&self) -> BridgeResult<()> {
            Ok(())
        }
    }

    struct NoopService;

    impl ForegroundService for NoopService {
        fn start_service(&self) -> BridgeResult<()> {
            Ok(())
        }
        fn start_in_foreground(&self, _id: u32, _view: &NotificationView) -> BridgeResult<()> {
            Ok(())
        }
        fn detach_foreground(&self, _remove: bool) -> BridgeResult<()> {
            Ok(())
        }
        fn stop_self(&self) -> BridgeResult<()> {
            Ok(())
        }
    }

    struct NoopPoster;

    impl NotificationPoster for NoopPoster {
        fn notify(&self, _id: u32, _view: &NotificationView) -> BridgeResult<()> {
            Ok(())
        }
        fn cancel(&self, _id: u32) -> BridgeResult<()> {
            Ok(())
        }
    }

    fn complete_builder() -> CoreConfigBuilder {
        CoreConfig::builder()
            .session_host(Arc::new(NoopSession {
                token: SessionToken::new(),
            }))
            .foreground_service(Arc::new(NoopService))
            .notification_poster(Arc::new(NoopPoster))
    }

    #[test]
    fn test_builder_with_all_required_bridges() {
        let config = complete_builder().build().unwrap();
        assert_eq!(config.repeat_mode, RepeatMode::All);
        assert_eq!(config.prepare_timeout, None);
        assert_eq!(config.event_buffer_size, DEFAULT_EVENT_BUFFER_SIZE);
        assert!(config.catalog_path.is_none());
        assert!(config.logger_sink.is_none());
    }

    #[test]
    fn test_builder_with_settings() {
        let config = complete_builder()
            .catalog_path("/data/catalog.json")
            .repeat_mode(RepeatMode::One)
            .prepare_timeout(Duration::from_secs(10))
            .event_buffer_size(16)
            .build()
            .unwrap();

        assert_eq!(config.catalog_path, Some(PathBuf::from("/data/catalog.json")));
        assert_eq!(config.repeat_mode, RepeatMode::One);
        assert_eq!(config.prepare_timeout, Some(Duration::from_secs(10)));
        assert_eq!(config.event_buffer_size, 16);
    }

    #[cfg(not(feature = "desktop-shims"))]
    #[test]
    fn test_builder_requires_session_host() {
        let err = CoreConfig::builder()
            .foreground_service(Arc::new(NoopService))
            .notification_poster(Arc::new(NoopPoster))
            .build()
            .unwrap_err();

        assert!(matches!(err, Error::CapabilityMissing { .. }));
        assert!(err.to_string().contains("MediaSessionHost"));
    }

    #[cfg(not(feature = "desktop-shims"))]
    #[test]
    fn test_builder_requires_notification_poster() {
        let err = CoreConfig::builder()
            .session_host(Arc::new(NoopSession {
                token: SessionToken::new(),
            }))
            .foreground_service(Arc::new(NoopService))
            .build()
            .unwrap_err();

        assert!(err.to_string().contains("NotificationPoster"));
    }

    #[cfg(feature = "desktop-shims")]
    #[test]
    fn test_build_with_desktop_defaults() {
        let config = CoreConfig::builder().build().unwrap();
        assert!(!config.session_host.is_active());
    }

    #[test]
    fn test_validate_rejects_zero_timeout() {
        let err = complete_builder()
            .prepare_timeout(Duration::ZERO)
            .build()
            .unwrap_err();
        assert!(err.to_string().contains("Prepare timeout"));
    }

    #[test]
    fn test_validate_rejects_empty_catalog_path() {
        let err = complete_builder().catalog_path("").build().unwrap_err();
        assert!(err.to_string().contains("Catalog path"));
    }

    #[test]
    fn test_validate_rejects_zero_buffer() {
        assert!(complete_builder().event_buffer_size(0).build().is_err());
    }

    #[test]
    fn test_config_is_cloneable_and_debuggable() {
        let config = complete_builder().build().unwrap();
        let cloned = config.clone();
        let debug = format!("{:?}", cloned);
        assert!(debug.contains("CoreConfig"));
        assert!(debug.contains("MediaSessionHost"));
    }
}
