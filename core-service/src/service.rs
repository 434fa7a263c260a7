//! # Music Service
//!
//! Bootstrap and main loop.
//!
//! [`MusicService::start`] wires the configured bridges into a
//! [`SessionCoordinator`], spawns the loop that owns it and starts loading the
//! catalog in the background. The loop is the only place the coordinator is
//! touched: transport commands, player events, the prepare timer and
//! shutdown are selected one at a time and each handler runs to completion.

use core_catalog::{JsonSource, MusicSource, StaticSource};
use core_playback::{PlayerAdapter, PlayerConfig, PlayerEventReceiver};
use core_runtime::config::CoreConfig;
use core_runtime::events::{CatalogEvent, CoreEvent, EventBus, Receiver};
use core_runtime::logging::strip_path;
use core_session::{SessionBrowser, SessionCoordinator};
use std::future;
use std::sync::Arc;
use std::time::Duration;
use tokio::runtime::Handle;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{sleep_until, Instant};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::error::{CoreError, Result};
use crate::handle::{ServiceHandle, ServiceMessage};

/// Running music service.
pub struct MusicService {
    handle: ServiceHandle,
    browser: SessionBrowser,
    source: Arc<dyn MusicSource>,
    events: EventBus,
    cancel: CancellationToken,
    main_loop: JoinHandle<()>,
    loader: JoinHandle<()>,
}

impl MusicService {
    /// Start with the default player: symphonia decoding into a real-time
    /// null sink.
    #[cfg(feature = "symphonia-decoder")]
    pub fn start(config: CoreConfig, player_config: PlayerConfig) -> Result<Self> {
        Self::builder(config).player_config(player_config).start()
    }

    pub fn builder(config: CoreConfig) -> MusicServiceBuilder {
        MusicServiceBuilder {
            config,
            player_config: PlayerConfig::default(),
            source: None,
            player: None,
        }
    }

    /// Handle for posting transport commands.
    pub fn handle(&self) -> ServiceHandle {
        self.handle.clone()
    }

    pub fn browser(&self) -> &SessionBrowser {
        &self.browser
    }

    pub fn source(&self) -> &Arc<dyn MusicSource> {
        &self.source
    }

    pub fn subscribe(&self) -> Receiver<CoreEvent> {
        self.events.subscribe()
    }

    /// Cancel the loop, wait for teardown to finish.
    pub async fn shutdown(self) -> Result<()> {
        info!("Shutting down music service");
        self.cancel.cancel();
        self.loader.abort();
        self.main_loop
            .await
            .map_err(|e| CoreError::TaskFailed(e.to_string()))
    }
}

/// Builder for [`MusicService`].
pub struct MusicServiceBuilder {
    config: CoreConfig,
    player_config: PlayerConfig,
    source: Option<Arc<dyn MusicSource>>,
    player: Option<(Box<dyn PlayerAdapter>, PlayerEventReceiver)>,
}

impl MusicServiceBuilder {
    pub fn player_config(mut self, config: PlayerConfig) -> Self {
        self.player_config = config;
        self
    }

    /// Catalog source. Defaults to a [`JsonSource`] over
    /// `CoreConfig::catalog_path`, or an empty catalog when no path is set.
    pub fn source(mut self, source: Arc<dyn MusicSource>) -> Self {
        self.source = Some(source);
        self
    }

    /// Drive `player` instead of the default one. `events` must be the
    /// receiving end of the player's event sender.
    pub fn player(mut self, player: Box<dyn PlayerAdapter>, events: PlayerEventReceiver) -> Self {
        self.player = Some((player, events));
        self
    }

    /// Spawn the service on the current tokio runtime.
    pub fn start(self) -> Result<MusicService> {
        let runtime = Handle::try_current().map_err(|e| {
            CoreError::InitializationFailed(format!("music service requires a tokio runtime: {}", e))
        })?;
        self.config.validate()?;

        let (player, player_events) = match self.player {
            Some(player) => player,
            None => default_player(&self.config, self.player_config)?,
        };

        let source: Arc<dyn MusicSource> = match (self.source, &self.config.catalog_path) {
            (Some(source), _) => source,
            (None, Some(path)) => Arc::new(JsonSource::from_path(path.clone())),
            (None, None) => Arc::new(StaticSource::new(Vec::new())),
        };

        let events = EventBus::new(self.config.event_buffer_size);
        let cancel = CancellationToken::new();
        let (tx, rx) = mpsc::unbounded_channel();
        let handle = ServiceHandle::new(tx, cancel.clone());

        let coordinator = SessionCoordinator::new(&self.config, player, events.clone());
        let service_loop = ServiceLoop {
            coordinator,
            messages: rx,
            player_events,
            events: events.clone(),
            cancel: cancel.clone(),
            prepare_timeout: self.config.prepare_timeout,
        };

        let catalog = self
            .config
            .catalog_path
            .as_ref()
            .map(|path| strip_path(&path.to_string_lossy()).to_string());
        info!(
            ?catalog,
            repeat_mode = ?self.config.repeat_mode,
            prepare_timeout = ?self.config.prepare_timeout,
            "Starting music service"
        );
        let main_loop = runtime.spawn(service_loop.run());
        let loader = runtime.spawn(load_catalog(Arc::clone(&source), handle.clone()));

        Ok(MusicService {
            handle,
            browser: SessionBrowser::new(Arc::clone(&source), events.clone()),
            source,
            events,
            cancel,
            main_loop,
            loader,
        })
    }
}

#[cfg(feature = "symphonia-decoder")]
fn default_player(
    config: &CoreConfig,
    player_config: PlayerConfig,
) -> Result<(Box<dyn PlayerAdapter>, PlayerEventReceiver)> {
    use core_playback::{NullSink, PlayerEventSender, StreamPlayer, SymphoniaDecoderFactory};

    let (sender, receiver) = PlayerEventSender::channel();
    let player = StreamPlayer::new(
        Arc::new(SymphoniaDecoderFactory::new()),
        Arc::new(NullSink::realtime()),
        Arc::clone(&config.clock),
        player_config,
        sender,
    )?;
    Ok((Box::new(player), receiver))
}

#[cfg(not(feature = "symphonia-decoder"))]
fn default_player(
    _config: &CoreConfig,
    _player_config: PlayerConfig,
) -> Result<(Box<dyn PlayerAdapter>, PlayerEventReceiver)> {
    Err(CoreError::CapabilityMissing {
        capability: "PlayerAdapter".to_string(),
        message: "No player provided. \
                  Enable the 'symphonia-decoder' feature for the built-in player \
                  or pass one to MusicServiceBuilder::player."
            .to_string(),
    })
}

/// Load the catalog and post the outcome to the loop.
async fn load_catalog(source: Arc<dyn MusicSource>, handle: ServiceHandle) {
    let message = match source.load().await {
        Ok(()) => ServiceMessage::CatalogLoaded(source.items()),
        Err(e) => ServiceMessage::CatalogFailed(e.to_string()),
    };
    if handle.post(message).is_err() {
        debug!("Service stopped before the catalog finished loading");
    }
}

// ============================================================================
// Main loop
// ============================================================================

struct ServiceLoop {
    coordinator: SessionCoordinator,
    messages: mpsc::UnboundedReceiver<ServiceMessage>,
    player_events: PlayerEventReceiver,
    events: EventBus,
    cancel: CancellationToken,
    prepare_timeout: Option<Duration>,
}

impl ServiceLoop {
    async fn run(mut self) {
        let mut prepare_deadline: Option<(u64, Instant)> = None;
        let mut player_open = true;

        loop {
            let deadline = prepare_deadline.map(|(_, at)| at);
            let timer = async move {
                match deadline {
                    Some(at) => sleep_until(at).await,
                    None => future::pending::<()>().await,
                }
            };

            tokio::select! {
                biased;

                _ = self.cancel.cancelled() => break,

                message = self.messages.recv() => match message {
                    Some(message) => self.handle_message(message),
                    None => break,
                },

                event = self.player_events.recv(), if player_open => match event {
                    Some(event) => self.coordinator.handle_player_event(event),
                    None => {
                        warn!("Player event channel closed");
                        player_open = false;
                    }
                },

                _ = timer => {
                    if let Some((generation, _)) = prepare_deadline.take() {
                        self.coordinator.on_prepare_timeout(generation);
                    }
                }
            }

            prepare_deadline = self.rearm(prepare_deadline);
        }

        self.coordinator.teardown();
        info!("Music service stopped");
    }

    fn handle_message(&mut self, message: ServiceMessage) {
        match message {
            ServiceMessage::Command(command) => self.coordinator.handle_command(command),
            ServiceMessage::TaskRemoved => self.coordinator.on_task_removed(),
            ServiceMessage::CatalogLoaded(items) => self.coordinator.load_catalog(items),
            ServiceMessage::CatalogFailed(message) => {
                warn!(%message, "Catalog failed to load; queue stays empty");
                self.events
                    .emit(CoreEvent::Catalog(CatalogEvent::LoadFailed { message }))
                    .ok();
            }
        }
    }

    /// Keep the running deadline while the same generation is preparing,
    /// start a new one for a new generation, drop it otherwise.
    fn rearm(&self, current: Option<(u64, Instant)>) -> Option<(u64, Instant)> {
        let timeout = self.prepare_timeout?;
        let generation = self.coordinator.preparing_generation()?;
        match current {
            Some((armed, at)) if armed == generation => Some((armed, at)),
            _ => {
                debug!(generation, ?timeout, "Arming prepare timer");
                Some((generation, Instant::now() + timeout))
            }
        }
    }
}
