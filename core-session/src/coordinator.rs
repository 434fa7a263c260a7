//! # Session Coordinator
//!
//! The single integration point between the host media session, the player
//! and the foreground-service lifecycle.
//!
//! ## Threading
//!
//! Every handler is synchronous and runs to completion. The service loop
//! owns the coordinator and feeds it transport commands and player events
//! one at a time, so commands and events never interleave.
//!
//! ## Ordering
//!
//! Metadata for an item is pushed to the session before
//! [`PlayerAdapter::play_from_media`] is invoked; the player's PLAYING event
//! for that item is queued behind it and arrives later.

use bridge_traits::media::MediaItem;
use bridge_traits::playback::{ErrorKind, PlaybackState, PlaybackStatus};
use bridge_traits::session::MediaSessionHost;
use bridge_traits::time::Clock;
use core_catalog::CatalogCursor;
use core_playback::{PlayerAdapter, PlayerEvent};
use core_runtime::config::CoreConfig;
use core_runtime::events::{CatalogEvent, CoreEvent, EventBus, PlaybackEvent, SessionEvent};
use std::sync::Arc;
use tracing::{debug, error, info, instrument, warn};

use crate::command::TransportCommand;
use crate::lifecycle::{ForegroundLifecycle, LifecycleAction};
use crate::notification::NotificationPresenter;

/// Message published when the player never leaves PREPARING.
pub const PREPARE_TIMEOUT_MESSAGE: &str = "preparation timed out";

pub struct SessionCoordinator {
    cursor: CatalogCursor,
    player: Box<dyn PlayerAdapter>,
    session: Arc<dyn MediaSessionHost>,
    presenter: NotificationPresenter,
    lifecycle: ForegroundLifecycle,
    events: EventBus,
    clock: Arc<dyn Clock>,
    prepared: Option<Arc<MediaItem>>,
    last_state: Option<PlaybackState>,
    last_generation: u64,
    abandoned_generation: Option<u64>,
}

impl SessionCoordinator {
    /// Coordinator over the bridges in `config`, starting with an empty
    /// catalog, an inactive session and the lifecycle flag cleared.
    pub fn new(config: &CoreConfig, player: Box<dyn PlayerAdapter>, events: EventBus) -> Self {
        let session = Arc::clone(&config.session_host);
        let presenter =
            NotificationPresenter::new(session.token(), Arc::clone(&config.notification_poster));

        Self {
            cursor: CatalogCursor::new(config.repeat_mode),
            player,
            session,
            presenter,
            lifecycle: ForegroundLifecycle::new(Arc::clone(&config.foreground_service)),
            events,
            clock: Arc::clone(&config.clock),
            prepared: None,
            last_state: None,
            last_generation: 0,
            abandoned_generation: None,
        }
    }

    // ========================================================================
    // Catalog
    // ========================================================================

    /// Replace the play queue. The prepared item belongs to the old queue and
    /// is dropped.
    pub fn load_catalog(&mut self, items: Vec<Arc<MediaItem>>) {
        let count = items.len();
        self.cursor.load(items);
        self.prepared = None;
        info!(item_count = count, "Catalog loaded into cursor");
        self.emit(CoreEvent::Catalog(CatalogEvent::Loaded { item_count: count }));
    }

    pub fn cursor(&self) -> &CatalogCursor {
        &self.cursor
    }

    // ========================================================================
    // Transport commands
    // ========================================================================

    #[instrument(skip(self, command), fields(command = command.name()))]
    pub fn handle_command(&mut self, command: TransportCommand) {
        debug!("Dispatching transport command");
        match command {
            TransportCommand::Prepare => self.prepare(),
            TransportCommand::Play => self.play(),
            TransportCommand::Pause => self.player.pause(),
            TransportCommand::Stop => self.stop(),
            TransportCommand::SkipNext => {
                let item = self.cursor.next();
                self.skip(item);
            }
            TransportCommand::SkipPrev => {
                let item = self.cursor.prev();
                self.skip(item);
            }
            TransportCommand::SeekTo(position_ms) => self.player.seek_to(position_ms),
            TransportCommand::AddQueueItem(description) => {
                debug!(media_id = ?description.media_id, "Queue editing not supported");
            }
            TransportCommand::RemoveQueueItem(description) => {
                debug!(media_id = ?description.media_id, "Queue editing not supported");
            }
            TransportCommand::PlayFromMediaId(media_id) => self.play_from_media_id(&media_id),
            TransportCommand::SetRepeatMode(mode) => {
                debug!(?mode, "Repeat mode changed");
                self.cursor.set_repeat_mode(mode);
            }
        }
    }

    fn prepare(&mut self) {
        let Some(item) = self.cursor.current() else {
            debug!("Prepare ignored: catalog not ready");
            return;
        };
        self.push_metadata(&item);
        self.activate();
        self.prepared = Some(item);
    }

    fn play(&mut self) {
        if !self.cursor.is_ready() {
            debug!("Play ignored: catalog not ready");
            return;
        }
        if self.prepared.is_none() {
            self.prepare();
        }
        self.activate();
        if let Some(item) = self.prepared.clone() {
            self.player.play_from_media(item);
        }
    }

    fn stop(&mut self) {
        self.player.stop();
        self.prepared = None;
        self.deactivate();
    }

    fn skip(&mut self, item: Option<Arc<MediaItem>>) {
        if let Some(item) = item {
            self.push_metadata(&item);
            self.prepared = Some(item);
        }
        self.play();
    }

    fn play_from_media_id(&mut self, media_id: &str) {
        let Some(item) = self.cursor.select(media_id) else {
            debug!(media_id, "Play from media id ignored: unknown item");
            return;
        };
        self.push_metadata(&item);
        self.prepared = Some(item);
        self.play();
    }

    // ========================================================================
    // Player events
    // ========================================================================

    pub fn handle_player_event(&mut self, event: PlayerEvent) {
        let generation = event.generation();
        if self.abandoned_generation == Some(generation) {
            debug!(generation, "Ignoring event from abandoned preparation");
            return;
        }
        self.last_generation = generation;

        match event {
            PlayerEvent::StateChanged { state, .. } => self.publish_state(state),
            PlayerEvent::Completed { .. } => self.on_completed(),
        }
    }

    fn on_completed(&mut self) {
        let finished = self.player.current_media();
        self.emit(CoreEvent::Playback(PlaybackEvent::Completed {
            media_id: finished.as_ref().map(|item| item.id().to_string()),
        }));

        match self.cursor.next() {
            Some(item) => {
                info!(media_id = %item.id(), "Advancing to next item");
                self.push_metadata(&item);
                self.prepared = Some(Arc::clone(&item));
                self.player.play_from_media(item);
            }
            None => {
                info!("End of queue reached");
                self.player.stop();
            }
        }
    }

    fn publish_state(&mut self, state: PlaybackState) {
        if let Err(e) = self.session.set_playback_state(&state) {
            warn!(status = state.status.name(), error = %e, "Failed to publish playback state");
        }

        let current = self.player.current_media();
        let media_id = current.as_ref().map(|item| item.id().to_string());
        self.emit_playback(&state, media_id.clone());

        match LifecycleAction::for_status(&state.status) {
            Some(LifecycleAction::MoveToStarted) => {
                let view = self
                    .presenter
                    .foreground_notification(current.as_deref(), &state);
                self.lifecycle.move_to_started(&view);
                self.emit(CoreEvent::Session(SessionEvent::ForegroundStarted { media_id }));
            }
            Some(LifecycleAction::RefreshNotification) => {
                self.lifecycle.detach_keeping_notification();
                if let Err(e) = self.presenter.refresh(current.as_deref(), &state) {
                    warn!(error = %e, "Failed to refresh notification");
                }
                self.emit(CoreEvent::Session(SessionEvent::ForegroundDetached));
            }
            Some(LifecycleAction::MoveOutOfStarted) => {
                if let Err(e) = self.presenter.detach() {
                    warn!(error = %e, "Failed to cancel notification");
                }
                if self.lifecycle.move_out_of_started() {
                    self.emit(CoreEvent::Session(SessionEvent::ForegroundStopped));
                }
            }
            None => {}
        }

        self.last_state = Some(state);
    }

    fn emit_playback(&self, state: &PlaybackState, media_id: Option<String>) {
        let position_ms = state.position_ms;
        let event = match &state.status {
            PlaybackStatus::Playing => PlaybackEvent::Started {
                media_id,
                position_ms,
            },
            PlaybackStatus::Paused => PlaybackEvent::Paused {
                media_id,
                position_ms,
            },
            PlaybackStatus::Stopped => PlaybackEvent::Stopped { media_id },
            PlaybackStatus::Error { kind, message } => {
                error!(?media_id, %kind, message = %message, "Player reported an error");
                PlaybackEvent::Error {
                    media_id,
                    kind: *kind,
                    message: message.clone(),
                }
            }
            PlaybackStatus::None | PlaybackStatus::Preparing | PlaybackStatus::Completed => {
                return
            }
        };
        self.emit(CoreEvent::Playback(event));
    }

    // ========================================================================
    // Preparation timeout
    // ========================================================================

    /// Generation the player is currently preparing, if it is still in
    /// PREPARING for the player's latest generation.
    pub fn preparing_generation(&self) -> Option<u64> {
        let state = self.last_state.as_ref()?;
        let current = self.player.generation();
        (state.status == PlaybackStatus::Preparing && self.last_generation == current)
            .then_some(current)
    }

    /// Give up on `generation` if it is still preparing. The player is
    /// stopped, anything it still reports for that generation is ignored and
    /// the session sees a SourceUnavailable error.
    pub fn on_prepare_timeout(&mut self, generation: u64) -> bool {
        if self.preparing_generation() != Some(generation) {
            debug!(generation, "Prepare timer fired after the player moved on");
            return false;
        }

        warn!(generation, "Player stuck in PREPARING; abandoning item");
        self.abandoned_generation = Some(generation);
        self.player.stop();

        let position_ms = self.last_state.as_ref().map_or(0, |s| s.position_ms);
        let state = PlaybackState::error(
            ErrorKind::SourceUnavailable,
            PREPARE_TIMEOUT_MESSAGE,
            position_ms,
            self.clock.now(),
        );
        self.publish_state(state);
        true
    }

    // ========================================================================
    // Host lifecycle
    // ========================================================================

    /// The host removed the task. Playback stops, the session goes inactive
    /// and the service leaves the started state before stopping itself. A
    /// STOPPED reported later by the player finds the flag already cleared.
    pub fn on_task_removed(&mut self) {
        info!("Host task removed; stopping playback and service");
        self.prepared = None;
        self.player.stop();
        self.deactivate();
        if let Err(e) = self.presenter.detach() {
            warn!(error = %e, "Failed to cancel notification");
        }
        if self.lifecycle.move_out_of_started() {
            self.emit(CoreEvent::Session(SessionEvent::ForegroundStopped));
        }
    }

    /// Stop the player, release the session, cancel the notification. Every
    /// step runs even if an earlier one failed.
    pub fn teardown(&mut self) {
        info!("Tearing down session coordinator");
        self.player.stop();
        if let Err(e) = self.session.release() {
            warn!(error = %e, "Failed to release media session");
        }
        if let Err(e) = self.presenter.detach() {
            warn!(error = %e, "Failed to cancel notification during teardown");
        }
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    pub fn prepared_item(&self) -> Option<&Arc<MediaItem>> {
        self.prepared.as_ref()
    }

    pub fn last_state(&self) -> Option<&PlaybackState> {
        self.last_state.as_ref()
    }

    pub fn is_service_started(&self) -> bool {
        self.lifecycle.is_started()
    }

    pub fn lifecycle(&self) -> &ForegroundLifecycle {
        &self.lifecycle
    }

    pub fn player(&self) -> &dyn PlayerAdapter {
        self.player.as_ref()
    }

    pub fn player_mut(&mut self) -> &mut dyn PlayerAdapter {
        self.player.as_mut()
    }

    // ========================================================================
    // Session helpers
    // ========================================================================

    fn push_metadata(&self, item: &MediaItem) {
        if let Err(e) = self.session.set_metadata(item) {
            warn!(media_id = %item.id(), error = %e, "Failed to publish metadata");
            return;
        }
        self.emit(CoreEvent::Session(SessionEvent::MetadataChanged {
            media_id: item.id().to_string(),
            title: item.title().map(str::to_string),
        }));
    }

    fn activate(&self) {
        if self.session.is_active() {
            return;
        }
        match self.session.set_active(true) {
            Ok(()) => self.emit(CoreEvent::Session(SessionEvent::Activated)),
            Err(e) => warn!(error = %e, "Failed to activate session"),
        }
    }

    fn deactivate(&self) {
        if !self.session.is_active() {
            return;
        }
        match self.session.set_active(false) {
            Ok(()) => self.emit(CoreEvent::Session(SessionEvent::Deactivated)),
            Err(e) => warn!(error = %e, "Failed to deactivate session"),
        }
    }

    fn emit(&self, event: CoreEvent) {
        self.events.emit(event).ok();
    }
}
