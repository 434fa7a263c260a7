//! Inbound command surface handed to the host session framework.

use bridge_traits::media::{MediaDescription, MediaItem};
use bridge_traits::playback::RepeatMode;
use core_session::TransportCommand;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::error::{CoreError, Result};

/// Messages processed by the service loop, in arrival order.
#[derive(Debug)]
pub(crate) enum ServiceMessage {
    Command(TransportCommand),
    TaskRemoved,
    CatalogLoaded(Vec<Arc<MediaItem>>),
    CatalogFailed(String),
}

/// Cloneable handle for posting transport callbacks to the service loop.
///
/// Every method only enqueues; the loop applies commands one at a time in
/// the order they were posted.
#[derive(Debug, Clone)]
pub struct ServiceHandle {
    tx: mpsc::UnboundedSender<ServiceMessage>,
    cancel: CancellationToken,
}

impl ServiceHandle {
    pub(crate) fn new(tx: mpsc::UnboundedSender<ServiceMessage>, cancel: CancellationToken) -> Self {
        Self { tx, cancel }
    }

    pub fn on_prepare(&self) -> Result<()> {
        self.command(TransportCommand::Prepare)
    }

    pub fn on_play(&self) -> Result<()> {
        self.command(TransportCommand::Play)
    }

    pub fn on_pause(&self) -> Result<()> {
        self.command(TransportCommand::Pause)
    }

    pub fn on_stop(&self) -> Result<()> {
        self.command(TransportCommand::Stop)
    }

    pub fn on_skip_to_next(&self) -> Result<()> {
        self.command(TransportCommand::SkipNext)
    }

    pub fn on_skip_to_previous(&self) -> Result<()> {
        self.command(TransportCommand::SkipPrev)
    }

    pub fn on_seek_to(&self, position_ms: u64) -> Result<()> {
        self.command(TransportCommand::SeekTo(position_ms))
    }

    pub fn on_add_queue_item(&self, description: MediaDescription) -> Result<()> {
        self.command(TransportCommand::AddQueueItem(description))
    }

    pub fn on_remove_queue_item(&self, description: MediaDescription) -> Result<()> {
        self.command(TransportCommand::RemoveQueueItem(description))
    }

    pub fn on_play_from_media_id(&self, media_id: impl Into<String>) -> Result<()> {
        self.command(TransportCommand::PlayFromMediaId(media_id.into()))
    }

    pub fn on_set_repeat_mode(&self, mode: RepeatMode) -> Result<()> {
        self.command(TransportCommand::SetRepeatMode(mode))
    }

    /// The user removed the host task; the service stops itself.
    pub fn on_task_removed(&self) -> Result<()> {
        self.post(ServiceMessage::TaskRemoved)
    }

    /// Post an arbitrary transport command.
    pub fn command(&self, command: TransportCommand) -> Result<()> {
        debug!(command = command.name(), "Posting transport command");
        self.post(ServiceMessage::Command(command))
    }

    /// Ask the loop to tear down. Idempotent.
    pub fn shutdown(&self) {
        self.cancel.cancel();
    }

    pub fn is_running(&self) -> bool {
        !self.cancel.is_cancelled() && !self.tx.is_closed()
    }

    pub(crate) fn post(&self, message: ServiceMessage) -> Result<()> {
        if self.cancel.is_cancelled() {
            return Err(CoreError::ServiceStopped);
        }
        self.tx.send(message).map_err(|_| CoreError::ServiceStopped)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn commands_are_queued_in_order() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let handle = ServiceHandle::new(tx, CancellationToken::new());

        handle.on_play().unwrap();
        handle.on_seek_to(1_500).unwrap();
        handle.on_task_removed().unwrap();

        assert!(matches!(
            rx.try_recv().unwrap(),
            ServiceMessage::Command(TransportCommand::Play)
        ));
        assert!(matches!(
            rx.try_recv().unwrap(),
            ServiceMessage::Command(TransportCommand::SeekTo(1_500))
        ));
        assert!(matches!(rx.try_recv().unwrap(), ServiceMessage::TaskRemoved));
    }

    #[test]
    fn posting_after_shutdown_fails() {
        let (tx, _rx) = mpsc::unbounded_channel();
        let handle = ServiceHandle::new(tx, CancellationToken::new());

        handle.shutdown();
        assert!(!handle.is_running());
        assert!(matches!(handle.on_pause(), Err(CoreError::ServiceStopped)));
    }

    #[test]
    fn posting_to_a_closed_loop_fails() {
        let (tx, rx) = mpsc::unbounded_channel();
        let handle = ServiceHandle::new(tx, CancellationToken::new());
        drop(rx);
        assert!(matches!(handle.on_stop(), Err(CoreError::ServiceStopped)));
    }
}
