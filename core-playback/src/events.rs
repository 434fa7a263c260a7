//! Player → coordinator event channel.
//!
//! Every event carries the generation of the `play_from_media` call that
//! produced it. [`PlayerEventSender`] checks the generation and pushes the
//! event under one lock, so once [`PlayerEventSender::advance`] returns no
//! event from an older generation can reach the receiver.

use bridge_traits::playback::PlaybackState;
use parking_lot::Mutex;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{trace, warn};

/// Notification from the player.
#[derive(Debug, Clone, PartialEq)]
pub enum PlayerEvent {
    /// Status, position basis or allowed actions changed.
    StateChanged {
        generation: u64,
        state: PlaybackState,
    },
    /// The item played to its end. Follows the final `StateChanged`.
    Completed { generation: u64 },
}

impl PlayerEvent {
    pub fn generation(&self) -> u64 {
        match self {
            PlayerEvent::StateChanged { generation, .. } => *generation,
            PlayerEvent::Completed { generation } => *generation,
        }
    }
}

pub type PlayerEventReceiver = mpsc::UnboundedReceiver<PlayerEvent>;

#[derive(Debug)]
struct SenderState {
    generation: u64,
    tx: mpsc::UnboundedSender<PlayerEvent>,
    closed: bool,
}

/// Generation-checked sending half shared by a player and its workers.
#[derive(Debug, Clone)]
pub struct PlayerEventSender {
    inner: Arc<Mutex<SenderState>>,
}

impl PlayerEventSender {
    /// Create a sender and the receiver the coordinator loop owns.
    pub fn channel() -> (Self, PlayerEventReceiver) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self::new(tx), rx)
    }

    pub fn new(tx: mpsc::UnboundedSender<PlayerEvent>) -> Self {
        Self {
            inner: Arc::new(Mutex::new(SenderState {
                generation: 0,
                tx,
                closed: false,
            })),
        }
    }

    pub fn generation(&self) -> u64 {
        self.inner.lock().generation
    }

    /// Start a new generation; events stamped with older ones are dropped.
    pub fn advance(&self) -> u64 {
        let mut inner = self.inner.lock();
        inner.generation += 1;
        inner.generation
    }

    pub fn send_state(&self, generation: u64, state: PlaybackState) -> bool {
        self.send(PlayerEvent::StateChanged { generation, state })
    }

    pub fn send_completed(&self, generation: u64) -> bool {
        self.send(PlayerEvent::Completed { generation })
    }

    /// Deliver a final `state` for `generation` and retire it in one step.
    pub fn finish(&self, generation: u64, state: PlaybackState) -> bool {
        let mut inner = self.inner.lock();
        let sent = Self::deliver(&mut inner, PlayerEvent::StateChanged { generation, state });
        if inner.generation == generation {
            inner.generation += 1;
        }
        sent
    }

    /// Deliver `event` if its generation is current. Returns whether it was queued.
    pub fn send(&self, event: PlayerEvent) -> bool {
        let mut inner = self.inner.lock();
        Self::deliver(&mut inner, event)
    }

    fn deliver(inner: &mut SenderState, event: PlayerEvent) -> bool {
        if event.generation() != inner.generation {
            trace!(
                stale = event.generation(),
                current = inner.generation,
                "Dropping superseded player event"
            );
            return false;
        }
        if inner.tx.send(event).is_err() {
            if !inner.closed {
                warn!("Player event receiver closed; further events are discarded");
                inner.closed = true;
            }
            return false;
        }
        true
    }
}
