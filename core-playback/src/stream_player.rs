//! # Stream Player
//!
//! [`PlayerAdapter`] that decodes each item on its own tokio task and writes
//! the PCM into an [`AudioSink`].
//!
//! ## Lifecycle of one item
//!
//! ```text
//! play_from_media ──▶ PREPARING ──open/probe──▶ PLAYING ⇄ PAUSED
//!                                                 │
//!                         end of stream ──────────┼──▶ COMPLETED + Completed (stop() ▶ STOPPED)
//!                         stop() ─────────────────┼──▶ STOPPED
//!                         open/decode/sink error ─┴──▶ ERROR(kind)
//! ```
//!
//! A second `play_from_media` aborts the running task and starts a new
//! generation; anything the old task still tries to report is dropped by
//! [`PlayerEventSender`].

use bridge_traits::media::MediaItem;
use bridge_traits::playback::{PlaybackState, PlaybackStatus};
use bridge_traits::time::Clock;
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Duration;
use tokio::runtime::Handle;
use tokio::sync::mpsc::{self, error::TryRecvError, error::TrySendError};
use tokio::task::JoinHandle;
use tracing::{debug, error, info, instrument, warn};

use crate::config::{clamp_volume, PlayerConfig};
use crate::error::{PlaybackError, Result};
use crate::events::PlayerEventSender;
use crate::traits::{AudioDecoder, AudioSink, DecoderFactory, PlayerAdapter};

#[derive(Debug, Clone, Copy, PartialEq)]
enum Control {
    Pause,
    Resume,
    Seek(u64),
    Volume(f32),
}

#[derive(Debug, Clone)]
struct Progress {
    status: PlaybackStatus,
    position_ms: u64,
}

type SharedProgress = Arc<Mutex<Progress>>;

struct Worker {
    generation: u64,
    item: Arc<MediaItem>,
    control: mpsc::Sender<Control>,
    progress: SharedProgress,
    task: JoinHandle<()>,
}

impl Worker {
    fn status(&self) -> PlaybackStatus {
        self.progress.lock().status.clone()
    }

    fn position_ms(&self) -> u64 {
        self.progress.lock().position_ms
    }

    fn send(&self, control: Control) {
        match self.control.try_send(control) {
            Ok(()) => {}
            Err(TrySendError::Full(control)) => {
                warn!(?control, "Player control channel full; command dropped")
            }
            Err(TrySendError::Closed(control)) => {
                debug!(?control, "Player worker already finished")
            }
        }
    }
}

/// Decoder-to-sink player.
pub struct StreamPlayer<F, S> {
    factory: Arc<F>,
    sink: Arc<S>,
    clock: Arc<dyn Clock>,
    config: PlayerConfig,
    events: PlayerEventSender,
    runtime: Handle,
    volume: f32,
    current: Option<Arc<MediaItem>>,
    worker: Option<Worker>,
}

impl<F: DecoderFactory, S: AudioSink> StreamPlayer<F, S> {
    /// Create a player that spawns its workers on the current tokio runtime.
    pub fn new(
        factory: Arc<F>,
        sink: Arc<S>,
        clock: Arc<dyn Clock>,
        config: PlayerConfig,
        events: PlayerEventSender,
    ) -> Result<Self> {
        let runtime = Handle::try_current().map_err(|e| {
            PlaybackError::Internal(format!("StreamPlayer requires a tokio runtime: {}", e))
        })?;
        Ok(Self::with_runtime(runtime, factory, sink, clock, config, events))
    }

    pub fn with_runtime(
        runtime: Handle,
        factory: Arc<F>,
        sink: Arc<S>,
        clock: Arc<dyn Clock>,
        config: PlayerConfig,
        events: PlayerEventSender,
    ) -> Self {
        let config = config.normalized();
        Self {
            factory,
            sink,
            clock,
            volume: config.initial_volume,
            config,
            events,
            runtime,
            current: None,
            worker: None,
        }
    }

    pub fn volume(&self) -> f32 {
        self.volume
    }

    pub fn sink(&self) -> &Arc<S> {
        &self.sink
    }

    fn release_worker(&mut self) {
        if let Some(worker) = self.worker.take() {
            debug!(generation = worker.generation, "Releasing player worker");
            worker.task.abort();
        }
    }

    fn spawn_worker(&mut self, item: Arc<MediaItem>) {
        let generation = self.events.advance();
        let progress: SharedProgress = Arc::new(Mutex::new(Progress {
            status: PlaybackStatus::Preparing,
            position_ms: 0,
        }));

        self.events.send_state(
            generation,
            PlaybackState::new(PlaybackStatus::Preparing, 0, self.clock.now()),
        );

        let (control_tx, control_rx) = mpsc::channel(self.config.control_buffer);
        let job = ItemJob {
            generation,
            item: Arc::clone(&item),
            factory: Arc::clone(&self.factory),
            sink: Arc::clone(&self.sink),
            clock: Arc::clone(&self.clock),
            events: self.events.clone(),
            progress: Arc::clone(&progress),
            chunk_frames: self.config.decode_chunk_frames,
            volume: self.volume,
        };
        let task = self.runtime.spawn(job.run(control_rx));

        self.worker = Some(Worker {
            generation,
            item,
            control: control_tx,
            progress,
            task,
        });
    }
}

impl<F: DecoderFactory, S: AudioSink> PlayerAdapter for StreamPlayer<F, S> {
    #[instrument(skip(self, item), fields(media_id = %item.id()))]
    fn play_from_media(&mut self, item: Arc<MediaItem>) {
        if let Some(worker) = &self.worker {
            let status = worker.status();
            let same_item = worker.item.id() == item.id();
            if same_item
                && matches!(status, PlaybackStatus::Playing | PlaybackStatus::Paused)
                && !worker.task.is_finished()
            {
                debug!(status = status.name(), "Continuing current item");
                worker.send(Control::Resume);
                self.current = Some(item);
                return;
            }
        }

        self.release_worker();
        self.spawn_worker(Arc::clone(&item));
        info!(generation = self.events.generation(), "Playing item");
        self.current = Some(item);
    }

    #[instrument(skip(self))]
    fn pause(&mut self) {
        match &self.worker {
            Some(worker) if worker.status().is_playing() => worker.send(Control::Pause),
            _ => debug!("Pause ignored: not playing"),
        }
    }

    /// Also reported after COMPLETED: the finished item's task is kept until
    /// the next `play_from_media` or `stop`, so stopping it delivers STOPPED
    /// behind the `Completed` event of the same generation.
    #[instrument(skip(self))]
    fn stop(&mut self) {
        let Some(worker) = self.worker.take() else {
            debug!("Stop ignored: player idle");
            return;
        };
        worker.task.abort();
        let state = PlaybackState::new(
            PlaybackStatus::Stopped,
            worker.position_ms(),
            self.clock.now(),
        );
        info!(generation = worker.generation, "Player stopped");
        self.events.finish(worker.generation, state);
    }

    #[instrument(skip(self))]
    fn seek_to(&mut self, position_ms: u64) {
        match &self.worker {
            Some(worker)
                if matches!(
                    worker.status(),
                    PlaybackStatus::Playing | PlaybackStatus::Paused
                ) =>
            {
                worker.send(Control::Seek(position_ms))
            }
            _ => debug!("Seek ignored: nothing playing"),
        }
    }

    fn set_volume(&mut self, volume: f32) {
        self.volume = clamp_volume(volume);
        if let Some(worker) = &self.worker {
            worker.send(Control::Volume(self.volume));
        }
    }

    fn current_media(&self) -> Option<Arc<MediaItem>> {
        self.current.clone()
    }

    fn generation(&self) -> u64 {
        self.events.generation()
    }
}

impl<F, S> Drop for StreamPlayer<F, S> {
    fn drop(&mut self) {
        if let Some(worker) = self.worker.take() {
            worker.task.abort();
        }
    }
}

// ============================================================================
// Worker
// ============================================================================

/// Milliseconds in `duration`, saturating at `u64::MAX`.
fn whole_millis(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

enum Outcome {
    Completed,
    Detached,
}

struct ItemJob<F, S> {
    generation: u64,
    item: Arc<MediaItem>,
    factory: Arc<F>,
    sink: Arc<S>,
    clock: Arc<dyn Clock>,
    events: PlayerEventSender,
    progress: SharedProgress,
    chunk_frames: usize,
    volume: f32,
}

impl<F: DecoderFactory, S: AudioSink> ItemJob<F, S> {
    async fn run(self, mut control: mpsc::Receiver<Control>) {
        match self.play(&mut control).await {
            Ok(Outcome::Completed) => {
                debug!(media_id = %self.item.id(), "Item completed")
            }
            Ok(Outcome::Detached) => {
                debug!(media_id = %self.item.id(), "Player released item")
            }
            Err(err) => self.fail(err),
        }
    }

    async fn play(&self, control: &mut mpsc::Receiver<Control>) -> Result<Outcome> {
        let mut decoder = self.factory.open(&self.item).await?;
        let probe = decoder.probe().await?;
        let format = probe.format;
        let duration_ms = probe
            .duration
            .map(whole_millis)
            .or_else(|| self.item.duration_ms());

        debug!(
            media_id = %self.item.id(),
            sample_rate = format.sample_rate,
            channels = format.channels,
            ?duration_ms,
            "Item prepared"
        );

        let mut volume = self.volume;
        let mut paused = false;
        let mut position_ms = 0;
        self.report(PlaybackStatus::Playing, position_ms);

        loop {
            let command = if paused {
                match control.recv().await {
                    Some(command) => Some(command),
                    None => return Ok(Outcome::Detached),
                }
            } else {
                match control.try_recv() {
                    Ok(command) => Some(command),
                    Err(TryRecvError::Empty) => None,
                    Err(TryRecvError::Disconnected) => return Ok(Outcome::Detached),
                }
            };

            if let Some(command) = command {
                match command {
                    Control::Pause if !paused => {
                        paused = true;
                        self.report(PlaybackStatus::Paused, position_ms);
                    }
                    Control::Resume if paused => {
                        paused = false;
                        self.report(PlaybackStatus::Playing, position_ms);
                    }
                    Control::Seek(target) => {
                        position_ms = self
                            .seek(decoder.as_mut(), target, duration_ms, position_ms)
                            .await?;
                        let status = if paused {
                            PlaybackStatus::Paused
                        } else {
                            PlaybackStatus::Playing
                        };
                        self.report(status, position_ms);
                    }
                    Control::Volume(level) => volume = level,
                    Control::Pause | Control::Resume => {}
                }
                continue;
            }

            match decoder.decode_frames(self.chunk_frames).await? {
                Some(mut chunk) => {
                    chunk.apply_gain(volume);
                    self.sink.write(&chunk, &format).await?;
                    position_ms = whole_millis(chunk.end(format.sample_rate));
                    self.progress.lock().position_ms = position_ms;
                }
                None => {
                    self.report(PlaybackStatus::Completed, position_ms);
                    self.events.send_completed(self.generation);
                    return Ok(Outcome::Completed);
                }
            }

            tokio::task::yield_now().await;
        }
    }

    /// Seek clamped to the known duration. A decoder that cannot seek keeps
    /// its position.
    async fn seek(
        &self,
        decoder: &mut dyn AudioDecoder,
        target_ms: u64,
        duration_ms: Option<u64>,
        position_ms: u64,
    ) -> Result<u64> {
        let target_ms = duration_ms.map_or(target_ms, |duration| target_ms.min(duration));
        match decoder.seek(Duration::from_millis(target_ms)).await {
            Ok(()) => {
                self.sink.flush().await?;
                debug!(media_id = %self.item.id(), target_ms, "Seek completed");
                Ok(target_ms)
            }
            Err(err) => {
                warn!(media_id = %self.item.id(), target_ms, error = %err, "Seek failed");
                Ok(position_ms)
            }
        }
    }

    fn report(&self, status: PlaybackStatus, position_ms: u64) {
        {
            let mut progress = self.progress.lock();
            progress.status = status.clone();
            progress.position_ms = position_ms;
        }
        let state = PlaybackState::new(status, position_ms, self.clock.now());
        self.events.send_state(self.generation, state);
    }

    fn fail(&self, err: PlaybackError) {
        let kind = err.kind();
        error!(media_id = %self.item.id(), %kind, error = %err, "Playback failed");
        let position_ms = {
            let mut progress = self.progress.lock();
            progress.status = PlaybackStatus::Error {
                kind,
                message: err.to_string(),
            };
            progress.position_ms
        };
        let state = PlaybackState::error(kind, err.to_string(), position_ms, self.clock.now());
        self.events.send_state(self.generation, state);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn whole_millis_saturates() {
        assert_eq!(whole_millis(Duration::from_millis(1_500)), 1_500);
        assert_eq!(whole_millis(Duration::from_micros(2_999)), 2);
        assert_eq!(whole_millis(Duration::MAX), u64::MAX);
    }
}
