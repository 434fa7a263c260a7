//! # Desktop Session Demo
//!
//! Runs the music service with the desktop bridge shims and a two-track
//! catalog of synthetic sine tones, then drives it through play, pause,
//! skip and stop while printing every event from the bus.
//!
//! Run with: `cargo run --example desktop_session --package core-service`

use async_trait::async_trait;
use bridge_traits::media::MediaItem;
use bridge_traits::playback::RepeatMode;
use bridge_traits::time::{LogLevel, SystemClock};
use core_catalog::StaticSource;
use core_playback::{
    AudioCodec, AudioDecoder, AudioFormat, AudioFrameChunk, DecoderFactory, NullSink,
    PlayerConfig, PlayerEventSender, ProbeResult, Result as PlaybackResult, StreamPlayer,
};
use core_runtime::config::CoreConfig;
use core_runtime::events::{CoreEvent, SessionEvent};
use core_runtime::logging::{init_logging, LogFormat, LoggingConfig};
use core_service::MusicService;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::sleep;

// ============================================================================
// Synthetic tone decoder
// ============================================================================

const SAMPLE_RATE: u32 = 8_000;

struct SineDecoder {
    frequency: f64,
    total_frames: usize,
    position: usize,
}

#[async_trait]
impl AudioDecoder for SineDecoder {
    async fn probe(&mut self) -> PlaybackResult<ProbeResult> {
        let seconds = self.total_frames as f64 / SAMPLE_RATE as f64;
        Ok(
            ProbeResult::new(AudioFormat::new(AudioCodec::Wav, SAMPLE_RATE, 1, Some(16), None))
                .with_duration(Some(Duration::from_secs_f64(seconds))),
        )
    }

    async fn decode_frames(&mut self, max_frames: usize) -> PlaybackResult<Option<AudioFrameChunk>> {
        if self.position >= self.total_frames {
            return Ok(None);
        }
        let frames = max_frames.min(self.total_frames - self.position);
        let samples = (self.position..self.position + frames)
            .map(|i| {
                let t = i as f64 / SAMPLE_RATE as f64;
                ((2.0 * std::f64::consts::PI * self.frequency * t).sin() * 0.3) as f32
            })
            .collect();
        let timestamp = Duration::from_secs_f64(self.position as f64 / SAMPLE_RATE as f64);
        self.position += frames;
        Ok(Some(AudioFrameChunk::new(samples, frames, timestamp)))
    }

    async fn seek(&mut self, position: Duration) -> PlaybackResult<()> {
        let frame = (position.as_secs_f64() * SAMPLE_RATE as f64) as usize;
        self.position = frame.min(self.total_frames);
        Ok(())
    }
}

/// Reads the tone from a `tone://<hz>` media URI, 440 Hz otherwise.
struct SineFactory;

#[async_trait]
impl DecoderFactory for SineFactory {
    async fn open(&self, item: &MediaItem) -> PlaybackResult<Box<dyn AudioDecoder>> {
        let frequency = item
            .media_uri()
            .and_then(|uri| uri.strip_prefix("tone://"))
            .and_then(|hz| hz.parse().ok())
            .unwrap_or(440.0);
        Ok(Box::new(SineDecoder {
            frequency,
            total_frames: SAMPLE_RATE as usize * 2,
            position: 0,
        }))
    }
}

fn track(id: &str, title: &str, frequency: f64) -> MediaItem {
    MediaItem::builder(id)
        .title(title)
        .artist("Tone Generator")
        .album("Demo Tones")
        .media_uri(format!("tone://{frequency}"))
        .build()
}

// ============================================================================
// Main
// ============================================================================

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_logging(
        LoggingConfig::default()
            .with_format(LogFormat::Compact)
            .with_level(LogLevel::Info),
    )?;

    // No bridges injected: the desktop shims fill in the session host,
    // foreground service and notification poster.
    let config = CoreConfig::builder()
        .repeat_mode(RepeatMode::None)
        .prepare_timeout(Duration::from_secs(5))
        .build()?;

    let (sender, receiver) = PlayerEventSender::channel();
    let player = StreamPlayer::new(
        Arc::new(SineFactory),
        Arc::new(NullSink::realtime()),
        Arc::new(SystemClock),
        PlayerConfig::default(),
        sender,
    )?;

    let catalog = StaticSource::new(vec![
        track("a4", "A above middle C", 440.0),
        track("e5", "E five", 659.25),
    ]);

    let service = MusicService::builder(config)
        .source(Arc::new(catalog))
        .player(Box::new(player), receiver)
        .start()?;

    let mut events = service.subscribe();
    let printer = tokio::spawn(async move {
        while let Ok(event) = events.recv().await {
            println!(
                "[{:?}] {}: {}",
                event.severity(),
                event.description(),
                serde_json::to_string(&event).unwrap_or_default()
            );
            if matches!(event, CoreEvent::Session(SessionEvent::ForegroundStopped)) {
                println!("service left the started state");
            }
        }
    });

    let controls = service.handle();
    sleep(Duration::from_millis(100)).await;

    controls.on_play()?;
    sleep(Duration::from_millis(700)).await;
    controls.on_pause()?;
    sleep(Duration::from_millis(300)).await;
    controls.on_play()?;
    sleep(Duration::from_millis(300)).await;
    controls.on_skip_to_next()?;
    sleep(Duration::from_millis(700)).await;
    controls.on_stop()?;
    sleep(Duration::from_millis(200)).await;

    service.shutdown().await?;
    printer.abort();
    Ok(())
}
