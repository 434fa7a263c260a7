//! Audio sinks that need no device.

use async_trait::async_trait;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use crate::error::Result;
use crate::traits::{AudioFormat, AudioFrameChunk, AudioSink};

/// Sink that discards samples.
///
/// With [`NullSink::realtime`] each write waits for the chunk's duration, so
/// a headless player advances at the speed a real device would.
#[derive(Debug, Default)]
pub struct NullSink {
    realtime: bool,
    frames: AtomicU64,
    writes: AtomicU64,
}

impl NullSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn realtime() -> Self {
        Self {
            realtime: true,
            ..Self::default()
        }
    }

    pub fn frames_written(&self) -> u64 {
        self.frames.load(Ordering::Relaxed)
    }

    pub fn writes(&self) -> u64 {
        self.writes.load(Ordering::Relaxed)
    }
}

#[async_trait]
impl AudioSink for NullSink {
    async fn write(&self, chunk: &AudioFrameChunk, format: &AudioFormat) -> Result<()> {
        self.frames.fetch_add(chunk.frames as u64, Ordering::Relaxed);
        self.writes.fetch_add(1, Ordering::Relaxed);
        if self.realtime {
            let duration = chunk.duration(format.sample_rate);
            if duration > Duration::ZERO {
                tokio::time::sleep(duration).await;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn counts_frames() {
        let sink = NullSink::new();
        let chunk = AudioFrameChunk::new(vec![0.0; 20], 10, Duration::ZERO);
        sink.write(&chunk, &AudioFormat::cd_quality()).await.unwrap();
        sink.write(&chunk, &AudioFormat::cd_quality()).await.unwrap();
        assert_eq!(sink.frames_written(), 20);
        assert_eq!(sink.writes(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn realtime_waits_for_chunk_duration() {
        let sink = NullSink::realtime();
        let chunk = AudioFrameChunk::new(vec![0.0; 4410], 4410, Duration::ZERO);
        let started = tokio::time::Instant::now();
        sink.write(&chunk, &AudioFormat::new(crate::AudioCodec::Wav, 44100, 1, None, None))
            .await
            .unwrap();
        assert!(started.elapsed() >= Duration::from_millis(100));
    }
}
