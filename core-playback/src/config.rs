//! # Player Configuration

use serde::{Deserialize, Serialize};

/// Settings for [`StreamPlayer`](crate::StreamPlayer).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerConfig {
    /// Frames pulled from the decoder per cycle.
    ///
    /// Default: 4096 frames (~93ms at 44.1kHz).
    #[serde(default = "default_decode_chunk_frames")]
    pub decode_chunk_frames: usize,

    /// Output gain applied before the sink, in `[0.0, 1.0]`.
    ///
    /// Default: 1.0.
    #[serde(default = "default_initial_volume")]
    pub initial_volume: f32,

    /// Capacity of the per-item control channel.
    ///
    /// Default: 16.
    #[serde(default = "default_control_buffer")]
    pub control_buffer: usize,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            decode_chunk_frames: default_decode_chunk_frames(),
            initial_volume: default_initial_volume(),
            control_buffer: default_control_buffer(),
        }
    }
}

impl PlayerConfig {
    pub fn with_decode_chunk_frames(mut self, frames: usize) -> Self {
        self.decode_chunk_frames = frames;
        self
    }

    pub fn with_initial_volume(mut self, volume: f32) -> Self {
        self.initial_volume = volume;
        self
    }

    pub fn with_control_buffer(mut self, capacity: usize) -> Self {
        self.control_buffer = capacity;
        self
    }

    /// Copy with zero sizes raised to 1 and the volume clamped.
    pub fn normalized(&self) -> Self {
        Self {
            decode_chunk_frames: self.decode_chunk_frames.max(1),
            initial_volume: clamp_volume(self.initial_volume),
            control_buffer: self.control_buffer.max(1),
        }
    }
}

pub(crate) fn clamp_volume(volume: f32) -> f32 {
    if volume.is_nan() {
        return 0.0;
    }
    volume.clamp(0.0, 1.0)
}

fn default_decode_chunk_frames() -> usize {
    4096
}

fn default_initial_volume() -> f32 {
    1.0
}

fn default_control_buffer() -> usize {
    16
}
