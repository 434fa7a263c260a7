//! Conversion of decoded symphonia buffers to interleaved `f32`.

use symphonia::core::audio::{AudioBufferRef, SampleBuffer, SignalSpec};

struct Scratch {
    spec: SignalSpec,
    capacity: usize,
    buffer: SampleBuffer<f32>,
}

/// Reusable converter from any symphonia sample format to interleaved
/// `f32` in `[-1.0, 1.0]`.
#[derive(Default)]
pub struct SampleConverter {
    scratch: Option<Scratch>,
}

impl SampleConverter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Interleave `decoded` (LLLL…RRRR… → LRLR…), converting samples to `f32`.
    pub fn interleave(&mut self, decoded: AudioBufferRef<'_>) -> Vec<f32> {
        let spec = *decoded.spec();
        let capacity = decoded.capacity();

        let reusable = matches!(
            &self.scratch,
            Some(scratch) if scratch.spec == spec && scratch.capacity >= capacity
        );
        if !reusable {
            self.scratch = Some(Scratch {
                spec,
                capacity,
                buffer: SampleBuffer::new(capacity as u64, spec),
            });
        }

        match self.scratch.as_mut() {
            Some(scratch) => {
                scratch.buffer.copy_interleaved_ref(decoded);
                scratch.buffer.samples().to_vec()
            }
            None => Vec::new(),
        }
    }
}
