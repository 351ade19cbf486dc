//! Bounded buffer of samples pending decode.

/// Append-only speech buffer, bounded by the session's maximum segment duration.
///
/// The bound is the session's only backpressure valve against input arriving faster
/// than decode completes: once exceeded, the engine forces a decode regardless of
/// voice-activity state. Overflow is never an error.
#[derive(Debug)]
pub struct SpeechAccumulator {
    samples: Vec<f32>,
    max_samples: usize,
}

impl SpeechAccumulator {
    pub fn new(max_samples: usize) -> Self {
        Self {
            samples: Vec::with_capacity(max_samples),
            max_samples,
        }
    }

    pub fn append(&mut self, samples: &[f32]) {
        self.samples.extend_from_slice(samples);
    }

    pub fn samples(&self) -> &[f32] {
        &self.samples
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// True once the pending speech exceeds the configured bound.
    pub fn overflowed(&self) -> bool {
        self.samples.len() > self.max_samples
    }

    pub fn duration_ms(&self, sample_rate: u32) -> u64 {
        (self.samples.len() as u64 * 1000) / u64::from(sample_rate)
    }

    pub fn clear(&mut self) {
        self.samples.clear();
    }
}
