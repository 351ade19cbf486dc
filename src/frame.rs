//! The unit of hand-off between audio capture and the session engine.

/// A chunk of captured mono samples plus stream boundary flags.
///
/// Produced once per hand-off and consumed exactly once.
#[derive(Debug, Clone, Default)]
pub struct Frame {
    /// Mono samples at the session's configured sample rate.
    pub samples: Vec<f32>,
    /// First frame of a new session. Resets all session-scoped state.
    pub start_of_stream: bool,
    /// Last frame of the session. Forces a final decode and an eof flush.
    pub end_of_stream: bool,
}

impl Frame {
    /// Creates a mid-stream frame.
    pub fn new(samples: Vec<f32>) -> Self {
        Self {
            samples,
            start_of_stream: false,
            end_of_stream: false,
        }
    }

    /// Returns the duration of this frame in milliseconds.
    pub fn duration_ms(&self, sample_rate: u32) -> u64 {
        (self.samples.len() as u64 * 1000) / u64::from(sample_rate)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duration_is_derived_from_sample_rate() {
        let frame = Frame::new(vec![0.0; 16_000]);
        assert_eq!(frame.duration_ms(16_000), 1_000);

        let frame = Frame::new(vec![0.0; 8_000]);
        assert_eq!(frame.duration_ms(16_000), 500);
    }

    #[test]
    fn empty_frame_has_zero_duration() {
        let frame = Frame::default();
        assert_eq!(frame.duration_ms(16_000), 0);
    }
}
