//! Voice-activity gating.
//!
//! The session engines consume noise suppression and silence removal as stateful
//! filters behind one seam: [`VoiceActivityGate`]. Both filters carry adaptive state
//! that is reset at start-of-stream and never mid-utterance. Built-in
//! implementations ([`DcBlocker`], [`EnergyGate`]) keep the crate usable without an
//! external DSP stack; heavier models plug in through the same traits.

use std::ops::Range;

mod denoise;
mod energy;

pub use denoise::{DcBlocker, Denoiser, NoOpDenoiser};
pub use energy::{EnergyGate, EnergyGateConfig};

/// Stateful silence removal.
pub trait SilenceFilter: Send {
    /// Classifies a frame and returns the active sample subrange; an empty range
    /// means no speech was detected in the frame.
    fn remove_silence(&mut self, samples: &[f32]) -> Range<usize>;

    /// Clears adaptive state. Called at start-of-stream only.
    fn reset(&mut self);
}

/// Wraps stateful noise suppression and silence removal behind one seam.
pub struct VoiceActivityGate {
    denoiser: Box<dyn Denoiser>,
    filter: Box<dyn SilenceFilter>,
}

impl VoiceActivityGate {
    pub fn new(denoiser: Box<dyn Denoiser>, filter: Box<dyn SilenceFilter>) -> Self {
        Self { denoiser, filter }
    }

    /// Gate with the built-in DC blocker and energy-based silence filter.
    pub fn with_defaults(sample_rate: u32) -> Self {
        Self::new(
            Box::new(DcBlocker::new()),
            Box::new(EnergyGate::new(sample_rate, EnergyGateConfig::default())),
        )
    }

    /// Suppresses noise in place.
    pub fn denoise(&mut self, samples: &mut [f32]) {
        self.denoiser.process(samples);
    }

    /// Returns the active sample subrange of the frame (possibly empty).
    pub fn remove_silence(&mut self, samples: &[f32]) -> Range<usize> {
        self.filter.remove_silence(samples)
    }

    /// Resets both filters. Start-of-stream only; never mid-utterance.
    pub fn reset(&mut self) {
        self.denoiser.reset();
        self.filter.reset();
    }
}
