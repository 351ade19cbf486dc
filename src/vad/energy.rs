//! RMS-based silence filter with an adaptive noise floor.

use std::ops::Range;

use super::SilenceFilter;

/// Tuning for [`EnergyGate`].
#[derive(Debug, Clone, Copy)]
pub struct EnergyGateConfig {
    /// Analysis sub-window, in milliseconds.
    pub window_ms: u32,
    /// Absolute RMS floor below which a window is never speech.
    pub threshold: f32,
    /// A window is speech when its RMS exceeds `noise_floor * floor_ratio`.
    pub floor_ratio: f32,
    /// EMA coefficient applied to the noise floor on silent windows.
    pub floor_adapt: f32,
    /// Keep the gate open this long after the last speech window, so brief
    /// inter-word gaps stay inside the active range.
    pub hangover_ms: u32,
}

impl Default for EnergyGateConfig {
    fn default() -> Self {
        Self {
            window_ms: 20,
            threshold: 0.01,
            floor_ratio: 3.0,
            floor_adapt: 0.05,
            hangover_ms: 240,
        }
    }
}

/// Energy-based voice-activity filter.
///
/// Classifies fixed sub-windows of each frame by RMS against the larger of an
/// absolute threshold and an adaptive noise floor, and reports the span from the
/// first to the last active window. The noise floor adapts only on silent windows;
/// hangover state carries across frames, so it must be reset at start-of-stream.
pub struct EnergyGate {
    config: EnergyGateConfig,
    sample_rate: u32,
    window_samples: usize,
    noise_floor: f32,
    hangover_left_ms: u32,
}

impl EnergyGate {
    pub fn new(sample_rate: u32, config: EnergyGateConfig) -> Self {
        let window_samples =
            ((u64::from(sample_rate) * u64::from(config.window_ms)) / 1000).max(1) as usize;
        Self {
            config,
            sample_rate,
            window_samples,
            noise_floor: 0.0,
            hangover_left_ms: 0,
        }
    }
}

impl SilenceFilter for EnergyGate {
    fn remove_silence(&mut self, samples: &[f32]) -> Range<usize> {
        let mut first: Option<usize> = None;
        let mut last_end = 0usize;

        let mut offset = 0usize;
        while offset < samples.len() {
            let end = (offset + self.window_samples).min(samples.len());
            let window = &samples[offset..end];
            let level = rms(window);

            let cutoff = self
                .config
                .threshold
                .max(self.noise_floor * self.config.floor_ratio);

            let active = if level > cutoff {
                self.hangover_left_ms = self.config.hangover_ms;
                true
            } else {
                self.noise_floor += self.config.floor_adapt * (level - self.noise_floor);
                let window_ms =
                    (window.len() as u64 * 1000 / u64::from(self.sample_rate.max(1))) as u32;
                let in_hangover = self.hangover_left_ms > 0;
                self.hangover_left_ms = self.hangover_left_ms.saturating_sub(window_ms.max(1));
                in_hangover
            };

            if active {
                if first.is_none() {
                    first = Some(offset);
                }
                last_end = end;
            }

            offset = end;
        }

        match first {
            Some(start) => start..last_end,
            None => 0..0,
        }
    }

    fn reset(&mut self) {
        self.noise_floor = 0.0;
        self.hangover_left_ms = 0;
    }
}

fn rms(samples: &[f32]) -> f32 {
    if samples.is_empty() {
        return 0.0;
    }
    (samples.iter().map(|s| s * s).sum::<f32>() / samples.len() as f32).sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;

    const RATE: u32 = 16_000;

    fn no_hangover() -> EnergyGate {
        EnergyGate::new(
            RATE,
            EnergyGateConfig {
                hangover_ms: 0,
                ..EnergyGateConfig::default()
            },
        )
    }

    fn tone(len: usize) -> Vec<f32> {
        (0..len).map(|i| if i % 2 == 0 { 0.5 } else { -0.5 }).collect()
    }

    #[test]
    fn silence_yields_an_empty_range() {
        let mut gate = no_hangover();
        assert!(gate.remove_silence(&vec![0.0; 16_000]).is_empty());
    }

    #[test]
    fn full_frame_speech_covers_the_whole_frame() {
        let mut gate = no_hangover();
        let frame = tone(3_200);
        assert_eq!(gate.remove_silence(&frame), 0..3_200);
    }

    #[test]
    fn burst_in_the_middle_yields_a_subrange() {
        let mut gate = no_hangover();

        // 200ms silence, 400ms speech, 400ms silence at 16kHz, window-aligned.
        let mut frame = vec![0.0f32; 3_200];
        frame.extend(tone(6_400));
        frame.extend(vec![0.0f32; 6_400]);

        let active = gate.remove_silence(&frame);
        assert_eq!(active, 3_200..9_600);
    }

    #[test]
    fn hangover_extends_past_the_burst() {
        let mut gate = EnergyGate::new(
            RATE,
            EnergyGateConfig {
                hangover_ms: 100,
                ..EnergyGateConfig::default()
            },
        );

        // 400ms speech then 400ms silence; the range should reach ~100ms past the burst.
        let mut frame = tone(6_400);
        frame.extend(vec![0.0f32; 6_400]);

        let active = gate.remove_silence(&frame);
        assert_eq!(active.start, 0);
        assert!(active.end > 6_400);
        assert!(active.end <= 6_400 + 3_200);
    }

    #[test]
    fn hangover_state_carries_across_frames() {
        let mut gate = EnergyGate::new(
            RATE,
            EnergyGateConfig {
                hangover_ms: 100,
                ..EnergyGateConfig::default()
            },
        );

        assert!(!gate.remove_silence(&tone(3_200)).is_empty());
        // Next frame is pure silence but starts inside the hangover window.
        let active = gate.remove_silence(&vec![0.0f32; 3_200]);
        assert_eq!(active.start, 0);
        assert!(!active.is_empty());

        gate.reset();
        assert!(gate.remove_silence(&vec![0.0f32; 3_200]).is_empty());
    }

    #[test]
    fn noise_floor_raises_the_cutoff() {
        let quiet_hum: Vec<f32> = (0..16_000)
            .map(|i| if i % 2 == 0 { 0.005 } else { -0.005 })
            .collect();
        let murmur: Vec<f32> = (0..16_000)
            .map(|i| if i % 2 == 0 { 0.012 } else { -0.012 })
            .collect();

        // A fresh gate calls the murmur speech: it clears the absolute threshold.
        let mut fresh = no_hangover();
        assert!(!fresh.remove_silence(&murmur).is_empty());

        // After adapting to sustained room tone, the floor-derived cutoff exceeds the
        // absolute threshold and the same murmur reads as silence.
        let mut adapted = no_hangover();
        for _ in 0..20 {
            adapted.remove_silence(&quiet_hum);
        }
        assert!(adapted.remove_silence(&murmur).is_empty());
    }
}
