use crate::output_shape::OutputShape;

/// How the session decides where an utterance begins and ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SpeechMode {
    /// The caller controls start/stop via the frame stream flags. VAD is used only for
    /// time accounting, never to drive detection callbacks.
    Manual,

    /// VAD continuously drives detection callbacks; a no-speech frame while speech is
    /// pending closes the current segment.
    #[default]
    Automatic,

    /// As [`SpeechMode::Automatic`], plus a sentence-timeout callback when no speech
    /// arrives in time, and the session ends after the first completed segment.
    SingleSentence,
}

/// Line limits for subtitle wrapping.
#[derive(Debug, Clone, Copy)]
pub struct SubtitleLayout {
    /// Don't break a line before it reaches this many characters.
    pub min_line_length: usize,
    /// Break a line before it exceeds this many characters.
    pub max_line_length: usize,
    /// Cap on lines per segment; overflow merges into the last line. Zero means
    /// unlimited.
    pub max_line_count: usize,
}

impl Default for SubtitleLayout {
    fn default() -> Self {
        Self {
            min_line_length: 0,
            max_line_length: 42,
            max_line_count: 0,
        }
    }
}

/// Options that control how a streaming session is performed.
///
/// This struct represents *library-level configuration*, not CLI flags directly.
/// The embedding application is responsible for mapping user input into this type so that:
/// - the library remains reusable outside of any particular frontend
/// - other frontends (APIs, tests, batch jobs) can construct options programmatically
#[derive(Debug, Clone)]
pub struct Opts {
    /// Utterance boundary policy.
    pub speech_mode: SpeechMode,

    /// Whether to produce plain text or timestamped subtitle segments.
    pub output_shape: OutputShape,

    /// Sample rate of the incoming frames, in Hz.
    pub sample_rate: u32,

    /// Upper bound on pending speech, in milliseconds of audio. Exceeding it forces a
    /// decode regardless of voice-activity state; it also caps a single subtitle
    /// segment's span.
    pub max_segment_ms: u64,

    /// Window in which speech must arrive in single-sentence mode, in milliseconds of
    /// stream time.
    pub sentence_timeout_ms: u64,

    /// Line limits applied when re-wrapping subtitle segment text.
    pub subtitle: SubtitleLayout,
}

impl Default for Opts {
    fn default() -> Self {
        Self {
            speech_mode: SpeechMode::default(),
            output_shape: OutputShape::default(),
            sample_rate: 16_000,
            max_segment_ms: 60_000,
            sentence_timeout_ms: 5_000,
            subtitle: SubtitleLayout::default(),
        }
    }
}

impl Opts {
    /// The pending-speech bound expressed in samples.
    pub fn max_segment_samples(&self) -> usize {
        (u64::from(self.sample_rate) * self.max_segment_ms / 1000) as usize
    }
}
