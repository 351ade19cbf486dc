//! Streaming decode orchestration.
//!
//! Two decode policies share one session shape. [`IncrementalEngine`] keeps a
//! backend stream open across frames and polls it for intermediate text;
//! [`BatchEngine`] accumulates speech and performs exactly one decode per segment
//! boundary. Which one to use is a factory-time choice based on the backend's
//! capabilities, keeping the per-frame path free of capability branches.
//!
//! Everything session-scoped (accumulator, timeline, detection status) is owned by
//! one engine instance; concurrent sessions each get their own engine.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use tracing::debug;

use crate::Result;
use crate::accumulator::SpeechAccumulator;
use crate::callbacks::Callbacks;
use crate::frame::Frame;
use crate::opts::{Opts, SpeechMode};
use crate::output_shape::OutputShape;
use crate::punctuate::Punctuator;
use crate::sample_buffer::SampleBuffer;
use crate::segments::SegmentBuilder;
use crate::timeline::SegmentTimeline;
use crate::vad::VoiceActivityGate;

mod batch;
mod incremental;

pub use batch::BatchEngine;
pub use incremental::IncrementalEngine;

/// Engine activity, as reported through [`Callbacks::on_state_changed`].
///
/// `Decoding` holds only while a backend call is in flight.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineState {
    Idle,
    Decoding,
}

/// Policy-gated speech detection status driving user-visible callbacks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SpeechDetectionStatus {
    #[default]
    Unknown,
    SpeechDetected,
    NoSpeech,
}

/// The kind of segmentation boundary a flush marks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlushKind {
    /// An utterance completed; the session keeps listening.
    Regular,
    /// End of input (or of a single-sentence session); no more output follows.
    Eof,
}

/// What the worker loop should do after one `process` call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcessOutcome {
    /// Nothing more to do until the capture side hands over another frame.
    WaitForSamples,
    /// The session is over: eof was flushed, the single sentence completed, or
    /// cancellation was observed.
    SessionEnded,
}

/// A streaming decode policy driven by [`crate::worker::SessionWorker`].
pub trait SpeechEngine {
    /// Runs one iteration of the session state machine: acquire a frame, gate it,
    /// maybe decode, maybe flush.
    fn process(&mut self) -> Result<ProcessOutcome>;
}

/// Whether a decode result was committed or suppressed by cancellation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Commit {
    Committed,
    Cancelled,
}

/// Session-scoped state and per-frame behavior shared by both engines.
pub(crate) struct SessionCore {
    opts: Opts,
    callbacks: Callbacks,
    buffer: Arc<SampleBuffer>,
    exit: Arc<AtomicBool>,
    gate: VoiceActivityGate,
    accumulator: SpeechAccumulator,
    timeline: SegmentTimeline,
    builder: SegmentBuilder,
    punctuator: Option<Box<dyn Punctuator>>,
    state: EngineState,
    detection_status: SpeechDetectionStatus,
    intermediate_text: Option<String>,
    silent_for_ms: u64,
    sentence_timeout_fired: bool,
}

impl SessionCore {
    pub(crate) fn new(
        opts: Opts,
        callbacks: Callbacks,
        gate: VoiceActivityGate,
        buffer: Arc<SampleBuffer>,
        exit: Arc<AtomicBool>,
    ) -> Self {
        let accumulator = SpeechAccumulator::new(opts.max_segment_samples());
        let builder = SegmentBuilder::new(opts.max_segment_ms);
        Self {
            opts,
            callbacks,
            buffer,
            exit,
            gate,
            accumulator,
            timeline: SegmentTimeline::new(),
            builder,
            punctuator: None,
            state: EngineState::Idle,
            detection_status: SpeechDetectionStatus::Unknown,
            intermediate_text: None,
            silent_for_ms: 0,
            sentence_timeout_fired: false,
        }
    }

    pub(crate) fn opts(&self) -> &Opts {
        &self.opts
    }

    pub(crate) fn buffer(&self) -> &Arc<SampleBuffer> {
        &self.buffer
    }

    pub(crate) fn accumulator(&self) -> &SpeechAccumulator {
        &self.accumulator
    }

    pub(crate) fn set_gate(&mut self, gate: VoiceActivityGate) {
        self.gate = gate;
    }

    pub(crate) fn set_punctuator(&mut self, punctuator: Box<dyn Punctuator>) {
        self.punctuator = Some(punctuator);
    }

    /// Resets all session-scoped state. Called on start-of-stream.
    pub(crate) fn begin_session(&mut self) {
        self.accumulator.clear();
        self.timeline.reset();
        self.gate.reset();
        self.detection_status = SpeechDetectionStatus::Unknown;
        self.intermediate_text = None;
        self.silent_for_ms = 0;
        self.sentence_timeout_fired = false;
    }

    /// Denoises and VAD-gates one frame, applying the accumulation policy,
    /// discarded-time bookkeeping, detection-status callbacks and the sentence
    /// timer. Returns whether the frame carried voice activity.
    pub(crate) fn gate_frame(&mut self, frame: &mut Frame) -> bool {
        self.gate.denoise(&mut frame.samples);
        let active = self.gate.remove_silence(&frame.samples);
        let frame_ms = frame.duration_ms(self.opts.sample_rate);
        let vad_active = !active.is_empty();

        if vad_active {
            debug!("vad: speech detected");

            if self.vad_drives_status() {
                self.set_detection_status(SpeechDetectionStatus::SpeechDetected);
            }

            match self.opts.output_shape {
                // Silence is truly discarded: only the active subrange counts.
                OutputShape::Plain => self.accumulator.append(&frame.samples[active]),
                // Keep the full frame so inter-word pauses stay aligned with
                // backend-reported timings.
                OutputShape::Timed => self.accumulator.append(&frame.samples),
            }

            self.silent_for_ms = 0;
            self.sentence_timeout_fired = false;
        } else {
            debug!("vad: no speech");

            if self.opts.speech_mode == SpeechMode::SingleSentence {
                self.silent_for_ms += frame_ms;
                self.maybe_fire_sentence_timeout();
            }

            if self.vad_drives_status() {
                self.set_detection_status(SpeechDetectionStatus::NoSpeech);
            }

            if self.accumulator.is_empty() {
                self.timeline.add_discarded_before(frame_ms);
            } else {
                self.timeline.add_discarded_after(frame_ms);
            }
        }

        vad_active
    }

    fn vad_drives_status(&self) -> bool {
        matches!(
            self.opts.speech_mode,
            SpeechMode::Automatic | SpeechMode::SingleSentence
        )
    }

    fn maybe_fire_sentence_timeout(&mut self) {
        if self.sentence_timeout_fired {
            return;
        }
        if self.intermediate_text_pending() || !self.accumulator.is_empty() {
            return;
        }
        if self.silent_for_ms >= self.opts.sentence_timeout_ms {
            debug!("sentence timeout");
            self.callbacks.emit_sentence_timeout();
            self.sentence_timeout_fired = true;
        }
    }

    /// Fires the sentence timeout unconditionally (single-sentence mode after a
    /// decode produced no text).
    pub(crate) fn force_sentence_timeout(&mut self) {
        self.callbacks.emit_sentence_timeout();
        self.sentence_timeout_fired = true;
    }

    pub(crate) fn set_state(&mut self, state: EngineState) {
        if self.state != state {
            self.state = state;
            self.callbacks.emit_state_changed(state);
        }
    }

    fn set_detection_status(&mut self, status: SpeechDetectionStatus) {
        if self.detection_status != status {
            self.detection_status = status;
            self.callbacks.emit_speech_detection_status_changed(status);
        }
    }

    /// Reports new decoded text, firing the callback only when it differs from the
    /// last reported value.
    pub(crate) fn set_intermediate_text(&mut self, text: String) {
        if self.intermediate_text.as_deref() != Some(text.as_str()) {
            self.callbacks.emit_intermediate_text_changed(&text);
            self.intermediate_text = Some(text);
        }
    }

    pub(crate) fn intermediate_text(&self) -> Option<&str> {
        self.intermediate_text.as_deref()
    }

    pub(crate) fn intermediate_text_pending(&self) -> bool {
        self.intermediate_text.as_deref().is_some_and(|t| !t.is_empty())
    }

    /// Emits a flush, committing the intermediate text: downstream consumers take
    /// it at the boundary, and the next utterance starts clean.
    pub(crate) fn flush(&mut self, kind: FlushKind) {
        debug!(?kind, "flush");
        self.intermediate_text = None;
        self.callbacks.emit_flush(kind);
    }

    pub(crate) fn timeline_mut(&mut self) -> &mut SegmentTimeline {
        &mut self.timeline
    }

    pub(crate) fn clear_accumulator(&mut self) {
        self.accumulator.clear();
    }

    pub(crate) fn exit_requested(&self) -> bool {
        self.exit.load(Ordering::SeqCst)
    }

    pub(crate) fn has_punctuator(&self) -> bool {
        self.punctuator.is_some()
    }

    pub(crate) fn punctuate(&mut self, text: String) -> String {
        match &mut self.punctuator {
            Some(punctuator) => punctuator.restore(&text),
            None => text,
        }
    }
}

/// Joins newly decoded text onto any uncommitted intermediate text.
pub(crate) fn merge_texts(current: Option<&str>, addition: &str) -> String {
    match current {
        Some(cur) if !cur.trim().is_empty() => {
            if addition.trim().is_empty() {
                cur.to_owned()
            } else {
                format!("{} {}", cur.trim_end(), addition.trim_start())
            }
        }
        _ => addition.to_owned(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vad::{NoOpDenoiser, SilenceFilter};
    use std::ops::Range;

    /// Returns preset active ranges, one per call.
    struct ScriptedFilter {
        ranges: std::vec::IntoIter<Range<usize>>,
    }

    impl ScriptedFilter {
        fn new(ranges: Vec<Range<usize>>) -> Self {
            Self {
                ranges: ranges.into_iter(),
            }
        }
    }

    impl SilenceFilter for ScriptedFilter {
        fn remove_silence(&mut self, _samples: &[f32]) -> Range<usize> {
            self.ranges.next().unwrap_or(0..0)
        }

        fn reset(&mut self) {}
    }

    fn core_with(opts: Opts, ranges: Vec<Range<usize>>) -> SessionCore {
        let gate = VoiceActivityGate::new(
            Box::new(NoOpDenoiser),
            Box::new(ScriptedFilter::new(ranges)),
        );
        SessionCore::new(
            opts,
            Callbacks::new(),
            gate,
            Arc::new(SampleBuffer::new()),
            Arc::new(AtomicBool::new(false)),
        )
    }

    #[test]
    fn plain_output_accumulates_only_the_active_subrange() {
        let opts = Opts {
            output_shape: OutputShape::Plain,
            ..Opts::default()
        };
        let mut core = core_with(opts, vec![4_000..12_000]);

        let mut frame = Frame::new(vec![0.1; 16_000]);
        assert!(core.gate_frame(&mut frame));
        assert_eq!(core.accumulator().len(), 8_000);
    }

    #[test]
    fn timed_output_accumulates_the_full_frame() {
        let opts = Opts {
            output_shape: OutputShape::Timed,
            ..Opts::default()
        };
        let mut core = core_with(opts, vec![4_000..12_000]);

        let mut frame = Frame::new(vec![0.1; 16_000]);
        assert!(core.gate_frame(&mut frame));
        assert_eq!(core.accumulator().len(), 16_000);
    }

    #[test]
    fn silent_frames_route_to_before_or_after_by_pending_speech() {
        let mut core = core_with(Opts::default(), vec![0..0, 0..16_000, 0..0]);

        // Nothing pending yet: leading silence.
        let mut silence = Frame::new(vec![0.0; 16_000]);
        assert!(!core.gate_frame(&mut silence));

        let mut speech = Frame::new(vec![0.1; 16_000]);
        assert!(core.gate_frame(&mut speech));

        // Speech pending: trailing silence.
        let mut silence = Frame::new(vec![0.0; 16_000]);
        assert!(!core.gate_frame(&mut silence));

        let timeline = core.timeline_mut();
        timeline.fold_discarded_before();
        assert_eq!(timeline.offset_ms(), 1_000);
        timeline.fold_discarded_after();
        assert_eq!(timeline.offset_ms(), 2_000);
    }

    #[test]
    fn intermediate_text_is_reported_only_on_change() {
        use std::sync::Mutex;

        let seen: Arc<Mutex<Vec<String>>> = Arc::default();
        let sink = Arc::clone(&seen);
        let callbacks =
            Callbacks::new().on_intermediate_text_changed(move |text| {
                sink.lock().expect("sink lock").push(text.to_owned());
            });

        let gate = VoiceActivityGate::new(
            Box::new(NoOpDenoiser),
            Box::new(ScriptedFilter::new(Vec::new())),
        );
        let mut core = SessionCore::new(
            Opts::default(),
            callbacks,
            gate,
            Arc::new(SampleBuffer::new()),
            Arc::new(AtomicBool::new(false)),
        );

        core.set_intermediate_text("hello".to_owned());
        core.set_intermediate_text("hello".to_owned());
        core.set_intermediate_text("hello there".to_owned());

        assert_eq!(*seen.lock().expect("sink lock"), vec!["hello", "hello there"]);
    }

    #[test]
    fn merge_texts_joins_with_a_single_space() {
        assert_eq!(merge_texts(None, "next"), "next");
        assert_eq!(merge_texts(Some(""), "next"), "next");
        assert_eq!(merge_texts(Some("prior"), ""), "prior");
        assert_eq!(merge_texts(Some("prior "), " next"), "prior next");
    }
}
