//! Callback surface exposed to the surrounding application.

use crate::engine::{EngineState, FlushKind, SpeechDetectionStatus};

type StateFn = Box<dyn FnMut(EngineState) + Send>;
type StatusFn = Box<dyn FnMut(SpeechDetectionStatus) + Send>;
type TextFn = Box<dyn FnMut(&str) + Send>;
type TimeoutFn = Box<dyn FnMut() + Send>;
type FlushFn = Box<dyn FnMut(FlushKind) + Send>;

/// Optional hooks invoked by the session engines.
///
/// All hooks run on the session worker thread, so they should return quickly.
/// Unset hooks are no-ops.
#[derive(Default)]
pub struct Callbacks {
    state_changed: Option<StateFn>,
    speech_detection_status_changed: Option<StatusFn>,
    intermediate_text_changed: Option<TextFn>,
    sentence_timeout: Option<TimeoutFn>,
    flush: Option<FlushFn>,
}

impl Callbacks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fires whenever the engine moves between idle and decoding.
    pub fn on_state_changed(mut self, f: impl FnMut(EngineState) + Send + 'static) -> Self {
        self.state_changed = Some(Box::new(f));
        self
    }

    /// Fires when the policy-gated speech detection status changes.
    pub fn on_speech_detection_status_changed(
        mut self,
        f: impl FnMut(SpeechDetectionStatus) + Send + 'static,
    ) -> Self {
        self.speech_detection_status_changed = Some(Box::new(f));
        self
    }

    /// Fires only when the decoded text differs from the last reported value.
    pub fn on_intermediate_text_changed(mut self, f: impl FnMut(&str) + Send + 'static) -> Self {
        self.intermediate_text_changed = Some(Box::new(f));
        self
    }

    /// Single-sentence mode only: no speech arrived within the configured window.
    pub fn on_sentence_timeout(mut self, f: impl FnMut() + Send + 'static) -> Self {
        self.sentence_timeout = Some(Box::new(f));
        self
    }

    /// Marks a segmentation boundary for downstream consumers.
    pub fn on_flush(mut self, f: impl FnMut(FlushKind) + Send + 'static) -> Self {
        self.flush = Some(Box::new(f));
        self
    }

    pub(crate) fn emit_state_changed(&mut self, state: EngineState) {
        if let Some(f) = &mut self.state_changed {
            f(state);
        }
    }

    pub(crate) fn emit_speech_detection_status_changed(&mut self, status: SpeechDetectionStatus) {
        if let Some(f) = &mut self.speech_detection_status_changed {
            f(status);
        }
    }

    pub(crate) fn emit_intermediate_text_changed(&mut self, text: &str) {
        if let Some(f) = &mut self.intermediate_text_changed {
            f(text);
        }
    }

    pub(crate) fn emit_sentence_timeout(&mut self) {
        if let Some(f) = &mut self.sentence_timeout {
            f();
        }
    }

    pub(crate) fn emit_flush(&mut self, kind: FlushKind) {
        if let Some(f) = &mut self.flush {
            f(kind);
        }
    }
}
