//! Decode policy for batch-only backends.
//!
//! Speech accumulates until a segmentation boundary (accumulator overflow,
//! end-of-input, or a no-activity frame while the mode closes segments), then the
//! backend performs exactly one feed/finish round trip and the accumulator is
//! cleared. The backend is never asked for intermediate text, and because each
//! call's timestamps restart at zero, the timeline folds the decoded span as well
//! as discarded silence.

use std::sync::Arc;
use std::sync::atomic::AtomicBool;

use tracing::{debug, error};

use crate::Result;
use crate::backend::{DecodeBackend, DecodeStream};
use crate::callbacks::Callbacks;
use crate::engine::{
    Commit, EngineState, FlushKind, ProcessOutcome, SessionCore, SpeechEngine, merge_texts,
};
use crate::opts::{Opts, SpeechMode};
use crate::output_shape::OutputShape;
use crate::punctuate::Punctuator;
use crate::reflow;
use crate::sample_buffer::SampleBuffer;
use crate::srt_encoder::segments_to_srt;
use crate::vad::VoiceActivityGate;

/// Streaming decode orchestrator for backends without intermediate decoding.
pub struct BatchEngine<B: DecodeBackend> {
    core: SessionCore,
    backend: B,
}

impl<B: DecodeBackend> BatchEngine<B> {
    pub fn new(
        backend: B,
        opts: Opts,
        callbacks: Callbacks,
        buffer: Arc<SampleBuffer>,
        exit: Arc<AtomicBool>,
    ) -> Self {
        let gate = VoiceActivityGate::with_defaults(opts.sample_rate);
        Self {
            core: SessionCore::new(opts, callbacks, gate, buffer, exit),
            backend,
        }
    }

    /// Replaces the built-in denoise/silence filters.
    pub fn with_gate(mut self, gate: VoiceActivityGate) -> Self {
        self.core.set_gate(gate);
        self
    }

    /// Attaches a punctuation restoration collaborator.
    pub fn with_punctuator(mut self, punctuator: Box<dyn Punctuator>) -> Self {
        self.core.set_punctuator(punctuator);
        self
    }

    /// Whether the pending speech has reached a segmentation boundary.
    fn should_decode(&self, vad_active: bool, eof: bool) -> bool {
        if self.core.accumulator().overflowed() {
            debug!("pending speech reached max size");
            return true;
        }
        if self.core.accumulator().is_empty() {
            return false;
        }
        if eof {
            return true;
        }
        match self.core.opts().speech_mode {
            // Only an explicit stop closes the segment.
            SpeechMode::Manual => false,
            SpeechMode::Automatic | SpeechMode::SingleSentence => !vad_active,
        }
    }

    fn decode(&mut self, span_ms: u64) -> Result<Commit> {
        debug!(
            samples = self.core.accumulator().len(),
            "speech decoding started"
        );

        let mut stream = self.backend.create_stream()?;
        stream.feed(self.core.accumulator().samples())?;

        let want_metadata = self.core.opts().output_shape == OutputShape::Timed
            && self.backend.supports_token_metadata();
        let output = stream.finish(want_metadata)?;

        let addition = if self.core.opts().output_shape == OutputShape::Timed {
            let mut segments = match &output.tokens {
                Some(tokens) if !tokens.is_empty() => {
                    let (plain, mut segments) =
                        self.core.builder.from_tokens(tokens, &mut self.core.timeline);
                    if self.core.has_punctuator() {
                        let restored = self.core.punctuate(plain);
                        reflow::restore_punctuation(&restored, &mut segments);
                    }
                    segments
                }
                _ => self.core.builder.from_flat_text(
                    &output.text,
                    span_ms,
                    &mut self.core.timeline,
                ),
            };
            reflow::break_segments_to_multiline(self.core.opts().subtitle, &mut segments);

            debug!(segments = segments.len(), "speech decoded");
            segments_to_srt(&segments)
        } else {
            debug!("speech decoded");
            self.core.punctuate(output.text)
        };

        if self.core.exit_requested() {
            return Ok(Commit::Cancelled);
        }

        let merged = merge_texts(self.core.intermediate_text(), &addition);
        self.core.set_intermediate_text(merged);
        Ok(Commit::Committed)
    }
}

impl<B: DecodeBackend> SpeechEngine for BatchEngine<B> {
    fn process(&mut self) -> Result<ProcessOutcome> {
        let Some(mut frame) = self.core.buffer().try_acquire() else {
            return Ok(ProcessOutcome::WaitForSamples);
        };
        let sof = frame.start_of_stream;
        let eof = frame.end_of_stream;

        debug!(
            sof,
            eof,
            in_samples = frame.samples.len(),
            pending = self.core.accumulator().len(),
            "processing frame"
        );

        if sof {
            self.core.begin_session();
        }

        let vad_active = self.core.gate_frame(&mut frame);
        drop(frame);
        self.core.buffer().release();

        if self.core.exit_requested() {
            return Ok(ProcessOutcome::SessionEnded);
        }

        if !self.should_decode(vad_active, eof) {
            if eof {
                self.core.flush(FlushKind::Eof);
                return Ok(ProcessOutcome::SessionEnded);
            }
            return Ok(ProcessOutcome::WaitForSamples);
        }

        self.core.set_state(EngineState::Decoding);
        self.core.timeline_mut().fold_discarded_before();
        let span_ms = self
            .core
            .accumulator()
            .duration_ms(self.core.opts().sample_rate);

        let decoded = self.decode(span_ms);

        self.core.timeline_mut().fold_decoded_span(span_ms);
        self.core.timeline_mut().fold_discarded_after();
        self.core.set_state(EngineState::Idle);
        self.core.clear_accumulator();

        match decoded {
            Ok(Commit::Committed) => {}
            Ok(Commit::Cancelled) => return Ok(ProcessOutcome::SessionEnded),
            Err(err) if err.is_recoverable() => {
                error!(error = %err, "decode failed; discarding pending speech");
            }
            Err(err) => return Err(err),
        }

        if self.core.opts().speech_mode == SpeechMode::SingleSentence
            && !self.core.intermediate_text_pending()
        {
            debug!("no speech decoded, forcing sentence timeout");
            self.core.force_sentence_timeout();
        }

        let kind = if eof || self.core.opts().speech_mode == SpeechMode::SingleSentence {
            FlushKind::Eof
        } else {
            FlushKind::Regular
        };
        self.core.flush(kind);

        if kind == FlushKind::Eof {
            return Ok(ProcessOutcome::SessionEnded);
        }
        Ok(ProcessOutcome::WaitForSamples)
    }
}
