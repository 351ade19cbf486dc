//! Decode policy for incremental-capable backends.
//!
//! The backend stream stays open across frames and is queried for intermediate
//! text whenever new speech arrives; its timestamps are cumulative, so the
//! timeline only folds discarded silence. The stream is finalized at end-of-input,
//! or earlier when a completed-utterance boundary is detected (non-manual mode,
//! pending intermediate text, voice activity just turned negative), so one
//! utterance can be finalized early while the session keeps listening.

use std::sync::Arc;
use std::sync::atomic::AtomicBool;

use tracing::{debug, error};

use crate::Result;
use crate::backend::{DecodeBackend, DecodeStream, IncrementalDecodeStream};
use crate::callbacks::Callbacks;
use crate::engine::{Commit, EngineState, FlushKind, ProcessOutcome, SessionCore, SpeechEngine};
use crate::opts::{Opts, SpeechMode};
use crate::output_shape::OutputShape;
use crate::punctuate::Punctuator;
use crate::reflow;
use crate::sample_buffer::SampleBuffer;
use crate::srt_encoder::segments_to_srt;
use crate::vad::VoiceActivityGate;

/// Streaming decode orchestrator for backends that support intermediate decoding.
pub struct IncrementalEngine<B>
where
    B: DecodeBackend,
    B::Stream: IncrementalDecodeStream,
{
    core: SessionCore,
    backend: B,
    stream: Option<B::Stream>,
    fed_samples: usize,
}

impl<B> IncrementalEngine<B>
where
    B: DecodeBackend,
    B::Stream: IncrementalDecodeStream,
{
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
            stream: None,
            fed_samples: 0,
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

    fn decode(&mut self, finalize: bool) -> Result<Commit> {
        let mut stream = match self.stream.take() {
            Some(stream) => stream,
            None => {
                // After an early finalization the stream is recreated lazily on the
                // next speech; at end-of-input with nothing pending there is nothing
                // left to finalize.
                if finalize && self.core.accumulator().is_empty() {
                    return Ok(Commit::Committed);
                }
                self.fed_samples = 0;
                self.backend.create_stream()?
            }
        };

        debug!(
            samples = self.core.accumulator().len(),
            finalize, "speech decoding started"
        );

        stream.feed(self.core.accumulator().samples())?;
        self.fed_samples += self.core.accumulator().len();

        if finalize && self.core.opts().output_shape == OutputShape::Timed {
            let stream_span_ms =
                (self.fed_samples as u64 * 1000) / u64::from(self.core.opts().sample_rate);
            let want_metadata = self.backend.supports_token_metadata();
            let output = stream.finish(want_metadata)?;
            self.fed_samples = 0;

            let (plain, mut segments) = match &output.tokens {
                Some(tokens) if !tokens.is_empty() => {
                    self.core.builder.from_tokens(tokens, &mut self.core.timeline)
                }
                _ => {
                    let segments = self.core.builder.from_flat_text(
                        &output.text,
                        stream_span_ms,
                        &mut self.core.timeline,
                    );
                    (output.text.clone(), segments)
                }
            };

            if self.core.has_punctuator() {
                let restored = self.core.punctuate(plain);
                reflow::restore_punctuation(&restored, &mut segments);
            }
            reflow::break_segments_to_multiline(self.core.opts().subtitle, &mut segments);

            debug!(segments = segments.len(), "speech decoded");

            if self.core.exit_requested() {
                return Ok(Commit::Cancelled);
            }
            self.core.set_intermediate_text(segments_to_srt(&segments));
        } else {
            let text = if finalize {
                let output = stream.finish(false)?;
                self.fed_samples = 0;
                output.text
            } else {
                let text = stream.intermediate_decode()?;
                self.stream = Some(stream);
                text
            };
            let text = self.core.punctuate(text);

            debug!("speech decoded");

            if self.core.exit_requested() {
                return Ok(Commit::Cancelled);
            }
            self.core.set_intermediate_text(text);
        }

        Ok(Commit::Committed)
    }
}

impl<B> SpeechEngine for IncrementalEngine<B>
where
    B: DecodeBackend,
    B::Stream: IncrementalDecodeStream,
{
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
            self.stream = None;
            self.fed_samples = 0;
            match self.backend.create_stream() {
                Ok(stream) => self.stream = Some(stream),
                Err(err) => {
                    self.core.buffer().release();
                    return Err(err);
                }
            }
        }

        let vad_active = self.core.gate_frame(&mut frame);
        drop(frame);
        self.core.buffer().release();

        if self.core.exit_requested() {
            self.stream = None;
            return Ok(ProcessOutcome::SessionEnded);
        }

        let finalize = eof
            || (self.core.opts().speech_mode != SpeechMode::Manual
                && self.core.intermediate_text_pending()
                && !vad_active);

        if !finalize && self.core.accumulator().is_empty() {
            return Ok(ProcessOutcome::WaitForSamples);
        }

        self.core.set_state(EngineState::Decoding);
        self.core.timeline_mut().fold_discarded_before();

        let decoded = self.decode(finalize);

        self.core.timeline_mut().fold_discarded_after();
        self.core.set_state(EngineState::Idle);
        self.core.clear_accumulator();

        match decoded {
            Ok(Commit::Committed) => {}
            Ok(Commit::Cancelled) => {
                self.stream = None;
                return Ok(ProcessOutcome::SessionEnded);
            }
            Err(err) if err.is_recoverable() => {
                error!(error = %err, "decode failed; discarding pending speech");
                self.stream = None;
            }
            Err(err) => return Err(err),
        }

        if finalize {
            let kind = if !eof && self.core.opts().speech_mode == SpeechMode::Automatic {
                FlushKind::Regular
            } else {
                FlushKind::Eof
            };
            self.core.flush(kind);
            if kind == FlushKind::Eof {
                return Ok(ProcessOutcome::SessionEnded);
            }
        }

        Ok(ProcessOutcome::WaitForSamples)
    }
}
