//! The pluggable acoustic decode backend contract.
//!
//! The crate never performs neural decoding itself; engines drive an external
//! backend through these traits. Whether a backend can be queried for intermediate
//! text is a factory-time choice between trait shapes, not a runtime branch in the
//! per-frame hot path: [`crate::engine::IncrementalEngine`] requires a stream
//! implementing [`IncrementalDecodeStream`], while [`crate::engine::BatchEngine`]
//! only ever opens a stream for a single feed/finish round trip.

use crate::Result;
use crate::token::Token;

/// Output of a finalized decode call.
#[derive(Debug, Clone, Default)]
pub struct DecodeOutput {
    /// The decoded text.
    pub text: String,
    /// Token-level timing metadata; `None` when the backend does not support it or
    /// it was not requested.
    pub tokens: Option<Vec<Token>>,
}

/// Pluggable decode backend used by the session engines.
pub trait DecodeBackend {
    /// Decode state for one stream of fed audio.
    type Stream: DecodeStream;

    /// Opens a fresh decode stream.
    ///
    /// Fails with [`crate::Error::BackendUnavailable`] when the model or its runtime
    /// cannot be brought up; that is fatal for the session.
    fn create_stream(&mut self) -> Result<Self::Stream>;

    /// Whether [`DecodeStream::finish`] can return token-level timing metadata.
    fn supports_token_metadata(&self) -> bool {
        false
    }
}

/// One decode stream: feed samples, then finalize exactly once.
///
/// Dropping a stream without finishing it must release its backend resources;
/// the engines rely on this for teardown on cancellation and decode failure.
pub trait DecodeStream {
    /// Appends mono samples at the session sample rate.
    fn feed(&mut self, samples: &[f32]) -> Result<()>;

    /// Finalizes the stream and returns its decoded output, releasing backend
    /// resources. Consumes the stream, so a finished handle cannot be reused.
    fn finish(self, want_metadata: bool) -> Result<DecodeOutput>;
}

/// Streams that can be queried repeatedly for intermediate text while open.
pub trait IncrementalDecodeStream: DecodeStream {
    /// Decodes everything fed so far without finalizing the stream.
    fn intermediate_decode(&mut self) -> Result<String>;
}
