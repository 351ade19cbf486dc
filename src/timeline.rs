//! Timestamp bookkeeping across decode calls.
//!
//! Backend timestamps are relative to what the backend was fed; silence that never
//! reaches the backend (and, for batch decodes, audio already consumed by earlier
//! calls) must be folded into a running offset so emitted segments stay aligned with
//! the original stream. Invariant: the sum of all folded intervals equals total
//! elapsed input time.

/// Cumulative reported time, pending discarded-silence time and the running
/// subtitle index. Reset only on start-of-stream.
#[derive(Debug, Default, Clone)]
pub struct SegmentTimeline {
    offset_ms: u64,
    discarded_before_ms: u64,
    discarded_after_ms: u64,
    segment_index: usize,
}

impl SegmentTimeline {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Records silence observed while no speech was pending.
    pub fn add_discarded_before(&mut self, ms: u64) {
        self.discarded_before_ms += ms;
    }

    /// Records silence observed after speech started pending.
    pub fn add_discarded_after(&mut self, ms: u64) {
        self.discarded_after_ms += ms;
    }

    /// Folds leading silence into the offset. Called right before a decode so the
    /// decode's timestamps land after the gap.
    pub fn fold_discarded_before(&mut self) {
        self.offset_ms += self.discarded_before_ms;
        self.discarded_before_ms = 0;
    }

    /// Folds trailing silence into the offset. Called right after a decode.
    pub fn fold_discarded_after(&mut self) {
        self.offset_ms += self.discarded_after_ms;
        self.discarded_after_ms = 0;
    }

    /// Folds a decoded span into the offset. Only batch decodes need this: their
    /// timestamps restart at zero on every call, while an incremental stream reports
    /// cumulative times until it is finalized.
    pub fn fold_decoded_span(&mut self, span_ms: u64) {
        self.offset_ms += span_ms;
    }

    pub fn offset_ms(&self) -> u64 {
        self.offset_ms
    }

    /// Advances and returns the next 1-based subtitle index.
    pub fn next_segment_index(&mut self) -> usize {
        self.segment_index += 1;
        self.segment_index
    }

    pub fn segment_index(&self) -> usize {
        self.segment_index
    }
}
