//! Subtitle segment assembly from backend decode output.

use serde::Serialize;

use crate::timeline::SegmentTimeline;
use crate::token::Token;

/// A timestamped span of transcribed text used for subtitle generation.
///
/// Within a session, segments are emitted in strictly increasing `start_ms` order and
/// are non-overlapping once finalized.
#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct Segment {
    /// 1-based subtitle index, monotonically increasing across the session.
    pub index: usize,
    pub start_ms: u64,
    pub end_ms: u64,
    pub text: String,
}

/// Converts backend output (token timings or flat text) into ordered segments.
///
/// Token times arrive relative to the backend stream; the current
/// [`SegmentTimeline`] offset is added so segments line up with the original input.
#[derive(Debug, Clone)]
pub struct SegmentBuilder {
    max_segment_ms: u64,
}

impl SegmentBuilder {
    pub fn new(max_segment_ms: u64) -> Self {
        Self { max_segment_ms }
    }

    /// Walks a token list and emits segments, closing at a word boundary once a
    /// segment's span exceeds the maximum, or when the token stream ends.
    ///
    /// Returns the concatenated plain text alongside the segments; the plain text is
    /// what punctuation restoration runs over.
    pub fn from_tokens(
        &self,
        tokens: &[Token],
        timeline: &mut SegmentTimeline,
    ) -> (String, Vec<Segment>) {
        let mut full_text = String::new();
        let mut segments = Vec::new();

        let mut seg_start: Option<u64> = None;
        let mut seg_end = 0u64;
        let mut seg_text = String::new();

        for token in tokens {
            full_text.push_str(&token.text);
            let at = token.start_ms + timeline.offset_ms();

            // A token beginning a new word may close the current segment.
            if let Some(start) = seg_start {
                if token.starts_word() && at.saturating_sub(start) > self.max_segment_ms {
                    let text = seg_text.trim_end().to_owned();
                    seg_text.clear();
                    segments.push(Segment {
                        index: timeline.next_segment_index(),
                        start_ms: start,
                        end_ms: at,
                        text,
                    });
                    seg_start = None;
                }
            }

            if seg_text.is_empty() {
                seg_text.push_str(token.text.trim_start());
            } else {
                seg_text.push_str(&token.text);
            }
            if seg_start.is_none() && !seg_text.is_empty() {
                seg_start = Some(at);
            }
            seg_end = at;
        }

        if let Some(start) = seg_start {
            let text = seg_text.trim().to_owned();
            if !text.is_empty() {
                segments.push(Segment {
                    index: timeline.next_segment_index(),
                    start_ms: start,
                    end_ms: seg_end,
                    text,
                });
            }
        }

        (full_text, segments)
    }

    /// Fallback for backends without token metadata: exactly one segment per decode
    /// call, bracketing the decoded span at the current offset.
    pub fn from_flat_text(
        &self,
        text: &str,
        span_ms: u64,
        timeline: &mut SegmentTimeline,
    ) -> Vec<Segment> {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return Vec::new();
        }

        let start_ms = timeline.offset_ms();
        vec![Segment {
            index: timeline.next_segment_index(),
            start_ms,
            end_ms: start_ms + span_ms,
            text: trimmed.to_owned(),
        }]
    }
}
