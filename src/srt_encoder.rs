use anyhow::Result;
use std::io::Write;

use crate::segment_encoder::SegmentEncoder;
use crate::segments::Segment;

/// A `SegmentEncoder` that writes segments in SubRip (SRT) format.
///
/// We stream output directly to a `Write` implementation so streaming consumers
/// (stdout, pipes, sockets) see cues as soon as they are finalized.
pub struct SrtEncoder<W: Write> {
    /// The underlying writer we stream SRT into.
    w: W,

    /// Whether the encoder has been closed.
    closed: bool,
}

impl<W: Write> SrtEncoder<W> {
    /// Create a new SRT encoder that writes to the provided writer.
    pub fn new(w: W) -> Self {
        Self { w, closed: false }
    }
}

impl<W: Write> SegmentEncoder for SrtEncoder<W> {
    /// Write a single cue in SubRip format.
    fn write_segment(&mut self, seg: &Segment) -> Result<()> {
        if self.closed {
            anyhow::bail!("cannot write segment: encoder is already closed");
        }

        // SubRip cues are: index line, timing line, text, blank separator line.
        writeln!(&mut self.w, "{}", seg.index)?;
        writeln!(
            &mut self.w,
            "{} --> {}",
            format_timestamp_srt(seg.start_ms),
            format_timestamp_srt(seg.end_ms)
        )?;
        writeln!(&mut self.w, "{}", seg.text)?;
        writeln!(&mut self.w)?;

        self.w.flush()?;

        Ok(())
    }

    /// Flush the underlying writer. This is idempotent.
    fn close(&mut self) -> Result<()> {
        if self.closed {
            return Ok(());
        }

        self.w.flush()?;
        self.closed = true;

        Ok(())
    }
}

/// Render segments as a complete SubRip document in memory.
///
/// Used by the timed-output engines, which report subtitle text through the
/// intermediate-text callback rather than writing to an output stream directly.
pub fn segments_to_srt(segments: &[Segment]) -> String {
    use std::fmt::Write as _;

    let mut out = String::new();
    for seg in segments {
        // Writing into a String cannot fail.
        let _ = writeln!(out, "{}", seg.index);
        let _ = writeln!(
            out,
            "{} --> {}",
            format_timestamp_srt(seg.start_ms),
            format_timestamp_srt(seg.end_ms)
        );
        let _ = writeln!(out, "{}", seg.text);
        let _ = writeln!(out);
    }
    out
}

/// Format milliseconds into a SubRip timestamp (`HH:MM:SS,mmm`).
fn format_timestamp_srt(total_ms: u64) -> String {
    let ms = total_ms % 1000;
    let total_s = total_ms / 1000;

    let s = total_s % 60;
    let total_m = total_s / 60;

    let m = total_m % 60;
    let h = total_m / 60;

    format!("{h:02}:{m:02}:{s:02},{ms:03}")
}
