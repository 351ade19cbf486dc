//! Post-processing of finalized segment text: punctuation reconciliation and
//! subtitle line wrapping.

use crate::opts::SubtitleLayout;
use crate::segments::Segment;

/// Re-applies restored punctuation onto per-segment text.
///
/// `restored` is the output of a punctuation model run over the segments'
/// concatenated plain text: the same whitespace-separated words, with punctuation
/// and casing attached. Words are matched greedily, segment by segment; if the word
/// counts ever disagree, the remaining segments are left untouched rather than
/// shifted onto the wrong words.
pub fn restore_punctuation(restored: &str, segments: &mut [Segment]) {
    let mut words = restored.split_whitespace();

    for segment in segments.iter_mut() {
        let count = segment.text.split_whitespace().count();
        if count == 0 {
            continue;
        }

        let replacement: Vec<&str> = words.by_ref().take(count).collect();
        if replacement.len() != count {
            return;
        }
        segment.text = replacement.join(" ");
    }
}

/// Re-wraps every segment's text to the configured column limits.
pub fn break_segments_to_multiline(layout: SubtitleLayout, segments: &mut [Segment]) {
    for segment in segments.iter_mut() {
        break_to_multiline(layout, segment);
    }
}

/// Greedy word-fill wrap. A line breaks before exceeding `max_line_length`, but
/// never before reaching `min_line_length`; a single word longer than the maximum
/// stays unsplit on its own line.
pub fn break_to_multiline(layout: SubtitleLayout, segment: &mut Segment) {
    if layout.max_line_length == 0 {
        return;
    }

    let mut lines: Vec<String> = Vec::new();
    let mut line = String::new();

    for word in segment.text.split_whitespace() {
        if line.is_empty() {
            line.push_str(word);
            continue;
        }

        let would_be = line.chars().count() + 1 + word.chars().count();
        if would_be > layout.max_line_length && line.chars().count() >= layout.min_line_length {
            lines.push(std::mem::take(&mut line));
            line.push_str(word);
        } else {
            line.push(' ');
            line.push_str(word);
        }
    }

    if !line.is_empty() {
        lines.push(line);
    }

    if layout.max_line_count > 0 && lines.len() > layout.max_line_count {
        let overflow = lines.split_off(layout.max_line_count);
        if let Some(last) = lines.last_mut() {
            for extra in overflow {
                last.push(' ');
                last.push_str(&extra);
            }
        }
    }

    segment.text = lines.join("\n");
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seg(text: &str) -> Segment {
        Segment {
            index: 1,
            start_ms: 0,
            end_ms: 1_000,
            text: text.to_owned(),
        }
    }

    #[test]
    fn punctuation_is_restored_word_by_word() {
        let mut segments = vec![seg("hello there general"), seg("kenobi you are bold")];
        restore_punctuation(
            "Hello there, General Kenobi. You are bold!",
            &mut segments,
        );
        assert_eq!(segments[0].text, "Hello there, General");
        assert_eq!(segments[1].text, "Kenobi. You are bold!");
    }

    #[test]
    fn word_count_mismatch_leaves_segments_untouched() {
        let mut segments = vec![seg("one two"), seg("three four")];
        restore_punctuation("One, two.", &mut segments);
        assert_eq!(segments[0].text, "One, two.");
        // Restored text ran out; the second segment keeps its raw words.
        assert_eq!(segments[1].text, "three four");
    }

    #[test]
    fn wrap_breaks_before_exceeding_the_maximum() {
        let layout = SubtitleLayout {
            min_line_length: 0,
            max_line_length: 12,
            max_line_count: 0,
        };
        let mut segment = seg("the quick brown fox jumps");
        break_to_multiline(layout, &mut segment);
        assert_eq!(segment.text, "the quick\nbrown fox\njumps");
        assert!(segment.text.lines().all(|l| l.chars().count() <= 12));
    }

    #[test]
    fn wrap_respects_the_minimum_line_length() {
        let layout = SubtitleLayout {
            min_line_length: 10,
            max_line_length: 12,
            max_line_count: 0,
        };
        let mut segment = seg("a b extraordinarily c");
        break_to_multiline(layout, &mut segment);
        // "a b" is under the minimum, so the long word joins it instead of breaking.
        assert_eq!(segment.text, "a b extraordinarily\nc");
    }

    #[test]
    fn oversized_word_stays_on_its_own_line() {
        let layout = SubtitleLayout {
            min_line_length: 0,
            max_line_length: 5,
            max_line_count: 0,
        };
        let mut segment = seg("hi incomprehensibilities yo");
        break_to_multiline(layout, &mut segment);
        assert_eq!(segment.text, "hi\nincomprehensibilities\nyo");
    }

    #[test]
    fn line_count_cap_merges_overflow_into_the_last_line() {
        let layout = SubtitleLayout {
            min_line_length: 0,
            max_line_length: 12,
            max_line_count: 2,
        };
        let mut segment = seg("the quick brown fox jumps over it");
        break_to_multiline(layout, &mut segment);
        assert_eq!(segment.text.lines().count(), 2);
        assert_eq!(segment.text, "the quick\nbrown fox jumps over it");
    }

    #[test]
    fn zero_maximum_disables_wrapping() {
        let layout = SubtitleLayout {
            min_line_length: 0,
            max_line_length: 0,
            max_line_count: 0,
        };
        let mut segment = seg("left just as it came in");
        break_to_multiline(layout, &mut segment);
        assert_eq!(segment.text, "left just as it came in");
    }
}
