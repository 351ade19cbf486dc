use serde::Serialize;

/// A single timed token produced by a decode backend.
///
/// Times are in milliseconds, relative to the start of the backend stream (incremental
/// backends) or of the decoded buffer (batch backends).
#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct Token {
    /// Start time in milliseconds.
    pub start_ms: u64,
    /// Token text fragment; a leading space marks the start of a new word.
    pub text: String,
}

impl Token {
    pub fn new(start_ms: u64, text: impl Into<String>) -> Self {
        Self {
            start_ms,
            text: text.into(),
        }
    }

    /// True when this token begins a new word.
    pub fn starts_word(&self) -> bool {
        self.text.starts_with(' ')
    }
}
