/// The shape of text a session produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputShape {
    /// Plain running text. Silence is truly discarded and does not affect timestamps.
    #[default]
    Plain,

    /// Timestamped subtitle segments. Frames containing any speech are kept whole so
    /// inter-word pauses stay aligned with backend-reported timings.
    Timed,
}
