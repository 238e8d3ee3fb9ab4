use serde::Serialize;

use super::machine::Phase;

/// What the presenter needs to draw the current question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QuestionView {
    pub index: usize,
    /// 1-based, for display.
    pub number: usize,
    pub count: usize,
    pub prompt: String,
    pub options: Vec<String>,
    /// Option recorded earlier for this question (after going back).
    pub selected: Option<String>,
}

/// Snapshot of the session for rendering.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SessionView {
    pub phase: Phase,
    pub question: Option<QuestionView>,
    pub back_enabled: bool,
    pub options_enabled: bool,
    pub remaining_secs: u64,
    pub time_display: String,
    /// Only revealed once the session is completed.
    pub score: Option<u32>,
    pub total_marks: u32,
}

/// `Time Remaining: MM:SS`
pub fn format_remaining(secs: u64) -> String {
    format!("Time Remaining: {:02}:{:02}", secs / 60, secs % 60)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_minutes_and_seconds() {
        assert_eq!(format_remaining(125), "Time Remaining: 02:05");
        assert_eq!(format_remaining(0), "Time Remaining: 00:00");
        assert_eq!(format_remaining(6000), "Time Remaining: 100:00");
    }
}
