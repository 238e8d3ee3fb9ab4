use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::session::SessionSummary;

/// Every state change of a quiz session produces an Event.
/// Presenters may log or display them; the runner uses `SessionCompleted`
/// to dispatch the result notification.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Event {
    SessionStarted {
        session_id: Uuid,
        name: String,
        reg_no: String,
        question_count: usize,
        timer_seconds: u64,
        at: DateTime<Utc>,
    },
    /// An option was recorded and the session moved to the next question.
    AnswerRecorded {
        index: usize,
        option: String,
        correct: bool,
        /// Score after the policy was applied.
        score: u32,
        next_index: usize,
        at: DateTime<Utc>,
    },
    NavigatedBack {
        from: usize,
        to: usize,
        at: DateTime<Utc>,
    },
    /// Terminal transition, either by answering the last question or by timeout.
    SessionCompleted { summary: SessionSummary },
    SessionReset { at: DateTime<Utc> },
}

impl Event {
    /// True for the transition into `Completed`.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Event::SessionCompleted { .. })
    }

    pub fn summary(&self) -> Option<&SessionSummary> {
        match self {
            Event::SessionCompleted { summary } => Some(summary),
            _ => None,
        }
    }
}
