use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Subject line of the result message.
pub const MESSAGE_SUBJECT: &str = "Quiz Results";

/// Test-taker identity, captured once before the session starts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionIdentity {
    name: String,
    reg_no: String,
}

impl SessionIdentity {
    /// Both fields are trimmed; `None` if either ends up empty.
    pub fn new(name: &str, reg_no: &str) -> Option<Self> {
        let name = name.trim();
        let reg_no = reg_no.trim();
        if name.is_empty() || reg_no.is_empty() {
            return None;
        }
        Some(Self {
            name: name.to_string(),
            reg_no: reg_no.to_string(),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn reg_no(&self) -> &str {
        &self.reg_no
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CompletionReason {
    /// The last question was answered.
    Finished,
    /// The countdown reached zero.
    TimedOut,
}

/// Final result of one completed session, handed to the notification sink.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionSummary {
    pub session_id: Uuid,
    pub name: String,
    pub reg_no: String,
    pub score: u32,
    pub total_marks: u32,
    pub answered: usize,
    pub question_count: usize,
    pub reason: CompletionReason,
    pub started_at: DateTime<Utc>,
    pub completed_at: DateTime<Utc>,
}

impl SessionSummary {
    /// Plain-text message body for the administrator.
    pub fn message_body(&self) -> String {
        format!(
            "Name: {}\nReg No: {}\nFinal Score: {}/{}",
            self.name, self.reg_no, self.score, self.total_marks
        )
    }
}
