//! Quiz session state machine.
//!
//! ```text
//! NotStarted --start--> InProgress(0) --select--> InProgress(i+1) ... --select--> Completed
//!                       InProgress(i) --go_back--> InProgress(i-1)       (i > 0)
//!                       InProgress(i) --timeout--> Completed
//! Completed --reset--> NotStarted
//! ```
//!
//! The session has no internal threads or timers: every command returns
//! `Some(Event)` when it changed state and `None` when it was a guarded no-op.

mod answers;
mod machine;
mod scoring;
mod summary;
mod view;

pub use answers::AnswerRecord;
pub use machine::{Phase, QuizSession};
pub use scoring::ScoringPolicy;
pub use summary::{CompletionReason, SessionIdentity, SessionSummary, MESSAGE_SUBJECT};
pub use view::{format_remaining, QuestionView, SessionView};
