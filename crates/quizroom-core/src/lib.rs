//! # Quizroom Core Library
//!
//! This library provides the core logic for Quizroom, a timed single-session
//! quiz runner. Like its CLI, any front end is a thin presenter over the
//! same core.
//!
//! ## Architecture
//!
//! - **Question Bank**: immutable, validated question list plus the session
//!   countdown, loaded once from JSON or TOML
//! - **Session**: the quiz state machine; every command returns
//!   `Option<Event>`, `None` meaning a guarded no-op
//! - **Clock**: Tokio-backed countdown reporting one tick per second
//! - **Notify**: fire-and-forget delivery of the final result
//! - **Runner**: serializes presenter intents and clock ticks into the session
//! - **Storage**: TOML-based configuration
//!
//! ## Key Components
//!
//! - [`QuestionBank`]: Question source loading and validation
//! - [`QuizSession`]: Core session state machine
//! - [`QuizRunner`]: Event loop and notification dispatch
//! - [`NotificationSink`]: Trait for result delivery
//! - [`Config`]: Application configuration management

pub mod bank;
pub mod clock;
pub mod error;
pub mod events;
pub mod notify;
pub mod runner;
pub mod session;
pub mod storage;

pub use bank::{Question, QuestionBank};
pub use clock::{Clock, Tick};
pub use error::{BankError, ConfigError, CoreError, LoadError, NotifyError};
pub use events::Event;
pub use notify::{LogSink, NotificationOutcome, NotificationSink, WebhookSink, WebhookTarget};
pub use runner::{Intent, IntentSender, Presenter, QuizRunner, RunReport};
pub use session::{
    format_remaining, AnswerRecord, CompletionReason, Phase, QuestionView, QuizSession,
    ScoringPolicy, SessionIdentity, SessionSummary, SessionView,
};
pub use storage::Config;
