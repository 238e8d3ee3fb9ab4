//! Core error types for quizroom-core.
//!
//! Every fallible boundary of the library gets its own `thiserror` enum;
//! `CoreError` wraps them for callers that just want one type.

use std::path::PathBuf;
use thiserror::Error;

/// Core error type for quizroom-core.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Question source errors
    #[error("Question source error: {0}")]
    Load(#[from] LoadError),

    /// Question bank access errors
    #[error("Question bank error: {0}")]
    Bank(#[from] BankError),

    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Result notification errors
    #[error("Notification error: {0}")]
    Notify(#[from] NotifyError),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// The question source could not be turned into a usable bank.
#[derive(Error, Debug)]
pub enum LoadError {
    /// Source file could not be read
    #[error("Failed to read question source {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Malformed document, missing field or wrong field type
    #[error("Failed to parse question source: {0}")]
    Parse(String),

    /// The question list is empty
    #[error("Question source contains no questions")]
    EmptyBank,

    /// A question has a blank prompt
    #[error("Question {index} has an empty prompt")]
    EmptyPrompt { index: usize },

    /// A question has too few or too many options
    #[error("Question {index} has {count} options (expected {min}..={max})")]
    OptionCount {
        index: usize,
        count: usize,
        min: usize,
        max: usize,
    },

    /// The same option text appears twice in one question
    #[error("Question {index} lists option '{option}' more than once")]
    DuplicateOption { index: usize, option: String },

    /// The correct answer is not one of the options
    #[error("Question {index}: answer '{answer}' is not one of its options")]
    AnswerNotAnOption { index: usize, answer: String },

    /// Point value is zero or negative
    #[error("Question {index} has non-positive marks ({marks})")]
    NonPositiveMarks { index: usize, marks: i64 },

    /// Sum of all marks does not fit the score type
    #[error("Total marks of the question source exceed {}", u32::MAX)]
    TotalMarksOverflow,

    /// Session timer is zero or negative
    #[error("timer_seconds must be positive (got {0})")]
    NonPositiveTimer(i64),
}

/// Question bank access errors.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum BankError {
    #[error("Question index {index} out of bounds (length: {len})")]
    IndexOutOfRange { index: usize, len: usize },
}

/// Result notification errors. Never fatal to a session.
#[derive(Error, Debug)]
pub enum NotifyError {
    /// Sender or credential missing
    #[error("Notification target not configured: {0}")]
    NotConfigured(String),

    /// Endpoint missing or not a valid URL
    #[error("Invalid notification endpoint '{endpoint}': {message}")]
    InvalidEndpoint { endpoint: String, message: String },

    /// Request could not be delivered
    #[error("Notification transport failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// Target answered with a non-success status
    #[error("Notification rejected (HTTP {status}): {body}")]
    Rejected { status: u16, body: String },

    /// Dispatch task died before reporting
    #[error("Notification task aborted: {0}")]
    Aborted(String),
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to load configuration
    #[error("Failed to load configuration from {path}: {message}")]
    LoadFailed { path: PathBuf, message: String },

    /// Failed to save configuration
    #[error("Failed to save configuration to {path}: {message}")]
    SaveFailed { path: PathBuf, message: String },

    /// Invalid configuration value
    #[error("Invalid configuration value for '{key}': {message}")]
    InvalidValue { key: String, message: String },

    /// Unknown configuration key
    #[error("Unknown configuration key: {0}")]
    UnknownKey(String),

    /// Config directory could not be resolved or created
    #[error("Configuration directory unavailable: {0}")]
    DataDir(String),
}

impl From<serde_json::Error> for LoadError {
    fn from(err: serde_json::Error) -> Self {
        LoadError::Parse(err.to_string())
    }
}

impl From<toml::de::Error> for LoadError {
    fn from(err: toml::de::Error) -> Self {
        LoadError::Parse(err.to_string())
    }
}

impl From<tokio::task::JoinError> for NotifyError {
    fn from(err: tokio::task::JoinError) -> Self {
        NotifyError::Aborted(err.to_string())
    }
}

/// Result type alias for CoreError
pub type Result<T, E = CoreError> = std::result::Result<T, E>;
