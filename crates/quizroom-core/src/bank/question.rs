use std::path::Path;

use serde::Serialize;

use super::source::QuestionSource;
use crate::error::{BankError, LoadError};

/// Fewest options a question may offer.
pub const MIN_OPTIONS: usize = 2;
/// Most options a question may offer.
pub const MAX_OPTIONS: usize = 8;

/// A single multiple-choice question. Only constructed through
/// [`QuestionBank`] validation, so `answer` is always one of `options`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Question {
    prompt: String,
    options: Vec<String>,
    answer: String,
    marks: u32,
}

impl Question {
    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    pub fn options(&self) -> &[String] {
        &self.options
    }

    pub fn answer(&self) -> &str {
        &self.answer
    }

    pub fn marks(&self) -> u32 {
        self.marks
    }

    pub fn has_option(&self, option: &str) -> bool {
        self.options.iter().any(|o| o == option)
    }

    pub fn is_correct(&self, option: &str) -> bool {
        self.answer == option
    }
}

/// Immutable, non-empty, ordered question list plus the session countdown.
#[derive(Debug, Clone, Serialize)]
pub struct QuestionBank {
    questions: Vec<Question>,
    timer_seconds: u64,
    total_marks: u32,
}

impl QuestionBank {
    /// Load a question source from disk. `.toml` files are read as TOML,
    /// everything else as JSON.
    ///
    /// # Errors
    ///
    /// Returns `LoadError::Io` if the file cannot be read, or any of the
    /// structural `LoadError` variants if the content is invalid.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, LoadError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| LoadError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        let is_toml = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("toml"));

        if is_toml {
            Self::from_toml_str(&content)
        } else {
            Self::from_json_str(&content)
        }
    }

    pub fn from_json_str(content: &str) -> Result<Self, LoadError> {
        let source: QuestionSource = serde_json::from_str(content)?;
        Self::from_source(source)
    }

    pub fn from_toml_str(content: &str) -> Result<Self, LoadError> {
        let source: QuestionSource = toml::from_str(content)?;
        Self::from_source(source)
    }

    /// Validate a parsed source and freeze it into a bank.
    pub fn from_source(source: QuestionSource) -> Result<Self, LoadError> {
        if source.timer_seconds <= 0 {
            return Err(LoadError::NonPositiveTimer(source.timer_seconds));
        }
        if source.questions.is_empty() {
            return Err(LoadError::EmptyBank);
        }

        let mut questions = Vec::with_capacity(source.questions.len());
        for (index, raw) in source.questions.into_iter().enumerate() {
            if raw.question.trim().is_empty() {
                return Err(LoadError::EmptyPrompt { index });
            }

            let count = raw.options.len();
            if !(MIN_OPTIONS..=MAX_OPTIONS).contains(&count) {
                return Err(LoadError::OptionCount {
                    index,
                    count,
                    min: MIN_OPTIONS,
                    max: MAX_OPTIONS,
                });
            }

            for (i, option) in raw.options.iter().enumerate() {
                if raw.options[..i].contains(option) {
                    return Err(LoadError::DuplicateOption {
                        index,
                        option: option.clone(),
                    });
                }
            }

            if !raw.options.contains(&raw.answer) {
                return Err(LoadError::AnswerNotAnOption {
                    index,
                    answer: raw.answer,
                });
            }

            let marks = u32::try_from(raw.marks)
                .ok()
                .filter(|m| *m > 0)
                .ok_or(LoadError::NonPositiveMarks {
                    index,
                    marks: raw.marks,
                })?;

            questions.push(Question {
                prompt: raw.question,
                options: raw.options,
                answer: raw.answer,
                marks,
            });
        }

        let total_marks = questions
            .iter()
            .try_fold(0u32, |total, q| total.checked_add(q.marks))
            .ok_or(LoadError::TotalMarksOverflow)?;
        Ok(Self {
            questions,
            timer_seconds: source.timer_seconds as u64,
            total_marks,
        })
    }

    pub fn len(&self) -> usize {
        self.questions.len()
    }

    /// True when the bank holds no questions. Never the case after validation.
    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }

    /// # Errors
    ///
    /// `BankError::IndexOutOfRange` outside `0..len()`.
    pub fn get(&self, index: usize) -> Result<&Question, BankError> {
        self.questions.get(index).ok_or(BankError::IndexOutOfRange {
            index,
            len: self.questions.len(),
        })
    }

    pub fn iter(&self) -> impl Iterator<Item = &Question> {
        self.questions.iter()
    }

    /// Sum of all question marks, computed once at load.
    pub fn total_marks(&self) -> u32 {
        self.total_marks
    }

    /// Whole-session countdown in seconds.
    pub fn timer_seconds(&self) -> u64 {
        self.timer_seconds
    }
}
