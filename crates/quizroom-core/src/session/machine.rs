use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::answers::AnswerRecord;
use super::scoring::{ScoringPolicy, Tally};
use super::summary::{CompletionReason, SessionIdentity, SessionSummary};
use super::view::{format_remaining, QuestionView, SessionView};
use crate::bank::{Question, QuestionBank};
use crate::events::Event;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "phase", rename_all = "snake_case")]
pub enum Phase {
    NotStarted,
    InProgress { index: usize },
    Completed { reason: CompletionReason },
}

/// One test-taker's attempt over a shared, immutable question bank.
#[derive(Debug, Clone)]
pub struct QuizSession {
    bank: Arc<QuestionBank>,
    phase: Phase,
    identity: Option<SessionIdentity>,
    answers: AnswerRecord,
    tally: Tally,
    remaining_secs: u64,
    session_id: Option<Uuid>,
    started_at: Option<DateTime<Utc>>,
    completed_at: Option<DateTime<Utc>>,
}

impl QuizSession {
    pub fn new(bank: Arc<QuestionBank>, policy: ScoringPolicy) -> Self {
        let remaining_secs = bank.timer_seconds();
        Self {
            bank,
            phase: Phase::NotStarted,
            identity: None,
            answers: AnswerRecord::new(),
            tally: Tally::new(policy),
            remaining_secs,
            session_id: None,
            started_at: None,
            completed_at: None,
        }
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Current question index while in progress.
    pub fn position(&self) -> Option<usize> {
        match self.phase {
            Phase::InProgress { index } => Some(index),
            _ => None,
        }
    }

    pub fn is_completed(&self) -> bool {
        matches!(self.phase, Phase::Completed { .. })
    }

    pub fn score(&self) -> u32 {
        self.tally.score()
    }

    pub fn total_marks(&self) -> u32 {
        self.bank.total_marks()
    }

    pub fn answers(&self) -> &AnswerRecord {
        &self.answers
    }

    pub fn identity(&self) -> Option<&SessionIdentity> {
        self.identity.as_ref()
    }

    pub fn remaining_secs(&self) -> u64 {
        self.remaining_secs
    }

    pub fn policy(&self) -> ScoringPolicy {
        self.tally.policy()
    }

    pub fn bank(&self) -> &QuestionBank {
        &self.bank
    }

    /// The final summary, once completed.
    pub fn summary(&self) -> Option<SessionSummary> {
        let Phase::Completed { reason } = self.phase else {
            return None;
        };
        let identity = self.identity.as_ref()?;
        Some(SessionSummary {
            session_id: self.session_id?,
            name: identity.name().to_string(),
            reg_no: identity.reg_no().to_string(),
            score: self.tally.score(),
            total_marks: self.bank.total_marks(),
            answered: self.answers.len(),
            question_count: self.bank.len(),
            reason,
            started_at: self.started_at?,
            completed_at: self.completed_at?,
        })
    }

    pub fn view(&self) -> SessionView {
        let question = self.position().and_then(|index| {
            let q = self.question_at(index)?;
            Some(QuestionView {
                index,
                number: index + 1,
                count: self.bank.len(),
                prompt: q.prompt().to_string(),
                options: q.options().to_vec(),
                selected: self.answers.get(index).map(str::to_string),
            })
        });

        SessionView {
            phase: self.phase,
            back_enabled: matches!(self.phase, Phase::InProgress { index } if index > 0),
            options_enabled: question.is_some(),
            question,
            remaining_secs: self.remaining_secs,
            time_display: format_remaining(self.remaining_secs),
            score: self.is_completed().then(|| self.tally.score()),
            total_marks: self.bank.total_marks(),
        }
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Begin the session. A no-op unless `NotStarted` and both identity
    /// fields are non-empty.
    pub fn start(&mut self, name: &str, reg_no: &str) -> Option<Event> {
        if self.phase != Phase::NotStarted {
            tracing::debug!(phase = ?self.phase, "start ignored");
            return None;
        }
        let Some(identity) = SessionIdentity::new(name, reg_no) else {
            tracing::debug!("start ignored: name and registration number are required");
            return None;
        };

        let session_id = Uuid::new_v4();
        let at = Utc::now();
        let event = Event::SessionStarted {
            session_id,
            name: identity.name().to_string(),
            reg_no: identity.reg_no().to_string(),
            question_count: self.bank.len(),
            timer_seconds: self.bank.timer_seconds(),
            at,
        };

        self.identity = Some(identity);
        self.answers.clear();
        self.tally.clear();
        self.remaining_secs = self.bank.timer_seconds();
        self.session_id = Some(session_id);
        self.started_at = Some(at);
        self.completed_at = None;
        self.phase = Phase::InProgress { index: 0 };
        Some(event)
    }

    /// Record `option` for the current question and advance. Answering the
    /// last question completes the session.
    pub fn select(&mut self, option: &str) -> Option<Event> {
        let Phase::InProgress { index } = self.phase else {
            tracing::debug!(phase = ?self.phase, "select ignored");
            return None;
        };
        let bank = Arc::clone(&self.bank);
        let question = Self::question_in(&bank, index)?;
        if !question.has_option(option) {
            tracing::debug!(index, option, "select ignored: not an option of this question");
            return None;
        }

        self.answers.record(index, option);
        self.tally.on_select(index, question, option);

        let next_index = index + 1;
        if next_index == bank.len() {
            return self.complete(CompletionReason::Finished);
        }

        self.phase = Phase::InProgress { index: next_index };
        Some(Event::AnswerRecorded {
            index,
            option: option.to_string(),
            correct: question.is_correct(option),
            score: self.tally.score(),
            next_index,
            at: Utc::now(),
        })
    }

    /// Select the `option_index`-th option of the current question.
    pub fn select_index(&mut self, option_index: usize) -> Option<Event> {
        let index = self.position()?;
        let option = self.question_at(index)?.options().get(option_index)?.clone();
        self.select(&option)
    }

    /// Step back one question. Never touches score or recorded answers.
    pub fn go_back(&mut self) -> Option<Event> {
        match self.phase {
            Phase::InProgress { index } if index > 0 => {
                self.phase = Phase::InProgress { index: index - 1 };
                Some(Event::NavigatedBack {
                    from: index,
                    to: index - 1,
                    at: Utc::now(),
                })
            }
            _ => {
                tracing::debug!(phase = ?self.phase, "go_back ignored");
                None
            }
        }
    }

    /// Countdown update. `tick(0)` is the timeout.
    pub fn tick(&mut self, remaining_secs: u64) -> Option<Event> {
        if self.position().is_none() {
            return None;
        }
        self.remaining_secs = remaining_secs;
        if remaining_secs == 0 {
            return self.timeout();
        }
        None
    }

    /// Auto-submit: settle the current question's recorded answer, then
    /// complete regardless of unanswered questions.
    pub fn timeout(&mut self) -> Option<Event> {
        let Phase::InProgress { index } = self.phase else {
            tracing::debug!(phase = ?self.phase, "timeout ignored");
            return None;
        };
        let bank = Arc::clone(&self.bank);
        if let Some(question) = Self::question_in(&bank, index) {
            self.tally
                .on_timeout(index, question, self.answers.get(index));
        }
        self.remaining_secs = 0;
        self.complete(CompletionReason::TimedOut)
    }

    /// Prepare for the next participant. Only valid once completed.
    pub fn reset(&mut self) -> Option<Event> {
        if !self.is_completed() {
            tracing::debug!(phase = ?self.phase, "reset ignored");
            return None;
        }
        self.phase = Phase::NotStarted;
        self.identity = None;
        self.answers.clear();
        self.tally.clear();
        self.remaining_secs = self.bank.timer_seconds();
        self.session_id = None;
        self.started_at = None;
        self.completed_at = None;
        Some(Event::SessionReset { at: Utc::now() })
    }

    // ── Internal ─────────────────────────────────────────────────────

    /// Only reachable from InProgress, where identity, id and start time
    /// are always set, so the summary is always present.
    fn complete(&mut self, reason: CompletionReason) -> Option<Event> {
        self.phase = Phase::Completed { reason };
        self.completed_at = Some(Utc::now());
        let summary = self.summary()?;
        tracing::info!(
            session_id = %summary.session_id,
            score = summary.score,
            total_marks = summary.total_marks,
            reason = ?reason,
            "session completed"
        );
        Some(Event::SessionCompleted { summary })
    }

    fn question_at(&self, index: usize) -> Option<&Question> {
        Self::question_in(&self.bank, index)
    }

    fn question_in(bank: &QuestionBank, index: usize) -> Option<&Question> {
        match bank.get(index) {
            Ok(question) => Some(question),
            Err(e) => {
                tracing::error!(error = %e, "session position outside question bank");
                None
            }
        }
    }
}
