use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::bank::Question;

/// How re-selecting an answer after going back affects the score.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScoringPolicy {
    /// Award a question's marks the first time it is answered correctly.
    /// Marks are never retracted and never awarded twice.
    #[default]
    AwardOnce,
    /// Re-selections retract or re-award, so the score always matches the
    /// finally recorded answers.
    FinalAnswer,
}

/// Running score plus the set of question indices currently counted in it.
#[derive(Debug, Clone)]
pub(crate) struct Tally {
    policy: ScoringPolicy,
    score: u32,
    counted: BTreeSet<usize>,
}

impl Tally {
    pub(crate) fn new(policy: ScoringPolicy) -> Self {
        Self {
            policy,
            score: 0,
            counted: BTreeSet::new(),
        }
    }

    pub(crate) fn policy(&self) -> ScoringPolicy {
        self.policy
    }

    pub(crate) fn score(&self) -> u32 {
        self.score
    }

    pub(crate) fn is_counted(&self, index: usize) -> bool {
        self.counted.contains(&index)
    }

    /// Apply a selection of `option` for question `index`.
    pub(crate) fn on_select(&mut self, index: usize, question: &Question, option: &str) {
        let counted = self.is_counted(index);
        if question.is_correct(option) {
            if !counted {
                self.award(index, question);
            }
        } else if counted && self.policy == ScoringPolicy::FinalAnswer {
            self.counted.remove(&index);
            self.score -= question.marks();
        }
    }

    /// Final evaluation of the current question's recorded answer on timeout.
    pub(crate) fn on_timeout(&mut self, index: usize, question: &Question, recorded: Option<&str>) {
        if let Some(option) = recorded {
            if question.is_correct(option) && !self.is_counted(index) {
                self.award(index, question);
            }
        }
    }

    pub(crate) fn clear(&mut self) {
        self.score = 0;
        self.counted.clear();
    }

    fn award(&mut self, index: usize, question: &Question) {
        self.counted.insert(index);
        self.score += question.marks();
    }
}
