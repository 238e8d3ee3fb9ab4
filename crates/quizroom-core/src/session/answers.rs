use std::collections::BTreeMap;

use serde::Serialize;

/// Selected option per question index. One entry per question; a later
/// selection for the same index replaces the earlier one.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AnswerRecord(BTreeMap<usize, String>);

impl AnswerRecord {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the previously recorded option, if any.
    pub fn record(&mut self, index: usize, option: impl Into<String>) -> Option<String> {
        self.0.insert(index, option.into())
    }

    pub fn get(&self, index: usize) -> Option<&str> {
        self.0.get(&index).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (usize, &str)> {
        self.0.iter().map(|(i, o)| (*i, o.as_str()))
    }

    pub fn clear(&mut self) {
        self.0.clear();
    }
}
