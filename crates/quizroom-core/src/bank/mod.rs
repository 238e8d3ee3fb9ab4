mod question;
mod source;

pub use question::{Question, QuestionBank, MAX_OPTIONS, MIN_OPTIONS};
pub use source::{QuestionSource, SourceQuestion};
