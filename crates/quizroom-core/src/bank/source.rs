//! On-disk question source format.
//!
//! ```json
//! {
//!   "questions": [
//!     {"question": "…", "options": ["…", "…"], "answer": "…", "marks": 1}
//!   ],
//!   "timer_seconds": 300
//! }
//! ```
//!
//! Numbers are read signed so that zero and negative values reach
//! validation and get a precise error instead of a generic parse failure.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceQuestion {
    pub question: String,
    pub options: Vec<String>,
    pub answer: String,
    pub marks: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuestionSource {
    pub questions: Vec<SourceQuestion>,
    pub timer_seconds: i64,
}
