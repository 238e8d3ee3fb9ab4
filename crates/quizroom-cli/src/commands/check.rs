use std::path::Path;

use quizroom_core::QuestionBank;
use serde_json::json;

/// Load and validate a question source, then print a JSON synopsis.
pub fn run(path: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let bank = QuestionBank::load(path)?;
    let synopsis = json!({
        "questions": bank.len(),
        "total_marks": bank.total_marks(),
        "timer_seconds": bank.timer_seconds(),
    });
    println!("{}", serde_json::to_string_pretty(&synopsis)?);
    Ok(())
}
