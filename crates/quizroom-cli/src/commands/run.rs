use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use clap::Args;
use quizroom_core::{
    CompletionReason, Config, IntentSender, Phase, Presenter, QuestionBank, QuizRunner,
    SessionSummary, SessionView,
};

const RULES: &str = "\
1. The test has an allocated timer. If you run out of time, the test submits itself.
2. Type an option number to answer. Type b to go back to the previous question;
   once the final question is answered there is no going back.
3. You can only close the test after you have completed it.";

#[derive(Args)]
pub struct RunArgs {
    /// Question source, overriding `quiz.questions_path`
    #[arg(long)]
    questions: Option<PathBuf>,
    /// Config file to use instead of the default location
    #[arg(long)]
    config: Option<PathBuf>,
}

pub fn run(args: RunArgs) -> Result<(), Box<dyn std::error::Error>> {
    let mut config = match &args.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };
    config.apply_env();

    let path = args
        .questions
        .unwrap_or_else(|| config.quiz.questions_path.clone());
    let bank = Arc::new(QuestionBank::load(&path)?);
    let sink = config.sink()?;
    tracing::info!(
        path = %path.display(),
        questions = bank.len(),
        sink = sink.name(),
        "question bank loaded"
    );

    let timer = bank.timer_seconds();
    let presenter = TerminalPresenter::new(io::stdout());
    let completed = presenter.completed_flag();
    let runner = QuizRunner::new(bank, config.scoring.policy, sink, presenter);
    let handle = runner.handle();
    std::thread::Builder::new()
        .name("quiz-input".into())
        .spawn(move || read_input(&handle, &completed, timer))?;

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;
    let report = runtime.block_on(runner.run());

    for outcome in report.notifications.iter().filter(|o| !o.delivered) {
        eprintln!(
            "warning: result notification via {} failed: {}",
            outcome.sink,
            outcome.error.as_deref().unwrap_or("unknown error")
        );
    }
    Ok(())
}

/// Renders sessions as plain text.
pub struct TerminalPresenter<W> {
    out: W,
    /// Set while the last rendered session is completed; read by the input thread.
    completed: Arc<AtomicBool>,
}

impl<W: Write> TerminalPresenter<W> {
    pub fn new(out: W) -> Self {
        Self {
            out,
            completed: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn completed_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.completed)
    }

    fn write_view(&mut self, view: &SessionView) -> io::Result<()> {
        match view.phase {
            Phase::NotStarted => Ok(()),
            Phase::InProgress { .. } => {
                let Some(question) = &view.question else {
                    return Ok(());
                };
                writeln!(self.out)?;
                writeln!(
                    self.out,
                    "Question {}/{}: {}",
                    question.number, question.count, question.prompt
                )?;
                for (i, option) in question.options.iter().enumerate() {
                    let mark = if question.selected.as_ref() == Some(option) {
                        '*'
                    } else {
                        ' '
                    };
                    writeln!(self.out, " {mark} {}) {option}", i + 1)?;
                }
                let back = if view.back_enabled { ", b = back" } else { "" };
                writeln!(
                    self.out,
                    "[1-{}]{back}    {}",
                    question.options.len(),
                    view.time_display
                )?;
                self.out.flush()
            }
            Phase::Completed { .. } => {
                writeln!(self.out, "Enter n for a new session or q to quit.")?;
                self.out.flush()
            }
        }
    }

    fn write_summary(&mut self, summary: &SessionSummary) -> io::Result<()> {
        writeln!(self.out)?;
        if summary.reason == CompletionReason::TimedOut {
            writeln!(self.out, "Time is up!")?;
        }
        writeln!(self.out, "Quiz completed.")?;
        writeln!(self.out, "{}", summary.message_body())?;
        self.out.flush()
    }
}

impl<W: Write> Presenter for TerminalPresenter<W> {
    fn render(&mut self, view: &SessionView) {
        self.completed.store(
            matches!(view.phase, Phase::Completed { .. }),
            Ordering::SeqCst,
        );
        if let Err(e) = self.write_view(view) {
            tracing::warn!(error = %e, "failed to render question");
        }
    }

    fn tick(&mut self, remaining_secs: u64, display: &str) {
        if remaining_secs % 30 == 0 || remaining_secs <= 10 {
            let _ = writeln!(self.out, "{display}").and_then(|()| self.out.flush());
        }
    }

    fn completed(&mut self, summary: &SessionSummary) {
        if let Err(e) = self.write_summary(summary) {
            tracing::warn!(error = %e, "failed to print result");
        }
    }
}

/// Feed stdin into the runner until input ends or the runner stops.
fn read_input(tx: &IntentSender, completed: &AtomicBool, timer_seconds: u64) {
    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();

    loop {
        let Some((name, reg_no)) = read_identity(&mut lines) else {
            tx.quit();
            return;
        };
        println!("\nRules (time allowed: {timer_seconds} seconds):\n{RULES}\n");
        ask("Press Enter to start.");
        if next_line(&mut lines).is_none() || !tx.start(name, reg_no) {
            tx.quit();
            return;
        }

        loop {
            let Some(line) = next_line(&mut lines) else {
                tx.quit();
                return;
            };
            let sent = match line.trim() {
                "" => true,
                "q" => tx.quit(),
                "b" => tx.back(),
                "n" if !completed.load(Ordering::SeqCst) => {
                    eprintln!("a new session can only begin once this one is completed");
                    true
                }
                "n" => {
                    if !tx.reset() {
                        return;
                    }
                    break;
                }
                other => match other.parse::<usize>() {
                    Ok(n) if n >= 1 => tx.select_index(n - 1),
                    _ => {
                        eprintln!("unrecognised input '{other}': enter an option number, b, n or q");
                        true
                    }
                },
            };
            if !sent {
                return;
            }
        }
    }
}

fn read_identity<B: BufRead>(lines: &mut io::Lines<B>) -> Option<(String, String)> {
    loop {
        ask("Name: ");
        let name = next_line(lines)?;
        ask("Reg No: ");
        let reg_no = next_line(lines)?;
        let (name, reg_no) = (name.trim(), reg_no.trim());
        if !name.is_empty() && !reg_no.is_empty() {
            return Some((name.to_string(), reg_no.to_string()));
        }
        eprintln!("Name and Reg No are both required.");
    }
}

fn next_line<B: BufRead>(lines: &mut io::Lines<B>) -> Option<String> {
    lines.next()?.ok()
}

fn ask(prompt: &str) {
    print!("{prompt}");
    let _ = io::stdout().flush();
}

#[cfg(test)]
mod tests {
    use super::*;
    use quizroom_core::QuestionView;

    fn in_progress(selected: Option<&str>, back_enabled: bool) -> SessionView {
        SessionView {
            phase: Phase::InProgress { index: 1 },
            question: Some(QuestionView {
                index: 1,
                number: 2,
                count: 2,
                prompt: "Q2".into(),
                options: vec!["A".into(), "B".into()],
                selected: selected.map(String::from),
            }),
            back_enabled,
            options_enabled: true,
            remaining_secs: 65,
            time_display: "Time Remaining: 01:05".into(),
            score: None,
            total_marks: 3,
        }
    }

    fn rendered(view: &SessionView) -> String {
        let mut presenter = TerminalPresenter::new(Vec::new());
        presenter.render(view);
        String::from_utf8(presenter.out).unwrap()
    }

    #[test]
    fn renders_question_with_options_and_timer() {
        let out = rendered(&in_progress(None, true));
        assert!(out.contains("Question 2/2: Q2"));
        assert!(out.contains("1) A"));
        assert!(out.contains("2) B"));
        assert!(out.contains("b = back"));
        assert!(out.contains("Time Remaining: 01:05"));
    }

    #[test]
    fn marks_previous_selection_and_hides_back() {
        let out = rendered(&in_progress(Some("B"), false));
        assert!(out.contains(" * 2) B"));
        assert!(!out.contains("b = back"));
    }

    #[test]
    fn ticks_are_printed_sparingly() {
        let mut presenter = TerminalPresenter::new(Vec::new());
        presenter.tick(59, "Time Remaining: 00:59");
        presenter.tick(30, "Time Remaining: 00:30");
        presenter.tick(5, "Time Remaining: 00:05");
        let out = String::from_utf8(presenter.out).unwrap();
        assert_eq!(out, "Time Remaining: 00:30\nTime Remaining: 00:05\n");
    }

    #[test]
    fn completed_flag_follows_rendered_phase() {
        let mut presenter = TerminalPresenter::new(Vec::new());
        let flag = presenter.completed_flag();
        let mut view = in_progress(None, true);
        presenter.render(&view);
        assert!(!flag.load(Ordering::SeqCst));

        view.phase = Phase::Completed {
            reason: CompletionReason::Finished,
        };
        view.question = None;
        presenter.render(&view);
        assert!(flag.load(Ordering::SeqCst));
        assert!(String::from_utf8(presenter.out).unwrap().contains("Enter n"));
    }

    #[test]
    fn identity_prompt_repeats_until_both_fields_are_given() {
        let input = io::Cursor::new("Alice\n \n  Alice \nR1\n");
        let mut lines = input.lines();
        assert_eq!(
            read_identity(&mut lines),
            Some(("Alice".to_string(), "R1".to_string()))
        );
        assert_eq!(read_identity(&mut lines), None);
    }
}
