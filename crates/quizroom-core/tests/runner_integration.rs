//! Runner behaviour under a paused Tokio clock.
//!
//! Intents are queued before `run` starts; `start_paused` lets the countdown
//! advance instantly once the runner is idle.

use std::ops::ControlFlow;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use quizroom_core::{
    CompletionReason, Event, Intent, NotificationSink, NotifyError, Phase, Presenter,
    QuestionBank, QuizRunner, ScoringPolicy, SessionSummary, SessionView, Tick,
};

fn bank(timer: u64) -> Arc<QuestionBank> {
    let src = format!(
        r#"{{
            "questions": [
                {{"question": "Q1", "options": ["A", "B", "C", "D"], "answer": "B", "marks": 1}},
                {{"question": "Q2", "options": ["A", "B"], "answer": "A", "marks": 2}}
            ],
            "timer_seconds": {timer}
        }}"#
    );
    Arc::new(QuestionBank::from_json_str(&src).unwrap())
}

#[derive(Default)]
struct Recorded {
    views: Vec<SessionView>,
    ticks: Vec<u64>,
    completed: Vec<SessionSummary>,
    events: Vec<Event>,
}

#[derive(Clone, Default)]
struct RecordingPresenter(Arc<Mutex<Recorded>>);

impl Presenter for RecordingPresenter {
    fn render(&mut self, view: &SessionView) {
        self.0.lock().unwrap().views.push(view.clone());
    }

    fn tick(&mut self, remaining_secs: u64, _display: &str) {
        self.0.lock().unwrap().ticks.push(remaining_secs);
    }

    fn completed(&mut self, summary: &SessionSummary) {
        self.0.lock().unwrap().completed.push(summary.clone());
    }

    fn event(&mut self, event: &Event) {
        self.0.lock().unwrap().events.push(event.clone());
    }
}

#[derive(Default)]
struct RecordingSink(Mutex<Vec<SessionSummary>>);

#[async_trait]
impl NotificationSink for RecordingSink {
    fn name(&self) -> &str {
        "recording"
    }

    async fn notify(&self, summary: &SessionSummary) -> Result<(), NotifyError> {
        self.0.lock().unwrap().push(summary.clone());
        Ok(())
    }
}

struct RejectingSink;

#[async_trait]
impl NotificationSink for RejectingSink {
    fn name(&self) -> &str {
        "rejecting"
    }

    async fn notify(&self, _summary: &SessionSummary) -> Result<(), NotifyError> {
        Err(NotifyError::Rejected {
            status: 535,
            body: "authentication failed".into(),
        })
    }
}

fn runner(
    timer: u64,
    sink: Arc<dyn NotificationSink>,
) -> (QuizRunner<RecordingPresenter>, RecordingPresenter) {
    let presenter = RecordingPresenter::default();
    let runner = QuizRunner::new(bank(timer), ScoringPolicy::default(), sink, presenter.clone());
    (runner, presenter)
}

#[tokio::test(start_paused = true)]
async fn finished_session_notifies_once_with_final_score() {
    let sink = Arc::new(RecordingSink::default());
    let (runner, presenter) = runner(120, sink.clone());
    let handle = runner.handle();
    handle.start("Alice", "R1");
    handle.select("B");
    handle.select("A");
    handle.quit();

    let report = runner.run().await;

    assert_eq!(
        report.final_phase,
        Phase::Completed {
            reason: CompletionReason::Finished
        }
    );
    assert_eq!(report.summaries.len(), 1);
    assert_eq!(report.notifications.len(), 1);
    assert!(report.notifications[0].delivered);
    assert_eq!(report.notifications[0].sink, "recording");

    let sent = sink.0.lock().unwrap();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].message_body(), "Name: Alice\nReg No: R1\nFinal Score: 3/3");

    let recorded = presenter.0.lock().unwrap();
    assert!(matches!(recorded.events.first(), Some(Event::SessionStarted { .. })));
    assert!(recorded.events.last().is_some_and(Event::is_terminal));
    assert_eq!(recorded.completed.len(), 1);
    let last = recorded.views.last().unwrap();
    assert!(!last.options_enabled);
    assert_eq!(last.score, Some(3));
}

#[tokio::test(start_paused = true)]
async fn countdown_expiry_times_out_with_zero_score() {
    let sink = Arc::new(RecordingSink::default());
    let (runner, presenter) = runner(5, sink.clone());
    let handle = runner.handle();
    handle.start("Alice", "R1");
    handle.quit();

    let started = tokio::time::Instant::now();
    let report = runner.run().await;

    assert_eq!(started.elapsed(), Duration::from_secs(5));
    assert_eq!(
        report.final_phase,
        Phase::Completed {
            reason: CompletionReason::TimedOut
        }
    );
    let summary = &report.summaries[0];
    assert_eq!(summary.score, 0);
    assert_eq!(summary.answered, 0);
    assert_eq!(sink.0.lock().unwrap().len(), 1);
    assert_eq!(presenter.0.lock().unwrap().ticks, vec![5, 4, 3, 2, 1]);
}

#[tokio::test(start_paused = true)]
async fn quit_waits_for_the_running_session() {
    let sink = Arc::new(RecordingSink::default());
    let (runner, _presenter) = runner(120, sink.clone());
    let handle = runner.handle();
    handle.start("Alice", "R1");
    handle.select("B");
    handle.quit();
    handle.select("A");

    let report = runner.run().await;

    assert_eq!(report.summaries.len(), 1);
    assert_eq!(report.summaries[0].score, 3);
    assert_eq!(report.summaries[0].reason, CompletionReason::Finished);
}

#[tokio::test(start_paused = true)]
async fn quit_before_start_exits_without_notifying() {
    let sink = Arc::new(RecordingSink::default());
    let (runner, presenter) = runner(120, sink.clone());
    runner.handle().quit();

    let report = runner.run().await;

    assert_eq!(report.final_phase, Phase::NotStarted);
    assert!(report.summaries.is_empty());
    assert!(report.notifications.is_empty());
    assert!(sink.0.lock().unwrap().is_empty());
    // Initial render only.
    assert_eq!(presenter.0.lock().unwrap().views.len(), 1);
}

#[tokio::test(start_paused = true)]
async fn reset_mid_session_is_ignored() {
    let sink = Arc::new(RecordingSink::default());
    let (runner, _presenter) = runner(5, sink.clone());
    let handle = runner.handle();
    handle.start("Alice", "R1");
    handle.select("B");
    handle.reset();
    handle.start("Bob", "R2");
    handle.quit();

    let report = runner.run().await;

    assert_eq!(report.summaries.len(), 1);
    let summary = &report.summaries[0];
    assert_eq!(summary.name, "Alice");
    assert_eq!(summary.score, 1);
    assert_eq!(summary.reason, CompletionReason::TimedOut);
}

#[tokio::test(start_paused = true)]
async fn new_session_after_reset_gets_a_fresh_countdown() {
    let sink = Arc::new(RecordingSink::default());
    let (runner, _presenter) = runner(5, sink.clone());
    let handle = runner.handle();
    handle.start("Alice", "R1");
    handle.select("B");
    handle.select("A");
    handle.reset();
    handle.start("Bob", "R2");
    handle.quit();

    let started = tokio::time::Instant::now();
    let report = runner.run().await;

    // Bob's full countdown runs; nothing left over from Alice cuts it short.
    assert_eq!(started.elapsed(), Duration::from_secs(5));
    assert_eq!(report.summaries.len(), 2);
    let bob = &report.summaries[1];
    assert_eq!(bob.name, "Bob");
    assert_eq!(bob.score, 0);
    assert_eq!(bob.reason, CompletionReason::TimedOut);
    assert_eq!(sink.0.lock().unwrap().len(), 2);
}

#[tokio::test(start_paused = true)]
async fn each_completed_session_gets_its_own_notification() {
    let sink = Arc::new(RecordingSink::default());
    let (runner, _presenter) = runner(120, sink.clone());
    let handle = runner.handle();
    handle.start("Alice", "R1");
    handle.select("B");
    handle.select("A");
    handle.reset();
    handle.start("Bob", "R2");
    handle.select("A");
    handle.select("B");
    handle.quit();

    let report = runner.run().await;

    assert_eq!(report.summaries.len(), 2);
    assert_eq!(report.notifications.len(), 2);
    assert_ne!(report.summaries[0].session_id, report.summaries[1].session_id);
    assert_eq!(report.summaries[0].score, 3);
    assert_eq!(report.summaries[1].score, 0);
    assert_eq!(sink.0.lock().unwrap().len(), 2);
}

#[tokio::test(start_paused = true)]
async fn failed_notification_leaves_session_completed() {
    let (runner, presenter) = runner(120, Arc::new(RejectingSink));
    let handle = runner.handle();
    handle.start("Alice", "R1");
    handle.select("B");
    handle.select("A");
    handle.quit();

    let report = runner.run().await;

    assert!(matches!(report.final_phase, Phase::Completed { .. }));
    let outcome = &report.notifications[0];
    assert!(!outcome.delivered);
    assert!(outcome.error.as_deref().unwrap().contains("535"));
    assert_eq!(presenter.0.lock().unwrap().completed[0].score, 3);
}

#[tokio::test(start_paused = true)]
async fn ticks_from_an_unknown_generation_are_ignored() {
    let sink = Arc::new(RecordingSink::default());
    let (mut runner, presenter) = runner(120, sink);

    let started = runner.apply(Intent::Start {
        name: "Alice".into(),
        reg_no: "R1".into(),
    });
    assert_eq!(started, ControlFlow::Continue(()));

    let stale = Intent::Tick(Tick {
        generation: 999,
        remaining: 0,
    });
    assert_eq!(runner.apply(stale), ControlFlow::Continue(()));
    assert_eq!(runner.session().phase(), Phase::InProgress { index: 0 });
    assert_eq!(runner.session().remaining_secs(), 120);
    assert!(presenter.0.lock().unwrap().ticks.is_empty());
}

#[tokio::test(start_paused = true)]
async fn selection_after_the_final_tick_is_a_no_op() {
    let sink = Arc::new(RecordingSink::default());
    let (mut runner, presenter) = runner(1, sink);
    let _ = runner.apply(Intent::Start {
        name: "Alice".into(),
        reg_no: "R1".into(),
    });
    let _ = runner.apply(Intent::Select("B".into()));

    // First arming of a fresh runner.
    let _ = runner.apply(Intent::Tick(Tick {
        generation: 1,
        remaining: 0,
    }));
    let _ = runner.apply(Intent::Select("A".into()));

    assert_eq!(
        runner.session().phase(),
        Phase::Completed {
            reason: CompletionReason::TimedOut
        }
    );
    assert_eq!(runner.session().score(), 1);
    assert_eq!(runner.session().answers().len(), 1);
    assert_eq!(presenter.0.lock().unwrap().completed.len(), 1);
}

#[tokio::test(start_paused = true)]
async fn run_returns_once_every_handle_is_dropped() {
    let sink = Arc::new(RecordingSink::default());
    let (runner, _presenter) = runner(120, sink.clone());
    drop(runner.handle());

    let report = runner.run().await;

    assert_eq!(report.final_phase, Phase::NotStarted);
    assert!(report.summaries.is_empty());
    assert!(sink.0.lock().unwrap().is_empty());
}

#[tokio::test(start_paused = true)]
async fn session_left_without_handles_still_times_out() {
    let sink = Arc::new(RecordingSink::default());
    let (runner, _presenter) = runner(5, sink.clone());
    let handle = runner.handle();
    handle.start("Alice", "R1");
    handle.select("B");
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_secs(1)).await;
        drop(handle);
    });

    let started = tokio::time::Instant::now();
    let report = runner.run().await;

    assert_eq!(started.elapsed(), Duration::from_secs(5));
    assert_eq!(report.summaries.len(), 1);
    assert_eq!(report.summaries[0].reason, CompletionReason::TimedOut);
    assert_eq!(report.summaries[0].score, 1);
    assert_eq!(sink.0.lock().unwrap().len(), 1);
}

#[tokio::test(start_paused = true)]
async fn handle_sends_fail_after_the_runner_stops() {
    let sink = Arc::new(RecordingSink::default());
    let (runner, _presenter) = runner(120, sink);
    let handle = runner.handle();
    assert!(handle.quit());

    let _ = runner.run().await;

    assert!(!handle.start("Alice", "R1"));
}
