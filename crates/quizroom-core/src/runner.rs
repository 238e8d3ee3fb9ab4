//! Quiz runner: the one place where session transitions happen.
//!
//! Presenter input and clock ticks both arrive as [`Intent`]s on a single
//! unbounded queue that `run` drains one at a time, so a selection and the
//! final tick can never interleave. Completing a session cancels the clock
//! and spawns the result notification; the runner keeps the task handle and
//! reports its outcome when it shuts down.
//!
//! Once `run` starts, the queue stays open only while an [`IntentSender`] or
//! an armed countdown is alive. When all handles are gone the running session
//! can still time out, after which `run` returns as if `Quit` had been sent.

use std::ops::ControlFlow;
use std::sync::Arc;

use serde::Serialize;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::bank::QuestionBank;
use crate::clock::{Clock, Tick};
use crate::events::Event;
use crate::notify::{self, NotificationOutcome, NotificationSink};
use crate::session::{format_remaining, Phase, QuizSession, ScoringPolicy, SessionSummary, SessionView};

/// Everything that can drive a session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Intent {
    Start { name: String, reg_no: String },
    Select(String),
    /// Option by position, as shown on screen.
    SelectIndex(usize),
    Back,
    Reset,
    Tick(Tick),
    /// Leave the runner. Deferred until completion while a session is running.
    Quit,
}

/// Cloneable handle for feeding intents into a running [`QuizRunner`].
#[derive(Debug, Clone)]
pub struct IntentSender(mpsc::UnboundedSender<Intent>);

impl IntentSender {
    /// Queue an intent. Returns false once the runner has stopped.
    pub fn send(&self, intent: Intent) -> bool {
        self.0.send(intent).is_ok()
    }

    pub fn start(&self, name: impl Into<String>, reg_no: impl Into<String>) -> bool {
        self.send(Intent::Start {
            name: name.into(),
            reg_no: reg_no.into(),
        })
    }

    pub fn select(&self, option: impl Into<String>) -> bool {
        self.send(Intent::Select(option.into()))
    }

    pub fn select_index(&self, index: usize) -> bool {
        self.send(Intent::SelectIndex(index))
    }

    pub fn back(&self) -> bool {
        self.send(Intent::Back)
    }

    pub fn reset(&self) -> bool {
        self.send(Intent::Reset)
    }

    pub fn quit(&self) -> bool {
        self.send(Intent::Quit)
    }
}

/// Rendering side of the quiz. Holds no session state of its own.
pub trait Presenter {
    /// Redraw after every transition.
    fn render(&mut self, view: &SessionView);

    /// Countdown update that did not change the session phase.
    fn tick(&mut self, _remaining_secs: u64, _display: &str) {}

    /// Called once when a session enters `Completed`.
    fn completed(&mut self, summary: &SessionSummary);

    /// Every transition event, before the re-render.
    fn event(&mut self, _event: &Event) {}
}

/// What happened while the runner was alive.
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub final_phase: Phase,
    pub summaries: Vec<SessionSummary>,
    pub notifications: Vec<NotificationOutcome>,
}

pub struct QuizRunner<P> {
    session: QuizSession,
    clock: Clock,
    sink: Arc<dyn NotificationSink>,
    presenter: P,
    /// Backs `handle()` until `run` starts, then released.
    tx: Option<mpsc::UnboundedSender<Intent>>,
    /// Used to arm the clock without keeping the queue open.
    weak_tx: mpsc::WeakUnboundedSender<Intent>,
    rx: mpsc::UnboundedReceiver<Intent>,
    /// Generation of the countdown that belongs to the current session.
    live_generation: Option<u64>,
    quit_requested: bool,
    summaries: Vec<SessionSummary>,
    pending: Vec<(SessionSummary, JoinHandle<NotificationOutcome>)>,
}

impl<P: Presenter> QuizRunner<P> {
    pub fn new(
        bank: Arc<QuestionBank>,
        policy: ScoringPolicy,
        sink: Arc<dyn NotificationSink>,
        presenter: P,
    ) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self {
            session: QuizSession::new(bank, policy),
            clock: Clock::new(),
            sink,
            presenter,
            weak_tx: tx.downgrade(),
            tx: Some(tx),
            rx,
            live_generation: None,
            quit_requested: false,
            summaries: Vec::new(),
            pending: Vec::new(),
        }
    }

    /// Replace the default one-second clock.
    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }

    /// A sender for this runner's queue. Sends fail once the runner stops.
    pub fn handle(&self) -> IntentSender {
        let tx = self
            .sender()
            .unwrap_or_else(|| mpsc::unbounded_channel().0);
        IntentSender(tx)
    }

    pub fn session(&self) -> &QuizSession {
        &self.session
    }

    pub fn presenter(&self) -> &P {
        &self.presenter
    }

    /// Drain intents until `Quit` is honoured or every sender is gone, then
    /// wait for outstanding notifications.
    pub async fn run(mut self) -> RunReport {
        self.tx = None;
        self.presenter.render(&self.session.view());
        while let Some(intent) = self.rx.recv().await {
            if self.apply(intent).is_break() {
                break;
            }
        }
        self.shutdown().await
    }

    /// Apply one intent. Breaks when the runner should stop.
    pub fn apply(&mut self, intent: Intent) -> ControlFlow<()> {
        let event = match intent {
            Intent::Start { name, reg_no } => self.session.start(&name, &reg_no),
            Intent::Select(option) => self.session.select(&option),
            Intent::SelectIndex(index) => self.session.select_index(index),
            Intent::Back => self.session.go_back(),
            Intent::Reset => self.session.reset(),
            Intent::Tick(tick) => {
                if self.live_generation != Some(tick.generation) {
                    tracing::trace!(generation = tick.generation, "stale tick dropped");
                    return ControlFlow::Continue(());
                }
                let event = self.session.tick(tick.remaining);
                if event.is_none() {
                    self.presenter
                        .tick(tick.remaining, &format_remaining(tick.remaining));
                }
                event
            }
            Intent::Quit => {
                if self.session.position().is_some() {
                    tracing::info!("quit deferred until the session completes");
                    self.quit_requested = true;
                    return ControlFlow::Continue(());
                }
                return ControlFlow::Break(());
            }
        };

        if let Some(event) = event {
            self.on_event(event);
        }

        if self.quit_requested && self.session.position().is_none() {
            ControlFlow::Break(())
        } else {
            ControlFlow::Continue(())
        }
    }

    fn on_event(&mut self, event: Event) {
        tracing::debug!(?event, "session transition");
        self.presenter.event(&event);

        match &event {
            Event::SessionStarted { timer_seconds, .. } => match self.sender() {
                Some(tx) => {
                    let generation = self.clock.arm(*timer_seconds, move |tick| {
                        let _ = tx.send(Intent::Tick(tick));
                    });
                    self.live_generation = Some(generation);
                }
                None => tracing::warn!("no intent senders left; countdown not armed"),
            },
            Event::SessionCompleted { summary } => {
                self.stop_clock();
                self.presenter.completed(summary);
                let handle = notify::dispatch(Arc::clone(&self.sink), summary.clone());
                self.pending.push((summary.clone(), handle));
                self.summaries.push(summary.clone());
            }
            Event::SessionReset { .. } => self.stop_clock(),
            Event::AnswerRecorded { .. } | Event::NavigatedBack { .. } => {}
        }

        self.presenter.render(&self.session.view());
    }

    fn sender(&self) -> Option<mpsc::UnboundedSender<Intent>> {
        self.tx.clone().or_else(|| self.weak_tx.upgrade())
    }

    fn stop_clock(&mut self) {
        self.clock.cancel();
        self.live_generation = None;
    }

    async fn shutdown(mut self) -> RunReport {
        self.stop_clock();
        let mut notifications = Vec::with_capacity(self.pending.len());
        for (summary, handle) in self.pending.drain(..) {
            notifications.push(notify::observe(handle, &summary).await);
        }
        RunReport {
            final_phase: self.session.phase(),
            summaries: self.summaries,
            notifications,
        }
    }
}
