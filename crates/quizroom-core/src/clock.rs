//! Countdown clock.
//!
//! Knows nothing about quizzes: once armed it reports the remaining whole
//! seconds to a callback, `N, N-1, …, 0`, then stops by itself. Each arming
//! gets a new generation number so a consumer can discard ticks that were
//! already queued from an earlier countdown.

use std::time::Duration;

use tokio::task::JoinHandle;

const DEFAULT_PERIOD: Duration = Duration::from_secs(1);

/// One countdown step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tick {
    /// Which arming produced this tick.
    pub generation: u64,
    pub remaining: u64,
}

#[derive(Debug)]
pub struct Clock {
    period: Duration,
    generation: u64,
    task: Option<JoinHandle<()>>,
}

impl Default for Clock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock {
    /// One tick per second.
    pub fn new() -> Self {
        Self::with_period(DEFAULT_PERIOD)
    }

    /// Custom tick period; the countdown still counts `duration_secs` ticks.
    pub fn with_period(period: Duration) -> Self {
        Self {
            period,
            generation: 0,
            task: None,
        }
    }

    /// Start a countdown, replacing any countdown in flight.
    ///
    /// `on_tick` receives `duration_secs` immediately, then one value per
    /// period down to and including `0`. Must be called from within a Tokio
    /// runtime. Returns the generation of this arming.
    pub fn arm<F>(&mut self, duration_secs: u64, mut on_tick: F) -> u64
    where
        F: FnMut(Tick) + Send + 'static,
    {
        self.cancel();
        self.generation += 1;

        let period = self.period;
        let generation = self.generation;
        self.task = Some(tokio::spawn(async move {
            let mut interval = tokio::time::interval(period);
            for remaining in (0..=duration_secs).rev() {
                interval.tick().await;
                on_tick(Tick {
                    generation,
                    remaining,
                });
            }
            tracing::trace!(generation, "countdown finished");
        }));
        generation
    }

    /// Stop ticking early. Safe to call any number of times.
    pub fn cancel(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }

    /// Whether a countdown is still running.
    pub fn is_armed(&self) -> bool {
        self.task.as_ref().is_some_and(|task| !task.is_finished())
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }
}

impl Drop for Clock {
    fn drop(&mut self) {
        self.cancel();
    }
}
