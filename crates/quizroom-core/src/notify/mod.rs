//! Result notification.
//!
//! A completed session is reported to the administrator exactly once,
//! from a spawned task, so the state machine never waits on delivery.
//! Failures are logged and handed back through the task's `JoinHandle`;
//! they are never retried.

mod logging;
mod traits;
mod webhook;

pub use logging::LogSink;
pub use traits::NotificationSink;
pub use webhook::{WebhookSink, WebhookTarget};

use std::sync::Arc;

use serde::Serialize;
use tokio::task::JoinHandle;
use uuid::Uuid;

use crate::error::NotifyError;
use crate::session::SessionSummary;

/// How one dispatch ended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NotificationOutcome {
    pub session_id: Uuid,
    pub sink: String,
    pub delivered: bool,
    pub error: Option<String>,
}

impl NotificationOutcome {
    fn from_result(summary: &SessionSummary, sink: &str, result: Result<(), NotifyError>) -> Self {
        Self {
            session_id: summary.session_id,
            sink: sink.to_string(),
            delivered: result.is_ok(),
            error: result.err().map(|e| e.to_string()),
        }
    }
}

/// Fire-and-forget delivery of `summary` on the current Tokio runtime.
pub fn dispatch(
    sink: Arc<dyn NotificationSink>,
    summary: SessionSummary,
) -> JoinHandle<NotificationOutcome> {
    tokio::spawn(async move {
        let result = sink.notify(&summary).await;
        match &result {
            Ok(()) => tracing::info!(
                sink = sink.name(),
                session_id = %summary.session_id,
                "result notification delivered"
            ),
            Err(e) => tracing::warn!(
                sink = sink.name(),
                session_id = %summary.session_id,
                error = %e,
                "result notification failed"
            ),
        }
        NotificationOutcome::from_result(&summary, sink.name(), result)
    })
}

/// Wait for a dispatch to finish, turning a panicked or aborted task into
/// a failed outcome.
pub async fn observe(
    handle: JoinHandle<NotificationOutcome>,
    summary: &SessionSummary,
) -> NotificationOutcome {
    match handle.await {
        Ok(outcome) => outcome,
        Err(e) => {
            let err = NotifyError::from(e);
            tracing::warn!(session_id = %summary.session_id, error = %err, "notification task lost");
            NotificationOutcome::from_result(summary, "unknown", Err(err))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::CompletionReason;
    use async_trait::async_trait;
    use chrono::Utc;

    struct FailingSink;

    #[async_trait]
    impl NotificationSink for FailingSink {
        fn name(&self) -> &str {
            "failing"
        }

        async fn notify(&self, _summary: &SessionSummary) -> Result<(), NotifyError> {
            Err(NotifyError::NotConfigured("no credential".into()))
        }
    }

    fn summary() -> SessionSummary {
        SessionSummary {
            session_id: Uuid::new_v4(),
            name: "Alice".into(),
            reg_no: "R1".into(),
            score: 1,
            total_marks: 3,
            answered: 1,
            question_count: 2,
            reason: CompletionReason::TimedOut,
            started_at: Utc::now(),
            completed_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn failed_dispatch_is_observed_not_raised() {
        let summary = summary();
        let handle = dispatch(Arc::new(FailingSink), summary.clone());
        let outcome = observe(handle, &summary).await;
        assert!(!outcome.delivered);
        assert_eq!(outcome.sink, "failing");
        assert_eq!(outcome.session_id, summary.session_id);
        assert!(outcome.error.unwrap().contains("no credential"));
    }

    #[tokio::test]
    async fn log_sink_always_delivers() {
        let summary = summary();
        let handle = dispatch(Arc::new(LogSink), summary.clone());
        let outcome = observe(handle, &summary).await;
        assert!(outcome.delivered);
        assert!(outcome.error.is_none());
    }

    #[tokio::test]
    async fn aborted_dispatch_is_reported() {
        let summary = summary();
        let handle = tokio::spawn(async {
            std::future::pending::<NotificationOutcome>().await
        });
        handle.abort();
        let outcome = observe(handle, &summary).await;
        assert!(!outcome.delivered);
        assert!(outcome.error.unwrap().contains("aborted"));
    }
}
