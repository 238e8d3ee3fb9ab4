use async_trait::async_trait;

use crate::error::NotifyError;
use crate::session::SessionSummary;

/// Out-of-band delivery of a completed session's result.
///
/// Implementations must not assume they are awaited by the session: they
/// run in their own task and their error is only logged.
#[async_trait]
pub trait NotificationSink: Send + Sync {
    /// Unique identifier (e.g. "webhook", "log").
    fn name(&self) -> &str;

    /// Deliver the summary. Called exactly once per completed session.
    async fn notify(&self, summary: &SessionSummary) -> Result<(), NotifyError>;
}
