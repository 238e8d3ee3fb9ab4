use async_trait::async_trait;

use super::traits::NotificationSink;
use crate::error::NotifyError;
use crate::session::{SessionSummary, MESSAGE_SUBJECT};

/// Writes the result to the log instead of sending it anywhere.
/// Used when notifications are disabled.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogSink;

#[async_trait]
impl NotificationSink for LogSink {
    fn name(&self) -> &str {
        "log"
    }

    async fn notify(&self, summary: &SessionSummary) -> Result<(), NotifyError> {
        tracing::info!(
            subject = MESSAGE_SUBJECT,
            session_id = %summary.session_id,
            body = %summary.message_body(),
            "quiz result"
        );
        Ok(())
    }
}
