//! Webhook delivery -- post the result message as JSON to an HTTP endpoint.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde_json::json;
use url::Url;

use super::traits::NotificationSink;
use crate::error::NotifyError;
use crate::session::{SessionSummary, MESSAGE_SUBJECT};

/// Where and as whom results are sent. Supplied once at startup.
#[derive(Debug, Clone, Default)]
pub struct WebhookTarget {
    /// Sender address shown as `from`.
    pub sender: String,
    /// Recipient address; the sender itself when absent.
    pub recipient: Option<String>,
    /// Sent as a bearer token.
    pub credential: String,
    pub endpoint: String,
    pub timeout: Duration,
}

pub struct WebhookSink {
    target: WebhookTarget,
    client: Client,
}

impl WebhookSink {
    /// Build the HTTP client. Missing credentials are not checked here;
    /// they make each dispatch fail instead.
    pub fn new(target: WebhookTarget) -> Result<Self, NotifyError> {
        let client = Client::builder().timeout(target.timeout).build()?;
        Ok(Self { target, client })
    }

    pub fn target(&self) -> &WebhookTarget {
        &self.target
    }

    fn endpoint(&self) -> Result<Url, NotifyError> {
        let endpoint = &self.target.endpoint;
        if endpoint.is_empty() {
            return Err(NotifyError::InvalidEndpoint {
                endpoint: String::new(),
                message: "endpoint not configured".into(),
            });
        }
        let url = Url::parse(endpoint).map_err(|e| NotifyError::InvalidEndpoint {
            endpoint: endpoint.clone(),
            message: e.to_string(),
        })?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(NotifyError::InvalidEndpoint {
                endpoint: endpoint.clone(),
                message: format!("unsupported scheme '{}'", url.scheme()),
            });
        }
        Ok(url)
    }
}

#[async_trait]
impl NotificationSink for WebhookSink {
    fn name(&self) -> &str {
        "webhook"
    }

    async fn notify(&self, summary: &SessionSummary) -> Result<(), NotifyError> {
        if self.target.sender.is_empty() {
            return Err(NotifyError::NotConfigured("sender address is empty".into()));
        }
        if self.target.credential.is_empty() {
            return Err(NotifyError::NotConfigured("credential is empty".into()));
        }
        let url = self.endpoint()?;

        let recipient = self
            .target
            .recipient
            .as_deref()
            .filter(|r| !r.is_empty())
            .unwrap_or(&self.target.sender);
        let body = json!({
            "from": self.target.sender,
            "to": recipient,
            "subject": MESSAGE_SUBJECT,
            "body": summary.message_body(),
            "summary": summary,
        });

        let resp = self
            .client
            .post(url)
            .bearer_auth(&self.target.credential)
            .json(&body)
            .send()
            .await?;

        if resp.status().is_success() {
            Ok(())
        } else {
            let status = resp.status().as_u16();
            let text = resp.text().await.unwrap_or_default();
            Err(NotifyError::Rejected { status, body: text })
        }
    }
}
