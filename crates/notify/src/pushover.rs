//! Pushover push notifications.
//!
//! A single form POST per alert. Any failure (network, timeout, non-2xx,
//! an API body with `status != 1`) is logged locally and reported as `false`.

use async_trait::async_trait;
use folio_core::error::NotifyError;
use folio_core::notify::Notifier;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, warn};

const PUSHOVER_ENDPOINT: &str = "https://api.pushover.net/1/messages.json";

pub struct PushoverNotifier {
    token: String,
    user: String,
    endpoint: String,
    client: reqwest::Client,
}

#[derive(Debug, Deserialize)]
struct PushoverResponse {
    #[serde(default)]
    status: i64,
    #[serde(default)]
    errors: Vec<String>,
}

impl PushoverNotifier {
    pub fn new(token: impl Into<String>, user: impl Into<String>) -> Result<Self, NotifyError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .map_err(|e| NotifyError::NotConfigured(format!("HTTP client: {e}")))?;

        Ok(Self {
            token: token.into(),
            user: user.into(),
            endpoint: PUSHOVER_ENDPOINT.to_string(),
            client,
        })
    }

    /// Point at a different API endpoint.
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    async fn deliver(&self, title: &str, message: &str) -> Result<(), NotifyError> {
        let failed = |reason: String| NotifyError::DeliveryFailed {
            service: "pushover".into(),
            reason,
        };

        let response = self
            .client
            .post(&self.endpoint)
            .form(&[
                ("token", self.token.as_str()),
                ("user", self.user.as_str()),
                ("title", title),
                ("message", message),
            ])
            .send()
            .await
            .map_err(|e| failed(e.to_string()))?;

        let status = response.status();
        let body: PushoverResponse = response
            .json()
            .await
            .map_err(|e| failed(format!("HTTP {status}, unreadable body: {e}")))?;

        if !status.is_success() || body.status != 1 {
            return Err(failed(format!("HTTP {status}: {}", body.errors.join("; "))));
        }

        Ok(())
    }
}

#[async_trait]
impl Notifier for PushoverNotifier {
    fn name(&self) -> &str {
        "pushover"
    }

    async fn notify(&self, title: &str, message: &str) -> bool {
        match self.deliver(title, message).await {
            Ok(()) => {
                debug!(title, "Pushover notification delivered");
                true
            }
            Err(e) => {
                warn!(error = %e, title, message, "Pushover notification failed");
                false
            }
        }
    }
}
