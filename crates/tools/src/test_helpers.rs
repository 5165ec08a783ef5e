//! Shared test doubles for tool tests.

use async_trait::async_trait;
use folio_core::notify::Notifier;
use std::sync::Mutex;

/// Records every alert and returns a fixed delivery outcome.
pub struct RecordingNotifier {
    delivered: bool,
    sent: Mutex<Vec<(String, String)>>,
}

impl RecordingNotifier {
    pub fn new(delivered: bool) -> Self {
        Self {
            delivered,
            sent: Mutex::new(Vec::new()),
        }
    }

    /// `(title, message)` pairs in send order.
    pub fn sent(&self) -> Vec<(String, String)> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    fn name(&self) -> &str {
        "recording"
    }

    async fn notify(&self, title: &str, message: &str) -> bool {
        self.sent
            .lock()
            .unwrap()
            .push((title.to_string(), message.to_string()));
        self.delivered
    }
}
