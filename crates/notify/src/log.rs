//! Local-log notifier, used when no push service is configured.

use async_trait::async_trait;
use folio_core::notify::Notifier;

/// Writes each alert as an `info` record under the `folio::notify` target.
///
/// Always reports `false`: nothing was delivered to the owner.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    fn name(&self) -> &str {
        "log"
    }

    async fn notify(&self, title: &str, message: &str) -> bool {
        tracing::info!(target: "folio::notify", title, message, "Owner notification (not delivered)");
        false
    }
}
