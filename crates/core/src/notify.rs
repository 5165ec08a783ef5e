//! Notifier trait: best-effort alerts to the persona's owner.
//!
//! Implementations never return an error. A delivery problem or missing
//! credentials is logged locally and reported as `false`; callers carry on
//! either way.

use async_trait::async_trait;

#[async_trait]
pub trait Notifier: Send + Sync {
    /// Short name for logs (e.g., "pushover", "log").
    fn name(&self) -> &str;

    /// Deliver an alert. Returns `true` only if the remote service accepted it.
    async fn notify(&self, title: &str, message: &str) -> bool;
}
