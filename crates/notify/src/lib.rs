//! Owner notifications for Folio.
//!
//! Two [`Notifier`] variants, chosen once at startup:
//! - [`PushoverNotifier`] when both Pushover credentials are configured
//! - [`LogNotifier`] otherwise, which only writes a local log record
//!
//! Neither ever fails the caller. See `folio_core::notify`.

pub mod log;
pub mod pushover;

pub use log::LogNotifier;
pub use pushover::PushoverNotifier;

use folio_config::NotificationConfig;
use folio_core::notify::Notifier;
use std::sync::Arc;
use tracing::info;

/// Select the notifier variant from configuration.
pub fn from_config(config: &NotificationConfig) -> Arc<dyn Notifier> {
    match (&config.pushover_token, &config.pushover_user) {
        (Some(token), Some(user)) if config.pushover_configured() => {
            match PushoverNotifier::new(token, user) {
                Ok(notifier) => {
                    info!("Owner notifications via Pushover");
                    return Arc::new(notifier);
                }
                Err(e) => {
                    tracing::warn!(error = %e, "Pushover unavailable, falling back to local log");
                }
            }
        }
        _ => info!("Pushover credentials missing, owner notifications go to the local log"),
    }
    Arc::new(LogNotifier)
}
