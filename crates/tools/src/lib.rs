//! Persona tools for Folio.
//!
//! The model can call exactly two tools:
//! - `record_user_details`: a visitor left contact details
//! - `record_unknown_question`: the persona could not answer from its knowledge
//!
//! Both forward an alert to the owner through a shared [`Notifier`] and
//! report success to the model whether or not the alert was delivered.

pub mod record_unknown_question;
pub mod record_user_details;

#[cfg(any(test, feature = "test-util"))]
pub mod test_helpers;

pub use record_unknown_question::RecordUnknownQuestionTool;
pub use record_user_details::RecordUserDetailsTool;

use folio_core::notify::Notifier;
use folio_core::tool::ToolRegistry;
use std::sync::Arc;

/// Build the registry holding both persona tools.
pub fn persona_registry(notifier: Arc<dyn Notifier>) -> ToolRegistry {
    let mut registry = ToolRegistry::new();
    registry.register(Box::new(RecordUserDetailsTool::new(notifier.clone())));
    registry.register(Box::new(RecordUnknownQuestionTool::new(notifier)));
    registry
}
