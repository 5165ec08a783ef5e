//! Lead capture: records a visitor's contact details and alerts the owner.

use async_trait::async_trait;
use folio_core::error::ToolError;
use folio_core::notify::Notifier;
use folio_core::persona::LEAD_CAPTURE_TOOL;
use folio_core::tool::{Tool, ToolResult, parse_arguments};
use serde::Deserialize;
use std::sync::Arc;
use tracing::info;

#[derive(Debug, Deserialize)]
struct RecordUserDetailsArgs {
    #[serde(default)]
    email: Option<String>,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    notes: Option<String>,
}

pub struct RecordUserDetailsTool {
    notifier: Arc<dyn Notifier>,
}

impl RecordUserDetailsTool {
    pub fn new(notifier: Arc<dyn Notifier>) -> Self {
        Self { notifier }
    }
}

/// Minimal syntactic check: something on both sides of a single `@`.
fn is_plausible_email(email: &str) -> bool {
    match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && !domain.is_empty()
                && !domain.contains('@')
                && !email.chars().any(char::is_whitespace)
        }
        None => false,
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

#[async_trait]
impl Tool for RecordUserDetailsTool {
    fn name(&self) -> &str {
        LEAD_CAPTURE_TOOL
    }

    fn description(&self) -> &str {
        "Record a visitor's contact details when they share an email address or want to get in touch."
    }

    fn parameters_schema(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "email": {
                    "type": "string",
                    "description": "The visitor's email address"
                },
                "name": {
                    "type": "string",
                    "description": "The visitor's name, if they gave it"
                },
                "notes": {
                    "type": "string",
                    "description": "Anything worth passing on, e.g. what they want to discuss"
                }
            },
            "required": ["email"],
            "additionalProperties": false
        })
    }

    async fn execute(&self, arguments: serde_json::Value) -> Result<ToolResult, ToolError> {
        let args: RecordUserDetailsArgs = parse_arguments(arguments)?;

        let email = non_blank(args.email)
            .filter(|e| is_plausible_email(e))
            .ok_or_else(|| ToolError::Validation("invalid email".into()))?;
        let name = non_blank(args.name).unwrap_or_else(|| "Name not provided".into());
        let notes = non_blank(args.notes).unwrap_or_else(|| "not provided".into());

        let message = format!("LEAD CAPTURED: {name} ({email}). Notes: {notes}");
        let delivered = self.notifier.notify("New lead", &message).await;
        info!(email = %email, delivered, "Lead recorded");

        Ok(ToolResult::recorded())
    }
}
