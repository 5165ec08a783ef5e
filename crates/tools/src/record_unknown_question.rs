//! Knowledge-gap capture: records a question the persona could not answer.

use async_trait::async_trait;
use folio_core::error::ToolError;
use folio_core::notify::Notifier;
use folio_core::persona::UNKNOWN_QUESTION_TOOL;
use folio_core::tool::{Tool, ToolResult, parse_arguments};
use serde::Deserialize;
use std::sync::Arc;
use tracing::info;

#[derive(Debug, Deserialize)]
struct RecordUnknownQuestionArgs {
    question: String,
}

pub struct RecordUnknownQuestionTool {
    notifier: Arc<dyn Notifier>,
}

impl RecordUnknownQuestionTool {
    pub fn new(notifier: Arc<dyn Notifier>) -> Self {
        Self { notifier }
    }
}

#[async_trait]
impl Tool for RecordUnknownQuestionTool {
    fn name(&self) -> &str {
        UNKNOWN_QUESTION_TOOL
    }

    fn description(&self) -> &str {
        "Record any question you could not answer from the provided context, so it can be followed up."
    }

    fn parameters_schema(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "question": {
                    "type": "string",
                    "description": "The question that could not be answered, verbatim"
                }
            },
            "required": ["question"],
            "additionalProperties": false
        })
    }

    async fn execute(&self, arguments: serde_json::Value) -> Result<ToolResult, ToolError> {
        let args: RecordUnknownQuestionArgs = parse_arguments(arguments)?;
        let question = args.question.trim();
        if question.is_empty() {
            return Err(ToolError::InvalidArguments("question must not be blank".into()));
        }

        let delivered = self
            .notifier
            .notify("Unknown question", &format!("UNKNOWN QUESTION: {question}"))
            .await;
        info!(delivered, "Unknown question recorded");

        Ok(ToolResult::recorded())
    }
}
