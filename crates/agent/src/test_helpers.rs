//! Shared test helpers for orchestrator tests.

use async_trait::async_trait;
use folio_core::error::ProviderError;
use folio_core::message::{Message, MessageToolCall};
use folio_core::provider::{Provider, ProviderRequest, ProviderResponse, Usage};
use std::sync::Mutex;

pub use folio_tools::test_helpers::RecordingNotifier;

/// A mock provider that returns a sequence of scripted responses.
///
/// Each call to `complete` returns the next response in the queue and
/// records the request. Once the script runs out it fails like a backend
/// would.
pub struct SequentialMockProvider {
    responses: Mutex<Vec<ProviderResponse>>,
    requests: Mutex<Vec<ProviderRequest>>,
}

impl SequentialMockProvider {
    pub fn new(responses: Vec<ProviderResponse>) -> Self {
        Self {
            responses: Mutex::new(responses),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Create a provider that returns a single text response (no tool calls).
    pub fn single_text(text: &str) -> Self {
        Self::new(vec![make_text_response(text)])
    }

    /// Create a provider that first returns tool calls, then a final answer.
    pub fn tool_then_answer(tool_calls: Vec<MessageToolCall>, answer: &str) -> Self {
        Self::new(vec![
            make_tool_call_response(tool_calls, ""),
            make_text_response(answer),
        ])
    }

    /// Every request received so far.
    pub fn requests(&self) -> Vec<ProviderRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl Provider for SequentialMockProvider {
    fn name(&self) -> &str {
        "sequential_mock"
    }

    async fn complete(&self, request: ProviderRequest) -> Result<ProviderResponse, ProviderError> {
        let mut requests = self.requests.lock().unwrap();
        let index = requests.len();
        requests.push(request);

        self.responses
            .lock()
            .unwrap()
            .get(index)
            .cloned()
            .ok_or_else(|| ProviderError::ApiError {
                status_code: 500,
                message: format!("no scripted response for call #{index}"),
            })
    }
}

/// A provider that never answers, only ever asks for another tool call.
#[derive(Default)]
pub struct AlwaysToolCallProvider {
    calls: Mutex<usize>,
}

impl AlwaysToolCallProvider {
    pub fn call_count(&self) -> usize {
        *self.calls.lock().unwrap()
    }
}

#[async_trait]
impl Provider for AlwaysToolCallProvider {
    fn name(&self) -> &str {
        "always_tool_call"
    }

    async fn complete(&self, _request: ProviderRequest) -> Result<ProviderResponse, ProviderError> {
        let mut calls = self.calls.lock().unwrap();
        *calls += 1;
        let mut call = make_tool_call(
            "record_unknown_question",
            serde_json::json!({ "question": "Tell me everything" }),
        );
        call.id = format!("call_{}", *calls);
        Ok(make_tool_call_response(vec![call], ""))
    }
}

/// A provider whose backend is always down.
pub struct FailingProvider;

#[async_trait]
impl Provider for FailingProvider {
    fn name(&self) -> &str {
        "failing"
    }

    async fn complete(&self, _request: ProviderRequest) -> Result<ProviderResponse, ProviderError> {
        Err(ProviderError::RateLimited { retry_after_secs: 5 })
    }
}

/// Create a simple text response (no tool calls).
pub fn make_text_response(text: &str) -> ProviderResponse {
    ProviderResponse {
        message: Message::assistant(text),
        usage: Some(Usage {
            prompt_tokens: 10,
            completion_tokens: 5,
            total_tokens: 15,
        }),
        model: "mock-model".into(),
    }
}

/// Create a response with tool calls and optional text.
pub fn make_tool_call_response(tool_calls: Vec<MessageToolCall>, text: &str) -> ProviderResponse {
    ProviderResponse {
        message: Message::assistant_tool_calls(Some(text.to_string()), tool_calls),
        usage: Some(Usage {
            prompt_tokens: 10,
            completion_tokens: 5,
            total_tokens: 15,
        }),
        model: "mock-model".into(),
    }
}

/// Helper to create a tool call.
pub fn make_tool_call(name: &str, args: serde_json::Value) -> MessageToolCall {
    MessageToolCall {
        id: format!("call_{name}"),
        name: name.to_string(),
        arguments: serde_json::to_string(&args).unwrap(),
    }
}
