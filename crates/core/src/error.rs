//! Error types for the Folio domain.
//!
//! Uses `thiserror` for ergonomic error definitions.
//! There is no crate-wide error type. Each bounded context has its own, and
//! each has a different audience:
//!
//! - [`ProviderError`]: model backend failures. Recovered at the turn
//!   boundary and shown to the visitor as a fixed apology.
//! - [`ToolError`]: bad tool arguments or unknown tools. Shown to the model
//!   only, as a failed tool result.
//! - [`NotifyError`]: notification delivery failures. Absorbed by the
//!   notifier and visible only in operator logs.

use thiserror::Error;

// --- Bounded context errors ---

#[derive(Debug, Clone, Error)]
pub enum ProviderError {
    #[error("API request failed: {message} (status: {status_code})")]
    ApiError { status_code: u16, message: String },

    #[error("Rate limited by provider, retry after {retry_after_secs}s")]
    RateLimited { retry_after_secs: u64 },

    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    #[error("Provider not configured: {0}")]
    NotConfigured(String),

    #[error("Request timed out: {0}")]
    Timeout(String),

    #[error("Network error: {0}")]
    Network(String),
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ToolError {
    #[error("Tool not found: {0}")]
    NotFound(String),

    /// The argument payload could not be parsed into the tool's argument record.
    #[error("Invalid tool arguments: {0}")]
    InvalidArguments(String),

    /// The arguments parsed, but a field failed a semantic check.
    #[error("Validation failed: {0}")]
    Validation(String),
}

impl ToolError {
    /// The short error code reported to the model in a failed tool result.
    pub fn code(&self) -> &str {
        match self {
            ToolError::NotFound(_) => "unknown tool",
            ToolError::InvalidArguments(_) => "invalid arguments",
            ToolError::Validation(reason) => reason,
        }
    }
}

#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("Notifier not configured: {0}")]
    NotConfigured(String),

    #[error("Delivery to {service} failed: {reason}")]
    DeliveryFailed { service: String, reason: String },
}
