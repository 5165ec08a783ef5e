//! The conversation orchestrator: the heart of Folio.
//!
//! One visitor turn follows a **call → act → observe** cycle:
//!
//! 1. **Send** the persona's system prompt, the history and the tool
//!    declarations to the model
//! 2. **If text**: that is the reply; append it and stop
//! 3. **If tool calls**: run each through the registry, append one `tool`
//!    message per call, and go back to step 1
//!
//! The cycle is bounded by a round cap. A backend failure ends the turn with
//! a fixed apology and leaves the history as it was.

pub mod loop_runner;

#[cfg(test)]
pub(crate) mod test_helpers;

pub use loop_runner::{
    AgentLoop, BACKEND_FAILURE_REPLY, EMPTY_REPLY_FALLBACK, ROUND_LIMIT_REPLY, TurnOutcome,
    TurnStatus,
};
