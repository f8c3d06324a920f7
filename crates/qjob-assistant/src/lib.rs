//! Assistant bridge for qjob.
//!
//! Sends a fixed system instruction plus the user's prompt to a
//! chat-completion service and pulls OpenQASM out of the reply.
//!
//! ```ignore
//! use qjob_assistant::{Assistant, AssistantSettings, QuickAction};
//!
//! let assistant = Assistant::groq(AssistantSettings::default());
//! let reply = assistant.quick_action(QuickAction::BellState, &api_key).await?;
//! if let Some(qasm) = assistant.extract_circuit(&reply) {
//!     println!("{qasm}");
//! }
//! ```
//!
//! Failures come back as [`AssistantError`] values; callers never need to
//! inspect the reply text to tell an answer from an error.

mod assistant;
mod client;
mod error;
mod extract;
mod prompts;

pub use assistant::{Assistant, AssistantSettings};
pub use client::{ChatBackend, ChatMessage, ChatRequest, GROQ_ENDPOINT, GroqClient, Role};
pub use error::{AssistantError, AssistantResult};
pub use extract::{ExtractOptions, contains_circuit, extract_circuit};
pub use prompts::{QuickAction, SYSTEM_PROMPT};
