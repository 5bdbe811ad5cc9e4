//! Core traits and types shared by every Harmonia crate.
//!
//! This crate defines:
//!
//! - [`Brain`] - The text-generation capability every responder and classifier calls
//! - [`Actor`] - The closed set of participants the supervisor can dispatch to
//! - [`Message`] / [`ConversationLog`] - The append-only conversation record
//! - [`SessionId`] / [`SessionStore`] - Per-session logs with exclusive turn locks
//! - [`BrainError`] - Error types for brain operations
//!
//! # Example
//!
//! ```rust
//! use harmonia_core::{async_trait, Brain, BrainError, CompletionRequest};
//!
//! struct Parrot;
//!
//! #[async_trait]
//! impl Brain for Parrot {
//!     async fn complete(&self, request: CompletionRequest) -> Result<String, BrainError> {
//!         Ok(request.last_user_content().unwrap_or_default().to_string())
//!     }
//!
//!     fn name(&self) -> &str {
//!         "Parrot"
//!     }
//! }
//! ```

mod actor;
mod brain;
mod error;
mod log;
mod message;
mod prompt;
mod session;

pub use actor::Actor;
pub use brain::{Brain, CompletionRequest, ResponseSchema, ToolSpec};
pub use error::BrainError;
pub use log::ConversationLog;
pub use message::{Author, Message, PromptMessage, Role};
pub use prompt::{hash_prompt, load_prompt_file};
pub use session::{InvalidSessionId, SessionHandle, SessionId, SessionStore};

// Re-export async_trait for convenience
pub use async_trait::async_trait;
