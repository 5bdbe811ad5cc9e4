//! OpenAI-backed brain implementation.
//!
//! This crate provides a [`Brain`] that sends chat-completion requests to the
//! OpenAI API (or any endpoint speaking the same protocol).
//!
//! # Features
//!
//! - Structured output via JSON schema, used by the supervisor's classifier
//! - Function tool advertisement for domain agents
//! - Configurable via environment variables
//!
//! # Usage
//!
//! ```rust,no_run
//! use openai_brain::{Brain, CompletionRequest, OpenAiBrain, PromptMessage};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let brain = OpenAiBrain::from_env()?;
//!     let request = CompletionRequest::with_system("You are terse.")
//!         .message(PromptMessage::user("Say hi"));
//!     println!("{}", brain.complete(request).await?);
//!     Ok(())
//! }
//! ```

mod api_types;
mod brain;
mod config;

pub use brain::OpenAiBrain;
pub use config::{OpenAiBrainConfig, OpenAiBrainConfigBuilder};

// Re-export core types for convenience
pub use harmonia_core::{async_trait, Brain, BrainError, CompletionRequest, PromptMessage};
