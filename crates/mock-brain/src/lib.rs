//! Mock brain implementations for testing.
//!
//! This crate provides deterministic implementations of the `Brain` trait:
//! - `EchoBrain` - Echoes the latest user message back
//! - `ScriptedBrain` - Replays a fixed sequence of replies and records requests
//! - `FailingBrain` - Always fails
//! - `DelayedBrain` - Wraps another brain with artificial delay
//!
//! For production text generation, use the `openai-brain` crate instead.
//!
//! # Example
//!
//! ```rust
//! use mock_brain::{Brain, CompletionRequest, PromptMessage, ScriptedBrain};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), mock_brain::BrainError> {
//!     let brain = ScriptedBrain::new(["chat", "FINISH"]);
//!
//!     let request = CompletionRequest::default().message(PromptMessage::user("hello"));
//!     assert_eq!(brain.complete(request.clone()).await?, "chat");
//!     assert_eq!(brain.complete(request).await?, "FINISH");
//!     Ok(())
//! }
//! ```

mod delayed;
mod echo;
mod failing;
mod scripted;

// Re-export core types for convenience
pub use harmonia_core::{async_trait, Brain, BrainError, CompletionRequest, PromptMessage};

pub use delayed::DelayedBrain;
pub use echo::EchoBrain;
pub use failing::FailingBrain;
pub use scripted::ScriptedBrain;
