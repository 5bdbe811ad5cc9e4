//! The Brain trait definition.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::BrainError;
use crate::message::{PromptMessage, Role};

/// A JSON schema the brain's output must conform to.
///
/// Backends that support structured output enforce it; others may only use
/// it as a hint, so callers still validate what comes back.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResponseSchema {
    /// Schema name, e.g. "route".
    pub name: String,
    /// The JSON schema itself.
    pub schema: Value,
}

/// A tool a brain may be told about.
///
/// Tools are advertised only; nothing in Harmonia executes them yet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolSpec {
    /// Function name.
    pub name: String,
    /// What the tool does.
    pub description: String,
    /// JSON schema of the arguments.
    pub parameters: Value,
}

/// One text-generation request.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CompletionRequest {
    /// Messages in order, system instruction first.
    pub messages: Vec<PromptMessage>,
    /// Optional constrained output format.
    pub response_schema: Option<ResponseSchema>,
    /// Tools available to the model.
    pub tools: Vec<ToolSpec>,
}

impl CompletionRequest {
    /// Create a request that starts with a system instruction.
    pub fn with_system(prompt: impl Into<String>) -> Self {
        Self {
            messages: vec![PromptMessage::system(prompt)],
            ..Default::default()
        }
    }

    /// Append one message.
    pub fn message(mut self, message: PromptMessage) -> Self {
        self.messages.push(message);
        self
    }

    /// Append several messages.
    pub fn messages(mut self, messages: impl IntoIterator<Item = PromptMessage>) -> Self {
        self.messages.extend(messages);
        self
    }

    /// Constrain the output to a JSON schema.
    pub fn response_schema(mut self, schema: ResponseSchema) -> Self {
        self.response_schema = Some(schema);
        self
    }

    /// Advertise tools to the model.
    pub fn tools(mut self, tools: impl IntoIterator<Item = ToolSpec>) -> Self {
        self.tools.extend(tools);
        self
    }

    /// The system instruction, if the request has one.
    pub fn system_prompt(&self) -> Option<&str> {
        self.messages
            .iter()
            .find(|m| m.role == Role::System)
            .map(|m| m.content.as_str())
    }

    /// Content of the most recent user message.
    pub fn last_user_content(&self) -> Option<&str> {
        self.messages
            .iter()
            .rev()
            .find(|m| m.role == Role::User)
            .map(|m| m.content.as_str())
    }
}

/// A text-generation capability.
///
/// Implementations range from scripted test doubles to HTTP backends.
/// This trait is object-safe and is shared as `Arc<dyn Brain>`.
#[async_trait]
pub trait Brain: Send + Sync {
    /// Generate text for the given request.
    async fn complete(&self, request: CompletionRequest) -> Result<String, BrainError>;

    /// Get a human-readable name for this brain implementation.
    fn name(&self) -> &str;

    /// Check if the brain is ready to process requests.
    ///
    /// Default implementation always returns true.
    async fn is_ready(&self) -> bool {
        true
    }

    /// Gracefully shut down the brain.
    ///
    /// Default implementation does nothing.
    async fn shutdown(&self) -> Result<(), BrainError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_builder() {
        let request = CompletionRequest::with_system("be brief")
            .message(PromptMessage::user("first"))
            .messages(vec![
                PromptMessage::assistant("reply"),
                PromptMessage::user("second"),
            ]);

        assert_eq!(request.messages.len(), 4);
        assert_eq!(request.system_prompt(), Some("be brief"));
        assert_eq!(request.last_user_content(), Some("second"));
        assert!(request.response_schema.is_none());
        assert!(request.tools.is_empty());
    }

    #[test]
    fn test_request_without_user_message() {
        let request = CompletionRequest::with_system("only rules");
        assert_eq!(request.last_user_content(), None);
    }
}
