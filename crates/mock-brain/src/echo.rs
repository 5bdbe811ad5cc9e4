//! Echo brain implementation - echoes the latest user message back.

use harmonia_core::{async_trait, Brain, BrainError, CompletionRequest};

/// A simple brain that echoes the most recent user message.
///
/// Useful for testing the message flow without any AI processing.
#[derive(Debug, Clone, Default)]
pub struct EchoBrain {
    /// Optional prefix to add before the echo.
    prefix: Option<String>,
}

impl EchoBrain {
    /// Create a new EchoBrain with no prefix.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a new EchoBrain with a custom prefix.
    ///
    /// # Example
    ///
    /// ```rust
    /// use mock_brain::EchoBrain;
    ///
    /// let brain = EchoBrain::with_prefix("Echo: ");
    /// // Will respond with "Echo: <latest user message>"
    /// ```
    pub fn with_prefix(prefix: impl Into<String>) -> Self {
        Self {
            prefix: Some(prefix.into()),
        }
    }
}

#[async_trait]
impl Brain for EchoBrain {
    async fn complete(&self, request: CompletionRequest) -> Result<String, BrainError> {
        let text = request.last_user_content().unwrap_or_default();
        Ok(match &self.prefix {
            Some(prefix) => format!("{}{}", prefix, text),
            None => text.to_string(),
        })
    }

    fn name(&self) -> &str {
        "EchoBrain"
    }
}
