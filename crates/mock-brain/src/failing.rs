//! Failing brain implementation - every request errors.

use harmonia_core::{async_trait, Brain, BrainError, CompletionRequest};

/// A brain whose every completion fails with `ProcessingFailed`.
#[derive(Debug, Clone)]
pub struct FailingBrain {
    reason: String,
}

impl FailingBrain {
    /// Create a brain that fails with the given reason.
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

#[async_trait]
impl Brain for FailingBrain {
    async fn complete(&self, _request: CompletionRequest) -> Result<String, BrainError> {
        Err(BrainError::ProcessingFailed(self.reason.clone()))
    }

    fn name(&self) -> &str {
        "FailingBrain"
    }

    async fn is_ready(&self) -> bool {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_always_fails() {
        let brain = FailingBrain::new("backend down");
        let err = brain
            .complete(CompletionRequest::default())
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "processing failed: backend down");
        assert!(!brain.is_ready().await);
    }
}
