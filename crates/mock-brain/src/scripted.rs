//! Scripted brain implementation - replays canned replies in order.

use std::collections::VecDeque;
use std::sync::{Mutex, MutexGuard};

use harmonia_core::{async_trait, Brain, BrainError, CompletionRequest};

/// A brain that returns pre-recorded replies and remembers every request.
///
/// Once the script runs out, requests fail with `Unavailable`, unless the
/// brain was built with [`ScriptedBrain::repeating`].
#[derive(Debug, Default)]
pub struct ScriptedBrain {
    replies: Mutex<VecDeque<String>>,
    repeat: Option<String>,
    requests: Mutex<Vec<CompletionRequest>>,
}

impl ScriptedBrain {
    /// Create a brain that replies with each entry once, in order.
    pub fn new<I, S>(replies: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            replies: Mutex::new(replies.into_iter().map(Into::into).collect()),
            ..Default::default()
        }
    }

    /// Create a brain that gives the same reply forever.
    pub fn repeating(reply: impl Into<String>) -> Self {
        Self {
            repeat: Some(reply.into()),
            ..Default::default()
        }
    }

    /// Every request received so far, oldest first.
    pub fn requests(&self) -> Vec<CompletionRequest> {
        lock(&self.requests).clone()
    }

    /// Number of requests received so far.
    pub fn calls(&self) -> usize {
        lock(&self.requests).len()
    }

    /// Number of scripted replies not yet consumed.
    pub fn remaining(&self) -> usize {
        lock(&self.replies).len()
    }
}

// A panicking test thread must not hide the script from the others.
fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

#[async_trait]
impl Brain for ScriptedBrain {
    async fn complete(&self, request: CompletionRequest) -> Result<String, BrainError> {
        lock(&self.requests).push(request);

        if let Some(reply) = lock(&self.replies).pop_front() {
            return Ok(reply);
        }

        self.repeat
            .clone()
            .ok_or_else(|| BrainError::Unavailable("script exhausted".to_string()))
    }

    fn name(&self) -> &str {
        "ScriptedBrain"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use harmonia_core::PromptMessage;

    #[tokio::test]
    async fn test_replies_in_order_then_exhausts() {
        let brain = ScriptedBrain::new(["one", "two"]);

        assert_eq!(brain.complete(CompletionRequest::default()).await.unwrap(), "one");
        assert_eq!(brain.remaining(), 1);
        assert_eq!(brain.complete(CompletionRequest::default()).await.unwrap(), "two");

        let err = brain.complete(CompletionRequest::default()).await.unwrap_err();
        assert!(matches!(err, BrainError::Unavailable(_)));
        assert_eq!(brain.calls(), 3);
    }

    #[tokio::test]
    async fn test_repeating() {
        let brain = ScriptedBrain::repeating("chef");
        for _ in 0..5 {
            assert_eq!(brain.complete(CompletionRequest::default()).await.unwrap(), "chef");
        }
        assert_eq!(brain.calls(), 5);
    }

    #[tokio::test]
    async fn test_records_requests() {
        let brain = ScriptedBrain::new(["ok"]);
        let request = CompletionRequest::with_system("rules").message(PromptMessage::user("hi"));

        brain.complete(request.clone()).await.unwrap();

        assert_eq!(brain.requests(), vec![request]);
    }
}
