//! Append-only conversation log.

use crate::message::{Message, PromptMessage};

/// Ordered, append-only message history for one session.
///
/// Messages can be read but never edited or removed; a message's position
/// is fixed once appended.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConversationLog {
    messages: Vec<Message>,
}

impl ConversationLog {
    /// Create an empty log.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a message and return its position.
    pub fn append(&mut self, message: Message) -> usize {
        self.messages.push(message);
        self.messages.len() - 1
    }

    /// All messages in turn order.
    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    /// Number of messages.
    pub fn len(&self) -> usize {
        self.messages.len()
    }

    /// Whether nothing has been appended yet.
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// The most recently appended message.
    pub fn last(&self) -> Option<&Message> {
        self.messages.last()
    }

    /// The most recent message written by the user.
    pub fn latest_user(&self) -> Option<&Message> {
        self.messages.iter().rev().find(|m| m.is_user())
    }

    /// The whole log in prompt form.
    pub fn to_prompt(&self) -> Vec<PromptMessage> {
        self.messages.iter().map(Message::to_prompt).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actor::Actor;

    #[test]
    fn test_append_returns_position() {
        let mut log = ConversationLog::new();
        assert!(log.is_empty());

        assert_eq!(log.append(Message::user("hello")), 0);
        assert_eq!(log.append(Message::from_actor(Actor::Chat, "hi")), 1);
        assert_eq!(log.len(), 2);
        assert_eq!(log.messages()[0].content, "hello");
        assert_eq!(log.last().map(|m| m.content.as_str()), Some("hi"));
    }

    #[test]
    fn test_latest_user_skips_actor_messages() {
        let mut log = ConversationLog::new();
        log.append(Message::user("first"));
        log.append(Message::from_actor(Actor::Chef, "pasta"));
        log.append(Message::user("second"));
        log.append(Message::from_actor(Actor::Trainer, "squats"));

        assert_eq!(log.latest_user().map(|m| m.content.as_str()), Some("second"));
    }

    #[test]
    fn test_to_prompt_preserves_order() {
        let mut log = ConversationLog::new();
        log.append(Message::user("a"));
        log.append(Message::from_actor(Actor::Chat, "b"));

        let prompt = log.to_prompt();
        assert_eq!(prompt.len(), 2);
        assert_eq!(prompt[0].content, "a");
        assert_eq!(prompt[1].content, "b");
    }
}
