//! Conversation messages and the prompt messages sent to a brain.

use serde::{Deserialize, Serialize};

use crate::actor::Actor;

/// Who wrote a message in the conversation log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Author {
    /// The human on the other end of the session.
    User,
    /// A dispatched actor.
    Actor(Actor),
}

impl Author {
    /// Label used when rendering the log, e.g. `user:hello`.
    pub fn label(&self) -> &'static str {
        match self {
            Author::User => "user",
            Author::Actor(actor) => actor.label(),
        }
    }
}

/// A single authored entry in a conversation log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    /// Who wrote the message.
    pub author: Author,
    /// Message content.
    pub content: String,
}

impl Message {
    /// Create a message written by the user.
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            author: Author::User,
            content: content.into(),
        }
    }

    /// Create a message written by an actor.
    pub fn from_actor(actor: Actor, content: impl Into<String>) -> Self {
        Self {
            author: Author::Actor(actor),
            content: content.into(),
        }
    }

    /// Whether the user wrote this message.
    pub fn is_user(&self) -> bool {
        self.author == Author::User
    }

    /// Convert to the prompt form a brain consumes.
    ///
    /// Actor output is replayed as assistant turns tagged with the actor's
    /// label so the model can tell the agents apart.
    pub fn to_prompt(&self) -> PromptMessage {
        match self.author {
            Author::User => PromptMessage::user(self.content.clone()),
            Author::Actor(actor) => {
                PromptMessage::assistant(self.content.clone()).with_name(actor.label())
            }
        }
    }
}

/// Role of a prompt message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

/// A message in a completion request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PromptMessage {
    /// Role: system, user or assistant
    pub role: Role,
    /// Message content
    pub content: String,
    /// Optional participant name
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl PromptMessage {
    /// Create a system message.
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
            name: None,
        }
    }

    /// Create a user message.
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
            name: None,
        }
    }

    /// Create an assistant message.
    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
            name: None,
        }
    }

    /// Tag the message with a participant name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_message_to_prompt() {
        let prompt = Message::user("hello").to_prompt();
        assert_eq!(prompt.role, Role::User);
        assert_eq!(prompt.content, "hello");
        assert!(prompt.name.is_none());
    }

    #[test]
    fn test_actor_message_to_prompt() {
        let prompt = Message::from_actor(Actor::MentalCoach, "breathe").to_prompt();
        assert_eq!(prompt.role, Role::Assistant);
        assert_eq!(prompt.name.as_deref(), Some("mental_coach"));
    }

    #[test]
    fn test_author_labels() {
        assert_eq!(Author::User.label(), "user");
        assert_eq!(Author::Actor(Actor::Chat).label(), "chat");
        assert!(Message::user("x").is_user());
        assert!(!Message::from_actor(Actor::Chef, "x").is_user());
    }

    #[test]
    fn test_prompt_message_serialization_skips_empty_name() {
        let json = serde_json::to_value(PromptMessage::system("rules")).unwrap();
        assert_eq!(json["role"], "system");
        assert!(json.get("name").is_none());
    }
}
