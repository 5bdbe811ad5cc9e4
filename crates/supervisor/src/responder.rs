//! Responders: the things a routing decision can dispatch to.

use std::sync::Arc;

use chrono::{Local, NaiveDate};
use harmonia_core::{Actor, Brain, BrainError, CompletionRequest, ConversationLog, PromptMessage};

use crate::agents::DomainAgent;

/// Persona used by the direct responder.
pub const DIRECT_PERSONA_PROMPT: &str = "You are Harmonia, a conversational AI assistant. \
You help the user with simple conversation, answer questions and provide information. \
Keep a friendly and professional tone and stay positive and helpful.";

/// Answers the latest user message itself, without delegating.
///
/// The direct responder sees only the most recent user message, never the
/// rest of the log.
pub struct DirectResponder {
    brain: Arc<dyn Brain>,
    include_date: bool,
}

impl DirectResponder {
    /// The actor the direct responder answers as.
    pub const ACTOR: Actor = Actor::Chat;

    pub fn new(brain: Arc<dyn Brain>) -> Self {
        Self {
            brain,
            include_date: true,
        }
    }

    /// Whether to tell the model today's date.
    pub fn with_include_date(mut self, include_date: bool) -> Self {
        self.include_date = include_date;
        self
    }

    /// The system instruction for a given day.
    pub fn instruction(&self, today: Option<NaiveDate>) -> String {
        match today {
            Some(date) => format!(
                "{}\n\nToday's date is {}.",
                DIRECT_PERSONA_PROMPT,
                date.format("%Y-%m-%d")
            ),
            None => DIRECT_PERSONA_PROMPT.to_string(),
        }
    }

    pub async fn respond(&self, conversation: &ConversationLog) -> Result<String, BrainError> {
        let latest = conversation
            .latest_user()
            .map(|m| m.content.clone())
            .unwrap_or_default();
        let today = self.include_date.then(|| Local::now().date_naive());

        let request = CompletionRequest::with_system(self.instruction(today))
            .message(PromptMessage::user(latest));

        self.brain.complete(request).await
    }
}

/// Anything the supervisor can dispatch a turn step to.
#[derive(Clone)]
pub enum Responder {
    /// A delegated domain agent.
    Agent(Arc<DomainAgent>),
    /// The supervisor answering directly.
    Direct(Arc<DirectResponder>),
}

impl Responder {
    /// Produce the next message content for the conversation.
    ///
    /// Responders only read the log; the supervisor appends what they
    /// return.
    pub async fn respond(&self, conversation: &ConversationLog) -> Result<String, BrainError> {
        match self {
            Responder::Agent(agent) => agent.respond(conversation).await,
            Responder::Direct(direct) => direct.respond(conversation).await,
        }
    }

    /// The actor this responder speaks as.
    pub fn actor(&self) -> Actor {
        match self {
            Responder::Agent(agent) => agent.kind().actor(),
            Responder::Direct(_) => DirectResponder::ACTOR,
        }
    }
}

impl From<Arc<DomainAgent>> for Responder {
    fn from(agent: Arc<DomainAgent>) -> Self {
        Responder::Agent(agent)
    }
}

impl From<DirectResponder> for Responder {
    fn from(direct: DirectResponder) -> Self {
        Responder::Direct(Arc::new(direct))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use harmonia_core::{Message, Role};
    use mock_brain::{EchoBrain, ScriptedBrain};

    #[test]
    fn test_instruction_with_and_without_date() {
        let direct = DirectResponder::new(Arc::new(EchoBrain::new()));
        let date = NaiveDate::from_ymd_opt(2024, 3, 9).unwrap();

        let dated = direct.instruction(Some(date));
        assert!(dated.starts_with(DIRECT_PERSONA_PROMPT));
        assert!(dated.ends_with("Today's date is 2024-03-09."));

        assert_eq!(direct.instruction(None), DIRECT_PERSONA_PROMPT);
    }

    #[tokio::test]
    async fn test_direct_sees_only_latest_user_message() {
        let brain = Arc::new(ScriptedBrain::new(["Hi there!"]));
        let direct = DirectResponder::new(brain.clone()).with_include_date(false);

        let mut log = ConversationLog::new();
        log.append(Message::user("first question"));
        log.append(Message::from_actor(Actor::Chef, "an answer"));
        log.append(Message::user("hello"));

        assert_eq!(direct.respond(&log).await.unwrap(), "Hi there!");

        let request = &brain.requests()[0];
        assert_eq!(request.messages.len(), 2);
        assert_eq!(request.messages[0].role, Role::System);
        assert_eq!(request.messages[0].content, DIRECT_PERSONA_PROMPT);
        assert_eq!(request.messages[1].role, Role::User);
        assert_eq!(request.messages[1].content, "hello");
    }

    #[tokio::test]
    async fn test_direct_includes_date_by_default() {
        let brain = Arc::new(ScriptedBrain::new(["ok"]));
        let direct = DirectResponder::new(brain.clone());

        let mut log = ConversationLog::new();
        log.append(Message::user("what day is it?"));
        direct.respond(&log).await.unwrap();

        let system = brain.requests()[0].system_prompt().unwrap_or_default().to_string();
        assert!(system.contains("Today's date is"));
    }

    #[tokio::test]
    async fn test_responder_actor() {
        let responder = Responder::from(DirectResponder::new(Arc::new(EchoBrain::new())));
        assert_eq!(responder.actor(), Actor::Chat);

        let mut log = ConversationLog::new();
        log.append(Message::user("ping"));
        assert_eq!(responder.respond(&log).await.unwrap(), "ping");
    }
}
