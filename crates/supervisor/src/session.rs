//! The session facade: the single entry point for a conversation turn.

use std::sync::Arc;

use harmonia_core::{Brain, BrainError, Message, SessionId, SessionStore};
use openai_brain::OpenAiBrain;
use tracing::info;

use crate::agents::AgentFactory;
use crate::classifier::LlmClassifier;
use crate::config::SupervisorConfig;
use crate::error::SupervisorError;
use crate::registry::ResponderRegistry;
use crate::responder::DirectResponder;
use crate::supervisor::{FragmentStream, Supervisor};

/// Routed conversations keyed by session id.
///
/// # Example
///
/// ```rust,no_run
/// use futures::StreamExt;
/// use harmonia_core::SessionId;
/// use supervisor::Harmonia;
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let harmonia = Harmonia::from_env()?;
///     let session = SessionId::new("s1")?;
///
///     let mut fragments = harmonia.ask(&session, "hello").await;
///     while let Some(fragment) = fragments.next().await {
///         println!("{}", fragment);
///     }
///     Ok(())
/// }
/// ```
pub struct Harmonia {
    supervisor: Supervisor,
    sessions: SessionStore,
    brain: Option<Arc<dyn Brain>>,
}

impl Harmonia {
    /// Assemble a facade from an already built supervisor and store.
    pub fn new(supervisor: Supervisor, sessions: SessionStore) -> Self {
        Self {
            supervisor,
            sessions,
            brain: None,
        }
    }

    /// Build the standard setup where routing and every responder share
    /// one brain.
    pub fn with_brain(brain: Arc<dyn Brain>, config: SupervisorConfig) -> Self {
        let factory = AgentFactory::new(brain.clone());
        let direct = DirectResponder::new(brain.clone()).with_include_date(config.include_date);
        let registry = ResponderRegistry::standard(&factory, direct);
        let classifier = LlmClassifier::new(brain.clone());

        let supervisor =
            Supervisor::new(Arc::new(classifier), registry).with_max_steps(config.max_steps);
        let sessions = match config.max_sessions {
            Some(max) => SessionStore::with_max_sessions(max),
            None => SessionStore::new(),
        };

        info!(
            brain = brain.name(),
            max_steps = config.max_steps,
            max_sessions = ?config.max_sessions,
            "Harmonia initialized"
        );

        Self {
            supervisor,
            sessions,
            brain: Some(brain),
        }
    }

    /// Build from environment variables using the OpenAI brain.
    ///
    /// A missing `OPENAI_API_KEY` is a configuration error.
    pub fn from_env() -> Result<Self, SupervisorError> {
        let config = SupervisorConfig::from_env()?;
        let brain = OpenAiBrain::from_env().map_err(|e| match e {
            BrainError::Configuration(msg) => SupervisorError::Configuration(msg),
            other => SupervisorError::Brain(other),
        })?;

        Ok(Self::with_brain(Arc::new(brain), config))
    }

    /// Run one turn: record `prompt` as a user message and route.
    ///
    /// Waits for any in-flight turn on the same session. The session stays
    /// locked until the returned stream is exhausted or dropped.
    pub async fn ask(&self, session: &SessionId, prompt: impl Into<String>) -> FragmentStream {
        let mut log = self.sessions.lock(session).await;
        let position = log.append(Message::user(prompt));
        info!(session = %session, position, "Received prompt");

        self.supervisor.run(log)
    }

    /// Snapshot of a session's messages.
    pub async fn history(&self, session: &SessionId) -> Vec<Message> {
        self.sessions.history(session).await
    }

    /// Number of sessions being tracked.
    pub async fn session_count(&self) -> usize {
        self.sessions.len().await
    }

    pub fn supervisor(&self) -> &Supervisor {
        &self.supervisor
    }

    /// Whether the backing brain can take requests.
    pub async fn is_ready(&self) -> bool {
        match &self.brain {
            Some(brain) => brain.is_ready().await,
            None => true,
        }
    }

    /// Shut down the backing brain.
    pub async fn shutdown(&self) -> Result<(), SupervisorError> {
        if let Some(brain) = &self.brain {
            info!("Shutting down {}", brain.name());
            brain.shutdown().await?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::supervisor::Fragment;
    use futures::StreamExt;
    use mock_brain::{FailingBrain, ScriptedBrain};

    fn config() -> SupervisorConfig {
        SupervisorConfig::default().with_include_date(false)
    }

    #[tokio::test]
    async fn test_shared_brain_routes_and_answers() {
        // Router, then the chat responder, then the router again.
        let brain = Arc::new(ScriptedBrain::new([
            r#"{"next": "chat"}"#,
            "Hello! How can I help?",
            r#"{"next": "FINISH"}"#,
        ]));
        let harmonia = Harmonia::with_brain(brain.clone(), config());
        let session = SessionId::new("s1").unwrap();

        let fragments: Vec<Fragment> = harmonia.ask(&session, "hello").await.collect().await;
        assert_eq!(
            fragments,
            vec![Fragment::Reply {
                actor: harmonia_core::Actor::Chat,
                content: "Hello! How can I help?".to_string()
            }]
        );
        assert_eq!(harmonia.history(&session).await.len(), 2);
        assert_eq!(harmonia.session_count().await, 1);
        assert_eq!(brain.remaining(), 0);
    }

    #[test]
    fn test_from_env_requires_api_key() {
        let _guard = crate::config::env_lock();
        crate::config::clear_tuning_env();
        std::env::remove_var("OPENAI_API_KEY");

        assert!(matches!(
            Harmonia::from_env(),
            Err(SupervisorError::Configuration(msg)) if msg.contains("OPENAI_API_KEY")
        ));
    }

    #[tokio::test]
    async fn test_readiness_follows_brain() {
        let idle = Arc::new(ScriptedBrain::new(Vec::<String>::new()));
        let ready = Harmonia::with_brain(idle, config());
        assert!(ready.is_ready().await);
        assert!(ready.shutdown().await.is_ok());

        let broken = Harmonia::with_brain(Arc::new(FailingBrain::new("offline")), config());
        assert!(!broken.is_ready().await);
    }

    #[tokio::test]
    async fn test_session_cap_from_config() {
        let brain = Arc::new(ScriptedBrain::repeating(r#"{"next": "FINISH"}"#));
        let harmonia = Harmonia::with_brain(brain, config().with_max_sessions(1));

        for id in ["a", "b"] {
            let session = SessionId::new(id).unwrap();
            let fragments: Vec<Fragment> = harmonia.ask(&session, "hi").await.collect().await;
            assert!(fragments.is_empty());
        }

        assert_eq!(harmonia.session_count().await, 1);
        assert!(harmonia.history(&SessionId::new("a").unwrap()).await.is_empty());
    }
}
