//! The supervisor routing loop.
//!
//! A turn alternates between asking the classifier who acts next and
//! dispatching to that actor's responder, appending each reply to the
//! session log, until the classifier answers `FINISH`.

use std::fmt;
use std::sync::Arc;

use futures::stream::{self, BoxStream, StreamExt};
use harmonia_core::{Actor, ConversationLog, Message, SessionHandle};
use tracing::{debug, info, trace, warn};

use crate::classifier::Classifier;
use crate::config::DEFAULT_MAX_STEPS;
use crate::decision::{AllowedLabels, RoutingDecision};
use crate::error::SupervisorError;
use crate::registry::ResponderRegistry;

/// One piece of a turn's output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Fragment {
    /// A responder's message, as appended to the log.
    Reply { actor: Actor, content: String },
    /// The turn failed and ended.
    Error { message: String },
}

impl Fragment {
    fn failure(error: &SupervisorError) -> Self {
        Fragment::Error {
            message: error.to_string(),
        }
    }

    /// Whether this fragment reports a failed turn.
    pub fn is_error(&self) -> bool {
        matches!(self, Fragment::Error { .. })
    }

    /// The actor that produced a reply.
    pub fn actor(&self) -> Option<Actor> {
        match self {
            Fragment::Reply { actor, .. } => Some(*actor),
            Fragment::Error { .. } => None,
        }
    }
}

impl fmt::Display for Fragment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Fragment::Reply { content, .. } => f.write_str(content),
            Fragment::Error { message } => write!(f, "Error: {}", message),
        }
    }
}

/// The fragments of one turn.
///
/// The stream owns the session lock and releases it when it is finished
/// or dropped.
pub type FragmentStream = BoxStream<'static, Fragment>;

/// Routes a conversation between registered responders.
#[derive(Clone)]
pub struct Supervisor {
    classifier: Arc<dyn Classifier>,
    registry: Arc<ResponderRegistry>,
    allowed: AllowedLabels,
    max_steps: usize,
}

impl Supervisor {
    /// Create a supervisor over the given classifier and responders.
    pub fn new(classifier: Arc<dyn Classifier>, registry: ResponderRegistry) -> Self {
        let allowed = registry.allowed();
        info!(
            classifier = classifier.name(),
            members = %allowed,
            "Supervisor initialized"
        );

        Self {
            classifier,
            registry: Arc::new(registry),
            allowed,
            max_steps: DEFAULT_MAX_STEPS,
        }
    }

    /// Set the maximum number of routing steps per turn.
    pub fn with_max_steps(mut self, max_steps: usize) -> Self {
        self.max_steps = max_steps;
        self
    }

    pub fn max_steps(&self) -> usize {
        self.max_steps
    }

    /// Labels the classifier chooses from.
    pub fn allowed(&self) -> &AllowedLabels {
        &self.allowed
    }

    /// Ask the classifier for the next decision.
    pub async fn route(
        &self,
        conversation: &ConversationLog,
    ) -> Result<RoutingDecision, SupervisorError> {
        let label = self
            .classifier
            .classify(conversation.messages(), &self.allowed)
            .await
            .map_err(SupervisorError::ClassifierFailure)?;

        trace!(label = %label, "ROUTER_LABEL");

        let decision = self.allowed.resolve(&label)?;
        info!(terminal = decision.is_terminal(), "Routing to {}", decision.label());
        Ok(decision)
    }

    /// Run one actor's responder and append its reply.
    pub async fn dispatch(
        &self,
        actor: Actor,
        conversation: &mut ConversationLog,
    ) -> Result<Fragment, SupervisorError> {
        let responder = self.registry.get(actor)?;

        let content = responder
            .respond(conversation)
            .await
            .map_err(|source| SupervisorError::ResponderFailure { actor, source })?;

        let message = Message::from_actor(actor, content.clone());
        let author = message.author.label();
        let position = conversation.append(message);
        debug!(
            author,
            delegated = actor.is_agent(),
            position,
            length = content.len(),
            "Appended responder message"
        );

        Ok(Fragment::Reply { actor, content })
    }

    /// Drive a turn over a locked session.
    ///
    /// Each poll of the returned stream runs at most one routing step and
    /// one dispatch. Failures become a single error fragment that ends the
    /// stream.
    pub fn run(&self, session: SessionHandle) -> FragmentStream {
        let turn = Turn {
            supervisor: self.clone(),
            session,
            state: LoopState::Routing,
            steps: 0,
        };

        stream::unfold(turn, |mut turn| async move {
            turn.advance().await.map(|fragment| (fragment, turn))
        })
        .boxed()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LoopState {
    Routing,
    Dispatching(Actor),
    Done,
}

/// State of one in-flight turn.
struct Turn {
    supervisor: Supervisor,
    session: SessionHandle,
    state: LoopState,
    steps: usize,
}

impl Turn {
    async fn advance(&mut self) -> Option<Fragment> {
        loop {
            match self.state {
                LoopState::Done => return None,
                LoopState::Routing => {
                    if self.steps >= self.supervisor.max_steps {
                        let exceeded = SupervisorError::IterationBudgetExceeded(self.steps);
                        return Some(self.fail(exceeded));
                    }
                    self.steps += 1;

                    match self.supervisor.route(&self.session).await {
                        Ok(RoutingDecision::Terminate) => {
                            info!(steps = self.steps, "Turn finished");
                            self.state = LoopState::Done;
                            return None;
                        }
                        Ok(RoutingDecision::Dispatch(actor)) => {
                            self.state = LoopState::Dispatching(actor);
                        }
                        Err(e) => return Some(self.fail(e)),
                    }
                }
                LoopState::Dispatching(actor) => {
                    return match self.supervisor.dispatch(actor, &mut self.session).await {
                        Ok(fragment) => {
                            self.state = LoopState::Routing;
                            Some(fragment)
                        }
                        Err(e) => Some(self.fail(e)),
                    };
                }
            }
        }
    }

    fn fail(&mut self, error: SupervisorError) -> Fragment {
        warn!(steps = self.steps, "Turn failed: {}", error);
        self.state = LoopState::Done;
        Fragment::failure(&error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agents::AgentFactory;
    use crate::classifier::LlmClassifier;
    use crate::responder::DirectResponder;
    use harmonia_core::{SessionId, SessionStore};
    use mock_brain::{EchoBrain, FailingBrain, ScriptedBrain};

    fn supervisor(router: Arc<ScriptedBrain>) -> Supervisor {
        let brain = Arc::new(EchoBrain::with_prefix("echo: "));
        let factory = AgentFactory::new(brain.clone());
        let registry = ResponderRegistry::standard(&factory, DirectResponder::new(brain));
        Supervisor::new(Arc::new(LlmClassifier::new(router)), registry)
    }

    async fn session_with(store: &SessionStore, text: &str) -> SessionHandle {
        let mut handle = store.lock(&SessionId::new("t").unwrap()).await;
        handle.append(Message::user(text));
        handle
    }

    #[test]
    fn test_fragment_display() {
        let reply = Fragment::Reply {
            actor: Actor::Chat,
            content: "hi".to_string(),
        };
        assert_eq!(reply.to_string(), "hi");
        assert_eq!(reply.actor(), Some(Actor::Chat));

        let error = Fragment::Error {
            message: "boom".to_string(),
        };
        assert_eq!(error.to_string(), "Error: boom");
        assert!(error.is_error());
    }

    #[tokio::test]
    async fn test_route_does_not_touch_log() {
        let sup = supervisor(Arc::new(ScriptedBrain::new([r#"{"next": "trainer"}"#])));
        let mut log = ConversationLog::new();
        log.append(Message::user("leg day?"));

        let decision = sup.route(&log).await.unwrap();
        assert_eq!(decision, RoutingDecision::Dispatch(Actor::Trainer));
        assert_eq!(log.len(), 1);
    }

    #[tokio::test]
    async fn test_dispatch_appends_one_message() {
        let sup = supervisor(Arc::new(ScriptedBrain::new(Vec::<String>::new())));
        let mut log = ConversationLog::new();
        log.append(Message::user("hi"));

        let fragment = sup.dispatch(Actor::Chat, &mut log).await.unwrap();
        assert_eq!(
            fragment,
            Fragment::Reply {
                actor: Actor::Chat,
                content: "echo: hi".to_string()
            }
        );
        assert_eq!(log.len(), 2);
        assert_eq!(log.last(), Some(&Message::from_actor(Actor::Chat, "echo: hi")));
    }

    #[tokio::test]
    async fn test_classifier_failure_ends_turn() {
        let brain = Arc::new(EchoBrain::new());
        let factory = AgentFactory::new(brain.clone());
        let registry = ResponderRegistry::standard(&factory, DirectResponder::new(brain));
        let router = Arc::new(FailingBrain::new("router down"));
        let sup = Supervisor::new(Arc::new(LlmClassifier::new(router)), registry);

        let store = SessionStore::new();
        let fragments: Vec<Fragment> = sup.run(session_with(&store, "hi").await).collect().await;

        assert_eq!(fragments.len(), 1);
        assert!(fragments[0].to_string().starts_with("Error: classifier failed"));
    }

    #[tokio::test]
    async fn test_zero_budget_fails_before_routing() {
        let router = Arc::new(ScriptedBrain::repeating("chat"));
        let sup = supervisor(router.clone()).with_max_steps(0);

        let store = SessionStore::new();
        let fragments: Vec<Fragment> = sup.run(session_with(&store, "hi").await).collect().await;

        assert_eq!(fragments.len(), 1);
        assert!(fragments[0].to_string().contains("iteration budget exceeded"));
        assert_eq!(router.calls(), 0);
    }
}
