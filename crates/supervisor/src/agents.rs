//! Domain agents and the factory that builds them.

use std::sync::{Arc, OnceLock};

use harmonia_core::{Actor, Brain, BrainError, CompletionRequest, ConversationLog, ToolSpec};
use tracing::{debug, info};

/// The delegated domain agents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AgentKind {
    Chef,
    Trainer,
    MentalCoach,
}

impl AgentKind {
    /// Every agent kind.
    pub const ALL: [AgentKind; 3] = [AgentKind::Chef, AgentKind::Trainer, AgentKind::MentalCoach];

    /// The actor this agent answers as.
    pub fn actor(&self) -> Actor {
        match self {
            AgentKind::Chef => Actor::Chef,
            AgentKind::Trainer => Actor::Trainer,
            AgentKind::MentalCoach => Actor::MentalCoach,
        }
    }

    /// The agent behind an actor, if the actor is an agent.
    pub fn from_actor(actor: Actor) -> Option<Self> {
        match actor {
            Actor::Chef => Some(AgentKind::Chef),
            Actor::Trainer => Some(AgentKind::Trainer),
            Actor::MentalCoach => Some(AgentKind::MentalCoach),
            Actor::Chat => None,
        }
    }

    /// The agent's standing instruction.
    pub fn system_prompt(&self) -> &'static str {
        match self {
            AgentKind::Chef => {
                "You are a personal chef. Suggest recipes, meal plans and cooking techniques \
                 that fit the user's tastes, time and dietary needs."
            }
            AgentKind::Trainer => {
                "You are a personal trainer. Design safe, progressive workouts and explain \
                 exercises clearly, adapting to the user's level and goals."
            }
            AgentKind::MentalCoach => {
                "You are a mental coach. Help the user with motivation, stress and mindset \
                 using practical, encouraging advice."
            }
        }
    }

    fn index(&self) -> usize {
        match self {
            AgentKind::Chef => 0,
            AgentKind::Trainer => 1,
            AgentKind::MentalCoach => 2,
        }
    }
}

/// A delegated agent: a standing instruction and a tool set in front of a
/// brain.
pub struct DomainAgent {
    kind: AgentKind,
    tools: Vec<ToolSpec>,
    brain: Arc<dyn Brain>,
}

impl DomainAgent {
    /// Which agent this is.
    pub fn kind(&self) -> AgentKind {
        self.kind
    }

    /// Tools advertised to the model.
    pub fn tools(&self) -> &[ToolSpec] {
        &self.tools
    }

    /// Produce this agent's contribution to the conversation.
    pub async fn respond(&self, conversation: &ConversationLog) -> Result<String, BrainError> {
        let request = CompletionRequest::with_system(self.kind.system_prompt())
            .messages(conversation.to_prompt())
            .tools(self.tools.iter().cloned());

        debug!(
            agent = %self.kind.actor(),
            messages = conversation.len(),
            tools = self.tools.len(),
            "Agent responding"
        );

        self.brain.complete(request).await
    }
}

/// Builds domain agents, at most once per kind.
///
/// Tool sets are fixed when the factory is created; agents are built
/// lazily on first request and shared afterwards.
pub struct AgentFactory {
    brain: Arc<dyn Brain>,
    toolsets: [Vec<ToolSpec>; 3],
    agents: [OnceLock<Arc<DomainAgent>>; 3],
}

impl AgentFactory {
    /// Create a factory whose agents all use `brain`.
    pub fn new(brain: Arc<dyn Brain>) -> Self {
        Self {
            brain,
            toolsets: Self::initialize_tools(),
            agents: Default::default(),
        }
    }

    /// Replace the tool set of one agent kind.
    pub fn with_tools(mut self, kind: AgentKind, tools: Vec<ToolSpec>) -> Self {
        self.toolsets[kind.index()] = tools;
        self
    }

    // No agent has real tools yet.
    fn initialize_tools() -> [Vec<ToolSpec>; 3] {
        [Vec::new(), Vec::new(), Vec::new()]
    }

    /// Get the agent of this kind, building it on first use.
    pub fn create(&self, kind: AgentKind) -> Arc<DomainAgent> {
        self.agents[kind.index()]
            .get_or_init(|| {
                info!("Creating {} agent", kind.actor());
                Arc::new(DomainAgent {
                    kind,
                    tools: self.toolsets[kind.index()].clone(),
                    brain: self.brain.clone(),
                })
            })
            .clone()
    }

    /// Number of agents built so far.
    pub fn created(&self) -> usize {
        self.agents.iter().filter(|slot| slot.get().is_some()).count()
    }
}
