//! Mapping from actor to responder.

use harmonia_core::Actor;
use indexmap::IndexMap;
use tracing::debug;

use crate::agents::{AgentFactory, AgentKind};
use crate::decision::AllowedLabels;
use crate::error::SupervisorError;
use crate::responder::{DirectResponder, Responder};

/// Which responder handles which actor.
///
/// The set of registered actors is exactly the set of labels the
/// classifier may choose from, besides the terminal label.
#[derive(Clone, Default)]
pub struct ResponderRegistry {
    responders: IndexMap<Actor, Responder>,
}

impl ResponderRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// The standard set: every domain agent plus the direct responder.
    pub fn standard(factory: &AgentFactory, direct: DirectResponder) -> Self {
        let mut registry = Self::new();
        for kind in Actor::ALL.into_iter().filter_map(AgentKind::from_actor) {
            registry.register(kind.actor(), factory.create(kind));
        }
        registry.register(DirectResponder::ACTOR, direct);
        registry
    }

    /// Register a responder, replacing any previous one for the actor.
    pub fn register(&mut self, actor: Actor, responder: impl Into<Responder>) -> &mut Self {
        debug!(actor = %actor, "Registering responder");
        self.responders.insert(actor, responder.into());
        self
    }

    /// Look up the responder for an actor.
    pub fn get(&self, actor: Actor) -> Result<&Responder, SupervisorError> {
        self.responders
            .get(&actor)
            .ok_or(SupervisorError::UnknownActor(actor))
    }

    pub fn has(&self, actor: Actor) -> bool {
        self.responders.contains_key(&actor)
    }

    /// Registered actors in registration order.
    pub fn actors(&self) -> impl Iterator<Item = Actor> + '_ {
        self.responders.keys().copied()
    }

    /// Labels of the registered actors in registration order.
    pub fn labels(&self) -> Vec<&'static str> {
        self.responders.keys().map(Actor::label).collect()
    }

    /// Labels the classifier may choose from.
    pub fn allowed(&self) -> AllowedLabels {
        AllowedLabels::new(self.actors())
    }

    pub fn len(&self) -> usize {
        self.responders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.responders.is_empty()
    }
}
