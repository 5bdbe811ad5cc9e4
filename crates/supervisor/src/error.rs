//! Error types for supervisor operations.

use harmonia_core::{Actor, BrainError, InvalidSessionId};
use thiserror::Error;

/// Errors that can occur while routing a turn or starting the supervisor.
///
/// Only [`SupervisorError::Configuration`] and [`SupervisorError::Brain`]
/// escape to callers, at startup. Everything raised during a turn is turned
/// into an error fragment by the supervisor loop.
#[derive(Debug, Error)]
pub enum SupervisorError {
    /// Missing or invalid startup configuration.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// The classifier chose a label outside the allowed set.
    #[error(
        "routing contract violated: classifier returned '{label}', expected one of [{allowed}]"
    )]
    RoutingContract { label: String, allowed: String },

    /// No responder is registered for the chosen actor.
    #[error("unknown actor: no responder registered for '{0}'")]
    UnknownActor(Actor),

    /// The classifier itself failed.
    #[error("classifier failed: {0}")]
    ClassifierFailure(#[source] BrainError),

    /// A dispatched responder failed.
    #[error("responder '{actor}' failed: {source}")]
    ResponderFailure {
        actor: Actor,
        #[source]
        source: BrainError,
    },

    /// The loop hit its step bound before the classifier said FINISH.
    #[error("iteration budget exceeded: no FINISH after {0} routing steps")]
    IterationBudgetExceeded(usize),

    /// The session id was empty.
    #[error("invalid session: {0}")]
    InvalidSession(#[from] InvalidSessionId),

    /// Rendering a fragment failed.
    #[error("output error: {0}")]
    Output(#[from] std::io::Error),

    /// Brain construction failed.
    #[error("brain error: {0}")]
    Brain(#[from] BrainError),
}
