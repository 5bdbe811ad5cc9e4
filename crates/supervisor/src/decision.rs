//! Routing decisions and the label set offered to the classifier.

use std::fmt;

use harmonia_core::{Actor, ResponseSchema};
use serde_json::json;

use crate::error::SupervisorError;

/// The terminal label. It has no responder and ends the turn.
pub const TERMINATE_LABEL: &str = "FINISH";

/// The classifier's verdict for one routing step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoutingDecision {
    /// Hand control to this actor.
    Dispatch(Actor),
    /// End the turn.
    Terminate,
}

impl RoutingDecision {
    /// The wire label of this decision.
    pub fn label(&self) -> &'static str {
        match self {
            RoutingDecision::Dispatch(actor) => actor.label(),
            RoutingDecision::Terminate => TERMINATE_LABEL,
        }
    }

    /// Whether this decision ends the turn.
    pub fn is_terminal(&self) -> bool {
        matches!(self, RoutingDecision::Terminate)
    }
}

/// The options a classifier may choose from in one step: the registered
/// actors plus the terminal label.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AllowedLabels {
    actors: Vec<Actor>,
}

impl AllowedLabels {
    /// Build the allowed set from the actors that have responders.
    pub fn new(actors: impl IntoIterator<Item = Actor>) -> Self {
        let mut unique: Vec<Actor> = Vec::new();
        for actor in actors {
            if !unique.contains(&actor) {
                unique.push(actor);
            }
        }
        Self { actors: unique }
    }

    /// The actors that may be dispatched.
    pub fn actors(&self) -> &[Actor] {
        &self.actors
    }

    /// Every allowed label, terminal label first.
    pub fn labels(&self) -> Vec<&'static str> {
        std::iter::once(TERMINATE_LABEL)
            .chain(self.actors.iter().map(Actor::label))
            .collect()
    }

    /// Whether the label is one of the options.
    pub fn contains(&self, label: &str) -> bool {
        self.labels().contains(&label)
    }

    /// Turn a raw classifier label into a decision.
    ///
    /// Matching is exact. Anything outside the allowed set is a routing
    /// contract violation.
    pub fn resolve(&self, label: &str) -> Result<RoutingDecision, SupervisorError> {
        if !self.contains(label) {
            return Err(SupervisorError::RoutingContract {
                label: label.to_string(),
                allowed: self.to_string(),
            });
        }

        // Every allowed label is an actor label or the terminal label.
        Ok(match Actor::from_label(label) {
            Some(actor) => RoutingDecision::Dispatch(actor),
            None => RoutingDecision::Terminate,
        })
    }

    /// JSON schema restricting a `{"next": ...}` answer to these labels.
    pub fn schema(&self) -> ResponseSchema {
        ResponseSchema {
            name: "route".to_string(),
            schema: json!({
                "type": "object",
                "properties": {
                    "next": {
                        "type": "string",
                        "enum": self.labels(),
                        "description":
                            "Worker to route to next. If no workers needed, route to FINISH."
                    }
                },
                "required": ["next"],
                "additionalProperties": false
            }),
        }
    }
}

impl fmt::Display for AllowedLabels {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.labels().join(", "))
    }
}
