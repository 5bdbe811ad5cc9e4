//! The closed set of actors a supervisor can dispatch to.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A named participant that produces conversation content when dispatched.
///
/// Adding an actor is a compile-time change: every `match` over this enum
/// must handle it, and the registry maps each variant to a responder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Actor {
    /// Personal chef agent.
    Chef,
    /// Personal trainer agent.
    Trainer,
    /// Mental coach agent.
    MentalCoach,
    /// Direct conversational responder.
    Chat,
}

impl Actor {
    /// Every actor, in the order they are offered to the classifier.
    pub const ALL: [Actor; 4] = [Actor::Chef, Actor::Trainer, Actor::MentalCoach, Actor::Chat];

    /// The wire label used in routing decisions and message authorship.
    pub fn label(&self) -> &'static str {
        match self {
            Actor::Chef => "chef",
            Actor::Trainer => "trainer",
            Actor::MentalCoach => "mental_coach",
            Actor::Chat => "chat",
        }
    }

    /// Look up an actor by its exact wire label.
    pub fn from_label(label: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|actor| actor.label() == label)
    }

    /// Whether this actor is a delegated domain agent (as opposed to the
    /// direct chat responder).
    pub fn is_agent(&self) -> bool {
        !matches!(self, Actor::Chat)
    }
}

impl fmt::Display for Actor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_labels_round_trip() {
        for actor in Actor::ALL {
            assert_eq!(Actor::from_label(actor.label()), Some(actor));
        }
    }

    #[test]
    fn test_from_label_is_exact() {
        assert_eq!(Actor::from_label("mental_coach"), Some(Actor::MentalCoach));
        assert_eq!(Actor::from_label("Chef"), None);
        assert_eq!(Actor::from_label(" chef"), None);
        assert_eq!(Actor::from_label("FINISH"), None);
    }

    #[test]
    fn test_serde_uses_labels() {
        let json = serde_json::to_string(&Actor::MentalCoach).unwrap();
        assert_eq!(json, "\"mental_coach\"");
    }

    #[test]
    fn test_only_chat_is_not_an_agent() {
        assert!(Actor::Chef.is_agent());
        assert!(Actor::Trainer.is_agent());
        assert!(Actor::MentalCoach.is_agent());
        assert!(!Actor::Chat.is_agent());
    }
}
