//! Supervisor routing for Harmonia's conversational agents.
//!
//! This crate provides the [`Harmonia`] facade. Each call to
//! [`Harmonia::ask`] records the user's prompt and runs a routing loop: a
//! classifier picks who acts next, that responder answers, and the loop
//! repeats until the classifier says `FINISH`.
//!
//! # Architecture
//!
//! ```text
//! ask(session, prompt)
//!          ↓
//! ┌─────────────────────────────────────────────────────────────┐
//! │                        SUPERVISOR                           │
//! │                                                             │
//! │  1. Lock the session and append the user message            │
//! │         ↓                                                   │
//! │  2. ROUTING: classifier picks a label                       │
//! │     • FINISH → stream ends                                  │
//! │     • outside the allowed set → error fragment, stream ends │
//! │         ↓                                                   │
//! │  3. DISPATCHING: responder for the label answers            │
//! │     • chef / trainer / mental_coach → domain agent          │
//! │     • chat → direct responder                               │
//! │         ↓                                                   │
//! │  4. Append the reply, yield it as a fragment, back to 2     │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! Turns are bounded by a step budget, and any failure during a turn is
//! reported as a single `Error: ...` fragment rather than a raised error.

mod agents;
mod classifier;
mod config;
mod decision;
mod error;
mod registry;
mod responder;
mod session;
mod sink;
mod supervisor;

// Public exports
pub use agents::{AgentFactory, AgentKind, DomainAgent};
pub use classifier::{
    load_supervisor_prompt, Classifier, LlmClassifier, DEFAULT_SUPERVISOR_PROMPT_FILE,
    DEFAULT_SUPERVISOR_SYSTEM_PROMPT, MEMBERS_PLACEHOLDER,
};
pub use config::{SupervisorConfig, DEFAULT_MAX_STEPS};
pub use decision::{AllowedLabels, RoutingDecision, TERMINATE_LABEL};
pub use error::SupervisorError;
pub use registry::ResponderRegistry;
pub use responder::{DirectResponder, Responder, DIRECT_PERSONA_PROMPT};
pub use session::Harmonia;
pub use sink::{deliver, FragmentSink, LoggingSink, MemorySink, StdoutSink};
pub use supervisor::{Fragment, FragmentStream, Supervisor};

// Re-export commonly used types from dependencies
pub use harmonia_core::{Actor, Message, SessionId};
pub use openai_brain::{OpenAiBrain, OpenAiBrainConfig};
