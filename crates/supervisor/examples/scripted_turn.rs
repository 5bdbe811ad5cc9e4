//! Example: one routed turn without a network backend.
//!
//! The router and the agents run on scripted mock brains, so this shows the
//! supervisor loop end to end without an API key.
//!
//! Run with: cargo run -p supervisor --example scripted_turn

use std::sync::Arc;

use harmonia_core::SessionStore;
use mock_brain::{EchoBrain, ScriptedBrain};
use supervisor::{
    deliver, AgentFactory, DirectResponder, Harmonia, LlmClassifier, ResponderRegistry,
    SessionId, StdoutSink, Supervisor,
};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt::init();

    // The router first hands the turn to the chef, then to chat, then stops.
    let router = Arc::new(ScriptedBrain::new([
        r#"{"next": "chef"}"#,
        r#"{"next": "chat"}"#,
        r#"{"next": "FINISH"}"#,
    ]));
    let agents = Arc::new(EchoBrain::with_prefix("Heard you: "));

    let factory = AgentFactory::new(agents.clone());
    let registry = ResponderRegistry::standard(&factory, DirectResponder::new(agents));
    let supervisor = Supervisor::new(Arc::new(LlmClassifier::new(router)), registry);
    let harmonia = Harmonia::new(supervisor, SessionStore::new());

    let session = SessionId::new("demo")?;
    let fragments = harmonia.ask(&session, "What should I cook tonight?").await;
    let delivered = deliver(fragments, &StdoutSink, &session).await?;

    let logged = harmonia.history(&session).await.len();
    println!("{} fragments, {} messages in the log", delivered, logged);
    Ok(())
}
