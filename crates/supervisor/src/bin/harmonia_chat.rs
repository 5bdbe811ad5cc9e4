use std::env;

use supervisor::{deliver, Harmonia, SessionId, StdoutSink};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::info;
use tracing_subscriber::EnvFilter;

fn session_id() -> Result<SessionId, Box<dyn std::error::Error>> {
    let raw = env::args()
        .nth(1)
        .or_else(|| env::var("HARMONIA_SESSION").ok())
        .ok_or("usage: harmonia-chat <session-id> (or set HARMONIA_SESSION)")?;
    Ok(SessionId::new(raw)?)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let _ = dotenvy::dotenv();
    // Logs go to stderr so they don't interleave with replies.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let session = session_id()?;
    let harmonia = Harmonia::from_env()?;
    if !harmonia.is_ready().await {
        return Err("text-generation backend is not ready".into());
    }

    info!("Chatting in session {} (Ctrl-D to quit)", session);

    let sink = StdoutSink;
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let prompt = line.trim();
        if prompt.is_empty() {
            continue;
        }
        if prompt == "/quit" {
            break;
        }

        let fragments = harmonia.ask(&session, prompt).await;
        deliver(fragments, &sink, &session).await?;
    }

    harmonia.shutdown().await?;
    Ok(())
}
