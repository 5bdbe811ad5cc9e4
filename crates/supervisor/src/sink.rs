//! Fragment sinks: where a turn's output goes.

use std::sync::Mutex;

use async_trait::async_trait;
use futures::StreamExt;
use harmonia_core::SessionId;
use tokio::io::AsyncWriteExt;

use crate::error::SupervisorError;
use crate::supervisor::{Fragment, FragmentStream};

/// Renders fragments for a front end.
///
/// Abstracted to support different front ends (terminal, logs, tests).
#[async_trait]
pub trait FragmentSink: Send + Sync {
    /// Render one fragment of a session's turn.
    async fn render(&self, session: &SessionId, fragment: &Fragment) -> Result<(), SupervisorError>;

    /// Called once the turn's stream has ended.
    ///
    /// Default implementation does nothing.
    async fn finish(&self, _session: &SessionId) -> Result<(), SupervisorError> {
        Ok(())
    }
}

/// Feed every fragment of a turn into a sink.
///
/// Returns the number of fragments delivered.
pub async fn deliver(
    mut fragments: FragmentStream,
    sink: &dyn FragmentSink,
    session: &SessionId,
) -> Result<usize, SupervisorError> {
    let mut delivered = 0;
    while let Some(fragment) = fragments.next().await {
        sink.render(session, &fragment).await?;
        delivered += 1;
    }
    sink.finish(session).await?;
    Ok(delivered)
}

/// Writes fragments to standard output, one line per fragment.
#[derive(Debug, Clone, Default)]
pub struct StdoutSink;

impl StdoutSink {
    /// The line printed for a fragment.
    pub fn format(fragment: &Fragment) -> String {
        match fragment.actor() {
            Some(actor) => format!("[{}] {}\n", actor, fragment),
            None => format!("{}\n", fragment),
        }
    }
}

#[async_trait]
impl FragmentSink for StdoutSink {
    async fn render(
        &self,
        _session: &SessionId,
        fragment: &Fragment,
    ) -> Result<(), SupervisorError> {
        let mut stdout = tokio::io::stdout();
        stdout.write_all(Self::format(fragment).as_bytes()).await?;
        stdout.flush().await?;
        Ok(())
    }
}

/// A sink for debugging that logs every fragment.
#[derive(Debug, Clone, Default)]
pub struct LoggingSink;

#[async_trait]
impl FragmentSink for LoggingSink {
    async fn render(
        &self,
        session: &SessionId,
        fragment: &Fragment,
    ) -> Result<(), SupervisorError> {
        match fragment {
            Fragment::Reply { actor, content } => {
                tracing::info!("[{}] {} says: {}", session, actor, content);
            }
            Fragment::Error { message } => {
                tracing::warn!("[{}] Turn failed: {}", session, message);
            }
        }
        Ok(())
    }

    async fn finish(&self, session: &SessionId) -> Result<(), SupervisorError> {
        tracing::info!("[{}] Turn complete", session);
        Ok(())
    }
}

/// Keeps rendered fragments in memory.
#[derive(Debug, Default)]
pub struct MemorySink {
    lines: Mutex<Vec<String>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Everything rendered so far.
    pub fn lines(&self) -> Vec<String> {
        match self.lines.lock() {
            Ok(lines) => lines.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }
}

#[async_trait]
impl FragmentSink for MemorySink {
    async fn render(
        &self,
        _session: &SessionId,
        fragment: &Fragment,
    ) -> Result<(), SupervisorError> {
        let mut lines = match self.lines.lock() {
            Ok(lines) => lines,
            Err(poisoned) => poisoned.into_inner(),
        };
        lines.push(fragment.to_string());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::stream;
    use harmonia_core::Actor;

    fn session() -> SessionId {
        SessionId::new("sink-test").unwrap()
    }

    fn fragments() -> Vec<Fragment> {
        vec![
            Fragment::Reply {
                actor: Actor::Chef,
                content: "Pasta tonight.".to_string(),
            },
            Fragment::Error {
                message: "responder 'trainer' failed".to_string(),
            },
        ]
    }

    #[test]
    fn test_stdout_format() {
        let [reply, error]: [Fragment; 2] = fragments().try_into().unwrap();
        assert_eq!(StdoutSink::format(&reply), "[chef] Pasta tonight.\n");
        assert_eq!(
            StdoutSink::format(&error),
            "Error: responder 'trainer' failed\n"
        );
    }

    #[tokio::test]
    async fn test_deliver_in_order() {
        let sink = MemorySink::new();
        let delivered = deliver(stream::iter(fragments()).boxed(), &sink, &session())
            .await
            .unwrap();

        assert_eq!(delivered, 2);
        assert_eq!(
            sink.lines(),
            vec!["Pasta tonight.", "Error: responder 'trainer' failed"]
        );
    }

    #[tokio::test]
    async fn test_logging_sink() {
        let sink = LoggingSink;

        // Should not error
        let delivered = deliver(stream::iter(fragments()).boxed(), &sink, &session())
            .await
            .unwrap();
        assert_eq!(delivered, 2);
    }

    #[tokio::test]
    async fn test_stdout_sink() {
        let sink = StdoutSink;
        for fragment in fragments() {
            sink.render(&session(), &fragment).await.unwrap();
        }
    }
}
