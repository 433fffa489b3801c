use std::sync::Arc;

use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::Instrument;

use crate::config::{Endpoint, SessionConfig};
use crate::connection::{run_endpoint, SessionEnd};
use crate::dispatch::CommandDispatcher;
use crate::error::Result;

/// Final result of one endpoint's session.
#[derive(Debug)]
pub struct SessionOutcome {
    pub endpoint: Endpoint,
    pub result: Result<SessionEnd>,
}

/// Runs one independent session per endpoint.
///
/// Sessions share only the configuration and the dispatcher, both read-only.
/// A failure on one endpoint is logged and leaves the others running. There
/// is no reconnect: a session that ends stays ended.
pub struct Supervisor {
    config: Arc<SessionConfig>,
    dispatcher: Arc<dyn CommandDispatcher>,
}

impl Supervisor {
    pub fn new(config: SessionConfig, dispatcher: Arc<dyn CommandDispatcher>) -> Self {
        Self {
            config: Arc::new(config),
            dispatcher,
        }
    }

    /// Run every endpoint to completion.
    ///
    /// Returns when all sessions have ended, either on their own or because
    /// `shutdown` was cancelled.
    pub async fn run(
        &self,
        endpoints: Vec<Endpoint>,
        shutdown: CancellationToken,
    ) -> Vec<SessionOutcome> {
        let mut tasks = JoinSet::new();

        for endpoint in endpoints {
            let config = Arc::clone(&self.config);
            let dispatcher = Arc::clone(&self.dispatcher);
            let shutdown = shutdown.child_token();
            let span = tracing::info_span!("session", node = %endpoint.node_id);

            tasks.spawn(
                async move {
                    let result =
                        run_endpoint(&endpoint, config, dispatcher.as_ref(), &shutdown).await;
                    match &result {
                        Ok(end) => tracing::info!(%end, "session ended"),
                        Err(err) => tracing::warn!(error = %err, "session failed"),
                    }
                    SessionOutcome { endpoint, result }
                }
                .instrument(span),
            );
        }

        let mut outcomes = Vec::with_capacity(tasks.len());
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok(outcome) => outcomes.push(outcome),
                Err(err) => tracing::error!(error = %err, "session task aborted"),
            }
        }
        outcomes
    }
}
