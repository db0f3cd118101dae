//! Hosts a participant's engine over HTTP so another process can reach it
//! through [`crate::channel::HttpChannel`].

mod routes;

pub use routes::create_router;

use std::sync::Arc;

use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tracing::info;

use crate::engine::ReasoningEngine;

/// Identity advertised at `/.well-known/agent.json`
#[derive(Debug, Clone)]
pub struct AgentCard {
    pub name: String,
    pub description: String,
    pub url: String,
}

#[derive(Clone)]
pub struct ServerState {
    pub engine: Arc<dyn ReasoningEngine>,
    pub card: Arc<AgentCard>,
}

impl ServerState {
    pub fn new(engine: Arc<dyn ReasoningEngine>, card: AgentCard) -> Self {
        Self {
            engine,
            card: Arc::new(card),
        }
    }
}

/// Serve until `shutdown` is cancelled
pub async fn serve(
    listener: TcpListener,
    state: ServerState,
    shutdown: CancellationToken,
) -> std::io::Result<()> {
    let addr = listener.local_addr()?;
    info!("{} listening on http://{}", state.card.name, addr);

    let app = create_router(state);
    axum::serve(listener, app)
        .with_graceful_shutdown(async move { shutdown.cancelled().await })
        .await
}
