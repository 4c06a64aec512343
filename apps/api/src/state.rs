use crate::config::Config;
use crate::llm_client::CompletionClient;
use crate::session::SessionStore;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    /// Every stage goes through this client.
    pub client: CompletionClient,
    pub sessions: SessionStore,
    pub config: Config,
}
