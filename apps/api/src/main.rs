mod analysis;
mod config;
mod documents;
mod editor;
mod errors;
mod llm_client;
mod models;
mod prompts;
mod report;
mod routes;
mod salary;
mod secrets;
mod session;
mod state;
mod validation;

use anyhow::Result;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::llm_client::{CompletionClient, HttpTransport};
use crate::routes::build_router;
use crate::secrets::CredentialResolver;
use crate::session::SessionStore;
use crate::state::AppState;

const SESSION_SWEEP_INTERVAL: Duration = Duration::from_secs(5 * 60);

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::from_env()?;
    init_tracing(&config);

    info!("Starting NeuroHR API v{}", env!("CARGO_PKG_VERSION"));

    // Credentials are looked up per call, so a missing key only fails the
    // requests that need it.
    let resolver = CredentialResolver::from_secrets_file(&config.secrets_file);
    info!("Secrets file: {}", config.secrets_file.display());

    let transport = Arc::new(HttpTransport::new()?);
    let client = CompletionClient::new(transport, resolver).with_timeout(config.llm_timeout);
    info!(
        "Completion client initialized (timeout: {}s)",
        config.llm_timeout.as_secs()
    );

    let sessions = SessionStore::new();
    sessions.spawn_eviction(config.session_ttl, SESSION_SWEEP_INTERVAL);
    info!("Session TTL: {}s", config.session_ttl.as_secs());

    let state = AppState {
        client,
        sessions,
        config: config.clone(),
    };

    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// `RUST_LOG` in its full directive form wins; otherwise the configured level
/// applies to this crate and the HTTP trace layer.
fn init_tracing(config: &Config) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!(
            "{crate_name}={level},tower_http={level}",
            crate_name = env!("CARGO_CRATE_NAME"),
            level = config.rust_log
        ))
    });

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();
}
