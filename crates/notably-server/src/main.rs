mod auth;
mod configuration;
mod error;
mod routes;
mod state;

use notably::{notes::InMemoryNoteStore, providers::openai::OpenAiProvider, relay::Relay};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let settings = configuration::Settings::new()?;
    let addr = settings.server.socket_addr()?;
    let identity_header = settings.server.identity_header()?;

    let config = settings.provider.into_config();
    if config.api_key.as_deref().map_or(true, |key| key.trim().is_empty()) {
        warn!("no OpenAI API key configured, enhancement requests will fail");
    }
    info!(model = %config.model, host = %config.host, "using OpenAI provider");
    let provider = OpenAiProvider::new(config)?;

    let state = state::AppState::new(
        Relay::new(Box::new(provider)),
        Arc::new(InMemoryNoteStore::new()),
        identity_header,
    );

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let app = routes::configure(state)
        .layer(TraceLayer::new_for_http())
        .layer(cors);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("listening on {}", listener.local_addr()?);
    axum::serve(listener, app).await?;
    Ok(())
}
