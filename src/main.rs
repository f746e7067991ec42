//! Agentic QA - country facts and arithmetic question answering
//!
//! An HTTP backend that resolves free-form questions through a cascade of
//! intent stages, remembering the last country per conversation session.

mod agent;
mod api;
mod calculator;
mod config;
mod countries;
mod db;
mod memory;

use agent::Agent;
use api::{create_router, AppState};
use config::AppConfig;
use countries::CountryRegistry;
use db::Database;
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::from_env()?;

    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| config.default_log_filter().into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .json()
                .with_current_span(false)
                .with_span_list(false),
        )
        .init();

    // Ensure database directory exists
    if let Some(parent) = PathBuf::from(&config.db_path).parent() {
        std::fs::create_dir_all(parent)?;
    }

    tracing::info!(path = %config.db_path, "Opening database");
    let db = Database::open(&config.db_path)?;

    if config.api_key.is_none() {
        tracing::warn!("API_KEY not set; any non-empty X-API-Key header is accepted");
    }

    let registry = CountryRegistry::builtin();
    tracing::info!(countries = registry.len(), "Country registry loaded");
    let agent = Agent::new(registry);
    tracing::info!(stages = ?agent.stage_names(), "Agent initialized");

    let host: IpAddr = config.api_host.parse()?;
    let addr = SocketAddr::from((host, config.api_port));
    let state = AppState::new(agent, db, config);

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let app = create_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .layer(CompressionLayer::new());

    tracing::info!("Agentic QA server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;

    Ok(())
}
