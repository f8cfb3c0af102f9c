// Main entry point - Dependency injection and server setup
mod application;
mod domain;
mod infrastructure;
mod presentation;

use std::{net::SocketAddr, sync::Arc};
use axum::{routing::{get, post}, Router};
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use crate::application::dashboard_registry::DashboardRegistry;
use crate::infrastructure::config::load_dashboard_config;
use crate::infrastructure::http_provider::HttpClinicalProvider;
use crate::infrastructure::tracing_notifier::TracingNotifier;
use crate::presentation::app_state::AppState;
use crate::presentation::handlers::{get_dashboard, health_check, refresh_dashboard};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    // Load configuration
    let config = load_dashboard_config()?;

    // Create provider (infrastructure layer)
    let provider = Arc::new(HttpClinicalProvider::new(
        config.provider.base_url,
        config.provider.token,
    ));

    // Create registry (application layer)
    let dashboards = DashboardRegistry::new(
        provider.clone(),
        provider,
        config.vitals.limit,
        config.dashboards.max_open,
        Arc::new(TracingNotifier),
    );

    let state = Arc::new(AppState { dashboards });

    // Build router (presentation layer)
    let router = Router::new()
        .route("/healthz", get(health_check))
        .route("/patients/:id/dashboard", get(get_dashboard))
        .route("/patients/:id/dashboard/refresh", post(refresh_dashboard))
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    // Start server
    let addr: SocketAddr = config.server.bind.parse()?;
    tracing::info!("Starting patient-dashboard service on {}", addr);

    axum::serve(tokio::net::TcpListener::bind(addr).await?, router).await?;

    Ok(())
}
