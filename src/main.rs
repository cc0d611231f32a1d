use anyhow::{Context, Result};
use boxwatch::api::{create_router, ApiState};
use boxwatch::ingest::{spawn_simulation, Listener};
use boxwatch::{QueryService, StateTracker};
use std::sync::Arc;
use tracing::{error, info};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing subscriber
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "boxwatch=info".into()),
        )
        .init();

    info!("Boxwatch starting...");

    // Config path from first argument or environment
    let config_path = std::env::args()
        .nth(1)
        .or_else(|| std::env::var("BOXWATCH_CONFIG").ok());
    let config = boxwatch::config::resolve(config_path.as_deref())?;

    let vocabulary = Arc::new(config.vocabulary.build());
    let tracker = Arc::new(StateTracker::new(
        config.history.sentinel_label.clone(),
        config.history.seed_with_sentinel,
    ));

    info!(
        config_path = config_path.as_deref().unwrap_or("<defaults>"),
        codes = ?vocabulary.codes(),
        sentinel = %tracker.sentinel(),
        "Configuration loaded"
    );

    // Ingestion side. A bind failure leaves the query side up so pollers
    // still see the last known state.
    if config.simulation.enabled {
        spawn_simulation(&config.simulation, Arc::clone(&vocabulary), Arc::clone(&tracker));
    } else {
        match Listener::bind(&config.ingest, Arc::clone(&vocabulary), Arc::clone(&tracker)).await {
            Ok(listener) => {
                tokio::spawn(listener.run());
            }
            Err(e) => {
                let detail = format!("{:#}", e);
                error!(error = %detail, "Ingestion failed to start, serving queries only");
            }
        }
    }

    // Query side
    let api_state = Arc::new(ApiState {
        query: QueryService::new(Arc::clone(&tracker)),
        refresh_seconds: config.http.refresh_seconds,
    });
    let router = create_router(api_state);
    let http_listener = tokio::net::TcpListener::bind((config.http.host.as_str(), config.http.port))
        .await
        .context("Failed to bind query HTTP port")?;
    info!(
        host = %config.http.host,
        port = config.http.port,
        "Query API listening (/state, /zgodovina, /api/history)"
    );

    let server_handle = tokio::spawn(async move {
        if let Err(e) = axum::serve(http_listener, router).await {
            error!(error = %e, "Query API server error");
        }
    });

    // Wait for shutdown signal
    tokio::signal::ctrl_c()
        .await
        .context("Failed to listen for ctrl_c signal")?;
    info!("Shutdown signal received");

    server_handle.abort();
    info!("Boxwatch stopped");

    Ok(())
}
