use std::sync::Arc;
use std::time::Duration;

use axum::{routing::get, Router};
use tokio::sync::mpsc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;

use darna_api::{
    api_v1_routes,
    config::{init_tracing, load_config},
    events::{process_events, EventSender},
    handlers::AppServices,
    storage::FileSessionStore,
    AppState,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = load_config()?;
    init_tracing(config.log_level(), config.log_json);

    info!(
        "Starting darna-api in {} mode on {}:{}",
        config.environment, config.host, config.port
    );

    let (tx, rx) = mpsc::channel(1024);
    let event_sender = Arc::new(EventSender::new(tx));
    tokio::spawn(process_events(rx));

    let store = Arc::new(FileSessionStore::new(config.data_dir.clone()));
    let services = AppServices::load(
        store,
        event_sender.clone(),
        Duration::from_millis(config.payment_delay_ms),
    )
    .await;

    let state = Arc::new(AppState {
        config: config.clone(),
        event_sender,
        services,
    });

    let mut app = Router::new()
        .route("/", get(|| async { "darna-api up" }))
        .nest("/api/v1", api_v1_routes())
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    if config.cors_allow_any_origin || config.is_development() {
        app = app.layer(CorsLayer::permissive());
    }

    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("Listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shut down cleanly");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received Ctrl+C, shutting down"),
        _ = terminate => info!("Received SIGTERM, shutting down"),
    }
}
