use campus_registry::{
    config::AppConfig, routes, server, session::SessionTokenCodec, shared::AppError,
    shared::AppState, store::SqliteStore,
};
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "campus_registry=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    if let Err(e) = run().await {
        error!(error = %e, "Campus registry stopped with an error");
        std::process::exit(1);
    }
}

async fn run() -> Result<(), AppError> {
    let config = AppConfig::from_env()?;
    info!(env = %config.env, "Starting campus registry");

    let tokens = SessionTokenCodec::new(&config.jwt_secret)?;
    let store = Arc::new(SqliteStore::open(&config.storage_path).await?);
    let app_state = AppState::with_store(tokens, config.admin.clone(), store);

    let app = routes::router(app_state);

    let listener = TcpListener::bind(&config.http_addr).await.map_err(|e| {
        AppError::Configuration(format!("cannot bind {}: {}", config.http_addr, e))
    })?;
    info!("Server running on http://{}", config.http_addr);

    server::serve_with_shutdown(
        listener,
        app,
        server::shutdown_signal(),
        config.shutdown_grace,
    )
    .await
    .map_err(|e| {
        error!(error = %e, "Server terminated abnormally");
        AppError::Internal
    })
}
