use std::net::SocketAddr;
use std::sync::Arc;

use tourline_db::repositories::{MemoryTourRepo, PgTourRepo, TourRepository};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use tourline_api::config::ServerConfig;
use tourline_api::router::build_app_router;
use tourline_api::state::AppState;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    // --- Configuration ---
    let config = ServerConfig::from_env();

    // --- Tracing ---
    let (text_layer, json_layer) = if config.log_json {
        (None, Some(tracing_subscriber::fmt::layer().json()))
    } else {
        (Some(tracing_subscriber::fmt::layer()), None)
    };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "tourline_api=debug,tourline_db=debug,tower_http=debug".into()),
        )
        .with(text_layer)
        .with(json_layer)
        .init();

    tracing::info!(host = %config.host, port = %config.port, "Loaded server configuration");

    // --- Tour store ---
    let repo: Arc<dyn TourRepository> = match config.database_url.as_deref() {
        Some(database_url) => {
            let pool = tourline_db::create_pool(database_url)
                .await
                .expect("Failed to connect to database");
            tracing::info!("Database connection pool created");

            tourline_db::health_check(&pool)
                .await
                .expect("Database health check failed");
            tracing::info!("Database health check passed");

            tourline_db::run_migrations(&pool)
                .await
                .expect("Failed to run database migrations");
            tracing::info!("Database migrations applied");

            Arc::new(PgTourRepo::new(pool))
        }
        None => {
            tracing::warn!("DATABASE_URL not set; serving from the in-memory demo store");
            Arc::new(MemoryTourRepo::with_demo_data().await)
        }
    };

    if config.fallback_manager_id.is_some() {
        tracing::warn!("DEV_FALLBACK_MANAGER_ID is set; anonymous creations will be accepted");
    }

    // --- App state ---
    let state = AppState::new(repo, config.clone()).expect("Tour variant registry is ambiguous");

    // --- Router ---
    let app = build_app_router(state, &config);

    // --- Start server ---
    let addr = SocketAddr::new(
        config.host.parse().expect("Invalid HOST address"),
        config.port,
    );
    tracing::info!(%addr, "Starting server");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind to address");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("Server error");

    tracing::info!("Graceful shutdown complete");
}

/// Wait for a termination signal to initiate graceful shutdown.
///
/// Handles both SIGINT (Ctrl-C) and SIGTERM (on Unix).
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl-C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            tracing::info!("Received SIGINT (Ctrl-C), starting graceful shutdown");
        }
        () = terminate => {
            tracing::info!("Received SIGTERM, starting graceful shutdown");
        }
    }
}
