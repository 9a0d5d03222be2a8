//! Arkiv admin server
//!
//! HTTP server binary wiring the Postgres-backed stores, session
//! authentication, and the admin views together.

use std::sync::Arc;

use axum::{routing::get, Json, Router};
use tower::ServiceBuilder;
use tower_http::{compression::CompressionLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use arkiv_admin::{routes, AdminState, ContextRenderer};
use arkiv_auth::{CookieConfig, GuardState, MemorySessionStore};
use arkiv_core::config::AppConfig;
use arkiv_db::{Database, DatabaseConfig, PgGroupStore, PgUserStore};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    dotenvy::dotenv().ok();
    let config = AppConfig::from_env()?;

    info!(
        version = env!("CARGO_PKG_VERSION"),
        host = %config.server.host,
        port = config.server.port,
        "Starting Arkiv admin server"
    );

    // The admin panel is useless without its store; fail hard here.
    let db_config = DatabaseConfig::with_url(&config.database.url);
    let db = Database::connect(&db_config).await?;
    info!("Connected to database");

    let app = build_router(&config, &db);

    let addr = config.server_addr();
    info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shutdown complete");
    Ok(())
}

/// Initialize tracing/logging
fn init_tracing() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,arkiv_admin=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_target(true))
        .init();
}

/// Build the application router
fn build_router(config: &AppConfig, db: &Database) -> Router {
    let users = Arc::new(PgUserStore::new(db.pool().clone()));
    let groups = Arc::new(PgGroupStore::new(db.pool().clone()));
    let sessions = Arc::new(MemorySessionStore::new());

    let cookie = CookieConfig {
        name: config.auth.session_cookie.clone(),
        secure: config.auth.secure_cookies,
        ..CookieConfig::default()
    };

    let state = AdminState {
        users: users.clone(),
        groups,
        sessions: sessions.clone(),
        renderer: Arc::new(ContextRenderer),
        cookie: cookie.clone(),
        auth: config.auth.clone(),
    };

    let guard = GuardState {
        sessions,
        users,
        cookie,
        login_path: routes::reverse::login(),
    };

    Router::new()
        .route("/health", get(health))
        .merge(routes::router(state, guard))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CompressionLayer::new()),
        )
}

async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, initiating graceful shutdown");
        }
        _ = terminate => {
            info!("Received SIGTERM, initiating graceful shutdown");
        }
    }
}
