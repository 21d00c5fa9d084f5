use std::net::SocketAddr;
use std::sync::Arc;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use pagecraft_api::app::build_app;
use pagecraft_api::bootstrap;
use pagecraft_api::config::ServerConfig;
use pagecraft_api::state::AppState;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "pagecraft_api=debug,pagecraft_db=info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = ServerConfig::from_env();
    let database_url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");

    let pool = pagecraft_db::create_pool(&database_url)
        .await
        .expect("Failed to connect to database");
    pagecraft_db::run_migrations(&pool)
        .await
        .expect("Failed to run database migrations");
    tracing::info!("Pagecraft schema is up to date");

    // An empty users table gets one ADMIN so the CMS can be reached at all.
    if let Some(admin) = &config.bootstrap_admin {
        match bootstrap::ensure_admin(&pool, admin).await {
            Ok(true) => {}
            Ok(false) => tracing::debug!("Users exist, skipping admin bootstrap"),
            Err(e) => panic!("Failed to bootstrap admin account: {e}"),
        }
    }

    let addr = SocketAddr::new(
        config.host.parse().expect("HOST must be an IP address"),
        config.port,
    );
    let state = AppState {
        pool: pool.clone(),
        config: Arc::new(config),
    };
    let app = build_app(state).unwrap_or_else(|e| panic!("Invalid CORS_ORIGINS entry: {e}"));

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind to address");
    tracing::info!(%addr, "Pagecraft API listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("Server error");

    // In-flight requests have drained; release connections before exit.
    pool.close().await;
    tracing::info!("Pagecraft API stopped");
}

/// Resolves on Ctrl-C, or SIGTERM where the platform has it.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Ctrl-C handler unavailable");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "SIGTERM handler unavailable");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => tracing::info!(signal = "SIGINT", "Shutting down"),
        () = terminate => tracing::info!(signal = "SIGTERM", "Shutting down"),
    }
}
