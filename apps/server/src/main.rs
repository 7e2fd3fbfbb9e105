//! # Spares POS Server Binary
//!
//! Loads configuration, opens the database, bootstraps the admin account
//! and serves the API until Ctrl+C or SIGTERM.

use anyhow::Context;
use spares_db::{Database, DbConfig};
use tokio::net::TcpListener;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use spares_server::auth::hash_password;
use spares_server::{build_router, AppState, ServerConfig};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,spares=debug,sqlx=warn")),
        )
        .with_target(true)
        .init();

    info!("Starting Spares POS server...");

    let config = ServerConfig::load()?;
    info!(
        bind = %config.bind_address(),
        db_path = %config.db_path.display(),
        "Configuration loaded"
    );

    if let Some(dir) = config.db_path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("creating data directory {}", dir.display()))?;
    }

    let db = Database::new(
        DbConfig::new(config.db_path.clone()).max_connections(config.db_max_connections),
    )
    .await
    .context("opening database")?;

    match &config.admin {
        Some(admin) => {
            let hash = hash_password(&admin.password).map_err(|e| anyhow::anyhow!(e.message))?;
            db.admins().upsert(&admin.email, &hash).await?;
            info!(email = %admin.email, "Admin account ready");
        }
        None => warn!("No admin configured; set SPARES_ADMIN_EMAIL and SPARES_ADMIN_PASSWORD"),
    }

    let listener = TcpListener::bind(config.bind_address())
        .await
        .with_context(|| format!("binding {}", config.bind_address()))?;
    info!(addr = %listener.local_addr()?, "Listening");

    let app = build_router(AppState::new(db.clone(), config));

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    db.close().await;
    info!("Server shutdown complete");
    Ok(())
}

/// Graceful shutdown signal handler.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received Ctrl+C, shutting down"),
        _ = terminate => info!("Received SIGTERM, shutting down"),
    }
}
