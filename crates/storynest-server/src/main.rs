mod cleanup;
mod config;
mod seed;

use std::sync::Arc;

use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use storynest_api::auth::{AppState, AppStateInner};
use storynest_api::password::CredentialStore;
use storynest_api::session::SessionSettings;
use storynest_api::session_store::SqliteStore;

use crate::config::Config;

/// How often expired sessions are pruned.
const SESSION_SWEEP_SECS: u64 = 3600;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present
    let _ = dotenvy::dotenv();

    // Init logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "storynest=debug,storynest_api=debug,storynest_db=info,tower_http=debug".into()
            }),
        )
        .init();

    let config = Config::from_env()?;

    let credentials = match config.argon2 {
        Some(cost) => CredentialStore::with_params(cost.memory_kib, cost.iterations, cost.parallelism)?,
        None => CredentialStore::default(),
    };
    let sessions = SessionSettings::new(config.session_days, config.secure_cookies)?;

    let db = Arc::new(storynest_db::Database::open(&config.db_path)?);

    if config.seed {
        seed::seed_if_empty(&db, &credentials)?;
    }

    tokio::spawn(cleanup::run_session_sweep(SqliteStore::new(db.clone()), SESSION_SWEEP_SECS));

    let state: AppState = Arc::new(AppStateInner {
        db,
        credentials,
        sessions,
    });

    let app = storynest_api::router(state).layer(TraceLayer::new_for_http());

    info!("StoryNest listening on {}", config.addr);

    let listener = tokio::net::TcpListener::bind(config.addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("StoryNest stopped");
    Ok(())
}

/// Resolves on Ctrl+C, or SIGTERM on unix. A signal that cannot be hooked
/// is logged and simply never fires.
async fn shutdown_signal() {
    let interrupt = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!("Cannot listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{SignalKind, signal};
        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                warn!("Cannot listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = interrupt => info!("Ctrl+C received, draining StoryNest connections"),
        _ = terminate => info!("SIGTERM received, draining StoryNest connections"),
    }
}
