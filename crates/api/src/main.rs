use std::sync::Arc;

use dairy_cms_api::config::{AppConfig, StoreBackend};
use dairy_cms_api::state::AppState;
use dairy_cms_core::auth::{AuthProvider, StaticAuth};
use dairy_cms_core::storage::{MemoryStorage, ObjectStorage};
use dairy_cms_core::store::{CollectionStore, MemoryStore, PgStore};
use dairy_cms_remote::{RemoteAuth, RemoteClient, RemoteStorage, RestStore};
use sqlx::postgres::PgPoolOptions;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file if present (dev convenience)
    let _ = dotenvy::dotenv();

    let config = AppConfig::from_env()
        .map_err(|e| anyhow::anyhow!("Failed to load config: {e}"))?;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level)),
        )
        .json()
        .init();

    tracing::info!(backend = %config.store_backend, "Starting dairy CMS API server");

    let remote = match config.remote() {
        Some((url, key)) => Some(
            RemoteClient::new(url, key)
                .map_err(|e| anyhow::anyhow!("Failed to build backend client: {e}"))?,
        ),
        None => None,
    };

    let store: Arc<dyn CollectionStore> = match config.store_backend {
        StoreBackend::Rest => {
            let client = remote
                .clone()
                .ok_or_else(|| anyhow::anyhow!("BACKEND_URL and BACKEND_API_KEY must be set"))?;
            Arc::new(RestStore::new(client))
        }
        StoreBackend::Postgres => {
            let database_url = config
                .database_url
                .as_deref()
                .ok_or_else(|| anyhow::anyhow!("DATABASE_URL must be set"))?;
            let pool = PgPoolOptions::new()
                .max_connections(config.db_max_connections)
                .min_connections(config.db_min_connections)
                .connect(database_url)
                .await
                .map_err(|e| anyhow::anyhow!("Failed to connect to database: {e}"))?;
            tracing::info!("Connected to PostgreSQL");

            sqlx::migrate!("../../migrations")
                .run(&pool)
                .await
                .map_err(|e| anyhow::anyhow!("Failed to run migrations: {e}"))?;
            tracing::info!("Database migrations applied");

            Arc::new(PgStore::new(pool))
        }
        StoreBackend::Memory => {
            tracing::warn!("Using in-memory store; content is lost on restart");
            Arc::new(MemoryStore::new())
        }
    };

    let storage: Arc<dyn ObjectStorage> = match &remote {
        Some(client) => Arc::new(RemoteStorage::new(client.clone(), &config.storage_bucket)),
        None => {
            tracing::warn!("No backend configured; uploads are kept in memory");
            Arc::new(MemoryStorage::new("/uploads"))
        }
    };

    let auth: Arc<dyn AuthProvider> = match &remote {
        Some(client) => Arc::new(RemoteAuth::new(client.clone())),
        None => {
            let mut auth = StaticAuth::new();
            match (&config.admin_email, &config.admin_password) {
                (Some(email), Some(password)) => {
                    auth = auth
                        .with_account(email, password)
                        .map_err(|e| anyhow::anyhow!("Failed to set up admin account: {e}"))?;
                }
                _ => tracing::warn!("ADMIN_EMAIL/ADMIN_PASSWORD not set; nobody can sign in"),
            }
            Arc::new(auth)
        }
    };

    let state = AppState::new(store, storage, auth, config.clone());
    let app = dairy_cms_api::build_app(state);

    let addr = config.addr();
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Listening on {addr}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server shut down gracefully");
    Ok(())
}

/// Wait for SIGINT (Ctrl+C) or SIGTERM for graceful shutdown.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            tracing::error!("failed to listen for Ctrl+C: {err}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(err) => {
                tracing::error!("failed to install SIGTERM handler: {err}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => { tracing::info!("Received Ctrl+C, shutting down..."); }
        _ = terminate => { tracing::info!("Received SIGTERM, shutting down..."); }
    }
}
