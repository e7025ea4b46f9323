mod api;
mod middleware;

use std::sync::Arc;

use tracing_subscriber::EnvFilter;

use gifty_db::{MemoryStore, PgStore, PoolConfig, ProductStore};
use gifty_scraper::PageFetcher;

use crate::api::{build_app, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = gifty_core::load_app_config()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let store = select_store(&config).await;
    tracing::info!(storage = store.backend(), "storage selected");

    let fetcher = PageFetcher::new(
        config.fetch_timeout_secs,
        &config.user_agent,
        &config.accept_language,
    )?;

    let app = build_app(AppState {
        store,
        fetcher: Arc::new(fetcher),
        affiliate_tag: config.affiliate_tag.clone(),
    });

    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    tracing::info!(addr = %config.bind_addr, env = %config.env, "gifty-server listening");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

/// Picks the storage backend once at startup: a configured and reachable
/// database wins; anything else falls back to the in-process store.
async fn select_store(config: &gifty_core::AppConfig) -> Arc<dyn ProductStore> {
    let Some(database_url) = &config.database_url else {
        tracing::warn!("DATABASE_URL not set; using in-memory storage");
        return Arc::new(MemoryStore::new());
    };

    let pool_config = PoolConfig {
        max_connections: config.db_max_connections,
        min_connections: config.db_min_connections,
        acquire_timeout_secs: config.db_acquire_timeout_secs,
    };

    match gifty_db::connect_pool(database_url, pool_config).await {
        Ok(pool) => match gifty_db::run_migrations(&pool).await {
            Ok(()) => Arc::new(PgStore::new(pool)),
            Err(e) => {
                tracing::warn!(error = %e, "migrations failed; using in-memory storage");
                Arc::new(MemoryStore::new())
            }
        },
        Err(e) => {
            tracing::warn!(error = %e, "database unreachable; using in-memory storage");
            Arc::new(MemoryStore::new())
        }
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to listen for ctrl-c");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    tracing::info!("received shutdown signal, starting graceful shutdown");
}
