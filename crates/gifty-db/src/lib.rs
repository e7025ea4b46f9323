//! The product storage port and its two implementations.
//!
//! The console works with or without a database: [`PgStore`] persists to
//! Postgres, [`MemoryStore`] keeps process-local lists. The server picks
//! one at startup and the API only ever sees the [`ProductStore`] trait.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::{postgres::PgPoolOptions, PgPool};
use std::time::Duration;
use thiserror::Error;
use uuid::Uuid;

use gifty_core::ReactionKind;

pub mod memory;
pub mod postgres;

pub use memory::MemoryStore;
pub use postgres::PgStore;

const DEFAULT_MAX_CONNECTIONS: u32 = 10;
const DEFAULT_MIN_CONNECTIONS: u32 = 1;
const DEFAULT_ACQUIRE_TIMEOUT_SECS: u64 = 10;

// Path relative to crates/gifty-db/Cargo.toml; resolves to <workspace-root>/migrations/
static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!("../../migrations");

#[derive(Debug, Clone, Copy)]
pub struct PoolConfig {
    pub max_connections: u32,
    pub min_connections: u32,
    pub acquire_timeout_secs: u64,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            max_connections: DEFAULT_MAX_CONNECTIONS,
            min_connections: DEFAULT_MIN_CONNECTIONS,
            acquire_timeout_secs: DEFAULT_ACQUIRE_TIMEOUT_SECS,
        }
    }
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
    #[error(transparent)]
    Migration(#[from] sqlx::migrate::MigrateError),
}

/// A stored product as served by the list endpoint. `reaction_count` is
/// computed per listing, not persisted.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct ProductRow {
    pub id: Uuid,
    pub name: String,
    /// Display string, e.g. `"€ 19.99"`.
    pub price: String,
    pub image_url: String,
    pub product_link: String,
    pub description: Option<String>,
    pub category: Option<String>,
    pub availability: bool,
    pub rating: Option<f64>,
    pub reaction_count: i64,
    pub created_at: DateTime<Utc>,
}

/// Validated input for a product insert.
#[derive(Debug, Clone)]
pub struct NewProduct {
    pub name: String,
    pub price: String,
    pub image_url: String,
    pub product_link: String,
    pub description: Option<String>,
    pub category: Option<String>,
    pub availability: bool,
    pub rating: Option<f64>,
}

/// A stored swipe reaction.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct ReactionRow {
    pub id: Uuid,
    pub session_id: String,
    pub product_id: String,
    pub reaction: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewReaction {
    pub session_id: String,
    pub product_id: String,
    pub kind: ReactionKind,
}

/// Storage port consumed by the API layer.
///
/// Listing order is part of the contract: products with the fewest
/// reactions come first (so fresh items surface in the swipe deck), newest
/// first among ties.
#[async_trait]
pub trait ProductStore: Send + Sync {
    async fn list_products(&self) -> Result<Vec<ProductRow>, StoreError>;
    async fn insert_product(&self, product: NewProduct) -> Result<ProductRow, StoreError>;
    async fn list_reactions(&self) -> Result<Vec<ReactionRow>, StoreError>;
    async fn insert_reaction(&self, reaction: NewReaction) -> Result<ReactionRow, StoreError>;
    /// Cheap liveness probe for the health endpoint.
    async fn health(&self) -> Result<(), StoreError>;
    /// `"postgres"` or `"memory"`, surfaced by health/diagnostics.
    fn backend(&self) -> &'static str;
}

/// Connect to a Postgres pool using explicit URL and config.
///
/// # Errors
///
/// Returns [`sqlx::Error`] if the connection cannot be established.
pub async fn connect_pool(database_url: &str, config: PoolConfig) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(config.max_connections)
        .min_connections(config.min_connections)
        .acquire_timeout(Duration::from_secs(config.acquire_timeout_secs))
        .connect(database_url)
        .await
}

/// Run all pending migrations against the pool.
///
/// # Errors
///
/// Returns [`sqlx::migrate::MigrateError`] if any migration fails.
pub async fn run_migrations(pool: &PgPool) -> Result<(), sqlx::migrate::MigrateError> {
    MIGRATOR.run(pool).await
}
