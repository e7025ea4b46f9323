//! Postgres-backed [`ProductStore`].

use async_trait::async_trait;
use sqlx::PgPool;

use crate::{NewProduct, NewReaction, ProductRow, ProductStore, ReactionRow, StoreError};

pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ProductStore for PgStore {
    async fn list_products(&self) -> Result<Vec<ProductRow>, StoreError> {
        let rows = sqlx::query_as::<_, ProductRow>(
            "SELECT p.id, p.name, p.price, p.image_url, p.product_link, p.description, \
                    p.category, p.availability, p.rating, p.created_at, \
                    COUNT(r.id) AS reaction_count \
             FROM web_products p \
             LEFT JOIN web_reactions r ON r.product_id = p.id::text \
             GROUP BY p.id \
             ORDER BY reaction_count ASC, p.created_at DESC",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn insert_product(&self, product: NewProduct) -> Result<ProductRow, StoreError> {
        let row = sqlx::query_as::<_, ProductRow>(
            "INSERT INTO web_products \
                 (name, price, image_url, product_link, description, category, availability, rating) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8) \
             RETURNING id, name, price, image_url, product_link, description, category, \
                       availability, rating, created_at, 0::bigint AS reaction_count",
        )
        .bind(&product.name)
        .bind(&product.price)
        .bind(&product.image_url)
        .bind(&product.product_link)
        .bind(&product.description)
        .bind(&product.category)
        .bind(product.availability)
        .bind(product.rating)
        .fetch_one(&self.pool)
        .await?;
        Ok(row)
    }

    async fn list_reactions(&self) -> Result<Vec<ReactionRow>, StoreError> {
        let rows = sqlx::query_as::<_, ReactionRow>(
            "SELECT id, session_id, product_id, reaction, created_at \
             FROM web_reactions \
             ORDER BY created_at DESC",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn insert_reaction(&self, reaction: NewReaction) -> Result<ReactionRow, StoreError> {
        let row = sqlx::query_as::<_, ReactionRow>(
            "INSERT INTO web_reactions (session_id, product_id, reaction) \
             VALUES ($1, $2, $3) \
             RETURNING id, session_id, product_id, reaction, created_at",
        )
        .bind(&reaction.session_id)
        .bind(&reaction.product_id)
        .bind(reaction.kind.as_str())
        .fetch_one(&self.pool)
        .await?;
        Ok(row)
    }

    async fn health(&self) -> Result<(), StoreError> {
        sqlx::query_scalar::<_, i64>("SELECT 1")
            .fetch_one(&self.pool)
            .await?;
        Ok(())
    }

    fn backend(&self) -> &'static str {
        "postgres"
    }
}
