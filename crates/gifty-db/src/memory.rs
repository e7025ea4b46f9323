//! In-process [`ProductStore`] used when no database is configured.
//!
//! Non-authoritative by design: contents vanish on restart. Lists are
//! guarded by a single async mutex; contention is irrelevant at console
//! traffic levels.

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::{NewProduct, NewReaction, ProductRow, ProductStore, ReactionRow, StoreError};

#[derive(Default)]
struct MemoryInner {
    products: Vec<ProductRow>,
    reactions: Vec<ReactionRow>,
}

#[derive(Default)]
pub struct MemoryStore {
    inner: Mutex<MemoryInner>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ProductStore for MemoryStore {
    async fn list_products(&self) -> Result<Vec<ProductRow>, StoreError> {
        let inner = self.inner.lock().await;
        let mut products: Vec<ProductRow> = inner
            .products
            .iter()
            .map(|product| {
                let count = inner
                    .reactions
                    .iter()
                    .filter(|reaction| reaction.product_id == product.id.to_string())
                    .count();
                ProductRow {
                    reaction_count: i64::try_from(count).unwrap_or(i64::MAX),
                    ..product.clone()
                }
            })
            .collect();

        // Same contract as the SQL ordering: fewest reactions first,
        // newest first among ties.
        products.sort_by(|a, b| {
            a.reaction_count
                .cmp(&b.reaction_count)
                .then(b.created_at.cmp(&a.created_at))
        });
        Ok(products)
    }

    async fn insert_product(&self, product: NewProduct) -> Result<ProductRow, StoreError> {
        let row = ProductRow {
            id: Uuid::new_v4(),
            name: product.name,
            price: product.price,
            image_url: product.image_url,
            product_link: product.product_link,
            description: product.description,
            category: product.category,
            availability: product.availability,
            rating: product.rating,
            reaction_count: 0,
            created_at: Utc::now(),
        };
        self.inner.lock().await.products.push(row.clone());
        Ok(row)
    }

    async fn list_reactions(&self) -> Result<Vec<ReactionRow>, StoreError> {
        let mut reactions = self.inner.lock().await.reactions.clone();
        reactions.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(reactions)
    }

    async fn insert_reaction(&self, reaction: NewReaction) -> Result<ReactionRow, StoreError> {
        let row = ReactionRow {
            id: Uuid::new_v4(),
            session_id: reaction.session_id,
            product_id: reaction.product_id,
            reaction: reaction.kind.as_str().to_string(),
            created_at: Utc::now(),
        };
        self.inner.lock().await.reactions.push(row.clone());
        Ok(row)
    }

    async fn health(&self) -> Result<(), StoreError> {
        Ok(())
    }

    fn backend(&self) -> &'static str {
        "memory"
    }
}
