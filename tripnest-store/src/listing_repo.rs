use async_trait::async_trait;
use serde_json::Value;
use sqlx::PgPool;
use uuid::Uuid;

use tripnest_catalog::{Listing, ListingKind};
use tripnest_core::repository::ListingRepository;
use tripnest_core::{CoreError, CoreResult};

use crate::storage_error;

/// Listings are stored as one JSONB document per row; `kind` and
/// `created_at` are lifted into columns for filtering and ordering.
pub struct StoreListingRepository {
    pool: PgPool,
}

impl StoreListingRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn decode(data: Value) -> CoreResult<Listing> {
    serde_json::from_value(data).map_err(|e| CoreError::Storage(format!("corrupt listing document: {}", e)))
}

#[async_trait]
impl ListingRepository for StoreListingRepository {
    async fn list_listings(&self, kind: ListingKind) -> CoreResult<Vec<Listing>> {
        let rows: Vec<(Value,)> =
            sqlx::query_as("SELECT data FROM listings WHERE kind = $1 ORDER BY created_at DESC")
                .bind(kind.as_str())
                .fetch_all(&self.pool)
                .await
                .map_err(storage_error)?;

        rows.into_iter().map(|(data,)| decode(data)).collect()
    }

    async fn get_listing(&self, kind: ListingKind, id: Uuid) -> CoreResult<Option<Listing>> {
        let row: Option<(Value,)> = sqlx::query_as("SELECT data FROM listings WHERE kind = $1 AND id = $2")
            .bind(kind.as_str())
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(storage_error)?;

        row.map(|(data,)| decode(data)).transpose()
    }

    async fn save_listing(&self, listing: &Listing) -> CoreResult<()> {
        let data = serde_json::to_value(listing).map_err(storage_error)?;
        sqlx::query(
            r#"
            INSERT INTO listings (id, kind, name, is_popular, data, created_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            ON CONFLICT (id) DO UPDATE
            SET name = EXCLUDED.name, is_popular = EXCLUDED.is_popular, data = EXCLUDED.data
            "#,
        )
        .bind(listing.id)
        .bind(listing.kind().as_str())
        .bind(&listing.name)
        .bind(listing.is_popular)
        .bind(data)
        .bind(listing.created_at)
        .execute(&self.pool)
        .await
        .map_err(storage_error)?;

        Ok(())
    }
}
