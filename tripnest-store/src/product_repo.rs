use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgConnection, PgPool};
use uuid::Uuid;

use tripnest_catalog::inventory::check_amount;
use tripnest_catalog::{InventoryError, Product, ProductCategory, ProductUpdate};
use tripnest_core::repository::ProductRepository;
use tripnest_core::{CoreError, CoreResult};
use tripnest_shared::{InventoryMovement, MovementReason};

use crate::storage_error;

pub struct StoreProductRepository {
    pool: PgPool,
}

impl StoreProductRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

pub(crate) const PRODUCT_COLUMNS: &str =
    "id, name, description, price, quantity, category, image, location, rating, created_at, updated_at";

#[derive(sqlx::FromRow)]
pub(crate) struct ProductRow {
    id: Uuid,
    name: String,
    description: String,
    price: f64,
    quantity: i32,
    category: String,
    image: String,
    location: String,
    rating: f64,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<ProductRow> for Product {
    type Error = CoreError;

    fn try_from(row: ProductRow) -> Result<Self, Self::Error> {
        Ok(Product {
            id: row.id,
            name: row.name,
            description: row.description,
            price: row.price,
            quantity: row.quantity,
            category: row.category.parse()?,
            image: row.image,
            location: row.location,
            rating: row.rating,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[derive(sqlx::FromRow)]
struct MovementRow {
    id: Uuid,
    product_id: Uuid,
    booking_id: Option<Uuid>,
    delta: i32,
    reason: String,
    created_at: DateTime<Utc>,
}

impl TryFrom<MovementRow> for InventoryMovement {
    type Error = CoreError;

    fn try_from(row: MovementRow) -> Result<Self, Self::Error> {
        let reason = MovementReason::parse(&row.reason)
            .ok_or_else(|| CoreError::Storage(format!("unknown ledger reason '{}'", row.reason)))?;
        Ok(InventoryMovement {
            id: row.id,
            product_id: row.product_id,
            booking_id: row.booking_id,
            delta: row.delta,
            reason,
            created_at: row.created_at,
        })
    }
}

/// Append a ledger row. Returns false when the `(booking_id, reason)` pair
/// was already recorded.
pub(crate) async fn insert_movement(
    conn: &mut PgConnection,
    movement: &InventoryMovement,
) -> Result<bool, sqlx::Error> {
    let result = sqlx::query(
        r#"
        INSERT INTO inventory_ledger (id, product_id, booking_id, delta, reason, created_at)
        VALUES ($1, $2, $3, $4, $5, $6)
        ON CONFLICT (booking_id, reason) DO NOTHING
        "#,
    )
    .bind(movement.id)
    .bind(movement.product_id)
    .bind(movement.booking_id)
    .bind(movement.delta)
    .bind(movement.reason.as_str())
    .bind(movement.created_at)
    .execute(conn)
    .await?;

    Ok(result.rows_affected() == 1)
}

/// Current quantity of a product, or None when it does not exist.
pub(crate) async fn current_quantity(conn: &mut PgConnection, id: Uuid) -> Result<Option<i32>, sqlx::Error> {
    let row: Option<(i32,)> = sqlx::query_as("SELECT quantity FROM products WHERE id = $1")
        .bind(id)
        .fetch_optional(conn)
        .await?;
    Ok(row.map(|(q,)| q))
}

#[async_trait]
impl ProductRepository for StoreProductRepository {
    async fn list_products(&self, category: Option<ProductCategory>) -> CoreResult<Vec<Product>> {
        let sql = format!(
            "SELECT {} FROM products WHERE ($1::TEXT IS NULL OR category = $1) ORDER BY created_at DESC",
            PRODUCT_COLUMNS
        );
        let rows = sqlx::query_as::<_, ProductRow>(&sql)
            .bind(category.map(|c| c.as_str()))
            .fetch_all(&self.pool)
            .await
            .map_err(storage_error)?;

        rows.into_iter().map(Product::try_from).collect()
    }

    async fn get_product(&self, id: Uuid) -> CoreResult<Option<Product>> {
        let sql = format!("SELECT {} FROM products WHERE id = $1", PRODUCT_COLUMNS);
        let row = sqlx::query_as::<_, ProductRow>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(storage_error)?;

        row.map(Product::try_from).transpose()
    }

    async fn create_product(&self, product: &Product) -> CoreResult<()> {
        sqlx::query(
            r#"
            INSERT INTO products (id, name, description, price, quantity, category, image, location, rating, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            "#,
        )
        .bind(product.id)
        .bind(&product.name)
        .bind(&product.description)
        .bind(product.price)
        .bind(product.quantity)
        .bind(product.category.as_str())
        .bind(&product.image)
        .bind(&product.location)
        .bind(product.rating)
        .bind(product.created_at)
        .bind(product.updated_at)
        .execute(&self.pool)
        .await
        .map_err(storage_error)?;

        Ok(())
    }

    async fn update_product(&self, id: Uuid, update: &ProductUpdate) -> CoreResult<Option<Product>> {
        let mut tx = self.pool.begin().await.map_err(storage_error)?;

        let sql = format!("SELECT {} FROM products WHERE id = $1 FOR UPDATE", PRODUCT_COLUMNS);
        let row = sqlx::query_as::<_, ProductRow>(&sql)
            .bind(id)
            .fetch_optional(&mut *tx)
            .await
            .map_err(storage_error)?;

        let mut product = match row {
            Some(row) => Product::try_from(row)?,
            None => return Ok(None),
        };
        update.apply(&mut product)?;

        sqlx::query(
            r#"
            UPDATE products
            SET name = $2, description = $3, price = $4, category = $5, image = $6, location = $7, rating = $8, updated_at = $9
            WHERE id = $1
            "#,
        )
        .bind(product.id)
        .bind(&product.name)
        .bind(&product.description)
        .bind(product.price)
        .bind(product.category.as_str())
        .bind(&product.image)
        .bind(&product.location)
        .bind(product.rating)
        .bind(product.updated_at)
        .execute(&mut *tx)
        .await
        .map_err(storage_error)?;

        tx.commit().await.map_err(storage_error)?;
        Ok(Some(product))
    }

    async fn delete_product(&self, id: Uuid) -> CoreResult<bool> {
        let result = sqlx::query("DELETE FROM products WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(storage_error)?;
        Ok(result.rows_affected() > 0)
    }

    async fn reduce_quantity(&self, id: Uuid, amount: i32) -> CoreResult<Product> {
        check_amount(amount)?;
        let mut tx = self.pool.begin().await.map_err(storage_error)?;

        // 1. Conditional decrement; no row back means missing or short
        let sql = format!(
            "UPDATE products SET quantity = quantity - $2, updated_at = NOW() WHERE id = $1 AND quantity >= $2 RETURNING {}",
            PRODUCT_COLUMNS
        );
        let row = sqlx::query_as::<_, ProductRow>(&sql)
            .bind(id)
            .bind(amount)
            .fetch_optional(&mut *tx)
            .await
            .map_err(storage_error)?;

        let product = match row {
            Some(row) => Product::try_from(row)?,
            None => {
                return match current_quantity(&mut tx, id).await.map_err(storage_error)? {
                    None => Err(CoreError::NotFound("Product")),
                    Some(available) => Err(InventoryError::InsufficientQuantity {
                        requested: amount,
                        available,
                    }
                    .into()),
                };
            }
        };

        // 2. Ledger
        let movement = InventoryMovement::new(id, None, -amount, MovementReason::ManualReduce);
        insert_movement(&mut tx, &movement).await.map_err(storage_error)?;

        tx.commit().await.map_err(storage_error)?;
        tracing::info!("Product {} reduced by {} to {}", id, amount, product.quantity);
        Ok(product)
    }

    async fn add_quantity(&self, id: Uuid, amount: i32) -> CoreResult<Product> {
        check_amount(amount)?;
        let mut tx = self.pool.begin().await.map_err(storage_error)?;

        let sql = format!(
            "UPDATE products SET quantity = quantity + $2, updated_at = NOW() WHERE id = $1 RETURNING {}",
            PRODUCT_COLUMNS
        );
        let row = sqlx::query_as::<_, ProductRow>(&sql)
            .bind(id)
            .bind(amount)
            .fetch_optional(&mut *tx)
            .await
            .map_err(storage_error)?
            .ok_or(CoreError::NotFound("Product"))?;
        let product = Product::try_from(row)?;

        let movement = InventoryMovement::new(id, None, amount, MovementReason::Restock);
        insert_movement(&mut tx, &movement).await.map_err(storage_error)?;

        tx.commit().await.map_err(storage_error)?;
        tracing::info!("Product {} restocked by {} to {}", id, amount, product.quantity);
        Ok(product)
    }

    async fn ledger(&self, id: Uuid) -> CoreResult<Vec<InventoryMovement>> {
        let rows = sqlx::query_as::<_, MovementRow>(
            r#"
            SELECT id, product_id, booking_id, delta, reason, created_at
            FROM inventory_ledger
            WHERE product_id = $1
            ORDER BY created_at ASC
            "#,
        )
        .bind(id)
        .fetch_all(&self.pool)
        .await
        .map_err(storage_error)?;

        rows.into_iter().map(InventoryMovement::try_from).collect()
    }
}
