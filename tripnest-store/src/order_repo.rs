use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use tripnest_booking::{Order, OrderItem, OrderStatus, OrderStatusChange, PaymentMethod};
use tripnest_core::repository::OrderRepository;
use tripnest_core::{CoreError, CoreResult};

use crate::storage_error;

pub struct StoreOrderRepository {
    pool: PgPool,
}

impl StoreOrderRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn load_items(&self, order_id: Uuid) -> CoreResult<Vec<OrderItem>> {
        let rows = sqlx::query_as::<_, OrderItemRow>(
            r#"
            SELECT id, order_id, cart_item_id, booking_id, product_id, name, item_type, price, quantity, line_total
            FROM order_items
            WHERE order_id = $1
            ORDER BY position ASC
            "#,
        )
        .bind(order_id)
        .fetch_all(&self.pool)
        .await
        .map_err(storage_error)?;

        Ok(rows.into_iter().map(OrderItem::from).collect())
    }

    async fn hydrate(&self, row: OrderRow) -> CoreResult<Order> {
        let items = self.load_items(row.id).await?;
        row.into_order(items)
    }
}

#[derive(sqlx::FromRow)]
struct OrderRow {
    id: Uuid,
    user_id: Uuid,
    subtotal: f64,
    tax: f64,
    total: f64,
    currency: String,
    payment_method: String,
    payment_reference: Option<String>,
    status: String,
    created_at: DateTime<Utc>,
}

impl OrderRow {
    fn into_order(self, items: Vec<OrderItem>) -> CoreResult<Order> {
        let payment_method = PaymentMethod::parse(&self.payment_method)
            .ok_or_else(|| CoreError::Storage(format!("unknown payment method '{}'", self.payment_method)))?;
        let status = OrderStatus::parse(&self.status)
            .ok_or_else(|| CoreError::Storage(format!("unknown order status '{}'", self.status)))?;
        Ok(Order {
            id: self.id,
            user_id: self.user_id,
            items,
            subtotal: self.subtotal,
            tax: self.tax,
            total: self.total,
            currency: self.currency,
            payment_method,
            payment_reference: self.payment_reference,
            status,
            created_at: self.created_at,
        })
    }
}

#[derive(sqlx::FromRow)]
struct OrderItemRow {
    id: Uuid,
    order_id: Uuid,
    cart_item_id: String,
    booking_id: Option<Uuid>,
    product_id: Option<Uuid>,
    name: String,
    item_type: String,
    price: f64,
    quantity: i32,
    line_total: f64,
}

impl From<OrderItemRow> for OrderItem {
    fn from(row: OrderItemRow) -> Self {
        OrderItem {
            id: row.id,
            order_id: row.order_id,
            cart_item_id: row.cart_item_id,
            booking_id: row.booking_id,
            product_id: row.product_id,
            name: row.name,
            item_type: row.item_type,
            price: row.price,
            quantity: row.quantity,
            line_total: row.line_total,
        }
    }
}

const ORDER_COLUMNS: &str =
    "id, user_id, subtotal, tax, total, currency, payment_method, payment_reference, status, created_at";

#[async_trait]
impl OrderRepository for StoreOrderRepository {
    async fn create_order(&self, order: &Order) -> CoreResult<()> {
        let mut tx = self.pool.begin().await.map_err(storage_error)?;

        sqlx::query(
            r#"
            INSERT INTO orders (id, user_id, subtotal, tax, total, currency, payment_method, payment_reference, status, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            "#,
        )
        .bind(order.id)
        .bind(order.user_id)
        .bind(order.subtotal)
        .bind(order.tax)
        .bind(order.total)
        .bind(&order.currency)
        .bind(order.payment_method.as_str())
        .bind(&order.payment_reference)
        .bind(order.status.as_str())
        .bind(order.created_at)
        .execute(&mut *tx)
        .await
        .map_err(storage_error)?;

        for (position, item) in order.items.iter().enumerate() {
            sqlx::query(
                r#"
                INSERT INTO order_items (id, order_id, position, cart_item_id, booking_id, product_id, name, item_type, price, quantity, line_total)
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
                "#,
            )
            .bind(item.id)
            .bind(order.id)
            .bind(position as i32)
            .bind(&item.cart_item_id)
            .bind(item.booking_id)
            .bind(item.product_id)
            .bind(&item.name)
            .bind(&item.item_type)
            .bind(item.price)
            .bind(item.quantity)
            .bind(item.line_total)
            .execute(&mut *tx)
            .await
            .map_err(storage_error)?;
        }

        tx.commit().await.map_err(storage_error)?;
        Ok(())
    }

    async fn get_order(&self, id: Uuid, user_id: Uuid) -> CoreResult<Option<Order>> {
        let sql = format!("SELECT {} FROM orders WHERE id = $1 AND user_id = $2", ORDER_COLUMNS);
        let row = sqlx::query_as::<_, OrderRow>(&sql)
            .bind(id)
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(storage_error)?;

        match row {
            Some(row) => Ok(Some(self.hydrate(row).await?)),
            None => Ok(None),
        }
    }

    async fn list_user_orders(&self, user_id: Uuid) -> CoreResult<Vec<Order>> {
        let sql = format!(
            "SELECT {} FROM orders WHERE user_id = $1 ORDER BY created_at DESC",
            ORDER_COLUMNS
        );
        let rows = sqlx::query_as::<_, OrderRow>(&sql)
            .bind(user_id)
            .fetch_all(&self.pool)
            .await
            .map_err(storage_error)?;

        let mut orders = Vec::with_capacity(rows.len());
        for row in rows {
            orders.push(self.hydrate(row).await?);
        }
        Ok(orders)
    }

    async fn change_order_status(&self, id: Uuid, user_id: Uuid, change: OrderStatusChange) -> CoreResult<Order> {
        let mut tx = self.pool.begin().await.map_err(storage_error)?;

        // 1. Lock the caller's order row
        let sql = format!(
            "SELECT {} FROM orders WHERE id = $1 AND user_id = $2 FOR UPDATE",
            ORDER_COLUMNS
        );
        let row = sqlx::query_as::<_, OrderRow>(&sql)
            .bind(id)
            .bind(user_id)
            .fetch_optional(&mut *tx)
            .await
            .map_err(storage_error)?
            .ok_or(CoreError::NotFound("Order"))?;

        // 2. Check the move against the stored status
        let current = OrderStatus::parse(&row.status)
            .ok_or_else(|| CoreError::Storage(format!("unknown order status '{}'", row.status)))?;
        let next = change.resolve(current)?;

        // 3. Write it
        if next != current {
            sqlx::query("UPDATE orders SET status = $1 WHERE id = $2")
                .bind(next.as_str())
                .bind(id)
                .execute(&mut *tx)
                .await
                .map_err(storage_error)?;
        }
        tx.commit().await.map_err(storage_error)?;

        let mut order = self.hydrate(row).await?;
        order.status = next;
        Ok(order)
    }
}
