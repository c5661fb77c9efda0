use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::Value;
use sqlx::{PgConnection, PgPool};
use uuid::Uuid;

use tripnest_booking::{
    releases_inventory, Booking, BookingDetails, BookingQuery, NewBooking, Page, StatusChange,
};
use tripnest_catalog::inventory;
use tripnest_core::repository::{BookingRepository, Reservation};
use tripnest_core::{CoreError, CoreResult};
use tripnest_shared::Masked;

use crate::product_repo::{current_quantity, insert_movement};
use crate::storage_error;

pub struct StoreBookingRepository {
    pool: PgPool,
}

impl StoreBookingRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

const BOOKING_COLUMNS: &str = "id, user_id, user_email, first_name, last_name, email, phone, product_id, \
     details, guests, special_requests, status, total_price, currency, booking_date, created_at, updated_at";

#[derive(sqlx::FromRow)]
struct BookingRow {
    id: Uuid,
    user_id: Option<Uuid>,
    user_email: String,
    first_name: String,
    last_name: String,
    email: String,
    phone: String,
    product_id: Option<Uuid>,
    details: Value,
    guests: String,
    special_requests: Option<String>,
    status: String,
    total_price: Option<f64>,
    currency: String,
    booking_date: DateTime<Utc>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<BookingRow> for Booking {
    type Error = CoreError;

    fn try_from(row: BookingRow) -> Result<Self, Self::Error> {
        let details: BookingDetails = serde_json::from_value(row.details)
            .map_err(|e| CoreError::Storage(format!("corrupt booking details for {}: {}", row.id, e)))?;
        Ok(Booking {
            id: row.id,
            user_id: row.user_id,
            user_email: row.user_email,
            first_name: row.first_name,
            last_name: row.last_name,
            email: row.email,
            phone: Masked::new(row.phone),
            product_id: row.product_id,
            details,
            guests: row.guests,
            special_requests: row.special_requests,
            status: row.status.parse()?,
            total_price: row.total_price,
            currency: row.currency,
            booking_date: row.booking_date,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

async fn insert_booking(conn: &mut PgConnection, booking: &Booking) -> CoreResult<()> {
    let details = serde_json::to_value(&booking.details).map_err(storage_error)?;
    sqlx::query(
        r#"
        INSERT INTO bookings (id, user_id, user_email, first_name, last_name, email, phone, product_id,
                              booking_type, details, guests, special_requests, status, total_price, currency,
                              booking_date, created_at, updated_at)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17, $18)
        "#,
    )
    .bind(booking.id)
    .bind(booking.user_id)
    .bind(&booking.user_email)
    .bind(&booking.first_name)
    .bind(&booking.last_name)
    .bind(&booking.email)
    .bind(booking.phone.expose())
    .bind(booking.product_id)
    .bind(booking.booking_type().as_str())
    .bind(details)
    .bind(&booking.guests)
    .bind(&booking.special_requests)
    .bind(booking.status.as_str())
    .bind(booking.total_price)
    .bind(&booking.currency)
    .bind(booking.booking_date)
    .bind(booking.created_at)
    .bind(booking.updated_at)
    .execute(conn)
    .await
    .map_err(storage_error)?;
    Ok(())
}

#[async_trait]
impl BookingRepository for StoreBookingRepository {
    async fn create_booking(&self, new_booking: NewBooking) -> CoreResult<Reservation> {
        let booking = new_booking.into_booking();
        let mut tx = self.pool.begin().await.map_err(storage_error)?;

        // 1. Take one unit; the WHERE clause is the stock check
        let mut quantity_reduced = false;
        if let Some(product_id) = booking.product_id {
            let remaining: Option<(i32,)> = sqlx::query_as(
                r#"
                UPDATE products
                SET quantity = quantity - $2, updated_at = NOW()
                WHERE id = $1 AND quantity >= $2
                RETURNING quantity
                "#,
            )
            .bind(product_id)
            .bind(inventory::UNITS_PER_BOOKING)
            .fetch_optional(&mut *tx)
            .await
            .map_err(storage_error)?;

            match remaining {
                Some((left,)) => {
                    quantity_reduced = true;
                    tracing::debug!("Product {} reserved, {} left", product_id, left);
                }
                None => {
                    return match current_quantity(&mut tx, product_id).await.map_err(storage_error)? {
                        None => Err(CoreError::NotFound("Product")),
                        Some(_) => Err(CoreError::FullyBooked(booking.booking_type())),
                    };
                }
            }
        }

        // 2. Booking row
        insert_booking(&mut tx, &booking).await?;

        // 3. Ledger entry for the reserved unit
        if let (true, Some(product_id)) = (quantity_reduced, booking.product_id) {
            let movement = inventory::reservation(product_id, booking.id);
            insert_movement(&mut tx, &movement).await.map_err(storage_error)?;
        }

        tx.commit().await.map_err(storage_error)?;

        Ok(Reservation {
            booking,
            quantity_reduced,
        })
    }

    async fn get_booking(&self, id: Uuid, user_id: Uuid) -> CoreResult<Option<Booking>> {
        let sql = format!("SELECT {} FROM bookings WHERE id = $1 AND user_id = $2", BOOKING_COLUMNS);
        let row = sqlx::query_as::<_, BookingRow>(&sql)
            .bind(id)
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(storage_error)?;

        row.map(Booking::try_from).transpose()
    }

    async fn list_user_bookings(&self, user_id: Uuid) -> CoreResult<Vec<Booking>> {
        let sql = format!(
            "SELECT {} FROM bookings WHERE user_id = $1 ORDER BY booking_date DESC",
            BOOKING_COLUMNS
        );
        let rows = sqlx::query_as::<_, BookingRow>(&sql)
            .bind(user_id)
            .fetch_all(&self.pool)
            .await
            .map_err(storage_error)?;

        rows.into_iter().map(Booking::try_from).collect()
    }

    async fn page_user_bookings(&self, user_id: Uuid, query: &BookingQuery) -> CoreResult<Page<Booking>> {
        let status = query.status.map(|s| s.as_str());
        let booking_type = query.booking_type.map(|t| t.as_str());
        let filter = "user_id = $1 AND ($2::TEXT IS NULL OR status = $2) AND ($3::TEXT IS NULL OR booking_type = $3)";

        let (total,): (i64,) = sqlx::query_as(&format!("SELECT COUNT(*) FROM bookings WHERE {}", filter))
            .bind(user_id)
            .bind(status)
            .bind(booking_type)
            .fetch_one(&self.pool)
            .await
            .map_err(storage_error)?;

        let sql = format!(
            "SELECT {} FROM bookings WHERE {} ORDER BY booking_date DESC LIMIT $4 OFFSET $5",
            BOOKING_COLUMNS, filter
        );
        let rows = sqlx::query_as::<_, BookingRow>(&sql)
            .bind(user_id)
            .bind(status)
            .bind(booking_type)
            .bind(query.limit() as i64)
            .bind(query.offset() as i64)
            .fetch_all(&self.pool)
            .await
            .map_err(storage_error)?;

        Ok(Page {
            items: rows.into_iter().map(Booking::try_from).collect::<CoreResult<Vec<_>>>()?,
            total: total.max(0) as u64,
            page: query.page(),
            limit: query.limit(),
        })
    }

    async fn list_all_bookings(&self) -> CoreResult<Vec<Booking>> {
        let sql = format!("SELECT {} FROM bookings ORDER BY booking_date DESC", BOOKING_COLUMNS);
        let rows = sqlx::query_as::<_, BookingRow>(&sql)
            .fetch_all(&self.pool)
            .await
            .map_err(storage_error)?;

        rows.into_iter().map(Booking::try_from).collect()
    }

    async fn change_status(&self, id: Uuid, user_id: Uuid, change: StatusChange) -> CoreResult<Booking> {
        let mut tx = self.pool.begin().await.map_err(storage_error)?;

        // 1. Lock the booking so concurrent cancels serialize here
        let sql = format!(
            "SELECT {} FROM bookings WHERE id = $1 AND user_id = $2 FOR UPDATE",
            BOOKING_COLUMNS
        );
        let row = sqlx::query_as::<_, BookingRow>(&sql)
            .bind(id)
            .bind(user_id)
            .fetch_optional(&mut *tx)
            .await
            .map_err(storage_error)?
            .ok_or(CoreError::NotFound("Booking"))?;
        let mut booking = Booking::try_from(row)?;

        // 2. Check the move
        let previous = booking.status;
        let next = change.resolve(previous)?;
        if next == previous {
            return Ok(booking);
        }
        booking.set_status(next);

        sqlx::query("UPDATE bookings SET status = $2, updated_at = $3 WHERE id = $1")
            .bind(booking.id)
            .bind(booking.status.as_str())
            .bind(booking.updated_at)
            .execute(&mut *tx)
            .await
            .map_err(storage_error)?;

        // 3. Give the unit back, once per booking
        if releases_inventory(previous, next) {
            if let Some(product_id) = booking.product_id {
                let movement = inventory::release(product_id, booking.id);
                let first_release = insert_movement(&mut tx, &movement).await.map_err(storage_error)?;
                if first_release {
                    sqlx::query("UPDATE products SET quantity = quantity + $2, updated_at = NOW() WHERE id = $1")
                        .bind(product_id)
                        .bind(inventory::UNITS_PER_BOOKING)
                        .execute(&mut *tx)
                        .await
                        .map_err(storage_error)?;
                    tracing::info!("Released one unit of product {} for booking {}", product_id, booking.id);
                }
            }
        }

        tx.commit().await.map_err(storage_error)?;
        Ok(booking)
    }
}
