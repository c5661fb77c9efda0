use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Path, Query, State,
    },
    http::StatusCode,
    routing::{delete, get, post, put},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use uuid::Uuid;

use tripnest_booking::{
    BookingError, BookingStatus, Cart, CartItem, CartItemInput, CheckoutSummary, Order, PaymentMethod, SlotKey,
};

use crate::error::AppError;
use crate::middleware::SessionUser;
use crate::state::AppState;

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CartResponse {
    pub items: Vec<CartItem>,
    pub item_count: usize,
    #[serde(flatten)]
    pub summary: CheckoutSummary,
}

impl From<Cart> for CartResponse {
    fn from(cart: Cart) -> Self {
        let summary = CheckoutSummary::for_cart(&cart);
        Self {
            item_count: cart.item_count(),
            items: cart.items,
            summary,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct UpdateQuantityRequest {
    pub quantity: i64,
}

/// Optional `?type=&bookingDate=` narrowing for update and remove.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SlotParams {
    #[serde(rename = "type")]
    pub item_type: Option<String>,
    pub booking_date: Option<String>,
}

impl SlotParams {
    fn key(self, id: String) -> SlotKey {
        SlotKey {
            id,
            item_type: self.item_type,
            booking_date: self.booking_date,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutRequest {
    pub payment_method: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutResponse {
    pub message: &'static str,
    pub order: Order,
    pub booking_ids: Vec<Uuid>,
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(get_cart))
        .route("/add", post(add_to_cart))
        .route("/update/{item_id}", put(update_quantity))
        .route("/remove/{item_id}", delete(remove_from_cart))
        .route("/clear", delete(clear_cart))
        .route("/checkout", post(checkout))
}

// ============================================================================
// Pricing
// ============================================================================

/// Price of one cart entry from stored records: the booking's total when it
/// has one, otherwise the booked (or named) product's price.
async fn stored_price(
    state: &AppState,
    user_id: Uuid,
    booking_id: Option<Uuid>,
    product_id: Option<Uuid>,
) -> Result<f64, AppError> {
    if let Some(booking_id) = booking_id {
        let booking = state
            .repos
            .bookings
            .get_booking(booking_id, user_id)
            .await?
            .ok_or_else(|| AppError::Validation("Booking not found".to_string()))?;
        if booking.status == BookingStatus::Cancelled {
            return Err(AppError::Validation("Booking has been cancelled".to_string()));
        }
        tracing::debug!("Pricing cart entry from booking {} ({})", booking.id, booking.details.venue_name());

        if let Some(total) = booking.total_price {
            return Ok(total);
        }
        let product_id = booking
            .product_id
            .ok_or_else(|| AppError::Validation("Booking has no price".to_string()))?;
        let product = state
            .repos
            .products
            .get_product(product_id)
            .await?
            .ok_or_else(|| AppError::Validation("Booking has no price".to_string()))?;
        return Ok(product.price);
    }

    let product_id = product_id.ok_or_else(|| {
        AppError::from(BookingError::InvalidCartItem("a bookingId or productId is required".to_string()))
    })?;
    let product = state
        .repos
        .products
        .get_product(product_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Product not found".to_string()))?;
    if !product.is_available() {
        return Err(AppError::Validation("Insufficient quantity available".to_string()));
    }
    Ok(product.price)
}

/// Re-price every entry from storage. A booking may be paid for once per cart.
async fn reprice(state: &AppState, user_id: Uuid, cart: &mut Cart) -> Result<(), AppError> {
    let mut seen = HashSet::new();
    for item in cart.items.iter_mut() {
        if let Some(booking_id) = item.booking_id {
            if !seen.insert(booking_id) {
                return Err(AppError::Validation(format!(
                    "Booking {} appears more than once in the cart",
                    booking_id
                )));
            }
        }
        item.price = stored_price(state, user_id, item.booking_id, item.product_id).await?;
    }
    Ok(())
}

// ============================================================================
// Handlers
// ============================================================================

/// GET /api/cart
pub async fn get_cart(
    State(state): State<AppState>,
    session: SessionUser,
) -> Result<Json<CartResponse>, AppError> {
    let cart = state.repos.carts.get_cart(session.user_id).await?;
    Ok(Json(cart.into()))
}

/// POST /api/cart/add
/// The price comes from the referenced booking or product, never the body
pub async fn add_to_cart(
    State(state): State<AppState>,
    session: SessionUser,
    payload: Result<Json<CartItemInput>, JsonRejection>,
) -> Result<Json<CartResponse>, AppError> {
    let Json(input) = payload?;
    input.validate()?;

    let price = stored_price(&state, session.user_id, input.booking_id, input.product_id).await?;
    let item = input.into_item(price)?;

    let cart = state
        .repos
        .carts
        .update_cart(session.user_id, Box::new(move |cart: &mut Cart| cart.add_item(item)))
        .await?;
    Ok(Json(cart.into()))
}

/// PUT /api/cart/update/:itemId
/// Quantities below 1 leave the cart unchanged
pub async fn update_quantity(
    State(state): State<AppState>,
    session: SessionUser,
    Path(item_id): Path<String>,
    params: Result<Query<SlotParams>, QueryRejection>,
    payload: Result<Json<UpdateQuantityRequest>, JsonRejection>,
) -> Result<Json<CartResponse>, AppError> {
    let Query(params) = params?;
    let Json(req) = payload?;
    let key = params.key(item_id);

    let cart = state
        .repos
        .carts
        .update_cart(session.user_id, Box::new(move |cart: &mut Cart| cart.update_quantity(&key, req.quantity)))
        .await?;
    Ok(Json(cart.into()))
}

/// DELETE /api/cart/remove/:itemId
pub async fn remove_from_cart(
    State(state): State<AppState>,
    session: SessionUser,
    Path(item_id): Path<String>,
    params: Result<Query<SlotParams>, QueryRejection>,
) -> Result<Json<CartResponse>, AppError> {
    let Query(params) = params?;
    let key = params.key(item_id);

    let cart = state
        .repos
        .carts
        .update_cart(session.user_id, Box::new(move |cart: &mut Cart| cart.remove_item(&key)))
        .await?;
    Ok(Json(cart.into()))
}

/// DELETE /api/cart/clear
pub async fn clear_cart(
    State(state): State<AppState>,
    session: SessionUser,
) -> Result<Json<CartResponse>, AppError> {
    state.repos.carts.clear_cart(session.user_id).await?;
    Ok(Json(Cart::new().into()))
}

/// POST /api/cart/checkout
/// Pay for the whole cart. Inventory was already reserved at booking time.
pub async fn checkout(
    State(state): State<AppState>,
    session: SessionUser,
    payload: Result<Json<CheckoutRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<CheckoutResponse>), AppError> {
    let Json(req) = payload?;
    let method = PaymentMethod::parse(&req.payment_method)
        .ok_or_else(|| AppError::Validation("Invalid payment method".to_string()))?;

    // 1. Take the cart out of storage; a concurrent checkout sees it empty
    let taken = state.repos.carts.take_cart(session.user_id).await?;
    if taken.is_empty() {
        return Err(BookingError::EmptyCart.into());
    }

    // 2. Price, charge and record it, putting the items back on failure
    let order = match pay_for(&state, session.user_id, taken.clone(), method).await {
        Ok(order) => order,
        Err(err) => {
            restore_cart(&state, session.user_id, taken).await;
            return Err(err);
        }
    };

    tracing::info!(
        "Order {} paid by {} ({} items, total {} {})",
        order.id,
        order.payment_method,
        order.items.len(),
        order.total,
        order.currency
    );

    Ok((
        StatusCode::CREATED,
        Json(CheckoutResponse {
            message: "Payment successful",
            booking_ids: order.booking_ids(),
            order,
        }),
    ))
}

async fn pay_for(state: &AppState, user_id: Uuid, mut cart: Cart, method: PaymentMethod) -> Result<Order, AppError> {
    reprice(state, user_id, &mut cart).await?;
    let mut order = Order::from_cart(user_id, &cart, method, &state.business_rules.currency)?;

    let intent = state.payments.charge(&order).await?;
    order.mark_paid(intent.id);

    state.repos.orders.create_order(&order).await?;
    Ok(order)
}

async fn restore_cart(state: &AppState, user_id: Uuid, taken: Cart) {
    let restored = state
        .repos
        .carts
        .update_cart(
            user_id,
            Box::new(move |cart: &mut Cart| {
                cart.restore(taken);
                true
            }),
        )
        .await;
    if let Err(e) = restored {
        tracing::error!("Failed to restore cart for {} after checkout failure: {}", user_id, e);
    }
}
