use axum::{
    extract::{rejection::JsonRejection, Path, State},
    routing::{get, patch},
    Json, Router,
};
use serde::{Deserialize, Serialize};

use tripnest_booking::{Order, OrderStatus, OrderStatusChange};

use crate::error::AppError;
use crate::middleware::SessionUser;
use crate::parse_id;
use crate::state::AppState;

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct UpdateOrderStatusRequest {
    pub status: String,
}

#[derive(Debug, Serialize)]
pub struct OrderResponse {
    pub message: &'static str,
    pub order: Order,
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/my-orders", get(my_orders))
        .route("/{id}", get(get_order).delete(cancel_order))
        .route("/{id}/status", patch(update_order_status))
}

// ============================================================================
// Handlers
// ============================================================================

/// GET /api/orders/my-orders
/// Newest first
pub async fn my_orders(
    State(state): State<AppState>,
    session: SessionUser,
) -> Result<Json<Vec<Order>>, AppError> {
    let orders = state.repos.orders.list_user_orders(session.user_id).await?;
    Ok(Json(orders))
}

/// GET /api/orders/:id
pub async fn get_order(
    State(state): State<AppState>,
    session: SessionUser,
    Path(id): Path<String>,
) -> Result<Json<Order>, AppError> {
    let id = parse_id(&id, "Order")?;
    let order = state
        .repos
        .orders
        .get_order(id, session.user_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Order not found".to_string()))?;
    Ok(Json(order))
}

/// PATCH /api/orders/:id/status
pub async fn update_order_status(
    State(state): State<AppState>,
    session: SessionUser,
    Path(id): Path<String>,
    payload: Result<Json<UpdateOrderStatusRequest>, JsonRejection>,
) -> Result<Json<OrderResponse>, AppError> {
    let Json(req) = payload?;
    let status = OrderStatus::parse(&req.status)
        .ok_or_else(|| AppError::Validation("Invalid status".to_string()))?;
    let id = parse_id(&id, "Order")?;

    let order = state
        .repos
        .orders
        .change_order_status(id, session.user_id, OrderStatusChange::Set(status))
        .await?;

    tracing::info!("Order {} is now {}", order.id, order.status);
    Ok(Json(OrderResponse {
        message: "Order status updated successfully",
        order,
    }))
}

/// DELETE /api/orders/:id
/// Only pending orders can be cancelled
pub async fn cancel_order(
    State(state): State<AppState>,
    session: SessionUser,
    Path(id): Path<String>,
) -> Result<Json<OrderResponse>, AppError> {
    let id = parse_id(&id, "Order")?;
    let order = state
        .repos
        .orders
        .change_order_status(id, session.user_id, OrderStatusChange::Cancel)
        .await?;

    tracing::info!("Order {} cancelled", order.id);
    Ok(Json(OrderResponse {
        message: "Order cancelled successfully",
        order,
    }))
}
