use axum::{
    extract::{rejection::QueryRejection, Query, State},
    routing::get,
    Json, Router,
};
use serde::Serialize;

use tripnest_booking::{Booking, BookingQuery};

use crate::error::AppError;
use crate::middleware::SessionUser;
use crate::state::AppState;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingHistoryResponse {
    pub success: bool,
    pub count: usize,
    pub total: u64,
    pub page: u32,
    pub total_pages: u64,
    pub data: Vec<Booking>,
}

pub fn routes() -> Router<AppState> {
    Router::new().route("/bookings", get(booking_history))
}

/// GET /api/users/bookings?status=&type=&page=1&limit=10
pub async fn booking_history(
    State(state): State<AppState>,
    session: SessionUser,
    query: Result<Query<BookingQuery>, QueryRejection>,
) -> Result<Json<BookingHistoryResponse>, AppError> {
    let Query(query) = query?;
    let page = state
        .repos
        .bookings
        .page_user_bookings(session.user_id, &query)
        .await?;

    Ok(Json(BookingHistoryResponse {
        success: true,
        count: page.items.len(),
        total: page.total,
        page: page.page,
        total_pages: page.total_pages(),
        data: page.items,
    }))
}
