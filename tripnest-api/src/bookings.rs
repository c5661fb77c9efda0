use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    routing::{get, patch, post},
    Json, Router,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};

use tripnest_booking::{
    AttractionBookingRequest, Booking, BookingContext, BookingStatus, HotelBookingRequest,
    NewBooking, RestaurantBookingRequest, StatusChange,
};
use tripnest_shared::pii::mask_email;

use crate::error::AppError;
use crate::middleware::SessionUser;
use crate::parse_id;
use crate::state::AppState;

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateBookingResponse {
    pub message: String,
    pub booking: Booking,
    pub quantity_reduced: bool,
}

#[derive(Debug, Serialize)]
pub struct BookingMessageResponse {
    pub message: &'static str,
    pub booking: Booking,
}

#[derive(Debug, Deserialize)]
pub struct UpdateStatusRequest {
    pub status: Option<String>,
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/hotel", post(create_hotel_booking))
        .route("/restaurant", post(create_restaurant_booking))
        .route("/attraction", post(create_attraction_booking))
        .route("/my-bookings", get(my_bookings))
        .route("/admin/all", get(all_bookings))
        .route("/{id}", get(get_booking).delete(cancel_booking))
        .route("/{id}/status", patch(update_status))
}

fn context(state: &AppState, session: SessionUser) -> BookingContext {
    BookingContext {
        user_id: session.user_id,
        today: Utc::now().date_naive(),
        currency: state.business_rules.currency.clone(),
    }
}

/// Store a validated booking and build the 201 response.
async fn persist(
    state: &AppState,
    booking: NewBooking,
) -> Result<(StatusCode, Json<CreateBookingResponse>), AppError> {
    let booking_type = booking.booking_type();
    let email = mask_email(&booking.email);

    let reservation = state.repos.bookings.create_booking(booking).await.map_err(|e| {
        tracing::warn!("{} booking for {} rejected: {}", booking_type, email, e);
        e
    })?;

    tracing::info!(
        "{} booking {} created for {} (quantity reduced: {})",
        booking_type,
        reservation.booking.id,
        email,
        reservation.quantity_reduced
    );

    Ok((
        StatusCode::CREATED,
        Json(CreateBookingResponse {
            message: format!("{} booking created successfully", booking_type.label()),
            booking: reservation.booking,
            quantity_reduced: reservation.quantity_reduced,
        }),
    ))
}

// ============================================================================
// Handlers
// ============================================================================

/// POST /api/bookings/hotel
pub async fn create_hotel_booking(
    State(state): State<AppState>,
    session: SessionUser,
    payload: Result<Json<HotelBookingRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<CreateBookingResponse>), AppError> {
    let Json(req) = payload?;
    let booking = req.validate(&context(&state, session))?;
    persist(&state, booking).await
}

/// POST /api/bookings/restaurant
pub async fn create_restaurant_booking(
    State(state): State<AppState>,
    session: SessionUser,
    payload: Result<Json<RestaurantBookingRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<CreateBookingResponse>), AppError> {
    let Json(req) = payload?;
    let booking = req.validate(&context(&state, session))?;
    persist(&state, booking).await
}

/// POST /api/bookings/attraction
pub async fn create_attraction_booking(
    State(state): State<AppState>,
    session: SessionUser,
    payload: Result<Json<AttractionBookingRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<CreateBookingResponse>), AppError> {
    let Json(req) = payload?;
    let booking = req.validate(&context(&state, session))?;
    persist(&state, booking).await
}

/// GET /api/bookings/my-bookings
/// Newest first
pub async fn my_bookings(
    State(state): State<AppState>,
    session: SessionUser,
) -> Result<Json<Vec<Booking>>, AppError> {
    let bookings = state.repos.bookings.list_user_bookings(session.user_id).await?;
    Ok(Json(bookings))
}

/// GET /api/bookings/admin/all
pub async fn all_bookings(
    State(state): State<AppState>,
    _session: SessionUser,
) -> Result<Json<Vec<Booking>>, AppError> {
    let bookings = state.repos.bookings.list_all_bookings().await?;
    Ok(Json(bookings))
}

/// GET /api/bookings/:id
pub async fn get_booking(
    State(state): State<AppState>,
    session: SessionUser,
    Path(id): Path<String>,
) -> Result<Json<Booking>, AppError> {
    let id = parse_id(&id, "Booking")?;
    let booking = state
        .repos
        .bookings
        .get_booking(id, session.user_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Booking not found".to_string()))?;
    Ok(Json(booking))
}

/// PATCH /api/bookings/:id/status
pub async fn update_status(
    State(state): State<AppState>,
    session: SessionUser,
    Path(id): Path<String>,
    payload: Result<Json<UpdateStatusRequest>, JsonRejection>,
) -> Result<Json<BookingMessageResponse>, AppError> {
    let id = parse_id(&id, "Booking")?;
    let Json(req) = payload?;

    // 1. Only the four known statuses
    let status: BookingStatus = req
        .status
        .as_deref()
        .unwrap_or_default()
        .parse()?;

    // 2. Transition (and release, if cancelling) under the booking's lock
    let booking = state
        .repos
        .bookings
        .change_status(id, session.user_id, StatusChange::Set(status))
        .await?;

    tracing::info!("Booking {} is now {}", booking.id, booking.status);
    Ok(Json(BookingMessageResponse {
        message: "Booking status updated",
        booking,
    }))
}

/// DELETE /api/bookings/:id
/// Cancel a pending booking
pub async fn cancel_booking(
    State(state): State<AppState>,
    session: SessionUser,
    Path(id): Path<String>,
) -> Result<Json<BookingMessageResponse>, AppError> {
    let id = parse_id(&id, "Booking")?;
    let booking = state
        .repos
        .bookings
        .change_status(id, session.user_id, StatusChange::Cancel)
        .await?;

    tracing::info!("Booking {} cancelled", booking.id);
    Ok(Json(BookingMessageResponse {
        message: "Booking cancelled successfully",
        booking,
    }))
}
