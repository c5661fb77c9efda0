use axum::{
    http::{header, Method, StatusCode},
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use serde_json::json;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use uuid::Uuid;

use tripnest_catalog::ListingKind;

pub mod auth;
pub mod bookings;
pub mod cart;
pub mod error;
pub mod listings;
pub mod middleware;
pub mod orders;
pub mod products;
pub mod state;
pub mod users;

pub use error::AppError;
pub use state::AppState;

/// Parse a path id. Anything that is not a UUID cannot name a stored
/// record, so it is reported as "`what` not found".
pub(crate) fn parse_id(raw: &str, what: &'static str) -> Result<Uuid, AppError> {
    Uuid::parse_str(raw).map_err(|_| AppError::NotFound(format!("{} not found", what)))
}

pub fn app(state: AppState) -> Router {
    // CORS Middleware
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE]);

    Router::new()
        .route("/", get(welcome))
        .nest("/api/auth", auth::routes())
        .nest("/api/products", products::routes())
        .nest("/api/bookings", bookings::routes())
        .nest("/api/hotels", listings::hotel_routes())
        .nest("/api/restaurants", listings::routes(ListingKind::Restaurant))
        .nest("/api/attractions", listings::routes(ListingKind::Attraction))
        .nest("/api/users", users::routes())
        .nest("/api/cart", cart::routes())
        .nest("/api/orders", orders::routes())
        .fallback(route_not_found)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// GET /
async fn welcome() -> impl IntoResponse {
    Json(json!({ "message": "Welcome to the TripNest API" }))
}

async fn route_not_found() -> impl IntoResponse {
    (StatusCode::NOT_FOUND, Json(json!({ "message": "Route not found" })))
}
