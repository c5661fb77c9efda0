use axum::{
    extract::{rejection::QueryRejection, Path, Query, State},
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use tripnest_catalog::listing::RoomType;
use tripnest_catalog::pricing::{quote_rooms, RoomQuote};
use tripnest_catalog::{Listing, ListingFilter, ListingKind, StayRequest};

use crate::error::AppError;
use crate::state::AppState;

const POPULAR_LIMIT: usize = 6;
const BY_LOCATION_LIMIT: usize = 20;

// ============================================================================
// Request/Response Types
// ============================================================================

/// Raw browse filters. Numbers arrive as strings so a bad value can be
/// reported by name instead of as a generic query rejection.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListingParams {
    pub city: Option<String>,
    pub country: Option<String>,
    pub cuisine: Option<String>,
    pub category: Option<String>,
    pub amenities: Option<String>,
    pub min_price: Option<String>,
    pub max_price: Option<String>,
    pub rating: Option<String>,
    pub check_in: Option<String>,
    pub check_out: Option<String>,
    pub guests: Option<String>,
    pub rooms: Option<String>,
}

impl ListingParams {
    /// Build the filter for `kind`; only the kind's own membership
    /// parameter is honoured.
    pub fn to_filter(&self, kind: ListingKind) -> Result<ListingFilter, AppError> {
        let tags = match kind {
            ListingKind::Hotel => self.amenities.as_deref(),
            ListingKind::Restaurant => self.cuisine.as_deref(),
            ListingKind::Attraction => self.category.as_deref(),
        }
        .map(ListingFilter::parse_tags)
        .unwrap_or_default();

        let stay = match kind {
            ListingKind::Hotel => self.stay()?,
            _ => None,
        };

        Ok(ListingFilter {
            city: non_empty(&self.city),
            country: non_empty(&self.country),
            tags,
            min_price: parse_number(&self.min_price, "minPrice")?,
            max_price: parse_number(&self.max_price, "maxPrice")?,
            min_rating: parse_number(&self.rating, "rating")?,
            stay,
        })
    }

    /// Present only when all of checkIn, checkOut, guests and rooms are given.
    fn stay(&self) -> Result<Option<StayRequest>, AppError> {
        if non_empty(&self.check_in).is_none() || non_empty(&self.check_out).is_none() {
            return Ok(None);
        }
        let guests = parse_number::<i32>(&self.guests, "guests")?;
        let rooms = parse_number::<i32>(&self.rooms, "rooms")?;
        Ok(guests.zip(rooms).map(|(guests, rooms)| StayRequest { guests, rooms }))
    }
}

#[derive(Debug, Deserialize)]
pub struct LocationParams {
    pub city: Option<String>,
    pub country: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ListResponse {
    pub success: bool,
    pub count: usize,
    pub data: Vec<Listing>,
}

impl ListResponse {
    fn new(data: Vec<Listing>) -> Self {
        Self {
            success: true,
            count: data.len(),
            data,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct DetailResponse {
    pub success: bool,
    pub data: Listing,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomsResponse {
    pub success: bool,
    pub hotel_name: String,
    pub rooms: Vec<RoomType>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AvailabilityResponse {
    pub success: bool,
    pub hotel_name: String,
    pub check_in: String,
    pub check_out: String,
    pub guests: i32,
    pub rooms: i32,
    pub availability: Vec<RoomQuote>,
}

fn non_empty(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(String::from)
}

fn parse_number<T: FromStr>(value: &Option<String>, name: &str) -> Result<Option<T>, AppError> {
    match non_empty(value) {
        Some(raw) => raw
            .parse()
            .map(Some)
            .map_err(|_| AppError::Validation(format!("Invalid {}", name))),
        None => Ok(None),
    }
}

// ============================================================================
// Routes
// ============================================================================

/// Browse and detail routes shared by every listing kind.
pub fn routes(kind: ListingKind) -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(move |state: State<AppState>, params: Result<Query<ListingParams>, QueryRejection>| {
                list_listings(kind, state, params)
            }),
        )
        .route(
            "/search/popular",
            get(move |state: State<AppState>| popular_listings(kind, state)),
        )
        .route(
            "/{id}",
            get(move |state: State<AppState>, id: Path<String>| get_listing(kind, state, id)),
        )
}

/// Hotel routes: the shared ones plus location search, rooms and availability.
pub fn hotel_routes() -> Router<AppState> {
    routes(ListingKind::Hotel)
        .route("/search/by-location", get(hotels_by_location))
        .route("/{id}/rooms", get(hotel_rooms))
        .route("/{id}/availability", get(hotel_availability))
}

// ============================================================================
// Handlers
// ============================================================================

async fn find_listing(state: &AppState, kind: ListingKind, id: &str) -> Result<Listing, AppError> {
    let not_found = || AppError::NotFound(format!("{} not found", kind.label()));
    let id = uuid::Uuid::parse_str(id).map_err(|_| not_found())?;
    state
        .repos
        .listings
        .get_listing(kind, id)
        .await?
        .ok_or_else(not_found)
}

/// GET /api/{hotels|restaurants|attractions}
pub async fn list_listings(
    kind: ListingKind,
    State(state): State<AppState>,
    params: Result<Query<ListingParams>, QueryRejection>,
) -> Result<Json<ListResponse>, AppError> {
    let Query(params) = params?;
    let filter = params.to_filter(kind)?;

    let listings = state.repos.listings.list_listings(kind).await?;
    let data = filter.apply(listings);
    tracing::debug!("{} browse returned {} listings", kind, data.len());

    Ok(Json(ListResponse::new(data)))
}

/// GET /api/{kind}/search/popular
pub async fn popular_listings(
    kind: ListingKind,
    State(state): State<AppState>,
) -> Result<Json<ListResponse>, AppError> {
    let data = state
        .repos
        .listings
        .list_listings(kind)
        .await?
        .into_iter()
        .filter(|l| l.is_popular)
        .take(POPULAR_LIMIT)
        .collect();
    Ok(Json(ListResponse::new(data)))
}

/// GET /api/{kind}/:id
pub async fn get_listing(
    kind: ListingKind,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<DetailResponse>, AppError> {
    let data = find_listing(&state, kind, &id).await?;
    Ok(Json(DetailResponse { success: true, data }))
}

/// GET /api/hotels/search/by-location?city=&country=
pub async fn hotels_by_location(
    State(state): State<AppState>,
    params: Result<Query<LocationParams>, QueryRejection>,
) -> Result<Json<ListResponse>, AppError> {
    let Query(params) = params?;
    let filter = ListingFilter {
        city: non_empty(&params.city),
        country: non_empty(&params.country),
        ..Default::default()
    };
    if filter.city.is_none() && filter.country.is_none() {
        return Err(AppError::Validation("City or country parameter is required".to_string()));
    }

    let mut data = filter.apply(state.repos.listings.list_listings(ListingKind::Hotel).await?);
    data.truncate(BY_LOCATION_LIMIT);
    Ok(Json(ListResponse::new(data)))
}

/// GET /api/hotels/:id/rooms
pub async fn hotel_rooms(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<RoomsResponse>, AppError> {
    let hotel = find_listing(&state, ListingKind::Hotel, &id).await?;
    Ok(Json(RoomsResponse {
        success: true,
        rooms: hotel.room_types().to_vec(),
        hotel_name: hotel.name,
    }))
}

/// GET /api/hotels/:id/availability?checkIn=&checkOut=&guests=&rooms=
pub async fn hotel_availability(
    State(state): State<AppState>,
    Path(id): Path<String>,
    params: Result<Query<ListingParams>, QueryRejection>,
) -> Result<Json<AvailabilityResponse>, AppError> {
    let Query(params) = params?;
    let hotel = find_listing(&state, ListingKind::Hotel, &id).await?;

    // 1. All four parameters are required here
    let missing = || AppError::Validation("Please provide checkIn, checkOut, guests, and rooms".to_string());
    let check_in = non_empty(&params.check_in).ok_or_else(missing)?;
    let check_out = non_empty(&params.check_out).ok_or_else(missing)?;
    let guests = parse_number::<i32>(&params.guests, "guests")?.ok_or_else(missing)?;
    let rooms = parse_number::<i32>(&params.rooms, "rooms")?.ok_or_else(missing)?;
    if guests < 1 || rooms < 1 {
        return Err(AppError::Validation("Guests and rooms must be at least 1".to_string()));
    }

    // 2. Quote every room type that fits
    let availability = quote_rooms(hotel.room_types(), guests, rooms);

    Ok(Json(AvailabilityResponse {
        success: true,
        hotel_name: hotel.name,
        check_in,
        check_out,
        guests,
        rooms,
        availability,
    }))
}
