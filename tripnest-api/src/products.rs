use axum::{
    extract::{rejection::JsonRejection, rejection::QueryRejection, Path, Query, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use tripnest_catalog::{NewProduct, Product, ProductCategory, ProductUpdate};
use tripnest_shared::InventoryMovement;

use crate::error::AppError;
use crate::middleware::SessionUser;
use crate::parse_id;
use crate::state::AppState;

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct ProductListQuery {
    pub category: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct QuantityRequest {
    pub amount: i32,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuantityResponse {
    pub message: &'static str,
    pub product: Product,
    pub new_quantity: i32,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LedgerResponse {
    pub product_id: uuid::Uuid,
    pub quantity: i32,
    pub net_change: i64,
    pub movements: Vec<InventoryMovement>,
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_products).post(create_product))
        .route("/{id}", get(get_product).put(update_product).delete(delete_product))
        .route("/{id}/reduce-quantity", post(reduce_quantity))
        .route("/{id}/add-quantity", post(add_quantity))
        .route("/{id}/ledger", get(product_ledger))
}

// ============================================================================
// Handlers
// ============================================================================

/// GET /api/products?category=
/// Newest first
pub async fn list_products(
    State(state): State<AppState>,
    query: Result<Query<ProductListQuery>, QueryRejection>,
) -> Result<Json<Vec<Product>>, AppError> {
    let Query(query) = query?;
    let category = match query.category.as_deref().filter(|c| !c.is_empty()) {
        Some(raw) => Some(raw.parse::<ProductCategory>()?),
        None => None,
    };

    let products = state.repos.products.list_products(category).await?;
    Ok(Json(products))
}

/// GET /api/products/:id
pub async fn get_product(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Product>, AppError> {
    let id = parse_id(&id, "Product")?;
    let product = state
        .repos
        .products
        .get_product(id)
        .await?
        .ok_or_else(|| AppError::NotFound("Product not found".to_string()))?;
    Ok(Json(product))
}

/// POST /api/products
pub async fn create_product(
    State(state): State<AppState>,
    _session: SessionUser,
    payload: Result<Json<NewProduct>, JsonRejection>,
) -> Result<(StatusCode, Json<Value>), AppError> {
    let Json(input) = payload?;
    input.validate()?;

    let product = Product::new(input);
    state.repos.products.create_product(&product).await?;
    tracing::info!("Product {} created ({})", product.id, product.category);

    Ok((
        StatusCode::CREATED,
        Json(json!({ "message": "Product created successfully", "product": product })),
    ))
}

/// PUT /api/products/:id
/// Quantity is not updatable here; use the reduce/add endpoints
pub async fn update_product(
    State(state): State<AppState>,
    _session: SessionUser,
    Path(id): Path<String>,
    payload: Result<Json<ProductUpdate>, JsonRejection>,
) -> Result<Json<Value>, AppError> {
    let id = parse_id(&id, "Product")?;
    let Json(update) = payload?;

    let product = state
        .repos
        .products
        .update_product(id, &update)
        .await?
        .ok_or_else(|| AppError::NotFound("Product not found".to_string()))?;

    Ok(Json(json!({ "message": "Product updated successfully", "product": product })))
}

/// DELETE /api/products/:id
pub async fn delete_product(
    State(state): State<AppState>,
    _session: SessionUser,
    Path(id): Path<String>,
) -> Result<Json<Value>, AppError> {
    let id = parse_id(&id, "Product")?;
    if !state.repos.products.delete_product(id).await? {
        return Err(AppError::NotFound("Product not found".to_string()));
    }
    tracing::info!("Product {} deleted", id);
    Ok(Json(json!({ "message": "Product deleted successfully" })))
}

/// POST /api/products/:id/reduce-quantity
pub async fn reduce_quantity(
    State(state): State<AppState>,
    _session: SessionUser,
    Path(id): Path<String>,
    payload: Result<Json<QuantityRequest>, JsonRejection>,
) -> Result<Json<QuantityResponse>, AppError> {
    let id = parse_id(&id, "Product")?;
    let Json(req) = payload?;

    let product = state.repos.products.reduce_quantity(id, req.amount).await?;
    Ok(Json(QuantityResponse {
        message: "Quantity reduced successfully",
        new_quantity: product.quantity,
        product,
    }))
}

/// POST /api/products/:id/add-quantity
pub async fn add_quantity(
    State(state): State<AppState>,
    _session: SessionUser,
    Path(id): Path<String>,
    payload: Result<Json<QuantityRequest>, JsonRejection>,
) -> Result<Json<QuantityResponse>, AppError> {
    let id = parse_id(&id, "Product")?;
    let Json(req) = payload?;

    let product = state.repos.products.add_quantity(id, req.amount).await?;
    Ok(Json(QuantityResponse {
        message: "Quantity added successfully",
        new_quantity: product.quantity,
        product,
    }))
}

/// GET /api/products/:id/ledger
pub async fn product_ledger(
    State(state): State<AppState>,
    _session: SessionUser,
    Path(id): Path<String>,
) -> Result<Json<LedgerResponse>, AppError> {
    let id = parse_id(&id, "Product")?;
    let product = state
        .repos
        .products
        .get_product(id)
        .await?
        .ok_or_else(|| AppError::NotFound("Product not found".to_string()))?;

    let movements = state.repos.products.ledger(id).await?;
    Ok(Json(LedgerResponse {
        product_id: id,
        quantity: product.quantity,
        net_change: InventoryMovement::net(&movements),
        movements,
    }))
}
