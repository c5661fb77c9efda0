use async_trait::async_trait;
use serde::Serialize;
use uuid::Uuid;

use tripnest_booking::{
    Booking, BookingQuery, Cart, NewBooking, Order, OrderStatusChange, Page, StatusChange,
};
use tripnest_catalog::{Listing, ListingKind, Product, ProductCategory, ProductUpdate};
use tripnest_shared::InventoryMovement;

use crate::CoreResult;

/// A stored booking and whether it took a unit of stock.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Reservation {
    pub booking: Booking,
    pub quantity_reduced: bool,
}

/// Products and their stock counters
#[async_trait]
pub trait ProductRepository: Send + Sync {
    /// Newest first, optionally restricted to one category.
    async fn list_products(&self, category: Option<ProductCategory>) -> CoreResult<Vec<Product>>;

    async fn get_product(&self, id: Uuid) -> CoreResult<Option<Product>>;

    async fn create_product(&self, product: &Product) -> CoreResult<()>;

    async fn update_product(&self, id: Uuid, update: &ProductUpdate) -> CoreResult<Option<Product>>;

    async fn delete_product(&self, id: Uuid) -> CoreResult<bool>;

    /// Conditional decrement; fails with `InsufficientQuantity` instead of going negative.
    async fn reduce_quantity(&self, id: Uuid, amount: i32) -> CoreResult<Product>;

    async fn add_quantity(&self, id: Uuid, amount: i32) -> CoreResult<Product>;

    /// Stock movements for one product, oldest first.
    async fn ledger(&self, id: Uuid) -> CoreResult<Vec<InventoryMovement>>;
}

/// Bookings, including the stock effects of creating and cancelling them
#[async_trait]
pub trait BookingRepository: Send + Sync {
    /// Store the booking and, when it references a product, take one unit of
    /// that product in the same unit of work.
    async fn create_booking(&self, booking: NewBooking) -> CoreResult<Reservation>;

    async fn get_booking(&self, id: Uuid, user_id: Uuid) -> CoreResult<Option<Booking>>;

    /// Newest first.
    async fn list_user_bookings(&self, user_id: Uuid) -> CoreResult<Vec<Booking>>;

    async fn page_user_bookings(&self, user_id: Uuid, query: &BookingQuery) -> CoreResult<Page<Booking>>;

    async fn list_all_bookings(&self) -> CoreResult<Vec<Booking>>;

    /// Apply `change` to the caller's booking. A move into `cancelled` gives
    /// the reserved unit back, at most once per booking.
    async fn change_status(&self, id: Uuid, user_id: Uuid, change: StatusChange) -> CoreResult<Booking>;
}

/// Hotels, restaurants and attractions
#[async_trait]
pub trait ListingRepository: Send + Sync {
    async fn list_listings(&self, kind: ListingKind) -> CoreResult<Vec<Listing>>;

    async fn get_listing(&self, kind: ListingKind, id: Uuid) -> CoreResult<Option<Listing>>;

    async fn save_listing(&self, listing: &Listing) -> CoreResult<()>;
}

/// A cart edit. Returns whether it changed the cart; unchanged carts are not
/// written back.
pub type CartEdit = Box<dyn FnOnce(&mut Cart) -> bool + Send>;

/// One cart per session user. Every write is a single read-modify-write
/// step, so concurrent requests for one user never lose each other's edits.
#[async_trait]
pub trait CartRepository: Send + Sync {
    /// An empty cart when none is stored.
    async fn get_cart(&self, user_id: Uuid) -> CoreResult<Cart>;

    /// Apply `edit` to the stored cart and return the result.
    async fn update_cart(&self, user_id: Uuid, edit: CartEdit) -> CoreResult<Cart>;

    async fn clear_cart(&self, user_id: Uuid) -> CoreResult<()>;

    /// Remove the cart and hand it to the caller. Of two concurrent takes,
    /// only one gets the items.
    async fn take_cart(&self, user_id: Uuid) -> CoreResult<Cart>;
}

#[async_trait]
pub trait OrderRepository: Send + Sync {
    async fn create_order(&self, order: &Order) -> CoreResult<()>;

    async fn get_order(&self, id: Uuid, user_id: Uuid) -> CoreResult<Option<Order>>;

    /// Newest first.
    async fn list_user_orders(&self, user_id: Uuid) -> CoreResult<Vec<Order>>;

    /// Apply `change` to the caller's order.
    async fn change_order_status(&self, id: Uuid, user_id: Uuid, change: OrderStatusChange) -> CoreResult<Order>;
}
