//! In-process store behind one async mutex. Every operation that touches
//! stock runs entirely under the lock, which gives it the same
//! all-or-nothing behaviour as the PostgreSQL transactions.

use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use tokio::sync::Mutex;
use uuid::Uuid;

use tripnest_booking::{
    releases_inventory, Booking, BookingQuery, Cart, NewBooking, Order, OrderStatusChange, Page,
    StatusChange,
};
use tripnest_catalog::inventory::{self, check_amount};
use tripnest_catalog::{InventoryError, Listing, ListingKind, Product, ProductCategory, ProductUpdate};
use tripnest_core::repository::{
    BookingRepository, CartEdit, CartRepository, ListingRepository, OrderRepository, ProductRepository,
    Reservation,
};
use tripnest_core::{CoreError, CoreResult};
use tripnest_shared::{InventoryMovement, MovementReason};

#[derive(Default)]
struct MemoryState {
    products: HashMap<Uuid, Product>,
    ledger: Vec<InventoryMovement>,
    /// `(booking_id, reason)` pairs already in the ledger
    ledger_keys: HashSet<(Uuid, MovementReason)>,
    bookings: Vec<Booking>,
    listings: Vec<Listing>,
    carts: HashMap<Uuid, Cart>,
    orders: Vec<Order>,
}

impl MemoryState {
    fn record(&mut self, movement: InventoryMovement) -> bool {
        if let Some(booking_id) = movement.booking_id {
            if !self.ledger_keys.insert((booking_id, movement.reason)) {
                return false;
            }
        }
        self.ledger.push(movement);
        true
    }

    fn product_mut(&mut self, id: Uuid) -> CoreResult<&mut Product> {
        self.products.get_mut(&id).ok_or(CoreError::NotFound("Product"))
    }
}

#[derive(Default)]
pub struct MemoryStore {
    state: Mutex<MemoryState>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn newest_first<T, K: Ord>(items: &mut [T], key: impl Fn(&T) -> K) {
    items.sort_by_key(|item| std::cmp::Reverse(key(item)));
}

#[async_trait]
impl ProductRepository for MemoryStore {
    async fn list_products(&self, category: Option<ProductCategory>) -> CoreResult<Vec<Product>> {
        let state = self.state.lock().await;
        let mut products: Vec<Product> = state
            .products
            .values()
            .filter(|p| category.map_or(true, |c| p.category == c))
            .cloned()
            .collect();
        newest_first(&mut products, |p| p.created_at);
        Ok(products)
    }

    async fn get_product(&self, id: Uuid) -> CoreResult<Option<Product>> {
        Ok(self.state.lock().await.products.get(&id).cloned())
    }

    async fn create_product(&self, product: &Product) -> CoreResult<()> {
        self.state.lock().await.products.insert(product.id, product.clone());
        Ok(())
    }

    async fn update_product(&self, id: Uuid, update: &ProductUpdate) -> CoreResult<Option<Product>> {
        let mut state = self.state.lock().await;
        let Some(product) = state.products.get_mut(&id) else {
            return Ok(None);
        };
        update.apply(product)?;
        Ok(Some(product.clone()))
    }

    async fn delete_product(&self, id: Uuid) -> CoreResult<bool> {
        Ok(self.state.lock().await.products.remove(&id).is_some())
    }

    async fn reduce_quantity(&self, id: Uuid, amount: i32) -> CoreResult<Product> {
        check_amount(amount)?;
        let mut state = self.state.lock().await;
        let product = state.product_mut(id)?;
        product.reduce_quantity(amount)?;
        let product = product.clone();
        state.record(InventoryMovement::new(id, None, -amount, MovementReason::ManualReduce));
        Ok(product)
    }

    async fn add_quantity(&self, id: Uuid, amount: i32) -> CoreResult<Product> {
        check_amount(amount)?;
        let mut state = self.state.lock().await;
        let product = state.product_mut(id)?;
        product.add_quantity(amount)?;
        let product = product.clone();
        state.record(InventoryMovement::new(id, None, amount, MovementReason::Restock));
        Ok(product)
    }

    async fn ledger(&self, id: Uuid) -> CoreResult<Vec<InventoryMovement>> {
        let state = self.state.lock().await;
        Ok(state.ledger.iter().filter(|m| m.product_id == id).cloned().collect())
    }
}

#[async_trait]
impl BookingRepository for MemoryStore {
    async fn create_booking(&self, new_booking: NewBooking) -> CoreResult<Reservation> {
        let booking = new_booking.into_booking();
        let mut state = self.state.lock().await;

        let mut quantity_reduced = false;
        if let Some(product_id) = booking.product_id {
            let product = state.product_mut(product_id)?;
            match product.reduce_quantity(inventory::UNITS_PER_BOOKING) {
                Ok(()) => {}
                Err(InventoryError::InsufficientQuantity { .. }) => {
                    return Err(CoreError::FullyBooked(booking.booking_type()));
                }
                Err(other) => return Err(other.into()),
            }
            state.record(inventory::reservation(product_id, booking.id));
            quantity_reduced = true;
        }

        state.bookings.push(booking.clone());
        Ok(Reservation {
            booking,
            quantity_reduced,
        })
    }

    async fn get_booking(&self, id: Uuid, user_id: Uuid) -> CoreResult<Option<Booking>> {
        let state = self.state.lock().await;
        Ok(state
            .bookings
            .iter()
            .find(|b| b.id == id && b.user_id == Some(user_id))
            .cloned())
    }

    async fn list_user_bookings(&self, user_id: Uuid) -> CoreResult<Vec<Booking>> {
        let state = self.state.lock().await;
        let mut bookings: Vec<Booking> = state
            .bookings
            .iter()
            .filter(|b| b.user_id == Some(user_id))
            .cloned()
            .collect();
        newest_first(&mut bookings, |b| b.booking_date);
        Ok(bookings)
    }

    async fn page_user_bookings(&self, user_id: Uuid, query: &BookingQuery) -> CoreResult<Page<Booking>> {
        let mut bookings = self.list_user_bookings(user_id).await?;
        bookings.retain(|b| query.matches(b.status, b.booking_type()));
        Ok(Page::from_sorted(bookings, query))
    }

    async fn list_all_bookings(&self) -> CoreResult<Vec<Booking>> {
        let mut bookings = self.state.lock().await.bookings.clone();
        newest_first(&mut bookings, |b| b.booking_date);
        Ok(bookings)
    }

    async fn change_status(&self, id: Uuid, user_id: Uuid, change: StatusChange) -> CoreResult<Booking> {
        let mut state = self.state.lock().await;
        let booking = state
            .bookings
            .iter_mut()
            .find(|b| b.id == id && b.user_id == Some(user_id))
            .ok_or(CoreError::NotFound("Booking"))?;

        let previous = booking.status;
        let next = change.resolve(previous)?;
        if next == previous {
            return Ok(booking.clone());
        }
        booking.set_status(next);
        let booking = booking.clone();

        if releases_inventory(previous, next) {
            if let Some(product_id) = booking.product_id {
                if state.record(inventory::release(product_id, booking.id)) {
                    if let Some(product) = state.products.get_mut(&product_id) {
                        product.add_quantity(inventory::UNITS_PER_BOOKING)?;
                    }
                }
            }
        }
        Ok(booking)
    }
}

#[async_trait]
impl ListingRepository for MemoryStore {
    async fn list_listings(&self, kind: ListingKind) -> CoreResult<Vec<Listing>> {
        let state = self.state.lock().await;
        let mut listings: Vec<Listing> = state.listings.iter().filter(|l| l.kind() == kind).cloned().collect();
        newest_first(&mut listings, |l| l.created_at);
        Ok(listings)
    }

    async fn get_listing(&self, kind: ListingKind, id: Uuid) -> CoreResult<Option<Listing>> {
        let state = self.state.lock().await;
        Ok(state
            .listings
            .iter()
            .find(|l| l.id == id && l.kind() == kind)
            .cloned())
    }

    async fn save_listing(&self, listing: &Listing) -> CoreResult<()> {
        let mut state = self.state.lock().await;
        state.listings.retain(|l| l.id != listing.id);
        state.listings.push(listing.clone());
        Ok(())
    }
}

#[async_trait]
impl CartRepository for MemoryStore {
    async fn get_cart(&self, user_id: Uuid) -> CoreResult<Cart> {
        Ok(self.state.lock().await.carts.get(&user_id).cloned().unwrap_or_default())
    }

    async fn update_cart(&self, user_id: Uuid, edit: CartEdit) -> CoreResult<Cart> {
        let mut state = self.state.lock().await;
        let mut cart = state.carts.get(&user_id).cloned().unwrap_or_default();
        if edit(&mut cart) {
            state.carts.insert(user_id, cart.clone());
        }
        Ok(cart)
    }

    async fn clear_cart(&self, user_id: Uuid) -> CoreResult<()> {
        self.state.lock().await.carts.remove(&user_id);
        Ok(())
    }

    async fn take_cart(&self, user_id: Uuid) -> CoreResult<Cart> {
        Ok(self.state.lock().await.carts.remove(&user_id).unwrap_or_default())
    }
}

#[async_trait]
impl OrderRepository for MemoryStore {
    async fn create_order(&self, order: &Order) -> CoreResult<()> {
        self.state.lock().await.orders.push(order.clone());
        Ok(())
    }

    async fn get_order(&self, id: Uuid, user_id: Uuid) -> CoreResult<Option<Order>> {
        let state = self.state.lock().await;
        Ok(state
            .orders
            .iter()
            .find(|o| o.id == id && o.user_id == user_id)
            .cloned())
    }

    async fn list_user_orders(&self, user_id: Uuid) -> CoreResult<Vec<Order>> {
        let state = self.state.lock().await;
        let mut orders: Vec<Order> = state.orders.iter().filter(|o| o.user_id == user_id).cloned().collect();
        newest_first(&mut orders, |o| o.created_at);
        Ok(orders)
    }

    async fn change_order_status(&self, id: Uuid, user_id: Uuid, change: OrderStatusChange) -> CoreResult<Order> {
        let mut state = self.state.lock().await;
        let order = state
            .orders
            .iter_mut()
            .find(|o| o.id == id && o.user_id == user_id)
            .ok_or(CoreError::NotFound("Order"))?;

        order.status = change.resolve(order.status)?;
        Ok(order.clone())
    }
}
