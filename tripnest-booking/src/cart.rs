use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tripnest_shared::money::round_cents;
use uuid::Uuid;

use crate::BookingError;

/// Upper bound on the units of one cart entry.
pub const MAX_ITEM_QUANTITY: u32 = 99;

/// An item the user intends to pay for.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CartItem {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub item_type: String,
    pub price: f64,
    pub image: Option<String>,
    pub quantity: u32,
    pub booking_date: Option<String>,
    pub booking_id: Option<Uuid>,
    pub product_id: Option<Uuid>,
    pub check_in: Option<String>,
    pub check_out: Option<String>,
    pub date: Option<String>,
    pub time: Option<String>,
}

impl CartItem {
    pub fn line_total(&self) -> f64 {
        self.price * self.quantity as f64
    }

    /// An entry paying for a stored booking covers exactly that booking,
    /// so its quantity stays at 1.
    pub fn is_booked(&self) -> bool {
        self.booking_id.is_some()
    }

    fn same_slot(&self, other: &CartItem) -> bool {
        self.id == other.id && self.item_type == other.item_type && self.booking_date == other.booking_date
    }

    fn bump(&mut self, by: u32) {
        if !self.is_booked() {
            self.quantity = self.quantity.saturating_add(by).min(MAX_ITEM_QUANTITY);
        }
    }
}

/// Selects cart entries by `id`, optionally narrowed to one `type` and
/// `bookingDate`. Without the narrowing fields every entry with the id matches.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SlotKey {
    pub id: String,
    pub item_type: Option<String>,
    pub booking_date: Option<String>,
}

impl SlotKey {
    pub fn id(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Self::default()
        }
    }

    pub fn matches(&self, item: &CartItem) -> bool {
        item.id == self.id
            && self.item_type.as_ref().is_none_or(|t| *t == item.item_type)
            && self
                .booking_date
                .as_ref()
                .is_none_or(|d| item.booking_date.as_ref() == Some(d))
    }
}

/// Body of `POST /api/cart/add`. Neither quantity nor price is accepted: a
/// new entry starts at 1 and is priced from the booking or product it names.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartItemInput {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub item_type: String,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub booking_date: Option<String>,
    #[serde(default)]
    pub booking_id: Option<Uuid>,
    #[serde(default)]
    pub product_id: Option<Uuid>,
    #[serde(default)]
    pub check_in: Option<String>,
    #[serde(default)]
    pub check_out: Option<String>,
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default)]
    pub time: Option<String>,
}

impl CartItemInput {
    /// Check the shape of the input before anything is looked up.
    pub fn validate(&self) -> Result<(), BookingError> {
        if self.id.trim().is_empty() {
            return Err(BookingError::InvalidCartItem("id is required".to_string()));
        }
        if self.name.trim().is_empty() {
            return Err(BookingError::InvalidCartItem("name is required".to_string()));
        }
        if self.item_type.trim().is_empty() {
            return Err(BookingError::InvalidCartItem("type is required".to_string()));
        }
        if self.booking_id.is_none() && self.product_id.is_none() {
            return Err(BookingError::InvalidCartItem(
                "a bookingId or productId is required".to_string(),
            ));
        }
        Ok(())
    }

    /// Build the entry at `price`, which the caller resolved from storage.
    pub fn into_item(self, price: f64) -> Result<CartItem, BookingError> {
        self.validate()?;
        if !price.is_finite() || price < 0.0 {
            return Err(BookingError::InvalidCartItem("price must be a non-negative number".to_string()));
        }
        Ok(CartItem {
            id: self.id,
            name: self.name,
            item_type: self.item_type,
            price,
            image: self.image,
            quantity: 1,
            booking_date: self.booking_date,
            booking_id: self.booking_id,
            product_id: self.product_id,
            check_in: self.check_in,
            check_out: self.check_out,
            date: self.date,
            time: self.time,
        })
    }
}

/// The session cart: one per user, held server-side.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Cart {
    pub items: Vec<CartItem>,
    pub updated_at: DateTime<Utc>,
}

impl Default for Cart {
    fn default() -> Self {
        Self::new()
    }
}

impl Cart {
    pub fn new() -> Self {
        Self {
            items: Vec::new(),
            updated_at: Utc::now(),
        }
    }

    /// Merge on `(id, type, bookingDate)`: a match gains one unit, anything
    /// else is appended with quantity 1. Returns whether the cart changed.
    pub fn add_item(&mut self, item: CartItem) -> bool {
        let changed = match self.items.iter_mut().find(|existing| existing.same_slot(&item)) {
            Some(existing) => {
                let before = existing.quantity;
                existing.bump(1);
                existing.quantity != before
            }
            None => {
                self.items.push(CartItem { quantity: 1, ..item });
                true
            }
        };
        if changed {
            self.updated_at = Utc::now();
        }
        changed
    }

    /// Set the quantity of every entry `key` selects, capped at
    /// [`MAX_ITEM_QUANTITY`]. Quantities below 1 are ignored and booked
    /// entries keep their single unit. Returns whether any entry changed.
    pub fn update_quantity(&mut self, key: &SlotKey, quantity: i64) -> bool {
        if quantity < 1 {
            return false;
        }
        let quantity = u32::try_from(quantity).unwrap_or(u32::MAX).min(MAX_ITEM_QUANTITY);
        let mut changed = false;
        for item in self.items.iter_mut().filter(|i| key.matches(i) && !i.is_booked()) {
            if item.quantity != quantity {
                item.quantity = quantity;
                changed = true;
            }
        }
        if changed {
            self.updated_at = Utc::now();
        }
        changed
    }

    /// Drop every entry `key` selects. Returns whether anything was removed.
    pub fn remove_item(&mut self, key: &SlotKey) -> bool {
        let before = self.items.len();
        self.items.retain(|i| !key.matches(i));
        let removed = self.items.len() != before;
        if removed {
            self.updated_at = Utc::now();
        }
        removed
    }

    /// Put entries taken out of the cart back in front of whatever was
    /// added since, merging quantities where slots coincide.
    pub fn restore(&mut self, earlier: Cart) {
        let later = std::mem::replace(&mut self.items, earlier.items);
        for item in later {
            match self.items.iter_mut().find(|existing| existing.same_slot(&item)) {
                Some(existing) => existing.bump(item.quantity),
                None => self.items.push(item),
            }
        }
        self.updated_at = Utc::now();
    }

    pub fn clear(&mut self) {
        self.items.clear();
        self.updated_at = Utc::now();
    }

    /// Sum of `price * quantity`.
    pub fn total(&self) -> f64 {
        round_cents(self.items.iter().map(CartItem::line_total).sum())
    }

    pub fn item_count(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}
