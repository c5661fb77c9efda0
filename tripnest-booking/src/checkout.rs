use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use tripnest_shared::money::{percentage_of, round_cents, TAX_RATE};
use uuid::Uuid;

use crate::cart::Cart;
use crate::BookingError;

/// Money breakdown shown on the cart page and charged at checkout.
#[derive(Debug, Clone, Copy, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutSummary {
    pub subtotal: f64,
    pub tax: f64,
    pub total: f64,
}

impl CheckoutSummary {
    pub fn for_cart(cart: &Cart) -> Self {
        let subtotal = cart.total();
        let tax = percentage_of(subtotal, TAX_RATE);
        Self {
            subtotal,
            tax,
            total: round_cents(subtotal + tax),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum PaymentMethod {
    Card,
    Bank,
    Paypal,
}

impl PaymentMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentMethod::Card => "card",
            PaymentMethod::Bank => "bank",
            PaymentMethod::Paypal => "paypal",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "card" => Some(PaymentMethod::Card),
            "bank" => Some(PaymentMethod::Bank),
            "paypal" => Some(PaymentMethod::Paypal),
            _ => None,
        }
    }
}

impl fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    Pending,
    Paid,
    Processing,
    Shipped,
    Delivered,
    Cancelled,
}

impl OrderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "pending",
            OrderStatus::Paid => "paid",
            OrderStatus::Processing => "processing",
            OrderStatus::Shipped => "shipped",
            OrderStatus::Delivered => "delivered",
            OrderStatus::Cancelled => "cancelled",
        }
    }

    /// Case-insensitive, so `Shipped` and `shipped` both parse.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_ascii_lowercase().as_str() {
            "pending" => Some(OrderStatus::Pending),
            "paid" => Some(OrderStatus::Paid),
            "processing" => Some(OrderStatus::Processing),
            "shipped" => Some(OrderStatus::Shipped),
            "delivered" => Some(OrderStatus::Delivered),
            "cancelled" => Some(OrderStatus::Cancelled),
            _ => None,
        }
    }

    /// Allowed moves:
    /// pending → paid | cancelled,
    /// paid → processing | cancelled,
    /// processing → shipped | cancelled,
    /// shipped → delivered.
    pub fn can_transition_to(&self, next: OrderStatus) -> bool {
        use OrderStatus::*;
        matches!(
            (self, next),
            (Pending, Paid)
                | (Pending, Cancelled)
                | (Paid, Processing)
                | (Paid, Cancelled)
                | (Processing, Shipped)
                | (Processing, Cancelled)
                | (Shipped, Delivered)
        )
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A requested order status change, resolved against the stored status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderStatusChange {
    /// `PATCH /status`: any legal transition; re-setting the current status is a no-op.
    Set(OrderStatus),
    /// `DELETE`: only a pending order can be cancelled.
    Cancel,
}

impl OrderStatusChange {
    pub fn resolve(&self, current: OrderStatus) -> Result<OrderStatus, BookingError> {
        match *self {
            OrderStatusChange::Cancel => {
                if current != OrderStatus::Pending {
                    return Err(BookingError::OrderNotCancellable(current));
                }
                Ok(OrderStatus::Cancelled)
            }
            OrderStatusChange::Set(next) => {
                if next == current || current.can_transition_to(next) {
                    Ok(next)
                } else {
                    Err(BookingError::InvalidOrderTransition { from: current, to: next })
                }
            }
        }
    }
}

/// One cart line frozen into an order.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct OrderItem {
    pub id: Uuid,
    pub order_id: Uuid,
    pub cart_item_id: String,
    pub booking_id: Option<Uuid>,
    pub product_id: Option<Uuid>,
    pub name: String,
    pub item_type: String,
    pub price: f64,
    pub quantity: i32,
    pub line_total: f64,
}

/// A paid (or about to be paid) cart.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: Uuid,
    pub user_id: Uuid,
    pub items: Vec<OrderItem>,
    pub subtotal: f64,
    pub tax: f64,
    pub total: f64,
    pub currency: String,
    pub payment_method: PaymentMethod,
    pub payment_reference: Option<String>,
    pub status: OrderStatus,
    pub created_at: DateTime<Utc>,
}

impl Order {
    /// Freeze the cart into a pending order. The cart itself is left alone.
    pub fn from_cart(
        user_id: Uuid,
        cart: &Cart,
        payment_method: PaymentMethod,
        currency: &str,
    ) -> Result<Self, BookingError> {
        if cart.is_empty() {
            return Err(BookingError::EmptyCart);
        }

        let id = Uuid::new_v4();
        let items = cart
            .items
            .iter()
            .map(|item| OrderItem {
                id: Uuid::new_v4(),
                order_id: id,
                cart_item_id: item.id.clone(),
                booking_id: item.booking_id,
                product_id: item.product_id,
                name: item.name.clone(),
                item_type: item.item_type.clone(),
                price: item.price,
                quantity: i32::try_from(item.quantity).unwrap_or(i32::MAX),
                line_total: round_cents(item.line_total()),
            })
            .collect();

        let summary = CheckoutSummary::for_cart(cart);
        Ok(Self {
            id,
            user_id,
            items,
            subtotal: summary.subtotal,
            tax: summary.tax,
            total: summary.total,
            currency: currency.to_string(),
            payment_method,
            payment_reference: None,
            status: OrderStatus::Pending,
            created_at: Utc::now(),
        })
    }

    pub fn mark_paid(&mut self, reference: impl Into<String>) {
        self.payment_reference = Some(reference.into());
        self.status = OrderStatus::Paid;
    }

    /// Bookings this order pays for, in cart order.
    pub fn booking_ids(&self) -> Vec<Uuid> {
        self.items.iter().filter_map(|i| i.booking_id).collect()
    }
}
