pub mod cart;
pub mod checkout;
pub mod history;
pub mod lifecycle;
pub mod models;
pub mod validation;

use thiserror::Error;

pub use cart::{Cart, CartItem, CartItemInput, SlotKey, MAX_ITEM_QUANTITY};
pub use checkout::{CheckoutSummary, Order, OrderItem, OrderStatus, OrderStatusChange, PaymentMethod};
pub use history::{BookingQuery, Page};
pub use lifecycle::{releases_inventory, StatusChange};
pub use models::{
    Booking, BookingDetails, BookingStatus, BookingType, HotelRoomType, NewBooking, ReservationType,
};
pub use validation::{
    AttractionBookingRequest, BookingContext, GuestDetails, HotelBookingRequest,
    RestaurantBookingRequest,
};

#[derive(Debug, Error, PartialEq)]
pub enum BookingError {
    #[error("Missing required field: {0}")]
    MissingField(&'static str),

    #[error("Invalid {field}: {reason}")]
    InvalidField { field: &'static str, reason: String },

    #[error("Invalid status")]
    InvalidStatus(String),

    #[error("Only pending bookings can be cancelled")]
    NotCancellable(BookingStatus),

    #[error("Cannot change booking status from {from} to {to}")]
    InvalidTransition { from: BookingStatus, to: BookingStatus },

    #[error("Invalid cart item: {0}")]
    InvalidCartItem(String),

    #[error("Cart is empty")]
    EmptyCart,

    #[error("Only pending orders can be cancelled")]
    OrderNotCancellable(OrderStatus),

    #[error("Cannot change order status from {from} to {to}")]
    InvalidOrderTransition { from: OrderStatus, to: OrderStatus },
}
