pub mod payment;
pub mod repository;

use tripnest_booking::{BookingError, BookingType};
use tripnest_catalog::{InventoryError, ProductError};

#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("{0} not found")]
    NotFound(&'static str),

    #[error("Sorry, this {0} is currently fully booked")]
    FullyBooked(BookingType),

    #[error(transparent)]
    Inventory(#[from] InventoryError),

    #[error(transparent)]
    Booking(#[from] BookingError),

    #[error(transparent)]
    Product(#[from] ProductError),

    #[error("Payment failed: {0}")]
    Payment(String),

    #[error("Storage error: {0}")]
    Storage(String),
}

pub type CoreResult<T> = Result<T, CoreError>;
