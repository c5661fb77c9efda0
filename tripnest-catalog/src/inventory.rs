use crate::product::Product;
use chrono::Utc;
use tripnest_shared::{InventoryMovement, MovementReason};
use uuid::Uuid;

/// Units reserved by one booking.
pub const UNITS_PER_BOOKING: i32 = 1;

impl Product {
    /// Take `amount` units out of stock.
    pub fn reduce_quantity(&mut self, amount: i32) -> Result<(), InventoryError> {
        check_amount(amount)?;
        if self.quantity < amount {
            return Err(InventoryError::InsufficientQuantity {
                requested: amount,
                available: self.quantity,
            });
        }
        self.quantity -= amount;
        self.updated_at = Utc::now();
        Ok(())
    }

    /// Put `amount` units back into stock.
    pub fn add_quantity(&mut self, amount: i32) -> Result<(), InventoryError> {
        check_amount(amount)?;
        self.quantity = self
            .quantity
            .checked_add(amount)
            .ok_or(InventoryError::Overflow)?;
        self.updated_at = Utc::now();
        Ok(())
    }
}

pub fn check_amount(amount: i32) -> Result<(), InventoryError> {
    if amount <= 0 {
        return Err(InventoryError::InvalidAmount(amount));
    }
    Ok(())
}

/// Ledger entry for a booking taking one unit.
pub fn reservation(product_id: Uuid, booking_id: Uuid) -> InventoryMovement {
    InventoryMovement::new(
        product_id,
        Some(booking_id),
        -UNITS_PER_BOOKING,
        MovementReason::BookingReserved,
    )
}

/// Ledger entry for a cancelled booking giving its unit back.
pub fn release(product_id: Uuid, booking_id: Uuid) -> InventoryMovement {
    InventoryMovement::new(
        product_id,
        Some(booking_id),
        UNITS_PER_BOOKING,
        MovementReason::BookingReleased,
    )
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum InventoryError {
    #[error("Amount must be a positive integer, got {0}")]
    InvalidAmount(i32),

    #[error("Insufficient quantity available: requested {requested}, available {available}")]
    InsufficientQuantity {
        requested: i32,
        available: i32,
    },

    #[error("Quantity overflow")]
    Overflow,
}
