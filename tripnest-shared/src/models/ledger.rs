use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Why a product's quantity moved.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum MovementReason {
    BookingReserved,
    BookingReleased,
    ManualReduce,
    Restock,
}

impl MovementReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            MovementReason::BookingReserved => "booking_reserved",
            MovementReason::BookingReleased => "booking_released",
            MovementReason::ManualReduce => "manual_reduce",
            MovementReason::Restock => "restock",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "booking_reserved" => Some(MovementReason::BookingReserved),
            "booking_released" => Some(MovementReason::BookingReleased),
            "manual_reduce" => Some(MovementReason::ManualReduce),
            "restock" => Some(MovementReason::Restock),
            _ => None,
        }
    }
}

/// One append-only entry of the inventory ledger. Every change to
/// `Product.quantity` is recorded next to the change itself.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InventoryMovement {
    pub id: Uuid,
    pub product_id: Uuid,
    pub booking_id: Option<Uuid>,
    pub delta: i32,
    pub reason: MovementReason,
    pub created_at: DateTime<Utc>,
}

impl InventoryMovement {
    pub fn new(product_id: Uuid, booking_id: Option<Uuid>, delta: i32, reason: MovementReason) -> Self {
        Self {
            id: Uuid::new_v4(),
            product_id,
            booking_id,
            delta,
            reason,
            created_at: Utc::now(),
        }
    }

    /// Net effect of a sequence of movements.
    pub fn net(movements: &[InventoryMovement]) -> i64 {
        movements.iter().map(|m| m.delta as i64).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reason_round_trips_through_column_value() {
        for reason in [
            MovementReason::BookingReserved,
            MovementReason::BookingReleased,
            MovementReason::ManualReduce,
            MovementReason::Restock,
        ] {
            assert_eq!(MovementReason::parse(reason.as_str()), Some(reason));
        }
        assert_eq!(MovementReason::parse("refund"), None);
    }

    #[test]
    fn test_net_movement() {
        let product_id = Uuid::new_v4();
        let booking_id = Uuid::new_v4();
        let movements = vec![
            InventoryMovement::new(product_id, Some(booking_id), -1, MovementReason::BookingReserved),
            InventoryMovement::new(product_id, None, 5, MovementReason::Restock),
            InventoryMovement::new(product_id, Some(booking_id), 1, MovementReason::BookingReleased),
        ];
        assert_eq!(InventoryMovement::net(&movements), 5);
    }
}
