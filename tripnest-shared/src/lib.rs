pub mod models;
pub mod money;
pub mod pii;

pub use models::ledger::{InventoryMovement, MovementReason};
pub use pii::Masked;
