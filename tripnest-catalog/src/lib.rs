pub mod filter;
pub mod inventory;
pub mod listing;
pub mod pricing;
pub mod product;

pub use filter::{ListingFilter, StayRequest};
pub use inventory::InventoryError;
pub use listing::{Listing, ListingDetails, ListingKind};
pub use product::{NewProduct, Product, ProductCategory, ProductError, ProductUpdate};
