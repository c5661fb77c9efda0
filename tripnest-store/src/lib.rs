pub mod app_config;
pub mod booking_repo;
pub mod database;
pub mod listing_repo;
pub mod memory;
pub mod order_repo;
pub mod product_repo;
pub mod redis_repo;
pub mod seed;

use std::fmt::Display;
use std::sync::Arc;
use tracing::info;

use tripnest_core::repository::{
    BookingRepository, CartRepository, ListingRepository, OrderRepository, ProductRepository,
};
use tripnest_core::CoreError;

pub use app_config::{Config, StorageBackend};
pub use database::DbClient;
pub use memory::MemoryStore;
pub use redis_repo::{RedisCartRepository, RedisClient};

/// Wrap a driver error; the text is logged, never shown to clients.
pub(crate) fn storage_error<E: Display>(err: E) -> CoreError {
    CoreError::Storage(err.to_string())
}

/// Every repository the API needs, behind trait objects.
#[derive(Clone)]
pub struct Repositories {
    pub products: Arc<dyn ProductRepository>,
    pub bookings: Arc<dyn BookingRepository>,
    pub listings: Arc<dyn ListingRepository>,
    pub carts: Arc<dyn CartRepository>,
    pub orders: Arc<dyn OrderRepository>,
}

impl Repositories {
    /// One shared in-memory store serving every repository.
    pub fn in_memory() -> Self {
        let store = Arc::new(MemoryStore::new());
        Self {
            products: store.clone(),
            bookings: store.clone(),
            listings: store.clone(),
            carts: store.clone(),
            orders: store,
        }
    }

    /// PostgreSQL for records, Redis for carts. Runs pending migrations.
    pub async fn connect(config: &Config) -> Result<Self, Box<dyn std::error::Error + Send + Sync>> {
        let db = DbClient::new(&config.database.url, config.database.max_connections).await?;
        db.migrate().await?;
        info!("Connected to PostgreSQL");

        let redis = RedisClient::new(&config.redis.url).await?;
        info!("Redis client ready");

        Ok(Self {
            products: Arc::new(product_repo::StoreProductRepository::new(db.pool.clone())),
            bookings: Arc::new(booking_repo::StoreBookingRepository::new(db.pool.clone())),
            listings: Arc::new(listing_repo::StoreListingRepository::new(db.pool.clone())),
            carts: Arc::new(RedisCartRepository::new(redis, config.business_rules.cart_ttl_seconds)),
            orders: Arc::new(order_repo::StoreOrderRepository::new(db.pool)),
        })
    }

    /// Build the repositories the configured backend asks for.
    pub async fn from_config(config: &Config) -> Result<Self, Box<dyn std::error::Error + Send + Sync>> {
        let repos = match config.storage.backend {
            StorageBackend::Postgres => Self::connect(config).await?,
            StorageBackend::Memory => {
                info!("Using in-memory storage");
                Self::in_memory()
            }
        };

        if config.storage.seed_demo_data {
            seed::seed_demo_data(&repos).await?;
        }
        Ok(repos)
    }
}
