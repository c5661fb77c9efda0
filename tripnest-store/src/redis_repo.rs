use async_trait::async_trait;
use redis::{AsyncCommands, RedisResult};
use std::time::Duration;
use tracing::{debug, warn};
use uuid::Uuid;

use tripnest_booking::Cart;
use tripnest_core::repository::{CartEdit, CartRepository};
use tripnest_core::{CoreError, CoreResult};

use crate::storage_error;

#[derive(Clone)]
pub struct RedisClient {
    client: redis::Client,
}

impl RedisClient {
    pub async fn new(connection_string: &str) -> Result<Self, redis::RedisError> {
        let client = redis::Client::open(connection_string)?;
        Ok(Self { client })
    }

    pub async fn get_string(&self, key: &str) -> RedisResult<Option<String>> {
        let mut conn = self.client.get_multiplexed_async_connection().await?;
        conn.get(key).await
    }

    pub async fn set_string_ex(&self, key: &str, value: &str, ttl_seconds: u64) -> RedisResult<()> {
        let mut conn = self.client.get_multiplexed_async_connection().await?;
        conn.set_ex(key, value, ttl_seconds).await
    }

    pub async fn del_key(&self, key: &str) -> RedisResult<()> {
        let mut conn = self.client.get_multiplexed_async_connection().await?;
        conn.del(key).await
    }

    /// GETDEL: read and remove in one command.
    pub async fn take_string(&self, key: &str) -> RedisResult<Option<String>> {
        let mut conn = self.client.get_multiplexed_async_connection().await?;
        redis::cmd("GETDEL").arg(key).query_async(&mut conn).await
    }

    pub async fn acquire_lock(&self, key: &str, token: &str, ttl_ms: u64) -> RedisResult<bool> {
        let mut conn = self.client.get_multiplexed_async_connection().await?;

        // SET NX: Only set if key does not exist
        let result: Option<String> = redis::cmd("SET")
            .arg(key)
            .arg(token)
            .arg("NX")
            .arg("PX")
            .arg(ttl_ms)
            .query_async(&mut conn)
            .await?;

        Ok(result.is_some())
    }

    /// Delete the lock only while it still carries `token`.
    pub async fn release_lock(&self, key: &str, token: &str) -> RedisResult<()> {
        let mut conn = self.client.get_multiplexed_async_connection().await?;
        let script = redis::Script::new(
            r#"
            if redis.call("GET", KEYS[1]) == ARGV[1] then
                return redis.call("DEL", KEYS[1])
            else
                return 0
            end
        "#,
        );
        let _: i64 = script.key(key).arg(token).invoke_async(&mut conn).await?;
        Ok(())
    }
}

const LOCK_TTL_MS: u64 = 5_000;
const LOCK_ATTEMPTS: u32 = 50;
const LOCK_RETRY: Duration = Duration::from_millis(20);

/// Session carts as JSON documents under `cart:{user_id}`. Every write
/// refreshes the TTL, so an idle cart expires on its own. Writers serialize
/// on `cart-lock:{user_id}`.
pub struct RedisCartRepository {
    redis: RedisClient,
    ttl_seconds: u64,
}

impl RedisCartRepository {
    pub fn new(redis: RedisClient, ttl_seconds: u64) -> Self {
        Self { redis, ttl_seconds }
    }

    fn key(user_id: Uuid) -> String {
        format!("cart:{}", user_id)
    }

    fn lock_key(user_id: Uuid) -> String {
        format!("cart-lock:{}", user_id)
    }

    fn decode(user_id: Uuid, raw: Option<String>) -> CoreResult<Cart> {
        match raw {
            Some(json) => serde_json::from_str(&json)
                .map_err(|e| CoreError::Storage(format!("corrupt cart for {}: {}", user_id, e))),
            None => Ok(Cart::new()),
        }
    }

    async fn lock(&self, user_id: Uuid) -> CoreResult<String> {
        let key = Self::lock_key(user_id);
        let token = Uuid::new_v4().to_string();
        for _ in 0..LOCK_ATTEMPTS {
            if self
                .redis
                .acquire_lock(&key, &token, LOCK_TTL_MS)
                .await
                .map_err(storage_error)?
            {
                return Ok(token);
            }
            tokio::time::sleep(LOCK_RETRY).await;
        }
        Err(CoreError::Storage(format!("cart for {} is busy", user_id)))
    }

    async fn unlock(&self, user_id: Uuid, token: &str) {
        if let Err(e) = self.redis.release_lock(&Self::lock_key(user_id), token).await {
            warn!("Failed to release cart lock for {}: {}", user_id, e);
        }
    }

    async fn edit_locked(&self, user_id: Uuid, edit: CartEdit) -> CoreResult<Cart> {
        let key = Self::key(user_id);
        let raw = self.redis.get_string(&key).await.map_err(storage_error)?;
        let mut cart = Self::decode(user_id, raw)?;
        if edit(&mut cart) {
            let json = serde_json::to_string(&cart).map_err(storage_error)?;
            self.redis
                .set_string_ex(&key, &json, self.ttl_seconds)
                .await
                .map_err(storage_error)?;
            debug!("Cart saved for {} ({} items)", user_id, cart.item_count());
        }
        Ok(cart)
    }
}

#[async_trait]
impl CartRepository for RedisCartRepository {
    async fn get_cart(&self, user_id: Uuid) -> CoreResult<Cart> {
        let raw = self
            .redis
            .get_string(&Self::key(user_id))
            .await
            .map_err(storage_error)?;
        Self::decode(user_id, raw)
    }

    async fn update_cart(&self, user_id: Uuid, edit: CartEdit) -> CoreResult<Cart> {
        let token = self.lock(user_id).await?;
        let result = self.edit_locked(user_id, edit).await;
        self.unlock(user_id, &token).await;
        result
    }

    async fn clear_cart(&self, user_id: Uuid) -> CoreResult<()> {
        let token = self.lock(user_id).await?;
        let result = self.redis.del_key(&Self::key(user_id)).await.map_err(storage_error);
        self.unlock(user_id, &token).await;
        result
    }

    async fn take_cart(&self, user_id: Uuid) -> CoreResult<Cart> {
        let token = self.lock(user_id).await?;
        let result = self.redis.take_string(&Self::key(user_id)).await.map_err(storage_error);
        self.unlock(user_id, &token).await;
        Self::decode(user_id, result?)
    }
}
