use std::time::Duration;

use async_trait::async_trait;
use redis::AsyncCommands;
use redis::aio::ConnectionManager;
use tokio::time::timeout;
use tracing::{debug, error, info, trace};

use super::KvStore;
use crate::config::RedisConfig;
use crate::errors::{QuicklinkError, Result};

/// Redis 存储实现
///
/// 使用 `ConnectionManager`（多路复用 + 断线自动重连），clone 开销很小，
/// 所有请求共享同一条连接，不需要额外加锁。
pub struct RedisStore {
    connection: ConnectionManager,
    key_prefix: String,
    url_ttl: Duration,
}

impl RedisStore {
    /// 连接 Redis 并用 PING 验证，连接过程受 `connect_timeout_secs` 限制
    pub async fn connect(config: &RedisConfig, url_ttl: Duration) -> Result<Self> {
        let client = redis::Client::open(config.url.as_str()).map_err(|e| {
            QuicklinkError::store_unavailable(format!("Invalid Redis URL '{}': {}", config.url, e))
        })?;

        let connect_timeout = Duration::from_secs(config.connect_timeout_secs);

        let mut connection = match timeout(connect_timeout, ConnectionManager::new(client)).await
        {
            Ok(Ok(conn)) => conn,
            Ok(Err(e)) => {
                error!("Failed to connect to Redis at {}: {}", config.url, e);
                return Err(QuicklinkError::store_unavailable(format!(
                    "Failed to connect to Redis: {}",
                    e
                )));
            }
            Err(_) => {
                error!(
                    "Connecting to Redis at {} timed out after {}s",
                    config.url, config.connect_timeout_secs
                );
                return Err(QuicklinkError::store_unavailable(format!(
                    "Redis connection timed out after {}s",
                    config.connect_timeout_secs
                )));
            }
        };

        let pong = timeout(
            connect_timeout,
            redis::cmd("PING").query_async::<String>(&mut connection),
        )
        .await
        .map_err(|_| QuicklinkError::store_unavailable("Redis PING timed out"))?
        .map_err(|e| QuicklinkError::store_unavailable(format!("Redis ping failed: {}", e)))?;
        debug!("Redis connection test successful: {}", pong);

        info!("Connected to Redis at {}", config.url);

        Ok(Self {
            connection,
            key_prefix: config.key_prefix.clone(),
            url_ttl,
        })
    }

    fn make_key(&self, key: &str) -> String {
        format!("{}{}", self.key_prefix, key)
    }
}

#[async_trait]
impl KvStore for RedisStore {
    async fn save_url(&self, short_id: &str, long_url: &str) -> Result<()> {
        let mut conn = self.connection.clone();
        conn.set_ex::<String, &str, ()>(self.make_key(short_id), long_url, self.url_ttl.as_secs())
            .await
            .map_err(|e| {
                error!("Failed to save URL for '{}': {}", short_id, e);
                QuicklinkError::from(e)
            })?;

        trace!("Saved short id: {}", short_id);
        Ok(())
    }

    async fn get_url(&self, short_id: &str) -> Result<String> {
        let mut conn = self.connection.clone();
        let result: Option<String> = conn.get(self.make_key(short_id)).await?;

        match result {
            Some(url) => Ok(url),
            None => {
                trace!("Short id not found in Redis: {}", short_id);
                Err(QuicklinkError::not_found(format!(
                    "Short id '{}' does not exist",
                    short_id
                )))
            }
        }
    }

    async fn increment_requests(&self, key: &str) -> Result<i64> {
        let mut conn = self.connection.clone();
        let count: i64 = conn.incr(self.make_key(key), 1).await?;
        Ok(count)
    }

    async fn set_expiration(&self, key: &str, ttl: Duration) -> Result<()> {
        let mut conn = self.connection.clone();
        let applied: bool = conn
            .expire(self.make_key(key), ttl.as_secs() as i64)
            .await?;

        if !applied {
            debug!("EXPIRE had no effect, key '{}' does not exist", key);
        }
        Ok(())
    }
}
