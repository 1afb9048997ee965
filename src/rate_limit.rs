//! 固定窗口限流
//!
//! 每个客户端一个计数器 `rate_limit:<client>`：
//! - 窗口内第一次请求 INCR 得到 1，由这次请求负责 EXPIRE 启动窗口计时
//! - 之后每次请求只做 INCR
//! - 计数超过阈值即拒绝；被拒绝的请求同样占用计数
//! - 窗口到期后 key 被存储删除，下一次请求重新从 1 开始
//!
//! INCR 与 EXPIRE 是两次独立调用。如果在两者之间进程崩溃或 EXPIRE 失败，
//! 计数器将永远没有 TTL，该客户端会一直被限流，直到人工删除 key。
//! 这是已知并接受的风险，EXPIRE 失败只记录日志。

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, error, trace, warn};

use crate::config::RateLimitConfig;
use crate::errors::Result;
use crate::store::KvStore;

pub const DEFAULT_WINDOW: Duration = Duration::from_secs(60);
pub const DEFAULT_MAX_REQUESTS: i64 = 10;

const KEY_PREFIX: &str = "rate_limit:";

/// 准入结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Admission {
    Allowed { count: i64 },
    Rejected { count: i64 },
}

impl Admission {
    pub fn is_allowed(&self) -> bool {
        matches!(self, Admission::Allowed { .. })
    }

    pub fn count(&self) -> i64 {
        match self {
            Admission::Allowed { count } | Admission::Rejected { count } => *count,
        }
    }
}

pub struct RateLimiter {
    store: Arc<dyn KvStore>,
    max_requests: i64,
    window: Duration,
}

impl RateLimiter {
    pub fn new(store: Arc<dyn KvStore>) -> Self {
        Self::with_limits(store, DEFAULT_MAX_REQUESTS, DEFAULT_WINDOW)
    }

    pub fn with_limits(store: Arc<dyn KvStore>, max_requests: i64, window: Duration) -> Self {
        Self {
            store,
            max_requests,
            window,
        }
    }

    pub fn from_config(store: Arc<dyn KvStore>, config: &RateLimitConfig) -> Self {
        Self::with_limits(
            store,
            config.max_requests,
            Duration::from_secs(config.window_secs),
        )
    }

    /// 客户端对应的计数器 key
    pub fn key_for(client: &str) -> String {
        format!("{}{}", KEY_PREFIX, client)
    }

    pub fn max_requests(&self) -> i64 {
        self.max_requests
    }

    pub fn window(&self) -> Duration {
        self.window
    }

    /// 记录一次请求并给出准入结果
    ///
    /// 自增失败时返回错误，调用方应当拒绝请求（fail-closed）。
    pub async fn check(&self, client: &str) -> Result<Admission> {
        let key = Self::key_for(client);

        let count = self.store.increment_requests(&key).await.map_err(|e| {
            error!("Rate limiter failed to increment '{}': {}", key, e);
            e
        })?;

        if count == 1 {
            debug!("Starting new rate limit window for {}", client);
            if let Err(e) = self.store.set_expiration(&key, self.window).await {
                warn!("Failed to set expiration for '{}': {}", key, e);
            }
        }

        if count > self.max_requests {
            debug!(
                "Rate limit exceeded for {}: {} > {}",
                client, count, self.max_requests
            );
            return Ok(Admission::Rejected { count });
        }

        trace!("Request {} of {} admitted for {}", count, self.max_requests, client);
        Ok(Admission::Allowed { count })
    }
}
