//! 键值存储适配层
//!
//! 短链接映射与限流计数器都存放在同一个共享 KV 存储中：
//! - `<short_id>` → 长链接（TTL 30 天）
//! - `rate_limit:<client_ip>` → 请求计数（TTL 为限流窗口）
//!
//! 生产环境使用 Redis，测试使用内存实现，两者通过 [`KvStore`] 互换。

pub mod memory;
pub mod redis;

pub use memory::MemoryStore;
pub use redis::RedisStore;

use std::time::Duration;

use async_trait::async_trait;

use crate::errors::Result;

/// 短链接默认保存时间：30 天
pub const DEFAULT_URL_TTL: Duration = Duration::from_secs(30 * 24 * 60 * 60);

/// KV 存储能力接口
///
/// 所有操作都必须能被任意数量的请求并发调用，单个 key 上的操作由存储本身保证原子性。
#[async_trait]
pub trait KvStore: Send + Sync {
    /// 写入（覆盖）短链接映射，并附带固定 TTL
    async fn save_url(&self, short_id: &str, long_url: &str) -> Result<()>;

    /// 读取长链接；不存在或已过期返回 `NotFound`
    async fn get_url(&self, short_id: &str) -> Result<String>;

    /// 原子自增并返回新值，key 不存在时从 1 开始
    async fn increment_requests(&self, key: &str) -> Result<i64>;

    /// 给已存在的 key 设置过期时间
    async fn set_expiration(&self, key: &str, ttl: Duration) -> Result<()>;
}
