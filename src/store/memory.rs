//! 内存 KV 存储
//!
//! 语义与 Redis 的 SET EX / GET / INCR / EXPIRE 保持一致，过期时间基于 tokio 时钟，
//! 测试中可以用 `tokio::time::pause()` + `advance()` 模拟时间流逝。

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use dashmap::DashMap;
use tokio::time::Instant;
use tracing::trace;

use super::{DEFAULT_URL_TTL, KvStore};
use crate::errors::{QuicklinkError, Result};

#[derive(Debug, Clone)]
enum StoredValue {
    Text(String),
    Counter(i64),
}

#[derive(Debug, Clone)]
struct Entry {
    value: StoredValue,
    expires_at: Option<Instant>,
}

impl Entry {
    fn is_expired(&self, now: Instant) -> bool {
        self.expires_at.is_some_and(|at| at <= now)
    }
}

pub struct MemoryStore {
    entries: DashMap<String, Entry>,
    url_ttl: Duration,
    /// 为 false 时所有操作返回 StoreUnavailable，用于模拟存储故障
    available: AtomicBool,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::with_url_ttl(DEFAULT_URL_TTL)
    }

    pub fn with_url_ttl(url_ttl: Duration) -> Self {
        Self {
            entries: DashMap::new(),
            url_ttl,
            available: AtomicBool::new(true),
        }
    }

    /// 切换可用状态
    pub fn set_available(&self, available: bool) {
        self.available.store(available, Ordering::SeqCst);
    }

    /// 剩余过期时间；key 不存在、已过期或没有 TTL 时返回 None
    pub fn ttl(&self, key: &str) -> Option<Duration> {
        let now = Instant::now();
        let entry = self.entries.get(key)?;
        match entry.expires_at {
            Some(at) if at > now => Some(at - now),
            _ => None,
        }
    }

    /// key 是否存在且未过期
    pub fn contains_key(&self, key: &str) -> bool {
        let now = Instant::now();
        self.entries
            .get(key)
            .is_some_and(|entry| !entry.is_expired(now))
    }

    fn ensure_available(&self) -> Result<()> {
        if self.available.load(Ordering::SeqCst) {
            Ok(())
        } else {
            Err(QuicklinkError::store_unavailable(
                "memory store is marked unavailable",
            ))
        }
    }

    /// 惰性清理：读到过期 key 时删除
    fn evict_if_expired(&self, key: &str, now: Instant) {
        self.entries.remove_if(key, |_, entry| entry.is_expired(now));
    }
}

#[async_trait]
impl KvStore for MemoryStore {
    async fn save_url(&self, short_id: &str, long_url: &str) -> Result<()> {
        self.ensure_available()?;
        self.entries.insert(
            short_id.to_string(),
            Entry {
                value: StoredValue::Text(long_url.to_string()),
                expires_at: Some(Instant::now() + self.url_ttl),
            },
        );
        trace!("MemoryStore: saved {}", short_id);
        Ok(())
    }

    async fn get_url(&self, short_id: &str) -> Result<String> {
        self.ensure_available()?;
        let now = Instant::now();

        let found = self.entries.get(short_id).and_then(|entry| {
            if entry.is_expired(now) {
                return None;
            }
            Some(match &entry.value {
                StoredValue::Text(url) => url.clone(),
                StoredValue::Counter(n) => n.to_string(),
            })
        });

        match found {
            Some(url) => Ok(url),
            None => {
                self.evict_if_expired(short_id, now);
                Err(QuicklinkError::not_found(format!(
                    "Short id '{}' does not exist",
                    short_id
                )))
            }
        }
    }

    async fn increment_requests(&self, key: &str) -> Result<i64> {
        self.ensure_available()?;
        let now = Instant::now();

        // entry() 持有分片写锁，整个读改写过程是原子的
        let mut entry = self.entries.entry(key.to_string()).or_insert(Entry {
            value: StoredValue::Counter(0),
            expires_at: None,
        });

        if entry.is_expired(now) {
            *entry = Entry {
                value: StoredValue::Counter(0),
                expires_at: None,
            };
        }

        let next = match &entry.value {
            StoredValue::Counter(n) => n + 1,
            StoredValue::Text(s) => {
                s.parse::<i64>().map_err(|_| {
                    QuicklinkError::store_unavailable(format!(
                        "value of '{}' is not an integer or out of range",
                        key
                    ))
                })? + 1
            }
        };
        entry.value = StoredValue::Counter(next);

        Ok(next)
    }

    async fn set_expiration(&self, key: &str, ttl: Duration) -> Result<()> {
        self.ensure_available()?;
        let now = Instant::now();

        if let Some(mut entry) = self.entries.get_mut(key)
            && !entry.is_expired(now)
        {
            entry.expires_at = Some(now + ttl);
        }
        Ok(())
    }
}
