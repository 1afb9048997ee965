//! 短链接 ID 生成

use std::iter;

use crate::errors::{QuicklinkError, Result};

/// 默认 ID 长度
pub const SHORT_ID_LENGTH: usize = 6;

/// URL 安全字符集（与 nanoid 默认字符集相同，64 个字符）
pub const SHORT_ID_ALPHABET: &[u8; 64] =
    b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789_-";

/// ID 生成器
///
/// 不检查与已有 ID 的冲突；6 位 64 进制约 687 亿种组合。
pub trait IdGenerator: Send + Sync {
    fn generate(&self) -> Result<String>;
}

/// 基于线程本地 CSPRNG 的随机 ID 生成器
#[derive(Debug, Clone, Copy)]
pub struct NanoIdGenerator {
    length: usize,
}

impl Default for NanoIdGenerator {
    fn default() -> Self {
        Self::new(SHORT_ID_LENGTH)
    }
}

impl NanoIdGenerator {
    pub fn new(length: usize) -> Self {
        Self { length }
    }

    pub fn length(&self) -> usize {
        self.length
    }
}

impl IdGenerator for NanoIdGenerator {
    fn generate(&self) -> Result<String> {
        if self.length == 0 {
            return Err(QuicklinkError::id_generation(
                "short id length must be greater than zero",
            ));
        }

        Ok(iter::repeat_with(|| {
            SHORT_ID_ALPHABET[rand::random_range(0..SHORT_ID_ALPHABET.len())] as char
        })
        .take(self.length)
        .collect())
    }
}

/// 是否为合法的短链接 ID 字符
pub fn is_valid_short_id(id: &str) -> bool {
    !id.is_empty() && id.bytes().all(|b| SHORT_ID_ALPHABET.contains(&b))
}
