//! 访问日志
//!
//! 解析成功的每一次请求都会产生一条 [`AccessLogEntry`]，经由有界队列交给唯一的
//! 后台 worker 写入 [`AccessLogSink`]。写入失败只记录日志，不会影响请求本身。

pub mod pipeline;
pub mod sink;

pub use pipeline::{ACCESS_LOG_QUEUE_CAPACITY, AccessLogPipeline, AccessLogger, DrainReport};
pub use sink::{AccessLogSink, TracingAccessLogSink};

use chrono::{DateTime, Utc};

/// 单次访问记录
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessLogEntry {
    /// 短链接 ID
    pub short_id: String,
    /// 客户端 IP 地址
    pub client_ip: String,
    /// 访问时间
    pub timestamp: DateTime<Utc>,
}

impl AccessLogEntry {
    /// 以当前时间创建访问记录
    pub fn new(short_id: impl Into<String>, client_ip: impl Into<String>) -> Self {
        Self {
            short_id: short_id.into(),
            client_ip: client_ip.into(),
            timestamp: Utc::now(),
        }
    }
}
