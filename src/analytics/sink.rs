use tracing::info;

use super::AccessLogEntry;

/// 访问日志落地接口
#[async_trait::async_trait]
pub trait AccessLogSink: Send + Sync {
    async fn log_access(&self, entry: AccessLogEntry) -> anyhow::Result<()>;
}

/// 只输出到 tracing 的 Sink（未配置访问日志数据库时使用）
pub struct TracingAccessLogSink;

#[async_trait::async_trait]
impl AccessLogSink for TracingAccessLogSink {
    async fn log_access(&self, entry: AccessLogEntry) -> anyhow::Result<()> {
        info!(
            target: "quicklink::access",
            short_id = %entry.short_id,
            user_ip = %entry.client_ip,
            timestamp = %entry.timestamp.to_rfc3339(),
            "access"
        );
        Ok(())
    }
}
