//! 访问日志管道
//!
//! 有界队列 + 单个后台 worker：
//! - 生产者（解析请求）只负责入队，队列满时等待空位，不会丢弃记录
//! - worker 逐条调用 Sink，失败只记日志，不重试，也不回传给生产者
//! - 关闭时先关闭队列，再等待 worker 处理完已入队的记录（受超时限制）

use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Duration;

use futures_util::FutureExt;
use parking_lot::{Mutex, RwLock};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, trace, warn};

use super::{AccessLogEntry, AccessLogSink};

/// 默认队列容量
pub const ACCESS_LOG_QUEUE_CAPACITY: usize = 100;

/// worker 退出时的统计
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DrainReport {
    pub persisted: u64,
    pub failed: u64,
}

/// 生产者句柄，clone 后共享同一个队列
#[derive(Clone)]
pub struct AccessLogger {
    /// 关闭时置为 None，所有 clone 同时失效
    sender: Arc<RwLock<Option<mpsc::Sender<AccessLogEntry>>>>,
}

impl AccessLogger {
    /// 入队一条访问记录
    ///
    /// 队列满时等待；管道已关闭时丢弃记录并返回 false。
    pub async fn record(&self, entry: AccessLogEntry) -> bool {
        let sender = self.sender.read().clone();
        let Some(sender) = sender else {
            debug!(
                "Access log pipeline closed, dropping entry for {}",
                entry.short_id
            );
            return false;
        };

        match sender.send(entry).await {
            Ok(()) => true,
            Err(mpsc::error::SendError(entry)) => {
                warn!(
                    "Access log worker is gone, dropping entry for {}",
                    entry.short_id
                );
                false
            }
        }
    }

    pub fn is_closed(&self) -> bool {
        self.sender.read().as_ref().is_none_or(|s| s.is_closed())
    }

    /// 当前排队中的记录数
    pub fn queued(&self) -> usize {
        self.sender
            .read()
            .as_ref()
            .map(|s| s.max_capacity() - s.capacity())
            .unwrap_or(0)
    }
}

/// 访问日志管道，持有唯一的后台 worker
pub struct AccessLogPipeline {
    logger: AccessLogger,
    worker: Mutex<Option<JoinHandle<DrainReport>>>,
    capacity: usize,
}

impl AccessLogPipeline {
    /// 创建队列并启动后台 worker（需要在 tokio runtime 中调用）
    pub fn start(sink: Arc<dyn AccessLogSink>, capacity: usize) -> Self {
        let capacity = capacity.max(1);
        let (tx, rx) = mpsc::channel(capacity);
        let worker = tokio::spawn(run_worker(rx, sink));

        info!("Access log pipeline started (queue capacity: {})", capacity);

        Self {
            logger: AccessLogger {
                sender: Arc::new(RwLock::new(Some(tx))),
            },
            worker: Mutex::new(Some(worker)),
            capacity,
        }
    }

    pub fn logger(&self) -> AccessLogger {
        self.logger.clone()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// 关闭队列并等待 worker 处理完剩余记录
    ///
    /// 超时后强制终止 worker，返回 None；重复调用同样返回 None。
    pub async fn shutdown(&self, timeout: Duration) -> Option<DrainReport> {
        // 丢弃共享 Sender；正在等待入队的生产者完成后队列即关闭
        let sender = self.logger.sender.write().take();
        drop(sender);

        let handle = self.worker.lock().take();
        let Some(mut handle) = handle else {
            debug!("Access log pipeline already shut down");
            return None;
        };

        match tokio::time::timeout(timeout, &mut handle).await {
            Ok(Ok(report)) => {
                info!(
                    "Access log pipeline drained: {} persisted, {} failed",
                    report.persisted, report.failed
                );
                Some(report)
            }
            Ok(Err(e)) => {
                error!("Access log worker terminated abnormally: {}", e);
                None
            }
            Err(_) => {
                handle.abort();
                error!(
                    "Access log pipeline did not drain within {:?}, remaining entries discarded",
                    timeout
                );
                None
            }
        }
    }
}

async fn run_worker(
    mut rx: mpsc::Receiver<AccessLogEntry>,
    sink: Arc<dyn AccessLogSink>,
) -> DrainReport {
    let mut report = DrainReport::default();

    while let Some(entry) = rx.recv().await {
        let short_id = entry.short_id.clone();

        // Sink panic 也只算一次失败，worker 继续运行
        match AssertUnwindSafe(sink.log_access(entry)).catch_unwind().await {
            Ok(Ok(())) => {
                report.persisted += 1;
                trace!("Access log saved for {}", short_id);
            }
            Ok(Err(e)) => {
                report.failed += 1;
                warn!("Failed to save access log for {}: {}", short_id, e);
            }
            Err(_) => {
                report.failed += 1;
                error!("Access log sink panicked while saving {}", short_id);
            }
        }
    }

    debug!("Access log queue closed, worker exiting");
    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use tokio::sync::{Notify, Semaphore};

    struct CollectingSink {
        saved: std::sync::Mutex<Vec<AccessLogEntry>>,
    }

    impl CollectingSink {
        fn new() -> Self {
            Self {
                saved: std::sync::Mutex::new(Vec::new()),
            }
        }

        fn short_ids(&self) -> Vec<String> {
            self.saved
                .lock()
                .unwrap()
                .iter()
                .map(|e| e.short_id.clone())
                .collect()
        }
    }

    #[async_trait]
    impl AccessLogSink for CollectingSink {
        async fn log_access(&self, entry: AccessLogEntry) -> anyhow::Result<()> {
            self.saved.lock().unwrap().push(entry);
            Ok(())
        }
    }

    struct FailingSink;

    #[async_trait]
    impl AccessLogSink for FailingSink {
        async fn log_access(&self, entry: AccessLogEntry) -> anyhow::Result<()> {
            if entry.short_id == "boom" {
                panic!("sink exploded");
            }
            anyhow::bail!("sink unavailable")
        }
    }

    /// 每条记录都要等 gate 放行才返回
    struct GatedSink {
        entered: Notify,
        gate: Semaphore,
        inner: CollectingSink,
    }

    impl GatedSink {
        fn new() -> Self {
            Self {
                entered: Notify::new(),
                gate: Semaphore::new(0),
                inner: CollectingSink::new(),
            }
        }
    }

    #[async_trait]
    impl AccessLogSink for GatedSink {
        async fn log_access(&self, entry: AccessLogEntry) -> anyhow::Result<()> {
            self.entered.notify_one();
            self.gate.acquire().await?.forget();
            self.inner.log_access(entry).await
        }
    }

    #[tokio::test]
    async fn test_entries_are_persisted_in_order() {
        let sink = Arc::new(CollectingSink::new());
        let pipeline = AccessLogPipeline::start(sink.clone(), ACCESS_LOG_QUEUE_CAPACITY);
        let logger = pipeline.logger();

        for id in ["a", "b", "c"] {
            assert!(logger.record(AccessLogEntry::new(id, "1.2.3.4")).await);
        }

        let report = pipeline.shutdown(Duration::from_secs(5)).await.unwrap();
        assert_eq!(
            report,
            DrainReport {
                persisted: 3,
                failed: 0
            }
        );
        assert_eq!(sink.short_ids(), vec!["a", "b", "c"]);
    }

    #[tokio::test]
    async fn test_sink_failures_are_absorbed() {
        let pipeline = AccessLogPipeline::start(Arc::new(FailingSink), 10);
        let logger = pipeline.logger();

        assert!(logger.record(AccessLogEntry::new("x", "1.2.3.4")).await);
        assert!(logger.record(AccessLogEntry::new("boom", "1.2.3.4")).await);
        assert!(logger.record(AccessLogEntry::new("y", "1.2.3.4")).await);

        let report = pipeline.shutdown(Duration::from_secs(5)).await.unwrap();
        assert_eq!(report.persisted, 0);
        assert_eq!(report.failed, 3);
    }

    #[tokio::test]
    async fn test_full_queue_blocks_producer() {
        let sink = Arc::new(GatedSink::new());
        let pipeline = AccessLogPipeline::start(sink.clone(), 1);
        let logger = pipeline.logger();

        // worker 取走第一条后卡在 sink 里
        assert!(logger.record(AccessLogEntry::new("first", "ip")).await);
        sink.entered.notified().await;

        // 第二条占满队列
        assert!(logger.record(AccessLogEntry::new("second", "ip")).await);
        assert_eq!(logger.queued(), 1);

        // 第三条必须等待，而不是被丢弃
        let blocked = tokio::time::timeout(
            Duration::from_millis(50),
            logger.record(AccessLogEntry::new("third", "ip")),
        )
        .await;
        assert!(blocked.is_err());

        sink.gate.add_permits(10);
        assert!(logger.record(AccessLogEntry::new("third", "ip")).await);

        let report = pipeline.shutdown(Duration::from_secs(5)).await.unwrap();
        assert_eq!(report.persisted, 3);
        assert_eq!(sink.inner.short_ids(), vec!["first", "second", "third"]);
    }

    #[tokio::test]
    async fn test_record_after_shutdown_is_rejected() {
        let pipeline = AccessLogPipeline::start(Arc::new(CollectingSink::new()), 4);
        let logger = pipeline.logger();

        pipeline.shutdown(Duration::from_secs(5)).await.unwrap();

        assert!(logger.is_closed());
        assert!(!logger.record(AccessLogEntry::new("late", "ip")).await);
        assert!(pipeline.shutdown(Duration::from_secs(1)).await.is_none());
    }

    #[tokio::test]
    async fn test_shutdown_timeout_aborts_stuck_worker() {
        let sink = Arc::new(GatedSink::new());
        let pipeline = AccessLogPipeline::start(sink.clone(), 4);
        let logger = pipeline.logger();

        assert!(logger.record(AccessLogEntry::new("stuck", "ip")).await);
        sink.entered.notified().await;

        assert!(
            pipeline
                .shutdown(Duration::from_millis(50))
                .await
                .is_none()
        );
        assert!(sink.inner.short_ids().is_empty());
    }

    #[tokio::test]
    async fn test_zero_capacity_is_clamped() {
        let pipeline = AccessLogPipeline::start(Arc::new(CollectingSink::new()), 0);
        assert_eq!(pipeline.capacity(), 1);
        assert!(pipeline.shutdown(Duration::from_secs(1)).await.is_some());
    }
}
