//! 短链接核心逻辑：生成、保存、解析并记录访问

use std::sync::Arc;

use tracing::{debug, error, info, warn};

use super::IdGenerator;
use crate::analytics::{AccessLogEntry, AccessLogger};
use crate::errors::{QuicklinkError, Result};
use crate::store::KvStore;

pub struct LinkService {
    store: Arc<dyn KvStore>,
    ids: Arc<dyn IdGenerator>,
    access_log: AccessLogger,
}

impl LinkService {
    pub fn new(store: Arc<dyn KvStore>, ids: Arc<dyn IdGenerator>, access_log: AccessLogger) -> Self {
        Self {
            store,
            ids,
            access_log,
        }
    }

    /// 为长链接生成短 ID 并保存
    ///
    /// 不做 URL 格式校验，也不检查 ID 是否已被占用。
    pub async fn shorten(&self, long_url: &str) -> Result<String> {
        if long_url.is_empty() {
            return Err(QuicklinkError::invalid_input("long_url must not be empty"));
        }

        let short_id = self.ids.generate().map_err(|e| {
            error!("Failed to generate short id: {}", e);
            match e {
                QuicklinkError::IdGeneration(_) => e,
                other => QuicklinkError::id_generation(other.message().to_string()),
            }
        })?;

        self.store
            .save_url(&short_id, long_url)
            .await
            .map_err(|e| {
                error!("Failed to save URL for {}: {}", short_id, e);
                QuicklinkError::persistence(format!("Failed to save URL: {}", e.message()))
            })?;

        info!("Created short link {} -> {}", short_id, long_url);
        Ok(short_id)
    }

    /// 解析短 ID，成功时记录一次访问
    ///
    /// 存储层的任何错误都按 NotFound 处理；访问日志入队失败不影响结果。
    pub async fn resolve(&self, short_id: &str, client_ip: &str) -> Result<String> {
        let long_url = match self.store.get_url(short_id).await {
            Ok(url) => url,
            Err(QuicklinkError::NotFound(_)) => {
                debug!("Short id not found: {}", short_id);
                return Err(QuicklinkError::not_found(format!(
                    "Short id '{}' does not exist",
                    short_id
                )));
            }
            Err(e) => {
                warn!("Store lookup for {} failed, treating as not found: {}", short_id, e);
                return Err(QuicklinkError::not_found(format!(
                    "Short id '{}' could not be resolved",
                    short_id
                )));
            }
        };

        if !self
            .access_log
            .record(AccessLogEntry::new(short_id, client_ip))
            .await
        {
            debug!("Access for {} was not logged", short_id);
        }

        Ok(long_url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analytics::{AccessLogPipeline, AccessLogSink};
    use crate::services::NanoIdGenerator;
    use crate::store::MemoryStore;
    use async_trait::async_trait;
    use std::sync::Mutex;
    use std::time::Duration;

    #[derive(Default)]
    struct RecordingSink {
        entries: Mutex<Vec<AccessLogEntry>>,
    }

    #[async_trait]
    impl AccessLogSink for RecordingSink {
        async fn log_access(&self, entry: AccessLogEntry) -> anyhow::Result<()> {
            self.entries.lock().unwrap().push(entry);
            Ok(())
        }
    }

    struct BrokenGenerator;

    impl IdGenerator for BrokenGenerator {
        fn generate(&self) -> Result<String> {
            Err(QuicklinkError::id_generation("entropy source unavailable"))
        }
    }

    fn service_with(
        store: Arc<MemoryStore>,
        ids: Arc<dyn IdGenerator>,
    ) -> (LinkService, AccessLogPipeline, Arc<RecordingSink>) {
        let sink = Arc::new(RecordingSink::default());
        let pipeline = AccessLogPipeline::start(sink.clone(), 16);
        let service = LinkService::new(store, ids, pipeline.logger());
        (service, pipeline, sink)
    }

    #[tokio::test]
    async fn test_shorten_then_resolve() {
        let store = Arc::new(MemoryStore::new());
        let (service, pipeline, sink) =
            service_with(store.clone(), Arc::new(NanoIdGenerator::default()));

        let id = service.shorten("https://example.com").await.unwrap();
        assert_eq!(id.len(), 6);
        assert!(store.contains_key(&id));

        let url = service.resolve(&id, "1.2.3.4").await.unwrap();
        assert_eq!(url, "https://example.com");

        pipeline.shutdown(Duration::from_secs(5)).await.unwrap();
        let entries = sink.entries.lock().unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].short_id, id);
        assert_eq!(entries[0].client_ip, "1.2.3.4");
    }

    #[tokio::test]
    async fn test_shorten_rejects_empty_url() {
        let store = Arc::new(MemoryStore::new());
        let (service, _pipeline, _sink) =
            service_with(store, Arc::new(NanoIdGenerator::default()));

        assert!(matches!(
            service.shorten("").await,
            Err(QuicklinkError::InvalidInput(_))
        ));
    }

    #[tokio::test]
    async fn test_shorten_reports_generator_failure() {
        let store = Arc::new(MemoryStore::new());
        let (service, _pipeline, _sink) = service_with(store, Arc::new(BrokenGenerator));

        assert!(matches!(
            service.shorten("https://example.com").await,
            Err(QuicklinkError::IdGeneration(_))
        ));
    }

    #[tokio::test]
    async fn test_shorten_reports_save_failure() {
        let store = Arc::new(MemoryStore::new());
        store.set_available(false);
        let (service, _pipeline, _sink) =
            service_with(store, Arc::new(NanoIdGenerator::default()));

        assert!(matches!(
            service.shorten("https://example.com").await,
            Err(QuicklinkError::Persistence(_))
        ));
    }

    #[tokio::test]
    async fn test_failed_lookups_are_not_logged() {
        let store = Arc::new(MemoryStore::new());
        let (service, pipeline, sink) =
            service_with(store.clone(), Arc::new(NanoIdGenerator::default()));

        assert!(matches!(
            service.resolve("doesnotexist", "1.2.3.4").await,
            Err(QuicklinkError::NotFound(_))
        ));

        // 存储故障同样表现为 NotFound
        store.set_available(false);
        assert!(matches!(
            service.resolve("abc123", "1.2.3.4").await,
            Err(QuicklinkError::NotFound(_))
        ));

        let report = pipeline.shutdown(Duration::from_secs(5)).await.unwrap();
        assert_eq!(report.persisted, 0);
        assert!(sink.entries.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_resolve_succeeds_after_pipeline_closed() {
        let store = Arc::new(MemoryStore::new());
        let (service, pipeline, _sink) =
            service_with(store, Arc::new(NanoIdGenerator::default()));

        let id = service.shorten("https://example.com/a").await.unwrap();
        pipeline.shutdown(Duration::from_secs(5)).await;

        assert_eq!(
            service.resolve(&id, "1.2.3.4").await.unwrap(),
            "https://example.com/a"
        );
    }
}
