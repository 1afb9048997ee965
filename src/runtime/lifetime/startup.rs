use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use tracing::{debug, info, warn};

use crate::analytics::{AccessLogPipeline, AccessLogSink, TracingAccessLogSink};
use crate::config::StaticConfig;
use crate::rate_limit::RateLimiter;
use crate::services::{LinkService, NanoIdGenerator};
use crate::storage::SeaOrmAccessLogSink;
use crate::store::{KvStore, RedisStore};
use crate::utils::ClientIpPolicy;

/// 服务运行期间共享的组件
pub struct StartupContext {
    pub store: Arc<dyn KvStore>,
    pub limiter: Arc<RateLimiter>,
    pub link_service: Arc<LinkService>,
    pub pipeline: Arc<AccessLogPipeline>,
    pub ip_policy: Arc<ClientIpPolicy>,
}

/// 连接外部依赖并组装服务组件
pub async fn prepare_server_startup(config: &StaticConfig) -> Result<StartupContext> {
    let start_time = std::time::Instant::now();
    debug!("Starting pre-startup processing...");

    // 多个依赖都会拉起 rustls，重复安装只会返回 Err
    if rustls::crypto::ring::default_provider()
        .install_default()
        .is_err()
    {
        debug!("rustls crypto provider already installed");
    }

    let url_ttl = Duration::from_secs(config.links.ttl_secs);
    let store = RedisStore::connect(&config.redis, url_ttl)
        .await
        .context("Failed to connect to Redis")?;

    let sink: Arc<dyn AccessLogSink> = match config.analytics.database_url.as_deref() {
        Some(url) if !url.is_empty() => {
            let sink = SeaOrmAccessLogSink::connect(url)
                .await
                .context("Failed to prepare access log database")?;
            info!("Access logs will be stored in the database");
            Arc::new(sink)
        }
        _ => {
            warn!("No analytics database configured, access logs go to the tracing output only");
            Arc::new(TracingAccessLogSink)
        }
    };

    let context = build_context(config, Arc::new(store), sink);

    info!(
        "Pre-startup processing completed in {} ms",
        start_time.elapsed().as_millis()
    );
    Ok(context)
}

/// 用已就绪的存储和 Sink 组装组件，并启动访问日志 worker
///
/// 需要在 tokio runtime 中调用。
pub fn build_context(
    config: &StaticConfig,
    store: Arc<dyn KvStore>,
    sink: Arc<dyn AccessLogSink>,
) -> StartupContext {
    let pipeline = Arc::new(AccessLogPipeline::start(
        sink,
        config.analytics.queue_capacity,
    ));
    let limiter = Arc::new(RateLimiter::from_config(store.clone(), &config.rate_limit));
    let ids = Arc::new(NanoIdGenerator::new(config.links.short_id_length));
    let link_service = Arc::new(LinkService::new(store.clone(), ids, pipeline.logger()));
    let ip_policy = Arc::new(ClientIpPolicy::new(&config.server.trusted_proxies));

    debug!(
        "Rate limit: {} requests per {:?}",
        limiter.max_requests(),
        limiter.window()
    );

    StartupContext {
        store,
        limiter,
        link_service,
        pipeline,
        ip_policy,
    }
}
