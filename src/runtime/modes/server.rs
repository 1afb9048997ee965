//! Server mode
//!
//! 启动 HTTP 服务，所有路由都经过限流中间件。

use std::time::Duration;

use actix_web::{
    App, HttpServer,
    middleware::{Compress, DefaultHeaders},
    web,
};
use anyhow::{Context, Result};
use tracing::{error, info, warn};

use crate::api;
use crate::api::middleware::RateLimit;
use crate::config::StaticConfig;
use crate::runtime::lifetime;

/// 运行 HTTP 服务直到服务退出或收到关闭信号
///
/// **Note**: 调用前需要先初始化日志系统
pub async fn run_server(config: StaticConfig) -> Result<()> {
    let startup = lifetime::startup::prepare_server_startup(&config)
        .await
        .map_err(|e| {
            error!("Server startup failed: {:#}", e);
            e
        })?;

    let link_service = startup.link_service.clone();
    let limiter = startup.limiter.clone();
    let ip_policy = startup.ip_policy.clone();
    let pipeline = startup.pipeline.clone();

    let cpu_count = config.server.cpu_count.clamp(1, 32);
    let bind_address = format!("{}:{}", config.server.host, config.server.port);

    let server = HttpServer::new(move || {
        App::new()
            .wrap(RateLimit::new(limiter.clone(), ip_policy.clone()))
            .wrap(Compress::default())
            .wrap(DefaultHeaders::new().add(("Cache-Control", "no-cache, no-store, must-revalidate")))
            .app_data(web::Data::new(link_service.clone()))
            .app_data(web::Data::new(ip_policy.clone()))
            .app_data(web::PayloadConfig::new(64 * 1024))
            .configure(api::configure)
    })
    .keep_alive(Duration::from_secs(30))
    .workers(cpu_count)
    .disable_signals()
    .bind(&bind_address)
    .with_context(|| format!("Failed to bind {}", bind_address))?
    .run();

    info!(
        "Starting server at http://{} ({} workers)",
        bind_address, cpu_count
    );

    let handle = server.handle();
    let mut server_task = actix_web::rt::spawn(server);

    let outcome: Result<()> = tokio::select! {
        res = &mut server_task => {
            warn!("HTTP server exited");
            res.context("HTTP server task panicked")
                .and_then(|r| r.context("HTTP server stopped with an error"))
        }
        _ = lifetime::shutdown::listen_for_shutdown() => {
            info!("Stopping HTTP server...");
            handle.stop(true).await;
            if let Err(e) = server_task.await {
                warn!("HTTP server task ended abnormally: {}", e);
            }
            Ok(())
        }
    };

    // HTTP 服务已停止，不会再有新的访问记录入队
    let timeout = Duration::from_secs(config.analytics.shutdown_timeout_secs);
    lifetime::shutdown::drain_access_logs(&pipeline, timeout).await;

    outcome?;
    info!("Graceful shutdown completed");
    Ok(())
}
