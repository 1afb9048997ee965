use std::time::Duration;

use tokio::signal;
use tracing::{error, info, warn};

use crate::analytics::AccessLogPipeline;

/// 等待 Ctrl+C（Unix 下同时监听 SIGTERM）
pub async fn listen_for_shutdown() {
    #[cfg(unix)]
    {
        let mut terminate = match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(stream) => Some(stream),
            Err(e) => {
                warn!("Failed to listen for SIGTERM: {}", e);
                None
            }
        };

        tokio::select! {
            res = signal::ctrl_c() => log_ctrl_c(res),
            _ = async {
                match terminate.as_mut() {
                    Some(stream) => {
                        stream.recv().await;
                    }
                    None => std::future::pending::<()>().await,
                }
            } => info!("SIGTERM received, shutting down..."),
        }
    }

    #[cfg(not(unix))]
    log_ctrl_c(signal::ctrl_c().await);
}

fn log_ctrl_c(res: std::io::Result<()>) {
    match res {
        Ok(()) => info!("Shutdown signal received, draining access logs..."),
        Err(e) => warn!(
            "Failed to listen for Ctrl+C: {}. Proceeding with shutdown anyway.",
            e
        ),
    }
}

/// 关闭访问日志管道，等待剩余记录写完
pub async fn drain_access_logs(pipeline: &AccessLogPipeline, timeout: Duration) {
    match pipeline.shutdown(timeout).await {
        Some(report) if report.failed > 0 => {
            warn!(
                "Access log pipeline stopped with {} failed writes ({} persisted)",
                report.failed, report.persisted
            );
        }
        Some(report) => {
            info!(
                "Access log pipeline stopped, {} entries persisted",
                report.persisted
            );
        }
        None => {
            error!("Access log pipeline did not shut down cleanly");
        }
    }
}
