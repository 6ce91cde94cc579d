use std::sync::Arc;
use std::time::Duration;

use actix_web::dev::ServerHandle;
use tokio::signal;
use tokio::time::timeout;
use tracing::{error, info, warn};

use crate::users::UserDirectory;

/// 关闭超时时间（秒）
const SHUTDOWN_TIMEOUT_SECS: u64 = 30;

/// 等待 Ctrl+C（Unix 下同时监听 SIGTERM）
pub async fn wait_for_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!(
                "Failed to listen for Ctrl+C: {}. Proceeding with shutdown anyway.",
                e
            );
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                warn!("Failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {}
        _ = terminate => {}
    }
    info!("Shutdown signal received, draining in-flight requests...");
}

/// 优雅关闭：等待进行中的请求完成，超时后强制退出
pub async fn graceful_shutdown(handle: ServerHandle, users: Arc<dyn UserDirectory>) {
    let stopped = timeout(
        Duration::from_secs(SHUTDOWN_TIMEOUT_SECS),
        handle.stop(true),
    )
    .await;

    if stopped.is_err() {
        error!(
            "Graceful shutdown timed out after {} seconds! Forcing exit.",
            SHUTDOWN_TIMEOUT_SECS
        );
        std::process::exit(1);
    }

    // 内存目录不落盘，退出前记录一下规模
    info!(
        "Server stopped; {} users were tracked by the {} directory",
        users.count().await,
        users.backend_name()
    );
}
