//! Server mode
//!
//! Builds the startup context, configures the HTTP server and runs it
//! until a shutdown signal arrives.

use std::sync::Arc;
use std::time::Duration;

use actix_cors::Cors;
use actix_web::{
    App, HttpServer,
    body::MessageBody,
    dev::{ServiceFactory, ServiceRequest, ServiceResponse},
    middleware::{Compress, DefaultHeaders},
    web,
};
use anyhow::{Context, Result};
use tracing::{info, warn};

use crate::api::middleware::{RequestIdMiddleware, TimingMiddleware};
use crate::api::{configure_routes, json_config};
use crate::config::{CorsConfig, StaticConfig};
use crate::runtime::lifetime::{self, StartupContext};
use crate::services::{HealthService, RelayService};

/// worker 数量上限
const MAX_WORKERS: usize = 32;

/// Build CORS middleware from configuration
///
/// 空的 allowed_origins 表示只允许同源请求。
fn build_cors_middleware(cors_config: &CorsConfig) -> Cors {
    let mut cors = Cors::default();

    if cors_config.allowed_origins.iter().any(|o| o == "*") {
        cors = cors.allow_any_origin();
    } else {
        for origin in &cors_config.allowed_origins {
            cors = cors.allowed_origin(origin);
        }
    }

    let methods: Vec<actix_web::http::Method> = cors_config
        .allowed_methods
        .iter()
        .filter_map(|m| m.to_string().parse().ok())
        .collect();
    if !methods.is_empty() {
        cors = cors.allowed_methods(methods);
    }

    cors.allow_any_header().max_age(cors_config.max_age as usize)
}

/// 组装 App：路由、共享状态与中间件
///
/// 最后 wrap 的中间件位于最外层。RequestId 在最外层，
/// 使 Timing 及内层的日志都带上 request_id。
fn build_app(
    relay: web::Data<Arc<RelayService>>,
    health: web::Data<Arc<HealthService>>,
    cors_config: &CorsConfig,
    payload_limit: usize,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse<impl MessageBody + use<>>,
        Error = actix_web::Error,
        InitError = (),
    > + use<>,
> {
    App::new()
        .app_data(relay)
        .app_data(health)
        .app_data(json_config(payload_limit))
        .configure(configure_routes)
        .wrap(DefaultHeaders::new().add(("Cache-Control", "no-cache, no-store, must-revalidate")))
        .wrap(Compress::default())
        .wrap(build_cors_middleware(cors_config))
        .wrap(TimingMiddleware)
        .wrap(RequestIdMiddleware)
}

/// Run the HTTP server
///
/// **Note**: Logging system must be initialized before calling this function
pub async fn run_server(config: &StaticConfig) -> Result<()> {
    let StartupContext {
        users,
        relay,
        health,
        ..
    } = lifetime::prepare_server_startup(config).await.map_err(|e| {
        tracing::error!("Server startup failed: {}", e);
        e
    })?;

    let cpu_count = config.server.cpu_count.clamp(1, MAX_WORKERS);
    info!("Using {} worker threads for the server", cpu_count);

    let cors_config = config.cors.clone();
    if cors_config.allowed_origins.is_empty() {
        warn!("CORS allowed_origins is empty; cross-origin requests will be rejected");
    }
    let payload_limit = config.server.payload_limit;

    let relay_data = web::Data::new(relay);
    let health_data = web::Data::new(health);

    let bind_address = format!("{}:{}", config.server.host, config.server.port);

    let server = HttpServer::new(move || {
        build_app(
            relay_data.clone(),
            health_data.clone(),
            &cors_config,
            payload_limit,
        )
    })
    .keep_alive(Duration::from_secs(30))
    .client_request_timeout(Duration::from_millis(5000))
    .client_disconnect_timeout(Duration::from_millis(1000))
    .workers(cpu_count)
    .disable_signals()
    .bind(&bind_address)
    .with_context(|| format!("Failed to bind {}", bind_address))?
    .run();

    info!("WhatsApp relay listening on http://{}", bind_address);

    let handle = server.handle();
    let shutdown = actix_web::rt::spawn(async move {
        lifetime::shutdown::wait_for_signal().await;
        lifetime::shutdown::graceful_shutdown(handle, users).await;
    });

    // 信号由 shutdown 任务处理，server 在 stop 后返回
    match server.await {
        Ok(()) => {
            let _ = shutdown.await;
            warn!("Graceful shutdown complete");
            Ok(())
        }
        Err(e) => {
            shutdown.abort();
            Err(e).context("HTTP server exited with an error")
        }
    }
}
