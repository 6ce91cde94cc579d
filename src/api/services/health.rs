use actix_web::{HttpResponse, Responder, web};
use std::sync::Arc;
use tracing::{trace, warn};

use crate::services::HealthService;

pub struct HealthHandlers;

impl HealthHandlers {
    pub async fn health_check(health: web::Data<Arc<HealthService>>) -> impl Responder {
        trace!("Received health check request");

        let report = health.report().await;
        if !report.is_healthy() {
            warn!(
                "Health check degraded: user_store={}, agent_service={}",
                report.dependencies.user_store, report.dependencies.agent_service
            );
        }

        // 与原有行为一致：degraded 也返回 200，由调用方读取 status 字段
        HttpResponse::Ok()
            .append_header(("Content-Type", "application/json; charset=utf-8"))
            .json(report)
    }

    // 简单的就绪检查，只返回 200 状态码
    pub async fn readiness_check() -> impl Responder {
        trace!("Received readiness check request");

        HttpResponse::Ok()
            .append_header(("Content-Type", "text/plain"))
            .body("OK")
    }

    // 活跃性检查
    pub async fn liveness_check() -> impl Responder {
        trace!("Received liveness check request");

        HttpResponse::NoContent().finish()
    }
}

/// Health 路由配置
pub fn health_routes() -> actix_web::Scope {
    web::scope(crate::api::constants::HEALTH_PREFIX)
        .route("", web::get().to(HealthHandlers::health_check))
        .route("", web::head().to(HealthHandlers::health_check))
        .route("/ready", web::get().to(HealthHandlers::readiness_check))
        .route("/ready", web::head().to(HealthHandlers::readiness_check))
        .route("/live", web::get().to(HealthHandlers::liveness_check))
        .route("/live", web::head().to(HealthHandlers::liveness_check))
}
