//! HTTP surface
//!
//! - `GET /`: service info
//! - `GET /health`, `/health/ready`, `/health/live`: health probes
//! - `POST /whatsapp`: relay one message to the agent

pub mod constants;
pub mod middleware;
pub mod services;

use actix_web::error::JsonPayloadError;
use actix_web::{HttpRequest, HttpResponse, ResponseError, web};
use tracing::debug;

use crate::errors::RelayError;
use services::{health_routes, root_routes, whatsapp_routes};

/// 注册全部路由；未匹配的请求返回 JSON 404
///
/// 调用方负责注册 `web::Data<Arc<RelayService>>`、`web::Data<Arc<HealthService>>`
/// 和 `json_config`。
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(root_routes())
        .service(health_routes())
        .service(whatsapp_routes())
        .default_service(web::to(not_found));
}

/// JSON 请求体配置：限制大小，解析失败时返回统一错误体
pub fn json_config(limit: usize) -> web::JsonConfig {
    web::JsonConfig::default()
        .limit(limit)
        .error_handler(|err, req| {
            debug!("Rejected JSON payload on {}: {}", req.path(), err);
            json_error(err).into()
        })
}

fn json_error(err: JsonPayloadError) -> RelayError {
    match err {
        JsonPayloadError::Overflow { limit } => {
            RelayError::payload_too_large(format!("Payload exceeds {} bytes", limit))
        }
        JsonPayloadError::OverflowKnownLength { length, limit } => RelayError::payload_too_large(
            format!("Payload of {} bytes exceeds {} bytes", length, limit),
        ),
        JsonPayloadError::ContentType => {
            RelayError::payload_parse("Content-Type must be application/json")
        }
        other => RelayError::payload_parse(other.to_string()),
    }
}

/// 未匹配路由的统一 404
pub async fn not_found(req: HttpRequest) -> HttpResponse {
    RelayError::not_found(format!("No route for {} {}", req.method(), req.path()))
        .error_response()
}
