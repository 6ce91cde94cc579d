use std::collections::BTreeMap;

use actix_web::{HttpResponse, Responder, web};
use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::api::constants::{ROOT_PATH, SERVICE_DESCRIPTION};
use crate::services::{SERVICE_NAME, SERVICE_VERSION};

/// `GET /` 返回的服务信息
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceInfo {
    pub status: String,
    pub service: String,
    pub version: String,
    pub description: String,
    pub endpoints: BTreeMap<String, String>,
}

impl ServiceInfo {
    pub fn current() -> Self {
        let endpoints = [
            ("root", "GET / (Service info)"),
            ("health", "GET /health (Health check)"),
            ("whatsapp", "POST /whatsapp (Main WhatsApp endpoint)"),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();

        Self {
            status: "healthy".to_string(),
            service: SERVICE_NAME.to_string(),
            version: SERVICE_VERSION.to_string(),
            description: SERVICE_DESCRIPTION.to_string(),
            endpoints,
        }
    }
}

async fn service_info() -> impl Responder {
    trace!("Received service info request");
    HttpResponse::Ok().json(ServiceInfo::current())
}

/// 根路由配置
pub fn root_routes() -> actix_web::Resource {
    web::resource(ROOT_PATH)
        .route(web::get().to(service_info))
        .route(web::head().to(service_info))
}
