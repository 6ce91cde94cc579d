//! HTTP API 集成测试
//!
//! 覆盖 `/`、`/health`、`/whatsapp`、404 以及 request id 中间件。

use std::sync::Arc;
use std::time::Duration;

use actix_web::http::StatusCode;
use actix_web::test::{self, TestRequest};
use actix_web::{App, web};
use async_trait::async_trait;
use serde_json::{Value, json};

use agrirelay::agent::{AgentClient, AgentError, AgentQuery, AgentStatus};
use agrirelay::api::middleware::request_id::REQUEST_ID_HEADER;
use agrirelay::api::middleware::{RequestIdMiddleware, TimingMiddleware};
use agrirelay::api::{configure_routes, json_config};
use agrirelay::config::RelayConfig;
use agrirelay::services::{AppStartTime, HealthService, RelayService, SERVICE_NAME};
use agrirelay::errors::{RelayError, Result};
use agrirelay::users::{DirectoryHealth, MemoryUserDirectory, UserDirectory, UserProfile};

// =============================================================================
// 测试环境
// =============================================================================

/// 把提问原样加上前缀返回的 Agent
struct EchoAgent {
    status: AgentStatus,
}

#[async_trait]
impl AgentClient for EchoAgent {
    async fn ask(&self, query: &AgentQuery) -> std::result::Result<String, AgentError> {
        match self.status {
            AgentStatus::Healthy => Ok(format!("echo: {}", query.message)),
            _ => Err(AgentError::Connect("connection refused".to_string())),
        }
    }

    async fn probe(&self) -> AgentStatus {
        self.status
    }

    fn name(&self) -> &'static str {
        "echo"
    }
}

/// 连接已断开的用户目录
struct BrokenDirectory;

#[async_trait]
impl UserDirectory for BrokenDirectory {
    async fn get_or_create(&self, _phone_number: &str) -> Result<(UserProfile, bool)> {
        Err(RelayError::user_store("connection reset"))
    }

    async fn record_message(&self, _phone_number: &str) -> Result<UserProfile> {
        Err(RelayError::user_store("connection reset"))
    }

    async fn get(&self, _phone_number: &str) -> Result<Option<UserProfile>> {
        Err(RelayError::user_store("connection reset"))
    }

    async fn count(&self) -> u64 {
        0
    }

    async fn health_check(&self) -> DirectoryHealth {
        DirectoryHealth {
            status: "unhealthy".to_string(),
            backend: "broken".to_string(),
            users: 0,
            error: Some("connection reset".to_string()),
        }
    }

    fn backend_name(&self) -> &'static str {
        "broken"
    }
}

struct TestState {
    users: Arc<dyn UserDirectory>,
    relay: Arc<RelayService>,
    health: Arc<HealthService>,
}

fn state_with(status: AgentStatus) -> TestState {
    state_from(
        Arc::new(MemoryUserDirectory::new(1000, Duration::from_secs(3600))),
        status,
    )
}

fn state_from(users: Arc<dyn UserDirectory>, status: AgentStatus) -> TestState {
    let agent: Arc<dyn AgentClient> = Arc::new(EchoAgent { status });
    let relay = Arc::new(RelayService::new(
        users.clone(),
        agent.clone(),
        RelayConfig::default(),
        true,
    ));
    let health = Arc::new(HealthService::new(
        users.clone(),
        agent,
        AppStartTime::now(),
    ));
    TestState {
        users,
        relay,
        health,
    }
}

macro_rules! init_app {
    ($state:expr) => {
        test::init_service(
            App::new()
                .wrap(TimingMiddleware)
                .wrap(RequestIdMiddleware)
                .app_data(web::Data::new($state.relay.clone()))
                .app_data(web::Data::new($state.health.clone()))
                .app_data(json_config(1024))
                .configure(configure_routes),
        )
        .await
    };
}

// =============================================================================
// GET /
// =============================================================================

#[actix_rt::test]
async fn test_root_service_info() {
    let state = state_with(AgentStatus::Healthy);
    let app = init_app!(state);

    let req = TestRequest::get().uri("/").to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;

    assert_eq!(body["status"], "healthy");
    assert_eq!(body["service"], SERVICE_NAME);
    assert_eq!(body["version"], env!("CARGO_PKG_VERSION"));
    assert!(body["endpoints"]["whatsapp"].as_str().unwrap().contains("POST /whatsapp"));
}

#[actix_rt::test]
async fn test_root_head() {
    let state = state_with(AgentStatus::Healthy);
    let app = init_app!(state);

    let req = TestRequest::default()
        .method(actix_web::http::Method::HEAD)
        .uri("/")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
}

// =============================================================================
// Health
// =============================================================================

#[actix_rt::test]
async fn test_health_when_agent_healthy() {
    let state = state_with(AgentStatus::Healthy);
    let app = init_app!(state);

    let req = TestRequest::get().uri("/health").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["dependencies"]["user_store"], "connected");
    assert_eq!(body["dependencies"]["agent_service"], "healthy");
    assert_eq!(body["users_tracked"], 0);
}

#[actix_rt::test]
async fn test_health_degraded_still_200() {
    let state = state_with(AgentStatus::Unreachable);
    let app = init_app!(state);

    let req = TestRequest::get().uri("/health").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["status"], "degraded");
    assert_eq!(body["dependencies"]["agent_service"], "unreachable");
}

#[actix_rt::test]
async fn test_health_reports_user_store_error() {
    let state = state_from(Arc::new(BrokenDirectory), AgentStatus::Healthy);
    let app = init_app!(state);

    let req = TestRequest::get().uri("/health").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["status"], "degraded");
    assert_eq!(body["dependencies"]["user_store"], "error: connection reset");
    assert_eq!(body["dependencies"]["agent_service"], "healthy");
}

#[actix_rt::test]
async fn test_readiness_and_liveness() {
    let state = state_with(AgentStatus::Healthy);
    let app = init_app!(state);

    let req = TestRequest::get().uri("/health/ready").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(test::read_body(resp).await, "OK");

    let req = TestRequest::get().uri("/health/live").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);
}

// =============================================================================
// POST /whatsapp
// =============================================================================

#[actix_rt::test]
async fn test_whatsapp_success() {
    let state = state_with(AgentStatus::Healthy);
    let app = init_app!(state);

    let req = TestRequest::post()
        .uri("/whatsapp")
        .set_json(json!({"phoneNumber": "+919876543210", "message": "Is it time to irrigate?"}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["phoneNumber"], "+919876543210");
    assert_eq!(body["message"], "echo: Is it time to irrigate?");
    assert_eq!(body["status"], "success");
    assert!(body["timestamp"].is_string());

    let profile = state.users.get("+919876543210").await.unwrap().unwrap();
    assert_eq!(profile.message_count, 1);
}

#[actix_rt::test]
async fn test_whatsapp_numeric_phone_number() {
    let state = state_with(AgentStatus::Healthy);
    let app = init_app!(state);

    let req = TestRequest::post()
        .uri("/whatsapp")
        .set_json(json!({"phoneNumber": 919876543210u64, "message": "hello", "extra": true}))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["phoneNumber"], "919876543210");
}

#[actix_rt::test]
async fn test_whatsapp_agent_down_returns_apology() {
    let state = state_with(AgentStatus::Unreachable);
    let app = init_app!(state);

    let req = TestRequest::post()
        .uri("/whatsapp")
        .set_json(json!({"phoneNumber": "15551234567", "message": "hello"}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["status"], "success");
    assert!(body["message"].as_str().unwrap().contains("currently offline"));
}

#[actix_rt::test]
async fn test_whatsapp_empty_message_is_400() {
    let state = state_with(AgentStatus::Healthy);
    let app = init_app!(state);

    let req = TestRequest::post()
        .uri("/whatsapp")
        .set_json(json!({"phoneNumber": "15551234567", "message": ""}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["status_code"], 400);
    assert!(body["error"].as_str().unwrap().contains("required"));
}

#[actix_rt::test]
async fn test_whatsapp_malformed_body_is_422() {
    let state = state_with(AgentStatus::Healthy);
    let app = init_app!(state);

    let cases = [
        r#"{"phoneNumber": "15551234567""#,
        r#"{"message": "missing phone"}"#,
        r#"{"phoneNumber": true, "message": "hi"}"#,
    ];
    for payload in cases {
        let req = TestRequest::post()
            .uri("/whatsapp")
            .insert_header(("Content-Type", "application/json"))
            .set_payload(payload)
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY, "{}", payload);

        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["status_code"], 422);
    }
}

#[actix_rt::test]
async fn test_whatsapp_oversized_body_is_413() {
    let state = state_with(AgentStatus::Healthy);
    let app = init_app!(state);

    let req = TestRequest::post()
        .uri("/whatsapp")
        .set_json(json!({"phoneNumber": "15551234567", "message": "a".repeat(4000)}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::PAYLOAD_TOO_LARGE);
}

#[actix_rt::test]
async fn test_whatsapp_get_not_allowed() {
    let state = state_with(AgentStatus::Healthy);
    let app = init_app!(state);

    let req = TestRequest::get().uri("/whatsapp").to_request();
    let resp = test::call_service(&app, req).await;
    assert!(resp.status().is_client_error());
    assert_ne!(resp.status(), StatusCode::OK);
}

// =============================================================================
// 404 / request id
// =============================================================================

#[actix_rt::test]
async fn test_unknown_route_is_json_404() {
    let state = state_with(AgentStatus::Healthy);
    let app = init_app!(state);

    let req = TestRequest::get().uri("/admin").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["status_code"], 404);
    assert!(body["error"].as_str().unwrap().contains("/admin"));
}

#[actix_rt::test]
async fn test_request_id_generated_and_echoed() {
    let state = state_with(AgentStatus::Healthy);
    let app = init_app!(state);

    let req = TestRequest::get().uri("/health/live").to_request();
    let resp = test::call_service(&app, req).await;
    let generated = resp.headers().get(REQUEST_ID_HEADER).unwrap();
    assert!(!generated.is_empty());

    let req = TestRequest::get()
        .uri("/health/live")
        .insert_header((REQUEST_ID_HEADER, "bridge-42"))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.headers().get(REQUEST_ID_HEADER).unwrap(), "bridge-42");
}
