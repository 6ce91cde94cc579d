use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, error};

use crate::agent::{AgentClient, AgentStatus};
use crate::users::{DirectoryHealth, UserDirectory};
use crate::utils::format_duration_human;

pub const SERVICE_NAME: &str = "WhatsApp Bot Service";
pub const SERVICE_VERSION: &str = env!("CARGO_PKG_VERSION");

/// 用户目录健康检查超时
const DIRECTORY_CHECK_TIMEOUT: Duration = Duration::from_secs(5);

// 应用启动时间结构体
#[derive(Clone, Debug)]
pub struct AppStartTime {
    pub start_datetime: DateTime<Utc>,
}

impl AppStartTime {
    pub fn now() -> Self {
        Self {
            start_datetime: Utc::now(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthDependencies {
    pub user_store: String,
    pub agent_service: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthReport {
    pub status: String,
    pub service: String,
    pub version: String,
    pub timestamp: String,
    pub uptime_seconds: u64,
    pub uptime_human: String,
    pub users_tracked: u64,
    pub dependencies: HealthDependencies,
    pub response_time_ms: u64,
}

impl HealthReport {
    pub fn is_healthy(&self) -> bool {
        self.status == "healthy"
    }
}

/// Health Service
///
/// 汇总用户目录与 Agent 服务的状态。Agent 探测结果由客户端缓存，
/// 因此频繁的探针请求不会打到 Agent 上。
pub struct HealthService {
    users: Arc<dyn UserDirectory>,
    agent: Arc<dyn AgentClient>,
    start_time: AppStartTime,
}

impl HealthService {
    pub fn new(
        users: Arc<dyn UserDirectory>,
        agent: Arc<dyn AgentClient>,
        start_time: AppStartTime,
    ) -> Self {
        Self {
            users,
            agent,
            start_time,
        }
    }

    async fn directory_health(&self) -> DirectoryHealth {
        match tokio::time::timeout(DIRECTORY_CHECK_TIMEOUT, self.users.health_check()).await {
            Ok(health) => health,
            Err(_) => {
                error!("User directory health check timeout");
                DirectoryHealth {
                    status: "unhealthy".to_string(),
                    backend: self.users.backend_name().to_string(),
                    users: 0,
                    error: Some("timeout".to_string()),
                }
            }
        }
    }

    pub async fn report(&self) -> HealthReport {
        let started = Instant::now();

        let (directory, agent_status) = tokio::join!(self.directory_health(), self.agent.probe());

        let user_store = if directory.is_healthy() {
            "connected".to_string()
        } else {
            format!(
                "error: {}",
                directory.error.as_deref().unwrap_or("unknown error")
            )
        };

        let healthy = directory.is_healthy() && agent_status.is_acceptable();
        let now = Utc::now();
        let uptime_seconds = (now - self.start_time.start_datetime).num_seconds().max(0) as u64;

        let report = HealthReport {
            status: if healthy { "healthy" } else { "degraded" }.to_string(),
            service: SERVICE_NAME.to_string(),
            version: SERVICE_VERSION.to_string(),
            timestamp: now.to_rfc3339(),
            uptime_seconds,
            uptime_human: format_duration_human(self.start_time.start_datetime, now),
            users_tracked: directory.users,
            dependencies: HealthDependencies {
                user_store,
                agent_service: agent_status.to_string(),
            },
            response_time_ms: started.elapsed().as_millis() as u64,
        };

        debug!(
            "Health check completed in {:?}, status: {}, agent: {}",
            started.elapsed(),
            report.status,
            agent_status
        );

        report
    }

    /// Agent 当前状态（启动日志使用）
    pub async fn agent_status(&self) -> AgentStatus {
        self.agent.probe().await
    }
}
