use std::fmt;

use async_trait::async_trait;
use serde::Serialize;

use super::AgentError;

/// 发送给 Agent 的一次提问
#[derive(Debug, Clone)]
pub struct AgentQuery {
    pub message: String,
    pub phone_number: String,
}

/// Agent 请求体
#[derive(Debug, Serialize)]
pub(crate) struct AgentPayload<'a> {
    pub message: &'a str,
    #[serde(rename = "phoneNumber", skip_serializing_if = "Option::is_none")]
    pub phone_number: Option<&'a str>,
}

/// Agent 服务可用性
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AgentStatus {
    Healthy,
    Unhealthy(u16),
    Unreachable,
    NotConfigured,
}

impl AgentStatus {
    /// 健康检查聚合时是否视为可用
    pub fn is_acceptable(&self) -> bool {
        matches!(self, AgentStatus::Healthy | AgentStatus::NotConfigured)
    }
}

impl fmt::Display for AgentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AgentStatus::Healthy => write!(f, "healthy"),
            AgentStatus::Unhealthy(code) => write!(f, "unhealthy ({})", code),
            AgentStatus::Unreachable => write!(f, "unreachable"),
            AgentStatus::NotConfigured => write!(f, "not configured"),
        }
    }
}

#[async_trait]
pub trait AgentClient: Send + Sync {
    /// 提问并等待回答文本
    async fn ask(&self, query: &AgentQuery) -> Result<String, AgentError>;

    /// 探测 Agent 服务是否可用
    async fn probe(&self) -> AgentStatus;

    fn name(&self) -> &'static str;
}
