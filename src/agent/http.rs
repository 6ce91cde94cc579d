//! HTTP 聊天 Agent 客户端
//!
//! 使用 ureq（同步）在 spawn_blocking 线程池中发起请求，
//! 对话请求与健康探测使用各自的超时配置。

use std::time::Duration;

use async_trait::async_trait;
use moka::future::Cache;
use serde_json::Value;
use tracing::{debug, trace, warn};
use ureq::Agent;

use super::traits::{AgentClient, AgentPayload, AgentQuery, AgentStatus};
use super::AgentError;
use crate::config::AgentConfig;
use crate::utils::truncate_chars;

/// Agent 未返回 response 字段时的回复
pub const NO_RESPONSE_REPLY: &str = "No response from agent";

/// 错误日志中保留的响应体长度
///
/// Agent 的错误响应可能回显用户消息，与消息日志使用同样的上限。
pub const LOGGED_BODY_CHARS: usize = 100;

const PROBE_CACHE_KEY: &str = "agent";

fn build_agent(timeout: Duration) -> Agent {
    Agent::config_builder()
        .timeout_global(Some(timeout))
        .http_status_as_error(false)
        .build()
        .into()
}

/// 从 Agent 的 JSON 响应中取出回答文本
///
/// - `response` 为字符串：直接返回
/// - `response` 缺失或为 null：返回固定提示
/// - 其他类型：按 JSON 文本返回
pub fn extract_reply(body: &Value) -> Result<String, AgentError> {
    let object = body.as_object().ok_or_else(|| {
        AgentError::InvalidResponse("expected a JSON object from agent".to_string())
    })?;

    Ok(match object.get("response") {
        Some(Value::String(text)) => text.clone(),
        None | Some(Value::Null) => NO_RESPONSE_REPLY.to_string(),
        Some(other) => other.to_string(),
    })
}

fn classify_transport_error(err: ureq::Error) -> AgentError {
    use std::io::ErrorKind;

    match err {
        ureq::Error::Timeout(_) => AgentError::Timeout,
        ureq::Error::ConnectionFailed | ureq::Error::HostNotFound => {
            AgentError::Connect(err.to_string())
        }
        ureq::Error::Io(ref io) => match io.kind() {
            ErrorKind::TimedOut | ErrorKind::WouldBlock => AgentError::Timeout,
            ErrorKind::ConnectionRefused
            | ErrorKind::ConnectionReset
            | ErrorKind::ConnectionAborted
            | ErrorKind::NotConnected
            | ErrorKind::AddrNotAvailable => AgentError::Connect(err.to_string()),
            _ => AgentError::Request(err.to_string()),
        },
        other => AgentError::Request(other.to_string()),
    }
}

pub struct HttpAgentClient {
    chat_url: Option<String>,
    health_url: Option<String>,
    forward_phone_number: bool,
    chat_agent: Agent,
    probe_agent: Agent,
    /// 探测结果缓存（health_cache_secs = 0 时不缓存）
    probe_cache: Option<Cache<&'static str, AgentStatus>>,
}

impl HttpAgentClient {
    pub fn new(config: &AgentConfig) -> Self {
        let chat_url = config
            .url
            .as_ref()
            .map(|u| u.trim().to_string())
            .filter(|u| !u.is_empty());

        let probe_cache = (config.health_cache_secs > 0).then(|| {
            Cache::builder()
                .max_capacity(1)
                .time_to_live(Duration::from_secs(config.health_cache_secs))
                .build()
        });

        Self {
            chat_url,
            health_url: config.effective_health_url(),
            forward_phone_number: config.forward_phone_number,
            chat_agent: build_agent(Duration::from_secs(config.timeout_secs)),
            probe_agent: build_agent(Duration::from_secs(config.health_timeout_secs)),
            probe_cache,
        }
    }

    pub fn chat_url(&self) -> Option<&str> {
        self.chat_url.as_deref()
    }

    /// 同步发送对话请求（在 spawn_blocking 中调用）
    fn post_sync(agent: Agent, url: String, payload: Value) -> Result<String, AgentError> {
        let mut response = agent
            .post(&url)
            .header("Accept", "application/json")
            .send_json(&payload)
            .map_err(classify_transport_error)?;

        let status = response.status().as_u16();
        debug!("Agent responded with status {}", status);

        let body = response
            .body_mut()
            .read_to_string()
            .map_err(|e| match classify_transport_error(e) {
                AgentError::Request(msg) => AgentError::InvalidResponse(msg),
                other => other,
            })?;

        if !(200..300).contains(&status) {
            return Err(AgentError::Status {
                code: status,
                body: truncate_chars(&body, LOGGED_BODY_CHARS),
            });
        }

        let json: Value = serde_json::from_str(&body)
            .map_err(|e| AgentError::InvalidResponse(e.to_string()))?;
        trace!("Agent response body: {}", truncate_chars(&body, LOGGED_BODY_CHARS));

        extract_reply(&json)
    }

    /// 同步探测（在 spawn_blocking 中调用）
    fn probe_sync(agent: Agent, url: String) -> AgentStatus {
        match agent.get(&url).call() {
            Ok(response) => {
                let status = response.status().as_u16();
                if status == 200 {
                    AgentStatus::Healthy
                } else {
                    AgentStatus::Unhealthy(status)
                }
            }
            Err(e) => {
                warn!("Agent health probe to \"{}\" failed: {}", url, e);
                AgentStatus::Unreachable
            }
        }
    }

    async fn probe_uncached(&self) -> AgentStatus {
        let Some(url) = self.health_url.clone() else {
            return AgentStatus::NotConfigured;
        };
        if self.chat_url.is_none() {
            return AgentStatus::NotConfigured;
        }

        let agent = self.probe_agent.clone();
        tokio::task::spawn_blocking(move || Self::probe_sync(agent, url))
            .await
            .unwrap_or_else(|e| {
                warn!("Agent probe spawn_blocking failed: {}", e);
                AgentStatus::Unreachable
            })
    }
}

#[async_trait]
impl AgentClient for HttpAgentClient {
    async fn ask(&self, query: &AgentQuery) -> Result<String, AgentError> {
        let Some(url) = self.chat_url.clone() else {
            return Err(AgentError::NotConfigured);
        };

        let payload = AgentPayload {
            message: &query.message,
            phone_number: self
                .forward_phone_number
                .then_some(query.phone_number.as_str()),
        };
        let payload = serde_json::to_value(&payload)
            .map_err(|e| AgentError::Internal(format!("failed to encode payload: {}", e)))?;

        let agent = self.chat_agent.clone();
        tokio::task::spawn_blocking(move || Self::post_sync(agent, url, payload))
            .await
            .map_err(|e| AgentError::Internal(format!("agent task failed: {}", e)))?
    }

    async fn probe(&self) -> AgentStatus {
        match self.probe_cache {
            Some(ref cache) => {
                cache
                    .get_with(PROBE_CACHE_KEY, async { self.probe_uncached().await })
                    .await
            }
            None => self.probe_uncached().await,
        }
    }

    fn name(&self) -> &'static str {
        "http"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_extract_reply_string() {
        let body = json!({"response": "Apply 50kg of urea per acre."});
        assert_eq!(extract_reply(&body).unwrap(), "Apply 50kg of urea per acre.");
    }

    #[test]
    fn test_extract_reply_missing_or_null() {
        assert_eq!(extract_reply(&json!({})).unwrap(), NO_RESPONSE_REPLY);
        assert_eq!(
            extract_reply(&json!({"response": null})).unwrap(),
            NO_RESPONSE_REPLY
        );
    }

    #[test]
    fn test_extract_reply_non_string() {
        assert_eq!(extract_reply(&json!({"response": 42})).unwrap(), "42");
        assert_eq!(
            extract_reply(&json!({"response": ["a", "b"]})).unwrap(),
            r#"["a","b"]"#
        );
    }

    #[test]
    fn test_extract_reply_rejects_non_object() {
        let err = extract_reply(&json!(["response"])).unwrap_err();
        assert!(matches!(err, AgentError::InvalidResponse(_)));
    }

    #[tokio::test]
    async fn test_unconfigured_client() {
        let client = HttpAgentClient::new(&AgentConfig::default());
        assert_eq!(client.chat_url(), None);

        let query = AgentQuery {
            message: "hello".to_string(),
            phone_number: "1".to_string(),
        };
        assert_eq!(client.ask(&query).await, Err(AgentError::NotConfigured));
        assert_eq!(client.probe().await, AgentStatus::NotConfigured);
    }
}
