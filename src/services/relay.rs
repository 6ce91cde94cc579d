//! Relay service
//!
//! One WhatsApp message in, one agent answer out. Shared by the HTTP
//! handler and the integration tests.

use std::sync::Arc;
use std::time::Instant;

use chrono::Utc;
use serde::{Deserialize, Deserializer, Serialize};
use tracing::{debug, error, info, warn};

use crate::agent::{AgentClient, AgentQuery};
use crate::config::RelayConfig;
use crate::errors::{RelayError, Result};
use crate::users::UserDirectory;
use crate::utils::{display_phone, truncate_chars};

/// 日志中保留的消息长度
const LOGGED_MESSAGE_CHARS: usize = 100;

pub const REPLY_STATUS_SUCCESS: &str = "success";

// ============ Request/Response DTOs ============

/// Incoming message from the WhatsApp bridge
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WhatsAppRequest {
    /// Accepts a JSON string or a non-negative integer
    #[serde(deserialize_with = "deserialize_phone_number")]
    pub phone_number: String,
    pub message: String,
}

/// Answer returned to the WhatsApp bridge
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WhatsAppReply {
    pub phone_number: String,
    pub message: String,
    pub timestamp: String,
    pub status: String,
}

fn deserialize_phone_number<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum PhoneNumber {
        Text(String),
        Number(u64),
    }

    match PhoneNumber::deserialize(deserializer) {
        Ok(PhoneNumber::Text(text)) => Ok(text),
        Ok(PhoneNumber::Number(number)) => Ok(number.to_string()),
        Err(_) => Err(serde::de::Error::custom(
            "phoneNumber must be a string or a non-negative integer",
        )),
    }
}

pub struct RelayService {
    users: Arc<dyn UserDirectory>,
    agent: Arc<dyn AgentClient>,
    limits: RelayConfig,
    mask_phone_numbers: bool,
}

impl RelayService {
    pub fn new(
        users: Arc<dyn UserDirectory>,
        agent: Arc<dyn AgentClient>,
        limits: RelayConfig,
        mask_phone_numbers: bool,
    ) -> Self {
        Self {
            users,
            agent,
            limits,
            mask_phone_numbers,
        }
    }

    /// 校验请求，返回规整后的手机号
    fn validate<'a>(&self, req: &'a WhatsAppRequest) -> Result<&'a str> {
        let phone = req.phone_number.trim();
        if phone.is_empty() || req.message.trim().is_empty() {
            return Err(RelayError::validation(
                "phoneNumber and message are required",
            ));
        }

        if phone.chars().count() > self.limits.max_phone_chars {
            return Err(RelayError::validation(format!(
                "phoneNumber must be at most {} characters",
                self.limits.max_phone_chars
            )));
        }

        if req.message.chars().count() > self.limits.max_message_chars {
            return Err(RelayError::validation(format!(
                "message must be at most {} characters",
                self.limits.max_message_chars
            )));
        }

        Ok(phone)
    }

    /// 处理一条 WhatsApp 消息
    ///
    /// Agent 失败不会让请求失败：用户会收到对应的致歉文本。
    /// 只有校验失败和用户目录查询失败会返回错误。
    pub async fn handle(&self, req: WhatsAppRequest) -> Result<WhatsAppReply> {
        let start = Instant::now();
        let phone = self.validate(&req)?;
        let shown_phone = display_phone(phone, self.mask_phone_numbers);

        info!(
            "New WhatsApp message from {}: {}",
            shown_phone,
            truncate_chars(&req.message, LOGGED_MESSAGE_CHARS)
        );

        let (profile, created) = self.users.get_or_create(phone).await.map_err(|e| {
            error!("User lookup failed for {}: {}", shown_phone, e);
            RelayError::user_store(format!("User lookup failed: {}", e.message()))
        })?;
        if created {
            info!("Registered new user {}", shown_phone);
        } else {
            debug!(
                "Known user {} with {} previous messages",
                shown_phone, profile.message_count
            );
        }

        let query = AgentQuery {
            message: req.message.clone(),
            phone_number: phone.to_string(),
        };
        let agent_start = Instant::now();
        let answer = match self.agent.ask(&query).await {
            Ok(answer) => {
                debug!(
                    "Agent answered {} in {} ms: {}",
                    shown_phone,
                    agent_start.elapsed().as_millis(),
                    truncate_chars(&answer, LOGGED_MESSAGE_CHARS)
                );
                answer
            }
            Err(e) => {
                warn!(
                    "Agent call for {} failed after {} ms: {}",
                    shown_phone,
                    agent_start.elapsed().as_millis(),
                    e
                );
                e.fallback_reply()
            }
        };

        if let Err(e) = self.users.record_message(phone).await {
            warn!("Could not update message count for {}: {}", shown_phone, e);
        }

        info!(
            "WhatsApp request for {} completed in {} ms",
            shown_phone,
            start.elapsed().as_millis()
        );

        Ok(WhatsAppReply {
            phone_number: phone.to_string(),
            message: answer,
            timestamp: Utc::now().to_rfc3339(),
            status: REPLY_STATUS_SUCCESS.to_string(),
        })
    }
}
