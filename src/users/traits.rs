use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::errors::Result;

/// 用户档案快照
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub phone_number: String,
    pub created_at: DateTime<Utc>,
    pub message_count: u64,
    pub last_message_at: Option<DateTime<Utc>>,
}

impl UserProfile {
    pub fn new(phone_number: impl Into<String>) -> Self {
        Self {
            phone_number: phone_number.into(),
            created_at: Utc::now(),
            message_count: 0,
            last_message_at: None,
        }
    }
}

/// 用户目录健康状态
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DirectoryHealth {
    pub status: String,
    pub backend: String,
    pub users: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl DirectoryHealth {
    pub fn is_healthy(&self) -> bool {
        self.status == "healthy"
    }
}

#[async_trait]
pub trait UserDirectory: Send + Sync {
    /// 查找用户，不存在时创建。返回 (档案, 是否新建)
    async fn get_or_create(&self, phone_number: &str) -> Result<(UserProfile, bool)>;

    /// 记录一次消息往来：计数 +1，更新最后消息时间
    async fn record_message(&self, phone_number: &str) -> Result<UserProfile>;

    async fn get(&self, phone_number: &str) -> Result<Option<UserProfile>>;

    async fn count(&self) -> u64;

    async fn health_check(&self) -> DirectoryHealth;

    fn backend_name(&self) -> &'static str;
}
