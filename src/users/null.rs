use async_trait::async_trait;
use tracing::trace;

use super::traits::{DirectoryHealth, UserDirectory, UserProfile};
use crate::errors::Result;

/// 不记录任何用户信息
pub struct NullUserDirectory;

#[async_trait]
impl UserDirectory for NullUserDirectory {
    async fn get_or_create(&self, phone_number: &str) -> Result<(UserProfile, bool)> {
        trace!("NullUserDirectory.get_or_create called");
        Ok((UserProfile::new(phone_number), true))
    }

    async fn record_message(&self, phone_number: &str) -> Result<UserProfile> {
        trace!("NullUserDirectory.record_message called, but no action taken");
        Ok(UserProfile::new(phone_number))
    }

    async fn get(&self, _phone_number: &str) -> Result<Option<UserProfile>> {
        Ok(None)
    }

    async fn count(&self) -> u64 {
        0
    }

    async fn health_check(&self) -> DirectoryHealth {
        DirectoryHealth {
            status: "healthy".to_string(),
            backend: self.backend_name().to_string(),
            users: 0,
            error: None,
        }
    }

    fn backend_name(&self) -> &'static str {
        "null"
    }
}
