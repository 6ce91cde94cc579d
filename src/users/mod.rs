//! User directory
//!
//! Tracks who has talked to the relay: first contact time, message count
//! and last activity. Entries live in process memory only.
//!
//! - `memory`: bounded moka cache with idle eviction (default)
//! - `null`: tracking disabled

mod memory;
mod null;
pub mod traits;

use std::sync::Arc;

use tracing::debug;

use crate::config::UsersConfig;
use crate::errors::{RelayError, Result};

pub use memory::MemoryUserDirectory;
pub use null::NullUserDirectory;
pub use traits::{DirectoryHealth, UserDirectory, UserProfile};

pub struct UserDirectoryFactory;

impl UserDirectoryFactory {
    /// 根据 users.backend 创建用户目录
    pub fn create(config: &UsersConfig) -> Result<Arc<dyn UserDirectory>> {
        let directory: Arc<dyn UserDirectory> = match config.backend.as_str() {
            "memory" => Arc::new(MemoryUserDirectory::new(
                config.max_entries,
                std::time::Duration::from_secs(config.idle_ttl_secs),
            )),
            "null" => Arc::new(NullUserDirectory),
            other => {
                return Err(RelayError::config(format!(
                    "Unknown user directory backend: '{}'. Supported: memory, null",
                    other
                )));
            }
        };
        debug!("User directory backend: {}", directory.backend_name());
        Ok(directory)
    }
}
