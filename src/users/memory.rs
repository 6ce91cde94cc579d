use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use moka::future::Cache;
use parking_lot::Mutex;
use tracing::debug;

use super::traits::{DirectoryHealth, UserDirectory, UserProfile};
use crate::errors::Result;

/// 缓存中的用户条目，计数器原子更新
struct UserEntry {
    phone_number: String,
    created_at: DateTime<Utc>,
    message_count: AtomicU64,
    last_message_at: Mutex<Option<DateTime<Utc>>>,
}

impl UserEntry {
    fn new(phone_number: &str) -> Self {
        Self {
            phone_number: phone_number.to_string(),
            created_at: Utc::now(),
            message_count: AtomicU64::new(0),
            last_message_at: Mutex::new(None),
        }
    }

    fn snapshot(&self) -> UserProfile {
        UserProfile {
            phone_number: self.phone_number.clone(),
            created_at: self.created_at,
            message_count: self.message_count.load(Ordering::Acquire),
            last_message_at: *self.last_message_at.lock(),
        }
    }
}

/// 基于 moka 的内存用户目录
///
/// - 容量上限 `max_entries`，超出后按 TinyLFU 淘汰
/// - `idle_ttl` 内无活动的用户被移除
/// - 同一手机号的并发首次访问只创建一个条目
pub struct MemoryUserDirectory {
    inner: Cache<String, Arc<UserEntry>>,
}

impl MemoryUserDirectory {
    pub fn new(max_entries: u64, idle_ttl: Duration) -> Self {
        let inner = Cache::builder()
            .max_capacity(max_entries)
            .time_to_idle(idle_ttl)
            .build();

        debug!(
            "MemoryUserDirectory initialized with max capacity: {}, idle TTL: {}s",
            max_entries,
            idle_ttl.as_secs()
        );
        Self { inner }
    }

    async fn entry(&self, phone_number: &str) -> (Arc<UserEntry>, bool) {
        let entry = self
            .inner
            .entry(phone_number.to_string())
            .or_insert_with(async { Arc::new(UserEntry::new(phone_number)) })
            .await;
        let created = entry.is_fresh();
        (entry.into_value(), created)
    }
}

#[async_trait]
impl UserDirectory for MemoryUserDirectory {
    async fn get_or_create(&self, phone_number: &str) -> Result<(UserProfile, bool)> {
        let (entry, created) = self.entry(phone_number).await;
        if created {
            debug!("New user registered in memory directory");
        }
        Ok((entry.snapshot(), created))
    }

    async fn record_message(&self, phone_number: &str) -> Result<UserProfile> {
        let (entry, _) = self.entry(phone_number).await;
        entry.message_count.fetch_add(1, Ordering::AcqRel);
        {
            let mut last = entry.last_message_at.lock();
            let now = Utc::now();
            // 并发写入时保持单调
            if last.is_none_or(|prev| prev < now) {
                *last = Some(now);
            }
        }
        Ok(entry.snapshot())
    }

    async fn get(&self, phone_number: &str) -> Result<Option<UserProfile>> {
        Ok(self.inner.get(phone_number).await.map(|e| e.snapshot()))
    }

    async fn count(&self) -> u64 {
        self.inner.run_pending_tasks().await;
        self.inner.entry_count()
    }

    async fn health_check(&self) -> DirectoryHealth {
        DirectoryHealth {
            status: "healthy".to_string(),
            backend: self.backend_name().to_string(),
            users: self.count().await,
            error: None,
        }
    }

    fn backend_name(&self) -> &'static str {
        "memory"
    }
}
