use std::sync::Arc;

use anyhow::{Context, Result, bail};
use tracing::{debug, info, warn};

use crate::agent::{AgentClient, AgentStatus, HttpAgentClient};
use crate::config::StaticConfig;
use crate::services::{AppStartTime, HealthService, RelayService};
use crate::users::{UserDirectory, UserDirectoryFactory};

pub struct StartupContext {
    pub users: Arc<dyn UserDirectory>,
    pub agent: Arc<dyn AgentClient>,
    pub relay: Arc<RelayService>,
    pub health: Arc<HealthService>,
}

/// 检查配置：警告写日志，存在错误时拒绝启动
fn check_config(config: &StaticConfig) -> Result<()> {
    let issues = config.validate();
    let mut errors = 0;
    for issue in &issues {
        if issue.is_error() {
            errors += 1;
            tracing::error!("Config {}: {}", issue.key, issue.message);
        } else {
            warn!("Config {}: {}", issue.key, issue.message);
        }
    }

    if errors > 0 {
        bail!(
            "Configuration has {} error(s); run `agrirelay check-config` for details",
            errors
        );
    }
    Ok(())
}

/// 准备服务器启动的上下文
/// 包括用户目录、Agent 客户端和业务服务
pub async fn prepare_server_startup(config: &StaticConfig) -> Result<StartupContext> {
    let start_time = std::time::Instant::now();
    debug!("Starting pre-startup processing...");

    check_config(config)?;

    let users =
        UserDirectoryFactory::create(&config.users).context("Failed to create user directory")?;
    info!("Using user directory backend: {}", users.backend_name());

    let http_agent = HttpAgentClient::new(&config.agent);
    match http_agent.chat_url() {
        Some(url) => info!("Agent service ({} client): {}", http_agent.name(), url),
        None => warn!(
            "Agent URL is not configured (AGENT_URL / agent.url); \
             every message will receive the fallback reply"
        ),
    }
    let agent: Arc<dyn AgentClient> = Arc::new(http_agent);

    let relay = Arc::new(RelayService::new(
        users.clone(),
        agent.clone(),
        config.relay,
        config.logging.mask_phone_numbers,
    ));
    let health = Arc::new(HealthService::new(
        users.clone(),
        agent.clone(),
        AppStartTime::now(),
    ));

    // 启动时探测一次，Agent 不可用时仍然继续启动
    match health.agent_status().await {
        AgentStatus::Healthy => info!("Agent service is reachable"),
        AgentStatus::NotConfigured => debug!("Agent probe skipped: not configured"),
        status => warn!(
            "Agent service is {} at startup; requests will get fallback replies until it recovers",
            status
        ),
    }

    info!(
        "Pre-startup processing completed in {} ms",
        start_time.elapsed().as_millis()
    );

    Ok(StartupContext {
        users,
        agent,
        relay,
        health,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_startup_without_agent() {
        let ctx = prepare_server_startup(&StaticConfig::default())
            .await
            .unwrap();
        assert_eq!(ctx.users.backend_name(), "memory");
        assert_eq!(ctx.agent.probe().await, AgentStatus::NotConfigured);
    }

    #[tokio::test]
    async fn test_startup_rejects_invalid_config() {
        let mut config = StaticConfig::default();
        config.users.backend = "mongodb".to_string();
        assert!(prepare_server_startup(&config).await.is_err());
    }

    #[tokio::test]
    async fn test_startup_rejects_unusable_idle_ttl() {
        // 0 会让每条消息都变成新用户，过大则 moka 构建缓存时 panic
        for ttl in [0, u64::MAX] {
            let mut config = StaticConfig::default();
            config.users.idle_ttl_secs = ttl;
            assert!(prepare_server_startup(&config).await.is_err(), "ttl {}", ttl);
        }
    }
}
