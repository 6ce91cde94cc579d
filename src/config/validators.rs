//! 配置校验模块
//!
//! 启动前检查静态配置，区分致命错误与警告。

use std::fmt;

use super::StaticConfig;

/// moka 允许的最长过期时间（1000 年），超出会在构建缓存时 panic
pub const MAX_CACHE_DURATION_SECS: u64 = 1000 * 365 * 24 * 3600;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IssueLevel {
    Warning,
    Error,
}

/// 单条配置问题
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigIssue {
    pub level: IssueLevel,
    pub key: &'static str,
    pub message: String,
}

impl ConfigIssue {
    fn error(key: &'static str, message: impl Into<String>) -> Self {
        Self {
            level: IssueLevel::Error,
            key,
            message: message.into(),
        }
    }

    fn warning(key: &'static str, message: impl Into<String>) -> Self {
        Self {
            level: IssueLevel::Warning,
            key,
            message: message.into(),
        }
    }

    pub fn is_error(&self) -> bool {
        self.level == IssueLevel::Error
    }
}

impl fmt::Display for ConfigIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let level = match self.level {
            IssueLevel::Warning => "WARN",
            IssueLevel::Error => "ERROR",
        };
        write!(f, "[{}] {}: {}", level, self.key, self.message)
    }
}

/// 校验 http(s) 绝对地址
pub fn validate_http_url(value: &str) -> Result<url::Url, String> {
    let parsed = url::Url::parse(value.trim()).map_err(|e| format!("invalid URL: {}", e))?;
    match parsed.scheme() {
        "http" | "https" => {}
        other => return Err(format!("unsupported scheme '{}', expected http or https", other)),
    }
    if parsed.host_str().is_none_or(|h| h.is_empty()) {
        return Err("URL has no host".to_string());
    }
    Ok(parsed)
}

impl StaticConfig {
    /// 检查配置，返回发现的所有问题（空表示配置可用）
    pub fn validate(&self) -> Vec<ConfigIssue> {
        let mut issues = Vec::new();

        if self.server.port == 0 {
            issues.push(ConfigIssue::error("server.port", "port must not be 0"));
        }
        if self.server.payload_limit == 0 {
            issues.push(ConfigIssue::error(
                "server.payload_limit",
                "payload limit must be positive",
            ));
        }

        match self.agent.url.as_deref().map(str::trim) {
            None | Some("") => issues.push(ConfigIssue::warning(
                "agent.url",
                "agent URL is not set; every message will get a fallback reply",
            )),
            Some(url) => {
                if let Err(e) = validate_http_url(url) {
                    issues.push(ConfigIssue::error("agent.url", e));
                }
            }
        }
        if let Some(ref url) = self.agent.health_url
            && !url.trim().is_empty()
            && let Err(e) = validate_http_url(url)
        {
            issues.push(ConfigIssue::error("agent.health_url", e));
        }
        if self.agent.timeout_secs == 0 {
            issues.push(ConfigIssue::error(
                "agent.timeout_secs",
                "timeout must be positive",
            ));
        }
        if self.agent.health_cache_secs > MAX_CACHE_DURATION_SECS {
            issues.push(ConfigIssue::error(
                "agent.health_cache_secs",
                format!("cache TTL must be at most {} seconds", MAX_CACHE_DURATION_SECS),
            ));
        }
        if self.agent.health_timeout_secs == 0 {
            issues.push(ConfigIssue::error(
                "agent.health_timeout_secs",
                "timeout must be positive",
            ));
        }

        match self.users.backend.as_str() {
            "memory" | "null" => {}
            other => issues.push(ConfigIssue::error(
                "users.backend",
                format!("unknown backend '{}', expected memory or null", other),
            )),
        }
        if self.users.backend == "memory" && self.users.max_entries == 0 {
            issues.push(ConfigIssue::error(
                "users.max_entries",
                "capacity must be positive",
            ));
        }
        if self.users.backend == "memory" {
            if self.users.idle_ttl_secs == 0 {
                issues.push(ConfigIssue::error(
                    "users.idle_ttl_secs",
                    "idle TTL must be positive; 0 forgets every user immediately",
                ));
            } else if self.users.idle_ttl_secs > MAX_CACHE_DURATION_SECS {
                issues.push(ConfigIssue::error(
                    "users.idle_ttl_secs",
                    format!("idle TTL must be at most {} seconds", MAX_CACHE_DURATION_SECS),
                ));
            }
        }

        if self.relay.max_message_chars == 0 {
            issues.push(ConfigIssue::error(
                "relay.max_message_chars",
                "limit must be positive",
            ));
        }
        if self.relay.max_phone_chars == 0 {
            issues.push(ConfigIssue::error(
                "relay.max_phone_chars",
                "limit must be positive",
            ));
        }

        if self.cors.allowed_origins.iter().any(|o| o == "*") {
            issues.push(ConfigIssue::warning(
                "cors.allowed_origins",
                "any origin is allowed; set WHATSAPP_ORIGIN to restrict it",
            ));
        }

        match self.logging.format.as_str() {
            "text" | "json" => {}
            other => issues.push(ConfigIssue::error(
                "logging.format",
                format!("unknown format '{}', expected text or json", other),
            )),
        }

        issues
    }
}
