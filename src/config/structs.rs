use serde::{Deserialize, Serialize};

/// 默认配置文件路径
pub const DEFAULT_CONFIG_PATH: &str = "config.toml";

/// HTTP 方法枚举（CORS 允许的方法）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Delete,
    Patch,
    Head,
    Options,
}

impl std::fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Get => write!(f, "GET"),
            Self::Post => write!(f, "POST"),
            Self::Put => write!(f, "PUT"),
            Self::Delete => write!(f, "DELETE"),
            Self::Patch => write!(f, "PATCH"),
            Self::Head => write!(f, "HEAD"),
            Self::Options => write!(f, "OPTIONS"),
        }
    }
}

impl std::str::FromStr for HttpMethod {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "GET" => Ok(Self::Get),
            "POST" => Ok(Self::Post),
            "PUT" => Ok(Self::Put),
            "DELETE" => Ok(Self::Delete),
            "PATCH" => Ok(Self::Patch),
            "HEAD" => Ok(Self::Head),
            "OPTIONS" => Ok(Self::Options),
            _ => Err(format!(
                "Invalid HTTP method: '{}'. Valid: GET, POST, PUT, DELETE, PATCH, HEAD, OPTIONS",
                s
            )),
        }
    }
}

/// 静态配置（从 TOML + 环境变量加载，启动时使用）
///
/// - server: 监听地址、端口、worker 数量
/// - agent: 聊天 Agent 服务地址与超时
/// - users: 用户目录（内存）
/// - relay: 请求校验限制
/// - cors: 跨域配置
/// - logging: 日志配置
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct StaticConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub agent: AgentConfig,
    #[serde(default)]
    pub users: UsersConfig,
    #[serde(default)]
    pub relay: RelayConfig,
    #[serde(default)]
    pub cors: CorsConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl StaticConfig {
    /// 从默认路径加载配置
    pub fn load() -> Self {
        Self::load_from(DEFAULT_CONFIG_PATH)
    }

    /// 从 TOML 文件和环境变量加载配置
    ///
    /// 优先级：ENV > config.toml > 默认值
    /// ENV 前缀：AR，分隔符：__
    /// 示例：AR__SERVER__PORT=9999
    ///
    /// 旧部署使用的 `AGENT_URL`、`WHATSAPP_ORIGIN`、`PORT` 仍然生效，
    /// 并且优先于 AR__ 前缀的同名配置。
    pub fn load_from(path: &str) -> Self {
        use config::{Config, Environment, File};

        let builder = Config::builder()
            .add_source(File::with_name(path).required(false))
            .add_source(
                Environment::with_prefix("AR")
                    .separator("__")
                    .list_separator(",")
                    .with_list_parse_key("cors.allowed_origins")
                    .with_list_parse_key("cors.allowed_methods")
                    .try_parsing(true),
            );

        let builder = match apply_legacy_env(builder) {
            Ok(b) => b,
            Err(e) => {
                eprintln!("[ERROR] Failed to apply legacy environment variables: {}", e);
                return Self::default();
            }
        };

        match builder.build() {
            Ok(settings) => match settings.try_deserialize::<StaticConfig>() {
                Ok(config) => {
                    if std::path::Path::new(path).exists() {
                        eprintln!("[INFO] Configuration loaded from: {}", path);
                    }
                    config
                }
                Err(e) => {
                    eprintln!("[ERROR] Failed to deserialize config: {}", e);
                    Self::default()
                }
            },
            Err(e) => {
                eprintln!("[ERROR] Failed to build config: {}", e);
                Self::default()
            }
        }
    }

    /// 生成示例 TOML 配置文件
    pub fn generate_sample_config() -> String {
        let sample_config = Self::default();
        toml::to_string_pretty(&sample_config)
            .unwrap_or_else(|e| format!("Error generating sample config: {}", e))
    }

    /// 保存配置到 TOML 文件
    pub fn save_to_file<P: AsRef<std::path::Path>>(
        &self,
        path: P,
    ) -> Result<(), Box<dyn std::error::Error>> {
        let content = toml::to_string_pretty(self)?;

        if let Some(parent) = path.as_ref().parent()
            && !parent.as_os_str().is_empty()
            && !parent.exists()
        {
            std::fs::create_dir_all(parent)?;
        }

        std::fs::write(path, content)?;
        Ok(())
    }
}

fn apply_legacy_env(
    builder: config::ConfigBuilder<config::builder::DefaultState>,
) -> Result<config::ConfigBuilder<config::builder::DefaultState>, config::ConfigError> {
    let non_empty = |key: &str| std::env::var(key).ok().filter(|v| !v.trim().is_empty());

    let mut builder = builder.set_override_option("agent.url", non_empty("AGENT_URL"))?;
    if let Some(origin) = non_empty("WHATSAPP_ORIGIN") {
        builder = builder.set_override("cors.allowed_origins", vec![origin])?;
    }
    if let Some(port) = non_empty("PORT").and_then(|p| p.parse::<u16>().ok()) {
        builder = builder.set_override("server.port", port as i64)?;
    }
    Ok(builder)
}

/// 服务器配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_server_host")]
    pub host: String,
    #[serde(default = "default_server_port")]
    pub port: u16,
    #[serde(default = "default_cpu_count")]
    pub cpu_count: usize,
    /// 请求体大小上限（字节）
    #[serde(default = "default_payload_limit")]
    pub payload_limit: usize,
}

/// 聊天 Agent 配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentConfig {
    /// Agent 聊天接口地址，例如 https://agent.example.com/chat
    #[serde(default)]
    pub url: Option<String>,
    /// 单次对话请求超时（秒）
    #[serde(default = "default_agent_timeout")]
    pub timeout_secs: u64,
    /// 健康探测超时（秒）
    #[serde(default = "default_agent_health_timeout")]
    pub health_timeout_secs: u64,
    /// 健康探测地址，未设置时由 url 推导（去掉 /chat 后追加 /docs）
    #[serde(default)]
    pub health_url: Option<String>,
    /// 健康探测结果缓存时间（秒），0 表示不缓存
    #[serde(default = "default_agent_health_cache")]
    pub health_cache_secs: u64,
    /// 是否在请求体中附带 phoneNumber
    #[serde(default)]
    pub forward_phone_number: bool,
}

impl AgentConfig {
    /// 计算健康探测地址
    pub fn effective_health_url(&self) -> Option<String> {
        if let Some(ref url) = self.health_url
            && !url.trim().is_empty()
        {
            return Some(url.clone());
        }

        let url = self.url.as_ref()?.trim();
        if url.is_empty() {
            return None;
        }
        let base = url.trim_end_matches('/');
        let base = base.strip_suffix("/chat").unwrap_or(base);
        Some(format!("{}/docs", base))
    }
}

/// 用户目录配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UsersConfig {
    /// memory | null
    #[serde(default = "default_users_backend")]
    pub backend: String,
    #[serde(default = "default_users_max_entries")]
    pub max_entries: u64,
    /// 用户无活动多久后被淘汰（秒）
    #[serde(default = "default_users_idle_ttl")]
    pub idle_ttl_secs: u64,
}

/// 消息校验限制
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct RelayConfig {
    #[serde(default = "default_max_message_chars")]
    pub max_message_chars: usize,
    #[serde(default = "default_max_phone_chars")]
    pub max_phone_chars: usize,
}

/// CORS 配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CorsConfig {
    #[serde(default = "default_cors_origins")]
    pub allowed_origins: Vec<String>,
    #[serde(default = "default_cors_methods")]
    pub allowed_methods: Vec<HttpMethod>,
    #[serde(default = "default_cors_max_age")]
    pub max_age: u64,
}

/// 日志配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default = "default_log_format")]
    pub format: String,
    #[serde(default)]
    pub file: Option<String>,
    #[serde(default = "default_max_backups")]
    pub max_backups: u32,
    #[serde(default = "default_enable_rotation")]
    pub enable_rotation: bool,
    /// 日志中是否遮蔽手机号中间位
    #[serde(default = "default_mask_phone_numbers")]
    pub mask_phone_numbers: bool,
}

// ============================================================
// Default value functions for static config
// ============================================================

fn default_server_host() -> String {
    "127.0.0.1".to_string()
}

fn default_server_port() -> u16 {
    8000
}

fn default_cpu_count() -> usize {
    num_cpus::get()
}

fn default_payload_limit() -> usize {
    64 * 1024
}

fn default_agent_timeout() -> u64 {
    120
}

fn default_agent_health_timeout() -> u64 {
    5
}

fn default_agent_health_cache() -> u64 {
    10
}

fn default_users_backend() -> String {
    "memory".to_string()
}

fn default_users_max_entries() -> u64 {
    100_000
}

fn default_users_idle_ttl() -> u64 {
    30 * 24 * 3600
}

fn default_max_message_chars() -> usize {
    4096
}

fn default_max_phone_chars() -> usize {
    32
}

fn default_cors_origins() -> Vec<String> {
    vec!["*".to_string()]
}

fn default_cors_methods() -> Vec<HttpMethod> {
    vec![HttpMethod::Get, HttpMethod::Post]
}

fn default_cors_max_age() -> u64 {
    3600
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "text".to_string()
}

fn default_max_backups() -> u32 {
    5
}

fn default_enable_rotation() -> bool {
    true
}

fn default_mask_phone_numbers() -> bool {
    true
}

// ============================================================
// Default implementations
// ============================================================

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_server_host(),
            port: default_server_port(),
            cpu_count: default_cpu_count(),
            payload_limit: default_payload_limit(),
        }
    }
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            url: None,
            timeout_secs: default_agent_timeout(),
            health_timeout_secs: default_agent_health_timeout(),
            health_url: None,
            health_cache_secs: default_agent_health_cache(),
            forward_phone_number: false,
        }
    }
}

impl Default for UsersConfig {
    fn default() -> Self {
        Self {
            backend: default_users_backend(),
            max_entries: default_users_max_entries(),
            idle_ttl_secs: default_users_idle_ttl(),
        }
    }
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            max_message_chars: default_max_message_chars(),
            max_phone_chars: default_max_phone_chars(),
        }
    }
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            allowed_origins: default_cors_origins(),
            allowed_methods: default_cors_methods(),
            max_age: default_cors_max_age(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
            file: None,
            max_backups: default_max_backups(),
            enable_rotation: default_enable_rotation(),
            mask_phone_numbers: default_mask_phone_numbers(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_health_url_derived_from_chat_url() {
        let agent = AgentConfig {
            url: Some("https://agent.example.com/chat".to_string()),
            ..Default::default()
        };
        assert_eq!(
            agent.effective_health_url().as_deref(),
            Some("https://agent.example.com/docs")
        );
    }

    #[test]
    fn test_health_url_trailing_slash() {
        let agent = AgentConfig {
            url: Some("http://localhost:9000/chat/".to_string()),
            ..Default::default()
        };
        assert_eq!(
            agent.effective_health_url().as_deref(),
            Some("http://localhost:9000/docs")
        );
    }

    #[test]
    fn test_health_url_explicit_override() {
        let agent = AgentConfig {
            url: Some("http://localhost:9000/chat".to_string()),
            health_url: Some("http://localhost:9000/healthz".to_string()),
            ..Default::default()
        };
        assert_eq!(
            agent.effective_health_url().as_deref(),
            Some("http://localhost:9000/healthz")
        );
    }

    #[test]
    fn test_health_url_without_agent() {
        assert_eq!(AgentConfig::default().effective_health_url(), None);
    }

    #[test]
    fn test_sample_config_roundtrips() {
        let sample = StaticConfig::generate_sample_config();
        let parsed: StaticConfig = toml::from_str(&sample).expect("sample should parse");
        assert_eq!(parsed.server.port, 8000);
        assert_eq!(parsed.agent.timeout_secs, 120);
        assert_eq!(parsed.cors.allowed_methods, vec![HttpMethod::Get, HttpMethod::Post]);
    }

    #[test]
    fn test_load_from_toml_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("relay.toml");
        std::fs::write(
            &path,
            r#"
[server]
port = 9100

[agent]
timeout_secs = 30

[relay]
max_message_chars = 500
"#,
        )
        .unwrap();

        let config = StaticConfig::load_from(path.to_str().unwrap());
        assert_eq!(config.server.port, 9100);
        assert_eq!(config.agent.timeout_secs, 30);
        assert_eq!(config.relay.max_message_chars, 500);
        assert_eq!(config.relay.max_phone_chars, 32);
    }

    #[test]
    fn test_http_method_parse() {
        assert_eq!("post".parse::<HttpMethod>(), Ok(HttpMethod::Post));
        assert!("TRACE".parse::<HttpMethod>().is_err());
    }
}
