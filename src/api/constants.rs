//! API 模块常量定义
//!
//! 路由路径与对外描述文本。

pub const ROOT_PATH: &str = "/";
pub const HEALTH_PREFIX: &str = "/health";
pub const WHATSAPP_PATH: &str = "/whatsapp";

pub const SERVICE_DESCRIPTION: &str = "Handles WhatsApp messages and routes to AI agent";
