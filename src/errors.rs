use std::fmt;

use actix_web::{HttpResponse, ResponseError, http::StatusCode};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone)]
pub enum RelayError {
    Config(String),
    Validation(String),
    NotFound(String),
    UserStore(String),
    Serialization(String),
    FileOperation(String),
    PayloadParse(String),
    PayloadTooLarge(String),
}

impl RelayError {
    /// 获取错误代码
    pub fn code(&self) -> &'static str {
        match self {
            RelayError::Config(_) => "E001",
            RelayError::Validation(_) => "E002",
            RelayError::NotFound(_) => "E003",
            RelayError::UserStore(_) => "E004",
            RelayError::Serialization(_) => "E005",
            RelayError::FileOperation(_) => "E006",
            RelayError::PayloadParse(_) => "E007",
            RelayError::PayloadTooLarge(_) => "E008",
        }
    }

    /// 获取错误类型名称
    pub fn error_type(&self) -> &'static str {
        match self {
            RelayError::Config(_) => "Configuration Error",
            RelayError::Validation(_) => "Validation Error",
            RelayError::NotFound(_) => "Resource Not Found",
            RelayError::UserStore(_) => "User Store Error",
            RelayError::Serialization(_) => "Serialization Error",
            RelayError::FileOperation(_) => "File Operation Error",
            RelayError::PayloadParse(_) => "Payload Parse Error",
            RelayError::PayloadTooLarge(_) => "Payload Too Large",
        }
    }

    /// 获取错误详情
    pub fn message(&self) -> &str {
        match self {
            RelayError::Config(msg) => msg,
            RelayError::Validation(msg) => msg,
            RelayError::NotFound(msg) => msg,
            RelayError::UserStore(msg) => msg,
            RelayError::Serialization(msg) => msg,
            RelayError::FileOperation(msg) => msg,
            RelayError::PayloadParse(msg) => msg,
            RelayError::PayloadTooLarge(msg) => msg,
        }
    }

    /// 格式化为彩色输出（用于 Server 模式）
    pub fn format_colored(&self) -> String {
        use colored::Colorize;
        format!(
            "{} {} {}\n  {}",
            "[ERROR]".red().bold(),
            self.code().yellow(),
            self.error_type().red(),
            self.message().white()
        )
    }

    /// 格式化为简洁输出
    pub fn format_simple(&self) -> String {
        format!("{}: {}", self.error_type(), self.message())
    }
}

impl fmt::Display for RelayError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.format_simple())
    }
}

impl std::error::Error for RelayError {}

// 便捷的构造函数
impl RelayError {
    pub fn config<T: Into<String>>(msg: T) -> Self {
        RelayError::Config(msg.into())
    }

    pub fn validation<T: Into<String>>(msg: T) -> Self {
        RelayError::Validation(msg.into())
    }

    pub fn not_found<T: Into<String>>(msg: T) -> Self {
        RelayError::NotFound(msg.into())
    }

    pub fn user_store<T: Into<String>>(msg: T) -> Self {
        RelayError::UserStore(msg.into())
    }

    pub fn serialization<T: Into<String>>(msg: T) -> Self {
        RelayError::Serialization(msg.into())
    }

    pub fn file_operation<T: Into<String>>(msg: T) -> Self {
        RelayError::FileOperation(msg.into())
    }

    pub fn payload_parse<T: Into<String>>(msg: T) -> Self {
        RelayError::PayloadParse(msg.into())
    }

    pub fn payload_too_large<T: Into<String>>(msg: T) -> Self {
        RelayError::PayloadTooLarge(msg.into())
    }
}

impl From<std::io::Error> for RelayError {
    fn from(err: std::io::Error) -> Self {
        RelayError::FileOperation(err.to_string())
    }
}

impl From<serde_json::Error> for RelayError {
    fn from(err: serde_json::Error) -> Self {
        RelayError::Serialization(err.to_string())
    }
}

/// JSON error body returned by every failing endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
    pub status_code: u16,
    pub timestamp: String,
}

impl ErrorBody {
    pub fn new(status: StatusCode, error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            status_code: status.as_u16(),
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }
}

impl ResponseError for RelayError {
    fn status_code(&self) -> StatusCode {
        match self {
            RelayError::Validation(_) => StatusCode::BAD_REQUEST,
            RelayError::PayloadParse(_) => StatusCode::UNPROCESSABLE_ENTITY,
            RelayError::PayloadTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            RelayError::NotFound(_) => StatusCode::NOT_FOUND,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();
        let error = if status.is_server_error() {
            format!("{}: {}", self.error_type(), self.message())
        } else {
            self.message().to_string()
        };
        HttpResponse::build(status).json(ErrorBody::new(status, error))
    }
}

pub type Result<T> = std::result::Result<T, RelayError>;
