use std::fmt;

/// Agent 调用失败的分类
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AgentError {
    NotConfigured,
    Timeout,
    Status { code: u16, body: String },
    Connect(String),
    Request(String),
    InvalidResponse(String),
    Internal(String),
}

impl AgentError {
    /// 发给用户的致歉文本
    pub fn fallback_reply(&self) -> String {
        match self {
            AgentError::Timeout => "Sorry, our service is taking longer than expected. \
                 Please try again in a few moments."
                .to_string(),
            AgentError::Status { code, .. } => match *code {
                405 => "Sorry, our AI assistant is currently unavailable. \
                     We're working to restore the service. Please try again later."
                    .to_string(),
                422 => "Sorry, there was an issue with your request format. Please try again."
                    .to_string(),
                500..=u16::MAX => "Sorry, our AI assistant is experiencing technical difficulties. \
                     Please try again in a few minutes."
                    .to_string(),
                400..=499 => "Sorry, we're unable to process your request right now. \
                     Please try again later."
                    .to_string(),
                other => format!("Agent error: {}", other),
            },
            AgentError::Connect(_) => "Sorry, our AI assistant is currently offline. \
                 We're working to restore the service. Please check back soon."
                .to_string(),
            AgentError::Request(_) => "Sorry, we're having trouble connecting to our AI assistant. \
                 Please try again in a few moments."
                .to_string(),
            AgentError::InvalidResponse(_) => "Sorry, we received an invalid response from our AI assistant. \
                 Please try again."
                .to_string(),
            AgentError::NotConfigured | AgentError::Internal(_) => {
                "Sorry, something went wrong. Please try again later.".to_string()
            }
        }
    }
}

impl fmt::Display for AgentError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AgentError::NotConfigured => write!(f, "agent URL is not configured"),
            AgentError::Timeout => write!(f, "agent request timed out"),
            AgentError::Status { code, body } => {
                write!(f, "agent returned HTTP {}: {}", code, body)
            }
            AgentError::Connect(msg) => write!(f, "agent connection failed: {}", msg),
            AgentError::Request(msg) => write!(f, "agent request failed: {}", msg),
            AgentError::InvalidResponse(msg) => write!(f, "agent response invalid: {}", msg),
            AgentError::Internal(msg) => write!(f, "agent client error: {}", msg),
        }
    }
}

impl std::error::Error for AgentError {}
