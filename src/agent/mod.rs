//! Chat agent client
//!
//! The agent is an external HTTP service that turns a farmer's question into
//! an answer. This module owns the wire contract and maps every failure to a
//! user-facing apology so the relay can always reply.

mod error;
mod http;
pub mod traits;

pub use error::AgentError;
pub use http::{HttpAgentClient, LOGGED_BODY_CHARS, extract_reply};
pub use traits::{AgentClient, AgentQuery, AgentStatus};
