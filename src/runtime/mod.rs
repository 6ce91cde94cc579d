//! Application lifecycle and execution modes
//!
//! - `lifetime`: startup context and graceful shutdown
//! - `modes`: server and configuration commands

pub mod lifetime;
pub mod modes;
