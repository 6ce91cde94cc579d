//! Mode routing
//!
//! - Server mode (HTTP relay)
//! - Config mode (generate / check the TOML configuration)

pub mod config;
pub mod server;

pub use self::config::{check_config, generate_config};
pub use server::run_server;
