//! agrirelay - WhatsApp relay for the farmer-assistance chat agent
//!
//! Receives messages from the WhatsApp bridge, keeps a small in-memory
//! record of who is talking, forwards each question to the chat agent and
//! returns its answer. Agent failures turn into friendly apology replies
//! instead of HTTP errors.
//!
//! # Architecture
//! - `agent`: HTTP client for the chat agent (chat + health probe)
//! - `users`: user directory (in-memory, bounded)
//! - `services`: relay and health business logic
//! - `api`: HTTP handlers, routes and middleware
//! - `config`: configuration management
//! - `runtime`: application lifecycle and execution modes
//! - `system`: logging

pub mod agent;
pub mod api;
pub mod cli;
pub mod config;
pub mod errors;
pub mod runtime;
pub mod services;
pub mod system;
pub mod users;
pub mod utils;
