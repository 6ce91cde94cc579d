mod r#impl;
mod structs;
pub mod validators;

pub use r#impl::{get_config, init_config};
pub use structs::*;
pub use validators::{ConfigIssue, IssueLevel};
