pub mod text;
pub mod time;

pub use text::{display_phone, mask_phone, truncate_chars};
pub use time::format_duration_human;
