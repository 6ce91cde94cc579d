pub mod health;
pub mod root;
pub mod whatsapp;

pub use health::{HealthHandlers, health_routes};
pub use root::{ServiceInfo, root_routes};
pub use whatsapp::{WhatsAppHandlers, whatsapp_routes};
