pub mod health;
pub mod relay;

pub use health::{
    AppStartTime, HealthDependencies, HealthReport, HealthService, SERVICE_NAME, SERVICE_VERSION,
};
pub use relay::{REPLY_STATUS_SUCCESS, RelayService, WhatsAppReply, WhatsAppRequest};
