use std::sync::Arc;

use actix_web::{HttpResponse, web};

use crate::api::constants::WHATSAPP_PATH;
use crate::errors::RelayError;
use crate::services::{RelayService, WhatsAppRequest};

pub struct WhatsAppHandlers;

impl WhatsAppHandlers {
    pub async fn handle_message(
        relay: web::Data<Arc<RelayService>>,
        body: web::Json<WhatsAppRequest>,
    ) -> Result<HttpResponse, RelayError> {
        let reply = relay.handle(body.into_inner()).await?;
        Ok(HttpResponse::Ok().json(reply))
    }
}

/// WhatsApp 路由配置
pub fn whatsapp_routes() -> actix_web::Resource {
    web::resource(WHATSAPP_PATH).route(web::post().to(WhatsAppHandlers::handle_message))
}
