use actix_web::{HttpResponse, Responder, web};
use serde_json::{Value, json};
use tracing::{error, trace};

use crate::errors::BioLinksError;
use crate::services::ClickService;

pub struct ClickApi;

impl ClickApi {
    /// POST /track-click
    ///
    /// 请求体按原始字节读取再解析，不依赖 Content-Type，
    /// 以便兼容 `navigator.sendBeacon` 发出的请求。
    pub async fn track_click(
        service: web::Data<ClickService>,
        body: web::Bytes,
    ) -> impl Responder {
        trace!("Received track-click request ({} bytes)", body.len());

        let payload: Value = match serde_json::from_slice(&body) {
            Ok(v) => v,
            Err(e) => {
                trace!("Rejecting malformed track-click body: {}", e);
                return HttpResponse::BadRequest().json(json!({ "error": "Invalid JSON body" }));
            }
        };
        let link_name = match payload.get("link_name") {
            None | Some(Value::Null) => None,
            Some(Value::String(name)) => Some(name.as_str()),
            Some(other) => {
                trace!("Rejecting non-string link_name: {}", other);
                return HttpResponse::BadRequest()
                    .json(json!({ "error": "Link name must be a string" }));
            }
        };

        match service.track_click(link_name).await {
            Ok(_) => HttpResponse::Ok().json(json!({ "message": "Click tracked successfully" })),
            Err(BioLinksError::Validation(msg)) => {
                HttpResponse::BadRequest().json(json!({ "error": msg }))
            }
            Err(e) => {
                error!("Error tracking click: {}", e);
                HttpResponse::InternalServerError().json(json!({ "error": "Internal server error" }))
            }
        }
    }
}

/// 点击上报路由配置
pub fn click_routes() -> actix_web::Scope {
    web::scope("/track-click").route("", web::post().to(ClickApi::track_click))
}
