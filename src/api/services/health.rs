use actix_web::{HttpResponse, Responder, http::StatusCode, web};
use std::sync::Arc;
use std::time::Instant;
use tracing::{info, trace};

use crate::services::check_store_health;
use crate::storage::ClickStore;

/// Health Service
///
/// 直接调用 store 的探活接口，不经过业务层。
pub struct HealthService;

impl HealthService {
    /// 200 healthy / 500 unhealthy，失败时响应体带上原始错误信息
    pub async fn health_check(store: web::Data<Arc<ClickStore>>) -> impl Responder {
        let start_time = Instant::now();
        trace!("Received health check request");

        let report = check_store_health(&store).await;
        let status = if report.is_healthy() {
            StatusCode::OK
        } else {
            StatusCode::INTERNAL_SERVER_ERROR
        };

        info!(
            "Health check completed in {:?}, status: {}",
            start_time.elapsed(),
            if report.is_healthy() { "healthy" } else { "unhealthy" }
        );

        HttpResponse::build(status).json(report)
    }

    /// 就绪检查：store 已完成初始化才返回 200，不会触发初始化
    pub async fn readiness_check(store: web::Data<Arc<ClickStore>>) -> impl Responder {
        trace!("Received readiness check request");

        if store.is_ready() {
            HttpResponse::Ok().content_type("text/plain").body("OK")
        } else {
            HttpResponse::ServiceUnavailable()
                .content_type("text/plain")
                .body(store.state_label())
        }
    }

    // 活跃性检查，进程能响应即可
    pub async fn liveness_check() -> impl Responder {
        trace!("Received liveness check request");

        HttpResponse::NoContent().finish()
    }
}

/// Health 路由配置
pub fn health_routes() -> actix_web::Scope {
    web::scope("/health")
        .route("", web::get().to(HealthService::health_check))
        .route("/ready", web::get().to(HealthService::readiness_check))
        .route("/ready", web::head().to(HealthService::readiness_check))
        .route("/live", web::get().to(HealthService::liveness_check))
        .route("/live", web::head().to(HealthService::liveness_check))
}
