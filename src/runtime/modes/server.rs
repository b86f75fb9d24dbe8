//! Server mode
//!
//! 启动 HTTP 服务器并挂载页面、点击上报和健康检查路由。

use actix_web::{
    App, HttpServer,
    middleware::{Compress, DefaultHeaders},
    web,
};
use anyhow::{Context, Result};
use std::sync::Arc;
use tracing::warn;

use crate::api::middleware::RequestIdMiddleware;
use crate::api::services::{click_routes, health_routes, page_routes};
use crate::config::StaticConfig;
use crate::runtime::lifetime;

/// 请求体上限，点击上报只有一个短字段
const MAX_PAYLOAD_BYTES: usize = 16 * 1024;

/// Run the HTTP server
///
/// **Note**: Logging system must be initialized before calling this function
pub async fn run_server(config: Arc<StaticConfig>) -> Result<()> {
    let startup = lifetime::startup::prepare_server_startup(&config)
        .await
        .inspect_err(|e| tracing::error!("Server startup failed: {:#}", e))?;

    let store = startup.store.clone();
    let click_service = startup.click_service.clone();

    let workers = config.server.workers.clamp(1, 32);
    warn!("Using {} workers for the server", workers);

    let bind_address = format!("{}:{}", config.server.host, config.server.port);
    let app_config = config.clone();
    let store_for_shutdown = store.clone();

    let server = HttpServer::new(move || {
        App::new()
            .wrap(RequestIdMiddleware)
            .wrap(Compress::default())
            .wrap(
                DefaultHeaders::new()
                    .add(("X-Content-Type-Options", "nosniff"))
                    .add(("Cache-Control", "no-cache, no-store, must-revalidate")),
            )
            .app_data(web::Data::new(store.clone()))
            .app_data(web::Data::new(click_service.clone()))
            .app_data(web::Data::new(app_config.clone()))
            .app_data(web::PayloadConfig::new(MAX_PAYLOAD_BYTES))
            .service(health_routes())
            .service(click_routes())
            .service(page_routes())
    })
    .keep_alive(std::time::Duration::from_secs(30))
    .client_request_timeout(std::time::Duration::from_millis(5000))
    .workers(workers)
    .disable_signals()
    .bind(&bind_address)
    .with_context(|| format!("Failed to bind {}", bind_address))?;

    warn!("Starting server at http://{}", bind_address);
    let server = server.run();

    tokio::select! {
        res = server => {
            res.context("HTTP server terminated with an error")?;
        }
        _ = lifetime::shutdown::listen_for_shutdown(store_for_shutdown) => {
            warn!("Graceful shutdown: all tasks completed");
        }
    }

    Ok(())
}
