//! Server mode
//!
//! Builds the shared state and runs the HTTP server until shutdown.

use actix_web::{App, HttpServer, middleware::DefaultHeaders, web};
use anyhow::{Context, Result};
use tracing::{info, warn};

use crate::api::middleware::RequestIdMiddleware;
use crate::api::services::configure;
use crate::config::get_config;

use super::startup::prepare_server_startup;

/// Run the HTTP server
///
/// **Note**: Logging system must be initialized before calling this function
pub async fn run_server() -> Result<()> {
    let config = get_config();

    let startup = prepare_server_startup(&config).map_err(|e| {
        tracing::error!("Server startup failed: {}", e);
        e
    })?;

    let cpu_count = config.server.cpu_count.clamp(1, 32);
    warn!("Using {} CPU cores for the server", cpu_count);

    let bind_address = format!("{}:{}", config.server.host, config.server.port);

    let server = HttpServer::new(move || {
        let startup = startup.clone();
        App::new()
            .wrap(RequestIdMiddleware)
            .wrap(DefaultHeaders::new().add(("Cache-Control", "no-store")))
            .app_data(web::FormConfig::default().limit(16 * 1024))
            .configure(|cfg| startup.register_app_data(cfg))
            .configure(configure)
    })
    .keep_alive(std::time::Duration::from_secs(30))
    .client_request_timeout(std::time::Duration::from_millis(5000))
    .client_disconnect_timeout(std::time::Duration::from_millis(1000))
    .workers(cpu_count)
    .bind(&bind_address)
    .with_context(|| format!("Failed to bind {}", bind_address))?;

    warn!("Starting server at http://{}", bind_address);

    server.run().await.context("HTTP server error")?;

    info!("Server stopped");
    Ok(())
}
