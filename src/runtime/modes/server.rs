//! Server mode
//!
//! Builds the service graph, binds the listener and serves until Ctrl+C.

use std::time::Duration;

use actix_web::{App, HttpServer, middleware::DefaultHeaders};
use anyhow::{Context, Result};
use tracing::{info, warn};

use crate::api::{
    self,
    middleware::{RequestIdMiddleware, TimingMiddleware},
};
use crate::config::StaticConfig;
use crate::runtime::lifetime;

/// Run the HTTP server
///
/// **Note**: Logging must be initialized before calling this function.
pub async fn run_server(config: &StaticConfig) -> Result<()> {
    let mut startup = lifetime::startup::prepare_server_startup(config)
        .await
        .inspect_err(|e| tracing::error!("Server startup failed: {:#}", e))?;

    let cpu_count = config.server.cpu_count.clamp(1, 32);
    info!("Using {} worker threads", cpu_count);

    if config.server.trusted_proxies.is_empty() {
        warn!(
            "Client IP auto-detect enabled: connections from private IPs use X-Forwarded-For. \
             Configure server.trusted_proxies to restrict this."
        );
    }

    let slow_threshold = Duration::from_millis(config.server.slow_request_ms);
    let routes = api::configure(startup.state.clone());

    let bind_address = format!("{}:{}", config.server.host, config.server.port);
    let server = HttpServer::new(move || {
        App::new()
            .wrap(TimingMiddleware::new(slow_threshold))
            .wrap(RequestIdMiddleware)
            .wrap(DefaultHeaders::new().add(("X-Content-Type-Options", "nosniff")))
            .configure(routes.clone())
    })
    .keep_alive(Duration::from_secs(30))
    .client_request_timeout(Duration::from_millis(5000))
    .client_disconnect_timeout(Duration::from_millis(1000))
    .workers(cpu_count)
    .disable_signals()
    .bind(&bind_address)
    .with_context(|| format!("Failed to bind {}", bind_address))?
    .run();

    warn!("Starting server at http://{}", bind_address);
    let handle = server.handle();

    tokio::select! {
        res = server => {
            res.context("HTTP server terminated with an error")?;
        }
        _ = lifetime::shutdown::listen_for_shutdown() => {
            handle.stop(true).await;
        }
    }

    lifetime::shutdown::perform_shutdown_tasks(&mut startup).await;
    warn!("Graceful shutdown completed");
    Ok(())
}
