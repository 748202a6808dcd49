use std::time::Duration;

use tokio::signal;
use tokio::time::timeout;
use tracing::{error, info, warn};

use super::startup::StartupContext;

/// 单个关闭任务超时时间
const TASK_TIMEOUT: Duration = Duration::from_secs(10);

/// Resolve once Ctrl+C is received.
pub async fn listen_for_shutdown() {
    match signal::ctrl_c().await {
        Ok(()) => info!("Shutdown signal received"),
        Err(e) => warn!(
            "Failed to listen for Ctrl+C: {}. Proceeding with shutdown anyway.",
            e
        ),
    }
}

/// Stop background work and release the store.
pub async fn perform_shutdown_tasks(ctx: &mut StartupContext) {
    if let Some(janitor) = ctx.janitor.take() {
        janitor.abort();
    }

    match timeout(TASK_TIMEOUT, ctx.state.store.close()).await {
        Ok(Ok(())) => info!("Origin store closed"),
        Ok(Err(e)) => error!("Failed to close origin store: {}", e),
        Err(_) => error!(
            "Closing origin store timed out after {} seconds",
            TASK_TIMEOUT.as_secs()
        ),
    }
}
