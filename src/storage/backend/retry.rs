//! Retry wrapper for origin store calls
//!
//! Transient failures (pool exhaustion, dropped connections, lock contention)
//! are retried with capped exponential backoff plus jitter. Everything else,
//! including unique-key violations, is returned on the first failure.

use std::future::Future;
use std::time::Duration;

use sea_orm::DbErr;
use tracing::{debug, warn};

use crate::config::DatabaseConfig;

#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    pub max_retries: u32,
    pub base_delay_ms: u64,
    pub max_delay_ms: u64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            base_delay_ms: 100,
            max_delay_ms: 2000,
        }
    }
}

impl From<&DatabaseConfig> for RetryPolicy {
    fn from(config: &DatabaseConfig) -> Self {
        Self {
            max_retries: config.retry_count,
            base_delay_ms: config.retry_base_delay_ms,
            max_delay_ms: config.retry_max_delay_ms,
        }
    }
}

/// 判断数据库错误是否可重试
pub fn is_retryable(err: &DbErr) -> bool {
    if err.sql_err().is_some() {
        // 约束类错误重试没有意义
        return false;
    }
    match err {
        DbErr::ConnectionAcquire(_) | DbErr::Conn(_) => true,
        DbErr::Exec(runtime) | DbErr::Query(runtime) => {
            let text = runtime.to_string().to_lowercase();
            text.contains("deadlock")
                || text.contains("lock wait timeout")
                || text.contains("database is locked")
                || text.contains("serialization failure")
                || text.contains("connection reset")
        }
        _ => false,
    }
}

/// Capped exponential delay for the given attempt (1-based) with 0-25% jitter.
fn backoff_delay(attempt: u32, policy: RetryPolicy) -> u64 {
    let exp = policy
        .base_delay_ms
        .saturating_mul(2u64.saturating_pow(attempt.saturating_sub(1)));
    let capped = exp.min(policy.max_delay_ms);
    capped.saturating_add(rand::random_range(0..=capped / 4))
}

pub async fn with_retry<T, F, Fut>(op: &str, policy: RetryPolicy, mut call: F) -> Result<T, DbErr>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, DbErr>>,
{
    let mut attempt = 0;
    loop {
        match call().await {
            Ok(value) => {
                if attempt > 0 {
                    debug!("Store call '{}' succeeded after {} retries", op, attempt);
                }
                return Ok(value);
            }
            Err(e) if attempt < policy.max_retries && is_retryable(&e) => {
                attempt += 1;
                let delay = backoff_delay(attempt, policy);
                warn!(
                    "Store call '{}' failed (attempt {}/{}): {}; retrying in {} ms",
                    op,
                    attempt,
                    policy.max_retries + 1,
                    e,
                    delay
                );
                tokio::time::sleep(Duration::from_millis(delay)).await;
            }
            Err(e) => return Err(e),
        }
    }
}
