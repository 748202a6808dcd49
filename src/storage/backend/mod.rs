//! SeaORM origin store
//!
//! Durable `OriginStore` over SQLite, MySQL/MariaDB or PostgreSQL.

mod connection;
mod operations;
pub mod retry;

use sea_orm::DatabaseConnection;
use tracing::info;

use crate::config::DatabaseConfig;
use crate::errors::{Result, SnaplinkError};

pub use connection::{connect_generic, connect_sqlite, run_migrations};
pub use retry::RetryPolicy;

/// 从数据库 URL 推断数据库类型
pub fn infer_backend_from_url(database_url: &str) -> Result<&'static str> {
    if database_url.starts_with("sqlite:")
        || database_url.ends_with(".db")
        || database_url.ends_with(".sqlite")
    {
        Ok("sqlite")
    } else if database_url.starts_with("mysql://") || database_url.starts_with("mariadb://") {
        Ok("mysql")
    } else if database_url.starts_with("postgres://") || database_url.starts_with("postgresql://") {
        Ok("postgres")
    } else {
        Err(SnaplinkError::database_config(format!(
            "Cannot infer database type from URL: {}. Supported: memory, sqlite://, mysql://, mariadb://, postgres://",
            database_url
        )))
    }
}

#[derive(Clone)]
pub struct SeaOrmStore {
    db: DatabaseConnection,
    backend_name: &'static str,
    retry: RetryPolicy,
}

impl SeaOrmStore {
    pub async fn new(
        database_url: &str,
        backend_name: &'static str,
        config: &DatabaseConfig,
    ) -> Result<Self> {
        let db = if backend_name == "sqlite" {
            let url = if database_url.starts_with("sqlite:") {
                database_url.to_string()
            } else {
                format!("sqlite://{}", database_url)
            };
            connect_sqlite(&url, config).await?
        } else {
            // sqlx 只认识 mysql:// 前缀
            let url = database_url.replacen("mariadb://", "mysql://", 1);
            connect_generic(&url, backend_name, config).await?
        };

        run_migrations(&db).await?;

        info!("{} origin store initialized", backend_name.to_uppercase());
        Ok(Self {
            db,
            backend_name,
            retry: RetryPolicy::from(config),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_infer_backend() {
        assert_eq!(infer_backend_from_url("sqlite://links.db").unwrap(), "sqlite");
        assert_eq!(infer_backend_from_url("data/links.db").unwrap(), "sqlite");
        assert_eq!(infer_backend_from_url("mariadb://u@h/db").unwrap(), "mysql");
        assert_eq!(
            infer_backend_from_url("postgresql://u@h/db").unwrap(),
            "postgres"
        );
        assert!(infer_backend_from_url("ftp://nope").is_err());
    }
}
