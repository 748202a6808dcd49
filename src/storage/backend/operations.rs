use std::sync::atomic::{AtomicU32, Ordering};

use async_trait::async_trait;
use sea_orm::{
    ActiveValue::Set, EntityTrait, PaginatorTrait, QueryOrder, QuerySelect,
};
use tracing::{error, warn};

use super::{SeaOrmStore, retry};
use crate::errors::{Result, SnaplinkError};
use crate::storage::{OriginStore, UrlRecord};
use migration::entities::url_record;

fn model_to_record(model: url_record::Model) -> UrlRecord {
    UrlRecord {
        short_code: model.short_code,
        original_url: model.original_url,
        created_at: model.created_at,
    }
}

fn record_to_active_model(record: &UrlRecord) -> url_record::ActiveModel {
    url_record::ActiveModel {
        short_code: Set(record.short_code.clone()),
        original_url: Set(record.original_url.clone()),
        created_at: Set(record.created_at),
    }
}

/// A retried insert that hits the unique key may be colliding with its own
/// first attempt, which committed before the connection dropped.
fn committed_by_earlier_attempt(
    attempts: u32,
    existing: Option<&UrlRecord>,
    record: &UrlRecord,
) -> bool {
    attempts > 1 && existing.is_some_and(|found| found.original_url == record.original_url)
}

fn store_error(op: &str, err: sea_orm::DbErr) -> SnaplinkError {
    let mapped = SnaplinkError::from(err);
    if let SnaplinkError::OriginUnavailable(detail) = &mapped {
        error!("Origin store {} failed after retries: {}", op, detail);
    }
    mapped
}

#[async_trait]
impl OriginStore for SeaOrmStore {
    async fn get(&self, code: &str) -> Result<Option<UrlRecord>> {
        let db = &self.db;
        retry::with_retry("get", self.retry, || async {
            url_record::Entity::find_by_id(code).one(db).await
        })
        .await
        .map(|found| found.map(model_to_record))
        .map_err(|e| store_error("get", e))
    }

    async fn exists(&self, code: &str) -> Result<bool> {
        let db = &self.db;
        retry::with_retry("exists", self.retry, || async {
            url_record::Entity::find_by_id(code).count(db).await
        })
        .await
        .map(|n| n > 0)
        .map_err(|e| store_error("exists", e))
    }

    async fn insert(&self, record: &UrlRecord) -> Result<()> {
        let db = &self.db;
        let attempts = AtomicU32::new(0);
        let result = retry::with_retry("insert", self.retry, || {
            attempts.fetch_add(1, Ordering::Relaxed);
            let model = record_to_active_model(record);
            async move {
                url_record::Entity::insert(model)
                    .exec_without_returning(db)
                    .await
            }
        })
        .await;

        match result {
            Ok(_) => Ok(()),
            Err(e) => match store_error("insert", e) {
                SnaplinkError::Conflict(_) => {
                    let attempts = attempts.load(Ordering::Relaxed);
                    if attempts > 1 {
                        let existing = self.get(&record.short_code).await?;
                        if committed_by_earlier_attempt(attempts, existing.as_ref(), record) {
                            warn!(
                                "Insert of {} committed before its retry; treating as created",
                                record.short_code
                            );
                            return Ok(());
                        }
                    }
                    Err(SnaplinkError::conflict(format!(
                        "Short code '{}' already exists",
                        record.short_code
                    )))
                }
                other => Err(other),
            },
        }
    }

    async fn count(&self) -> Result<u64> {
        let db = &self.db;
        retry::with_retry("count", self.retry, || async {
            url_record::Entity::find().count(db).await
        })
        .await
        .map_err(|e| store_error("count", e))
    }

    async fn load_recent(&self, limit: usize) -> Result<Vec<UrlRecord>> {
        let db = &self.db;
        let models = retry::with_retry("load_recent", self.retry, || async {
            url_record::Entity::find()
                .order_by_desc(url_record::Column::CreatedAt)
                .limit(limit as u64)
                .all(db)
                .await
        })
        .await
        .map_err(|e| store_error("load_recent", e))?;

        Ok(models.into_iter().map(model_to_record).collect())
    }

    fn backend_name(&self) -> &'static str {
        self.backend_name
    }

    async fn close(&self) -> Result<()> {
        self.db
            .clone()
            .close()
            .await
            .map_err(|e| SnaplinkError::database_connection(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retried_insert_recognises_own_row() {
        let record = UrlRecord::new("google", "https://www.google.com");
        let same = UrlRecord::new("google", "https://www.google.com");
        let other = UrlRecord::new("google", "https://other.example");

        assert!(committed_by_earlier_attempt(2, Some(&same), &record));
        assert!(!committed_by_earlier_attempt(2, Some(&other), &record));
        assert!(!committed_by_earlier_attempt(2, None, &record));
    }

    #[test]
    fn test_first_attempt_conflict_is_real() {
        let record = UrlRecord::new("google", "https://www.google.com");
        assert!(!committed_by_earlier_attempt(1, Some(&record.clone()), &record));
    }
}
