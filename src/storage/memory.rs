use async_trait::async_trait;
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;

use super::{OriginStore, UrlRecord};
use crate::errors::{Result, SnaplinkError};

/// Process-local origin store. Records live as long as the process.
#[derive(Default)]
pub struct MemoryStore {
    records: DashMap<String, UrlRecord>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl OriginStore for MemoryStore {
    async fn get(&self, code: &str) -> Result<Option<UrlRecord>> {
        Ok(self.records.get(code).map(|r| r.value().clone()))
    }

    async fn exists(&self, code: &str) -> Result<bool> {
        Ok(self.records.contains_key(code))
    }

    async fn insert(&self, record: &UrlRecord) -> Result<()> {
        match self.records.entry(record.short_code.clone()) {
            Entry::Occupied(_) => Err(SnaplinkError::conflict(format!(
                "Short code '{}' already exists",
                record.short_code
            ))),
            Entry::Vacant(slot) => {
                slot.insert(record.clone());
                Ok(())
            }
        }
    }

    async fn count(&self) -> Result<u64> {
        Ok(self.records.len() as u64)
    }

    async fn load_recent(&self, limit: usize) -> Result<Vec<UrlRecord>> {
        let mut records: Vec<UrlRecord> = self.records.iter().map(|r| r.value().clone()).collect();
        records.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        records.truncate(limit);
        Ok(records)
    }

    fn backend_name(&self) -> &'static str {
        "memory"
    }
}
