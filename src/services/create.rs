use std::sync::Arc;

use tracing::{debug, info};

use super::code_generator::CodeGenerator;
use crate::admission::{AdmissionController, Route};
use crate::cache::ResolutionCache;
use crate::errors::{Result, SnaplinkError};
use crate::storage::{OriginStore, UrlRecord};
use crate::utils::{is_valid_short_code, validate_original_url};

/// Request to register a new short code
#[derive(Debug, Clone)]
pub struct CreateUrlRequest {
    /// Explicit code; `None` or empty means generate one.
    pub short_code: Option<String>,
    pub original_url: String,
}

/// Result of a successful create
#[derive(Debug, Clone)]
pub struct UrlCreateResult {
    pub record: UrlRecord,
    /// Whether the code was generated rather than supplied
    pub generated_code: bool,
}

/// Validates, persists and pre-caches new mappings.
pub struct CreateHandler {
    admission: Arc<AdmissionController>,
    cache: Arc<ResolutionCache>,
    store: Arc<dyn OriginStore>,
    generator: CodeGenerator,
}

impl CreateHandler {
    pub fn new(
        admission: Arc<AdmissionController>,
        cache: Arc<ResolutionCache>,
        store: Arc<dyn OriginStore>,
        generator: CodeGenerator,
    ) -> Self {
        Self {
            admission,
            cache,
            store,
            generator,
        }
    }

    pub async fn create(&self, client: &str, req: CreateUrlRequest) -> Result<UrlCreateResult> {
        let short_code = req.short_code.filter(|c| !c.is_empty());
        self.admission
            .admit(Route::Create, client, short_code.as_deref())?;

        let original_url = validate_original_url(&req.original_url)?;

        let (record, generated_code) = match short_code {
            Some(code) => {
                if !is_valid_short_code(&code) {
                    return Err(SnaplinkError::validation(format!(
                        "Invalid short code '{}': expected 6-8 characters of [a-z0-9]",
                        code
                    )));
                }
                let record = UrlRecord::new(code, original_url);
                self.store.insert(&record).await?;
                (record, false)
            }
            None => (self.insert_generated(original_url).await?, true),
        };

        // 写入后立即填充缓存，避免首次读取冷启动
        self.cache
            .put(&record.short_code, &record.original_url)
            .await;

        info!(
            "Created short code '{}' -> '{}'{}",
            record.short_code,
            record.original_url,
            if generated_code { " (generated)" } else { "" }
        );

        Ok(UrlCreateResult {
            record,
            generated_code,
        })
    }

    async fn insert_generated(&self, original_url: String) -> Result<UrlRecord> {
        let mut budget = self.generator.max_attempts();
        loop {
            let code = self
                .generator
                .next_free(self.store.as_ref(), &mut budget)
                .await?;
            let record = UrlRecord::new(code, original_url.clone());
            match self.store.insert(&record).await {
                Ok(()) => return Ok(record),
                Err(SnaplinkError::Conflict(_)) => {
                    debug!("Lost insert race for generated code {}", record.short_code);
                }
                Err(e) => return Err(e),
            }
        }
    }
}
