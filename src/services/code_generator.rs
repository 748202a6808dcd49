use tracing::debug;

use crate::config::CodegenConfig;
use crate::errors::{Result, SnaplinkError};
use crate::storage::OriginStore;
use crate::utils::generate_random_code;

/// Draws random short codes and skips ones already taken.
#[derive(Debug, Clone)]
pub struct CodeGenerator {
    min_len: usize,
    max_len: usize,
    max_attempts: u32,
}

impl CodeGenerator {
    pub fn new(min_len: usize, max_len: usize, max_attempts: u32) -> Self {
        Self {
            min_len,
            max_len: max_len.max(min_len),
            max_attempts,
        }
    }

    pub fn from_config(config: &CodegenConfig) -> Self {
        Self::new(config.min_length, config.max_length, config.max_attempts)
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// One candidate; length uniform in `[min_len, max_len]`.
    pub fn candidate(&self) -> String {
        generate_random_code(rand::random_range(self.min_len..=self.max_len))
    }

    /// A code not present in `store`, within `max_attempts` draws.
    pub async fn generate(&self, store: &dyn OriginStore) -> Result<String> {
        let mut budget = self.max_attempts;
        self.next_free(store, &mut budget).await
    }

    /// Draw until a free code is found, spending from a shared `budget` so a
    /// caller that loses an insert race keeps counting against the same bound.
    pub async fn next_free(&self, store: &dyn OriginStore, budget: &mut u32) -> Result<String> {
        while *budget > 0 {
            *budget -= 1;
            let code = self.candidate();
            if !store.exists(&code).await? {
                return Ok(code);
            }
            debug!("Generated code {} already taken, {} attempts left", code, budget);
        }
        Err(SnaplinkError::generation_exhausted(format!(
            "No free short code after {} attempts",
            self.max_attempts
        )))
    }
}
