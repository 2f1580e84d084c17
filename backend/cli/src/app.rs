//! Runtime wiring shared by the subcommands: loaded config, store, pipeline.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use chrono::{Local, NaiveDate};
use simpledo_config::{config_file_path, load_and_prepare, resolve_path, SimpleDoConfig};
use simpledo_todos::{JsonFileStorage, TodoStore};
use simpledo_understanding::{GeminiClient, ImageSearchPipeline, PipelineOptions, RetryPolicy};
use tracing::debug;

pub struct AppContext {
    pub config_dir: PathBuf,
    pub config: SimpleDoConfig,
}

impl AppContext {
    pub async fn load(config_dir: PathBuf) -> Result<Self> {
        let path = config_file_path(&config_dir);
        let config = load_and_prepare(&path)
            .await
            .with_context(|| format!("Failed to load config from {}", path.display()))?;
        Ok(Self { config_dir, config })
    }

    pub fn init_logging(&self) -> Result<()> {
        logging::init_logger(self.path(self.config.log_dir()), self.config.log_level())
    }

    fn path(&self, configured: &str) -> PathBuf {
        resolve_path(&self.config_dir, configured)
    }

    pub fn data_dir(&self) -> PathBuf {
        self.path(self.config.storage_dir())
    }

    pub fn open_store(&self) -> Result<TodoStore> {
        let dir = self.data_dir();
        debug!(dir = %dir.display(), key = %self.config.storage_key(), "Opening to-do store");
        TodoStore::open_with_key(JsonFileStorage::new(dir), self.config.storage_key())
            .context("Failed to open the to-do store")
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_attempts: self.config.retry_max_attempts(),
            base_delay_ms: self.config.retry_base_delay_ms(),
            backoff_factor: self.config.retry_backoff_factor(),
            max_delay_ms: self.config.retry_max_delay_ms(),
        }
    }

    pub fn gemini_client(&self) -> GeminiClient {
        GeminiClient::new(self.config.gemini_api_key().map(str::to_string))
            .with_base_url(self.config.gemini_base_url())
            .with_model(self.config.gemini_model())
            .with_timeout(Duration::from_secs(self.config.gemini_timeout_secs()))
    }

    pub fn pipeline(&self, search_after_ocr: bool, preview_dir: Option<&Path>) -> ImageSearchPipeline {
        ImageSearchPipeline::new(Arc::new(self.gemini_client())).with_options(PipelineOptions {
            retry: self.retry_policy(),
            preview_dir: preview_dir.map(Path::to_path_buf),
            search_after_ocr,
        })
    }

    pub fn max_due_days(&self) -> u32 {
        self.config.max_due_days()
    }
}

pub fn today() -> NaiveDate {
    Local::now().date_naive()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn relative_dirs_resolve_under_config_dir() {
        let dir = tempfile::tempdir().unwrap();
        let ctx = AppContext::load(dir.path().to_path_buf()).await.unwrap();
        assert_eq!(ctx.data_dir(), dir.path().join("data"));
        assert_eq!(ctx.retry_policy(), RetryPolicy::default());
        assert_eq!(ctx.max_due_days(), 30);
    }

    #[tokio::test]
    async fn retry_section_flows_into_policy() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("config.yaml"),
            "retry:\n  maxAttempts: 3\n  baseDelayMs: 500\n  maxDelayMs: 1500\n",
        )
        .unwrap();
        let ctx = AppContext::load(dir.path().to_path_buf()).await.unwrap();
        let policy = ctx.retry_policy();
        assert_eq!(policy.max_attempts, 3);
        assert_eq!(policy.max_delay_ms, 1_500);
        assert_eq!(policy.delay_for(3), std::time::Duration::from_millis(1_500));
    }

    #[tokio::test]
    async fn store_persists_under_data_dir() {
        let dir = tempfile::tempdir().unwrap();
        let ctx = AppContext::load(dir.path().to_path_buf()).await.unwrap();
        let store = ctx.open_store().unwrap();
        store
            .add(simpledo_core::Task::new(
                "Buy milk",
                simpledo_core::Priority::High,
                today(),
                chrono::NaiveTime::from_hms_opt(9, 0, 0).unwrap(),
            ))
            .unwrap();
        assert!(dir.path().join("data").join("simpleDo.todos.json").exists());
    }
}
