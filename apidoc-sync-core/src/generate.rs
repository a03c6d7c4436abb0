//! High-level pipeline: collect the codebase → prompt the model → persist → publish.
//!
//! [`DocsGenerator`] owns its configuration and the two service clients it
//! was built with, so the same value can serve any number of tool calls.
//!
//! # Error Handling
//! Each failed step returns immediately. The one exception to "nothing
//! happened" is a publish failure: by then the specification has already been
//! written locally, and that write stays.

use std::path::PathBuf;

use serde_json::Value;
use tracing::{error, info};

use crate::config::GenerateConfig;
use crate::contract::{BoxError, CompletionProvider, DocsPublisher};
use crate::extract::extract_json_block;
use crate::prompt::{build_prompt, NO_CURRENT_DOCS};
use crate::publish::{publish_documentation, PublishError, PublishedVersion};
use crate::read_files::{extension_filter, FileCollector};
use crate::spec_store::SpecStore;

#[derive(Debug, thiserror::Error)]
pub enum GenerateError {
    #[error("failed to read stored specification {path}: {source}")]
    LoadSpec { path: PathBuf, source: std::io::Error },
    #[error("failed to collect files in {path}: {source}")]
    Collect { path: PathBuf, source: std::io::Error },
    #[error("failed to serialize codebase: {0}")]
    Serialize(#[from] serde_json::Error),
    #[error("completion request failed: {0}")]
    Completion(BoxError),
    #[error("No JSON found in the response")]
    NoJsonFound,
    #[error("model returned invalid JSON: {0}")]
    InvalidJson(serde_json::Error),
    #[error("failed to write specification {path}: {source}")]
    SaveSpec { path: PathBuf, source: std::io::Error },
    #[error("specification saved to {spec_path} but publishing failed: {source}")]
    Publish { spec_path: PathBuf, source: PublishError },
}

/// Outcome of a successful generation run.
#[derive(Debug, Clone)]
pub struct GenerateReport {
    pub spec: Value,
    pub spec_path: PathBuf,
    pub files_read: usize,
    pub version: PublishedVersion,
}

pub struct DocsGenerator<L, P> {
    config: GenerateConfig,
    collector: FileCollector,
    store: SpecStore,
    llm: L,
    publisher: P,
}

impl<L, P> DocsGenerator<L, P>
where
    L: CompletionProvider,
    P: DocsPublisher,
{
    pub fn new(config: GenerateConfig, llm: L, publisher: P) -> Self {
        let collector = FileCollector::new(config.exclude.clone())
            .with_max_concurrent_reads(config.source.max_concurrent_reads);
        let store = SpecStore::new(config.spec_path.clone());
        Self {
            config,
            collector,
            store,
            llm,
            publisher,
        }
    }

    pub fn config(&self) -> &GenerateConfig {
        &self.config
    }

    pub async fn run(&self) -> Result<GenerateReport, GenerateError> {
        info!(source_dir = %self.config.source.dir.display(), "[GENERATE] Starting documentation run");

        let current = self
            .store
            .load_current()
            .await
            .map_err(|source| GenerateError::LoadSpec {
                path: self.store.path().to_path_buf(),
                source,
            })?;
        let current = current.unwrap_or_else(|| NO_CURRENT_DOCS.to_string());

        let filter = self.config.source.include_extensions.as_deref().map(extension_filter);
        let records = self
            .collector
            .read_all_file_contents(&self.config.source.dir, self.config.source.recursive, filter.as_deref())
            .await
            .map_err(|source| {
                error!(error = %source, "[GENERATE][ERROR] Collecting files failed");
                GenerateError::Collect {
                    path: self.config.source.dir.clone(),
                    source,
                }
            })?;
        let files_read = records.len();

        let codebase = serde_json::to_string(&records)?;
        let prompt = build_prompt(&current, &codebase);
        info!(files = files_read, prompt_bytes = prompt.len(), "[GENERATE] Requesting completion");

        let reply = self.llm.complete(&prompt).await.map_err(|e| {
            error!(error = %e, "[GENERATE][ERROR] Completion failed");
            GenerateError::Completion(e)
        })?;

        let block = extract_json_block(&reply).ok_or_else(|| {
            error!(reply_bytes = reply.len(), "[GENERATE][ERROR] No fenced JSON block in reply");
            GenerateError::NoJsonFound
        })?;
        let spec: Value = serde_json::from_str(&block).map_err(|e| {
            error!(error = %e, "[GENERATE][ERROR] Fenced block is not valid JSON");
            GenerateError::InvalidJson(e)
        })?;

        self.store
            .save(&spec)
            .await
            .map_err(|source| GenerateError::SaveSpec {
                path: self.store.path().to_path_buf(),
                source,
            })?;

        let version = publish_documentation(&self.publisher, &self.config.project_id, &spec)
            .await
            .map_err(|source| {
                error!(error = %source, spec_path = %self.store.path().display(), "[GENERATE][ERROR] Publishing failed, local specification kept");
                GenerateError::Publish {
                    spec_path: self.store.path().to_path_buf(),
                    source,
                }
            })?;

        info!(version = %version.name, files = files_read, "[GENERATE] Documentation run complete");
        Ok(GenerateReport {
            spec,
            spec_path: self.store.path().to_path_buf(),
            files_read,
            version,
        })
    }
}
