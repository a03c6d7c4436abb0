#![allow(unused)]

//! # contract: interfaces to the services the pipeline talks to
//!
//! The generator needs two outside services: a text-completion model and a
//! documentation host. Each is a trait here so the CLI crate can plug in real
//! HTTP clients and tests can plug in `mockall` mocks.
//!
//! ## Mocking & Testing
//! - Both traits are annotated for `mockall`; with the default
//!   `test-export-mocks` feature, `MockCompletionProvider` and
//!   `MockDocsPublisher` are exported for downstream integration tests.
//!
//! ## Errors
//! - All methods return boxed errors; implementors convert transport and API
//!   failures into a `BoxError` with a readable message.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use mockall::{automock, predicate::*};

pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Trait for asking a language model to complete a single text prompt.
#[cfg_attr(any(test, feature = "test-export-mocks"), automock)]
#[async_trait]
pub trait CompletionProvider: Send + Sync {
    /// Send `prompt` and return the model's free-form reply.
    async fn complete(&self, prompt: &str) -> Result<String, BoxError>;
}

/// A version of a documentation project as reported by the host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectVersion {
    pub id: String,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

/// Request to create a project version.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewProjectVersion {
    pub name: String,
    pub project_id: String,
    pub previous_version_id: Option<String>,
    pub is_default: bool,
    pub is_new_version: bool,
}

/// Request to import a document into a project version.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportDocument {
    pub project_id: String,
    pub version_id: String,
    pub publish: bool,
    /// The document serialized as JSON text.
    pub text: String,
}

/// What the host reported after an import.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportResponse {
    pub project_id: String,
    pub version_id: String,
    pub published: bool,
    /// Publicly reachable documentation URL, when the host returned one.
    pub url: Option<String>,
}

/// Trait for managing versions and content of a hosted documentation project.
#[cfg_attr(any(test, feature = "test-export-mocks"), automock)]
#[async_trait]
pub trait DocsPublisher: Send + Sync {
    /// List every version of the project.
    async fn list_project_versions(&self, project_id: &str) -> Result<Vec<ProjectVersion>, BoxError>;

    /// Create a new version of a project.
    async fn create_project_version(&self, req: NewProjectVersion) -> Result<ProjectVersion, BoxError>;

    /// Publish the project at the given version.
    async fn publish_project(&self, project_id: &str, version_id: &str) -> Result<(), BoxError>;

    /// Import a document into a version, optionally publishing it.
    async fn import_project_document(&self, req: ImportDocument) -> Result<ImportResponse, BoxError>;
}
