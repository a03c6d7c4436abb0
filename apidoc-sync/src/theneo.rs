#![doc = "Theneo integration: implements the core DocsPublisher trait against the Theneo REST API."]
//
//! # Theneo client
//!
//! Bridges [`apidoc_sync_core::contract::DocsPublisher`] to the documentation
//! host. Construct it once with the API key resolved by
//! [`crate::load_config`] and hand it to the generator.
//!
//! Wire types are private to this module and mapped onto the core contract
//! types; responses that are not 2xx become errors carrying the status and body.

use apidoc_sync_core::contract::{
    BoxError, DocsPublisher, ImportDocument, ImportResponse, NewProjectVersion, ProjectVersion,
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::{Client, RequestBuilder, Response};
use serde::{Deserialize, Serialize};
use serde_json::Value;

pub const DEFAULT_BASE_URL: &str = "https://api.theneo.io";

const API_KEY_HEADER: &str = "x-api-key";

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ApiProjectVersion {
    #[serde(alias = "_id")]
    id: String,
    name: String,
    created_at: DateTime<Utc>,
}

impl From<ApiProjectVersion> for ProjectVersion {
    fn from(v: ApiProjectVersion) -> Self {
        ProjectVersion {
            id: v.id,
            name: v.name,
            created_at: v.created_at,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct CreateVersionBody<'a> {
    name: &'a str,
    project_id: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    previous_version_id: Option<&'a str>,
    is_default: bool,
    is_new_version: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct PublishBody<'a> {
    version_id: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ImportBody<'a> {
    version_id: &'a str,
    publish: bool,
    data: ImportData<'a>,
}

#[derive(Debug, Serialize)]
struct ImportData<'a> {
    text: &'a str,
}

pub struct TheneoClient {
    client: Client,
    api_key: String,
    base_url: String,
}

impl TheneoClient {
    pub fn new(api_key: impl Into<String>, base_url: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            api_key: api_key.into(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn send(&self, request: RequestBuilder, what: &str) -> Result<Response, BoxError> {
        let response = request
            .header(API_KEY_HEADER, &self.api_key)
            .send()
            .await
            .map_err(|e| {
                tracing::error!(error = ?e, operation = what, "Theneo request failed");
                e
            })?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        tracing::error!(status = status.as_u16(), operation = what, body = %body, "Theneo API returned an error");
        Err(format!("Theneo API error during {what} ({status}): {body}").into())
    }
}

impl std::fmt::Debug for TheneoClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TheneoClient")
            .field("base_url", &self.base_url)
            .field("api_key", &"[REDACTED]")
            .finish()
    }
}

#[async_trait]
impl DocsPublisher for TheneoClient {
    async fn list_project_versions(&self, project_id: &str) -> Result<Vec<ProjectVersion>, BoxError> {
        tracing::info!(project_id, "Listing project versions");
        let request = self.client.get(self.url(&format!("/projects/{project_id}/versions")));
        let versions: Vec<ApiProjectVersion> = self.send(request, "list versions").await?.json().await?;
        tracing::info!(project_id, count = versions.len(), "Fetched project versions");
        Ok(versions.into_iter().map(ProjectVersion::from).collect())
    }

    async fn create_project_version(&self, req: NewProjectVersion) -> Result<ProjectVersion, BoxError> {
        tracing::info!(project_id = %req.project_id, name = %req.name, "Creating project version");
        let body = CreateVersionBody {
            name: &req.name,
            project_id: &req.project_id,
            previous_version_id: req.previous_version_id.as_deref(),
            is_default: req.is_default,
            is_new_version: req.is_new_version,
        };
        let request = self.client.post(self.url("/project-versions")).json(&body);
        let created: ApiProjectVersion = self.send(request, "create version").await?.json().await?;
        tracing::info!(version_id = %created.id, name = %created.name, "Created project version");
        Ok(created.into())
    }

    async fn publish_project(&self, project_id: &str, version_id: &str) -> Result<(), BoxError> {
        tracing::info!(project_id, version_id, "Publishing project");
        let request = self
            .client
            .post(self.url(&format!("/projects/{project_id}/publish")))
            .json(&PublishBody { version_id });
        self.send(request, "publish").await?;
        Ok(())
    }

    async fn import_project_document(&self, req: ImportDocument) -> Result<ImportResponse, BoxError> {
        tracing::info!(
            project_id = %req.project_id,
            version_id = %req.version_id,
            publish = req.publish,
            bytes = req.text.len(),
            "Importing project document"
        );
        let body = ImportBody {
            version_id: &req.version_id,
            publish: req.publish,
            data: ImportData { text: &req.text },
        };
        let request = self
            .client
            .post(self.url(&format!("/projects/{}/import", req.project_id)))
            .json(&body);
        let response = self.send(request, "import").await?;
        // The body is informational; an empty or non-JSON body still means success.
        let detail: Value = response.json().await.unwrap_or(Value::Null);
        let url = detail
            .get("publishData")
            .and_then(|d| d.get("publishedPageUrl"))
            .and_then(Value::as_str)
            .map(str::to_string);
        tracing::debug!(detail = %detail, "Import response");
        Ok(ImportResponse {
            project_id: req.project_id,
            version_id: req.version_id,
            published: req.publish,
            url,
        })
    }
}
