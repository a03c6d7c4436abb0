//! Pushes a generated specification to the documentation host.
//!
//! Every run creates a fresh version whose name is the previous (newest)
//! version's name plus one, makes it the default, publishes it and imports
//! the document into it.

use serde_json::Value;
use tracing::{error, info};

use crate::contract::{BoxError, DocsPublisher, ImportDocument, NewProjectVersion, ProjectVersion};

#[derive(Debug, thiserror::Error)]
pub enum PublishError {
    #[error("failed to list versions of project {project_id}: {source}")]
    ListVersions { project_id: String, source: BoxError },
    #[error("latest version name {0:?} is not an integer")]
    VersionName(String),
    #[error("failed to create version {name}: {source}")]
    CreateVersion { name: String, source: BoxError },
    #[error("failed to publish version {version_id}: {source}")]
    Publish { version_id: String, source: BoxError },
    #[error("failed to import document into version {version_id}: {source}")]
    Import { version_id: String, source: BoxError },
    #[error("failed to serialize document: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// The version a document ended up in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishedVersion {
    pub id: String,
    pub name: String,
    pub url: Option<String>,
}

/// Pick the most recently created version.
pub fn latest_version(versions: &[ProjectVersion]) -> Option<&ProjectVersion> {
    versions.iter().max_by_key(|v| v.created_at)
}

/// Name for the version following `previous`; `"1"` when there is none.
pub fn next_version_name(previous: Option<&ProjectVersion>) -> Result<String, PublishError> {
    match previous {
        None => Ok("1".to_string()),
        Some(v) => v
            .name
            .trim()
            .parse::<i64>()
            .ok()
            .and_then(|n| n.checked_add(1))
            .map(|n| n.to_string())
            .ok_or_else(|| PublishError::VersionName(v.name.clone())),
    }
}

pub async fn publish_documentation<P>(
    publisher: &P,
    project_id: &str,
    document: &Value,
) -> Result<PublishedVersion, PublishError>
where
    P: DocsPublisher + ?Sized,
{
    let versions = publisher
        .list_project_versions(project_id)
        .await
        .map_err(|source| {
            error!(project_id, error = %source, "[PUBLISH][ERROR] Listing versions failed");
            PublishError::ListVersions {
                project_id: project_id.to_string(),
                source,
            }
        })?;

    let previous = latest_version(&versions);
    let name = next_version_name(previous).map_err(|e| {
        error!(error = %e, "[PUBLISH][ERROR] Cannot derive next version name");
        e
    })?;
    info!(
        project_id,
        previous = previous.map(|v| v.name.as_str()).unwrap_or("<none>"),
        next = %name,
        "[PUBLISH] Creating project version"
    );

    let created = publisher
        .create_project_version(NewProjectVersion {
            name: name.clone(),
            project_id: project_id.to_string(),
            previous_version_id: previous.map(|v| v.id.clone()),
            is_default: true,
            is_new_version: true,
        })
        .await
        .map_err(|source| {
            error!(project_id, name = %name, error = %source, "[PUBLISH][ERROR] Creating version failed");
            PublishError::CreateVersion {
                name: name.clone(),
                source,
            }
        })?;

    publisher
        .publish_project(project_id, &created.id)
        .await
        .map_err(|source| {
            error!(project_id, version_id = %created.id, error = %source, "[PUBLISH][ERROR] Publishing version failed");
            PublishError::Publish {
                version_id: created.id.clone(),
                source,
            }
        })?;
    info!(project_id, version_id = %created.id, "[PUBLISH] Published version");

    let text = serde_json::to_string(document)?;
    let imported = publisher
        .import_project_document(ImportDocument {
            project_id: project_id.to_string(),
            version_id: created.id.clone(),
            publish: true,
            text,
        })
        .await
        .map_err(|source| {
            error!(project_id, version_id = %created.id, error = %source, "[PUBLISH][ERROR] Import failed");
            PublishError::Import {
                version_id: created.id.clone(),
                source,
            }
        })?;
    info!(
        project_id,
        version_id = %imported.version_id,
        published = imported.published,
        url = imported.url.as_deref().unwrap_or(""),
        "[PUBLISH] Imported API documentation"
    );

    Ok(PublishedVersion {
        id: created.id,
        name: created.name,
        url: imported.url,
    })
}
