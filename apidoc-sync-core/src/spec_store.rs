use std::io;
use std::path::{Path, PathBuf};

use serde_json::Value;
use tracing::{debug, error, info};

/// The locally persisted copy of the last generated specification.
#[derive(Debug, Clone)]
pub struct SpecStore {
    path: PathBuf,
}

impl SpecStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Raw text of the stored specification, or `None` if nothing was stored yet.
    pub async fn load_current(&self) -> io::Result<Option<String>> {
        match tokio::fs::read_to_string(&self.path).await {
            Ok(text) => {
                debug!(path = %self.path.display(), bytes = text.len(), "Loaded stored specification");
                Ok(Some(text))
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                info!(path = %self.path.display(), "No stored specification yet");
                Ok(None)
            }
            Err(e) => {
                error!(path = %self.path.display(), error = %e, "Failed to read stored specification");
                Err(e)
            }
        }
    }

    /// Overwrite the stored specification with `spec`, pretty-printed.
    pub async fn save(&self, spec: &Value) -> io::Result<()> {
        let text = serde_json::to_string_pretty(spec)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(&self.path, text).await.map_err(|e| {
            error!(path = %self.path.display(), error = %e, "Failed to write specification");
            e
        })?;
        info!(path = %self.path.display(), "Wrote specification");
        Ok(())
    }
}
