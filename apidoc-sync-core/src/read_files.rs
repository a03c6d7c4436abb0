//! Directory walking and content collection for the prompt.
//!
//! Listing and collection share one [`ExclusionRules`] value held by
//! [`FileCollector`]. Directory read errors abort the call that hit them;
//! file read errors during [`FileCollector::read_all_file_contents`] are logged
//! and turned into an empty record so the remaining files still get read.

use std::io;
use std::path::{Component, Path, PathBuf};

use futures::future::BoxFuture;
use futures::stream::{self, StreamExt};
use futures::FutureExt;
use serde::Serialize;
use tracing::{debug, error, info, warn};

use crate::config::ExclusionRules;

/// Inclusion predicate over absolute file paths.
pub type PathFilter = dyn Fn(&Path) -> bool + Send + Sync;

/// Immediate entries of one directory, as absolute paths.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DirectoryListing {
    pub files: Vec<PathBuf>,
    pub folders: Vec<PathBuf>,
}

/// A collected file and its text. `content` is empty when the read failed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileRecord {
    pub path: PathBuf,
    pub content: String,
}

/// Resolve `path` against the current working directory unless it is already absolute.
pub fn absolute_path(path: impl AsRef<Path>) -> PathBuf {
    let path = path.as_ref();
    if path.is_absolute() {
        return path.to_path_buf();
    }
    match std::env::current_dir() {
        Ok(cwd) => normalize(&cwd.join(path)),
        Err(e) => {
            warn!(error = %e, path = %path.display(), "Could not read working directory, using path as given");
            path.to_path_buf()
        }
    }
}

fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                out.pop();
            }
            other => out.push(other.as_os_str()),
        }
    }
    out
}

/// Walks directories and reads files, applying one set of exclusion rules.
#[derive(Debug, Clone)]
pub struct FileCollector {
    rules: ExclusionRules,
    max_concurrent_reads: Option<usize>,
}

impl Default for FileCollector {
    fn default() -> Self {
        Self::new(ExclusionRules::default())
    }
}

impl FileCollector {
    pub fn new(rules: ExclusionRules) -> Self {
        Self {
            rules,
            max_concurrent_reads: None,
        }
    }

    /// Bound the number of files read at once. `None` or 0 means unbounded.
    pub fn with_max_concurrent_reads(mut self, limit: Option<usize>) -> Self {
        self.max_concurrent_reads = limit.filter(|n| *n > 0);
        self
    }

    pub fn rules(&self) -> &ExclusionRules {
        &self.rules
    }

    /// List the files and folders directly inside `dir`, minus excluded names.
    pub async fn list_directory_contents(&self, dir: impl AsRef<Path>) -> io::Result<DirectoryListing> {
        let absolute = absolute_path(dir);
        let mut entries = tokio::fs::read_dir(&absolute).await.map_err(|e| {
            error!(path = %absolute.display(), error = %e, "Error reading directory");
            e
        })?;

        let mut listing = DirectoryListing::default();
        loop {
            let entry = match entries.next_entry().await {
                Ok(Some(entry)) => entry,
                Ok(None) => break,
                Err(e) => {
                    error!(path = %absolute.display(), error = %e, "Error reading directory");
                    return Err(e);
                }
            };
            let file_type = entry.file_type().await.map_err(|e| {
                error!(path = %absolute.display(), error = %e, "Error reading directory");
                e
            })?;
            let full_path = entry.path();
            let name = entry.file_name();
            let name = name.to_string_lossy();

            if file_type.is_dir() {
                if !self.rules.is_excluded_dir(&name) {
                    listing.folders.push(full_path);
                }
            } else if file_type.is_file() && !self.rules.is_excluded_file(&name) {
                listing.files.push(full_path);
            }
        }

        debug!(
            path = %absolute.display(),
            files = listing.files.len(),
            folders = listing.folders.len(),
            "Listed directory"
        );
        Ok(listing)
    }

    /// Collect the paths of all qualifying files under `dir`.
    ///
    /// With `recursive` unset, subdirectories are neither listed nor descended.
    /// A read failure in any directory fails the whole collection.
    pub async fn read_all_files(
        &self,
        dir: impl AsRef<Path>,
        recursive: bool,
        filter: Option<&PathFilter>,
    ) -> io::Result<Vec<PathBuf>> {
        let absolute = absolute_path(dir);
        let paths = self.collect_dir(&absolute, recursive, filter).await?;
        info!(path = %absolute.display(), recursive, count = paths.len(), "Collected files");
        Ok(paths)
    }

    /// Collect files as [`read_all_files`](Self::read_all_files) does and read each one.
    ///
    /// Records come back in collection order. An unreadable file yields an
    /// empty `content` instead of an error.
    pub async fn read_all_file_contents(
        &self,
        dir: impl AsRef<Path>,
        recursive: bool,
        filter: Option<&PathFilter>,
    ) -> io::Result<Vec<FileRecord>> {
        let paths = self.read_all_files(dir, recursive, filter).await?;
        let limit = self.max_concurrent_reads.unwrap_or(paths.len()).max(1);

        let records: Vec<FileRecord> = stream::iter(paths)
            .map(read_record)
            .buffered(limit)
            .collect()
            .await;

        info!(count = records.len(), limit, "Read file contents");
        Ok(records)
    }

    fn collect_dir<'a>(
        &'a self,
        dir: &'a Path,
        recursive: bool,
        filter: Option<&'a PathFilter>,
    ) -> BoxFuture<'a, io::Result<Vec<PathBuf>>> {
        async move {
            let mut entries = tokio::fs::read_dir(dir).await.map_err(|e| {
                error!(path = %dir.display(), error = %e, "Error reading directory");
                e
            })?;

            let mut paths = Vec::new();
            loop {
                let entry = match entries.next_entry().await {
                    Ok(Some(entry)) => entry,
                    Ok(None) => break,
                    Err(e) => {
                        error!(path = %dir.display(), error = %e, "Error reading directory");
                        return Err(e);
                    }
                };
                let file_type = entry.file_type().await.map_err(|e| {
                    error!(path = %dir.display(), error = %e, "Error reading directory");
                    e
                })?;
                let full_path = entry.path();
                let name = entry.file_name();
                let name = name.to_string_lossy();

                if file_type.is_dir() {
                    if self.rules.is_excluded_dir(&name) {
                        debug!(path = %full_path.display(), "Skipping excluded directory");
                        continue;
                    }
                    if recursive {
                        let nested = self.collect_dir(&full_path, recursive, filter).await?;
                        paths.extend(nested);
                    }
                } else if file_type.is_file() && self.accepts(&full_path, filter) {
                    paths.push(full_path);
                }
            }
            Ok(paths)
        }
        .boxed()
    }

    fn accepts(&self, path: &Path, filter: Option<&PathFilter>) -> bool {
        let under_excluded_dir = path.components().any(|c| match c {
            Component::Normal(segment) => self.rules.is_excluded_dir(&segment.to_string_lossy()),
            _ => false,
        });
        if under_excluded_dir {
            return false;
        }
        let excluded_name = path
            .file_name()
            .map(|n| self.rules.is_excluded_file(&n.to_string_lossy()))
            .unwrap_or(false);
        if excluded_name {
            return false;
        }
        filter.map(|f| f(path)).unwrap_or(true)
    }
}

async fn read_record(path: PathBuf) -> FileRecord {
    match tokio::fs::read(&path).await {
        Ok(bytes) => {
            let content = String::from_utf8_lossy(&bytes).into_owned();
            FileRecord { path, content }
        }
        Err(e) => {
            error!(path = %path.display(), error = %e, "Error reading file");
            FileRecord {
                path,
                content: String::new(),
            }
        }
    }
}

/// Build an inclusion predicate that keeps files with one of `extensions`.
pub fn extension_filter(extensions: &[String]) -> Box<PathFilter> {
    let wanted: Vec<String> = extensions
        .iter()
        .map(|e| e.trim_start_matches('.').to_ascii_lowercase())
        .collect();
    Box::new(move |path: &Path| {
        path.extension()
            .map(|ext| wanted.contains(&ext.to_string_lossy().to_ascii_lowercase()))
            .unwrap_or(false)
    })
}
