use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::path::PathBuf;
use tracing::{debug, info};

/// Directory names that are never listed or descended into.
pub const DEFAULT_EXCLUDED_DIRS: &[&str] = &["node_modules", ".git", "dist"];

/// File basenames that are never collected.
pub const DEFAULT_EXCLUDED_FILES: &[&str] = &[
    "package.json",
    "package-lock.json",
    "tsconfig.json",
    "api-docs.json",
    "webpack.config.js",
    ".gitignore",
];

pub const DEFAULT_MAX_CONCURRENT_READS: usize = 64;

/// The exclusion sets shared by directory listing and file collection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExclusionRules {
    #[serde(default = "default_dirs")]
    pub dirs: BTreeSet<String>,
    #[serde(default = "default_files")]
    pub files: BTreeSet<String>,
}

fn default_dirs() -> BTreeSet<String> {
    DEFAULT_EXCLUDED_DIRS.iter().map(|s| s.to_string()).collect()
}

fn default_files() -> BTreeSet<String> {
    DEFAULT_EXCLUDED_FILES.iter().map(|s| s.to_string()).collect()
}

impl Default for ExclusionRules {
    fn default() -> Self {
        Self {
            dirs: default_dirs(),
            files: default_files(),
        }
    }
}

impl ExclusionRules {
    pub fn is_excluded_dir(&self, name: &str) -> bool {
        self.dirs.contains(name)
    }

    pub fn is_excluded_file(&self, name: &str) -> bool {
        self.files.contains(name)
    }
}

/// Where the codebase is read from and how.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceConfig {
    pub dir: PathBuf,
    #[serde(default = "default_recursive")]
    pub recursive: bool,
    /// File extensions (without the dot) to keep. All files are kept when unset.
    #[serde(default)]
    pub include_extensions: Option<Vec<String>>,
    /// Upper bound on simultaneous file reads; `None` or 0 reads everything at once.
    #[serde(default = "default_max_concurrent_reads")]
    pub max_concurrent_reads: Option<usize>,
}

fn default_recursive() -> bool {
    true
}

fn default_max_concurrent_reads() -> Option<usize> {
    Some(DEFAULT_MAX_CONCURRENT_READS)
}

/// Everything the generator needs apart from its service clients.
#[derive(Debug, Clone)]
pub struct GenerateConfig {
    pub source: SourceConfig,
    pub exclude: ExclusionRules,
    pub spec_path: PathBuf,
    pub project_id: String,
}

impl GenerateConfig {
    pub fn trace_loaded(&self) {
        info!(
            source_dir = %self.source.dir.display(),
            recursive = self.source.recursive,
            spec_path = %self.spec_path.display(),
            project_id = %self.project_id,
            "Loaded GenerateConfig"
        );
        debug!(?self, "GenerateConfig loaded (full debug)");
    }
}
