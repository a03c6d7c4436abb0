/// `load_config` module: loads the static YAML config and injects secrets from the environment.
///
/// This module is the only place where the untrusted YAML is parsed and mapped to
/// the strongly-typed core configuration.
///
/// # Responsibilities
/// - Parse the YAML file into [`CliConfig`], filling defaults for optional keys
/// - Resolve secrets (API keys, the documentation project id) from the environment
///   into [`Secrets`], failing with a message that names the missing variable
/// - Build the core [`GenerateConfig`] from both
///
/// # Errors
/// All errors use `anyhow::Error` and are surfaced at the CLI boundary.
///
use anyhow::{bail, Context, Result};
use apidoc_sync_core::config::{ExclusionRules, GenerateConfig, SourceConfig};
use apidoc_sync_core::read_files::absolute_path;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{error, info};

pub const OPENAI_API_KEY_VAR: &str = "OPENAI_API_KEY";
pub const THENEO_API_KEY_VAR: &str = "THENEO_API_KEY";
pub const THENEO_PROJECT_ID_VAR: &str = "THENEO_PROJECT_ID";

#[derive(Debug, Deserialize)]
pub struct CliConfig {
    pub source: SourceConfig,
    #[serde(default)]
    pub exclude: ExclusionRules,
    #[serde(default = "default_spec_path")]
    pub spec_path: PathBuf,
    #[serde(default)]
    pub llm: LlmSection,
    #[serde(default)]
    pub docs: DocsSection,
}

#[derive(Debug, Deserialize)]
pub struct LlmSection {
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(default = "default_llm_base_url")]
    pub base_url: String,
}

impl Default for LlmSection {
    fn default() -> Self {
        Self {
            model: default_model(),
            base_url: default_llm_base_url(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct DocsSection {
    #[serde(default)]
    pub project_id: Option<String>,
    #[serde(default = "default_docs_base_url")]
    pub base_url: String,
}

impl Default for DocsSection {
    fn default() -> Self {
        Self {
            project_id: None,
            base_url: default_docs_base_url(),
        }
    }
}

fn default_spec_path() -> PathBuf {
    PathBuf::from("openapi.json")
}

fn default_model() -> String {
    crate::openai::DEFAULT_MODEL.to_string()
}

fn default_llm_base_url() -> String {
    crate::openai::DEFAULT_BASE_URL.to_string()
}

fn default_docs_base_url() -> String {
    crate::theneo::DEFAULT_BASE_URL.to_string()
}

/// Values that must never live in the YAML file.
pub struct Secrets {
    pub openai_api_key: String,
    pub theneo_api_key: String,
    pub project_id: String,
}

impl std::fmt::Debug for Secrets {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Secrets")
            .field("openai_api_key", &"[REDACTED]")
            .field("theneo_api_key", &"[REDACTED]")
            .field("project_id", &self.project_id)
            .finish()
    }
}

/// Loads the static YAML config file (no secrets).
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<CliConfig> {
    let path_ref = path.as_ref();
    info!(config_path = ?path_ref, "Loading configuration from file");

    let config_content = match fs::read_to_string(path_ref) {
        Ok(content) => {
            info!(config_path = ?path_ref, "Config file read successfully");
            content
        }
        Err(e) => {
            error!(error = ?e, config_path = ?path_ref, "Failed to read config file");
            return Err(anyhow::anyhow!(
                "Failed to read config file {:?}: {}",
                path_ref,
                e
            ));
        }
    };

    let config: CliConfig = match serde_yaml::from_str(&config_content) {
        Ok(conf) => {
            info!(config_path = ?path_ref, "Parsed config YAML successfully");
            conf
        }
        Err(e) => {
            error!(error = ?e, config_path = ?path_ref, "Failed to parse config YAML");
            return Err(anyhow::anyhow!("Failed to parse config YAML: {e}"));
        }
    };

    Ok(config)
}

fn required_env(name: &str) -> Result<String> {
    match std::env::var(name) {
        Ok(value) if !value.trim().is_empty() => {
            info!(var = name, "Found required environment variable");
            Ok(value)
        }
        Ok(_) => {
            error!(var = name, "Environment variable is empty");
            bail!("{name} environment variable is empty")
        }
        Err(e) => {
            error!(error = ?e, var = name, "Environment variable not set");
            Err(e).with_context(|| format!("{name} environment variable not set"))
        }
    }
}

/// Resolves API keys and the project id from the environment.
///
/// The project id in the YAML file wins over `THENEO_PROJECT_ID`.
pub fn load_secrets(config: &CliConfig) -> Result<Secrets> {
    let openai_api_key = required_env(OPENAI_API_KEY_VAR)?;
    let theneo_api_key = required_env(THENEO_API_KEY_VAR)?;
    let project_id = match config.docs.project_id.as_deref().map(str::trim) {
        Some(id) if !id.is_empty() => id.to_string(),
        _ => required_env(THENEO_PROJECT_ID_VAR)
            .context("docs.project_id is not set in the config file")?,
    };
    info!(project_id = %project_id, "Secrets resolved from environment");
    Ok(Secrets {
        openai_api_key,
        theneo_api_key,
        project_id,
    })
}

impl CliConfig {
    /// The source directory resolved against the working directory.
    pub fn source_dir(&self) -> PathBuf {
        absolute_path(&self.source.dir)
    }

    pub fn generate_config(&self, project_id: String) -> GenerateConfig {
        let mut source = self.source.clone();
        source.dir = self.source_dir();
        let config = GenerateConfig {
            source,
            exclude: self.exclude.clone(),
            spec_path: absolute_path(&self.spec_path),
            project_id,
        };
        config.trace_loaded();
        config
    }
}
