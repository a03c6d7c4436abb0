///
/// This module implements the CLI interface for apidoc-sync: command parsing,
/// wiring of the concrete clients, and user-visible output.
///
/// All pipeline logic lives in the [`apidoc-sync-core`] crate.
/// This module is strictly CLI glue.
///
/// ## How To Use
/// - For command-line users: use the installed `apidoc-sync` binary with `--help`.
/// - For programmatic/integration use: call [`run`] with a constructed [`Cli`].
///
/// [`apidoc-sync-core`]: ../../apidoc-sync-core/
use crate::load_config::{load_config, load_secrets, CliConfig};
use crate::mcp::McpServer;
use crate::openai::OpenAIClient;
use crate::theneo::TheneoClient;
use anyhow::Result;
use apidoc_sync_core::generate::DocsGenerator;
use apidoc_sync_core::read_files::FileCollector;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// CLI for apidoc-sync: generate OpenAPI docs for a codebase and publish them.
#[derive(Parser)]
#[clap(
    name = "apidoc-sync",
    version,
    about = "Generate OpenAPI docs for a codebase with an LLM and publish them to Theneo"
)]
pub struct Cli {
    #[clap(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Generate, save and publish the docs once
    Generate {
        /// Path to the YAML config file
        #[clap(long)]
        config: PathBuf,
    },
    /// Serve the docs tool over MCP on stdin/stdout
    Serve {
        /// Path to the YAML config file
        #[clap(long)]
        config: PathBuf,
    },
    /// Print the files that would be sent to the model
    Collect {
        /// Path to the YAML config file
        #[clap(long)]
        config: PathBuf,
    },
}

fn build_generator(config: &CliConfig) -> Result<DocsGenerator<OpenAIClient, TheneoClient>> {
    let secrets = load_secrets(config)?;
    let llm = OpenAIClient::new(secrets.openai_api_key, config.llm.model.clone(), config.llm.base_url.clone());
    let publisher = TheneoClient::new(secrets.theneo_api_key, config.docs.base_url.clone());
    tracing::info!(?llm, ?publisher, "Constructed service clients");
    Ok(DocsGenerator::new(config.generate_config(secrets.project_id), llm, publisher))
}

/// Extracted async CLI logic entrypoint for integration tests and main()
pub async fn run(cli: Cli) -> Result<()> {
    // Emit a top-level 'trace_initialised' event at the very start
    tracing::info!("trace_initialised");

    match cli.command {
        Commands::Generate { config } => {
            let config = load_config(config)?;
            let generator = build_generator(&config)?;
            tracing::info!(command = "generate", "Starting documentation run");
            match generator.run().await {
                Ok(report) => {
                    tracing::info!(command = "generate", version = %report.version.name, "Documentation run complete");
                    println!(
                        "Generated docs from {} files.\nSaved to {}.\nPublished version {}{}.",
                        report.files_read,
                        report.spec_path.display(),
                        report.version.name,
                        report.version.url.map(|u| format!(" at {u}")).unwrap_or_default()
                    );
                    Ok(())
                }
                Err(e) => {
                    tracing::error!(command = "generate", error = %e, "Documentation run failed");
                    Err(anyhow::Error::new(e))
                }
            }
        }
        Commands::Serve { config } => {
            let config = load_config(config)?;
            let generator = build_generator(&config)?;
            tracing::info!(command = "serve", "Serving MCP tool on stdio");
            let server = McpServer::new(env!("CARGO_PKG_VERSION"), generator);
            server.run().await?;
            Ok(())
        }
        Commands::Collect { config } => {
            let config = load_config(config)?;
            let collector = FileCollector::new(config.exclude.clone());
            let filter = config
                .source
                .include_extensions
                .as_deref()
                .map(apidoc_sync_core::read_files::extension_filter);
            let files = collector
                .read_all_files(config.source_dir(), config.source.recursive, filter.as_deref())
                .await?;
            tracing::info!(command = "collect", count = files.len(), "Collection complete");
            for file in &files {
                println!("{}", file.display());
            }
            Ok(())
        }
    }
}
