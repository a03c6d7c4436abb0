use std::env;
use std::fs::write;
use std::path::PathBuf;

use apidoc_sync::load_config::{load_config, load_secrets};
use serial_test::serial;
use tempfile::NamedTempFile;

fn config_file(yaml: &str) -> NamedTempFile {
    let file = NamedTempFile::new().expect("temp file");
    write(file.path(), yaml).unwrap();
    file
}

/// A full static config plus the required env vars produces usable settings.
#[test]
#[serial]
fn test_load_config_reads_yaml_and_env() {
    let file = config_file(
        r#"
source:
  dir: ./src
  recursive: false
  include_extensions: [ts]
  max_concurrent_reads: 8
exclude:
  dirs: [node_modules, build]
spec_path: docs/openapi.json
llm:
  model: gpt-4o-mini
docs:
  project_id: "68171af0602f132582c80d40"
"#,
    );
    env::set_var("OPENAI_API_KEY", "sk-test");
    env::set_var("THENEO_API_KEY", "theneo-test");
    env::remove_var("THENEO_PROJECT_ID");

    let config = load_config(file.path()).expect("Config should load");
    let secrets = load_secrets(&config).expect("Secrets should resolve");

    assert_eq!(config.source.dir, PathBuf::from("./src"));
    assert!(!config.source.recursive);
    assert_eq!(config.source.include_extensions, Some(vec!["ts".to_string()]));
    assert_eq!(config.source.max_concurrent_reads, Some(8));
    assert!(config.exclude.is_excluded_dir("build"));
    assert!(!config.exclude.is_excluded_dir("dist"));
    assert!(config.exclude.is_excluded_file("package.json"), "file defaults kept");
    assert_eq!(config.llm.model, "gpt-4o-mini");
    assert_eq!(config.llm.base_url, "https://api.openai.com/v1");
    assert_eq!(config.docs.base_url, "https://api.theneo.io");

    assert_eq!(secrets.openai_api_key, "sk-test");
    assert_eq!(secrets.theneo_api_key, "theneo-test");
    assert_eq!(secrets.project_id, "68171af0602f132582c80d40");

    let generate = config.generate_config(secrets.project_id);
    assert!(generate.source.dir.is_absolute());
    assert!(generate.spec_path.ends_with("docs/openapi.json"));
}

#[test]
#[serial]
fn test_defaults_apply_for_minimal_config() {
    let file = config_file("source:\n  dir: src\n");

    let config = load_config(file.path()).expect("Config should load");

    assert!(config.source.recursive);
    assert_eq!(config.source.include_extensions, None);
    assert_eq!(config.source.max_concurrent_reads, Some(64));
    assert_eq!(config.spec_path, PathBuf::from("openapi.json"));
    assert_eq!(config.llm.model, "gpt-4o");
    assert!(config.exclude.is_excluded_dir("node_modules"));
    assert!(config.exclude.is_excluded_file(".gitignore"));
}

#[test]
#[serial]
fn test_project_id_falls_back_to_env() {
    let file = config_file("source:\n  dir: src\n");
    env::set_var("OPENAI_API_KEY", "sk-test");
    env::set_var("THENEO_API_KEY", "theneo-test");
    env::set_var("THENEO_PROJECT_ID", "from-env");

    let config = load_config(file.path()).unwrap();
    let secrets = load_secrets(&config).unwrap();

    assert_eq!(secrets.project_id, "from-env");
    env::remove_var("THENEO_PROJECT_ID");
}

/// Missing secrets make resolution fail with the variable's name.
#[test]
#[serial]
fn test_load_secrets_errors_on_missing_env() {
    let file = config_file("source:\n  dir: src\ndocs:\n  project_id: abc\n");
    env::remove_var("OPENAI_API_KEY");
    env::set_var("THENEO_API_KEY", "theneo-test");

    let config = load_config(file.path()).unwrap();
    let err = load_secrets(&config).unwrap_err();
    assert!(format!("{err:#}").contains("OPENAI_API_KEY"), "got: {err:#}");

    env::set_var("OPENAI_API_KEY", "sk-test");
    env::remove_var("THENEO_API_KEY");
    let err = load_secrets(&config).unwrap_err();
    assert!(format!("{err:#}").contains("THENEO_API_KEY"), "got: {err:#}");
}

#[test]
#[serial]
fn test_missing_project_id_is_reported() {
    let file = config_file("source:\n  dir: src\n");
    env::set_var("OPENAI_API_KEY", "sk-test");
    env::set_var("THENEO_API_KEY", "theneo-test");
    env::remove_var("THENEO_PROJECT_ID");

    let config = load_config(file.path()).unwrap();
    let err = load_secrets(&config).unwrap_err();
    let msg = format!("{err:#}");
    assert!(msg.contains("project_id") && msg.contains("THENEO_PROJECT_ID"), "got: {msg}");
}

/// A file that is not valid YAML is reported as a parse failure.
#[test]
#[serial]
fn test_load_config_errors_for_invalid_file() {
    let file = config_file("not-yaml: [:::");

    let err = load_config(file.path()).unwrap_err();
    let msg = err.to_string();
    assert!(msg.contains("parse") || msg.contains("YAML"), "Parse error expected, got: {msg}");
}

#[test]
#[serial]
fn test_load_config_errors_for_missing_file() {
    let err = load_config("/definitely/not/here.yaml").unwrap_err();
    assert!(err.to_string().contains("Failed to read config file"));
}
