use std::fs::{create_dir_all, write};
use std::path::Path;

use apidoc_sync::mcp::{McpServer, DOCS_TOOL_NAME};
use apidoc_sync_core::config::{ExclusionRules, GenerateConfig, SourceConfig};
use apidoc_sync_core::contract::{
    ImportResponse, MockCompletionProvider, MockDocsPublisher, ProjectVersion,
};
use apidoc_sync_core::generate::DocsGenerator;
use chrono::Utc;
use serde_json::{json, Value};
use tempfile::tempdir;

fn generate_config(root: &Path) -> GenerateConfig {
    let src = root.join("src");
    create_dir_all(&src).unwrap();
    write(src.join("app.ts"), "app.get('/health')").unwrap();
    GenerateConfig {
        source: SourceConfig {
            dir: src,
            recursive: true,
            include_extensions: None,
            max_concurrent_reads: None,
        },
        exclude: ExclusionRules::default(),
        spec_path: root.join("openapi.json"),
        project_id: "proj".to_string(),
    }
}

fn working_publisher() -> MockDocsPublisher {
    let mut publisher = MockDocsPublisher::new();
    publisher.expect_list_project_versions().returning(|_| {
        Ok(vec![ProjectVersion {
            id: "v1".into(),
            name: "1".into(),
            created_at: Utc::now(),
        }])
    });
    publisher.expect_create_project_version().returning(|req| {
        Ok(ProjectVersion {
            id: "v2".into(),
            name: req.name,
            created_at: Utc::now(),
        })
    });
    publisher.expect_publish_project().returning(|_, _| Ok(()));
    publisher.expect_import_project_document().returning(|req| {
        Ok(ImportResponse {
            project_id: req.project_id,
            version_id: req.version_id,
            published: true,
            url: None,
        })
    });
    publisher
}

fn server_with(
    root: &Path,
    reply: &'static str,
    publisher: MockDocsPublisher,
) -> McpServer<MockCompletionProvider, MockDocsPublisher> {
    let mut llm = MockCompletionProvider::new();
    llm.expect_complete().returning(move |_| Ok(reply.to_string()));
    McpServer::new("0.0.0-test", DocsGenerator::new(generate_config(root), llm, publisher))
}

async fn call(server: &McpServer<MockCompletionProvider, MockDocsPublisher>, request: Value) -> Value {
    let response = server
        .handle_line(&request.to_string())
        .await
        .expect("request gets a response");
    serde_json::to_value(response).unwrap()
}

#[tokio::test]
async fn initialize_reports_tools_capability() {
    let tmp = tempdir().unwrap();
    let server = server_with(tmp.path(), "", MockDocsPublisher::new());

    let resp = call(
        &server,
        json!({"jsonrpc": "2.0", "id": 1, "method": "initialize", "params": {"protocolVersion": "2025-03-26"}}),
    )
    .await;

    assert_eq!(resp["id"], 1);
    assert_eq!(resp["result"]["protocolVersion"], "2025-03-26");
    assert!(resp["result"]["capabilities"]["tools"].is_object());
    assert_eq!(resp["result"]["serverInfo"]["name"], "apidoc-sync");
}

#[tokio::test]
async fn tools_list_registers_the_docs_tool() {
    let tmp = tempdir().unwrap();
    let server = server_with(tmp.path(), "", MockDocsPublisher::new());

    let resp = call(&server, json!({"jsonrpc": "2.0", "id": "a", "method": "tools/list"})).await;

    let tools = resp["result"]["tools"].as_array().expect("tools array");
    assert_eq!(tools.len(), 1);
    assert_eq!(tools[0]["name"], DOCS_TOOL_NAME);
    assert_eq!(tools[0]["description"], "Write or update docs for api");
    assert_eq!(tools[0]["inputSchema"]["properties"]["title"]["type"], "string");
}

#[tokio::test]
async fn tool_call_returns_generated_json_as_single_text_block() {
    let tmp = tempdir().unwrap();
    let server = server_with(
        tmp.path(),
        "```json\n{\"openapi\":\"3.0.0\",\"paths\":{\"/health\":{}}}\n```",
        working_publisher(),
    );

    let resp = call(
        &server,
        json!({"jsonrpc": "2.0", "id": 7, "method": "tools/call", "params": {"name": DOCS_TOOL_NAME, "arguments": {}}}),
    )
    .await;

    let content = resp["result"]["content"].as_array().expect("content");
    assert_eq!(content.len(), 1);
    assert_eq!(content[0]["type"], "text");
    let spec: Value = serde_json::from_str(content[0]["text"].as_str().unwrap()).unwrap();
    assert_eq!(spec, json!({"openapi": "3.0.0", "paths": {"/health": {}}}));
    assert!(resp["result"].get("isError").is_none());
    assert!(tmp.path().join("openapi.json").exists());
}

#[tokio::test]
async fn tool_call_failure_is_reported_as_tool_error() {
    let tmp = tempdir().unwrap();
    let server = server_with(tmp.path(), "no fenced block here", MockDocsPublisher::new());

    let resp = call(
        &server,
        json!({"jsonrpc": "2.0", "id": 8, "method": "tools/call", "params": {"name": DOCS_TOOL_NAME}}),
    )
    .await;

    assert_eq!(resp["result"]["isError"], true);
    assert_eq!(resp["result"]["content"][0]["text"], "No JSON found in the response");
}

#[tokio::test]
async fn unknown_tool_and_method_are_rejected() {
    let tmp = tempdir().unwrap();
    let server = server_with(tmp.path(), "", MockDocsPublisher::new());

    let resp = call(
        &server,
        json!({"jsonrpc": "2.0", "id": 2, "method": "tools/call", "params": {"name": "nope"}}),
    )
    .await;
    assert_eq!(resp["error"]["code"], -32602);

    let resp = call(&server, json!({"jsonrpc": "2.0", "id": 3, "method": "resources/list"})).await;
    assert_eq!(resp["error"]["code"], -32601);
}

#[tokio::test]
async fn notifications_and_garbage_lines() {
    let tmp = tempdir().unwrap();
    let server = server_with(tmp.path(), "", MockDocsPublisher::new());

    let none = server
        .handle_line(r#"{"jsonrpc":"2.0","method":"notifications/initialized"}"#)
        .await;
    assert!(none.is_none());
    assert!(server.handle_line("   \n").await.is_none());

    let resp = serde_json::to_value(server.handle_line("{not json").await.unwrap()).unwrap();
    assert_eq!(resp["error"]["code"], -32700);
}

#[tokio::test]
async fn null_id_is_an_invalid_request() {
    let tmp = tempdir().unwrap();
    let server = server_with(tmp.path(), "", MockDocsPublisher::new());

    let response = server
        .handle_line(r#"{"jsonrpc":"2.0","id":null,"method":"ping"}"#)
        .await
        .expect("null id still gets a reply");
    let resp = serde_json::to_value(response).unwrap();

    assert_eq!(resp["error"]["code"], -32600);
    assert!(resp["id"].is_null());
    assert!(resp.get("result").is_none());
}

#[tokio::test]
async fn serve_answers_each_request_line() {
    let tmp = tempdir().unwrap();
    let server = server_with(tmp.path(), "", MockDocsPublisher::new());
    let input = concat!(
        r#"{"jsonrpc":"2.0","id":1,"method":"initialize","params":{}}"#,
        "\n",
        r#"{"jsonrpc":"2.0","method":"notifications/initialized"}"#,
        "\n",
        r#"{"jsonrpc":"2.0","id":2,"method":"ping"}"#,
        "\n"
    );
    let mut output: Vec<u8> = Vec::new();

    server.serve(input.as_bytes(), &mut output).await.expect("serve");

    let lines: Vec<Value> = String::from_utf8(output)
        .unwrap()
        .lines()
        .map(|l| serde_json::from_str(l).unwrap())
        .collect();
    assert_eq!(lines.len(), 2);
    assert_eq!(lines[0]["result"]["protocolVersion"], "2024-11-05");
    assert_eq!(lines[1]["id"], 2);
}
