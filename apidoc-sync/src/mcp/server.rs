//! MCP JSON-RPC 2.0 server over newline-delimited stdio.

use apidoc_sync_core::contract::{CompletionProvider, DocsPublisher};
use apidoc_sync_core::generate::DocsGenerator;
use serde_json::{json, Value};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader};
use tracing::{debug, error, info};

use super::protocol::{
    error_codes, CallToolParams, CallToolResult, InitializeParams, InitializeResult, JsonRpcRequest,
    JsonRpcResponse, ServerCapabilities, ServerInfo, Tool, DEFAULT_PROTOCOL_VERSION, JSONRPC_VERSION,
};

pub const DOCS_TOOL_NAME: &str = "write-or-updatedocs";
pub const DOCS_TOOL_DESCRIPTION: &str = "Write or update docs for api";

/// MCP server exposing a single documentation tool backed by a [`DocsGenerator`].
pub struct McpServer<L, P> {
    server_info: ServerInfo,
    generator: DocsGenerator<L, P>,
}

impl<L, P> McpServer<L, P>
where
    L: CompletionProvider,
    P: DocsPublisher,
{
    pub fn new(version: &str, generator: DocsGenerator<L, P>) -> Self {
        Self {
            server_info: ServerInfo {
                name: "apidoc-sync".to_string(),
                version: version.to_string(),
            },
            generator,
        }
    }

    /// Serve requests from stdin, writing responses to stdout, until EOF.
    pub async fn run(&self) -> std::io::Result<()> {
        let stdin = BufReader::new(tokio::io::stdin());
        let stdout = tokio::io::stdout();
        self.serve(stdin, stdout).await
    }

    /// Serve newline-delimited requests from `reader` until EOF.
    pub async fn serve<R, W>(&self, mut reader: R, mut writer: W) -> std::io::Result<()>
    where
        R: AsyncBufRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        info!("Starting MCP JSON-RPC 2.0 server");
        let mut line = String::new();
        loop {
            line.clear();
            match reader.read_line(&mut line).await {
                Ok(0) => {
                    debug!("EOF reached, shutting down MCP server");
                    break;
                }
                Ok(_) => {
                    if let Some(response) = self.handle_line(&line).await {
                        write_response(&mut writer, &response).await?;
                    }
                }
                Err(e) => {
                    error!(error = %e, "Error reading request");
                    let response = JsonRpcResponse::error(
                        None,
                        error_codes::INTERNAL_ERROR,
                        format!("Failed to read request: {e}"),
                    );
                    write_response(&mut writer, &response).await?;
                }
            }
        }
        info!("MCP server shutdown complete");
        Ok(())
    }

    /// Handle one request line. Returns `None` for blank lines and notifications.
    pub async fn handle_line(&self, line: &str) -> Option<JsonRpcResponse> {
        let line = line.trim();
        if line.is_empty() {
            return None;
        }

        let request: JsonRpcRequest = match serde_json::from_str(line) {
            Ok(req) => req,
            Err(e) => {
                error!(error = %e, "Failed to parse JSON-RPC request");
                return Some(JsonRpcResponse::error(
                    None,
                    error_codes::PARSE_ERROR,
                    format!("Invalid JSON: {e}"),
                ));
            }
        };

        if request.jsonrpc != JSONRPC_VERSION {
            return Some(JsonRpcResponse::error(
                request.id,
                error_codes::INVALID_REQUEST,
                "Only JSON-RPC 2.0 is supported".to_string(),
            ));
        }

        if request.has_null_id() {
            error!(method = %request.method, "Rejecting request with null id");
            return Some(JsonRpcResponse::error(
                None,
                error_codes::INVALID_REQUEST,
                "Request id must not be null".to_string(),
            ));
        }

        if request.is_notification() {
            debug!(method = %request.method, "Received notification");
            return None;
        }

        debug!(method = %request.method, "Handling request");
        let response = match request.method.as_str() {
            "initialize" => self.handle_initialize(request.id, request.params),
            "ping" => JsonRpcResponse::success(request.id, json!({})),
            "tools/list" => JsonRpcResponse::success(request.id, json!({ "tools": [docs_tool()] })),
            "tools/call" => self.handle_tool_call(request.id, request.params).await,
            other => JsonRpcResponse::error(
                request.id,
                error_codes::METHOD_NOT_FOUND,
                format!("Method not found: {other}"),
            ),
        };
        Some(response)
    }

    fn handle_initialize(&self, id: Option<Value>, params: Option<Value>) -> JsonRpcResponse {
        let params: InitializeParams = params
            .and_then(|p| serde_json::from_value(p).ok())
            .unwrap_or_default();
        let result = InitializeResult {
            protocol_version: params
                .protocol_version
                .unwrap_or_else(|| DEFAULT_PROTOCOL_VERSION.to_string()),
            capabilities: ServerCapabilities { tools: json!({}) },
            server_info: self.server_info.clone(),
        };
        to_response(id, &result)
    }

    async fn handle_tool_call(&self, id: Option<Value>, params: Option<Value>) -> JsonRpcResponse {
        let params: CallToolParams = match params.map(serde_json::from_value::<CallToolParams>) {
            Some(Ok(p)) => p,
            Some(Err(e)) => {
                return JsonRpcResponse::error(
                    id,
                    error_codes::INVALID_PARAMS,
                    format!("Invalid tool call parameters: {e}"),
                )
            }
            None => {
                return JsonRpcResponse::error(
                    id,
                    error_codes::INVALID_PARAMS,
                    "Missing parameters".to_string(),
                )
            }
        };

        if params.name != DOCS_TOOL_NAME {
            return JsonRpcResponse::error(
                id,
                error_codes::INVALID_PARAMS,
                format!("Unknown tool: {}", params.name),
            );
        }

        info!(tool = DOCS_TOOL_NAME, arguments = ?params.arguments, "Tool invoked");
        let result = match self.generator.run().await {
            Ok(report) => match serde_json::to_string(&report.spec) {
                Ok(text) => CallToolResult::text(text),
                Err(e) => CallToolResult::error(format!("Failed to serialize specification: {e}")),
            },
            Err(e) => {
                error!(tool = DOCS_TOOL_NAME, error = %e, "[write-docs] Error in docs generation");
                CallToolResult::error(e.to_string())
            }
        };
        to_response(id, &result)
    }
}

fn docs_tool() -> Tool {
    Tool {
        name: DOCS_TOOL_NAME.to_string(),
        description: DOCS_TOOL_DESCRIPTION.to_string(),
        input_schema: json!({
            "type": "object",
            "properties": {
                "title": { "type": "string" }
            }
        }),
    }
}

fn to_response<T: serde::Serialize>(id: Option<Value>, result: &T) -> JsonRpcResponse {
    match serde_json::to_value(result) {
        Ok(value) => JsonRpcResponse::success(id, value),
        Err(e) => JsonRpcResponse::error(
            id,
            error_codes::INTERNAL_ERROR,
            format!("Failed to serialize result: {e}"),
        ),
    }
}

async fn write_response<W: AsyncWrite + Unpin>(writer: &mut W, response: &JsonRpcResponse) -> std::io::Result<()> {
    let json = serde_json::to_string(response)?;
    writer.write_all(json.as_bytes()).await?;
    writer.write_all(b"\n").await?;
    writer.flush().await
}
