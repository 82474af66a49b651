/// MCP server implementation that handles JSON-RPC communication
///
/// This module implements the actual MCP server that:
/// 1. Reads JSON-RPC requests from stdin, one per line
/// 2. Runs tool calls against the fitness tracker
/// 3. Writes responses and reminder notifications to stdout

use jsonrpc_core::Error as RpcError;
use serde::Serialize;
use serde_json::{json, Value};
use tokio::io::{AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader};
use tokio::sync::mpsc::UnboundedReceiver;
use tracing::{debug, error, info, warn};

use crate::mcp::protocol::*;
use crate::reminders::FiredReminder;
use crate::tools;
use crate::{FitnessTrackerServer, ServerError};

/// MCP server wrapping a fitness tracker
pub struct McpServer {
    tracker: FitnessTrackerServer,
    /// Whether the client has sent `initialized`
    initialized: bool,
}

impl McpServer {
    pub fn new(tracker: FitnessTrackerServer) -> Self {
        Self {
            tracker,
            initialized: false,
        }
    }

    /// Run the MCP server, handling JSON-RPC over stdin/stdout
    pub async fn run(&mut self) -> Result<(), ServerError> {
        info!("Starting MCP server, waiting for JSON-RPC requests...");

        let mut reminders = self.tracker.start_reminders()?;
        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        let mut stdout = tokio::io::stdout();

        loop {
            tokio::select! {
                read = lines.next_line() => match read {
                    Ok(Some(line)) => {
                        if let Some(response) = self.process_line(&line).await {
                            write_message(&mut stdout, &response).await?;
                        }
                    }
                    Ok(None) => {
                        info!("MCP server shutting down (stdin closed)");
                        break;
                    }
                    Err(e) => {
                        error!("Failed to read from stdin: {}", e);
                        break;
                    }
                },
                Some(fired) = recv_reminder(&mut reminders) => {
                    debug!("Reminder {} fired", fired.reminder_id);
                    write_message(&mut stdout, &reminder_notification(&fired)).await?;
                }
            }
        }

        Ok(())
    }

    /// Process a single line of JSON-RPC input
    ///
    /// Returns `None` for blank lines and notifications.
    pub async fn process_line(&mut self, line: &str) -> Option<JsonRpcResponse> {
        let line = line.trim();
        if line.is_empty() {
            return None;
        }

        debug!("Processing request: {}", line);

        let request: JsonRpcRequest = match serde_json::from_str(line) {
            Ok(req) => req,
            Err(e) => {
                error!("Failed to parse JSON-RPC request: {}", e);
                let mut error = RpcError::parse_error();
                error.data = Some(json!(e.to_string()));
                return Some(JsonRpcResponse::error(Value::Null, error));
            }
        };

        self.handle_request(request).await
    }

    async fn handle_request(&mut self, request: JsonRpcRequest) -> Option<JsonRpcResponse> {
        if request.is_notification() {
            match request.method.as_str() {
                "initialized" | "notifications/initialized" => {
                    self.initialized = true;
                    info!("MCP client initialized");
                }
                other => debug!("Ignoring notification '{}'", other),
            }
            return None;
        }

        let id = request.id.clone().unwrap_or(Value::Null);
        let response = match request.method.as_str() {
            "initialize" => self.handle_initialize(id),
            "initialized" => {
                self.initialized = true;
                JsonRpcResponse::success(id, json!({}))
            }
            "ping" => JsonRpcResponse::success(id, json!({})),
            "tools/list" => self.handle_tools_list(id),
            "tools/call" => self.handle_tools_call(id, request.params).await,
            _ => {
                let mut error = RpcError::method_not_found();
                error.message = format!("Method '{}' not found", request.method);
                JsonRpcResponse::error(id, error)
            }
        };
        Some(response)
    }

    fn handle_initialize(&mut self, id: Value) -> JsonRpcResponse {
        info!("MCP client connected");
        encode_result(id, &InitializeResult::current())
    }

    fn handle_tools_list(&self, id: Value) -> JsonRpcResponse {
        if !self.initialized {
            debug!("tools/list before the client sent initialized");
        }
        JsonRpcResponse::success(id, json!({ "tools": tools::definitions() }))
    }

    async fn handle_tools_call(&mut self, id: Value, params: Option<Value>) -> JsonRpcResponse {
        let call: ToolCallParams = match params.map(serde_json::from_value) {
            Some(Ok(call)) => call,
            Some(Err(e)) => {
                return JsonRpcResponse::error(
                    id,
                    RpcError::invalid_params(format!("Invalid parameters: {}", e)),
                )
            }
            None => return JsonRpcResponse::error(id, RpcError::invalid_params("Missing parameters")),
        };

        let result = match self.tracker.call_tool(&call.name, call.arguments).await {
            Ok(output) => ToolCallResult::success(output.text, output.data),
            Err(e) => {
                warn!("Tool {} failed: {}", call.name, e);
                ToolCallResult::error(e.code(), e.to_string())
            }
        };

        encode_result(id, &result)
    }
}

fn encode_result<T: Serialize>(id: Value, result: &T) -> JsonRpcResponse {
    match serde_json::to_value(result) {
        Ok(value) => JsonRpcResponse::success(id, value),
        Err(e) => {
            error!("Failed to encode result: {}", e);
            JsonRpcResponse::error(id, RpcError::internal_error())
        }
    }
}

/// Wait for the next fired reminder, or forever when reminders are off
async fn recv_reminder(
    reminders: &mut Option<UnboundedReceiver<FiredReminder>>,
) -> Option<FiredReminder> {
    match reminders {
        Some(rx) => rx.recv().await,
        None => std::future::pending().await,
    }
}

/// Reminders reach the client as MCP log messages
pub fn reminder_notification(fired: &FiredReminder) -> JsonRpcNotification {
    JsonRpcNotification::new(
        "notifications/message",
        json!({
            "level": "info",
            "logger": "reminders",
            "data": fired,
        }),
    )
}

async fn write_message<W, T>(out: &mut W, message: &T) -> Result<(), ServerError>
where
    W: AsyncWrite + Unpin,
    T: Serialize,
{
    let text = serde_json::to_string(message)?;
    out.write_all(text.as_bytes()).await?;
    out.write_all(b"\n").await?;
    out.flush().await?;
    debug!("Sent: {}", text);
    Ok(())
}
