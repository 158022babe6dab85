//! JSON-RPC handling for one authenticated session.

use crate::dispatcher::ToolDispatcher;
use crate::protocol::{CallToolParams, JsonRpcRequest, JsonRpcResponse, PROTOCOL_VERSION};
use serde_json::{json, Value};

/// Answers MCP methods for the identity the dispatcher was built for.
pub struct McpSession {
    dispatcher: ToolDispatcher,
    server_name: String,
}

impl McpSession {
    pub fn new(dispatcher: ToolDispatcher, server_name: impl Into<String>) -> Self {
        Self {
            dispatcher,
            server_name: server_name.into(),
        }
    }

    pub fn dispatcher(&self) -> &ToolDispatcher {
        &self.dispatcher
    }

    /// Handle a JSON-RPC message. Notifications yield no response.
    pub async fn handle_request(&self, request: JsonRpcRequest) -> Option<JsonRpcResponse> {
        if request.is_notification() {
            tracing::debug!(method = %request.method, "Notification received");
            return None;
        }

        let id = request.id.clone();
        let response = match request.method.as_str() {
            "initialize" => self.handle_initialize(id),
            "ping" => JsonRpcResponse::success(id, json!({})),
            "tools/list" => self.handle_list_tools(id),
            "tools/call" => self.handle_call_tool(id, request.params).await,
            _ => JsonRpcResponse::error(id, -32601, format!("Method not found: {}", request.method)),
        };
        Some(response)
    }

    fn handle_initialize(&self, id: Option<Value>) -> JsonRpcResponse {
        let result = json!({
            "protocolVersion": PROTOCOL_VERSION,
            "serverInfo": {
                "name": self.server_name,
                "version": env!("CARGO_PKG_VERSION")
            },
            "capabilities": {
                "tools": {
                    "listChanged": false
                }
            }
        });
        JsonRpcResponse::success(id, result)
    }

    fn handle_list_tools(&self, id: Option<Value>) -> JsonRpcResponse {
        let tools = self.dispatcher.registry().definitions();
        JsonRpcResponse::success(id, json!({ "tools": tools }))
    }

    async fn handle_call_tool(&self, id: Option<Value>, params: Option<Value>) -> JsonRpcResponse {
        let params: CallToolParams = match params {
            Some(p) => match serde_json::from_value(p) {
                Ok(params) => params,
                Err(e) => return JsonRpcResponse::error(id, -32602, format!("Invalid params: {e}")),
            },
            None => return JsonRpcResponse::error(id, -32602, "Missing params"),
        };

        match self.dispatcher.call(&params.name, &params.arguments).await {
            Ok(result) => match serde_json::to_value(&result) {
                Ok(value) => JsonRpcResponse::success(id, value),
                Err(e) => JsonRpcResponse::error(id, -32603, format!("Internal error: {e}")),
            },
            Err(err) => {
                tracing::info!(
                    login = %self.dispatcher.identity().login,
                    tool = %params.name,
                    error = %err,
                    "Tool call refused"
                );
                JsonRpcResponse::error(id, err.code(), err.to_string())
            }
        }
    }
}
