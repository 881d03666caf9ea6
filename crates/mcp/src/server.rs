// MCP server: JSON-RPC 2.0 over newline-delimited stdio

use crate::dispatcher::Dispatcher;
use crate::protocol::{
    methods, CallToolParams, CancelledParams, InitializeParams, InitializeResult, JsonRpcError,
    JsonRpcRequest, JsonRpcResponse, ListToolsResult, ServerCapabilities, ServerInfo,
    ToolsCapability, PROTOCOL_VERSION,
};
use anyhow::{Context, Result};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncWrite, AsyncWriteExt, BufReader};
use tokio::sync::{mpsc, Mutex};
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

const INSTRUCTIONS: &str = "Read-only access to USAspending.gov federal spending data. \
    Call GetAgencies first to obtain agency ids for GetSpendingAwardsByAgencyId.";

type ResponseSender = mpsc::UnboundedSender<JsonRpcResponse>;

pub struct McpServer {
    dispatcher: Dispatcher,
    info: ServerInfo,
    /// Cancellation handles for running `tools/call` requests, keyed by the
    /// JSON encoding of the request id.
    in_flight: Mutex<HashMap<String, CancellationToken>>,
}

impl McpServer {
    pub fn new(dispatcher: Dispatcher) -> Self {
        Self::with_name(dispatcher, "usaspending")
    }

    pub fn with_name(dispatcher: Dispatcher, name: impl Into<String>) -> Self {
        Self {
            dispatcher,
            info: ServerInfo {
                name: name.into(),
                version: env!("CARGO_PKG_VERSION").to_string(),
            },
            in_flight: Mutex::new(HashMap::new()),
        }
    }

    /// Serve on the process's stdin/stdout until stdin closes.
    pub async fn start(self: Arc<Self>) -> Result<()> {
        info!(
            server = %self.info.name,
            tools = self.dispatcher.registry().len(),
            "Starting MCP server with stdio transport"
        );
        self.serve(tokio::io::stdin(), tokio::io::stdout()).await
    }

    /// Serve one session over any line-oriented byte stream pair.
    ///
    /// Each `tools/call` runs as its own task; all responses funnel through a
    /// single writer task. On EOF the server waits for running calls to
    /// finish and flush before returning.
    pub async fn serve<R, W>(self: Arc<Self>, reader: R, writer: W) -> Result<()>
    where
        R: AsyncRead + Unpin,
        W: AsyncWrite + Unpin + Send + 'static,
    {
        let (tx, rx) = mpsc::unbounded_channel();
        let writer_task = tokio::spawn(write_responses(rx, writer));
        let mut calls = JoinSet::new();
        let mut lines = BufReader::new(reader).lines();

        while let Some(line) = lines.next_line().await.context("Failed to read input")? {
            let trimmed = line.trim();
            if trimmed.is_empty() {
                continue;
            }

            match serde_json::from_str::<Value>(trimmed) {
                Ok(message) => match JsonRpcRequest::from_value(message) {
                    Ok(request) => self.handle_message(request, &tx, &mut calls).await,
                    Err(response) => {
                        warn!("Message is not a JSON-RPC request");
                        send(&tx, response);
                    }
                },
                Err(e) => {
                    warn!(error = %e, "Unparseable JSON-RPC message");
                    send(&tx, JsonRpcResponse::error(Value::Null, JsonRpcError::parse_error()));
                }
            }

            while let Some(joined) = calls.try_join_next() {
                if let Err(e) = joined {
                    warn!(error = %e, "Tool call task failed");
                }
            }
        }

        debug!("EOF received, draining in-flight calls");
        while let Some(joined) = calls.join_next().await {
            if let Err(e) = joined {
                warn!(error = %e, "Tool call task failed");
            }
        }

        drop(tx);
        writer_task.await.context("Response writer task failed")??;
        info!("MCP server stopped");

        Ok(())
    }

    async fn handle_message(
        self: &Arc<Self>,
        request: JsonRpcRequest,
        tx: &ResponseSender,
        calls: &mut JoinSet<()>,
    ) {
        let Some(id) = request.id.clone() else {
            self.handle_notification(request).await;
            return;
        };
        debug!(method = %request.method, id = %id, "Handling request");

        let result = match request.method.as_str() {
            methods::INITIALIZE => self.handle_initialize(request.params),
            methods::PING => Ok(json!({})),
            methods::TOOLS_LIST => self.handle_list_tools(),
            methods::TOOLS_CALL => match parse_call_params(request.params) {
                Ok(params) => {
                    self.spawn_call(id, params, tx, calls).await;
                    return;
                }
                Err(e) => Err(e),
            },
            other => Err(JsonRpcError::method_not_found(other)),
        };

        let response = match result {
            Ok(value) => JsonRpcResponse::success(id, value),
            Err(error) => JsonRpcResponse::error(id, error),
        };
        send(tx, response);
    }

    async fn handle_notification(&self, notification: JsonRpcRequest) {
        match notification.method.as_str() {
            methods::INITIALIZED => info!("Client initialized"),
            methods::CANCELLED => {
                let params = notification
                    .params
                    .map(serde_json::from_value::<CancelledParams>);
                match params {
                    Some(Ok(cancelled)) => {
                        let key = cancelled.request_id.to_string();
                        match self.in_flight.lock().await.get(&key) {
                            Some(token) => {
                                debug!(request_id = %key, reason = ?cancelled.reason, "Cancelling request");
                                token.cancel();
                            }
                            None => debug!(request_id = %key, "Cancel for unknown or finished request"),
                        }
                    }
                    _ => warn!("Malformed cancellation notification"),
                }
            }
            other => debug!(method = %other, "Ignoring notification"),
        }
    }

    fn handle_initialize(&self, params: Option<Value>) -> Result<Value, JsonRpcError> {
        let params: InitializeParams = params
            .map(serde_json::from_value)
            .transpose()
            .map_err(|e| JsonRpcError::invalid_params(format!("Invalid params: {e}")))?
            .unwrap_or_default();

        match &params.client_info {
            Some(client) => info!(
                client = %client.name,
                version = %client.version,
                protocol = %params.protocol_version,
                "Client connected"
            ),
            None => info!(protocol = %params.protocol_version, "Client connected"),
        }

        let result = InitializeResult {
            protocol_version: PROTOCOL_VERSION.to_string(),
            capabilities: ServerCapabilities {
                tools: Some(ToolsCapability {
                    list_changed: false,
                }),
            },
            server_info: self.info.clone(),
            instructions: Some(INSTRUCTIONS.to_string()),
        };

        serde_json::to_value(result).map_err(|e| JsonRpcError::internal_error(e.to_string()))
    }

    fn handle_list_tools(&self) -> Result<Value, JsonRpcError> {
        let result = ListToolsResult {
            tools: self.dispatcher.registry().list_schemas(),
        };
        serde_json::to_value(result).map_err(|e| JsonRpcError::internal_error(e.to_string()))
    }

    async fn spawn_call(
        self: &Arc<Self>,
        id: Value,
        params: CallToolParams,
        tx: &ResponseSender,
        calls: &mut JoinSet<()>,
    ) {
        let key = id.to_string();
        let cancel = CancellationToken::new();
        {
            let mut in_flight = self.in_flight.lock().await;
            if in_flight.contains_key(&key) {
                send(
                    tx,
                    JsonRpcResponse::error(
                        id,
                        JsonRpcError::invalid_request(format!("Request id {key} is already in flight")),
                    ),
                );
                return;
            }
            in_flight.insert(key.clone(), cancel.clone());
        }

        debug!(tool = %params.name, id = %key, "Calling tool");
        let server = Arc::clone(self);
        let tx = tx.clone();
        calls.spawn(async move {
            let result = server
                .dispatcher
                .invoke_with_cancel(&params.name, params.arguments, &cancel)
                .await;
            server.in_flight.lock().await.remove(&key);

            let response = match serde_json::to_value(result.into_call_result()) {
                Ok(value) => JsonRpcResponse::success(id, value),
                Err(e) => JsonRpcResponse::error(id, JsonRpcError::internal_error(e.to_string())),
            };
            send(&tx, response);
        });
    }
}

fn parse_call_params(params: Option<Value>) -> Result<CallToolParams, JsonRpcError> {
    let params = params.ok_or_else(|| JsonRpcError::invalid_params("Missing params"))?;
    serde_json::from_value(params)
        .map_err(|e| JsonRpcError::invalid_params(format!("Invalid params: {e}")))
}

fn send(tx: &ResponseSender, response: JsonRpcResponse) {
    if tx.send(response).is_err() {
        warn!("Response writer closed, dropping response");
    }
}

async fn write_responses<W>(mut rx: mpsc::UnboundedReceiver<JsonRpcResponse>, mut writer: W) -> Result<()>
where
    W: AsyncWrite + Unpin,
{
    while let Some(response) = rx.recv().await {
        let line = serde_json::to_string(&response).context("Failed to serialize response")?;
        writer
            .write_all(line.as_bytes())
            .await
            .context("Failed to write response")?;
        writer.write_all(b"\n").await?;
        writer.flush().await?;
    }
    writer.shutdown().await?;
    Ok(())
}
