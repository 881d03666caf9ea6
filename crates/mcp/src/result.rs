// Invocation outcomes and their MCP rendering

use crate::protocol::{CallToolResult, ToolContent};
use crate::tools::{FieldIssue, ValidationError};
use serde::Serialize;
use serde_json::{json, Value};
use std::fmt;
use usaspending_client::ClientError;

/// Why an invocation failed. None of these stop the server.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum FailureKind {
    /// No tool with the requested name.
    UnknownTool,
    /// Arguments missing or malformed. The caller can correct and resend.
    ValidationError,
    /// Upstream answered 4xx.
    UpstreamRejected,
    /// Upstream answered 5xx, timed out, was unreachable or sent garbage.
    UpstreamUnavailable,
    /// The host withdrew the request.
    Cancelled,
}

impl FailureKind {
    pub fn as_str(self) -> &'static str {
        match self {
            FailureKind::UnknownTool => "UnknownTool",
            FailureKind::ValidationError => "ValidationError",
            FailureKind::UpstreamRejected => "UpstreamRejected",
            FailureKind::UpstreamUnavailable => "UpstreamUnavailable",
            FailureKind::Cancelled => "Cancelled",
        }
    }

    /// Whether repeating the identical call may succeed.
    pub fn is_transient(self) -> bool {
        matches!(self, FailureKind::UpstreamUnavailable)
    }
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Failure half of a [`ToolResult`].
#[derive(Debug, Clone, PartialEq, Serialize, thiserror::Error)]
#[error("{kind}: {message}")]
pub struct ToolFailure {
    pub kind: FailureKind,
    pub message: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub issues: Vec<FieldIssue>,
}

impl ToolFailure {
    pub fn new(kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            issues: Vec::new(),
        }
    }

    pub fn unknown_tool(name: &str) -> Self {
        Self::new(FailureKind::UnknownTool, format!("Unknown tool: {name}"))
    }

    pub fn cancelled() -> Self {
        Self::new(FailureKind::Cancelled, "Request cancelled by client")
    }
}

impl From<ValidationError> for ToolFailure {
    fn from(err: ValidationError) -> Self {
        Self {
            kind: FailureKind::ValidationError,
            message: err.to_string(),
            issues: err.issues,
        }
    }
}

impl From<ClientError> for ToolFailure {
    fn from(err: ClientError) -> Self {
        let kind = match &err {
            // Request construction refused the arguments before anything was sent
            ClientError::Config(_) => FailureKind::ValidationError,
            e if e.is_rejection() => FailureKind::UpstreamRejected,
            _ => FailureKind::UpstreamUnavailable,
        };
        Self::new(kind, err.to_string())
    }
}

/// Outcome of one invocation: the full payload or a failure, never a mix.
#[derive(Debug, Clone, PartialEq)]
pub enum ToolResult {
    Success(Value),
    Failure(ToolFailure),
}

impl ToolResult {
    pub fn failure(&self) -> Option<&ToolFailure> {
        match self {
            ToolResult::Success(_) => None,
            ToolResult::Failure(failure) => Some(failure),
        }
    }

    pub fn failure_kind(&self) -> Option<FailureKind> {
        self.failure().map(|f| f.kind)
    }

    /// Render for `tools/call`. Payloads go out as pretty JSON text; objects are
    /// also sent as `structuredContent`.
    pub fn into_call_result(self) -> CallToolResult {
        match self {
            ToolResult::Success(value) => {
                let text =
                    serde_json::to_string_pretty(&value).unwrap_or_else(|_| value.to_string());
                CallToolResult {
                    content: vec![ToolContent::text(text)],
                    structured_content: value.is_object().then_some(value),
                    is_error: None,
                }
            }
            ToolResult::Failure(failure) => CallToolResult {
                content: vec![ToolContent::error(failure.to_string())],
                structured_content: Some(json!({ "error": failure })),
                is_error: Some(true),
            },
        }
    }
}

impl From<Result<Value, ToolFailure>> for ToolResult {
    fn from(result: Result<Value, ToolFailure>) -> Self {
        match result {
            Ok(value) => ToolResult::Success(value),
            Err(failure) => ToolResult::Failure(failure),
        }
    }
}
