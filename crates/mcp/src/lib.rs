// MCP (Model Context Protocol) server for USAspending.gov
// Exposes a fixed set of read-only query tools to agent clients

pub mod config;
pub mod dispatcher;
pub mod protocol;
pub mod result;
pub mod server;
pub mod tools;

pub use config::ServerConfig;
pub use dispatcher::Dispatcher;
pub use result::{FailureKind, ToolFailure, ToolResult};
pub use server::McpServer;
pub use tools::{ToolDescriptor, ToolKind, ToolRegistry};
