/// MCP protocol implementation
///
/// This module handles the Model Context Protocol communication: JSON-RPC
/// parsing, tool routing and reminder notifications.

pub mod protocol;
pub mod server;

pub use server::McpServer;
