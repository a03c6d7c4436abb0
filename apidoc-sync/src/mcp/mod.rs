//! Model Context Protocol surface: exposes the docs generator as a tool over stdio.

pub mod protocol;
pub mod server;

pub use server::{McpServer, DOCS_TOOL_DESCRIPTION, DOCS_TOOL_NAME};
