//! Tool system for the agent framework
//!
//! This module provides:
//! - `Tool` trait - Interface for implementing tools
//! - `ToolResult` - Result type for tool execution
//! - `ToolRegistry` - Registry for managing available tools
//! - `ListFilesTool` - Lists the uploaded files of a store

mod list_files;
mod registry;
mod tool;

pub use list_files::{ListFilesTool, LIST_FILES_TOOL_NAME};
pub use registry::ToolRegistry;
pub use tool::{Tool, ToolResult};
