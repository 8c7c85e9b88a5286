//! Tool Executor
//!
//! Runs the tool calls of one model turn. Failures never abort the run:
//! they are reported back to the model as error tool results.

use serde_json::Value;

use crate::llm::ContentBlock;
use crate::tools::{ToolRegistry, ToolResult};

/// Executes tool calls requested by the model
pub struct ToolExecutor;

impl ToolExecutor {
    /// Execute a single tool call
    pub async fn execute(tools: Option<&ToolRegistry>, tool_name: &str, tool_id: &str, input: &Value) -> ToolResult {
        let Some(tools) = tools else {
            return ToolResult::error(format!("No tools configured, cannot execute: {}", tool_name));
        };

        match tools.execute(tool_name, input).await {
            Ok(result) => result,
            Err(e) => {
                tracing::warn!("[Executor] Tool {} ({}) failed: {:#}", tool_name, tool_id, e);
                ToolResult::error(format!("Error: {:#}", e))
            }
        }
    }

    /// Execute every tool call in order, returning one tool_result block each
    pub async fn execute_all(tools: Option<&ToolRegistry>, calls: &[(String, String, Value)]) -> Vec<ContentBlock> {
        let mut blocks = Vec::with_capacity(calls.len());
        for (id, name, input) in calls {
            tracing::info!("[Executor] Tool use: {} ({})", name, id);
            let result = Self::execute(tools, name, id, input).await;
            blocks.push(result.into_block(id.as_str()));
        }
        blocks
    }
}
