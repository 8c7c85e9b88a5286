//! Tool abstraction
//!
//! A tool is something the model can call by name. Its output goes back to
//! the model as a `tool_result` block.

use anyhow::Result;
use async_trait::async_trait;
use serde_json::{json, Value};

use crate::llm::{ContentBlock, ToolDefinition, ToolInputSchema};

/// Outcome of one tool call
#[derive(Debug, Clone, PartialEq)]
pub struct ToolResult {
    /// Text handed back to the model
    pub output: String,
    pub is_error: bool,
}

impl ToolResult {
    pub fn success(output: impl Into<String>) -> Self {
        Self {
            output: output.into(),
            is_error: false,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            output: message.into(),
            is_error: true,
        }
    }

    /// Answer the tool call `tool_use_id` with this result
    pub fn into_block(self, tool_use_id: impl Into<String>) -> ContentBlock {
        ContentBlock::tool_result(tool_use_id, self.output, self.is_error)
    }
}

#[async_trait]
pub trait Tool: Send + Sync {
    fn name(&self) -> &str;

    /// What the tool does, as shown to the model
    fn description(&self) -> &str;

    /// Schema of the call arguments; defaults to no arguments
    fn input_schema(&self) -> ToolInputSchema {
        ToolInputSchema::new().with_properties(json!({}))
    }

    /// Declaration sent to the model
    fn definition(&self) -> ToolDefinition {
        ToolDefinition {
            name: self.name().to_string(),
            description: Some(self.description().to_string()),
            input_schema: self.input_schema(),
        }
    }

    /// Run the tool with arguments matching `input_schema`
    ///
    /// `Err` means the tool itself broke; failures the model should hear
    /// about are returned as [`ToolResult::error`].
    async fn execute(&self, input: &Value) -> Result<ToolResult>;
}
