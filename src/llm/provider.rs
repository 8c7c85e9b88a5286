//! Model backend abstraction
//!
//! The runner only sees this trait: Gemini in production, scripted fakes in
//! tests.

use anyhow::Result;
use futures::stream::Stream;
use std::pin::Pin;

use super::types::{Message, MessageResponse, StreamEvent, SystemPrompt, ToolChoice, ToolDefinition};

pub type LlmEventStream = Pin<Box<dyn Stream<Item = Result<StreamEvent>> + Send>>;

#[async_trait::async_trait]
pub trait LlmProvider: Send + Sync {
    /// One model turn, returned whole
    ///
    /// `session_id` is forwarded to the backend for request correlation.
    async fn send_with_tools_and_system(
        &self,
        messages: Vec<Message>,
        system: Option<SystemPrompt>,
        tools: Vec<ToolDefinition>,
        tool_choice: Option<ToolChoice>,
        session_id: Option<&str>,
    ) -> Result<MessageResponse>;

    /// One model turn as incremental [`StreamEvent`]s
    async fn stream_with_tools_and_system(
        &self,
        messages: Vec<Message>,
        system: Option<SystemPrompt>,
        tools: Vec<ToolDefinition>,
        tool_choice: Option<ToolChoice>,
        session_id: Option<&str>,
    ) -> Result<LlmEventStream>;

    fn model(&self) -> String;

    /// Short backend name for logs, e.g. `"gemini"`
    fn provider_name(&self) -> &str;
}
