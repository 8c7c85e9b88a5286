//! Standard Agent
//!
//! One model turn of the agent loop: call the LLM with the conversation so
//! far (streaming or not) and execute whatever tools it asked for. The
//! [`Runner`](crate::runtime::Runner) repeats turns until the model stops
//! calling tools.

use std::sync::Arc;

use anyhow::Result;
use futures::StreamExt;
use serde_json::Value;

use crate::llm::{
    ContentBlock, ContentBlockStart, ContentDelta, LlmProvider, Message, StopReason,
    StreamEvent, SystemPrompt,
};

use super::config::AgentConfig;
use super::executor::ToolExecutor;

/// Content block being assembled from stream deltas
enum PendingBlock {
    Text(String),
    ToolUse {
        id: String,
        name: String,
        signature: Option<String>,
        input_json: String,
    },
}

impl PendingBlock {
    fn finish(self) -> Option<ContentBlock> {
        match self {
            PendingBlock::Text(text) if text.is_empty() => None,
            PendingBlock::Text(text) => Some(ContentBlock::text(text)),
            PendingBlock::ToolUse { id, name, signature, input_json } => {
                let input: Value = serde_json::from_str(&input_json)
                    .unwrap_or_else(|_| Value::Object(Default::default()));
                Some(ContentBlock::tool_use(id, name, input).with_signature(signature))
            }
        }
    }
}

/// LLM-backed agent with an instruction and a set of tools
///
/// # Example
///
/// ```ignore
/// let config = AgentConfig::new("file_manager", "You are helpful")
///     .with_tools(tools);
/// let agent = Arc::new(StandardAgent::new(config, llm));
/// let runner = Runner::new("file_manager", agent, sessions);
/// ```
pub struct StandardAgent {
    config: AgentConfig,
    llm: Arc<dyn LlmProvider>,
}

impl StandardAgent {
    /// Create a new standard agent
    pub fn new(config: AgentConfig, llm: Arc<dyn LlmProvider>) -> Self {
        Self { config, llm }
    }

    /// Agent name
    pub fn name(&self) -> &str {
        &self.config.name
    }

    /// Agent configuration
    pub fn config(&self) -> &AgentConfig {
        &self.config
    }

    /// Call the LLM once with the given history
    pub async fn call_llm(
        &self,
        messages: Vec<Message>,
        session_id: &str,
    ) -> Result<(Vec<ContentBlock>, Option<StopReason>)> {
        tracing::info!(
            "[StandardAgent] Calling {} ({}) with {} messages",
            self.llm.provider_name(),
            self.llm.model(),
            messages.len()
        );

        if self.config.streaming_enabled {
            self.call_llm_streaming(messages, session_id).await
        } else {
            self.call_llm_non_streaming(messages, session_id).await
        }
    }

    /// Execute the tool calls of one model turn
    pub async fn execute_tools(&self, calls: &[(String, String, Value)]) -> Vec<ContentBlock> {
        ToolExecutor::execute_all(self.config.tools.as_deref(), calls).await
    }

    fn system_prompt(&self) -> Option<SystemPrompt> {
        if self.config.instruction.is_empty() {
            None
        } else {
            Some(SystemPrompt::Text(self.config.instruction.clone()))
        }
    }

    async fn call_llm_non_streaming(
        &self,
        messages: Vec<Message>,
        session_id: &str,
    ) -> Result<(Vec<ContentBlock>, Option<StopReason>)> {
        let response = self
            .llm
            .send_with_tools_and_system(
                messages,
                self.system_prompt(),
                self.config.tool_definitions(),
                None,
                Some(session_id),
            )
            .await?;

        tracing::debug!(
            "[StandardAgent] Usage: input={} output={}",
            response.usage.input_tokens,
            response.usage.output_tokens
        );

        Ok((response.content, response.stop_reason))
    }

    async fn call_llm_streaming(
        &self,
        messages: Vec<Message>,
        session_id: &str,
    ) -> Result<(Vec<ContentBlock>, Option<StopReason>)> {
        let mut stream = self
            .llm
            .stream_with_tools_and_system(
                messages,
                self.system_prompt(),
                self.config.tool_definitions(),
                None,
                Some(session_id),
            )
            .await?;

        let mut content_blocks: Vec<ContentBlock> = Vec::new();
        let mut current: Option<PendingBlock> = None;
        let mut stop_reason: Option<StopReason> = None;

        while let Some(event) = stream.next().await {
            match event? {
                StreamEvent::MessageStart(start) => {
                    tracing::debug!("[StandardAgent] Stream started ({})", start.model);
                }

                StreamEvent::ContentBlockStart(start) => {
                    if let Some(block) = current.take().and_then(PendingBlock::finish) {
                        content_blocks.push(block);
                    }
                    current = Some(match start.content_block {
                        ContentBlockStart::Text => PendingBlock::Text(String::new()),
                        ContentBlockStart::ToolUse { id, name, signature } => PendingBlock::ToolUse {
                            id,
                            name,
                            signature,
                            input_json: String::new(),
                        },
                    });
                }

                StreamEvent::ContentBlockDelta(delta) => match (&mut current, delta.delta) {
                    (Some(PendingBlock::Text(text)), ContentDelta::TextDelta { text: chunk }) => {
                        text.push_str(&chunk);
                    }
                    (
                        Some(PendingBlock::ToolUse { input_json, .. }),
                        ContentDelta::InputJsonDelta { partial_json },
                    ) => {
                        input_json.push_str(&partial_json);
                    }
                    _ => {
                        tracing::warn!("[StandardAgent] Delta for block {} does not match its type", delta.index);
                    }
                },

                StreamEvent::ContentBlockStop(_) => {
                    if let Some(block) = current.take().and_then(PendingBlock::finish) {
                        content_blocks.push(block);
                    }
                }

                StreamEvent::MessageDelta(msg_delta) => {
                    stop_reason = msg_delta.stop_reason;
                }

                StreamEvent::MessageStop => {
                    tracing::debug!("[StandardAgent] Stream complete");
                }

                StreamEvent::Error(err) => {
                    tracing::error!("[StandardAgent] Stream error: {}: {}", err.status, err.message);
                    anyhow::bail!("Stream error ({}): {}", err.status, err.message);
                }
            }
        }

        if let Some(block) = current.take().and_then(PendingBlock::finish) {
            content_blocks.push(block);
        }

        Ok((content_blocks, stop_reason))
    }
}
