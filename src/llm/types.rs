//! Conversation types shared by the agent loop, sessions and tools
//!
//! Roles are `"user"` and `"assistant"`; tool calls and their results travel
//! as content blocks. The Gemini provider maps all of this onto its own wire
//! format when it talks to the API.

use serde::{Deserialize, Serialize};
use serde_json::Value;

// ============================================================================
// Messages
// ============================================================================

/// Instruction sent to the model ahead of the conversation
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SystemPrompt {
    Text(String),
}

impl SystemPrompt {
    pub fn text(&self) -> &str {
        match self {
            SystemPrompt::Text(text) => text,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    /// `"user"` or `"assistant"`
    pub role: String,
    pub content: MessageContent,
}

/// Plain text, or blocks when tools are involved
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MessageContent {
    Text(String),
    Blocks(Vec<ContentBlock>),
}

impl Message {
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: MessageContent::Text(text.into()),
        }
    }

    /// User turn carrying tool results
    pub fn user_with_blocks(blocks: Vec<ContentBlock>) -> Self {
        Self {
            role: "user".to_string(),
            content: MessageContent::Blocks(blocks),
        }
    }

    /// Model turn as returned by a provider
    pub fn assistant_with_blocks(blocks: Vec<ContentBlock>) -> Self {
        Self {
            role: "assistant".to_string(),
            content: MessageContent::Blocks(blocks),
        }
    }

    pub fn blocks(&self) -> Option<&[ContentBlock]> {
        match &self.content {
            MessageContent::Text(_) => None,
            MessageContent::Blocks(blocks) => Some(blocks),
        }
    }

    /// Every non-empty text part of this message, in order
    pub fn text_parts(&self) -> Vec<&str> {
        match &self.content {
            MessageContent::Text(s) if !s.is_empty() => vec![s.as_str()],
            MessageContent::Text(_) => Vec::new(),
            MessageContent::Blocks(blocks) => blocks
                .iter()
                .filter_map(ContentBlock::as_text)
                .filter(|t| !t.is_empty())
                .collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentBlock {
    Text { text: String },

    /// The model asks for a tool to be run
    ToolUse {
        id: String,
        name: String,
        input: Value,
        /// Opaque provider token that must accompany this call when the
        /// history is sent back (Gemini thought signature)
        #[serde(default, skip_serializing_if = "Option::is_none")]
        signature: Option<String>,
    },

    /// Answer to the `ToolUse` with the same id
    ToolResult {
        tool_use_id: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        content: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        is_error: Option<bool>,
    },
}

impl ContentBlock {
    pub fn text(text: impl Into<String>) -> Self {
        ContentBlock::Text { text: text.into() }
    }

    pub fn tool_use(id: impl Into<String>, name: impl Into<String>, input: Value) -> Self {
        ContentBlock::ToolUse {
            id: id.into(),
            name: name.into(),
            input,
            signature: None,
        }
    }

    /// Attach a provider signature to a tool use block; other blocks are unchanged
    pub fn with_signature(mut self, sig: Option<String>) -> Self {
        if let ContentBlock::ToolUse { signature, .. } = &mut self {
            *signature = sig;
        }
        self
    }

    /// `is_error` is only serialized when set
    pub fn tool_result(tool_use_id: impl Into<String>, content: impl Into<String>, is_error: bool) -> Self {
        ContentBlock::ToolResult {
            tool_use_id: tool_use_id.into(),
            content: Some(content.into()),
            is_error: is_error.then_some(true),
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            ContentBlock::Text { text } => Some(text.as_str()),
            _ => None,
        }
    }

    /// `(id, name, input)` of a tool call
    pub fn as_tool_use(&self) -> Option<(&str, &str, &Value)> {
        match self {
            ContentBlock::ToolUse { id, name, input, .. } => Some((id.as_str(), name.as_str(), input)),
            _ => None,
        }
    }
}

// ============================================================================
// Tools
// ============================================================================

/// Tool declaration handed to the model
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolDefinition {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub input_schema: ToolInputSchema,
}

/// JSON schema of a tool's arguments (always an object)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolInputSchema {
    #[serde(rename = "type")]
    pub schema_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub properties: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub required: Option<Vec<String>>,
}

impl ToolInputSchema {
    pub fn new() -> Self {
        Self {
            schema_type: "object".to_string(),
            properties: None,
            required: None,
        }
    }

    pub fn with_properties(mut self, properties: Value) -> Self {
        self.properties = Some(properties);
        self
    }

    pub fn with_required(mut self, required: Vec<String>) -> Self {
        self.required = Some(required);
        self
    }
}

impl Default for ToolInputSchema {
    fn default() -> Self {
        Self::new()
    }
}

/// Constraint on tool calling for one request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ToolChoice {
    /// Model decides
    Auto,
    /// Model must call some tool
    Any,
    /// Model must call this tool
    Tool { name: String },
    /// Tools are off
    None,
}

impl ToolChoice {
    pub fn tool(name: impl Into<String>) -> Self {
        ToolChoice::Tool { name: name.into() }
    }
}

// ============================================================================
// Responses
// ============================================================================

/// One complete model turn
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageResponse {
    /// Provider response id, may be empty
    pub id: String,
    pub role: String,
    pub content: Vec<ContentBlock>,
    pub model: String,
    pub stop_reason: Option<StopReason>,
    pub usage: Usage,
}

impl MessageResponse {
    /// Concatenated text of the turn
    pub fn text(&self) -> String {
        self.content.iter().filter_map(ContentBlock::as_text).collect()
    }

    pub fn tool_uses(&self) -> Vec<(&str, &str, &Value)> {
        self.content.iter().filter_map(ContentBlock::as_tool_use).collect()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StopReason {
    EndTurn,
    MaxTokens,
    ToolUse,
    /// Blocked for safety or recitation
    Refusal,
}

impl StopReason {
    /// Map a Gemini `finishReason`; unknown reasons count as a normal end
    pub fn from_finish_reason(reason: &str) -> Self {
        match reason {
            "MAX_TOKENS" => StopReason::MaxTokens,
            "SAFETY" | "RECITATION" => StopReason::Refusal,
            _ => StopReason::EndTurn,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Usage {
    pub input_tokens: u32,
    pub output_tokens: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thoughts_token_count: Option<u32>,
}

// ============================================================================
// Streaming
// ============================================================================

/// Incremental output of a streaming call
///
/// A turn is `MessageStart`, then per block `ContentBlockStart`, any number
/// of `ContentBlockDelta` and `ContentBlockStop`, then `MessageDelta` and
/// `MessageStop`. `Error` can arrive at any point and ends the turn.
#[derive(Debug, Clone)]
pub enum StreamEvent {
    MessageStart(MessageStartEvent),
    ContentBlockStart(ContentBlockStartEvent),
    ContentBlockDelta(ContentBlockDeltaEvent),
    ContentBlockStop(ContentBlockStopEvent),
    MessageDelta(MessageDeltaEvent),
    MessageStop,
    Error(StreamError),
}

#[derive(Debug, Clone)]
pub struct MessageStartEvent {
    pub id: String,
    pub model: String,
    pub usage: Usage,
}

#[derive(Debug, Clone)]
pub struct ContentBlockStartEvent {
    pub index: usize,
    pub content_block: ContentBlockStart,
}

/// Kind of block being opened; content follows as deltas
#[derive(Debug, Clone)]
pub enum ContentBlockStart {
    Text,
    ToolUse {
        id: String,
        name: String,
        signature: Option<String>,
    },
}

#[derive(Debug, Clone)]
pub struct ContentBlockDeltaEvent {
    pub index: usize,
    pub delta: ContentDelta,
}

#[derive(Debug, Clone)]
pub enum ContentDelta {
    TextDelta { text: String },
    /// Fragment of the tool input JSON
    InputJsonDelta { partial_json: String },
}

#[derive(Debug, Clone)]
pub struct ContentBlockStopEvent {
    pub index: usize,
}

#[derive(Debug, Clone)]
pub struct MessageDeltaEvent {
    pub stop_reason: Option<StopReason>,
    /// Cumulative for the turn
    pub output_tokens: u32,
}

/// Error object reported by the API, in a stream or a response body
#[derive(Debug, Clone, Deserialize)]
pub struct StreamError {
    /// e.g. `RESOURCE_EXHAUSTED`
    #[serde(default)]
    pub status: String,
    pub message: String,
}
