//! Gemini API client
//!
//! Direct HTTP client for the Google Gemini API, translating between the
//! framework's internal message types and the Gemini wire format.
//!
//! # Authentication
//!
//! Uses a Google API key (usually `GOOGLE_API_KEY`, see
//! [`FileManagerConfig`](crate::config::FileManagerConfig)) or a dynamic
//! [`AuthProvider`](super::AuthProvider).
//!
//! ```ignore
//! let llm = GeminiProvider::new("AIza...")?.with_model("gemini-2.5-flash");
//! ```

use anyhow::{Context, Result};
use futures::StreamExt;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tokio_util::io::StreamReader;

use super::auth::{auth_provider, AuthConfig, AuthSource};
use super::provider::{LlmEventStream, LlmProvider};
use super::types::{
    ContentBlock, ContentBlockDeltaEvent, ContentBlockStart, ContentBlockStartEvent,
    ContentBlockStopEvent, ContentDelta, Message, MessageContent, MessageDeltaEvent,
    MessageResponse, MessageStartEvent, StopReason, StreamError, StreamEvent, SystemPrompt,
    ToolChoice, ToolDefinition, Usage,
};

pub const DEFAULT_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";

const DEFAULT_MAX_TOKENS: u32 = 8192;

// ============================================================================
// Gemini-specific request/response types
// ============================================================================

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiRequest {
    contents: Vec<GeminiContent>,
    #[serde(skip_serializing_if = "Option::is_none")]
    system_instruction: Option<GeminiSystemInstruction>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tools: Option<Vec<GeminiTool>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tool_config: Option<GeminiToolConfig>,
    #[serde(skip_serializing_if = "Option::is_none")]
    generation_config: Option<GeminiGenerationConfig>,
}

#[derive(Debug, Serialize)]
struct GeminiSystemInstruction {
    parts: Vec<GeminiPart>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiContent {
    #[serde(default)]
    role: String,
    #[serde(default)]
    parts: Vec<GeminiPart>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiPart {
    #[serde(skip_serializing_if = "Option::is_none")]
    text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    function_call: Option<GeminiFunctionCall>,
    #[serde(skip_serializing_if = "Option::is_none")]
    function_response: Option<GeminiFunctionResponse>,
    #[serde(skip_serializing_if = "Option::is_none")]
    thought_signature: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    thought: Option<bool>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct GeminiFunctionCall {
    name: String,
    #[serde(default)]
    args: Value,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct GeminiFunctionResponse {
    name: String,
    response: Value,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiTool {
    function_declarations: Vec<GeminiFunctionDeclaration>,
}

#[derive(Debug, Serialize)]
struct GeminiFunctionDeclaration {
    name: String,
    description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    parameters: Option<Value>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiToolConfig {
    function_calling_config: GeminiFunctionCallingConfig,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiFunctionCallingConfig {
    mode: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    allowed_function_names: Option<Vec<String>>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiGenerationConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    max_output_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
}

// Response types

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiResponse {
    candidates: Option<Vec<GeminiCandidate>>,
    usage_metadata: Option<GeminiUsageMetadata>,
    model_version: Option<String>,
    response_id: Option<String>,
    error: Option<StreamError>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiCandidate {
    content: Option<GeminiContent>,
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiUsageMetadata {
    #[serde(default)]
    prompt_token_count: u32,
    #[serde(default)]
    candidates_token_count: u32,
    #[serde(default)]
    thoughts_token_count: Option<u32>,
}

impl GeminiUsageMetadata {
    fn to_usage(&self) -> Usage {
        Usage {
            input_tokens: self.prompt_token_count,
            output_tokens: self.candidates_token_count,
            thoughts_token_count: self.thoughts_token_count,
        }
    }
}

fn new_tool_id() -> String {
    format!("gemini_tool_{}", uuid::Uuid::new_v4().simple())
}

// ============================================================================
// GeminiProvider
// ============================================================================

/// Google Gemini LLM provider
///
/// Translates between the framework's internal message types and the Gemini
/// API format. Translation happens entirely at this boundary.
pub struct GeminiProvider {
    client: Client,
    auth: AuthSource,
    model: String,
    max_tokens: u32,
    api_base: String,
}

impl GeminiProvider {
    /// Provider authenticating with a fixed API key
    pub fn new(api_key: impl Into<String>) -> Result<Self> {
        Ok(Self::from_source(AuthSource::Static(AuthConfig::new(api_key))))
    }

    /// Provider that asks `provider` for credentials before every request
    ///
    /// The callback is called before each API request. `AuthConfig.base_url`
    /// (if set) overrides the default API base URL.
    pub fn with_auth_provider<F, Fut>(provider: F) -> Self
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<AuthConfig>> + Send + 'static,
    {
        Self::from_source(AuthSource::Dynamic(Arc::new(auth_provider(provider))))
    }

    fn from_source(auth: AuthSource) -> Self {
        Self {
            client: Client::new(),
            auth,
            model: String::new(),
            max_tokens: DEFAULT_MAX_TOKENS,
            api_base: DEFAULT_API_BASE.to_string(),
        }
    }

    /// Set the model to use
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Set the max tokens for responses
    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    /// Set the API base URL used when the auth source does not override it
    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into();
        self
    }

    // ========================================================================
    // Format conversion: Internal -> Gemini
    // ========================================================================

    /// Internal history to Gemini `contents`
    ///
    /// Thought signatures travel on the `ToolUse` blocks themselves, so each
    /// conversation echoes back only what Gemini gave it.
    fn convert_messages(&self, messages: &[Message]) -> Vec<GeminiContent> {
        // Tool results reference calls made in an earlier assistant message,
        // so names are resolved across the whole history.
        let tool_use_names: HashMap<&str, &str> = messages
            .iter()
            .filter_map(|m| m.blocks())
            .flatten()
            .filter_map(|b| b.as_tool_use())
            .map(|(id, name, _)| (id, name))
            .collect();

        let mut gemini_contents: Vec<GeminiContent> = Vec::new();

        for msg in messages {
            let gemini_role = match msg.role.as_str() {
                "assistant" => "model",
                _ => "user",
            };

            let parts = self.convert_content_to_parts(&msg.content, &tool_use_names);

            let (fn_parts, other_parts): (Vec<GeminiPart>, Vec<GeminiPart>) =
                parts.into_iter().partition(|p| p.function_response.is_some());

            if !other_parts.is_empty() {
                gemini_contents.push(GeminiContent {
                    role: gemini_role.to_string(),
                    parts: other_parts,
                });
            }
            if !fn_parts.is_empty() {
                gemini_contents.push(GeminiContent {
                    role: "user".to_string(),
                    parts: fn_parts,
                });
            }
        }

        merge_consecutive_roles(gemini_contents)
    }

    /// Convert internal content to Gemini parts
    fn convert_content_to_parts(
        &self,
        content: &MessageContent,
        tool_use_names: &HashMap<&str, &str>,
    ) -> Vec<GeminiPart> {
        let blocks = match content {
            MessageContent::Text(text) => {
                return vec![GeminiPart {
                    text: Some(text.clone()),
                    ..Default::default()
                }];
            }
            MessageContent::Blocks(blocks) => blocks,
        };

        let mut parts = Vec::new();
        for block in blocks {
            match block {
                ContentBlock::Text { text } => {
                    if !text.is_empty() {
                        parts.push(GeminiPart {
                            text: Some(text.clone()),
                            ..Default::default()
                        });
                    }
                }
                ContentBlock::ToolUse { name, input, signature, .. } => {
                    parts.push(GeminiPart {
                        function_call: Some(GeminiFunctionCall {
                            name: name.clone(),
                            args: input.clone(),
                        }),
                        thought_signature: signature.clone(),
                        ..Default::default()
                    });
                }
                ContentBlock::ToolResult {
                    tool_use_id,
                    content,
                    is_error,
                } => {
                    let tool_name = tool_use_names
                        .get(tool_use_id.as_str())
                        .map(|n| n.to_string())
                        .unwrap_or_else(|| {
                            tracing::warn!(
                                "[Gemini] No tool_use found for result {}, using id as name",
                                tool_use_id
                            );
                            tool_use_id.clone()
                        });

                    let result_content = content.clone().unwrap_or_else(|| "No output".to_string());
                    let response = if is_error.unwrap_or(false) {
                        serde_json::json!({ "error": result_content })
                    } else {
                        serde_json::json!({ "result": result_content })
                    };

                    parts.push(GeminiPart {
                        function_response: Some(GeminiFunctionResponse {
                            name: tool_name,
                            response,
                        }),
                        ..Default::default()
                    });
                }
            }
        }
        parts
    }

    /// Tool definitions to one Gemini tool with function declarations
    fn convert_tools(&self, tools: &[ToolDefinition]) -> Option<Vec<GeminiTool>> {
        if tools.is_empty() {
            return None;
        }

        let declarations = tools
            .iter()
            .map(|tool| {
                // Gemini rejects an empty object schema; omit parameters instead
                let has_properties = tool
                    .input_schema
                    .properties
                    .as_ref()
                    .and_then(|p| p.as_object())
                    .map(|p| !p.is_empty())
                    .unwrap_or(false);

                let parameters = if has_properties {
                    let mut params = serde_json::json!({
                        "type": tool.input_schema.schema_type,
                    });
                    if let Some(ref props) = tool.input_schema.properties {
                        params["properties"] = clean_schema_for_gemini(props);
                    }
                    if let Some(ref req) = tool.input_schema.required {
                        params["required"] = serde_json::json!(req);
                    }
                    Some(params)
                } else {
                    None
                };

                GeminiFunctionDeclaration {
                    name: tool.name.clone(),
                    description: tool.description.clone().unwrap_or_default(),
                    parameters,
                }
            })
            .collect();

        Some(vec![GeminiTool {
            function_declarations: declarations,
        }])
    }

    fn convert_system_prompt(&self, system: &Option<SystemPrompt>) -> Option<GeminiSystemInstruction> {
        system.as_ref().map(|s| GeminiSystemInstruction {
            parts: vec![GeminiPart {
                text: Some(s.text().to_string()),
                ..Default::default()
            }],
        })
    }

    fn convert_tool_config(&self, tool_choice: &Option<ToolChoice>) -> GeminiToolConfig {
        let (mode, allowed) = match tool_choice {
            Some(ToolChoice::Auto) | None => ("AUTO", None),
            Some(ToolChoice::Any) => ("ANY", None),
            Some(ToolChoice::None) => ("NONE", None),
            Some(ToolChoice::Tool { name }) => ("ANY", Some(vec![name.clone()])),
        };
        GeminiToolConfig {
            function_calling_config: GeminiFunctionCallingConfig {
                mode: mode.to_string(),
                allowed_function_names: allowed,
            },
        }
    }

    // ========================================================================
    // Format conversion: Gemini -> Internal
    // ========================================================================

    /// First candidate of a Gemini response as one model turn
    fn convert_response(&self, gemini_resp: GeminiResponse) -> Result<MessageResponse> {
        if let Some(err) = gemini_resp.error {
            anyhow::bail!("Gemini API error ({}): {}", err.status, err.message);
        }

        let candidate = gemini_resp
            .candidates
            .as_ref()
            .and_then(|c| c.first())
            .context("No candidates in Gemini response")?;

        let parts = candidate.content.as_ref().map(|c| &c.parts[..]).unwrap_or(&[]);
        let content_blocks = convert_gemini_parts_to_blocks(parts);

        let has_tool_use = content_blocks
            .iter()
            .any(|b| matches!(b, ContentBlock::ToolUse { .. }));
        let stop_reason = if has_tool_use {
            Some(StopReason::ToolUse)
        } else {
            candidate.finish_reason.as_deref().map(StopReason::from_finish_reason)
        };

        let usage = gemini_resp
            .usage_metadata
            .as_ref()
            .map(GeminiUsageMetadata::to_usage)
            .unwrap_or_default();

        Ok(MessageResponse {
            id: gemini_resp
                .response_id
                .unwrap_or_else(|| uuid::Uuid::new_v4().to_string()),
            role: "assistant".to_string(),
            content: content_blocks,
            model: gemini_resp.model_version.unwrap_or_else(|| self.model.clone()),
            stop_reason,
            usage,
        })
    }

    // ========================================================================
    // API methods
    // ========================================================================

    fn api_url_with_base(&self, base: &str, operation: &str) -> String {
        format!("{}/models/{}:{}", base, self.model, operation)
    }

    async fn post(
        &self,
        operation: &str,
        query: &str,
        request: &GeminiRequest,
        session_id: Option<&str>,
    ) -> Result<reqwest::Response> {
        let auth_config = self
            .auth
            .get_auth()
            .await
            .context("Failed to get authentication credentials")?;
        let api_base = auth_config.base_url.as_deref().unwrap_or(&self.api_base);
        let url = format!("{}{}", self.api_url_with_base(api_base, operation), query);

        let request_json =
            serde_json::to_string(request).context("Failed to serialize Gemini request")?;
        tracing::debug!("[Gemini] {} request JSON: {}", operation, request_json);

        let mut request_builder = self
            .client
            .post(&url)
            .header("Content-Type", "application/json")
            .header("x-goog-api-key", &auth_config.api_key);

        if let Some(sid) = session_id {
            request_builder = request_builder.header("X-Agent-Session-Id", sid);
        }

        request_builder
            .body(request_json)
            .send()
            .await
            .with_context(|| format!("Failed to send {} request to Gemini API", operation))
    }

    async fn send_gemini_request(&self, request: &GeminiRequest, session_id: Option<&str>) -> Result<GeminiResponse> {
        let response = self.post("generateContent", "", request, session_id).await?;

        let status = response.status();
        let response_text = response
            .text()
            .await
            .context("Failed to read Gemini response body")?;

        tracing::debug!("[Gemini] {} response: {}", status, response_text);

        if !status.is_success() {
            tracing::error!("[Gemini] API error: {} - {}", status, response_text);
            anyhow::bail!("Gemini API error ({}): {}", status, response_text);
        }

        serde_json::from_str(&response_text).context("Failed to parse Gemini API response")
    }

    async fn send_gemini_streaming_request(
        &self,
        request: &GeminiRequest,
        session_id: Option<&str>,
    ) -> Result<LlmEventStream> {
        let response = self
            .post("streamGenerateContent", "?alt=sse", request, session_id)
            .await?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Failed to read error body".to_string());
            tracing::error!("[Gemini] Streaming API error: {} - {}", status, error_text);
            anyhow::bail!("Gemini API error ({}): {}", status, error_text);
        }

        tracing::debug!("[Gemini] SSE stream open");

        let byte_stream = response.bytes_stream();
        let stream_reader = StreamReader::new(
            byte_stream.map(|result| result.map_err(|e| std::io::Error::other(e.to_string()))),
        );
        let buf_reader = tokio::io::BufReader::new(stream_reader);

        Ok(parse_sse_stream(buf_reader, self.model.clone()))
    }

    fn build_request(
        &self,
        messages: &[Message],
        system: &Option<SystemPrompt>,
        tools: &[ToolDefinition],
        tool_choice: &Option<ToolChoice>,
    ) -> GeminiRequest {
        let contents = self.convert_messages(messages);
        let system_instruction = self.convert_system_prompt(system);
        let gemini_tools = self.convert_tools(tools);
        let tool_config = gemini_tools
            .as_ref()
            .map(|_| self.convert_tool_config(tool_choice));

        GeminiRequest {
            contents,
            system_instruction,
            tools: gemini_tools,
            tool_config,
            generation_config: Some(GeminiGenerationConfig {
                max_output_tokens: Some(self.max_tokens),
                temperature: Some(1.0),
            }),
        }
    }
}

/// Merge consecutive contents with the same role (Gemini requires alternation)
fn merge_consecutive_roles(contents: Vec<GeminiContent>) -> Vec<GeminiContent> {
    let mut merged: Vec<GeminiContent> = Vec::new();

    for content in contents {
        if let Some(last) = merged.last_mut() {
            if last.role == content.role {
                last.parts.extend(content.parts);
                continue;
            }
        }
        merged.push(content);
    }

    merged
}

/// Recursively strip JSON Schema fields Gemini function declarations reject
fn clean_schema_for_gemini(value: &Value) -> Value {
    const UNSUPPORTED_FIELDS: &[&str] = &[
        "additionalProperties",
        "$schema",
        "definitions",
        "$ref",
        "patternProperties",
        "if", "then", "else",
        "allOf", "anyOf", "oneOf", "not",
        "default",
    ];

    match value {
        Value::Object(map) => {
            let mut cleaned = serde_json::Map::new();
            for (key, val) in map {
                if UNSUPPORTED_FIELDS.contains(&key.as_str()) {
                    continue;
                }
                cleaned.insert(key.clone(), clean_schema_for_gemini(val));
            }
            Value::Object(cleaned)
        }
        Value::Array(arr) => Value::Array(arr.iter().map(clean_schema_for_gemini).collect()),
        other => other.clone(),
    }
}

/// Gemini parts to content blocks; thought signatures stay on their tool use
fn convert_gemini_parts_to_blocks(parts: &[GeminiPart]) -> Vec<ContentBlock> {
    let mut blocks = Vec::new();

    for part in parts {
        if let Some(ref text) = part.text {
            // Thought summaries are never surfaced as reply text
            if part.thought != Some(true) && !text.is_empty() {
                blocks.push(ContentBlock::text(text.clone()));
            }
        }

        if let Some(ref fc) = part.function_call {
            blocks.push(
                ContentBlock::tool_use(new_tool_id(), fc.name.clone(), fc.args.clone())
                    .with_signature(part.thought_signature.clone()),
            );
        }
    }

    blocks
}

/// Kind of content block currently open in the SSE translation
#[derive(Debug, Clone, Copy, PartialEq)]
enum OpenBlock {
    Text,
    ToolUse,
}

/// Translate a Gemini SSE body into internal stream events
///
/// Every `data: ` line is one `GeminiResponse` chunk. Text parts become text
/// deltas (consecutive text shares one block), each function call becomes
/// its own tool-use block, and the first `finishReason` ends the stream.
fn parse_sse_stream<R>(reader: R, model: String) -> LlmEventStream
where
    R: AsyncBufRead + Unpin + Send + 'static,
{
    let stream = async_stream::try_stream! {
        let mut lines = reader.lines();
        let mut chunk_index: usize = 0;
        let mut block_index: usize = 0;
        let mut open: Option<OpenBlock> = None;
        let mut had_function = false;
        let mut finished = false;

        while let Some(line) = lines.next_line().await? {
            let data = match line.strip_prefix("data: ") {
                Some(data) if !data.is_empty() => data,
                _ => continue,
            };

            let gemini_resp: GeminiResponse = match serde_json::from_str(data) {
                Ok(r) => r,
                Err(e) => {
                    tracing::warn!("[Gemini] Failed to parse streaming chunk: {}", e);
                    continue;
                }
            };

            if let Some(err) = gemini_resp.error {
                yield StreamEvent::Error(err);
                break;
            }

            if chunk_index == 0 {
                yield StreamEvent::MessageStart(MessageStartEvent {
                    id: gemini_resp.response_id.clone().unwrap_or_default(),
                    model: model.clone(),
                    usage: gemini_resp
                        .usage_metadata
                        .as_ref()
                        .map(GeminiUsageMetadata::to_usage)
                        .unwrap_or_default(),
                });
            }

            for candidate in gemini_resp.candidates.iter().flatten() {
                let parts = candidate.content.as_ref().map(|c| &c.parts[..]).unwrap_or(&[]);
                for part in parts {
                    if let Some(ref text) = part.text {
                        if part.thought != Some(true) && !text.is_empty() {
                            if open != Some(OpenBlock::Text) {
                                if open.take().is_some() {
                                    yield StreamEvent::ContentBlockStop(ContentBlockStopEvent { index: block_index });
                                    block_index += 1;
                                }
                                yield StreamEvent::ContentBlockStart(ContentBlockStartEvent {
                                    index: block_index,
                                    content_block: ContentBlockStart::Text,
                                });
                                open = Some(OpenBlock::Text);
                            }
                            yield StreamEvent::ContentBlockDelta(ContentBlockDeltaEvent {
                                index: block_index,
                                delta: ContentDelta::TextDelta { text: text.clone() },
                            });
                        }
                    }

                    if let Some(ref fc) = part.function_call {
                        if open.take().is_some() {
                            yield StreamEvent::ContentBlockStop(ContentBlockStopEvent { index: block_index });
                            block_index += 1;
                        }

                        yield StreamEvent::ContentBlockStart(ContentBlockStartEvent {
                            index: block_index,
                            content_block: ContentBlockStart::ToolUse {
                                id: new_tool_id(),
                                name: fc.name.clone(),
                                signature: part.thought_signature.clone(),
                            },
                        });
                        yield StreamEvent::ContentBlockDelta(ContentBlockDeltaEvent {
                            index: block_index,
                            delta: ContentDelta::InputJsonDelta {
                                partial_json: serde_json::to_string(&fc.args)
                                    .unwrap_or_else(|_| "{}".to_string()),
                            },
                        });
                        open = Some(OpenBlock::ToolUse);
                        had_function = true;
                    }
                }

                if let Some(ref reason) = candidate.finish_reason {
                    tracing::debug!("[Gemini] Stream finished: {}", reason);

                    if open.take().is_some() {
                        yield StreamEvent::ContentBlockStop(ContentBlockStopEvent { index: block_index });
                        block_index += 1;
                    }

                    let stop_reason = if had_function {
                        StopReason::ToolUse
                    } else {
                        StopReason::from_finish_reason(reason)
                    };

                    yield StreamEvent::MessageDelta(MessageDeltaEvent {
                        stop_reason: Some(stop_reason),
                        output_tokens: gemini_resp
                            .usage_metadata
                            .as_ref()
                            .map(|u| u.candidates_token_count)
                            .unwrap_or(0),
                    });
                    finished = true;
                }
            }

            chunk_index += 1;
            if finished {
                break;
            }
        }

        tracing::debug!("[Gemini] Stream: ended after {} chunks, finished={}", chunk_index, finished);

        if open.is_some() {
            yield StreamEvent::ContentBlockStop(ContentBlockStopEvent { index: block_index });
        }
        yield StreamEvent::MessageStop;
    };

    Box::pin(stream)
}

// ============================================================================
// LlmProvider implementation
// ============================================================================

#[async_trait::async_trait]
impl LlmProvider for GeminiProvider {
    async fn send_with_tools_and_system(
        &self,
        messages: Vec<Message>,
        system: Option<SystemPrompt>,
        tools: Vec<ToolDefinition>,
        tool_choice: Option<ToolChoice>,
        session_id: Option<&str>,
    ) -> Result<MessageResponse> {
        tracing::info!(
            "[Gemini] generateContent: {} messages, {} tools",
            messages.len(),
            tools.len()
        );

        let request = self.build_request(&messages, &system, &tools, &tool_choice);
        let gemini_response = self.send_gemini_request(&request, session_id).await?;
        self.convert_response(gemini_response)
    }

    async fn stream_with_tools_and_system(
        &self,
        messages: Vec<Message>,
        system: Option<SystemPrompt>,
        tools: Vec<ToolDefinition>,
        tool_choice: Option<ToolChoice>,
        session_id: Option<&str>,
    ) -> Result<LlmEventStream> {
        tracing::info!(
            "[Gemini] streamGenerateContent: {} messages, {} tools",
            messages.len(),
            tools.len()
        );

        let request = self.build_request(&messages, &system, &tools, &tool_choice);
        self.send_gemini_streaming_request(&request, session_id).await
    }

    fn model(&self) -> String {
        self.model.clone()
    }

    fn provider_name(&self) -> &str {
        "gemini"
    }
}
