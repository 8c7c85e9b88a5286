pub mod auth;
pub mod gemini;
pub mod provider;
pub mod types;

pub use auth::{auth_provider, AuthConfig, AuthProvider};
pub use gemini::GeminiProvider;
pub use provider::{LlmEventStream, LlmProvider};
pub use types::{
    ContentBlock, ContentBlockDeltaEvent, ContentBlockStart, ContentBlockStartEvent,
    ContentBlockStopEvent, ContentDelta, Message, MessageContent, MessageDeltaEvent,
    MessageResponse, MessageStartEvent, StopReason, StreamError, StreamEvent, SystemPrompt,
    ToolChoice, ToolDefinition, ToolInputSchema, Usage,
};
