//! Session events
//!
//! Every unit of output the runner produces (model replies, tool results)
//! and every user message is recorded on the session as an `Event`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::llm::{ContentBlock, Message};

/// Author used for events carrying the caller's message
pub const USER_AUTHOR: &str = "user";

/// One unit of conversation output
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Event {
    /// Unique event ID
    pub id: String,

    /// ID of the `run_async` invocation that produced this event
    pub invocation_id: String,

    /// "user" or the name of the agent that produced the event
    pub author: String,

    /// Message payload (absent for pure bookkeeping events)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<Message>,

    /// When the event was produced
    pub timestamp: DateTime<Utc>,
}

impl Event {
    /// Create an event carrying a message
    pub fn new(invocation_id: impl Into<String>, author: impl Into<String>, content: Message) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            invocation_id: invocation_id.into(),
            author: author.into(),
            content: Some(content),
            timestamp: Utc::now(),
        }
    }

    /// Non-empty text fragments of the content, in order
    pub fn text_fragments(&self) -> Vec<&str> {
        self.content
            .as_ref()
            .map(|c| c.text_parts())
            .unwrap_or_default()
    }

    /// Tool calls requested in this event as `(id, name, input)`
    pub fn tool_uses(&self) -> Vec<(&str, &str, &Value)> {
        self.content
            .as_ref()
            .and_then(|c| c.blocks())
            .map(|blocks| blocks.iter().filter_map(ContentBlock::as_tool_use).collect())
            .unwrap_or_default()
    }

    /// Whether this event was authored by the caller
    pub fn is_user(&self) -> bool {
        self.author == USER_AUTHOR
    }
}
