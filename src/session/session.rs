//! Conversation session
//!
//! A `Session` is keyed by application, user and session ID and holds the
//! ordered list of events of one conversation.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::llm::Message;

use super::event::Event;

/// Identity of a session within a session service
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionKey {
    pub app_name: String,
    pub user_id: String,
    pub session_id: String,
}

impl SessionKey {
    pub fn new(
        app_name: impl Into<String>,
        user_id: impl Into<String>,
        session_id: impl Into<String>,
    ) -> Self {
        Self {
            app_name: app_name.into(),
            user_id: user_id.into(),
            session_id: session_id.into(),
        }
    }
}

impl fmt::Display for SessionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}/{}", self.app_name, self.user_id, self.session_id)
    }
}

/// A conversation session
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    /// Application the session belongs to
    pub app_name: String,

    /// User that owns the session
    pub user_id: String,

    /// Session ID (unique per app/user)
    pub id: String,

    /// Conversation events in arrival order
    pub events: Vec<Event>,

    /// When the session was created
    pub created_at: DateTime<Utc>,

    /// When the last event was appended
    pub last_update_time: DateTime<Utc>,
}

impl Session {
    /// Create an empty session
    pub fn new(
        app_name: impl Into<String>,
        user_id: impl Into<String>,
        id: impl Into<String>,
    ) -> Self {
        let now = Utc::now();
        Self {
            app_name: app_name.into(),
            user_id: user_id.into(),
            id: id.into(),
            events: Vec::new(),
            created_at: now,
            last_update_time: now,
        }
    }

    /// Key identifying this session
    pub fn key(&self) -> SessionKey {
        SessionKey::new(&self.app_name, &self.user_id, &self.id)
    }

    /// Append an event and bump the update time
    pub fn append_event(&mut self, event: Event) {
        self.last_update_time = event.timestamp.max(self.last_update_time);
        self.events.push(event);
    }

    /// Conversation history as LLM messages
    pub fn history(&self) -> Vec<Message> {
        self.events
            .iter()
            .filter_map(|e| e.content.clone())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::ContentBlock;

    #[test]
    fn test_new_session_is_empty() {
        let session = Session::new("file_manager", "user_docs", "s1");
        assert!(session.events.is_empty());
        assert_eq!(session.key().to_string(), "file_manager/user_docs/s1");
        assert_eq!(session.created_at, session.last_update_time);
    }

    #[test]
    fn test_history_follows_event_order() {
        let mut session = Session::new("file_manager", "user_docs", "s1");
        session.append_event(Event::new("inv", "user", Message::user("hi")));
        session.append_event(Event::new(
            "inv",
            "file_manager",
            Message::assistant_with_blocks(vec![ContentBlock::text("hello")]),
        ));

        let history = session.history();
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].role, "user");
        assert_eq!(history[1].role, "assistant");
        assert!(session.last_update_time >= session.created_at);
    }
}
