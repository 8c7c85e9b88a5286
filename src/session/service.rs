//! Session services
//!
//! `SessionService` is the seam the runner and the file manager use to
//! create and look up sessions. `InMemorySessionService` keeps everything in
//! process memory; sessions do not survive a restart.

use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;

use crate::core::{FrameworkError, FrameworkResult};

use super::event::Event;
use super::session::{Session, SessionKey};

/// Creates, stores and retrieves conversation sessions
#[async_trait]
pub trait SessionService: Send + Sync {
    /// Create a new session
    ///
    /// When `session_id` is `None` a random ID is generated. Fails with
    /// `SessionAlreadyExists` if the key is taken.
    async fn create_session(
        &self,
        app_name: &str,
        user_id: &str,
        session_id: Option<&str>,
    ) -> FrameworkResult<Session>;

    /// Get a snapshot of a session
    async fn get_session(&self, app_name: &str, user_id: &str, session_id: &str) -> FrameworkResult<Session>;

    /// Append an event to a session
    async fn append_event(&self, session: &SessionKey, event: Event) -> FrameworkResult<()>;

    /// Delete a session
    async fn delete_session(&self, app_name: &str, user_id: &str, session_id: &str) -> FrameworkResult<()>;

    /// List all sessions of a user
    async fn list_sessions(&self, app_name: &str, user_id: &str) -> FrameworkResult<Vec<Session>>;
}

/// Session service backed by a process-local map
#[derive(Debug, Default)]
pub struct InMemorySessionService {
    sessions: RwLock<HashMap<SessionKey, Session>>,
}

impl InMemorySessionService {
    /// Create an empty session service
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether no sessions are stored
    pub async fn is_empty(&self) -> bool {
        self.sessions.read().await.is_empty()
    }
}

#[async_trait]
impl SessionService for InMemorySessionService {
    async fn create_session(
        &self,
        app_name: &str,
        user_id: &str,
        session_id: Option<&str>,
    ) -> FrameworkResult<Session> {
        let id = session_id
            .map(str::to_string)
            .unwrap_or_else(|| uuid::Uuid::new_v4().to_string());
        let key = SessionKey::new(app_name, user_id, &id);

        let mut sessions = self.sessions.write().await;
        if sessions.contains_key(&key) {
            return Err(FrameworkError::SessionAlreadyExists(key.to_string()));
        }

        let session = Session::new(app_name, user_id, id);
        tracing::debug!("[SessionService] Created session {}", key);
        sessions.insert(key, session.clone());

        Ok(session)
    }

    async fn get_session(&self, app_name: &str, user_id: &str, session_id: &str) -> FrameworkResult<Session> {
        let key = SessionKey::new(app_name, user_id, session_id);
        self.sessions
            .read()
            .await
            .get(&key)
            .cloned()
            .ok_or_else(|| FrameworkError::SessionNotFound(key.to_string()))
    }

    async fn append_event(&self, session: &SessionKey, event: Event) -> FrameworkResult<()> {
        let mut sessions = self.sessions.write().await;
        let stored = sessions
            .get_mut(session)
            .ok_or_else(|| FrameworkError::SessionNotFound(session.to_string()))?;
        stored.append_event(event);
        Ok(())
    }

    async fn delete_session(&self, app_name: &str, user_id: &str, session_id: &str) -> FrameworkResult<()> {
        let key = SessionKey::new(app_name, user_id, session_id);
        match self.sessions.write().await.remove(&key) {
            Some(_) => {
                tracing::debug!("[SessionService] Deleted session {}", key);
                Ok(())
            }
            None => Err(FrameworkError::SessionNotFound(key.to_string())),
        }
    }

    async fn list_sessions(&self, app_name: &str, user_id: &str) -> FrameworkResult<Vec<Session>> {
        let sessions = self.sessions.read().await;
        let mut listed: Vec<Session> = sessions
            .values()
            .filter(|s| s.app_name == app_name && s.user_id == user_id)
            .cloned()
            .collect();
        listed.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        Ok(listed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::Message;

    #[tokio::test]
    async fn test_create_and_get_session() {
        let service = InMemorySessionService::new();
        let created = service
            .create_session("file_manager", "user_docs", Some("s1"))
            .await
            .unwrap();
        assert_eq!(created.id, "s1");

        let fetched = service
            .get_session("file_manager", "user_docs", "s1")
            .await
            .unwrap();
        assert_eq!(fetched.key(), created.key());
    }

    #[tokio::test]
    async fn test_duplicate_session_is_rejected() {
        let service = InMemorySessionService::new();
        service
            .create_session("file_manager", "user_docs", Some("s1"))
            .await
            .unwrap();

        let err = service
            .create_session("file_manager", "user_docs", Some("s1"))
            .await
            .unwrap_err();
        assert!(matches!(err, FrameworkError::SessionAlreadyExists(_)));

        // Same id under another user is a different session
        assert!(service
            .create_session("file_manager", "user_other", Some("s1"))
            .await
            .is_ok());
    }

    #[tokio::test]
    async fn test_generated_session_ids_are_unique() {
        let service = InMemorySessionService::new();
        let a = service.create_session("app", "u", None).await.unwrap();
        let b = service.create_session("app", "u", None).await.unwrap();
        assert_ne!(a.id, b.id);
        assert_eq!(service.list_sessions("app", "u").await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_append_event_and_delete() {
        let service = InMemorySessionService::new();
        let session = service.create_session("app", "u", Some("s")).await.unwrap();

        service
            .append_event(&session.key(), Event::new("inv", "user", Message::user("hi")))
            .await
            .unwrap();
        let fetched = service.get_session("app", "u", "s").await.unwrap();
        assert_eq!(fetched.events.len(), 1);

        service.delete_session("app", "u", "s").await.unwrap();
        assert!(service.is_empty().await);
        assert!(matches!(
            service.get_session("app", "u", "s").await,
            Err(FrameworkError::SessionNotFound(_))
        ));
        assert!(service.delete_session("app", "u", "s").await.is_err());
    }

    #[tokio::test]
    async fn test_append_to_missing_session_fails() {
        let service = InMemorySessionService::new();
        let key = SessionKey::new("app", "u", "missing");
        let err = service
            .append_event(&key, Event::new("inv", "user", Message::user("hi")))
            .await
            .unwrap_err();
        assert!(matches!(err, FrameworkError::SessionNotFound(_)));
    }
}
