//! Errors raised by session services and the runner

use thiserror::Error;

#[derive(Error, Debug)]
pub enum FrameworkError {
    /// No session under the given app/user/session key
    #[error("Session not found: {0}")]
    SessionNotFound(String),

    /// Creating a session whose key is already taken
    #[error("Session already exists: {0}")]
    SessionAlreadyExists(String),

    /// Session backend could not be reached or failed the operation
    #[error("Session storage error: {0}")]
    Storage(String),
}

impl FrameworkError {
    pub fn storage(msg: impl Into<String>) -> Self {
        FrameworkError::Storage(msg.into())
    }
}

pub type FrameworkResult<T> = Result<T, FrameworkError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = FrameworkError::SessionNotFound("file_manager/user_docs/list_files_1".into());
        assert_eq!(err.to_string(), "Session not found: file_manager/user_docs/list_files_1");

        let err = FrameworkError::storage("connection reset");
        assert_eq!(err.to_string(), "Session storage error: connection reset");
    }

    #[test]
    fn test_error_into_anyhow_keeps_message() {
        let err: anyhow::Error = FrameworkError::SessionAlreadyExists("a/b/c".into()).into();
        assert_eq!(err.to_string(), "Session already exists: a/b/c");
    }
}
