//! Shared error type of the session layer and the runner

pub mod error;

pub use error::{FrameworkError, FrameworkResult};
