//! Running agents over sessions
//!
//! `Runner::run_async` records the caller's message on a session and returns
//! the ordered stream of events the agent produces in response.

pub mod runner;

pub use runner::{EventStream, Runner};
