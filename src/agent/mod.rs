//! Agent definition and the per-turn agent loop

pub mod config;
pub mod executor;
pub mod standard_loop;

pub use config::AgentConfig;
pub use executor::ToolExecutor;
pub use standard_loop::StandardAgent;
