//! File manager agent
//!
//! A small agent that tells users, in conversational language, which files
//! they have uploaded to a Gemini File Search store.
//!
//! ```ignore
//! let config = FileManagerConfig::from_env()?;
//! let llm = Arc::new(GeminiProvider::new(&config.api_key)?.with_model(&config.model));
//! let files = Arc::new(GeminiFileSearchProvider::new(&config.api_key));
//! let agent = FileManagerAgent::new("docs", cache, llm, files, &config);
//! println!("{}", agent.reply().await);
//! ```

pub mod core;
pub mod session;
pub mod runtime;
pub mod tools;
pub mod files;

pub mod llm;
pub mod logging;
pub mod config;
pub mod prompts;

// Agent definition and loop
pub mod agent;

// Conversational entry point
pub mod file_manager;

pub use config::FileManagerConfig;
pub use file_manager::{FileManagerAgent, ResponderError};
pub use prompts::FileManagerPrompts;
