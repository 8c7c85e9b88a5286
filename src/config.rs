//! Runtime configuration read from the environment

use std::path::PathBuf;

use anyhow::{Context, Result};

use crate::llm::gemini::DEFAULT_API_BASE;
use crate::prompts::FileManagerPrompts;

/// Application name sessions are registered under
pub const APP_NAME: &str = "file_manager";

pub const DEFAULT_MODEL: &str = "gemini-2.5-flash";
pub const DEFAULT_MAX_TOKENS: u32 = 8192;
pub const DEFAULT_MAX_TOOL_ITERATIONS: usize = 10;

/// Configuration of the file manager agent
#[derive(Debug, Clone)]
pub struct FileManagerConfig {
    /// Google API key (`GOOGLE_API_KEY`), may be empty
    pub api_key: String,
    /// Gemini model name (`FILE_MANAGER_MODEL`)
    pub model: String,
    /// Output token limit (`FILE_MANAGER_MAX_TOKENS`)
    pub max_tokens: u32,
    /// API base URL (`GEMINI_API_BASE`)
    pub api_base: String,
    /// Request streaming responses (`FILE_MANAGER_STREAMING`)
    pub streaming: bool,
    pub app_name: String,
    pub max_tool_iterations: usize,
    pub prompts: FileManagerPrompts,
}

impl Default for FileManagerConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            model: DEFAULT_MODEL.to_string(),
            max_tokens: DEFAULT_MAX_TOKENS,
            api_base: DEFAULT_API_BASE.to_string(),
            streaming: false,
            app_name: APP_NAME.to_string(),
            max_tool_iterations: DEFAULT_MAX_TOOL_ITERATIONS,
            prompts: FileManagerPrompts::default(),
        }
    }
}

impl FileManagerConfig {
    /// Build the configuration from environment variables
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let mut config = Self::default();

        if let Some(key) = lookup("GOOGLE_API_KEY") {
            config.api_key = key;
        }
        if let Some(model) = lookup("FILE_MANAGER_MODEL").filter(|m| !m.is_empty()) {
            config.model = model;
        }
        if let Some(raw) = lookup("FILE_MANAGER_MAX_TOKENS") {
            config.max_tokens = raw
                .parse()
                .with_context(|| format!("Invalid FILE_MANAGER_MAX_TOKENS: {}", raw))?;
        }
        if let Some(base) = lookup("GEMINI_API_BASE").filter(|b| !b.is_empty()) {
            config.api_base = base.trim_end_matches('/').to_string();
        }
        if let Some(raw) = lookup("FILE_MANAGER_STREAMING") {
            config.streaming = matches!(raw.to_ascii_lowercase().as_str(), "1" | "true");
        }
        if let Some(path) = lookup("FILE_MANAGER_PROMPTS").filter(|p| !p.is_empty()) {
            config.prompts = FileManagerPrompts::from_json_file(PathBuf::from(path))?;
        }

        if config.api_key.is_empty() {
            tracing::warn!("[Config] GOOGLE_API_KEY is not set");
        }

        Ok(config)
    }
}
