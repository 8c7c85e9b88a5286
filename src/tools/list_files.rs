//! `list_files` tool
//!
//! Lists the files uploaded to the store the tool was bound to.

use anyhow::Result;
use async_trait::async_trait;
use serde_json::{json, Value};
use std::sync::Arc;

use super::tool::{Tool, ToolResult};
use crate::files::{FileProvider, StoreNameCache};

pub const LIST_FILES_TOOL_NAME: &str = "list_files";

const LIST_FILES_DESCRIPTION: &str = "列出使用者已上傳的所有文件檔案，包含檔案名稱和上傳時間。";

/// Tool listing uploaded files of one store
pub struct ListFilesTool {
    store_name: String,
    cache: Arc<StoreNameCache>,
    provider: Arc<dyn FileProvider>,
}

impl ListFilesTool {
    /// Bind the tool to a store, its name cache and a file provider
    pub fn new(
        store_name: impl Into<String>,
        cache: Arc<StoreNameCache>,
        provider: Arc<dyn FileProvider>,
    ) -> Self {
        Self {
            store_name: store_name.into(),
            cache,
            provider,
        }
    }
}

#[async_trait]
impl Tool for ListFilesTool {
    fn name(&self) -> &str {
        LIST_FILES_TOOL_NAME
    }

    fn description(&self) -> &str {
        LIST_FILES_DESCRIPTION
    }

    async fn execute(&self, _input: &Value) -> Result<ToolResult> {
        match self.provider.list_files(&self.store_name, &self.cache).await {
            Ok(files) => {
                tracing::info!(
                    "[ListFiles] {} files in store '{}'",
                    files.len(),
                    self.store_name
                );
                Ok(ToolResult::success(json!({ "files": files }).to_string()))
            }
            Err(e) => {
                tracing::warn!("[ListFiles] Listing store '{}' failed: {:#}", self.store_name, e);
                Ok(ToolResult::error(format!("Failed to list files: {:#}", e)))
            }
        }
    }
}
