//! User-facing texts of the file manager agent
//!
//! Defaults are Traditional Chinese. A deployment can replace any of them
//! with a JSON file (`FILE_MANAGER_PROMPTS`); missing keys keep the default.

use std::fmt::Display;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

const DEFAULT_DESCRIPTION: &str = "檔案管理助手，幫助使用者查看和管理已上傳的文件。";

const DEFAULT_INSTRUCTION: &str = "你是一個友善的檔案管理助手。
當使用者想要查看檔案時，使用 list_files 工具獲取檔案清單。
請用自然、口語化的方式向使用者介紹這些檔案，不要使用條列式，用對話的方式說明。
讓使用者感覺像在跟朋友聊天一樣。";

const DEFAULT_LIST_FILES_REQUEST: &str = "請列出所有已上傳的檔案";
const DEFAULT_EMPTY_REPLY: &str = "目前沒有找到任何檔案唷！";
const DEFAULT_ERROR_PREFIX: &str = "查詢檔案時發生了一點問題";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileManagerPrompts {
    /// Agent description
    pub description: String,
    /// System instruction given to the model
    pub instruction: String,
    /// Message sent on behalf of the user
    pub list_files_request: String,
    /// Reply when the run produced no text
    pub empty_reply: String,
    /// Lead-in of the apology returned on failure
    pub error_prefix: String,
}

impl Default for FileManagerPrompts {
    fn default() -> Self {
        Self {
            description: DEFAULT_DESCRIPTION.to_string(),
            instruction: DEFAULT_INSTRUCTION.to_string(),
            list_files_request: DEFAULT_LIST_FILES_REQUEST.to_string(),
            empty_reply: DEFAULT_EMPTY_REPLY.to_string(),
            error_prefix: DEFAULT_ERROR_PREFIX.to_string(),
        }
    }
}

impl FileManagerPrompts {
    /// Load prompts from a JSON file
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read prompts file {}", path.display()))?;
        serde_json::from_str(&raw)
            .with_context(|| format!("Failed to parse prompts file {}", path.display()))
    }

    /// Apology shown to the user when a request fails
    pub fn error_reply(&self, err: &impl Display) -> String {
        format!("{}：{}", self.error_prefix, err)
    }
}
