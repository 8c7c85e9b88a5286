//! Uploaded file listing
//!
//! - `FileRecord` - one uploaded file (name and upload time)
//! - `StoreNameCache` - display name → store resource name
//! - `FileProvider` - source of file records for a store
//! - `GeminiFileSearchProvider` - lists documents of a Gemini File Search store
//! - `StaticFileProvider` - fixed list, for demos and tests

mod file_search;

use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

pub use file_search::GeminiFileSearchProvider;

/// Maps a store's display name to its resource name (`fileSearchStores/...`)
pub type StoreNameCache = HashMap<String, String>;

/// A previously uploaded file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileRecord {
    /// File name as shown to the user
    pub name: String,

    /// When the file was uploaded
    pub uploaded_at: DateTime<Utc>,
}

impl FileRecord {
    pub fn new(name: impl Into<String>, uploaded_at: DateTime<Utc>) -> Self {
        Self {
            name: name.into(),
            uploaded_at,
        }
    }
}

/// Source of uploaded file records
///
/// The cache is owned by the caller and only read.
#[async_trait]
pub trait FileProvider: Send + Sync {
    /// List every file in the store named `store_name`
    async fn list_files(&self, store_name: &str, cache: &StoreNameCache) -> Result<Vec<FileRecord>>;
}

/// Provider returning the same records for every store
#[derive(Debug, Clone, Default)]
pub struct StaticFileProvider {
    files: Vec<FileRecord>,
}

impl StaticFileProvider {
    pub fn new(files: Vec<FileRecord>) -> Self {
        Self { files }
    }
}

#[async_trait]
impl FileProvider for StaticFileProvider {
    async fn list_files(&self, _store_name: &str, _cache: &StoreNameCache) -> Result<Vec<FileRecord>> {
        Ok(self.files.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_file_record_serialization() {
        let record = FileRecord::new("report.pdf", Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap());
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["name"], "report.pdf");
        assert_eq!(json["uploaded_at"], "2024-01-01T00:00:00Z");
    }

    #[tokio::test]
    async fn test_static_provider_returns_records_in_order() {
        let t = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let provider = StaticFileProvider::new(vec![
            FileRecord::new("b.txt", t),
            FileRecord::new("a.txt", t),
        ]);
        let files = provider.list_files("docs", &StoreNameCache::new()).await.unwrap();
        let names: Vec<&str> = files.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["b.txt", "a.txt"]);
    }
}
