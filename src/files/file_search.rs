//! Gemini File Search store listing
//!
//! Lists the documents of a File Search store through
//! `GET {api_base}/{store}/documents`, following `nextPageToken` until the
//! listing is exhausted.

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::Client;
use serde::Deserialize;
use std::collections::HashSet;
use std::future::Future;
use std::sync::Arc;

use super::{FileProvider, FileRecord, StoreNameCache};
use crate::llm::auth::{auth_provider, AuthConfig, AuthSource};
use crate::llm::gemini::DEFAULT_API_BASE;

const STORE_RESOURCE_PREFIX: &str = "fileSearchStores/";

/// Largest page the documents endpoint accepts
const MAX_PAGE_SIZE: u32 = 20;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ListDocumentsResponse {
    #[serde(default)]
    documents: Vec<FileSearchDocument>,
    next_page_token: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct FileSearchDocument {
    name: String,
    display_name: Option<String>,
    create_time: DateTime<Utc>,
}

impl From<FileSearchDocument> for FileRecord {
    fn from(doc: FileSearchDocument) -> Self {
        let name = match doc.display_name {
            Some(display) if !display.is_empty() => display,
            _ => doc.name,
        };
        FileRecord::new(name, doc.create_time)
    }
}

/// Lists uploaded files of a Gemini File Search store
pub struct GeminiFileSearchProvider {
    client: Client,
    auth: AuthSource,
    api_base: String,
}

impl GeminiFileSearchProvider {
    /// Create a provider authenticating with a static API key
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            auth: AuthSource::Static(AuthConfig::new(api_key)),
            api_base: DEFAULT_API_BASE.to_string(),
        }
    }

    /// Create a provider that asks `provider` for credentials before each request
    pub fn with_auth_provider<F, Fut>(provider: F) -> Self
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<AuthConfig>> + Send + 'static,
    {
        Self {
            client: Client::new(),
            auth: AuthSource::Dynamic(Arc::new(auth_provider(provider))),
            api_base: DEFAULT_API_BASE.to_string(),
        }
    }

    /// Set the API base URL used when the auth source does not override it
    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into();
        self
    }

    /// Resolve a display name to the store's resource name
    fn resolve_store(store_name: &str, cache: &StoreNameCache) -> Result<String> {
        if let Some(resource) = cache.get(store_name) {
            return Ok(resource.clone());
        }
        if store_name.starts_with(STORE_RESOURCE_PREFIX) {
            return Ok(store_name.to_string());
        }
        anyhow::bail!("File search store '{}' not found", store_name)
    }

    async fn fetch_page(&self, store: &str, page_token: Option<&str>) -> Result<ListDocumentsResponse> {
        let auth_config = self
            .auth
            .get_auth()
            .await
            .context("Failed to get authentication credentials")?;
        let api_base = auth_config.base_url.as_deref().unwrap_or(&self.api_base);
        let url = format!("{}/{}/documents", api_base, store);

        let mut query = vec![("pageSize", MAX_PAGE_SIZE.to_string())];
        if let Some(token) = page_token {
            query.push(("pageToken", token.to_string()));
        }

        let response = self
            .client
            .get(&url)
            .query(&query)
            .header("x-goog-api-key", &auth_config.api_key)
            .send()
            .await
            .context("Failed to send document listing request")?;

        let status = response.status();
        let body = response
            .text()
            .await
            .context("Failed to read document listing body")?;

        if !status.is_success() {
            tracing::error!("[FileSearch] API error: {} - {}", status, body);
            anyhow::bail!("File search API error ({}): {}", status, body);
        }

        serde_json::from_str(&body).context("Failed to parse document listing")
    }
}

#[async_trait]
impl FileProvider for GeminiFileSearchProvider {
    async fn list_files(&self, store_name: &str, cache: &StoreNameCache) -> Result<Vec<FileRecord>> {
        let store = Self::resolve_store(store_name, cache)?;
        tracing::info!("[FileSearch] Listing documents of {}", store);

        let store_ref = store.as_str();
        let files = collect_pages(|token| async move {
            self.fetch_page(store_ref, token.as_deref()).await
        })
        .await?;

        tracing::info!("[FileSearch] Found {} documents in {}", files.len(), store);
        Ok(files)
    }
}

/// Follow `nextPageToken` from the first page until the listing ends
///
/// A token the backend already handed out ends the listing as well, so a
/// misbehaving backend cannot keep the loop alive.
async fn collect_pages<F, Fut>(mut fetch: F) -> Result<Vec<FileRecord>>
where
    F: FnMut(Option<String>) -> Fut,
    Fut: Future<Output = Result<ListDocumentsResponse>>,
{
    let mut files = Vec::new();
    let mut seen_tokens = HashSet::new();
    let mut page_token: Option<String> = None;

    loop {
        let page = fetch(page_token.take()).await?;
        files.extend(page.documents.into_iter().map(FileRecord::from));

        match page.next_page_token {
            Some(token) if token.is_empty() => break,
            Some(token) if !seen_tokens.insert(token.clone()) => {
                tracing::warn!("[FileSearch] Page token '{}' repeated, stopping", token);
                break;
            }
            Some(token) => page_token = Some(token),
            None => break,
        }
    }

    Ok(files)
}
