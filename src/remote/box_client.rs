use std::sync::Arc;

use reqwest::{Client, RequestBuilder, Response};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::remote::auth::TokenProvider;
use crate::remote::error::{RemoteError, Result};
use crate::remote::folder_list::{FolderList, PageFetcher, PagedListing};
use crate::remote::remote_client::RemoteClient;
use crate::remote::types::{FileInfo, FolderInfo, ItemEntry, ItemPage};

/// Base URL of the Box Content API.
pub const DEFAULT_API_URL: &str = "https://api.box.com/2.0";

/// Largest page the items endpoint accepts.
pub const MAX_PAGE_SIZE: u32 = 1000;

/// Fields requested for every item so listings carry name and size.
const ITEM_FIELDS: &str = "type,id,name,size";

/// Configuration for BoxClient.
#[derive(Debug, Clone)]
pub struct BoxClientConfig {
    /// API base URL, without a trailing slash.
    pub api_url: String,
    /// Number of children requested per listing page.
    pub page_size: u32,
}

impl Default for BoxClientConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            page_size: MAX_PAGE_SIZE,
        }
    }
}

impl BoxClientConfig {
    /// Set the API base URL.
    pub fn with_api_url(mut self, api_url: impl Into<String>) -> Self {
        self.api_url = api_url.into().trim_end_matches('/').to_string();
        self
    }

    /// Set the listing page size, clamped to what the API accepts.
    pub fn with_page_size(mut self, page_size: u32) -> Self {
        self.page_size = page_size.clamp(1, MAX_PAGE_SIZE);
        self
    }
}

/// Inner state for BoxClient, wrapped in Arc for sharing with listings.
struct BoxClientInner {
    http: Client,
    api_url: String,
    page_size: u32,
    tokens: Arc<dyn TokenProvider>,
}

/// A `RemoteClient` backed by the Box Content API.
///
/// Listings use marker-based paging and fetch one page at a time as entries
/// are consumed. Folder copies are performed server-side by the provider.
#[derive(Clone)]
pub struct BoxClient {
    inner: Arc<BoxClientInner>,
}

#[derive(Debug, Deserialize)]
struct ItemJson {
    #[serde(rename = "type")]
    item_type: String,
    id: String,
    #[serde(default)]
    name: String,
    #[serde(default)]
    size: Option<u64>,
}

#[derive(Debug, Deserialize)]
struct ItemCollectionJson {
    #[serde(default)]
    entries: Vec<ItemJson>,
    #[serde(default)]
    next_marker: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorJson {
    #[serde(default)]
    code: Option<String>,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    request_id: Option<String>,
}

#[derive(Serialize)]
struct ParentJson<'a> {
    id: &'a str,
}

#[derive(Serialize)]
struct CopyRequestJson<'a> {
    parent: ParentJson<'a>,
}

impl BoxClient {
    /// Create a new client using the given token provider.
    pub fn new(config: BoxClientConfig, tokens: Arc<dyn TokenProvider>) -> Self {
        Self::with_client(Client::new(), config, tokens)
    }

    /// Create a new client with a custom reqwest client.
    pub fn with_client(http: Client, config: BoxClientConfig, tokens: Arc<dyn TokenProvider>) -> Self {
        Self {
            inner: Arc::new(BoxClientInner {
                http,
                api_url: config.api_url.trim_end_matches('/').to_string(),
                page_size: config.page_size.clamp(1, MAX_PAGE_SIZE),
                tokens,
            }),
        }
    }
}

impl BoxClientInner {
    fn folder_url(&self, folder_id: &str) -> String {
        format!("{}/folders/{}", self.api_url, folder_id)
    }

    fn items_url(&self, folder_id: &str) -> String {
        format!("{}/folders/{}/items", self.api_url, folder_id)
    }

    fn copy_url(&self, folder_id: &str) -> String {
        format!("{}/folders/{}/copy", self.api_url, folder_id)
    }

    /// Authorize and send a request, turning non-success statuses into errors.
    async fn send(&self, request: RequestBuilder) -> Result<Response> {
        let token = self.tokens.access_token().await?;
        let response = request.bearer_auth(token).send().await?;

        let status = response.status();
        if status.is_success() {
            Ok(response)
        } else {
            let body = response.text().await.unwrap_or_default();
            Err(parse_api_error(status.as_u16(), &body))
        }
    }

    async fn fetch_items(&self, folder_id: &str, marker: Option<&str>) -> Result<ItemPage> {
        let limit = self.page_size.to_string();
        let mut query = vec![
            ("fields", ITEM_FIELDS),
            ("limit", limit.as_str()),
            ("usemarker", "true"),
        ];
        if let Some(marker) = marker {
            query.push(("marker", marker));
        }

        debug!(folder_id, marker, "fetching folder items page");
        let response = self
            .send(self.http.get(self.items_url(folder_id)).query(&query))
            .await?;
        let collection: ItemCollectionJson = response
            .json()
            .await
            .map_err(|e| RemoteError::InvalidResponse(format!("folder items: {}", e)))?;

        Ok(item_page_from_json(collection))
    }
}

impl RemoteClient for BoxClient {
    async fn list_folder(&self, folder_id: &str) -> Result<FolderList> {
        Ok(FolderList::new(PagedListing::new(BoxPageFetcher {
            inner: Arc::clone(&self.inner),
            folder_id: folder_id.to_string(),
        })))
    }

    async fn get_folder_info(&self, folder_id: &str) -> Result<FolderInfo> {
        let response = self
            .inner
            .send(
                self.inner
                    .http
                    .get(self.inner.folder_url(folder_id))
                    .query(&[("fields", ITEM_FIELDS)]),
            )
            .await?;
        let item: ItemJson = response
            .json()
            .await
            .map_err(|e| RemoteError::InvalidResponse(format!("folder info: {}", e)))?;

        folder_info_from_json(item)
    }

    async fn copy_folder(&self, folder_id: &str, destination_id: &str) -> Result<FolderInfo> {
        let body = CopyRequestJson {
            parent: ParentJson { id: destination_id },
        };
        let response = self
            .inner
            .send(
                self.inner
                    .http
                    .post(self.inner.copy_url(folder_id))
                    .query(&[("fields", ITEM_FIELDS)])
                    .json(&body),
            )
            .await?;
        let item: ItemJson = response
            .json()
            .await
            .map_err(|e| RemoteError::InvalidResponse(format!("copied folder: {}", e)))?;

        folder_info_from_json(item)
    }
}

/// Fetches pages of one folder's items.
struct BoxPageFetcher {
    inner: Arc<BoxClientInner>,
    folder_id: String,
}

impl PageFetcher for BoxPageFetcher {
    async fn fetch_page(&self, marker: Option<&str>) -> Result<ItemPage> {
        self.inner.fetch_items(&self.folder_id, marker).await
    }
}

fn item_page_from_json(collection: ItemCollectionJson) -> ItemPage {
    let entries = collection
        .entries
        .into_iter()
        .map(|item| {
            let size = item.size.unwrap_or(0);
            if item.item_type == "folder" {
                ItemEntry::Folder(FolderInfo::new(item.id, item.name, size))
            } else {
                ItemEntry::File(FileInfo {
                    id: item.id,
                    name: item.name,
                    size,
                })
            }
        })
        .collect();

    ItemPage {
        entries,
        next_marker: collection.next_marker,
    }
}

fn folder_info_from_json(item: ItemJson) -> Result<FolderInfo> {
    if item.item_type != "folder" {
        return Err(RemoteError::InvalidResponse(format!(
            "expected folder {}, got {}",
            item.id, item.item_type
        )));
    }
    Ok(FolderInfo::new(item.id, item.name, item.size.unwrap_or(0)))
}

/// Build an `Api` error from a non-success response, keeping the provider's
/// diagnostic fields when the body carries them.
fn parse_api_error(status: u16, body: &str) -> RemoteError {
    match serde_json::from_str::<ErrorJson>(body) {
        Ok(err) => RemoteError::Api {
            status,
            code: err.code.unwrap_or_else(|| "unknown".to_string()),
            message: err
                .message
                .unwrap_or_else(|| format!("request failed with status {}", status)),
            request_id: err.request_id,
        },
        Err(_) => RemoteError::Api {
            status,
            code: "unknown".to_string(),
            message: format!("request failed with status {}", status),
            request_id: None,
        },
    }
}
