//! The remote directory boundary: listing folders, reading folder metadata,
//! and copying folders on the storage provider.

mod app_settings;
mod auth;
mod box_client;
mod error;
mod folder_list;
mod memory_client;
mod remote_client;
mod types;

pub use app_settings::{AppCredentials, AppSettingsError, BoxAppSettings};
pub use auth::{ClientCredentials, StaticToken, Subject, TokenProvider};
pub use box_client::{BoxClient, BoxClientConfig, DEFAULT_API_URL, MAX_PAGE_SIZE};
pub use error::{RemoteError, Result, STATUS_CONFLICT, STATUS_NOT_FOUND};
pub use folder_list::{FolderList, FolderListing, PageFetcher, PagedListing};
pub use memory_client::{MemoryClient, MemoryClientBuilder};
pub use remote_client::RemoteClient;
pub use types::{FileInfo, FolderInfo, FolderRef, ItemEntry, ItemPage};
