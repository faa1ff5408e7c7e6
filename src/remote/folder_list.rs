use std::collections::VecDeque;
use std::future::Future;
use std::pin::Pin;

use crate::remote::error::Result;
use crate::remote::types::{FolderInfo, ItemEntry, ItemPage};

/// Trait for async iteration over the children of a folder.
pub trait FolderListing: Send {
    /// Get the next child, or None if the listing is exhausted.
    fn next(&mut self) -> impl Future<Output = Result<Option<ItemEntry>>> + Send;
}

/// Object-safe version of FolderListing for boxing.
pub trait FolderListingBoxed: Send {
    /// Get the next child, or None if the listing is exhausted.
    fn next_boxed(&mut self) -> Pin<Box<dyn Future<Output = Result<Option<ItemEntry>>> + Send + '_>>;
}

impl<T: FolderListing + Send> FolderListingBoxed for T {
    fn next_boxed(&mut self) -> Pin<Box<dyn Future<Output = Result<Option<ItemEntry>>> + Send + '_>> {
        Box::pin(self.next())
    }
}

/// A boxed folder listing for use as a return type.
///
/// Each call to `RemoteClient::list_folder` produces a fresh `FolderList`, so a
/// listing can be restarted by asking for it again.
pub struct FolderList {
    inner: Box<dyn FolderListingBoxed + Send>,
}

impl FolderList {
    /// Create a new FolderList from a FolderListing implementation.
    pub fn new<T: FolderListing + Send + 'static>(listing: T) -> Self {
        Self {
            inner: Box::new(listing),
        }
    }

    /// Get the next child, or None if the listing is exhausted.
    pub async fn next(&mut self) -> Result<Option<ItemEntry>> {
        self.inner.next_boxed().await
    }

    /// Get the next child that is a folder, skipping everything else.
    pub async fn next_folder(&mut self) -> Result<Option<FolderInfo>> {
        while let Some(entry) = self.next().await? {
            if let ItemEntry::Folder(folder) = entry {
                return Ok(Some(folder));
            }
        }
        Ok(None)
    }
}

/// Source of listing pages, addressed by an opaque marker.
pub trait PageFetcher: Send + Sync {
    /// Fetch the page starting at `marker` (None for the first page).
    fn fetch_page(&self, marker: Option<&str>) -> impl Future<Output = Result<ItemPage>> + Send;
}

/// A listing that pulls one page at a time from a `PageFetcher`.
///
/// Only one page is buffered, so memory stays bounded for large folders.
pub struct PagedListing<P> {
    fetcher: P,
    buffer: VecDeque<ItemEntry>,
    marker: Option<String>,
    exhausted: bool,
}

impl<P: PageFetcher> PagedListing<P> {
    /// Create a listing that starts at the first page.
    pub fn new(fetcher: P) -> Self {
        Self {
            fetcher,
            buffer: VecDeque::new(),
            marker: None,
            exhausted: false,
        }
    }
}

impl<P: PageFetcher> FolderListing for PagedListing<P> {
    async fn next(&mut self) -> Result<Option<ItemEntry>> {
        loop {
            if let Some(entry) = self.buffer.pop_front() {
                return Ok(Some(entry));
            }
            if self.exhausted {
                return Ok(None);
            }

            let page = self.fetcher.fetch_page(self.marker.as_deref()).await?;
            self.marker = page.next_marker.filter(|m| !m.is_empty());
            self.exhausted = self.marker.is_none();
            self.buffer.extend(page.entries);
        }
    }
}
