use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::remote::error::{RemoteError, Result, STATUS_CONFLICT};
use crate::remote::folder_list::{FolderList, PageFetcher, PagedListing};
use crate::remote::remote_client::RemoteClient;
use crate::remote::types::{FileInfo, FolderInfo, ItemEntry, ItemPage};

/// Default number of children returned per listing page.
const DEFAULT_PAGE_SIZE: usize = 100;

/// Status used when a folder is copied into itself.
const STATUS_BAD_REQUEST: u16 = 400;

/// Status used for injected failures.
const STATUS_UNAVAILABLE: u16 = 503;

#[derive(Debug, Clone)]
enum NodeKind {
    /// Child ids, in insertion order.
    Folder(Vec<String>),
    File { size: u64 },
}

#[derive(Debug, Clone)]
struct Node {
    name: String,
    kind: NodeKind,
}

#[derive(Debug, Default)]
struct MemoryState {
    nodes: HashMap<String, Node>,
    next_copy_id: u64,
}

impl MemoryState {
    fn folder_children(&self, id: &str) -> Result<&Vec<String>> {
        match self.nodes.get(id) {
            Some(Node {
                kind: NodeKind::Folder(children),
                ..
            }) => Ok(children),
            _ => Err(RemoteError::not_found(format!("folder {} not found", id))),
        }
    }

    fn size_of(&self, id: &str) -> u64 {
        match self.nodes.get(id).map(|n| &n.kind) {
            Some(NodeKind::File { size }) => *size,
            Some(NodeKind::Folder(children)) => children.iter().map(|c| self.size_of(c)).sum(),
            None => 0,
        }
    }

    fn folder_info(&self, id: &str) -> Result<FolderInfo> {
        self.folder_children(id)?;
        let name = self.nodes.get(id).map(|n| n.name.clone()).unwrap_or_default();
        Ok(FolderInfo::new(id, name, self.size_of(id)))
    }

    /// True if `id` is `ancestor` or lies somewhere below it.
    fn is_within(&self, ancestor: &str, id: &str) -> bool {
        if ancestor == id {
            return true;
        }
        match self.nodes.get(ancestor).map(|n| &n.kind) {
            Some(NodeKind::Folder(children)) => children.iter().any(|c| self.is_within(c, id)),
            _ => false,
        }
    }

    fn entry(&self, id: &str) -> Option<ItemEntry> {
        let node = self.nodes.get(id)?;
        Some(match node.kind {
            NodeKind::Folder(_) => {
                ItemEntry::Folder(FolderInfo::new(id, node.name.clone(), self.size_of(id)))
            }
            NodeKind::File { size } => ItemEntry::File(FileInfo {
                id: id.to_string(),
                name: node.name.clone(),
                size,
            }),
        })
    }

    fn add_child(&mut self, parent_id: &str, child_id: &str) {
        let parent = self
            .nodes
            .entry(parent_id.to_string())
            .or_insert_with(|| Node {
                name: parent_id.to_string(),
                kind: NodeKind::Folder(Vec::new()),
            });
        if let NodeKind::Folder(children) = &mut parent.kind {
            children.push(child_id.to_string());
        }
    }

    /// Deep-copy `source_id` under `parent_id`, returning the new id.
    fn copy_tree(&mut self, source_id: &str, parent_id: &str) -> String {
        self.next_copy_id += 1;
        let new_id = format!("copy-{}", self.next_copy_id);

        let Some(source) = self.nodes.get(source_id).cloned() else {
            return new_id;
        };

        let kind = match &source.kind {
            NodeKind::File { size } => NodeKind::File { size: *size },
            NodeKind::Folder(_) => NodeKind::Folder(Vec::new()),
        };
        self.nodes.insert(
            new_id.clone(),
            Node {
                name: source.name.clone(),
                kind,
            },
        );
        self.add_child(parent_id, &new_id);

        if let NodeKind::Folder(children) = source.kind {
            for child in children {
                self.copy_tree(&child, &new_id);
            }
        }

        new_id
    }
}

/// Builder for constructing a MemoryClient.
pub struct MemoryClientBuilder {
    state: MemoryState,
    page_size: usize,
    failing_copies: HashSet<String>,
    /// Folder id to the first child offset whose page fails.
    failing_listings: HashMap<String, usize>,
}

impl Default for MemoryClientBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryClientBuilder {
    /// Create a new builder with an empty tree.
    pub fn new() -> Self {
        Self {
            state: MemoryState::default(),
            page_size: DEFAULT_PAGE_SIZE,
            failing_copies: HashSet::new(),
            failing_listings: HashMap::new(),
        }
    }

    /// Add a top-level folder with no parent.
    pub fn root(mut self, id: &str, name: &str) -> Self {
        self.state.nodes.insert(
            id.to_string(),
            Node {
                name: name.to_string(),
                kind: NodeKind::Folder(Vec::new()),
            },
        );
        self
    }

    /// Add a folder inside `parent_id`.
    ///
    /// A parent that has not been added yet is created with its id as its name.
    pub fn folder(mut self, parent_id: &str, id: &str, name: &str) -> Self {
        self.state.nodes.insert(
            id.to_string(),
            Node {
                name: name.to_string(),
                kind: NodeKind::Folder(Vec::new()),
            },
        );
        self.state.add_child(parent_id, id);
        self
    }

    /// Add a file of `size` bytes inside `parent_id`.
    pub fn file(mut self, parent_id: &str, id: &str, name: &str, size: u64) -> Self {
        self.state.nodes.insert(
            id.to_string(),
            Node {
                name: name.to_string(),
                kind: NodeKind::File { size },
            },
        );
        self.state.add_child(parent_id, id);
        self
    }

    /// Set how many children each listing page holds.
    pub fn page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size.max(1);
        self
    }

    /// Make every copy of `folder_id` fail.
    pub fn fail_copy_of(mut self, folder_id: &str) -> Self {
        self.failing_copies.insert(folder_id.to_string());
        self
    }

    /// Make every listing of `folder_id` fail.
    pub fn fail_listing_of(mut self, folder_id: &str) -> Self {
        self.failing_listings.insert(folder_id.to_string(), 0);
        self
    }

    /// Serve the first `served` children of `folder_id`, then fail the
    /// page that would follow.
    pub fn fail_listing_after(mut self, folder_id: &str, served: usize) -> Self {
        self.failing_listings.insert(folder_id.to_string(), served);
        self
    }

    /// Build the MemoryClient.
    pub fn build(self) -> MemoryClient {
        MemoryClient {
            inner: Arc::new(MemoryClientInner {
                state: RwLock::new(self.state),
                page_size: self.page_size,
                failing_copies: self.failing_copies,
                failing_listings: self.failing_listings,
                copy_calls: AtomicUsize::new(0),
                page_fetches: AtomicUsize::new(0),
            }),
        }
    }
}

/// Inner state for MemoryClient, wrapped in Arc for sharing with listings.
struct MemoryClientInner {
    state: RwLock<MemoryState>,
    page_size: usize,
    failing_copies: HashSet<String>,
    failing_listings: HashMap<String, usize>,
    copy_calls: AtomicUsize,
    page_fetches: AtomicUsize,
}

impl MemoryClientInner {
    fn read(&self) -> RwLockReadGuard<'_, MemoryState> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, MemoryState> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }
}

/// An in-memory implementation of `RemoteClient`, intended primarily for testing.
///
/// Children are listed in insertion order, one page at a time. Copies are deep
/// and get fresh ids; copying into a folder that already holds an item of the
/// same name fails with a 409 conflict, as the real service does.
#[derive(Clone)]
pub struct MemoryClient {
    inner: Arc<MemoryClientInner>,
}

impl MemoryClient {
    /// Create a new builder for constructing a MemoryClient.
    pub fn builder() -> MemoryClientBuilder {
        MemoryClientBuilder::new()
    }

    /// Number of `copy_folder` calls made so far, including failed ones.
    pub fn copy_calls(&self) -> usize {
        self.inner.copy_calls.load(Ordering::SeqCst)
    }

    /// Number of listing pages fetched so far.
    pub fn page_fetches(&self) -> usize {
        self.inner.page_fetches.load(Ordering::SeqCst)
    }

    /// Names of the immediate children of a folder, in listing order.
    pub fn child_names(&self, folder_id: &str) -> Vec<String> {
        let state = self.inner.read();
        state
            .folder_children(folder_id)
            .map(|children| {
                children
                    .iter()
                    .filter_map(|c| state.nodes.get(c).map(|n| n.name.clone()))
                    .collect()
            })
            .unwrap_or_default()
    }
}

impl RemoteClient for MemoryClient {
    async fn list_folder(&self, folder_id: &str) -> Result<FolderList> {
        self.inner.read().folder_children(folder_id)?;

        Ok(FolderList::new(PagedListing::new(MemoryPageFetcher {
            inner: Arc::clone(&self.inner),
            folder_id: folder_id.to_string(),
        })))
    }

    async fn get_folder_info(&self, folder_id: &str) -> Result<FolderInfo> {
        self.inner.read().folder_info(folder_id)
    }

    async fn copy_folder(&self, folder_id: &str, destination_id: &str) -> Result<FolderInfo> {
        self.inner.copy_calls.fetch_add(1, Ordering::SeqCst);

        if self.inner.failing_copies.contains(folder_id) {
            return Err(RemoteError::Api {
                status: STATUS_UNAVAILABLE,
                code: "unavailable".to_string(),
                message: format!("copy of {} failed", folder_id),
                request_id: None,
            });
        }

        let mut state = self.inner.write();
        let source_name = state.folder_info(folder_id)?.name;
        let destination_children = state.folder_children(destination_id)?;

        if state.is_within(folder_id, destination_id) {
            return Err(RemoteError::Api {
                status: STATUS_BAD_REQUEST,
                code: "bad_request".to_string(),
                message: "Cannot copy a folder into itself".to_string(),
                request_id: None,
            });
        }

        let name_taken = destination_children
            .iter()
            .any(|c| state.nodes.get(c).is_some_and(|n| n.name == source_name));
        if name_taken {
            return Err(RemoteError::Api {
                status: STATUS_CONFLICT,
                code: "item_name_in_use".to_string(),
                message: "Item with the same name already exists".to_string(),
                request_id: None,
            });
        }

        let new_id = state.copy_tree(folder_id, destination_id);
        state.folder_info(&new_id)
    }
}

/// Serves pages of one folder's children; the marker is the offset.
struct MemoryPageFetcher {
    inner: Arc<MemoryClientInner>,
    folder_id: String,
}

impl PageFetcher for MemoryPageFetcher {
    async fn fetch_page(&self, marker: Option<&str>) -> Result<ItemPage> {
        self.inner.page_fetches.fetch_add(1, Ordering::SeqCst);

        let offset: usize = match marker {
            Some(m) => m
                .parse()
                .map_err(|_| RemoteError::InvalidResponse(format!("bad marker {}", m)))?,
            None => 0,
        };

        if let Some(&served) = self.inner.failing_listings.get(&self.folder_id) {
            if offset >= served {
                return Err(RemoteError::Api {
                    status: STATUS_UNAVAILABLE,
                    code: "unavailable".to_string(),
                    message: format!("listing of {} failed at offset {}", self.folder_id, offset),
                    request_id: None,
                });
            }
        }

        let state = self.inner.read();
        let children = state.folder_children(&self.folder_id)?;
        let end = (offset + self.inner.page_size).min(children.len());
        let entries = children
            .get(offset..end)
            .unwrap_or_default()
            .iter()
            .filter_map(|c| state.entry(c))
            .collect();
        let next_marker = (end < children.len()).then(|| end.to_string());

        Ok(ItemPage {
            entries,
            next_marker,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> MemoryClient {
        MemoryClient::builder()
            .root("0", "All Files")
            .folder("0", "10", "Origin")
            .folder("10", "11", "Reports")
            .file("11", "12", "q1.pdf", 300)
            .file("11", "13", "q2.pdf", 200)
            .file("10", "14", "readme.txt", 5)
            .folder("0", "20", "Destination")
            .build()
    }

    #[tokio::test]
    async fn test_list_in_insertion_order() {
        let client = sample();
        let mut list = client.list_folder("10").await.unwrap();

        let first = list.next().await.unwrap().unwrap();
        assert_eq!(first, ItemEntry::Folder(FolderInfo::new("11", "Reports", 500)));
        let second = list.next().await.unwrap().unwrap();
        assert_eq!(second.name(), "readme.txt");
        assert!(matches!(second, ItemEntry::File(_)));
        assert!(list.next().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_list_missing_folder() {
        let client = sample();
        let err = client.list_folder("999").await.err().unwrap();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_listing_pages() {
        let mut builder = MemoryClient::builder().root("0", "root").page_size(2);
        for i in 0..5 {
            builder = builder.folder("0", &format!("f{}", i), &format!("Folder {}", i));
        }
        let client = builder.build();

        let mut list = client.list_folder("0").await.unwrap();
        let mut names = Vec::new();
        while let Some(entry) = list.next().await.unwrap() {
            names.push(entry.name().to_string());
        }

        assert_eq!(names.len(), 5);
        assert_eq!(names[4], "Folder 4");
        assert_eq!(client.page_fetches(), 3);
    }

    #[tokio::test]
    async fn test_copy_is_deep() {
        let client = sample();
        let copied = client.copy_folder("11", "20").await.unwrap();

        assert_eq!(copied.name, "Reports");
        assert_ne!(copied.id, "11");
        assert_eq!(copied.size, 500);
        assert_eq!(client.child_names("20"), vec!["Reports".to_string()]);
        assert_eq!(
            client.child_names(&copied.id),
            vec!["q1.pdf".to_string(), "q2.pdf".to_string()]
        );
        assert_eq!(client.copy_calls(), 1);
    }

    #[tokio::test]
    async fn test_copy_name_conflict() {
        let client = sample();
        client.copy_folder("11", "20").await.unwrap();
        let err = client.copy_folder("11", "20").await.unwrap_err();
        assert!(err.is_name_conflict());
        assert_eq!(client.copy_calls(), 2);
    }

    #[tokio::test]
    async fn test_injected_failures() {
        let client = MemoryClient::builder()
            .root("0", "root")
            .folder("0", "1", "A")
            .fail_copy_of("1")
            .fail_listing_of("0")
            .build();

        assert!(client.copy_folder("1", "0").await.is_err());
        let mut list = client.list_folder("0").await.unwrap();
        assert!(list.next().await.is_err());
    }

    #[tokio::test]
    async fn test_listing_fails_after_first_page() {
        let client = MemoryClient::builder()
            .root("0", "root")
            .folder("0", "1", "A")
            .folder("0", "2", "B")
            .page_size(1)
            .fail_listing_after("0", 1)
            .build();

        let mut list = client.list_folder("0").await.unwrap();
        assert_eq!(list.next().await.unwrap().unwrap().name(), "A");
        assert!(list.next().await.is_err());
    }

    #[tokio::test]
    async fn test_copy_into_itself_rejected() {
        let client = sample();
        assert!(client.copy_folder("10", "11").await.is_err());
        assert!(client.copy_folder("10", "10").await.is_err());
        assert_eq!(client.child_names("11"), vec!["q1.pdf".to_string(), "q2.pdf".to_string()]);
    }

    #[tokio::test]
    async fn test_folder_info() {
        let client = sample();
        let info = client.get_folder_info("10").await.unwrap();
        assert_eq!(info, FolderInfo::new("10", "Origin", 505));
        assert!(client.get_folder_info("12").await.unwrap_err().is_not_found());
    }
}
