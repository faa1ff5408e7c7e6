use std::collections::HashMap;

use tracing::debug;

use crate::remote::{FolderRef, RemoteClient, Result};

/// Child folders of one parent, keyed by name.
///
/// Names are not unique on the provider; when two siblings share a name the
/// index keeps whichever was listed last.
#[derive(Debug, Clone, Default)]
pub struct FolderIndex {
    by_name: HashMap<String, FolderRef>,
}

impl FolderIndex {
    /// Create an empty index.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a folder, returning the entry it displaced, if any.
    pub fn insert(&mut self, folder: FolderRef) -> Option<FolderRef> {
        self.by_name.insert(folder.name.clone(), folder)
    }

    /// Look up a folder by name.
    pub fn get(&self, name: &str) -> Option<&FolderRef> {
        self.by_name.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.by_name.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.by_name.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_name.is_empty()
    }
}

/// Build an index of the immediate child folders of `parent_id`.
///
/// Non-folder children are skipped. The listing is not recursive. Errors from
/// the provider are returned unchanged so the caller can decide what to do.
pub async fn build_folder_index<C: RemoteClient>(client: &C, parent_id: &str) -> Result<FolderIndex> {
    let mut index = FolderIndex::new();
    let mut children = client.list_folder(parent_id).await?;

    while let Some(folder) = children.next_folder().await? {
        if let Some(previous) = index.insert(folder.folder_ref()) {
            debug!(
                parent_id,
                name = %previous.name,
                replaced_id = %previous.id,
                "duplicate folder name, keeping the later one"
            );
        }
    }

    Ok(index)
}
