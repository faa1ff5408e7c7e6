use serde::Serialize;

/// Identity of a remote folder: its id and display name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct FolderRef {
    /// The provider's folder id.
    pub id: String,
    /// The folder's display name.
    pub name: String,
}

impl FolderRef {
    /// Create a new folder reference.
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
        }
    }
}

/// Folder metadata as reported by the provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FolderInfo {
    pub id: String,
    pub name: String,
    /// Total size in bytes of everything inside the folder.
    pub size: u64,
}

impl FolderInfo {
    /// Create folder metadata.
    pub fn new(id: impl Into<String>, name: impl Into<String>, size: u64) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            size,
        }
    }

    /// The id/name identity of this folder.
    pub fn folder_ref(&self) -> FolderRef {
        FolderRef::new(self.id.clone(), self.name.clone())
    }
}

/// Metadata for a child that is not a folder (files, web links).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileInfo {
    pub id: String,
    pub name: String,
    pub size: u64,
}

/// One immediate child of a folder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ItemEntry {
    /// A folder.
    Folder(FolderInfo),
    /// Anything that is not a folder.
    File(FileInfo),
}

impl ItemEntry {
    /// Get the display name of this entry.
    pub fn name(&self) -> &str {
        match self {
            ItemEntry::Folder(f) => &f.name,
            ItemEntry::File(f) => &f.name,
        }
    }

    /// Get the provider id of this entry.
    pub fn id(&self) -> &str {
        match self {
            ItemEntry::Folder(f) => &f.id,
            ItemEntry::File(f) => &f.id,
        }
    }

    /// Returns the folder metadata if this entry is a folder.
    pub fn into_folder(self) -> Option<FolderInfo> {
        match self {
            ItemEntry::Folder(f) => Some(f),
            ItemEntry::File(_) => None,
        }
    }
}

/// One page of a folder listing.
#[derive(Debug, Clone, Default)]
pub struct ItemPage {
    /// Entries in the order the provider returned them.
    pub entries: Vec<ItemEntry>,
    /// Marker for the next page, or None if this was the last one.
    pub next_marker: Option<String>,
}
