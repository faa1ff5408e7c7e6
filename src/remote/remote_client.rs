use std::future::Future;

use crate::remote::error::Result;
use crate::remote::folder_list::FolderList;
use crate::remote::types::FolderInfo;

/// The remote folder operations a migration needs.
///
/// RemoteClient abstracts the storage provider (the Box Content API, or an
/// in-memory tree for tests). One client instance is constructed per run and
/// passed explicitly to everything that talks to the provider.
pub trait RemoteClient: Send + Sync {
    /// List the immediate children of a folder.
    ///
    /// Children are yielded in the order the provider returns them, one page at
    /// a time.
    fn list_folder(&self, folder_id: &str) -> impl Future<Output = Result<FolderList>> + Send;

    /// Get the metadata (name, id, size) of a folder.
    fn get_folder_info(&self, folder_id: &str) -> impl Future<Output = Result<FolderInfo>> + Send;

    /// Copy a folder, with everything inside it, into a destination folder.
    ///
    /// Returns the metadata of the newly created copy. Fails with a name
    /// conflict if the destination already holds an item of the same name.
    fn copy_folder(
        &self,
        folder_id: &str,
        destination_id: &str,
    ) -> impl Future<Output = Result<FolderInfo>> + Send;
}
