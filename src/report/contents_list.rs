use std::path::{Path, PathBuf};

use tracing::info;

use crate::remote::RemoteClient;
use crate::report::error::Result;
use crate::report::log_file::create_log_file;

/// Header row of a contents list.
pub const CONTENTS_LIST_COLUMNS: [&str; 2] = ["Folder Name", "Folder ID"];

/// Write the name and id of every immediate child of `folder_id` to
/// `<folder name>-contents-list.csv` in `dir`.
///
/// Files are listed alongside folders. Returns the path written and the
/// number of entries.
pub async fn write_contents_list<C: RemoteClient>(
    client: &C,
    folder_id: &str,
    dir: &Path,
) -> Result<(PathBuf, usize)> {
    let folder = client.get_folder_info(folder_id).await?;
    let base_name = format!("{}-contents-list", folder.name.replace(['/', '\\'], "_"));
    let (path, file) = create_log_file(dir, &base_name)?;

    let mut writer = csv::Writer::from_writer(file);
    writer.write_record(CONTENTS_LIST_COLUMNS)?;

    let mut count = 0;
    let mut children = client.list_folder(folder_id).await?;
    while let Some(entry) = children.next().await? {
        writer.write_record([entry.name(), entry.id()])?;
        count += 1;
    }
    writer.flush()?;

    info!(folder = %folder.name, entries = count, path = %path.display(), "wrote contents list");
    Ok((path, count))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::remote::MemoryClient;

    #[tokio::test]
    async fn test_write_contents_list() {
        let client = MemoryClient::builder()
            .root("1", "Accounts")
            .folder("1", "2", "Acme")
            .file("1", "3", "readme.txt", 5)
            .folder("1", "4", "Beta")
            .page_size(2)
            .build();
        let dir = tempfile::tempdir().unwrap();

        let (path, count) = write_contents_list(&client, "1", dir.path()).await.unwrap();

        assert_eq!(count, 3);
        assert_eq!(path, dir.path().join("Accounts-contents-list.csv"));

        let mut reader = csv::Reader::from_path(&path).unwrap();
        let headers: Vec<String> = reader.headers().unwrap().iter().map(String::from).collect();
        assert_eq!(headers, vec!["Folder Name", "Folder ID"]);
        let rows: Vec<Vec<String>> = reader
            .records()
            .map(|r| r.unwrap().iter().map(String::from).collect())
            .collect();
        assert_eq!(
            rows,
            vec![
                vec!["Acme".to_string(), "2".to_string()],
                vec!["readme.txt".to_string(), "3".to_string()],
                vec!["Beta".to_string(), "4".to_string()],
            ]
        );
    }

    #[tokio::test]
    async fn test_second_list_gets_suffix() {
        let client = MemoryClient::builder().root("1", "Accounts").build();
        let dir = tempfile::tempdir().unwrap();

        write_contents_list(&client, "1", dir.path()).await.unwrap();
        let (path, count) = write_contents_list(&client, "1", dir.path()).await.unwrap();

        assert_eq!(count, 0);
        assert_eq!(path, dir.path().join("Accounts-contents-list-1.csv"));
    }

    #[tokio::test]
    async fn test_missing_folder_creates_nothing() {
        let client = MemoryClient::builder().root("1", "Accounts").build();
        let dir = tempfile::tempdir().unwrap();

        assert!(write_contents_list(&client, "404", dir.path()).await.is_err());
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }
}
