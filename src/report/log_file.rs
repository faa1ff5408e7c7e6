use std::fs::{File, OpenOptions};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use crate::report::error::{ReportError, Result};

const EXTENSION: &str = "csv";

/// First unused path among `base.csv`, `base-1.csv`, `base-2.csv`, ...
pub fn unique_log_path(dir: &Path, base_name: &str) -> PathBuf {
    let mut path = dir.join(format!("{}.{}", base_name, EXTENSION));
    let mut suffix = 1u32;
    while path.exists() {
        path = dir.join(format!("{}-{}.{}", base_name, suffix, EXTENSION));
        suffix += 1;
    }
    path
}

/// Create a new report file in `dir` named after `base_name`.
///
/// The directory is created if missing. The file is opened with `create_new`,
/// so an existing report is never overwritten; if another process claims the
/// chosen name first the next suffix is tried.
pub fn create_log_file(dir: &Path, base_name: &str) -> Result<(PathBuf, File)> {
    std::fs::create_dir_all(dir).map_err(|source| ReportError::Create {
        path: dir.to_path_buf(),
        source,
    })?;

    loop {
        let path = unique_log_path(dir, base_name);
        match OpenOptions::new().write(true).create_new(true).open(&path) {
            Ok(file) => return Ok((path, file)),
            Err(e) if e.kind() == ErrorKind::AlreadyExists => continue,
            Err(source) => return Err(ReportError::Create { path, source }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unique_log_path_suffixes() {
        let dir = tempfile::tempdir().unwrap();
        let base = "folder-migration-log";

        let first = unique_log_path(dir.path(), base);
        assert_eq!(first, dir.path().join("folder-migration-log.csv"));

        std::fs::write(&first, "").unwrap();
        let second = unique_log_path(dir.path(), base);
        assert_eq!(second, dir.path().join("folder-migration-log-1.csv"));

        std::fs::write(&second, "").unwrap();
        let third = unique_log_path(dir.path(), base);
        assert_eq!(third, dir.path().join("folder-migration-log-2.csv"));
    }

    #[test]
    fn test_first_unused_suffix_wins() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("log.csv"), "").unwrap();
        std::fs::write(dir.path().join("log-2.csv"), "").unwrap();

        assert_eq!(unique_log_path(dir.path(), "log"), dir.path().join("log-1.csv"));
    }

    #[test]
    fn test_create_log_file_never_overwrites() {
        let dir = tempfile::tempdir().unwrap();
        let existing = dir.path().join("log.csv");
        std::fs::write(&existing, "keep me").unwrap();

        let (path, _file) = create_log_file(dir.path(), "log").unwrap();

        assert_eq!(path, dir.path().join("log-1.csv"));
        assert_eq!(std::fs::read_to_string(&existing).unwrap(), "keep me");
    }

    #[test]
    fn test_create_log_file_makes_directory() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("logs").join("today");

        let (path, _file) = create_log_file(&nested, "log").unwrap();

        assert!(path.exists());
        assert_eq!(path.parent(), Some(nested.as_path()));
    }
}
