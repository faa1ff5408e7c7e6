//! Folder mapping files: explicit origin-to-destination pairs by folder id.
//!
//! The first record is a header and is skipped. Column 1 holds the origin
//! folder id and column 2 the destination folder id; other columns are
//! ignored. A destination id counts only if it is exactly
//! [`DESTINATION_ID_LEN`] characters long, otherwise the origin is treated as
//! unmatched.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use serde::Serialize;

use crate::migrate::error::MappingError;

/// Length of a valid destination folder id in a mapping file.
pub const DESTINATION_ID_LEN: usize = 11;

const ORIGIN_COLUMN: usize = 1;
const DESTINATION_COLUMN: usize = 2;

/// One row of a mapping file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FolderMapping {
    pub origin_id: String,
    pub destination_id: Option<String>,
}

/// Read all mappings from a file.
pub fn read_mapping_file(path: &Path) -> Result<Vec<FolderMapping>, MappingError> {
    let file = File::open(path).map_err(|source| MappingError::Open {
        path: path.to_path_buf(),
        source,
    })?;
    parse_mappings(file)
}

/// Parse mappings from any CSV source.
pub fn parse_mappings<R: Read>(reader: R) -> Result<Vec<FolderMapping>, MappingError> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(reader);

    let mut mappings = Vec::new();
    for record in csv_reader.records() {
        let record = record?;
        let line = record.position().map(|p| p.line()).unwrap_or(0);

        let (Some(origin_id), Some(destination_id)) =
            (record.get(ORIGIN_COLUMN), record.get(DESTINATION_COLUMN))
        else {
            return Err(MappingError::MissingColumns {
                line,
                found: record.len(),
            });
        };

        let origin_id = origin_id.trim();
        if origin_id.is_empty() {
            return Err(MappingError::MissingOriginId { line });
        }

        let destination_id = (destination_id.len() == DESTINATION_ID_LEN)
            .then(|| destination_id.to_string());

        mappings.push(FolderMapping {
            origin_id: origin_id.to_string(),
            destination_id,
        });
    }

    Ok(mappings)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_mappings() {
        let data = "\
Account Name,Legacy Folder Id,Account Folder Id
Acme,65741957001,56475663001
Beta,65741957002,
Gamma,65741957003,123
";
        let mappings = parse_mappings(data.as_bytes()).unwrap();

        assert_eq!(
            mappings,
            vec![
                FolderMapping {
                    origin_id: "65741957001".to_string(),
                    destination_id: Some("56475663001".to_string()),
                },
                FolderMapping {
                    origin_id: "65741957002".to_string(),
                    destination_id: None,
                },
                FolderMapping {
                    origin_id: "65741957003".to_string(),
                    destination_id: None,
                },
            ]
        );
    }

    #[test]
    fn test_header_only() {
        let mappings = parse_mappings("a,b,c\n".as_bytes()).unwrap();
        assert!(mappings.is_empty());
    }

    #[test]
    fn test_extra_columns_ignored() {
        let data = "h1,h2,h3,h4\nx,1,56475663001,extra\n";
        let mappings = parse_mappings(data.as_bytes()).unwrap();
        assert_eq!(mappings.len(), 1);
        assert_eq!(mappings[0].destination_id.as_deref(), Some("56475663001"));
    }

    #[test]
    fn test_short_row_rejected() {
        let data = "h1,h2,h3\nAcme,65741957001\n";
        let err = parse_mappings(data.as_bytes()).unwrap_err();
        assert!(matches!(err, MappingError::MissingColumns { line: 2, found: 2 }));
    }

    #[test]
    fn test_blank_origin_rejected() {
        let data = "h1,h2,h3\nAcme,,56475663001\n";
        let err = parse_mappings(data.as_bytes()).unwrap_err();
        assert!(matches!(err, MappingError::MissingOriginId { line: 2 }));
    }

    #[test]
    fn test_origin_id_is_trimmed() {
        let data = "h1,h2,h3\nAcme, 65741957001 ,56475663001\n";
        let mappings = parse_mappings(data.as_bytes()).unwrap();
        assert_eq!(mappings[0].origin_id, "65741957001");
        assert_eq!(mappings[0].destination_id.as_deref(), Some("56475663001"));
    }

    #[test]
    fn test_read_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = read_mapping_file(&dir.path().join("nope.csv")).unwrap_err();
        assert!(matches!(err, MappingError::Open { .. }));
    }
}
