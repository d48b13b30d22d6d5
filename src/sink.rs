//! CSV sink shared by all clients.

use crate::error::Result;
use crate::record::Record;
use std::path::Path;
use tracing::{debug, info};

/// Write records to `path` using their declared column schema.
///
/// Parent directories are created as needed. The header row is always
/// written, so an empty record set produces a header-only file.
pub fn write_csv<R: Record>(path: &Path, records: &[R]) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            debug!(dir = ?parent, "Creating output directory");
            std::fs::create_dir_all(parent)?;
        }
    }

    let mut wtr = csv::WriterBuilder::new()
        .has_headers(false)
        .from_path(path)?;

    wtr.write_record(R::KIND.columns())?;
    for record in records {
        wtr.write_record(record.cells())?;
    }

    wtr.flush()?;
    info!(path = ?path, kind = %R::KIND, rows = records.len(), "Saved CSV");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::{cell, join_list, RecordKind};
    use tempfile::TempDir;

    struct Row {
        title: Option<String>,
        link: Option<String>,
        authors: Vec<String>,
    }

    impl Record for Row {
        const KIND: RecordKind = RecordKind::ScholarArticle;

        fn cells(&self) -> Vec<String> {
            vec![
                cell(&self.title),
                cell(&self.link),
                join_list(Self::KIND, &self.authors),
                String::new(),
            ]
        }
    }

    #[test]
    fn test_write_creates_directories() -> Result<()> {
        let dir = TempDir::new()?;
        let path = dir.path().join("nested/deeper/out.csv");
        let rows = vec![
            Row {
                title: Some("First".to_string()),
                link: None,
                authors: vec!["A".to_string(), "B".to_string()],
            },
            Row {
                title: None,
                link: Some("https://example.org".to_string()),
                authors: vec![],
            },
        ];

        write_csv(&path, &rows)?;

        let mut rdr = csv::ReaderBuilder::new().has_headers(false).from_path(&path)?;
        let all: Vec<csv::StringRecord> = rdr.records().collect::<std::result::Result<_, _>>()?;
        assert_eq!(all.len(), 3);
        assert_eq!(&all[0][0], "title");
        assert_eq!(&all[1][2], "A, B");
        assert_eq!(&all[2][0], "");
        assert_eq!(&all[2][1], "https://example.org");
        Ok(())
    }

    #[test]
    fn test_empty_writes_header_only() -> Result<()> {
        let dir = TempDir::new()?;
        let path = dir.path().join("empty.csv");
        write_csv::<Row>(&path, &[])?;

        let content = std::fs::read_to_string(&path)?;
        assert_eq!(content.trim_end(), "title,link,authors,journal_info");
        Ok(())
    }
}
