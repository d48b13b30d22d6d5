//! Record kinds and their declared CSV schemas.
//!
//! Every record type a client produces implements [`Record`], which ties it to
//! one [`RecordKind`] and renders its cells in the kind's column order.
//!
//! Fields that may be missing from the source payload are `Option<String>`.
//! A missing value is written as an empty cell; list fields are joined with
//! the kind's [`list_separator`](RecordKind::list_separator).

use std::fmt;

/// The declared shape of an output row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordKind {
    ArxivPaper,
    ScopusArticle,
    ScopusPerson,
    ScholarProfile,
    ScholarArticle,
}

impl RecordKind {
    /// Column names, in output order.
    pub fn columns(self) -> &'static [&'static str] {
        match self {
            Self::ArxivPaper => &["id", "title", "authors", "published", "updated", "summary"],
            Self::ScopusArticle => &[
                "scopus_id",
                "title",
                "authors",
                "publication_name",
                "doi",
                "abstract",
                "publication_date",
            ],
            Self::ScopusPerson => &[
                "scopus_id",
                "name",
                "affiliation",
                "orcid",
                "email",
                "research_areas",
            ],
            Self::ScholarProfile => &[
                "name",
                "link",
                "affiliations",
                "email",
                "cited_by",
                "interests",
            ],
            Self::ScholarArticle => &["title", "link", "authors", "journal_info"],
        }
    }

    /// Separator used when a list field is flattened into one cell.
    pub fn list_separator(self) -> &'static str {
        match self {
            Self::ArxivPaper => " / ",
            _ => ", ",
        }
    }

    /// Short name used in log lines and CLI output.
    pub fn name(self) -> &'static str {
        match self {
            Self::ArxivPaper => "papers",
            Self::ScopusArticle => "articles",
            Self::ScopusPerson => "people",
            Self::ScholarProfile => "profiles",
            Self::ScholarArticle => "scholar_articles",
        }
    }
}

impl fmt::Display for RecordKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A flat record with a declared column schema.
pub trait Record {
    /// The schema this record is written with.
    const KIND: RecordKind;

    /// Cell values aligned with `Self::KIND.columns()`.
    fn cells(&self) -> Vec<String>;
}

/// Render an optional field; absent becomes an empty cell.
pub(crate) fn cell(value: &Option<String>) -> String {
    value.clone().unwrap_or_default()
}

/// Join a list field with the kind's separator.
pub(crate) fn join_list(kind: RecordKind, values: &[String]) -> String {
    values.join(kind.list_separator())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_column_sets() {
        assert_eq!(RecordKind::ArxivPaper.columns().len(), 6);
        assert_eq!(RecordKind::ScopusArticle.columns()[0], "scopus_id");
        assert_eq!(RecordKind::ScopusPerson.columns()[5], "research_areas");
        assert_eq!(RecordKind::ArxivPaper.list_separator(), " / ");
    }
}
