//! arXiv API client.
//!
//! Searches the public Atom feed at `export.arxiv.org` by a single field,
//! optionally restricted to one subject category. One call fetches one page;
//! callers advance `start` themselves.

use crate::error::{HarvestError, OptionExt, Result};
use crate::record::{join_list, Record, RecordKind};
use serde::Deserialize;
use std::fmt;
use std::str::FromStr;
use tracing::{debug, info};
use url::Url;

/// arXiv query endpoint
pub const ARXIV_API_URL: &str = "http://export.arxiv.org/api/query";

/// Default number of results per request
pub const DEFAULT_MAX_RESULTS: u32 = 10;

/// Field a search is scoped to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArxivField {
    Title,
    Author,
    Abstract,
    Doi,
    Orcid,
    ArxivId,
    All,
}

impl ArxivField {
    pub const ALL_FIELDS: [ArxivField; 7] = [
        Self::Title,
        Self::Author,
        Self::Abstract,
        Self::Doi,
        Self::Orcid,
        Self::ArxivId,
        Self::All,
    ];

    /// Prefix arXiv expects in `search_query`; `None` searches all fields.
    pub fn label(self) -> Option<&'static str> {
        match self {
            Self::Title => Some("ti"),
            Self::Author => Some("au"),
            Self::Abstract => Some("abs"),
            Self::Doi => Some("doi"),
            Self::Orcid => Some("orcid"),
            Self::ArxivId => Some("id"),
            Self::All => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Title => "title",
            Self::Author => "author",
            Self::Abstract => "abstract",
            Self::Doi => "doi",
            Self::Orcid => "orcid",
            Self::ArxivId => "arxiv_id",
            Self::All => "all",
        }
    }
}

impl fmt::Display for ArxivField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ArxivField {
    type Err = HarvestError;

    fn from_str(s: &str) -> Result<Self> {
        Self::ALL_FIELDS
            .iter()
            .copied()
            .find(|f| f.name() == s)
            .ok_or_else(|| {
                let valid: Vec<&str> = Self::ALL_FIELDS.iter().map(|f| f.name()).collect();
                HarvestError::Validation(format!(
                    "Invalid search field '{}'. Valid options are: {}",
                    s,
                    valid.join(", ")
                ))
            })
    }
}

/// A paper parsed from one Atom feed entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Paper {
    /// arXiv identifier, the last path segment of the entry URL
    pub id: String,
    pub title: String,
    /// Author names in feed order
    pub authors: Vec<String>,
    pub published: String,
    pub updated: String,
    /// Abstract on a single line
    pub summary: String,
}

impl Record for Paper {
    const KIND: RecordKind = RecordKind::ArxivPaper;

    fn cells(&self) -> Vec<String> {
        vec![
            self.id.clone(),
            self.title.clone(),
            join_list(Self::KIND, &self.authors),
            self.published.clone(),
            self.updated.clone(),
            self.summary.clone(),
        ]
    }
}

/// Build the `search_query` expression for a field, term and optional category.
pub fn build_query(field: ArxivField, query: &str, subject: Option<&str>) -> String {
    let mut expr = match field.label() {
        Some(label) => format!("{}:{}", label, query),
        None => query.to_string(),
    };
    if let Some(subject) = subject.filter(|s| !s.is_empty()) {
        expr.push_str(" AND cat:");
        expr.push_str(subject);
    }
    expr
}

/// arXiv API client
pub struct ArxivClient {
    client: reqwest::Client,
    base_url: String,
    max_results: u32,
}

impl ArxivClient {
    /// Create a client returning at most `max_results` papers per call.
    pub fn new(max_results: u32) -> Result<Self> {
        let client = reqwest::Client::builder()
            .build()
            .map_err(|e| HarvestError::Config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: ARXIV_API_URL.to_string(),
            max_results,
        })
    }

    /// Point the client at a different endpoint (mirror or test server).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Search arXiv by one field, optionally within a subject category.
    ///
    /// # Errors
    ///
    /// `Validation` for an unsupported field (before any request), `Api` on a
    /// non-success status, `Parse` if the feed cannot be decoded.
    pub async fn search(
        &self,
        field: &str,
        query: &str,
        subject: Option<&str>,
        start: u32,
    ) -> Result<Vec<Paper>> {
        let field: ArxivField = field.parse()?;
        let search_query = build_query(field, query, subject);
        let url = self.build_url(&search_query, start)?;

        info!(field = %field, query = %search_query, start, "Searching arXiv");
        debug!(url = %url, "Fetching arXiv feed");

        let response = self.client.get(url.as_str()).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(HarvestError::Api {
                code: status.as_u16(),
                message: format!("Failed to retrieve data from arXiv: {}", status),
            });
        }

        let body = response.text().await?;
        let papers = parse_feed(&body)?;
        info!(count = papers.len(), "Parsed arXiv entries");
        Ok(papers)
    }

    fn build_url(&self, search_query: &str, start: u32) -> Result<Url> {
        let mut url = Url::parse(&self.base_url)
            .map_err(|e| HarvestError::Config(format!("Invalid base URL: {}", e)))?;
        url.query_pairs_mut()
            .append_pair("search_query", search_query)
            .append_pair("start", &start.to_string())
            .append_pair("max_results", &self.max_results.to_string());
        Ok(url)
    }
}

// === Atom feed types ===

#[derive(Debug, Deserialize)]
struct Feed {
    #[serde(rename = "entry", default)]
    entries: Vec<Entry>,
}

#[derive(Debug, Deserialize)]
struct Entry {
    id: String,
    title: String,
    summary: String,
    published: String,
    updated: String,
    #[serde(rename = "author", default)]
    authors: Vec<Author>,
}

#[derive(Debug, Deserialize)]
struct Author {
    name: String,
}

/// Parse an arXiv Atom feed into papers, one per entry.
pub fn parse_feed(xml: &str) -> Result<Vec<Paper>> {
    let feed: Feed = quick_xml::de::from_str(xml)
        .map_err(|e| HarvestError::Parse(format!("Failed to parse arXiv feed: {}", e)))?;

    feed.entries.into_iter().map(paper_from_entry).collect()
}

fn paper_from_entry(entry: Entry) -> Result<Paper> {
    let id = entry
        .id
        .trim()
        .rsplit('/')
        .next()
        .filter(|s| !s.is_empty())
        .ok_or_parse("arXiv entry id has no path segment")?
        .to_string();

    Ok(Paper {
        id,
        title: entry.title.trim().to_string(),
        authors: entry.authors.into_iter().map(|a| a.name).collect(),
        published: entry.published.trim().to_string(),
        updated: entry.updated.trim().to_string(),
        summary: single_line(&entry.summary),
    })
}

/// Trim and fold every line break (LF, CRLF or bare CR) into one space.
fn single_line(text: &str) -> String {
    text.trim().replace("\r\n", "\n").replace(['\r', '\n'], " ")
}
