//! Elsevier Scopus API client.
//!
//! Two independent searches share one authenticated client: articles via
//! `search/scopus` and authors via `search/author`. Both return the first
//! `count` entries from `start`; there is no pagination loop.

use crate::error::{HarvestError, Result};
use crate::record::{cell, join_list, Record, RecordKind};
use crate::sink;
use serde::Deserialize;
use std::path::Path;
use tracing::{debug, info};
use url::Url;

/// Scopus content API root
pub const SCOPUS_API_URL: &str = "https://api.elsevier.com/content/";

/// Default number of results per request
pub const DEFAULT_COUNT: u32 = 10;

/// Article returned by the Scopus Search API
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScopusArticle {
    pub scopus_id: Option<String>,
    pub title: Option<String>,
    /// First author as reported by `dc:creator`
    pub authors: Option<String>,
    pub publication_name: Option<String>,
    pub doi: Option<String>,
    pub abstract_text: Option<String>,
    pub publication_date: Option<String>,
}

impl Record for ScopusArticle {
    const KIND: RecordKind = RecordKind::ScopusArticle;

    fn cells(&self) -> Vec<String> {
        vec![
            cell(&self.scopus_id),
            cell(&self.title),
            cell(&self.authors),
            cell(&self.publication_name),
            cell(&self.doi),
            cell(&self.abstract_text),
            cell(&self.publication_date),
        ]
    }
}

/// Subject area attached to an author profile.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct SubjectArea {
    #[serde(rename = "@abbrev", default)]
    pub abbrev: Option<String>,
    #[serde(rename = "@frequency", default)]
    pub frequency: Option<String>,
    /// Display name
    #[serde(rename = "$", default)]
    pub name: Option<String>,
}

/// Author returned by the Scopus Author Search API
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScopusPerson {
    pub scopus_id: Option<String>,
    /// "Surname, Given-name"
    pub name: Option<String>,
    pub affiliation: Option<String>,
    pub orcid: Option<String>,
    pub email: Option<String>,
    /// Kept structured; flattened to display names when written.
    pub research_areas: Vec<SubjectArea>,
}

impl Record for ScopusPerson {
    const KIND: RecordKind = RecordKind::ScopusPerson;

    fn cells(&self) -> Vec<String> {
        let areas: Vec<String> = self
            .research_areas
            .iter()
            .filter_map(|a| a.name.clone())
            .collect();

        vec![
            cell(&self.scopus_id),
            cell(&self.name),
            cell(&self.affiliation),
            cell(&self.orcid),
            cell(&self.email),
            join_list(Self::KIND, &areas),
        ]
    }
}

/// Build a field-scoped Scopus query, e.g. `TITLE(dark matter) AND SUBJAREA(PHYS)`.
pub fn build_query(field: &str, query: &str, subject: Option<&str>) -> Result<String> {
    let field = field.trim();
    if field.is_empty()
        || field
            .chars()
            .any(|c| c.is_whitespace() || c == '(' || c == ')')
    {
        return Err(HarvestError::Validation(format!(
            "Invalid Scopus search field '{}'",
            field
        )));
    }

    let mut expr = format!("{}({})", field, query);
    if let Some(subject) = subject.filter(|s| !s.is_empty()) {
        expr.push_str(&format!(" AND SUBJAREA({})", subject));
    }
    Ok(expr)
}

/// Resolve the sink selector, `"articles"` or `"people"`.
pub fn parse_kind(kind: &str) -> Result<RecordKind> {
    match kind {
        "articles" => Ok(RecordKind::ScopusArticle),
        "people" => Ok(RecordKind::ScopusPerson),
        other => Err(HarvestError::Validation(format!(
            "Invalid data type '{}'. Expected 'articles' or 'people'",
            other
        ))),
    }
}

/// Save Scopus records to CSV.
///
/// `kind` selects the column schema and must agree with the record type.
/// The selector is checked before the file is created.
pub fn save_to_csv<R: Record>(records: &[R], path: &Path, kind: &str) -> Result<()> {
    let selected = parse_kind(kind)?;
    if selected != R::KIND {
        return Err(HarvestError::Validation(format!(
            "Data type '{}' does not match {} records",
            kind,
            R::KIND
        )));
    }
    sink::write_csv(path, records)
}

/// Scopus API client authenticated with a static key
pub struct ScopusClient {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
    max_results: u32,
}

impl ScopusClient {
    /// Create a client sending `api_key` as `X-ELS-APIKey`.
    pub fn new(api_key: impl Into<String>, max_results: u32) -> Result<Self> {
        let api_key = api_key.into();
        if api_key.trim().is_empty() {
            return Err(HarvestError::Config("Scopus API key is empty".to_string()));
        }

        let client = reqwest::Client::builder()
            .build()
            .map_err(|e| HarvestError::Config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            api_key,
            base_url: SCOPUS_API_URL.to_string(),
            max_results,
        })
    }

    /// Point the client at a different API root.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        // `Url::join` replaces the last segment unless the base ends in `/`.
        let base_url = base_url.into();
        self.base_url = format!("{}/", base_url.trim_end_matches('/'));
        self
    }

    /// Search articles by a Scopus field code, optionally within a subject area.
    pub async fn search_articles(
        &self,
        field: &str,
        query: &str,
        subject: Option<&str>,
        start: u32,
    ) -> Result<Vec<ScopusArticle>> {
        let expr = build_query(field, query, subject)?;
        info!(query = %expr, start, "Searching Scopus articles");

        let body = self.get("search/scopus", &expr, start).await?;
        let articles = parse_article_results(&body)?;
        info!(count = articles.len(), "Parsed Scopus articles");
        Ok(articles)
    }

    /// Search author profiles by a free query (name, ORCID, …).
    pub async fn search_people(&self, query: &str, start: u32) -> Result<Vec<ScopusPerson>> {
        info!(query, start, "Searching Scopus authors");

        let body = self.get("search/author", query, start).await?;
        let people = parse_people_results(&body)?;
        info!(count = people.len(), "Parsed Scopus authors");
        Ok(people)
    }

    async fn get(&self, path: &str, query: &str, start: u32) -> Result<String> {
        let mut url = Url::parse(&self.base_url)
            .and_then(|base| base.join(path))
            .map_err(|e| HarvestError::Config(format!("Invalid base URL: {}", e)))?;
        url.query_pairs_mut()
            .append_pair("query", query)
            .append_pair("start", &start.to_string())
            .append_pair("count", &self.max_results.to_string());

        debug!(url = %url, "Fetching Scopus results");

        let response = self
            .client
            .get(url.as_str())
            .header("X-ELS-APIKey", &self.api_key)
            .header("Accept", "application/json")
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(HarvestError::Api {
                code: status.as_u16(),
                message: format!("Failed to retrieve data from Scopus: {}", status),
            });
        }

        Ok(response.text().await?)
    }
}

// === Scopus API Response Types ===

#[derive(Debug, Deserialize)]
struct Envelope<E> {
    #[serde(rename = "search-results")]
    search_results: Option<SearchResults<E>>,
}

#[derive(Debug, Deserialize)]
struct SearchResults<E> {
    #[serde(default = "Vec::new")]
    entry: Vec<E>,
}

/// Scopus collapses one-element arrays into bare objects in some fields.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum OneOrMany<T> {
    Many(Vec<T>),
    One(T),
}

impl<T> OneOrMany<T> {
    fn into_vec(self) -> Vec<T> {
        match self {
            Self::Many(items) => items,
            Self::One(item) => vec![item],
        }
    }
}

#[derive(Debug, Deserialize)]
struct ArticleEntry {
    /// Present only on the placeholder entry of an empty result set
    error: Option<String>,
    #[serde(rename = "dc:identifier")]
    identifier: Option<String>,
    #[serde(rename = "dc:title")]
    title: Option<String>,
    #[serde(rename = "dc:creator")]
    creator: Option<String>,
    #[serde(rename = "prism:publicationName")]
    publication_name: Option<String>,
    #[serde(rename = "prism:doi")]
    doi: Option<String>,
    #[serde(rename = "dc:description")]
    description: Option<String>,
    #[serde(rename = "prism:coverDate")]
    cover_date: Option<String>,
}

#[derive(Debug, Deserialize)]
struct PersonEntry {
    error: Option<String>,
    #[serde(rename = "dc:identifier")]
    identifier: Option<String>,
    #[serde(rename = "preferred-name")]
    preferred_name: Option<PreferredName>,
    #[serde(rename = "affiliation-current")]
    affiliation_current: Option<OneOrMany<Affiliation>>,
    orcid: Option<String>,
    #[serde(rename = "author-profile")]
    author_profile: Option<AuthorProfile>,
    #[serde(rename = "subject-area")]
    subject_area: Option<OneOrMany<SubjectArea>>,
}

#[derive(Debug, Deserialize)]
struct PreferredName {
    surname: Option<String>,
    #[serde(rename = "given-name")]
    given_name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Affiliation {
    #[serde(rename = "affiliation-name")]
    name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct AuthorProfile {
    #[serde(rename = "author-email")]
    email: Option<String>,
}

fn entries<E: serde::de::DeserializeOwned>(json: &str) -> Result<Vec<E>> {
    let envelope: Envelope<E> = serde_json::from_str(json)?;
    Ok(envelope
        .search_results
        .map(|r| r.entry)
        .unwrap_or_default())
}

/// Parse a Scopus Search API response into articles.
pub fn parse_article_results(json: &str) -> Result<Vec<ScopusArticle>> {
    let articles = entries::<ArticleEntry>(json)?
        .into_iter()
        .filter(|e| e.error.is_none())
        .map(|e| ScopusArticle {
            scopus_id: e.identifier,
            title: e.title,
            authors: e.creator,
            publication_name: e.publication_name,
            doi: e.doi,
            abstract_text: e.description,
            publication_date: e.cover_date,
        })
        .collect();
    Ok(articles)
}

/// Parse a Scopus Author Search API response into people.
pub fn parse_people_results(json: &str) -> Result<Vec<ScopusPerson>> {
    let people = entries::<PersonEntry>(json)?
        .into_iter()
        .filter(|e| e.error.is_none())
        .map(|e| ScopusPerson {
            scopus_id: e.identifier,
            name: e.preferred_name.and_then(display_name),
            affiliation: e
                .affiliation_current
                .and_then(|a| a.into_vec().into_iter().find_map(|aff| aff.name)),
            orcid: e.orcid,
            email: e.author_profile.and_then(|p| p.email),
            research_areas: e.subject_area.map(OneOrMany::into_vec).unwrap_or_default(),
        })
        .collect();
    Ok(people)
}

fn display_name(name: PreferredName) -> Option<String> {
    match (name.surname, name.given_name) {
        (Some(surname), Some(given)) => Some(format!("{}, {}", surname, given)),
        (Some(only), None) | (None, Some(only)) => Some(only),
        (None, None) => None,
    }
}
