//! Google Scholar scraping client.
//!
//! Author search pages through Scholar's opaque `after_author` cursor; article
//! search pages by offset (`start = page * 10`). Neither loop raises on a
//! failed page: the returned [`Harvest`] keeps every record collected so far
//! and records why paging stopped.

pub mod cursor;
pub mod parse;
pub mod transport;

pub use cursor::{CursorExtractor, CursorProbe, OnclickCursor};
pub use parse::{ScholarArticle, ScholarProfile, Selectors};
pub use transport::{Endpoint, HttpFetcher, PageFetcher, Params, DEFAULT_SCHOLAR_URL};

use crate::error::{HarvestError, Result};
use crate::harvest::{Harvest, StopReason};
use scraper::Html;
use tracing::{debug, info, warn};
use url::Url;

/// Results per Scholar page, for both search modes
const PAGE_SIZE: usize = 10;

/// Default page bound for author search
pub const DEFAULT_AUTHOR_PAGES: usize = 10;

/// Default page bound for article search
pub const DEFAULT_ARTICLE_PAGES: usize = 2;

fn pair(key: &str, value: impl Into<String>) -> (String, String) {
    (key.to_string(), value.into())
}

/// `mauthors` expression: `label:<label> "<phrase>"`, or just the quoted phrase.
pub fn mauthors_query(label: &str, phrase: &str) -> String {
    let label = label.trim();
    if label.is_empty() {
        format!("\"{}\"", phrase)
    } else {
        format!("label:{} \"{}\"", label, phrase)
    }
}

fn author_params(mauthors: &str, astart: usize, after_author: Option<&str>) -> Params {
    let mut params = vec![
        pair("view_op", "search_authors"),
        pair("mauthors", mauthors),
        pair("hl", "en"),
        pair("astart", astart.to_string()),
    ];
    if let Some(token) = after_author {
        params.push(pair("after_author", token));
    }
    params
}

fn article_params(query: &str, page: usize) -> Params {
    vec![
        pair("q", query),
        pair("hl", "en"),
        pair("start", (page * PAGE_SIZE).to_string()),
        pair("as_sdt", "0,5"),
    ]
}

/// Public profile URL for a Scholar user id, query-encoded.
fn profile_link(scholar_id: &str) -> Result<String> {
    let mut url = Url::parse(&format!("{}{}", DEFAULT_SCHOLAR_URL, Endpoint::Citations.path()))
        .map_err(|e| HarvestError::Config(format!("Invalid profile URL: {}", e)))?;
    url.query_pairs_mut()
        .append_pair("hl", "en")
        .append_pair("user", scholar_id);
    Ok(url.into())
}

fn require(value: &str, what: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(HarvestError::Validation(format!("{} must not be empty", what)));
    }
    Ok(())
}

/// Google Scholar client
pub struct ScholarClient {
    fetcher: Box<dyn PageFetcher>,
    cursor: Box<dyn CursorExtractor>,
    selectors: Selectors,
}

impl ScholarClient {
    /// Client talking to scholar.google.com directly.
    pub fn new() -> Result<Self> {
        Self::with_fetcher(HttpFetcher::new(None)?)
    }

    /// Client using any page transport.
    pub fn with_fetcher(fetcher: impl PageFetcher + 'static) -> Result<Self> {
        Ok(Self {
            fetcher: Box::new(fetcher),
            cursor: Box::new(OnclickCursor::new()?),
            selectors: Selectors::new()?,
        })
    }

    /// Replace the continuation-token strategy.
    pub fn with_cursor(mut self, cursor: impl CursorExtractor + 'static) -> Self {
        self.cursor = Box::new(cursor);
        self
    }

    /// Profiles labelled with `label` whose affiliation matches `university`.
    pub async fn find_professor_by_university(
        &self,
        label: &str,
        university: &str,
        max_pages: usize,
    ) -> Result<Harvest<ScholarProfile>> {
        require(university, "University name")?;
        Ok(self
            .collect_profiles(&mauthors_query(label, university), max_pages)
            .await)
    }

    /// Profiles matching a field of study phrase.
    pub async fn find_professor_by_field(
        &self,
        field: &str,
        max_pages: usize,
    ) -> Result<Harvest<ScholarProfile>> {
        require(field, "Field")?;
        Ok(self.collect_profiles(&mauthors_query("", field), max_pages).await)
    }

    /// Profiles matching a name; first result page only.
    pub async fn find_professor_by_name(&self, name: &str) -> Result<Harvest<ScholarProfile>> {
        require(name, "Name")?;
        Ok(self.collect_profiles(&mauthors_query("", name), 1).await)
    }

    /// The profile page of one Scholar user id.
    pub async fn find_professor_by_id(&self, scholar_id: &str) -> Result<Harvest<ScholarProfile>> {
        require(scholar_id, "Scholar id")?;
        let params = vec![pair("user", scholar_id), pair("hl", "en")];

        let html = match self.fetcher.fetch(Endpoint::Citations, &params).await {
            Ok(html) => html,
            Err(e) => return Ok(transport_failure(Vec::new(), 0, e)),
        };

        let link = profile_link(scholar_id)?;
        let doc = Html::parse_document(&html);
        let records: Vec<ScholarProfile> =
            parse::parse_profile_page(&doc, &self.selectors, &link)
                .into_iter()
                .collect();
        if records.is_empty() {
            warn!(user = scholar_id, "No profile header on page");
        }
        Ok(Harvest::new(records, 1, StopReason::Exhausted))
    }

    /// Articles by an author, matched as an exact phrase.
    pub async fn find_article_by_professor_name(
        &self,
        professor_name: &str,
        pages: usize,
    ) -> Result<Harvest<ScholarArticle>> {
        require(professor_name, "Professor name")?;
        Ok(self
            .collect_articles(&format!("\"{}\"", professor_name), pages)
            .await)
    }

    /// Articles matching a free-text field query.
    pub async fn find_article_by_field(
        &self,
        field: &str,
        pages: usize,
    ) -> Result<Harvest<ScholarArticle>> {
        require(field, "Field")?;
        Ok(self.collect_articles(field, pages).await)
    }

    /// Author-search loop driven by the continuation cursor.
    async fn collect_profiles(&self, mauthors: &str, max_pages: usize) -> Harvest<ScholarProfile> {
        let mut records = Vec::new();
        let mut pages = 0;
        let mut astart = 0;
        let mut after_author: Option<String> = None;

        if max_pages == 0 {
            return Harvest::new(records, 0, StopReason::PageLimit);
        }

        loop {
            info!(page = pages + 1, astart, mauthors, "Extracting authors");
            let params = author_params(mauthors, astart, after_author.as_deref());

            let html = match self.fetcher.fetch(Endpoint::Citations, &params).await {
                Ok(html) => html,
                Err(e) => return transport_failure(records, pages, e),
            };
            pages += 1;

            let (profiles, probe) = self.parse_author_page(&html);
            info!(page = pages, count = profiles.len(), "Parsed author cards");
            records.extend(profiles);

            match probe {
                CursorProbe::Next(token) => {
                    if pages >= max_pages {
                        return Harvest::new(records, pages, StopReason::PageLimit);
                    }
                    debug!(token = %token, "Next author page");
                    after_author = Some(token);
                    astart += PAGE_SIZE;
                }
                CursorProbe::NoControl => {
                    return Harvest::new(records, pages, StopReason::Exhausted);
                }
                CursorProbe::Unrecognized => {
                    warn!(page = pages, "Next-page control present but cursor unreadable");
                    return Harvest::new(records, pages, StopReason::CursorUnreadable);
                }
            }
        }
    }

    fn parse_author_page(&self, html: &str) -> (Vec<ScholarProfile>, CursorProbe) {
        let doc = Html::parse_document(html);
        let profiles = parse::parse_author_cards(&doc, &self.selectors);
        let probe = self.cursor.probe(&doc);
        (profiles, probe)
    }

    /// Article-search loop over a fixed number of offset pages.
    async fn collect_articles(&self, query: &str, pages: usize) -> Harvest<ScholarArticle> {
        let mut records = Vec::new();

        for page in 0..pages {
            let params = article_params(query, page);
            let html = match self.fetcher.fetch(Endpoint::Articles, &params).await {
                Ok(html) => html,
                Err(e) => return transport_failure(records, page, e),
            };

            let articles = {
                let doc = Html::parse_document(&html);
                parse::parse_articles(&doc, &self.selectors)
            };
            info!(page = page + 1, count = articles.len(), "Parsed articles");
            records.extend(articles);
        }

        Harvest::new(records, pages, StopReason::PageLimit)
    }
}

/// Stop after `fetched` good pages because the next one failed.
fn transport_failure<T>(records: Vec<T>, fetched: usize, error: HarvestError) -> Harvest<T> {
    let page = fetched + 1;
    warn!(page, error = %error, kept = records.len(), "Page fetch failed, stopping early");
    Harvest::new(
        records,
        fetched,
        StopReason::TransportFailure {
            page,
            error: error.to_string(),
        },
    )
}
