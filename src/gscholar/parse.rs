//! HTML extraction for Scholar author cards, profile pages and article results.
//!
//! Extraction never fails on missing markup: an element that is not there
//! gives `None` for that field.

use crate::error::{HarvestError, Result};
use crate::record::{cell, join_list, Record, RecordKind};
use scraper::{ElementRef, Html, Selector};

use super::transport::DEFAULT_SCHOLAR_URL;

/// Author profile from a search result card or a profile page
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScholarProfile {
    pub name: Option<String>,
    /// Absolute profile URL
    pub link: Option<String>,
    pub affiliations: Option<String>,
    /// Usually "Verified email at <domain>"; the address itself is never shown
    pub email: Option<String>,
    /// Free text such as "Cited by 1234"
    pub cited_by: Option<String>,
    pub interests: Vec<String>,
}

impl Record for ScholarProfile {
    const KIND: RecordKind = RecordKind::ScholarProfile;

    fn cells(&self) -> Vec<String> {
        vec![
            cell(&self.name),
            cell(&self.link),
            cell(&self.affiliations),
            cell(&self.email),
            cell(&self.cited_by),
            join_list(Self::KIND, &self.interests),
        ]
    }
}

/// Article from a `/scholar` result page
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScholarArticle {
    pub title: Option<String>,
    pub link: Option<String>,
    pub authors: Option<String>,
    /// Venue segment of the byline, e.g. "Nature, 2020"
    pub journal_info: Option<String>,
}

impl Record for ScholarArticle {
    const KIND: RecordKind = RecordKind::ScholarArticle;

    fn cells(&self) -> Vec<String> {
        vec![
            cell(&self.title),
            cell(&self.link),
            cell(&self.authors),
            cell(&self.journal_info),
        ]
    }
}

/// Compiled selectors for every page shape the client reads.
pub struct Selectors {
    author_card: Selector,
    author_name: Selector,
    author_aff: Selector,
    author_email: Selector,
    author_cited_by: Selector,
    author_interest: Selector,
    profile_name: Selector,
    profile_aff: Selector,
    profile_email: Selector,
    profile_interest: Selector,
    profile_citations: Selector,
    article: Selector,
    article_heading: Selector,
    article_link: Selector,
    article_byline: Selector,
}

fn selector(css: &str) -> Result<Selector> {
    Selector::parse(css).map_err(|e| HarvestError::Parse(format!("{}: {}", css, e)))
}

impl Selectors {
    pub fn new() -> Result<Self> {
        Ok(Self {
            author_card: selector(".gs_ai_chpr")?,
            author_name: selector(".gs_ai_name a")?,
            author_aff: selector(".gs_ai_aff")?,
            author_email: selector(".gs_ai_eml")?,
            author_cited_by: selector(".gs_ai_cby")?,
            author_interest: selector(".gs_ai_one_int")?,
            profile_name: selector("#gsc_prf_in")?,
            profile_aff: selector(".gsc_prf_il")?,
            profile_email: selector("#gsc_prf_ivh")?,
            profile_interest: selector("#gsc_prf_int a.gsc_prf_inta")?,
            profile_citations: selector("#gsc_rsb_st .gsc_rsb_std")?,
            article: selector(".gs_ri")?,
            article_heading: selector(".gs_rt")?,
            article_link: selector(".gs_rt a")?,
            article_byline: selector(".gs_a")?,
        })
    }
}

/// Text of the first match, whitespace collapsed; `None` if absent or blank.
fn first_text(scope: ElementRef<'_>, sel: &Selector) -> Option<String> {
    scope.select(sel).next().and_then(normalized)
}

fn normalized(el: ElementRef<'_>) -> Option<String> {
    let text = el.text().collect::<String>();
    let text = text.split_whitespace().collect::<Vec<_>>().join(" ");
    (!text.is_empty()).then_some(text)
}

fn all_texts(scope: ElementRef<'_>, sel: &Selector) -> Vec<String> {
    scope.select(sel).filter_map(normalized).collect()
}

/// Make a Scholar-relative href absolute.
fn absolute_link(href: &str) -> String {
    if href.starts_with('/') {
        format!("{}{}", DEFAULT_SCHOLAR_URL, href)
    } else {
        href.to_string()
    }
}

/// Parse the author cards of a `view_op=search_authors` page.
pub fn parse_author_cards(doc: &Html, sel: &Selectors) -> Vec<ScholarProfile> {
    doc.select(&sel.author_card)
        .map(|card| {
            let name_link = card.select(&sel.author_name).next();
            ScholarProfile {
                name: name_link.and_then(normalized),
                link: name_link
                    .and_then(|a| a.value().attr("href"))
                    .map(absolute_link),
                affiliations: first_text(card, &sel.author_aff),
                email: first_text(card, &sel.author_email),
                cited_by: first_text(card, &sel.author_cited_by),
                interests: all_texts(card, &sel.author_interest),
            }
        })
        .collect()
}

/// Parse a single profile page (`/citations?user=…`).
///
/// Returns `None` when the page has no profile header.
pub fn parse_profile_page(doc: &Html, sel: &Selectors, link: &str) -> Option<ScholarProfile> {
    let root = doc.root_element();
    let name = first_text(root, &sel.profile_name)?;

    // "Verified email at mit.edu - Homepage"
    let email = first_text(root, &sel.profile_email).and_then(|text| {
        text.split(" - ")
            .next()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
    });

    Some(ScholarProfile {
        name: Some(name),
        link: Some(link.to_string()),
        affiliations: first_text(root, &sel.profile_aff),
        email,
        cited_by: first_text(root, &sel.profile_citations),
        interests: all_texts(root, &sel.profile_interest),
    })
}

/// Parse the result blocks of a `/scholar` search page.
pub fn parse_articles(doc: &Html, sel: &Selectors) -> Vec<ScholarArticle> {
    doc.select(&sel.article)
        .map(|item| {
            let link_el = item.select(&sel.article_link).next();
            let title = match link_el {
                Some(a) => normalized(a),
                // [CITATION] entries have a heading without a link
                None => first_text(item, &sel.article_heading),
            }
            .map(|t| t.replace('"', ""));

            let (authors, journal_info) = match first_text(item, &sel.article_byline) {
                Some(byline) => split_byline(&byline),
                None => (None, None),
            };

            ScholarArticle {
                title,
                link: link_el
                    .and_then(|a| a.value().attr("href"))
                    .map(str::to_string),
                authors,
                journal_info,
            }
        })
        .collect()
}

/// Split "authors - venue - host" into authors and venue.
pub fn split_byline(byline: &str) -> (Option<String>, Option<String>) {
    let mut parts = byline.split(" - ").map(str::trim);
    let authors = parts.next().filter(|s| !s.is_empty()).map(str::to_string);
    let venue = parts.next().filter(|s| !s.is_empty()).map(str::to_string);
    (authors, venue)
}

#[cfg(test)]
mod tests {
    use super::*;

    const AUTHOR_PAGE: &str = r#"<html><body>
      <div class="gsc_1usr">
        <div class="gs_ai gs_scl gs_ai_chpr">
          <h3 class="gs_ai_name"><a href="/citations?hl=en&amp;user=AbC123">Lisa Randall</a></h3>
          <div class="gs_ai_aff">Professor of Physics,
             Harvard University</div>
          <div class="gs_ai_eml">Verified email at physics.harvard.edu</div>
          <div class="gs_ai_cby">Cited by 45210</div>
          <div class="gs_ai_int">
            <a class="gs_ai_one_int" href="/citations?view_op=search_authors&amp;mauthors=label:particle_physics">Particle Physics</a>
            <a class="gs_ai_one_int" href="/citations?view_op=search_authors&amp;mauthors=label:cosmology">Cosmology</a>
          </div>
        </div>
        <div class="gs_ai gs_scl gs_ai_chpr">
          <h3 class="gs_ai_name"><a href="/citations?hl=en&amp;user=XyZ789">Anonymous Postdoc</a></h3>
          <div class="gs_ai_aff">Harvard University</div>
        </div>
      </div>
    </body></html>"#;

    const PROFILE_PAGE: &str = r##"<html><body>
      <div id="gsc_prf_i">
        <div id="gsc_prf_in">Carlo Rovelli</div>
        <div class="gsc_prf_il">Aix-Marseille University, CPT</div>
        <div class="gsc_prf_il" id="gsc_prf_ivh">Verified email at cpt.univ-mrs.fr - <a href="http://example.org">Homepage</a></div>
        <div class="gsc_prf_il" id="gsc_prf_int">
          <a class="gsc_prf_inta gs_ibl" href="#">Quantum Gravity</a>
          <a class="gsc_prf_inta gs_ibl" href="#">Loop Quantum Gravity</a>
        </div>
      </div>
      <table id="gsc_rsb_st"><tbody>
        <tr><td class="gsc_rsb_sc1">Citations</td><td class="gsc_rsb_std">61000</td><td class="gsc_rsb_std">21000</td></tr>
      </tbody></table>
    </body></html>"##;

    const ARTICLE_PAGE: &str = r#"<html><body>
      <div class="gs_r gs_or gs_scl"><div class="gs_ri">
        <h3 class="gs_rt"><a href="https://arxiv.org/abs/gr-qc/9505006">Spin networks and <b>"quantum"</b> gravity</a></h3>
        <div class="gs_a">C Rovelli, L Smolin&nbsp;- Physical Review D, 1995&nbsp;- APS</div>
      </div></div>
      <div class="gs_r gs_or gs_scl"><div class="gs_ri">
        <h3 class="gs_rt"><span class="gs_ctu">[CITATION]</span> Quantum gravity</h3>
        <div class="gs_a">C Rovelli</div>
      </div></div>
      <div class="gs_r gs_or gs_scl"><div class="gs_ri">
        <h3 class="gs_rt"><a href="https://example.org/x">No byline</a></h3>
      </div></div>
    </body></html>"#;

    fn selectors() -> Selectors {
        Selectors::new().expect("selectors compile")
    }

    #[test]
    fn test_parse_author_cards() {
        let doc = Html::parse_document(AUTHOR_PAGE);
        let profiles = parse_author_cards(&doc, &selectors());
        assert_eq!(profiles.len(), 2);

        let first = &profiles[0];
        assert_eq!(first.name.as_deref(), Some("Lisa Randall"));
        assert_eq!(
            first.link.as_deref(),
            Some("https://scholar.google.com/citations?hl=en&user=AbC123")
        );
        assert_eq!(
            first.affiliations.as_deref(),
            Some("Professor of Physics, Harvard University")
        );
        assert_eq!(first.email.as_deref(), Some("Verified email at physics.harvard.edu"));
        assert_eq!(first.cited_by.as_deref(), Some("Cited by 45210"));
        assert_eq!(first.interests, vec!["Particle Physics", "Cosmology"]);

        let second = &profiles[1];
        assert!(second.email.is_none());
        assert!(second.cited_by.is_none());
        assert!(second.interests.is_empty());
        assert_eq!(second.cells()[3], "");
    }

    #[test]
    fn test_profiles_csv_round_trip() -> Result<()> {
        let dir = tempfile::TempDir::new()?;
        let path = dir.path().join("profiles.csv");
        let doc = Html::parse_document(AUTHOR_PAGE);
        let profiles = parse_author_cards(&doc, &selectors());

        crate::sink::write_csv(&path, &profiles)?;

        let mut rdr = csv::Reader::from_path(&path)?;
        assert_eq!(
            rdr.headers()?.iter().collect::<Vec<_>>(),
            RecordKind::ScholarProfile.columns()
        );
        let rows: Vec<csv::StringRecord> = rdr.records().collect::<std::result::Result<_, _>>()?;
        assert_eq!(rows.len(), 2);
        assert_eq!(&rows[0][0], "Lisa Randall");
        assert_eq!(
            rows[0][5].split(", ").collect::<Vec<_>>(),
            vec!["Particle Physics", "Cosmology"]
        );
        assert_eq!(&rows[1][5], "");
        Ok(())
    }

    #[test]
    fn test_parse_profile_page() {
        let doc = Html::parse_document(PROFILE_PAGE);
        let link = "https://scholar.google.com/citations?hl=en&user=rovelli";
        let profile = parse_profile_page(&doc, &selectors(), link).expect("profile");
        assert_eq!(profile.name.as_deref(), Some("Carlo Rovelli"));
        assert_eq!(profile.affiliations.as_deref(), Some("Aix-Marseille University, CPT"));
        assert_eq!(profile.email.as_deref(), Some("Verified email at cpt.univ-mrs.fr"));
        assert_eq!(profile.cited_by.as_deref(), Some("61000"));
        assert_eq!(profile.interests, vec!["Quantum Gravity", "Loop Quantum Gravity"]);
        assert_eq!(profile.link.as_deref(), Some(link));
    }

    #[test]
    fn test_profile_page_without_header() {
        let doc = Html::parse_document("<html><body><p>Not found</p></body></html>");
        assert!(parse_profile_page(&doc, &selectors(), "x").is_none());
    }

    #[test]
    fn test_parse_articles() {
        let doc = Html::parse_document(ARTICLE_PAGE);
        let articles = parse_articles(&doc, &selectors());
        assert_eq!(articles.len(), 3);

        assert_eq!(
            articles[0].title.as_deref(),
            Some("Spin networks and quantum gravity")
        );
        assert_eq!(
            articles[0].link.as_deref(),
            Some("https://arxiv.org/abs/gr-qc/9505006")
        );
        assert_eq!(articles[0].authors.as_deref(), Some("C Rovelli, L Smolin"));
        assert_eq!(
            articles[0].journal_info.as_deref(),
            Some("Physical Review D, 1995")
        );

        assert_eq!(articles[1].title.as_deref(), Some("[CITATION] Quantum gravity"));
        assert!(articles[1].link.is_none());
        assert_eq!(articles[1].authors.as_deref(), Some("C Rovelli"));
        assert!(articles[1].journal_info.is_none());

        assert!(articles[2].authors.is_none());
        assert!(articles[2].journal_info.is_none());
    }

    #[test]
    fn test_split_byline() {
        assert_eq!(
            split_byline("A Author, B Author - Journal of Things, 2021 - example.com"),
            (
                Some("A Author, B Author".to_string()),
                Some("Journal of Things, 2021".to_string())
            )
        );
        assert_eq!(split_byline("Solo"), (Some("Solo".to_string()), None));
        assert_eq!(split_byline(""), (None, None));
    }
}
