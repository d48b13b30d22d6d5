//! Continuation-token extraction for author-search pagination.
//!
//! Scholar does not expose a page number for author search. The "next" button
//! carries an inline `onclick` handler whose URL holds an opaque
//! `after_author` token, and the next request must echo that token back.

use crate::error::{HarvestError, Result};
use regex::Regex;
use scraper::{Html, Selector};

/// What a page says about the next page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CursorProbe {
    /// A cursor for the next page.
    Next(String),
    /// The page has no active next-page control.
    NoControl,
    /// A next-page control exists but no cursor could be read from it.
    Unrecognized,
}

/// Reads the pagination cursor from an author-search page.
pub trait CursorExtractor: Send + Sync {
    fn probe(&self, page: &Html) -> CursorProbe;
}

/// Extracts `after_author` from the `onclick` handler of `button.gs_btnPR`.
pub struct OnclickCursor {
    button: Selector,
    token: Regex,
}

impl OnclickCursor {
    pub fn new() -> Result<Self> {
        let button =
            Selector::parse("button.gs_btnPR").map_err(|e| HarvestError::Parse(e.to_string()))?;
        // The handler is JavaScript with `=` and `&` escaped as \x3d and \x26.
        let token = Regex::new(r"after_author\\x3d(.*?)\\x26")
            .map_err(|e| HarvestError::Parse(e.to_string()))?;
        Ok(Self { button, token })
    }
}

impl CursorExtractor for OnclickCursor {
    fn probe(&self, page: &Html) -> CursorProbe {
        let onclick = page
            .select(&self.button)
            .filter_map(|b| b.value().attr("onclick"))
            .find(|js| !js.trim().is_empty());

        let Some(onclick) = onclick else {
            return CursorProbe::NoControl;
        };

        match self.token.captures(onclick).and_then(|c| c.get(1)) {
            Some(m) if !m.as_str().is_empty() => CursorProbe::Next(m.as_str().to_string()),
            _ => CursorProbe::Unrecognized,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn probe(html: &str) -> CursorProbe {
        let cursor = OnclickCursor::new().expect("cursor");
        cursor.probe(&Html::parse_document(html))
    }

    #[test]
    fn test_extracts_token() {
        let html = r#"<button type="button" class="gs_btnPR gs_in_ib gs_btn_half"
            onclick="window.location='/citations?view_op\x3dsearch_authors\x26hl\x3den\x26mauthors\x3dlabel:physics\x26after_author\x3dQ4aBAP7___8J\x26astart\x3d10'">
            <span class="gs_ico"></span></button>"#;
        assert_eq!(probe(html), CursorProbe::Next("Q4aBAP7___8J".to_string()));
    }

    #[test]
    fn test_disabled_button_is_no_control() {
        let html = r#"<button type="button" class="gs_btnPR gs_in_ib gs_btn_half" disabled>
            <span class="gs_ico"></span></button>"#;
        assert_eq!(probe(html), CursorProbe::NoControl);
        assert_eq!(probe("<html><body></body></html>"), CursorProbe::NoControl);
    }

    #[test]
    fn test_unexpected_handler_is_unrecognized() {
        let html = r#"<button class="gs_btnPR" onclick="gs_next_page(2)"></button>"#;
        assert_eq!(probe(html), CursorProbe::Unrecognized);
    }
}
