//! Partial-result model for paginated searches.
//!
//! A paginated search never discards what it already collected. It returns a
//! [`Harvest`] holding the records plus the reason pagination stopped, so a
//! caller can tell "no more results" apart from "page 3 failed to load".

use crate::error::Result;
use crate::record::Record;
use crate::sink;
use std::fmt;
use std::path::Path;

/// Why a paginated search stopped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StopReason {
    /// The source reported no further pages.
    Exhausted,
    /// The caller's page bound was reached.
    PageLimit,
    /// A next-page control was present but no cursor could be read from it.
    CursorUnreadable,
    /// A page could not be fetched. `page` is 1-based.
    TransportFailure { page: usize, error: String },
}

impl fmt::Display for StopReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Exhausted => f.write_str("exhausted"),
            Self::PageLimit => f.write_str("page limit reached"),
            Self::CursorUnreadable => f.write_str("next-page cursor unreadable"),
            Self::TransportFailure { page, error } => {
                write!(f, "page {} failed: {}", page, error)
            }
        }
    }
}

/// Records collected by a paginated search.
#[derive(Debug, Clone)]
pub struct Harvest<T> {
    pub records: Vec<T>,
    pub pages_fetched: usize,
    pub stop: StopReason,
}

impl<T> Harvest<T> {
    pub fn new(records: Vec<T>, pages_fetched: usize, stop: StopReason) -> Self {
        Self {
            records,
            pages_fetched,
            stop,
        }
    }

    /// True when pagination ended normally rather than being cut short.
    pub fn is_complete(&self) -> bool {
        matches!(self.stop, StopReason::Exhausted | StopReason::PageLimit)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl<T: Record> Harvest<T> {
    /// Write the collected records, whatever the stop reason.
    pub fn write_csv(&self, path: &Path) -> Result<()> {
        sink::write_csv(path, &self.records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_completion() {
        let done: Harvest<u8> = Harvest::new(vec![1, 2], 1, StopReason::Exhausted);
        assert!(done.is_complete());

        let cut: Harvest<u8> = Harvest::new(
            vec![1],
            1,
            StopReason::TransportFailure {
                page: 2,
                error: "timeout".to_string(),
            },
        );
        assert!(!cut.is_complete());
        assert_eq!(cut.stop.to_string(), "page 2 failed: timeout");

        let unreadable: Harvest<u8> = Harvest::new(vec![], 1, StopReason::CursorUnreadable);
        assert!(!unreadable.is_complete());
    }
}
