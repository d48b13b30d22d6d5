//! # scholar-harvest
//!
//! Search clients for arXiv, Scopus and Google Scholar that flatten results
//! into CSV rows.
//!
//! ## Modules
//!
//! - [`arxiv`] - arXiv Atom API, one page per call
//! - [`scopus`] - Scopus article and author search (API key)
//! - [`gscholar`] - Google Scholar author/article scraping with pagination
//! - [`harvest`] - Partial results of paginated searches
//! - [`record`] - Record kinds and their column schemas
//! - [`sink`] - CSV writer
//! - [`error`] - Custom error types
//!
//! ## Usage
//!
//! ```rust,no_run
//! use scholar_harvest::gscholar::ScholarClient;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let client = ScholarClient::new()?;
//!     let harvest = client.find_professor_by_university("physics", "Harvard University", 3).await?;
//!     println!("Found {} profiles ({})", harvest.len(), harvest.stop);
//!     harvest.write_csv(std::path::Path::new("./professors_harvard.csv"))?;
//!     Ok(())
//! }
//! ```

pub mod arxiv;
pub mod error;
pub mod gscholar;
pub mod harvest;
pub mod record;
pub mod scopus;
pub mod sink;

pub use error::{HarvestError, Result};
pub use harvest::{Harvest, StopReason};
pub use record::{Record, RecordKind};
