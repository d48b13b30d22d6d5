//! scholar-harvest - academic search to CSV
//!
//! ## Usage
//!
//! ```bash
//! scholar-harvest arxiv --field author --query "K. Azizi"
//! scholar-harvest scopus articles --field TITLE --query "quantum computing" --subject PHYS --api-key $KEY
//! scholar-harvest scholar professors-by-university --label physics --university "Harvard University"
//! ```

use anyhow::{Context, Result};
use chrono::Local;
use clap::{Parser, Subcommand};
use scholar_harvest::arxiv::{self, ArxivClient};
use scholar_harvest::gscholar::{self, HttpFetcher, ScholarClient};
use scholar_harvest::scopus::{self, ScopusClient};
use scholar_harvest::{sink, Harvest, Record};
use std::path::{Path, PathBuf};
use tracing::{info, warn, Level};
use tracing_subscriber::{fmt, EnvFilter};

// ============================================================================
// CLI Definition
// ============================================================================

/// Search arXiv, Scopus and Google Scholar and save the results as CSV
#[derive(Parser)]
#[command(name = "scholar-harvest")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Search the arXiv API (one page)
    Arxiv {
        /// Field: title, author, abstract, doi, orcid, arxiv_id, all
        #[arg(long, default_value = "all")]
        field: String,

        /// Search term
        #[arg(long)]
        query: String,

        /// arXiv category, e.g. quant-ph
        #[arg(long)]
        subject: Option<String>,

        /// Offset of the first result
        #[arg(long, default_value_t = 0)]
        start: u32,

        /// Results per request
        #[arg(long, default_value_t = arxiv::DEFAULT_MAX_RESULTS)]
        max_results: u32,

        /// Output CSV path
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Search the Scopus API
    Scopus {
        /// Elsevier API key
        #[arg(long, global = true)]
        api_key: Option<String>,

        /// Results per request
        #[arg(long, global = true, default_value_t = scopus::DEFAULT_COUNT)]
        count: u32,

        #[command(subcommand)]
        action: ScopusAction,
    },

    /// Scrape Google Scholar
    Scholar {
        /// Proxy URL (e.g., http://127.0.0.1:7890)
        #[arg(long, global = true)]
        proxy: Option<String>,

        /// Mirror site URL
        #[arg(long, global = true)]
        mirror: Option<String>,

        #[command(subcommand)]
        action: ScholarAction,
    },
}

#[derive(Subcommand)]
enum ScopusAction {
    /// Article search: FIELD(QUERY) [AND SUBJAREA(SUBJECT)]
    Articles {
        /// Scopus field code, e.g. TITLE, AUTHOR-NAME, TITLE-ABS-KEY
        #[arg(long)]
        field: String,

        #[arg(long)]
        query: String,

        /// Subject area code, e.g. PHYS
        #[arg(long)]
        subject: Option<String>,

        #[arg(long, default_value_t = 0)]
        start: u32,

        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Author search
    People {
        #[arg(long)]
        query: String,

        #[arg(long, default_value_t = 0)]
        start: u32,

        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[derive(Subcommand)]
enum ScholarAction {
    /// Profiles by label and university
    ProfessorsByUniversity {
        #[arg(long)]
        label: String,

        #[arg(long)]
        university: String,

        /// Maximum result pages
        #[arg(long, default_value_t = gscholar::DEFAULT_AUTHOR_PAGES)]
        pages: usize,

        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Profiles by field of study
    ProfessorsByField {
        #[arg(long)]
        field: String,

        #[arg(long, default_value_t = gscholar::DEFAULT_AUTHOR_PAGES)]
        pages: usize,

        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Profiles by name (first page)
    ProfessorByName {
        #[arg(long)]
        name: String,

        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// One profile by Scholar user id
    ProfessorById {
        #[arg(long)]
        id: String,

        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Articles by author name
    ArticlesByProfessor {
        #[arg(long)]
        name: String,

        #[arg(long, default_value_t = gscholar::DEFAULT_ARTICLE_PAGES)]
        pages: usize,

        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Articles by field
    ArticlesByField {
        #[arg(long)]
        field: String,

        #[arg(long, default_value_t = gscholar::DEFAULT_ARTICLE_PAGES)]
        pages: usize,

        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

// ============================================================================
// Main Entry Point
// ============================================================================

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let log_level = if cli.debug { Level::DEBUG } else { Level::INFO };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(log_level.to_string()));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(false)
        .init();

    match cli.command {
        Commands::Arxiv {
            field,
            query,
            subject,
            start,
            max_results,
            output,
        } => run_arxiv(&field, &query, subject.as_deref(), start, max_results, output).await,
        Commands::Scopus {
            api_key,
            count,
            action,
        } => run_scopus(api_key, count, action).await,
        Commands::Scholar {
            proxy,
            mirror,
            action,
        } => run_scholar(proxy, mirror, action).await,
    }
}

// ============================================================================
// Sources
// ============================================================================

async fn run_arxiv(
    field: &str,
    query: &str,
    subject: Option<&str>,
    start: u32,
    max_results: u32,
    output: Option<PathBuf>,
) -> Result<()> {
    let client = ArxivClient::new(max_results)?;
    let papers = client
        .search(field, query, subject, start)
        .await
        .context("arXiv search failed")?;

    for paper in &papers {
        println!("{}  {}", paper.id, paper.title);
    }

    save(&output_path(output, "arxiv"), &papers)
}

async fn run_scopus(api_key: Option<String>, count: u32, action: ScopusAction) -> Result<()> {
    let api_key = api_key.context("--api-key is required for Scopus")?;
    let client = ScopusClient::new(api_key, count)?;

    match action {
        ScopusAction::Articles {
            field,
            query,
            subject,
            start,
            output,
        } => {
            let articles = client
                .search_articles(&field, &query, subject.as_deref(), start)
                .await
                .context("Scopus article search failed")?;
            let path = output_path(output, "scopus_articles");
            scopus::save_to_csv(&articles, &path, "articles")
                .with_context(|| format!("Failed to write {}", path.display()))?;
            println!("Saved {} articles to {}", articles.len(), path.display());
        }
        ScopusAction::People {
            query,
            start,
            output,
        } => {
            let people = client
                .search_people(&query, start)
                .await
                .context("Scopus author search failed")?;
            let path = output_path(output, "scopus_people");
            scopus::save_to_csv(&people, &path, "people")
                .with_context(|| format!("Failed to write {}", path.display()))?;
            println!("Saved {} people to {}", people.len(), path.display());
        }
    }
    Ok(())
}

async fn run_scholar(
    proxy: Option<String>,
    mirror: Option<String>,
    action: ScholarAction,
) -> Result<()> {
    let mut fetcher = HttpFetcher::new(proxy.as_deref())?;
    if let Some(mirror) = mirror.as_deref() {
        fetcher = fetcher.with_base_url(mirror);
    }
    let client = ScholarClient::with_fetcher(fetcher)?;

    match action {
        ScholarAction::ProfessorsByUniversity {
            label,
            university,
            pages,
            output,
        } => {
            let harvest = client
                .find_professor_by_university(&label, &university, pages)
                .await?;
            finish(harvest, output, "professors_university")
        }
        ScholarAction::ProfessorsByField {
            field,
            pages,
            output,
        } => {
            let harvest = client.find_professor_by_field(&field, pages).await?;
            finish(harvest, output, "professors_field")
        }
        ScholarAction::ProfessorByName { name, output } => {
            let harvest = client.find_professor_by_name(&name).await?;
            finish(harvest, output, "professor_name")
        }
        ScholarAction::ProfessorById { id, output } => {
            let harvest = client.find_professor_by_id(&id).await?;
            finish(harvest, output, "professor_id")
        }
        ScholarAction::ArticlesByProfessor {
            name,
            pages,
            output,
        } => {
            let harvest = client.find_article_by_professor_name(&name, pages).await?;
            finish(harvest, output, "articles_professor")
        }
        ScholarAction::ArticlesByField {
            field,
            pages,
            output,
        } => {
            let harvest = client.find_article_by_field(&field, pages).await?;
            finish(harvest, output, "articles_field")
        }
    }
}

// ============================================================================
// Output
// ============================================================================

/// Save a Scholar harvest and report how paging ended.
fn finish<T: Record>(harvest: Harvest<T>, output: Option<PathBuf>, label: &str) -> Result<()> {
    if harvest.is_complete() {
        info!(pages = harvest.pages_fetched, stop = %harvest.stop, "Search complete");
    } else {
        warn!(
            pages = harvest.pages_fetched,
            stop = %harvest.stop,
            "Search stopped early, saving partial results"
        );
    }

    let path = output_path(output, &format!("scholar_{}", label));
    harvest
        .write_csv(&path)
        .with_context(|| format!("Failed to write {}", path.display()))?;
    println!(
        "Saved {} records to {} ({})",
        harvest.len(),
        path.display(),
        harvest.stop
    );
    Ok(())
}

fn save<R: Record>(path: &Path, records: &[R]) -> Result<()> {
    sink::write_csv(path, records).with_context(|| format!("Failed to write {}", path.display()))?;
    println!("Saved {} records to {}", records.len(), path.display());
    Ok(())
}

/// Explicit path, or `./output/<label>_<timestamp>.csv`.
fn output_path(output: Option<PathBuf>, label: &str) -> PathBuf {
    output.unwrap_or_else(|| {
        let timestamp = Local::now().format("%Y%m%d_%H%M%S").to_string();
        PathBuf::from("./output").join(format!("{}_{}.csv", label, timestamp))
    })
}
