use std::io::Write;

use anyhow::{Context, Result, bail};
use chrono::{TimeDelta, Utc};
use clap::{Parser, Subcommand, ValueEnum};
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

use auji_client::AnyScraper;
use auji_core::models::{Category, JobFilter, JobRecord, Source};
use auji_core::traits::JobStore;
use auji_core::{
    AppError, CategorySelection, IngestService, RunSummary, ScrapeConfig, ThrottledFetcher,
    TracingIngestReporter, normalize_employment_type,
};
use auji_db::{Database, DatabaseConfig, JobRepository, ProfileRepository};

#[derive(Parser)]
#[command(name = "auji", version, about = "Job posting scraper for Vodafone careers and Mostaql")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Scrape a source for the given (or the active) search profiles
    Scrape {
        /// Source to scrape: vodafone or mostaql
        #[arg(short, long, default_value = "vodafone")]
        source: Source,

        /// Search profile, English or Arabic (repeatable). Defaults to the active profiles.
        #[arg(short, long = "profile")]
        profiles: Vec<String>,

        /// Listing pages per category
        #[arg(long, default_value_t = 1)]
        pages: u32,
    },

    /// Scrape a source for a raw category expression or search URL
    ScrapeDirect {
        #[arg(short, long)]
        source: Source,

        /// Mostaql: e.g. "development,marketing". Vodafone: a category name or a
        /// jobs.vodafone.com search URL.
        #[arg(short, long)]
        category: String,

        #[arg(long, default_value_t = 1)]
        pages: u32,
    },

    /// Fill in missing descriptions from detail pages
    Enrich {
        #[arg(short, long, default_value = "vodafone")]
        source: Source,

        /// Maximum number of jobs to visit
        #[arg(short, long, default_value_t = 50)]
        limit: usize,
    },

    /// List stored jobs
    Jobs {
        /// Category filter (repeatable), English or Arabic
        #[arg(short, long = "category")]
        categories: Vec<String>,

        #[arg(short, long)]
        source: Option<Source>,

        /// Employment type, e.g. full_time, "دوام جزئي", freelance
        #[arg(short, long)]
        employment_type: Option<String>,

        /// Only jobs posted within the last N days
        #[arg(long)]
        since_days: Option<i64>,

        #[arg(short, long, default_value_t = 50)]
        limit: usize,

        #[arg(long, value_enum, default_value_t = OutputFormat::Table)]
        format: OutputFormat,
    },

    /// Manage search profiles
    Profiles {
        #[command(subcommand)]
        action: ProfileAction,
    },
}

#[derive(Subcommand)]
enum ProfileAction {
    /// Show all profiles
    List,
    /// Create a profile or change its state
    Set {
        name: String,
        /// Store the profile as inactive
        #[arg(long, default_value_t = false)]
        inactive: bool,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum OutputFormat {
    Table,
    Csv,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env if present
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("auji=info".parse()?))
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = ScrapeConfig::from_env().map_err(|e| anyhow::anyhow!(e))?;

    match cli.command {
        Commands::Scrape {
            source,
            profiles,
            pages,
        } => {
            let db = connect_db().await?;
            let selection = CategorySelection::Profiles(profiles);
            cmd_run(&db, &config, source, selection, pages).await?;
        }
        Commands::ScrapeDirect {
            source,
            category,
            pages,
        } => {
            let db = connect_db().await?;
            cmd_run(&db, &config, source, CategorySelection::Direct(category), pages).await?;
        }
        Commands::Enrich { source, limit } => {
            let db = connect_db().await?;
            cmd_enrich(&db, &config, source, limit).await?;
        }
        Commands::Jobs {
            categories,
            source,
            employment_type,
            since_days,
            limit,
            format,
        } => {
            let filter = build_filter(categories, source, employment_type, since_days, limit)?;
            let db = connect_db().await?;
            cmd_jobs(&db.job_repo(), &filter, format).await?;
        }
        Commands::Profiles { action } => {
            let db = connect_db().await?;
            cmd_profiles(&db.profile_repo(), action).await?;
        }
    }

    Ok(())
}

/// Connect to PostgreSQL using `DATABASE_URL` and apply pending migrations.
async fn connect_db() -> Result<Database> {
    let config = DatabaseConfig::from_env().map_err(|e| anyhow::anyhow!(e))?;
    let db = Database::connect(&config)
        .await
        .context("Failed to connect to database")?;
    db.migrate().await.map_err(|e| anyhow::anyhow!(e))?;
    Ok(db)
}

fn service(db: &Database, config: &ScrapeConfig) -> IngestService<JobRepository, ProfileRepository> {
    IngestService::new(db.job_repo(), db.profile_repo())
        .with_default_source(config.default_source.clone())
}

/// Cancel the token on the first Ctrl-C; pages already ingested stay saved.
fn cancel_on_ctrl_c() -> CancellationToken {
    let token = CancellationToken::new();
    let child = token.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("Interrupt received, stopping after the current page");
            child.cancel();
        }
    });
    token
}

async fn cmd_run(
    db: &Database,
    config: &ScrapeConfig,
    source: Source,
    selection: CategorySelection,
    pages: u32,
) -> Result<()> {
    let service = service(db, config);
    let scraper = AnyScraper::for_source(source, &config.debug_dir);
    let fetcher = ThrottledFetcher::new(page_fetcher::open(config).await?, config.page_delay);
    let cancel = cancel_on_ctrl_c();

    let result = service
        .run(&scraper, &fetcher, selection, pages, &cancel, &TracingIngestReporter)
        .await;
    page_fetcher::close(fetcher.inner()).await;

    match result {
        Ok(summary) => print_summary(&summary),
        Err(AppError::Cancelled { pages_done }) => {
            eprintln!("Cancelled after {pages_done} page(s); those pages were saved.");
            Ok(())
        }
        Err(e) => Err(anyhow::anyhow!(e)).context(format!("{source} run failed")),
    }
}

fn print_summary(summary: &RunSummary) -> Result<()> {
    let out = serde_json::json!({
        "source": summary.source,
        "fetched": summary.fetched,
        "saved": summary.report.saved(),
        "inserted": summary.report.inserted,
        "updated": summary.report.updated,
        "skipped": summary.report.skipped,
        "warnings": summary.warnings,
    });
    println!("{}", serde_json::to_string_pretty(&out)?);
    Ok(())
}

async fn cmd_enrich(db: &Database, config: &ScrapeConfig, source: Source, limit: usize) -> Result<()> {
    let service = service(db, config);
    let scraper = AnyScraper::for_source(source, &config.debug_dir);
    let fetcher = ThrottledFetcher::new(page_fetcher::open(config).await?, config.page_delay);

    let result = service
        .enrich_descriptions(&scraper, &fetcher, limit, &TracingIngestReporter)
        .await;
    page_fetcher::close(fetcher.inner()).await;

    let filled = result.map_err(|e| anyhow::anyhow!(e))?;
    println!("Filled {filled} description(s)");
    Ok(())
}

fn build_filter(
    categories: Vec<String>,
    source: Option<Source>,
    employment_type: Option<String>,
    since_days: Option<i64>,
    limit: usize,
) -> Result<JobFilter> {
    let employment_type = match employment_type.as_deref() {
        None => None,
        Some(raw) => match normalize_employment_type(Some(raw)).and_then(|l| l.canonical()) {
            Some(kind) => Some(kind),
            None => bail!("Unknown employment type '{raw}'"),
        },
    };

    let posted_after = since_days
        .map(|days| {
            TimeDelta::try_days(days)
                .filter(|_| days >= 0)
                .and_then(|delta| Utc::now().checked_sub_signed(delta))
                .with_context(|| format!("--since-days {days} is out of range"))
        })
        .transpose()?;

    Ok(JobFilter {
        categories: categories
            .iter()
            .filter(|c| !c.trim().is_empty())
            .map(|c| Category::from(c.as_str()))
            .collect(),
        source: source.map(|s| s.to_string()),
        employment_type,
        posted_after,
        limit: Some(limit),
        ..JobFilter::default()
    })
}

async fn cmd_jobs(repo: &JobRepository, filter: &JobFilter, format: OutputFormat) -> Result<()> {
    let jobs = repo.list(filter).await.map_err(|e| anyhow::anyhow!(e))?;

    match format {
        OutputFormat::Csv => write_csv(&jobs, std::io::stdout().lock())?,
        OutputFormat::Table => {
            if jobs.is_empty() {
                println!("No jobs found");
                return Ok(());
            }
            for job in &jobs {
                println!(
                    "{:<10} {:<18} {:<12} {} | {} | {}",
                    job.posted_at
                        .map(|t| t.format("%Y-%m-%d").to_string())
                        .unwrap_or_else(|| "-".into()),
                    job.category.as_ref().map(Category::as_str).unwrap_or("-"),
                    job.source,
                    job.title,
                    job.company,
                    job.best_link().unwrap_or("-"),
                );
            }
            let total = repo.count().await.map_err(|e| anyhow::anyhow!(e))?;
            println!("\nShowing {} of {total} jobs", jobs.len());
        }
    }
    Ok(())
}

fn write_csv(jobs: &[JobRecord], out: impl Write) -> Result<()> {
    let mut writer = csv::Writer::from_writer(out);
    writer.write_record([
        "id",
        "title",
        "company",
        "location",
        "category",
        "employment_type",
        "source",
        "posted_at",
        "link",
    ])?;
    for job in jobs {
        writer.write_record([
            job.id.to_string(),
            job.title.clone(),
            job.company.clone(),
            job.location.clone().unwrap_or_default(),
            job.category.as_ref().map(|c| c.as_str().to_string()).unwrap_or_default(),
            job.employment_type
                .as_ref()
                .map(|l| l.as_str().to_string())
                .unwrap_or_default(),
            job.source.clone(),
            job.posted_at.map(|t| t.to_rfc3339()).unwrap_or_default(),
            job.best_link().unwrap_or_default().to_string(),
        ])?;
    }
    writer.flush()?;
    Ok(())
}

async fn cmd_profiles(repo: &ProfileRepository, action: ProfileAction) -> Result<()> {
    match action {
        ProfileAction::List => {
            let profiles = repo.list().await.map_err(|e| anyhow::anyhow!(e))?;
            if profiles.is_empty() {
                println!("No profiles; runs use the built-in defaults");
            }
            for profile in profiles {
                let state = if profile.is_active { "active" } else { "inactive" };
                println!("{:<9} {}", state, profile.name);
            }
        }
        ProfileAction::Set { name, inactive } => {
            if name.trim().is_empty() {
                bail!("Profile name must not be empty");
            }
            repo.upsert(name.trim(), !inactive)
                .await
                .map_err(|e| anyhow::anyhow!(e))?;
            println!("Saved profile '{}'", name.trim());
        }
    }
    Ok(())
}

#[cfg(feature = "browser")]
mod page_fetcher {
    use auji_client::BrowserFetcher;
    use auji_core::ScrapeConfig;

    pub async fn open(config: &ScrapeConfig) -> anyhow::Result<BrowserFetcher> {
        BrowserFetcher::with_timeouts(config.page_timeout * 2, config.page_timeout)
            .await
            .map_err(|e| anyhow::anyhow!(e))
    }

    pub async fn close(fetcher: &BrowserFetcher) {
        if let Err(e) = fetcher.close().await {
            tracing::warn!(error = %e, "Browser did not shut down cleanly");
        }
    }
}

#[cfg(not(feature = "browser"))]
mod page_fetcher {
    use auji_client::ReqwestFetcher;
    use auji_core::ScrapeConfig;

    pub async fn open(config: &ScrapeConfig) -> anyhow::Result<ReqwestFetcher> {
        tracing::warn!("Built without the `browser` feature; client-rendered listings may come back empty");
        ReqwestFetcher::with_timeout(config.page_timeout).map_err(|e| anyhow::anyhow!(e))
    }

    pub async fn close(_fetcher: &ReqwestFetcher) {}
}
