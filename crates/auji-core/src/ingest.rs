use std::collections::HashSet;
use std::sync::{Mutex, PoisonError};

use tokio_util::sync::CancellationToken;

use crate::error::AppError;
use crate::identity::{merge_changes, resolve_identity};
use crate::models::{IngestReport, JobChanges, JobFilter, Posting, RunSummary};
use crate::plan::{CategorySelection, DEFAULT_PROFILES};
use crate::reporter::{IngestEvent, IngestReporter};
use crate::traits::{Fetcher, JobStore, ProfileStore, SourceScraper};

/// Source recorded on candidates that do not name one.
pub const DEFAULT_SOURCE: &str = "vodafone";

/// Reconciles scraped postings into the job store.
///
/// All writes go through one lock, so two runs never race on the same
/// identity key. A run additionally claims the listing URLs it plans for its
/// whole duration; a second run touching any of them is refused.
pub struct IngestService<S, P>
where
    S: JobStore,
    P: ProfileStore,
{
    store: S,
    profiles: P,
    default_source: String,
    write_lock: tokio::sync::Mutex<()>,
    active_runs: Mutex<HashSet<String>>,
}

impl<S, P> IngestService<S, P>
where
    S: JobStore,
    P: ProfileStore,
{
    pub fn new(store: S, profiles: P) -> Self {
        Self {
            store,
            profiles,
            default_source: DEFAULT_SOURCE.to_string(),
            write_lock: tokio::sync::Mutex::new(()),
            active_runs: Mutex::new(HashSet::new()),
        }
    }

    pub fn with_default_source(mut self, source: impl Into<String>) -> Self {
        self.default_source = source.into();
        self
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn profiles(&self) -> &P {
        &self.profiles
    }

    /// Upsert a batch of candidates.
    ///
    /// Candidates without any identity field are skipped. Re-ingesting the
    /// same batch never changes the record count.
    pub async fn ingest(&self, candidates: Vec<Posting>) -> Result<IngestReport, AppError> {
        let _writer = self.write_lock.lock().await;
        let mut report = IngestReport::default();

        for mut candidate in candidates {
            if !candidate.has_identity() {
                tracing::debug!(title = %candidate.title, "Skipping posting without identity");
                report.skipped += 1;
                continue;
            }
            if candidate.source_scope().is_none() {
                candidate.source = self.default_source.clone();
            }

            match resolve_identity(&self.store, &candidate).await? {
                Some(existing) => {
                    let changes = merge_changes(&existing, &candidate);
                    self.store.update(existing.id, &changes).await?;
                    report.updated += 1;
                }
                None => {
                    self.store.insert(&candidate).await?;
                    report.inserted += 1;
                }
            }
        }

        Ok(report)
    }

    /// Run one source once: plan, then fetch/extract/ingest page by page.
    ///
    /// Pages ingested before a cancellation or a failure stay committed.
    pub async fn run<X, F, R>(
        &self,
        scraper: &X,
        fetcher: &F,
        selection: CategorySelection,
        pages: u32,
        cancel: &CancellationToken,
        reporter: &R,
    ) -> Result<RunSummary, AppError>
    where
        X: SourceScraper,
        F: Fetcher,
        R: IngestReporter,
    {
        let source = scraper.source();
        let selection = self.resolve_selection(selection).await?;
        let run_key = format!("{source}:{}", selection.run_key());
        let requests = scraper.plan(&selection, pages.max(1))?;
        let _claim = self.claim_run(&run_key, requests.iter().map(|r| r.url.as_str()))?;
        reporter.report(IngestEvent::RunStarted {
            source: source.as_str(),
            run_key: &run_key,
            pages: requests.len(),
        });

        let mut summary = RunSummary {
            source: source.to_string(),
            ..RunSummary::default()
        };

        for request in &requests {
            if cancel.is_cancelled() {
                reporter.report(IngestEvent::RunCancelled {
                    source: source.as_str(),
                    pages_done: summary.pages,
                });
                return Err(AppError::Cancelled {
                    pages_done: summary.pages,
                });
            }

            reporter.report(IngestEvent::PageStarted { request });
            let extracted = scraper.scrape(fetcher, request).await?;
            reporter.report(IngestEvent::PageExtracted {
                request,
                postings: extracted.value.len(),
                warnings: &extracted.warnings,
            });

            summary.fetched += extracted.value.len();
            summary.warnings += extracted.warnings.len();

            let report = self.ingest(extracted.value).await?;
            reporter.report(IngestEvent::PageIngested {
                request,
                report: &report,
            });
            summary.report.absorb(report);
            summary.pages += 1;
        }

        reporter.report(IngestEvent::RunFinished { summary: &summary });
        Ok(summary)
    }

    /// Fill in missing descriptions for up to `limit` stored jobs of the
    /// scraper's source. Per-job failures are reported and skipped.
    pub async fn enrich_descriptions<X, F, R>(
        &self,
        scraper: &X,
        fetcher: &F,
        limit: usize,
        reporter: &R,
    ) -> Result<usize, AppError>
    where
        X: SourceScraper,
        F: Fetcher,
        R: IngestReporter,
    {
        let filter = JobFilter {
            source: Some(scraper.source().to_string()),
            missing_description: true,
            limit: Some(limit),
            ..JobFilter::default()
        };
        let jobs = self.store.list(&filter).await?;

        let mut filled = 0;
        for job in jobs {
            let Some(url) = job
                .detail_url
                .as_deref()
                .or(job.apply_url.as_deref())
                .or(job.url.as_deref())
            else {
                continue;
            };

            match scraper.fetch_description(fetcher, url).await {
                Ok(Some(text)) if !text.trim().is_empty() => {
                    let changes = JobChanges {
                        description: Some(text),
                        ..JobChanges::default()
                    };
                    let _writer = self.write_lock.lock().await;
                    self.store.update(job.id, &changes).await?;
                    filled += 1;
                    reporter.report(IngestEvent::DescriptionFilled { url });
                }
                Ok(_) => {}
                Err(e) => {
                    let error = e.to_string();
                    reporter.report(IngestEvent::DescriptionFailed { url, error: &error });
                }
            }
        }

        Ok(filled)
    }

    /// Request profiles, then the active profiles, then the built-in defaults.
    async fn resolve_selection(
        &self,
        selection: CategorySelection,
    ) -> Result<CategorySelection, AppError> {
        if !selection.is_unresolved() {
            return Ok(selection);
        }
        let active: Vec<String> = self
            .profiles
            .active_profile_names()
            .await?
            .into_iter()
            .filter(|n| !n.trim().is_empty())
            .collect();
        if !active.is_empty() {
            return Ok(CategorySelection::Profiles(active));
        }
        Ok(CategorySelection::Profiles(
            DEFAULT_PROFILES.iter().map(|s| s.to_string()).collect(),
        ))
    }

    /// Claim every listing URL a run is about to fetch. Fails if any of them
    /// belongs to a run still in flight, whatever selection planned it.
    fn claim_run<'u>(
        &self,
        run_key: &str,
        urls: impl IntoIterator<Item = &'u str>,
    ) -> Result<RunClaim<'_>, AppError> {
        let mut urls: Vec<String> = urls.into_iter().map(str::to_string).collect();
        urls.sort();
        urls.dedup();

        let mut runs = self
            .active_runs
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        if urls.iter().any(|u| runs.contains(u)) {
            return Err(AppError::RunInProgress(run_key.to_string()));
        }
        runs.extend(urls.iter().cloned());
        Ok(RunClaim {
            runs: &self.active_runs,
            urls,
        })
    }
}

/// Releases a run's listing URLs when the run ends, however it ends.
struct RunClaim<'a> {
    runs: &'a Mutex<HashSet<String>>,
    urls: Vec<String>,
}

impl Drop for RunClaim<'_> {
    fn drop(&mut self) {
        self.runs
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .retain(|u| !self.urls.contains(u));
    }
}
