use crate::models::{ExtractWarning, IngestReport, RunSummary};
use crate::plan::PageRequest;

/// Events emitted by an ingestion run for monitoring/logging.
#[derive(Debug, Clone)]
pub enum IngestEvent<'a> {
    RunStarted {
        source: &'a str,
        run_key: &'a str,
        pages: usize,
    },
    PageStarted {
        request: &'a PageRequest,
    },
    PageExtracted {
        request: &'a PageRequest,
        postings: usize,
        warnings: &'a [ExtractWarning],
    },
    PageIngested {
        request: &'a PageRequest,
        report: &'a IngestReport,
    },
    RunCancelled {
        source: &'a str,
        pages_done: usize,
    },
    RunFinished {
        summary: &'a RunSummary,
    },
    DescriptionFilled {
        url: &'a str,
    },
    DescriptionFailed {
        url: &'a str,
        error: &'a str,
    },
}

/// Receives run events (decoupled logging).
pub trait IngestReporter: Send + Sync {
    fn report(&self, event: IngestEvent<'_>) {
        let _ = event;
    }
}

/// Reporter that uses the `tracing` crate.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingIngestReporter;

impl IngestReporter for TracingIngestReporter {
    fn report(&self, event: IngestEvent<'_>) {
        match event {
            IngestEvent::RunStarted {
                source,
                run_key,
                pages,
            } => {
                tracing::info!(%source, %run_key, %pages, "Ingestion run started");
            }
            IngestEvent::PageStarted { request } => {
                tracing::debug!(url = %request.url, page = request.page, "Fetching listing page");
            }
            IngestEvent::PageExtracted {
                request,
                postings,
                warnings,
            } => {
                for warning in warnings {
                    tracing::warn!(page = %request.label, %warning, "Extraction degraded");
                }
                tracing::info!(page = %request.label, %postings, "Listing page extracted");
            }
            IngestEvent::PageIngested { request, report } => {
                tracing::info!(
                    page = %request.label,
                    inserted = report.inserted,
                    updated = report.updated,
                    skipped = report.skipped,
                    "Page ingested"
                );
            }
            IngestEvent::RunCancelled { source, pages_done } => {
                tracing::warn!(%source, %pages_done, "Ingestion run cancelled");
            }
            IngestEvent::RunFinished { summary } => {
                tracing::info!(
                    source = %summary.source,
                    fetched = summary.fetched,
                    saved = summary.report.saved(),
                    warnings = summary.warnings,
                    "Ingestion run finished"
                );
            }
            IngestEvent::DescriptionFilled { url } => {
                tracing::debug!(%url, "Description filled");
            }
            IngestEvent::DescriptionFailed { url, error } => {
                tracing::warn!(%url, %error, "Description enrichment failed");
            }
        }
    }
}

/// Reporter that drops every event.
#[derive(Debug, Default, Clone, Copy)]
pub struct SilentReporter;

impl IngestReporter for SilentReporter {}
