use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use auji_core::models::{JobRecord, RunSummary};

// ---------------------------------------------------------------------------
// Scrape runs
// ---------------------------------------------------------------------------

/// Body of `POST /v1/scrape/{source}/run`.
#[derive(Debug, Default, Deserialize, utoipa::ToSchema)]
pub struct RunRequest {
    /// Search profile names, English or Arabic. Defaults to the active profiles.
    #[serde(default)]
    pub profiles: Option<Vec<String>>,
    /// Listing pages per category (1-10, default 1).
    #[serde(default)]
    pub pages: Option<u32>,
}

/// Body of `POST /v1/scrape/{source}/run-direct`.
#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct RunDirectRequest {
    /// Mostaql category expression (`development,marketing`), or for Vodafone a
    /// category name or a `jobs.vodafone.com` search URL.
    pub category: String,
    #[serde(default)]
    pub pages: Option<u32>,
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct RunResponse {
    pub source: String,
    pub pages: usize,
    pub fetched: usize,
    pub saved: usize,
    pub inserted: usize,
    pub updated: usize,
    pub skipped: usize,
    pub warnings: usize,
}

impl From<RunSummary> for RunResponse {
    fn from(summary: RunSummary) -> Self {
        Self {
            saved: summary.report.saved(),
            inserted: summary.report.inserted,
            updated: summary.report.updated,
            skipped: summary.report.skipped,
            source: summary.source,
            pages: summary.pages,
            fetched: summary.fetched,
            warnings: summary.warnings,
        }
    }
}

// ---------------------------------------------------------------------------
// Jobs
// ---------------------------------------------------------------------------

#[derive(Debug, Default, Deserialize, utoipa::IntoParams)]
pub struct ListJobsQuery {
    /// Comma-separated categories, e.g. `Digital Marketing,تعلم آلي`.
    /// Defaults to the active search profiles.
    pub profiles: Option<String>,
    pub source: Option<String>,
    /// `full_time`, `part_time`, `internship`, `freelance` or an Arabic label.
    pub employment_type: Option<String>,
    pub posted_after: Option<DateTime<Utc>>,
    pub limit: Option<usize>,
    pub offset: Option<usize>,
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct JobResponse {
    pub id: Uuid,
    pub title: String,
    pub company: String,
    pub location: Option<String>,
    pub description: Option<String>,
    pub category: Option<String>,
    pub employment_type: Option<String>,
    pub source: String,
    pub detail_url: Option<String>,
    /// Apply link, falling back to the legacy url.
    pub apply_url: Option<String>,
    pub posted_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<JobRecord> for JobResponse {
    fn from(job: JobRecord) -> Self {
        Self {
            id: job.id,
            category: job.category.map(String::from),
            employment_type: job.employment_type.map(String::from),
            apply_url: job.apply_url.or(job.url),
            title: job.title,
            company: job.company,
            location: job.location,
            description: job.description,
            source: job.source,
            detail_url: job.detail_url,
            posted_at: job.posted_at,
            created_at: job.created_at,
            updated_at: job.updated_at,
        }
    }
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct JobListResponse {
    pub jobs: Vec<JobResponse>,
    /// Number of jobs in this page.
    pub count: usize,
    /// Number of stored jobs overall.
    pub total: i64,
}

// ---------------------------------------------------------------------------
// System
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct HealthResponse {
    pub status: &'static str,
    pub database: &'static str,
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
}
