use std::future::Future;

use uuid::Uuid;

use crate::error::AppError;
use crate::models::{
    Extracted, IdentityField, JobChanges, JobFilter, JobRecord, Posting, Source,
};
use crate::plan::{CategorySelection, PageRequest};

/// Fetches raw HTML content from a URL.
pub trait Fetcher: Send + Sync + Clone {
    fn fetch(&self, url: &str) -> impl Future<Output = Result<String, AppError>> + Send;

    /// Fetch a page whose content is rendered client-side.
    ///
    /// Implementations backed by a real browser wait (bounded) for
    /// `wait_for` to appear and return whatever DOM exists once the wait ends,
    /// so a slow page degrades to a partial extraction instead of an error.
    fn fetch_rendered(
        &self,
        url: &str,
        wait_for: &str,
    ) -> impl Future<Output = Result<String, AppError>> + Send {
        let _ = wait_for;
        self.fetch(url)
    }
}

/// Durable store of job records.
///
/// Single-writer semantics are provided by the ingestion engine; stores only
/// need each call to be atomic on its own.
pub trait JobStore: Send + Sync + Clone {
    /// Find the first record whose `field` equals `value`, restricted to
    /// `source` when one is given.
    fn find_by(
        &self,
        field: IdentityField,
        value: &str,
        source: Option<&str>,
    ) -> impl Future<Output = Result<Option<JobRecord>, AppError>> + Send;

    /// Insert a new record. `created_at` and `updated_at` are set by the store.
    fn insert(&self, posting: &Posting) -> impl Future<Output = Result<JobRecord, AppError>> + Send;

    /// Apply a field-level update and bump `updated_at`.
    fn update(
        &self,
        id: Uuid,
        changes: &JobChanges,
    ) -> impl Future<Output = Result<(), AppError>> + Send;

    /// Read-side listing, newest `posted_at` first.
    fn list(&self, filter: &JobFilter)
    -> impl Future<Output = Result<Vec<JobRecord>, AppError>> + Send;

    /// Total number of stored records.
    fn count(&self) -> impl Future<Output = Result<i64, AppError>> + Send;
}

/// Read-only access to the user's search profiles.
pub trait ProfileStore: Send + Sync + Clone {
    /// Names of the profiles currently marked active.
    fn active_profile_names(&self) -> impl Future<Output = Result<Vec<String>, AppError>> + Send;
}

/// A profile store with a fixed list of names (CLI overrides, tests).
#[derive(Debug, Clone, Default)]
pub struct StaticProfiles(pub Vec<String>);

impl ProfileStore for StaticProfiles {
    async fn active_profile_names(&self) -> Result<Vec<String>, AppError> {
        Ok(self.0.clone())
    }
}

/// One career portal: knows how to build its listing URLs and how to turn a
/// listing page into postings.
pub trait SourceScraper: Send + Sync {
    fn source(&self) -> Source;

    /// Expand a category selection into the page requests of one run.
    fn plan(&self, selection: &CategorySelection, pages: u32) -> Result<Vec<PageRequest>, AppError>;

    /// Fetch and extract one listing page.
    ///
    /// A failure to fetch the listing itself is an error; everything below
    /// that (missing anchors, detail pages, sub-fields) is reported as
    /// warnings on the returned [`Extracted`].
    fn scrape<F: Fetcher>(
        &self,
        fetcher: &F,
        request: &PageRequest,
    ) -> impl Future<Output = Result<Extracted<Vec<Posting>>, AppError>> + Send;

    /// Fetch the requirements text of a single detail page, if the source
    /// has detail pages at all.
    fn fetch_description<F: Fetcher>(
        &self,
        fetcher: &F,
        detail_url: &str,
    ) -> impl Future<Output = Result<Option<String>, AppError>> + Send {
        let _ = (fetcher, detail_url);
        async { Ok(None) }
    }
}
