//! Test utilities: in-memory stores, mock fetchers and a stub source.
//!
//! Handwritten mocks for dependency injection in unit tests. All of them use
//! `Arc<Mutex<_>>` so tests can assert on recorded calls.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use chrono::Utc;
use uuid::Uuid;

use crate::classify::{ActiveSet, SourceContext};
use crate::error::AppError;
use crate::models::{
    Extracted, IdentityField, JobChanges, JobFilter, JobRecord, Posting, SearchProfile, Source,
};
use crate::plan::{CategorySelection, PageRequest};
use crate::traits::{Fetcher, JobStore, ProfileStore, SourceScraper};

// ---------------------------------------------------------------------------
// MockFetcher
// ---------------------------------------------------------------------------

/// Mock fetcher serving fixed routes first, then a queue of responses.
#[derive(Clone, Default)]
pub struct MockFetcher {
    routes: Arc<Mutex<HashMap<String, String>>>,
    /// Each call without a matching route pops the first element.
    /// If empty, returns a default HTML string.
    responses: Arc<Mutex<Vec<Result<String, AppError>>>>,
    requested: Arc<Mutex<Vec<String>>>,
}

impl MockFetcher {
    /// Answers every request with `html`.
    pub fn new(html: &str) -> Self {
        let fetcher = Self::default();
        fetcher.routes.lock().unwrap().insert(String::new(), html.to_string());
        fetcher
    }

    pub fn with_error(error: AppError) -> Self {
        Self::with_responses(vec![Err(error)])
    }

    pub fn with_responses(responses: Vec<Result<String, AppError>>) -> Self {
        Self {
            responses: Arc::new(Mutex::new(responses)),
            ..Self::default()
        }
    }

    /// Answers each listed URL with its HTML; other URLs fall through to the queue.
    pub fn with_routes<'a>(routes: impl IntoIterator<Item = (&'a str, &'a str)>) -> Self {
        let fetcher = Self::default();
        {
            let mut map = fetcher.routes.lock().unwrap();
            for (url, html) in routes {
                map.insert(url.to_string(), html.to_string());
            }
        }
        fetcher
    }

    /// Every URL fetched so far, in order.
    pub fn requested(&self) -> Vec<String> {
        self.requested.lock().unwrap().clone()
    }
}

impl Fetcher for MockFetcher {
    async fn fetch(&self, url: &str) -> Result<String, AppError> {
        self.requested.lock().unwrap().push(url.to_string());
        {
            let routes = self.routes.lock().unwrap();
            if let Some(html) = routes.get(url).or_else(|| routes.get("")) {
                return Ok(html.clone());
            }
        }
        let mut responses = self.responses.lock().unwrap();
        if responses.is_empty() {
            Ok("<html><body>default</body></html>".to_string())
        } else {
            responses.remove(0)
        }
    }
}

// ---------------------------------------------------------------------------
// MemoryJobStore
// ---------------------------------------------------------------------------

/// In-memory job store with the same lookup semantics as the database.
#[derive(Clone, Default)]
pub struct MemoryJobStore {
    records: Arc<Mutex<Vec<JobRecord>>>,
    write_error: Arc<Mutex<Option<AppError>>>,
}

impl MemoryJobStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a record directly, bypassing ingestion.
    pub fn seed(&self, posting: Posting) -> JobRecord {
        let record = to_record(&posting);
        self.records.lock().unwrap().push(record.clone());
        record
    }

    /// Make the next insert or update fail with `error`.
    pub fn fail_next_write(&self, error: AppError) {
        *self.write_error.lock().unwrap() = Some(error);
    }

    pub fn records(&self) -> Vec<JobRecord> {
        self.records.lock().unwrap().clone()
    }

    pub fn len(&self) -> usize {
        self.records.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn take_write_error(&self) -> Result<(), AppError> {
        match self.write_error.lock().unwrap().take() {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }
}

fn to_record(posting: &Posting) -> JobRecord {
    let now = Utc::now();
    JobRecord {
        id: Uuid::new_v4(),
        title: posting.title.clone(),
        company: posting.company.clone(),
        location: posting.location.clone(),
        description: posting.description.clone(),
        detail_url: posting.detail_url.clone(),
        apply_url: posting.apply_url.clone(),
        url: posting.url.clone(),
        source: posting.source.clone(),
        category: posting.category.clone(),
        employment_type: posting.employment_type.clone(),
        posted_at: posting.posted_at,
        created_at: now,
        updated_at: now,
    }
}

impl JobStore for MemoryJobStore {
    async fn find_by(
        &self,
        field: IdentityField,
        value: &str,
        source: Option<&str>,
    ) -> Result<Option<JobRecord>, AppError> {
        let records = self.records.lock().unwrap();
        Ok(records
            .iter()
            .find(|r| r.identity(field) == Some(value) && source.is_none_or(|s| r.source == s))
            .cloned())
    }

    async fn insert(&self, posting: &Posting) -> Result<JobRecord, AppError> {
        self.take_write_error()?;
        Ok(self.seed(posting.clone()))
    }

    async fn update(&self, id: Uuid, changes: &JobChanges) -> Result<(), AppError> {
        self.take_write_error()?;
        let mut records = self.records.lock().unwrap();
        let record = records
            .iter_mut()
            .find(|r| r.id == id)
            .ok_or_else(|| AppError::DatabaseError(format!("job {id} not found")))?;
        changes.apply_to(record);
        record.updated_at = Utc::now();
        Ok(())
    }

    async fn list(&self, filter: &JobFilter) -> Result<Vec<JobRecord>, AppError> {
        let mut rows: Vec<JobRecord> = self
            .records
            .lock()
            .unwrap()
            .iter()
            .filter(|r| {
                (filter.categories.is_empty()
                    || r.category.as_ref().is_some_and(|c| filter.categories.contains(c)))
                    && filter.source.as_deref().is_none_or(|s| r.source == s)
                    && filter.employment_type.is_none_or(|t| {
                        r.employment_type.as_ref().and_then(|l| l.canonical()) == Some(t)
                    })
                    && filter
                        .posted_after
                        .is_none_or(|after| r.posted_at.is_some_and(|p| p >= after))
                    && (!filter.missing_description
                        || r.description.as_deref().is_none_or(|d| d.trim().is_empty()))
            })
            .cloned()
            .collect();
        rows.sort_by(|a, b| b.posted_at.cmp(&a.posted_at));
        Ok(rows
            .into_iter()
            .skip(filter.offset)
            .take(filter.limit.unwrap_or(usize::MAX))
            .collect())
    }

    async fn count(&self) -> Result<i64, AppError> {
        Ok(self.len() as i64)
    }
}

// ---------------------------------------------------------------------------
// MemoryProfileStore
// ---------------------------------------------------------------------------

#[derive(Clone, Default)]
pub struct MemoryProfileStore {
    profiles: Arc<Mutex<Vec<SearchProfile>>>,
}

impl MemoryProfileStore {
    pub fn new(profiles: &[(&str, bool)]) -> Self {
        let profiles = profiles
            .iter()
            .map(|(name, is_active)| SearchProfile {
                name: name.to_string(),
                is_active: *is_active,
            })
            .collect();
        Self {
            profiles: Arc::new(Mutex::new(profiles)),
        }
    }
}

impl ProfileStore for MemoryProfileStore {
    async fn active_profile_names(&self) -> Result<Vec<String>, AppError> {
        Ok(self
            .profiles
            .lock()
            .unwrap()
            .iter()
            .filter(|p| p.is_active)
            .map(|p| p.name.clone())
            .collect())
    }
}

// ---------------------------------------------------------------------------
// StubScraper
// ---------------------------------------------------------------------------

/// Source stub returning canned postings per page and recording the
/// selections it was asked to plan.
#[derive(Clone)]
pub struct StubScraper {
    source: Source,
    pages: Vec<Vec<Posting>>,
    planned: Arc<Mutex<Vec<CategorySelection>>>,
}

impl StubScraper {
    pub fn new(source: Source, pages: Vec<Vec<Posting>>) -> Self {
        Self {
            source,
            pages,
            planned: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn planned(&self) -> Vec<CategorySelection> {
        self.planned.lock().unwrap().clone()
    }
}

impl SourceScraper for StubScraper {
    fn source(&self) -> Source {
        self.source
    }

    fn plan(&self, selection: &CategorySelection, pages: u32) -> Result<Vec<PageRequest>, AppError> {
        self.planned.lock().unwrap().push(selection.clone());
        Ok((1..=pages)
            .map(|page| PageRequest {
                url: format!("https://stub.test/{}?page={page}", self.source),
                page,
                label: format!("{}_p{page}", self.source),
                category: None,
                context: SourceContext::Mixed,
                active: ActiveSet::default(),
            })
            .collect())
    }

    async fn scrape<F: Fetcher>(
        &self,
        fetcher: &F,
        request: &PageRequest,
    ) -> Result<Extracted<Vec<Posting>>, AppError> {
        fetcher.fetch(&request.url).await?;
        let index = request.page.saturating_sub(1) as usize;
        Ok(Extracted::clean(
            self.pages.get(index).cloned().unwrap_or_default(),
        ))
    }

    async fn fetch_description<F: Fetcher>(
        &self,
        fetcher: &F,
        detail_url: &str,
    ) -> Result<Option<String>, AppError> {
        fetcher.fetch(detail_url).await.map(Some)
    }
}
