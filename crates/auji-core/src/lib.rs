pub mod classify;
pub mod config;
pub mod error;
pub mod identity;
pub mod ingest;
pub mod models;
pub mod normalize;
pub mod plan;
pub mod reporter;
pub mod throttle;
pub mod traits;

#[cfg(any(test, feature = "testutil"))]
pub mod testutil;

pub use classify::{ActiveSet, SourceContext, canonicalize, classify};
pub use config::ScrapeConfig;
pub use error::AppError;
pub use identity::{merge_changes, resolve_identity};
pub use ingest::{DEFAULT_SOURCE, IngestService};
pub use models::{
    Category, EmploymentLabel, EmploymentType, ExtractWarning, Extracted, IdentityField,
    IngestReport, JobChanges, JobFilter, JobRecord, Posting, RunSummary, SearchProfile, Source,
    TITLE_PLACEHOLDER,
};
pub use normalize::{
    normalize_employment_type, parse_relative_time_arabic, parse_relative_time_english,
    to_ascii_digits,
};
pub use plan::{CategorySelection, DEFAULT_PROFILES, PageRequest};
pub use reporter::{IngestEvent, IngestReporter, SilentReporter, TracingIngestReporter};
pub use throttle::ThrottledFetcher;
pub use traits::{Fetcher, JobStore, ProfileStore, SourceScraper, StaticProfiles};
