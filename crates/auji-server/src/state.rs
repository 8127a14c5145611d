use auji_core::{Fetcher, IngestService, JobStore, ProfileStore, ScrapeConfig};
use tokio_util::sync::CancellationToken;

/// Shared application state, available to all route handlers via `State<Arc<AppState<..>>>`.
pub struct AppState<S, P, F>
where
    S: JobStore,
    P: ProfileStore,
    F: Fetcher,
{
    pub ingest: IngestService<S, P>,
    pub fetcher: F,
    pub config: ScrapeConfig,
    /// Bearer token for the scrape endpoints (None = scrape endpoints disabled).
    pub admin_token: Option<String>,
    /// Cancelled on shutdown; running scrapes stop after their current page.
    pub shutdown: CancellationToken,
}

impl<S, P, F> AppState<S, P, F>
where
    S: JobStore,
    P: ProfileStore,
    F: Fetcher,
{
    pub fn new(store: S, profiles: P, fetcher: F, config: ScrapeConfig) -> Self {
        let ingest = IngestService::new(store, profiles)
            .with_default_source(config.default_source.clone());
        Self {
            ingest,
            fetcher,
            config,
            admin_token: None,
            shutdown: CancellationToken::new(),
        }
    }

    pub fn with_admin_token(mut self, token: impl Into<String>) -> Self {
        self.admin_token = Some(token.into());
        self
    }
}
