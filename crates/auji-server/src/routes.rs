use std::sync::Arc;

use axum::Router;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::middleware;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use tower_http::limit::RequestBodyLimitLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use auji_client::AnyScraper;
use auji_core::models::{Category, JobFilter, Source};
use auji_core::{
    AppError, CategorySelection, Fetcher, JobStore, ProfileStore, TracingIngestReporter,
    normalize_employment_type,
};

use crate::auth::require_admin_token;
use crate::dto::{
    HealthResponse, JobListResponse, JobResponse, ListJobsQuery, RunDirectRequest, RunRequest,
    RunResponse,
};
use crate::error::ApiError;
use crate::openapi::ApiDoc;
use crate::state::AppState;

/// Most listing pages a single request may ask for.
pub const MAX_PAGES: u32 = 10;
const DEFAULT_LIST_LIMIT: usize = 50;
const MAX_LIST_LIMIT: usize = 200;
/// Request bodies are tiny JSON objects; anything larger is refused with 413.
pub const MAX_BODY_BYTES: usize = 16 * 1024;

type SharedState<S, P, F> = State<Arc<AppState<S, P, F>>>;

/// Build the full router with all routes and middleware.
pub fn router<S, P, F>(state: Arc<AppState<S, P, F>>) -> Router
where
    S: JobStore + 'static,
    P: ProfileStore + 'static,
    F: Fetcher + 'static,
{
    let admin = Router::new()
        .route("/v1/scrape/{source}/run", post(run::<S, P, F>))
        .route("/v1/scrape/{source}/run-direct", post(run_direct::<S, P, F>))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            require_admin_token::<S, P, F>,
        ));

    let public = Router::new()
        .route("/v1/jobs", get(list_jobs::<S, P, F>))
        .route("/health", get(health::<S, P, F>))
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()));

    public
        .merge(admin)
        .layer(RequestBodyLimitLayer::new(MAX_BODY_BYTES))
        .with_state(state)
}

fn parse_source(raw: &str) -> Result<Source, ApiError> {
    raw.parse::<Source>()
        .map_err(|e| ApiError(AppError::InvalidRequest(e)))
}

fn page_count(pages: Option<u32>) -> Result<u32, ApiError> {
    match pages.unwrap_or(1) {
        n @ 1..=MAX_PAGES => Ok(n),
        n => Err(ApiError(AppError::InvalidRequest(format!(
            "pages must be between 1 and {MAX_PAGES}, got {n}"
        )))),
    }
}

async fn execute<S, P, F>(
    state: &AppState<S, P, F>,
    source: Source,
    selection: CategorySelection,
    pages: u32,
) -> Result<RunResponse, ApiError>
where
    S: JobStore,
    P: ProfileStore,
    F: Fetcher,
{
    let scraper = AnyScraper::for_source(source, &state.config.debug_dir);
    let cancel = state.shutdown.child_token();
    let summary = state
        .ingest
        .run(&scraper, &state.fetcher, selection, pages, &cancel, &TracingIngestReporter)
        .await?;
    Ok(RunResponse::from(summary))
}

// ---------------------------------------------------------------------------
// Scrape runs
// ---------------------------------------------------------------------------

#[utoipa::path(
    post,
    path = "/v1/scrape/{source}/run",
    params(("source" = String, Path, description = "vodafone or mostaql")),
    request_body = RunRequest,
    responses(
        (status = 200, description = "Run finished", body = RunResponse),
        (status = 400, description = "Bad request", body = crate::dto::ErrorResponse),
        (status = 401, description = "Unauthorized"),
        (status = 409, description = "A run for the same categories is in progress", body = crate::dto::ErrorResponse),
        (status = 502, description = "Listing page could not be fetched", body = crate::dto::ErrorResponse),
    ),
    security(("bearer" = [])),
    tag = "scrape"
)]
pub async fn run<S, P, F>(
    State(state): SharedState<S, P, F>,
    Path(source): Path<String>,
    axum::Json(body): axum::Json<RunRequest>,
) -> Result<impl IntoResponse, ApiError>
where
    S: JobStore,
    P: ProfileStore,
    F: Fetcher,
{
    let source = parse_source(&source)?;
    let pages = page_count(body.pages)?;
    let selection = CategorySelection::Profiles(body.profiles.unwrap_or_default());

    let response = execute(&state, source, selection, pages).await?;
    Ok(axum::Json(response))
}

#[utoipa::path(
    post,
    path = "/v1/scrape/{source}/run-direct",
    params(("source" = String, Path, description = "vodafone or mostaql")),
    request_body = RunDirectRequest,
    responses(
        (status = 200, description = "Run finished", body = RunResponse),
        (status = 400, description = "Bad request", body = crate::dto::ErrorResponse),
        (status = 401, description = "Unauthorized"),
        (status = 409, description = "A run for the same category is in progress", body = crate::dto::ErrorResponse),
        (status = 502, description = "Listing page could not be fetched", body = crate::dto::ErrorResponse),
    ),
    security(("bearer" = [])),
    tag = "scrape"
)]
pub async fn run_direct<S, P, F>(
    State(state): SharedState<S, P, F>,
    Path(source): Path<String>,
    axum::Json(body): axum::Json<RunDirectRequest>,
) -> Result<impl IntoResponse, ApiError>
where
    S: JobStore,
    P: ProfileStore,
    F: Fetcher,
{
    let source = parse_source(&source)?;
    let pages = page_count(body.pages)?;
    if body.category.trim().is_empty() {
        return Err(ApiError(AppError::InvalidRequest(
            "category must not be empty".into(),
        )));
    }

    let response = execute(&state, source, CategorySelection::Direct(body.category), pages).await?;
    Ok(axum::Json(response))
}

// ---------------------------------------------------------------------------
// Jobs
// ---------------------------------------------------------------------------

#[utoipa::path(
    get,
    path = "/v1/jobs",
    params(ListJobsQuery),
    responses(
        (status = 200, description = "Stored jobs, newest first", body = JobListResponse),
        (status = 400, description = "Bad request", body = crate::dto::ErrorResponse),
    ),
    tag = "jobs"
)]
pub async fn list_jobs<S, P, F>(
    State(state): SharedState<S, P, F>,
    Query(query): Query<ListJobsQuery>,
) -> Result<impl IntoResponse, ApiError>
where
    S: JobStore,
    P: ProfileStore,
    F: Fetcher,
{
    let filter = build_filter(&state, query).await?;
    let store = state.ingest.store();
    let jobs = store.list(&filter).await?;
    let total = store.count().await?;

    let response = JobListResponse {
        count: jobs.len(),
        jobs: jobs.into_iter().map(JobResponse::from).collect(),
        total,
    };
    Ok(axum::Json(response))
}

/// Requested categories, else the active profiles, else no category filter.
async fn build_filter<S, P, F>(
    state: &AppState<S, P, F>,
    query: ListJobsQuery,
) -> Result<JobFilter, ApiError>
where
    S: JobStore,
    P: ProfileStore,
    F: Fetcher,
{
    let requested = split_categories(query.profiles.as_deref().unwrap_or_default());
    let categories = if requested.is_empty() {
        let active = state.ingest.profiles().active_profile_names().await?;
        to_categories(active.iter().map(String::as_str))
    } else {
        requested
    };

    let employment_type = match query.employment_type.as_deref().map(str::trim) {
        None | Some("") => None,
        Some(raw) => Some(
            normalize_employment_type(Some(raw))
                .and_then(|label| label.canonical())
                .ok_or_else(|| {
                    ApiError(AppError::InvalidRequest(format!(
                        "Unknown employment type '{raw}'"
                    )))
                })?,
        ),
    };

    let source = match query.source.as_deref().map(str::trim) {
        None | Some("") => None,
        Some(raw) => Some(parse_source(raw)?.to_string()),
    };

    Ok(JobFilter {
        categories,
        source,
        employment_type,
        posted_after: query.posted_after,
        missing_description: false,
        limit: Some(query.limit.unwrap_or(DEFAULT_LIST_LIMIT).clamp(1, MAX_LIST_LIMIT)),
        offset: query.offset.unwrap_or(0),
    })
}

/// Categories from a comma-separated query value.
fn split_categories(raw: &str) -> Vec<Category> {
    to_categories(raw.split(','))
}

/// Canonical, sorted and deduplicated categories; blank names are dropped.
fn to_categories<'a>(names: impl IntoIterator<Item = &'a str>) -> Vec<Category> {
    let mut categories: Vec<Category> = names
        .into_iter()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(Category::from)
        .collect();
    categories.sort();
    categories.dedup();
    categories
}

// ---------------------------------------------------------------------------
// Health
// ---------------------------------------------------------------------------

#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Service is healthy", body = HealthResponse),
        (status = 503, description = "Service is unhealthy", body = HealthResponse),
    ),
    tag = "system"
)]
pub async fn health<S, P, F>(State(state): SharedState<S, P, F>) -> impl IntoResponse
where
    S: JobStore,
    P: ProfileStore,
    F: Fetcher,
{
    let healthy = state.ingest.store().count().await.is_ok();

    let (status, response) = if healthy {
        (
            StatusCode::OK,
            HealthResponse {
                status: "healthy",
                database: "ok",
            },
        )
    } else {
        (
            StatusCode::SERVICE_UNAVAILABLE,
            HealthResponse {
                status: "unhealthy",
                database: "error",
            },
        )
    };

    (status, axum::Json(response))
}
