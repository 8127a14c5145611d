use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "AUJI API",
        version = "0.1.0",
        description = "Job postings scraped from Vodafone careers and Mostaql, classified into search profiles."
    ),
    paths(
        crate::routes::run,
        crate::routes::run_direct,
        crate::routes::list_jobs,
        crate::routes::health,
    ),
    components(schemas(
        crate::dto::RunRequest,
        crate::dto::RunDirectRequest,
        crate::dto::RunResponse,
        crate::dto::JobResponse,
        crate::dto::JobListResponse,
        crate::dto::HealthResponse,
        crate::dto::ErrorResponse,
    )),
    tags(
        (name = "scrape", description = "Trigger scrape and ingestion runs"),
        (name = "jobs", description = "Stored job postings"),
        (name = "system", description = "Health and system status"),
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;

/// Registers the bearer scheme guarding the scrape endpoints.
struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer",
                utoipa::openapi::security::SecurityScheme::Http(
                    utoipa::openapi::security::HttpBuilder::new()
                        .scheme(utoipa::openapi::security::HttpAuthScheme::Bearer)
                        .bearer_format("token")
                        .description(Some("Admin token, set via AUJI_ADMIN_TOKEN."))
                        .build(),
                ),
            );
        }
    }
}
