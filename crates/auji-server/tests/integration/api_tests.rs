use axum::body::Body;
use axum::http::{Request, StatusCode};
use chrono::{TimeDelta, Utc};
use serde_json::json;

use auji_core::models::{Category, EmploymentLabel, Posting};
use auji_core::testutil::MockFetcher;
use auji_core::AppError;

use crate::integration::common::{
    TEST_ADMIN_TOKEN, post_json, send, setup_test_app, setup_test_app_no_auth,
    setup_test_app_with_fetcher, setup_test_app_with_profiles,
};

const RUN: &str = "/v1/scrape/mostaql/run";

#[tokio::test]
async fn health_returns_200() {
    let app = setup_test_app();

    let (status, json) = send(
        &app.router,
        Request::get("/health").body(Body::empty()).unwrap(),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["status"], "healthy");
    assert_eq!(json["database"], "ok");
}

#[tokio::test]
async fn openapi_document_is_served() {
    let app = setup_test_app();

    let (status, json) = send(
        &app.router,
        Request::get("/api-docs/openapi.json").body(Body::empty()).unwrap(),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert!(json["paths"]["/v1/jobs"].is_object());
}

#[tokio::test]
async fn run_without_token_returns_401() {
    let app = setup_test_app();

    let (status, json) = send(&app.router, post_json(RUN, None, json!({}))).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(json["error"], "unauthorized");
    assert!(app.fetcher.requested().is_empty());
}

#[tokio::test]
async fn run_with_wrong_token_returns_401() {
    let app = setup_test_app();

    let (status, _) = send(&app.router, post_json(RUN, Some("wrong-token"), json!({}))).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn no_admin_token_returns_403() {
    let app = setup_test_app_no_auth();

    let (status, json) = send(&app.router, post_json(RUN, Some("any-token"), json!({}))).await;

    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(json["error"], "forbidden");
}

#[tokio::test]
async fn run_ingests_then_updates_on_repeat() {
    let app = setup_test_app();
    let body = json!({ "profiles": ["Digital Marketing"], "pages": 1 });

    let (status, first) = send(&app.router, post_json(RUN, Some(TEST_ADMIN_TOKEN), body.clone())).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(first["source"], "mostaql");
    assert_eq!(first["pages"], 1);
    assert_eq!(first["fetched"], 2);
    assert_eq!(first["inserted"], 2);
    assert_eq!(first["updated"], 0);

    let (status, second) = send(&app.router, post_json(RUN, Some(TEST_ADMIN_TOKEN), body)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(second["inserted"], 0);
    assert_eq!(second["updated"], 2);
    assert_eq!(app.store.len(), 2);

    let requested = app.fetcher.requested();
    assert!(requested[0].contains("category=marketing"));
    assert!(app
        .store
        .records()
        .iter()
        .all(|r| r.category == Some(Category::DigitalMarketing)));
}

#[tokio::test]
async fn run_defaults_to_active_profiles() {
    let app = setup_test_app();

    let (status, json) = send(&app.router, post_json(RUN, Some(TEST_ADMIN_TOKEN), json!({}))).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["inserted"], 2);
    assert!(app.fetcher.requested()[0].contains("category=marketing"));
}

#[tokio::test]
async fn run_direct_uses_expression() {
    let app = setup_test_app();

    let (status, json) = send(
        &app.router,
        post_json(
            "/v1/scrape/mostaql/run-direct",
            Some(TEST_ADMIN_TOKEN),
            json!({ "category": "development,marketing", "pages": 2 }),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["pages"], 2);
    // Both pages serve the same markup, so the second page only updates.
    assert_eq!(json["inserted"], 2);
    assert_eq!(json["updated"], 2);

    let requested = app.fetcher.requested();
    assert_eq!(requested.len(), 2);
    assert!(requested[1].ends_with("page=2"));
}

#[tokio::test]
async fn unknown_source_returns_400() {
    let app = setup_test_app();

    let (status, json) = send(
        &app.router,
        post_json("/v1/scrape/linkedin/run", Some(TEST_ADMIN_TOKEN), json!({})),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["error"], "invalid_request");
}

#[tokio::test]
async fn too_many_pages_returns_400() {
    let app = setup_test_app();

    let (status, _) = send(
        &app.router,
        post_json(RUN, Some(TEST_ADMIN_TOKEN), json!({ "pages": 50 })),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(app.fetcher.requested().is_empty());
}

#[tokio::test]
async fn vodafone_direct_rejects_foreign_url() {
    let app = setup_test_app();

    let (status, _) = send(
        &app.router,
        post_json(
            "/v1/scrape/vodafone/run-direct",
            Some(TEST_ADMIN_TOKEN),
            json!({ "category": "https://example.com/careers" }),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn listing_failure_returns_502() {
    let app = setup_test_app_with_fetcher(MockFetcher::with_error(AppError::HttpError(
        "HTTP 503 for https://mostaql.com/projects".into(),
    )));

    let (status, json) = send(&app.router, post_json(RUN, Some(TEST_ADMIN_TOKEN), json!({}))).await;

    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(json["error"], "upstream_error");
    assert!(app.store.is_empty());
}

fn seeded(title: &str, source: &str, category: Category, employment: &str, days_ago: i64) -> Posting {
    let mut posting = Posting::new(title, source);
    posting.detail_url = Some(format!("https://example.test/{}", title.replace(' ', "-")));
    posting.category = Some(category);
    posting.employment_type = Some(EmploymentLabel::from(employment.to_string()));
    posting.posted_at = Some(Utc::now() - TimeDelta::days(days_ago));
    posting
}

#[tokio::test]
async fn list_jobs_filters_and_orders() {
    let app = setup_test_app();
    app.store.seed(seeded("SEO specialist", "mostaql", Category::DigitalMarketing, "عمل حر", 3));
    app.store.seed(seeded("Growth marketer", "vodafone", Category::DigitalMarketing, "Full time", 1));
    app.store.seed(seeded("ML engineer", "vodafone", Category::MachineLearning, "Full time", 0));

    // No profiles: the active profile (Digital Marketing) applies.
    let (status, json) = send(&app.router, Request::get("/v1/jobs").body(Body::empty()).unwrap()).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["count"], 2);
    assert_eq!(json["total"], 3);
    assert_eq!(json["jobs"][0]["title"], "Growth marketer");
    assert_eq!(json["jobs"][1]["title"], "SEO specialist");

    let (_, json) = send(
        &app.router,
        Request::get("/v1/jobs?profiles=Machine%20Learning,Digital%20Marketing&source=vodafone&employment_type=full_time")
            .body(Body::empty())
            .unwrap(),
    )
    .await;
    assert_eq!(json["count"], 2);
    assert_eq!(json["jobs"][0]["title"], "ML engineer");

    let (_, json) = send(
        &app.router,
        Request::get("/v1/jobs?employment_type=freelance")
            .body(Body::empty())
            .unwrap(),
    )
    .await;
    assert_eq!(json["count"], 1);
    assert_eq!(json["jobs"][0]["source"], "mostaql");
    assert_eq!(json["jobs"][0]["category"], "Digital Marketing");
}

#[tokio::test]
async fn list_jobs_rejects_unknown_employment_type() {
    let app = setup_test_app();

    let (status, json) = send(
        &app.router,
        Request::get("/v1/jobs?employment_type=volunteer").body(Body::empty()).unwrap(),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["error"], "invalid_request");
}

#[tokio::test]
async fn oversized_body_returns_413() {
    let app = setup_test_app();
    let profiles: Vec<String> = (0..4000).map(|i| format!("profile-{i}")).collect();

    let (status, _) = send(
        &app.router,
        post_json(RUN, Some(TEST_ADMIN_TOKEN), json!({ "profiles": profiles })),
    )
    .await;

    assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
    assert!(app.fetcher.requested().is_empty());
}

#[tokio::test]
async fn list_jobs_keeps_comma_in_active_profile_name() {
    let app = setup_test_app_with_profiles(&[("Data, Analytics & BI", true)]);
    app.store.seed(seeded(
        "BI analyst",
        "vodafone",
        Category::Other("Data, Analytics & BI".into()),
        "Full time",
        1,
    ));
    app.store.seed(seeded("SEO specialist", "mostaql", Category::DigitalMarketing, "عمل حر", 2));

    let (status, json) = send(&app.router, Request::get("/v1/jobs").body(Body::empty()).unwrap()).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["count"], 1);
    assert_eq!(json["jobs"][0]["title"], "BI analyst");
}
