use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use http_body_util::BodyExt;
use tower::ServiceExt;

use auji_core::ScrapeConfig;
use auji_core::testutil::{MemoryJobStore, MemoryProfileStore, MockFetcher};
use auji_server::routes;
use auji_server::state::AppState;

pub const TEST_ADMIN_TOKEN: &str = "test-admin-token";

pub const MOSTAQL_LISTING: &str = r#"
<html><body>
  <div class="project-row">
    <h2><a class="anchor" href="/project/501-campaign">حملة إعلانات ممولة على فيسبوك</a></h2>
    <ul class="project_meta">
      <li><bdi>منى حسن</bdi></li>
      <li><time>منذ ساعتين</time></li>
    </ul>
  </div>
  <div class="project-row">
    <h2><a href="/project/502-seo">SEO audit for an online store</a></h2>
    <ul class="project_meta">
      <li><bdi>كريم</bdi></li>
      <li><time>منذ 5 أيام</time></li>
    </ul>
  </div>
</body></html>
"#;

/// Router over in-memory stores plus handles to inspect them.
pub struct TestApp {
    pub router: Router,
    pub store: MemoryJobStore,
    pub fetcher: MockFetcher,
}

const DEFAULT_PROFILES: &[(&str, bool)] = &[("تسويق رقمي", true), ("Machine Learning", false)];

pub fn setup_test_app() -> TestApp {
    build(Some(TEST_ADMIN_TOKEN), MockFetcher::new(MOSTAQL_LISTING), DEFAULT_PROFILES)
}

pub fn setup_test_app_no_auth() -> TestApp {
    build(None, MockFetcher::new(MOSTAQL_LISTING), DEFAULT_PROFILES)
}

pub fn setup_test_app_with_fetcher(fetcher: MockFetcher) -> TestApp {
    build(Some(TEST_ADMIN_TOKEN), fetcher, DEFAULT_PROFILES)
}

pub fn setup_test_app_with_profiles(profiles: &[(&str, bool)]) -> TestApp {
    build(Some(TEST_ADMIN_TOKEN), MockFetcher::new(MOSTAQL_LISTING), profiles)
}

fn build(admin_token: Option<&str>, fetcher: MockFetcher, profiles: &[(&str, bool)]) -> TestApp {
    let store = MemoryJobStore::new();
    let profiles = MemoryProfileStore::new(profiles);
    let config = ScrapeConfig {
        debug_dir: std::env::temp_dir().join("auji-server-tests"),
        ..ScrapeConfig::default()
    };

    let mut state = AppState::new(store.clone(), profiles, fetcher.clone(), config);
    if let Some(token) = admin_token {
        state = state.with_admin_token(token);
    }

    TestApp {
        router: routes::router(Arc::new(state)),
        store,
        fetcher,
    }
}

pub fn post_json(uri: &str, token: Option<&str>, body: serde_json::Value) -> Request<Body> {
    let mut builder = Request::post(uri).header("content-type", "application/json");
    if let Some(token) = token {
        builder = builder.header("authorization", format!("Bearer {token}"));
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

pub async fn send(router: &Router, request: Request<Body>) -> (StatusCode, serde_json::Value) {
    let response = router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let body = response.into_body().collect().await.unwrap().to_bytes();
    // Non-JSON bodies (e.g. tower-http's plain-text 413) come back as Null.
    let json = serde_json::from_slice(&body).unwrap_or(serde_json::Value::Null);
    (status, json)
}
