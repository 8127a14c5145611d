use auji_core::models::{
    Category, EmploymentType, IdentityField, JobChanges, JobFilter, Posting,
};
use auji_core::traits::JobStore;
use auji_core::{IngestService, StaticProfiles};
use auji_db::JobRepository;
use chrono::{TimeDelta, Utc};

use crate::integration::common::setup_test_db;

fn vodafone_posting(id: u32) -> Posting {
    let mut posting = Posting::new(format!("Data Analyst {id}"), "vodafone");
    posting.company = "Vodafone".into();
    posting.location = Some("Cairo, Egypt".into());
    posting.detail_url = Some(format!("https://jobs.vodafone.com/careers/job/{id}"));
    posting.apply_url = Some(format!(
        "https://jobs.vodafone.com/careers/apply?pid={id}&domain=vodafone.com"
    ));
    posting.url = posting.apply_url.clone();
    posting.category = Some(Category::DataAnalysis);
    posting.employment_type = Some(EmploymentType::FullTime.into());
    posting.posted_at = Some(Utc::now() - TimeDelta::days(id as i64));
    posting
}

fn mostaql_posting(slug: &str) -> Posting {
    let link = format!("https://mostaql.com/project/{slug}");
    let mut posting = Posting::new(format!("تصميم {slug}"), "mostaql");
    posting.company = "مستقل".into();
    posting.detail_url = Some(link.clone());
    posting.apply_url = Some(link.clone());
    posting.url = Some(link);
    posting.category = Some(Category::DigitalMarketing);
    posting.employment_type = Some(EmploymentType::Freelance.into());
    posting
}

#[tokio::test]
async fn insert_and_find_by_identity() {
    let (pool, _container) = setup_test_db().await;
    let repo = JobRepository::new(pool);

    let posting = vodafone_posting(1);
    let record = repo.insert(&posting).await.unwrap();
    assert!(!record.id.is_nil());
    assert_eq!(record.title, "Data Analyst 1");
    assert_eq!(record.category, Some(Category::DataAnalysis));
    assert_eq!(
        record.employment_type.as_ref().and_then(|l| l.canonical()),
        Some(EmploymentType::FullTime)
    );

    let by_detail = repo
        .find_by(
            IdentityField::DetailUrl,
            "https://jobs.vodafone.com/careers/job/1",
            Some("vodafone"),
        )
        .await
        .unwrap()
        .expect("should match on detail_url");
    assert_eq!(by_detail.id, record.id);

    let unscoped = repo
        .find_by(
            IdentityField::LegacyUrl,
            posting.url.as_deref().unwrap(),
            None,
        )
        .await
        .unwrap();
    assert_eq!(unscoped.map(|r| r.id), Some(record.id));
}

#[tokio::test]
async fn find_by_is_scoped_to_source() {
    let (pool, _container) = setup_test_db().await;
    let repo = JobRepository::new(pool);

    let posting = mostaql_posting("42-logo");
    repo.insert(&posting).await.unwrap();

    let link = posting.detail_url.as_deref().unwrap();
    let other_source = repo
        .find_by(IdentityField::DetailUrl, link, Some("vodafone"))
        .await
        .unwrap();
    assert!(other_source.is_none());

    let same_source = repo
        .find_by(IdentityField::DetailUrl, link, Some("mostaql"))
        .await
        .unwrap();
    assert!(same_source.is_some());
}

#[tokio::test]
async fn update_only_touches_given_fields() {
    let (pool, _container) = setup_test_db().await;
    let repo = JobRepository::new(pool);

    let record = repo.insert(&vodafone_posting(2)).await.unwrap();

    let changes = JobChanges {
        description: Some("SQL\nPower BI".into()),
        category: Some(Category::MachineLearning),
        ..JobChanges::default()
    };
    repo.update(record.id, &changes).await.unwrap();

    let stored = repo.get(record.id).await.unwrap().unwrap();
    assert_eq!(stored.description.as_deref(), Some("SQL\nPower BI"));
    assert_eq!(stored.category, Some(Category::MachineLearning));
    assert_eq!(stored.title, record.title);
    assert_eq!(stored.location, record.location);
    assert_eq!(stored.apply_url, record.apply_url);
    assert_eq!(stored.created_at, record.created_at);
    assert!(stored.updated_at >= record.updated_at);
}

#[tokio::test]
async fn update_missing_row_is_an_error() {
    let (pool, _container) = setup_test_db().await;
    let repo = JobRepository::new(pool);

    let result = repo.update(uuid::Uuid::new_v4(), &JobChanges::default()).await;
    assert!(result.is_err());
}

#[tokio::test]
async fn list_applies_filters_and_ordering() {
    let (pool, _container) = setup_test_db().await;
    let repo = JobRepository::new(pool);

    for id in [3, 1, 2] {
        repo.insert(&vodafone_posting(id)).await.unwrap();
    }
    let mut undated = mostaql_posting("7-seo");
    undated.description = Some("  ".into());
    repo.insert(&undated).await.unwrap();

    let all = repo.list(&JobFilter::default()).await.unwrap();
    let titles: Vec<&str> = all.iter().map(|r| r.title.as_str()).collect();
    assert_eq!(
        titles,
        ["Data Analyst 1", "Data Analyst 2", "Data Analyst 3", "تصميم 7-seo"]
    );

    let freelance = repo
        .list(&JobFilter {
            employment_type: Some(EmploymentType::Freelance),
            ..JobFilter::default()
        })
        .await
        .unwrap();
    assert_eq!(freelance.len(), 1);
    assert_eq!(freelance[0].source, "mostaql");

    let recent_analysis = repo
        .list(&JobFilter {
            categories: vec![Category::DataAnalysis],
            posted_after: Some(Utc::now() - TimeDelta::hours(36)),
            ..JobFilter::default()
        })
        .await
        .unwrap();
    assert_eq!(recent_analysis.len(), 1);
    assert_eq!(recent_analysis[0].title, "Data Analyst 1");

    let page = repo
        .list(&JobFilter {
            source: Some("vodafone".into()),
            limit: Some(1),
            offset: 1,
            ..JobFilter::default()
        })
        .await
        .unwrap();
    assert_eq!(page.len(), 1);
    assert_eq!(page[0].title, "Data Analyst 2");

    let undescribed = repo
        .list(&JobFilter {
            missing_description: true,
            ..JobFilter::default()
        })
        .await
        .unwrap();
    assert_eq!(undescribed.len(), 4);

    assert_eq!(repo.count().await.unwrap(), 4);
}

#[tokio::test]
async fn ingestion_is_idempotent_against_postgres() {
    let (pool, _container) = setup_test_db().await;
    let repo = JobRepository::new(pool);
    let service = IngestService::new(repo.clone(), StaticProfiles::default());

    let batch = vec![vodafone_posting(10), mostaql_posting("11-ads")];

    let first = service.ingest(batch.clone()).await.unwrap();
    assert_eq!((first.inserted, first.updated, first.skipped), (2, 0, 0));

    let second = service.ingest(batch).await.unwrap();
    assert_eq!((second.inserted, second.updated, second.skipped), (0, 2, 0));

    assert_eq!(repo.count().await.unwrap(), 2);
}
