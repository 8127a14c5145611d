use auji_core::traits::ProfileStore;
use auji_db::ProfileRepository;

use crate::integration::common::setup_test_db;

#[tokio::test]
async fn active_profiles_only() {
    let (pool, _container) = setup_test_db().await;
    let repo = ProfileRepository::new(pool);

    assert!(repo.active_profile_names().await.unwrap().is_empty());

    repo.upsert("تسويق رقمي", true).await.unwrap();
    repo.upsert("Machine Learning", false).await.unwrap();
    repo.upsert("Data Analysis", true).await.unwrap();

    let active = repo.active_profile_names().await.unwrap();
    assert_eq!(active, ["تسويق رقمي", "Data Analysis"]);
}

#[tokio::test]
async fn upsert_toggles_existing_profile() {
    let (pool, _container) = setup_test_db().await;
    let repo = ProfileRepository::new(pool);

    repo.upsert("Machine Learning", false).await.unwrap();
    repo.upsert("Machine Learning", true).await.unwrap();

    let profiles = repo.list().await.unwrap();
    assert_eq!(profiles.len(), 1);
    assert!(profiles[0].is_active);
}
