//! Click retention tests

use std::sync::Arc;

use chrono::{Duration, Utc};
use sea_orm::ConnectionTrait;
use tempfile::TempDir;

use biolinks::config::{DatabaseConfig, MAX_RETENTION_DAYS, RetentionConfig};
use biolinks::errors::BioLinksError;
use biolinks::services::RetentionTask;
use biolinks::storage::ClickStore;

fn store_in(dir: &TempDir) -> Arc<ClickStore> {
    Arc::new(ClickStore::new(DatabaseConfig {
        database_url: format!("sqlite://{}", dir.path().join("retention.db").display()),
        ..DatabaseConfig::default()
    }))
}

#[tokio::test]
async fn test_no_task_without_max_age() {
    let dir = TempDir::new().unwrap();
    let task = RetentionTask::from_config(store_in(&dir), &RetentionConfig::default());
    assert!(task.is_none());
}

#[tokio::test]
async fn test_cutoff_is_max_age_before_now() {
    let dir = TempDir::new().unwrap();
    let task = RetentionTask::new(store_in(&dir), 30, 100);
    let now = Utc::now();
    assert_eq!(task.cutoff(now).unwrap(), now - Duration::days(30));
}

#[tokio::test]
async fn test_cutoff_beyond_calendar_range_is_an_error() {
    let dir = TempDir::new().unwrap();
    let task = RetentionTask::new(store_in(&dir), u32::MAX, 100);
    let err = task.cutoff(Utc::now()).unwrap_err();
    assert!(matches!(err, BioLinksError::Configuration(_)));

    // 上限内的最大值仍可计算
    let task = RetentionTask::new(store_in(&dir), MAX_RETENTION_DAYS, 100);
    assert!(task.cutoff(Utc::now()).is_ok());
}

#[tokio::test]
async fn test_run_once_deletes_expired_clicks() {
    let dir = TempDir::new().unwrap();
    let store = store_in(&dir);
    store.initialize().await.unwrap();

    store.record_click("GitHub").await.unwrap();
    store.record_click("GitHub").await.unwrap();
    store.record_click("Twitter").await.unwrap();

    let db = store.connection().await.unwrap();
    db.execute_unprepared(
        "UPDATE link_click SET clicked_at = '2001-02-03 04:05:06+00:00' WHERE link_name = 'GitHub'",
    )
    .await
    .unwrap();

    let config = RetentionConfig {
        max_age_days: Some(7),
        ..RetentionConfig::default()
    };
    let task = RetentionTask::from_config(store.clone(), &config).unwrap();
    let report = task.run_once().await.unwrap();

    assert_eq!(report.deleted, 2);
    assert_eq!(store.count_clicks(None).await.unwrap(), 1);

    // 再跑一次没有可删的
    assert_eq!(task.run_once().await.unwrap().deleted, 0);
}
