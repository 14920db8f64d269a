use super::*;

#[tokio::test]
async fn stores_overwrites_and_removes_values() {
    let storage = Storage::new("sqlite::memory:").await.expect("db");
    assert_eq!(storage.get(keys::USER).await.expect("get"), None);

    storage.set(keys::USER, "{\"userId\":\"u1\"}").await.expect("set");
    storage.set(keys::USER, "{\"userId\":\"u2\"}").await.expect("overwrite");
    assert_eq!(
        storage.get(keys::USER).await.expect("get").as_deref(),
        Some("{\"userId\":\"u2\"}")
    );

    storage.remove(keys::USER).await.expect("remove");
    assert_eq!(storage.get(keys::USER).await.expect("get"), None);
}

#[tokio::test]
async fn health_check_succeeds_for_live_pool() {
    let storage = Storage::new("sqlite::memory:").await.expect("db");
    storage.health_check().await.expect("health check");
}

#[tokio::test]
async fn creates_database_file_when_missing() {
    let temp_root = tempfile::tempdir().expect("tempdir");
    let db_path = temp_root.path().join("nested").join("learner.db");
    let database_url = format!("sqlite://{}", db_path.to_string_lossy().replace('\\', "/"));

    let storage = Storage::new(&database_url).await.expect("db");
    storage.set(keys::CURRENT_COURSE_ID, "c1").await.expect("set");
    drop(storage);

    assert!(
        db_path.exists(),
        "database file should exist: {}",
        db_path.display()
    );

    let reopened = Storage::new(&database_url).await.expect("reopen");
    assert_eq!(
        reopened.get(keys::CURRENT_COURSE_ID).await.expect("get").as_deref(),
        Some("c1")
    );
}

#[tokio::test]
async fn lists_keys_in_order() {
    let storage = Storage::new("sqlite::memory:").await.expect("db");
    storage.set(keys::CURRENT_TOPIC_ID, "t1").await.expect("set");
    storage.set(keys::ASSESSMENT_DURATION, "20").await.expect("set");
    assert_eq!(
        storage.keys().await.expect("keys"),
        vec![
            keys::ASSESSMENT_DURATION.to_string(),
            keys::CURRENT_TOPIC_ID.to_string()
        ]
    );
}

#[tokio::test]
async fn memory_store_behaves_like_sqlite_store() {
    let store = MemoryStore::new();
    store.set(keys::ACTIVE_QUIZ_ATTEMPT, "at1").await.expect("set");
    assert_eq!(
        store.get(keys::ACTIVE_QUIZ_ATTEMPT).await.expect("get").as_deref(),
        Some("at1")
    );
    store.remove(keys::ACTIVE_QUIZ_ATTEMPT).await.expect("remove");
    assert!(store.keys().await.expect("keys").is_empty());
}

#[test]
fn sqlite_path_ignores_memory_and_query_suffix() {
    assert_eq!(sqlite_path("sqlite::memory:"), None);
    assert_eq!(sqlite_path("postgres://db"), None);
    assert_eq!(
        sqlite_path("sqlite:///tmp/learner/store.db?mode=rwc"),
        Some(PathBuf::from("/tmp/learner/store.db"))
    );
}
