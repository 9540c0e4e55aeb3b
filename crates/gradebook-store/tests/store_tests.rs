//! Contract tests shared by every `GradeStore` implementation.
//!
//! - write then read returns the table as written
//! - unseen courses read as empty tables
//! - writes are wholesale, last-writer-wins replacements
//! - courses are independent under concurrent use

use futures::future::join_all;
use gradebook_store::{GradeStore, MemoryStore, SqliteStore};
use gradebook_table::{CourseId, RawTable, RawValue};
use gradebook_test_utils::{raw_row, student};
use pretty_assertions::assert_eq;
use std::sync::Arc;

fn sample_table() -> RawTable {
    let mut raw = RawTable::new();
    raw.insert(
        "s1".into(),
        student("s1", "Ann", 90.into(), RawValue::empty(), 40.5.into()),
    );
    raw.insert(
        "s2".into(),
        student("s2", "Bob", 70.into(), 60.into(), 30.into()),
    );
    raw
}

async fn check_round_trip(store: &dyn GradeStore) {
    let course = CourseId::new("cs544");
    let written = store.write(&course, &sample_table()).await.unwrap();
    assert_eq!(written, sample_table());
    assert_eq!(store.read(&course).await.unwrap(), sample_table());
}

async fn check_last_writer_wins(store: &dyn GradeStore) {
    let course = CourseId::new("cs544");
    let first = store.read(&course).await.unwrap();
    let second = store.read(&course).await.unwrap();

    let mut a = first.clone();
    a.insert("sa".into(), raw_row(&[("studentId", "sa".into())]));
    let mut b = second.clone();
    b.insert("sb".into(), raw_row(&[("studentId", "sb".into())]));

    store.write(&course, &a).await.unwrap();
    store.write(&course, &b).await.unwrap();

    // Both writers started from the same snapshot; the first update is lost.
    let stored = store.read(&course).await.unwrap();
    assert!(stored.contains_key("sb"));
    assert!(!stored.contains_key("sa"));
}

async fn check_clear(store: &dyn GradeStore) {
    store.write(&CourseId::new("a"), &sample_table()).await.unwrap();
    store.write(&CourseId::new("b"), &sample_table()).await.unwrap();
    store.clear().await.unwrap();
    assert!(store.read(&CourseId::new("a")).await.unwrap().is_empty());
    assert!(store.read(&CourseId::new("b")).await.unwrap().is_empty());
}

#[tokio::test]
async fn memory_store_contract() {
    let store = MemoryStore::new();
    check_round_trip(&store).await;
    check_last_writer_wins(&store).await;
    check_clear(&store).await;
}

#[tokio::test]
async fn sqlite_store_contract() {
    let store = SqliteStore::open_in_memory().unwrap();
    check_round_trip(&store).await;
    check_last_writer_wins(&store).await;
    check_clear(&store).await;
}

#[tokio::test]
async fn sqlite_file_survives_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("grades.db");
    let course = CourseId::new("cs544");

    let store = SqliteStore::open(&path).unwrap();
    store.write(&course, &sample_table()).await.unwrap();
    store.close().await.unwrap();

    let reopened = SqliteStore::open(&path).unwrap();
    let raw = reopened.read(&course).await.unwrap();
    assert_eq!(raw, sample_table());
    let ids: Vec<&str> = raw.keys().map(String::as_str).collect();
    assert_eq!(ids, vec!["s1", "s2"]);
    reopened.close().await.unwrap();
}

#[tokio::test]
async fn independent_courses_in_parallel() {
    let store: Arc<dyn GradeStore> = Arc::new(SqliteStore::open_in_memory().unwrap());

    let writes = (0..8).map(|i| {
        let store = Arc::clone(&store);
        async move {
            let course = CourseId::new(format!("course{i}"));
            let mut raw = RawTable::new();
            raw.insert(
                format!("s{i}"),
                raw_row(&[("studentId", format!("s{i}").into())]),
            );
            store.write(&course, &raw).await.unwrap();
            (course, raw)
        }
    });

    for (course, raw) in join_all(writes).await {
        assert_eq!(store.read(&course).await.unwrap(), raw);
    }
}
