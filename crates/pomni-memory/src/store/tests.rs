use super::tasks::{format_timestamp, parse_timestamp};
use super::{PrefixMatch, Store, TaskOwner};
use chrono::{Duration, NaiveDate, Utc};
use pomni_core::config::MemoryConfig;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use std::str::FromStr;

/// Create an in-memory store for testing.
async fn test_store() -> Store {
    let opts = SqliteConnectOptions::from_str("sqlite::memory:")
        .unwrap()
        .create_if_missing(true);
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect_with(opts)
        .await
        .unwrap();
    Store::run_migrations(&pool).await.unwrap();
    Store { pool }
}

fn owner(id: &str) -> TaskOwner<'_> {
    TaskOwner {
        channel: "telegram",
        owner_id: id,
        reply_target: id,
    }
}

#[tokio::test]
async fn test_create_reminder_is_one_shot() {
    let store = test_store().await;
    let before = Utc::now();
    let task = store
        .create_reminder(owner("1"), "напомни купить молоко", before + Duration::hours(1))
        .await
        .unwrap();

    let stored = store.get_task(&task.id).await.unwrap().unwrap();
    assert_eq!(stored, task);
    assert!(!stored.is_recurring);
    assert!(!stored.is_done);
    assert_eq!(stored.content, "напомни купить молоко");
    let remind_at = stored.remind_at.expect("reminder must carry remind_at");
    assert!(remind_at > stored.created_at);
    assert!(remind_at > before);
}

#[tokio::test]
async fn test_create_recurring_task_has_no_remind_at() {
    let store = test_store().await;
    let task = store
        .create_recurring_task(owner("1"), "каждый день зарядка")
        .await
        .unwrap();
    assert!(task.is_recurring);
    assert!(task.remind_at.is_none());
    assert!(task.last_notified_on.is_none());
}

#[tokio::test]
async fn test_list_recurring_tasks_includes_each_once() {
    let store = test_store().await;
    let a = store
        .create_recurring_task(owner("1"), "каждый день зарядка")
        .await
        .unwrap();
    store
        .create_reminder(owner("1"), "напомни позвонить", Utc::now())
        .await
        .unwrap();
    let b = store
        .create_recurring_task(owner("2"), "каждый день читать")
        .await
        .unwrap();

    let tasks = store.list_recurring_tasks().await.unwrap();
    assert_eq!(tasks.len(), 2);
    assert_eq!(tasks.iter().filter(|t| t.id == a.id).count(), 1);
    assert_eq!(tasks.iter().filter(|t| t.id == b.id).count(), 1);
    // Insertion order.
    assert_eq!(tasks[0].id, a.id);
    assert_eq!(tasks[1].owner_id, "2");
}

#[tokio::test]
async fn test_list_recurring_ignores_done_flag() {
    let store = test_store().await;
    let task = store
        .create_recurring_task(owner("1"), "каждый день зарядка")
        .await
        .unwrap();
    assert!(store.mark_done(&task.id).await.unwrap());
    let tasks = store.list_recurring_tasks().await.unwrap();
    assert_eq!(tasks.len(), 1);
    assert!(tasks[0].is_done);
}

#[tokio::test]
async fn test_get_due_reminders() {
    let store = test_store().await;
    let now = Utc::now();
    let past = store
        .create_reminder(owner("1"), "past", now - Duration::minutes(5))
        .await
        .unwrap();
    store
        .create_reminder(owner("1"), "future", now + Duration::hours(1))
        .await
        .unwrap();
    store
        .create_recurring_task(owner("1"), "recurring")
        .await
        .unwrap();

    let due = store.get_due_reminders(now).await.unwrap();
    assert_eq!(due.len(), 1);
    assert_eq!(due[0].id, past.id);

    // Once marked done it is no longer due.
    assert!(store.mark_done(&past.id).await.unwrap());
    assert!(store.get_due_reminders(now).await.unwrap().is_empty());
    // Idempotent.
    assert!(!store.mark_done(&past.id).await.unwrap());
}

#[tokio::test]
async fn test_get_tasks_for_owner_pending_only() {
    let store = test_store().await;
    let done = store
        .create_reminder(owner("1"), "old", Utc::now())
        .await
        .unwrap();
    store.mark_done(&done.id).await.unwrap();
    store
        .create_reminder(owner("1"), "new", Utc::now())
        .await
        .unwrap();
    store
        .create_recurring_task(owner("1"), "daily")
        .await
        .unwrap();
    store
        .create_recurring_task(owner("2"), "other user")
        .await
        .unwrap();

    let tasks = store.get_tasks_for_owner("1").await.unwrap();
    assert_eq!(tasks.len(), 2);
    assert_eq!(tasks[0].content, "daily");
    assert_eq!(tasks[1].content, "new");
}

#[tokio::test]
async fn test_complete_task_by_prefix() {
    let store = test_store().await;
    let task = store
        .create_reminder(owner("1"), "call mom", Utc::now())
        .await
        .unwrap();
    let prefix = &task.id[..8];

    assert_eq!(
        store.complete_task(prefix, "2").await.unwrap(),
        PrefixMatch::NotFound
    );
    assert_eq!(
        store.complete_task(prefix, "1").await.unwrap(),
        PrefixMatch::Applied
    );
    assert!(store.get_task(&task.id).await.unwrap().unwrap().is_done);
}

#[tokio::test]
async fn test_delete_task_wrong_owner() {
    let store = test_store().await;
    let task = store
        .create_recurring_task(owner("1"), "daily")
        .await
        .unwrap();
    let prefix = &task.id[..8];

    assert_eq!(
        store.delete_task(prefix, "2").await.unwrap(),
        PrefixMatch::NotFound
    );
    assert!(store.get_task(&task.id).await.unwrap().is_some());
    assert_eq!(
        store.delete_task(prefix, "1").await.unwrap(),
        PrefixMatch::Applied
    );
    assert!(store.get_task(&task.id).await.unwrap().is_none());
}

#[tokio::test]
async fn test_empty_prefix_matches_nothing() {
    let store = test_store().await;
    store
        .create_recurring_task(owner("1"), "daily")
        .await
        .unwrap();
    assert_eq!(
        store.delete_task("", "1").await.unwrap(),
        PrefixMatch::NotFound
    );
    assert_eq!(
        store.complete_task("", "1").await.unwrap(),
        PrefixMatch::NotFound
    );
    assert_eq!(store.list_recurring_tasks().await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_wildcard_characters_are_literal() {
    let store = test_store().await;
    for content in ["a", "b", "c"] {
        store.create_recurring_task(owner("1"), content).await.unwrap();
    }

    for prefix in ["%", "_", "%%", "_%", "\\%"] {
        assert_eq!(
            store.delete_task(prefix, "1").await.unwrap(),
            PrefixMatch::NotFound,
            "delete {prefix}"
        );
        assert_eq!(
            store.complete_task(prefix, "1").await.unwrap(),
            PrefixMatch::NotFound,
            "complete {prefix}"
        );
    }
    assert_eq!(store.count_pending().await.unwrap(), (0, 3));
}

#[tokio::test]
async fn test_ambiguous_prefix_changes_nothing() {
    let store = test_store().await;
    let a = store.create_recurring_task(owner("1"), "a").await.unwrap();
    let b = store.create_recurring_task(owner("1"), "b").await.unwrap();

    // Force a shared prefix on otherwise random UUIDs.
    for (task, id) in [(&a, "abc-1"), (&b, "abc-2")] {
        sqlx::query("UPDATE tasks SET id = ? WHERE id = ?")
            .bind(id)
            .bind(&task.id)
            .execute(&store.pool)
            .await
            .unwrap();
    }

    assert_eq!(
        store.delete_task("abc", "1").await.unwrap(),
        PrefixMatch::Ambiguous
    );
    assert_eq!(
        store.complete_task("abc", "1").await.unwrap(),
        PrefixMatch::Ambiguous
    );
    assert_eq!(store.count_pending().await.unwrap(), (0, 2));

    assert_eq!(
        store.complete_task("abc-1", "1").await.unwrap(),
        PrefixMatch::Applied
    );
    // Only one pending task is left under the prefix.
    assert_eq!(
        store.complete_task("abc", "1").await.unwrap(),
        PrefixMatch::Applied
    );
    assert_eq!(store.count_pending().await.unwrap(), (0, 0));
}

#[tokio::test]
async fn test_claim_daily_notification_once_per_date() {
    let store = test_store().await;
    let task = store
        .create_recurring_task(owner("1"), "daily")
        .await
        .unwrap();
    let monday = NaiveDate::from_ymd_opt(2026, 10, 19).unwrap();
    let tuesday = NaiveDate::from_ymd_opt(2026, 10, 20).unwrap();

    assert!(store.claim_daily_notification(&task.id, monday).await.unwrap());
    assert!(!store.claim_daily_notification(&task.id, monday).await.unwrap());
    assert!(store.claim_daily_notification(&task.id, tuesday).await.unwrap());

    let stored = store.get_task(&task.id).await.unwrap().unwrap();
    assert_eq!(stored.last_notified_on, Some(tuesday));
}

#[tokio::test]
async fn test_count_pending() {
    let store = test_store().await;
    assert_eq!(store.count_pending().await.unwrap(), (0, 0));
    store
        .create_reminder(owner("1"), "a", Utc::now())
        .await
        .unwrap();
    store
        .create_recurring_task(owner("1"), "b")
        .await
        .unwrap();
    store
        .create_recurring_task(owner("2"), "c")
        .await
        .unwrap();
    assert_eq!(store.count_pending().await.unwrap(), (1, 2));
}

#[tokio::test]
async fn test_migrations_are_idempotent() {
    let store = test_store().await;
    let task = store
        .create_recurring_task(owner("1"), "каждый день зарядка")
        .await
        .unwrap();

    Store::run_migrations(&store.pool).await.unwrap();
    Store::run_migrations(&store.pool).await.unwrap();

    let applied: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM _migrations")
        .fetch_one(&store.pool)
        .await
        .unwrap();
    assert_eq!(applied.0, 2);

    let tasks = store.list_recurring_tasks().await.unwrap();
    assert_eq!(tasks, vec![task]);
}

#[tokio::test]
async fn test_store_new_on_disk_reopens() {
    let dir = std::env::temp_dir().join(format!("__pomni_store_test_{}__", std::process::id()));
    let _ = std::fs::remove_dir_all(&dir);
    let config = MemoryConfig {
        db_path: dir.join("tasks.db").to_string_lossy().to_string(),
    };

    let id = {
        let store = Store::new(&config).await.unwrap();
        store
            .create_recurring_task(owner("7"), "каждый день гулять")
            .await
            .unwrap()
            .id
    };

    let reopened = Store::new(&config).await.unwrap();
    let task = reopened.get_task(&id).await.unwrap().unwrap();
    assert_eq!(task.owner_id, "7");

    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn test_timestamp_format_round_trips_to_seconds() {
    let parsed = parse_timestamp("2026-10-19 09:03:00").unwrap();
    assert_eq!(format_timestamp(parsed), "2026-10-19 09:03:00");
    assert!(parse_timestamp("2026-10-19T09:03:00Z").is_err());
}
