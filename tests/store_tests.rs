#![allow(clippy::unwrap_used)]

use anyhow::Result;
use chrono::{Duration, Utc};
use reminder_broadcast_bot::database::Store;
use tempfile::{tempdir, TempDir};

async fn setup_store() -> Result<(Store, TempDir)> {
    let temp_dir = tempdir()?;
    let db_path = temp_dir.path().join("test.db");
    let database_url = format!("sqlite:{}", db_path.display());

    let store = Store::connect(&database_url).await?;
    store.run_migrations().await?;

    Ok((store, temp_dir))
}

#[tokio::test]
async fn test_create_and_list_reminder() -> Result<()> {
    let (store, _temp_dir) = setup_store().await?;
    let owner_id = 100i64;
    let due_at = Utc::now() + Duration::days(1);

    let id = store.create_reminder(owner_id, "Buy milk", due_at).await?;
    assert!(id > 0);

    let reminders = store.list_reminders_for(owner_id).await;
    assert_eq!(reminders.len(), 1);
    assert_eq!(reminders[0].id, id);
    assert_eq!(reminders[0].owner_id, owner_id);
    assert_eq!(reminders[0].text, "Buy milk");
    assert!(!reminders[0].is_sent);

    // Allow for sub-second storage rounding
    let stored = reminders[0].due_at.timestamp();
    assert!((stored - due_at.timestamp()).abs() <= 1);

    Ok(())
}

#[tokio::test]
async fn test_create_rejects_empty_text() -> Result<()> {
    let (store, _temp_dir) = setup_store().await?;
    let due_at = Utc::now() + Duration::days(1);

    let result = store.create_reminder(100, "   ", due_at).await;
    assert!(result.is_err());

    // Nothing was inserted
    assert_eq!(store.pending_reminder_count().await, 0);

    Ok(())
}

#[tokio::test]
async fn test_list_orders_by_due_time() -> Result<()> {
    let (store, _temp_dir) = setup_store().await?;
    let owner_id = 100i64;
    let now = Utc::now();

    let late = store
        .create_reminder(owner_id, "later", now + Duration::days(3))
        .await?;
    let early = store
        .create_reminder(owner_id, "sooner", now + Duration::days(1))
        .await?;

    let reminders = store.list_reminders_for(owner_id).await;
    assert_eq!(reminders.len(), 2);
    assert_eq!(reminders[0].id, early);
    assert_eq!(reminders[1].id, late);

    // Another owner sees nothing
    assert!(store.list_reminders_for(999).await.is_empty());

    Ok(())
}

#[tokio::test]
async fn test_due_reminders_selects_only_due_and_unsent() -> Result<()> {
    let (store, _temp_dir) = setup_store().await?;
    let now = Utc::now();

    let past = store
        .create_reminder(100, "past", now - Duration::minutes(5))
        .await?;
    let _future = store
        .create_reminder(100, "future", now + Duration::hours(1))
        .await?;

    let due = store.due_reminders(now).await;
    assert_eq!(due.len(), 1);
    assert_eq!(due[0].id, past);
    assert_eq!(due[0].text, "past");
    assert!(due[0].is_due(now));

    // The future one agrees through the model predicate too
    let all = store.list_reminders_for(100).await;
    let future_row = all.iter().find(|r| r.text == "future").unwrap();
    assert!(!future_row.is_due(now));

    Ok(())
}

#[tokio::test]
async fn test_due_reminders_boundary_is_inclusive() -> Result<()> {
    let (store, _temp_dir) = setup_store().await?;
    let due_at = Utc::now() + Duration::minutes(10);

    let id = store.create_reminder(100, "on the dot", due_at).await?;

    // Exactly at due_at the reminder is already due
    let due = store.due_reminders(due_at).await;
    assert_eq!(due.len(), 1);
    assert_eq!(due[0].id, id);

    // One second earlier it is not
    let due_before = store.due_reminders(due_at - Duration::seconds(1)).await;
    assert!(due_before.is_empty());

    Ok(())
}

#[tokio::test]
async fn test_past_due_time_accepted_at_store_level() -> Result<()> {
    // Rejection of past times is conversation policy; the store itself
    // accepts them so catch-up inserts behave uniformly.
    let (store, _temp_dir) = setup_store().await?;
    let due_at = Utc::now() - Duration::days(1);

    let id = store.create_reminder(100, "already late", due_at).await?;
    assert!(id > 0);

    let due = store.due_reminders(Utc::now()).await;
    assert_eq!(due.len(), 1);

    Ok(())
}

#[tokio::test]
async fn test_update_reminder_text_only() -> Result<()> {
    let (store, _temp_dir) = setup_store().await?;
    let due_at = Utc::now() + Duration::days(1);
    let id = store.create_reminder(100, "old text", due_at).await?;

    let updated = store.update_reminder(id, Some("new text"), None).await;
    assert!(updated);

    let reminders = store.list_reminders_for(100).await;
    assert_eq!(reminders[0].text, "new text");
    // Due time untouched
    assert!((reminders[0].due_at.timestamp() - due_at.timestamp()).abs() <= 1);

    Ok(())
}

#[tokio::test]
async fn test_update_reminder_time_only() -> Result<()> {
    let (store, _temp_dir) = setup_store().await?;
    let due_at = Utc::now() + Duration::days(1);
    let new_due = Utc::now() + Duration::days(2);
    let id = store.create_reminder(100, "keep me", due_at).await?;

    let updated = store.update_reminder(id, None, Some(new_due)).await;
    assert!(updated);

    let reminders = store.list_reminders_for(100).await;
    assert_eq!(reminders[0].text, "keep me");
    assert!((reminders[0].due_at.timestamp() - new_due.timestamp()).abs() <= 1);

    Ok(())
}

#[tokio::test]
async fn test_update_reminder_both_fields() -> Result<()> {
    let (store, _temp_dir) = setup_store().await?;
    let new_due = Utc::now() + Duration::days(5);
    let id = store
        .create_reminder(100, "old", Utc::now() + Duration::days(1))
        .await?;

    let updated = store.update_reminder(id, Some("new"), Some(new_due)).await;
    assert!(updated);

    let reminders = store.list_reminders_for(100).await;
    assert_eq!(reminders[0].text, "new");
    assert!((reminders[0].due_at.timestamp() - new_due.timestamp()).abs() <= 1);

    Ok(())
}

#[tokio::test]
async fn test_update_missing_reminder_returns_false() -> Result<()> {
    let (store, _temp_dir) = setup_store().await?;

    assert!(!store.update_reminder(9999, Some("ghost"), None).await);

    Ok(())
}

#[tokio::test]
async fn test_update_without_fields_returns_false() -> Result<()> {
    let (store, _temp_dir) = setup_store().await?;
    let id = store
        .create_reminder(100, "unchanged", Utc::now() + Duration::days(1))
        .await?;

    assert!(!store.update_reminder(id, None, None).await);

    let reminders = store.list_reminders_for(100).await;
    assert_eq!(reminders[0].text, "unchanged");

    Ok(())
}

#[tokio::test]
async fn test_update_rejects_empty_text() -> Result<()> {
    let (store, _temp_dir) = setup_store().await?;
    let id = store
        .create_reminder(100, "original", Utc::now() + Duration::days(1))
        .await?;

    assert!(!store.update_reminder(id, Some("  "), None).await);

    let reminders = store.list_reminders_for(100).await;
    assert_eq!(reminders[0].text, "original");

    Ok(())
}

#[tokio::test]
async fn test_delete_reminder() -> Result<()> {
    let (store, _temp_dir) = setup_store().await?;
    let id = store
        .create_reminder(100, "doomed", Utc::now() - Duration::minutes(1))
        .await?;

    assert!(store.delete_reminder(id).await);
    // Second delete finds nothing
    assert!(!store.delete_reminder(id).await);

    // Gone from every read path
    assert!(store.list_reminders_for(100).await.is_empty());
    assert!(store.due_reminders(Utc::now()).await.is_empty());
    assert_eq!(store.pending_reminder_count().await, 0);

    Ok(())
}

#[tokio::test]
async fn test_pending_reminder_count() -> Result<()> {
    let (store, _temp_dir) = setup_store().await?;
    assert_eq!(store.pending_reminder_count().await, 0);

    store
        .create_reminder(100, "one", Utc::now() + Duration::days(1))
        .await?;
    store
        .create_reminder(100, "two", Utc::now() + Duration::days(2))
        .await?;

    assert_eq!(store.pending_reminder_count().await, 2);

    Ok(())
}

#[tokio::test]
async fn test_upsert_user_and_retrieval() -> Result<()> {
    let (store, _temp_dir) = setup_store().await?;
    let user_id = 42i64;

    assert!(
        store
            .upsert_user(user_id, Some("alice"), Some("Alice"), None)
            .await
    );

    let user = store.get_user(user_id).await;
    assert!(user.is_some());
    let user = user.unwrap();
    assert_eq!(user.user_id, user_id);
    assert_eq!(user.username.as_deref(), Some("alice"));
    assert_eq!(user.first_name.as_deref(), Some("Alice"));
    assert_eq!(user.last_name, None);

    Ok(())
}

#[tokio::test]
async fn test_upsert_user_is_idempotent() -> Result<()> {
    let (store, _temp_dir) = setup_store().await?;
    let user_id = 42i64;

    store
        .upsert_user(user_id, Some("alice"), Some("Alice"), None)
        .await;
    store
        .upsert_user(user_id, Some("alice_new"), Some("Alice"), Some("Smith"))
        .await;

    // Still one row, carrying the latest metadata
    let ids = store.list_user_ids().await;
    assert_eq!(ids, vec![user_id]);

    let user = store.get_user(user_id).await.unwrap();
    assert_eq!(user.username.as_deref(), Some("alice_new"));
    assert_eq!(user.last_name.as_deref(), Some("Smith"));

    Ok(())
}

#[tokio::test]
async fn test_list_user_ids_covers_everyone() -> Result<()> {
    let (store, _temp_dir) = setup_store().await?;

    store.upsert_user(1, Some("a"), None, None).await;
    store.upsert_user(2, None, Some("B"), None).await;
    store.upsert_user(3, None, None, None).await;

    let mut ids = store.list_user_ids().await;
    ids.sort_unstable();
    assert_eq!(ids, vec![1, 2, 3]);

    Ok(())
}

#[tokio::test]
async fn test_get_unknown_user_returns_none() -> Result<()> {
    let (store, _temp_dir) = setup_store().await?;

    assert!(store.get_user(777).await.is_none());

    Ok(())
}
