// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Firestore integration tests.
//!
//! These tests require the Firestore emulator to be running
//! (`FIRESTORE_EMULATOR_HOST`); they are skipped otherwise.
//!
//! Each test uses its own chat ID so runs do not interfere.

use chrono::Utc;
use scory_bot::db::ActivityStore;
use scory_bot::error::AppError;
use scory_bot::models::{Activity, ActivityStatus};

mod common;
use common::test_db;

/// Generate a unique chat ID for test isolation.
fn unique_chat_id() -> i64 {
    use std::time::{SystemTime, UNIX_EPOCH};
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_nanos();
    -((nanos % 1_000_000_000_000) as i64)
}

fn new_activity(chat_id: i64, name: &str) -> Activity {
    let id = uuid::Uuid::new_v4().simple().to_string();
    Activity::new(id, chat_id, name, Utc::now())
}

// ═══════════════════════════════════════════════════════════════════════════
// DOCUMENT TESTS
// ═══════════════════════════════════════════════════════════════════════════

#[tokio::test]
async fn test_insert_and_get_round_trip() {
    require_emulator!();

    let db = test_db().await;
    let chat_id = unique_chat_id();
    let mut activity = new_activity(chat_id, "Quiz Night");
    activity.add_participant("Ana");
    activity.add_sub_activity("Bonus").unwrap();
    activity.record_sub_score("Bonus", "Ana", 7).unwrap();

    db.insert_activity(&activity).await.unwrap();

    let loaded = db.get_activity(chat_id, &activity.id).await.unwrap();
    assert_eq!(loaded, Some(activity));
}

#[tokio::test]
async fn test_score_order_survives_storage() {
    require_emulator!();

    let db = test_db().await;
    let chat_id = unique_chat_id();
    let mut activity = new_activity(chat_id, "Relay");
    for name in ["Ana", "Ben", "Cleo"] {
        activity.add_participant(name);
    }
    activity.add_sub_activity("Leg 1").unwrap();
    for name in ["Cleo", "Ana", "Ben"] {
        activity.record_sub_score("Leg 1", name, 3).unwrap();
    }
    db.insert_activity(&activity).await.unwrap();

    let loaded = db
        .get_activity(chat_id, &activity.id)
        .await
        .unwrap()
        .unwrap();
    let order: Vec<&str> = loaded.sub_activities[0]
        .scores
        .keys()
        .map(String::as_str)
        .collect();
    assert_eq!(order, vec!["Cleo", "Ana", "Ben"]);
}

#[tokio::test]
async fn test_other_chat_sees_nothing() {
    require_emulator!();

    let db = test_db().await;
    let chat_id = unique_chat_id();
    let activity = new_activity(chat_id, "Private");
    db.insert_activity(&activity).await.unwrap();

    let other = chat_id - 1;
    assert!(db.get_activity(other, &activity.id).await.unwrap().is_none());
    assert!(db.list_activities(other).await.unwrap().is_empty());

    let result = db
        .update_activity(
            other,
            &activity.id,
            Box::new(|a: &mut Activity| {
                a.add_participant("Mallory");
                Ok(())
            }),
        )
        .await;
    assert!(matches!(result, Err(AppError::NotFound(_))));
}

// ═══════════════════════════════════════════════════════════════════════════
// UPDATE TESTS
// ═══════════════════════════════════════════════════════════════════════════

#[tokio::test]
async fn test_update_applies_mutation() {
    require_emulator!();

    let db = test_db().await;
    let chat_id = unique_chat_id();
    let activity = new_activity(chat_id, "Darts");
    db.insert_activity(&activity).await.unwrap();

    let (updated, changed) = db
        .update_activity(
            chat_id,
            &activity.id,
            Box::new(|a: &mut Activity| {
                a.add_participant("Ana");
                a.record_score("Ana", 180)
            }),
        )
        .await
        .unwrap();
    assert!(changed);
    assert_eq!(updated.scores.get("Ana"), Some(&180));

    let loaded = db
        .get_activity(chat_id, &activity.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(loaded, updated);
}

#[tokio::test]
async fn test_failed_mutation_writes_nothing() {
    require_emulator!();

    let db = test_db().await;
    let chat_id = unique_chat_id();
    let activity = new_activity(chat_id, "Timers");
    db.insert_activity(&activity).await.unwrap();

    let result = db
        .update_activity(
            chat_id,
            &activity.id,
            Box::new(|a: &mut Activity| {
                a.add_participant("Ana");
                a.stop_timer(Utc::now()).map(|_| ())
            }),
        )
        .await;
    assert!(matches!(result, Err(AppError::NotFound(_))));

    let loaded = db
        .get_activity(chat_id, &activity.id)
        .await
        .unwrap()
        .unwrap();
    assert!(loaded.participants.is_empty());
}

// ═══════════════════════════════════════════════════════════════════════════
// QUERY TESTS
// ═══════════════════════════════════════════════════════════════════════════

#[tokio::test]
async fn test_completed_activities_query() {
    require_emulator!();

    let db = test_db().await;
    let chat_id = unique_chat_id();

    let open = new_activity(chat_id, "Open");
    let mut done = new_activity(chat_id, "Done");
    done.complete(Utc::now()).unwrap();
    assert_eq!(done.status, ActivityStatus::Completed);

    db.insert_activity(&open).await.unwrap();
    db.insert_activity(&done).await.unwrap();

    let completed = db.list_completed_activities(chat_id).await.unwrap();
    assert_eq!(completed.len(), 1);
    assert_eq!(completed[0].id, done.id);

    assert_eq!(db.list_activities(chat_id).await.unwrap().len(), 2);
}
