// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Activity service behavior over the in-memory store.

use scory_bot::error::AppError;
use scory_bot::models::{ActivityStatus, RankEntry};
use scory_bot::services::export::{export_activity, import_activity};

mod common;
use common::memory_service;

const CHAT: i64 = 1001;

fn entry(rank: usize, name: &str, score: i64) -> RankEntry {
    RankEntry {
        rank,
        name: name.to_string(),
        score,
    }
}

#[tokio::test]
async fn test_quiz_night_ranking() {
    let service = memory_service();
    let id = service.create_activity(CHAT, "Quiz Night").await.unwrap().id;

    service.add_participant(CHAT, &id, "Ana").await.unwrap();
    service.add_participant(CHAT, &id, "Ben").await.unwrap();
    service.record_score(CHAT, &id, "Ana", 10).await.unwrap();
    service.add_sub_activity(CHAT, &id, "Bonus").await.unwrap();
    service
        .record_sub_score(CHAT, &id, "Bonus", "Ben", 7)
        .await
        .unwrap();

    let (_, ranking) = service.overall_ranking(CHAT, &id).await.unwrap();
    assert_eq!(ranking, vec![entry(1, "Ana", 10), entry(2, "Ben", 7)]);
}

#[tokio::test]
async fn test_tied_sub_scores_rank_in_recording_order() {
    let service = memory_service();
    let id = service.create_activity(CHAT, "Quiz Night").await.unwrap().id;
    service.add_participant(CHAT, &id, "Ana").await.unwrap();
    service.add_participant(CHAT, &id, "Ben").await.unwrap();
    service.add_sub_activity(CHAT, &id, "Bonus").await.unwrap();
    service
        .record_sub_score(CHAT, &id, "Bonus", "Ben", 5)
        .await
        .unwrap();
    service
        .record_sub_score(CHAT, &id, "Bonus", "Ana", 5)
        .await
        .unwrap();

    let (_, ranking) = service
        .sub_activity_ranking(CHAT, &id, "Bonus")
        .await
        .unwrap();
    assert_eq!(ranking, vec![entry(1, "Ben", 5), entry(2, "Ana", 5)]);
}

#[tokio::test]
async fn test_total_includes_every_sub_activity() {
    let service = memory_service();
    let id = service.create_activity(CHAT, "Triathlon").await.unwrap().id;

    service.add_participant(CHAT, &id, "Ana").await.unwrap();
    service.record_score(CHAT, &id, "Ana", 2).await.unwrap();
    for (sub, score) in [("A", 3), ("B", 5)] {
        service.add_sub_activity(CHAT, &id, sub).await.unwrap();
        service
            .record_sub_score(CHAT, &id, sub, "Ana", score)
            .await
            .unwrap();
    }

    let (_, ranking) = service.overall_ranking(CHAT, &id).await.unwrap();
    assert_eq!(ranking, vec![entry(1, "Ana", 10)]);
}

#[tokio::test]
async fn test_duplicate_participant_keeps_score() {
    let service = memory_service();
    let id = service.create_activity(CHAT, "Darts").await.unwrap().id;

    let (_, added) = service.add_participant(CHAT, &id, "Ana").await.unwrap();
    assert!(added);
    service.record_score(CHAT, &id, "Ana", 50).await.unwrap();

    let (activity, added) = service.add_participant(CHAT, &id, "Ana").await.unwrap();
    assert!(!added);
    assert_eq!(activity.participants, vec!["Ana".to_string()]);
    assert_eq!(activity.scores.get("Ana"), Some(&50));
}

#[tokio::test]
async fn test_duplicate_team_member_is_single_entry() {
    let service = memory_service();
    let id = service.create_activity(CHAT, "Relay").await.unwrap().id;
    service.add_participant(CHAT, &id, "Ana").await.unwrap();
    service.create_team(CHAT, &id, "Red").await.unwrap();

    let (_, first) = service.add_to_team(CHAT, &id, "Red", "Ana").await.unwrap();
    let (activity, second) = service.add_to_team(CHAT, &id, "Red", "Ana").await.unwrap();

    assert!(first);
    assert!(!second);
    assert_eq!(activity.team("Red").unwrap().members, vec!["Ana".to_string()]);
}

#[tokio::test]
async fn test_team_ranking_ignores_top_level_scores() {
    let service = memory_service();
    let id = service.create_activity(CHAT, "Relay").await.unwrap().id;
    service.add_participant(CHAT, &id, "Solo").await.unwrap();
    service.record_score(CHAT, &id, "Solo", 100).await.unwrap();
    service.create_team(CHAT, &id, "Lonely").await.unwrap();
    service.add_to_team(CHAT, &id, "Lonely", "Solo").await.unwrap();

    let (_, ranking) = service.team_ranking(CHAT, &id).await.unwrap();
    assert!(ranking.is_empty());
}

#[tokio::test]
async fn test_missing_entities_are_not_found() {
    let service = memory_service();
    let id = service.create_activity(CHAT, "Quiz").await.unwrap().id;

    assert!(matches!(
        service.record_score(CHAT, &id, "Ghost", 1).await,
        Err(AppError::NotFound(_))
    ));
    assert!(matches!(
        service.record_sub_score(CHAT, &id, "Nope", "Ghost", 1).await,
        Err(AppError::NotFound(msg)) if msg == "Sub-activity not found."
    ));
    assert!(matches!(
        service.add_to_team(CHAT, &id, "Nope", "Ana").await,
        Err(AppError::NotFound(msg)) if msg == "Team not found."
    ));
    assert!(matches!(
        service.overall_ranking(CHAT, "does-not-exist").await,
        Err(AppError::NotFound(msg)) if msg == "Activity not found."
    ));
}

#[tokio::test]
async fn test_stop_timer_never_started_changes_nothing() {
    let service = memory_service();
    let id = service.create_activity(CHAT, "Quiz").await.unwrap().id;
    let before = service.get_activity(CHAT, &id).await.unwrap();

    let result = service.stop_timer(CHAT, &id).await;
    assert!(matches!(
        result,
        Err(AppError::NotFound(msg)) if msg == "No timer running for this activity."
    ));

    let after = service.get_activity(CHAT, &id).await.unwrap();
    assert_eq!(before, after);
}

#[tokio::test]
async fn test_timer_lifecycle() {
    let service = memory_service();
    let id = service.create_activity(CHAT, "Quiz").await.unwrap().id;

    assert!(matches!(
        service.start_timer(CHAT, &id, 0).await,
        Err(AppError::Validation(_))
    ));

    service.start_timer(CHAT, &id, 5).await.unwrap();
    assert!(matches!(
        service.start_timer(CHAT, &id, 5).await,
        Err(AppError::Conflict(_))
    ));

    let (_, status) = service.timer_status(CHAT, &id).await.unwrap();
    let status = status.unwrap();
    assert!(status.is_running);
    assert!(status.remaining_ms <= 5 * 60 * 1000);

    let (_, timer) = service.stop_timer(CHAT, &id).await.unwrap();
    assert!(timer.end_time.is_some());
    assert!(timer.elapsed_ms.unwrap() >= 0);

    // A stopped timer may be replaced
    service.start_timer(CHAT, &id, 1).await.unwrap();
}

#[tokio::test]
async fn test_completion_and_history() {
    let service = memory_service();
    let first = service.create_activity(CHAT, "First").await.unwrap().id;
    let second = service.create_activity(CHAT, "Second").await.unwrap().id;
    service.create_activity(CHAT, "Open").await.unwrap();

    service.complete_activity(CHAT, &first).await.unwrap();
    let completed = service.complete_activity(CHAT, &second).await.unwrap();
    assert_eq!(completed.status, ActivityStatus::Completed);
    assert!(completed.end_date.is_some());

    assert!(matches!(
        service.complete_activity(CHAT, &second).await,
        Err(AppError::Conflict(_))
    ));

    let history = service.completed_activities(CHAT).await.unwrap();
    let names: Vec<&str> = history.iter().map(|a| a.name.as_str()).collect();
    assert_eq!(names, vec!["Second", "First"]);

    assert_eq!(service.list_activities(CHAT).await.unwrap().len(), 3);
}

#[tokio::test]
async fn test_chats_are_isolated() {
    let service = memory_service();
    let id = service.create_activity(CHAT, "Ours").await.unwrap().id;

    assert!(service.list_activities(CHAT + 1).await.unwrap().is_empty());
    assert!(matches!(
        service.add_participant(CHAT + 1, &id, "Mallory").await,
        Err(AppError::NotFound(_))
    ));

    let activity = service.get_activity(CHAT, &id).await.unwrap();
    assert!(activity.participants.is_empty());
}

#[tokio::test]
async fn test_statistics_summary() {
    let service = memory_service();
    let id = service.create_activity(CHAT, "Sports Day").await.unwrap().id;
    for name in ["Ana", "Ben", "Cleo"] {
        service.add_participant(CHAT, &id, name).await.unwrap();
    }
    service.add_sub_activity(CHAT, &id, "Sprint").await.unwrap();
    service.add_sub_activity(CHAT, &id, "Jump").await.unwrap();
    service
        .record_sub_score(CHAT, &id, "Sprint", "Ben", 6)
        .await
        .unwrap();
    service
        .record_sub_score(CHAT, &id, "Jump", "Ben", 3)
        .await
        .unwrap();
    service
        .record_sub_score(CHAT, &id, "Jump", "Ana", 3)
        .await
        .unwrap();

    let (_, stats) = service.statistics(CHAT, &id).await.unwrap();
    assert_eq!(stats.total_participants, 3);
    assert_eq!(stats.average_score, Some(4.0));
    assert_eq!(stats.highest_score, Some(9));
    assert_eq!(stats.lowest_score, Some(3));
    assert_eq!(stats.most_active_participant.as_deref(), Some("Ben"));
}

#[tokio::test]
async fn test_export_round_trip() {
    let service = memory_service();
    let id = service.create_activity(CHAT, "Quiz Night").await.unwrap().id;
    service.add_participant(CHAT, &id, "Ana").await.unwrap();
    service.add_participant(CHAT, &id, "Ben Lee").await.unwrap();
    service.add_sub_activity(CHAT, &id, "Bonus").await.unwrap();
    service
        .record_sub_score(CHAT, &id, "Bonus", "Ben Lee", -2)
        .await
        .unwrap();
    service.create_team(CHAT, &id, "Red").await.unwrap();
    service.add_to_team(CHAT, &id, "Red", "Ana").await.unwrap();
    service
        .add_feedback(CHAT, &id, "ana_l", "Great fun")
        .await
        .unwrap();
    service.start_timer(CHAT, &id, 10).await.unwrap();

    let activity = service.get_activity(CHAT, &id).await.unwrap();
    let imported = import_activity(&export_activity(&activity).unwrap()).unwrap();

    assert_eq!(imported, activity);
}
