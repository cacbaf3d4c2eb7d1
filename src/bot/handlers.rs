// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Command dispatch: parsed command -> service call -> replies.

use crate::bot::command::{self, Command};
use crate::bot::reply::{self, Reply};
use crate::error::Result;
use crate::models::ChatId;
use crate::services::export;
use crate::AppState;

/// Handle one inbound text message.
///
/// Returns no replies for text that is not a command. Errors are turned
/// into a single reply here, so a failing command never escapes this call.
pub async fn handle_text(
    state: &AppState,
    chat_id: ChatId,
    author: &str,
    text: &str,
) -> Vec<Reply> {
    let Some(parsed) = command::parse(text) else {
        return Vec::new();
    };

    let result = match parsed {
        Ok(cmd) => {
            let name = cmd.kind().name();
            tracing::info!(chat_id, command = name, "Handling command");
            execute(state, chat_id, author, cmd).await
        }
        Err(e) => Err(e),
    };

    match result {
        Ok(replies) => replies,
        Err(e) => vec![Reply::Text(e.user_message())],
    }
}

/// Run a parsed command for `chat_id`.
pub async fn execute(
    state: &AppState,
    chat_id: ChatId,
    author: &str,
    cmd: Command,
) -> Result<Vec<Reply>> {
    let activities = &state.activities;

    let text = match cmd {
        Command::Start => reply::welcome_text(),
        Command::Help => reply::help_text(),

        Command::CreateActivity { name } => {
            let activity = activities.create_activity(chat_id, &name).await?;
            format!(
                "Activity \"{}\" created! Its ID is {}",
                activity.name, activity.id
            )
        }

        Command::AddParticipant { activity_id, name } => {
            let (activity, added) = activities
                .add_participant(chat_id, &activity_id, &name)
                .await?;
            let name = name.trim();
            if added {
                format!("{} was added to \"{}\".", name, activity.name)
            } else {
                format!("{} is already taking part in \"{}\".", name, activity.name)
            }
        }

        Command::AddSubActivity { activity_id, name } => {
            let activity = activities
                .add_sub_activity(chat_id, &activity_id, &name)
                .await?;
            format!(
                "Sub-activity \"{}\" added to \"{}\".",
                name.trim(),
                activity.name
            )
        }

        Command::Score {
            activity_id,
            participant,
            score,
        } => {
            activities
                .record_score(chat_id, &activity_id, &participant, score)
                .await?;
            format!("Score of {} recorded for {}.", score, participant.trim())
        }

        Command::SubScore {
            activity_id,
            sub_activity,
            participant,
            score,
        } => {
            activities
                .record_sub_score(chat_id, &activity_id, &sub_activity, &participant, score)
                .await?;
            format!(
                "Score of {} recorded for {} in {}.",
                score,
                participant.trim(),
                sub_activity.trim()
            )
        }

        Command::Ranking { activity_id } => {
            let (activity, ranking) = activities.overall_ranking(chat_id, &activity_id).await?;
            reply::format_ranking(&format!("Ranking for \"{}\":", activity.name), &ranking)
        }

        Command::SubRanking {
            activity_id,
            sub_activity,
        } => {
            let (_, ranking) = activities
                .sub_activity_ranking(chat_id, &activity_id, &sub_activity)
                .await?;
            reply::format_ranking(
                &format!("Ranking for sub-activity \"{}\":", sub_activity.trim()),
                &ranking,
            )
        }

        Command::Activities => {
            let list = activities.list_activities(chat_id).await?;
            reply::format_activity_list(
                "Activities:",
                &list,
                "No activities have been created yet.",
            )
        }

        Command::History => {
            let list = activities.completed_activities(chat_id).await?;
            reply::format_activity_list(
                "Completed activities:",
                &list,
                "No activities have been completed yet.",
            )
        }

        Command::Complete { activity_id } => {
            let activity = activities.complete_activity(chat_id, &activity_id).await?;
            format!("Activity \"{}\" is now completed.", activity.name)
        }

        Command::CreateTeam { activity_id, team } => {
            activities.create_team(chat_id, &activity_id, &team).await?;
            format!("Team \"{}\" created!", team.trim())
        }

        Command::AddToTeam {
            activity_id,
            team,
            participant,
        } => {
            let (_, added) = activities
                .add_to_team(chat_id, &activity_id, &team, &participant)
                .await?;
            if added {
                format!(
                    "{} was added to team \"{}\".",
                    participant.trim(),
                    team.trim()
                )
            } else {
                format!(
                    "{} is already in team \"{}\".",
                    participant.trim(),
                    team.trim()
                )
            }
        }

        Command::TeamRanking { activity_id } => {
            let (_, ranking) = activities.team_ranking(chat_id, &activity_id).await?;
            reply::format_ranking("Team ranking:", &ranking)
        }

        Command::Stats { activity_id } => {
            let (activity, stats) = activities.statistics(chat_id, &activity_id).await?;
            let mut replies = vec![Reply::Text(reply::format_stats(&activity, &stats))];

            let ranking = stats.totals.clone().into_ranking();
            if let Some(url) = state.charts.score_chart_url(&activity.name, &ranking) {
                replies.push(Reply::Photo { url, caption: None });
            }
            return Ok(replies);
        }

        Command::Export { activity_id } => {
            let activity = activities.get_activity(chat_id, &activity_id).await?;
            let content = export::export_activity(&activity)?;
            return Ok(vec![Reply::Document {
                filename: export::export_filename(&activity),
                content,
                caption: Some(format!("Export of \"{}\"", activity.name)),
            }]);
        }

        Command::Feedback {
            activity_id,
            message,
        } => {
            activities
                .add_feedback(chat_id, &activity_id, author, &message)
                .await?;
            "Thanks for your feedback!".to_string()
        }

        Command::Feedbacks { activity_id } => {
            let (activity, feedback) = activities.feedback(chat_id, &activity_id).await?;
            reply::format_feedback(&activity, &feedback)
        }

        Command::StartTimer {
            activity_id,
            minutes,
        } => {
            activities
                .start_timer(chat_id, &activity_id, minutes)
                .await?;
            format!("Timer started for {} minutes.", minutes)
        }

        Command::StopTimer { activity_id } => {
            let (_, timer) = activities.stop_timer(chat_id, &activity_id).await?;
            format!(
                "Timer stopped after {}.",
                crate::time_utils::format_duration_ms(timer.elapsed_ms.unwrap_or_default())
            )
        }

        Command::TimerStatus { activity_id } => {
            let (activity, status) = activities.timer_status(chat_id, &activity_id).await?;
            reply::format_timer_status(&activity, status.as_ref())
        }
    };

    Ok(vec![Reply::Text(text)])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::db::MemoryStore;
    use std::sync::Arc;

    fn state() -> AppState {
        AppState::new(Config::test_default(), Arc::new(MemoryStore::new()))
    }

    fn text(replies: &[Reply]) -> &str {
        match replies.first() {
            Some(Reply::Text(t)) => t,
            other => panic!("expected text reply, got {:?}", other),
        }
    }

    async fn create(state: &AppState, chat_id: ChatId, name: &str) -> String {
        state
            .activities
            .create_activity(chat_id, name)
            .await
            .unwrap()
            .id
    }

    #[tokio::test]
    async fn test_non_command_gets_no_reply() {
        let state = state();
        assert!(handle_text(&state, 1, "ana", "good game everyone").await.is_empty());
    }

    #[tokio::test]
    async fn test_create_activity_reply_contains_id() {
        let state = state();
        let replies = handle_text(&state, 1, "ana", "/createactivity \"Quiz Night\"").await;
        let reply = text(&replies);

        assert!(reply.starts_with("Activity \"Quiz Night\" created! Its ID is "));
        let id = reply.rsplit(' ').next().unwrap();
        assert!(state.activities.get_activity(1, id).await.is_ok());
    }

    #[tokio::test]
    async fn test_unknown_activity_is_not_found() {
        let state = state();
        let replies = handle_text(&state, 1, "ana", "/ranking deadbeef").await;
        assert_eq!(text(&replies), "Activity not found.");
    }

    #[tokio::test]
    async fn test_wrong_arity_is_reported() {
        let state = state();
        let replies = handle_text(&state, 1, "ana", "/score only-one").await;
        assert!(text(&replies).starts_with("Wrong number of parameters. Expected: 3"));
    }

    #[tokio::test]
    async fn test_stats_sends_text_and_chart() {
        let state = state();
        let id = create(&state, 1, "Quiz").await;
        handle_text(&state, 1, "ana", &format!("/addparticipant {} Ana", id)).await;
        handle_text(&state, 1, "ana", &format!("/score {} Ana 4", id)).await;

        let replies = handle_text(&state, 1, "ana", &format!("/stats {}", id)).await;
        assert_eq!(replies.len(), 2);
        assert!(text(&replies).contains("Highest score: 4"));
        match &replies[1] {
            Reply::Photo { url, .. } => assert!(url.starts_with(&state.config.quickchart_url)),
            other => panic!("expected photo, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_stats_without_scores_has_no_chart() {
        let state = state();
        let id = create(&state, 1, "Quiz").await;
        let replies = handle_text(&state, 1, "ana", &format!("/stats {}", id)).await;
        assert_eq!(replies.len(), 1);
    }

    #[tokio::test]
    async fn test_export_sends_document() {
        let state = state();
        let id = create(&state, 1, "Quiz").await;

        let replies = handle_text(&state, 1, "ana", &format!("/export {}", id)).await;
        match &replies[0] {
            Reply::Document {
                filename, content, ..
            } => {
                assert_eq!(filename, &format!("activity_{}_export.json", id));
                let imported = export::import_activity(content).unwrap();
                assert_eq!(imported.id, id);
            }
            other => panic!("expected document, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_feedback_records_author() {
        let state = state();
        let id = create(&state, 1, "Quiz").await;

        let feedback = format!("/feedback {} Loved it", id);
        let replies = handle_text(&state, 1, "ana_l", &feedback).await;
        assert_eq!(text(&replies), "Thanks for your feedback!");

        let replies = handle_text(&state, 1, "ben", &format!("/feedbacks {}", id)).await;
        assert!(text(&replies).contains("ana_l: Loved it"));
    }

    #[tokio::test]
    async fn test_stop_timer_never_started() {
        let state = state();
        let id = create(&state, 1, "Quiz").await;

        let replies = handle_text(&state, 1, "ana", &format!("/stoptimer {}", id)).await;
        assert_eq!(text(&replies), "No timer running for this activity.");
    }
}
