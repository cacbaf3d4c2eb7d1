// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Activity service - every chat operation on activity documents.
//!
//! Each method is one store call: reads go through `get_activity`, writes go
//! through `update_activity` with a closure that applies the change to the
//! loaded document. All calls carry the chat ID as tenant scope.

use crate::db::ActivityStore;
use crate::error::{AppError, Result};
use crate::models::ranking;
use crate::models::{Activity, ActivityStats, ChatId, Feedback, RankEntry, Timer, TimerStatus};
use chrono::Utc;
use std::sync::Arc;

/// Longest accepted activity, participant, team or sub-activity name.
pub const MAX_NAME_LEN: usize = 100;
/// Longest accepted feedback message.
pub const MAX_FEEDBACK_LEN: usize = 1000;
/// Longest accepted timer, in minutes (one week).
pub const MAX_TIMER_MINUTES: i64 = 7 * 24 * 60;

const MAX_ACTIVITY_ID_LEN: usize = 64;

/// Activity operations scoped by chat.
#[derive(Clone)]
pub struct ActivityService {
    store: Arc<dyn ActivityStore>,
}

impl ActivityService {
    pub fn new(store: Arc<dyn ActivityStore>) -> Self {
        Self { store }
    }

    // ─── Lifecycle ───────────────────────────────────────────────

    /// Create a new, empty activity owned by `chat_id`.
    pub async fn create_activity(&self, chat_id: ChatId, name: &str) -> Result<Activity> {
        let name = validate_name("Activity name", name)?;
        let id = uuid::Uuid::new_v4().simple().to_string();
        let activity = Activity::new(id, chat_id, &name, Utc::now());

        self.store.insert_activity(&activity).await?;
        tracing::info!(
            chat_id,
            activity_id = %activity.id,
            name = %activity.name,
            "Activity created"
        );
        Ok(activity)
    }

    /// Load an activity, failing with "activity not found".
    pub async fn get_activity(&self, chat_id: ChatId, activity_id: &str) -> Result<Activity> {
        if !is_valid_activity_id(activity_id) {
            return Err(AppError::activity_not_found());
        }
        self.store
            .get_activity(chat_id, activity_id)
            .await?
            .ok_or_else(AppError::activity_not_found)
    }

    pub async fn list_activities(&self, chat_id: ChatId) -> Result<Vec<Activity>> {
        self.store.list_activities(chat_id).await
    }

    pub async fn completed_activities(&self, chat_id: ChatId) -> Result<Vec<Activity>> {
        self.store.list_completed_activities(chat_id).await
    }

    pub async fn complete_activity(&self, chat_id: ChatId, activity_id: &str) -> Result<Activity> {
        let now = Utc::now();
        let activity = self
            .update(chat_id, activity_id, move |a| a.complete(now))
            .await?;
        tracing::info!(chat_id, activity_id, "Activity completed");
        Ok(activity)
    }

    // ─── Participants & Scores ───────────────────────────────────

    /// Add a participant. Returns `false` if they were already present.
    pub async fn add_participant(
        &self,
        chat_id: ChatId,
        activity_id: &str,
        name: &str,
    ) -> Result<(Activity, bool)> {
        let name = validate_name("Participant name", name)?;
        self.update_tracked(chat_id, activity_id, move |a| {
            a.add_participant(&name);
            Ok(())
        })
        .await
    }

    pub async fn add_sub_activity(
        &self,
        chat_id: ChatId,
        activity_id: &str,
        name: &str,
    ) -> Result<Activity> {
        let name = validate_name("Sub-activity name", name)?;
        self.update(chat_id, activity_id, move |a| a.add_sub_activity(&name))
            .await
    }

    /// Set a participant's top-level score.
    pub async fn record_score(
        &self,
        chat_id: ChatId,
        activity_id: &str,
        participant: &str,
        score: i64,
    ) -> Result<Activity> {
        let participant = participant.trim().to_string();
        let activity = self
            .update(chat_id, activity_id, move |a| a.record_score(&participant, score))
            .await?;
        tracing::debug!(chat_id, activity_id, score, "Score recorded");
        Ok(activity)
    }

    /// Set a participant's score within a sub-activity.
    pub async fn record_sub_score(
        &self,
        chat_id: ChatId,
        activity_id: &str,
        sub_activity: &str,
        participant: &str,
        score: i64,
    ) -> Result<Activity> {
        let sub_activity = sub_activity.trim().to_string();
        let participant = participant.trim().to_string();
        let activity = self
            .update(chat_id, activity_id, move |a| {
                a.record_sub_score(&sub_activity, &participant, score)
            })
            .await?;
        tracing::debug!(chat_id, activity_id, score, "Sub-activity score recorded");
        Ok(activity)
    }

    // ─── Teams ───────────────────────────────────────────────────

    pub async fn create_team(
        &self,
        chat_id: ChatId,
        activity_id: &str,
        team: &str,
    ) -> Result<Activity> {
        let team = validate_name("Team name", team)?;
        self.update(chat_id, activity_id, move |a| a.create_team(&team))
            .await
    }

    /// Add a participant to a team. Returns `false` if already a member.
    pub async fn add_to_team(
        &self,
        chat_id: ChatId,
        activity_id: &str,
        team: &str,
        participant: &str,
    ) -> Result<(Activity, bool)> {
        let team = team.trim().to_string();
        let participant = validate_name("Participant name", participant)?;
        self.update_tracked(chat_id, activity_id, move |a| {
            a.add_to_team(&team, &participant).map(|_| ())
        })
        .await
    }

    // ─── Feedback ────────────────────────────────────────────────

    pub async fn add_feedback(
        &self,
        chat_id: ChatId,
        activity_id: &str,
        author: &str,
        message: &str,
    ) -> Result<Activity> {
        let message = message.trim().to_string();
        if message.is_empty() {
            return Err(AppError::Validation("Feedback must not be empty.".to_string()));
        }
        if message.chars().count() > MAX_FEEDBACK_LEN {
            return Err(AppError::Validation(format!(
                "Feedback is too long (max {} characters).",
                MAX_FEEDBACK_LEN
            )));
        }

        let author = author.to_string();
        let now = Utc::now();
        self.update(chat_id, activity_id, move |a| {
            a.add_feedback(&author, &message, now);
            Ok(())
        })
        .await
    }

    pub async fn feedback(
        &self,
        chat_id: ChatId,
        activity_id: &str,
    ) -> Result<(Activity, Vec<Feedback>)> {
        let activity = self.get_activity(chat_id, activity_id).await?;
        let feedback = activity.feedback.clone();
        Ok((activity, feedback))
    }

    // ─── Timer ───────────────────────────────────────────────────

    pub async fn start_timer(
        &self,
        chat_id: ChatId,
        activity_id: &str,
        minutes: i64,
    ) -> Result<Activity> {
        if !(1..=MAX_TIMER_MINUTES).contains(&minutes) {
            return Err(AppError::Validation(format!(
                "Duration must be between 1 and {} minutes.",
                MAX_TIMER_MINUTES
            )));
        }
        let duration_ms = minutes * 60 * 1000;
        let now = Utc::now();

        let activity = self
            .update(chat_id, activity_id, move |a| a.start_timer(duration_ms, now))
            .await?;
        tracing::info!(chat_id, activity_id, minutes, "Timer started");
        Ok(activity)
    }

    pub async fn stop_timer(
        &self,
        chat_id: ChatId,
        activity_id: &str,
    ) -> Result<(Activity, Timer)> {
        let now = Utc::now();
        let activity = self
            .update(chat_id, activity_id, move |a| a.stop_timer(now).map(|_| ()))
            .await?;

        let timer = activity
            .timer
            .clone()
            .ok_or_else(|| AppError::Internal(anyhow::anyhow!("Timer missing after stop")))?;
        tracing::info!(chat_id, activity_id, elapsed_ms = ?timer.elapsed_ms, "Timer stopped");
        Ok((activity, timer))
    }

    pub async fn timer_status(
        &self,
        chat_id: ChatId,
        activity_id: &str,
    ) -> Result<(Activity, Option<TimerStatus>)> {
        let activity = self.get_activity(chat_id, activity_id).await?;
        let status = activity.timer.as_ref().map(|t| t.status(Utc::now()));
        Ok((activity, status))
    }

    // ─── Rankings & Stats ────────────────────────────────────────

    pub async fn overall_ranking(
        &self,
        chat_id: ChatId,
        activity_id: &str,
    ) -> Result<(Activity, Vec<RankEntry>)> {
        let activity = self.get_activity(chat_id, activity_id).await?;
        let ranking = ranking::overall_ranking(&activity);
        Ok((activity, ranking))
    }

    pub async fn sub_activity_ranking(
        &self,
        chat_id: ChatId,
        activity_id: &str,
        sub_activity: &str,
    ) -> Result<(Activity, Vec<RankEntry>)> {
        let activity = self.get_activity(chat_id, activity_id).await?;
        let sub = activity
            .sub_activity(sub_activity.trim())
            .ok_or_else(|| AppError::NotFound("Sub-activity not found.".to_string()))?;
        let ranking = ranking::sub_activity_ranking(sub);
        Ok((activity, ranking))
    }

    pub async fn team_ranking(
        &self,
        chat_id: ChatId,
        activity_id: &str,
    ) -> Result<(Activity, Vec<RankEntry>)> {
        let activity = self.get_activity(chat_id, activity_id).await?;
        let ranking = ranking::team_ranking(&activity);
        Ok((activity, ranking))
    }

    pub async fn statistics(
        &self,
        chat_id: ChatId,
        activity_id: &str,
    ) -> Result<(Activity, ActivityStats)> {
        let activity = self.get_activity(chat_id, activity_id).await?;
        let stats = ActivityStats::from_activity(&activity);
        Ok((activity, stats))
    }

    // ─── Helpers ─────────────────────────────────────────────────

    async fn update<F>(&self, chat_id: ChatId, activity_id: &str, mutation: F) -> Result<Activity>
    where
        F: FnOnce(&mut Activity) -> Result<()> + Send + 'static,
    {
        let (activity, _) = self.update_tracked(chat_id, activity_id, mutation).await?;
        Ok(activity)
    }

    /// Like `update`, also reporting whether the document changed.
    async fn update_tracked<F>(
        &self,
        chat_id: ChatId,
        activity_id: &str,
        mutation: F,
    ) -> Result<(Activity, bool)>
    where
        F: FnOnce(&mut Activity) -> Result<()> + Send + 'static,
    {
        if !is_valid_activity_id(activity_id) {
            return Err(AppError::activity_not_found());
        }
        self.store
            .update_activity(chat_id, activity_id, Box::new(mutation))
            .await
    }
}

/// Trim and bound-check a user-supplied name.
pub fn validate_name(field: &str, raw: &str) -> Result<String> {
    let name = raw.trim();
    if name.is_empty() {
        return Err(AppError::Validation(format!("{} must not be empty.", field)));
    }
    if name.chars().count() > MAX_NAME_LEN {
        return Err(AppError::Validation(format!(
            "{} is too long (max {} characters).",
            field, MAX_NAME_LEN
        )));
    }
    Ok(name.to_string())
}

/// Activity IDs are generated as UUIDs; anything else cannot exist and must
/// never reach the store as a document path.
fn is_valid_activity_id(activity_id: &str) -> bool {
    !activity_id.is_empty()
        && activity_id.len() <= MAX_ACTIVITY_ID_LEN
        && activity_id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_name_trims() {
        assert_eq!(validate_name("Name", "  Ana  ").unwrap(), "Ana");
    }

    #[test]
    fn test_validate_name_rejects_empty_and_long() {
        assert!(matches!(
            validate_name("Name", "   "),
            Err(AppError::Validation(_))
        ));
        let long = "a".repeat(MAX_NAME_LEN + 1);
        assert!(matches!(
            validate_name("Name", &long),
            Err(AppError::Validation(_))
        ));
        assert!(validate_name("Name", &"a".repeat(MAX_NAME_LEN)).is_ok());
    }

    #[test]
    fn test_activity_id_shape() {
        assert!(is_valid_activity_id("3f2a9c0d4b1e4e0f9a7b6c5d4e3f2a1b"));
        assert!(!is_valid_activity_id(""));
        assert!(!is_valid_activity_id("activities/other"));
        assert!(!is_valid_activity_id(&"a".repeat(65)));
    }
}
