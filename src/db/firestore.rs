// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Firestore client wrapper with typed activity operations.
//!
//! One document per activity in the `activities` collection, keyed by the
//! activity ID. Every document carries its `chat_id`; reads check it and
//! queries filter on it.
//!
//! Firestore map values do not keep key order, so score maps are stored as
//! lists of `{name, score}` entries in recording order.

use crate::db::{collections, sort_by_end_desc, sort_by_start, ActivityMutation, ActivityStore};
use crate::error::{AppError, Result};
use crate::models::{
    Activity, ActivityStatus, ChatId, Feedback, ScoreMap, SubActivity, Team, Timer,
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One score map entry as stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct ScoreEntry {
    name: String,
    score: i64,
}

fn to_entries(scores: &ScoreMap) -> Vec<ScoreEntry> {
    scores
        .iter()
        .map(|(name, score)| ScoreEntry {
            name: name.clone(),
            score: *score,
        })
        .collect()
}

fn from_entries(entries: Vec<ScoreEntry>) -> ScoreMap {
    entries.into_iter().map(|e| (e.name, e.score)).collect()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct SubActivityDoc {
    name: String,
    #[serde(default)]
    scores: Vec<ScoreEntry>,
}

/// Stored form of [`Activity`].
#[derive(Debug, Clone, Serialize, Deserialize)]
struct ActivityDoc {
    id: String,
    chat_id: ChatId,
    name: String,
    #[serde(default)]
    participants: Vec<String>,
    #[serde(default)]
    scores: Vec<ScoreEntry>,
    #[serde(default)]
    sub_activities: Vec<SubActivityDoc>,
    #[serde(default)]
    teams: Vec<Team>,
    #[serde(default)]
    feedback: Vec<Feedback>,
    #[serde(default)]
    status: ActivityStatus,
    start_date: DateTime<Utc>,
    #[serde(default)]
    end_date: Option<DateTime<Utc>>,
    #[serde(default)]
    timer: Option<Timer>,
}

impl From<&Activity> for ActivityDoc {
    fn from(a: &Activity) -> Self {
        Self {
            id: a.id.clone(),
            chat_id: a.chat_id,
            name: a.name.clone(),
            participants: a.participants.clone(),
            scores: to_entries(&a.scores),
            sub_activities: a
                .sub_activities
                .iter()
                .map(|sa| SubActivityDoc {
                    name: sa.name.clone(),
                    scores: to_entries(&sa.scores),
                })
                .collect(),
            teams: a.teams.clone(),
            feedback: a.feedback.clone(),
            status: a.status,
            start_date: a.start_date,
            end_date: a.end_date,
            timer: a.timer.clone(),
        }
    }
}

impl From<ActivityDoc> for Activity {
    fn from(doc: ActivityDoc) -> Self {
        Self {
            id: doc.id,
            chat_id: doc.chat_id,
            name: doc.name,
            participants: doc.participants,
            scores: from_entries(doc.scores),
            sub_activities: doc
                .sub_activities
                .into_iter()
                .map(|sa| SubActivity {
                    name: sa.name,
                    scores: from_entries(sa.scores),
                })
                .collect(),
            teams: doc.teams,
            feedback: doc.feedback,
            status: doc.status,
            start_date: doc.start_date,
            end_date: doc.end_date,
            timer: doc.timer,
        }
    }
}

/// Firestore database client.
#[derive(Clone)]
pub struct FirestoreDb {
    client: firestore::FirestoreDb,
}

impl FirestoreDb {
    /// Create a new Firestore client.
    ///
    /// For local development with emulator, set FIRESTORE_EMULATOR_HOST.
    pub async fn new(project_id: &str) -> Result<Self> {
        // If the emulator environment variable is set, use unauthenticated connection
        // to avoid local credential warnings and leakage.
        if std::env::var("FIRESTORE_EMULATOR_HOST").is_ok() {
            return Self::create_emulator_client(project_id).await;
        }

        let client = firestore::FirestoreDb::new(project_id)
            .await
            .map_err(|e| AppError::Database(format!("Failed to connect to Firestore: {}", e)))?;

        tracing::info!(project = project_id, "Connected to Firestore");

        Ok(Self { client })
    }

    /// Create a Firestore client for the emulator with unauthenticated access.
    async fn create_emulator_client(project_id: &str) -> Result<Self> {
        tracing::info!("Using unauthenticated connection for Firestore Emulator");

        let token_source = gcloud_sdk::ExternalJwtFunctionSource::new(|| async {
            Ok(gcloud_sdk::Token {
                token_type: "Bearer".to_string(),
                token: gcloud_sdk::SecretValue::new(
                    "eyJhbGciOiJub25lIn0.eyJ1aWQiOiJ0ZXN0In0."
                        .to_string()
                        .into(),
                ),
                expiry: chrono::Utc::now() + chrono::Duration::hours(1),
            })
        });

        let options = firestore::FirestoreDbOptions::new(project_id.to_string());

        let client = firestore::FirestoreDb::with_options_token_source(
            options,
            gcloud_sdk::GCP_DEFAULT_SCOPES.clone(),
            gcloud_sdk::TokenSourceType::ExternalSource(Box::new(token_source)),
        )
        .await
        .map_err(|e| {
            AppError::Database(format!("Failed to connect to Firestore Emulator: {}", e))
        })?;

        tracing::info!(
            project = project_id,
            "Connected to Firestore (Emulator/Unauthenticated)"
        );

        Ok(Self { client })
    }

    async fn fetch(&self, activity_id: &str) -> Result<Option<Activity>> {
        let doc: Option<ActivityDoc> = self
            .client
            .fluent()
            .select()
            .by_id_in(collections::ACTIVITIES)
            .obj()
            .one(activity_id)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(doc.map(Activity::from))
    }
}

#[async_trait]
impl ActivityStore for FirestoreDb {
    async fn insert_activity(&self, activity: &Activity) -> Result<()> {
        let doc = ActivityDoc::from(activity);
        let _: () = self
            .client
            .fluent()
            .update()
            .in_col(collections::ACTIVITIES)
            .document_id(&activity.id)
            .object(&doc)
            .execute()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        tracing::debug!(
            chat_id = activity.chat_id,
            activity_id = %activity.id,
            "Activity stored"
        );
        Ok(())
    }

    async fn get_activity(&self, chat_id: ChatId, activity_id: &str) -> Result<Option<Activity>> {
        let activity = self.fetch(activity_id).await?;
        Ok(activity.filter(|a| a.chat_id == chat_id))
    }

    async fn list_activities(&self, chat_id: ChatId) -> Result<Vec<Activity>> {
        let docs: Vec<ActivityDoc> = self
            .client
            .fluent()
            .select()
            .from(collections::ACTIVITIES)
            .filter(|q| q.for_all([q.field("chat_id").eq(chat_id)]))
            .obj()
            .query()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        let mut activities: Vec<Activity> = docs.into_iter().map(Activity::from).collect();
        sort_by_start(&mut activities);
        Ok(activities)
    }

    async fn list_completed_activities(&self, chat_id: ChatId) -> Result<Vec<Activity>> {
        let docs: Vec<ActivityDoc> = self
            .client
            .fluent()
            .select()
            .from(collections::ACTIVITIES)
            .filter(|q| {
                q.for_all([
                    q.field("chat_id").eq(chat_id),
                    q.field("status").eq(ActivityStatus::Completed.as_str()),
                ])
            })
            .obj()
            .query()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        // Timestamps are stored as RFC 3339 strings, so order in memory
        let mut activities: Vec<Activity> = docs.into_iter().map(Activity::from).collect();
        sort_by_end_desc(&mut activities);
        Ok(activities)
    }

    /// Read-modify-write inside a Firestore transaction.
    ///
    /// The read registers the document for conflict detection, so a
    /// concurrent writer makes the commit fail instead of silently losing
    /// one of the two updates.
    async fn update_activity(
        &self,
        chat_id: ChatId,
        activity_id: &str,
        mutation: ActivityMutation,
    ) -> Result<(Activity, bool)> {
        let client = &self.client;

        let mut transaction = client
            .begin_transaction()
            .await
            .map_err(|e| AppError::Database(format!("Failed to begin transaction: {}", e)))?;

        // 1. Read the current document within the transaction and check the tenant scope
        let tx_client = client.clone_with_consistency_selector(
            firestore::FirestoreConsistencySelector::Transaction(
                transaction.transaction_id().clone(),
            ),
        );
        let current: Option<ActivityDoc> = tx_client
            .fluent()
            .select()
            .by_id_in(collections::ACTIVITIES)
            .obj()
            .one(activity_id)
            .await
            .map_err(|e| {
                AppError::Database(format!("Failed to read activity in transaction: {}", e))
            })?;
        let Some(mut activity) = current
            .map(Activity::from)
            .filter(|a| a.chat_id == chat_id)
        else {
            let _ = transaction.rollback().await;
            return Err(AppError::activity_not_found());
        };

        // 2. Apply the change in memory; a rejected or empty change writes nothing
        let before = activity.clone();
        if let Err(e) = mutation(&mut activity) {
            let _ = transaction.rollback().await;
            return Err(e);
        }
        if activity == before {
            let _ = transaction.rollback().await;
            return Ok((activity, false));
        }

        // 3. Write back and commit
        client
            .fluent()
            .update()
            .in_col(collections::ACTIVITIES)
            .document_id(activity_id)
            .object(&ActivityDoc::from(&activity))
            .add_to_transaction(&mut transaction)
            .map_err(|e| {
                AppError::Database(format!("Failed to add activity to transaction: {}", e))
            })?;

        transaction
            .commit()
            .await
            .map_err(|e| AppError::Database(format!("Transaction commit failed: {}", e)))?;

        tracing::debug!(chat_id, activity_id, "Activity updated");
        Ok((activity, true))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scored_activity() -> Activity {
        let mut activity = Activity::new("a1".to_string(), 9, "Relay", Utc::now());
        for p in ["Ana", "Ben", "Cleo"] {
            activity.add_participant(p);
        }
        activity.add_sub_activity("Leg 1").unwrap();
        activity.record_sub_score("Leg 1", "Cleo", 4).unwrap();
        activity.record_sub_score("Leg 1", "Ana", 4).unwrap();
        activity.record_sub_score("Leg 1", "Ben", 2).unwrap();
        activity
    }

    fn names(scores: &ScoreMap) -> Vec<&str> {
        scores.keys().map(String::as_str).collect()
    }

    #[test]
    fn test_stored_scores_are_ordered_entries() {
        let doc = ActivityDoc::from(&scored_activity());
        let json = serde_json::to_value(&doc).unwrap();

        let stored = &json["sub_activities"][0]["scores"];
        assert_eq!(stored[0]["name"], "Cleo");
        assert_eq!(stored[1]["name"], "Ana");
        assert_eq!(stored[2]["name"], "Ben");
        assert_eq!(json["chat_id"], 9);
        assert_eq!(json["status"], "active");
    }

    #[test]
    fn test_document_conversion_keeps_recording_order() {
        let activity = scored_activity();
        let restored = Activity::from(ActivityDoc::from(&activity));

        assert_eq!(restored, activity);
        assert_eq!(
            names(&restored.sub_activities[0].scores),
            vec!["Cleo", "Ana", "Ben"]
        );
        assert_eq!(names(&restored.scores), vec!["Ana", "Ben", "Cleo"]);
    }
}
