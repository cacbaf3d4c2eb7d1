//! Process-local activity store.
//!
//! Used for local runs (`STORE_BACKEND=memory`) and tests. Updates hold the
//! map shard lock for the duration of the mutation, so they are atomic.

use crate::db::{sort_by_end_desc, sort_by_start, ActivityMutation, ActivityStore};
use crate::error::{AppError, Result};
use crate::models::{Activity, ActivityStatus, ChatId};
use async_trait::async_trait;
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use std::sync::Arc;

/// In-memory store keyed by activity ID.
#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    activities: Arc<DashMap<String, Activity>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored activities across all chats.
    #[cfg(test)]
    fn len(&self) -> usize {
        self.activities.len()
    }

    fn collect(&self, keep: impl Fn(&Activity) -> bool) -> Vec<Activity> {
        self.activities
            .iter()
            .filter(|entry| keep(entry.value()))
            .map(|entry| entry.value().clone())
            .collect()
    }
}

#[async_trait]
impl ActivityStore for MemoryStore {
    async fn insert_activity(&self, activity: &Activity) -> Result<()> {
        match self.activities.entry(activity.id.clone()) {
            Entry::Occupied(_) => Err(AppError::Database(format!(
                "Activity {} already exists",
                activity.id
            ))),
            Entry::Vacant(slot) => {
                slot.insert(activity.clone());
                Ok(())
            }
        }
    }

    async fn get_activity(&self, chat_id: ChatId, activity_id: &str) -> Result<Option<Activity>> {
        Ok(self
            .activities
            .get(activity_id)
            .filter(|entry| entry.chat_id == chat_id)
            .map(|entry| entry.value().clone()))
    }

    async fn list_activities(&self, chat_id: ChatId) -> Result<Vec<Activity>> {
        let mut activities = self.collect(|a| a.chat_id == chat_id);
        sort_by_start(&mut activities);
        Ok(activities)
    }

    async fn list_completed_activities(&self, chat_id: ChatId) -> Result<Vec<Activity>> {
        let mut activities =
            self.collect(|a| a.chat_id == chat_id && a.status == ActivityStatus::Completed);
        sort_by_end_desc(&mut activities);
        Ok(activities)
    }

    async fn update_activity(
        &self,
        chat_id: ChatId,
        activity_id: &str,
        mutation: ActivityMutation,
    ) -> Result<(Activity, bool)> {
        let mut entry = self
            .activities
            .get_mut(activity_id)
            .filter(|entry| entry.chat_id == chat_id)
            .ok_or_else(AppError::activity_not_found)?;

        // Mutate a copy so a failed mutation leaves the stored document untouched
        let mut updated = entry.value().clone();
        mutation(&mut updated)?;

        let changed = updated != *entry.value();
        if changed {
            *entry.value_mut() = updated.clone();
        }
        Ok((updated, changed))
    }
}
