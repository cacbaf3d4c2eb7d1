//! Database layer.
//!
//! Every [`ActivityStore`] operation takes the chat ID as a mandatory tenant
//! scope. A document whose `chat_id` differs from the caller's is reported
//! exactly like a missing one.

pub mod firestore;
pub mod memory;

pub use firestore::FirestoreDb;
pub use memory::MemoryStore;

use crate::error::Result;
use crate::models::{Activity, ChatId};
use async_trait::async_trait;

/// Collection names as constants.
pub mod collections {
    pub const ACTIVITIES: &str = "activities";
}

/// In-place change applied to a loaded activity.
///
/// Returning an error aborts the update; nothing is written.
pub type ActivityMutation = Box<dyn FnOnce(&mut Activity) -> Result<()> + Send>;

/// Persistence for activity documents.
#[async_trait]
pub trait ActivityStore: Send + Sync {
    /// Store a new activity.
    async fn insert_activity(&self, activity: &Activity) -> Result<()>;

    /// Get an activity by ID within a chat.
    async fn get_activity(&self, chat_id: ChatId, activity_id: &str) -> Result<Option<Activity>>;

    /// All activities of a chat, oldest first.
    async fn list_activities(&self, chat_id: ChatId) -> Result<Vec<Activity>>;

    /// Completed activities of a chat, most recently completed first.
    async fn list_completed_activities(&self, chat_id: ChatId) -> Result<Vec<Activity>>;

    /// Load, mutate and persist one activity as a single unit.
    ///
    /// Fails with `NotFound` if the activity does not exist in this chat.
    /// Returns the resulting activity and whether the mutation changed it;
    /// an unchanged document is not written.
    async fn update_activity(
        &self,
        chat_id: ChatId,
        activity_id: &str,
        mutation: ActivityMutation,
    ) -> Result<(Activity, bool)>;
}

/// Sort helper shared by the implementations.
pub(crate) fn sort_by_start(activities: &mut [Activity]) {
    activities.sort_by(|a, b| a.start_date.cmp(&b.start_date));
}

/// Sort helper shared by the implementations.
pub(crate) fn sort_by_end_desc(activities: &mut [Activity]) {
    activities.sort_by(|a, b| b.end_date.cmp(&a.end_date));
}
