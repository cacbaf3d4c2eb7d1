//! JSON export of activity documents.
//!
//! The export is the full document. Score maps are already plain JSON
//! objects in this representation, so importing an export yields an equal
//! [`Activity`].

use crate::error::{AppError, Result};
use crate::models::Activity;

/// File name used for the `/export` attachment.
pub fn export_filename(activity: &Activity) -> String {
    format!("activity_{}_export.json", activity.id)
}

/// Serialize an activity as pretty-printed JSON.
pub fn export_activity(activity: &Activity) -> Result<Vec<u8>> {
    serde_json::to_vec_pretty(activity)
        .map_err(|e| AppError::Internal(anyhow::anyhow!("Failed to serialize export: {}", e)))
}

/// Parse a previously exported activity.
pub fn import_activity(bytes: &[u8]) -> Result<Activity> {
    serde_json::from_slice(bytes)
        .map_err(|e| AppError::Validation(format!("Invalid activity export: {}", e)))
}
