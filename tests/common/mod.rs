// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

use scory_bot::config::Config;
use scory_bot::db::{FirestoreDb, MemoryStore};
use scory_bot::routes::create_router;
use scory_bot::services::ActivityService;
use scory_bot::AppState;
use std::sync::Arc;

/// Check if emulator is available via environment variable.
#[allow(dead_code)]
pub fn emulator_available() -> bool {
    std::env::var("FIRESTORE_EMULATOR_HOST").is_ok()
}

/// Skip test with message if emulator not available.
#[macro_export]
macro_rules! require_emulator {
    () => {
        if !crate::common::emulator_available() {
            eprintln!("⚠️  Skipping: FIRESTORE_EMULATOR_HOST not set");
            return;
        }
    };
}

/// Create a test database connection.
#[allow(dead_code)]
pub async fn test_db() -> FirestoreDb {
    FirestoreDb::new("test-project")
        .await
        .expect("Failed to connect to Firestore emulator")
}

/// Activity service over a fresh in-memory store.
#[allow(dead_code)]
pub fn memory_service() -> ActivityService {
    ActivityService::new(Arc::new(MemoryStore::new()))
}

/// Create a test app backed by an in-memory store.
///
/// `telegram_api_url` points the bot at a mock server; without one, replies
/// go to an unreachable address and are only logged as failures.
/// Returns the router and the shared state.
#[allow(dead_code)]
pub fn create_test_app(telegram_api_url: Option<&str>) -> (axum::Router, Arc<AppState>) {
    let mut config = Config::test_default();
    if let Some(url) = telegram_api_url {
        config.telegram_api_url = url.to_string();
    }

    let state = Arc::new(AppState::new(config, Arc::new(MemoryStore::new())));
    (create_router(state.clone()), state)
}

/// Minimal Telegram update carrying a text message.
#[allow(dead_code)]
pub fn text_update(chat_id: i64, text: &str) -> serde_json::Value {
    serde_json::json!({
        "update_id": 1,
        "message": {
            "message_id": 1,
            "date": 1700000000,
            "chat": { "id": chat_id, "type": "group" },
            "from": { "id": 42, "is_bot": false, "first_name": "Ana", "username": "ana_l" },
            "text": text
        }
    })
}
