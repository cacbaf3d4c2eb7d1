// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Webhook route for Telegram updates.

use crate::bot::handle_text;
use crate::middleware::webhook_auth::{require_webhook_secret, secrets_match};
use crate::services::telegram::{Update, User};
use crate::AppState;
use axum::{
    body::Bytes,
    extract::{Path, State},
    http::StatusCode,
    middleware,
    routing::post,
    Router,
};
use std::sync::Arc;

/// Webhook routes, guarded by the secret token header.
pub fn routes(state: Arc<AppState>) -> Router<Arc<AppState>> {
    Router::new()
        .route("/webhook/{path_secret}", post(handle_update))
        .route_layer(middleware::from_fn_with_state(state, require_webhook_secret))
}

/// Handle one Telegram update (POST).
///
/// Anything that is not a usable text message is acknowledged with 200 so
/// Telegram does not redeliver it.
async fn handle_update(
    State(state): State<Arc<AppState>>,
    Path(path_secret): Path<String>,
    body: Bytes,
) -> StatusCode {
    if !secrets_match(&path_secret, &state.config.webhook_path_secret) {
        tracing::warn!("Security Alert: Webhook path secret mismatch");
        return StatusCode::NOT_FOUND;
    }

    let update: Update = match serde_json::from_slice(&body) {
        Ok(u) => u,
        Err(e) => {
            tracing::warn!(error = %e, "Failed to parse Telegram update");
            return StatusCode::OK;
        }
    };

    let Some(message) = update.message else {
        tracing::debug!(update_id = update.update_id, "Ignoring update without message");
        return StatusCode::OK;
    };
    let Some(text) = message.text.as_deref() else {
        return StatusCode::OK;
    };

    let chat_id = message.chat.id;
    let author = message
        .from
        .as_ref()
        .map(User::display_name)
        .unwrap_or_else(|| "anonymous".to_string());

    let replies = handle_text(&state, chat_id, &author, text).await;

    for reply in replies {
        if let Err(e) = state.telegram.send_reply(chat_id, reply).await {
            tracing::error!(
                chat_id,
                update_id = update.update_id,
                error = %e,
                "Failed to send reply"
            );
        }
    }

    StatusCode::OK
}
