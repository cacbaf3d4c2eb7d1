// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Telegram webhook authentication middleware.

use crate::AppState;
use axum::{
    extract::{Request, State},
    http::StatusCode,
    middleware::Next,
    response::Response,
};
use std::sync::Arc;
use subtle::ConstantTimeEq;

/// Header Telegram sets to the `secret_token` given to `setWebhook`.
pub const SECRET_TOKEN_HEADER: &str = "x-telegram-bot-api-secret-token";

/// Require the webhook secret token header on `/webhook/*` routes.
pub async fn require_webhook_secret(
    State(state): State<Arc<AppState>>,
    request: Request,
    next: Next,
) -> Result<Response, StatusCode> {
    let provided = request
        .headers()
        .get(SECRET_TOKEN_HEADER)
        .and_then(|h| h.to_str().ok());

    let is_valid = provided
        .map(|token| secrets_match(token, &state.config.webhook_secret_token))
        .unwrap_or(false);

    if !is_valid {
        tracing::warn!(
            header_present = provided.is_some(),
            "Blocked webhook request with invalid secret token"
        );
        return Err(StatusCode::FORBIDDEN);
    }

    Ok(next.run(request).await)
}

/// Constant-time string comparison.
pub fn secrets_match(provided: &str, expected: &str) -> bool {
    provided.as_bytes().ct_eq(expected.as_bytes()).into()
}
