// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Application error types with consistent chat replies.

/// Application error type.
///
/// Every command handler returns this; the bot turns it into a chat reply
/// with [`AppError::user_message`].
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Invalid command: {0}")]
    Validation(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Telegram API error: {0}")]
    Telegram(String),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    /// Generic reply used whenever the cause must not reach the user.
    pub const GENERIC_FAILURE: &'static str = "An error occurred. Please try again later.";

    /// Convenience constructor for the most common failure.
    pub fn activity_not_found() -> Self {
        AppError::NotFound("Activity not found.".to_string())
    }

    /// Text sent back to the chat for this error.
    ///
    /// Validation, not-found and conflict errors are shown verbatim and logged
    /// at info. Everything else is logged with detail and replaced by
    /// [`AppError::GENERIC_FAILURE`].
    pub fn user_message(&self) -> String {
        match self {
            AppError::Validation(msg) | AppError::NotFound(msg) | AppError::Conflict(msg) => {
                tracing::info!(reason = %msg, "Command rejected");
                msg.clone()
            }
            AppError::Database(msg) => {
                tracing::error!(error = %msg, "Database error");
                Self::GENERIC_FAILURE.to_string()
            }
            AppError::Telegram(msg) => {
                tracing::error!(error = %msg, "Telegram API error");
                Self::GENERIC_FAILURE.to_string()
            }
            AppError::Internal(err) => {
                tracing::error!(error = %err, "Internal error");
                Self::GENERIC_FAILURE.to_string()
            }
        }
    }
}

/// Result type alias for handlers and services
pub type Result<T> = std::result::Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_errors_are_shown_verbatim() {
        let err = AppError::NotFound("Team not found.".to_string());
        assert_eq!(err.user_message(), "Team not found.");

        let err = AppError::Conflict("Team \"Red\" already exists.".to_string());
        assert_eq!(err.user_message(), "Team \"Red\" already exists.");
    }

    #[test]
    fn test_system_errors_are_hidden() {
        let err = AppError::Database("deadline exceeded on projects/x".to_string());
        assert_eq!(err.user_message(), AppError::GENERIC_FAILURE);

        let err = AppError::Telegram("status 502".to_string());
        assert_eq!(err.user_message(), AppError::GENERIC_FAILURE);

        let err = AppError::from(anyhow::anyhow!("boom"));
        assert_eq!(err.user_message(), AppError::GENERIC_FAILURE);
    }
}
