// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Telegram Bot API client and update types.
//!
//! Handles:
//! - Inbound update payloads (only the fields the bot reads)
//! - Sending text, photos (by URL) and document uploads
//! - Registering the command list and the webhook at startup

use crate::bot::reply::{chunk_text, Reply};
use crate::error::AppError;
use crate::models::ChatId;
use serde::{Deserialize, Serialize};

/// Telegram's limit on a single text message, in UTF-16 code units.
pub const MAX_MESSAGE_LEN: usize = 4096;

// ─── Inbound Types ───────────────────────────────────────────

/// Incoming update (webhook body).
#[derive(Debug, Clone, Deserialize)]
pub struct Update {
    pub update_id: i64,
    #[serde(default)]
    pub message: Option<Message>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Message {
    pub message_id: i64,
    pub chat: Chat,
    #[serde(default)]
    pub from: Option<User>,
    #[serde(default)]
    pub text: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Chat {
    pub id: ChatId,
}

#[derive(Debug, Clone, Deserialize)]
pub struct User {
    pub id: i64,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub first_name: Option<String>,
}

impl User {
    /// Name recorded as feedback author.
    pub fn display_name(&self) -> String {
        self.username
            .clone()
            .or_else(|| self.first_name.clone())
            .unwrap_or_else(|| format!("user {}", self.id))
    }
}

/// Entry of the command menu shown by Telegram clients.
#[derive(Debug, Clone, Serialize)]
pub struct BotCommand {
    pub command: String,
    pub description: String,
}

/// Envelope of every Bot API response.
#[derive(Debug, Deserialize)]
struct ApiResponse {
    ok: bool,
    #[serde(default)]
    description: Option<String>,
}

// ─── Client ──────────────────────────────────────────────────

/// Telegram Bot API client.
#[derive(Clone)]
pub struct TelegramClient {
    http: reqwest::Client,
    /// `{api_url}/bot{token}`; never logged
    base_url: String,
}

impl TelegramClient {
    pub fn new(api_url: &str, token: &str) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: format!("{}/bot{}", api_url.trim_end_matches('/'), token),
        }
    }

    /// Send a text message, split into several if it exceeds Telegram's limit.
    pub async fn send_message(&self, chat_id: ChatId, text: &str) -> Result<(), AppError> {
        for chunk in chunk_text(text, MAX_MESSAGE_LEN) {
            let body = serde_json::json!({
                "chat_id": chat_id,
                "text": chunk,
            });
            self.post_json("sendMessage", &body).await?;
        }
        Ok(())
    }

    /// Send a photo that Telegram downloads from `photo_url`.
    pub async fn send_photo(
        &self,
        chat_id: ChatId,
        photo_url: &str,
        caption: Option<&str>,
    ) -> Result<(), AppError> {
        let mut body = serde_json::json!({
            "chat_id": chat_id,
            "photo": photo_url,
        });
        if let Some(caption) = caption {
            body["caption"] = caption.into();
        }
        self.post_json("sendPhoto", &body).await
    }

    /// Upload a file as a document attachment.
    pub async fn send_document(
        &self,
        chat_id: ChatId,
        filename: &str,
        content: Vec<u8>,
        caption: Option<&str>,
    ) -> Result<(), AppError> {
        let part = reqwest::multipart::Part::bytes(content)
            .file_name(filename.to_string())
            .mime_str("application/json")
            .map_err(|e| AppError::Telegram(e.without_url().to_string()))?;

        let mut form = reqwest::multipart::Form::new()
            .text("chat_id", chat_id.to_string())
            .part("document", part);
        if let Some(caption) = caption {
            form = form.text("caption", caption.to_string());
        }

        let response = self
            .http
            .post(self.method_url("sendDocument"))
            .multipart(form)
            .send()
            .await
            .map_err(|e| AppError::Telegram(e.without_url().to_string()))?;

        self.check_response("sendDocument", response).await
    }

    /// Deliver one handler reply.
    pub async fn send_reply(&self, chat_id: ChatId, reply: Reply) -> Result<(), AppError> {
        match reply {
            Reply::Text(text) => self.send_message(chat_id, &text).await,
            Reply::Photo { url, caption } => {
                self.send_photo(chat_id, &url, caption.as_deref()).await
            }
            Reply::Document {
                filename,
                content,
                caption,
            } => {
                self.send_document(chat_id, &filename, content, caption.as_deref())
                    .await
            }
        }
    }

    /// Publish the command menu.
    pub async fn set_my_commands(&self, commands: &[BotCommand]) -> Result<(), AppError> {
        let body = serde_json::json!({ "commands": commands });
        self.post_json("setMyCommands", &body).await
    }

    /// Point Telegram at our webhook; updates will carry `secret_token`.
    pub async fn set_webhook(&self, url: &str, secret_token: &str) -> Result<(), AppError> {
        let body = serde_json::json!({
            "url": url,
            "secret_token": secret_token,
            "allowed_updates": ["message"],
        });
        self.post_json("setWebhook", &body).await
    }

    fn method_url(&self, method: &str) -> String {
        format!("{}/{}", self.base_url, method)
    }

    /// POST a JSON body to a Bot API method.
    async fn post_json<B: Serialize + ?Sized>(
        &self,
        method: &str,
        body: &B,
    ) -> Result<(), AppError> {
        let response = self
            .http
            .post(self.method_url(method))
            .json(body)
            .send()
            .await
            // The URL contains the bot token
            .map_err(|e| AppError::Telegram(e.without_url().to_string()))?;

        self.check_response(method, response).await
    }

    /// Check HTTP status and the `ok` flag of the response envelope.
    async fn check_response(
        &self,
        method: &str,
        response: reqwest::Response,
    ) -> Result<(), AppError> {
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        let envelope: Option<ApiResponse> = serde_json::from_str(&body).ok();

        if status.is_success() && envelope.as_ref().is_some_and(|e| e.ok) {
            return Ok(());
        }

        if status.as_u16() == 429 {
            tracing::warn!(method, "Telegram rate limit hit (429)");
        }

        let description = envelope
            .and_then(|e| e.description)
            .unwrap_or_else(|| body.chars().take(200).collect());

        Err(AppError::Telegram(format!(
            "{} failed: HTTP {}: {}",
            method, status, description
        )))
    }
}
