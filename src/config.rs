//! Application configuration loaded from environment variables.
//!
//! Secrets (bot token, webhook secrets) are read once at startup and kept in
//! memory for the lifetime of the process.

use std::env;

/// Default Telegram Bot API endpoint.
pub const DEFAULT_TELEGRAM_API_URL: &str = "https://api.telegram.org";

/// Default QuickChart rendering endpoint.
pub const DEFAULT_QUICKCHART_URL: &str = "https://quickchart.io/chart";

/// Which [`crate::db::ActivityStore`] implementation backs the bot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreBackend {
    /// Google Cloud Firestore (or the emulator when `FIRESTORE_EMULATOR_HOST` is set).
    Firestore,
    /// Process-local store; data is lost on restart.
    Memory,
}

impl StoreBackend {
    fn parse(raw: &str) -> Result<Self, ConfigError> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "firestore" => Ok(StoreBackend::Firestore),
            "memory" => Ok(StoreBackend::Memory),
            _ => Err(ConfigError::Invalid("STORE_BACKEND", raw.to_string())),
        }
    }
}

/// Application configuration, loaded once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    // --- Environment Variables (non-sensitive) ---
    /// Public base URL of this service; when set, the webhook is registered at startup
    pub public_url: Option<String>,
    /// GCP project ID
    pub gcp_project_id: String,
    /// Server port
    pub port: u16,
    /// Persistence backend
    pub store_backend: StoreBackend,
    /// Telegram Bot API base URL (overridable for tests)
    pub telegram_api_url: String,
    /// QuickChart endpoint used for `/stats` charts
    pub quickchart_url: String,

    // --- Secrets ---
    /// Telegram bot token
    pub telegram_bot_token: String,
    /// Value Telegram echoes in `X-Telegram-Bot-Api-Secret-Token`
    pub webhook_secret_token: String,
    /// Unguessable path segment of the webhook URL
    pub webhook_path_secret: String,
}

impl Config {
    /// Config for tests only.
    pub fn test_default() -> Self {
        Self {
            public_url: None,
            gcp_project_id: "test-project".to_string(),
            port: 8080,
            store_backend: StoreBackend::Memory,
            telegram_api_url: "http://127.0.0.1:9".to_string(),
            quickchart_url: DEFAULT_QUICKCHART_URL.to_string(),
            telegram_bot_token: "test-token".to_string(),
            webhook_secret_token: "test_secret_token".to_string(),
            webhook_path_secret: "test-path-secret".to_string(),
        }
    }

    /// Load configuration from environment variables.
    ///
    /// A `.env` file in the working directory is honoured for local development.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok(); // Load .env file if present

        let store_backend = match env::var("STORE_BACKEND") {
            Ok(raw) => StoreBackend::parse(&raw)?,
            Err(_) => StoreBackend::Firestore,
        };

        Ok(Self {
            public_url: env::var("PUBLIC_URL")
                .ok()
                .map(|v| v.trim().trim_end_matches('/').to_string())
                .filter(|v| !v.is_empty()),
            gcp_project_id: env::var("GCP_PROJECT_ID").unwrap_or_else(|_| "local-dev".to_string()),
            port: env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse()
                .unwrap_or(8080),
            store_backend,
            telegram_api_url: env::var("TELEGRAM_API_URL")
                .map(|v| v.trim().trim_end_matches('/').to_string())
                .unwrap_or_else(|_| DEFAULT_TELEGRAM_API_URL.to_string()),
            quickchart_url: env::var("QUICKCHART_URL")
                .map(|v| v.trim().to_string())
                .unwrap_or_else(|_| DEFAULT_QUICKCHART_URL.to_string()),

            telegram_bot_token: required_secret("TELEGRAM_BOT_TOKEN")?,
            webhook_secret_token: required_secret("WEBHOOK_SECRET_TOKEN")?,
            webhook_path_secret: required_secret("WEBHOOK_PATH_SECRET")?,
        })
    }

    /// Full webhook URL to register with Telegram, if a public URL is known.
    pub fn webhook_url(&self) -> Option<String> {
        self.public_url
            .as_ref()
            .map(|base| format!("{}/webhook/{}", base, self.webhook_path_secret))
    }
}

fn required_secret(name: &'static str) -> Result<String, ConfigError> {
    env::var(name)
        .map(|v| v.trim().to_string())
        .ok()
        .filter(|v| !v.is_empty())
        .ok_or(ConfigError::Missing(name))
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    Missing(&'static str),

    #[error("Invalid value for {0}: {1}")]
    Invalid(&'static str, String),
}
