// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Scory Bot: score tracking for group activities over Telegram
//!
//! This crate provides the webhook service behind the bot: command parsing,
//! activity storage scoped by chat, rankings, statistics and exports.

pub mod bot;
pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod time_utils;

use config::Config;
use db::ActivityStore;
use services::{ActivityService, ChartService, TelegramClient};
use std::sync::Arc;

/// Shared application state.
pub struct AppState {
    pub config: Config,
    pub activities: ActivityService,
    pub charts: ChartService,
    pub telegram: TelegramClient,
}

impl AppState {
    pub fn new(config: Config, store: Arc<dyn ActivityStore>) -> Self {
        let telegram = TelegramClient::new(&config.telegram_api_url, &config.telegram_bot_token);
        let charts = ChartService::new(config.quickchart_url.clone());

        Self {
            activities: ActivityService::new(store),
            charts,
            telegram,
            config,
        }
    }
}
