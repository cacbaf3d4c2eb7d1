// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Services module - business logic layer.

pub mod activity;
pub mod chart;
pub mod export;
pub mod telegram;

pub use activity::ActivityService;
pub use chart::ChartService;
pub use telegram::TelegramClient;
