// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Data models for the application.

pub mod activity;
pub mod ranking;
pub mod stats;

pub use activity::{
    Activity, ActivityStatus, ChatId, Feedback, ScoreMap, SubActivity, Team, Timer, TimerStatus,
};
pub use ranking::RankEntry;
pub use stats::ActivityStats;
