// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Score charts rendered by QuickChart.
//!
//! QuickChart renders a Chart.js configuration passed in the URL, so a chart
//! is just a link that Telegram fetches when the photo is sent.

use crate::models::RankEntry;
use serde_json::json;

const CHART_WIDTH: u32 = 500;
const CHART_HEIGHT: u32 = 300;
const BAR_COLOR: &str = "rgba(54, 162, 235, 0.8)";

/// Builds chart image URLs.
#[derive(Debug, Clone)]
pub struct ChartService {
    base_url: String,
}

impl ChartService {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
        }
    }

    /// Bar chart of total scores, one bar per ranked participant.
    ///
    /// Returns `None` when there is nothing to plot.
    pub fn score_chart_url(&self, activity_name: &str, ranking: &[RankEntry]) -> Option<String> {
        if ranking.is_empty() {
            return None;
        }

        let config = chart_config(activity_name, ranking);
        Some(format!(
            "{}?w={}&h={}&c={}",
            self.base_url,
            CHART_WIDTH,
            CHART_HEIGHT,
            urlencoding::encode(&config.to_string())
        ))
    }
}

/// Declarative Chart.js configuration for a score bar chart.
pub fn chart_config(activity_name: &str, ranking: &[RankEntry]) -> serde_json::Value {
    let labels: Vec<&str> = ranking.iter().map(|e| e.name.as_str()).collect();
    let data: Vec<i64> = ranking.iter().map(|e| e.score).collect();

    json!({
        "type": "bar",
        "data": {
            "labels": labels,
            "datasets": [{
                "label": "Total scores",
                "data": data,
                "backgroundColor": BAR_COLOR
            }]
        },
        "options": {
            "title": {
                "display": true,
                "text": format!("Scores for \"{}\"", activity_name)
            },
            "scales": {
                "yAxes": [{ "ticks": { "beginAtZero": true } }]
            }
        }
    })
}
