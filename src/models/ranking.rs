// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Score aggregation and rankings.
//!
//! Score maps keep the order in which each name was first recorded. Totals
//! remember the order in which names were first accumulated, and rankings are
//! a stable sort of that sequence, so equal scores come out in recording
//! order.

use crate::models::activity::{Activity, SubActivity};
use indexmap::IndexMap;
use serde::Serialize;
use std::collections::HashSet;

/// One row of a ranking.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RankEntry {
    /// 1-based position
    pub rank: usize,
    pub name: String,
    pub score: i64,
}

/// Running totals keyed by name, in first-accumulation order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Totals {
    values: IndexMap<String, i64>,
}

impl Totals {
    /// Add `amount` to `name`, inserting it at the end if new.
    pub fn add(&mut self, name: &str, amount: i64) {
        match self.values.get_mut(name) {
            Some(total) => *total = total.saturating_add(amount),
            None => {
                self.values.insert(name.to_string(), amount);
            }
        }
    }

    pub fn get(&self, name: &str) -> Option<i64> {
        self.values.get(name).copied()
    }

    /// Entries in accumulation order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, i64)> + '_ {
        self.values.iter().map(|(name, total)| (name.as_str(), *total))
    }

    fn retain(&mut self, keep: impl Fn(&str) -> bool) {
        self.values.retain(|name, _| keep(name));
    }

    /// Stable descending sort with 1-based ranks.
    pub fn into_ranking(self) -> Vec<RankEntry> {
        let mut entries: Vec<(String, i64)> = self.values.into_iter().collect();

        // `sort_by` is stable: ties keep accumulation order
        entries.sort_by(|a, b| b.1.cmp(&a.1));

        entries
            .into_iter()
            .enumerate()
            .map(|(index, (name, score))| RankEntry {
                rank: index + 1,
                name,
                score,
            })
            .collect()
    }
}

/// Own score plus every sub-activity score, per participant.
///
/// Participants whose every recorded entry is zero (e.g. only the placeholder
/// written when they were added) are left out.
pub fn participant_totals(activity: &Activity) -> Totals {
    let mut totals = Totals::default();
    let mut scored: HashSet<&str> = HashSet::new();

    let sources = std::iter::once(&activity.scores)
        .chain(activity.sub_activities.iter().map(|sa| &sa.scores));

    for scores in sources {
        for (name, &score) in scores {
            totals.add(name, score);
            if score != 0 {
                scored.insert(name.as_str());
            }
        }
    }

    totals.retain(|name| scored.contains(name));
    totals
}

/// Number of sub-activities in which each participant has a recorded score.
pub fn participation_counts(activity: &Activity) -> Totals {
    let mut counts = Totals::default();
    for sub in &activity.sub_activities {
        for name in sub.scores.keys() {
            counts.add(name, 1);
        }
    }
    counts
}

/// Sub-activity scores rolled up to teams.
///
/// Top-level scores never count towards a team. Each entry goes to the first
/// team (declaration order) listing the participant; entries of participants
/// without a team are dropped, and teams that received nothing are absent.
pub fn team_totals(activity: &Activity) -> Totals {
    let mut totals = Totals::default();
    for sub in &activity.sub_activities {
        for (name, &score) in &sub.scores {
            if let Some(team) = activity.team_of(name) {
                totals.add(&team.name, score);
            }
        }
    }
    totals
}

/// Overall ranking (own score plus all sub-activities).
pub fn overall_ranking(activity: &Activity) -> Vec<RankEntry> {
    participant_totals(activity).into_ranking()
}

/// Ranking restricted to one sub-activity's own scores.
pub fn sub_activity_ranking(sub: &SubActivity) -> Vec<RankEntry> {
    let mut totals = Totals::default();
    for (name, &score) in &sub.scores {
        totals.add(name, score);
    }
    totals.into_ranking()
}

/// Ranking of teams by their members' sub-activity scores.
pub fn team_ranking(activity: &Activity) -> Vec<RankEntry> {
    team_totals(activity).into_ranking()
}
