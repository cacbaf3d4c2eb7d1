// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Activity document model for storage and export.
//!
//! One document per tracked activity. All mutations are plain methods on
//! [`Activity`] so the store only has to load, apply and persist.

use crate::error::{AppError, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use indexmap::IndexMap;

/// Telegram chat identifier; the tenant scope of every activity.
pub type ChatId = i64;

/// Participant name to score, in the order names were first recorded.
pub type ScoreMap = IndexMap<String, i64>;

/// Lifecycle state. Transitions only from `Active` to `Completed`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActivityStatus {
    #[default]
    Active,
    Completed,
}

impl ActivityStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ActivityStatus::Active => "active",
            ActivityStatus::Completed => "completed",
        }
    }
}

/// Stored activity document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Activity {
    /// Activity ID (also used as document ID)
    pub id: String,
    /// Owning chat; every read and write is filtered by it
    pub chat_id: ChatId,
    /// Activity name
    pub name: String,
    /// Participant names in the order they were added
    #[serde(default)]
    pub participants: Vec<String>,
    /// Top-level scores (not attributed to any sub-activity)
    #[serde(default)]
    pub scores: ScoreMap,
    #[serde(default)]
    pub sub_activities: Vec<SubActivity>,
    #[serde(default)]
    pub teams: Vec<Team>,
    #[serde(default)]
    pub feedback: Vec<Feedback>,
    #[serde(default)]
    pub status: ActivityStatus,
    pub start_date: DateTime<Utc>,
    /// Set when the activity is completed
    #[serde(default)]
    pub end_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub timer: Option<Timer>,
}

/// Named scoring category nested under an activity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubActivity {
    pub name: String,
    #[serde(default)]
    pub scores: ScoreMap,
}

/// Named group of participants.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Team {
    pub name: String,
    #[serde(default)]
    pub members: Vec<String>,
}

/// Append-only feedback entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Feedback {
    pub author: String,
    pub message: String,
    pub timestamp: DateTime<Utc>,
}

/// Countdown attached to an activity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Timer {
    pub start_time: DateTime<Utc>,
    pub duration_ms: i64,
    #[serde(default)]
    pub end_time: Option<DateTime<Utc>>,
    #[serde(default)]
    pub elapsed_ms: Option<i64>,
}

/// Point-in-time view of a timer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimerStatus {
    pub is_running: bool,
    pub start_time: DateTime<Utc>,
    pub elapsed_ms: i64,
    pub remaining_ms: i64,
}

impl Timer {
    pub fn is_running(&self) -> bool {
        self.end_time.is_none()
    }

    /// Elapsed and remaining time as of `now` (frozen once stopped).
    pub fn status(&self, now: DateTime<Utc>) -> TimerStatus {
        let elapsed_ms = self
            .elapsed_ms
            .unwrap_or_else(|| (now - self.start_time).num_milliseconds())
            .max(0);

        TimerStatus {
            is_running: self.is_running(),
            start_time: self.start_time,
            elapsed_ms,
            remaining_ms: (self.duration_ms - elapsed_ms).max(0),
        }
    }
}

impl Activity {
    /// New, empty, active activity.
    pub fn new(id: String, chat_id: ChatId, name: &str, now: DateTime<Utc>) -> Self {
        Self {
            id,
            chat_id,
            name: name.trim().to_string(),
            participants: Vec::new(),
            scores: ScoreMap::new(),
            sub_activities: Vec::new(),
            teams: Vec::new(),
            feedback: Vec::new(),
            status: ActivityStatus::Active,
            start_date: now,
            end_date: None,
            timer: None,
        }
    }

    pub fn is_participant(&self, name: &str) -> bool {
        self.participants.iter().any(|p| p == name)
    }

    pub fn sub_activity(&self, name: &str) -> Option<&SubActivity> {
        self.sub_activities.iter().find(|sa| sa.name == name)
    }

    pub fn team(&self, name: &str) -> Option<&Team> {
        self.teams.iter().find(|t| t.name == name)
    }

    /// First team (in declaration order) listing `participant` as a member.
    pub fn team_of(&self, participant: &str) -> Option<&Team> {
        self.teams
            .iter()
            .find(|t| t.members.iter().any(|m| m == participant))
    }

    /// Add a participant with a top-level score of 0.
    ///
    /// Returns `false` (and changes nothing) if the name is already present.
    pub fn add_participant(&mut self, name: &str) -> bool {
        if self.is_participant(name) {
            return false;
        }
        self.participants.push(name.to_string());
        self.scores.insert(name.to_string(), 0);
        true
    }

    pub fn add_sub_activity(&mut self, name: &str) -> Result<()> {
        if self.sub_activity(name).is_some() {
            return Err(AppError::Conflict(format!(
                "Sub-activity \"{}\" already exists.",
                name
            )));
        }
        self.sub_activities.push(SubActivity {
            name: name.to_string(),
            scores: ScoreMap::new(),
        });
        Ok(())
    }

    /// Set the top-level score of a participant.
    pub fn record_score(&mut self, participant: &str, score: i64) -> Result<()> {
        self.require_participant(participant)?;
        self.scores.insert(participant.to_string(), score);
        Ok(())
    }

    /// Set a participant's score within one sub-activity.
    pub fn record_sub_score(
        &mut self,
        sub_activity: &str,
        participant: &str,
        score: i64,
    ) -> Result<()> {
        let is_participant = self.is_participant(participant);
        let sub = self
            .sub_activities
            .iter_mut()
            .find(|sa| sa.name == sub_activity)
            .ok_or_else(|| AppError::NotFound("Sub-activity not found.".to_string()))?;

        if !is_participant {
            return Err(participant_not_found(participant));
        }

        sub.scores.insert(participant.to_string(), score);
        Ok(())
    }

    pub fn create_team(&mut self, name: &str) -> Result<()> {
        if self.team(name).is_some() {
            return Err(AppError::Conflict(format!("Team \"{}\" already exists.", name)));
        }
        self.teams.push(Team {
            name: name.to_string(),
            members: Vec::new(),
        });
        Ok(())
    }

    /// Add a participant to a team.
    ///
    /// Idempotent for the same team. A participant belongs to at most one
    /// team; joining a second one is a conflict. Returns `true` if added.
    pub fn add_to_team(&mut self, team: &str, participant: &str) -> Result<bool> {
        if self.team(team).is_none() {
            return Err(AppError::NotFound("Team not found.".to_string()));
        }

        if let Some(current) = self.team_of(participant) {
            if current.name == team {
                return Ok(false);
            }
            return Err(AppError::Conflict(format!(
                "{} is already in team \"{}\".",
                participant, current.name
            )));
        }

        if let Some(t) = self.teams.iter_mut().find(|t| t.name == team) {
            t.members.push(participant.to_string());
        }
        Ok(true)
    }

    pub fn add_feedback(&mut self, author: &str, message: &str, now: DateTime<Utc>) {
        self.feedback.push(Feedback {
            author: author.to_string(),
            message: message.trim().to_string(),
            timestamp: now,
        });
    }

    /// Mark the activity completed. Completing twice is rejected so the
    /// original end date is kept.
    pub fn complete(&mut self, now: DateTime<Utc>) -> Result<()> {
        if self.status == ActivityStatus::Completed {
            return Err(AppError::Conflict(format!(
                "Activity \"{}\" is already completed.",
                self.name
            )));
        }
        self.status = ActivityStatus::Completed;
        self.end_date = Some(now);
        Ok(())
    }

    /// Start a countdown. Rejected while another timer is still running.
    pub fn start_timer(&mut self, duration_ms: i64, now: DateTime<Utc>) -> Result<()> {
        if self.timer.as_ref().is_some_and(Timer::is_running) {
            return Err(AppError::Conflict(
                "A timer is already running for this activity.".to_string(),
            ));
        }
        self.timer = Some(Timer {
            start_time: now,
            duration_ms,
            end_time: None,
            elapsed_ms: None,
        });
        Ok(())
    }

    /// Stop the running timer and record the elapsed time.
    pub fn stop_timer(&mut self, now: DateTime<Utc>) -> Result<Timer> {
        let timer = self
            .timer
            .as_mut()
            .filter(|t| t.is_running())
            .ok_or_else(|| AppError::NotFound("No timer running for this activity.".to_string()))?;

        timer.end_time = Some(now);
        timer.elapsed_ms = Some((now - timer.start_time).num_milliseconds().max(0));
        Ok(timer.clone())
    }

    fn require_participant(&self, participant: &str) -> Result<()> {
        if self.is_participant(participant) {
            Ok(())
        } else {
            Err(participant_not_found(participant))
        }
    }
}

fn participant_not_found(participant: &str) -> AppError {
    AppError::NotFound(format!(
        "Participant \"{}\" not found. Add them first with /addparticipant.",
        participant
    ))
}
