// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Command vocabulary and argument parsing.
//!
//! Arguments are whitespace separated; a double-quoted argument may contain
//! spaces. Commands whose last parameter is free text accept it unquoted,
//! and any extra tokens are joined back into that parameter.

use crate::error::{AppError, Result};
use once_cell::sync::Lazy;
use regex::Regex;

/// A quoted argument (quotes stripped) or a bare word.
static TOKEN_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#""([^"]*)"|(\S+)"#).expect("TOKEN_RE should compile - this is a bug")
});

/// Every command the bot understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandKind {
    Start,
    Help,
    CreateActivity,
    AddParticipant,
    AddSubActivity,
    Score,
    SubScore,
    Ranking,
    SubRanking,
    Activities,
    CreateTeam,
    AddToTeam,
    TeamRanking,
    Stats,
    Export,
    Feedback,
    Feedbacks,
    History,
    Complete,
    StartTimer,
    StopTimer,
    TimerStatus,
}

impl CommandKind {
    /// Menu order.
    pub const ALL: [CommandKind; 22] = [
        CommandKind::Start,
        CommandKind::Help,
        CommandKind::CreateActivity,
        CommandKind::AddSubActivity,
        CommandKind::Activities,
        CommandKind::Complete,
        CommandKind::History,
        CommandKind::AddParticipant,
        CommandKind::Score,
        CommandKind::SubScore,
        CommandKind::Ranking,
        CommandKind::SubRanking,
        CommandKind::CreateTeam,
        CommandKind::AddToTeam,
        CommandKind::TeamRanking,
        CommandKind::Stats,
        CommandKind::Export,
        CommandKind::Feedback,
        CommandKind::Feedbacks,
        CommandKind::StartTimer,
        CommandKind::StopTimer,
        CommandKind::TimerStatus,
    ];

    pub fn name(self) -> &'static str {
        match self {
            CommandKind::Start => "start",
            CommandKind::Help => "help",
            CommandKind::CreateActivity => "createactivity",
            CommandKind::AddParticipant => "addparticipant",
            CommandKind::AddSubActivity => "addsubactivity",
            CommandKind::Score => "score",
            CommandKind::SubScore => "subscore",
            CommandKind::Ranking => "ranking",
            CommandKind::SubRanking => "subranking",
            CommandKind::Activities => "activities",
            CommandKind::CreateTeam => "createteam",
            CommandKind::AddToTeam => "addtoteam",
            CommandKind::TeamRanking => "teamranking",
            CommandKind::Stats => "stats",
            CommandKind::Export => "export",
            CommandKind::Feedback => "feedback",
            CommandKind::Feedbacks => "feedbacks",
            CommandKind::History => "history",
            CommandKind::Complete => "complete",
            CommandKind::StartTimer => "starttimer",
            CommandKind::StopTimer => "stoptimer",
            CommandKind::TimerStatus => "timerstatus",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.name() == name)
    }

    /// Positional parameter names.
    pub fn params(self) -> &'static [&'static str] {
        match self {
            CommandKind::Start
            | CommandKind::Help
            | CommandKind::Activities
            | CommandKind::History => &[],
            CommandKind::CreateActivity => &["name"],
            CommandKind::AddParticipant | CommandKind::AddSubActivity => &["activityId", "name"],
            CommandKind::Score => &["activityId", "participant", "score"],
            CommandKind::SubScore => &["activityId", "subActivity", "participant", "score"],
            CommandKind::Ranking
            | CommandKind::TeamRanking
            | CommandKind::Stats
            | CommandKind::Export
            | CommandKind::Feedbacks
            | CommandKind::Complete
            | CommandKind::StopTimer
            | CommandKind::TimerStatus => &["activityId"],
            CommandKind::SubRanking => &["activityId", "subActivity"],
            CommandKind::CreateTeam => &["activityId", "teamName"],
            CommandKind::AddToTeam => &["activityId", "teamName", "participant"],
            CommandKind::Feedback => &["activityId", "message"],
            CommandKind::StartTimer => &["activityId", "minutes"],
        }
    }

    /// Whether extra tokens are joined into the last parameter.
    pub fn greedy_tail(self) -> bool {
        matches!(
            self,
            CommandKind::CreateActivity
                | CommandKind::AddParticipant
                | CommandKind::AddSubActivity
                | CommandKind::CreateTeam
                | CommandKind::AddToTeam
                | CommandKind::SubRanking
                | CommandKind::Feedback
        )
    }

    /// Short description for the command menu and `/help`.
    pub fn description(self) -> &'static str {
        match self {
            CommandKind::Start => "Quick start guide",
            CommandKind::Help => "List all commands",
            CommandKind::CreateActivity => "Create an activity",
            CommandKind::AddParticipant => "Add a participant",
            CommandKind::AddSubActivity => "Add a sub-activity",
            CommandKind::Score => "Set a score (main activity)",
            CommandKind::SubScore => "Set a score (sub-activity)",
            CommandKind::Ranking => "Overall ranking",
            CommandKind::SubRanking => "Ranking of a sub-activity",
            CommandKind::Activities => "List all activities",
            CommandKind::CreateTeam => "Create a team",
            CommandKind::AddToTeam => "Add a participant to a team",
            CommandKind::TeamRanking => "Team ranking",
            CommandKind::Stats => "Statistics and score chart",
            CommandKind::Export => "Export activity data as JSON",
            CommandKind::Feedback => "Leave feedback",
            CommandKind::Feedbacks => "Show feedback",
            CommandKind::History => "Completed activities",
            CommandKind::Complete => "Mark an activity as completed",
            CommandKind::StartTimer => "Start a timer",
            CommandKind::StopTimer => "Stop the timer",
            CommandKind::TimerStatus => "Show the timer",
        }
    }

    /// e.g. `/score <activityId> <participant> <score>`
    pub fn usage(self) -> String {
        let mut usage = format!("/{}", self.name());
        for param in self.params() {
            usage.push_str(&format!(" <{}>", param));
        }
        usage
    }
}

/// A parsed, arity-checked command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Start,
    Help,
    CreateActivity {
        name: String,
    },
    AddParticipant {
        activity_id: String,
        name: String,
    },
    AddSubActivity {
        activity_id: String,
        name: String,
    },
    Score {
        activity_id: String,
        participant: String,
        score: i64,
    },
    SubScore {
        activity_id: String,
        sub_activity: String,
        participant: String,
        score: i64,
    },
    Ranking {
        activity_id: String,
    },
    SubRanking {
        activity_id: String,
        sub_activity: String,
    },
    Activities,
    CreateTeam {
        activity_id: String,
        team: String,
    },
    AddToTeam {
        activity_id: String,
        team: String,
        participant: String,
    },
    TeamRanking {
        activity_id: String,
    },
    Stats {
        activity_id: String,
    },
    Export {
        activity_id: String,
    },
    Feedback {
        activity_id: String,
        message: String,
    },
    Feedbacks {
        activity_id: String,
    },
    History,
    Complete {
        activity_id: String,
    },
    StartTimer {
        activity_id: String,
        minutes: i64,
    },
    StopTimer {
        activity_id: String,
    },
    TimerStatus {
        activity_id: String,
    },
}

impl Command {
    pub fn kind(&self) -> CommandKind {
        match self {
            Command::Start => CommandKind::Start,
            Command::Help => CommandKind::Help,
            Command::CreateActivity { .. } => CommandKind::CreateActivity,
            Command::AddParticipant { .. } => CommandKind::AddParticipant,
            Command::AddSubActivity { .. } => CommandKind::AddSubActivity,
            Command::Score { .. } => CommandKind::Score,
            Command::SubScore { .. } => CommandKind::SubScore,
            Command::Ranking { .. } => CommandKind::Ranking,
            Command::SubRanking { .. } => CommandKind::SubRanking,
            Command::Activities => CommandKind::Activities,
            Command::CreateTeam { .. } => CommandKind::CreateTeam,
            Command::AddToTeam { .. } => CommandKind::AddToTeam,
            Command::TeamRanking { .. } => CommandKind::TeamRanking,
            Command::Stats { .. } => CommandKind::Stats,
            Command::Export { .. } => CommandKind::Export,
            Command::Feedback { .. } => CommandKind::Feedback,
            Command::Feedbacks { .. } => CommandKind::Feedbacks,
            Command::History => CommandKind::History,
            Command::Complete { .. } => CommandKind::Complete,
            Command::StartTimer { .. } => CommandKind::StartTimer,
            Command::StopTimer { .. } => CommandKind::StopTimer,
            Command::TimerStatus { .. } => CommandKind::TimerStatus,
        }
    }
}

/// Parse a message.
///
/// Returns `None` for text that is not a command at all. Unknown commands and
/// bad arguments yield `Some(Err(_))` with a message meant for the user.
pub fn parse(text: &str) -> Option<Result<Command>> {
    let text = text.trim_start();
    let rest = text.strip_prefix('/')?;

    let (word, args) = match rest.find(char::is_whitespace) {
        Some(idx) => (&rest[..idx], &rest[idx..]),
        None => (rest, ""),
    };
    // `/ranking@ScoryBot` in group chats
    let name = word.split('@').next().unwrap_or_default().to_ascii_lowercase();
    if name.is_empty() {
        return None;
    }

    let Some(kind) = CommandKind::from_name(&name) else {
        return Some(Err(AppError::Validation(format!(
            "Unknown command /{}. Use /help to see the available commands.",
            name
        ))));
    };

    Some(build(kind, tokenize(args)))
}

/// Split arguments into tokens, honoring double quotes.
pub fn tokenize(args: &str) -> Vec<String> {
    TOKEN_RE
        .captures_iter(args)
        .filter_map(|caps| caps.get(1).or_else(|| caps.get(2)))
        .map(|m| m.as_str().to_string())
        .collect()
}

fn build(kind: CommandKind, mut tokens: Vec<String>) -> Result<Command> {
    let expected = kind.params().len();

    if kind == CommandKind::Start {
        // Deep links arrive as `/start <payload>`
        tokens.clear();
    }
    if kind.greedy_tail() && tokens.len() > expected {
        let tail = tokens.split_off(expected - 1).join(" ");
        tokens.push(tail);
    }
    if tokens.len() != expected {
        return Err(AppError::Validation(format!(
            "Wrong number of parameters. Expected: {}\nUsage: {}",
            expected,
            kind.usage()
        )));
    }

    let mut args = tokens.into_iter();
    let mut next = || args.next().unwrap_or_default();

    let command = match kind {
        CommandKind::Start => Command::Start,
        CommandKind::Help => Command::Help,
        CommandKind::Activities => Command::Activities,
        CommandKind::History => Command::History,
        CommandKind::CreateActivity => Command::CreateActivity { name: next() },
        CommandKind::AddParticipant => Command::AddParticipant {
            activity_id: next(),
            name: next(),
        },
        CommandKind::AddSubActivity => Command::AddSubActivity {
            activity_id: next(),
            name: next(),
        },
        CommandKind::Score => Command::Score {
            activity_id: next(),
            participant: next(),
            score: parse_score(&next())?,
        },
        CommandKind::SubScore => Command::SubScore {
            activity_id: next(),
            sub_activity: next(),
            participant: next(),
            score: parse_score(&next())?,
        },
        CommandKind::Ranking => Command::Ranking {
            activity_id: next(),
        },
        CommandKind::SubRanking => Command::SubRanking {
            activity_id: next(),
            sub_activity: next(),
        },
        CommandKind::CreateTeam => Command::CreateTeam {
            activity_id: next(),
            team: next(),
        },
        CommandKind::AddToTeam => Command::AddToTeam {
            activity_id: next(),
            team: next(),
            participant: next(),
        },
        CommandKind::TeamRanking => Command::TeamRanking {
            activity_id: next(),
        },
        CommandKind::Stats => Command::Stats {
            activity_id: next(),
        },
        CommandKind::Export => Command::Export {
            activity_id: next(),
        },
        CommandKind::Feedback => Command::Feedback {
            activity_id: next(),
            message: next(),
        },
        CommandKind::Feedbacks => Command::Feedbacks {
            activity_id: next(),
        },
        CommandKind::Complete => Command::Complete {
            activity_id: next(),
        },
        CommandKind::StartTimer => Command::StartTimer {
            activity_id: next(),
            minutes: parse_minutes(&next())?,
        },
        CommandKind::StopTimer => Command::StopTimer {
            activity_id: next(),
        },
        CommandKind::TimerStatus => Command::TimerStatus {
            activity_id: next(),
        },
    };

    Ok(command)
}

fn parse_score(raw: &str) -> Result<i64> {
    raw.parse::<i64>().map_err(|_| {
        AppError::Validation(format!("Invalid score \"{}\": expected an integer.", raw))
    })
}

fn parse_minutes(raw: &str) -> Result<i64> {
    raw.parse::<i64>().map_err(|_| {
        AppError::Validation(format!(
            "Invalid duration \"{}\": expected a whole number of minutes.",
            raw
        ))
    })
}
