//! Reply values and the text templates the bot sends back.

use crate::bot::command::CommandKind;
use crate::models::{Activity, ActivityStats, Feedback, RankEntry, TimerStatus};
use crate::time_utils::{format_duration_ms, format_utc};

/// One outbound message.
#[derive(Debug, Clone, PartialEq)]
pub enum Reply {
    Text(String),
    /// Image fetched by Telegram from `url`
    Photo {
        url: String,
        caption: Option<String>,
    },
    /// File attachment
    Document {
        filename: String,
        content: Vec<u8>,
        caption: Option<String>,
    },
}

pub const NO_SCORES: &str = "No scores recorded yet.";

/// `/help` layout: section title and the commands listed under it.
const HELP_SECTIONS: &[(&str, &[CommandKind])] = &[
    (
        "Activities",
        &[
            CommandKind::CreateActivity,
            CommandKind::AddSubActivity,
            CommandKind::Activities,
            CommandKind::Complete,
            CommandKind::History,
        ],
    ),
    (
        "Participants and scores",
        &[
            CommandKind::AddParticipant,
            CommandKind::Score,
            CommandKind::SubScore,
        ],
    ),
    (
        "Rankings",
        &[CommandKind::Ranking, CommandKind::SubRanking],
    ),
    (
        "Teams",
        &[
            CommandKind::CreateTeam,
            CommandKind::AddToTeam,
            CommandKind::TeamRanking,
        ],
    ),
    (
        "More tools",
        &[
            CommandKind::Stats,
            CommandKind::Export,
            CommandKind::Feedback,
            CommandKind::Feedbacks,
            CommandKind::StartTimer,
            CommandKind::StopTimer,
            CommandKind::TimerStatus,
        ],
    ),
];

const QUOTE_TIP: &str =
    "Tip: put names containing spaces in double quotes, e.g. /createactivity \"Relay Race\"";

pub fn welcome_text() -> String {
    format!(
        "Welcome to Scory Bot!\n\n\
         Getting started:\n\n\
         1. Create an activity: /createactivity <name>\n\
         2. Add a participant: /addparticipant <activityId> <name>\n\
         3. Record a score: /score <activityId> <participant> <score>\n\
         4. Check the ranking: /ranking <activityId>\n\n\
         {}\n\n\
         Use /help to see every command.\n\n\
         Have fun!",
        QUOTE_TIP
    )
}

pub fn help_text() -> String {
    let mut text = String::from("Scory Bot commands\n");
    for (title, kinds) in HELP_SECTIONS {
        text.push_str(&format!("\n{}:\n", title));
        for kind in *kinds {
            text.push_str(&format!("{} - {}\n", kind.usage(), kind.description()));
        }
    }
    text.push('\n');
    text.push_str(QUOTE_TIP);
    text
}

/// `1. Ana: 10` lines under a title.
pub fn format_ranking(title: &str, ranking: &[RankEntry]) -> String {
    if ranking.is_empty() {
        return format!("{}\n\n{}", title, NO_SCORES);
    }
    let lines: Vec<String> = ranking
        .iter()
        .map(|e| format!("{}. {}: {}", e.rank, e.name, e.score))
        .collect();
    format!("{}\n\n{}", title, lines.join("\n"))
}

pub fn format_stats(activity: &Activity, stats: &ActivityStats) -> String {
    let or_no_data = |value: Option<String>| value.unwrap_or_else(|| "no data".to_string());

    format!(
        "Statistics for \"{}\":\n\n\
         Participants: {}\n\
         Average score: {}\n\
         Highest score: {}\n\
         Lowest score: {}\n\
         Most active participant: {}",
        activity.name,
        stats.total_participants,
        or_no_data(stats.average_score.map(|avg| format!("{:.2}", avg))),
        or_no_data(stats.highest_score.map(|s| s.to_string())),
        or_no_data(stats.lowest_score.map(|s| s.to_string())),
        or_no_data(stats.most_active_participant.clone()),
    )
}

/// `Name (ID: ...)` per line, or `empty` if there is nothing to list.
pub fn format_activity_list(title: &str, activities: &[Activity], empty: &str) -> String {
    if activities.is_empty() {
        return empty.to_string();
    }
    let lines: Vec<String> = activities
        .iter()
        .map(|a| format!("{} (ID: {})", a.name, a.id))
        .collect();
    format!("{}\n\n{}", title, lines.join("\n"))
}

pub fn format_feedback(activity: &Activity, feedback: &[Feedback]) -> String {
    if feedback.is_empty() {
        return format!("No feedback for \"{}\" yet.", activity.name);
    }
    let lines: Vec<String> = feedback
        .iter()
        .map(|f| format!("[{}] {}: {}", format_utc(f.timestamp), f.author, f.message))
        .collect();
    format!("Feedback for \"{}\":\n\n{}", activity.name, lines.join("\n"))
}

pub fn format_timer_status(activity: &Activity, status: Option<&TimerStatus>) -> String {
    let Some(status) = status else {
        return format!("No timer has been started for \"{}\".", activity.name);
    };

    let state = if status.is_running {
        "running"
    } else {
        "stopped"
    };
    format!(
        "Timer for \"{}\" ({}):\n\n\
         Started: {}\n\
         Elapsed: {}\n\
         Remaining: {}",
        activity.name,
        state,
        format_utc(status.start_time),
        format_duration_ms(status.elapsed_ms),
        format_duration_ms(status.remaining_ms),
    )
}

/// Length of `text` as Telegram counts it (UTF-16 code units).
pub fn utf16_len(text: &str) -> usize {
    text.chars().map(char::len_utf16).sum()
}

/// Split `text` into pieces of at most `max_units` UTF-16 code units,
/// breaking at line ends where possible.
pub fn chunk_text(text: &str, max_units: usize) -> Vec<String> {
    // A surrogate pair must fit in one piece
    let max_units = max_units.max(2);
    let mut chunks = Vec::new();
    let mut current = String::new();
    let mut current_len = 0;

    for line in text.split_inclusive('\n') {
        let line_len = utf16_len(line);

        if current_len + line_len > max_units && !current.is_empty() {
            chunks.push(std::mem::take(&mut current));
            current_len = 0;
        }

        if line_len > max_units {
            // Hard split a single overlong line on char boundaries
            for c in line.chars() {
                if current_len + c.len_utf16() > max_units {
                    chunks.push(std::mem::take(&mut current));
                    current_len = 0;
                }
                current.push(c);
                current_len += c.len_utf16();
            }
            chunks.push(std::mem::take(&mut current));
            current_len = 0;
            continue;
        }

        current.push_str(line);
        current_len += line_len;
    }

    if !current.is_empty() {
        chunks.push(current);
    }
    if chunks.is_empty() {
        chunks.push(String::new());
    }
    chunks
}
