//! Statistics summary for an activity.

use crate::models::activity::Activity;
use crate::models::ranking::{participant_totals, participation_counts, Totals};
use serde::Serialize;

/// Summary shown by `/stats`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ActivityStats {
    /// Size of the roster (not only scored participants)
    pub total_participants: usize,
    /// Sum of totals divided by the roster size; `None` with no participants
    pub average_score: Option<f64>,
    pub highest_score: Option<i64>,
    pub lowest_score: Option<i64>,
    /// Most sub-activities with a recorded score; ties go to the first encountered
    pub most_active_participant: Option<String>,
    /// Totals used for the summary, in accumulation order (chart input)
    #[serde(skip)]
    pub totals: Totals,
}

impl ActivityStats {
    pub fn from_activity(activity: &Activity) -> Self {
        let totals = participant_totals(activity);
        let counts = participation_counts(activity);
        let total_participants = activity.participants.len();

        let average_score = if total_participants == 0 {
            None
        } else {
            let sum: f64 = totals.iter().map(|(_, score)| score as f64).sum();
            Some(sum / total_participants as f64)
        };

        let mut most_active: Option<(&str, i64)> = None;
        for (name, count) in counts.iter() {
            if most_active.map_or(true, |(_, best)| count > best) {
                most_active = Some((name, count));
            }
        }

        Self {
            total_participants,
            average_score,
            highest_score: totals.iter().map(|(_, score)| score).max(),
            lowest_score: totals.iter().map(|(_, score)| score).min(),
            most_active_participant: most_active.map(|(name, _)| name.to_string()),
            totals,
        }
    }
}
