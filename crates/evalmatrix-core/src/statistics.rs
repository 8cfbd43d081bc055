//! Score bounds, averaging, and session-level aggregate statistics.

use serde::{Deserialize, Serialize};

/// Lowest valid score.
pub const MIN_SCORE: f64 = 0.0;
/// Highest valid score.
pub const MAX_SCORE: f64 = 20.0;
/// Minimum average for admission (50% of the scale).
pub const PASS_THRESHOLD: f64 = 10.0;

/// Round to 2 decimal places, half away from zero.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Arithmetic mean, rounded to 2 decimals. `None` for an empty input.
///
/// `None` means "no data", which is not the same thing as an average of zero.
pub fn mean_of<I>(values: I) -> Option<f64>
where
    I: IntoIterator<Item = f64>,
{
    let (sum, count) = values
        .into_iter()
        .fold((0.0f64, 0usize), |(sum, count), v| (sum + v, count + 1));
    if count == 0 {
        None
    } else {
        Some(round2(sum / count as f64))
    }
}

/// Whether an average passes certification. The threshold is inclusive.
pub fn is_admitted(average: Option<f64>) -> bool {
    matches!(average, Some(avg) if avg >= PASS_THRESHOLD)
}

/// Whether a value is a storable score.
pub fn in_score_range(value: f64) -> bool {
    value.is_finite() && (MIN_SCORE..=MAX_SCORE).contains(&value)
}

/// Aggregate statistics for one session's matrix.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionSummary {
    /// Roster size.
    pub participant_count: usize,
    /// Number of competencies.
    pub competency_count: usize,
    /// Cells that currently hold a score.
    pub graded_cells: usize,
    /// Participants with an average >= 10.
    pub admitted: usize,
    /// Participants with an average < 10.
    pub not_admitted: usize,
    /// Participants without any score.
    pub ungraded: usize,
    /// Mean of the defined participant averages.
    pub class_average: Option<f64>,
    /// Average per competency, in competency order.
    pub per_competency: Vec<CompetencyStats>,
}

impl SessionSummary {
    /// Share of graded participants who were admitted, in [0, 1].
    pub fn admission_rate(&self) -> Option<f64> {
        let graded = self.admitted + self.not_admitted;
        if graded == 0 {
            None
        } else {
            Some(self.admitted as f64 / graded as f64)
        }
    }

    /// Share of matrix cells that hold a score, in [0, 1].
    pub fn completion_rate(&self) -> f64 {
        let cells = self.participant_count * self.competency_count;
        if cells == 0 {
            0.0
        } else {
            self.graded_cells as f64 / cells as f64
        }
    }
}

/// Statistics for a single competency across the roster.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompetencyStats {
    pub competency_id: String,
    pub average: Option<f64>,
    pub graded: usize,
}
