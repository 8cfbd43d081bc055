//! Session schedule rules: status by date range and training days.

use std::fmt;

use chrono::{Datelike, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};

/// Where a session stands relative to today.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    Pending,
    InProgress,
    Finished,
}

impl fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionStatus::Pending => write!(f, "En attente"),
            SessionStatus::InProgress => write!(f, "En cours"),
            SessionStatus::Finished => write!(f, "Terminée"),
        }
    }
}

/// Status of a session running from `start` to `end`, both inclusive.
pub fn session_status(start: NaiveDate, end: NaiveDate, today: NaiveDate) -> SessionStatus {
    if today < start {
        SessionStatus::Pending
    } else if today <= end {
        SessionStatus::InProgress
    } else {
        SessionStatus::Finished
    }
}

/// Weekdays are training days; Saturday and Sunday are not.
pub fn is_training_day(date: NaiveDate) -> bool {
    !matches!(date.weekday(), Weekday::Sat | Weekday::Sun)
}

/// Training days between `start` and `end`, inclusive.
pub fn training_days(start: NaiveDate, end: NaiveDate) -> Vec<NaiveDate> {
    start
        .iter_days()
        .take_while(|d| *d <= end)
        .filter(|d| is_training_day(*d))
        .collect()
}
