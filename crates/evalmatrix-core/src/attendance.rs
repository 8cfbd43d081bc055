//! Attendance sheet for one session day.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::model::Participant;

/// Presence of a participant on a given day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PresenceStatus {
    Present,
    Absent,
}

impl PresenceStatus {
    pub fn from_present(present: bool) -> Self {
        if present {
            PresenceStatus::Present
        } else {
            PresenceStatus::Absent
        }
    }

    pub fn is_present(self) -> bool {
        self == PresenceStatus::Present
    }
}

impl fmt::Display for PresenceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PresenceStatus::Present => write!(f, "present"),
            PresenceStatus::Absent => write!(f, "absent"),
        }
    }
}

impl FromStr for PresenceStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "present" | "présent" => Ok(PresenceStatus::Present),
            "absent" => Ok(PresenceStatus::Absent),
            other => Err(format!("unknown presence status: {other}")),
        }
    }
}

/// A day of the session and whether attendance was already taken.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionDate {
    pub date: NaiveDate,
    pub has_presences: bool,
}

/// A roster entry as returned for a given day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PresenceEntry {
    pub participant: Participant,
    /// Recorded status, `None` if attendance was not taken yet.
    pub status: Option<PresenceStatus>,
}

/// One presence submitted on save.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PresenceRecord {
    pub session_id: String,
    pub participant_id: String,
    pub date: NaiveDate,
    pub status: PresenceStatus,
}

/// Editable attendance for one (session, date).
#[derive(Debug, Clone)]
pub struct AttendanceSheet {
    session_id: String,
    date: NaiveDate,
    roster: Vec<Participant>,
    present: HashMap<String, bool>,
    next_bulk: PresenceStatus,
}

impl AttendanceSheet {
    /// Build the sheet. Participants without a recorded status start absent.
    pub fn from_roster(
        session_id: impl Into<String>,
        date: NaiveDate,
        entries: Vec<PresenceEntry>,
    ) -> Self {
        let mut roster = Vec::with_capacity(entries.len());
        let mut present = HashMap::with_capacity(entries.len());
        for entry in entries {
            if present.contains_key(&entry.participant.id) {
                tracing::warn!(participant = %entry.participant.id, "duplicate roster entry, ignored");
                continue;
            }
            present.insert(
                entry.participant.id.clone(),
                entry.status.is_some_and(PresenceStatus::is_present),
            );
            roster.push(entry.participant);
        }

        Self {
            session_id: session_id.into(),
            date,
            roster,
            present,
            next_bulk: PresenceStatus::Present,
        }
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    pub fn date(&self) -> NaiveDate {
        self.date
    }

    pub fn roster(&self) -> &[Participant] {
        &self.roster
    }

    /// Status of a participant, `None` if not on the roster.
    pub fn status(&self, participant_id: &str) -> Option<PresenceStatus> {
        self.present
            .get(participant_id)
            .copied()
            .map(PresenceStatus::from_present)
    }

    /// Set one participant's presence. Returns `false` if not on the roster.
    pub fn set_present(&mut self, participant_id: &str, present: bool) -> bool {
        match self.present.get_mut(participant_id) {
            Some(slot) => {
                *slot = present;
                true
            }
            None => false,
        }
    }

    /// Flip one participant's presence. Returns the new status.
    pub fn toggle(&mut self, participant_id: &str) -> Option<PresenceStatus> {
        let slot = self.present.get_mut(participant_id)?;
        *slot = !*slot;
        Some(PresenceStatus::from_present(*slot))
    }

    /// Set everyone to the same status.
    pub fn mark_all(&mut self, present: bool) {
        for value in self.present.values_mut() {
            *value = present;
        }
    }

    /// Quick toggle: marks everyone present, then everyone absent on the
    /// next call, and so on. Returns the status that was applied.
    pub fn toggle_all(&mut self) -> PresenceStatus {
        let applied = self.next_bulk;
        self.mark_all(applied.is_present());
        self.next_bulk = match applied {
            PresenceStatus::Present => PresenceStatus::Absent,
            PresenceStatus::Absent => PresenceStatus::Present,
        };
        applied
    }

    pub fn present_count(&self) -> usize {
        self.present.values().filter(|p| **p).count()
    }

    pub fn absent_count(&self) -> usize {
        self.roster.len() - self.present_count()
    }

    /// One record per roster participant, in roster order.
    pub fn to_save_batch(&self) -> Vec<PresenceRecord> {
        self.roster
            .iter()
            .map(|p| PresenceRecord {
                session_id: self.session_id.clone(),
                participant_id: p.id.clone(),
                date: self.date,
                status: PresenceStatus::from_present(
                    self.present.get(&p.id).copied().unwrap_or(false),
                ),
            })
            .collect()
    }
}
