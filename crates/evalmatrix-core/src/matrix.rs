//! The evaluation matrix engine.
//!
//! Holds one session's roster, competency list, and a sparse score mapping
//! keyed by `(participant_id, competency_id)`. Averages and admission status
//! are derived on demand and never stored.

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::model::{AdmissionStatus, Competency, MatrixSnapshot, Participant, SaveRecord};
use crate::statistics::{self, CompetencyStats, SessionSummary};

type ScoreKey = (String, String);

/// In-memory evaluation matrix for a single session.
#[derive(Debug, Clone)]
pub struct EvaluationMatrix {
    session_id: String,
    session_name: Option<String>,
    participants: Vec<Participant>,
    competencies: Vec<Competency>,
    scores: HashMap<ScoreKey, f64>,
    dirty: bool,
}

/// One rendered row of the matrix.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParticipantRow {
    pub participant: Participant,
    /// Scores in competency order.
    pub scores: Vec<Option<f64>>,
    pub average: Option<f64>,
    pub status: AdmissionStatus,
}

impl EvaluationMatrix {
    /// Create an empty matrix for a roster and competency list.
    ///
    /// Duplicate ids keep their first occurrence.
    pub fn new(
        session_id: impl Into<String>,
        participants: Vec<Participant>,
        competencies: Vec<Competency>,
    ) -> Self {
        let mut seen = HashSet::new();
        let participants: Vec<Participant> = participants
            .into_iter()
            .filter(|p| {
                let fresh = seen.insert(p.id.clone());
                if !fresh {
                    tracing::warn!(participant = %p.id, "duplicate participant in roster, ignored");
                }
                fresh
            })
            .collect();

        let mut seen = HashSet::new();
        let competencies: Vec<Competency> = competencies
            .into_iter()
            .filter(|c| {
                let fresh = seen.insert(c.id.clone());
                if !fresh {
                    tracing::warn!(competency = %c.id, "duplicate competency, ignored");
                }
                fresh
            })
            .collect();

        Self {
            session_id: session_id.into(),
            session_name: None,
            participants,
            competencies,
            scores: HashMap::new(),
            dirty: false,
        }
    }

    /// Build a matrix from a fetched snapshot.
    ///
    /// Initial scores outside [0, 20] or referencing unknown ids are dropped.
    pub fn from_snapshot(snapshot: MatrixSnapshot) -> Self {
        let mut matrix = Self::new(
            snapshot.session_id,
            snapshot.participants,
            snapshot.competencies,
        );
        matrix.session_name = snapshot.session_name;

        for entry in snapshot.scores {
            if let Err(e) = matrix.check_key(&entry.participant_id, &entry.competency_id) {
                tracing::warn!("dropping initial score: {e}");
                continue;
            }
            if !statistics::in_score_range(entry.score) {
                tracing::warn!(
                    participant = %entry.participant_id,
                    competency = %entry.competency_id,
                    score = entry.score,
                    "dropping out-of-range initial score"
                );
                continue;
            }
            matrix
                .scores
                .insert((entry.participant_id, entry.competency_id), entry.score + 0.0);
        }

        matrix
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    pub fn session_name(&self) -> Option<&str> {
        self.session_name.as_deref()
    }

    pub fn set_session_name(&mut self, name: impl Into<String>) {
        self.session_name = Some(name.into());
    }

    pub fn participants(&self) -> &[Participant] {
        &self.participants
    }

    pub fn competencies(&self) -> &[Competency] {
        &self.competencies
    }

    /// Whether any edit happened since the matrix was built.
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Forget the edit history, e.g. after a successful save.
    pub fn mark_clean(&mut self) {
        self.dirty = false;
    }

    /// Apply a raw text edit.
    ///
    /// Empty input clears the score. Anything else must parse as a number in
    /// [0, 20]; a decimal comma is accepted. On error nothing changes.
    pub fn set_score(
        &mut self,
        participant_id: &str,
        competency_id: &str,
        raw_input: &str,
    ) -> Result<(), ValidationError> {
        self.check_key(participant_id, competency_id)?;

        let trimmed = raw_input.trim();
        if trimmed.is_empty() {
            self.remove(participant_id, competency_id);
            return Ok(());
        }

        let value = parse_score(trimmed).ok_or_else(|| ValidationError::InvalidScore {
            input: raw_input.to_string(),
        })?;
        self.insert(participant_id, competency_id, value);
        Ok(())
    }

    /// Apply a numeric edit.
    pub fn set_value(
        &mut self,
        participant_id: &str,
        competency_id: &str,
        value: f64,
    ) -> Result<(), ValidationError> {
        self.check_key(participant_id, competency_id)?;
        if !statistics::in_score_range(value) {
            return Err(ValidationError::InvalidScore {
                input: value.to_string(),
            });
        }
        self.insert(participant_id, competency_id, value);
        Ok(())
    }

    /// Remove a score. Clearing an absent score is a no-op.
    pub fn clear_score(
        &mut self,
        participant_id: &str,
        competency_id: &str,
    ) -> Result<(), ValidationError> {
        self.check_key(participant_id, competency_id)?;
        self.remove(participant_id, competency_id);
        Ok(())
    }

    /// Current score for a cell, `None` when absent.
    pub fn score(&self, participant_id: &str, competency_id: &str) -> Option<f64> {
        self.scores
            .get(&(participant_id.to_string(), competency_id.to_string()))
            .copied()
    }

    /// Mean of the participant's present scores, rounded to 2 decimals.
    ///
    /// `None` when the participant has no score at all (or is unknown).
    pub fn average_for(&self, participant_id: &str) -> Option<f64> {
        statistics::mean_of(
            self.competencies
                .iter()
                .filter_map(|c| self.score(participant_id, &c.id)),
        )
    }

    /// Admission decision for an average.
    pub fn is_admitted(average: Option<f64>) -> bool {
        statistics::is_admitted(average)
    }

    /// Admission status of a participant.
    pub fn status_for(&self, participant_id: &str) -> AdmissionStatus {
        AdmissionStatus::from_average(self.average_for(participant_id))
    }

    /// Records to submit on save, participant-major then competency-minor.
    ///
    /// Absent cells are omitted; partial grading is allowed.
    pub fn to_save_batch(&self) -> Vec<SaveRecord> {
        let mut batch = Vec::with_capacity(self.scores.len());
        for participant in &self.participants {
            for competency in &self.competencies {
                if let Some(score) = self.score(&participant.id, &competency.id) {
                    batch.push(SaveRecord {
                        session_id: self.session_id.clone(),
                        participant_id: participant.id.clone(),
                        competency_id: competency.id.clone(),
                        score,
                    });
                }
            }
        }
        batch
    }

    /// One row per participant, in roster order.
    pub fn rows(&self) -> Vec<ParticipantRow> {
        self.participants
            .iter()
            .map(|p| {
                let average = self.average_for(&p.id);
                ParticipantRow {
                    participant: p.clone(),
                    scores: self
                        .competencies
                        .iter()
                        .map(|c| self.score(&p.id, &c.id))
                        .collect(),
                    average,
                    status: AdmissionStatus::from_average(average),
                }
            })
            .collect()
    }

    /// Session-level aggregate statistics.
    pub fn summary(&self) -> SessionSummary {
        let averages: Vec<Option<f64>> = self
            .participants
            .iter()
            .map(|p| self.average_for(&p.id))
            .collect();

        let admitted = averages.iter().filter(|a| statistics::is_admitted(**a)).count();
        let ungraded = averages.iter().filter(|a| a.is_none()).count();

        let per_competency = self
            .competencies
            .iter()
            .map(|c| {
                let values: Vec<f64> = self
                    .participants
                    .iter()
                    .filter_map(|p| self.score(&p.id, &c.id))
                    .collect();
                CompetencyStats {
                    competency_id: c.id.clone(),
                    graded: values.len(),
                    average: statistics::mean_of(values),
                }
            })
            .collect();

        SessionSummary {
            participant_count: self.participants.len(),
            competency_count: self.competencies.len(),
            graded_cells: self.scores.len(),
            admitted,
            not_admitted: averages.len() - admitted - ungraded,
            ungraded,
            class_average: statistics::mean_of(averages.into_iter().flatten()),
            per_competency,
        }
    }

    /// Current state as a snapshot, e.g. for offline storage.
    pub fn to_snapshot(&self) -> MatrixSnapshot {
        MatrixSnapshot {
            session_id: self.session_id.clone(),
            session_name: self.session_name.clone(),
            participants: self.participants.clone(),
            competencies: self.competencies.clone(),
            scores: self
                .to_save_batch()
                .into_iter()
                .map(|r| crate::model::ScoreEntry {
                    participant_id: r.participant_id,
                    competency_id: r.competency_id,
                    score: r.score,
                })
                .collect(),
        }
    }

    fn check_key(&self, participant_id: &str, competency_id: &str) -> Result<(), ValidationError> {
        if !self.participants.iter().any(|p| p.id == participant_id) {
            return Err(ValidationError::UnknownParticipant(
                participant_id.to_string(),
            ));
        }
        if !self.competencies.iter().any(|c| c.id == competency_id) {
            return Err(ValidationError::UnknownCompetency(competency_id.to_string()));
        }
        Ok(())
    }

    fn insert(&mut self, participant_id: &str, competency_id: &str, value: f64) {
        // `-0.0 + 0.0` is `0.0`; a negative zero never reaches the batch.
        self.scores
            .insert((participant_id.to_string(), competency_id.to_string()), value + 0.0);
        self.dirty = true;
    }

    fn remove(&mut self, participant_id: &str, competency_id: &str) {
        if self
            .scores
            .remove(&(participant_id.to_string(), competency_id.to_string()))
            .is_some()
        {
            self.dirty = true;
        }
    }
}

/// Parse a non-empty score input. Returns `None` unless it is a finite
/// number within [0, 20].
fn parse_score(input: &str) -> Option<f64> {
    let normalized = input.replace(',', ".");
    let value = normalized.parse::<f64>().ok()?;
    statistics::in_score_range(value).then_some(value)
}
